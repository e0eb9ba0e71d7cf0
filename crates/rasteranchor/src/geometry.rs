//! Plot-box geometry: axis limits, plotted-data extents and the bounding box.
//!
//! The bounding box is the axis-aligned box spanned by the three resolved
//! axis ranges. Its corners are indexed `0..8` with one bit per axis:
//! bit 0 selects x, bit 1 selects y, bit 2 selects z (0 = min, 1 = max).

use std::fmt;

use nalgebra::Vector3;

use crate::error::CalibrateError;
use crate::scene::WorkingScene;

/// Number of bounding-box corners.
pub const N_CORNERS: usize = 8;

/// One of the three plot axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A point in plot data space.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl DataPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn coord(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f64; 3]> for DataPoint {
    fn from(p: [f64; 3]) -> Self {
        Self::new(p[0], p[1], p[2])
    }
}

impl fmt::Display for DataPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Axis limits as configured on the host.
///
/// A missing or non-finite bound is unresolved: the host picks it from the
/// plotted data.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AxisLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl AxisLimits {
    /// Both bounds fixed by the caller.
    pub fn explicit(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Both bounds left to the data.
    pub fn auto() -> Self {
        Self::default()
    }

    fn bound(v: Option<f64>) -> Option<f64> {
        v.filter(|b| b.is_finite())
    }

    /// The range, if both bounds are resolved.
    pub fn resolved(&self) -> Option<ResolvedRange> {
        Some(ResolvedRange::new(
            Self::bound(self.min)?,
            Self::bound(self.max)?,
        ))
    }

    /// Fill every unresolved bound from the plotted data extent.
    pub fn resolve_with(&self, data: ResolvedRange) -> ResolvedRange {
        ResolvedRange::new(
            Self::bound(self.min).unwrap_or(data.min),
            Self::bound(self.max).unwrap_or(data.max),
        )
    }
}

/// A closed interval `[min, max]` with both ends known.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResolvedRange {
    pub min: f64,
    pub max: f64,
}

impl ResolvedRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Smallest range covering both.
    pub fn union(&self, other: &ResolvedRange) -> ResolvedRange {
        ResolvedRange::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Map `v` onto `[-0.5, 0.5]`. A zero-width range maps everything to 0.
    pub fn normalize(&self, v: f64) -> f64 {
        let span = self.span();
        if span == 0.0 || !span.is_finite() {
            return 0.0;
        }
        (v - self.min) / span - 0.5
    }
}

/// Range of the finite entries of `values`, or `None` if there are none.
pub fn extent_of(values: &[f64]) -> Option<ResolvedRange> {
    let mut finite = values.iter().copied().filter(|v| v.is_finite());
    let first = finite.next()?;
    Some(finite.fold(ResolvedRange::new(first, first), |r, v| {
        ResolvedRange::new(r.min.min(v), r.max.max(v))
    }))
}

/// Per-axis extents of plotted data.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DataExtents {
    pub x: ResolvedRange,
    pub y: ResolvedRange,
    pub z: ResolvedRange,
}

impl DataExtents {
    /// Extents of three coordinate arrays; `None` if any axis has no finite value.
    pub fn from_values(x: &[f64], y: &[f64], z: &[f64]) -> Option<Self> {
        Some(Self {
            x: extent_of(x)?,
            y: extent_of(y)?,
            z: extent_of(z)?,
        })
    }

    pub fn axis(&self, axis: Axis) -> ResolvedRange {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn union(&self, other: &DataExtents) -> DataExtents {
        DataExtents {
            x: self.x.union(&other.x),
            y: self.y.union(&other.y),
            z: self.z.union(&other.z),
        }
    }
}

/// Union of all extents, `None` if the iterator is empty.
pub fn union_extents(extents: impl IntoIterator<Item = DataExtents>) -> Option<DataExtents> {
    extents.into_iter().reduce(|acc, e| acc.union(&e))
}

/// The axis-aligned plot box.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoundingBox {
    pub x: ResolvedRange,
    pub y: ResolvedRange,
    pub z: ResolvedRange,
}

impl BoundingBox {
    pub fn new(x: ResolvedRange, y: ResolvedRange, z: ResolvedRange) -> Self {
        Self { x, y, z }
    }

    pub fn range(&self, axis: Axis) -> ResolvedRange {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Corner `index` (`0..8`); bit 0/1/2 pick max over min on x/y/z.
    pub fn corner(&self, index: usize) -> DataPoint {
        let pick = |r: ResolvedRange, bit: usize| {
            if index & (1 << bit) != 0 {
                r.max
            } else {
                r.min
            }
        };
        DataPoint::new(pick(self.x, 0), pick(self.y, 1), pick(self.z, 2))
    }

    pub fn corners(&self) -> [DataPoint; N_CORNERS] {
        std::array::from_fn(|i| self.corner(i))
    }

    /// Position of `p` inside the box rescaled to the unit cube centered at the origin.
    pub fn normalized(&self, p: &DataPoint) -> Vector3<f64> {
        Vector3::new(
            self.x.normalize(p.x),
            self.y.normalize(p.y),
            self.z.normalize(p.z),
        )
    }
}

/// Resolved axis geometry of a working scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneGeometry {
    pub bbox: BoundingBox,
    /// Union of plotted-data extents, if anything is plotted.
    pub data: Option<DataExtents>,
}

/// Resolve the axis limits of `scene` against its plotted data.
///
/// Unresolved bounds are replaced by the tightest bound covering all plotted
/// data on that axis and written back onto the scene, so later frames are
/// rendered with the same limits. Fully explicit axes are left untouched.
pub fn extract_geometry<W: WorkingScene + ?Sized>(
    scene: &mut W,
) -> Result<SceneGeometry, CalibrateError> {
    let data = union_extents(scene.primitives().iter().filter_map(|p| p.extents));

    let mut ranges = [ResolvedRange::default(); 3];
    for axis in Axis::ALL {
        let limits = scene.axis_limits(axis);
        let range = match limits.resolved() {
            Some(range) => range,
            None => {
                let extent = data
                    .map(|d| d.axis(axis))
                    .ok_or(CalibrateError::NoPlottedData(axis))?;
                let range = limits.resolve_with(extent);
                scene.set_axis_limits(axis, range);
                tracing::debug!(
                    axis = axis.name(),
                    min = range.min,
                    max = range.max,
                    "resolved axis limits from plotted data"
                );
                range
            }
        };
        ranges[axis.index()] = range;
    }

    Ok(SceneGeometry {
        bbox: BoundingBox::new(ranges[0], ranges[1], ranges[2]),
        data,
    })
}
