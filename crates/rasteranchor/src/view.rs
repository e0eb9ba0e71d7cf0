//! View rotation and orthographic projection onto the drawing plane.

use nalgebra::{Rotation3, Vector2, Vector3};

/// Azimuth/elevation snapshot of the scene camera, in degrees.
///
/// Data points are rotated by `-azimuth` about the vertical (z) axis, then by
/// `elevation` about the horizontal (x) axis. The drawing plane keeps the
/// rotated x and z coordinates; the rotated y coordinate is depth, growing
/// away from the viewer.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewTransform {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            azimuth_deg: -37.5,
            elevation_deg: 30.0,
        }
    }
}

impl ViewTransform {
    pub fn new(azimuth_deg: f64, elevation_deg: f64) -> Self {
        Self {
            azimuth_deg,
            elevation_deg,
        }
    }

    pub fn rotation(&self) -> Rotation3<f64> {
        let azimuth = Rotation3::from_axis_angle(&Vector3::z_axis(), -self.azimuth_deg.to_radians());
        let elevation = Rotation3::from_axis_angle(&Vector3::x_axis(), self.elevation_deg.to_radians());
        elevation * azimuth
    }

    /// Drawing-plane coordinates `(u, v)` of `p`, with `v` pointing up.
    pub fn project(&self, p: &Vector3<f64>) -> Vector2<f64> {
        let r = self.rotation() * p;
        Vector2::new(r.x, r.z)
    }

    /// Distance along the viewing direction; larger is farther away.
    pub fn depth(&self, p: &Vector3<f64>) -> f64 {
        (self.rotation() * p).y
    }
}

/// Partition of projected points into classes sharing one drawing-plane location.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedClasses {
    positions: Vec<Vector2<f64>>,
    class_of: Vec<usize>,
    n_classes: usize,
}

impl ProjectedClasses {
    /// Group `positions` in input order. Two points share a class when both
    /// coordinates agree within `tolerance` of the class's first member.
    pub fn group(positions: Vec<Vector2<f64>>, tolerance: f64) -> Self {
        let mut representatives: Vec<usize> = Vec::new();
        let mut class_of = Vec::with_capacity(positions.len());

        for (i, p) in positions.iter().enumerate() {
            let existing = representatives.iter().position(|&r| {
                let q = positions[r];
                (p.x - q.x).abs() <= tolerance && (p.y - q.y).abs() <= tolerance
            });
            match existing {
                Some(class) => class_of.push(class),
                None => {
                    class_of.push(representatives.len());
                    representatives.push(i);
                }
            }
        }

        Self {
            positions,
            n_classes: representatives.len(),
            class_of,
        }
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn class_of(&self, index: usize) -> usize {
        self.class_of[index]
    }

    pub fn position(&self, index: usize) -> Vector2<f64> {
        self.positions[index]
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of distinct classes among `indices`.
    pub fn distinct_among(&self, indices: &[usize]) -> usize {
        let mut seen: Vec<usize> = indices.iter().map(|&i| self.class_of[i]).collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }

    /// Member indices of each class, classes in first-seen order.
    pub fn members(&self) -> Vec<Vec<usize>> {
        let mut out = vec![Vec::new(); self.n_classes];
        for (i, &c) in self.class_of.iter().enumerate() {
            out[c].push(i);
        }
        out
    }
}
