//! Software reference host.
//!
//! [`SoftScene`] is a serde-loadable scene description rendered by a small
//! orthographic rasterizer. It implements the full host capability interface
//! and backs the CLI, the examples and the tests.

mod raster;

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::RgbImage;

use crate::anchor::SurfaceGrid;
use crate::geometry::{
    union_extents, Axis, AxisLimits, BoundingBox, DataExtents, DataPoint, ResolvedRange,
};
use crate::scene::{
    ChildId, ChildKind, ColorLegend, HostError, PrimitiveId, PrimitiveInfo, PrimitiveKind,
    SceneChild, SceneSource, WorkingScene,
};
use crate::view::ViewTransform;

#[cfg(test)]
pub(crate) use raster::FrameLayout;

const AXES_CHILD: ChildId = ChildId(0);
const LEGEND_CHILD: ChildId = ChildId(1);
const FIRST_ANNOTATION_CHILD: usize = 2;

/// Per-axis limits of a scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SceneLimits {
    pub x: AxisLimits,
    pub y: AxisLimits,
    pub z: AxisLimits,
}

impl SceneLimits {
    pub fn get(&self, axis: Axis) -> AxisLimits {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn get_mut(&mut self, axis: Axis) -> &mut AxisLimits {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AxisLabels {
    pub x: String,
    pub y: String,
    pub z: String,
}

impl AxisLabels {
    pub fn get(&self, axis: Axis) -> &str {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

fn default_line_color() -> [u8; 3] {
    [0, 90, 200]
}

/// A 3D polyline.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SoftLine {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    /// Pure black is drawn as dark gray.
    #[serde(default = "default_line_color")]
    pub color: [u8; 3],
}

impl SoftLine {
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Self {
        Self {
            x,
            y,
            z,
            color: default_line_color(),
        }
    }

    pub fn extents(&self) -> Option<DataExtents> {
        DataExtents::from_values(&self.x, &self.y, &self.z)
    }

    pub(crate) fn points(&self) -> impl Iterator<Item = DataPoint> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((&x, &y), &z)| DataPoint::new(x, y, z))
    }
}

/// A filled 2D figure annotation, drawn in pure black on top of the plot.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SoftAnnotation {
    /// Top-left corner `[col, row]` in screen pixels.
    pub position_px: [u32; 2],
    /// `[width, height]` in screen pixels.
    pub size_px: [u32; 2],
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SoftLegend {
    pub label: String,
    /// Color limits; `None` follows the surface data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
}

/// Scene description for the software host.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SoftScene {
    /// Screen frame `[width, height]` in pixels.
    pub frame_size: [u32; 2],
    pub view: ViewTransform,
    pub limits: SceneLimits,
    pub labels: AxisLabels,
    pub surfaces: Vec<SurfaceGrid>,
    pub lines: Vec<SoftLine>,
    pub annotations: Vec<SoftAnnotation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_legend: Option<SoftLegend>,
    /// Side of the marker's black fill at screen resolution.
    pub marker_size_px: u32,
    /// Shared by every duplicate; counts `destroy` calls.
    #[serde(skip)]
    destroyed: Arc<AtomicUsize>,
}

impl Default for SoftScene {
    fn default() -> Self {
        Self {
            frame_size: [400, 300],
            view: ViewTransform::default(),
            limits: SceneLimits::default(),
            labels: AxisLabels::default(),
            surfaces: Vec::new(),
            lines: Vec::new(),
            annotations: Vec::new(),
            color_legend: None,
            marker_size_px: 7,
            destroyed: Arc::default(),
        }
    }
}

impl SoftScene {
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        let scene: Self = serde_json::from_str(&data)?;
        for (i, grid) in scene.surfaces.iter().enumerate() {
            grid.validate()
                .map_err(|e| format!("surface {i}: {e}"))?;
        }
        Ok(scene)
    }

    /// Number of working copies destroyed so far.
    pub fn destroy_count(&self) -> usize {
        self.destroyed.load(Ordering::SeqCst)
    }
}

impl SceneSource for SoftScene {
    type Working = SoftWorkingScene;

    fn duplicate(&self) -> Result<SoftWorkingScene, HostError> {
        Ok(SoftWorkingScene {
            scene: self.clone(),
            removed: Vec::new(),
            decorations: true,
            marker: None,
            hidden: Vec::new(),
            destroyed: false,
        })
    }
}

/// Working copy of a [`SoftScene`].
#[derive(Debug)]
pub struct SoftWorkingScene {
    scene: SoftScene,
    removed: Vec<ChildId>,
    decorations: bool,
    marker: Option<DataPoint>,
    hidden: Vec<PrimitiveId>,
    destroyed: bool,
}

impl SoftWorkingScene {
    fn surface_id(&self, index: usize) -> PrimitiveId {
        PrimitiveId(index)
    }

    fn line_id(&self, index: usize) -> PrimitiveId {
        PrimitiveId(self.scene.surfaces.len() + index)
    }

    fn is_visible(&self, id: PrimitiveId) -> bool {
        !self.hidden.contains(&id)
    }

    fn legend_shown(&self) -> bool {
        self.scene.color_legend.is_some() && !self.removed.contains(&LEGEND_CHILD)
    }

    fn annotation_shown(&self, index: usize) -> bool {
        !self
            .removed
            .contains(&ChildId(FIRST_ANNOTATION_CHILD + index))
    }

    fn data_extents(&self) -> Option<DataExtents> {
        union_extents(self.primitives().into_iter().filter_map(|p| p.extents))
    }

    /// Box drawn by the renderer: limits, else data, else `[0, 1]`.
    fn plot_box(&self) -> BoundingBox {
        let data = self.data_extents();
        let range = |axis: Axis| {
            let extent = data
                .map(|d| d.axis(axis))
                .unwrap_or(ResolvedRange::new(0.0, 1.0));
            self.scene.limits.get(axis).resolve_with(extent)
        };
        BoundingBox::new(range(Axis::X), range(Axis::Y), range(Axis::Z))
    }

    /// Color limits for surface shading.
    fn color_range(&self) -> ResolvedRange {
        if let Some([min, max]) = self.scene.color_legend.as_ref().and_then(|l| l.range) {
            return ResolvedRange::new(min, max);
        }
        union_extents(self.scene.surfaces.iter().filter_map(SurfaceGrid::extents))
            .map(|d| d.z)
            .unwrap_or_else(|| self.plot_box().z)
    }

    fn check_alive(&self) -> Result<(), HostError> {
        if self.destroyed {
            return Err(HostError::new("working scene was already destroyed"));
        }
        Ok(())
    }
}

impl WorkingScene for SoftWorkingScene {
    fn axis_limits(&self, axis: Axis) -> AxisLimits {
        self.scene.limits.get(axis)
    }

    fn set_axis_limits(&mut self, axis: Axis, range: ResolvedRange) {
        *self.scene.limits.get_mut(axis) = AxisLimits::explicit(range.min, range.max);
    }

    fn view(&self) -> ViewTransform {
        self.scene.view
    }

    fn axis_label(&self, axis: Axis) -> String {
        self.scene.labels.get(axis).to_string()
    }

    fn primitives(&self) -> Vec<PrimitiveInfo> {
        let surfaces = self.scene.surfaces.iter().enumerate().map(|(i, g)| PrimitiveInfo {
            id: self.surface_id(i),
            kind: PrimitiveKind::Surface,
            extents: g.validate().ok().and_then(|_| g.extents()),
        });
        let lines = self.scene.lines.iter().enumerate().map(|(i, l)| PrimitiveInfo {
            id: self.line_id(i),
            kind: PrimitiveKind::Line,
            extents: l.extents(),
        });
        surfaces.chain(lines).collect()
    }

    fn surface_grid(&self, id: PrimitiveId) -> Option<SurfaceGrid> {
        self.scene.surfaces.get(id.0).cloned()
    }

    fn color_legend(&self) -> Option<ColorLegend> {
        if !self.legend_shown() {
            return None;
        }
        let legend = self.scene.color_legend.as_ref()?;
        Some(ColorLegend {
            label: legend.label.clone(),
            range: self.color_range(),
        })
    }

    fn children(&self) -> Vec<SceneChild> {
        let mut children = vec![SceneChild {
            id: AXES_CHILD,
            kind: ChildKind::Axes,
        }];
        if self.legend_shown() {
            children.push(SceneChild {
                id: LEGEND_CHILD,
                kind: ChildKind::ColorLegend,
            });
        }
        children.extend(
            (0..self.scene.annotations.len())
                .filter(|&i| self.annotation_shown(i))
                .map(|i| SceneChild {
                    id: ChildId(FIRST_ANNOTATION_CHILD + i),
                    kind: ChildKind::Other,
                }),
        );
        children
    }

    fn remove_child(&mut self, id: ChildId) -> Result<(), HostError> {
        let exists = self.children().iter().any(|c| c.id == id);
        if !exists {
            return Err(HostError::new(format!("no child with id {}", id.0)));
        }
        if id == AXES_CHILD {
            return Err(HostError::new("the plot axes cannot be removed"));
        }
        self.removed.push(id);
        Ok(())
    }

    fn set_axes_decorations(&mut self, visible: bool) {
        self.decorations = visible;
    }

    fn set_marker(&mut self, point: Option<DataPoint>) {
        self.marker = point;
    }

    fn set_visibility(&mut self, id: PrimitiveId, visible: bool) {
        self.hidden.retain(|&h| h != id);
        if !visible {
            self.hidden.push(id);
        }
    }

    fn capture_frame(&mut self) -> Result<RgbImage, HostError> {
        self.check_alive()?;
        Ok(raster::render(self, 1.0))
    }

    fn render_export(&mut self, scale: f64) -> Result<RgbImage, HostError> {
        self.check_alive()?;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(HostError::new(format!("invalid export scale {scale}")));
        }
        Ok(raster::render(self, scale))
    }

    fn destroy(&mut self) {
        self.destroyed = true;
        self.scene.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}
