//! Host rendering capability interface.
//!
//! A calibration pass never touches the caller's scene. It asks a
//! [`SceneSource`] for an exclusively owned duplicate, mutates and renders
//! that [`WorkingScene`], and tears it down when the pass ends.
//!
//! Built-in implementation: [`SoftScene`](crate::soft::SoftScene), a software
//! rasterizer used by the CLI and the tests.

use std::fmt;
use std::ops::{Deref, DerefMut};

use image::RgbImage;

use crate::anchor::SurfaceGrid;
use crate::geometry::{Axis, AxisLimits, DataExtents, DataPoint, ResolvedRange};
use crate::view::ViewTransform;

/// Host handle of a plotted primitive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct PrimitiveId(pub usize);

impl fmt::Display for PrimitiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Surface,
    Line,
    Scatter,
    Other,
}

/// A plotted primitive and the extent of its data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimitiveInfo {
    pub id: PrimitiveId,
    pub kind: PrimitiveKind,
    /// `None` if the primitive holds no finite data.
    pub extents: Option<DataExtents>,
}

/// Host handle of a top-level child of the figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    /// The 3D axes holding the plotted data.
    Axes,
    /// A color legend (colorbar).
    ColorLegend,
    /// Anything else: annotations, 2D insets, UI widgets.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneChild {
    pub id: ChildId,
    pub kind: ChildKind,
}

/// Color legend as exposed by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorLegend {
    pub label: String,
    pub range: ResolvedRange,
}

/// Failure reported by the host renderer.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct HostError {
    message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A scene that can be duplicated for a calibration pass.
pub trait SceneSource {
    type Working: WorkingScene;

    /// Create an independent working copy. Each call must return fresh state.
    fn duplicate(&self) -> Result<Self::Working, HostError>;
}

/// Exclusively owned working copy of a scene.
///
/// All mutations are synchronous: a frame captured after a call observes it.
pub trait WorkingScene {
    fn axis_limits(&self, axis: Axis) -> AxisLimits;
    fn set_axis_limits(&mut self, axis: Axis, range: ResolvedRange);
    fn view(&self) -> ViewTransform;
    fn axis_label(&self, axis: Axis) -> String;

    fn primitives(&self) -> Vec<PrimitiveInfo>;
    /// Parameter grid of a surface primitive, `None` for other kinds.
    fn surface_grid(&self, id: PrimitiveId) -> Option<SurfaceGrid>;
    fn color_legend(&self) -> Option<ColorLegend>;

    fn children(&self) -> Vec<SceneChild>;
    fn remove_child(&mut self, id: ChildId) -> Result<(), HostError>;
    /// Show or hide the axis box, ticks, grid and labels.
    fn set_axes_decorations(&mut self, visible: bool);

    /// Move the calibration marker to `point`, or hide it with `None`.
    ///
    /// The marker is a fixed-size square with a pure-black fill and a white
    /// outline; no other pixel of a frame may be pure black.
    fn set_marker(&mut self, point: Option<DataPoint>);
    /// Toggle face, edge and point rendering of a primitive.
    fn set_visibility(&mut self, id: PrimitiveId, visible: bool);

    /// Rasterize the scene at screen resolution.
    fn capture_frame(&mut self) -> Result<RgbImage, HostError>;
    /// Rasterize the scene for export, `scale` times the screen resolution.
    fn render_export(&mut self, scale: f64) -> Result<RgbImage, HostError>;

    /// Release host resources held by this copy.
    fn destroy(&mut self);
}

/// Owns a working scene and destroys it exactly once.
///
/// Destruction happens on [`finish`](Self::finish) or on drop, whichever
/// comes first, so early returns and unwinding release the copy too.
pub struct WorkingSceneGuard<W: WorkingScene> {
    scene: W,
    destroyed: bool,
}

impl<W: WorkingScene> WorkingSceneGuard<W> {
    pub fn new(scene: W) -> Self {
        Self {
            scene,
            destroyed: false,
        }
    }

    pub fn finish(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.destroyed {
            self.destroyed = true;
            self.scene.destroy();
        }
    }
}

impl<W: WorkingScene> Deref for WorkingSceneGuard<W> {
    type Target = W;

    fn deref(&self) -> &W {
        &self.scene
    }
}

impl<W: WorkingScene> DerefMut for WorkingSceneGuard<W> {
    fn deref_mut(&mut self) -> &mut W {
        &mut self.scene
    }
}

impl<W: WorkingScene> Drop for WorkingSceneGuard<W> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::line_scene;

    #[test]
    fn guard_destroys_once_on_finish() {
        let scene = line_scene();
        let guard = WorkingSceneGuard::new(scene.duplicate().expect("duplicate"));
        guard.finish();
        assert_eq!(scene.destroy_count(), 1);
    }

    #[test]
    fn guard_destroys_on_early_return() {
        fn fails(scene: &crate::soft::SoftScene) -> Result<(), HostError> {
            let mut guard = WorkingSceneGuard::new(scene.duplicate()?);
            guard.set_marker(None);
            Err(HostError::new("capture failed"))
        }

        let scene = line_scene();
        assert!(fails(&scene).is_err());
        assert_eq!(scene.destroy_count(), 1);
    }

    #[test]
    fn duplicates_are_independent() {
        let scene = line_scene();
        let mut a = scene.duplicate().expect("duplicate");
        let b = scene.duplicate().expect("duplicate");
        a.set_axis_limits(Axis::X, ResolvedRange::new(-100.0, 100.0));
        assert_ne!(a.axis_limits(Axis::X), b.axis_limits(Axis::X));
        assert_eq!(b.axis_limits(Axis::X), scene.limits.x);
    }
}
