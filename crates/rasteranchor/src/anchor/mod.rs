//! Anchor selection: which data points carry the calibration correspondences.
//!
//! Two strategies exist:
//! - box corners: four corners of the plot box, for arbitrary 3D content;
//! - surface points: up to ten cells of a single surface's parameter grid.
//!
//! Both guarantee that no two anchors share a drawing-plane location under the
//! active view, so every marker frame is unambiguous.

mod box_corners;
mod surface_points;

pub use box_corners::{
    corner_classes, corner_parity_subsets, select_box_anchors, BoxCornerSelection,
    BOX_ANCHOR_COUNT,
};
pub use surface_points::{
    select_surface_anchors, surface_layout, GridCell, GridRole, SurfaceGrid,
    MAX_SURFACE_ANCHORS,
};

use crate::geometry::DataPoint;

/// Calibration strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorMode {
    BoxCorners,
    SurfacePoints,
}

/// Where an anchor was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AnchorOrigin {
    /// Bounding-box corner index (`0..8`).
    Corner { index: usize },
    /// Surface grid cell.
    Grid { cell: GridCell, role: GridRole },
}

/// A data-space point chosen to carry a correspondence.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Anchor {
    pub point: DataPoint,
    pub origin: AnchorOrigin,
}
