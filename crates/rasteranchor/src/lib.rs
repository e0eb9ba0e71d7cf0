//! rasteranchor: calibrate a rasterized 3D plot against its vector overlay.
//!
//! A 3D surface plot is rasterized while its axes, labels and legend are
//! typeset as vector graphics. The raster only lines up with the vector
//! axes if the renderer knows where a few data points land in the image.
//! This crate finds those correspondences by rendering a marker at chosen
//! anchor points and detecting it in captured frames.
//!
//! Pass stages:
//!
//! 1. **Prepare** – duplicate the scene, strip legends and annotations,
//!    hide axis decorations.
//! 2. **Geometry** – resolve axis limits into the plot bounding box.
//! 3. **Anchors** – four visually distinct box corners, or up to ten
//!    surface grid points.
//! 4. **Locate** – render the marker per anchor, find its pixel centroid.
//! 5. **Map** – pixel centroids to physical units, origin bottom-left.
//! 6. **Order** – first two pairs differ in both physical coordinates.
//!
//! # Public API
//! - [`Calibrator`] and [`CalibrationConfig`] as entry points
//! - [`SceneSource`] / [`WorkingScene`] as the host capability seam
//! - [`SoftScene`] as a software reference host
//! - [`PgfplotsWriter`] to serialize a [`CalibrationResult`]

mod anchor;
mod calibrator;
mod config;
mod debug_overlay;
mod error;
mod export;
mod geometry;
mod locate;
mod mapping;
mod ordering;
mod pipeline;
mod scene;
mod soft;
mod view;

#[cfg(test)]
pub(crate) mod test_utils;

pub use anchor::{
    corner_classes, corner_parity_subsets, select_box_anchors, select_surface_anchors,
    surface_layout, Anchor, AnchorMode, AnchorOrigin, BoxCornerSelection, GridCell, GridRole,
    SurfaceGrid, BOX_ANCHOR_COUNT, MAX_SURFACE_ANCHORS,
};
pub use calibrator::Calibrator;
pub use config::{CalibrationConfig, CalibrationTarget, TEX_POINTS_PER_INCH};
pub use debug_overlay::draw_centroids;
pub use error::{CalibrateError, LocateError, SelectionError};
pub use export::{CalibrationExporter, PgfplotsWriter};
pub use geometry::{
    extract_geometry, union_extents, Axis, AxisLimits, BoundingBox, DataExtents, DataPoint,
    ResolvedRange, SceneGeometry, N_CORNERS,
};
pub use locate::{locate_marker, MarkerFootprint, PixelBounds, PixelCentroid};
pub use mapping::{PhysicalPosition, PhysicalScale};
pub use ordering::{resolve_ordering, Ordering, OrderingStatus};
pub use pipeline::{AxisSummary, CalibrationPair, CalibrationResult, ColorScaleRange};
pub use scene::{
    ChildId, ChildKind, ColorLegend, HostError, PrimitiveId, PrimitiveInfo, PrimitiveKind,
    SceneChild, SceneSource, WorkingScene, WorkingSceneGuard,
};
pub use soft::{AxisLabels, SceneLimits, SoftAnnotation, SoftLegend, SoftLine, SoftScene, SoftWorkingScene};
pub use view::{ProjectedClasses, ViewTransform};
