use thiserror::Error;

use crate::geometry::{Axis, DataPoint};
use crate::scene::{HostError, PrimitiveId};

/// Anchor selection failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SelectionError {
    #[error(
        "no box-corner subset projects to four distinct locations at azimuth {azimuth_deg}°, \
         elevation {elevation_deg}°; pass an explicit anchor override or change the view"
    )]
    NoDistinctSubset { azimuth_deg: f64, elevation_deg: f64 },
    #[error("anchor override must name exactly 4 corners, got {0}")]
    OverrideLength(usize),
    #[error("anchor override corner index {0} is out of range 0..8")]
    OverrideIndex(usize),
    #[error("anchor override repeats corner index {0}")]
    OverrideDuplicate(usize),
    #[error("scene contains no surface to calibrate")]
    NoSurface,
    #[error("scene contains {0} surfaces; name the one to calibrate")]
    MultipleSurfaces(usize),
    #[error("primitive {0} is not a surface")]
    NotASurface(PrimitiveId),
    #[error("surface grid is inconsistent: {rows}x{cols} cells but {len} values")]
    InvalidGrid { rows: usize, cols: usize, len: usize },
    #[error("surface grid has no cell with finite coordinates")]
    EmptyGrid,
}

/// Marker detection failures in a captured frame.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LocateError {
    #[error("frame is empty ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },
    #[error("no pure-black marker pixels in frame; the marker is occluded or outside the view")]
    MarkerNotFound,
    #[error("marker footprint is split into {regions} disjoint black regions")]
    AmbiguousMarker { regions: usize },
}

/// Errors that abort a calibration pass.
#[derive(Debug, Error)]
pub enum CalibrateError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("scene has no plotted data to resolve the {0} axis limits")]
    NoPlottedData(Axis),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("anchor {index} at {point}: {source}")]
    Locate {
        index: usize,
        point: DataPoint,
        #[source]
        source: LocateError,
    },
    #[error("host renderer: {0}")]
    Host(#[from] HostError),
}
