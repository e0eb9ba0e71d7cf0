//! Calibration pass pipeline.
//!
//! Stage order on the working copy:
//! prepare (strip legends, annotations, decorations) → resolve geometry →
//! select anchors → render and detect one marker per anchor → map to
//! physical units → order the correspondences.
//!
//! Algorithmic pieces live in `crate::anchor`, `crate::locate`,
//! `crate::mapping` and `crate::ordering`; this layer fixes call order and
//! scene state between stages.

mod detect;
mod prepare;
mod result;
mod run;

pub use result::{AxisSummary, CalibrationPair, CalibrationResult, ColorScaleRange};

pub(crate) use run::{run, PassOutput};
