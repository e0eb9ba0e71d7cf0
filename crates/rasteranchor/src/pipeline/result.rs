use crate::anchor::{AnchorMode, AnchorOrigin};
use crate::geometry::{Axis, DataPoint, ResolvedRange};
use crate::locate::PixelCentroid;
use crate::mapping::{PhysicalPosition, PhysicalScale};
use crate::ordering::OrderingStatus;
use crate::view::ViewTransform;

/// One data-space to physical-space correspondence.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CalibrationPair {
    pub data: DataPoint,
    pub position: PhysicalPosition,
    /// Detected marker centroid in the screen frame.
    pub pixel: PixelCentroid,
    pub origin: AnchorOrigin,
}

/// Resolved range and label of one plot axis.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AxisSummary {
    pub axis: Axis,
    pub range: ResolvedRange,
    pub label: String,
}

/// Color-scale limits for the exported markup.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColorScaleRange {
    pub min: f64,
    pub max: f64,
    pub label: String,
    /// Taken from a color legend rather than the plotted data.
    pub from_legend: bool,
}

/// Output of a calibration pass.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CalibrationResult {
    /// Correspondences in final order.
    pub pairs: Vec<CalibrationPair>,
    pub axes: [AxisSummary; 3],
    pub color_scale: ColorScaleRange,
    pub view: ViewTransform,
    pub mode: AnchorMode,
    pub ordering: OrderingStatus,
    /// Screen frame `[width, height]` in pixels.
    pub frame_size: [u32; 2],
    pub scale: PhysicalScale,
    pub export_dpi: f64,
}

impl CalibrationResult {
    pub fn axis(&self, axis: Axis) -> &AxisSummary {
        &self.axes[axis.index()]
    }

    /// Frame `[width, height]` in output units.
    pub fn physical_frame_size(&self) -> [f64; 2] {
        self.scale.frame_size(self.frame_size)
    }

    pub fn data_points(&self) -> Vec<DataPoint> {
        self.pairs.iter().map(|p| p.data).collect()
    }

    pub fn positions(&self) -> Vec<PhysicalPosition> {
        self.pairs.iter().map(|p| p.position).collect()
    }
}
