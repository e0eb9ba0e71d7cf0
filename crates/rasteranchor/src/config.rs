use std::path::Path;

use crate::error::CalibrateError;
use crate::mapping::PhysicalScale;
use crate::scene::PrimitiveId;

/// TeX points per inch.
pub const TEX_POINTS_PER_INCH: f64 = 72.27;

/// What the calibration anchors are taken from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CalibrationTarget {
    /// Four corners of the plot box.
    #[default]
    BoundingBox,
    /// Grid points of one surface. `None` picks the only surface in the scene.
    Surface {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<PrimitiveId>,
    },
}

/// Calibration pass configuration.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Screen pixels per inch of the host display.
    pub screen_ppi: f64,
    /// Size of one output unit in inches (default: one TeX point).
    pub unit_ratio: f64,
    /// Resolution of the exported raster.
    pub export_dpi: f64,
    /// Anchor strategy.
    pub target: CalibrationTarget,
    /// Explicit box-corner indices (`0..8`), bypassing automatic selection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_override: Option<Vec<usize>>,
    /// Tolerance for treating two projected points as coincident, in unit-cube units.
    pub projection_tolerance: f64,
    /// Draw detected centroids onto the exported raster.
    pub debug: bool,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            screen_ppi: 96.0,
            unit_ratio: 1.0 / TEX_POINTS_PER_INCH,
            export_dpi: 300.0,
            target: CalibrationTarget::default(),
            anchor_override: None,
            projection_tolerance: 1e-9,
            debug: false,
        }
    }
}

impl CalibrationConfig {
    /// Load a configuration from JSON; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn scale(&self) -> PhysicalScale {
        PhysicalScale::new(self.screen_ppi, self.unit_ratio)
    }

    /// Export raster scale relative to the screen frame.
    pub fn export_scale(&self) -> f64 {
        self.export_dpi / self.screen_ppi
    }

    pub fn validate(&self) -> Result<(), CalibrateError> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(CalibrateError::InvalidConfig(format!(
                    "{name} must be finite and positive, got {v}"
                )))
            }
        };
        positive("screen_ppi", self.screen_ppi)?;
        positive("unit_ratio", self.unit_ratio)?;
        positive("export_dpi", self.export_dpi)?;
        if !(self.projection_tolerance.is_finite() && self.projection_tolerance >= 0.0) {
            return Err(CalibrateError::InvalidConfig(format!(
                "projection_tolerance must be finite and non-negative, got {}",
                self.projection_tolerance
            )));
        }
        if self.anchor_override.is_some()
            && matches!(self.target, CalibrationTarget::Surface { .. })
        {
            return Err(CalibrateError::InvalidConfig(
                "anchor_override applies to bounding-box calibration only".to_string(),
            ));
        }
        Ok(())
    }
}
