//! High-level calibration API.
//!
//! [`Calibrator`] is the entry point for calibrating a plot raster against
//! its vector overlay. It wraps a [`CalibrationConfig`] and runs one pass per
//! call on a fresh duplicate of the caller's scene.

use image::RgbImage;

use crate::config::CalibrationConfig;
use crate::error::CalibrateError;
use crate::pipeline::{self, CalibrationResult};
use crate::scene::SceneSource;

/// Primary calibration interface.
///
/// Create once, calibrate many scenes.
///
/// # Examples
///
/// ```no_run
/// use rasteranchor::{Calibrator, SoftScene};
/// use std::path::Path;
///
/// let scene = SoftScene::from_json_file(Path::new("crates/rasteranchor/examples/helix.json")).unwrap();
/// let result = Calibrator::new().calibrate(&scene).unwrap();
/// for pair in &result.pairs {
///     println!("{} => ({:.2}, {:.2})", pair.data, pair.position.x, pair.position.y);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Calibrator {
    config: CalibrationConfig,
}

impl Calibrator {
    /// Calibrator with default screen resolution and box-corner anchors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with full config control.
    pub fn with_config(config: CalibrationConfig) -> Self {
        Self { config }
    }

    /// Access the current configuration.
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Mutable access to configuration for post-construction tuning.
    pub fn config_mut(&mut self) -> &mut CalibrationConfig {
        &mut self.config
    }

    /// Compute the data-to-physical correspondences of `scene`.
    pub fn calibrate<S: SceneSource + ?Sized>(
        &self,
        scene: &S,
    ) -> Result<CalibrationResult, CalibrateError> {
        Ok(pipeline::run(scene, &self.config, false)?.result)
    }

    /// Like [`calibrate`](Self::calibrate), and also render the export raster
    /// at `export_dpi`. With `debug` set, detected centroids are drawn on it.
    pub fn calibrate_with_raster<S: SceneSource + ?Sized>(
        &self,
        scene: &S,
    ) -> Result<(CalibrationResult, RgbImage), CalibrateError> {
        let output = pipeline::run(scene, &self.config, true)?;
        let raster = output
            .raster
            .ok_or_else(|| CalibrateError::InvalidConfig("export raster was not rendered".into()))?;
        Ok((output.result, raster))
    }
}
