//! Serialization of calibration results for downstream renderers.

mod pgfplots;

use std::path::Path;

pub use pgfplots::PgfplotsWriter;

use crate::pipeline::CalibrationResult;

/// Turns a calibration result into a text artifact referencing the raster.
pub trait CalibrationExporter {
    /// Render the artifact; `image_ref` is how the artifact names the raster file.
    fn render(&self, result: &CalibrationResult, image_ref: &str) -> String;

    fn write_file(
        &self,
        result: &CalibrationResult,
        image_ref: &str,
        path: &Path,
    ) -> std::io::Result<()> {
        std::fs::write(path, self.render(result, image_ref))
    }
}
