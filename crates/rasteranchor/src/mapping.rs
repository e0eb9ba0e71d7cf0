//! Pixel to physical-unit conversion.

use crate::locate::PixelCentroid;

/// Position in physical output units, origin bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PhysicalPosition {
    pub x: f64,
    pub y: f64,
}

impl PhysicalPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates differ from `other`'s.
    pub fn differs_in_both(&self, other: &PhysicalPosition) -> bool {
        self.x != other.x && self.y != other.y
    }
}

/// Screen resolution and output-unit ratio.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PhysicalScale {
    /// Screen pixels per screen unit (e.g. pixels per inch).
    pub screen_ppi: f64,
    /// Size of one output unit in screen units (e.g. inches per TeX point).
    pub unit_ratio: f64,
}

impl PhysicalScale {
    pub fn new(screen_ppi: f64, unit_ratio: f64) -> Self {
        Self {
            screen_ppi,
            unit_ratio,
        }
    }

    fn to_units(&self, pixels: f64) -> f64 {
        pixels / self.screen_ppi / self.unit_ratio
    }

    /// Convert a centroid in a frame `frame_height` pixels tall.
    pub fn to_physical(&self, centroid: PixelCentroid, frame_height: u32) -> PhysicalPosition {
        PhysicalPosition::new(
            self.to_units(centroid.col as f64),
            self.to_units(frame_height as f64 - centroid.row as f64),
        )
    }

    /// Physical size of a `[width, height]` pixel frame.
    pub fn frame_size(&self, frame_size: [u32; 2]) -> [f64; 2] {
        [
            self.to_units(frame_size[0] as f64),
            self.to_units(frame_size[1] as f64),
        ]
    }
}
