//! Marker footprint detection in captured frames.
//!
//! The marker fill is the only pure-black content of a calibration frame.
//! Pixels qualify when the sum of their three channels is exactly zero, so
//! anti-aliased edge pixels never count. The centroid is the rounded midpoint
//! of the footprint's row and column extents.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::region_labelling::{connected_components, Connectivity};

use crate::error::LocateError;

/// Pixel location, origin top-left, rows growing downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PixelCentroid {
    pub row: u32,
    pub col: u32,
}

impl PixelCentroid {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// Inclusive pixel bounds of a footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PixelBounds {
    pub row_min: u32,
    pub row_max: u32,
    pub col_min: u32,
    pub col_max: u32,
}

impl PixelBounds {
    fn single(row: u32, col: u32) -> Self {
        Self {
            row_min: row,
            row_max: row,
            col_min: col,
            col_max: col,
        }
    }

    fn include(&mut self, row: u32, col: u32) {
        self.row_min = self.row_min.min(row);
        self.row_max = self.row_max.max(row);
        self.col_min = self.col_min.min(col);
        self.col_max = self.col_max.max(col);
    }

    /// Midpoint of each extent, halves rounded up.
    pub fn midpoint(&self) -> PixelCentroid {
        let mid = |lo: u32, hi: u32| ((lo as f64 + hi as f64) / 2.0).round() as u32;
        PixelCentroid::new(
            mid(self.row_min, self.row_max),
            mid(self.col_min, self.col_max),
        )
    }
}

/// A detected marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MarkerFootprint {
    pub centroid: PixelCentroid,
    pub bounds: PixelBounds,
    pub n_pixels: usize,
}

#[inline]
pub fn is_marker_pixel(p: &Rgb<u8>) -> bool {
    p.0.iter().map(|&c| c as u16).sum::<u16>() == 0
}

/// Count 8-connected foreground regions of `mask`.
fn count_regions(mask: &GrayImage) -> usize {
    connected_components(mask, Connectivity::Eight, Luma([0u8]))
        .pixels()
        .map(|p| p.0[0])
        .max()
        .unwrap_or(0) as usize
}

/// Find the single marker footprint in `frame`.
///
/// Fails when no pure-black pixel exists, or when the black pixels form more
/// than one 8-connected region.
pub fn locate_marker(frame: &RgbImage) -> Result<MarkerFootprint, LocateError> {
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return Err(LocateError::EmptyFrame { width, height });
    }

    let mut mask = GrayImage::new(width, height);
    let mut bounds: Option<PixelBounds> = None;
    let mut n_pixels = 0usize;

    for (col, row, p) in frame.enumerate_pixels() {
        if !is_marker_pixel(p) {
            continue;
        }
        mask.put_pixel(col, row, Luma([255]));
        n_pixels += 1;
        match bounds.as_mut() {
            Some(b) => b.include(row, col),
            None => bounds = Some(PixelBounds::single(row, col)),
        }
    }

    let bounds = bounds.ok_or(LocateError::MarkerNotFound)?;
    let regions = count_regions(&mask);
    if regions > 1 {
        return Err(LocateError::AmbiguousMarker { regions });
    }

    Ok(MarkerFootprint {
        centroid: bounds.midpoint(),
        bounds,
        n_pixels,
    })
}
