//! Debug drawing of detected marker centroids onto an export raster.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

use crate::locate::PixelCentroid;

const CROSS_COLOR: Rgb<u8> = Rgb([220, 30, 30]);
const CROSS_ARM_PX: f64 = 5.0;

/// Draw a cross at each screen-frame centroid, scaled by `scale` into `raster`.
pub fn draw_centroids(raster: &mut RgbImage, centroids: &[PixelCentroid], scale: f64) {
    let arm = (CROSS_ARM_PX * scale).max(2.0) as f32;
    for c in centroids {
        let x = (c.col as f64 * scale) as f32;
        let y = (c.row as f64 * scale) as f32;
        draw_line_segment_mut(raster, (x - arm, y), (x + arm, y), CROSS_COLOR);
        draw_line_segment_mut(raster, (x, y - arm), (x, y + arm), CROSS_COLOR);
    }
}
