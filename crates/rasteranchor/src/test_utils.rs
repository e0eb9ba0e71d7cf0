//! Shared fixtures for unit tests: synthetic frames and small scenes.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::anchor::SurfaceGrid;
use crate::geometry::AxisLimits;
use crate::soft::{SoftLine, SoftScene};

pub(crate) fn white_frame(w: u32, h: u32) -> RgbImage {
    RgbImage::from_pixel(w, h, Rgb([255, 255, 255]))
}

/// Fill a `side`x`side` pure-black square with top-left pixel `(row0, col0)`.
pub(crate) fn black_square(frame: &mut RgbImage, row0: u32, col0: u32, side: u32) {
    draw_filled_rect_mut(
        frame,
        Rect::at(col0 as i32, row0 as i32).of_size(side, side),
        Rgb([0, 0, 0]),
    );
}

/// Explicit box x in [0, 10], y in [0, 5], z in [-1, 1] holding one 3D line.
pub(crate) fn line_scene() -> SoftScene {
    let mut scene = SoftScene::default();
    scene.limits.x = AxisLimits::explicit(0.0, 10.0);
    scene.limits.y = AxisLimits::explicit(0.0, 5.0);
    scene.limits.z = AxisLimits::explicit(-1.0, 1.0);
    scene.labels.x = "$t$".to_string();
    scene.labels.z = "$\\sin t$".to_string();
    let t: Vec<f64> = (0..=20).map(|i| i as f64 * 0.5).collect();
    scene.lines.push(SoftLine::new(
        t.clone(),
        t.iter().map(|v| v / 2.0).collect(),
        t.iter().map(|v| v.sin()).collect(),
    ));
    scene
}

/// 10x10 ramp `z = x + y` on the integer grid `0..10`, automatic limits.
pub(crate) fn ramp_surface_scene() -> SoftScene {
    let axis: Vec<f64> = (0..10).map(f64::from).collect();
    let mut scene = SoftScene::default();
    scene
        .surfaces
        .push(SurfaceGrid::from_fn(&axis, &axis, |x, y| x + y));
    scene
}
