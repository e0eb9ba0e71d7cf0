//! Orthographic rasterizer for [`SoftWorkingScene`].
//!
//! The plot box is drawn as the unit cube rotated by the view and scaled so
//! its projection always fits the frame. Surfaces are painted back to front.
//! Nothing except annotations and the marker fill is ever pure black.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;
use nalgebra::Vector2;

use crate::anchor::{GridCell, SurfaceGrid};
use crate::geometry::{BoundingBox, DataPoint, ResolvedRange, N_CORNERS};
use crate::view::ViewTransform;

use super::SoftWorkingScene;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const BOX_COLOR: Rgb<u8> = Rgb([160, 160, 160]);
const MARKER_FILL: Rgb<u8> = Rgb([0, 0, 0]);
const MARKER_OUTLINE: Rgb<u8> = Rgb([255, 255, 255]);
const ANNOTATION_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Share of the frame's short side covered by the projected unit cube's bounding circle.
const BOX_FILL: f64 = 0.9;

const COLORMAP: [[f64; 3]; 3] = [[53.0, 42.0, 135.0], [15.0, 174.0, 179.0], [249.0, 251.0, 14.0]];

/// Map from drawing-plane coordinates to pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FrameLayout {
    pub width: u32,
    pub height: u32,
    pixels_per_unit: f64,
}

impl FrameLayout {
    pub(crate) fn new(frame_size: [u32; 2], scale: f64) -> Self {
        let width = (frame_size[0] as f64 * scale).round() as u32;
        let height = (frame_size[1] as f64 * scale).round() as u32;
        Self {
            width,
            height,
            pixels_per_unit: BOX_FILL * width.min(height) as f64 / 3f64.sqrt(),
        }
    }

    /// Sub-pixel `(col, row)` of drawing-plane point `uv`.
    pub(crate) fn to_pixel(&self, uv: Vector2<f64>) -> (f64, f64) {
        (
            self.width as f64 / 2.0 + uv.x * self.pixels_per_unit,
            self.height as f64 / 2.0 - uv.y * self.pixels_per_unit,
        )
    }

    /// Nearest whole pixel `(row, col)` of `uv`.
    pub(crate) fn nearest_pixel(&self, uv: Vector2<f64>) -> (i32, i32) {
        let (col, row) = self.to_pixel(uv);
        (row.round() as i32, col.round() as i32)
    }
}

/// Three-stop colormap, `t` in `[0, 1]`.
fn colormap(t: f64) -> Rgb<u8> {
    let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
    let x = t * (COLORMAP.len() - 1) as f64;
    let i = (x.floor() as usize).min(COLORMAP.len() - 2);
    let f = x - i as f64;
    let (a, b) = (COLORMAP[i], COLORMAP[i + 1]);
    Rgb(std::array::from_fn(|c| (a[c] + (b[c] - a[c]) * f).round() as u8))
}

fn non_black(color: [u8; 3]) -> Rgb<u8> {
    if color == [0, 0, 0] {
        Rgb([40, 40, 40])
    } else {
        Rgb(color)
    }
}

struct Projector {
    layout: FrameLayout,
    bbox: BoundingBox,
    view: ViewTransform,
}

impl Projector {
    fn pixel(&self, p: &DataPoint) -> (f64, f64) {
        self.layout.to_pixel(self.view.project(&self.bbox.normalized(p)))
    }

    fn depth(&self, p: &DataPoint) -> f64 {
        self.view.depth(&self.bbox.normalized(p))
    }
}

struct Quad {
    corners: [(f64, f64); 4],
    depth: f64,
    color: Rgb<u8>,
}

fn fill_polygon(canvas: &mut RgbImage, corners: &[(f64, f64)], color: Rgb<u8>) {
    let mut points: Vec<Point<i32>> = Vec::with_capacity(corners.len());
    for &(x, y) in corners {
        let p = Point::new(x.round() as i32, y.round() as i32);
        if points.last() != Some(&p) {
            points.push(p);
        }
    }
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.len() >= 3 {
        draw_polygon_mut(canvas, &points, color);
    }
}

fn segment(canvas: &mut RgbImage, a: (f64, f64), b: (f64, f64), color: Rgb<u8>) {
    draw_line_segment_mut(canvas, (a.0 as f32, a.1 as f32), (b.0 as f32, b.1 as f32), color);
}

fn draw_box(canvas: &mut RgbImage, proj: &Projector) {
    for i in 0..N_CORNERS {
        for bit in 0..3 {
            if i & (1 << bit) == 0 {
                let a = proj.pixel(&proj.bbox.corner(i));
                let b = proj.pixel(&proj.bbox.corner(i | (1 << bit)));
                segment(canvas, a, b, BOX_COLOR);
            }
        }
    }
}

fn surface_quads(grid: &SurfaceGrid, proj: &Projector, colors: ResolvedRange, out: &mut Vec<Quad>) {
    for r in 0..grid.rows.saturating_sub(1) {
        for c in 0..grid.cols.saturating_sub(1) {
            let cells = [
                GridCell::new(r, c),
                GridCell::new(r, c + 1),
                GridCell::new(r + 1, c + 1),
                GridCell::new(r + 1, c),
            ];
            let [Some(p0), Some(p1), Some(p2), Some(p3)] = cells.map(|cell| grid.point(cell)) else {
                continue;
            };
            let pts = [p0, p1, p2, p3];
            if !pts.iter().all(DataPoint::is_finite) {
                continue;
            }
            let mean_z = pts.iter().map(|p| p.z).sum::<f64>() / 4.0;
            out.push(Quad {
                corners: pts.map(|p| proj.pixel(&p)),
                depth: pts.iter().map(|p| proj.depth(p)).sum::<f64>() / 4.0,
                color: colormap(colors.normalize(mean_z) + 0.5),
            });
        }
    }
}

/// Grids with a single row or column have no faces; draw them as polylines.
fn draw_surface_polyline(canvas: &mut RgbImage, grid: &SurfaceGrid, proj: &Projector, colors: ResolvedRange) {
    let cells: Vec<GridCell> = if grid.rows == 1 {
        (0..grid.cols).map(|c| GridCell::new(0, c)).collect()
    } else {
        (0..grid.rows).map(|r| GridCell::new(r, 0)).collect()
    };
    for pair in cells.windows(2) {
        let (Some(a), Some(b)) = (grid.point(pair[0]), grid.point(pair[1])) else {
            continue;
        };
        if a.is_finite() && b.is_finite() {
            let color = colormap(colors.normalize((a.z + b.z) / 2.0) + 0.5);
            segment(canvas, proj.pixel(&a), proj.pixel(&b), color);
        }
    }
}

fn draw_legend(canvas: &mut RgbImage) {
    let (w, h) = canvas.dimensions();
    let strip = (w / 40).max(2);
    let (col0, row0, row1) = (w.saturating_sub(2 * strip), h / 10, h - h / 10);
    if row1 <= row0 {
        return;
    }
    for row in row0..row1 {
        let t = 1.0 - (row - row0) as f64 / (row1 - row0) as f64;
        let color = colormap(t);
        for col in col0..(col0 + strip).min(w) {
            canvas.put_pixel(col, row, color);
        }
    }
}

fn draw_marker(canvas: &mut RgbImage, layout: &FrameLayout, uv: Vector2<f64>, size_px: u32) {
    let size = size_px.max(1) | 1;
    let half = (size / 2) as i32;
    let (row, col) = layout.nearest_pixel(uv);
    draw_filled_rect_mut(
        canvas,
        Rect::at(col.saturating_sub(half + 1), row.saturating_sub(half + 1)).of_size(size + 2, size + 2),
        MARKER_OUTLINE,
    );
    draw_filled_rect_mut(
        canvas,
        Rect::at(col.saturating_sub(half), row.saturating_sub(half)).of_size(size, size),
        MARKER_FILL,
    );
}

/// Rasterize `scene` at `scale` times its screen frame size.
pub(super) fn render(scene: &SoftWorkingScene, scale: f64) -> RgbImage {
    let layout = FrameLayout::new(scene.scene.frame_size, scale);
    let mut canvas = RgbImage::from_pixel(layout.width, layout.height, BACKGROUND);
    if layout.width == 0 || layout.height == 0 {
        return canvas;
    }

    let proj = Projector {
        layout,
        bbox: scene.plot_box(),
        view: scene.scene.view,
    };
    if scene.decorations {
        draw_box(&mut canvas, &proj);
    }

    let colors = scene.color_range();
    let mut quads = Vec::new();
    for (i, grid) in scene.scene.surfaces.iter().enumerate() {
        if !scene.is_visible(scene.surface_id(i)) || grid.validate().is_err() {
            continue;
        }
        if grid.rows < 2 || grid.cols < 2 {
            draw_surface_polyline(&mut canvas, grid, &proj, colors);
        } else {
            surface_quads(grid, &proj, colors, &mut quads);
        }
    }
    quads.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    for quad in &quads {
        fill_polygon(&mut canvas, &quad.corners, quad.color);
    }

    for (i, line) in scene.scene.lines.iter().enumerate() {
        if !scene.is_visible(scene.line_id(i)) {
            continue;
        }
        let color = non_black(line.color);
        let pts: Vec<DataPoint> = line.points().collect();
        for pair in pts.windows(2) {
            if pair[0].is_finite() && pair[1].is_finite() {
                segment(&mut canvas, proj.pixel(&pair[0]), proj.pixel(&pair[1]), color);
            }
        }
    }

    for (i, ann) in scene.scene.annotations.iter().enumerate() {
        let w = (ann.size_px[0] as f64 * scale).round() as u32;
        let h = (ann.size_px[1] as f64 * scale).round() as u32;
        if !scene.annotation_shown(i) || w == 0 || h == 0 {
            continue;
        }
        let x = (ann.position_px[0] as f64 * scale).round() as i32;
        let y = (ann.position_px[1] as f64 * scale).round() as i32;
        draw_filled_rect_mut(&mut canvas, Rect::at(x, y).of_size(w, h), ANNOTATION_COLOR);
    }

    if scene.legend_shown() {
        draw_legend(&mut canvas);
    }

    if let Some(point) = scene.marker.filter(DataPoint::is_finite) {
        let uv = proj.view.project(&proj.bbox.normalized(&point));
        let size = (scene.scene.marker_size_px as f64 * scale).round() as u32;
        draw_marker(&mut canvas, &layout, uv, size);
    }

    canvas
}
