//! Surface-point anchor selection.
//!
//! Anchors are sampled from a fixed layout over the surface's parameter grid:
//! the four grid corners, the four edge midpoints, the grid centroid, and one
//! extremal cell (the global z maximum, or the global z minimum when the
//! maximum already sits on the layout). Midpoints use the 1-based rule
//! `round(n / 2)`, rounding halves away from zero.

use crate::error::SelectionError;
use crate::geometry::{BoundingBox, DataExtents, DataPoint};
use crate::view::{ProjectedClasses, ViewTransform};

use super::{Anchor, AnchorOrigin};

/// Upper bound on anchors in surface-point mode.
pub const MAX_SURFACE_ANCHORS: usize = 10;

/// Row-major parameter grid of a surface, one `(x, y, z)` sample per cell.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SurfaceGrid {
    pub rows: usize,
    pub cols: usize,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl SurfaceGrid {
    pub fn new(
        rows: usize,
        cols: usize,
        x: Vec<f64>,
        y: Vec<f64>,
        z: Vec<f64>,
    ) -> Result<Self, SelectionError> {
        let grid = Self { rows, cols, x, y, z };
        grid.validate()?;
        Ok(grid)
    }

    /// Sample `f(x, y)` on the tensor grid `xs` (columns) by `ys` (rows).
    pub fn from_fn(xs: &[f64], ys: &[f64], f: impl Fn(f64, f64) -> f64) -> Self {
        let mut x = Vec::with_capacity(xs.len() * ys.len());
        let mut y = Vec::with_capacity(x.capacity());
        let mut z = Vec::with_capacity(x.capacity());
        for &yv in ys {
            for &xv in xs {
                x.push(xv);
                y.push(yv);
                z.push(f(xv, yv));
            }
        }
        Self {
            rows: ys.len(),
            cols: xs.len(),
            x,
            y,
            z,
        }
    }

    pub fn validate(&self) -> Result<(), SelectionError> {
        let n = self.rows * self.cols;
        if n == 0 || self.x.len() != n || self.y.len() != n || self.z.len() != n {
            return Err(SelectionError::InvalidGrid {
                rows: self.rows,
                cols: self.cols,
                len: self.z.len(),
            });
        }
        Ok(())
    }

    fn index(&self, cell: GridCell) -> Option<usize> {
        (cell.row < self.rows && cell.col < self.cols).then(|| cell.row * self.cols + cell.col)
    }

    /// Sample at `cell`, `None` outside the grid or past the sample vectors.
    pub fn point(&self, cell: GridCell) -> Option<DataPoint> {
        let i = self.index(cell)?;
        Some(DataPoint::new(*self.x.get(i)?, *self.y.get(i)?, *self.z.get(i)?))
    }

    pub fn extents(&self) -> Option<DataExtents> {
        DataExtents::from_values(&self.x, &self.y, &self.z)
    }

    fn cell_of(&self, index: usize) -> GridCell {
        GridCell {
            row: index / self.cols,
            col: index % self.cols,
        }
    }

    /// First cell (row-major) holding the best finite z under `better`.
    fn extremal_cell(&self, better: impl Fn(f64, f64) -> bool) -> Option<GridCell> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &z) in self.z.iter().enumerate() {
            if !z.is_finite() {
                continue;
            }
            match best {
                Some((_, b)) if !better(z, b) => {}
                _ => best = Some((i, z)),
            }
        }
        best.map(|(i, _)| self.cell_of(i))
    }

    pub fn argmax_z(&self) -> Option<GridCell> {
        self.extremal_cell(|z, best| z > best)
    }

    pub fn argmin_z(&self) -> Option<GridCell> {
        self.extremal_cell(|z, best| z < best)
    }
}

/// Zero-based grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
}

impl GridCell {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Role of a cell in the surface layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridRole {
    Corner,
    EdgeMidpoint,
    Centroid,
    Maximum,
    Minimum,
}

/// Zero-based index of the 1-based midpoint `round(n / 2)`.
fn midpoint_index(n: usize) -> usize {
    ((n as f64 / 2.0).round() as usize).max(1) - 1
}

/// Candidate cells in layout order, before duplicate removal.
pub fn surface_layout(grid: &SurfaceGrid) -> Result<Vec<(GridCell, GridRole)>, SelectionError> {
    grid.validate()?;
    let last_row = grid.rows - 1;
    let last_col = grid.cols - 1;
    let mid_row = midpoint_index(grid.rows);
    let mid_col = midpoint_index(grid.cols);

    let mut layout = vec![
        (GridCell::new(0, 0), GridRole::Corner),
        (GridCell::new(0, last_col), GridRole::Corner),
        (GridCell::new(last_row, 0), GridRole::Corner),
        (GridCell::new(last_row, last_col), GridRole::Corner),
        (GridCell::new(0, mid_col), GridRole::EdgeMidpoint),
        (GridCell::new(last_row, mid_col), GridRole::EdgeMidpoint),
        (GridCell::new(mid_row, 0), GridRole::EdgeMidpoint),
        (GridCell::new(mid_row, last_col), GridRole::EdgeMidpoint),
        (GridCell::new(mid_row, mid_col), GridRole::Centroid),
    ];

    let on_layout = |cell: GridCell, layout: &[(GridCell, GridRole)]| {
        layout.iter().any(|(c, _)| *c == cell)
    };
    let extremum = grid
        .argmax_z()
        .filter(|&c| !on_layout(c, &layout))
        .map(|c| (c, GridRole::Maximum))
        .or_else(|| {
            grid.argmin_z()
                .filter(|&c| !on_layout(c, &layout))
                .map(|c| (c, GridRole::Minimum))
        });
    layout.extend(extremum);
    Ok(layout)
}

/// Choose up to [`MAX_SURFACE_ANCHORS`] distinct anchors on `grid`.
///
/// Layout cells that repeat an earlier cell, hold non-finite data, or project
/// onto an already chosen anchor's location are skipped.
pub fn select_surface_anchors(
    grid: &SurfaceGrid,
    bbox: &BoundingBox,
    view: &ViewTransform,
    tolerance: f64,
) -> Result<Vec<Anchor>, SelectionError> {
    let layout = surface_layout(grid)?;

    let mut anchors: Vec<Anchor> = Vec::with_capacity(MAX_SURFACE_ANCHORS);
    for (cell, role) in layout {
        if anchors.len() == MAX_SURFACE_ANCHORS {
            break;
        }
        let seen = anchors
            .iter()
            .any(|a| matches!(a.origin, AnchorOrigin::Grid { cell: c, .. } if c == cell));
        if seen {
            continue;
        }
        let Some(point) = grid.point(cell).filter(DataPoint::is_finite) else {
            tracing::debug!(?cell, ?role, "skipping surface cell with non-finite data");
            continue;
        };

        let mut positions: Vec<_> = anchors
            .iter()
            .map(|a| view.project(&bbox.normalized(&a.point)))
            .collect();
        positions.push(view.project(&bbox.normalized(&point)));
        let classes = ProjectedClasses::group(positions, tolerance);
        if classes.n_classes() < classes.len() {
            tracing::warn!(
                ?cell,
                ?role,
                "surface anchor projects onto an earlier anchor; dropping it"
            );
            continue;
        }

        anchors.push(Anchor {
            point,
            origin: AnchorOrigin::Grid { cell, role },
        });
    }

    if anchors.is_empty() {
        return Err(SelectionError::EmptyGrid);
    }
    Ok(anchors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ResolvedRange;

    const TOL: f64 = 1e-9;

    fn ramp_grid() -> SurfaceGrid {
        let axis: Vec<f64> = (0..10).map(f64::from).collect();
        SurfaceGrid::from_fn(&axis, &axis, |x, y| x + y)
    }

    fn ramp_box() -> BoundingBox {
        BoundingBox::new(
            ResolvedRange::new(0.0, 9.0),
            ResolvedRange::new(0.0, 9.0),
            ResolvedRange::new(0.0, 18.0),
        )
    }

    fn cells(anchors: &[Anchor]) -> Vec<(GridCell, GridRole)> {
        anchors
            .iter()
            .map(|a| match a.origin {
                AnchorOrigin::Grid { cell, role } => (cell, role),
                AnchorOrigin::Corner { .. } => panic!("unexpected corner anchor"),
            })
            .collect()
    }

    #[test]
    fn midpoint_follows_one_based_rounding() {
        assert_eq!(midpoint_index(1), 0);
        assert_eq!(midpoint_index(2), 0);
        assert_eq!(midpoint_index(3), 1);
        assert_eq!(midpoint_index(10), 4);
        assert_eq!(midpoint_index(11), 5);
    }

    #[test]
    fn ramp_extremes_fall_on_corners() {
        let grid = ramp_grid();
        assert_eq!(grid.argmax_z(), Some(GridCell::new(9, 9)));
        assert_eq!(grid.point(GridCell::new(9, 9)).map(|p| p.z), Some(18.0));
        assert_eq!(grid.argmin_z(), Some(GridCell::new(0, 0)));

        let anchors =
            select_surface_anchors(&grid, &ramp_box(), &ViewTransform::default(), TOL).expect("anchors");
        let cells = cells(&anchors);
        assert_eq!(cells.len(), 9);
        assert!(cells.contains(&(GridCell::new(9, 9), GridRole::Corner)));
        assert!(cells.contains(&(GridCell::new(0, 0), GridRole::Corner)));
        assert_eq!(cells[8], (GridCell::new(4, 4), GridRole::Centroid));
        assert_eq!(anchors[8].point, DataPoint::new(4.0, 4.0, 8.0));
    }

    #[test]
    fn interior_maximum_takes_tenth_slot() {
        let axis: Vec<f64> = (0..7).map(f64::from).collect();
        let grid = SurfaceGrid::from_fn(&axis, &axis, |x, y| -((x - 1.0).powi(2) + (y - 5.0).powi(2)));
        let bbox = BoundingBox::new(
            ResolvedRange::new(0.0, 6.0),
            ResolvedRange::new(0.0, 6.0),
            ResolvedRange::new(-61.0, 0.0),
        );
        let anchors = select_surface_anchors(&grid, &bbox, &ViewTransform::default(), TOL).expect("anchors");
        assert_eq!(anchors.len(), MAX_SURFACE_ANCHORS);
        assert_eq!(
            cells(&anchors)[9],
            (GridCell::new(5, 1), GridRole::Maximum)
        );
    }

    #[test]
    fn maximum_on_layout_yields_minimum() {
        let axis: Vec<f64> = (0..5).map(f64::from).collect();
        // Maximum at a corner, minimum strictly inside.
        let grid = SurfaceGrid::from_fn(&axis, &axis, |x, y| {
            if x == 1.0 && y == 3.0 {
                -10.0
            } else {
                x * y
            }
        });
        let layout = surface_layout(&grid).expect("layout");
        assert_eq!(layout.len(), 10);
        assert_eq!(layout[9], (GridCell::new(3, 1), GridRole::Minimum));
    }

    #[test]
    fn single_row_grid_drops_repeated_cells() {
        let grid = SurfaceGrid::from_fn(&[0.0, 1.0, 2.0], &[0.0], |x, _| x * x);
        let bbox = BoundingBox::new(
            ResolvedRange::new(0.0, 2.0),
            ResolvedRange::new(-1.0, 1.0),
            ResolvedRange::new(0.0, 4.0),
        );
        let anchors = select_surface_anchors(&grid, &bbox, &ViewTransform::default(), TOL).expect("anchors");
        assert_eq!(anchors.len(), 3);
    }

    #[test]
    fn non_finite_cells_are_skipped() {
        let mut grid = ramp_grid();
        grid.z[0] = f64::NAN;
        let anchors =
            select_surface_anchors(&grid, &ramp_box(), &ViewTransform::default(), TOL).expect("anchors");
        assert!(anchors.iter().all(|a| a.point.is_finite()));
        // The NaN corner is gone, so the minimum moves to the tenth slot.
        assert_eq!(anchors.len(), 9);
        assert_eq!(
            cells(&anchors).last(),
            Some(&(GridCell::new(0, 1), GridRole::Minimum))
        );
    }

    #[test]
    fn top_view_drops_anchors_sharing_a_location() {
        // All cells share (x, y); only z differs, so a top view collapses them.
        let grid = SurfaceGrid::new(
            2,
            2,
            vec![1.0; 4],
            vec![1.0; 4],
            vec![0.0, 1.0, 2.0, 3.0],
        )
        .expect("grid");
        let bbox = BoundingBox::new(
            ResolvedRange::new(0.0, 2.0),
            ResolvedRange::new(0.0, 2.0),
            ResolvedRange::new(0.0, 3.0),
        );
        let anchors =
            select_surface_anchors(&grid, &bbox, &ViewTransform::new(0.0, 90.0), TOL).expect("anchors");
        assert_eq!(anchors.len(), 1);
    }

    #[test]
    fn inconsistent_grid_is_rejected() {
        let err = SurfaceGrid::new(2, 3, vec![0.0; 6], vec![0.0; 6], vec![0.0; 5]).expect_err("bad grid");
        assert_eq!(
            err,
            SelectionError::InvalidGrid {
                rows: 2,
                cols: 3,
                len: 5
            }
        );
    }

    #[test]
    fn empty_grid_layout_is_an_error() {
        let grid = SurfaceGrid::from_fn(&[], &[0.0, 1.0], |x, y| x + y);
        assert_eq!(
            surface_layout(&grid),
            Err(SelectionError::InvalidGrid {
                rows: 2,
                cols: 0,
                len: 0
            })
        );
        assert!(select_surface_anchors(&grid, &ramp_box(), &ViewTransform::default(), TOL).is_err());
    }

    #[test]
    fn cells_outside_the_grid_have_no_point() {
        let grid = ramp_grid();
        assert!(grid.point(GridCell::new(10, 0)).is_none());
        assert!(grid.point(GridCell::new(0, 10)).is_none());

        let short = SurfaceGrid {
            z: vec![0.0; 3],
            ..SurfaceGrid::from_fn(&[0.0, 1.0], &[0.0, 1.0], |_, _| 0.0)
        };
        assert!(short.point(GridCell::new(1, 1)).is_none());
    }
}
