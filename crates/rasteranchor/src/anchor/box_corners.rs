//! Box-corner anchor selection.
//!
//! The renderer consuming the correspondences interpolates along each axis,
//! so every axis needs an anchor pair that varies only in the two other
//! dimensions. The cube's two inscribed tetrahedra (corners of even and odd
//! index parity) are exactly the four-corner subsets with that property: any
//! two of their corners differ in exactly two coordinates.

use crate::error::SelectionError;
use crate::geometry::{BoundingBox, N_CORNERS};
use crate::view::{ProjectedClasses, ViewTransform};

use super::{Anchor, AnchorOrigin};

/// Number of anchors in box-corner mode.
pub const BOX_ANCHOR_COUNT: usize = 4;

/// The two parity classes of the corner indices: `[even, odd]`.
pub fn corner_parity_subsets() -> [[usize; BOX_ANCHOR_COUNT]; 2] {
    let mut subsets = [[0usize; BOX_ANCHOR_COUNT]; 2];
    let mut fill = [0usize; 2];
    for corner in 0..N_CORNERS {
        let parity = (corner.count_ones() % 2) as usize;
        subsets[parity][fill[parity]] = corner;
        fill[parity] += 1;
    }
    subsets
}

/// Group the eight corners by their projected location under `view`.
///
/// Projection is evaluated on the box normalized to the unit cube, which is
/// how the host draws the plot box regardless of the data aspect.
pub fn corner_classes(bbox: &BoundingBox, view: &ViewTransform, tolerance: f64) -> ProjectedClasses {
    let positions = bbox
        .corners()
        .iter()
        .map(|c| view.project(&bbox.normalized(c)))
        .collect();
    ProjectedClasses::group(positions, tolerance)
}

/// Outcome of box-corner selection.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxCornerSelection {
    /// Chosen corner indices, in anchor order.
    pub corners: Vec<usize>,
    /// Number of distinct projected classes among all eight corners.
    pub n_corner_classes: usize,
    /// The corners came from a caller override.
    pub overridden: bool,
}

impl BoxCornerSelection {
    pub fn anchors(&self, bbox: &BoundingBox) -> Vec<Anchor> {
        self.corners
            .iter()
            .map(|&index| Anchor {
                point: bbox.corner(index),
                origin: AnchorOrigin::Corner { index },
            })
            .collect()
    }
}

fn validate_override(corners: &[usize]) -> Result<(), SelectionError> {
    if corners.len() != BOX_ANCHOR_COUNT {
        return Err(SelectionError::OverrideLength(corners.len()));
    }
    for (i, &c) in corners.iter().enumerate() {
        if c >= N_CORNERS {
            return Err(SelectionError::OverrideIndex(c));
        }
        if corners[..i].contains(&c) {
            return Err(SelectionError::OverrideDuplicate(c));
        }
    }
    Ok(())
}

/// Choose four visually distinct box corners.
///
/// An override is taken verbatim (after range checks), bypassing the
/// distinctness test. Otherwise the even then the odd parity subset is
/// tested and the first one whose corners fall into four distinct projected
/// classes wins.
pub fn select_box_anchors(
    bbox: &BoundingBox,
    view: &ViewTransform,
    corner_override: Option<&[usize]>,
    tolerance: f64,
) -> Result<BoxCornerSelection, SelectionError> {
    let classes = corner_classes(bbox, view, tolerance);

    if let Some(corners) = corner_override {
        validate_override(corners)?;
        return Ok(BoxCornerSelection {
            corners: corners.to_vec(),
            n_corner_classes: classes.n_classes(),
            overridden: true,
        });
    }

    for subset in corner_parity_subsets() {
        let distinct = classes.distinct_among(&subset);
        tracing::trace!(?subset, distinct, "box-corner candidate");
        if distinct == BOX_ANCHOR_COUNT {
            return Ok(BoxCornerSelection {
                corners: subset.to_vec(),
                n_corner_classes: classes.n_classes(),
                overridden: false,
            });
        }
    }

    Err(SelectionError::NoDistinctSubset {
        azimuth_deg: view.azimuth_deg,
        elevation_deg: view.elevation_deg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ResolvedRange;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const TOL: f64 = 1e-9;

    fn scenario_box() -> BoundingBox {
        BoundingBox::new(
            ResolvedRange::new(0.0, 10.0),
            ResolvedRange::new(0.0, 5.0),
            ResolvedRange::new(-1.0, 1.0),
        )
    }

    #[test]
    fn parity_subsets_match_known_good_sets() {
        // 1-based: {1,4,6,7} and {2,3,5,8}.
        assert_eq!(corner_parity_subsets(), [[0, 3, 5, 6], [1, 2, 4, 7]]);
    }

    #[test]
    fn parity_subset_pairs_differ_in_two_coordinates() {
        for subset in corner_parity_subsets() {
            for (i, &a) in subset.iter().enumerate() {
                for &b in &subset[i + 1..] {
                    assert_eq!((a ^ b).count_ones(), 2);
                }
            }
        }
    }

    #[test]
    fn default_view_picks_even_subset_with_exact_corners() {
        let bbox = scenario_box();
        let sel = select_box_anchors(&bbox, &ViewTransform::default(), None, TOL).expect("selection");
        assert_eq!(sel.corners, vec![0, 3, 5, 6]);
        assert!(!sel.overridden);
        assert_eq!(sel.n_corner_classes, 8);

        let points: Vec<_> = sel.anchors(&bbox).iter().map(|a| a.point.to_array()).collect();
        assert_eq!(
            points,
            vec![
                [0.0, 0.0, -1.0],
                [10.0, 5.0, -1.0],
                [10.0, 0.0, 1.0],
                [0.0, 5.0, 1.0],
            ]
        );
    }

    #[test]
    fn face_diagonal_view_collapses_both_subsets() {
        let err = select_box_anchors(&scenario_box(), &ViewTransform::new(45.0, 0.0), None, TOL)
            .expect_err("degenerate view");
        assert!(matches!(err, SelectionError::NoDistinctSubset { .. }));
    }

    #[test]
    fn override_bypasses_distinctness_test() {
        let sel = select_box_anchors(
            &scenario_box(),
            &ViewTransform::new(45.0, 0.0),
            Some(&[0, 1, 2, 4]),
            TOL,
        )
        .expect("override");
        assert_eq!(sel.corners, vec![0, 1, 2, 4]);
        assert!(sel.overridden);
    }

    #[test]
    fn override_is_range_checked() {
        let bbox = scenario_box();
        let view = ViewTransform::default();
        assert_eq!(
            select_box_anchors(&bbox, &view, Some(&[0, 1, 2]), TOL),
            Err(SelectionError::OverrideLength(3))
        );
        assert_eq!(
            select_box_anchors(&bbox, &view, Some(&[0, 1, 2, 8]), TOL),
            Err(SelectionError::OverrideIndex(8))
        );
        assert_eq!(
            select_box_anchors(&bbox, &view, Some(&[0, 1, 1, 2]), TOL),
            Err(SelectionError::OverrideDuplicate(1))
        );
    }

    #[test]
    fn distinct_corner_views_yield_distinct_anchors() {
        let bbox = scenario_box();
        let mut rng = StdRng::seed_from_u64(7);
        let mut checked = 0;
        for _ in 0..500 {
            let view = ViewTransform::new(rng.gen_range(-180.0..180.0), rng.gen_range(-90.0..90.0));
            let classes = corner_classes(&bbox, &view, TOL);
            if classes.n_classes() != N_CORNERS {
                continue;
            }
            let sel = select_box_anchors(&bbox, &view, None, TOL).expect("selection");
            assert_eq!(classes.distinct_among(&sel.corners), BOX_ANCHOR_COUNT);
            checked += 1;
        }
        assert!(checked > 400);
    }

    #[test]
    fn selection_is_deterministic() {
        let bbox = scenario_box();
        let view = ViewTransform::new(-112.5, 18.0);
        let first = select_box_anchors(&bbox, &view, None, TOL).expect("selection");
        for _ in 0..10 {
            assert_eq!(select_box_anchors(&bbox, &view, None, TOL).expect("selection"), first);
        }
    }
}
