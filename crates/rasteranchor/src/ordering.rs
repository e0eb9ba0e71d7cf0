//! Anchor ordering for the downstream image placement.
//!
//! The consuming renderer solves its image placement from the first two
//! correspondences and needs them to differ in both physical coordinates.

use crate::mapping::PhysicalPosition;

/// How the final anchor order was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingStatus {
    /// The first two positions differ in both coordinates.
    Resolved,
    /// No such pair exists; the original order was kept.
    Fallback,
    /// Ordering does not apply to this anchor mode.
    NotApplicable,
}

/// Permutation of anchor indices plus its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    pub order: Vec<usize>,
    pub status: OrderingStatus,
}

impl Ordering {
    pub fn identity(n: usize, status: OrderingStatus) -> Self {
        Self {
            order: (0..n).collect(),
            status,
        }
    }

    pub fn apply<T: Clone>(&self, items: &[T]) -> Vec<T> {
        self.order.iter().map(|&i| items[i].clone()).collect()
    }
}

/// Put a pair that differs in both coordinates first.
///
/// Candidates are scanned first index by first index, then second index in
/// original order; the remaining anchors keep their relative order. Without a
/// valid pair the original order is kept and a warning is emitted.
pub fn resolve_ordering(positions: &[PhysicalPosition]) -> Ordering {
    for (i, first) in positions.iter().enumerate() {
        let partner = positions
            .iter()
            .enumerate()
            .find(|&(j, p)| j != i && first.differs_in_both(p));
        if let Some((j, _)) = partner {
            let mut order = vec![i, j];
            order.extend((0..positions.len()).filter(|&k| k != i && k != j));
            return Ordering {
                order,
                status: OrderingStatus::Resolved,
            };
        }
    }

    tracing::warn!(
        n_anchors = positions.len(),
        "no anchor pair differs in both physical coordinates; keeping original order, \
         image placement may be incorrect"
    );
    Ordering::identity(positions.len(), OrderingStatus::Fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn pts(raw: &[(f64, f64)]) -> Vec<PhysicalPosition> {
        raw.iter().map(|&(x, y)| PhysicalPosition::new(x, y)).collect()
    }

    #[test]
    fn already_valid_order_is_kept() {
        let p = pts(&[(0.0, 0.0), (1.0, 1.0), (0.0, 1.0), (1.0, 0.0)]);
        let o = resolve_ordering(&p);
        assert_eq!(o.order, vec![0, 1, 2, 3]);
        assert_eq!(o.status, OrderingStatus::Resolved);
    }

    #[test]
    fn partner_is_pulled_forward() {
        let p = pts(&[(0.0, 0.0), (0.0, 1.0), (1.0, 0.0), (1.0, 1.0)]);
        let o = resolve_ordering(&p);
        assert_eq!(o.order, vec![0, 3, 1, 2]);
    }

    #[test]
    fn first_index_advances_when_needed() {
        // Index 0 shares x or y with everyone else.
        let p = pts(&[(0.0, 0.0), (0.0, 2.0), (3.0, 0.0), (0.0, 5.0)]);
        let o = resolve_ordering(&p);
        assert_eq!(o.order, vec![1, 2, 0, 3]);
        assert_eq!(o.apply(&p)[..2], [p[1], p[2]]);
    }

    #[test]
    fn collinear_positions_fall_back() {
        let p = pts(&[(2.0, 0.0), (2.0, 1.0), (2.0, 2.0), (2.0, 3.0)]);
        let o = resolve_ordering(&p);
        assert_eq!(o, Ordering::identity(4, OrderingStatus::Fallback));
    }

    #[test]
    fn resolved_first_pair_always_differs_in_both() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1000 {
            let p: Vec<_> = (0..4)
                .map(|_| {
                    PhysicalPosition::new(rng.gen_range(0..4) as f64, rng.gen_range(0..4) as f64)
                })
                .collect();
            let has_pair = (0..4).any(|i| (0..4).any(|j| i != j && p[i].differs_in_both(&p[j])));
            let o = resolve_ordering(&p);
            let mut sorted = o.order.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, vec![0, 1, 2, 3]);
            if has_pair {
                assert_eq!(o.status, OrderingStatus::Resolved);
                assert!(p[o.order[0]].differs_in_both(&p[o.order[1]]));
            } else {
                assert_eq!(o.status, OrderingStatus::Fallback);
            }
        }
    }
}
