//! Nearest-neighbor selection over a pairwise distance matrix.

use crate::matrix::DistanceMatrix;
use crate::pair::PairDistance;

/// One neighbor of a primary sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Matrix index of the neighbor.
    pub index: usize,
    /// Distance from the primary sequence.
    pub distance: PairDistance,
}

/// A primary sequence together with its `k` nearest other sequences.
///
/// Neighborhoods are not symmetric: each sequence gets its own, and a
/// sequence may appear in many neighborhoods.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighborhood {
    /// Matrix index of the primary sequence.
    pub primary: usize,
    /// Nearest neighbors, closest first.
    pub neighbors: Vec<Neighbor>,
}

/// Select the `k` nearest off-diagonal neighbors of every sequence.
///
/// Ties are broken by ascending matrix index, so the result does not
/// depend on iteration order. `k` is clamped to `len - 1`.
#[must_use]
pub fn nearest_neighbors(matrix: &DistanceMatrix, k: usize) -> Vec<Neighborhood> {
    let n = matrix.len();
    let k = k.min(n.saturating_sub(1));
    (0..n)
        .map(|primary| {
            let mut candidates: Vec<Neighbor> = (0..n)
                .filter(|&j| j != primary)
                .map(|j| Neighbor {
                    index: j,
                    distance: matrix.get(primary, j),
                })
                .collect();
            candidates.sort_by(|a, b| {
                a.distance
                    .total_cmp(&b.distance)
                    .then(a.index.cmp(&b.index))
            });
            candidates.truncate(k);
            Neighborhood {
                primary,
                neighbors: candidates,
            }
        })
        .collect()
}
