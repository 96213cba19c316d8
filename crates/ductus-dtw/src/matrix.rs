//! Symmetric pairwise distance matrix with lower-triangular storage.

use crate::pair::PairDistance;

/// Pairwise distances for a collection of sequences.
///
/// Stores only the strict lower triangle (`n*(n-1)/2` entries); lookups
/// are symmetric and the diagonal is always zero. Indexing is by the
/// stable integer position assigned to each sequence at load time.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<PairDistance>,
}

impl DistanceMatrix {
    /// Build from pre-computed lower-triangular data, laid out as
    /// `data[row*(row-1)/2 + col]` for `row > col`.
    pub(crate) fn from_raw(n: usize, data: Vec<PairDistance>) -> Self {
        debug_assert_eq!(data.len(), n * n.saturating_sub(1) / 2);
        Self { n, data }
    }

    /// Number of sequences covered by the matrix.
    #[must_use]
    pub fn len(&self) -> usize {
        self.n
    }

    /// True when the matrix covers no sequences.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// The distance between sequences `i` and `j`; zero on the diagonal.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()` or `j >= len()`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> PairDistance {
        assert!(i < self.n && j < self.n, "index ({i}, {j}) out of bounds for {} sequences", self.n);
        if i == j {
            return PairDistance::ZERO;
        }
        let (row, col) = if i > j { (i, j) } else { (j, i) };
        self.data[row * (row - 1) / 2 + col]
    }

    /// Iterate over the strict lower triangle as `(i, j, distance)` with `i > j`.
    pub fn iter_pairs(&self) -> impl Iterator<Item = (usize, usize, PairDistance)> + '_ {
        (1..self.n).flat_map(move |i| (0..i).map(move |j| (i, j, self.data[i * (i - 1) / 2 + j])))
    }

    /// All distances from sequence `i`, including the zero self-distance.
    #[must_use]
    pub fn row(&self, i: usize) -> Vec<PairDistance> {
        (0..self.n).map(|j| self.get(i, j)).collect()
    }
}
