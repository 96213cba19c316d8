//! Elastic distance computation between multichannel sequences.

use rayon::prelude::*;
use tracing::instrument;

use crate::error::DtwError;
use crate::matrix::DistanceMatrix;
use crate::pair::PairDistance;
use crate::series::{FeatureMatrix, FeatureMatrixView};

/// Per-step local cost between two channel tuples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepCost {
    /// Sum of squared per-channel differences.
    #[default]
    Squared,
    /// Sum of absolute per-channel differences.
    Absolute,
}

impl StepCost {
    fn between(self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            Self::Squared => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum(),
            Self::Absolute => a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum(),
        }
    }
}

/// Immutable DTW configuration. Thread-safe and copyable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dtw {
    cost: StepCost,
}

impl Dtw {
    /// DTW with the squared per-channel step cost.
    #[must_use]
    pub fn squared() -> Self {
        Self {
            cost: StepCost::Squared,
        }
    }

    /// DTW with the absolute per-channel step cost.
    #[must_use]
    pub fn absolute() -> Self {
        Self {
            cost: StepCost::Absolute,
        }
    }

    /// The configured per-step cost.
    #[must_use]
    pub fn step_cost(&self) -> StepCost {
        self.cost
    }

    /// Compute the elastic distance between two sequences.
    ///
    /// Minimum-cost monotonic alignment over the full `n × m` lattice,
    /// evaluated with a rolling two-row buffer: O(n·m) time, O(m) space.
    /// The result is the raw accumulated cost at the final cell; no
    /// square root is applied. Single-step sequences are valid inputs.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::DimensionMismatch`] when the channel counts of
    /// `a` and `b` differ.
    #[instrument(skip(a, b), fields(n = a.steps(), m = b.steps()))]
    pub fn distance(
        &self,
        a: FeatureMatrixView<'_>,
        b: FeatureMatrixView<'_>,
    ) -> Result<PairDistance, DtwError> {
        if a.channels() != b.channels() {
            return Err(DtwError::DimensionMismatch {
                left: a.channels(),
                right: b.channels(),
            });
        }

        let n = a.steps();
        let m = b.steps();

        // Column 0 of each buffer is a sentinel so the j == 0 predecessors
        // naturally read INF. curr[j + 1] holds C[i][j].
        let mut prev = vec![f64::INFINITY; m + 1];
        let mut curr = vec![f64::INFINITY; m + 1];

        for i in 0..n {
            curr.fill(f64::INFINITY);
            let row = a.step(i);
            for j in 0..m {
                let cost = self.cost.between(row, b.step(j));
                curr[j + 1] = if i == 0 && j == 0 {
                    cost
                } else {
                    let above = prev[j + 1];
                    let diag = prev[j];
                    let left = curr[j];
                    cost + above.min(diag).min(left)
                };
            }
            std::mem::swap(&mut prev, &mut curr);
        }

        // After the final swap, prev holds the last completed row.
        Ok(PairDistance::new(prev[m]))
    }

    /// Compute elastic distances for all unordered pairs of a collection.
    ///
    /// Returns a symmetric [`DistanceMatrix`] with a zero diagonal. Each
    /// unordered pair is owned by exactly one rayon task, so the result is
    /// identical regardless of thread count.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::DimensionMismatch`] when any sequence disagrees
    /// with the first on channel count.
    #[instrument(skip(self, series), fields(n = series.len()))]
    pub fn pairwise(&self, series: &[FeatureMatrix]) -> Result<DistanceMatrix, DtwError> {
        let n = series.len();
        if let Some(first) = series.first() {
            for other in &series[1..] {
                if other.channels() != first.channels() {
                    return Err(DtwError::DimensionMismatch {
                        left: first.channels(),
                        right: other.channels(),
                    });
                }
            }
        }

        let views: Vec<FeatureMatrixView<'_>> = series.iter().map(FeatureMatrix::as_view).collect();

        let total_pairs = n * n.saturating_sub(1) / 2;
        let distances: Result<Vec<PairDistance>, DtwError> = (0..total_pairs)
            .into_par_iter()
            .map(|flat_idx| {
                // Invert flat_idx = i*(i-1)/2 + j for the strict lower triangle.
                let i = ((1.0 + (1.0 + 8.0 * flat_idx as f64).sqrt()) / 2.0).floor() as usize;
                let j = flat_idx - i * (i - 1) / 2;
                self.distance(views[i], views[j])
            })
            .collect();

        Ok(DistanceMatrix::from_raw(n, distances?))
    }
}
