//! Distance newtype shared by the DTW kernel and the pairwise matrix.

use std::cmp::Ordering;
use std::fmt;

/// A non-negative accumulated alignment cost between two sequences.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct PairDistance(f64);

impl PairDistance {
    /// Zero distance, returned for the matrix diagonal.
    pub const ZERO: Self = Self(0.0);

    pub(crate) fn new(value: f64) -> Self {
        debug_assert!(value >= 0.0, "alignment cost cannot be negative");
        Self(value)
    }

    /// The raw cost value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Total ordering comparison using [`f64::total_cmp`].
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for PairDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}
