//! Calibrated verification score.

use std::fmt;

/// Probability that a questioned signature is genuine, in `[0, 1]`.
///
/// All classifier strategies return this polarity. The flipped
/// probability-of-forgery used for benchmark predictions is obtained
/// through [`Score::complement`] exactly once, at the scoring glue.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Score(f64);

impl Score {
    /// Wrap a raw score, clamping into `[0, 1]`.
    ///
    /// The piecewise scoring formulas are continuous at their band
    /// boundaries, so clamping only guards against floating-point
    /// overshoot at the edges.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    /// The raw score value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// `1 - score`: the probability-of-forgery polarity.
    #[must_use]
    pub fn complement(self) -> Self {
        Self(1.0 - self.0)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}
