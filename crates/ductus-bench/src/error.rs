use thiserror::Error;

/// Errors produced while aggregating a benchmark run.
#[derive(Debug, Error)]
pub enum BenchError {
    /// The comparison set holds no entries to evaluate.
    #[error("comparison set is empty")]
    EmptyComparisonSet,

    /// A comparison reached the evaluator without a prediction attached.
    #[error("comparison {reference} vs {questioned} has no prediction")]
    UnscoredComparison {
        /// Reference signature id of the offending comparison.
        reference: String,
        /// Questioned signature id of the offending comparison.
        questioned: String,
    },

    /// The threshold grid must contain at least one bucket.
    #[error("invalid threshold resolution {got}, must be at least 1")]
    InvalidResolution {
        /// Resolution supplied by the caller.
        got: usize,
    },

    /// Every bucket was undefined, so no equal error rate exists. This
    /// happens when the comparison set contains only one expected label.
    #[error("benchmark is degenerate: no threshold has both error rates defined")]
    DegenerateBenchmark,

    /// An external score provider failed to score a batch.
    #[error("score provider '{provider}' failed: {message}")]
    Provider {
        /// Name of the provider implementation.
        provider: String,
        /// Provider-supplied failure description.
        message: String,
    },
}
