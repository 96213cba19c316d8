//! Error types for feature matrices and elastic distance computation.

/// Errors from elastic distance computation and feature matrix validation.
#[derive(Debug, thiserror::Error)]
pub enum DtwError {
    /// Returned when a feature matrix has zero time steps.
    #[error("feature matrix must have at least one time step")]
    EmptySeries,

    /// Returned when a feature matrix has zero channels.
    #[error("feature matrix must have at least one channel")]
    ZeroChannels,

    /// Returned when a time step row has a different channel count than the first row.
    #[error("ragged feature matrix: step {step} has {got} channels, expected {expected}")]
    RaggedSteps {
        /// Zero-based step index of the offending row.
        step: usize,
        /// Channel count of the first row.
        expected: usize,
        /// Channel count of the offending row.
        got: usize,
    },

    /// Returned when a feature matrix contains NaN, infinity, or negative infinity.
    #[error("non-finite value at step {step}, channel {channel}")]
    NonFiniteValue {
        /// Step index of the first non-finite value found.
        step: usize,
        /// Channel index of the first non-finite value found.
        channel: usize,
    },

    /// Returned when two feature matrices disagree on channel count.
    ///
    /// Distance between sequences of different dimensionality is undefined;
    /// the computation never silently truncates to the common channels.
    #[error("channel count mismatch: {left} vs {right}")]
    DimensionMismatch {
        /// Channel count of the left operand.
        left: usize,
        /// Channel count of the right operand.
        right: usize,
    },
}
