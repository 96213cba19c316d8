//! Error types for signature validation, training, and scoring.

use ductus_dtw::DtwError;

/// Errors from signature construction, model training, and testing.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// Returned when a trace has zero sample points.
    #[error("signature trace must have at least one sample point")]
    EmptyTrace,

    /// Returned when a trace channel has a different length than the x channel.
    #[error("channel {channel} has {got} samples, expected {expected}")]
    ChannelLengthMismatch {
        /// Name of the offending channel.
        channel: &'static str,
        /// Length of the x channel.
        expected: usize,
        /// Length of the offending channel.
        got: usize,
    },

    /// Returned when a pressure channel is required but absent.
    ///
    /// Stylus traces must carry pressure; projections requesting the
    /// pressure channel of a finger trace also fail with this variant.
    #[error("signature {id} has no pressure channel")]
    MissingPressure {
        /// Id of the offending signature.
        id: String,
    },

    /// Returned when a single-reference training set does not contain exactly one signature.
    #[error("single-reference training requires exactly 1 signature, got {got}")]
    InvalidTrainingSetSize {
        /// Number of signatures supplied.
        got: usize,
    },

    /// Returned when a training set is empty.
    #[error("training set must contain at least one signature")]
    EmptyTrainingSet,

    /// Returned when fixed decision thresholds are not strictly increasing.
    #[error(
        "thresholds must satisfy genuine < inconclusive < forgery, got {genuine} / {inconclusive} / {forgery}"
    )]
    InvalidThresholdOrdering {
        /// Supplied genuine threshold.
        genuine: f64,
        /// Supplied inconclusive threshold.
        inconclusive: f64,
        /// Supplied forgery threshold.
        forgery: f64,
    },

    /// Returned when every pair of training references has zero mutual distance,
    /// so no min/max thresholds can be derived. Also covers single-signature
    /// training sets, which have no reference pairs at all.
    #[error("signer {signer}: references have no distinct pairs to derive thresholds from")]
    NoDistinctReferencePairs {
        /// Id of the signer being trained.
        signer: String,
    },

    /// Returned when the neighbor separation factor cannot produce a forgery
    /// threshold above the genuine threshold.
    #[error("separation scale must be greater than 1.0, got {scale}")]
    InvalidSeparationScale {
        /// Supplied scale factor.
        scale: f64,
    },

    /// Returned when a model of one variant is passed to a classifier of another.
    #[error("classifier {classifier} cannot test a {model} model")]
    ModelMismatch {
        /// Variant the classifier produces.
        classifier: &'static str,
        /// Variant that was supplied.
        model: &'static str,
    },

    /// Returned when population statistics cannot separate the classes.
    #[error(
        "degenerate statistics: forged median {forged_median} does not exceed genuine min {genuine_min}"
    )]
    DegenerateStatistics {
        /// Minimum distance observed among genuine training comparisons.
        genuine_min: f64,
        /// Median distance observed among forged training comparisons.
        forged_median: f64,
    },

    /// Wraps an elastic distance error encountered during training or testing.
    #[error("distance computation failed: {0}")]
    Distance(#[from] DtwError),
}
