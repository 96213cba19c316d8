//! The shared classifier capability and strategy-internal helpers.

use ductus_dtw::FeatureMatrix;

use crate::error::VerifyError;
use crate::model::SignerModel;
use crate::score::Score;
use crate::signature::{Channel, Signature, SignatureId};

/// A verifier strategy: trains a per-signer model from reference
/// signatures, then scores questioned signatures against it.
///
/// Implementations are stateless configuration objects; all trained
/// state lives in the returned [`SignerModel`].
pub trait Classifier {
    /// Build an immutable signer model from reference signatures.
    ///
    /// # Errors
    ///
    /// Strategy-specific; see each implementation.
    fn train(&self, references: &[Signature]) -> Result<SignerModel, VerifyError>;

    /// Score a questioned signature against a trained model.
    ///
    /// Returns the probability that the questioned signature is genuine.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::ModelMismatch`] when `model` was produced by
    /// a different strategy, or a projection/distance error.
    fn test(&self, model: &SignerModel, questioned: &Signature) -> Result<Score, VerifyError>;
}

/// Project every reference onto the channel subset, keeping ids.
pub(crate) fn project_references(
    channels: &[Channel],
    references: &[Signature],
) -> Result<Vec<(SignatureId, FeatureMatrix)>, VerifyError> {
    references
        .iter()
        .map(|sig| Ok((sig.id().clone(), sig.features(channels)?)))
        .collect()
}

/// Two-threshold linear ramp shared by the averaging strategies:
/// 1.0 below `genuine`, 0.0 above `forgery`, linear in between.
pub(crate) fn linear_band(distance: f64, genuine: f64, forgery: f64) -> Score {
    if distance < genuine {
        Score::new(1.0)
    } else if distance > forgery {
        Score::new(0.0)
    } else {
        Score::new((forgery - distance) / (forgery - genuine))
    }
}
