//! Immutable per-signer trained artifacts.

use ductus_dtw::FeatureMatrix;

use crate::error::VerifyError;
use crate::signature::{SignatureId, SignerId};

/// Fixed decision thresholds for single-reference verification.
///
/// Invariant: `genuine < inconclusive < forgery` (strict), validated at
/// construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdTriple {
    genuine: f64,
    inconclusive: f64,
    forgery: f64,
}

impl ThresholdTriple {
    /// Validate and build a threshold triple.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::InvalidThresholdOrdering`] unless
    /// `genuine < inconclusive < forgery`.
    pub fn new(genuine: f64, inconclusive: f64, forgery: f64) -> Result<Self, VerifyError> {
        if !(genuine < inconclusive && inconclusive < forgery) {
            return Err(VerifyError::InvalidThresholdOrdering {
                genuine,
                inconclusive,
                forgery,
            });
        }
        Ok(Self {
            genuine,
            inconclusive,
            forgery,
        })
    }

    /// Distances below this value are confidently genuine.
    #[must_use]
    pub fn genuine(&self) -> f64 {
        self.genuine
    }

    /// Boundary between the leaning-genuine and leaning-forged bands.
    #[must_use]
    pub fn inconclusive(&self) -> f64 {
        self.inconclusive
    }

    /// Distances above this value are confidently forged.
    #[must_use]
    pub fn forgery(&self) -> f64 {
        self.forgery
    }
}

/// A trained signer model: one variant per classifier strategy.
///
/// Produced once at training time, read many times while testing; no
/// mutation after construction, so models are safe to share across
/// concurrent test calls.
#[derive(Debug, Clone)]
pub enum SignerModel {
    /// One reference trace plus externally supplied thresholds.
    SingleReference {
        /// Id of the modeled signer.
        signer: SignerId,
        /// Id of the single reference signature.
        reference_id: SignatureId,
        /// Projected reference features.
        reference: FeatureMatrix,
        /// Fixed decision thresholds.
        thresholds: ThresholdTriple,
    },
    /// All references of a signer with thresholds derived from their
    /// pairwise distances.
    MinMax {
        /// Id of the modeled signer.
        signer: SignerId,
        /// Projected reference features, keyed by signature id.
        references: Vec<(SignatureId, FeatureMatrix)>,
        /// `min(nonzero pairwise) / 10`.
        genuine_threshold: f64,
        /// `max(pairwise) + 10 * (max - min)`.
        forgery_threshold: f64,
        /// `0.8 * min`, a diagnostic bound never consulted by `test`.
        count_min_threshold: f64,
        /// `1.5 * max`, a diagnostic bound never consulted by `test`.
        count_max_threshold: f64,
    },
    /// A primary reference and its nearest neighbors, with thresholds
    /// derived from the neighborhood's pairwise distances.
    Neighbors {
        /// Id of the modeled signer (same as the primary signature id).
        signer: SignerId,
        /// Projected reference features, primary first.
        references: Vec<(SignatureId, FeatureMatrix)>,
        /// Raw minimum pairwise distance.
        genuine_threshold: f64,
        /// `scale * average pairwise distance`.
        forgery_threshold: f64,
    },
}

impl SignerModel {
    /// Id of the modeled signer.
    #[must_use]
    pub fn signer(&self) -> &SignerId {
        match self {
            Self::SingleReference { signer, .. }
            | Self::MinMax { signer, .. }
            | Self::Neighbors { signer, .. } => signer,
        }
    }

    /// The distance below which a questioned trace is confidently genuine.
    #[must_use]
    pub fn genuine_threshold(&self) -> f64 {
        match self {
            Self::SingleReference { thresholds, .. } => thresholds.genuine(),
            Self::MinMax {
                genuine_threshold, ..
            }
            | Self::Neighbors {
                genuine_threshold, ..
            } => *genuine_threshold,
        }
    }

    /// The distance above which a questioned trace is confidently forged.
    #[must_use]
    pub fn forgery_threshold(&self) -> f64 {
        match self {
            Self::SingleReference { thresholds, .. } => thresholds.forgery(),
            Self::MinMax {
                forgery_threshold, ..
            }
            | Self::Neighbors {
                forgery_threshold, ..
            } => *forgery_threshold,
        }
    }

    /// Variant name for diagnostics and mismatch errors.
    #[must_use]
    pub fn variant(&self) -> &'static str {
        match self {
            Self::SingleReference { .. } => "single-reference",
            Self::MinMax { .. } => "min-max",
            Self::Neighbors { .. } => "neighbors",
        }
    }
}
