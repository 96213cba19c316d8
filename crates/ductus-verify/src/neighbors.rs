//! Neighbors verification: a primary reference enriched with its nearest
//! population neighbors.

use ductus_dtw::Dtw;
use tracing::debug;

use crate::classifier::{Classifier, linear_band, project_references};
use crate::error::VerifyError;
use crate::model::SignerModel;
use crate::score::Score;
use crate::signature::{Channel, Signature};

/// Verification against a curated neighborhood rather than a signer's
/// own genuine set.
///
/// The caller assembles the training set as a primary reference plus its
/// k nearest other references (found by a batch all-pairs search over
/// the full reference population). The genuine threshold is the raw
/// minimum pairwise distance; the forgery threshold is
/// `scale * average pairwise distance`.
#[derive(Debug, Clone)]
pub struct NeighborsClassifier {
    channels: Vec<Channel>,
    scale: f64,
    dtw: Dtw,
}

impl NeighborsClassifier {
    /// Build a classifier with the given separation factor (typically 5).
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::InvalidSeparationScale`] when `scale <= 1.0`,
    /// which could not place the forgery threshold above the genuine one.
    pub fn new(channels: Vec<Channel>, scale: f64) -> Result<Self, VerifyError> {
        if !(scale > 1.0) {
            return Err(VerifyError::InvalidSeparationScale { scale });
        }
        Ok(Self {
            channels,
            scale,
            dtw: Dtw::squared(),
        })
    }

    /// Override the elastic distance configuration.
    #[must_use]
    pub fn with_dtw(mut self, dtw: Dtw) -> Self {
        self.dtw = dtw;
        self
    }
}

impl Classifier for NeighborsClassifier {
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`VerifyError::EmptyTrainingSet`] | Zero references |
    /// | [`VerifyError::NoDistinctReferencePairs`] | All pairwise distances zero, or a single reference |
    fn train(&self, references: &[Signature]) -> Result<SignerModel, VerifyError> {
        let Some(first) = references.first() else {
            return Err(VerifyError::EmptyTrainingSet);
        };
        let signer = first.signer().clone();

        let projected = project_references(&self.channels, references)?;
        let features: Vec<_> = projected.iter().map(|(_, f)| f.clone()).collect();
        let matrix = self.dtw.pairwise(&features)?;

        let mut min = f64::INFINITY;
        let mut total = 0.0;
        let mut pairs = 0usize;
        for (_, _, distance) in matrix.iter_pairs() {
            let d = distance.value();
            min = min.min(d);
            total += d;
            pairs += 1;
        }
        if pairs == 0 || total == 0.0 {
            return Err(VerifyError::NoDistinctReferencePairs {
                signer: signer.as_str().to_string(),
            });
        }
        let average = total / pairs as f64;

        debug!(
            signer = %signer,
            references = references.len(),
            min,
            average,
            "neighbors training"
        );

        Ok(SignerModel::Neighbors {
            signer,
            references: projected,
            genuine_threshold: min,
            forgery_threshold: self.scale * average,
        })
    }

    /// Averages the distance to every stored reference and applies the
    /// two-threshold linear band.
    fn test(&self, model: &SignerModel, questioned: &Signature) -> Result<Score, VerifyError> {
        let SignerModel::Neighbors {
            signer,
            references,
            genuine_threshold,
            forgery_threshold,
        } = model
        else {
            return Err(VerifyError::ModelMismatch {
                classifier: "neighbors",
                model: model.variant(),
            });
        };

        let features = questioned.features(&self.channels)?;
        let mut total = 0.0;
        for (_, reference) in references {
            total += self
                .dtw
                .distance(reference.as_view(), features.as_view())?
                .value();
        }
        let average = total / references.len() as f64;

        debug!(
            signer = %signer,
            questioned = %questioned.id(),
            average,
            "neighbors comparison"
        );

        Ok(linear_band(average, *genuine_threshold, *forgery_threshold))
    }
}
