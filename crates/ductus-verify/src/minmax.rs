//! MinMax verification: thresholds derived from reference pairwise distances.

use ductus_dtw::Dtw;
use tracing::debug;

use crate::classifier::{Classifier, linear_band, project_references};
use crate::error::VerifyError;
use crate::model::SignerModel;
use crate::score::Score;
use crate::signature::{Channel, Signature};

/// Verification against a signer's complete genuine reference set.
///
/// Training computes the full pairwise distance matrix across the
/// references and derives the decision band from its nonzero extremes.
/// Testing averages the questioned trace's distance to every reference.
#[derive(Debug, Clone)]
pub struct MinMaxClassifier {
    channels: Vec<Channel>,
    dtw: Dtw,
}

impl MinMaxClassifier {
    /// Build a classifier over the given channels.
    #[must_use]
    pub fn new(channels: Vec<Channel>) -> Self {
        Self {
            channels,
            dtw: Dtw::squared(),
        }
    }

    /// Override the elastic distance configuration.
    #[must_use]
    pub fn with_dtw(mut self, dtw: Dtw) -> Self {
        self.dtw = dtw;
        self
    }
}

impl Classifier for MinMaxClassifier {
    /// Derived thresholds:
    ///
    /// - `genuine = min(nonzero pairwise) / 10`
    /// - `forgery = max + 10 * (max - min)`
    /// - `count_min = 0.8 * min`, `count_max = 1.5 * max` (diagnostic only)
    ///
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
        let mut max = f64::NEG_INFINITY;
        for (_, _, distance) in matrix.iter_pairs() {
            let d = distance.value();
            if d > 0.0 {
                min = min.min(d);
                max = max.max(d);
            }
        }
        if !min.is_finite() {
            return Err(VerifyError::NoDistinctReferencePairs {
                signer: signer.as_str().to_string(),
            });
        }

        debug!(signer = %signer, references = references.len(), min, max, "min-max training");

        Ok(SignerModel::MinMax {
            signer,
            references: projected,
            genuine_threshold: min / 10.0,
            forgery_threshold: max + 10.0 * (max - min),
            count_min_threshold: 0.8 * min,
            count_max_threshold: 1.5 * max,
        })
    }

    /// Averages the distance to every stored reference and applies the
    /// two-threshold linear band.
    fn test(&self, model: &SignerModel, questioned: &Signature) -> Result<Score, VerifyError> {
        let SignerModel::MinMax {
            signer,
            references,
            genuine_threshold,
            forgery_threshold,
            ..
        } = model
        else {
            return Err(VerifyError::ModelMismatch {
                classifier: "min-max",
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
            "min-max comparison"
        );

        Ok(linear_band(average, *genuine_threshold, *forgery_threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finger_signature(name: &str, x: Vec<f64>) -> Signature {
        use crate::signature::{InputDevice, SignatureId, SignerId};
        let y = vec![0.0; x.len()];
        let t = (0..x.len() as i64).collect();
        Signature::new(
            SignatureId::new(name),
            SignerId::new("u1"),
            InputDevice::Finger,
            x,
            y,
            None,
            t,
        )
        .unwrap()
    }

    #[test]
    fn empty_training_set_rejected() {
        let c = MinMaxClassifier::new(vec![Channel::X]);
        assert!(matches!(c.train(&[]), Err(VerifyError::EmptyTrainingSet)));
    }

    #[test]
    fn single_reference_has_no_pairs() {
        let c = MinMaxClassifier::new(vec![Channel::X]);
        let sigs = vec![finger_signature("a", vec![0.0, 1.0])];
        assert!(matches!(
            c.train(&sigs),
            Err(VerifyError::NoDistinctReferencePairs { .. })
        ));
    }

    #[test]
    fn identical_references_rejected() {
        let c = MinMaxClassifier::new(vec![Channel::X]);
        let sigs = vec![
            finger_signature("a", vec![0.0, 1.0]),
            finger_signature("b", vec![0.0, 1.0]),
            finger_signature("c", vec![0.0, 1.0]),
        ];
        assert!(matches!(
            c.train(&sigs),
            Err(VerifyError::NoDistinctReferencePairs { .. })
        ));
    }

    #[test]
    fn derived_thresholds_from_extremes() {
        // Single-step traces: pairwise squared distances are (a-b)^2.
        // refs at 0, 1, 3 -> distances 1, 9, 4 -> min 1, max 9.
        let c = MinMaxClassifier::new(vec![Channel::X]);
        let sigs = vec![
            finger_signature("a", vec![0.0]),
            finger_signature("b", vec![1.0]),
            finger_signature("c", vec![3.0]),
        ];
        let model = c.train(&sigs).unwrap();
        let SignerModel::MinMax {
            genuine_threshold,
            forgery_threshold,
            count_min_threshold,
            count_max_threshold,
            ..
        } = &model
        else {
            panic!("wrong variant");
        };
        assert!((genuine_threshold - 0.1).abs() < 1e-12);
        assert!((forgery_threshold - (9.0 + 10.0 * 8.0)).abs() < 1e-12);
        assert!((count_min_threshold - 0.8).abs() < 1e-12);
        assert!((count_max_threshold - 13.5).abs() < 1e-12);
    }

    #[test]
    fn averaging_ramp_scores() {
        let c = MinMaxClassifier::new(vec![Channel::X]);
        let sigs = vec![
            finger_signature("a", vec![0.0]),
            finger_signature("b", vec![1.0]),
        ];
        // min = max = 1 -> genuine 0.1, forgery 1.0.
        let model = c.train(&sigs).unwrap();

        // Questioned identical to "a": distances 0 and 1, average 0.5 ->
        // inside the band: (1.0 - 0.5) / (1.0 - 0.1) = 0.555...
        let score = c.test(&model, &finger_signature("q", vec![0.0])).unwrap();
        assert!((score.value() - 0.5 / 0.9).abs() < 1e-12);

        // Far away: average above forgery threshold.
        let forged = c.test(&model, &finger_signature("q", vec![50.0])).unwrap();
        assert_eq!(forged.value(), 0.0);
    }

    #[test]
    fn rejects_foreign_model() {
        let c = MinMaxClassifier::new(vec![Channel::X]);
        let single = crate::SingleReferenceClassifier::new(
            vec![Channel::X],
            crate::ThresholdTriple::new(1.0, 2.0, 3.0).unwrap(),
        );
        let reference = finger_signature("a", vec![0.0, 1.0]);
        let foreign = single.train(std::slice::from_ref(&reference)).unwrap();
        assert!(matches!(
            c.test(&foreign, &reference),
            Err(VerifyError::ModelMismatch { .. })
        ));
    }
}
