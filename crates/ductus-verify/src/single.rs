//! Single-reference verification with fixed thresholds.

use ductus_dtw::Dtw;
use tracing::debug;

use crate::classifier::Classifier;
use crate::error::VerifyError;
use crate::model::{SignerModel, ThresholdTriple};
use crate::score::Score;
use crate::signature::{Channel, Signature};

/// 1v1 verification: one reference trace, three externally supplied
/// decision thresholds.
///
/// The thresholds are configuration, not derived from data; they come
/// from calibration on a held-out population.
#[derive(Debug, Clone)]
pub struct SingleReferenceClassifier {
    channels: Vec<Channel>,
    thresholds: ThresholdTriple,
    dtw: Dtw,
}

impl SingleReferenceClassifier {
    /// Build a classifier over the given channels and thresholds.
    #[must_use]
    pub fn new(channels: Vec<Channel>, thresholds: ThresholdTriple) -> Self {
        Self {
            channels,
            thresholds,
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

impl Classifier for SingleReferenceClassifier {
    /// # Errors
    ///
    /// Returns [`VerifyError::InvalidTrainingSetSize`] unless exactly one
    /// reference signature is supplied.
    fn train(&self, references: &[Signature]) -> Result<SignerModel, VerifyError> {
        let [reference] = references else {
            return Err(VerifyError::InvalidTrainingSetSize {
                got: references.len(),
            });
        };
        Ok(SignerModel::SingleReference {
            signer: reference.signer().clone(),
            reference_id: reference.id().clone(),
            reference: reference.features(&self.channels)?,
            thresholds: self.thresholds,
        })
    }

    /// Piecewise scoring, continuous at every band boundary:
    ///
    /// | Distance band | Score |
    /// |---|---|
    /// | `d < genuine` | 1.0 |
    /// | `genuine <= d < inconclusive` | `0.5 + (inconclusive - d) / (inconclusive - genuine) / 2` |
    /// | `inconclusive <= d <= forgery` | `(forgery - d) / (forgery - inconclusive) / 2` |
    /// | `d > forgery` | 0.0 |
    fn test(&self, model: &SignerModel, questioned: &Signature) -> Result<Score, VerifyError> {
        let SignerModel::SingleReference {
            signer,
            reference,
            thresholds,
            ..
        } = model
        else {
            return Err(VerifyError::ModelMismatch {
                classifier: "single-reference",
                model: model.variant(),
            });
        };

        let features = questioned.features(&self.channels)?;
        let distance = self
            .dtw
            .distance(reference.as_view(), features.as_view())?
            .value();

        debug!(
            signer = %signer,
            questioned = %questioned.id(),
            distance,
            "single-reference comparison"
        );

        let g = thresholds.genuine();
        let i = thresholds.inconclusive();
        let f = thresholds.forgery();
        let score = if distance < g {
            1.0
        } else if distance > f {
            0.0
        } else if distance < i {
            0.5 + (i - distance) / (i - g) / 2.0
        } else {
            (f - distance) / (f - i) / 2.0
        };
        Ok(Score::new(score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::{InputDevice, SignatureId, SignerId};

    fn finger_signature(name: &str, x: Vec<f64>) -> Signature {
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

    fn classifier() -> SingleReferenceClassifier {
        SingleReferenceClassifier::new(
            vec![Channel::X, Channel::Y],
            ThresholdTriple::new(1.0, 2.0, 4.0).unwrap(),
        )
    }

    #[test]
    fn train_requires_exactly_one() {
        let c = classifier();
        let a = finger_signature("a", vec![0.0, 1.0]);
        let b = finger_signature("b", vec![1.0, 0.0]);

        assert!(matches!(
            c.train(&[]),
            Err(VerifyError::InvalidTrainingSetSize { got: 0 })
        ));
        assert!(matches!(
            c.train(&[a.clone(), b]),
            Err(VerifyError::InvalidTrainingSetSize { got: 2 })
        ));

        let model = c.train(std::slice::from_ref(&a)).unwrap();
        assert_eq!(model.signer().as_str(), "u1");
        let SignerModel::SingleReference { reference_id, .. } = &model else {
            panic!("wrong variant");
        };
        assert_eq!(reference_id.as_str(), "a");
    }

    #[test]
    fn identical_questioned_scores_one() {
        let c = classifier();
        let reference = finger_signature("ref", vec![0.0, 1.0, 2.0]);
        let model = c.train(std::slice::from_ref(&reference)).unwrap();
        let score = c.test(&model, &reference).unwrap();
        assert_eq!(score.value(), 1.0);
    }

    #[test]
    fn score_is_monotonic_in_distance() {
        // Scale the questioned trace progressively away from the reference
        // and require non-increasing scores.
        let c = classifier();
        let reference = finger_signature("ref", vec![0.0, 1.0]);
        let model = c.train(std::slice::from_ref(&reference)).unwrap();

        let mut last = f64::INFINITY;
        for scale in [1.0, 1.5, 2.0, 3.0, 5.0, 10.0] {
            let questioned = finger_signature("q", vec![0.0, scale]);
            let score = c.test(&model, &questioned).unwrap().value();
            assert!(
                score <= last + 1e-12,
                "score increased from {last} to {score} at scale {scale}"
            );
            last = score;
        }
    }

    #[test]
    fn band_boundaries_are_continuous() {
        // Reference [0]; questioned [d] gives squared distance d^2 for
        // single-step traces, letting us hit exact band boundaries.
        let c = SingleReferenceClassifier::new(
            vec![Channel::X],
            ThresholdTriple::new(1.0, 2.0, 4.0).unwrap(),
        );
        let reference = finger_signature("ref", vec![0.0]);
        let model = c.train(std::slice::from_ref(&reference)).unwrap();

        // d = 1.0 (boundary genuine/inconclusive band): 0.5 + 1/1/2 = 1.0
        let at_genuine = c
            .test(&model, &finger_signature("q", vec![1.0]))
            .unwrap()
            .value();
        assert!((at_genuine - 1.0).abs() < 1e-12);

        // d = 2.0: exactly the inconclusive boundary, (4-2)/(4-2)/2 = 0.5
        let at_inconclusive = c
            .test(&model, &finger_signature("q", vec![2.0_f64.sqrt()]))
            .unwrap()
            .value();
        assert!((at_inconclusive - 0.5).abs() < 1e-12);

        // d = 4.0: the forgery boundary, score 0.
        let at_forgery = c
            .test(&model, &finger_signature("q", vec![2.0]))
            .unwrap()
            .value();
        assert!(at_forgery.abs() < 1e-12);

        // d > 4.0: confidently forged.
        let beyond = c
            .test(&model, &finger_signature("q", vec![10.0]))
            .unwrap()
            .value();
        assert_eq!(beyond, 0.0);
    }

    #[test]
    fn rejects_foreign_model() {
        let c = classifier();
        let reference = finger_signature("ref", vec![0.0, 1.0]);
        let other = crate::MinMaxClassifier::new(vec![Channel::X, Channel::Y]);
        let sigs = vec![
            finger_signature("a", vec![0.0, 1.0]),
            finger_signature("b", vec![0.0, 2.0]),
        ];
        let foreign = other.train(&sigs).unwrap();
        assert!(matches!(
            c.test(&foreign, &reference),
            Err(VerifyError::ModelMismatch { .. })
        ));
    }
}
