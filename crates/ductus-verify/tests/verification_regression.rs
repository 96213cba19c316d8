//! End-to-end regression tests for the verifier strategies.

use ductus_verify::{
    Channel, Classifier, InputDevice, MinMaxClassifier, NeighborsClassifier, Signature,
    SignatureId, SignerId, SingleReferenceClassifier, ThresholdTriple, VerifyError,
};

/// A constant two-channel finger trace of length 10 at point `(x, y)`.
fn constant_trace(name: &str, signer: &str, x: f64, y: f64) -> Signature {
    Signature::new(
        SignatureId::new(name),
        SignerId::new(signer),
        InputDevice::Finger,
        vec![x; 10],
        vec![y; 10],
        None,
        (0..10).collect(),
    )
    .unwrap()
}

/// Three constant traces at the vertices of a unit equilateral triangle.
///
/// Every per-step squared distance between two vertices is 1, and a
/// monotonic path over two length-10 constant sequences visits exactly
/// 10 cells, so all pairwise DTW distances equal D = 10.
fn equilateral_references() -> Vec<Signature> {
    vec![
        constant_trace("r1", "eq", 0.0, 0.0),
        constant_trace("r2", "eq", 1.0, 0.0),
        constant_trace("r3", "eq", 0.5, 3.0_f64.sqrt() / 2.0),
    ]
}

#[test]
fn minmax_equilateral_threshold_derivation() {
    let references = equilateral_references();
    let classifier = MinMaxClassifier::new(vec![Channel::X, Channel::Y]);
    let model = classifier.train(&references).unwrap();

    // D = 10: genuine = D/10 = 1, forgery = D + 10 * (D - D) = D.
    assert!((model.genuine_threshold() - 1.0).abs() < 1e-9);
    assert!((model.forgery_threshold() - 10.0).abs() < 1e-9);
}

#[test]
fn minmax_equilateral_scoring_bands() {
    let references = equilateral_references();
    let classifier = MinMaxClassifier::new(vec![Channel::X, Channel::Y]);
    let model = classifier.train(&references).unwrap();

    // Questioned identical to r1: distances (0, 10, 10), average 20/3,
    // inside the (1, 10) band: score = (10 - 20/3) / (10 - 1) = 10/27.
    let questioned = constant_trace("q", "eq", 0.0, 0.0);
    let score = classifier.test(&model, &questioned).unwrap();
    assert!((score.value() - 10.0 / 27.0).abs() < 1e-9);

    // Far point: average above the forgery threshold.
    let forged = constant_trace("q", "eq", 50.0, 50.0);
    assert_eq!(classifier.test(&model, &forged).unwrap().value(), 0.0);
}

#[test]
fn single_reference_training_arity() {
    let classifier = SingleReferenceClassifier::new(
        vec![Channel::X, Channel::Y],
        ThresholdTriple::new(1.0, 2.0, 3.0).unwrap(),
    );
    let references = equilateral_references();

    assert!(matches!(
        classifier.train(&[]),
        Err(VerifyError::InvalidTrainingSetSize { got: 0 })
    ));
    assert!(matches!(
        classifier.train(&references),
        Err(VerifyError::InvalidTrainingSetSize { got: 3 })
    ));

    let model = classifier.train(&references[..1]).unwrap();
    assert_eq!(model.signer().as_str(), "eq");
}

#[test]
fn single_reference_monotonic_thresholding() {
    // One-step traces make the DTW distance exactly (dx)^2, so we can
    // walk the distance from beyond the forgery threshold down to zero.
    let classifier = SingleReferenceClassifier::new(
        vec![Channel::X],
        ThresholdTriple::new(4.0, 9.0, 16.0).unwrap(),
    );
    let reference = Signature::new(
        SignatureId::new("ref"),
        SignerId::new("u"),
        InputDevice::Finger,
        vec![0.0],
        vec![0.0],
        None,
        vec![0],
    )
    .unwrap();
    let model = classifier.train(std::slice::from_ref(&reference)).unwrap();

    let mut previous = -1.0;
    // dx descending from 5.0 (distance 25) to 0; scores must not decrease.
    for step in (0..=50).rev() {
        let dx = step as f64 / 10.0;
        let questioned = Signature::new(
            SignatureId::new("q"),
            SignerId::new("u"),
            InputDevice::Finger,
            vec![dx],
            vec![0.0],
            None,
            vec![0],
        )
        .unwrap();
        let score = classifier.test(&model, &questioned).unwrap().value();
        assert!(
            score >= previous - 1e-12,
            "score decreased to {score} as distance shrank (dx = {dx})"
        );
        previous = score;
    }
    // Fully warped down to the reference itself.
    assert_eq!(previous, 1.0);
}

#[test]
fn neighbors_model_from_curated_set() {
    // A primary and two neighbors drawn from different signers; the model
    // carries the primary's signer id.
    let references = vec![
        constant_trace("primary", "primary", 0.0, 0.0),
        constant_trace("n1", "other1", 0.3, 0.0),
        constant_trace("n2", "other2", 0.0, 0.4),
    ];
    let classifier = NeighborsClassifier::new(vec![Channel::X, Channel::Y], 5.0).unwrap();
    let model = classifier.train(&references).unwrap();
    assert_eq!(model.signer().as_str(), "primary");

    // Pairwise distances: 10*(0.09), 10*(0.16), 10*(0.25) = 0.9, 1.6, 2.5.
    assert!((model.genuine_threshold() - 0.9).abs() < 1e-9);
    assert!((model.forgery_threshold() - 5.0 * (0.9 + 1.6 + 2.5) / 3.0).abs() < 1e-9);

    let questioned = constant_trace("q", "primary", 0.05, 0.05);
    let score = classifier.test(&model, &questioned).unwrap();
    assert!(score.value() > 0.9, "near-primary questioned should score high");
}

#[test]
fn mixed_device_training_set_fails_projection() {
    // A stylus-channel classifier cannot project a finger reference;
    // the failure is per-signer, not a panic.
    let stylus = Signature::new(
        SignatureId::new("s"),
        SignerId::new("m"),
        InputDevice::Stylus,
        vec![0.0, 1.0],
        vec![0.0, 1.0],
        Some(vec![0.1, 0.2]),
        vec![0, 1],
    )
    .unwrap();
    let finger = constant_trace("f", "m", 0.0, 0.0);

    let classifier = MinMaxClassifier::new(vec![Channel::X, Channel::Y, Channel::Pressure]);
    let result = classifier.train(&[stylus, finger]);
    assert!(matches!(result, Err(VerifyError::MissingPressure { .. })));
}
