//! Regression tests for the threshold-sweep evaluator.

use ductus_bench::{BenchmarkConfig, BenchmarkEvaluator, Comparison, ComparisonSet};
use ductus_verify::{Origin, Score, SignatureId};

fn scored(name: &str, expected: Origin, prediction: f64) -> Comparison {
    let mut comparison = Comparison::new(
        SignatureId::new("ref"),
        SignatureId::new(name),
        expected,
    );
    comparison.set_prediction(Score::new(prediction));
    comparison
}

#[test]
fn perfectly_separated_scores_reach_zero_aer() {
    // Genuine comparisons predict 0.1 (forgery polarity), forged ones 0.9.
    // Some threshold strictly between the two must separate them exactly.
    let mut set = ComparisonSet::new();
    for i in 0..20 {
        set.push(scored(&format!("g{i}"), Origin::Genuine, 0.1));
        set.push(scored(&format!("f{i}"), Origin::Forged, 0.9));
    }

    let report = BenchmarkEvaluator::new(BenchmarkConfig::default())
        .evaluate(&set)
        .unwrap();
    let eer = report.eer().unwrap();

    assert_eq!(eer.aer, 0.0);
    assert_eq!(eer.far, 0.0);
    assert_eq!(eer.frr, 0.0);
    assert!(
        eer.threshold > 0.1 && eer.threshold < 0.9,
        "separating threshold {} outside (0.1, 0.9)",
        eer.threshold
    );
}

#[test]
fn overlapping_scores_yield_balanced_error_point() {
    // Two of five genuine entries sit above two of five forged entries,
    // so no threshold is perfect and FAR and FRR meet near 0.4.
    let mut set = ComparisonSet::new();
    for (i, p) in [0.1, 0.2, 0.3, 0.7, 0.8].iter().enumerate() {
        set.push(scored(&format!("g{i}"), Origin::Genuine, *p));
    }
    for (i, p) in [0.2, 0.3, 0.7, 0.8, 0.9].iter().enumerate() {
        set.push(scored(&format!("f{i}"), Origin::Forged, *p));
    }

    let report = BenchmarkEvaluator::new(BenchmarkConfig::default())
        .evaluate(&set)
        .unwrap();
    let eer = report.eer().unwrap();
    assert!((eer.far - eer.frr).abs() <= 0.2);
    assert!(eer.aer > 0.0);
}

#[test]
fn single_label_set_is_degenerate() {
    let mut set = ComparisonSet::new();
    for i in 0..5 {
        set.push(scored(&format!("g{i}"), Origin::Genuine, 0.1));
    }

    let report = BenchmarkEvaluator::new(BenchmarkConfig::default())
        .evaluate(&set)
        .unwrap();
    assert!(report.eer().is_none());
    assert!(report.require_eer().is_err());
    // Curves are still reported, with the empty class undefined.
    assert!(report.buckets().iter().all(|b| b.far().is_nan()));
}
