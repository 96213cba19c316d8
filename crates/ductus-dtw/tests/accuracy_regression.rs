//! Accuracy and determinism regression tests for ductus-dtw.
//!
//! Synthetic traces are generated from closed-form signals so the suite
//! needs no fixture files and stays fully deterministic.

use ductus_dtw::{Dtw, DtwError, FeatureMatrix, nearest_neighbors};

fn synthetic_trace(seed: usize, steps: usize) -> FeatureMatrix {
    let rows: Vec<Vec<f64>> = (0..steps)
        .map(|i| {
            let t = i as f64 * 0.15 + seed as f64 * 0.37;
            vec![t.sin(), (t * 1.3).cos(), (seed as f64 + 1.0) * 0.01 * i as f64]
        })
        .collect();
    FeatureMatrix::from_rows(rows).expect("valid synthetic trace")
}

#[test]
fn distance_is_symmetric_across_pairs() {
    let dtw = Dtw::squared();
    let traces: Vec<FeatureMatrix> = (0..8).map(|s| synthetic_trace(s, 20 + s)).collect();
    for a in &traces {
        for b in &traces {
            let ab = dtw.distance(a.as_view(), b.as_view()).unwrap().value();
            let ba = dtw.distance(b.as_view(), a.as_view()).unwrap().value();
            assert_eq!(ab, ba, "DTW must be symmetric");
        }
    }
}

#[test]
fn self_distance_is_zero() {
    let dtw = Dtw::squared();
    for s in 0..5 {
        let trace = synthetic_trace(s, 30);
        let d = dtw.distance(trace.as_view(), trace.as_view()).unwrap();
        assert_eq!(d.value(), 0.0);
    }
}

#[test]
fn dimension_check_never_truncates() {
    let dtw = Dtw::squared();
    let three_channel = synthetic_trace(0, 10);
    let two_channel = FeatureMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
    let result = dtw.distance(three_channel.as_view(), two_channel.as_view());
    assert!(matches!(
        result,
        Err(DtwError::DimensionMismatch { left: 3, right: 2 })
    ));
}

#[test]
fn hand_computed_multichannel_values() {
    // Two-step, two-channel sequences worked out on paper.
    // a = [(0,0), (1,1)], b = [(1,0), (0,1)]
    // C[0][0] = (0-1)^2 + (0-0)^2 = 1
    // C[0][1] = (0-0)^2 + (0-1)^2 + 1 = 2
    // C[1][0] = (1-1)^2 + (1-0)^2 + 1 = 2
    // C[1][1] = (1-0)^2 + (1-1)^2 + min(1, 2, 2) = 2
    let a = FeatureMatrix::from_rows(vec![vec![0.0, 0.0], vec![1.0, 1.0]]).unwrap();
    let b = FeatureMatrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
    let d = Dtw::squared().distance(a.as_view(), b.as_view()).unwrap();
    assert!((d.value() - 2.0).abs() < 1e-12);
}

#[test]
fn pairwise_bit_identical_single_vs_multi_threaded() {
    let traces: Vec<FeatureMatrix> = (0..50).map(|s| synthetic_trace(s, 25)).collect();
    let dtw = Dtw::squared();

    let single = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap()
        .install(|| dtw.pairwise(&traces).unwrap());
    let multi = rayon::ThreadPoolBuilder::new()
        .num_threads(8)
        .build()
        .unwrap()
        .install(|| dtw.pairwise(&traces).unwrap());

    for i in 0..50 {
        for j in 0..50 {
            let a = single.get(i, j).value();
            let b = multi.get(i, j).value();
            assert_eq!(a.to_bits(), b.to_bits(), "matrix entry ({i}, {j}) differs");
        }
    }
}

#[test]
fn neighborhoods_follow_matrix_order() {
    let traces: Vec<FeatureMatrix> = (0..10).map(|s| synthetic_trace(s, 15)).collect();
    let matrix = Dtw::squared().pairwise(&traces).unwrap();
    let hoods = nearest_neighbors(&matrix, 3);
    assert_eq!(hoods.len(), 10);
    for hood in &hoods {
        assert_eq!(hood.neighbors.len(), 3);
        for pair in hood.neighbors.windows(2) {
            assert!(pair[0].distance.value() <= pair[1].distance.value());
        }
        for neighbor in &hood.neighbors {
            assert_ne!(neighbor.index, hood.primary);
            assert_eq!(
                neighbor.distance.value(),
                matrix.get(hood.primary, neighbor.index).value()
            );
        }
    }
}
