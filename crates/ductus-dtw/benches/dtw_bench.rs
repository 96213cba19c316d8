//! Criterion benchmarks for the multivariate DTW kernel and pairwise matrix.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use ductus_dtw::{Dtw, FeatureMatrix};

fn make_trace(steps: usize, offset: f64) -> FeatureMatrix {
    let rows: Vec<Vec<f64>> = (0..steps)
        .map(|i| {
            let t = i as f64 * 0.1 + offset;
            vec![t.sin(), t.cos(), (t * 0.5).sin()]
        })
        .collect();
    FeatureMatrix::from_rows(rows).unwrap()
}

fn bench_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("dtw_distance");
    for &steps in &[64usize, 256, 1024] {
        let a = make_trace(steps, 0.0);
        let b = make_trace(steps, 1.0);
        let dtw = Dtw::squared();
        group.bench_with_input(BenchmarkId::from_parameter(steps), &(a, b), |bencher, (a, b)| {
            bencher.iter(|| dtw.distance(a.as_view(), b.as_view()).unwrap());
        });
    }
    group.finish();
}

fn bench_pairwise(c: &mut Criterion) {
    let mut group = c.benchmark_group("dtw_pairwise");
    group.sample_size(10);
    for &n in &[16usize, 64] {
        let traces: Vec<FeatureMatrix> = (0..n).map(|i| make_trace(128, i as f64 * 0.3)).collect();
        let dtw = Dtw::squared();
        group.bench_with_input(BenchmarkId::from_parameter(n), &traces, |bencher, traces| {
            bencher.iter(|| dtw.pairwise(traces).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_distance, bench_pairwise);
criterion_main!(benches);
