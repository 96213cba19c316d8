use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::bucket::ThresholdBucket;
use crate::comparison::ComparisonSet;
use crate::error::BenchError;

/// Benchmark evaluation settings.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkConfig {
    /// Number of evenly spaced thresholds swept over `[0, 1)`.
    pub resolution: usize,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self { resolution: 1000 }
    }
}

/// Sweeps a scored comparison set over a fixed threshold grid.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkEvaluator {
    config: BenchmarkConfig,
}

impl BenchmarkEvaluator {
    pub fn new(config: BenchmarkConfig) -> Self {
        Self { config }
    }

    /// Aggregates every comparison into every threshold bucket.
    ///
    /// Buckets are fully independent, so the sweep parallelizes over
    /// thresholds with each task writing only its own bucket.
    #[instrument(skip_all, fields(comparisons = comparisons.len(), resolution = self.config.resolution))]
    pub fn evaluate(&self, comparisons: &ComparisonSet) -> Result<BenchmarkReport, BenchError> {
        if self.config.resolution == 0 {
            return Err(BenchError::InvalidResolution { got: 0 });
        }
        if comparisons.is_empty() {
            return Err(BenchError::EmptyComparisonSet);
        }

        // Collect (expected, prediction) pairs up front so the sweep
        // does not re-check scoring per bucket.
        let outcomes = comparisons
            .iter()
            .map(|c| match c.prediction() {
                Some(prediction) => Ok((c.expected(), prediction)),
                None => Err(BenchError::UnscoredComparison {
                    reference: c.reference().as_str().to_owned(),
                    questioned: c.questioned().as_str().to_owned(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let resolution = self.config.resolution;
        let buckets: Vec<ThresholdBucket> = (0..resolution)
            .into_par_iter()
            .map(|i| {
                let mut bucket = ThresholdBucket::new(i as f64 / resolution as f64);
                for &(expected, prediction) in &outcomes {
                    bucket.record(expected, prediction);
                }
                bucket
            })
            .collect();

        let report = BenchmarkReport { buckets };
        if let Some(eer) = report.eer() {
            debug!(
                threshold = eer.threshold,
                far = eer.far,
                frr = eer.frr,
                "equal error rate located"
            );
        }
        Ok(report)
    }
}

/// The point on the error curves where FAR and FRR are closest.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EerPoint {
    pub threshold: f64,
    pub far: f64,
    pub frr: f64,
    pub aer: f64,
}

/// Error-rate curves produced by one benchmark sweep.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    buckets: Vec<ThresholdBucket>,
}

impl BenchmarkReport {
    pub fn buckets(&self) -> &[ThresholdBucket] {
        &self.buckets
    }

    /// The bucket minimizing `|FAR - FRR|`, ties broken by the lowest
    /// threshold. `None` when every bucket has an undefined rate.
    pub fn eer(&self) -> Option<EerPoint> {
        let mut best: Option<(&ThresholdBucket, f64)> = None;
        for bucket in &self.buckets {
            let gap = (bucket.far() - bucket.frr()).abs();
            if gap.is_nan() {
                continue;
            }
            if best.is_none_or(|(_, best_gap)| gap < best_gap) {
                best = Some((bucket, gap));
            }
        }
        best.map(|(bucket, _)| EerPoint {
            threshold: bucket.threshold(),
            far: bucket.far(),
            frr: bucket.frr(),
            aer: bucket.aer(),
        })
    }

    /// Like [`Self::eer`] but surfaces a degenerate run as an error.
    pub fn require_eer(&self) -> Result<EerPoint, BenchError> {
        self.eer().ok_or(BenchError::DegenerateBenchmark)
    }
}
