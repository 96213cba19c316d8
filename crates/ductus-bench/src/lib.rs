//! Benchmark evaluation for signature verification runs.
//!
//! A scored [`ComparisonSet`] is swept over a grid of decision thresholds;
//! each [`ThresholdBucket`] accumulates false-acceptance and false-rejection
//! counts, and the [`BenchmarkReport`] derives FAR/FRR/AER curves and the
//! equal error rate from them.

mod bucket;
mod comparison;
mod error;
mod evaluator;
mod provider;

pub use bucket::ThresholdBucket;
pub use comparison::{Comparison, ComparisonSet};
pub use error::BenchError;
pub use evaluator::{BenchmarkConfig, BenchmarkEvaluator, BenchmarkReport, EerPoint};
pub use provider::{ScoreProvider, apply_provider};
