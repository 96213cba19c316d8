use ductus_verify::Score;

use crate::comparison::ComparisonSet;
use crate::error::BenchError;

/// External scoring backend for a batch of comparisons.
///
/// Implementations receive the metadata table of a [`ComparisonSet`]
/// (column names plus one row per comparison, in set order) and return
/// one forgery-polarity score per row. Remote scorers live behind this
/// trait so network concerns stay out of the evaluation core.
pub trait ScoreProvider {
    /// Human-readable provider name, used in error reports.
    fn name(&self) -> &str;

    /// Scores one batch. Must return exactly one score per input row.
    fn score_batch(&self, header: &[String], rows: &[Vec<f64>]) -> Result<Vec<Score>, BenchError>;
}

/// Scores every comparison in the set through `provider`, attaching the
/// returned predictions in order.
pub fn apply_provider(
    comparisons: &mut ComparisonSet,
    provider: &dyn ScoreProvider,
) -> Result<(), BenchError> {
    comparisons.refresh_keys();
    let header: Vec<String> = comparisons.header().to_vec();
    let rows: Vec<Vec<f64>> = comparisons.iter().map(|c| comparisons.row(c)).collect();

    let scores = provider.score_batch(&header, &rows)?;
    if scores.len() != rows.len() {
        return Err(BenchError::Provider {
            provider: provider.name().to_owned(),
            message: format!("expected {} scores, got {}", rows.len(), scores.len()),
        });
    }
    for (comparison, score) in comparisons.iter_mut().zip(scores) {
        comparison.set_prediction(score);
    }
    Ok(())
}
