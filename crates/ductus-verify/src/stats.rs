//! Population-level training statistics and the statistics-based scorer.
//!
//! Unlike the per-signer strategies, this scorer works from distance
//! distributions over a labeled training population: one statistics
//! record per (origin, input device) class, keyed structurally rather
//! than by description strings.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::VerifyError;
use crate::score::Score;
use crate::signature::{InputDevice, Origin};

/// Summary statistics of a distance sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingStatistics {
    /// Smallest observed distance.
    pub min: f64,
    /// Largest observed distance.
    pub max: f64,
    /// Arithmetic mean.
    pub average: f64,
    /// Median (mean of the two middle values for even-sized samples).
    pub median: f64,
    /// Population standard deviation.
    pub stdev: f64,
}

impl TrainingStatistics {
    /// Compute statistics from a distance sample.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::EmptyTrainingSet`] for an empty sample.
    pub fn from_sample(values: &[f64]) -> Result<Self, VerifyError> {
        if values.is_empty() {
            return Err(VerifyError::EmptyTrainingSet);
        }
        let n = values.len() as f64;
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        let average = sorted.iter().sum::<f64>() / n;
        let median = if sorted.len() % 2 == 1 {
            sorted[sorted.len() / 2]
        } else {
            (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) / 2.0
        };
        let variance = sorted.iter().map(|v| (v - average) * (v - average)).sum::<f64>() / n;

        Ok(Self {
            min,
            max,
            average,
            median,
            stdev: variance.sqrt(),
        })
    }
}

/// Structured key of one statistics record: the class it summarizes and
/// optionally the input device it is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatisticsKey {
    /// Ground-truth class of the summarized comparisons.
    pub origin: Origin,
    /// Device restriction; `None` pools both devices.
    pub device: Option<InputDevice>,
}

impl StatisticsKey {
    /// Key for a class pooled over all devices.
    #[must_use]
    pub fn pooled(origin: Origin) -> Self {
        Self {
            origin,
            device: None,
        }
    }

    /// Key for a class restricted to one device.
    #[must_use]
    pub fn per_device(origin: Origin, device: InputDevice) -> Self {
        Self {
            origin,
            device: Some(device),
        }
    }
}

impl fmt::Display for StatisticsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.device {
            Some(device) => write!(f, "{}_{}", self.origin, device),
            None => write!(f, "{}", self.origin),
        }
    }
}

impl FromStr for StatisticsKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('_') {
            Some((origin, device)) => Ok(Self {
                origin: origin.parse()?,
                device: Some(device.parse()?),
            }),
            None => Ok(Self {
                origin: s.parse()?,
                device: None,
            }),
        }
    }
}

/// Statistics records for a training run, one per key.
///
/// Returned from training and passed explicitly to testing; there is no
/// global accumulation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatisticsTable {
    entries: Vec<(StatisticsKey, TrainingStatistics)>,
}

impl StatisticsTable {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for `key`.
    pub fn insert(&mut self, key: StatisticsKey, stats: TrainingStatistics) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = stats;
        } else {
            self.entries.push((key, stats));
        }
    }

    /// The record for `key`, if present.
    #[must_use]
    pub fn get(&self, key: StatisticsKey) -> Option<&TrainingStatistics> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, s)| s)
    }

    /// Iterate over records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(StatisticsKey, TrainingStatistics)> {
        self.entries.iter()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Scores a 1v1 comparison from population statistics instead of a
/// per-signer model.
///
/// Distances below the genuine class minimum are confidently genuine;
/// distances above the forged class median are confidently forged;
/// between the two the score ramps linearly.
#[derive(Debug, Clone, Copy)]
pub struct StatisticsClassifier {
    genuine_min: f64,
    forged_median: f64,
}

impl StatisticsClassifier {
    /// Build a scorer from the two class summaries.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::DegenerateStatistics`] when the forged
    /// median does not exceed the genuine minimum, which would leave no
    /// band to interpolate over.
    pub fn new(
        genuine: &TrainingStatistics,
        forged: &TrainingStatistics,
    ) -> Result<Self, VerifyError> {
        if forged.median <= genuine.min {
            return Err(VerifyError::DegenerateStatistics {
                genuine_min: genuine.min,
                forged_median: forged.median,
            });
        }
        Ok(Self {
            genuine_min: genuine.min,
            forged_median: forged.median,
        })
    }

    /// Score a comparison distance; returns the probability of genuine.
    #[must_use]
    pub fn score(&self, distance: f64) -> Score {
        debug!(distance, self.genuine_min, self.forged_median, "statistics comparison");
        if distance < self.genuine_min {
            Score::new(1.0)
        } else if distance > self.forged_median {
            Score::new(0.0)
        } else {
            Score::new((self.forged_median - distance) / (self.forged_median - self.genuine_min))
        }
    }
}
