//! Persistence for training statistics tables.
//!
//! Statistics derived from a full training pass are saved so later runs
//! can skip retraining. The format is one semicolon-delimited line per
//! record:
//!
//! ```text
//! key;min;max;average;median;stdev
//! ```
//!
//! Floats use shortest round-trip formatting, so a reload reproduces
//! bit-equivalent values and therefore bit-equivalent thresholds.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use ductus_verify::{StatisticsKey, StatisticsTable, TrainingStatistics};
use tracing::{info, instrument};

use crate::IoError;

/// Reads and writes statistics files.
pub struct StatisticsStore {
    path: PathBuf,
}

impl StatisticsStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Write the table, one record per line, in table order.
    #[instrument(skip_all, fields(path = %self.path.display(), n = table.len()))]
    pub fn save(&self, table: &StatisticsTable) -> Result<(), IoError> {
        let mut content = String::new();
        for (key, stats) in table.iter() {
            // write! to a String cannot fail
            let _ = writeln!(
                content,
                "{key};{};{};{};{};{}",
                stats.min, stats.max, stats.average, stats.median, stats.stdev
            );
        }
        std::fs::write(&self.path, content).map_err(|e| IoError::WriteFile {
            path: self.path.clone(),
            source: e,
        })?;
        info!("statistics written");
        Ok(())
    }

    /// Read a table back in file order.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<StatisticsTable, IoError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        let mut table = StatisticsTable::new();
        for (line_index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(';').collect();
            let [key, min, max, average, median, stdev] = fields[..] else {
                return Err(IoError::MalformedLine {
                    path: self.path.clone(),
                    line_index,
                    expected: "key;min;max;average;median;stdev",
                    line: line.to_owned(),
                });
            };
            let key: StatisticsKey = key.parse().map_err(|_| IoError::InvalidValue {
                path: self.path.clone(),
                line_index,
                column: "key".to_owned(),
                raw: key.to_owned(),
            })?;
            let field = |name: &str, raw: &str| -> Result<f64, IoError> {
                raw.parse().map_err(|_| IoError::InvalidValue {
                    path: self.path.clone(),
                    line_index,
                    column: name.to_owned(),
                    raw: raw.to_owned(),
                })
            };
            table.insert(
                key,
                TrainingStatistics {
                    min: field("min", min)?,
                    max: field("max", max)?,
                    average: field("average", average)?,
                    median: field("median", median)?,
                    stdev: field("stdev", stdev)?,
                },
            );
        }

        if table.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }
        info!(n = table.len(), "statistics loaded");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ductus_verify::{InputDevice, Origin};
    use tempfile::TempDir;

    fn sample_table() -> StatisticsTable {
        let mut table = StatisticsTable::new();
        table.insert(
            StatisticsKey::per_device(Origin::Genuine, InputDevice::Stylus),
            TrainingStatistics::from_sample(&[0.5, 1.0 / 3.0, 2.75, 0.125]).unwrap(),
        );
        table.insert(
            StatisticsKey::pooled(Origin::Forged),
            TrainingStatistics::from_sample(&[10.0, 20.0, 40.0]).unwrap(),
        );
        table
    }

    #[test]
    fn save_load_round_trip_is_bit_equivalent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stats.csv");
        let original = sample_table();

        let store = StatisticsStore::new(&path);
        store.save(&original).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn file_layout_is_semicolon_delimited() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stats.csv");
        StatisticsStore::new(&path).save(&sample_table()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let first = content.lines().next().unwrap();
        assert!(first.starts_with("genuine_stylus;"));
        assert_eq!(first.split(';').count(), 6);
    }

    #[test]
    fn error_wrong_field_count() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stats.csv");
        std::fs::write(&path, "genuine;1;2;3\n").unwrap();
        let result = StatisticsStore::new(&path).load();
        assert!(matches!(result, Err(IoError::MalformedLine { .. })));
    }

    #[test]
    fn error_unknown_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stats.csv");
        std::fs::write(&path, "suspicious;1;2;3;4;5\n").unwrap();
        let result = StatisticsStore::new(&path).load();
        assert!(matches!(result, Err(IoError::InvalidValue { .. })));
    }
}
