//! Comparison list reader.

use std::path::{Path, PathBuf};

use ductus_bench::{Comparison, ComparisonSet};
use ductus_verify::{Origin, SignatureId};
use tracing::{info, instrument};

use crate::IoError;

/// Reads a comparison list from a whitespace-delimited text file.
///
/// Each line holds three fields: reference signature id, questioned
/// signature id and the expected label (`0` = genuine, `1` = forged).
/// Blank lines and lines starting with `#` are skipped.
pub struct ComparisonReader {
    path: PathBuf,
}

impl ComparisonReader {
    /// Create a new reader for the given comparison file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read all comparisons, unscored, in file order.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<ComparisonSet, IoError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        let mut set = ComparisonSet::new();
        for (line_index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            let [reference, questioned, label] = fields[..] else {
                return Err(IoError::MalformedLine {
                    path: self.path.clone(),
                    line_index,
                    expected: "reference questioned label",
                    line: line.to_owned(),
                });
            };
            let expected = label
                .parse::<u8>()
                .ok()
                .and_then(Origin::from_int)
                .ok_or_else(|| IoError::InvalidValue {
                    path: self.path.clone(),
                    line_index,
                    column: "label".to_owned(),
                    raw: label.to_owned(),
                })?;
            set.push(Comparison::new(
                SignatureId::new(reference),
                SignatureId::new(questioned),
                expected,
            ));
        }

        if set.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }
        info!(n_comparisons = set.len(), "comparison list loaded");
        Ok(set)
    }
}
