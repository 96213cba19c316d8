//! Result writers for verification runs.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use ductus_bench::{BenchmarkReport, ComparisonSet, EerPoint};
use ductus_verify::Origin;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;

/// Validated run name, used as the prefix of every output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunName(String);

impl RunName {
    /// Validate and wrap a run name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidRunName`] for names with characters
    /// outside `[a-zA-Z0-9_-]` or empty names.
    pub fn new(name: impl Into<String>) -> Result<Self, IoError> {
        let name = name.into();
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(IoError::InvalidRunName { name });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Writes scored comparisons and benchmark curves to the output
/// directory.
///
/// Creates the directory on construction if it does not exist. Output
/// files are named `{run}_predictions.txt`, `{run}_results.csv`,
/// `{run}_benchmark.csv` and `{run}_summary.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    run: RunName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and run name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be
    /// created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), run = %run))]
    pub fn new(output_dir: &Path, run: RunName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            run,
        })
    }

    fn path(&self, suffix: &str) -> PathBuf {
        self.output_dir.join(format!("{}_{suffix}", self.run))
    }

    /// Write bare predictions to `{run}_predictions.txt`, one line per
    /// comparison: `reference questioned expected prediction`.
    #[instrument(skip_all)]
    pub fn write_predictions(&self, comparisons: &ComparisonSet) -> Result<(), IoError> {
        let path = self.path("predictions.txt");
        let mut content = String::new();
        for comparison in comparisons.iter() {
            let prediction = comparison
                .prediction()
                .map_or_else(|| "-".to_owned(), |p| p.to_string());
            content.push_str(&format!(
                "{} {} {} {}\n",
                comparison.reference(),
                comparison.questioned(),
                comparison.expected().as_int(),
                prediction
            ));
        }
        fs::write(&path, content).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;
        info!(path = %path.display(), "predictions written");
        Ok(())
    }

    /// Write the full comparison table to `{run}_results.csv`.
    ///
    /// Fixed columns first, then one column per metadata key in
    /// first-seen order; missing metadata cells are left empty.
    #[instrument(skip_all)]
    pub fn write_results(&self, comparisons: &ComparisonSet) -> Result<(), IoError> {
        let path = self.path("results.csv");
        let write_error = |e: std::io::Error| IoError::WriteFile {
            path: path.clone(),
            source: e,
        };
        let mut wtr = csv::Writer::from_path(&path).map_err(|e| csv_io_error(e, &path))?;

        let mut header = vec![
            "reference".to_owned(),
            "questioned".to_owned(),
            "expected".to_owned(),
            "prediction".to_owned(),
        ];
        header.extend(comparisons.header().iter().cloned());
        wtr.write_record(&header)
            .map_err(|e| csv_io_error(e, &path))?;

        for comparison in comparisons.iter() {
            let mut record = vec![
                comparison.reference().as_str().to_owned(),
                comparison.questioned().as_str().to_owned(),
                comparison.expected().as_int().to_string(),
                comparison
                    .prediction()
                    .map_or_else(String::new, |p| p.value().to_string()),
            ];
            for value in comparisons.row(comparison) {
                record.push(if value.is_nan() {
                    String::new()
                } else {
                    value.to_string()
                });
            }
            wtr.write_record(&record).map_err(|e| csv_io_error(e, &path))?;
        }
        wtr.flush().map_err(write_error)?;

        info!(path = %path.display(), n_rows = comparisons.len(), "results written");
        Ok(())
    }

    /// Write the error-rate curves to `{run}_benchmark.csv` with
    /// columns `threshold,far,frr,aer`.
    #[instrument(skip_all)]
    pub fn write_benchmark(&self, report: &BenchmarkReport) -> Result<(), IoError> {
        let path = self.path("benchmark.csv");
        let mut wtr = csv::Writer::from_path(&path).map_err(|e| csv_io_error(e, &path))?;

        wtr.write_record(["threshold", "far", "frr", "aer"])
            .map_err(|e| csv_io_error(e, &path))?;
        for bucket in report.buckets() {
            wtr.write_record([
                bucket.threshold().to_string(),
                bucket.far().to_string(),
                bucket.frr().to_string(),
                bucket.aer().to_string(),
            ])
            .map_err(|e| csv_io_error(e, &path))?;
        }
        wtr.flush().map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), n_buckets = report.buckets().len(), "benchmark curves written");
        Ok(())
    }

    /// Write the run summary to `{run}_summary.json`.
    #[instrument(skip_all)]
    pub fn write_summary(
        &self,
        comparisons: &ComparisonSet,
        eer: Option<EerPoint>,
    ) -> Result<(), IoError> {
        let path = self.path("summary.json");

        let n_genuine = comparisons
            .iter()
            .filter(|c| c.expected() == Origin::Genuine)
            .count();
        let artifact = SummaryArtifact {
            run: self.run.as_str(),
            n_comparisons: comparisons.len(),
            n_genuine,
            n_forged: comparisons.len() - n_genuine,
            eer,
        };

        let json = serde_json::to_string_pretty(&artifact).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e.into(),
        })?;
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "summary written");
        Ok(())
    }
}

// csv write failures are I/O failures underneath; surface them as such.
fn csv_io_error(e: csv::Error, path: &Path) -> IoError {
    let source = match e.into_kind() {
        csv::ErrorKind::Io(source) => source,
        other => std::io::Error::other(format!("csv serialization failed: {other:?}")),
    };
    IoError::WriteFile {
        path: path.to_path_buf(),
        source,
    }
}

#[derive(Serialize)]
struct SummaryArtifact<'a> {
    run: &'a str,
    n_comparisons: usize,
    n_genuine: usize,
    n_forged: usize,
    eer: Option<EerPoint>,
}
