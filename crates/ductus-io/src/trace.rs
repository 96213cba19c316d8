//! CSV pen-trace reader with full input validation.

use std::path::{Path, PathBuf};

use ductus_verify::{InputDevice, Signature, SignatureId, SignerId};
use tracing::{debug, instrument};

use crate::IoError;

/// Reads one signature trace from a CSV file.
///
/// Expected CSV format:
/// - Header row required with columns `x`, `y`, `t` and optionally `pressure`
/// - One row per sample; `t` is an integer timestamp, the rest are floats
/// - A `pressure` column marks the trace as a stylus capture; without it
///   the trace is treated as a finger capture
///
/// Identity is derived from the file name: the stem is the signature id
/// and the prefix before the first `_` is the signer id, so
/// `u0105_s1_sign.csv` belongs to signer `u0105`.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::InvalidTraceName`] | Stem has no `_` separator |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::MissingColumn`] | Header lacks `x`, `y` or `t` |
/// | [`IoError::InvalidValue`] | Cell is non-finite or unparseable |
/// | [`IoError::InvalidTrace`] | Parsed trace fails domain validation |
pub struct TraceReader {
    path: PathBuf,
}

impl TraceReader {
    /// Create a new reader for the given trace file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the trace, returning a [`Signature`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Signature, IoError> {
        let (id, signer) = self.identity()?;

        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.csv_error(e))?.clone();
        let col = |name: &'static str| -> Result<usize, IoError> {
            header
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(IoError::MissingColumn {
                    path: self.path.clone(),
                    column: name,
                })
        };
        let x_col = col("x")?;
        let y_col = col("y")?;
        let t_col = col("t")?;
        let pressure_col = header.iter().position(|h| h.trim() == "pressure");
        let device = match pressure_col {
            Some(_) => InputDevice::Stylus,
            None => InputDevice::Finger,
        };
        debug!(%device, "trace header read");

        let mut x = Vec::new();
        let mut y = Vec::new();
        let mut pressure = Vec::new();
        let mut t = Vec::new();

        for (line_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.csv_error(e))?;
            x.push(self.float_field(&record, x_col, "x", line_index)?);
            y.push(self.float_field(&record, y_col, "y", line_index)?);
            if let Some(p_col) = pressure_col {
                pressure.push(self.float_field(&record, p_col, "pressure", line_index)?);
            }
            let raw_t = record.get(t_col).unwrap_or("");
            let timestamp: i64 = raw_t.trim().parse().map_err(|_| IoError::InvalidValue {
                path: self.path.clone(),
                line_index,
                column: "t".to_owned(),
                raw: raw_t.to_owned(),
            })?;
            t.push(timestamp);
        }

        let pressure = pressure_col.map(|_| pressure);
        Signature::new(id, signer, device, x, y, pressure, t).map_err(|e| IoError::InvalidTrace {
            path: self.path.clone(),
            source: e,
        })
    }

    fn identity(&self) -> Result<(SignatureId, SignerId), IoError> {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| IoError::InvalidTraceName {
                path: self.path.clone(),
            })?;
        let (signer, _) = stem.split_once('_').ok_or_else(|| IoError::InvalidTraceName {
            path: self.path.clone(),
        })?;
        Ok((SignatureId::new(stem), SignerId::new(signer)))
    }

    fn float_field(
        &self,
        record: &csv::StringRecord,
        col: usize,
        column: &str,
        line_index: usize,
    ) -> Result<f64, IoError> {
        let raw = record.get(col).unwrap_or("");
        let invalid = || IoError::InvalidValue {
            path: self.path.clone(),
            line_index,
            column: column.to_owned(),
            raw: raw.to_owned(),
        };
        let value: f64 = raw.trim().parse().map_err(|_| invalid())?;
        if !value.is_finite() {
            return Err(invalid());
        }
        Ok(value)
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}
