//! I/O error types for ductus-io.

use std::path::PathBuf;

/// Errors from file I/O, trace parsing and result serialization.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when an input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when a file name cannot be split into signer and
    /// signature ids.
    #[error("cannot derive signature id from file name: {path}")]
    InvalidTraceName {
        /// Path to the trace file.
        path: PathBuf,
    },

    /// Returned when a trace file header lacks a required column.
    #[error("missing column \"{column}\" in {path}")]
    MissingColumn {
        /// Path to the trace file.
        path: PathBuf,
        /// Name of the absent column.
        column: &'static str,
    },

    /// Returned when a cell value is NaN, Inf, or not a parseable number.
    #[error("invalid value in {path}: line {line_index}, column \"{column}\", raw value \"{raw}\"")]
    InvalidValue {
        /// Path to the offending file.
        path: PathBuf,
        /// Zero-based data line index (excluding any header).
        line_index: usize,
        /// Column or field name.
        column: String,
        /// The raw string that failed to parse.
        raw: String,
    },

    /// Returned when a line-oriented file has the wrong field count.
    #[error("malformed line {line_index} in {path}: expected {expected}, got \"{line}\"")]
    MalformedLine {
        /// Path to the offending file.
        path: PathBuf,
        /// Zero-based line index.
        line_index: usize,
        /// Description of the expected layout.
        expected: &'static str,
        /// The offending line, truncated for display.
        line: String,
    },

    /// Returned when a file parses but contains no usable entries.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the offending file.
        path: PathBuf,
    },

    /// Returned when a trace fails domain validation after parsing.
    #[error("invalid trace in {path}")]
    InvalidTrace {
        /// Path to the trace file.
        path: PathBuf,
        /// Underlying validation error.
        source: ductus_verify::VerifyError,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the run name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid run name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidRunName {
        /// The invalid name.
        name: String,
    },
}
