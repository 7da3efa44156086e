//! I/O error types for mimic-io.

use std::path::PathBuf;

use mimic_dtw::SignalError;

/// Errors from trial file reading, validation, and result serialization.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
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

    /// Returned when the CSV file contains a header but zero data rows.
    #[error("empty trial (no data rows) in {path}")]
    EmptyTrial {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when a required column is absent from the header.
    #[error("missing column \"{column}\" in {path}")]
    MissingColumn {
        /// Path to the CSV file.
        path: PathBuf,
        /// Name of the missing column.
        column: &'static str,
    },

    /// Returned when a data row is too short to reach a required column.
    #[error("row {row_index} in {path} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Number of columns in the header.
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when a cell value is NaN, Inf, or otherwise not a finite float.
    #[error("non-finite value in {path}: row {row_index}, column {column}, raw value \"{raw}\"")]
    NonFiniteValue {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Name of the column.
        column: &'static str,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when parsed columns do not form a valid trajectory.
    #[error("invalid trajectory in {path}")]
    InvalidTrajectory {
        /// Path to the CSV file.
        path: PathBuf,
        /// Underlying validation error.
        source: SignalError,
    },

    /// Returned when a name used in file naming contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid {kind} name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidName {
        /// What the name identifies, e.g. "experiment" or "model".
        kind: &'static str,
        /// The invalid name.
        name: String,
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

    /// Returned when a result cannot be encoded as JSON.
    #[error("cannot serialize {path}")]
    Serialize {
        /// Path of the artifact being written.
        path: PathBuf,
        /// Underlying serializer error.
        source: serde_json::Error,
    },
}
