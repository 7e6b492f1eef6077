//! Error types for sepsis data ingestion.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during ingestion and corpus persistence.
#[derive(Debug, Error)]
pub enum IngestError {
    // === Missing Inputs ===
    /// An expected input is absent. `hint` tells the user how to produce it.
    #[error("{path} not found; {hint}")]
    SourceUnavailable { path: PathBuf, hint: String },

    // === File System Errors ===
    /// Failed to read a file or directory.
    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Parsing Errors ===
    /// Malformed delimited text.
    #[error("failed to parse {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// File has no header row.
    #[error("file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    /// Patient file has no raw onset label column.
    #[error("label column '{column}' not found in {path}")]
    MissingLabelColumn { column: String, path: PathBuf },

    /// A cell that should be numeric is not.
    #[error("invalid {column} value '{value}' on line {line} of {path}")]
    InvalidValue {
        path: PathBuf,
        line: u64,
        column: String,
        value: String,
    },

    // === Schema Errors ===
    /// Required columns are absent and cannot be patched.
    #[error("{path} is missing required columns: {}", missing.join(", "))]
    SchemaMismatch { path: PathBuf, missing: Vec<String> },

    // === Model Errors ===
    #[error(transparent)]
    Model(#[from] sews_model::ModelError),

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Maps an open/read failure, promoting "not found" to [`IngestError::SourceUnavailable`].
pub(crate) fn read_error(path: &std::path::Path, err: std::io::Error, hint: &str) -> IngestError {
    if err.kind() == std::io::ErrorKind::NotFound {
        IngestError::SourceUnavailable {
            path: path.to_path_buf(),
            hint: hint.to_string(),
        }
    } else {
        IngestError::FileRead {
            path: path.to_path_buf(),
            source: err,
        }
    }
}
