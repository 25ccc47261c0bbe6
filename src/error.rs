//! Error types for the diagnostic pipeline

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Schema violation: missing required columns: {}", missing.join(", "))]
    SchemaViolation { missing: Vec<String> },

    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("Loaded artifact is not a model: {0}")]
    NotAModel(String),

    #[error("Invalid label: {0}")]
    InvalidLabel(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("Failed to persist {path}: {reason}")]
    PersistError { path: String, reason: String },

    #[error("Task timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

/// Classification of a failure, used by the orchestrator to branch on
/// failure kind without inspecting error values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    SchemaViolation,
    EmptyDataset,
    ShapeMismatch,
    NotAModel,
    InvalidLabel,
    Io,
    Data,
    Serialization,
    Config,
    Computation,
    Timeout,
}

impl ErrorKind {
    /// Structural errors describe bad inputs; re-running the same stage on
    /// the same files cannot fix them.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            ErrorKind::SchemaViolation
                | ErrorKind::EmptyDataset
                | ErrorKind::ShapeMismatch
                | ErrorKind::NotAModel
                | ErrorKind::InvalidLabel
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::SchemaViolation => "SchemaViolation",
            ErrorKind::EmptyDataset => "EmptyDataset",
            ErrorKind::ShapeMismatch => "ShapeMismatch",
            ErrorKind::NotAModel => "NotAModel",
            ErrorKind::InvalidLabel => "InvalidLabel",
            ErrorKind::Io => "Io",
            ErrorKind::Data => "Data",
            ErrorKind::Serialization => "Serialization",
            ErrorKind::Config => "Config",
            ErrorKind::Computation => "Computation",
            ErrorKind::Timeout => "Timeout",
        };
        f.write_str(name)
    }
}

impl PipelineError {
    /// Kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::SchemaViolation { .. } => ErrorKind::SchemaViolation,
            PipelineError::EmptyDataset(_) => ErrorKind::EmptyDataset,
            PipelineError::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            PipelineError::NotAModel(_) => ErrorKind::NotAModel,
            PipelineError::InvalidLabel(_) => ErrorKind::InvalidLabel,
            PipelineError::DataError(_) => ErrorKind::Data,
            PipelineError::IoError(_) | PipelineError::PersistError { .. } => ErrorKind::Io,
            PipelineError::SerializationError(_) => ErrorKind::Serialization,
            PipelineError::ConfigError(_) => ErrorKind::Config,
            PipelineError::ComputationError(_) => ErrorKind::Computation,
            PipelineError::Timeout { .. } => ErrorKind::Timeout,
        }
    }

    /// Shorthand for a row-count mismatch between two paired tables
    pub fn row_mismatch(left: &str, left_rows: usize, right: &str, right_rows: usize) -> Self {
        PipelineError::ShapeMismatch {
            expected: format!("{} rows in {} (as in {})", left_rows, right, left),
            actual: format!("{} rows in {}", right_rows, right),
        }
    }
}

impl From<polars::error::PolarsError> for PipelineError {
    fn from(err: polars::error::PolarsError) -> Self {
        PipelineError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for PipelineError {
    fn from(err: ndarray::ShapeError) -> Self {
        PipelineError::ShapeMismatch {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

impl From<tempfile::PersistError> for PipelineError {
    fn from(err: tempfile::PersistError) -> Self {
        PipelineError::PersistError {
            path: err.file.path().display().to_string(),
            reason: err.error.to_string(),
        }
    }
}
