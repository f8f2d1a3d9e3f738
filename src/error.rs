//! Error types for the clinical-ml pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, ClinicalError>;

/// Main error type for the pipeline
///
/// Configuration and schema errors abort a run. Convergence errors are raised
/// per trial and isolated by the tuner.
#[derive(Error, Debug)]
pub enum ClinicalError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    #[error("Convergence failed after {iterations} iterations")]
    ConvergenceError { iterations: usize },

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Render error: {0}")]
    RenderError(String),
}

impl ClinicalError {
    /// Whether the error should abort the whole run rather than a single trial
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ClinicalError::ConvergenceError { .. })
    }
}

impl From<polars::error::PolarsError> for ClinicalError {
    fn from(err: polars::error::PolarsError) -> Self {
        ClinicalError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for ClinicalError {
    fn from(err: serde_json::Error) -> Self {
        ClinicalError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for ClinicalError {
    fn from(err: ndarray::ShapeError) -> Self {
        ClinicalError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
