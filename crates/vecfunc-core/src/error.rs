//! Error types for vecfunc

use datafusion::error::DataFusionError;
use thiserror::Error;

/// Result type alias for vecfunc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for vecfunc operations
#[derive(Error, Debug)]
pub enum Error {
    /// Host engine operation failed
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] DataFusionError),

    /// Arrow array operation failed
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading a config file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Function called with the wrong number or type of arguments
    #[error("Invalid arguments for {function}: {message}")]
    Argument { function: String, message: String },

    /// Vector dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// No distance algorithm with this name
    #[error("No matching distance function: {0}")]
    UnknownAlgorithm(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// FFI error
    #[error("FFI error: {0}")]
    Ffi(String),

    /// Generic error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Build an argument error for `function`
    pub fn argument(function: &str, message: impl Into<String>) -> Self {
        Self::Argument {
            function: function.to_string(),
            message: message.into(),
        }
    }
}

impl From<Error> for DataFusionError {
    fn from(err: Error) -> Self {
        match err {
            Error::DataFusion(inner) => inner,
            Error::Argument { .. } => DataFusionError::Plan(err.to_string()),
            other => DataFusionError::External(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownAlgorithm("manhattan".to_string());
        assert!(err.to_string().contains("manhattan"));
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = Error::DimensionMismatch {
            expected: 128,
            actual: 256,
        };
        assert!(err.to_string().contains("128"));
        assert!(err.to_string().contains("256"));
    }

    #[test]
    fn test_argument_error_becomes_plan_error() {
        let err: DataFusionError = Error::argument("vector", "expected one argument").into();
        assert!(matches!(err, DataFusionError::Plan(_)));
        assert!(err.to_string().contains("vector"));
    }

    #[test]
    fn test_kernel_error_becomes_external() {
        let err: DataFusionError = Error::DimensionMismatch {
            expected: 2,
            actual: 3,
        }
        .into();
        assert!(matches!(err, DataFusionError::External(_)));
    }
}
