//! Error types for grid processing.

use seaice_common::SeaIceError;
use thiserror::Error;

/// Errors that can occur during grid processing.
#[derive(Error, Debug)]
pub enum GridProcessorError {
    /// Two inputs that must describe the same grid do not.
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// Reference data is unusable.
    #[error("invalid reference data: {0}")]
    InvalidReference(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl GridProcessorError {
    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a ConfigError.
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }
}

impl From<SeaIceError> for GridProcessorError {
    fn from(err: SeaIceError) -> Self {
        match err {
            SeaIceError::ShapeMismatch { expected, actual } => {
                Self::ShapeMismatch { expected, actual }
            }
            other => Self::InvalidReference(other.to_string()),
        }
    }
}

impl From<GridProcessorError> for SeaIceError {
    fn from(err: GridProcessorError) -> Self {
        match err {
            GridProcessorError::ShapeMismatch { expected, actual } => {
                SeaIceError::ShapeMismatch { expected, actual }
            }
            GridProcessorError::InvalidReference(msg) => SeaIceError::FormatError(msg),
            GridProcessorError::ConfigError(msg) => SeaIceError::InvalidParameter {
                param: "pipeline".to_string(),
                message: msg,
            },
        }
    }
}

/// Result type for grid processor operations.
pub type Result<T> = std::result::Result<T, GridProcessorError>;
