//! Error types for the ingestion crate.

use seaice_common::SeaIceError;
use thiserror::Error;

/// Errors that can occur while acquiring source or reference data.
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to parse {file}: {message}")]
    Parse { file: String, message: String },

    #[error("Reference data is inconsistent: {0}")]
    InvalidReference(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl IngestionError {
    pub fn parse(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::FileRead(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

impl From<SeaIceError> for IngestionError {
    fn from(err: SeaIceError) -> Self {
        match err {
            SeaIceError::NotFound(msg) => Self::NotFound(msg),
            other => Self::InvalidReference(other.to_string()),
        }
    }
}

impl From<grid_processor::GridProcessorError> for IngestionError {
    fn from(err: grid_processor::GridProcessorError) -> Self {
        Self::InvalidReference(err.to_string())
    }
}

impl From<reqwest::Error> for IngestionError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

impl From<IngestionError> for SeaIceError {
    fn from(err: IngestionError) -> Self {
        if err.is_not_found() {
            return SeaIceError::NotFound(err.to_string());
        }
        match err {
            IngestionError::Parse { .. } | IngestionError::InvalidReference(_) => {
                SeaIceError::FormatError(err.to_string())
            }
            IngestionError::InvalidConfig(msg) => SeaIceError::InvalidParameter {
                param: "config".to_string(),
                message: msg,
            },
            other => SeaIceError::InternalError(other.to_string()),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestionError>;
