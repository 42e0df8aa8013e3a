//! Error types for sea-ice map services.

use thiserror::Error;

/// Result type alias using SeaIceError.
pub type SeaIceResult<T> = Result<T, SeaIceError>;

/// Primary error type shared by the collaborators around the raster core.
#[derive(Debug, Error)]
pub enum SeaIceError {
    // === Request Errors ===
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Data Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed data: {0}")]
    FormatError(String),

    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    // === Storage Errors ===
    #[error("Storage error: {0}")]
    StorageError(String),

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    RenderError(String),

    // === Infrastructure Errors ===
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl SeaIceError {
    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            SeaIceError::InvalidDate(_) | SeaIceError::InvalidParameter { .. } => 400,

            SeaIceError::NotFound(_) => 404,

            _ => 500,
        }
    }

    /// Whether the error means the requested data simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SeaIceError::NotFound(_))
    }
}

impl From<std::io::Error> for SeaIceError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            SeaIceError::NotFound(err.to_string())
        } else {
            SeaIceError::InternalError(err.to_string())
        }
    }
}
