//! Error types for map rendering.

use seaice_common::SeaIceError;
use thiserror::Error;

/// Errors that can occur while colouring or encoding a map.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid colour map '{name}': {message}")]
    InvalidColormap { name: String, message: String },

    /// Crop margins leave nothing of the raster.
    #[error("crop window {window} does not fit a {size}x{size} raster")]
    InvalidCrop { window: String, size: usize },

    #[error("scale must be between 1 and {max}, got {scale}")]
    InvalidScale { scale: u32, max: u32 },

    #[error("invalid display maximum {0}")]
    InvalidRange(f64),

    #[error("PNG encoding failed: {0}")]
    Encoding(String),
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        Self::Encoding(err.to_string())
    }
}

impl From<RenderError> for SeaIceError {
    fn from(err: RenderError) -> Self {
        SeaIceError::RenderError(err.to_string())
    }
}

pub type RenderResult<T> = std::result::Result<T, RenderError>;
