//! Error types for unscan library.

use std::io;
use thiserror::Error;

/// Result type alias for unscan operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during page analysis.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input bytes are not a supported raster format.
    #[error("Unknown file format: not a supported page image")]
    UnknownFormat,

    /// The page raster could not be decoded.
    #[error("Image decoding error: {0}")]
    ImageDecode(String),

    /// The page raster has zero width or height.
    #[error("Page {0} has an empty raster")]
    EmptyImage(u32),

    /// An OCR backend failed on a region.
    #[error("Recognition error: {0}")]
    Recognition(String),

    /// The requested OCR backend is not registered or cannot run.
    #[error("Recognition backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A configuration file or value is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error during rendering (JSON, text, HTML).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => Error::Io(e),
            image::ImageError::Unsupported(_) => Error::UnknownFormat,
            _ => Error::ImageDecode(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}
