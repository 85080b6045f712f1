//! Common error types for the soundmoji pipeline

use thiserror::Error;

/// Common result type for soundmoji operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline error taxonomy
///
/// Every stage reports through one of these variants; nothing is retried and
/// errors propagate uncaught to the pipeline caller.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or missing metadata (columns, timestamps, score tables)
    #[error("Data format error: {0}")]
    DataFormat(String),

    /// Unreadable audio/asset files, or an extraction range outside the audio
    #[error("Resource error: {0}")]
    Resource(String),

    /// Tagger output length inconsistent with the label vocabulary
    #[error("Shape mismatch: expected {expected} scores, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Denylist excludes every candidate label
    #[error("Selection exhausted: {0}")]
    Exhausted(String),

    /// Asset identifier not present in the asset store
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// Stored asset payload is not valid encoded image data
    #[error("Decode error: {0}")]
    Decode(String),

    /// Rendering backend failure
    #[error("Render error: {0}")]
    Render(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::DataFormat(format!("CSV: {}", e))
    }
}

impl From<base64::DecodeError> for Error {
    fn from(e: base64::DecodeError) -> Self {
        Error::Decode(format!("base64: {}", e))
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Decode(format!("image: {}", e))
    }
}
