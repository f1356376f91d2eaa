//! Error types for codesnap

use thiserror::Error;

/// Result type alias for codesnap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while editing, persisting, or exporting a snapshot
#[derive(Error, Debug)]
pub enum Error {
    /// The durable storage backend rejected a read or a write
    #[error("Storage error: {0}")]
    StorageError(String),

    /// A setting was given a value outside its allowed set
    #[error("Invalid value for {field}: {value}")]
    InvalidSetting { field: &'static str, value: String },

    /// Failed to rasterize the code block
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Failed to encode or deliver the exported image
    #[error("Export failed: {0}")]
    ExportError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "bitmap")]
impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::RenderError(err.to_string())
    }
}
