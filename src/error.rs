//! Processing error types
//!
//! One enum covers the whole pipeline: missing originals, undecodable
//! bytes, unregistered formats, malformed size tables, and storage
//! failures surfaced from the caller-supplied store.

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur while processing an image into its versions
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The original image was not present in the store
    #[error("source image not found: {path}")]
    NotFound { path: String },

    /// The stored bytes could not be decoded as an image
    #[error("failed to decode image: {message}")]
    InvalidImage { message: String },

    /// The image decoded, but no handler is registered for its format
    #[error("unsupported image format: {format}")]
    UnsupportedFormat { format: String },

    /// The size table is malformed (zero max_side, empty or duplicate names)
    #[error("invalid size configuration: {message}")]
    SizeConfiguration { message: String },

    /// Pixel resize failed
    #[error("resize failed: {message}")]
    Resize { message: String },

    /// Re-encoding a resized image failed
    #[error("failed to encode to {format}: {message}")]
    Encode { format: String, message: String },

    /// A store read, write or delete failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl ProcessError {
    /// Helper constructors for common error patterns
    pub fn not_found(path: impl Into<String>) -> Self {
        ProcessError::NotFound { path: path.into() }
    }

    pub fn invalid_image(message: impl Into<String>) -> Self {
        ProcessError::InvalidImage {
            message: message.into(),
        }
    }

    pub fn unsupported_format(format: impl Into<String>) -> Self {
        ProcessError::UnsupportedFormat {
            format: format.into(),
        }
    }

    pub fn size_configuration(message: impl Into<String>) -> Self {
        ProcessError::SizeConfiguration {
            message: message.into(),
        }
    }

    pub fn resize(message: impl Into<String>) -> Self {
        ProcessError::Resize {
            message: message.into(),
        }
    }

    pub fn encode(format: impl Into<String>, message: impl Into<String>) -> Self {
        ProcessError::Encode {
            format: format.into(),
            message: message.into(),
        }
    }
}
