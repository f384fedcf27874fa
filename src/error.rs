//! Error types for the stegtriage analysis pipeline.
//!
//! Analyzers return these errors to the orchestrator, which folds them
//! into the failing analyzer's own report slot. Nothing in this enum is
//! pipeline-fatal except session setup failures surfaced to callers.

use thiserror::Error;

/// Main error type for stegtriage operations.
#[derive(Debug, Error)]
pub enum StegError {
    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bounded read limits exceeded while ingesting an artifact
    #[error(transparent)]
    Limits(#[from] crate::io::error::IoError),

    /// The artifact could not be decoded as an image
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// A derived image could not be encoded or written
    #[error("Image encode error: {0}")]
    ImageEncode(String),

    /// External process could not be driven to completion
    #[error("Tool error ({tool}): {message}")]
    Tool { tool: String, message: String },

    /// Operation timeout
    #[error("Operation timeout after {seconds}s")]
    Timeout { seconds: u64 },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A relative path escapes or is not valid inside a session
    #[error("Unsafe session path: {0}")]
    UnsafePath(String),

    /// Session directory could not be created or located
    #[error("Session error: {0}")]
    Session(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<image::ImageError> for StegError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Encoding(_) => StegError::ImageEncode(err.to_string()),
            image::ImageError::IoError(e) => StegError::Io(e),
            other => StegError::ImageDecode(other.to_string()),
        }
    }
}

/// Result type alias for stegtriage operations
pub type Result<T> = std::result::Result<T, StegError>;
