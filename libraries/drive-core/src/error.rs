//! Core error types for Drive Mental

use thiserror::Error;

/// Result type alias using `DriveError`
pub type Result<T> = std::result::Result<T, DriveError>;

/// Core error type for Drive Mental
#[derive(Error, Debug)]
pub enum DriveError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Audio playback errors
    #[error("Playback error: {0}")]
    Playback(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl DriveError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a playback error
    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }
}
