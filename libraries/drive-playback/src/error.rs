//! Error types for playback control

use crate::engine::MediaErrorKind;
use thiserror::Error;

/// Playback errors
///
/// Every variant except the API-misuse ones is terminal for the session: the
/// controller moves to `Error` and waits for the listener to press play again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// Source unreachable, unsupported or aborted
    #[error("Failed to load audio: {0}")]
    Load(String),

    /// Platform refused to start playback (autoplay policy)
    #[error("Playback blocked: {0}")]
    PlaybackBlocked(String),

    /// Source could not be decoded
    #[error("Audio decoding failed: {0}")]
    Decode(String),

    /// Unclassified engine failure
    #[error("Playback error: {0}")]
    Unknown(String),

    /// No track is currently loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl PlaybackError {
    /// Map an engine error event onto the taxonomy
    pub fn from_media(kind: MediaErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            MediaErrorKind::Aborted | MediaErrorKind::Network | MediaErrorKind::SrcNotSupported => {
                Self::Load(message)
            }
            MediaErrorKind::Decode => Self::Decode(message),
            MediaErrorKind::Unknown => Self::Unknown(message),
        }
    }
}

impl From<PlaybackError> for drive_core::DriveError {
    fn from(err: PlaybackError) -> Self {
        drive_core::DriveError::playback(err.to_string())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
