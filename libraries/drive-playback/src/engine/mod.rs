//! Platform-agnostic playback engine contract
//!
//! Abstracts the platform media primitive (an audio element, a native
//! player, a decoder + output stream) behind a small pull-based event
//! interface. The controller never talks to an engine directly; it goes
//! through [`EngineAdapter`], which normalizes the event surface.

mod adapter;
mod simulated;

pub use adapter::{EngineAdapter, MAX_READINESS_RETRIES};
pub use simulated::SimulatedEngine;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How much of the media is available, lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReadyState {
    /// Nothing known about the source yet
    HaveNothing,

    /// Duration and format are known
    HaveMetadata,

    /// Data for the current position only
    HaveCurrentData,

    /// Enough data to start playing
    HaveFutureData,

    /// Enough data to play through without stalling
    HaveEnoughData,
}

/// Platform error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaErrorKind {
    /// Loading was aborted
    Aborted,

    /// Network failure while fetching the source
    Network,

    /// Source could not be decoded
    Decode,

    /// Format or source not supported
    SrcNotSupported,

    /// Anything else
    Unknown,
}

impl MediaErrorKind {
    /// Human-readable description shown to the listener
    pub fn describe(self) -> &'static str {
        match self {
            Self::Aborted => "Audio loading was aborted",
            Self::Network => "A network error interrupted the audio download",
            Self::Decode => "The audio could not be decoded",
            Self::SrcNotSupported => "The audio format is not supported",
            Self::Unknown => "An unknown audio error occurred",
        }
    }
}

/// Events emitted by a playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// Duration became known
    LoadedMetadata {
        /// Total track duration
        duration: Duration,
    },

    /// Enough data is buffered to start playing
    CanPlay,

    /// Playback position moved
    TimeUpdate {
        /// Current position
        position: Duration,
    },

    /// Playback started or resumed
    Play,

    /// Playback paused
    Pause,

    /// Playback reached the end of the track
    Ended,

    /// Loading or playback failed
    Error {
        /// Classification
        kind: MediaErrorKind,
        /// Human-readable message
        message: String,
    },
}

/// Platform media primitive
///
/// Implementors wrap one playable source at a time. All calls are
/// synchronous; asynchronous outcomes (metadata, buffering, errors, end of
/// track) are reported as [`EngineEvent`]s from [`MediaEngine::poll`].
pub trait MediaEngine: Send {
    /// Bind a new source, discarding the previous one
    ///
    /// Never fails synchronously: an unreachable or unsupported source is
    /// reported later as [`EngineEvent::Error`].
    fn load(&mut self, url: &str);

    /// Start or resume playback
    ///
    /// # Returns
    /// * `Ok(())` - Playback requested
    /// * `Err(PlaybackError::PlaybackBlocked)` - Rejected by platform policy
    fn play(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self);

    /// Move the playhead (callers clamp; see [`EngineAdapter::seek`])
    fn set_position(&mut self, position: Duration);

    /// Current playhead position
    fn position(&self) -> Duration;

    /// Track duration, if known
    fn duration(&self) -> Option<Duration>;

    /// Output volume as a fraction in 0.0..=1.0
    fn set_volume(&mut self, volume: f32);

    /// Mute without touching the volume
    fn set_muted(&mut self, muted: bool);

    /// `true` while not playing
    fn is_paused(&self) -> bool;

    /// Current buffering/decoding state
    fn ready_state(&self) -> ReadyState;

    /// Drain events produced since the previous poll
    ///
    /// `elapsed` is the wall time since the previous poll. Engines running on
    /// their own clock ignore it; virtual-clock engines advance by it.
    fn poll(&mut self, elapsed: Duration) -> Vec<EngineEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_state_ordering() {
        assert!(ReadyState::HaveNothing < ReadyState::HaveMetadata);
        assert!(ReadyState::HaveMetadata < ReadyState::HaveFutureData);
        assert!(ReadyState::HaveEnoughData >= ReadyState::HaveFutureData);
    }

    #[test]
    fn every_error_kind_has_a_message() {
        for kind in [
            MediaErrorKind::Aborted,
            MediaErrorKind::Network,
            MediaErrorKind::Decode,
            MediaErrorKind::SrcNotSupported,
            MediaErrorKind::Unknown,
        ] {
            assert!(!kind.describe().is_empty());
        }
    }
}
