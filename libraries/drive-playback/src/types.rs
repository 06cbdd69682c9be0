//! Core types for playback control

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Repeat controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerState {
    /// No track loaded
    Idle,

    /// Source bound, waiting for the engine to become playable
    Loading,

    /// Playable, not started
    Ready,

    /// Playing audio
    Playing,

    /// Paused by the listener
    Paused,

    /// Silent gap between two automatic repeats; track held at 0
    InterRepeatPause,

    /// All repeats completed
    Stopped,

    /// Terminal failure; play again to retry
    Error,
}

impl ControllerState {
    /// `true` while the session counts as running (including the gap)
    pub fn is_active(self) -> bool {
        matches!(self, Self::Playing | Self::InterRepeatPause)
    }
}

/// Ephemeral state of one playback session
///
/// Used for both the main track and the background track.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSession {
    /// Source of the loaded track
    pub track_url: String,

    /// Listener-visible playing flag (stays set during the inter-repeat gap)
    pub is_playing: bool,

    /// Playhead position
    pub current_time: Duration,

    /// Track duration, once known
    pub duration: Option<Duration>,

    /// Plays finished in this session
    pub completed_repeats: u32,

    /// Output muted
    pub is_muted: bool,

    /// Waiting out the gap between repeats
    pub is_paused_between_repeats: bool,
}

impl PlaybackSession {
    /// Fresh session for `track_url`
    pub fn new(track_url: impl Into<String>, is_muted: bool) -> Self {
        Self {
            track_url: track_url.into(),
            is_muted,
            ..Default::default()
        }
    }
}
