//! Playback Events
//!
//! Event-based communication for UI synchronization during playback.
//! Events are queued at key points and collected with `drain_events`:
//! - State changes (loading, playing, paused, gap, stopped, error)
//! - Repeat completions (one per finished play, before the loop/stop decision)
//! - Inter-repeat countdown progress
//! - Position updates (every tick while playing, if progress is shown)
//! - Background music state

use crate::types::ControllerState;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Main controller state changed
    StateChanged {
        /// The new state
        state: ControllerState,
    },

    /// One play of the main track finished
    ///
    /// Fires on every completion, including the last one.
    RepeatCompleted {
        /// Plays finished so far
        completed: u32,
        /// Configured number of plays (`None` = infinite)
        target: Option<u32>,
    },

    /// Gap between repeats started
    InterRepeatPauseStarted {
        /// Length of the gap in milliseconds
        duration_ms: u64,
    },

    /// Gap between repeats still running
    InterRepeatCountdown {
        /// Time left before the next play
        remaining_ms: u64,
    },

    /// Position update
    PositionUpdate {
        /// Current playback position
        position_ms: u64,
        /// Total track duration (0 if unknown)
        duration_ms: u64,
    },

    /// Volume changed
    VolumeChanged {
        /// New volume level (0-100)
        level: u8,
        /// Whether audio is muted
        is_muted: bool,
    },

    /// Background music started or stopped
    BackgroundStateChanged {
        /// Whether the background track is audible
        is_playing: bool,
    },

    /// Background track wrapped around to the start
    BackgroundLooped {
        /// Loops completed so far
        loops: u32,
    },

    /// Main track failed
    Error {
        /// Error message
        message: String,
    },

    /// Background track failed (main playback continues)
    BackgroundError {
        /// Error message
        message: String,
    },
}

impl PlaybackEvent {
    /// `true` for either error variant
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. } | Self::BackgroundError { .. })
    }
}
