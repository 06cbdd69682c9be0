//! Drive Mental - Repeat Playback
//!
//! Platform-agnostic playback control for Drive Mental.
//!
//! This crate provides:
//! - Playback engine contract ([`MediaEngine`]) and a normalizing adapter
//!   ([`EngineAdapter`]) with seek clamping, error classification and a
//!   readiness fallback for engines that drop metadata events
//! - Repeat controller: N plays (or forever), optional silent pause between
//!   repeats, pause/resume/reset
//! - Background music coordinator: an ambient track looping forever, either
//!   independent of or synced with the main track
//! - Player: the composition of both, driven by preference snapshots
//! - Volume control (0-100%, mute/unmute)
//!
//! # Architecture
//!
//! `drive-playback` is single-threaded and event-driven. Nothing runs on its
//! own: the owner calls [`Player::tick`] with the elapsed time, the player
//! drains engine events, advances the inter-repeat countdown and queues
//! [`PlaybackEvent`]s for the UI to collect with [`Player::drain_events`].
//!
//! Platform audio output is provided through the [`MediaEngine`] trait.
//! [`SimulatedEngine`] implements it on a virtual clock.
//!
//! # Example: Three repeats with a two second gap
//!
//! ```rust
//! use drive_core::types::{PlaybackPreferences, Track};
//! use drive_playback::{ControllerState, Player, SimulatedEngine};
//! use std::time::Duration;
//!
//! let prefs = PlaybackPreferences {
//!     repeat_count: 3,
//!     inter_repeat_pause_seconds: 2.0,
//!     ..Default::default()
//! };
//!
//! let engine = SimulatedEngine::new(Duration::from_secs(10));
//! let mut player = Player::new(engine, &prefs);
//! player.load(&Track::new("Calm", "https://cdn.example.com/calm.mp3"));
//! player.play().unwrap();
//!
//! let step = Duration::from_millis(100);
//! let mut elapsed = Duration::ZERO;
//! while player.state() != ControllerState::Stopped {
//!     player.tick(step);
//!     elapsed += step;
//! }
//!
//! assert_eq!(player.session().completed_repeats, 3);
//! assert!(elapsed >= Duration::from_secs(34));
//! ```

mod background;
mod engine;
mod error;
mod events;
mod player;
mod repeat;
pub mod types;
mod volume;

// Public exports
pub use background::BackgroundMusicCoordinator;
pub use engine::{
    EngineAdapter, EngineEvent, MediaEngine, MediaErrorKind, ReadyState, SimulatedEngine,
    MAX_READINESS_RETRIES,
};
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use player::Player;
pub use repeat::RepeatController;
pub use types::{ControllerState, PlaybackSession};
pub use volume::Volume;
