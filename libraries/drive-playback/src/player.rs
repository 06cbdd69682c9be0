//! Player - composition of the main track and background music
//!
//! Owns one [`RepeatController`] and, optionally, one
//! [`BackgroundMusicCoordinator`]. In independent mode
//! (`background_mix_with_main = true`) background music only follows explicit
//! play requests. In synced mode it plays exactly while the main track is
//! active: pausing, stopping or failing the main track pauses it, and resuming
//! the main track resumes it. The gap between repeats counts as active.

use crate::{
    background::BackgroundMusicCoordinator,
    engine::MediaEngine,
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    repeat::RepeatController,
    types::{ControllerState, PlaybackSession},
};
use drive_core::types::{PlaybackPreferences, Track};
use std::time::Duration;

/// Main track plus optional background music, driven by one tick
pub struct Player<E: MediaEngine> {
    main: RepeatController<E>,
    background: Option<BackgroundMusicCoordinator<E>>,
    prefs: PlaybackPreferences,

    // Main activity as of the last sync, to detect transitions
    main_was_active: bool,
}

impl<E: MediaEngine> Player<E> {
    /// Create a player without background music
    pub fn new(engine: E, prefs: &PlaybackPreferences) -> Self {
        let prefs = prefs.clone().clamped();
        Self {
            main: RepeatController::new(engine, &prefs),
            background: None,
            prefs,
            main_was_active: false,
        }
    }

    /// Create a player with a second engine for background music
    pub fn with_background(main: E, background: E, prefs: &PlaybackPreferences) -> Self {
        let prefs = prefs.clone().clamped();
        Self {
            main: RepeatController::new(main, &prefs),
            background: Some(BackgroundMusicCoordinator::new(background, &prefs)),
            prefs,
            main_was_active: false,
        }
    }

    // ===== Loading =====

    /// Load the main track
    pub fn load(&mut self, track: &Track) {
        self.main.load(track);
        self.sync_background();
    }

    /// Load the ambient track
    ///
    /// # Returns
    /// * `Err(PlaybackError::InvalidOperation)` - Player was built without a
    ///   background engine
    pub fn load_background(&mut self, track: &Track) -> Result<()> {
        let background = self.background.as_mut().ok_or_else(|| {
            PlaybackError::InvalidOperation("no background engine configured".to_string())
        })?;
        background.load(track);
        Ok(())
    }

    // ===== Playback Control =====

    /// Start or resume the main track (and background music)
    ///
    /// Background failures never fail this call; they are reported as
    /// [`PlaybackEvent::BackgroundError`].
    pub fn play(&mut self) -> Result<()> {
        let result = self.main.play();

        let follow_main = self.is_synced();
        let main_active = self.main.state().is_active();
        if let Some(background) = self.background.as_mut() {
            if result.is_ok() && background.is_loaded() && (!follow_main || main_active) {
                if let Err(e) = background.play() {
                    tracing::warn!(error = %e, "Background music did not start");
                }
            }
        }
        self.main_was_active = main_active;

        result
    }

    /// Pause the main track (and background music in synced mode)
    pub fn pause(&mut self) {
        self.main.pause();
        if self.is_synced() {
            if let Some(background) = self.background.as_mut() {
                background.pause();
            }
        }
        self.main_was_active = self.main.state().is_active();
    }

    /// Play if the main track is not active, pause otherwise
    pub fn toggle(&mut self) -> Result<()> {
        if self.main.state().is_active() {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Rewind the main track and zero its repeat counter
    pub fn reset(&mut self) {
        self.main.reset();
    }

    /// Seek within the main track
    pub fn seek(&mut self, position: Duration) -> Result<()> {
        self.main.seek(position)
    }

    /// Set main volume level (0-100)
    pub fn set_volume(&mut self, level: u8) {
        self.main.set_volume(level);
        self.prefs.volume_percent = self.main.volume();
    }

    /// Mute or unmute both tracks
    pub fn set_muted(&mut self, muted: bool) {
        self.main.set_muted(muted);
        if let Some(background) = self.background.as_mut() {
            background.set_muted(muted);
        }
    }

    /// Apply a new preference snapshot to both tracks
    pub fn apply_preferences(&mut self, prefs: &PlaybackPreferences) {
        let prefs = prefs.clone().clamped();
        if prefs == self.prefs {
            return;
        }

        self.main.apply_preferences(&prefs);

        let main_active = self.main.state().is_active();
        if let Some(background) = self.background.as_mut() {
            let was_enabled = background.is_enabled();
            background.set_enabled(prefs.background_music_enabled);
            background.set_volume(prefs.background_volume_percent);

            if prefs.background_music_enabled && background.is_loaded() {
                if !was_enabled && main_active {
                    if let Err(e) = background.play() {
                        tracing::warn!(error = %e, "Background music did not start");
                    }
                } else if !prefs.background_mix_with_main && !main_active {
                    background.pause();
                }
            }
        }

        self.prefs = prefs;
    }

    /// Advance both tracks by `elapsed`
    pub fn tick(&mut self, elapsed: Duration) {
        self.main.tick(elapsed);
        if let Some(background) = self.background.as_mut() {
            background.tick(elapsed);
        }
        self.sync_background();
    }

    /// Stop listening to both engines and cancel any countdown
    pub fn close(&mut self) {
        self.main.close();
        if let Some(background) = self.background.as_mut() {
            background.close();
        }
        self.main_was_active = false;
    }

    // ===== State Queries =====

    /// Main controller state
    pub fn state(&self) -> ControllerState {
        self.main.state()
    }

    /// Main session
    pub fn session(&self) -> &PlaybackSession {
        self.main.session()
    }

    /// Whether both tracks are muted
    pub fn is_muted(&self) -> bool {
        self.main.is_muted()
    }

    /// Preference snapshot in effect
    pub fn preferences(&self) -> &PlaybackPreferences {
        &self.prefs
    }

    /// Main repeat controller
    pub fn main(&self) -> &RepeatController<E> {
        &self.main
    }

    /// Mutable main repeat controller
    pub fn main_mut(&mut self) -> &mut RepeatController<E> {
        &mut self.main
    }

    /// Background music coordinator, if configured
    pub fn background(&self) -> Option<&BackgroundMusicCoordinator<E>> {
        self.background.as_ref()
    }

    /// Mutable background music coordinator, if configured
    pub fn background_mut(&mut self) -> Option<&mut BackgroundMusicCoordinator<E>> {
        self.background.as_mut()
    }

    /// Take all queued events, main track first
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        let mut events = self.main.drain_events();
        if let Some(background) = self.background.as_mut() {
            events.extend(background.drain_events());
        }
        events
    }

    // ===== Internals =====

    fn is_synced(&self) -> bool {
        !self.prefs.background_mix_with_main
    }

    /// Propagate main-track activity changes to background music
    fn sync_background(&mut self) {
        let main_active = self.main.state().is_active();
        if main_active == self.main_was_active {
            return;
        }
        self.main_was_active = main_active;

        if !self.is_synced() {
            return;
        }
        let Some(background) = self.background.as_mut() else {
            return;
        };
        if !background.is_loaded() {
            return;
        }

        if main_active {
            tracing::debug!("Main track active, resuming background music");
            if let Err(e) = background.play() {
                tracing::warn!(error = %e, "Background music did not resume");
            }
        } else {
            tracing::debug!(state = ?self.main.state(), "Main track inactive, pausing background music");
            background.pause();
        }
    }
}
