//! Repeat controller - the main-track state machine
//!
//! ```text
//! Idle → Loading → Ready → Playing → (InterRepeatPause) → Playing … → Stopped
//!                            ↕
//!                          Paused            Error is reachable from anywhere
//! ```
//!
//! On every `Ended` the controller counts the play, reports it, then decides:
//! continue iff the repeat count is 0 (infinite) or fewer plays than the count
//! have finished. Continuing either replays immediately (continuous mode) or
//! holds the track at 0 for the configured gap first.

use crate::{
    engine::{EngineAdapter, EngineEvent, MediaEngine},
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    types::{ControllerState, PlaybackSession},
    volume::Volume,
};
use drive_core::types::{PlaybackPreferences, Track};
use std::time::Duration;

/// Preference snapshot the controller acts on
#[derive(Debug, Clone, PartialEq)]
struct RepeatSettings {
    repeat_count: u32,
    inter_repeat_pause: Duration,
    auto_play: bool,
    show_progress: bool,
}

impl From<&PlaybackPreferences> for RepeatSettings {
    fn from(prefs: &PlaybackPreferences) -> Self {
        Self {
            repeat_count: prefs.repeat_count,
            inter_repeat_pause: prefs.inter_repeat_pause(),
            auto_play: prefs.auto_play,
            show_progress: prefs.show_progress,
        }
    }
}

/// State machine looping one track N times (or forever)
pub struct RepeatController<E: MediaEngine> {
    adapter: EngineAdapter<E>,
    track: Option<Track>,
    state: ControllerState,
    session: PlaybackSession,
    settings: RepeatSettings,
    volume: Volume,

    // Time left in the current gap between repeats
    pause_remaining: Option<Duration>,
    // Play was requested before the source became ready
    play_requested: bool,
    last_error: Option<PlaybackError>,

    pending_events: Vec<PlaybackEvent>,
}

impl<E: MediaEngine> RepeatController<E> {
    /// Create a controller driving `engine`
    pub fn new(engine: E, prefs: &PlaybackPreferences) -> Self {
        let mut adapter = EngineAdapter::new(engine);
        let volume = Volume::new(prefs.volume_percent);
        adapter.set_volume(volume.fraction());
        adapter.set_muted(false);

        Self {
            adapter,
            track: None,
            state: ControllerState::Idle,
            session: PlaybackSession::default(),
            settings: RepeatSettings::from(prefs),
            volume,
            pause_remaining: None,
            play_requested: false,
            last_error: None,
            pending_events: Vec::new(),
        }
    }

    // ===== Playback Control =====

    /// Bind `track` and start loading it
    ///
    /// Resets the session; repeats are counted per load.
    pub fn load(&mut self, track: &Track) {
        tracing::info!(title = %track.title, "Loading track");

        self.adapter.load(&track.audio_url);
        self.adapter.set_volume(self.volume.fraction());
        self.adapter.set_muted(self.volume.is_muted());

        self.track = Some(track.clone());
        self.session = PlaybackSession::new(&track.audio_url, self.volume.is_muted());
        self.pause_remaining = None;
        self.play_requested = false;
        self.last_error = None;
        self.set_state(ControllerState::Loading);
    }

    /// Start or resume playback
    ///
    /// From `Error` this reloads the source and plays once it is ready; from
    /// `Stopped` it starts a fresh run of repeats.
    pub fn play(&mut self) -> Result<()> {
        match self.state {
            ControllerState::Idle => Err(PlaybackError::NoTrackLoaded),
            ControllerState::Loading => {
                self.play_requested = true;
                Ok(())
            }
            ControllerState::Ready | ControllerState::Paused => self.start_playback(),
            ControllerState::InterRepeatPause => {
                tracing::debug!("Skipping remaining inter-repeat pause");
                self.cancel_countdown();
                self.start_playback()
            }
            ControllerState::Playing => Ok(()),
            ControllerState::Stopped => {
                self.session.completed_repeats = 0;
                self.adapter.rewind();
                self.session.current_time = Duration::ZERO;
                self.start_playback()
            }
            ControllerState::Error => {
                let track = self.track.clone().ok_or(PlaybackError::NoTrackLoaded)?;
                tracing::info!(title = %track.title, "Retrying after playback error");
                self.load(&track);
                self.play_requested = true;
                Ok(())
            }
        }
    }

    /// Pause playback
    ///
    /// During the gap between repeats this cancels the countdown; the track
    /// stays at 0 until play is pressed.
    pub fn pause(&mut self) {
        match self.state {
            ControllerState::Playing => {
                self.adapter.pause();
                self.session.is_playing = false;
                self.set_state(ControllerState::Paused);
            }
            ControllerState::InterRepeatPause => {
                self.cancel_countdown();
                self.session.is_playing = false;
                self.set_state(ControllerState::Paused);
            }
            ControllerState::Loading => self.play_requested = false,
            _ => {}
        }
    }

    /// Play if not playing, pause otherwise
    pub fn toggle(&mut self) -> Result<()> {
        if self.state.is_active() {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Rewind to 0 and zero the repeat counter; play/pause state is untouched
    pub fn reset(&mut self) {
        self.adapter.rewind();
        self.session.current_time = Duration::ZERO;
        self.session.completed_repeats = 0;
        tracing::debug!(state = ?self.state, "Repeat progress reset");
    }

    /// Seek within the current track (clamped to its duration)
    ///
    /// Refused with `InvalidOperation` during the gap between repeats; the
    /// track stays at 0 until the next repeat starts.
    pub fn seek(&mut self, position: Duration) -> Result<()> {
        if self.track.is_none() {
            return Err(PlaybackError::NoTrackLoaded);
        }
        if self.state == ControllerState::InterRepeatPause {
            return Err(PlaybackError::InvalidOperation(
                "cannot seek between repeats".to_string(),
            ));
        }
        self.adapter.seek(position);
        self.session.current_time = self.adapter.position();
        Ok(())
    }

    /// Stop listening to the engine and cancel any pending countdown
    ///
    /// The controller returns to `Idle`; queued events are discarded.
    pub fn close(&mut self) {
        self.cancel_countdown();
        self.adapter.detach();
        self.track = None;
        self.session = PlaybackSession::default();
        self.play_requested = false;
        self.state = ControllerState::Idle;
        self.pending_events.clear();
    }

    // ===== Volume =====

    /// Set volume level (0-100)
    pub fn set_volume(&mut self, level: u8) {
        self.volume.set_level(level);
        self.adapter.set_volume(self.volume.fraction());
        self.emit_volume_changed();
    }

    /// Get volume level (0-100)
    pub fn volume(&self) -> u8 {
        self.volume.level()
    }

    /// Mute or unmute (volume level is preserved)
    pub fn set_muted(&mut self, muted: bool) {
        self.volume.set_muted(muted);
        self.adapter.set_muted(muted);
        self.session.is_muted = muted;
        self.emit_volume_changed();
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }

    // ===== Preferences =====

    /// Apply a new preference snapshot
    ///
    /// A lowered repeat count takes effect at the next end of track.
    pub fn apply_preferences(&mut self, prefs: &PlaybackPreferences) {
        let settings = RepeatSettings::from(prefs);
        if settings != self.settings {
            tracing::debug!(
                repeat_count = settings.repeat_count,
                pause = ?settings.inter_repeat_pause,
                "Applying playback preferences"
            );
            self.settings = settings;
        }

        if prefs.volume_percent.min(100) != self.volume.level() {
            self.set_volume(prefs.volume_percent);
        }
    }

    // ===== Driving =====

    /// Advance by `elapsed`: drain engine events, then run the countdown
    ///
    /// The countdown only consumes time from ticks that started inside the
    /// gap, so the gap always lasts at least its configured length.
    pub fn tick(&mut self, elapsed: Duration) {
        let was_counting_down = self.state == ControllerState::InterRepeatPause;

        for event in self.adapter.poll(elapsed) {
            self.handle_engine_event(event);
        }

        if was_counting_down && self.state == ControllerState::InterRepeatPause {
            self.advance_countdown(elapsed);
        }

        if self.settings.show_progress && self.state == ControllerState::Playing {
            self.pending_events.push(PlaybackEvent::PositionUpdate {
                position_ms: duration_ms(self.session.current_time),
                duration_ms: self.session.duration.map_or(0, duration_ms),
            });
        }
    }

    // ===== State Queries =====

    /// Current state
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Current session
    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    /// Loaded track
    pub fn track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    /// Error that moved the controller to `Error`
    pub fn last_error(&self) -> Option<&PlaybackError> {
        self.last_error.as_ref()
    }

    /// Time left in the gap between repeats
    pub fn pause_remaining(&self) -> Option<Duration> {
        self.pause_remaining
    }

    /// Configured number of plays (`None` = infinite)
    pub fn repeat_target(&self) -> Option<u32> {
        (self.settings.repeat_count > 0).then_some(self.settings.repeat_count)
    }

    /// Borrow the wrapped engine
    pub fn engine(&self) -> &E {
        self.adapter.engine()
    }

    /// Mutably borrow the wrapped engine
    pub fn engine_mut(&mut self) -> &mut E {
        self.adapter.engine_mut()
    }

    // ===== Events =====

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ===== Internals =====

    fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::LoadedMetadata { duration } => {
                self.session.duration = Some(duration);
            }
            EngineEvent::CanPlay => {
                if self.state == ControllerState::Loading {
                    self.set_state(ControllerState::Ready);
                    if self.settings.auto_play || self.play_requested {
                        self.play_requested = false;
                        // Rejection already moved us to Error
                        let _ = self.start_playback();
                    }
                }
            }
            EngineEvent::TimeUpdate { position } => {
                self.session.current_time = position;
            }
            EngineEvent::Play => {
                // Resumed from outside (media keys, OS controls)
                if self.state == ControllerState::Paused && !self.adapter.is_paused() {
                    self.session.is_playing = true;
                    self.set_state(ControllerState::Playing);
                }
            }
            EngineEvent::Pause => {
                // End-of-track pauses are handled by Ended; stale events are ignored
                if self.state == ControllerState::Playing
                    && self.adapter.is_paused()
                    && !self.adapter.is_at_end()
                {
                    self.session.is_playing = false;
                    self.set_state(ControllerState::Paused);
                }
            }
            EngineEvent::Ended => {
                if self.state == ControllerState::Playing {
                    self.on_track_ended();
                }
            }
            EngineEvent::Error { kind, message } => {
                self.fail(PlaybackError::from_media(kind, message));
            }
        }
    }

    fn on_track_ended(&mut self) {
        self.session.completed_repeats += 1;
        let completed = self.session.completed_repeats;
        let target = self.repeat_target();

        tracing::info!(completed, ?target, "Track play completed");
        self.pending_events
            .push(PlaybackEvent::RepeatCompleted { completed, target });

        let keep_going = match target {
            Some(target) => completed < target,
            None => true,
        };
        if !keep_going {
            self.session.is_playing = false;
            self.set_state(ControllerState::Stopped);
            return;
        }

        self.adapter.rewind();
        self.session.current_time = Duration::ZERO;

        let gap = self.settings.inter_repeat_pause;
        if gap.is_zero() {
            // Continuous mode
            let _ = self.start_playback();
        } else {
            self.pause_remaining = Some(gap);
            self.session.is_paused_between_repeats = true;
            self.pending_events.push(PlaybackEvent::InterRepeatPauseStarted {
                duration_ms: duration_ms(gap),
            });
            self.set_state(ControllerState::InterRepeatPause);
        }
    }

    fn advance_countdown(&mut self, elapsed: Duration) {
        let Some(remaining) = self.pause_remaining else {
            return;
        };

        let remaining = remaining.saturating_sub(elapsed);
        if remaining.is_zero() {
            self.cancel_countdown();
            let _ = self.start_playback();
        } else {
            self.pause_remaining = Some(remaining);
            self.pending_events.push(PlaybackEvent::InterRepeatCountdown {
                remaining_ms: duration_ms(remaining),
            });
        }
    }

    fn cancel_countdown(&mut self) {
        self.pause_remaining = None;
        self.session.is_paused_between_repeats = false;
    }

    fn start_playback(&mut self) -> Result<()> {
        match self.adapter.play() {
            Ok(()) => {
                self.session.is_playing = true;
                self.session.is_paused_between_repeats = false;
                self.set_state(ControllerState::Playing);
                Ok(())
            }
            Err(e) => {
                self.fail(e.clone());
                Err(e)
            }
        }
    }

    fn fail(&mut self, error: PlaybackError) {
        tracing::error!(error = %error, url = %self.session.track_url, "Playback failed");

        self.adapter.pause();
        self.cancel_countdown();
        self.play_requested = false;
        self.session.is_playing = false;
        self.pending_events.push(PlaybackEvent::Error {
            message: error.to_string(),
        });
        self.last_error = Some(error);
        self.set_state(ControllerState::Error);
    }

    fn set_state(&mut self, state: ControllerState) {
        if self.state != state {
            tracing::debug!(from = ?self.state, to = ?state, "Controller state changed");
            self.state = state;
            self.pending_events
                .push(PlaybackEvent::StateChanged { state });
        }
    }

    fn emit_volume_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::VolumeChanged {
            level: self.volume.level(),
            is_muted: self.volume.is_muted(),
        });
    }
}

impl<E: MediaEngine> Drop for RepeatController<E> {
    fn drop(&mut self) {
        self.adapter.detach();
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
