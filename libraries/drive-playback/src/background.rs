//! Background music coordinator
//!
//! Loops an ambient track forever on its own engine. Whether it follows the
//! main track is decided by the [`Player`](crate::Player); this type only
//! knows how to load, loop, start and stop.

use crate::{
    engine::{EngineAdapter, EngineEvent, MediaEngine},
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    types::PlaybackSession,
    volume::Volume,
};
use drive_core::types::{PlaybackPreferences, Track};
use std::time::Duration;

/// Independent looping player for the ambient track
pub struct BackgroundMusicCoordinator<E: MediaEngine> {
    adapter: EngineAdapter<E>,
    track: Option<Track>,
    session: PlaybackSession,
    volume: Volume,
    enabled: bool,
    ready: bool,
    play_when_ready: bool,
    last_error: Option<PlaybackError>,
    pending_events: Vec<PlaybackEvent>,
}

impl<E: MediaEngine> BackgroundMusicCoordinator<E> {
    /// Create a coordinator driving `engine`
    pub fn new(engine: E, prefs: &PlaybackPreferences) -> Self {
        let mut adapter = EngineAdapter::new(engine);
        let volume = Volume::new(prefs.background_volume_percent);
        adapter.set_volume(volume.fraction());

        Self {
            adapter,
            track: None,
            session: PlaybackSession::default(),
            volume,
            enabled: prefs.background_music_enabled,
            ready: false,
            play_when_ready: false,
            last_error: None,
            pending_events: Vec::new(),
        }
    }

    /// Bind the ambient track
    pub fn load(&mut self, track: &Track) {
        tracing::info!(title = %track.title, "Loading background music");

        let was_playing = self.session.is_playing;
        self.adapter.load(&track.audio_url);
        self.adapter.set_volume(self.volume.fraction());
        self.adapter.set_muted(self.volume.is_muted());

        self.track = Some(track.clone());
        self.session = PlaybackSession::new(&track.audio_url, self.volume.is_muted());
        self.ready = false;
        self.play_when_ready = was_playing;
        self.last_error = None;

        if was_playing {
            self.pending_events
                .push(PlaybackEvent::BackgroundStateChanged { is_playing: false });
        }
    }

    /// Start looping
    ///
    /// No-op while disabled or already playing. Before the source is ready
    /// the request is remembered; after an error the source is reloaded.
    pub fn play(&mut self) -> Result<()> {
        if !self.enabled || self.session.is_playing {
            return Ok(());
        }

        let Some(track) = self.track.clone() else {
            return Err(PlaybackError::NoTrackLoaded);
        };

        if self.last_error.is_some() {
            tracing::info!("Retrying background music after error");
            self.load(&track);
            self.play_when_ready = true;
            return Ok(());
        }

        if !self.ready {
            self.play_when_ready = true;
            return Ok(());
        }

        self.start()
    }

    /// Stop looping (position is kept)
    pub fn pause(&mut self) {
        self.play_when_ready = false;
        if self.session.is_playing {
            self.adapter.pause();
            self.set_playing(false);
        }
    }

    /// Enable or disable background music; disabling pauses it
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        tracing::debug!(enabled, "Background music toggled");

        self.enabled = enabled;
        if !enabled {
            self.pause();
        }
    }

    /// Set volume level (0-100)
    pub fn set_volume(&mut self, level: u8) {
        self.volume.set_level(level);
        self.adapter.set_volume(self.volume.fraction());
    }

    /// Mute or unmute (volume level is preserved)
    pub fn set_muted(&mut self, muted: bool) {
        self.volume.set_muted(muted);
        self.adapter.set_muted(muted);
        self.session.is_muted = muted;
    }

    /// Advance by `elapsed`
    pub fn tick(&mut self, elapsed: Duration) {
        for event in self.adapter.poll(elapsed) {
            match event {
                EngineEvent::LoadedMetadata { duration } => {
                    self.session.duration = Some(duration);
                }
                EngineEvent::CanPlay => {
                    self.ready = true;
                    if self.play_when_ready && self.enabled {
                        self.play_when_ready = false;
                        let _ = self.start();
                    }
                }
                EngineEvent::TimeUpdate { position } => {
                    self.session.current_time = position;
                }
                EngineEvent::Play => {
                    if !self.session.is_playing && !self.adapter.is_paused() {
                        self.set_playing(true);
                    }
                }
                EngineEvent::Pause => {
                    if self.session.is_playing
                        && self.adapter.is_paused()
                        && !self.adapter.is_at_end()
                    {
                        self.set_playing(false);
                    }
                }
                EngineEvent::Ended => self.on_loop_ended(),
                EngineEvent::Error { kind, message } => {
                    self.fail(PlaybackError::from_media(kind, message));
                }
            }
        }
    }

    /// Stop listening to the engine
    pub fn close(&mut self) {
        self.adapter.detach();
        self.track = None;
        self.session = PlaybackSession::default();
        self.ready = false;
        self.play_when_ready = false;
        self.pending_events.clear();
    }

    // ===== State Queries =====

    /// Whether background music is audible (or about to be)
    pub fn is_playing(&self) -> bool {
        self.session.is_playing
    }

    /// Whether background music is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a source is bound
    pub fn is_loaded(&self) -> bool {
        self.track.is_some()
    }

    /// Background session (`completed_repeats` counts loops)
    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    /// Error that stopped the background track
    pub fn last_error(&self) -> Option<&PlaybackError> {
        self.last_error.as_ref()
    }

    /// Borrow the wrapped engine
    pub fn engine(&self) -> &E {
        self.adapter.engine()
    }

    /// Mutably borrow the wrapped engine
    pub fn engine_mut(&mut self) -> &mut E {
        self.adapter.engine_mut()
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ===== Internals =====

    fn start(&mut self) -> Result<()> {
        match self.adapter.play() {
            Ok(()) => {
                self.set_playing(true);
                Ok(())
            }
            Err(e) => {
                self.fail(e.clone());
                Err(e)
            }
        }
    }

    fn on_loop_ended(&mut self) {
        if !self.session.is_playing {
            return;
        }

        self.session.completed_repeats += 1;
        self.pending_events.push(PlaybackEvent::BackgroundLooped {
            loops: self.session.completed_repeats,
        });

        self.adapter.rewind();
        self.session.current_time = Duration::ZERO;
        if let Err(e) = self.adapter.play() {
            self.fail(e);
        }
    }

    fn fail(&mut self, error: PlaybackError) {
        tracing::warn!(error = %error, "Background music failed");

        self.adapter.pause();
        self.play_when_ready = false;
        self.ready = false;
        self.set_playing(false);
        self.pending_events.push(PlaybackEvent::BackgroundError {
            message: error.to_string(),
        });
        self.last_error = Some(error);
    }

    fn set_playing(&mut self, is_playing: bool) {
        if self.session.is_playing != is_playing {
            self.session.is_playing = is_playing;
            self.pending_events
                .push(PlaybackEvent::BackgroundStateChanged { is_playing });
        }
    }
}

impl<E: MediaEngine> Drop for BackgroundMusicCoordinator<E> {
    fn drop(&mut self) {
        self.adapter.detach();
    }
}
