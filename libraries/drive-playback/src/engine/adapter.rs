//! Normalizing wrapper around a [`MediaEngine`]

use super::{EngineEvent, MediaEngine, ReadyState};
use crate::error::Result;
use std::time::Duration;

/// Polls spent probing the ready state before giving up on the fallback
pub const MAX_READINESS_RETRIES: u32 = 20;

/// Uniform start/stop/seek/volume interface over a platform engine
///
/// On top of the raw engine the adapter:
/// - clamps seeks and volume
/// - rewrites error events into listener-facing messages
/// - synthesizes `LoadedMetadata`/`CanPlay` when the engine has the data but
///   never fired the event (bounded by [`MAX_READINESS_RETRIES`] polls)
/// - drops engine events while detached
pub struct EngineAdapter<E: MediaEngine> {
    engine: E,
    url: Option<String>,
    attached: bool,

    // Readiness tracking for the current load
    metadata_seen: bool,
    can_play_seen: bool,
    readiness_polls: u32,
}

impl<E: MediaEngine> EngineAdapter<E> {
    /// Wrap `engine`
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            url: None,
            attached: false,
            metadata_seen: false,
            can_play_seen: false,
            readiness_polls: 0,
        }
    }

    /// Bind a new source and start listening to the engine
    pub fn load(&mut self, url: &str) {
        tracing::debug!(url, "Loading audio source");
        self.engine.load(url);
        self.url = Some(url.to_string());
        self.attached = true;
        self.metadata_seen = false;
        self.can_play_seen = false;
        self.readiness_polls = 0;
    }

    /// Stop listening: pause the engine and discard its pending events
    pub fn detach(&mut self) {
        if self.attached {
            self.engine.pause();
            let dropped = self.engine.poll(Duration::ZERO);
            tracing::debug!(dropped = dropped.len(), "Detached from engine");
        }
        self.attached = false;
    }

    /// Request playback; rejection is returned, never swallowed
    pub fn play(&mut self) -> Result<()> {
        self.engine.play()
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.engine.pause();
    }

    /// Seek, clamped to `[0, duration]`
    ///
    /// No-op while the duration is unknown.
    pub fn seek(&mut self, position: Duration) {
        match self.engine.duration() {
            Some(duration) => self.engine.set_position(position.min(duration)),
            None => tracing::debug!(?position, "Ignoring seek, duration unknown"),
        }
    }

    /// Return to the start of the track (always valid)
    pub fn rewind(&mut self) {
        self.engine.set_position(Duration::ZERO);
    }

    /// Set volume as a fraction; clamped to 0.0..=1.0, NaN treated as 0
    pub fn set_volume(&mut self, fraction: f32) {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        self.engine.set_volume(fraction);
    }

    /// Mute or unmute without touching the volume
    pub fn set_muted(&mut self, muted: bool) {
        self.engine.set_muted(muted);
    }

    /// Current playhead position
    pub fn position(&self) -> Duration {
        self.engine.position()
    }

    /// Track duration, if known
    pub fn duration(&self) -> Option<Duration> {
        self.engine.duration()
    }

    /// `true` while the engine is not playing
    pub fn is_paused(&self) -> bool {
        self.engine.is_paused()
    }

    /// `true` when the playhead sits at the end of a known duration
    pub fn is_at_end(&self) -> bool {
        self.engine
            .duration()
            .is_some_and(|duration| self.engine.position() >= duration)
    }

    /// Source currently bound
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Borrow the wrapped engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutably borrow the wrapped engine
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Drain normalized events
    pub fn poll(&mut self, elapsed: Duration) -> Vec<EngineEvent> {
        if !self.attached {
            return Vec::new();
        }

        let raw = self.engine.poll(elapsed);
        let mut events = Vec::with_capacity(raw.len());

        for event in raw {
            match event {
                EngineEvent::LoadedMetadata { .. } => {
                    if self.metadata_seen {
                        continue;
                    }
                    self.metadata_seen = true;
                    events.push(event);
                }
                EngineEvent::CanPlay => {
                    if self.can_play_seen {
                        continue;
                    }
                    self.can_play_seen = true;
                    events.push(event);
                }
                EngineEvent::Error { kind, message } => {
                    let message = if message.is_empty() {
                        kind.describe().to_string()
                    } else {
                        format!("{} ({})", kind.describe(), message)
                    };
                    tracing::warn!(url = ?self.url, %message, "Engine reported an error");
                    events.push(EngineEvent::Error { kind, message });
                }
                other => events.push(other),
            }
        }

        self.probe_readiness(&mut events);
        events
    }

    /// Synthesize readiness events the engine failed to fire
    fn probe_readiness(&mut self, events: &mut Vec<EngineEvent>) {
        if self.url.is_none() || (self.metadata_seen && self.can_play_seen) {
            return;
        }
        if self.readiness_polls >= MAX_READINESS_RETRIES {
            return;
        }
        if events
            .iter()
            .any(|e| matches!(e, EngineEvent::Error { .. }))
        {
            return;
        }

        self.readiness_polls += 1;
        let state = self.engine.ready_state();

        if !self.metadata_seen && state >= ReadyState::HaveMetadata {
            if let Some(duration) = self.engine.duration() {
                tracing::debug!(?duration, "Synthesizing missing metadata event");
                self.metadata_seen = true;
                events.push(EngineEvent::LoadedMetadata { duration });
            }
        }

        if self.metadata_seen && !self.can_play_seen && state >= ReadyState::HaveFutureData {
            tracing::debug!("Synthesizing missing canplay event");
            self.can_play_seen = true;
            events.push(EngineEvent::CanPlay);
        }

        if self.readiness_polls == MAX_READINESS_RETRIES && !self.can_play_seen {
            tracing::debug!(
                retries = MAX_READINESS_RETRIES,
                "Readiness fallback exhausted, waiting on engine events"
            );
        }
    }
}
