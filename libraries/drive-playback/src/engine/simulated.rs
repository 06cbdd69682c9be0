//! Virtual-clock media engine
//!
//! Behaves like a media element whose clock only moves when polled. Used by
//! the tests and the command-line session runner where no audio device is
//! involved.

use super::{EngineEvent, MediaEngine, MediaErrorKind, ReadyState};
use crate::error::{PlaybackError, Result};
use std::time::Duration;

/// Simulated media element
#[derive(Debug, Clone)]
pub struct SimulatedEngine {
    // Behaviour
    duration: Duration,
    load_delay: Duration,
    failure: Option<MediaErrorKind>,
    play_blocked: bool,
    fire_readiness_events: bool,

    // Element state
    url: Option<String>,
    since_load: Duration,
    ready_state: ReadyState,
    failed: bool,
    position: Duration,
    paused: bool,
    volume: f32,
    muted: bool,
    pending: Vec<EngineEvent>,

    // Call counters for verification
    play_calls: u32,
    pause_calls: u32,
    load_calls: u32,
}

impl SimulatedEngine {
    /// Engine whose every source lasts `duration` and loads instantly
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            load_delay: Duration::ZERO,
            failure: None,
            play_blocked: false,
            fire_readiness_events: true,
            url: None,
            since_load: Duration::ZERO,
            ready_state: ReadyState::HaveNothing,
            failed: false,
            position: Duration::ZERO,
            paused: true,
            volume: 1.0,
            muted: false,
            pending: Vec::new(),
            play_calls: 0,
            pause_calls: 0,
            load_calls: 0,
        }
    }

    /// Delay between `load` and the source becoming playable
    #[must_use]
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    /// Make every load fail with `kind` once the load delay has passed
    #[must_use]
    pub fn failing_with(mut self, kind: MediaErrorKind) -> Self {
        self.failure = Some(kind);
        self
    }

    /// Reject `play()` as an autoplay policy would
    #[must_use]
    pub fn with_play_blocked(mut self) -> Self {
        self.play_blocked = true;
        self
    }

    /// Become ready without firing `LoadedMetadata`/`CanPlay`
    #[must_use]
    pub fn without_readiness_events(mut self) -> Self {
        self.fire_readiness_events = false;
        self
    }

    /// Change the autoplay policy at runtime
    pub fn set_play_blocked(&mut self, blocked: bool) {
        self.play_blocked = blocked;
    }

    /// Change (or clear) the failure mode; applies to the next load
    pub fn set_failure(&mut self, failure: Option<MediaErrorKind>) {
        self.failure = failure;
    }

    /// Number of `play()` calls, accepted or not
    pub fn play_calls(&self) -> u32 {
        self.play_calls
    }

    /// Number of `pause()` calls
    pub fn pause_calls(&self) -> u32 {
        self.pause_calls
    }

    /// Number of `load()` calls
    pub fn load_calls(&self) -> u32 {
        self.load_calls
    }

    /// Last volume applied
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Whether output is muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Gain actually heard: 0.0 when muted
    pub fn output_gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    /// Source currently bound
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn is_ready(&self) -> bool {
        self.ready_state >= ReadyState::HaveFutureData
    }
}

impl MediaEngine for SimulatedEngine {
    fn load(&mut self, url: &str) {
        self.load_calls += 1;
        self.url = Some(url.to_string());
        self.since_load = Duration::ZERO;
        self.ready_state = ReadyState::HaveNothing;
        self.failed = false;
        self.position = Duration::ZERO;
        self.paused = true;
        self.pending.clear();
    }

    fn play(&mut self) -> Result<()> {
        self.play_calls += 1;

        if self.url.is_none() {
            return Err(PlaybackError::Load("no source bound".to_string()));
        }
        if self.failed {
            return Err(PlaybackError::Load(
                MediaErrorKind::SrcNotSupported.describe().to_string(),
            ));
        }
        if self.play_blocked {
            return Err(PlaybackError::PlaybackBlocked(
                "play() was rejected by the autoplay policy".to_string(),
            ));
        }

        if self.paused {
            // Like a media element: playing from the end restarts the track
            if self.is_ready() && self.position >= self.duration {
                self.position = Duration::ZERO;
            }
            self.paused = false;
            self.pending.push(EngineEvent::Play);
        }
        Ok(())
    }

    fn pause(&mut self) {
        self.pause_calls += 1;
        if !self.paused {
            self.paused = true;
            self.pending.push(EngineEvent::Pause);
        }
    }

    fn set_position(&mut self, position: Duration) {
        self.position = position.min(self.duration);
    }

    fn position(&self) -> Duration {
        self.position
    }

    fn duration(&self) -> Option<Duration> {
        (self.ready_state >= ReadyState::HaveMetadata).then_some(self.duration)
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    fn poll(&mut self, elapsed: Duration) -> Vec<EngineEvent> {
        if self.url.is_none() || self.failed {
            return std::mem::take(&mut self.pending);
        }

        if self.ready_state == ReadyState::HaveNothing {
            self.since_load += elapsed;
            if self.since_load < self.load_delay {
                return std::mem::take(&mut self.pending);
            }

            if let Some(kind) = self.failure {
                self.failed = true;
                self.paused = true;
                self.pending.push(EngineEvent::Error {
                    kind,
                    message: String::new(),
                });
                return std::mem::take(&mut self.pending);
            }

            self.ready_state = ReadyState::HaveEnoughData;
            if self.fire_readiness_events {
                self.pending.push(EngineEvent::LoadedMetadata {
                    duration: self.duration,
                });
                self.pending.push(EngineEvent::CanPlay);
            }
            // The clock only starts on the next poll
            return std::mem::take(&mut self.pending);
        }

        if !self.paused {
            self.position = (self.position + elapsed).min(self.duration);
            self.pending.push(EngineEvent::TimeUpdate {
                position: self.position,
            });

            if self.position >= self.duration {
                self.paused = true;
                self.pending.push(EngineEvent::Pause);
                self.pending.push(EngineEvent::Ended);
            }
        }

        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn becomes_ready_after_delay() {
        let mut engine =
            SimulatedEngine::new(Duration::from_secs(5)).with_load_delay(Duration::from_millis(300));
        engine.load("mem://a");

        assert!(engine.poll(Duration::from_millis(100)).is_empty());
        assert_eq!(engine.duration(), None);

        let events = engine.poll(Duration::from_millis(200));
        assert_eq!(
            events,
            vec![
                EngineEvent::LoadedMetadata {
                    duration: Duration::from_secs(5)
                },
                EngineEvent::CanPlay
            ]
        );
        assert_eq!(engine.duration(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn plays_to_the_end() {
        let mut engine = SimulatedEngine::new(Duration::from_secs(1));
        engine.load("mem://a");
        engine.poll(Duration::ZERO);
        engine.play().unwrap();

        let events = engine.poll(Duration::from_millis(1500));
        assert!(events.contains(&EngineEvent::Ended));
        assert_eq!(engine.position(), Duration::from_secs(1));
        assert!(engine.is_paused());
    }

    #[test]
    fn blocked_play_is_rejected() {
        let mut engine = SimulatedEngine::new(Duration::from_secs(1)).with_play_blocked();
        engine.load("mem://a");

        assert!(matches!(
            engine.play(),
            Err(PlaybackError::PlaybackBlocked(_))
        ));
        assert!(engine.is_paused());
        assert_eq!(engine.play_calls(), 1);
    }

    #[test]
    fn failing_source_reports_error() {
        let mut engine =
            SimulatedEngine::new(Duration::from_secs(1)).failing_with(MediaErrorKind::Network);
        engine.load("mem://a");

        let events = engine.poll(Duration::ZERO);
        assert!(matches!(
            events.as_slice(),
            [EngineEvent::Error {
                kind: MediaErrorKind::Network,
                ..
            }]
        ));
        assert!(engine.play().is_err());
    }

    #[test]
    fn mute_keeps_volume() {
        let mut engine = SimulatedEngine::new(Duration::from_secs(1));
        engine.set_volume(0.6);
        engine.set_muted(true);

        assert_eq!(engine.output_gain(), 0.0);
        assert!((engine.volume() - 0.6).abs() < f32::EPSILON);
    }
}
