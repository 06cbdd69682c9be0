//! Simulated listening session
//!
//! Drives a [`Player`] over [`SimulatedEngine`]s on a tokio interval. Each
//! wall-clock tick advances the virtual clock by `tick * speed`, so a long
//! session can be replayed quickly. Preference changes arrive through the
//! store's watch channel and are applied before the next tick. The binary
//! opens its own store, so only changes made in the same process are seen
//! while a session runs.

use crate::error::{CliError, Result};
use clap::Args;
use drive_core::types::{PlaybackPreferences, Track};
use drive_playback::{ControllerState, PlaybackEvent, Player, SimulatedEngine};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Upper bound for `--speed`
pub const MAX_SPEED: f32 = 1000.0;

/// Upper bound for the wall-clock tick
pub const MAX_TICK: Duration = Duration::from_secs(60);

/// Flags of the `play` command
#[derive(Debug, Clone, Args)]
pub struct PlayArgs {
    /// Track title
    #[arg(long)]
    pub title: String,

    /// Track source
    #[arg(long)]
    pub url: String,

    /// Track length in seconds
    #[arg(long)]
    pub duration: f32,

    /// Ambient track source
    #[arg(long)]
    pub background_url: Option<String>,

    /// Ambient track length in seconds
    #[arg(long, default_value_t = 60.0)]
    pub background_duration: f32,

    /// Virtual seconds per wall-clock second
    #[arg(long, default_value_t = 1.0)]
    pub speed: f32,
}

impl PlayArgs {
    /// Validated session options; `tick` is the wall-clock tick interval
    pub fn to_options(&self, tick: Duration) -> Result<SessionOptions> {
        let background = match &self.background_url {
            Some(url) => Some(BackgroundSource {
                track: Track::new("Background", url.clone()),
                duration: seconds("background duration", self.background_duration)?,
            }),
            None => None,
        };

        let options = SessionOptions {
            track: Track::new(self.title.clone(), self.url.clone()),
            duration: seconds("duration", self.duration)?,
            background,
            speed: self.speed,
            tick,
        };
        options.validate()?;
        Ok(options)
    }
}

/// Ambient track of a session
#[derive(Debug, Clone)]
pub struct BackgroundSource {
    pub track: Track,
    pub duration: Duration,
}

/// Everything needed to run one session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub track: Track,
    pub duration: Duration,
    pub background: Option<BackgroundSource>,
    pub speed: f32,
    pub tick: Duration,
}

impl SessionOptions {
    pub fn validate(&self) -> Result<()> {
        if self.duration.is_zero() {
            return Err(CliError::InvalidArgument(
                "track duration must be positive".to_string(),
            ));
        }
        if self
            .background
            .as_ref()
            .is_some_and(|background| background.duration.is_zero())
        {
            return Err(CliError::InvalidArgument(
                "background duration must be positive".to_string(),
            ));
        }
        if !self.speed.is_finite() || self.speed <= 0.0 || self.speed > MAX_SPEED {
            return Err(CliError::InvalidArgument(format!(
                "speed must be in (0, {}], got {}",
                MAX_SPEED, self.speed
            )));
        }
        if self.tick.is_zero() || self.tick > MAX_TICK {
            return Err(CliError::InvalidArgument(format!(
                "tick interval must be in (0, {:?}], got {:?}",
                MAX_TICK, self.tick
            )));
        }
        Ok(())
    }

    /// Virtual time covered by one tick
    ///
    /// Only meaningful on validated options; `validate` bounds both factors.
    pub fn virtual_step(&self) -> Duration {
        self.tick.mul_f32(self.speed)
    }
}

/// Outcome of a session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub final_state: ControllerState,
    pub completed_repeats: u32,
    pub background_loops: u32,
    /// Virtual time the session ran for
    pub listened: Duration,
    pub error: Option<String>,
}

/// Run a session until the main track stops, fails, or `shutdown` resolves
pub async fn run_session(
    options: &SessionOptions,
    mut prefs: watch::Receiver<PlaybackPreferences>,
    shutdown: impl Future<Output = ()>,
) -> Result<SessionReport> {
    options.validate()?;

    let snapshot = prefs.borrow_and_update().clone();
    let main_engine = SimulatedEngine::new(options.duration);
    let mut player = match &options.background {
        Some(background) => {
            let mut player = Player::with_background(
                main_engine,
                SimulatedEngine::new(background.duration),
                &snapshot,
            );
            player.load_background(&background.track)?;
            player
        }
        None => Player::new(main_engine, &snapshot),
    };

    tracing::info!(
        title = %options.track.title,
        repeat_count = snapshot.repeat_count,
        pause_seconds = snapshot.inter_repeat_pause_seconds,
        speed = options.speed,
        "Starting listening session"
    );

    player.load(&options.track);
    player.play()?;

    let step = options.virtual_step();
    let mut interval = tokio::time::interval(options.tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut listened = Duration::ZERO;
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            () = &mut shutdown => {
                tracing::info!("Session interrupted");
                break;
            }
        }

        if prefs.has_changed().unwrap_or(false) {
            let snapshot = prefs.borrow_and_update().clone();
            tracing::debug!("Preferences changed during session");
            player.apply_preferences(&snapshot);
        }

        player.tick(step);
        listened += step;

        for event in player.drain_events() {
            log_event(&event);
        }

        if matches!(
            player.state(),
            ControllerState::Stopped | ControllerState::Error
        ) {
            break;
        }
    }

    let report = SessionReport {
        final_state: player.state(),
        completed_repeats: player.session().completed_repeats,
        background_loops: player
            .background()
            .map_or(0, |background| background.session().completed_repeats),
        listened,
        error: player.main().last_error().map(ToString::to_string),
    };
    player.close();

    tracing::info!(
        state = ?report.final_state,
        plays = report.completed_repeats,
        listened = ?report.listened,
        "Session finished"
    );
    Ok(report)
}

fn log_event(event: &PlaybackEvent) {
    match event {
        PlaybackEvent::StateChanged { state } => {
            tracing::info!(?state, "Playback state changed");
        }
        PlaybackEvent::RepeatCompleted { completed, target } => match target {
            Some(target) => tracing::info!("Play {}/{} completed", completed, target),
            None => tracing::info!("Play {} completed", completed),
        },
        PlaybackEvent::InterRepeatPauseStarted { duration_ms } => {
            tracing::info!(duration_ms, "Pausing before next repeat");
        }
        PlaybackEvent::InterRepeatCountdown { remaining_ms } => {
            tracing::debug!(remaining_ms, "Next repeat countdown");
        }
        PlaybackEvent::PositionUpdate {
            position_ms,
            duration_ms,
        } => {
            tracing::trace!(position_ms, duration_ms, "Position");
        }
        PlaybackEvent::VolumeChanged { level, is_muted } => {
            tracing::debug!(level, is_muted, "Volume changed");
        }
        PlaybackEvent::BackgroundStateChanged { is_playing } => {
            tracing::info!(is_playing, "Background music state changed");
        }
        PlaybackEvent::BackgroundLooped { loops } => {
            tracing::debug!(loops, "Background music looped");
        }
        PlaybackEvent::Error { message } => {
            tracing::error!(%message, "Playback error");
        }
        PlaybackEvent::BackgroundError { message } => {
            tracing::warn!(%message, "Background music error");
        }
    }
}

fn seconds(name: &str, value: f32) -> Result<Duration> {
    Duration::try_from_secs_f32(value)
        .map_err(|e| CliError::InvalidArgument(format!("{name} {value}: {e}")))
}
