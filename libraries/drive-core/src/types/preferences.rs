//! Playback preferences
//!
//! User-facing playback settings persisted across sessions. The struct is
//! `#[serde(default)]` so a stored document missing keys (older versions,
//! partial writes) merges with the defaults instead of failing to load.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default main-track volume (0-100)
pub const DEFAULT_VOLUME_PERCENT: u8 = 80;

/// Default background-music volume (0-100)
pub const DEFAULT_BACKGROUND_VOLUME_PERCENT: u8 = 50;

/// Upper bound for the admin-configured pause between repeats
pub const MAX_INTER_REPEAT_PAUSE_SECONDS: f32 = 6.0;

/// Persisted playback preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaybackPreferences {
    /// Main-track volume (0-100)
    pub volume_percent: u8,

    /// Number of plays per session (0 = repeat forever)
    pub repeat_count: u32,

    /// Start playing as soon as the track is ready
    pub auto_play: bool,

    /// Emit position updates for a progress bar
    pub show_progress: bool,

    /// Play the ambient background track
    pub background_music_enabled: bool,

    /// `true`: background runs independently of the main track.
    /// `false`: pausing the main track also pauses the background.
    pub background_mix_with_main: bool,

    /// Silent gap between automatic repeats (0-6 s, set by an administrator)
    pub inter_repeat_pause_seconds: f32,

    /// Background-music volume (0-100)
    pub background_volume_percent: u8,
}

impl Default for PlaybackPreferences {
    fn default() -> Self {
        Self {
            volume_percent: DEFAULT_VOLUME_PERCENT,
            repeat_count: 0,
            auto_play: false,
            show_progress: true,
            background_music_enabled: false,
            background_mix_with_main: true,
            inter_repeat_pause_seconds: 0.0,
            background_volume_percent: DEFAULT_BACKGROUND_VOLUME_PERCENT,
        }
    }
}

impl PlaybackPreferences {
    /// Clamp every numeric field into its documented range
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.volume_percent = self.volume_percent.min(100);
        self.background_volume_percent = self.background_volume_percent.min(100);
        self.inter_repeat_pause_seconds = clamp_pause(self.inter_repeat_pause_seconds);
        self
    }

    /// Shallow-merge `update` into these preferences, then clamp
    pub fn apply(&mut self, update: &PreferencesUpdate) {
        if let Some(volume) = update.volume_percent {
            self.volume_percent = volume;
        }
        if let Some(count) = update.repeat_count {
            self.repeat_count = count;
        }
        if let Some(auto_play) = update.auto_play {
            self.auto_play = auto_play;
        }
        if let Some(show_progress) = update.show_progress {
            self.show_progress = show_progress;
        }
        if let Some(enabled) = update.background_music_enabled {
            self.background_music_enabled = enabled;
        }
        if let Some(mix) = update.background_mix_with_main {
            self.background_mix_with_main = mix;
        }
        if let Some(pause) = update.inter_repeat_pause_seconds {
            self.inter_repeat_pause_seconds = pause;
        }
        if let Some(volume) = update.background_volume_percent {
            self.background_volume_percent = volume;
        }

        *self = self.clone().clamped();
    }

    /// `true` when the track repeats until stopped by the user
    pub fn is_infinite_repeat(&self) -> bool {
        self.repeat_count == 0
    }

    /// Pause between repeats as a `Duration`
    pub fn inter_repeat_pause(&self) -> Duration {
        Duration::from_secs_f32(clamp_pause(self.inter_repeat_pause_seconds))
    }

    /// Main-track volume as a fraction in 0.0..=1.0
    pub fn volume_fraction(&self) -> f32 {
        f32::from(self.volume_percent.min(100)) / 100.0
    }

    /// Background volume as a fraction in 0.0..=1.0
    pub fn background_volume_fraction(&self) -> f32 {
        f32::from(self.background_volume_percent.min(100)) / 100.0
    }
}

fn clamp_pause(seconds: f32) -> f32 {
    if seconds.is_finite() {
        seconds.clamp(0.0, MAX_INTER_REPEAT_PAUSE_SECONDS)
    } else {
        0.0
    }
}

/// Partial preference update; `None` fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreferencesUpdate {
    /// New main track volume (0-100)
    pub volume_percent: Option<u8>,
    /// New number of plays (0 = infinite)
    pub repeat_count: Option<u32>,
    /// New auto-play flag
    pub auto_play: Option<bool>,
    /// New progress reporting flag
    pub show_progress: Option<bool>,
    /// Enable or disable background music
    pub background_music_enabled: Option<bool>,
    /// Let background music play independently of the main track
    pub background_mix_with_main: Option<bool>,
    /// New gap between repeats in seconds (clamped to 0-6)
    pub inter_repeat_pause_seconds: Option<f32>,
    /// New background music volume (0-100)
    pub background_volume_percent: Option<u8>,
}

impl PreferencesUpdate {
    /// `true` if the update changes nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_preferences() {
        let prefs = PlaybackPreferences::default();
        assert_eq!(prefs.volume_percent, 80);
        assert_eq!(prefs.repeat_count, 0);
        assert!(prefs.is_infinite_repeat());
        assert!(!prefs.auto_play);
        assert!(prefs.show_progress);
        assert!(!prefs.background_music_enabled);
        assert!(prefs.background_mix_with_main);
        assert_eq!(prefs.inter_repeat_pause(), Duration::ZERO);
    }

    #[test]
    fn apply_leaves_unspecified_fields() {
        let mut prefs = PlaybackPreferences {
            repeat_count: 5,
            auto_play: true,
            ..Default::default()
        };

        prefs.apply(&PreferencesUpdate {
            volume_percent: Some(42),
            ..Default::default()
        });

        assert_eq!(prefs.volume_percent, 42);
        assert_eq!(prefs.repeat_count, 5);
        assert!(prefs.auto_play);
    }

    #[test]
    fn apply_clamps_volume_and_pause() {
        let mut prefs = PlaybackPreferences::default();
        prefs.apply(&PreferencesUpdate {
            volume_percent: Some(250),
            background_volume_percent: Some(101),
            inter_repeat_pause_seconds: Some(30.0),
            ..Default::default()
        });

        assert_eq!(prefs.volume_percent, 100);
        assert_eq!(prefs.background_volume_percent, 100);
        assert_eq!(prefs.inter_repeat_pause_seconds, 6.0);

        prefs.apply(&PreferencesUpdate {
            inter_repeat_pause_seconds: Some(-1.0),
            ..Default::default()
        });
        assert_eq!(prefs.inter_repeat_pause_seconds, 0.0);

        prefs.apply(&PreferencesUpdate {
            inter_repeat_pause_seconds: Some(f32::NAN),
            ..Default::default()
        });
        assert_eq!(prefs.inter_repeat_pause_seconds, 0.0);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let prefs: PlaybackPreferences =
            serde_json::from_str(r#"{"volumePercent": 30, "repeatCount": 3}"#).unwrap();

        assert_eq!(prefs.volume_percent, 30);
        assert_eq!(prefs.repeat_count, 3);
        assert!(prefs.show_progress);
        assert_eq!(
            prefs.background_volume_percent,
            DEFAULT_BACKGROUND_VOLUME_PERCENT
        );
    }

    #[test]
    fn volume_fraction() {
        let prefs = PlaybackPreferences {
            volume_percent: 50,
            background_volume_percent: 25,
            ..Default::default()
        };
        assert!((prefs.volume_fraction() - 0.5).abs() < f32::EPSILON);
        assert!((prefs.background_volume_fraction() - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn empty_update() {
        assert!(PreferencesUpdate::default().is_empty());
        assert!(!PreferencesUpdate {
            auto_play: Some(false),
            ..Default::default()
        }
        .is_empty());
    }
}
