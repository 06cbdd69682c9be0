//! Preference commands: open the store, show, update and reset

use crate::config::CliConfig;
use crate::error::Result;
use clap::Args;
use drive_core::types::{PlaybackPreferences, PreferencesUpdate};
use drive_core::KeyValueStore;
use drive_storage::{JsonFileStore, MemoryStore, PreferencesStore};

/// Flags of `prefs set`; omitted flags leave the stored value unchanged
#[derive(Debug, Clone, Default, Args)]
pub struct PrefsSetArgs {
    /// Main track volume (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub volume: Option<u8>,

    /// Number of plays; 0 repeats until stopped
    #[arg(long)]
    pub repeat: Option<u32>,

    /// Start playing as soon as a track is ready
    #[arg(long)]
    pub auto_play: Option<bool>,

    /// Report playback position while playing
    #[arg(long)]
    pub show_progress: Option<bool>,

    /// Enable background music
    #[arg(long)]
    pub background: Option<bool>,

    /// Let background music play independently of the main track
    #[arg(long)]
    pub mix_with_main: Option<bool>,

    /// Background music volume (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub background_volume: Option<u8>,
}

impl PrefsSetArgs {
    /// Partial update carrying only the flags that were given
    pub fn to_update(&self) -> PreferencesUpdate {
        PreferencesUpdate {
            volume_percent: self.volume,
            repeat_count: self.repeat,
            auto_play: self.auto_play,
            show_progress: self.show_progress,
            background_music_enabled: self.background,
            background_mix_with_main: self.mix_with_main,
            background_volume_percent: self.background_volume,
            inter_repeat_pause_seconds: None,
        }
    }
}

/// Preference store backing the command line
pub type CliStore = PreferencesStore<Box<dyn KeyValueStore>>;

/// Open the preference file named by `config` and apply the admin pause
///
/// A file that cannot be opened or parsed never stops the command: the store
/// falls back to defaults held in memory and reports `is_persistent() == false`.
pub fn open_store(config: &CliConfig) -> CliStore {
    let path = &config.storage.preferences_path;
    let mut store = match JsonFileStore::open(path) {
        Ok(backend) => CliStore::new(Box::new(backend)),
        Err(e) => {
            tracing::warn!(
                error = %e,
                path = %path.display(),
                "Failed to open preferences file, continuing in memory"
            );
            CliStore::memory_only(Box::new(MemoryStore::new()))
        }
    };
    apply_admin_pause(&mut store, config.playback.inter_repeat_pause_seconds);
    store
}

/// Write the admin-configured pause into the store if it differs
///
/// Returns `true` when the stored preferences changed.
pub fn apply_admin_pause<S: KeyValueStore>(
    store: &mut PreferencesStore<S>,
    pause_seconds: Option<f32>,
) -> bool {
    let Some(seconds) = pause_seconds else {
        return false;
    };

    if (store.get().inter_repeat_pause_seconds - seconds).abs() <= f32::EPSILON {
        return false;
    }

    let prefs = store.update(&PreferencesUpdate {
        inter_repeat_pause_seconds: Some(seconds),
        ..Default::default()
    });
    tracing::info!(
        seconds = prefs.inter_repeat_pause_seconds,
        "Applied configured inter-repeat pause"
    );
    true
}

/// Pretty JSON rendering used by `prefs show`, `prefs set` and `prefs reset`
pub fn render(prefs: &PlaybackPreferences) -> Result<String> {
    Ok(serde_json::to_string_pretty(prefs)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use drive_storage::MemoryStore;

    #[test]
    fn empty_args_change_nothing() {
        assert!(PrefsSetArgs::default().to_update().is_empty());
    }

    #[test]
    fn args_map_onto_fields() {
        let args = PrefsSetArgs {
            volume: Some(42),
            background: Some(true),
            ..Default::default()
        };
        let update = args.to_update();

        assert_eq!(update.volume_percent, Some(42));
        assert_eq!(update.background_music_enabled, Some(true));
        assert_eq!(update.repeat_count, None);
    }

    #[test]
    fn admin_pause_is_written_once() {
        let mut store = PreferencesStore::new(MemoryStore::new());

        assert!(apply_admin_pause(&mut store, Some(2.5)));
        assert_eq!(store.get().inter_repeat_pause_seconds, 2.5);
        assert!(!apply_admin_pause(&mut store, Some(2.5)));
        assert!(!apply_admin_pause(&mut store, None));
    }

    #[test]
    fn render_uses_camel_case() {
        let json = render(&PlaybackPreferences::default()).unwrap();
        assert!(json.contains("\"volumePercent\": 80"));
        assert!(json.contains("\"interRepeatPauseSeconds\""));
    }
}
