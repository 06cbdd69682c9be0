/// Command line configuration
use crate::error::{CliError, Result};
use drive_core::types::MAX_INTER_REPEAT_PAUSE_SECONDS;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "drive-mental.toml";

/// Longest accepted tick interval in milliseconds
pub const MAX_TICK_MS: u64 = 60_000;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default = "default_playback")]
    pub playback: PlaybackSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    /// Admin-configured silent gap between repeats; unset leaves the stored value alone
    #[serde(default)]
    pub inter_repeat_pause_seconds: Option<f32>,

    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_preferences_path")]
    pub preferences_path: PathBuf,
}

impl CliConfig {
    /// Load configuration from `drive-mental.toml` (if present) and environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env: HashMap<String, String> = std::env::vars()
            .filter(|(key, _)| key.starts_with("DRIVE_"))
            .collect();
        Self::load_from(path, env)
    }

    /// Load configuration from an optional file and an explicit variable set
    ///
    /// Variables use the `DRIVE_` prefix and `__` between section and key,
    /// e.g. `DRIVE_PLAYBACK__TICK_MS`.
    pub fn load_from(path: Option<&Path>, env: HashMap<String, String>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "configuration file {} not found",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (prefixed with DRIVE_)
        settings = settings.add_source(
            config::Environment::with_prefix("DRIVE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(Some(env)),
        );

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_TICK_MS).contains(&self.playback.tick_ms) {
            return Err(CliError::Config(format!(
                "tick interval must be between 1 and {} ms (DRIVE_PLAYBACK__TICK_MS), got {}",
                MAX_TICK_MS, self.playback.tick_ms
            )));
        }

        if let Some(seconds) = self.playback.inter_repeat_pause_seconds {
            if !seconds.is_finite() || !(0.0..=MAX_INTER_REPEAT_PAUSE_SECONDS).contains(&seconds) {
                return Err(CliError::Config(format!(
                    "inter-repeat pause must be between 0 and {} seconds, got {}",
                    MAX_INTER_REPEAT_PAUSE_SECONDS, seconds
                )));
            }
        }

        if self.storage.preferences_path.as_os_str().is_empty() {
            return Err(CliError::Config(
                "preferences path must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Wall-clock interval between player ticks
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.playback.tick_ms)
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            playback: default_playback(),
            storage: default_storage(),
        }
    }
}

// Default values
fn default_playback() -> PlaybackSettings {
    PlaybackSettings {
        inter_repeat_pause_seconds: None,
        tick_ms: default_tick_ms(),
    }
}

fn default_tick_ms() -> u64 {
    100
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        preferences_path: default_preferences_path(),
    }
}

fn default_preferences_path() -> PathBuf {
    PathBuf::from("./data/preferences.json")
}
