//! Configuration loading: file, environment and validation

use drive_mental::{CliConfig, CliError};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

fn env(vars: &[(&str, &str)]) -> HashMap<String, String> {
    vars.iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("drive-mental.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn file_values_are_loaded() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[playback]
inter_repeat_pause_seconds = 2.5
tick_ms = 250

[storage]
preferences_path = "/var/lib/drive/prefs.json"
"#,
    );

    let config = CliConfig::load_from(Some(path.as_path()), HashMap::new()).unwrap();

    assert_eq!(config.playback.inter_repeat_pause_seconds, Some(2.5));
    assert_eq!(config.tick_interval(), Duration::from_millis(250));
    assert_eq!(
        config.storage.preferences_path,
        PathBuf::from("/var/lib/drive/prefs.json")
    );
    assert!(config.validate().is_ok());
}

#[test]
fn missing_sections_use_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[playback]\ntick_ms = 50\n");

    let config = CliConfig::load_from(Some(path.as_path()), HashMap::new()).unwrap();

    assert_eq!(config.playback.tick_ms, 50);
    assert_eq!(config.playback.inter_repeat_pause_seconds, None);
    assert_eq!(
        config.storage.preferences_path,
        PathBuf::from("./data/preferences.json")
    );
}

#[test]
fn environment_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[playback]\ntick_ms = 250\n");

    let config = CliConfig::load_from(
        Some(path.as_path()),
        env(&[
            ("DRIVE_PLAYBACK__TICK_MS", "20"),
            ("DRIVE_PLAYBACK__INTER_REPEAT_PAUSE_SECONDS", "4"),
            ("DRIVE_STORAGE__PREFERENCES_PATH", "/tmp/drive/prefs.json"),
        ]),
    )
    .unwrap();

    assert_eq!(config.playback.tick_ms, 20);
    assert_eq!(config.playback.inter_repeat_pause_seconds, Some(4.0));
    assert_eq!(
        config.storage.preferences_path,
        PathBuf::from("/tmp/drive/prefs.json")
    );
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let result = CliConfig::load_from(Some(path.as_path()), HashMap::new());
    assert!(matches!(result, Err(CliError::Config(_))));
}

#[test]
fn out_of_range_pause_fails_validation() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[playback]\ninter_repeat_pause_seconds = 9.0\n");

    let config = CliConfig::load_from(Some(path.as_path()), HashMap::new()).unwrap();
    assert!(matches!(config.validate(), Err(CliError::Config(_))));
}
