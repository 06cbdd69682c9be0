//! Integration tests for the preferences store over real backends

use drive_core::types::{PlaybackPreferences, PreferencesUpdate};
use drive_core::{DriveError, KeyValueStore};
use drive_storage::{JsonFileStore, MemoryStore, PreferencesStore, PREFERENCES_KEY};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Backend whose writes can be switched off mid-session
struct FlakyStore {
    inner: MemoryStore,
    fail_writes: Arc<AtomicBool>,
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> drive_core::Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> drive_core::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DriveError::storage("quota exceeded"));
        }
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> drive_core::Result<()> {
        self.inner.remove(key)
    }
}

#[test]
fn test_update_then_get_round_trip() {
    let mut store = PreferencesStore::new(MemoryStore::new());
    store.update(&PreferencesUpdate {
        repeat_count: Some(9),
        ..Default::default()
    });

    let returned = store.update(&PreferencesUpdate {
        volume_percent: Some(42),
        ..Default::default()
    });

    let prefs = store.get();
    assert_eq!(returned, prefs);
    assert_eq!(prefs.volume_percent, 42);
    assert_eq!(prefs.repeat_count, 9);
    assert_eq!(prefs.show_progress, PlaybackPreferences::default().show_progress);
}

#[test]
fn test_reset_to_defaults() {
    let mut store = PreferencesStore::new(MemoryStore::new());
    store.update(&PreferencesUpdate {
        volume_percent: Some(10),
        background_music_enabled: Some(true),
        ..Default::default()
    });

    let prefs = store.reset_to_defaults();

    assert_eq!(prefs, PlaybackPreferences::default());
    assert_eq!(store.get(), PlaybackPreferences::default());
    assert!(store.storage().get(PREFERENCES_KEY).unwrap().is_some());
}

#[test]
fn test_file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("preferences.json");

    {
        let mut store = PreferencesStore::new(JsonFileStore::open(&path).unwrap());
        store.update(&PreferencesUpdate {
            volume_percent: Some(33),
            inter_repeat_pause_seconds: Some(2.0),
            ..Default::default()
        });
    }

    let store = PreferencesStore::new(JsonFileStore::open(&path).unwrap());
    let prefs = store.get();
    assert_eq!(prefs.volume_percent, 33);
    assert_eq!(prefs.inter_repeat_pause_seconds, 2.0);
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn test_file_store_rejects_garbage_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    assert!(JsonFileStore::open(&path).is_err());
}

#[test]
fn test_write_failure_degrades_to_memory() {
    let fail_writes = Arc::new(AtomicBool::new(false));
    let mut store = PreferencesStore::new(FlakyStore {
        inner: MemoryStore::new(),
        fail_writes: fail_writes.clone(),
    });

    store.update(&PreferencesUpdate {
        volume_percent: Some(20),
        ..Default::default()
    });
    assert!(store.is_persistent());

    fail_writes.store(true, Ordering::SeqCst);
    let prefs = store.update(&PreferencesUpdate {
        volume_percent: Some(70),
        ..Default::default()
    });

    // Session keeps the new value even though the backend rejected it
    assert!(!store.is_persistent());
    assert_eq!(prefs.volume_percent, 70);
    assert_eq!(store.get().volume_percent, 70);

    // Backend still holds the last good write
    let json = store.storage().get(PREFERENCES_KEY).unwrap().unwrap();
    let stored: PlaybackPreferences = serde_json::from_str(&json).unwrap();
    assert_eq!(stored.volume_percent, 20);
}

#[tokio::test]
async fn test_subscribers_see_every_mutation() {
    let mut store = PreferencesStore::new(MemoryStore::new());
    let mut rx = store.subscribe();

    let watcher = tokio::spawn(async move {
        rx.changed().await.unwrap();
        rx.borrow_and_update().volume_percent
    });

    store.update(&PreferencesUpdate {
        volume_percent: Some(55),
        ..Default::default()
    });

    assert_eq!(watcher.await.unwrap(), 55);

    let mut rx = store.subscribe();
    assert!(!rx.has_changed().unwrap());
    store.reset_to_defaults();
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().volume_percent, 80);
}
