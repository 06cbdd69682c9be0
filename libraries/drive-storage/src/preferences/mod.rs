//! Playback preference persistence
//!
//! The preferences live as one JSON document under [`PREFERENCES_KEY`].
//! Reads merge the stored document with the defaults, so missing or unknown
//! keys never fail a load. Every mutation is written immediately with a single
//! `set` call and broadcast to subscribers.
//!
//! # Example
//!
//! ```rust
//! use drive_core::types::PreferencesUpdate;
//! use drive_storage::{MemoryStore, PreferencesStore};
//!
//! let mut store = PreferencesStore::new(MemoryStore::new());
//! let mut changes = store.subscribe();
//!
//! store.update(&PreferencesUpdate {
//!     repeat_count: Some(3),
//!     ..Default::default()
//! });
//!
//! assert!(changes.has_changed().unwrap());
//! assert_eq!(changes.borrow_and_update().repeat_count, 3);
//! ```

use drive_core::types::{PlaybackPreferences, PreferencesUpdate};
use drive_core::KeyValueStore;
use tokio::sync::watch;

/// Storage key of the preferences document
pub const PREFERENCES_KEY: &str = "drive.playback_preferences";

/// Read/write façade over durable preference storage
///
/// When the backend fails, the store logs a warning and continues from its
/// in-memory snapshot; playback is never blocked on storage.
pub struct PreferencesStore<S: KeyValueStore> {
    storage: S,
    snapshot: PlaybackPreferences,
    degraded: bool,
    changes: watch::Sender<PlaybackPreferences>,
}

impl<S: KeyValueStore> PreferencesStore<S> {
    /// Create a store over `storage`, loading (or defaulting) the preferences
    pub fn new(storage: S) -> Self {
        let snapshot = load(&storage).unwrap_or_default();
        let (changes, _) = watch::channel(snapshot.clone());

        Self {
            storage,
            snapshot,
            degraded: false,
            changes,
        }
    }

    /// Create a store that never writes to `storage`
    ///
    /// Used when the durable backend could not be opened; the session keeps
    /// working from defaults and `is_persistent` reports `false`.
    pub fn memory_only(storage: S) -> Self {
        let mut store = Self::new(storage);
        store.degraded = true;
        store
    }

    /// Current preferences, merged with defaults
    ///
    /// Reads through to storage; falls back to the in-memory snapshot when the
    /// backend is unreadable or a previous write failed.
    pub fn get(&self) -> PlaybackPreferences {
        if self.degraded {
            return self.snapshot.clone();
        }

        load(&self.storage).unwrap_or_else(|| self.snapshot.clone())
    }

    /// Shallow-merge `update`, persist, and return the new preferences
    pub fn update(&mut self, update: &PreferencesUpdate) -> PlaybackPreferences {
        let mut prefs = self.get();
        prefs.apply(update);
        self.commit(prefs)
    }

    /// Overwrite the stored preferences with the defaults
    pub fn reset_to_defaults(&mut self) -> PlaybackPreferences {
        tracing::info!("Resetting playback preferences to defaults");
        self.commit(PlaybackPreferences::default())
    }

    /// Subscribe to preference changes
    ///
    /// The receiver starts at the current snapshot and is marked changed after
    /// every `update` or `reset_to_defaults`.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackPreferences> {
        self.changes.subscribe()
    }

    /// `false` when the store is memory-only (opened that way or after a failed write)
    pub fn is_persistent(&self) -> bool {
        !self.degraded
    }

    /// Borrow the storage backend
    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn commit(&mut self, prefs: PlaybackPreferences) -> PlaybackPreferences {
        let prefs = prefs.clamped();

        if !self.degraded {
            if let Err(e) = self.persist(&prefs) {
                tracing::warn!(
                    error = %e,
                    "Failed to persist playback preferences, continuing in memory"
                );
                self.degraded = true;
            }
        }

        self.snapshot = prefs.clone();
        self.changes.send_replace(prefs.clone());
        prefs
    }

    fn persist(&mut self, prefs: &PlaybackPreferences) -> drive_core::Result<()> {
        let json = serde_json::to_string(prefs)?;
        self.storage.set(PREFERENCES_KEY, &json)
    }
}

/// Load the stored document; `None` means "use what you have"
fn load<S: KeyValueStore>(storage: &S) -> Option<PlaybackPreferences> {
    match storage.get(PREFERENCES_KEY) {
        Ok(Some(json)) => match serde_json::from_str::<PlaybackPreferences>(&json) {
            Ok(prefs) => Some(prefs.clamped()),
            Err(e) => {
                tracing::warn!(error = %e, "Stored playback preferences are corrupt, using defaults");
                Some(PlaybackPreferences::default())
            }
        },
        Ok(None) => Some(PlaybackPreferences::default()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read playback preferences");
            None
        }
    }
}
