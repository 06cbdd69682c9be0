//! Drive Mental Storage
//!
//! Durable playback preferences for Drive Mental.
//!
//! # Architecture
//!
//! - **Backends**: implementations of [`drive_core::KeyValueStore`]
//!   ([`MemoryStore`] for tests and ephemeral sessions, [`JsonFileStore`] for
//!   on-disk persistence)
//! - **Preferences**: [`PreferencesStore`], a read/write façade that merges
//!   defaults on read, persists on every mutation and notifies subscribers
//! - **Degradation**: when the backend fails, the store keeps working from its
//!   in-memory snapshot for the rest of the session
//!
//! # Example
//!
//! ```rust
//! use drive_core::types::PreferencesUpdate;
//! use drive_storage::{MemoryStore, PreferencesStore};
//!
//! let mut store = PreferencesStore::new(MemoryStore::new());
//!
//! store.update(&PreferencesUpdate {
//!     volume_percent: Some(42),
//!     ..Default::default()
//! });
//!
//! assert_eq!(store.get().volume_percent, 42);
//! ```

mod error;
mod file;
mod memory;

pub mod preferences;

pub use error::{Result, StorageError};
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use preferences::{PreferencesStore, PREFERENCES_KEY};
