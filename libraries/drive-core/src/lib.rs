//! Drive Mental Core
//!
//! Platform-agnostic types, the storage contract and error handling shared by
//! every Drive Mental crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `PlaybackPreferences`, `PreferencesUpdate`
//! - **Core Traits**: `KeyValueStore` (durable preference storage)
//! - **Error Handling**: Unified `DriveError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use drive_core::types::{PlaybackPreferences, PreferencesUpdate, Track};
//!
//! let track = Track::new("Morning Focus", "https://cdn.example.com/focus.mp3");
//!
//! let mut prefs = PlaybackPreferences::default();
//! prefs.apply(&PreferencesUpdate {
//!     volume_percent: Some(42),
//!     ..Default::default()
//! });
//!
//! assert_eq!(prefs.volume_percent, 42);
//! assert_eq!(track.title, "Morning Focus");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{DriveError, Result};
pub use storage::KeyValueStore;
pub use types::{PlaybackPreferences, PreferencesUpdate, Track};
