//! Drive Mental command line library
//!
//! Preference management and simulated listening sessions on top of the
//! playback and storage crates.
//!
//! This library exposes the building blocks of the `drive-mental` binary for testing purposes.

pub mod config;
pub mod error;
pub mod prefs;
pub mod session;

// Re-export commonly used types for convenience
pub use crate::config::CliConfig;
pub use error::{CliError, Result};
pub use prefs::{apply_admin_pause, open_store, render, CliStore, PrefsSetArgs};
pub use session::{run_session, PlayArgs, SessionOptions, SessionReport};
