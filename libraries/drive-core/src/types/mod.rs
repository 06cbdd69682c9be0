//! Domain types

mod preferences;
mod track;

pub use preferences::{
    PlaybackPreferences, PreferencesUpdate, DEFAULT_BACKGROUND_VOLUME_PERCENT,
    DEFAULT_VOLUME_PERCENT, MAX_INTER_REPEAT_PAUSE_SECONDS,
};
pub use track::Track;
