//! Content-source track record

use serde::{Deserialize, Serialize};

/// A playable track as delivered by the content source
///
/// The URL is an opaque playable resource; it is never fetched or validated
/// here. Failures surface through the playback engine's error channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Playable audio URL
    pub audio_url: String,

    /// Display title
    pub title: String,
}

impl Track {
    /// Create a new track
    pub fn new(title: impl Into<String>, audio_url: impl Into<String>) -> Self {
        Self {
            audio_url: audio_url.into(),
            title: title.into(),
        }
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.title, self.audio_url)
    }
}
