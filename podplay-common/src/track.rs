//! Track references
//!
//! A [`TrackRef`] identifies one playable episode within its podcast. It is
//! built by whatever layer fetched the episode record and handed to the player
//! as-is; the player never looks inside the locator.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Immutable identity, locator and display metadata for a playable episode
///
/// Fields are private so a reference cannot be edited once the player holds
/// it. Replacing the current track always means constructing a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRef {
    episode_id: String,
    podcast_id: String,
    audio_url: String,
    /// Seconds, as recorded for the episode. The resource may report a
    /// different duration once the source is probed.
    nominal_duration: f64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    podcast_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    artwork_url: Option<String>,
}

impl TrackRef {
    pub fn new(
        episode_id: impl Into<String>,
        podcast_id: impl Into<String>,
        audio_url: impl Into<String>,
        nominal_duration: f64,
    ) -> Self {
        Self {
            episode_id: episode_id.into(),
            podcast_id: podcast_id.into(),
            audio_url: audio_url.into(),
            nominal_duration,
            title: String::new(),
            podcast_title: String::new(),
            artwork_url: None,
        }
    }

    /// Set episode and podcast titles
    pub fn with_titles(mut self, title: impl Into<String>, podcast_title: impl Into<String>) -> Self {
        self.title = title.into();
        self.podcast_title = podcast_title.into();
        self
    }

    /// Set artwork, preferring the episode thumbnail over the podcast image
    pub fn with_artwork(mut self, episode_thumbnail: Option<String>, podcast_image: Option<String>) -> Self {
        self.artwork_url = episode_thumbnail
            .filter(|url| !url.is_empty())
            .or(podcast_image.filter(|url| !url.is_empty()));
        self
    }

    pub fn episode_id(&self) -> &str {
        &self.episode_id
    }

    pub fn podcast_id(&self) -> &str {
        &self.podcast_id
    }

    pub fn audio_url(&self) -> &str {
        &self.audio_url
    }

    /// Nominal duration in seconds; non-finite or negative values read as 0
    pub fn nominal_duration(&self) -> f64 {
        if self.nominal_duration.is_finite() && self.nominal_duration > 0.0 {
            self.nominal_duration
        } else {
            0.0
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn podcast_title(&self) -> &str {
        &self.podcast_title
    }

    pub fn artwork_url(&self) -> Option<&str> {
        self.artwork_url.as_deref()
    }

    /// Reject references that cannot possibly be played
    ///
    /// Used at the API boundary. The player itself accepts any reference and
    /// reports unplayable sources through the session error instead.
    pub fn validate(&self) -> Result<()> {
        if self.episode_id.trim().is_empty() {
            return Err(Error::InvalidInput("episode_id must not be empty".to_string()));
        }
        if self.audio_url.trim().is_empty() {
            return Err(Error::InvalidInput("audio_url must not be empty".to_string()));
        }
        if !self.nominal_duration.is_finite() || self.nominal_duration < 0.0 {
            return Err(Error::InvalidInput(format!(
                "nominal_duration must be a non-negative number (got {})",
                self.nominal_duration
            )));
        }
        Ok(())
    }
}
