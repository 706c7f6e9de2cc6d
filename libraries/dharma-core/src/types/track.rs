//! Track types

use super::ids::TrackId;
use crate::error::{DharmaError, Result};
use serde::{Deserialize, Serialize};

/// A playable track with a primary URL and optional fallbacks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: Option<String>,
    /// Primary playback URL (`http(s)://`, `/uploads/...` or `local://name`)
    pub url: String,
    /// Fallback URLs tried in order after `url`
    #[serde(default)]
    pub alternative_urls: Vec<String>,
    pub thumbnail: Option<String>,
    /// Duration in seconds, 0 when unknown
    #[serde(default)]
    pub duration: f64,
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
    pub created_at: String,
}

impl Track {
    /// Merge a partial update
    pub fn apply(&mut self, update: UpdateTrack) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(artist) = update.artist {
            self.artist = Some(artist);
        }
        if let Some(url) = update.url {
            self.url = url;
        }
        if let Some(alternative_urls) = update.alternative_urls {
            self.alternative_urls = alternative_urls;
        }
        if let Some(thumbnail) = update.thumbnail {
            self.thumbnail = Some(thumbnail);
        }
        if let Some(duration) = update.duration {
            self.duration = duration;
        }
        if let Some(file_size) = update.file_size {
            self.file_size = Some(file_size);
        }
        if let Some(file_type) = update.file_type {
            self.file_type = Some(file_type);
        }
    }
}

/// Data for creating a new track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrack {
    pub title: String,
    #[serde(default)]
    pub artist: Option<String>,
    pub url: String,
    #[serde(default)]
    pub alternative_urls: Vec<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub file_size: Option<i64>,
    #[serde(default)]
    pub file_type: Option<String>,
}

impl CreateTrack {
    /// Minimal track with just a title and a primary URL
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: None,
            url: url.into(),
            alternative_urls: Vec::new(),
            thumbnail: None,
            duration: 0.0,
            file_size: None,
            file_type: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(DharmaError::invalid_input("Track title is required"));
        }
        if self.url.trim().is_empty() {
            return Err(DharmaError::invalid_input("Track URL is required"));
        }
        validate_duration(self.duration)
    }

    /// Build the stored track once the backend has assigned an id
    pub fn into_track(self, id: TrackId, created_at: String) -> Track {
        Track {
            id,
            title: self.title,
            artist: self.artist,
            url: self.url,
            alternative_urls: self.alternative_urls,
            thumbnail: self.thumbnail,
            duration: self.duration,
            file_size: self.file_size,
            file_type: self.file_type,
            created_at,
        }
    }
}

/// Data for updating a track (all fields optional)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTrack {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_urls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

impl UpdateTrack {
    pub fn validate(&self) -> Result<()> {
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(DharmaError::invalid_input("Track title cannot be empty"));
        }
        if self.url.as_deref().is_some_and(|u| u.trim().is_empty()) {
            return Err(DharmaError::invalid_input("Track URL cannot be empty"));
        }
        match self.duration {
            Some(duration) => validate_duration(duration),
            None => Ok(()),
        }
    }
}

/// What a track deletion leaves behind for the caller to clean up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedTrack {
    pub url: String,
    pub thumbnail: Option<String>,
}

fn validate_duration(duration: f64) -> Result<()> {
    if !duration.is_finite() || duration < 0.0 {
        return Err(DharmaError::invalid_input(
            "Duration must be a non-negative number",
        ));
    }
    Ok(())
}
