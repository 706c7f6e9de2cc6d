//! Scripted media backend shared by the playback tests

use async_trait::async_trait;
use dharma_core::{CreateTrack, Track, TrackId};
use dharma_playback::{MediaBackend, MediaError};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load(String),
    Seek(f64),
    Play,
    Pause,
    Volume(f64),
}

/// Backend whose `play` fails for every URL without a scripted success.
///
/// `load` always succeeds so tests can see which URLs were tried in order.
#[derive(Debug)]
pub struct ScriptedBackend {
    pub calls: Vec<Call>,
    playable: Vec<String>,
    failures: HashMap<String, MediaError>,
    default_failure: MediaError,
    seek_failure: Option<MediaError>,
    loaded: Option<String>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            playable: Vec::new(),
            failures: HashMap::new(),
            default_failure: MediaError::other("Failed to load because no supported source was found"),
            seek_failure: None,
            loaded: None,
        }
    }

    pub fn playable(mut self, url: &str) -> Self {
        self.playable.push(url.to_string());
        self
    }

    pub fn failing_with(mut self, url: &str, error: MediaError) -> Self {
        self.failures.insert(url.to_string(), error);
        self
    }

    pub fn failing_seek(mut self, error: MediaError) -> Self {
        self.seek_failure = Some(error);
        self
    }

    pub fn loaded_urls(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Load(url) => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl MediaBackend for ScriptedBackend {
    async fn load(&mut self, url: &str) -> Result<(), MediaError> {
        self.calls.push(Call::Load(url.to_string()));
        self.loaded = Some(url.to_string());
        Ok(())
    }

    async fn seek(&mut self, seconds: f64) -> Result<(), MediaError> {
        self.calls.push(Call::Seek(seconds));
        match &self.seek_failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn play(&mut self) -> Result<(), MediaError> {
        self.calls.push(Call::Play);
        let url = self.loaded.clone().unwrap_or_default();
        if self.playable.contains(&url) {
            return Ok(());
        }
        Err(self
            .failures
            .get(&url)
            .cloned()
            .unwrap_or_else(|| self.default_failure.clone()))
    }

    async fn pause(&mut self) {
        self.calls.push(Call::Pause);
    }

    fn set_volume(&mut self, volume: f64) {
        self.calls.push(Call::Volume(volume));
    }
}

pub fn track(id: i64, url: &str, alternatives: &[&str]) -> Track {
    let mut create = CreateTrack::new(format!("Track {id}"), url);
    create.alternative_urls = alternatives.iter().map(ToString::to_string).collect();
    create.duration = 300.0;
    create.into_track(TrackId::new(id), "2025-01-01T00:00:00.000Z".to_string())
}
