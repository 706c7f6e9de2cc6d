//! Playback source resolution
//!
//! A track carries a primary URL and any number of alternatives. Candidates are
//! tried in order, once each, until one loads and starts playing. Saved
//! progress is restored only when the primary URL is the one that works.

use async_trait::async_trait;
use dharma_core::{Track, TrackId};
use std::fmt;
use thiserror::Error;

/// Scheme for files uploaded to the server
pub const LOCAL_SCHEME: &str = "local://";

/// Server path the uploads directory is served under
pub const UPLOADS_PREFIX: &str = "/uploads/";

const DRIVE_HOST: &str = "drive.google.com";

/// Why the backend refused a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaErrorKind {
    /// Container or codec not playable
    NotSupported,
    /// Playback start blocked by autoplay policy
    NotAllowed,
    /// Fetching the media failed
    Network,
    Other,
}

/// Error reported by a [`MediaBackend`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?}: {message}")]
pub struct MediaError {
    pub kind: MediaErrorKind,
    pub message: String,
}

impl MediaError {
    pub fn new(kind: MediaErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::new(MediaErrorKind::NotSupported, message)
    }

    pub fn not_allowed(message: impl Into<String>) -> Self {
        Self::new(MediaErrorKind::NotAllowed, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(MediaErrorKind::Network, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(MediaErrorKind::Other, message)
    }
}

/// Platform media element
///
/// Browser, desktop and test backends implement this so resolution does not
/// depend on how audio is actually produced.
#[async_trait]
pub trait MediaBackend: Send {
    /// Point the backend at `url` and load it
    async fn load(&mut self, url: &str) -> Result<(), MediaError>;

    /// Jump to `seconds` in the loaded source
    async fn seek(&mut self, seconds: f64) -> Result<(), MediaError>;

    /// Start or resume playback
    async fn play(&mut self) -> Result<(), MediaError>;

    /// Pause playback
    async fn pause(&mut self);

    /// Output volume in `[0.0, 1.0]`
    fn set_volume(&mut self, _volume: f64) {}
}

/// Source of saved playback positions
#[async_trait]
pub trait ProgressLookup: Send + Sync {
    /// Last saved offset in seconds, 0 when nothing is saved
    async fn saved_position(&self, track_id: TrackId) -> f64;
}

/// A successful resolution
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The (rewritten) URL now playing
    pub url: String,
    /// Position of that URL among the candidates
    pub index: usize,
    /// Number of candidates tried, including the successful one
    pub attempts: usize,
    /// Offset restored before playback started
    pub restored_position: Option<f64>,
}

/// One candidate that did not play
#[derive(Debug, Clone, PartialEq)]
pub struct FailedAttempt {
    pub index: usize,
    pub url: String,
    pub error: MediaError,
}

/// Aggregated failure category shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCause {
    UnsupportedFormat,
    AutoplayBlocked,
    Network,
    /// The hosting service refuses direct playback (Google Drive)
    HostBlocked,
    Unknown,
}

impl FailureCause {
    pub fn user_message(self) -> &'static str {
        match self {
            Self::UnsupportedFormat => "Cannot play track: the file format is not supported.",
            Self::AutoplayBlocked => "Cannot play track: the browser blocked autoplay.",
            Self::Network => "Cannot play track: network error.",
            Self::HostBlocked => {
                "Cannot play track: Google Drive blocks direct access. Upload the file or use another host."
            }
            Self::Unknown => "Cannot play track: please check the audio URL.",
        }
    }
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.user_message())
    }
}

/// Every candidate failed
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} playback source(s) failed: {cause}", attempts.len())]
pub struct ResolveError {
    pub cause: FailureCause,
    pub attempts: Vec<FailedAttempt>,
}

impl ResolveError {
    pub fn user_message(&self) -> &'static str {
        self.cause.user_message()
    }
}

/// Primary URL followed by the alternatives, skipping blanks
pub fn candidate_urls(track: &Track) -> Vec<String> {
    std::iter::once(&track.url)
        .chain(&track.alternative_urls)
        .filter(|url| !url.trim().is_empty())
        .cloned()
        .collect()
}

/// Map `local://name` onto the server's uploads path; other URLs pass through
pub fn rewrite_local_url(url: &str) -> String {
    match url.strip_prefix(LOCAL_SCHEME) {
        Some(name) => format!("{UPLOADS_PREFIX}{name}"),
        None => url.to_string(),
    }
}

/// Try each candidate of `track` in order until one plays.
///
/// When the primary URL loads and `progress` has a positive saved offset for
/// the track, the backend is seeked there before playback starts.
pub async fn resolve(
    track: &Track,
    backend: &mut (dyn MediaBackend + '_),
    progress: Option<&dyn ProgressLookup>,
) -> Result<Resolution, ResolveError> {
    let candidates = candidate_urls(track);
    let total = candidates.len();
    let mut failures = Vec::new();

    for (index, candidate) in candidates.iter().enumerate() {
        let url = rewrite_local_url(candidate);
        tracing::debug!(track = %track.id, attempt = index + 1, total, url = %url, "Trying playback source");

        match try_candidate(track.id, &url, index == 0, backend, progress).await {
            Ok(restored_position) => {
                tracing::info!(track = %track.id, attempt = index + 1, url = %url, "Playback started");
                return Ok(Resolution {
                    url,
                    index,
                    attempts: index + 1,
                    restored_position,
                });
            }
            Err(error) => {
                tracing::warn!(track = %track.id, attempt = index + 1, url = %url, error = %error, "Playback source failed");
                failures.push(FailedAttempt { index, url, error });
            }
        }
    }

    let cause = classify(&candidates, &failures);
    tracing::warn!(track = %track.id, attempts = failures.len(), ?cause, "All playback sources failed");
    Err(ResolveError {
        cause,
        attempts: failures,
    })
}

async fn try_candidate(
    track_id: TrackId,
    url: &str,
    is_primary: bool,
    backend: &mut (dyn MediaBackend + '_),
    progress: Option<&dyn ProgressLookup>,
) -> Result<Option<f64>, MediaError> {
    backend.load(url).await?;

    let mut restored = None;
    if let (true, Some(progress)) = (is_primary, progress) {
        let saved = progress.saved_position(track_id).await;
        if saved > 0.0 {
            match backend.seek(saved).await {
                Ok(()) => restored = Some(saved),
                // Playback still starts from the beginning
                Err(error) => {
                    tracing::warn!(track = %track_id, position = saved, error = %error, "Failed to restore saved position");
                }
            }
        }
    }

    backend.play().await?;
    Ok(restored)
}

fn classify(candidates: &[String], failures: &[FailedAttempt]) -> FailureCause {
    let Some(last) = failures.last() else {
        return FailureCause::Unknown;
    };

    match last.error.kind {
        MediaErrorKind::NotSupported => FailureCause::UnsupportedFormat,
        MediaErrorKind::NotAllowed => FailureCause::AutoplayBlocked,
        MediaErrorKind::Network => FailureCause::Network,
        MediaErrorKind::Other if last.error.message.to_lowercase().contains("network") => {
            FailureCause::Network
        }
        MediaErrorKind::Other if candidates.iter().any(|url| url.contains(DRIVE_HOST)) => {
            FailureCause::HostBlocked
        }
        MediaErrorKind::Other => FailureCause::Unknown,
    }
}
