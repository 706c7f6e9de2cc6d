//! Player state
//!
//! Everything the UI renders about playback lives in one value, changed only
//! through the methods below.

use dharma_core::Track;

/// Playlist, position and output settings of the player
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    playlist: Vec<Track>,
    current_index: Option<usize>,
    is_playing: bool,
    is_loading: bool,
    current_time: f64,
    duration: f64,
    volume: f64,
    last_error: Option<String>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            playlist: Vec::new(),
            current_index: None,
            is_playing: false,
            is_loading: false,
            current_time: 0.0,
            duration: 0.0,
            volume: 1.0,
            last_error: None,
        }
    }
}

impl PlayerState {
    // ===== Playlist =====

    /// Replace the playlist. The current index is dropped if it no longer
    /// points into the new list.
    pub fn load_playlist(&mut self, tracks: Vec<Track>) {
        self.playlist = tracks;
        if self.current_index.is_some_and(|i| i >= self.playlist.len()) {
            self.current_index = None;
        }
    }

    pub fn playlist(&self) -> &[Track] {
        &self.playlist
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_index.and_then(|i| self.playlist.get(i))
    }

    /// Make `index` the current track and reset position for it
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.playlist.len() {
            return false;
        }
        self.current_index = Some(index);
        self.current_time = 0.0;
        self.duration = self.playlist[index].duration;
        self.is_loading = true;
        self.last_error = None;
        true
    }

    /// Index after the current one, wrapping to the first track
    pub fn next_index(&self) -> Option<usize> {
        let len = self.playlist.len();
        if len == 0 {
            return None;
        }
        Some(match self.current_index {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        })
    }

    /// Index before the current one, wrapping to the last track
    pub fn previous_index(&self) -> Option<usize> {
        let len = self.playlist.len();
        if len == 0 {
            return None;
        }
        Some(match self.current_index {
            Some(i) if i > 0 && i < len => i - 1,
            _ => len - 1,
        })
    }

    // ===== Transport =====

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub(crate) fn set_playing(&mut self, playing: bool) {
        self.is_playing = playing;
        self.is_loading = false;
    }

    pub(crate) fn set_failed(&mut self, message: impl Into<String>) {
        self.is_playing = false;
        self.is_loading = false;
        self.last_error = Some(message.into());
    }

    /// User-facing message of the last playback failure
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ===== Position =====

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Position reported by the backend
    pub fn set_current_time(&mut self, seconds: f64) {
        if seconds.is_finite() && seconds >= 0.0 {
            self.current_time = seconds;
        }
    }

    /// Duration reported once metadata is loaded
    pub fn set_duration(&mut self, seconds: f64) {
        if seconds.is_finite() && seconds >= 0.0 {
            self.duration = seconds;
        }
        self.is_loading = false;
    }

    /// Position as a percentage of duration (0 when duration is unknown)
    pub fn progress_percent(&self) -> f64 {
        if self.duration > 0.0 {
            self.current_time / self.duration * 100.0
        } else {
            0.0
        }
    }

    /// Move to `percent` (0-100) of the duration.
    ///
    /// Returns the new position, or `None` while the duration is unknown.
    pub fn seek_percent(&mut self, percent: f64) -> Option<f64> {
        if self.duration <= 0.0 || !percent.is_finite() {
            return None;
        }
        let seconds = percent.clamp(0.0, 100.0) / 100.0 * self.duration;
        self.current_time = seconds;
        Some(seconds)
    }

    // ===== Volume =====

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Set volume, clamped to `[0.0, 1.0]`
    pub fn set_volume(&mut self, volume: f64) -> f64 {
        if volume.is_finite() {
            self.volume = volume.clamp(0.0, 1.0);
        }
        self.volume
    }
}

/// Format seconds as `m:ss` (`0:00` for anything that is not a number)
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
