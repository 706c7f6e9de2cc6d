//! Player - ties state, source resolution and progress tracking together
//!
//! The player owns the media backend and the [`PlayerState`]. Every change
//! that matters for progress saving is published on a watch channel that the
//! [`ProgressTracker`] task observes.

use crate::{
    error::{PlaybackError, Result},
    resolver::{self, MediaBackend, ProgressLookup, Resolution},
    state::PlayerState,
    tracker::{PlaybackSnapshot, ProgressTracker},
};
use dharma_core::{DharmaError, PersistenceGateway, UpdateUser, User};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Music player bound to a media backend and a persistence gateway
pub struct Player<B: MediaBackend> {
    backend: B,
    state: PlayerState,
    session: Option<User>,
    gateway: Arc<dyn PersistenceGateway>,
    tracker: ProgressTracker,
    snapshots: watch::Sender<PlaybackSnapshot>,
    autosave: Option<JoinHandle<()>>,
}

impl<B: MediaBackend> Player<B> {
    pub fn new(backend: B, gateway: Arc<dyn PersistenceGateway>) -> Self {
        let tracker = ProgressTracker::new(Arc::clone(&gateway));
        Self::with_tracker(backend, gateway, tracker)
    }

    pub fn with_tracker(
        backend: B,
        gateway: Arc<dyn PersistenceGateway>,
        tracker: ProgressTracker,
    ) -> Self {
        let (snapshots, _) = watch::channel(PlaybackSnapshot::default());
        Self {
            backend,
            state: PlayerState::default(),
            session: None,
            gateway,
            tracker,
            snapshots,
            autosave: None,
        }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Receiver of the snapshots the auto-save task sees
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshots.subscribe()
    }

    // ===== Session =====

    /// Check credentials and remember the user
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<User> {
        let user = self.gateway.authenticate(email, password).await?;
        tracing::info!(user = %user.id, "Signed in");
        self.session = Some(user.clone());
        self.publish();
        Ok(user)
    }

    pub fn sign_out(&mut self) {
        if let Some(user) = self.session.take() {
            tracing::info!(user = %user.id, "Signed out");
        }
        self.publish();
    }

    /// Update the signed-in user's own account
    pub async fn update_account(&mut self, update: UpdateUser) -> Result<User> {
        let id = self
            .session
            .as_ref()
            .map(|u| u.id)
            .ok_or_else(|| DharmaError::AuthFailed("Not signed in".to_string()))?;
        let user = self.gateway.update_user(id, update).await?;
        self.session = Some(user.clone());
        Ok(user)
    }

    pub fn current_user(&self) -> Option<&User> {
        self.session.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.session.as_ref().is_some_and(|u| u.is_admin)
    }

    // ===== Library =====

    /// Replace the playlist with the gateway's track list
    pub async fn load_library(&mut self) -> Result<usize> {
        let tracks = self.gateway.list_tracks().await?;
        let count = tracks.len();
        self.state.load_playlist(tracks);
        tracing::debug!(count, "Library loaded");
        self.publish();
        Ok(count)
    }

    // ===== Transport =====

    /// Resolve and start the track at `index`
    pub async fn play_track(&mut self, index: usize) -> Result<Resolution> {
        if !self.state.select(index) {
            return Err(PlaybackError::IndexOutOfBounds(index));
        }
        let track = self
            .state
            .current_track()
            .cloned()
            .ok_or(PlaybackError::NoTrackLoaded)?;
        self.publish();

        let lookup = self.session.as_ref().map(|u| self.tracker.for_user(u.id));
        let progress = lookup.as_ref().map(|l| l as &dyn ProgressLookup);

        match resolver::resolve(&track, &mut self.backend, progress).await {
            Ok(resolution) => {
                if let Some(seconds) = resolution.restored_position {
                    self.state.set_current_time(seconds);
                }
                self.state.set_playing(true);
                self.publish();
                Ok(resolution)
            }
            Err(e) => {
                self.state.set_failed(e.user_message());
                self.publish();
                Err(e.into())
            }
        }
    }

    /// Pause when playing, resume otherwise
    pub async fn toggle_play(&mut self) -> Result<()> {
        if self.state.current_track().is_none() {
            return Err(PlaybackError::NoTrackLoaded);
        }
        if self.state.is_playing() {
            self.backend.pause().await;
            self.state.set_playing(false);
        } else {
            self.backend.play().await?;
            self.state.set_playing(true);
        }
        Ok(())
    }

    /// Play the following track, wrapping to the first
    pub async fn next(&mut self) -> Result<Resolution> {
        let index = self.state.next_index().ok_or(PlaybackError::PlaylistEmpty)?;
        self.play_track(index).await
    }

    /// Play the preceding track, wrapping to the last
    pub async fn previous(&mut self) -> Result<Resolution> {
        let index = self
            .state
            .previous_index()
            .ok_or(PlaybackError::PlaylistEmpty)?;
        self.play_track(index).await
    }

    /// Seek to `percent` (0-100) of the current track. No-op while the
    /// duration is unknown.
    pub async fn seek_percent(&mut self, percent: f64) -> Result<()> {
        if self.state.current_track().is_none() {
            return Err(PlaybackError::NoTrackLoaded);
        }
        if let Some(seconds) = self.state.seek_percent(percent) {
            self.backend.seek(seconds).await?;
            self.publish();
        }
        Ok(())
    }

    pub fn set_volume(&mut self, volume: f64) {
        let volume = self.state.set_volume(volume);
        self.backend.set_volume(volume);
    }

    // ===== Backend events =====

    pub fn on_time_update(&mut self, seconds: f64) {
        self.state.set_current_time(seconds);
        self.publish();
    }

    pub fn on_duration(&mut self, seconds: f64) {
        self.state.set_duration(seconds);
    }

    /// Current track finished: advance
    pub async fn on_ended(&mut self) -> Result<Resolution> {
        self.next().await
    }

    // ===== Auto-save =====

    /// Start saving progress in the background (restarts if already running)
    pub fn start_autosave(&mut self) {
        self.stop_autosave();
        self.autosave = Some(self.tracker.spawn(self.snapshots.subscribe()));
        tracing::debug!(interval = ?self.tracker.interval(), "Auto-save started");
    }

    pub fn stop_autosave(&mut self) {
        if let Some(handle) = self.autosave.take() {
            handle.abort();
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(PlaybackSnapshot {
            user_id: self.session.as_ref().map(|u| u.id),
            track_id: self.state.current_track().map(|t| t.id),
            current_time: self.state.current_time(),
        });
    }
}

impl<B: MediaBackend> Drop for Player<B> {
    fn drop(&mut self) {
        self.stop_autosave();
    }
}
