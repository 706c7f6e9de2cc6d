//! Persistence contract shared by every storage backend

use crate::error::Result;
use crate::types::{
    CreateTrack, DeletedTrack, Settings, Track, TrackId, UpdateSettings, UpdateTrack, UpdateUser,
    User, UserId, UserProgress,
};
use async_trait::async_trait;

/// CRUD access to users, tracks, settings and listening progress.
///
/// Implemented by the relational (`SQLite`) store, the local serialized blob
/// and the remote HTTP client. All implementations must produce the same
/// results and the same error kinds for the same inputs.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    // ========================================================================
    // Users
    // ========================================================================

    /// Check credentials; unknown email and wrong password both fail with
    /// `AuthFailed`
    async fn authenticate(&self, email: &str, password: &str) -> Result<User>;

    /// Create a non-admin account; fails with `Duplicate` if the email exists
    async fn register(&self, email: &str, password: &str) -> Result<User>;

    /// Get all users
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Update a user
    async fn update_user(&self, id: UserId, update: UpdateUser) -> Result<User>;

    /// Delete a user
    async fn delete_user(&self, id: UserId) -> Result<()>;

    // ========================================================================
    // Tracks
    // ========================================================================

    /// Get all tracks, newest first
    async fn list_tracks(&self) -> Result<Vec<Track>>;

    /// Create a new track
    async fn create_track(&self, track: CreateTrack) -> Result<Track>;

    /// Update a track
    async fn update_track(&self, id: TrackId, update: UpdateTrack) -> Result<Track>;

    /// Delete a track, returning the file references it pointed at
    async fn delete_track(&self, id: TrackId) -> Result<DeletedTrack>;

    // ========================================================================
    // Settings
    // ========================================================================

    /// Get the application settings (defaults if never written)
    async fn get_settings(&self) -> Result<Settings>;

    /// Apply a partial settings update
    async fn update_settings(&self, update: UpdateSettings) -> Result<Settings>;

    // ========================================================================
    // Progress
    // ========================================================================

    /// Upsert the playback offset for (user, track)
    async fn save_progress(&self, user_id: UserId, track_id: TrackId, seconds: f64)
        -> Result<()>;

    /// Last saved offset, 0 when nothing was saved
    async fn get_progress(&self, user_id: UserId, track_id: TrackId) -> Result<f64>;

    /// All saved offsets for a user
    async fn get_user_progress(&self, user_id: UserId) -> Result<UserProgress>;
}
