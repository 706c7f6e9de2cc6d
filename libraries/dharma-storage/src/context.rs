use crate::{credentials, progress, settings, tracks, users};
use async_trait::async_trait;
use dharma_core::{
    error::{DharmaError, Result},
    gateway::PersistenceGateway,
    types::*,
};
use sqlx::SqlitePool;

/// Persistence gateway backed by `SQLite`
#[derive(Debug, Clone)]
pub struct SqliteGateway {
    pool: SqlitePool,
}

impl SqliteGateway {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) a database and apply migrations
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = crate::create_pool(database_url).await?;
        crate::run_migrations(&pool)
            .await
            .map_err(|e| DharmaError::Database(e.to_string()))?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl PersistenceGateway for SqliteGateway {
    // Users
    async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        validate_credentials(email, password)?;

        let (user, hash) = users::find_by_email(&self.pool, email)
            .await?
            .ok_or_else(DharmaError::bad_credentials)?;

        if !credentials::verify_password(password, &hash)? {
            return Err(DharmaError::bad_credentials());
        }
        Ok(user)
    }

    async fn register(&self, email: &str, password: &str) -> Result<User> {
        validate_credentials(email, password)?;
        let hash = credentials::hash_password(password)?;
        Ok(users::insert(&self.pool, email, &hash, false).await?)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(users::get_all(&self.pool).await?)
    }

    async fn update_user(&self, id: UserId, update: UpdateUser) -> Result<User> {
        update.validate()?;
        let hash = update
            .password
            .as_deref()
            .map(credentials::hash_password)
            .transpose()?;

        Ok(users::update(
            &self.pool,
            id,
            update.email.as_deref(),
            hash.as_deref(),
            update.is_admin,
        )
        .await?)
    }

    async fn delete_user(&self, id: UserId) -> Result<()> {
        if users::delete(&self.pool, id).await? {
            Ok(())
        } else {
            Err(DharmaError::not_found("User", id))
        }
    }

    // Tracks
    async fn list_tracks(&self) -> Result<Vec<Track>> {
        Ok(tracks::get_all(&self.pool).await?)
    }

    async fn create_track(&self, track: CreateTrack) -> Result<Track> {
        track.validate()?;
        Ok(tracks::create(&self.pool, track).await?)
    }

    async fn update_track(&self, id: TrackId, update: UpdateTrack) -> Result<Track> {
        update.validate()?;
        Ok(tracks::update(&self.pool, id, update).await?)
    }

    async fn delete_track(&self, id: TrackId) -> Result<DeletedTrack> {
        Ok(tracks::delete(&self.pool, id).await?)
    }

    // Settings
    async fn get_settings(&self) -> Result<Settings> {
        Ok(settings::get(&self.pool).await?)
    }

    async fn update_settings(&self, update: UpdateSettings) -> Result<Settings> {
        Ok(settings::update(&self.pool, update).await?)
    }

    // Progress
    async fn save_progress(&self, user_id: UserId, track_id: TrackId, seconds: f64) -> Result<()> {
        validate_position(seconds)?;
        Ok(progress::upsert(&self.pool, user_id, track_id, seconds).await?)
    }

    async fn get_progress(&self, user_id: UserId, track_id: TrackId) -> Result<f64> {
        Ok(progress::get(&self.pool, user_id, track_id)
            .await?
            .unwrap_or(0.0))
    }

    async fn get_user_progress(&self, user_id: UserId) -> Result<UserProgress> {
        Ok(progress::get_for_user(&self.pool, user_id).await?)
    }
}
