//! Listening progress per (user, track)

use crate::error::Result;
use dharma_core::types::{now_millis, TrackId, UserId, UserProgress};
use sqlx::SqlitePool;

/// Create or replace the saved position
pub async fn upsert(
    pool: &SqlitePool,
    user_id: UserId,
    track_id: TrackId,
    seconds: f64,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO progress (user_id, track_id, position_seconds, updated_at)
         VALUES (?, ?, ?, ?)
         ON CONFLICT(user_id, track_id) DO UPDATE SET
            position_seconds = excluded.position_seconds,
            updated_at = excluded.updated_at",
    )
    .bind(user_id)
    .bind(track_id)
    .bind(seconds)
    .bind(now_millis())
    .execute(pool)
    .await?;

    Ok(())
}

/// Get the saved position, if any
pub async fn get(pool: &SqlitePool, user_id: UserId, track_id: TrackId) -> Result<Option<f64>> {
    let position = sqlx::query_scalar::<_, f64>(
        "SELECT position_seconds FROM progress WHERE user_id = ? AND track_id = ?",
    )
    .bind(user_id)
    .bind(track_id)
    .fetch_optional(pool)
    .await?;

    Ok(position)
}

/// Get all saved positions for a user
pub async fn get_for_user(pool: &SqlitePool, user_id: UserId) -> Result<UserProgress> {
    let rows = sqlx::query_as::<_, (TrackId, f64)>(
        "SELECT track_id, position_seconds FROM progress WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().collect())
}
