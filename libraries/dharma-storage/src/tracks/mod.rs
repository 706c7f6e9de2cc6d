//! Track queries

use crate::error::{Result, StorageError};
use dharma_core::types::{
    format_timestamp, now_millis, CreateTrack, DeletedTrack, Track, TrackId, UpdateTrack,
};
use sqlx::{FromRow, SqlitePool};

const SELECT_TRACK: &str = "SELECT id, title, artist, url, alternative_urls, thumbnail, duration,
        file_size, file_type, created_at
     FROM tracks";

#[derive(Debug, FromRow)]
struct TrackRow {
    id: i64,
    title: String,
    artist: Option<String>,
    url: String,
    alternative_urls: String,
    thumbnail: Option<String>,
    duration: f64,
    file_size: Option<i64>,
    file_type: Option<String>,
    created_at: i64,
}

impl TryFrom<TrackRow> for Track {
    type Error = StorageError;

    fn try_from(row: TrackRow) -> Result<Self> {
        Ok(Track {
            id: TrackId::new(row.id),
            title: row.title,
            artist: row.artist,
            url: row.url,
            alternative_urls: serde_json::from_str(&row.alternative_urls)?,
            thumbnail: row.thumbnail,
            duration: row.duration,
            file_size: row.file_size,
            file_type: row.file_type,
            created_at: format_timestamp(row.created_at),
        })
    }
}

/// Get all tracks, newest first
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Track>> {
    let rows = sqlx::query_as::<_, TrackRow>(&format!(
        "{SELECT_TRACK} ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Track::try_from).collect()
}

/// Get track by ID
pub async fn get_by_id(pool: &SqlitePool, id: TrackId) -> Result<Option<Track>> {
    let row = sqlx::query_as::<_, TrackRow>(&format!("{SELECT_TRACK} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.map(Track::try_from).transpose()
}

/// Create a new track
pub async fn create(pool: &SqlitePool, track: CreateTrack) -> Result<Track> {
    let now = now_millis();
    let alternative_urls = serde_json::to_string(&track.alternative_urls)?;

    let result = sqlx::query(
        "INSERT INTO tracks
            (title, artist, url, alternative_urls, thumbnail, duration, file_size, file_type, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&track.title)
    .bind(&track.artist)
    .bind(&track.url)
    .bind(&alternative_urls)
    .bind(&track.thumbnail)
    .bind(track.duration)
    .bind(track.file_size)
    .bind(&track.file_type)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(track.into_track(TrackId::new(result.last_insert_rowid()), format_timestamp(now)))
}

/// Partially update a track (only provided fields)
pub async fn update(pool: &SqlitePool, id: TrackId, update: UpdateTrack) -> Result<Track> {
    let mut track = get_by_id(pool, id)
        .await?
        .ok_or_else(|| StorageError::not_found("Track", id))?;

    track.apply(update);
    let alternative_urls = serde_json::to_string(&track.alternative_urls)?;

    sqlx::query(
        "UPDATE tracks SET
            title = ?, artist = ?, url = ?, alternative_urls = ?, thumbnail = ?,
            duration = ?, file_size = ?, file_type = ?
         WHERE id = ?",
    )
    .bind(&track.title)
    .bind(&track.artist)
    .bind(&track.url)
    .bind(&alternative_urls)
    .bind(&track.thumbnail)
    .bind(track.duration)
    .bind(track.file_size)
    .bind(&track.file_type)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(track)
}

/// Delete a track, returning its file references
pub async fn delete(pool: &SqlitePool, id: TrackId) -> Result<DeletedTrack> {
    let track = get_by_id(pool, id)
        .await?
        .ok_or_else(|| StorageError::not_found("Track", id))?;

    sqlx::query("DELETE FROM tracks WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(DeletedTrack {
        url: track.url,
        thumbnail: track.thumbnail,
    })
}
