/// Tracks API routes
use crate::{error::Result, extract::JsonBody, state::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use dharma_core::{CreateTrack, DeletedTrack, Track, TrackId, UpdateTrack};

/// GET /api/tracks
pub async fn list_tracks(State(app_state): State<AppState>) -> Result<Json<Vec<Track>>> {
    Ok(Json(app_state.gateway.list_tracks().await?))
}

/// POST /api/tracks
pub async fn create_track(
    State(app_state): State<AppState>,
    JsonBody(track): JsonBody<CreateTrack>,
) -> Result<(StatusCode, Json<Track>)> {
    let track = app_state.gateway.create_track(track).await?;
    tracing::info!(track = %track.id, title = %track.title, "Track created");
    Ok((StatusCode::CREATED, Json(track)))
}

/// PUT /api/tracks/:id
pub async fn update_track(
    Path(id): Path<i64>,
    State(app_state): State<AppState>,
    JsonBody(update): JsonBody<UpdateTrack>,
) -> Result<Json<Track>> {
    let track = app_state
        .gateway
        .update_track(TrackId::new(id), update)
        .await?;
    Ok(Json(track))
}

/// DELETE /api/tracks/:id
/// Removes the track and, best-effort, the uploaded files it referenced
pub async fn delete_track(
    Path(id): Path<i64>,
    State(app_state): State<AppState>,
) -> Result<Json<DeletedTrack>> {
    let track_id = TrackId::new(id);
    let deleted = app_state.gateway.delete_track(track_id).await?;

    app_state.file_storage.remove_for_url(&deleted.url).await;
    if let Some(thumbnail) = &deleted.thumbnail {
        app_state.file_storage.remove_for_url(thumbnail).await;
    }

    tracing::info!(track = %track_id, "Track deleted");
    Ok(Json(deleted))
}
