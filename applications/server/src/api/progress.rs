/// Listening progress API routes
use crate::{error::Result, extract::JsonBody, state::AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use dharma_core::{types::ProgressResponse, TrackId, UserId, UserProgress};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveProgressRequest {
    pub user_id: UserId,
    pub track_id: TrackId,
    pub current_time: f64,
}

/// POST /api/progress
pub async fn save_progress(
    State(app_state): State<AppState>,
    JsonBody(request): JsonBody<SaveProgressRequest>,
) -> Result<Json<serde_json::Value>> {
    app_state
        .gateway
        .save_progress(request.user_id, request.track_id, request.current_time)
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// GET /api/progress/:user_id/:track_id
pub async fn get_progress(
    Path((user_id, track_id)): Path<(i64, i64)>,
    State(app_state): State<AppState>,
) -> Result<Json<ProgressResponse>> {
    let current_time = app_state
        .gateway
        .get_progress(UserId::new(user_id), TrackId::new(track_id))
        .await?;
    Ok(Json(ProgressResponse { current_time }))
}

/// GET /api/progress/:user_id
pub async fn get_user_progress(
    Path(user_id): Path<i64>,
    State(app_state): State<AppState>,
) -> Result<Json<UserProgress>> {
    Ok(Json(
        app_state
            .gateway
            .get_user_progress(UserId::new(user_id))
            .await?,
    ))
}
