/// Settings API routes
use crate::{error::Result, extract::JsonBody, state::AppState};
use axum::{extract::State, Json};
use dharma_core::{Settings, UpdateSettings};

/// GET /api/settings
pub async fn get_settings(State(app_state): State<AppState>) -> Result<Json<Settings>> {
    Ok(Json(app_state.gateway.get_settings().await?))
}

/// PUT /api/settings
pub async fn update_settings(
    State(app_state): State<AppState>,
    JsonBody(update): JsonBody<UpdateSettings>,
) -> Result<Json<Settings>> {
    Ok(Json(app_state.gateway.update_settings(update).await?))
}
