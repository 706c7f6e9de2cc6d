/// Google Drive proxy API routes
use crate::{error::Result, extract::JsonBody, services::drive::DriveFile, state::AppState};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveDownloadRequest {
    #[serde(default)]
    pub file_id: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct DriveDownloadResponse {
    pub success: bool,
    pub message: String,
    pub file: DriveFile,
}

/// POST /api/download-from-drive
pub async fn download_from_drive(
    State(app_state): State<AppState>,
    JsonBody(request): JsonBody<DriveDownloadRequest>,
) -> Result<Json<DriveDownloadResponse>> {
    let file = app_state
        .drive
        .download(
            &app_state.file_storage,
            &request.file_id,
            &request.file_name,
            &request.api_key,
        )
        .await?;

    Ok(Json(DriveDownloadResponse {
        success: true,
        message: "File downloaded and saved".to_string(),
        file,
    }))
}
