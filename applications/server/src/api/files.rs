/// Uploads directory API routes
use crate::{
    error::{Result, ServerError},
    services::file_storage::FileEntry,
    state::AppState,
};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_name: String,
    pub original_name: String,
    pub file_size: u64,
    pub file_type: String,
    pub file_url: String,
}

#[derive(Debug, Serialize)]
pub struct FileListResponse {
    pub files: Vec<FileEntry>,
}

/// POST /api/upload-file
/// Multipart form with a single `file` field
pub async fn upload_file(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>> {
    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ServerError::BadRequest("Missing Content-Type".to_string()))?;

    let boundary = multer::parse_boundary(content_type)
        .map_err(|_| ServerError::BadRequest("Expected multipart/form-data".to_string()))?;

    // Convert Bytes to a stream for multer
    let stream = futures_util::stream::once(async move { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Failed to parse multipart: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("upload").to_string();
        let file_type = field
            .content_type()
            .map(ToString::to_string)
            .unwrap_or_else(|| {
                mime_guess::from_path(&original_name)
                    .first_or_octet_stream()
                    .to_string()
            });
        let data = field
            .bytes()
            .await
            .map_err(|e| ServerError::BadRequest(format!("Failed to read file: {}", e)))?;

        let stored = app_state
            .file_storage
            .store_upload(&original_name, &data)
            .await?;
        tracing::info!(file = %original_name, saved_as = %stored.name, "File uploaded");

        return Ok(Json(UploadResponse {
            file_url: stored.url(),
            file_name: stored.name,
            original_name,
            file_size: stored.size,
            file_type,
        }));
    }

    Err(ServerError::BadRequest("No file uploaded".to_string()))
}

/// GET /api/uploaded-files
pub async fn list_files(State(app_state): State<AppState>) -> Result<Json<FileListResponse>> {
    let files = app_state.file_storage.list().await?;
    Ok(Json(FileListResponse { files }))
}

/// DELETE /api/delete-file/:file_name
pub async fn delete_file(
    Path(file_name): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<serde_json::Value>> {
    app_state.file_storage.delete(&file_name).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "File deleted",
    })))
}
