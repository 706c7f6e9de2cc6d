/// Google Drive download proxy
use crate::error::{Result, ServerError};
use crate::services::file_storage::{FileStorage, UPLOADS_URL_PREFIX};
use futures_util::StreamExt;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

const DOWNLOAD_FAILED: &str = "Failed to download file from Google Drive";
const TIMEOUT_MESSAGE: &str = "Timeout: file too large or slow connection";

/// A Drive file saved into the uploads directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub original_name: String,
    pub saved_name: String,
    pub size: u64,
    pub url: String,
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct DriveService {
    http: reqwest::Client,
    api_base: String,
}

impl DriveService {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServerError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch `file_id` with `api_key` and stream it into `storage` under a
    /// sanitized, collision-free version of `file_name`
    pub async fn download(
        &self,
        storage: &FileStorage,
        file_id: &str,
        file_name: &str,
        api_key: &str,
    ) -> Result<DriveFile> {
        if file_id.is_empty() || file_name.is_empty() || api_key.is_empty() {
            return Err(ServerError::BadRequest(
                "fileId, fileName and apiKey are required".to_string(),
            ));
        }
        if !file_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ServerError::BadRequest(format!("Invalid fileId: {file_id}")));
        }

        tracing::info!(file_id = %file_id, file_name = %file_name, "Downloading from Google Drive");

        let url = format!("{}/drive/v3/files/{}", self.api_base, file_id);
        let response = self
            .http
            .get(&url)
            .query(&[("alt", "media"), ("key", api_key)])
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let (saved_name, path, mut file) = storage.create_unique(file_name).await?;

        let mut size = 0u64;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let written = match chunk {
                Ok(bytes) => file.write_all(&bytes).await.map(|()| bytes.len() as u64),
                Err(e) => {
                    drop(file);
                    discard_partial(&path).await;
                    return Err(request_error(e));
                }
            };
            match written {
                Ok(n) => size += n,
                Err(e) => {
                    drop(file);
                    discard_partial(&path).await;
                    return Err(e.into());
                }
            }
        }
        file.flush().await?;

        tracing::info!(saved_as = %saved_name, size, "Drive file saved");

        Ok(DriveFile {
            original_name: file_name.to_string(),
            url: format!("{UPLOADS_URL_PREFIX}{saved_name}"),
            saved_name,
            size,
            path: path.display().to_string(),
        })
    }
}

async fn discard_partial(path: &std::path::Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove partial download");
    }
}

fn status_error(status: StatusCode) -> ServerError {
    let message = match status {
        StatusCode::FORBIDDEN => {
            "Permission error: check the API key or file access permissions".to_string()
        }
        StatusCode::NOT_FOUND => "File does not exist or is not accessible".to_string(),
        other => format!("Drive API error: {}", other.as_u16()),
    };

    ServerError::Upstream {
        message,
        details: format!("Drive API responded with status {status}"),
    }
}

fn request_error(err: reqwest::Error) -> ServerError {
    if err.is_timeout() {
        ServerError::Timeout {
            message: TIMEOUT_MESSAGE.to_string(),
            details: err.to_string(),
        }
    } else {
        ServerError::Upstream {
            message: DOWNLOAD_FAILED.to_string(),
            details: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages() {
        let message = |status| match status_error(status) {
            ServerError::Upstream { message, .. } => message,
            other => panic!("unexpected error: {other:?}"),
        };

        assert!(message(StatusCode::FORBIDDEN).contains("API key"));
        assert!(message(StatusCode::NOT_FOUND).contains("does not exist"));
        assert_eq!(message(StatusCode::INTERNAL_SERVER_ERROR), "Drive API error: 500");
    }

    #[tokio::test]
    async fn test_rejects_missing_fields() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(temp_dir.path().to_path_buf());
        let drive = DriveService::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();

        let err = drive.download(&storage, "", "a.mp3", "key").await.unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));

        let err = drive
            .download(&storage, "../etc", "a.mp3", "key")
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));
    }
}
