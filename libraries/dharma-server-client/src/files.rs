//! Uploads directory and Drive proxy operations.

use crate::client::RemoteGateway;
use crate::error::{Result, ServerClientError};
use crate::types::{DriveDownloadRequest, DriveDownloadResponse, FileList, UploadedFile};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use std::path::Path;
use tracing::{debug, info};

impl RemoteGateway {
    /// Upload a local file into the server's uploads directory.
    pub async fn upload_file(&self, file_path: &Path) -> Result<UploadedFile> {
        if !tokio::fs::try_exists(file_path).await.unwrap_or(false) {
            return Err(ServerClientError::FileNotFound(
                file_path.display().to_string(),
            ));
        }

        let file_name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let contents = tokio::fs::read(file_path).await?;
        let mime = mime_guess::from_path(file_path).first_or_octet_stream();

        debug!(file = %file_path.display(), size = contents.len(), "Uploading file");

        let part = Part::bytes(contents)
            .file_name(file_name.clone())
            .mime_str(mime.essence_str())?;
        let form = Form::new().part("file", part);

        let request = self
            .request(Method::POST, "/api/upload-file")
            .await
            .multipart(form);
        let uploaded: UploadedFile = self.send_json(request).await?;

        info!(file = %file_name, saved_as = %uploaded.file_name, "File uploaded");
        Ok(uploaded)
    }

    /// Files currently in the uploads directory.
    pub async fn list_files(&self) -> Result<FileList> {
        let request = self.request(Method::GET, "/api/uploaded-files").await;
        self.send_json(request).await
    }

    /// Delete one uploaded file by name.
    pub async fn delete_file(&self, file_name: &str) -> Result<()> {
        let request = self
            .request(Method::DELETE, &format!("/api/delete-file/{file_name}"))
            .await;
        self.send(request).await?;
        Ok(())
    }

    /// Have the server fetch a Google Drive file into its uploads directory.
    pub async fn download_from_drive(
        &self,
        download: &DriveDownloadRequest,
    ) -> Result<DriveDownloadResponse> {
        let request = self
            .request(Method::POST, "/api/download-from-drive")
            .await
            .json(download);
        self.send_json(request).await
    }
}
