/// File storage service - manages the uploads directory on disk
use crate::error::{Result, ServerError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// URL prefix the uploads directory is served under
pub const UPLOADS_URL_PREFIX: &str = "/uploads/";

const LOCAL_SCHEME: &str = "local://";

#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

/// A file written into the uploads directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
}

impl StoredFile {
    pub fn url(&self) -> String {
        format!("{UPLOADS_URL_PREFIX}{}", self.name)
    }
}

/// Listing entry for `GET /api/uploaded-files`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
    pub url: String,
    pub uploaded_at: String,
}

/// Replace every character outside `[A-Za-z0-9.-]` with `_`
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Stored name for an upload: `<base with non-alphanumerics as _>_<millis><ext>`
pub fn upload_file_name(original_name: &str, millis: i64) -> String {
    let original = Path::new(original_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(original_name);
    let (base, ext) = split_extension(original);

    let safe_base: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    format!("{safe_base}_{millis}{}", sanitize_file_name(ext))
}

/// Split `name` into base and extension (with its dot); dotfiles have no
/// extension
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(i) => name.split_at(i),
    }
}

/// Names that could escape the uploads directory
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0')
}

impl FileStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Create the uploads directory
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.base_path).await?;
        Ok(())
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Store an uploaded file under a timestamped safe name
    pub async fn store_upload(&self, original_name: &str, data: &[u8]) -> Result<StoredFile> {
        self.store_upload_at(original_name, data, Utc::now().timestamp_millis())
            .await
    }

    /// Store an upload stamped with `millis`. Two uploads with the same
    /// name and stamp never share a file.
    pub async fn store_upload_at(
        &self,
        original_name: &str,
        data: &[u8],
        millis: i64,
    ) -> Result<StoredFile> {
        let (name, path, mut file) = self
            .create_unique(&upload_file_name(original_name, millis))
            .await?;

        file.write_all(data).await?;
        file.flush().await?;
        tracing::debug!(file = %name, size = data.len(), "Stored upload");

        Ok(StoredFile {
            name,
            path,
            size: data.len() as u64,
        })
    }

    /// Create a new empty file for `file_name` (sanitized). On collision a
    /// `_1`, `_2`, ... suffix is added before the extension.
    pub async fn create_unique(&self, file_name: &str) -> Result<(String, PathBuf, fs::File)> {
        let safe = sanitize_file_name(file_name);
        let (base, ext) = split_extension(&safe);

        let mut candidate = safe.clone();
        let mut counter = 1;
        loop {
            let path = self.base_path.join(&candidate);
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((candidate, path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    candidate = format!("{base}_{counter}{ext}");
                    counter += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// All files in the uploads directory, by name
    pub async fn list(&self) -> Result<Vec<FileEntry>> {
        let mut entries = fs::read_dir(&self.base_path).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };

            let uploaded_at = metadata
                .modified()
                .map(|t| DateTime::<Utc>::from(t).to_rfc3339_opts(SecondsFormat::Millis, true))
                .unwrap_or_default();

            files.push(FileEntry {
                url: format!("{UPLOADS_URL_PREFIX}{name}"),
                name,
                size: metadata.len(),
                uploaded_at,
            });
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Delete one file by name
    pub async fn delete(&self, file_name: &str) -> Result<()> {
        if !is_plain_file_name(file_name) {
            return Err(ServerError::BadRequest(format!(
                "Invalid file name: {file_name}"
            )));
        }

        let path = self.base_path.join(file_name);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(ServerError::NotFound(format!("File not found: {file_name}")));
        }
        self.validate_path(&path)?;

        fs::remove_file(&path).await?;
        tracing::info!(file = %file_name, "Deleted uploaded file");
        Ok(())
    }

    /// Remove the uploaded file a track URL points at, if it is one of ours.
    ///
    /// Best-effort: failures are logged, never returned.
    pub async fn remove_for_url(&self, url: &str) {
        let Some(name) = uploaded_file_name(url) else {
            return;
        };

        match self.delete(name).await {
            Ok(()) | Err(ServerError::NotFound(_)) => {}
            Err(e) => tracing::warn!(url = %url, error = %e, "Failed to remove track file"),
        }
    }

    /// Validate that a path is within the storage directory (prevent directory traversal)
    pub fn validate_path(&self, path: &Path) -> Result<()> {
        let canonical_base = self
            .base_path
            .canonicalize()
            .map_err(|e| ServerError::Internal(format!("Invalid base path: {}", e)))?;

        let canonical_path = path
            .canonicalize()
            .map_err(|e| ServerError::BadRequest(format!("Invalid path: {}", e)))?;

        if !canonical_path.starts_with(&canonical_base) {
            return Err(ServerError::Forbidden(
                "Path traversal attempt detected".to_string(),
            ));
        }

        Ok(())
    }
}

/// File name behind `/uploads/<name>` or `local://<name>`
pub fn uploaded_file_name(url: &str) -> Option<&str> {
    url.strip_prefix(UPLOADS_URL_PREFIX)
        .or_else(|| url.strip_prefix(LOCAL_SCHEME))
        .filter(|name| is_plain_file_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("Kinh Pháp Cú.mp3"), "Kinh_Ph_p_C_.mp3");
        assert_eq!(sanitize_file_name("a-b.c"), "a-b.c");
        assert_eq!(sanitize_file_name("../etc/passwd"), ".._etc_passwd");
    }

    #[test]
    fn test_upload_file_name() {
        assert_eq!(
            upload_file_name("Bài giảng 1.mp3", 1_700_000_000_000),
            "B_i_gi_ng_1_1700000000000.mp3"
        );
        assert_eq!(upload_file_name("noext", 5), "noext_5");
        assert_eq!(upload_file_name(".hidden", 5), "_hidden_5");
        assert_eq!(upload_file_name("dir/evil.mp3", 5), "evil_5.mp3");
    }

    #[test]
    fn test_uploaded_file_name() {
        assert_eq!(uploaded_file_name("/uploads/a.mp3"), Some("a.mp3"));
        assert_eq!(uploaded_file_name("local://a.mp3"), Some("a.mp3"));
        assert_eq!(uploaded_file_name("https://cdn/a.mp3"), None);
        assert_eq!(uploaded_file_name("/uploads/../secret"), None);
    }

    #[tokio::test]
    async fn test_store_and_list() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(temp_dir.path().join("uploads"));
        storage.initialize().await.unwrap();

        let stored = storage.store_upload("chant.mp3", b"fake audio").await.unwrap();
        assert!(stored.path.exists());
        assert!(stored.url().starts_with("/uploads/chant_"));

        let files = storage.list().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, stored.name);
        assert_eq!(files[0].size, 10);
    }
}
