//! Types for Dharma Player server API requests and responses.

use dharma_core::User;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for connecting to a Dharma Player server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Base URL of the server (e.g., "http://localhost:3000")
    pub url: String,
    /// Current access token (if authenticated)
    pub access_token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ServerConfig {
    /// Create a new server config with just the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            access_token: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Create a config with an existing access token.
    pub fn with_token(url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            ..Self::new(url)
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct CredentialsRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response from the authenticate endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
}

/// `{"error": ...}` body of every failed response.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
    #[serde(default)]
    pub details: Option<String>,
}

// =============================================================================
// Files
// =============================================================================

/// Result of uploading a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub file_name: String,
    pub original_name: String,
    pub file_size: u64,
    pub file_type: String,
    pub file_url: String,
}

/// One file in the uploads directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub name: String,
    pub size: u64,
    pub url: String,
    pub uploaded_at: String,
}

/// Listing of the uploads directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileList {
    pub files: Vec<StoredFile>,
}

// =============================================================================
// Drive proxy
// =============================================================================

/// Ask the server to fetch a Google Drive file into its uploads directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveDownloadRequest {
    pub file_id: String,
    pub file_name: String,
    pub api_key: String,
}

/// File saved by the Drive proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub original_name: String,
    pub saved_name: String,
    pub size: u64,
    pub url: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveDownloadResponse {
    pub success: bool,
    pub message: String,
    pub file: DriveFile,
}

// =============================================================================
// Health
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub timestamp: String,
    pub version: String,
}
