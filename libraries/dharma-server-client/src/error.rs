//! Error types for the server client.

use dharma_core::DharmaError;
use thiserror::Error;

/// Errors that can occur when talking to a Dharma Player server.
#[derive(Error, Debug)]
pub enum ServerClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// File not found for upload
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// IO error during upload
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for server client operations.
pub type Result<T> = std::result::Result<T, ServerClientError>;

impl From<ServerClientError> for DharmaError {
    fn from(err: ServerClientError) -> Self {
        match err {
            ServerClientError::ServerError { status, message } => match status {
                400 => DharmaError::InvalidInput(message),
                401 => DharmaError::AuthFailed(message),
                403 => DharmaError::PermissionDenied(message),
                404 => DharmaError::NotFound {
                    entity: "Resource".to_string(),
                    id: message,
                },
                409 => DharmaError::Duplicate(message),
                _ => DharmaError::Upstream(format!("Server error ({status}): {message}")),
            },
            ServerClientError::Request(e) if e.is_timeout() => DharmaError::Timeout(e.to_string()),
            ServerClientError::Request(e) if e.is_connect() => DharmaError::Network(e.to_string()),
            ServerClientError::Request(e) => DharmaError::Upstream(e.to_string()),
            ServerClientError::InvalidUrl(msg) => DharmaError::InvalidInput(msg),
            ServerClientError::ParseError(msg) => DharmaError::Upstream(msg),
            ServerClientError::FileNotFound(path) => DharmaError::not_found("File", path),
            ServerClientError::Io(e) => DharmaError::Io(e),
        }
    }
}
