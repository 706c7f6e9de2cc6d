/// Server error types
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dharma_core::DharmaError;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A remote service (Google Drive) failed
    #[error("Upstream error: {message}")]
    Upstream { message: String, details: String },

    /// A remote service did not answer in time
    #[error("Upstream timeout: {message}")]
    Timeout { message: String, details: String },

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(#[source] DharmaError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl From<DharmaError> for ServerError {
    fn from(err: DharmaError) -> Self {
        match err {
            DharmaError::NotFound { .. } => ServerError::NotFound(err.to_string()),
            DharmaError::Duplicate(msg) => ServerError::Conflict(msg),
            DharmaError::InvalidInput(msg) => ServerError::BadRequest(msg),
            DharmaError::AuthFailed(msg) => ServerError::Auth(msg),
            DharmaError::PermissionDenied(msg) => ServerError::Forbidden(msg),
            DharmaError::Upstream(msg) | DharmaError::Network(msg) => ServerError::Upstream {
                message: "Upstream service failed".to_string(),
                details: msg,
            },
            DharmaError::Timeout(msg) => ServerError::Timeout {
                message: "Upstream service timed out".to_string(),
                details: msg,
            },
            other => ServerError::Storage(other),
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_message, details) = match self {
            ServerError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ServerError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ServerError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            ServerError::Upstream { message, details } => {
                tracing::warn!("Upstream error: {} ({})", message, details);
                (StatusCode::BAD_GATEWAY, message, Some(details))
            }
            ServerError::Timeout { message, details } => {
                tracing::warn!("Upstream timeout: {} ({})", message, details);
                (StatusCode::GATEWAY_TIMEOUT, message, Some(details))
            }
            ServerError::Storage(ref e) => {
                tracing::error!("Storage error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage error".to_string(),
                    None,
                )
            }
            ServerError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                    None,
                )
            }
            ServerError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            ServerError::Io(ref e) => {
                tracing::error!("IO error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "IO error".to_string(), None)
            }
            ServerError::Jwt(ref e) => {
                tracing::debug!("JWT error: {:?}", e);
                (StatusCode::UNAUTHORIZED, "Invalid token".to_string(), None)
            }
        };

        let body = match details {
            Some(details) => json!({ "error": error_message, "details": details }),
            None => json!({ "error": error_message }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: DharmaError) -> StatusCode {
        ServerError::from(err).into_response().status()
    }

    #[test]
    fn gateway_errors_map_to_status_codes() {
        assert_eq!(
            status_of(DharmaError::invalid_input("x")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DharmaError::bad_credentials()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(DharmaError::PermissionDenied("x".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(DharmaError::not_found("Track", 1)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(DharmaError::Duplicate("x".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DharmaError::Upstream("x".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(DharmaError::Timeout("x".into())),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_of(DharmaError::Database("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
