/// Core error types for Dharma Player
use thiserror::Error;

/// Result type alias using `DharmaError`
pub type Result<T> = std::result::Result<T, DharmaError>;

/// Core error type shared by every persistence backend
#[derive(Error, Debug)]
pub enum DharmaError {
    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violated (e.g. an email already registered)
    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Wrong credentials or missing/invalid token
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// Authenticated but not allowed
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A remote service answered with an error
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Network failure reaching a remote service
    #[error("Network error: {0}")]
    Network(String),

    /// Request to a remote service timed out
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Database errors (for storage implementations)
    #[error("Database error: {0}")]
    Database(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl DharmaError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// The error returned for any failed login.
    ///
    /// Unknown email and wrong password share one message.
    pub fn bad_credentials() -> Self {
        Self::AuthFailed("Invalid email or password".to_string())
    }

    /// Whether this is a `NotFound` error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for DharmaError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}
