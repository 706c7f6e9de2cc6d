/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violated
    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Password hashing failed
    #[error("Credential error: {0}")]
    Credentials(#[from] bcrypt::BcryptError),

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<StorageError> for dharma_core::DharmaError {
    fn from(err: StorageError) -> Self {
        use dharma_core::DharmaError;
        match err {
            StorageError::NotFound { entity, id } => DharmaError::NotFound { entity, id },
            StorageError::Duplicate(msg) => DharmaError::Duplicate(msg),
            StorageError::Database(e) => DharmaError::Database(e.to_string()),
            StorageError::Io(e) => DharmaError::Io(e),
            other => DharmaError::storage(other.to_string()),
        }
    }
}

/// Whether a database error is a UNIQUE constraint violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
