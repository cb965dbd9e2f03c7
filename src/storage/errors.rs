use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(rusqlite::Error),

    #[error("Migration {version} failed: {message}")]
    MigrationFailed { version: i32, message: String },

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// A compare-and-commit lost its race; re-read and try again
    #[error("Concurrent update conflict: {0}")]
    Conflict(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Serialization error ({context}): {source}")]
    SerializationError {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database path error: {0}")]
    DatabasePathError(String),
}

impl StorageError {
    pub fn migration_failed(version: i32, message: impl Into<String>) -> Self {
        StorageError::MigrationFailed {
            version,
            message: message.into(),
        }
    }

    pub fn session_not_found(session_id: impl Into<String>) -> Self {
        StorageError::SessionNotFound(session_id.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        StorageError::Conflict(message.into())
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        StorageError::InvalidData(message.into())
    }

    pub fn serialization_error(context: impl Into<String>, source: serde_json::Error) -> Self {
        StorageError::SerializationError {
            context: context.into(),
            source,
        }
    }

    pub fn database_path_error(message: impl Into<String>) -> Self {
        StorageError::DatabasePathError(message.into())
    }

    /// Whether retrying after a fresh read could succeed
    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::Conflict(_))
    }
}

// Uniqueness violations and lock contention are the store's way of telling us
// another writer got there first, so both surface as retryable conflicts.
impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, message) = &err {
            let detail = message.clone().unwrap_or_else(|| failure.to_string());
            match failure.code {
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => {
                    return StorageError::Conflict(detail);
                }
                ErrorCode::ConstraintViolation
                    if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                        || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
                {
                    return StorageError::Conflict(detail);
                }
                _ => {}
            }
        }
        StorageError::ConnectionFailed(err)
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
