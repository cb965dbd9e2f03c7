use crate::engine::Rejection;
use crate::storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// The rules refused the request; nothing was written
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Every compare-and-commit attempt lost to a concurrent writer
    #[error("Gave up after {attempts} conflicting commit attempts")]
    RetryExhausted { attempts: u32 },

    /// Stored state that the rules could never have produced
    #[error("Session {session_id} has inconsistent state: {reason}")]
    Integrity { session_id: String, reason: String },

    #[error("Storage error: {0}")]
    Storage(StorageError),
}

impl CoordinatorError {
    pub fn integrity(session_id: &str, reason: impl Into<String>) -> Self {
        CoordinatorError::Integrity {
            session_id: session_id.to_string(),
            reason: reason.into(),
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            CoordinatorError::Rejected(r) => Some(r),
            _ => None,
        }
    }

    /// A lost commit race that a fresh read may resolve
    pub(crate) fn is_conflict(&self) -> bool {
        matches!(self, CoordinatorError::Storage(StorageError::Conflict(_)))
    }

    /// Whether the caller may reasonably submit the same request again
    pub fn is_retryable(&self) -> bool {
        self.is_conflict() || matches!(self, CoordinatorError::RetryExhausted { .. })
    }
}

/// Attach the session id when lifting storage errors
pub(crate) trait StorageResultExt<T> {
    fn in_session(self, session_id: &str) -> Result<T, CoordinatorError>;
}

impl<T> StorageResultExt<T> for Result<T, StorageError> {
    fn in_session(self, session_id: &str) -> Result<T, CoordinatorError> {
        self.map_err(|e| match e {
            StorageError::SessionNotFound(id) => CoordinatorError::SessionNotFound(id),
            StorageError::InvalidData(reason) => CoordinatorError::integrity(session_id, reason),
            StorageError::SerializationError { context, source } => {
                CoordinatorError::integrity(session_id, format!("{}: {}", context, source))
            }
            other => CoordinatorError::Storage(other),
        })
    }
}

pub type Result<T, E = CoordinatorError> = std::result::Result<T, E>;
