use crate::cli::validation::ValidationError;
use crate::coordinator::CoordinatorError;
use crate::engine::Rejection;
use crate::storage::StorageError;
use std::fmt;

/// Unified error type for CLI operations with user-friendly messages
#[derive(Debug)]
pub enum CliError {
    Coordinator(CoordinatorError),
    Validation(ValidationError),
    /// Configuration error
    Configuration {
        setting: String,
        issue: String,
        suggestion: String,
    },
    /// User-friendly error with custom message
    UserError {
        message: String,
        suggestion: Option<String>,
    },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Coordinator(e) => write_with_suggestion(f, &e.to_string(), coordinator_suggestion(e)),
            CliError::Validation(e) => write_with_suggestion(f, &e.to_string(), validation_suggestion(e)),
            CliError::Configuration {
                setting,
                issue,
                suggestion,
            } => {
                write!(
                    f,
                    "⚙️  Configuration Error: {}\n   Issue: {}\n   💡 Suggestion: {}",
                    setting, issue, suggestion
                )
            }
            CliError::UserError {
                message,
                suggestion,
            } => write_with_suggestion(f, message, suggestion.as_deref()),
        }
    }
}

fn write_with_suggestion(f: &mut fmt::Formatter<'_>, message: &str, suggestion: Option<&str>) -> fmt::Result {
    match suggestion {
        Some(suggestion) => write!(f, "❌ {}\n   💡 Suggestion: {}", message, suggestion),
        None => write!(f, "❌ {}", message),
    }
}

impl std::error::Error for CliError {}

impl From<CoordinatorError> for CliError {
    fn from(err: CoordinatorError) -> Self {
        CliError::Coordinator(err)
    }
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        CliError::Validation(err)
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::UserError {
            message: format!("{:#}", err),
            suggestion: Some("Check the error details above and try again.".to_string()),
        }
    }
}

fn rejection_suggestion(rejection: &Rejection) -> Option<&'static str> {
    match rejection {
        Rejection::NotYourTurn { .. } => Some("Wait for the other player, then use 'gamehall show' to see the board."),
        Rejection::ColumnFull { .. } | Rejection::ColumnOutOfRange { .. } => {
            Some("Pick a column from 0 to 6 that still has room.")
        }
        Rejection::NotAPlayer => Some("Join the session first with 'gamehall join <session> --user <you>'."),
        Rejection::NotEnoughPlayers { .. } => {
            Some("Wait for an opponent to run 'gamehall join <session> --user <id>'.")
        }
        Rejection::SessionNotWaiting { .. } | Rejection::RosterFull { .. } => {
            Some("Create a new session with 'gamehall create <game> --user <you>'.")
        }
        Rejection::WrongGameType { .. } => {
            Some("Use 'drop' for Connect Four sessions and 'guess' for word sessions.")
        }
        _ => None,
    }
}

fn coordinator_suggestion(error: &CoordinatorError) -> Option<&'static str> {
    match error {
        CoordinatorError::Rejected(rejection) => rejection_suggestion(rejection),
        CoordinatorError::SessionNotFound(_) => Some("Use 'gamehall sessions' to see available sessions."),
        CoordinatorError::RetryExhausted { .. } => {
            Some("The session is busy with other moves. Check the board and try again.")
        }
        CoordinatorError::Integrity { .. } => {
            Some("The stored session is inconsistent and cannot be played further.")
        }
        CoordinatorError::Storage(StorageError::ConnectionFailed(_)) => Some(
            "Check file permissions and disk space. The database may be locked by another process.",
        ),
        CoordinatorError::Storage(_) => None,
    }
}

fn validation_suggestion(error: &ValidationError) -> Option<&'static str> {
    match error {
        ValidationError::UnknownGame(_) => Some("Use 'gamehall games' to list playable games."),
        ValidationError::NoActiveSessions => Some("Create one with 'gamehall create <game> --user <you>'."),
        ValidationError::SessionNotFound(_) | ValidationError::AmbiguousSessionId(..) => {
            Some("Use 'gamehall sessions' to see session IDs.")
        }
        ValidationError::InvalidStatus(_) => Some("Use 'waiting', 'in_progress' or 'completed'."),
        _ => None,
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Display an error without exiting
pub fn display_error(error: &CliError) {
    eprintln!("\n{}", error);
}

/// Check if an error is recoverable (user can retry)
pub fn is_recoverable_error(error: &CliError) -> bool {
    match error {
        CliError::Coordinator(e) => e.is_retryable() || e.rejection().is_some(),
        CliError::Validation(ValidationError::Database(_)) => false,
        CliError::Validation(_) => true,
        CliError::Configuration { .. } => false,
        CliError::UserError { .. } => false,
    }
}
