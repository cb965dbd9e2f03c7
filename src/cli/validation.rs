use crate::engine::{GameKind, COLS, WORD_LENGTH};
use crate::storage::{Database, SessionStatus, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Unknown game: {0}")]
    UnknownGame(String),

    #[error("Invalid column {0}: columns run from 0 to {max}", max = COLS - 1)]
    InvalidColumn(usize),

    #[error("Invalid guess '{0}': guesses are {len} letters", len = WORD_LENGTH)]
    InvalidGuess(String),

    #[error("Invalid user id: {0}")]
    InvalidUser(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Invalid session ID: {0}")]
    InvalidSessionId(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Multiple sessions found matching '{0}': {1}")]
    AmbiguousSessionId(String, String),

    #[error("No active sessions found")]
    NoActiveSessions,

    #[error("Database error: {0}")]
    Database(#[from] StorageError),
}

pub type ValidationResult<T> = Result<T, ValidationError>;

pub fn validate_game_kind(input: &str) -> ValidationResult<GameKind> {
    input
        .trim()
        .parse::<GameKind>()
        .map_err(|_| ValidationError::UnknownGame(input.trim().to_string()))
}

/// Catch obviously bad columns before touching the database
pub fn validate_column(column: usize) -> ValidationResult<usize> {
    if column >= COLS {
        return Err(ValidationError::InvalidColumn(column));
    }
    Ok(column)
}

pub fn validate_guess(word: &str) -> ValidationResult<String> {
    let trimmed = word.trim();
    if trimmed.chars().count() != WORD_LENGTH || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidGuess(trimmed.to_string()));
    }
    Ok(trimmed.to_lowercase())
}

pub fn validate_user_id(user: &str) -> ValidationResult<String> {
    let trimmed = user.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidUser("user id cannot be empty".to_string()));
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidUser(format!(
            "'{trimmed}' contains whitespace"
        )));
    }
    Ok(trimmed.to_string())
}

pub fn validate_status(input: &str) -> ValidationResult<SessionStatus> {
    input
        .trim()
        .parse::<SessionStatus>()
        .map_err(ValidationError::InvalidStatus)
}

/// Turns user-typed session ids into full ids
pub struct SessionResolver<'a> {
    database: &'a Database,
}

impl<'a> SessionResolver<'a> {
    pub fn new(database: &'a Database) -> Self {
        Self { database }
    }

    /// Resolve a full id or a unique prefix of an active session id.
    ///
    /// Full ids resolve whatever the session's status, so completed
    /// sessions can still be shown.
    pub fn resolve(&self, input_id: &str) -> ValidationResult<String> {
        let trimmed = input_id.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::InvalidSessionId(
                "Session ID cannot be empty".to_string(),
            ));
        }

        match self.database.get_session(trimmed) {
            Ok(session) => return Ok(session.id),
            Err(StorageError::SessionNotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        let input_lower = trimmed.to_lowercase();
        let matches: Vec<String> = self
            .database
            .get_active_sessions()?
            .into_iter()
            .map(|s| s.id)
            .filter(|id| id.to_lowercase().starts_with(&input_lower))
            .collect();

        match matches.as_slice() {
            [] => Err(ValidationError::SessionNotFound(format!(
                "No session found matching '{trimmed}'. Use 'gamehall sessions' to see active sessions"
            ))),
            [only] => Ok(only.clone()),
            _ => Err(ValidationError::AmbiguousSessionId(
                trimmed.to_string(),
                format!("Please be more specific. Matching sessions: {}", matches.join(", ")),
            )),
        }
    }

    /// The active session updated most recently
    pub fn most_recent(&self) -> ValidationResult<String> {
        self.database
            .get_active_sessions()?
            .into_iter()
            .max_by_key(|s| (s.updated_at, s.revision))
            .map(|s| s.id)
            .ok_or(ValidationError::NoActiveSessions)
    }

    pub fn resolve_or_recent(&self, input_id: Option<&str>) -> ValidationResult<String> {
        match input_id {
            Some(id) => self.resolve(id),
            None => self.most_recent(),
        }
    }
}
