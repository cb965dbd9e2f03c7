use super::kind::GameKind;
use crate::storage::models::SessionStatus;
use serde::Serialize;
use thiserror::Error;

/// A move, join or lifecycle request that the rules refuse.
///
/// Rejections are computed without side effects, so a caller may change the
/// request and try again without risking a duplicate application.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    #[error("Not your turn: player {current} is to move")]
    NotYourTurn { current: u8 },

    #[error("Game already decided")]
    GameAlreadyDecided,

    #[error("Column {column} is out of range (0-{max})")]
    ColumnOutOfRange { column: usize, max: usize },

    #[error("Column {column} is full")]
    ColumnFull { column: usize },

    #[error("Guess must be {expected} letters, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("All {max} attempts have been used")]
    AttemptsExhausted { max: u32 },

    #[error("Word already solved")]
    AlreadySolved,

    #[error("At least {min} players must join first")]
    NotEnoughPlayers { min: usize },

    #[error("Session is full ({max} players)")]
    RosterFull { max: usize },

    #[error("User already joined this session")]
    AlreadyJoined,

    #[error("User is not a player in this session")]
    NotAPlayer,

    #[error("Session is {status}, expected waiting")]
    SessionNotWaiting { status: SessionStatus },

    #[error("Session already completed")]
    SessionCompleted,

    #[error("A {attempted} move cannot be played in a {game} session")]
    WrongGameType { game: GameKind, attempted: GameKind },
}

/// Persisted state that no sequence of accepted moves could have produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct IntegrityViolation(pub String);

impl IntegrityViolation {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}
