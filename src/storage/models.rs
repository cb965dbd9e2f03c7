use crate::engine::{ConnectFourState, GameKind, WordGameState};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Waiting,
    InProgress,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Waiting => "waiting",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
        }
    }

    /// Status after a committed move; never moves backward
    pub fn after_move(&self, terminal: bool) -> SessionStatus {
        match self {
            SessionStatus::Completed => SessionStatus::Completed,
            _ if terminal => SessionStatus::Completed,
            _ => SessionStatus::InProgress,
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "waiting" => Ok(SessionStatus::Waiting),
            "in_progress" => Ok(SessionStatus::InProgress),
            "completed" => Ok(SessionStatus::Completed),
            _ => Err(format!("Unknown session status '{}'", s)),
        }
    }
}

/// A user's slot in a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPlayer {
    pub session_id: String,
    pub user_id: String,
    /// Join order, starting at 1; the connect-four disc number
    pub player_number: u32,
    pub score: i64,
    pub joined_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub game_kind: GameKind,
    pub host_id: String,
    pub status: SessionStatus,
    /// Bumped by every committed change to the session or its game
    pub revision: i64,
    pub created_at: i64,
    pub updated_at: i64,
    pub completed_at: Option<i64>,
    /// Roster ordered by player number
    pub players: Vec<SessionPlayer>,
}

impl Session {
    pub fn player(&self, user_id: &str) -> Option<&SessionPlayer> {
        self.players.iter().find(|p| p.user_id == user_id)
    }

    /// Whether enough players have joined to leave the waiting state
    pub fn has_min_players(&self) -> bool {
        self.players.len() >= self.game_kind.min_players()
    }

    pub fn is_roster_full(&self) -> bool {
        self.players.len() >= self.game_kind.max_players()
    }

    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }
}

/// Persisted connect-four state with its optimistic version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectFourRecord {
    pub session_id: String,
    pub state: ConnectFourState,
    pub version: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordGameRecord {
    pub session_id: String,
    pub game: WordGameState,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredGuess {
    pub id: Option<i64>, // Auto-increment from database
    pub session_id: String,
    pub user_id: String,
    pub guess: String,
    pub attempt_number: u32,
    pub created_at: i64,
}
