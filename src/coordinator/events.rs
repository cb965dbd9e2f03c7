use crate::engine::{
    Board, ConnectOutcome, Disc, GameKind, LetterScore, Placement, PlayerProgress,
};
use crate::storage::SessionStatus;
use serde::Serialize;

/// A committed change, as pushed to subscribers.
///
/// `revision` increases by one with every commit to the session, so
/// subscribers can order events and spot duplicates. The word target is
/// never part of an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionEvent {
    pub session_id: String,
    pub revision: i64,
    pub status: SessionStatus,
    pub change: SessionChange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionChange {
    Created {
        game_kind: GameKind,
        host_id: String,
    },
    PlayerJoined {
        user_id: String,
        player_number: u32,
    },
    Started,
    DiscDropped {
        user_id: String,
        placement: Placement,
        board: Board,
        next_turn: Disc,
        outcome: ConnectOutcome,
        winner_id: Option<String>,
    },
    GuessRecorded {
        user_id: String,
        attempt_number: u32,
        guess: String,
        evaluation: Vec<LetterScore>,
        progress: PlayerProgress,
    },
}

impl SessionEvent {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
