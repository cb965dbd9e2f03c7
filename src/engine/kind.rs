use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    ConnectFour,
    Word,
}

/// Static catalog entry for a game kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameInfo {
    pub kind: GameKind,
    pub name: &'static str,
    pub description: &'static str,
    pub min_players: usize,
    pub max_players: usize,
}

impl GameKind {
    pub const ALL: [GameKind; 2] = [GameKind::ConnectFour, GameKind::Word];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::ConnectFour => "connect_four",
            GameKind::Word => "word",
        }
    }

    pub fn info(&self) -> GameInfo {
        match self {
            GameKind::ConnectFour => GameInfo {
                kind: *self,
                name: "Connect Four",
                description: "Drop discs into a 6x7 grid; four in a line wins",
                min_players: 2,
                max_players: 2,
            },
            GameKind::Word => GameInfo {
                kind: *self,
                name: "Word",
                description: "Guess the hidden five-letter word in six tries",
                min_players: 1,
                max_players: 8,
            },
        }
    }

    pub fn min_players(&self) -> usize {
        self.info().min_players
    }

    pub fn max_players(&self) -> usize {
        self.info().max_players
    }

    /// Every playable game, in display order
    pub fn catalog() -> Vec<GameInfo> {
        Self::ALL.iter().map(GameKind::info).collect()
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown game kind '{0}' (expected 'connect_four' or 'word')")]
pub struct ParseKindError(pub String);

impl FromStr for GameKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "connect_four" | "connect-four" | "connect4" | "c4" => Ok(GameKind::ConnectFour),
            "word" | "wordle" => Ok(GameKind::Word),
            _ => Err(ParseKindError(s.to_string())),
        }
    }
}

/// A move submitted by a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Move {
    /// Drop a disc into a connect-four column
    Drop { column: usize },
    /// Submit a five-letter guess
    Guess { word: String },
}

impl Move {
    pub fn drop_in(column: usize) -> Self {
        Move::Drop { column }
    }

    pub fn guess(word: impl Into<String>) -> Self {
        Move::Guess { word: word.into() }
    }

    /// The game kind this move belongs to
    pub fn kind(&self) -> GameKind {
        match self {
            Move::Drop { .. } => GameKind::ConnectFour,
            Move::Guess { .. } => GameKind::Word,
        }
    }
}
