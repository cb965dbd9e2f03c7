//! Terminal-state detection for both games.

use super::connect::{Board, Disc, COLS, CONNECT, ROWS};
use super::word::GuessLog;
use serde::{Deserialize, Serialize};

/// Result of the connect-four game so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectOutcome {
    Ongoing,
    Win(Disc),
    /// Board is full and nobody connected four
    Draw,
}

impl ConnectOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectOutcome::Ongoing => "ongoing",
            ConnectOutcome::Win(_) => "win",
            ConnectOutcome::Draw => "draw",
        }
    }
}

/// Line directions as (row step, column step): horizontal, vertical, ↗, ↘
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (-1, 1), (1, 1)];

/// Outcome after `disc` landed at (row, column).
///
/// Only lines through the placed cell are examined, in all four directions.
pub fn connect_outcome(board: &Board, row: usize, column: usize, disc: Disc) -> ConnectOutcome {
    if DIRECTIONS
        .iter()
        .any(|&(dr, dc)| line_length(board, row, column, disc, dr, dc) >= CONNECT)
    {
        return ConnectOutcome::Win(disc);
    }

    if board.is_full() {
        ConnectOutcome::Draw
    } else {
        ConnectOutcome::Ongoing
    }
}

/// Outcome of an arbitrary board, found by scanning every cell
pub fn board_outcome(board: &Board) -> ConnectOutcome {
    for row in 0..ROWS {
        for column in 0..COLS {
            if let Some(disc) = board.get(row, column) {
                if let ConnectOutcome::Win(d) = connect_outcome(board, row, column, disc) {
                    return ConnectOutcome::Win(d);
                }
            }
        }
    }

    if board.is_full() {
        ConnectOutcome::Draw
    } else {
        ConnectOutcome::Ongoing
    }
}

/// Length of the run of `disc` through (row, column) along one direction
fn line_length(board: &Board, row: usize, column: usize, disc: Disc, dr: isize, dc: isize) -> usize {
    1 + run(board, row, column, disc, dr, dc) + run(board, row, column, disc, -dr, -dc)
}

fn run(board: &Board, row: usize, column: usize, disc: Disc, dr: isize, dc: isize) -> usize {
    let mut count = 0;
    let mut r = row as isize + dr;
    let mut c = column as isize + dc;

    while r >= 0 && c >= 0 && board.get(r as usize, c as usize) == Some(disc) {
        count += 1;
        r += dr;
        c += dc;
    }

    count
}

/// Where a single player stands in a word game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PlayerProgress {
    Playing { attempts_used: u32 },
    Solved { attempts: u32 },
    Failed { attempts: u32 },
}

impl PlayerProgress {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PlayerProgress::Playing { .. })
    }
}

/// Progress of one player given their guess log
pub fn player_progress(log: &GuessLog, target: &str, max_attempts: u32) -> PlayerProgress {
    let attempts = log.attempts_used();

    if log.latest().is_some_and(|g| g.guess == target) {
        return PlayerProgress::Solved { attempts };
    }

    if attempts >= max_attempts {
        PlayerProgress::Failed { attempts }
    } else {
        PlayerProgress::Playing {
            attempts_used: attempts,
        }
    }
}

/// A word session ends once every player has solved or run out of attempts
pub fn word_session_finished<I>(progress: I) -> bool
where
    I: IntoIterator<Item = PlayerProgress>,
{
    let mut any = false;
    for p in progress {
        if !p.is_terminal() {
            return false;
        }
        any = true;
    }
    any
}
