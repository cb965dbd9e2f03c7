//! Per-session game state rows.
//!
//! Both tables are keyed by `session_id`, which is what makes lazy creation
//! safe: creators race on the primary key and everyone reads back the one
//! row that won.

use crate::engine::{Board, ConnectFourState, ConnectOutcome, Disc, WordGameState};
use crate::storage::database::Database;
use crate::storage::errors::{Result, StorageError};
use crate::storage::models::{ConnectFourRecord, WordGameRecord};
use rusqlite::{named_params, Connection, OptionalExtension, Row};

struct ConnectFourRow {
    session_id: String,
    board: String,
    current_player: u8,
    outcome: String,
    winner_player: Option<u8>,
    winner_id: Option<String>,
    move_count: u32,
    version: i64,
    created_at: i64,
    updated_at: i64,
}

fn connect_four_row(row: &Row) -> rusqlite::Result<ConnectFourRow> {
    Ok(ConnectFourRow {
        session_id: row.get("session_id")?,
        board: row.get("board")?,
        current_player: row.get("current_player")?,
        outcome: row.get("outcome")?,
        winner_player: row.get("winner_player")?,
        winner_id: row.get("winner_id")?,
        move_count: row.get("move_count")?,
        version: row.get("version")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

impl TryFrom<ConnectFourRow> for ConnectFourRecord {
    type Error = StorageError;

    fn try_from(row: ConnectFourRow) -> Result<Self> {
        let rows: Vec<Vec<u8>> = serde_json::from_str(&row.board)
            .map_err(|e| StorageError::serialization_error("connect four board", e))?;
        let board = Board::from_rows(&rows).map_err(|e| StorageError::invalid_data(e.0))?;

        let current_turn = Disc::from_number(row.current_player).ok_or_else(|| {
            StorageError::invalid_data(format!("Invalid current player {}", row.current_player))
        })?;

        let outcome = match (row.outcome.as_str(), row.winner_player) {
            ("ongoing", None) => ConnectOutcome::Ongoing,
            ("draw", None) => ConnectOutcome::Draw,
            ("win", Some(n)) => ConnectOutcome::Win(Disc::from_number(n).ok_or_else(|| {
                StorageError::invalid_data(format!("Invalid winning player {}", n))
            })?),
            (outcome, winner) => {
                return Err(StorageError::invalid_data(format!(
                    "Outcome '{}' with winning player {:?}",
                    outcome, winner
                )))
            }
        };

        Ok(ConnectFourRecord {
            session_id: row.session_id,
            state: ConnectFourState {
                board,
                current_turn,
                outcome,
                winner_id: row.winner_id,
                move_count: row.move_count,
            },
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn encode_board(board: &Board) -> Result<String> {
    serde_json::to_string(&board.to_rows())
        .map_err(|e| StorageError::serialization_error("connect four board", e))
}

fn winner_player(outcome: &ConnectOutcome) -> Option<u8> {
    match outcome {
        ConnectOutcome::Win(disc) => Some(disc.number()),
        _ => None,
    }
}

pub fn load_connect_state(conn: &Connection, session_id: &str) -> Result<Option<ConnectFourRecord>> {
    conn.query_row(
        r#"
        SELECT session_id, board, current_player, outcome, winner_player, winner_id,
               move_count, version, created_at, updated_at
        FROM connect_four_games
        WHERE session_id = ?1
        "#,
        [session_id],
        connect_four_row,
    )
    .optional()?
    .map(ConnectFourRecord::try_from)
    .transpose()
}

/// Fetch the session's connect-four state, creating a fresh one if absent
pub fn ensure_connect_state(conn: &Connection, session_id: &str, now: i64) -> Result<ConnectFourRecord> {
    let fresh = ConnectFourState::new();
    conn.execute(
        r#"
        INSERT INTO connect_four_games (
            session_id, board, current_player, outcome, winner_player, winner_id,
            move_count, version, created_at, updated_at
        ) VALUES (
            :session_id, :board, :current_player, 'ongoing', NULL, NULL, 0, 0, :now, :now
        )
        ON CONFLICT(session_id) DO NOTHING
        "#,
        named_params! {
            ":session_id": session_id,
            ":board": encode_board(&fresh.board)?,
            ":current_player": fresh.current_turn.number(),
            ":now": now,
        },
    )?;

    load_connect_state(conn, session_id)?.ok_or_else(|| StorageError::session_not_found(session_id))
}

/// Compare-and-commit: write `state` only if the row is still at `expected_version`
pub fn update_connect_state(
    conn: &Connection,
    session_id: &str,
    state: &ConnectFourState,
    expected_version: i64,
    now: i64,
) -> Result<i64> {
    let rows_affected = conn.execute(
        r#"
        UPDATE connect_four_games
        SET board = :board,
            current_player = :current_player,
            outcome = :outcome,
            winner_player = :winner_player,
            winner_id = :winner_id,
            move_count = :move_count,
            version = version + 1,
            updated_at = :now
        WHERE session_id = :session_id AND version = :expected_version
        "#,
        named_params! {
            ":board": encode_board(&state.board)?,
            ":current_player": state.current_turn.number(),
            ":outcome": state.outcome.as_str(),
            ":winner_player": winner_player(&state.outcome),
            ":winner_id": state.winner_id,
            ":move_count": state.move_count,
            ":now": now,
            ":session_id": session_id,
            ":expected_version": expected_version,
        },
    )?;

    if rows_affected == 0 {
        return Err(StorageError::conflict(format!(
            "Connect four state for {} moved past version {}",
            session_id, expected_version
        )));
    }

    Ok(expected_version + 1)
}

struct WordGameRow {
    session_id: String,
    target_word: String,
    max_attempts: u32,
    created_at: i64,
}

impl TryFrom<WordGameRow> for WordGameRecord {
    type Error = StorageError;

    fn try_from(row: WordGameRow) -> Result<Self> {
        let game = WordGameState::new(&row.target_word, row.max_attempts)
            .map_err(|e| StorageError::invalid_data(e.0))?;
        Ok(WordGameRecord {
            session_id: row.session_id,
            game,
            created_at: row.created_at,
        })
    }
}

pub fn load_word_game(conn: &Connection, session_id: &str) -> Result<Option<WordGameRecord>> {
    conn.query_row(
        r#"
        SELECT session_id, target_word, max_attempts, created_at
        FROM word_games
        WHERE session_id = ?1
        "#,
        [session_id],
        |row| {
            Ok(WordGameRow {
                session_id: row.get("session_id")?,
                target_word: row.get("target_word")?,
                max_attempts: row.get("max_attempts")?,
                created_at: row.get("created_at")?,
            })
        },
    )
    .optional()?
    .map(WordGameRecord::try_from)
    .transpose()
}

/// Fetch the session's word game, inserting `candidate` if none exists yet.
///
/// When another creator wins the race its target is returned and
/// `candidate` is discarded.
pub fn ensure_word_game(
    conn: &Connection,
    session_id: &str,
    candidate: &WordGameState,
    now: i64,
) -> Result<WordGameRecord> {
    conn.execute(
        r#"
        INSERT INTO word_games (session_id, target_word, max_attempts, created_at)
        VALUES (:session_id, :target_word, :max_attempts, :now)
        ON CONFLICT(session_id) DO NOTHING
        "#,
        named_params! {
            ":session_id": session_id,
            ":target_word": candidate.target(),
            ":max_attempts": candidate.max_attempts,
            ":now": now,
        },
    )?;

    load_word_game(conn, session_id)?.ok_or_else(|| StorageError::session_not_found(session_id))
}

impl Database {
    pub fn get_or_create_connect_state(&self, session_id: &str) -> Result<ConnectFourRecord> {
        let now = Self::current_timestamp();
        self.with_connection(|conn| ensure_connect_state(conn, session_id, now))
    }

    pub fn get_or_create_word_game(
        &self,
        session_id: &str,
        candidate: &WordGameState,
    ) -> Result<WordGameRecord> {
        let now = Self::current_timestamp();
        self.with_connection(|conn| ensure_word_game(conn, session_id, candidate, now))
    }

    pub fn get_connect_state(&self, session_id: &str) -> Result<Option<ConnectFourRecord>> {
        self.with_connection(|conn| load_connect_state(conn, session_id))
    }

    pub fn get_word_game(&self, session_id: &str) -> Result<Option<WordGameRecord>> {
        self.with_connection(|conn| load_word_game(conn, session_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::GameKind;

    #[test]
    fn test_ensure_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let session = db.create_session(GameKind::Word, "alice").unwrap();

        let first = WordGameState::new("apple", 6).unwrap();
        let second = WordGameState::new("zebra", 6).unwrap();

        let a = db.get_or_create_word_game(&session.id, &first).unwrap();
        let b = db.get_or_create_word_game(&session.id, &second).unwrap();
        assert_eq!(a.game.target(), "apple");
        assert_eq!(b.game.target(), "apple");
    }

    #[test]
    fn test_stale_version_is_conflict() {
        let db = Database::open_in_memory().unwrap();
        let session = db.create_session(GameKind::ConnectFour, "alice").unwrap();
        let record = db.get_or_create_connect_state(&session.id).unwrap();
        assert_eq!(record.version, 0);

        let mut next = record.state.clone();
        next.play(3, "alice").unwrap();

        let version = db
            .with_transaction(|conn| update_connect_state(conn, &session.id, &next, 0, 1))
            .unwrap();
        assert_eq!(version, 1);

        let err = db
            .with_transaction(|conn| update_connect_state(conn, &session.id, &next, 0, 2))
            .unwrap_err();
        assert!(err.is_conflict());

        let stored = db.get_connect_state(&session.id).unwrap().unwrap();
        assert_eq!(stored.state, next);
        assert_eq!(stored.version, 1);
    }

    #[test]
    fn test_missing_session_cannot_get_state() {
        let db = Database::open_in_memory().unwrap();
        // Foreign key rejects the insert outright
        assert!(db.get_or_create_connect_state("nope").is_err());
    }
}
