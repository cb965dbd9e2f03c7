use crate::engine::GameKind;
use crate::storage::database::Database;
use crate::storage::errors::{Result, StorageError};
use crate::storage::models::{Session, SessionPlayer, SessionStatus};
use rusqlite::{named_params, params, Connection, OptionalExtension, Params, Row};

/// Session columns as read from the database, before enum parsing
struct SessionRow {
    id: String,
    game_kind: String,
    host_id: String,
    status: String,
    revision: i64,
    created_at: i64,
    updated_at: i64,
    completed_at: Option<i64>,
}

const SESSION_COLUMNS: &str =
    "id, game_kind, host_id, status, revision, created_at, updated_at, completed_at";

fn session_row(row: &Row) -> rusqlite::Result<SessionRow> {
    Ok(SessionRow {
        id: row.get("id")?,
        game_kind: row.get("game_kind")?,
        host_id: row.get("host_id")?,
        status: row.get("status")?,
        revision: row.get("revision")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        completed_at: row.get("completed_at")?,
    })
}

impl SessionRow {
    fn into_session(self, players: Vec<SessionPlayer>) -> Result<Session> {
        let game_kind = self
            .game_kind
            .parse::<GameKind>()
            .map_err(|e| StorageError::invalid_data(e.to_string()))?;
        let status = self
            .status
            .parse::<SessionStatus>()
            .map_err(StorageError::invalid_data)?;

        Ok(Session {
            id: self.id,
            game_kind,
            host_id: self.host_id,
            status,
            revision: self.revision,
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
            players,
        })
    }
}

fn player_from_row(row: &Row) -> rusqlite::Result<SessionPlayer> {
    Ok(SessionPlayer {
        session_id: row.get("session_id")?,
        user_id: row.get("user_id")?,
        player_number: row.get("player_number")?,
        score: row.get("score")?,
        joined_at: row.get("joined_at")?,
    })
}

/// Insert a waiting session with `host_id` as player 1
pub fn insert_session(
    conn: &Connection,
    session_id: &str,
    kind: GameKind,
    host_id: &str,
    now: i64,
) -> Result<Session> {
    conn.execute(
        r#"
        INSERT INTO sessions (
            id, game_kind, host_id, status, revision, created_at, updated_at, completed_at
        ) VALUES (
            :id, :game_kind, :host_id, :status, 1, :now, :now, NULL
        )
        "#,
        named_params! {
            ":id": session_id,
            ":game_kind": kind.as_str(),
            ":host_id": host_id,
            ":status": SessionStatus::Waiting.as_str(),
            ":now": now,
        },
    )?;

    let host = insert_player(conn, session_id, host_id, 1, now)?;

    Ok(Session {
        id: session_id.to_string(),
        game_kind: kind,
        host_id: host_id.to_string(),
        status: SessionStatus::Waiting,
        revision: 1,
        created_at: now,
        updated_at: now,
        completed_at: None,
        players: vec![host],
    })
}

/// Add a roster slot; a duplicate user or number surfaces as a conflict
pub fn insert_player(
    conn: &Connection,
    session_id: &str,
    user_id: &str,
    player_number: u32,
    now: i64,
) -> Result<SessionPlayer> {
    conn.execute(
        r#"
        INSERT INTO session_players (session_id, user_id, player_number, score, joined_at)
        VALUES (:session_id, :user_id, :player_number, 0, :joined_at)
        "#,
        named_params! {
            ":session_id": session_id,
            ":user_id": user_id,
            ":player_number": player_number,
            ":joined_at": now,
        },
    )?;

    Ok(SessionPlayer {
        session_id: session_id.to_string(),
        user_id: user_id.to_string(),
        player_number,
        score: 0,
        joined_at: now,
    })
}

pub fn load_players(conn: &Connection, session_id: &str) -> Result<Vec<SessionPlayer>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT session_id, user_id, player_number, score, joined_at
        FROM session_players
        WHERE session_id = ?1
        ORDER BY player_number ASC
        "#,
    )?;

    let players = stmt
        .query_map([session_id], player_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(players)
}

pub fn load_session(conn: &Connection, session_id: &str) -> Result<Session> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM sessions WHERE id = ?1", SESSION_COLUMNS),
            [session_id],
            session_row,
        )
        .optional()?
        .ok_or_else(|| StorageError::session_not_found(session_id))?;

    let players = load_players(conn, session_id)?;
    row.into_session(players)
}

fn load_sessions_where<P: Params>(conn: &Connection, filter: &str, params: P) -> Result<Vec<Session>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM sessions {} ORDER BY created_at DESC, rowid DESC",
        SESSION_COLUMNS, filter
    ))?;

    let rows = stmt
        .query_map(params, session_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|row| {
            let players = load_players(conn, &row.id)?;
            row.into_session(players)
        })
        .collect()
}

/// Record a committed change: set the status and bump the revision.
///
/// With `expected_revision` the update only applies if nobody else has
/// committed to the session since that revision was read.
pub fn record_change(
    conn: &Connection,
    session_id: &str,
    status: SessionStatus,
    expected_revision: Option<i64>,
    now: i64,
) -> Result<i64> {
    let rows_affected = conn.execute(
        r#"
        UPDATE sessions
        SET status = :status,
            revision = revision + 1,
            updated_at = :now,
            completed_at = CASE WHEN :status = 'completed' THEN :now ELSE completed_at END
        WHERE id = :id AND (:expected IS NULL OR revision = :expected)
        "#,
        named_params! {
            ":status": status.as_str(),
            ":now": now,
            ":id": session_id,
            ":expected": expected_revision,
        },
    )?;

    if rows_affected == 0 {
        let exists = conn
            .prepare("SELECT 1 FROM sessions WHERE id = ?1")?
            .exists([session_id])?;
        return Err(if exists {
            StorageError::conflict(format!(
                "Session {} changed since revision {}",
                session_id,
                expected_revision.unwrap_or_default()
            ))
        } else {
            StorageError::session_not_found(session_id)
        });
    }

    let revision = conn.query_row(
        "SELECT revision FROM sessions WHERE id = ?1",
        [session_id],
        |row| row.get(0),
    )?;
    Ok(revision)
}

pub fn set_player_score(conn: &Connection, session_id: &str, user_id: &str, score: i64) -> Result<()> {
    let rows_affected = conn.execute(
        "UPDATE session_players SET score = ?1 WHERE session_id = ?2 AND user_id = ?3",
        (score, session_id, user_id),
    )?;

    if rows_affected == 0 {
        return Err(StorageError::invalid_data(format!(
            "User {} has no slot in session {}",
            user_id, session_id
        )));
    }
    Ok(())
}

impl Database {
    /// Create a session record with its host slot; no game state is created
    pub fn create_session(&self, kind: GameKind, host_id: &str) -> Result<Session> {
        let session_id = self.generate_session_id();
        let now = Self::current_timestamp();
        self.with_transaction(|conn| insert_session(conn, &session_id, kind, host_id, now))
    }

    /// Get a session and its roster by ID
    pub fn get_session(&self, session_id: &str) -> Result<Session> {
        self.with_connection(|conn| load_session(conn, session_id))
    }

    /// Sessions that are waiting or in progress, newest first
    pub fn get_active_sessions(&self) -> Result<Vec<Session>> {
        self.with_connection(|conn| {
            load_sessions_where(conn, "WHERE status IN ('waiting', 'in_progress')", params![])
        })
    }

    pub fn get_sessions_by_status(&self, status: SessionStatus) -> Result<Vec<Session>> {
        self.with_connection(|conn| {
            load_sessions_where(conn, "WHERE status = ?1", [status.as_str()])
        })
    }

    /// Delete a session and everything attached to it
    pub fn delete_session(&self, session_id: &str) -> Result<()> {
        self.with_connection(|conn| {
            let rows_affected = conn.execute("DELETE FROM sessions WHERE id = ?1", [session_id])?;

            if rows_affected == 0 {
                return Err(StorageError::session_not_found(session_id));
            }

            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_load_session() {
        let db = Database::open_in_memory().unwrap();
        let created = db.create_session(GameKind::Word, "alice").unwrap();

        let loaded = db.get_session(&created.id).unwrap();
        assert_eq!(loaded, created);
        assert_eq!(loaded.players.len(), 1);
        assert_eq!(loaded.players[0].player_number, 1);
    }

    #[test]
    fn test_duplicate_player_is_conflict() {
        let db = Database::open_in_memory().unwrap();
        let session = db.create_session(GameKind::ConnectFour, "alice").unwrap();

        let err = db
            .with_transaction(|conn| insert_player(conn, &session.id, "alice", 2, 0))
            .unwrap_err();
        assert!(err.is_conflict());

        let err = db
            .with_transaction(|conn| insert_player(conn, &session.id, "bob", 1, 0))
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_record_change_checks_revision() {
        let db = Database::open_in_memory().unwrap();
        let session = db.create_session(GameKind::Word, "alice").unwrap();

        let revision = db
            .with_transaction(|conn| {
                record_change(conn, &session.id, SessionStatus::InProgress, Some(1), 10)
            })
            .unwrap();
        assert_eq!(revision, 2);

        let err = db
            .with_transaction(|conn| {
                record_change(conn, &session.id, SessionStatus::InProgress, Some(1), 11)
            })
            .unwrap_err();
        assert!(err.is_conflict());

        let err = db
            .with_transaction(|conn| record_change(conn, "missing", SessionStatus::InProgress, None, 11))
            .unwrap_err();
        assert!(matches!(err, StorageError::SessionNotFound(_)));
    }

    #[test]
    fn test_completed_at_set_on_completion() {
        let db = Database::open_in_memory().unwrap();
        let session = db.create_session(GameKind::Word, "alice").unwrap();
        db.with_transaction(|conn| record_change(conn, &session.id, SessionStatus::Completed, None, 42))
            .unwrap();

        let loaded = db.get_session(&session.id).unwrap();
        assert_eq!(loaded.status, SessionStatus::Completed);
        assert_eq!(loaded.completed_at, Some(42));
        assert!(db.get_active_sessions().unwrap().is_empty());
        assert_eq!(db.get_sessions_by_status(SessionStatus::Completed).unwrap().len(), 1);
    }

    #[test]
    fn test_sessions_filtered_by_status() {
        let db = Database::open_in_memory().unwrap();
        let waiting = db.create_session(GameKind::Word, "alice").unwrap();
        let playing = db.create_session(GameKind::Word, "bob").unwrap();
        db.with_transaction(|conn| record_change(conn, &playing.id, SessionStatus::InProgress, None, 5))
            .unwrap();

        let found = db.get_sessions_by_status(SessionStatus::InProgress).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, playing.id);

        let found = db.get_sessions_by_status(SessionStatus::Waiting).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, waiting.id);
        assert!(db.get_sessions_by_status(SessionStatus::Completed).unwrap().is_empty());
    }
}
