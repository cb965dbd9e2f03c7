use crate::engine::GuessRecord;
use crate::storage::database::Database;
use crate::storage::errors::Result;
use crate::storage::models::StoredGuess;
use rusqlite::{named_params, Connection, Row};

fn guess_from_row(row: &Row) -> rusqlite::Result<StoredGuess> {
    Ok(StoredGuess {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        user_id: row.get("user_id")?,
        guess: row.get("guess")?,
        attempt_number: row.get("attempt_number")?,
        created_at: row.get("created_at")?,
    })
}

impl From<&StoredGuess> for GuessRecord {
    fn from(stored: &StoredGuess) -> Self {
        GuessRecord {
            attempt_number: stored.attempt_number,
            guess: stored.guess.clone(),
            created_at: stored.created_at,
        }
    }
}

/// Append a guess; reusing an attempt number surfaces as a conflict
pub fn insert_guess(
    conn: &Connection,
    session_id: &str,
    user_id: &str,
    guess: &str,
    attempt_number: u32,
    now: i64,
) -> Result<StoredGuess> {
    conn.execute(
        r#"
        INSERT INTO word_guesses (session_id, user_id, guess, attempt_number, created_at)
        VALUES (:session_id, :user_id, :guess, :attempt_number, :created_at)
        "#,
        named_params! {
            ":session_id": session_id,
            ":user_id": user_id,
            ":guess": guess,
            ":attempt_number": attempt_number,
            ":created_at": now,
        },
    )?;

    Ok(StoredGuess {
        id: Some(conn.last_insert_rowid()),
        session_id: session_id.to_string(),
        user_id: user_id.to_string(),
        guess: guess.to_string(),
        attempt_number,
        created_at: now,
    })
}

/// One player's guesses in attempt order
pub fn load_player_guesses(conn: &Connection, session_id: &str, user_id: &str) -> Result<Vec<StoredGuess>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, session_id, user_id, guess, attempt_number, created_at
        FROM word_guesses
        WHERE session_id = ?1 AND user_id = ?2
        ORDER BY attempt_number ASC
        "#,
    )?;

    let guesses = stmt
        .query_map([session_id, user_id], guess_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(guesses)
}

/// Every guess in the session in the order they were committed
pub fn load_session_guesses(conn: &Connection, session_id: &str) -> Result<Vec<StoredGuess>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, session_id, user_id, guess, attempt_number, created_at
        FROM word_guesses
        WHERE session_id = ?1
        ORDER BY created_at ASC, id ASC
        "#,
    )?;

    let guesses = stmt
        .query_map([session_id], guess_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(guesses)
}

impl Database {
    pub fn get_player_guesses(&self, session_id: &str, user_id: &str) -> Result<Vec<StoredGuess>> {
        self.with_connection(|conn| load_player_guesses(conn, session_id, user_id))
    }

    pub fn get_session_guesses(&self, session_id: &str) -> Result<Vec<StoredGuess>> {
        self.with_connection(|conn| load_session_guesses(conn, session_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::GameKind;

    #[test]
    fn test_guesses_ordered_by_attempt() {
        let db = Database::open_in_memory().unwrap();
        let session = db.create_session(GameKind::Word, "alice").unwrap();

        db.with_transaction(|conn| {
            insert_guess(conn, &session.id, "alice", "beach", 2, 5)?;
            insert_guess(conn, &session.id, "alice", "apple", 1, 6)?;
            Ok(())
        })
        .unwrap();

        let guesses = db.get_player_guesses(&session.id, "alice").unwrap();
        let attempts: Vec<u32> = guesses.iter().map(|g| g.attempt_number).collect();
        assert_eq!(attempts, vec![1, 2]);

        let all = db.get_session_guesses(&session.id).unwrap();
        assert_eq!(all[0].guess, "beach");
    }

    #[test]
    fn test_duplicate_attempt_is_conflict() {
        let db = Database::open_in_memory().unwrap();
        let session = db.create_session(GameKind::Word, "alice").unwrap();

        db.with_transaction(|conn| insert_guess(conn, &session.id, "alice", "apple", 1, 0))
            .unwrap();
        let err = db
            .with_transaction(|conn| insert_guess(conn, &session.id, "alice", "beach", 1, 0))
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(db.get_player_guesses(&session.id, "alice").unwrap().len(), 1);
    }
}
