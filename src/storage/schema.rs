use crate::storage::errors::{Result, StorageError};
use rusqlite::{Connection, Transaction, TransactionBehavior};

pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Migration represents a single database migration
pub struct Migration {
    pub version: i32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All database migrations in order
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "Initial schema with sessions, players and per-game state tables",
    sql: r#"
            -- Sessions table
            CREATE TABLE sessions (
                id TEXT PRIMARY KEY,
                game_kind TEXT NOT NULL CHECK(game_kind IN ('connect_four', 'word')),
                host_id TEXT NOT NULL,
                status TEXT NOT NULL CHECK(status IN ('waiting', 'in_progress', 'completed')),
                revision INTEGER NOT NULL DEFAULT 1,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                completed_at INTEGER
            );

            -- Roster; the unique pairs keep one slot per user and one user per slot
            CREATE TABLE session_players (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                player_number INTEGER NOT NULL CHECK(player_number >= 1),
                score INTEGER NOT NULL DEFAULT 0,
                joined_at INTEGER NOT NULL,
                FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE,
                UNIQUE (session_id, user_id),
                UNIQUE (session_id, player_number)
            );

            -- Connect four state, one row per session
            CREATE TABLE connect_four_games (
                session_id TEXT PRIMARY KEY,
                board TEXT NOT NULL,
                current_player INTEGER NOT NULL CHECK(current_player IN (1, 2)),
                outcome TEXT NOT NULL CHECK(outcome IN ('ongoing', 'win', 'draw')),
                winner_player INTEGER CHECK(winner_player IN (1, 2)),
                winner_id TEXT,
                move_count INTEGER NOT NULL DEFAULT 0,
                version INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE
            );

            -- Word game settings, one row per session
            CREATE TABLE word_games (
                session_id TEXT PRIMARY KEY,
                target_word TEXT NOT NULL,
                max_attempts INTEGER NOT NULL CHECK(max_attempts >= 1),
                created_at INTEGER NOT NULL,
                FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE
            );

            -- Append-only guesses
            CREATE TABLE word_guesses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                guess TEXT NOT NULL,
                attempt_number INTEGER NOT NULL CHECK(attempt_number >= 1),
                created_at INTEGER NOT NULL,
                FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE,
                UNIQUE (session_id, user_id, attempt_number)
            );

            -- Schema migrations tracking table
            CREATE TABLE schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at INTEGER NOT NULL,
                description TEXT NOT NULL
            );

            -- Indexes for performance
            CREATE INDEX idx_sessions_status ON sessions(status);
            CREATE INDEX idx_sessions_created ON sessions(created_at DESC);
            CREATE INDEX idx_players_session ON session_players(session_id, player_number);
            CREATE INDEX idx_guesses_session ON word_guesses(session_id, created_at);
        "#,
}];

/// Initialize the database schema and run any pending migrations
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    // Enable important SQLite features
    conn.pragma_update(None, "foreign_keys", true)
        .map_err(|e| {
            StorageError::migration_failed(0, format!("Failed to enable foreign keys: {}", e))
        })?;

    conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))
        .map_err(|e| {
            StorageError::migration_failed(0, format!("Failed to enable WAL mode: {}", e))
        })?;

    // Several handles may open the same file at once; the immediate
    // transaction makes the version check and the migrations one unit.
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate).map_err(|e| {
        StorageError::migration_failed(-1, format!("Failed to start transaction: {}", e))
    })?;

    let migrations_exist = tx
        .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name='schema_migrations'")
        .and_then(|mut stmt| stmt.exists([]))
        .unwrap_or(false);

    let current_version = if migrations_exist {
        get_current_version(&tx)?
    } else {
        0
    };

    run_pending_migrations(&tx, current_version)?;

    tx.commit().map_err(|e| {
        StorageError::migration_failed(-1, format!("Failed to commit migrations: {}", e))
    })?;

    Ok(())
}

/// Run every migration newer than `current_version`
fn run_pending_migrations(conn: &Connection, current_version: i32) -> Result<()> {
    for migration in MIGRATIONS.iter().filter(|m| m.version > current_version) {
        execute_migration(conn, migration)?;
    }

    Ok(())
}

/// Execute a single migration
fn execute_migration(conn: &Connection, migration: &Migration) -> Result<()> {
    conn.execute_batch(migration.sql).map_err(|e| {
        StorageError::migration_failed(
            migration.version,
            format!("Failed to execute migration {}: {}", migration.version, e),
        )
    })?;

    // Record the migration
    conn.execute(
        "INSERT INTO schema_migrations (version, applied_at, description) VALUES (?1, ?2, ?3)",
        (
            migration.version,
            current_timestamp(),
            migration.description,
        ),
    )
    .map_err(|e| {
        StorageError::migration_failed(
            migration.version,
            format!("Failed to record migration {}: {}", migration.version, e),
        )
    })?;

    Ok(())
}

/// Get the current schema version
fn get_current_version(conn: &Connection) -> Result<i32> {
    let version = conn
        .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get::<_, Option<i32>>(0)
        })
        .map_err(|e| {
            StorageError::migration_failed(-1, format!("Failed to get current version: {}", e))
        })?
        .unwrap_or(0);

    Ok(version)
}

/// Get current Unix timestamp
fn current_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_initializes_once() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        // Running again must find nothing pending
        initialize_schema(&conn).unwrap();

        assert_eq!(get_current_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN \
                 ('sessions', 'session_players', 'connect_four_games', 'word_games', 'word_guesses')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 5);
    }
}
