//! Common test utilities shared by every test crate

#![allow(dead_code)]

use gamehall::coordinator::{ChannelNotifier, Coordinator, CoordinatorSettings};
use gamehall::engine::{GameKind, Move};
use gamehall::storage::Database;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Ends in a full board with no four in a line; player 2 makes the last move
pub const DRAW_SEQUENCE: [usize; 42] = [
    5, 4, 5, 0, 6, 2, 4, 5, 5, 0, 4, 1, 1, 0, 4, 5, 6, 5, 3, 1, 1, 2, 2, 6, 2, 6, 6, 3, 6, 2, 0,
    3, 0, 3, 3, 4, 3, 1, 4, 2, 1, 0,
];

/// Player 1 wins on the last move of each sequence
pub const HORIZONTAL_WIN: [usize; 7] = [0, 0, 1, 1, 2, 2, 3];
pub const VERTICAL_WIN: [usize; 7] = [0, 1, 0, 1, 0, 1, 0];
pub const RISING_DIAGONAL_WIN: [usize; 11] = [0, 1, 1, 2, 2, 3, 2, 3, 3, 5, 3];
pub const FALLING_DIAGONAL_WIN: [usize; 11] = [6, 5, 5, 4, 4, 3, 4, 3, 3, 1, 3];

/// A database file in a temporary directory, removed on drop
pub struct TestEnvironment {
    temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.temp_dir.path().join("data").join("database.sqlite")
    }

    /// A fresh handle on the shared database file
    pub fn open(&self) -> Database {
        Database::open_with_timeout(&self.db_path(), Duration::from_secs(5))
            .expect("Failed to open test database")
    }

    pub fn coordinator(&self) -> Coordinator {
        self.coordinator_with(CoordinatorSettings::default())
    }

    pub fn coordinator_with(&self, settings: CoordinatorSettings) -> Coordinator {
        Coordinator::new(
            Arc::new(self.open()),
            Arc::new(ChannelNotifier::default()),
            settings,
        )
    }
}

/// Settings that always pick `target` and retry generously under contention
pub fn word_settings(target: &str) -> CoordinatorSettings {
    CoordinatorSettings {
        words: vec![target.to_string()],
        max_commit_attempts: 20,
        ..CoordinatorSettings::default()
    }
}

/// Create a connect-four session with alice (player 1) and bob (player 2)
pub fn connect_session(coordinator: &Coordinator) -> String {
    let session = coordinator
        .create_session(GameKind::ConnectFour, "alice")
        .expect("create session");
    coordinator.join_session(&session.id, "bob").expect("join session");
    session.id
}

/// Play `columns` alternating alice and bob, starting with alice
pub fn play_columns(coordinator: &Coordinator, session_id: &str, columns: &[usize]) {
    for (i, column) in columns.iter().enumerate() {
        let user = if i % 2 == 0 { "alice" } else { "bob" };
        coordinator
            .apply_move(session_id, user, Move::drop_in(*column))
            .unwrap_or_else(|e| panic!("move {} (column {}) failed: {}", i, column, e));
    }
}
