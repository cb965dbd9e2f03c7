use crate::common::TestEnvironment;
use gamehall::engine::{GameKind, WordGameState};
use gamehall::storage::{guesses, sessions, Database, SessionStatus, StorageError};

#[test]
fn test_database_initialization() {
    let env = TestEnvironment::new();
    let db = env.open();

    let journal_mode: String = db
        .with_connection(|conn| Ok(conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?))
        .unwrap();
    assert_eq!(journal_mode.to_lowercase(), "wal");
}

#[test]
fn test_reopen_keeps_data_and_schema() {
    let env = TestEnvironment::new();
    let session_id = {
        let db = env.open();
        db.create_session(GameKind::Word, "alice").unwrap().id
    };

    // Migrations must be a no-op the second time round
    let db = env.open();
    let session = db.get_session(&session_id).unwrap();
    assert_eq!(session.host_id, "alice");
    assert_eq!(session.revision, 1);

    let versions: i64 = db
        .with_connection(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))?)
        })
        .unwrap();
    assert_eq!(versions, 1);
}

#[test]
fn test_handles_see_each_others_commits() {
    let env = TestEnvironment::new();
    let writer = env.open();
    let reader = env.open();

    let session = writer.create_session(GameKind::ConnectFour, "alice").unwrap();
    writer
        .with_transaction(|conn| {
            sessions::insert_player(conn, &session.id, "bob", 2, 1)?;
            sessions::record_change(conn, &session.id, SessionStatus::Waiting, Some(1), 1)
        })
        .unwrap();

    let seen = reader.get_session(&session.id).unwrap();
    assert_eq!(seen.players.len(), 2);
    assert_eq!(seen.revision, 2);
}

#[test]
fn test_delete_session_cascades() {
    let env = TestEnvironment::new();
    let db = env.open();

    let session = db.create_session(GameKind::Word, "alice").unwrap();
    let game = WordGameState::new("crane", 6).unwrap();
    db.get_or_create_word_game(&session.id, &game).unwrap();
    db.with_transaction(|conn| guesses::insert_guess(conn, &session.id, "alice", "apple", 1, 1))
        .unwrap();

    db.delete_session(&session.id).unwrap();

    assert!(matches!(
        db.get_session(&session.id),
        Err(StorageError::SessionNotFound(_))
    ));
    assert!(db.get_word_game(&session.id).unwrap().is_none());
    assert!(db.get_session_guesses(&session.id).unwrap().is_empty());
    assert!(matches!(
        db.delete_session(&session.id),
        Err(StorageError::SessionNotFound(_))
    ));
}

#[test]
fn test_sessions_by_status() {
    let env = TestEnvironment::new();
    let db = env.open();

    let waiting = db.create_session(GameKind::Word, "alice").unwrap();
    let playing = db.create_session(GameKind::Word, "bob").unwrap();
    db.with_transaction(|conn| {
        sessions::record_change(conn, &playing.id, SessionStatus::InProgress, None, 5)
    })
    .unwrap();

    let active = db.get_active_sessions().unwrap();
    assert_eq!(active.len(), 2);

    let in_progress = db.get_sessions_by_status(SessionStatus::InProgress).unwrap();
    assert_eq!(in_progress.len(), 1);
    assert_eq!(in_progress[0].id, playing.id);

    let still_waiting = db.get_sessions_by_status(SessionStatus::Waiting).unwrap();
    assert_eq!(still_waiting[0].id, waiting.id);
}

#[test]
fn test_corrupt_board_is_invalid_data() {
    let env = TestEnvironment::new();
    let db = env.open();
    let session = db.create_session(GameKind::ConnectFour, "alice").unwrap();
    db.get_or_create_connect_state(&session.id).unwrap();

    db.with_connection(|conn| {
        conn.execute(
            "UPDATE connect_four_games SET board = '[[1,2,3]]' WHERE session_id = ?1",
            [&session.id],
        )?;
        Ok(())
    })
    .unwrap();

    let err = db.get_connect_state(&session.id).unwrap_err();
    assert!(matches!(err, StorageError::InvalidData(_)), "{:?}", err);
}

#[test]
fn test_in_memory_databases_are_private() {
    let first = Database::open_in_memory().unwrap();
    let second = Database::open_in_memory().unwrap();

    let session = first.create_session(GameKind::Word, "alice").unwrap();
    assert!(second.get_session(&session.id).is_err());
}
