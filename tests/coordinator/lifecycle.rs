use crate::common::{
    connect_session, play_columns, word_settings, TestEnvironment, DRAW_SEQUENCE,
    RISING_DIAGONAL_WIN, VERTICAL_WIN,
};
use gamehall::coordinator::{CoordinatorError, SessionChange};
use gamehall::engine::{ConnectOutcome, GameKind, Move, PlayerProgress, Rejection};
use gamehall::storage::SessionStatus;

#[test]
fn test_session_moves_through_states() {
    let env = TestEnvironment::new();
    let coordinator = env.coordinator();

    let id = connect_session(&coordinator);
    assert_eq!(coordinator.session(&id).unwrap().status, SessionStatus::Waiting);

    coordinator.start_session(&id).unwrap();
    assert_eq!(coordinator.session(&id).unwrap().status, SessionStatus::InProgress);

    play_columns(&coordinator, &id, &RISING_DIAGONAL_WIN);
    let session = coordinator.session(&id).unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert!(session.completed_at.is_some());

    // Completed is absorbing
    let err = coordinator.start_session(&id).unwrap_err();
    assert_eq!(
        err.rejection(),
        Some(&Rejection::SessionNotWaiting {
            status: SessionStatus::Completed
        })
    );
    let err = coordinator.apply_move(&id, "bob", Move::drop_in(6)).unwrap_err();
    assert_eq!(err.rejection(), Some(&Rejection::SessionCompleted));
}

#[test]
fn test_connect_four_waits_for_an_opponent() {
    let env = TestEnvironment::new();
    let coordinator = env.coordinator();
    let id = coordinator
        .create_session(GameKind::ConnectFour, "alice")
        .unwrap()
        .id;

    let err = coordinator.apply_move(&id, "alice", Move::drop_in(3)).unwrap_err();
    assert_eq!(err.rejection(), Some(&Rejection::NotEnoughPlayers { min: 2 }));
    let err = coordinator.start_session(&id).unwrap_err();
    assert_eq!(err.rejection(), Some(&Rejection::NotEnoughPlayers { min: 2 }));

    let session = coordinator.session(&id).unwrap();
    assert_eq!(session.status, SessionStatus::Waiting);
    assert_eq!(session.revision, 1);
    assert_eq!(coordinator.connect_view(&id).unwrap().state.move_count, 0);

    // The refused attempts left the seat open, so the game can still finish
    coordinator.join_session(&id, "bob").unwrap();
    play_columns(&coordinator, &id, &VERTICAL_WIN);
    assert_eq!(coordinator.session(&id).unwrap().status, SessionStatus::Completed);
}

#[test]
fn test_solo_word_session_can_start() {
    let env = TestEnvironment::new();
    let coordinator = env.coordinator_with(word_settings("crane"));
    let id = coordinator.create_session(GameKind::Word, "alice").unwrap().id;

    let started = coordinator.start_session(&id).unwrap();
    assert_eq!(started.status, SessionStatus::InProgress);
}

#[test]
fn test_revision_counts_every_commit() {
    let env = TestEnvironment::new();
    let coordinator = env.coordinator();

    let id = connect_session(&coordinator);
    play_columns(&coordinator, &id, &[3, 3, 4]);

    // create, join, three moves
    assert_eq!(coordinator.session(&id).unwrap().revision, 5);

    let _ = coordinator.apply_move(&id, "alice", Move::drop_in(4));
    assert_eq!(coordinator.session(&id).unwrap().revision, 5);
}

#[test]
fn test_full_board_is_draw_through_coordinator() {
    let env = TestEnvironment::new();
    let coordinator = env.coordinator();
    let id = connect_session(&coordinator);

    play_columns(&coordinator, &id, &DRAW_SEQUENCE);

    let view = coordinator.connect_view(&id).unwrap();
    assert_eq!(view.state.outcome, ConnectOutcome::Draw);
    assert_eq!(view.state.move_count, 42);
    assert!(view.state.winner_id.is_none());
    assert_eq!(view.session.status, SessionStatus::Completed);
    assert!(view.session.players.iter().all(|p| p.score == 0));
}

#[test]
fn test_seventh_guess_rejected() {
    let env = TestEnvironment::new();
    let coordinator = env.coordinator_with(word_settings("crane"));
    let session = coordinator.create_session(GameKind::Word, "alice").unwrap();
    coordinator.join_session(&session.id, "bob").unwrap();

    for word in ["apple", "beach", "dough", "fight", "jumps", "lemon"] {
        coordinator
            .apply_move(&session.id, "alice", Move::guess(word))
            .unwrap();
    }

    let err = coordinator
        .apply_move(&session.id, "alice", Move::guess("crane"))
        .unwrap_err();
    assert_eq!(err.rejection(), Some(&Rejection::AttemptsExhausted { max: 6 }));

    let stored = coordinator
        .database()
        .get_player_guesses(&session.id, "alice")
        .unwrap();
    let attempts: Vec<u32> = stored.iter().map(|g| g.attempt_number).collect();
    assert_eq!(attempts, vec![1, 2, 3, 4, 5, 6]);

    // bob is still playing, so the session stays open
    let view = coordinator.word_view(&session.id, "alice").unwrap();
    assert_eq!(view.session.status, SessionStatus::InProgress);
    assert_eq!(view.viewer_progress(), Some(PlayerProgress::Failed { attempts: 6 }));
    assert!(view.target.is_none());
}

#[test]
fn test_word_session_completes_when_everyone_is_done() {
    let env = TestEnvironment::new();
    let coordinator = env.coordinator_with(word_settings("crane"));
    let session = coordinator.create_session(GameKind::Word, "alice").unwrap();
    coordinator.join_session(&session.id, "bob").unwrap();

    let receipt = coordinator
        .apply_move(&session.id, "alice", Move::guess("crane"))
        .unwrap();
    assert_eq!(receipt.event.status, SessionStatus::InProgress);

    coordinator.apply_move(&session.id, "bob", Move::guess("trace")).unwrap();
    let receipt = coordinator
        .apply_move(&session.id, "bob", Move::guess("CRANE"))
        .unwrap();
    assert_eq!(receipt.event.status, SessionStatus::Completed);

    let view = coordinator.word_view(&session.id, "bob").unwrap();
    assert_eq!(view.target.as_deref(), Some("crane"));
    let scores: Vec<i64> = view.standings.iter().map(|s| s.score).collect();
    assert_eq!(scores, vec![100, 90]);
    let order: Vec<&str> = view.all_guesses.iter().map(|g| g.guess.as_str()).collect();
    assert_eq!(order, vec!["crane", "trace", "crane"]);
}

#[test]
fn test_guess_event_never_carries_target() {
    let env = TestEnvironment::new();
    let coordinator = env.coordinator_with(word_settings("crane"));
    let session = coordinator.create_session(GameKind::Word, "alice").unwrap();

    let receipt = coordinator
        .apply_move(&session.id, "alice", Move::guess("trace"))
        .unwrap();
    assert!(matches!(receipt.event.change, SessionChange::GuessRecorded { .. }));

    let json = receipt.event.to_json().unwrap();
    assert!(!json.contains("crane"), "{}", json);
}

#[test]
fn test_unknown_session() {
    let env = TestEnvironment::new();
    let coordinator = env.coordinator();

    for result in [
        coordinator.apply_move("missing", "alice", Move::drop_in(0)).map(|_| ()),
        coordinator.start_session("missing").map(|_| ()),
        coordinator.subscribe("missing").map(|_| ()),
    ] {
        assert!(matches!(result, Err(CoordinatorError::SessionNotFound(_))));
    }
}
