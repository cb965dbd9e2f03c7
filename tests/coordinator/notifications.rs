use crate::common::{connect_session, play_columns, TestEnvironment};
use gamehall::coordinator::{
    ChangeNotifier, ChannelNotifier, Coordinator, CoordinatorSettings, SessionChange,
};
use gamehall::engine::{ConnectOutcome, Disc, GameKind, Move};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_subscriber_sees_commits_in_order() {
    let env = TestEnvironment::new();
    let coordinator = env.coordinator();
    let id = connect_session(&coordinator);

    let mut subscription = coordinator.subscribe(&id).unwrap();
    play_columns(&coordinator, &id, &[3, 4]);

    let first = tokio::time::timeout(Duration::from_secs(1), subscription.recv())
        .await
        .unwrap()
        .unwrap();
    let second = subscription.recv().await.unwrap();

    assert_eq!((first.revision, second.revision), (3, 4));
    match first.change {
        SessionChange::DiscDropped {
            user_id,
            placement,
            next_turn,
            outcome,
            ..
        } => {
            assert_eq!(user_id, "alice");
            assert_eq!((placement.row, placement.column), (5, 3));
            assert_eq!(next_turn, Disc::Two);
            assert_eq!(outcome, ConnectOutcome::Ongoing);
        }
        other => panic!("unexpected change {:?}", other),
    }
}

#[tokio::test]
async fn test_rejected_moves_are_silent() {
    let env = TestEnvironment::new();
    let coordinator = env.coordinator();
    let id = connect_session(&coordinator);
    let mut subscription = coordinator.subscribe(&id).unwrap();

    assert!(coordinator.apply_move(&id, "bob", Move::drop_in(0)).is_err());
    assert!(coordinator.apply_move(&id, "carol", Move::drop_in(0)).is_err());
    coordinator.apply_move(&id, "alice", Move::drop_in(0)).unwrap();

    let event = subscription.recv().await.unwrap();
    assert_eq!(event.revision, 3);
    assert!(subscription.try_recv().is_none());
}

#[tokio::test]
async fn test_unsubscribed_stream_ends() {
    let env = TestEnvironment::new();
    let coordinator = env.coordinator();
    let id = connect_session(&coordinator);

    let mut subscription = coordinator.subscribe(&id).unwrap();
    assert!(coordinator.unsubscribe(&subscription));
    assert!(!coordinator.unsubscribe(&subscription));

    coordinator.apply_move(&id, "alice", Move::drop_in(0)).unwrap();
    assert!(subscription.recv().await.is_none());
}

#[tokio::test]
async fn test_shared_notifier_across_coordinators() {
    let env = TestEnvironment::new();
    let notifier = Arc::new(ChannelNotifier::default());
    let first = Coordinator::new(
        Arc::new(env.open()),
        notifier.clone(),
        CoordinatorSettings::default(),
    );
    let second = Coordinator::new(
        Arc::new(env.open()),
        notifier.clone(),
        CoordinatorSettings::default(),
    );

    let session = first.create_session(GameKind::Word, "alice").unwrap();
    let mut subscription = notifier.subscribe(&session.id);
    second.join_session(&session.id, "bob").unwrap();
    first.start_session(&session.id).unwrap();

    let joined = subscription.recv().await.unwrap();
    let started = subscription.recv().await.unwrap();
    assert!(matches!(joined.change, SessionChange::PlayerJoined { player_number: 2, .. }));
    assert!(matches!(started.change, SessionChange::Started));
    assert_eq!(notifier.last_delivered(&session.id), Some(3));
}
