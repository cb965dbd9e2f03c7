use crate::common::{
    DRAW_SEQUENCE, FALLING_DIAGONAL_WIN, HORIZONTAL_WIN, RISING_DIAGONAL_WIN, VERTICAL_WIN,
};
use gamehall::engine::{ConnectFourState, ConnectOutcome, Disc, Rejection, COLS, ROWS};
use proptest::prelude::*;

fn play_all(columns: &[usize]) -> ConnectFourState {
    let mut state = ConnectFourState::new();
    for (i, column) in columns.iter().enumerate() {
        let user = if i % 2 == 0 { "alice" } else { "bob" };
        state.play(*column, user).unwrap();
    }
    state
}

proptest! {
    #[test]
    fn filled_cells_track_accepted_moves(columns in prop::collection::vec(0usize..COLS, 0..80)) {
        let mut state = ConnectFourState::new();
        let mut accepted = 0usize;

        for column in columns {
            let before = state.clone();
            let mover = state.current_turn;

            match state.play(column, "player") {
                Ok(placement) => {
                    accepted += 1;
                    prop_assert_eq!(placement.disc, mover);
                    prop_assert_eq!(state.board.filled_cells(), before.board.filled_cells() + 1);
                    prop_assert_eq!(state.current_turn, mover.other());
                }
                Err(_) => {
                    // Rejected drops leave nothing behind
                    prop_assert_eq!(&state, &before);
                }
            }

            prop_assert_eq!(state.board.filled_cells(), accepted);
            prop_assert_eq!(state.move_count as usize, accepted);
            prop_assert!(state.check_integrity().is_ok());
        }
    }

    #[test]
    fn decided_games_are_frozen(columns in prop::collection::vec(0usize..COLS, 0..80), extra in 0usize..COLS) {
        let mut state = ConnectFourState::new();
        for column in columns {
            let _ = state.play(column, "player");
        }

        if state.is_decided() {
            let frozen = state.clone();
            prop_assert_eq!(state.play(extra, "player"), Err(Rejection::GameAlreadyDecided));
            prop_assert_eq!(state, frozen);
        }
    }
}

#[test]
fn test_first_drop_lands_on_bottom_row() {
    let mut state = ConnectFourState::new();
    let placement = state.play(3, "alice").unwrap();
    assert_eq!(placement.row, ROWS - 1);
    assert_eq!(state.board.get(5, 3), Some(Disc::One));
}

#[test]
fn test_full_column_rejected() {
    let mut state = play_all(&[2, 2, 2, 2, 2, 2]);
    assert_eq!(state.play(2, "alice"), Err(Rejection::ColumnFull { column: 2 }));
    assert_eq!(state.move_count, 6);
}

#[test]
fn test_every_direction_wins() {
    for sequence in [
        &HORIZONTAL_WIN[..],
        &VERTICAL_WIN[..],
        &RISING_DIAGONAL_WIN[..],
        &FALLING_DIAGONAL_WIN[..],
    ] {
        let state = play_all(sequence);
        assert_eq!(state.outcome, ConnectOutcome::Win(Disc::One), "{:?}", sequence);
        assert_eq!(state.winner_id.as_deref(), Some("alice"));
        assert!(state.check_integrity().is_ok());
    }
}

#[test]
fn test_full_board_without_four_is_draw() {
    let before_last = play_all(&DRAW_SEQUENCE[..41]);
    assert_eq!(before_last.outcome, ConnectOutcome::Ongoing);

    let state = play_all(&DRAW_SEQUENCE);
    assert_eq!(state.outcome, ConnectOutcome::Draw);
    assert_ne!(state.outcome, ConnectOutcome::Ongoing);
    assert!(state.board.is_full());
    assert!(state.winner_id.is_none());
    assert!(state.check_integrity().is_ok());
}
