use super::connect::{ConnectFourState, COLS};
use super::error::Rejection;
use super::kind::{GameKind, Move};
use super::word::{GuessLog, WordGameState, WORD_LENGTH};
use crate::storage::models::{Session, SessionStatus};

/// Game state a move is validated against
#[derive(Debug, Clone, Copy)]
pub enum GameSnapshot<'a> {
    ConnectFour(&'a ConnectFourState),
    /// Word game plus the acting player's own guess log
    Word {
        game: &'a WordGameState,
        log: &'a GuessLog,
    },
}

impl GameSnapshot<'_> {
    pub fn kind(&self) -> GameKind {
        match self {
            GameSnapshot::ConnectFour(_) => GameKind::ConnectFour,
            GameSnapshot::Word { .. } => GameKind::Word,
        }
    }
}

/// Decide whether `acting_user` may play `mv` in `session` given `state`.
///
/// Pure: the same inputs always produce the same answer and nothing is
/// mutated. Guesses are compared after normalisation, so callers should pass
/// the normalised word.
pub fn validate_move(
    state: GameSnapshot<'_>,
    session: &Session,
    acting_user: &str,
    mv: &Move,
) -> Result<(), Rejection> {
    let seat = session.player(acting_user).ok_or(Rejection::NotAPlayer)?;

    if session.status == SessionStatus::Completed {
        return Err(Rejection::SessionCompleted);
    }

    match (state, mv) {
        (GameSnapshot::ConnectFour(game), Move::Drop { column }) => {
            ensure_min_players(session)?;
            if game.is_decided() {
                return Err(Rejection::GameAlreadyDecided);
            }
            if *column >= COLS {
                return Err(Rejection::ColumnOutOfRange {
                    column: *column,
                    max: COLS - 1,
                });
            }
            if seat.player_number != u32::from(game.current_turn.number()) {
                return Err(Rejection::NotYourTurn {
                    current: game.current_turn.number(),
                });
            }
            if game.board.landing_row(*column).is_none() {
                return Err(Rejection::ColumnFull { column: *column });
            }
            Ok(())
        }
        (GameSnapshot::Word { game, log }, Move::Guess { word }) => {
            ensure_min_players(session)?;
            let length = word.chars().count();
            if length != WORD_LENGTH {
                return Err(Rejection::WrongLength {
                    expected: WORD_LENGTH,
                    actual: length,
                });
            }
            if log.latest().is_some_and(|g| game.is_target(&g.guess)) {
                return Err(Rejection::AlreadySolved);
            }
            if log.attempts_used() >= game.max_attempts {
                return Err(Rejection::AttemptsExhausted {
                    max: game.max_attempts,
                });
            }
            Ok(())
        }
        (snapshot, mv) => Err(Rejection::WrongGameType {
            game: snapshot.kind(),
            attempted: mv.kind(),
        }),
    }
}

/// A first move leaves the waiting state, so the roster must already be playable
fn ensure_min_players(session: &Session) -> Result<(), Rejection> {
    if session.status == SessionStatus::Waiting && !session.has_min_players() {
        return Err(Rejection::NotEnoughPlayers {
            min: session.game_kind.min_players(),
        });
    }
    Ok(())
}
