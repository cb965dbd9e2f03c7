use crate::engine::{ConnectFourState, LetterScore, PlayerProgress};
use crate::storage::{Session, StoredGuess};
use serde::Serialize;

/// Connect-four session as seen by anyone
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectView {
    pub session: Session,
    pub state: ConnectFourState,
    pub version: i64,
}

impl ConnectView {
    /// User id holding the disc that moves next, if the seat is taken
    pub fn current_player_id(&self) -> Option<&str> {
        let number = u32::from(self.state.current_turn.number());
        self.session
            .players
            .iter()
            .find(|p| p.player_number == number)
            .map(|p| p.user_id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluatedGuess {
    pub attempt_number: u32,
    pub guess: String,
    pub evaluation: Vec<LetterScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStanding {
    pub user_id: String,
    pub player_number: u32,
    pub score: i64,
    pub progress: PlayerProgress,
}

/// Word session from one viewer's seat.
///
/// `target` stays `None` until the session is completed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordView {
    pub session: Session,
    pub viewer_id: String,
    pub max_attempts: u32,
    pub viewer_guesses: Vec<EvaluatedGuess>,
    pub standings: Vec<PlayerStanding>,
    /// Every guess in the session, oldest first
    pub all_guesses: Vec<StoredGuess>,
    pub target: Option<String>,
}

impl WordView {
    pub fn viewer_progress(&self) -> Option<PlayerProgress> {
        self.standings
            .iter()
            .find(|s| s.user_id == self.viewer_id)
            .map(|s| s.progress)
    }
}
