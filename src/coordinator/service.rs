use super::error::{CoordinatorError, Result, StorageResultExt};
use super::events::{SessionChange, SessionEvent};
use super::notifier::{ChangeNotifier, Subscription};
use super::views::{ConnectView, EvaluatedGuess, PlayerStanding, WordView};
use crate::config::Config;
use crate::engine::{
    normalize_guess, terminal, validate_move, ConnectOutcome, GameKind, GameSnapshot, GuessLog,
    GuessRecord, Move, Rejection, WordGameState, DEFAULT_MAX_ATTEMPTS, DEFAULT_WORDS,
};
use crate::storage::{
    game_states, guesses, sessions, ConnectFourRecord, Database, Session, SessionPlayer,
    SessionStatus, StorageError, StoredGuess, WordGameRecord,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Score for solving the word on `attempt_number`
pub fn solve_score(attempt_number: u32) -> i64 {
    let penalty = 10 * i64::from(attempt_number.saturating_sub(1));
    (100 - penalty).max(0)
}

/// Score awarded to the connect-four winner
pub const CONNECT_WIN_SCORE: i64 = 1;

#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    pub max_commit_attempts: u32,
    pub retry_backoff: Duration,
    pub word_max_attempts: u32,
    pub words: Vec<String>,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            max_commit_attempts: 5,
            retry_backoff: Duration::from_millis(5),
            word_max_attempts: DEFAULT_MAX_ATTEMPTS,
            words: DEFAULT_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl From<&Config> for CoordinatorSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_commit_attempts: config.coordinator.max_commit_attempts,
            retry_backoff: config.coordinator.retry_backoff(),
            word_max_attempts: config.word.max_attempts,
            words: config.word.words.clone(),
        }
    }
}

/// Result of an accepted move
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveReceipt {
    pub event: SessionEvent,
    /// Compare-and-commit attempts the move needed, 1 when uncontested
    pub commit_attempts: u32,
}

/// Serialises every write to a session through validate-then-commit.
///
/// Each write reads a snapshot, validates against it, and commits in one
/// IMMEDIATE transaction guarded by a version, revision, or uniqueness
/// check. A lost race is retried from a fresh read.
pub struct Coordinator {
    db: Arc<Database>,
    notifier: Arc<dyn ChangeNotifier>,
    settings: CoordinatorSettings,
}

impl Coordinator {
    pub fn new(
        db: Arc<Database>,
        notifier: Arc<dyn ChangeNotifier>,
        settings: CoordinatorSettings,
    ) -> Self {
        Self {
            db,
            notifier,
            settings,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    #[instrument(skip(self))]
    pub fn create_session(&self, kind: GameKind, host_id: &str) -> Result<Session> {
        let session = self.db.create_session(kind, host_id).in_session("")?;

        // Game state upfront; later reads use the same idempotent upsert
        match kind {
            GameKind::ConnectFour => {
                self.connect_record(&session.id)?;
            }
            GameKind::Word => {
                self.word_record(&session.id)?;
            }
        }

        info!("Created {} session {} hosted by {}", kind, session.id, host_id);
        self.notifier.publish(SessionEvent {
            session_id: session.id.clone(),
            revision: session.revision,
            status: session.status,
            change: SessionChange::Created {
                game_kind: kind,
                host_id: host_id.to_string(),
            },
        });

        Ok(session)
    }

    #[instrument(skip(self))]
    pub fn join_session(&self, session_id: &str, user_id: &str) -> Result<SessionPlayer> {
        let (player, _) = self.with_retries(session_id, "join", || {
            let session = self.db.get_session(session_id).in_session(session_id)?;

            if session.status != SessionStatus::Waiting {
                return Err(Rejection::SessionNotWaiting {
                    status: session.status,
                }
                .into());
            }
            if session.is_roster_full() {
                return Err(Rejection::RosterFull {
                    max: session.game_kind.max_players(),
                }
                .into());
            }
            if session.player(user_id).is_some() {
                return Err(Rejection::AlreadyJoined.into());
            }

            let player_number = session.players.len() as u32 + 1;
            let now = Database::current_timestamp();
            let (player, revision) = self
                .db
                .with_transaction(|conn| {
                    let revision = sessions::record_change(
                        conn,
                        session_id,
                        SessionStatus::Waiting,
                        Some(session.revision),
                        now,
                    )?;
                    let player =
                        sessions::insert_player(conn, session_id, user_id, player_number, now)?;
                    Ok((player, revision))
                })
                .in_session(session_id)?;

            self.notifier.publish(SessionEvent {
                session_id: session_id.to_string(),
                revision,
                status: SessionStatus::Waiting,
                change: SessionChange::PlayerJoined {
                    user_id: user_id.to_string(),
                    player_number,
                },
            });
            Ok(player)
        })?;

        info!("{} joined session {} as player {}", user_id, session_id, player.player_number);
        Ok(player)
    }

    #[instrument(skip(self))]
    pub fn start_session(&self, session_id: &str) -> Result<Session> {
        let (session, _) = self.with_retries(session_id, "start", || {
            let session = self.db.get_session(session_id).in_session(session_id)?;

            if session.status != SessionStatus::Waiting {
                return Err(Rejection::SessionNotWaiting {
                    status: session.status,
                }
                .into());
            }
            if !session.has_min_players() {
                return Err(Rejection::NotEnoughPlayers {
                    min: session.game_kind.min_players(),
                }
                .into());
            }

            let now = Database::current_timestamp();
            let revision = self
                .db
                .with_transaction(|conn| {
                    sessions::record_change(
                        conn,
                        session_id,
                        SessionStatus::InProgress,
                        Some(session.revision),
                        now,
                    )
                })
                .in_session(session_id)?;

            self.notifier.publish(SessionEvent {
                session_id: session_id.to_string(),
                revision,
                status: SessionStatus::InProgress,
                change: SessionChange::Started,
            });

            Ok(Session {
                status: SessionStatus::InProgress,
                revision,
                updated_at: now,
                ..session
            })
        })?;

        info!("Started session {}", session_id);
        Ok(session)
    }

    /// Validate and commit one move.
    ///
    /// Rejections come back to the caller only; nothing is stored or
    /// published for them.
    #[instrument(skip(self, mv))]
    pub fn apply_move(&self, session_id: &str, user_id: &str, mv: Move) -> Result<MoveReceipt> {
        let mv = match mv {
            Move::Guess { word } => Move::Guess {
                word: normalize_guess(&word),
            },
            other => other,
        };

        let result = self.with_retries(session_id, "move", || {
            let session = self.db.get_session(session_id).in_session(session_id)?;
            match session.game_kind {
                GameKind::ConnectFour => self.try_drop(&session, user_id, &mv),
                GameKind::Word => self.try_guess(&session, user_id, &mv),
            }
        });

        match result {
            Ok((event, commit_attempts)) => {
                info!(
                    "Committed move by {} in session {} at r{}",
                    user_id, session_id, event.revision
                );
                Ok(MoveReceipt {
                    event,
                    commit_attempts,
                })
            }
            Err(CoordinatorError::Rejected(rejection)) => {
                debug!("Rejected move by {} in session {}: {}", user_id, session_id, rejection);
                Err(rejection.into())
            }
            Err(e) => Err(e),
        }
    }

    fn try_drop(&self, session: &Session, user_id: &str, mv: &Move) -> Result<SessionEvent> {
        let record = self.connect_record(&session.id)?;
        validate_move(GameSnapshot::ConnectFour(&record.state), session, user_id, mv)?;

        let Move::Drop { column } = mv else {
            return Err(Rejection::WrongGameType {
                game: GameKind::ConnectFour,
                attempted: mv.kind(),
            }
            .into());
        };

        let mut next = record.state.clone();
        let placement = next.play(*column, user_id)?;
        let decided = next.is_decided();
        let now = Database::current_timestamp();

        let (revision, status) = self
            .db
            .with_transaction(|conn| {
                game_states::update_connect_state(conn, &session.id, &next, record.version, now)?;

                let committed = sessions::load_session(conn, &session.id)?;
                if committed.is_completed() {
                    return Err(StorageError::conflict(format!(
                        "Session {} completed concurrently",
                        session.id
                    )));
                }

                if matches!(next.outcome, ConnectOutcome::Win(_)) {
                    sessions::set_player_score(conn, &session.id, user_id, CONNECT_WIN_SCORE)?;
                }

                let status = committed.status.after_move(decided);
                let revision = sessions::record_change(conn, &session.id, status, None, now)?;
                Ok((revision, status))
            })
            .in_session(&session.id)?;

        if decided {
            info!("Session {} decided: {}", session.id, next.outcome.as_str());
        }

        let event = SessionEvent {
            session_id: session.id.clone(),
            revision,
            status,
            change: SessionChange::DiscDropped {
                user_id: user_id.to_string(),
                placement,
                board: next.board,
                next_turn: next.current_turn,
                outcome: next.outcome,
                winner_id: next.winner_id.clone(),
            },
        };
        self.notifier.publish(event.clone());
        Ok(event)
    }

    fn try_guess(&self, session: &Session, user_id: &str, mv: &Move) -> Result<SessionEvent> {
        let record = self.word_record(&session.id)?;
        let game = &record.game;

        let stored = self
            .db
            .get_player_guesses(&session.id, user_id)
            .in_session(&session.id)?;
        let log = guess_log(&stored);
        log.check_integrity(game.max_attempts)
            .map_err(|v| self.integrity(&session.id, v.0))?;

        validate_move(GameSnapshot::Word { game, log: &log }, session, user_id, mv)?;

        let Move::Guess { word } = mv else {
            return Err(Rejection::WrongGameType {
                game: GameKind::Word,
                attempted: mv.kind(),
            }
            .into());
        };

        let attempt_number = log.next_attempt();
        let evaluation = game.evaluate(word);
        let solved = game.is_target(word);
        let now = Database::current_timestamp();

        let (revision, status, progress) = self
            .db
            .with_transaction(|conn| {
                guesses::insert_guess(conn, &session.id, user_id, word, attempt_number, now)?;

                let committed = sessions::load_session(conn, &session.id)?;
                if committed.is_completed() {
                    return Err(StorageError::conflict(format!(
                        "Session {} completed concurrently",
                        session.id
                    )));
                }

                if solved {
                    sessions::set_player_score(
                        conn,
                        &session.id,
                        user_id,
                        solve_score(attempt_number),
                    )?;
                }

                let all = guesses::load_session_guesses(conn, &session.id)?;
                let progress_of = |uid: &str| {
                    let own: Vec<StoredGuess> =
                        all.iter().filter(|g| g.user_id == uid).cloned().collect();
                    terminal::player_progress(&guess_log(&own), game.target(), game.max_attempts)
                };

                let finished = terminal::word_session_finished(
                    committed.players.iter().map(|p| progress_of(&p.user_id)),
                );
                let status = committed.status.after_move(finished);
                let revision = sessions::record_change(conn, &session.id, status, None, now)?;
                Ok((revision, status, progress_of(user_id)))
            })
            .in_session(&session.id)?;

        if status == SessionStatus::Completed {
            info!("Word session {} finished", session.id);
        }

        let event = SessionEvent {
            session_id: session.id.clone(),
            revision,
            status,
            change: SessionChange::GuessRecorded {
                user_id: user_id.to_string(),
                attempt_number,
                guess: word.clone(),
                evaluation,
                progress,
            },
        };
        self.notifier.publish(event.clone());
        Ok(event)
    }

    /// Run `attempt` until it stops losing commit races, returning the
    /// value and how many tries it took
    fn with_retries<T, F>(&self, session_id: &str, operation: &str, mut attempt: F) -> Result<(T, u32)>
    where
        F: FnMut() -> Result<T>,
    {
        let max_attempts = self.settings.max_commit_attempts.max(1);

        for n in 1..=max_attempts {
            match attempt() {
                Err(e) if e.is_conflict() => {
                    debug!(
                        "{} on session {} lost a commit race (attempt {}/{}): {}",
                        operation, session_id, n, max_attempts, e
                    );
                    if n < max_attempts {
                        std::thread::sleep(self.settings.retry_backoff * n);
                    }
                }
                Err(e) => return Err(e),
                Ok(value) => return Ok((value, n)),
            }
        }

        warn!(
            "{} on session {} gave up after {} conflicting attempts",
            operation, session_id, max_attempts
        );
        Err(CoordinatorError::RetryExhausted {
            attempts: max_attempts,
        })
    }

    fn integrity(&self, session_id: &str, reason: String) -> CoordinatorError {
        error!("Integrity violation in session {}: {}", session_id, reason);
        CoordinatorError::integrity(session_id, reason)
    }

    /// Connect-four state, created if missing, checked before use
    fn connect_record(&self, session_id: &str) -> Result<ConnectFourRecord> {
        let record = self
            .db
            .get_or_create_connect_state(session_id)
            .in_session(session_id)
            .inspect_err(|e| {
                if let CoordinatorError::Integrity { reason, .. } = e {
                    error!("Unreadable connect state in session {}: {}", session_id, reason);
                }
            })?;

        record
            .state
            .check_integrity()
            .map_err(|v| self.integrity(session_id, v.0))?;
        Ok(record)
    }

    /// Word game, created with a random target if missing
    fn word_record(&self, session_id: &str) -> Result<WordGameRecord> {
        let candidate = WordGameState::random(
            &self.settings.words,
            self.settings.word_max_attempts,
            &mut rand::thread_rng(),
        );
        self.db
            .get_or_create_word_game(session_id, &candidate)
            .in_session(session_id)
            .inspect_err(|e| {
                if let CoordinatorError::Integrity { reason, .. } = e {
                    error!("Unreadable word game in session {}: {}", session_id, reason);
                }
            })
    }

    pub fn session(&self, session_id: &str) -> Result<Session> {
        self.db.get_session(session_id).in_session(session_id)
    }

    /// Waiting and in-progress sessions, newest first
    pub fn active_sessions(&self) -> Result<Vec<Session>> {
        self.db.get_active_sessions().in_session("")
    }

    pub fn connect_view(&self, session_id: &str) -> Result<ConnectView> {
        let session = self.session(session_id)?;
        if session.game_kind != GameKind::ConnectFour {
            return Err(Rejection::WrongGameType {
                game: session.game_kind,
                attempted: GameKind::ConnectFour,
            }
            .into());
        }

        let record = self.connect_record(session_id)?;
        Ok(ConnectView {
            session,
            state: record.state,
            version: record.version,
        })
    }

    pub fn word_view(&self, session_id: &str, viewer_id: &str) -> Result<WordView> {
        let session = self.session(session_id)?;
        if session.game_kind != GameKind::Word {
            return Err(Rejection::WrongGameType {
                game: session.game_kind,
                attempted: GameKind::Word,
            }
            .into());
        }

        let record = self.word_record(session_id)?;
        let game = &record.game;
        let all_guesses = self
            .db
            .get_session_guesses(session_id)
            .in_session(session_id)?;

        let mut standings = Vec::with_capacity(session.players.len());
        for player in &session.players {
            let own: Vec<StoredGuess> = all_guesses
                .iter()
                .filter(|g| g.user_id == player.user_id)
                .cloned()
                .collect();
            let log = guess_log(&own);
            log.check_integrity(game.max_attempts)
                .map_err(|v| self.integrity(session_id, v.0))?;

            standings.push(PlayerStanding {
                user_id: player.user_id.clone(),
                player_number: player.player_number,
                score: player.score,
                progress: terminal::player_progress(&log, game.target(), game.max_attempts),
            });
        }

        let viewer_log = guess_log(
            &all_guesses
                .iter()
                .filter(|g| g.user_id == viewer_id)
                .cloned()
                .collect::<Vec<_>>(),
        );
        let viewer_guesses = viewer_log
            .records()
            .iter()
            .map(|g| EvaluatedGuess {
                attempt_number: g.attempt_number,
                guess: g.guess.clone(),
                evaluation: game.evaluate(&g.guess),
            })
            .collect();

        let target = session.is_completed().then(|| game.target().to_string());

        Ok(WordView {
            viewer_id: viewer_id.to_string(),
            max_attempts: game.max_attempts,
            viewer_guesses,
            standings,
            all_guesses,
            target,
            session,
        })
    }

    /// Follow committed changes to a session
    pub fn subscribe(&self, session_id: &str) -> Result<Subscription> {
        self.session(session_id)?;
        Ok(self.notifier.subscribe(session_id))
    }

    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        self.notifier
            .unsubscribe(subscription.session_id(), subscription.id())
    }
}

fn guess_log(stored: &[StoredGuess]) -> GuessLog {
    GuessLog::from_records(stored.iter().map(GuessRecord::from).collect())
}
