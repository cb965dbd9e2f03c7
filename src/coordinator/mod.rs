//! Session lifecycle and move commits.
//!
//! The coordinator is the only writer: it validates with the engine, commits
//! through storage, and publishes committed changes to the notifier.

pub mod error;
pub mod events;
pub mod notifier;
pub mod service;
pub mod views;

pub use error::CoordinatorError;
pub use events::{SessionChange, SessionEvent};
pub use notifier::{ChangeNotifier, ChannelNotifier, Subscription};
pub use service::{solve_score, Coordinator, CoordinatorSettings, MoveReceipt, CONNECT_WIN_SCORE};
pub use views::{ConnectView, EvaluatedGuess, PlayerStanding, WordView};
