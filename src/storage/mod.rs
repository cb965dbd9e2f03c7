pub mod database;
pub mod errors;
pub mod game_states;
pub mod guesses;
pub mod models;
pub mod schema;
pub mod sessions;

// Re-export key types for easy access
pub use database::Database;
pub use errors::StorageError;
pub use models::{
    ConnectFourRecord, Session, SessionPlayer, SessionStatus, StoredGuess, WordGameRecord,
};
