pub mod cli;
pub mod config;
pub mod coordinator;
pub mod engine;
pub mod storage;

// Re-export key types for easy testing
pub use config::Config;
pub use coordinator::{
    ChangeNotifier, ChannelNotifier, Coordinator, CoordinatorError, CoordinatorSettings,
    MoveReceipt, SessionChange, SessionEvent,
};
pub use engine::{GameKind, Move, Rejection};
pub use storage::{Database, Session, SessionStatus, StorageError};
