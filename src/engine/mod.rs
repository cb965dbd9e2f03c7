//! Pure game rules: board models, move validation and terminal detection.
//!
//! Nothing in this module performs I/O. The coordinator loads state from
//! storage, hands it to these functions, and commits whatever they return.

pub use self::connect::{Board, ConnectFourState, Disc, Placement, COLS, CONNECT, ROWS};
pub use self::error::{IntegrityViolation, Rejection};
pub use self::kind::{GameInfo, GameKind, Move, ParseKindError};
pub use self::terminal::{ConnectOutcome, PlayerProgress};
pub use self::validator::{validate_move, GameSnapshot};
pub use self::word::{
    evaluate_guess, normalize_guess, GuessLog, GuessRecord, LetterScore, LetterStatus,
    WordGameState, DEFAULT_MAX_ATTEMPTS, DEFAULT_WORDS, WORD_LENGTH,
};

pub mod connect;
pub mod error;
pub mod kind;
pub mod terminal;
pub mod validator;
pub mod word;
