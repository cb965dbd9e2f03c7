use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gamehall")]
#[command(about = "Turn-based game sessions: Connect Four and a five-letter word game")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the games that can be played
    Games,

    /// Create a new session and take the first seat
    ///
    /// Examples:
    ///   gamehall create connect_four --user alice
    ///   gamehall create word --user alice
    Create {
        /// Game to play: 'connect_four' (or 'connect4') or 'word'
        game: String,
        /// Your user id
        #[arg(short, long)]
        user: String,
    },

    /// Join a waiting session
    ///
    /// Session ids can be shortened to any unique prefix.
    ///
    /// Example: gamehall join 3f2a --user bob
    Join {
        session: String,
        #[arg(short, long)]
        user: String,
    },

    /// Move a waiting session to in progress
    Start { session: String },

    /// Drop a disc into a Connect Four column (0-6)
    ///
    /// If no session is given, the most recently updated active session is used.
    ///
    /// Examples:
    ///   gamehall drop 3 --user alice
    ///   gamehall drop 3 --user alice --session 3f2a
    Drop {
        column: usize,
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Guess the five-letter word
    ///
    /// Examples:
    ///   gamehall guess crane --user alice
    ///   gamehall guess crane --user alice --session 3f2a
    Guess {
        word: String,
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Show a session's board or guesses
    ///
    /// For word sessions, pass --user to see your own evaluated guesses.
    Show {
        session: Option<String>,
        #[arg(short, long)]
        user: Option<String>,
    },

    /// List sessions
    Sessions {
        /// Only sessions with this status: waiting, in_progress or completed
        #[arg(long)]
        status: Option<String>,
    },

    /// Show the configuration file location and current settings
    Config,
}
