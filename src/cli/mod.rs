pub mod app;
pub mod commands;
pub mod display;
pub mod error_handler;
pub mod validation;

pub use app::App;
pub use commands::{Cli, Commands};
pub use display::{
    describe_event, display_catalog, display_connect_view, display_sessions_list,
    display_word_view, format_evaluation, render_board,
};
pub use error_handler::{display_error, is_recoverable_error, CliError, CliResult};
pub use validation::{SessionResolver, ValidationError, ValidationResult};
