use anyhow::Result;
use clap::Parser;
use gamehall::cli::{display_error, is_recoverable_error, App, CliError, Cli, Commands};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(app: &App, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Games => app.handle_games(),
        Commands::Create { game, user } => app.handle_create(&game, &user).map(|_| ()),
        Commands::Join { session, user } => app.handle_join(&session, &user),
        Commands::Start { session } => app.handle_start(&session),
        Commands::Drop {
            column,
            user,
            session,
        } => app.handle_drop(column, &user, session.as_deref()),
        Commands::Guess {
            word,
            user,
            session,
        } => app.handle_guess(&word, &user, session.as_deref()),
        Commands::Show { session, user } => app.handle_show(session.as_deref(), user.as_deref()),
        Commands::Sessions { status } => app.handle_sessions(status.as_deref()),
        Commands::Config => app.handle_config().map_err(CliError::from),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let result = App::new()
        .map_err(|e| CliError::Configuration {
            setting: "data directory".to_string(),
            issue: format!("{:#}", e),
            suggestion: "Set GAMEHALL_DATA_DIR to a writable directory or fix data_dir in config.toml."
                .to_string(),
        })
        .and_then(|app| run(&app, cli.command));

    if let Err(e) = result {
        display_error(&e);
        if is_recoverable_error(&e) {
            debug!("Command failed with a recoverable error");
            std::process::exit(1);
        }
        error!("Command failed");
        std::process::exit(2);
    }

    Ok(())
}
