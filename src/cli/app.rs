use crate::cli::display;
use crate::cli::error_handler::{CliError, CliResult};
use crate::cli::validation::{
    validate_column, validate_game_kind, validate_guess, validate_status, validate_user_id,
    SessionResolver,
};
use crate::config::Config;
use crate::coordinator::{ChannelNotifier, Coordinator, CoordinatorSettings, MoveReceipt};
use crate::engine::{GameKind, Move};
use crate::storage::{Database, SessionStatus};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Main application state
pub struct App {
    pub config: Config,
    pub database: Arc<Database>,
    pub notifier: Arc<ChannelNotifier>,
    pub coordinator: Coordinator,
}

impl App {
    /// Load configuration and open the database it points at
    pub fn new() -> Result<Self> {
        let config =
            Config::load_or_create_default().context("Failed to initialize configuration")?;
        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Result<Self> {
        Self::ensure_data_dir(&config.data_dir).context("Failed to create data directory")?;

        let database = Arc::new(
            Database::open_with_timeout(&config.database_path(), config.storage.busy_timeout())
                .context("Failed to initialize database")?,
        );
        let notifier = Arc::new(ChannelNotifier::new(config.notifier.max_pending));
        let coordinator = Coordinator::new(
            database.clone(),
            notifier.clone(),
            CoordinatorSettings::from(&config),
        );
        debug!("Using database at {}", config.database_path().display());

        Ok(App {
            config,
            database,
            notifier,
            coordinator,
        })
    }

    /// Ensure data directory exists and is writable
    pub fn ensure_data_dir(data_dir: &Path) -> Result<()> {
        if !data_dir.exists() {
            std::fs::create_dir_all(data_dir).with_context(|| {
                format!("Failed to create data directory: {}", data_dir.display())
            })?;
        }

        let test_file = data_dir.join(".write_test");
        std::fs::write(&test_file, "test")
            .with_context(|| format!("Data directory is not writable: {}", data_dir.display()))?;
        std::fs::remove_file(&test_file).context("Failed to clean up write test file")?;

        Ok(())
    }

    fn resolver(&self) -> SessionResolver<'_> {
        SessionResolver::new(&self.database)
    }

    /// Handle the 'games' command - list the game catalog
    pub fn handle_games(&self) -> CliResult<()> {
        display::display_catalog(&GameKind::catalog());
        Ok(())
    }

    pub fn handle_create(&self, game: &str, user: &str) -> CliResult<String> {
        let kind = validate_game_kind(game)?;
        let user = validate_user_id(user)?;

        let session = self.coordinator.create_session(kind, &user)?;
        println!("Created {} session {}", kind, session.id);
        println!("You are player 1.");
        if kind.max_players() > 1 {
            println!("Others can join with 'gamehall join {} --user <id>'.", session.id);
        }
        Ok(session.id)
    }

    pub fn handle_join(&self, session: &str, user: &str) -> CliResult<()> {
        let session_id = self.resolver().resolve(session)?;
        let user = validate_user_id(user)?;

        let player = self.coordinator.join_session(&session_id, &user)?;
        println!("{} joined session {} as player {}", user, session_id, player.player_number);
        Ok(())
    }

    pub fn handle_start(&self, session: &str) -> CliResult<()> {
        let session_id = self.resolver().resolve(session)?;
        let started = self.coordinator.start_session(&session_id)?;
        println!("Session {} is now {}", started.id, started.status);
        Ok(())
    }

    pub fn handle_drop(&self, column: usize, user: &str, session: Option<&str>) -> CliResult<()> {
        let column = validate_column(column)?;
        let user = validate_user_id(user)?;
        let session_id = self.resolver().resolve_or_recent(session)?;

        let receipt = self
            .coordinator
            .apply_move(&session_id, &user, Move::drop_in(column))?;
        self.report_move(&receipt);

        let view = self.coordinator.connect_view(&session_id)?;
        display::display_connect_view(&view);
        Ok(())
    }

    pub fn handle_guess(&self, word: &str, user: &str, session: Option<&str>) -> CliResult<()> {
        let word = validate_guess(word)?;
        let user = validate_user_id(user)?;
        let session_id = self.resolver().resolve_or_recent(session)?;

        let receipt = self
            .coordinator
            .apply_move(&session_id, &user, Move::guess(word))?;
        self.report_move(&receipt);

        let view = self.coordinator.word_view(&session_id, &user)?;
        display::display_word_view(&view);
        Ok(())
    }

    fn report_move(&self, receipt: &MoveReceipt) {
        println!("{}", display::describe_event(&receipt.event));
        if receipt.commit_attempts > 1 {
            debug!("Move committed after {} attempts", receipt.commit_attempts);
        }
    }

    pub fn handle_show(&self, session: Option<&str>, user: Option<&str>) -> CliResult<()> {
        let session_id = self.resolver().resolve_or_recent(session)?;
        let session = self.coordinator.session(&session_id)?;

        match session.game_kind {
            GameKind::ConnectFour => {
                let view = self.coordinator.connect_view(&session_id)?;
                display::display_connect_view(&view);
            }
            GameKind::Word => {
                let viewer = match user {
                    Some(user) => validate_user_id(user)?,
                    None => session.host_id.clone(),
                };
                let view = self.coordinator.word_view(&session_id, &viewer)?;
                display::display_word_view(&view);
            }
        }
        Ok(())
    }

    pub fn handle_sessions(&self, status: Option<&str>) -> CliResult<()> {
        let sessions = match status {
            Some(status) => {
                let status = validate_status(status)?;
                self.database
                    .get_sessions_by_status(status)
                    .map_err(|e| CliError::Validation(e.into()))?
            }
            None => self.coordinator.active_sessions()?,
        };

        display::display_sessions_list(&sessions);
        if sessions.iter().any(|s| s.status != SessionStatus::Completed) {
            println!();
            println!("Use 'gamehall show <session>' to view a session.");
        }
        Ok(())
    }

    pub fn handle_config(&self) -> Result<()> {
        match Config::default_config_file() {
            Ok(path) => println!("Config file: {}", path.display()),
            Err(e) => println!("Config file: unavailable ({})", e),
        }
        println!("Database:    {}", self.config.database_path().display());
        println!();
        let rendered =
            toml::to_string_pretty(&self.config).context("Failed to serialize configuration")?;
        println!("{}", rendered);
        Ok(())
    }
}
