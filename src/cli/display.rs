use crate::coordinator::{ConnectView, SessionChange, SessionEvent, WordView};
use crate::engine::{
    Board, ConnectOutcome, Disc, GameInfo, LetterScore, LetterStatus, PlayerProgress, COLS, ROWS,
};
use crate::storage::{Session, SessionStatus};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Display the game catalog
pub fn display_catalog(games: &[GameInfo]) {
    println!("{:<14} {:<16} {:<8} DESCRIPTION", "GAME", "NAME", "PLAYERS");
    println!("{}", "-".repeat(72));
    for game in games {
        let players = if game.min_players == game.max_players {
            game.max_players.to_string()
        } else {
            format!("{}-{}", game.min_players, game.max_players)
        };
        println!(
            "{:<14} {:<16} {:<8} {}",
            game.kind.as_str(),
            game.name,
            players,
            game.description
        );
    }
}

fn status_label(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Waiting => "⏳ Waiting",
        SessionStatus::InProgress => "🎮 Playing",
        SessionStatus::Completed => "✅ Done",
    }
}

/// Display sessions in a box-drawn table
pub fn display_sessions_list(sessions: &[Session]) {
    if sessions.is_empty() {
        println!("No sessions found.");
        return;
    }

    let id_width = 8;
    let game_width = 12;
    let host_width = sessions
        .iter()
        .map(|s| s.host_id.chars().count())
        .max()
        .unwrap_or(4)
        .clamp(4, 16);
    let status_width = 10;
    let players_width = 7;
    let updated_width = 9;

    println!(
        "┌{:─<w1$}┬{:─<w2$}┬{:─<w3$}┬{:─<w4$}┬{:─<w5$}┬{:─<w6$}┐",
        "",
        "",
        "",
        "",
        "",
        "",
        w1 = id_width + 2,
        w2 = game_width + 2,
        w3 = host_width + 2,
        w4 = status_width + 2,
        w5 = players_width + 2,
        w6 = updated_width + 2
    );
    println!(
        "│ {:^w1$} │ {:^w2$} │ {:^w3$} │ {:^w4$} │ {:^w5$} │ {:^w6$} │",
        "Session",
        "Game",
        "Host",
        "Status",
        "Players",
        "Updated",
        w1 = id_width,
        w2 = game_width,
        w3 = host_width,
        w4 = status_width,
        w5 = players_width,
        w6 = updated_width
    );
    println!(
        "├{:─<w1$}┼{:─<w2$}┼{:─<w3$}┼{:─<w4$}┼{:─<w5$}┼{:─<w6$}┤",
        "",
        "",
        "",
        "",
        "",
        "",
        w1 = id_width + 2,
        w2 = game_width + 2,
        w3 = host_width + 2,
        w4 = status_width + 2,
        w5 = players_width + 2,
        w6 = updated_width + 2
    );

    for session in sessions {
        let players = format!("{}/{}", session.players.len(), session.game_kind.max_players());
        println!(
            "│ {:w1$} │ {:w2$} │ {:w3$} │ {:w4$} │ {:>w5$} │ {:w6$} │",
            short_id(&session.id),
            session.game_kind.as_str(),
            truncate(&session.host_id, host_width),
            status_label(session.status),
            players,
            format_timestamp(session.updated_at),
            w1 = id_width,
            w2 = game_width,
            w3 = host_width,
            w4 = status_width,
            w5 = players_width,
            w6 = updated_width
        );
    }

    println!(
        "└{:─<w1$}┴{:─<w2$}┴{:─<w3$}┴{:─<w4$}┴{:─<w5$}┴{:─<w6$}┘",
        "",
        "",
        "",
        "",
        "",
        "",
        w1 = id_width + 2,
        w2 = game_width + 2,
        w3 = host_width + 2,
        w4 = status_width + 2,
        w5 = players_width + 2,
        w6 = updated_width + 2
    );
    println!("Total sessions: {}", sessions.len());
}

fn disc_symbol(disc: Option<Disc>) -> char {
    match disc {
        Some(Disc::One) => 'X',
        Some(Disc::Two) => 'O',
        None => ' ',
    }
}

/// Render a board with box-drawing borders, row 0 at the top
pub fn render_board(board: &Board) -> String {
    let mut out = String::new();
    out.push_str(&format!("┌{}─┐\n", "─┬".repeat(COLS - 1)));
    for row in 0..ROWS {
        out.push('│');
        for column in 0..COLS {
            out.push(disc_symbol(board.get(row, column)));
            out.push('│');
        }
        out.push('\n');
        if row + 1 < ROWS {
            out.push_str(&format!("├{}─┤\n", "─┼".repeat(COLS - 1)));
        }
    }
    out.push_str(&format!("└{}─┘\n", "─┴".repeat(COLS - 1)));
    let labels: Vec<String> = (0..COLS).map(|c| c.to_string()).collect();
    out.push(' ');
    out.push_str(&labels.join(" "));
    out
}

pub fn display_connect_view(view: &ConnectView) {
    let session = &view.session;
    println!("{}", "=".repeat(40));
    println!("{:^40}", format!("CONNECT FOUR - {}", short_id(&session.id)));
    println!("{}", "=".repeat(40));
    for player in &session.players {
        let disc = Disc::from_number(player.player_number as u8).map(|d| disc_symbol(Some(d)));
        println!(
            "Player {} ({}): {}",
            player.player_number,
            disc.unwrap_or('?'),
            player.user_id
        );
    }
    println!("Status: {}", session.status);
    println!("Moves played: {}", view.state.move_count);
    println!("{}", "-".repeat(40));
    println!("{}", render_board(&view.state.board));
    println!("{}", "-".repeat(40));

    match view.state.outcome {
        ConnectOutcome::Win(disc) => println!(
            "🏆 {} wins with {}",
            view.state.winner_id.as_deref().unwrap_or("unknown"),
            disc_symbol(Some(disc))
        ),
        ConnectOutcome::Draw => println!("🤝 Draw: the board is full"),
        ConnectOutcome::Ongoing => match view.current_player_id() {
            Some(user) => println!("{} ({}) to move", user, disc_symbol(Some(view.state.current_turn))),
            None => println!("Waiting for a second player to join"),
        },
    }
}

/// One guess as letters with markers: `[C]` correct, `(r)` present, ` a ` absent
pub fn format_evaluation(evaluation: &[LetterScore]) -> String {
    evaluation
        .iter()
        .map(|score| match score.status {
            LetterStatus::Correct => format!("[{}]", score.letter.to_ascii_uppercase()),
            LetterStatus::Present => format!("({})", score.letter),
            LetterStatus::Absent => format!(" {} ", score.letter),
        })
        .collect::<Vec<_>>()
        .join("")
}

fn progress_label(progress: &PlayerProgress, max_attempts: u32) -> String {
    match progress {
        PlayerProgress::Playing { attempts_used } => {
            format!("playing ({}/{})", attempts_used, max_attempts)
        }
        PlayerProgress::Solved { attempts } => format!("solved in {}", attempts),
        PlayerProgress::Failed { attempts } => format!("out of tries ({})", attempts),
    }
}

pub fn display_word_view(view: &WordView) {
    let session = &view.session;
    println!("{}", "=".repeat(40));
    println!("{:^40}", format!("WORD - {}", short_id(&session.id)));
    println!("{}", "=".repeat(40));
    println!("Status: {}", session.status);
    println!("{}", "-".repeat(40));

    if view.viewer_guesses.is_empty() {
        println!("{} has not guessed yet.", view.viewer_id);
    }
    for guess in &view.viewer_guesses {
        println!("{:>2}. {}", guess.attempt_number, format_evaluation(&guess.evaluation));
    }

    println!("{}", "-".repeat(40));
    for standing in &view.standings {
        println!(
            "{:<16} {:<22} score {}",
            truncate(&standing.user_id, 16),
            progress_label(&standing.progress, view.max_attempts),
            standing.score
        );
    }

    if let Some(target) = &view.target {
        println!("The word was: {}", target.to_uppercase());
    }
}

/// Summarise a committed change in one line
pub fn describe_event(event: &SessionEvent) -> String {
    let summary = match &event.change {
        SessionChange::Created { game_kind, host_id } => {
            format!("{} created a {} session", host_id, game_kind)
        }
        SessionChange::PlayerJoined {
            user_id,
            player_number,
        } => format!("{} joined as player {}", user_id, player_number),
        SessionChange::Started => "session started".to_string(),
        SessionChange::DiscDropped {
            user_id,
            placement,
            outcome,
            winner_id,
            ..
        } => {
            let mut line = format!(
                "{} dropped into column {} (row {})",
                user_id, placement.column, placement.row
            );
            match outcome {
                ConnectOutcome::Win(_) => {
                    line.push_str(&format!(" and {} wins", winner_id.as_deref().unwrap_or(user_id)))
                }
                ConnectOutcome::Draw => line.push_str(" and the game is a draw"),
                ConnectOutcome::Ongoing => {}
            }
            line
        }
        SessionChange::GuessRecorded {
            user_id,
            attempt_number,
            evaluation,
            ..
        } => format!(
            "{} guess {}: {}",
            user_id,
            attempt_number,
            format_evaluation(evaluation)
        ),
    };
    format!("r{} [{}] {}", event.revision, event.status, summary)
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Format a Unix timestamp relative to now
pub fn format_timestamp(timestamp: i64) -> String {
    let Ok(secs) = u64::try_from(timestamp) else {
        return "Unknown".to_string();
    };

    match UNIX_EPOCH.checked_add(Duration::from_secs(secs)) {
        Some(time) => {
            let elapsed = SystemTime::now().duration_since(time).unwrap_or_default();

            if elapsed.as_secs() < 60 {
                "Just now".to_string()
            } else if elapsed.as_secs() < 3600 {
                format!("{}m ago", elapsed.as_secs() / 60)
            } else if elapsed.as_secs() < 86400 {
                format!("{}h ago", elapsed.as_secs() / 3600)
            } else {
                format!("{}d ago", elapsed.as_secs() / 86400)
            }
        }
        None => "Unknown".to_string(),
    }
}
