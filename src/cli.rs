// CLI module - command-line argument parsing and handlers
//
// Without a subcommand the TUI starts. Subcommands:
// - config --show|--path|--reset|--edit: configuration management
// - login / logout / whoami: session management against the backend
// - register / forgot-password / reset-password: account maintenance
// - feed: headless tail of the live results stream
// - tasks news|crypto: print task tables

use crate::api::models::{display_date, CryptoTask, NewsTask};
use crate::api::ApiClient;
use crate::config::{Config, VERSION};
use crate::feed::{FeedEntry, FeedHandle};
use crate::session::{LoginCredentials, Session};
use crate::storage::SharedStore;
use crate::tui::components::{active_label, format_target, pad_to_width};
use crate::tui::views::FeedRow;
use crate::views::{crypto_tasks, news_tasks};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{BufRead, Write};
use std::process::Command;

/// Environment variable read by `login` before prompting
pub const PASSWORD_ENV: &str = "NEWSWATCH_PASSWORD";

/// newswatch - dashboard for the news monitoring bot
#[derive(Parser)]
#[command(name = "newswatch")]
#[command(version = VERSION)]
#[command(about = "Terminal dashboard for the news monitoring bot", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(long)]
        edit: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Sign in and store the access token
    Login {
        /// Account email
        #[arg(long)]
        username: String,
    },

    /// Drop the stored access token
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Create an account
    Register {
        #[arg(long)]
        email: String,
    },

    /// Ask the backend to send a password reset email
    ForgotPassword {
        #[arg(long)]
        email: String,
    },

    /// Set a new password with a reset token
    ResetPassword {
        #[arg(long)]
        token: String,
    },

    /// Print live results as they arrive (Ctrl+C to stop)
    Feed,

    /// Print the task list
    Tasks {
        #[arg(value_enum)]
        kind: TaskKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TaskKind {
    News,
    Crypto,
}

/// Everything a backend command needs, built once in `main`
pub struct Backend {
    pub config: Config,
    pub store: SharedStore,
    pub client: ApiClient,
    pub session: Session,
}

// ─────────────────────────────────────────────────────────────────────────────
// Config commands
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_config(show: bool, reset: bool, edit: bool, path: bool) -> Result<()> {
    if path {
        handle_config_path()
    } else if show {
        handle_config_show();
        Ok(())
    } else if reset {
        handle_config_reset()
    } else if edit {
        handle_config_edit()
    } else {
        println!("Usage: newswatch config [--show|--reset|--edit|--path]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --reset   Reset config file to defaults");
        println!("  --edit    Open config file in $EDITOR");
        println!("  --path    Show config file path");
        Ok(())
    }
}

fn handle_config_path() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;
    println!("{}", path.display());
    Ok(())
}

fn handle_config_show() {
    let config = Config::from_env();

    println!("# Effective configuration (env > file > defaults)");
    println!();
    println!("api_url = {:?}", config.api_url);
    println!("ws_url = {:?}", config.ws_url);
    println!("data_dir = {:?}", config.data_dir.display().to_string());
    println!("theme = {:?}", config.theme);
    println!("enable_tui = {}", config.enable_tui);
    println!();
    println!("[http]");
    println!("timeout_secs = {}", config.http.timeout_secs);
    println!();
    println!("[feed]");
    println!("capacity = {}", config.feed.capacity);
    println!("reconnect_base_ms = {}", config.feed.reconnect_base_ms);
    println!("reconnect_max_ms = {}", config.feed.reconnect_max_ms);
    println!("max_attempts = {}", config.feed.max_attempts);
    println!();
    println!("[logging]");
    println!("level = {:?}", config.logging.level);
    println!("file_enabled = {}", config.logging.file_enabled);

    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}

fn handle_config_reset() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    if path.exists() {
        eprint!("Config file exists at {}. Overwrite? [y/N] ", path.display());
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    Config::default()
        .save()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Config reset to defaults: {}", path.display());
    Ok(())
}

fn handle_config_edit() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    if !path.exists() {
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
    }

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });

    println!("Opening {} with {}", path.display(), editor);

    let status = Command::new(&editor)
        .arg(&path)
        .status()
        .with_context(|| format!("Failed to launch editor '{}' (set $EDITOR)", editor))?;
    if !status.success() {
        bail!("Editor exited with status: {}", status);
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend commands
// ─────────────────────────────────────────────────────────────────────────────

/// Run a subcommand that needs the backend or the store
pub async fn run(command: Commands, backend: Backend) -> Result<()> {
    match command {
        Commands::Config {
            show,
            reset,
            edit,
            path,
        } => handle_config(show, reset, edit, path),
        Commands::Login { username } => login(&backend.session, username).await,
        Commands::Logout => {
            backend.session.logout().await;
            println!("Signed out.");
            Ok(())
        }
        Commands::Whoami => whoami(&backend.session).await,
        Commands::Register { email } => {
            let password = read_password("New password")?;
            match backend.session.register(&email, &password).await {
                Some(user) => {
                    println!("Registered {}. You can now log in.", user.email);
                    Ok(())
                }
                None => bail!("Registration failed"),
            }
        }
        Commands::ForgotPassword { email } => {
            if !backend.session.request_password_reset(&email).await {
                bail!("Password reset request failed");
            }
            println!("If {} has an account, a reset link is on its way.", email);
            Ok(())
        }
        Commands::ResetPassword { token } => {
            let password = read_password("New password")?;
            if !backend.session.reset_password(&token, &password).await {
                bail!("Password reset failed");
            }
            println!("Password updated.");
            Ok(())
        }
        Commands::Feed => tail_feed(&backend).await,
        Commands::Tasks { kind } => print_tasks(&backend.client, kind).await,
    }
}

/// Password from the environment, else a line from stdin
fn read_password(prompt: &str) -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        if !password.is_empty() {
            return Ok(password);
        }
    }
    eprint!("{}: ", prompt);
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("Password is required");
    }
    Ok(password)
}

async fn login(session: &Session, username: String) -> Result<()> {
    let password = read_password("Password")?;
    let credentials = LoginCredentials { username, password };
    if !session.login(&credentials).await {
        bail!("Invalid credentials");
    }
    match session.current_user().await {
        Some(user) => println!("Signed in as {}", user.email),
        None => println!("Signed in."),
    }
    Ok(())
}

async fn whoami(session: &Session) -> Result<()> {
    if session.get_token().is_none() {
        bail!("Not signed in. Run `newswatch login --username <email>`.");
    }
    match session.current_user().await {
        Some(user) => {
            println!("{}", user.email);
            Ok(())
        }
        None => bail!("Session expired. Run `newswatch login` again."),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Feed tail
// ─────────────────────────────────────────────────────────────────────────────

fn feed_line(entry: &FeedEntry) -> String {
    let row = FeedRow::from_entry(entry);
    format!(
        "{}  {}  {}  {}  {}",
        pad_to_width(&row.date, 16),
        pad_to_width(row.result, 7),
        pad_to_width(&row.task, 24),
        row.title,
        row.link.unwrap_or_default()
    )
}

async fn tail_feed(backend: &Backend) -> Result<()> {
    let feed = FeedHandle::start(
        backend.config.ws_url.clone(),
        backend.store.clone(),
        backend.config.feed.to_feed_config(),
    );
    let mut revision = feed.revision_receiver();
    let mut state = feed.state_receiver();

    // Rehydrated entries first, then whatever arrives after the cursor
    let (stored, mut cursor) = feed.entries_since(0);
    for entry in &stored {
        println!("{}", feed_line(entry));
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *state.borrow();
                eprintln!("[{}]", current.label());
            }
            changed = revision.changed() => {
                if changed.is_err() {
                    break;
                }
                let (fresh, next) = feed.entries_since(cursor);
                for entry in &fresh {
                    println!("{}", feed_line(entry));
                }
                cursor = next;
            }
        }
    }

    feed.shutdown();
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Task tables
// ─────────────────────────────────────────────────────────────────────────────

fn news_table(tasks: &[NewsTask]) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} {} {} {}",
        pad_to_width("#", 5),
        pad_to_width("Title", 32),
        pad_to_width("Ends", 10),
        pad_to_width("Sources", 7),
        "State"
    )];
    for task in tasks {
        let ends = task.end_date.as_deref().map(display_date).unwrap_or_default();
        lines.push(format!(
            "{} {} {} {} {}",
            pad_to_width(&task.id.to_string(), 5),
            pad_to_width(&task.title, 32),
            pad_to_width(&ends, 10),
            pad_to_width(&(task.tg_urls.len() + task.rss_urls.len()).to_string(), 7),
            active_label(task.is_active)
        ));
    }
    lines
}

fn crypto_table(tasks: &[CryptoTask]) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} {} {} {} {}",
        pad_to_width("#", 5),
        pad_to_width("Title", 28),
        pad_to_width("Ticker", 6),
        pad_to_width("Target", 12),
        pad_to_width("Ends", 10),
        "State"
    )];
    for task in tasks {
        lines.push(format!(
            "{} {} {} {} {} {}",
            pad_to_width(&task.id.to_string(), 5),
            pad_to_width(&task.title, 28),
            pad_to_width(&task.ticker, 6),
            pad_to_width(
                &format!("{} {}", format_target(task.end_point), task.task_type.as_str()),
                12
            ),
            pad_to_width(&display_date(&task.end_date), 10),
            active_label(task.is_active)
        ));
    }
    lines
}

async fn print_tasks(client: &ApiClient, kind: TaskKind) -> Result<()> {
    if client.token().is_none() {
        bail!("Not signed in. Run `newswatch login --username <email>`.");
    }
    let lines = match kind {
        TaskKind::News => {
            let tasks: Vec<NewsTask> = client.resource(news_tasks::RESOURCE).list().await;
            news_table(&tasks)
        }
        TaskKind::Crypto => {
            let tasks: Vec<CryptoTask> = client.resource(crypto_tasks::RESOURCE).list().await;
            crypto_table(&tasks)
        }
    };
    for line in lines {
        println!("{}", line.trim_end());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(title: &str) -> FeedEntry {
        serde_json::from_value(json!({ "news": { "title": title } })).unwrap()
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["newswatch", "login", "--username", "a@b.c"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Login { ref username }) if username == "a@b.c"
        ));

        let cli = Cli::try_parse_from(["newswatch", "tasks", "crypto"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Tasks { kind: TaskKind::Crypto })
        ));

        let cli = Cli::try_parse_from(["newswatch"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_feed_line_columns() {
        let line = feed_line(&entry("Rate cut"));
        assert!(line.starts_with("Unknown date"));
        assert!(line.contains("Unknown"));
        assert!(line.contains("Rate cut"));
    }

    #[test]
    fn test_news_table_columns() {
        let task: NewsTask = serde_json::from_value(json!({
            "id": 7,
            "title": "Election",
            "description": "d",
            "end_date": "2025-01-01T00:00",
            "is_active": true,
            "tg_urls": { "chan": "https://t.me/chan" }
        }))
        .unwrap();

        let lines = news_table(&[task]);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("#    "));
        assert!(lines[1].starts_with("7    "));
        assert!(lines[1].contains("2025-01-01"));
        assert!(lines[1].contains("● active"));
    }
}
