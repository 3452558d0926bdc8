// newswatch - terminal dashboard for the news monitoring bot
//
// Talks to the bot backend over REST and follows its live results stream
// over a WebSocket.
//
// Architecture:
// - API client (reqwest): generic resource calls with the bearer token
// - Session: login/logout/token validation, broadcast on changes
// - Router: single current-route slot watched by the TUI
// - Feed (tokio-tungstenite): reconnecting subscriber with a bounded log
// - Storage (rusqlite): token and feed log survive restarts
// - TUI (ratatui): per-route views, key dispatch, logs panel
// - CLI (clap): config management, account commands, headless feed tail

mod api;
mod cli;
mod config;
mod feed;
mod logging;
mod router;
mod session;
mod storage;
mod tui;
mod views;

use anyhow::{Context, Result};
use api::ApiClient;
use clap::Parser;
use cli::{Backend, Cli, Commands};
use config::{Config, LogRotation};
use logging::{LogBuffer, TuiLogLayer};
use router::{Route, Router};
use session::Session;
use std::sync::Arc;
use storage::{SharedStore, SqliteStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing
///
/// In TUI mode events go to the in-memory buffer shown in the logs panel
/// (writing to the terminal would garble the display); otherwise to
/// stderr. File logging adds a JSON layer on top of either. The returned
/// guard must live until exit so buffered file logs flush.
///
/// Precedence: RUST_LOG env var > config file > default "info"
fn init_logging(
    config: &Config,
    log_buffer: &LogBuffer,
    tui_mode: bool,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let default_filter = format!("newswatch={}", config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let tui_layer = tui_mode.then(|| TuiLogLayer::new(log_buffer.clone()));
    let stderr_layer =
        (!tui_mode).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    let (file_layer, guard) = if config.logging.file_enabled {
        match std::fs::create_dir_all(&config.logging.file_dir) {
            Ok(()) => {
                let dir = &config.logging.file_dir;
                let prefix = &config.logging.file_prefix;
                let file_appender = match config.logging.file_rotation {
                    LogRotation::Hourly => tracing_appender::rolling::hourly(dir, prefix),
                    LogRotation::Daily => tracing_appender::rolling::daily(dir, prefix),
                    LogRotation::Never => tracing_appender::rolling::never(dir, prefix),
                };
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                let layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_ansi(false);
                (Some(layer), Some(guard))
            }
            Err(e) => {
                eprintln!(
                    "Warning: Could not create log directory {:?}: {}",
                    config.logging.file_dir, e
                );
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tui_layer)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

/// Open the durable store under the data dir
fn open_store(config: &Config) -> Result<SharedStore> {
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create data dir {}", config.data_dir.display()))?;
    let store = SqliteStore::open(&config.store_path())?;
    Ok(Arc::new(store))
}

/// Where the TUI opens: the task list with a valid token, else Login
async fn startup_route(session: &Session) -> Route {
    if session.get_token().is_none() {
        return Route::Login;
    }
    if session.is_authenticated().await {
        Route::NewsTasks
    } else {
        Route::Login
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config commands work without a store or backend
    if let Some(Commands::Config {
        show,
        reset,
        edit,
        path,
    }) = cli.command
    {
        return cli::handle_config(show, reset, edit, path);
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();
    let config = Config::from_env();

    let tui_mode = cli.command.is_none() && config.enable_tui;
    let log_buffer = LogBuffer::new();
    let _file_guard = init_logging(&config, &log_buffer, tui_mode);

    let store = open_store(&config)?;
    let client = ApiClient::new(config.api_url.clone(), store.clone(), config.http.timeout())?;
    let session = Session::new(client.clone(), store.clone());

    tracing::debug!(
        "newswatch {} (api: {}, feed: {})",
        config::VERSION,
        config.api_url,
        config.ws_url
    );

    let backend = Backend {
        config,
        store,
        client,
        session,
    };

    match cli.command {
        Some(command) => cli::run(command, backend).await,
        None if !tui_mode => {
            tracing::info!("TUI disabled, tailing live results");
            cli::run(Commands::Feed, backend).await
        }
        None => {
            let Backend {
                config,
                store,
                client,
                session,
            } = backend;

            let router = Router::new();
            let route = startup_route(&session).await;
            router.navigate(route);

            let mut app = tui::app::App::new(config, client, session, router, store, log_buffer);
            if route == Route::NewsTasks {
                app.user = app.session.current_user().await;
            }

            tracing::info!("Starting TUI");
            let result = tui::run_tui(app).await;
            if let Err(e) = &result {
                tracing::error!("TUI error: {:?}", e);
            }
            tracing::info!("Shutdown complete");
            result
        }
    }
}
