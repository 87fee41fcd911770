//! Terminal front end for the leveling notes overlay
//!
//! Polls the backend, prints the notes for the current zone and level, and
//! reads timer/copy commands from stdin.

mod clipboard;
mod repl;
mod terminal;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use actnotes_core::{AppConfig, HttpBackend, OverlayController, SystemClock, resolve_client};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::filter::EnvFilter;

use crate::clipboard::ArboardClipboard;
use crate::terminal::TerminalSurface;

#[derive(Parser, Debug)]
#[command(version, about = "Leveling notes overlay")]
struct Args {
    /// Backend base URL
    #[arg(long)]
    server: Option<String>,
    /// Client to poll
    #[arg(long)]
    client: Option<String>,
    /// Page URL carrying a `client` query parameter
    #[arg(long)]
    page_url: Option<String>,
    /// Config file (default: the per-user config)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Index of legacy helper files to load before the notes (e.g. `/helper`)
    #[arg(long, conflicts_with = "no_helpers")]
    helper_index: Option<String>,
    /// Skip the legacy helper files, even if the config file lists an index
    #[arg(long)]
    no_helpers: bool,
    /// Fixed delay between polls
    #[arg(long)]
    poll_interval_ms: Option<u64>,
    /// Print every timer change instead of only the first
    #[arg(long)]
    follow_timer: bool,
}

impl Args {
    fn apply(&self, config: &mut AppConfig) -> Result<(), String> {
        if let Some(server) = &self.server {
            config.server_url = server.clone();
        }
        config.client = resolve_client(
            self.client.as_deref(),
            self.page_url.as_deref(),
            &config.client,
        )
        .map_err(|e| e.to_string())?;
        if let Some(index) = &self.helper_index {
            config.helper_index = Some(index.clone());
        }
        if self.no_helpers {
            config.helper_index = None;
        }
        if self.poll_interval_ms.is_some() {
            config.poll_interval_ms = self.poll_interval_ms;
        }
        Ok(())
    }
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    // Keep stdout for the overlay itself
    if let Ok(path) = std::env::var("ACTNOTES_LOG_PATH") {
        if let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(file)
                .init();
            return;
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_logging();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::load_path(path).map_err(|e| e.to_string())?,
        None => AppConfig::load(),
    };
    args.apply(&mut config)?;

    let backend =
        HttpBackend::new(&config.server_url, config.request_timeout()).map_err(|e| e.to_string())?;
    let mut controller = OverlayController::new(
        config,
        Arc::new(backend),
        Box::new(TerminalSurface::stdout(args.follow_timer)),
        Box::new(ArboardClipboard),
        Arc::new(SystemClock),
    );

    // A load failure is already on screen; keep going without notes
    let client = controller.client().to_string();
    match controller.init().await {
        Ok(count) => info!(client = %client, rules = count, "Overlay started"),
        Err(e) => warn!(client = %client, error = %e, "Overlay started without notes"),
    }

    loop {
        let line = tokio::task::spawn_blocking(repl::readline)
            .await
            .map_err(|e| e.to_string())??;
        let Some(line) = line else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match repl::respond(line, &mut controller).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                write!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    controller.dispose();
    Ok(())
}
