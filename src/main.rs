use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chatbox_core::Config;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod bridge;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "chatbox")]
#[command(about = "Terminal chat client for the personal assistant backend")]
#[command(version)]
struct Cli {
    /// Backend base URL (overrides CHATBOX_URL and the config file)
    #[arg(short, long)]
    url: Option<String>,

    /// Session identifier forwarded with chat messages
    #[arg(long)]
    user_id: Option<String>,

    /// Where to write logs
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Store the effective settings in the config file and exit
    #[arg(long)]
    save_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()
        .context("Failed to load config")?
        .with_env();
    if let Some(url) = cli.url {
        config.base_url = Some(url);
    }
    if let Some(user_id) = cli.user_id {
        config.user_id = Some(user_id);
    }

    if cli.save_config {
        config.save().context("Failed to save config")?;
        println!(
            "Saved config to {}",
            Config::config_path()?.display()
        );
        return Ok(());
    }

    let log_path = match cli.log_file {
        Some(path) => path,
        None => Config::config_dir()?.join("chatbox.log"),
    };
    init_logging(&log_path)?;
    info!("connecting to {}", config.base_url());

    let backend = config.backend()?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(backend, events.sender());

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    info!("exiting");
    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}

/// The terminal belongs to the UI, so diagnostics go to a file
fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env("CHATBOX_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
