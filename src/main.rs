// src/main.rs
mod app;
mod config;
mod controller;
mod document;
mod errors;
mod input;
mod models;
mod network;
mod prompts;
mod relay;
mod theme;
mod ui;
mod utils;

use std::{io::{Stdout, Write}, path::{Path, PathBuf}, sync::Arc, time::Duration};

use clap::Parser;
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::prelude::*;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::{non_blocking::WorkerGuard, rolling::{RollingFileAppender, Rotation}};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::config::Settings;
use crate::controller::SelectionController;
use crate::document::Document;
use crate::models::Viewport;
use crate::network::GeminiRelay;
use crate::relay::{RelayMessage, spawn_relay};

const SPINNER_TICK: Duration = Duration::from_millis(120);

#[derive(Parser, Debug)]
#[command(name = "wit", version, about = "Select text with the mouse and get a short Gemini explanation")]
struct Cli {
    /// File to display
    file: Option<PathBuf>,

    /// Display this text instead of a file
    #[arg(long, conflicts_with = "file")]
    text: Option<String>,

    /// Gemini model, overrides the config file
    #[arg(long)]
    model: Option<String>,

    /// Extra config file, merged over the user and local config
    #[arg(long)]
    config: Option<PathBuf>,
}

/// File-only logging; the terminal belongs to the UI.
fn init_tracing(log_dir: &Path) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("wit")
        .filename_suffix("log")
        .max_log_files(7)
        .build(log_dir)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(guard)
}

/// Raw mode plus the alternate screen with mouse capture. Dropping it puts the
/// terminal back, so every early return after [`TerminalGuard::enter`] restores it.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> anyhow::Result<Self> {
        terminal::enable_raw_mode()?;
        let guard = TerminalGuard;
        execute!(std::io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal(&mut std::io::stdout());
    }
}

/// Best effort; safe to call more than once.
fn restore_terminal(out: &mut impl Write) {
    let _ = terminal::disable_raw_mode();
    let _ = execute!(out, LeaveAlternateScreen, DisableMouseCapture, cursor::Show);
}

/// Restores the terminal before the default hook prints the panic message.
fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal(&mut std::io::stdout());
        previous(info);
    }));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::new(cli.config.as_deref())?;
    if let Some(model) = cli.model {
        settings.gemini_model = model;
    }
    let _guard = init_tracing(&settings.log_dir())?;

    let document = match (cli.file, cli.text) {
        (Some(path), _) => Document::from_path(&path)?,
        (None, Some(text)) => Document::from_text("text", &text),
        (None, None) => anyhow::bail!("nothing to show: pass a FILE or --text"),
    };

    if settings.api_key().is_none() {
        warn!("no Gemini API key configured; explanations will fail");
    }
    info!(model = %settings.gemini_model, "starting");

    let cancel = CancellationToken::new();
    let (relay, mut messages, relay_task) = spawn_relay(Arc::new(GeminiRelay::new(&settings)), cancel.clone());

    let (cols, rows) = terminal::size()?;
    let controller = SelectionController::new(relay, settings.popup, Viewport::new(cols as i32, rows as i32));
    let mut app = App::new(document, controller, Rect::new(0, 0, cols, rows));

    install_panic_hook();
    let guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(std::io::stdout()))?;

    let result = run_app(&mut terminal, &mut app, &mut messages).await;

    drop(terminal);
    drop(guard);

    cancel.cancel();
    let _ = relay_task.await;
    info!("stopped");
    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    messages: &mut UnboundedReceiver<RelayMessage>,
) -> anyhow::Result<()> {
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(SPINNER_TICK);

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        tokio::select! {
            _ = ticker.tick() => app.tick = app.tick.wrapping_add(1),
            Some(message) = messages.recv() => app.controller.on_relay_message(message),
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) => {
                    if !input::handle_key(app, key) {
                        break;
                    }
                }
                Some(Ok(Event::Mouse(mouse))) => input::handle_mouse(app, mouse),
                Some(Ok(Event::Resize(cols, rows))) => app.resize(cols, rows),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
        }
    }
    Ok(())
}
