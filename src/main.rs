//! kwdash - Keyword research dashboard
//!
//! A terminal UI application that looks up keyword metrics and ideas from
//! RapidAPI keyword services, caches every response on disk, and shows the
//! results as tables and charts.

use std::fs::{self, OpenOptions};
use std::io;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::error::TryRecvError;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kwdash::app::{App, AppState};
use kwdash::cli::{Cli, OutputMode, StartupConfig};
use kwdash::data::KeywordClient;
use kwdash::pipeline::{LoadHandle, Pipeline};
use kwdash::{report, ui};

/// Log file name inside the cache directory (dashboard mode)
const LOG_FILE: &str = "kwdash.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kwdash=info"))
}

/// Sends logs to stderr in plain mode and to a file under the cache directory
/// otherwise, so log lines never land on the alternate screen.
fn init_logging(output: OutputMode, cache_dir: &Path) {
    match output {
        OutputMode::Plain => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(io::stderr)
                .try_init();
        }
        OutputMode::Dashboard => {
            let file = fs::create_dir_all(cache_dir).and_then(|_| {
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(cache_dir.join(LOG_FILE))
            });
            match file {
                Ok(file) => {
                    let _ = tracing_subscriber::fmt()
                        .with_env_filter(env_filter())
                        .with_ansi(false)
                        .with_writer(Mutex::new(file))
                        .try_init();
                }
                Err(_) => {
                    let _ = tracing_subscriber::fmt()
                        .with_env_filter(env_filter())
                        .with_writer(io::sink)
                        .try_init();
                }
            }
        }
    }
}

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Renders the UI based on the current application state
fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    match app.state {
        AppState::Loading => {
            render_loading(frame, app);
        }
        AppState::Dashboard => {
            ui::render_dashboard(frame, app);
        }
    }

    if app.show_help {
        ui::render_help_overlay(frame);
    }
}

/// Renders a loading message while the first query is running
fn render_loading(frame: &mut ratatui::Frame, app: &App) {
    use ratatui::{
        layout::{Alignment, Constraint, Direction, Layout},
        style::{Color, Style},
        widgets::Paragraph,
    };

    let area = frame.area();

    // Center the loading message vertically
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(3),
            Constraint::Percentage(45),
        ])
        .split(area);

    let message = match app.selected_slot() {
        Some(slot) => format!("Loading {}...", slot.query()),
        None => "Loading keyword data...".to_string(),
    };
    let loading_text = Paragraph::new(message)
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);

    frame.render_widget(loading_text, chunks[1]);
}

async fn run_plain(pipeline: Pipeline, config: &StartupConfig) {
    let outcomes = pipeline.run_all(&config.queries).await;
    print!("{}", report::render(&outcomes));
}

async fn run_dashboard(
    pipeline: Pipeline,
    config: StartupConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let export_dir = config.export_dir.unwrap_or_else(|| PathBuf::from("."));
    let mut app = App::new(config.queries.clone(), export_dir);
    let mut loader = LoadHandle::spawn(pipeline, config.queries);

    // Main event loop
    loop {
        // Apply everything the loader has produced so far
        loop {
            match loader.receiver.try_recv() {
                Ok(message) => app.apply(message),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        // Render UI
        terminal.draw(|f| render_ui(f, &app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = match StartupConfig::from_cli(cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };

    init_logging(config.output, &config.cache_dir);
    info!(
        source = %config.source,
        queries = config.queries.len(),
        cache_dir = %config.cache_dir.display(),
        "starting kwdash"
    );

    let client = KeywordClient::new(config.api_key.take(), config.timeout)?;
    let pipeline = Pipeline::new(client, config.cache())
        .with_refresh(config.refresh)
        .with_export_dir(config.export_dir.clone());

    match config.output {
        OutputMode::Plain => run_plain(pipeline, &config).await,
        OutputMode::Dashboard => run_dashboard(pipeline, config).await?,
    }

    Ok(())
}
