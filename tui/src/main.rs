//! Noti TUI Entry Point
//!
//! Runs a toast coordinator on a terminal surface and lets you poke at it.
//!
//! # Usage
//!
//! ```bash
//! # Empty screen, press n / b to raise toasts
//! noti-tui
//!
//! # Start with 25 random toasts
//! noti-tui --burst 25
//!
//! # Queue toasts from a JSON-lines file
//! noti-tui --feed toasts.jsonl
//!
//! # Verbose logging (the terminal is busy, so logs go to a file)
//! RUST_LOG=debug noti-tui --log-file /tmp/noti.log
//! ```

use std::io;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};

use noti_core::{
    default_config_path, load_config_over, ConfigOverrides, ToastConfig, ToastManager,
};
use noti_tui::surface::terminal_defaults;
use noti_tui::{feed, App, SharedBoard, TerminalSurface, ToastBoard};

/// Noti TUI - toast notifications in your terminal
#[derive(Parser, Debug)]
#[command(name = "noti-tui")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "NOTI_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Queue this many random toasts at startup
    #[arg(short = 'b', long, default_value_t = 0)]
    burst: usize,

    /// JSON-lines file of notifications to queue at startup
    #[arg(short = 'f', long, value_name = "FILE")]
    feed: Option<PathBuf>,

    /// Log file path
    #[arg(long, env = "NOTI_LOG_FILE", value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "NOTI_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Promotion interval in milliseconds
    #[arg(long, value_name = "MS")]
    promotion_ms: Option<u64>,

    /// Progress tick resolution in milliseconds
    #[arg(long, value_name = "MS")]
    tick_ms: Option<u64>,

    /// Rows between stacked toasts
    #[arg(long, value_name = "ROWS")]
    padding: Option<u32>,

    /// Fraction of the terminal height toasts may fill
    #[arg(long, value_name = "FRACTION")]
    capacity_fraction: Option<f32>,

    /// Maximum waiting toasts (oldest dropped beyond this)
    #[arg(long, value_name = "N")]
    backlog_capacity: Option<usize>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            promotion_interval_ms: self.promotion_ms,
            tick_resolution_ms: self.tick_ms,
            padding: self.padding,
            capacity_fraction: self.capacity_fraction,
            backlog_capacity: self.backlog_capacity,
            ..ConfigOverrides::default()
        }
    }
}

/// Default log file path
fn default_log_path() -> PathBuf {
    std::env::temp_dir().join("noti-tui.log")
}

/// Initialize logging to `path` with the specified level
fn init_logging(path: &Path, level: &str) -> anyhow::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("noti_tui={level},noti_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .init();

    Ok(())
}

fn load_toast_config(args: &Args) -> anyhow::Result<ToastConfig> {
    let path = args.config.clone().or_else(default_config_path);
    let mut config =
        load_config_over(terminal_defaults(), path).context("Failed to load configuration")?;

    args.overrides().apply(&mut config);
    config.validate().context("Invalid command-line overrides")?;

    info!(source = %config.source(), "Configuration loaded");
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_path = args.log_file.clone().unwrap_or_else(default_log_path);
    init_logging(&log_path, &args.log_level)?;

    // Check if we have a TTY before attempting initialization
    use std::io::IsTerminal;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: noti-tui requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means stdin or stdout is piped, or you are");
        eprintln!("connected over SSH without -t.");
        std::process::exit(1);
    }

    let config = load_toast_config(&args)?;

    let (width, height) = crossterm::terminal::size()?;
    let board = ToastBoard::new(width, height).shared();
    let (toasts, coordinator) =
        ToastManager::spawn(TerminalSurface::new(Arc::clone(&board)), config);

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &toasts, board, &args).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    toasts.shutdown();
    if let Err(e) = coordinator.await {
        warn!(error = %e, "Coordinator task failed");
    }

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    toasts: &ToastManager,
    board: SharedBoard,
    args: &Args,
) -> anyhow::Result<()> {
    let mut app = App::new(toasts.clone(), board);
    app.burst(args.burst);

    if let Some(path) = &args.feed {
        match feed::load_feed(path, toasts).await {
            Ok(summary) => app.set_notice(format!(
                "feed: {} queued, {} skipped",
                summary.queued, summary.skipped
            )),
            Err(e) => {
                warn!(error = %e, "Feed failed");
                app.set_notice(format!("feed error: {e}"));
            }
        }
    }

    app.run(terminal).await
}
