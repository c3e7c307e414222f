mod app;
mod board;
mod config;
mod error;
mod filter;
mod overlays;
mod panels;
mod store;
mod task;
mod ui;

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
    },
};
use ratatui::prelude::*;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use app::App;
use config::Config;
use store::FileStore;

/// Four-quadrant priority matrix for the terminal.
#[derive(Parser)]
#[command(name = "quadrant", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the stored board (overrides the config).
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Open the interactive board (default).
    Tui,

    /// Write the board as JSON.
    Export {
        /// Output file; defaults to priority-matrix-<date>.json in the export dir.
        path: Option<PathBuf>,
    },

    /// Replace the board with a previously exported file.
    Import { path: PathBuf },

    /// Print the board as plain text.
    Print,

    /// Write the effective configuration to the config path.
    InitConfig,

    /// Remove every task.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(Config::default_config_path);
    let mut config = Config::load_or_default(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    let _guard = init_logging(&config)?;
    info!(data_dir = %config.data_dir.display(), "starting");

    let store = FileStore::new(config.data_dir.clone());

    match cli.command.unwrap_or(Command::Tui) {
        Command::Tui => run_tui(store, &config)?,
        Command::Export { path } => {
            let board = store::load_board(&store, &config.storage_key);
            let path = path.unwrap_or_else(|| {
                config
                    .export_dir
                    .join(store::default_export_name(Local::now().date_naive()))
            });
            store::export_json(&board, &path)
                .with_context(|| format!("exporting to {}", path.display()))?;
            println!("Exported {} tasks to {}", board.total(), path.display());
        }
        Command::Import { path } => {
            let board = store::import_json(&path).context("Could not import file")?;
            store::save_board(&store, &config.storage_key, &board)?;
            println!("Imported {} tasks", board.total());
        }
        Command::Print => {
            let board = store::load_board(&store, &config.storage_key);
            print!("{}", ui::plain_text(&board, Local::now().date_naive()));
        }
        Command::InitConfig => {
            config
                .save_to_file(&config_path)
                .with_context(|| format!("writing {}", config_path.display()))?;
            println!("Wrote {}", config_path.display());
        }
        Command::Clear { yes } => {
            if yes || confirm("Clear all tasks?")? {
                store::clear_board(&store, &config.storage_key)?;
                println!("Cleared all tasks");
            }
        }
    }

    Ok(())
}

/// The terminal belongs to the UI, so logs go to `<data_dir>/quadrant.log`.
fn init_logging(config: &Config) -> anyhow::Result<WorkerGuard> {
    fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating {}", config.data_dir.display()))?;
    let appender = tracing_appender::rolling::never(&config.data_dir, "quadrant.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}

fn confirm(question: &str) -> io::Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn run_tui(store: FileStore, config: &Config) -> anyhow::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, SetTitle("quadrant"))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(Box::new(store), config);
    let result = run(&mut terminal, &mut app, config);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.map_err(Into::into)
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    config: &Config,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(config.tick_rate_ms.max(10));

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        app.tick();

        if app.should_quit {
            break;
        }
    }

    info!("quitting");
    Ok(())
}
