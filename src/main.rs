//! letterdrop - drag-and-drop spelling game for dyslexic learners
//!
//! Spell the word. Drag the letters. Mind the look-alikes.

use clap::{Parser, Subcommand};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use letterdrop::app::{AppCoordinator, Screen};
use letterdrop::config::EngineConfig;
use letterdrop::game::Difficulty;
use letterdrop::logging;
use letterdrop::stats::LifetimeStats;
use letterdrop::storage::Storage;
use letterdrop::tui::{self, Tui};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Board animations need a faster tick than a clock display.
const TICK_RATE: Duration = Duration::from_millis(50);

#[derive(Parser)]
#[command(name = "letterdrop", version, about = "Drag-and-drop spelling game")]
struct Cli {
    /// Skip the menu and start at this difficulty (easy, medium, hard)
    #[arg(long)]
    difficulty: Option<Difficulty>,
    /// Seed for word order and letter pools
    #[arg(long)]
    seed: Option<u64>,
    /// Config file (JSON); defaults to the OS config directory
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log file; defaults to the OS data directory
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Play without recording history
    #[arg(long)]
    no_store: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print lifetime statistics and exit
    Stats,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(path) = cli.log_file.clone().or_else(logging::default_log_path) {
        if let Err(e) = logging::init(&path) {
            eprintln!("logging disabled: {}: {}", path.display(), e);
        }
    }

    if let Some(Command::Stats) = cli.command {
        return print_stats();
    }

    let config = EngineConfig::load(cli.config.as_deref())?;
    let storage = if cli.no_store {
        None
    } else {
        match Storage::open() {
            Ok(storage) => Some(storage),
            Err(e) => {
                warn!(error = %e, "play history unavailable, continuing without it");
                None
            }
        }
    };
    info!(seed = ?cli.seed, store = storage.is_some(), "letterdrop starting");

    let mut terminal = Tui::new()?;
    terminal.enter()?;

    let mut coordinator = AppCoordinator::new(config, storage, cli.seed);
    let (cols, rows) = terminal.size()?;
    coordinator.resize(cols, rows);
    if let Some(difficulty) = cli.difficulty {
        coordinator.start_session(difficulty);
    }

    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|frame| tui::render(frame, &coordinator))?;

        let timeout = TICK_RATE
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            match event::read()? {
                // Only handle key press events (not release)
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_key(&mut coordinator, key.code);
                }
                Event::Mouse(mouse) => handle_mouse(&mut coordinator, mouse),
                Event::Resize(cols, rows) => coordinator.resize(cols, rows),
                _ => {}
            }
        }

        let elapsed = last_tick.elapsed();
        if elapsed >= TICK_RATE {
            coordinator.tick(elapsed);
            last_tick = Instant::now();
        }

        if coordinator.should_quit {
            break;
        }
    }

    info!("letterdrop exiting");
    // Terminal cleanup happens automatically via Tui::drop
    Ok(())
}

fn handle_key(coordinator: &mut AppCoordinator, code: KeyCode) {
    match &coordinator.screen {
        Screen::Menu { .. } => match code {
            KeyCode::Up | KeyCode::Char('k') => coordinator.menu_up(),
            KeyCode::Down | KeyCode::Char('j') => coordinator.menu_down(),
            KeyCode::Enter => coordinator.menu_select(),
            KeyCode::Esc | KeyCode::Char('q') => coordinator.quit(),
            _ => {}
        },
        Screen::Playing { .. } => match code {
            KeyCode::Esc | KeyCode::Char('q') => coordinator.end_session(),
            KeyCode::Char('r') => coordinator.with_app(|app| app.on_reset()),
            KeyCode::Char('s') => coordinator.with_app(|app| app.on_skip()),
            KeyCode::Char('h') => coordinator.with_app(|app| app.toggle_word()),
            _ => {}
        },
        Screen::Results { .. } => match code {
            KeyCode::Enter => coordinator.go_to_menu(),
            KeyCode::Esc | KeyCode::Char('q') => coordinator.quit(),
            _ => {}
        },
    }
}

fn handle_mouse(coordinator: &mut AppCoordinator, mouse: MouseEvent) {
    let (col, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            coordinator.with_app(|app| app.on_mouse_down(col, row));
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            coordinator.with_app(|app| app.on_mouse_drag(col, row));
        }
        MouseEventKind::Up(MouseButton::Left) => {
            coordinator.with_app(|app| app.on_mouse_up(col, row));
        }
        _ => {}
    }
}

fn print_stats() -> Result<(), Box<dyn std::error::Error>> {
    let storage = Storage::open()?;
    let records = storage.records()?;
    let stats = LifetimeStats::from_stored(&records);
    println!("letterdrop: {} recorded events", storage.record_count()?);
    for line in stats.summary_lines() {
        println!("{}", line);
    }
    Ok(())
}
