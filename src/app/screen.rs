//! Application screen state management
//!
//! Handles transitions between the application screens:
//! - Main menu (difficulty select and lifetime stats)
//! - Playing a session
//! - End of session results

use crate::config::EngineConfig;
use crate::game::{Difficulty, Session};
use crate::stats::LifetimeStats;
use crate::storage::Storage;
use std::time::Duration;
use tracing::{info, warn};

use super::state::{App, RoundSummary};

/// Menu option on the main screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    Play(Difficulty),
    Quit,
}

impl MenuOption {
    /// Get all menu options in order
    pub fn all() -> &'static [MenuOption] {
        &[
            MenuOption::Play(Difficulty::Easy),
            MenuOption::Play(Difficulty::Medium),
            MenuOption::Play(Difficulty::Hard),
            MenuOption::Quit,
        ]
    }

    /// Get the display label for this option
    pub fn label(&self) -> &'static str {
        match self {
            MenuOption::Play(Difficulty::Easy) => "Play Easy",
            MenuOption::Play(Difficulty::Medium) => "Play Medium",
            MenuOption::Play(Difficulty::Hard) => "Play Hard",
            MenuOption::Quit => "Quit",
        }
    }
}

/// The current application screen
pub enum Screen {
    /// Main menu
    Menu { selected: usize },
    /// Playing a session
    Playing { app: Box<App> },
    /// End of session results
    Results { summary: RoundSummary },
}

/// Main application coordinator
pub struct AppCoordinator {
    /// Current screen
    pub screen: Screen,
    /// Whether the application should quit
    pub should_quit: bool,
    config: EngineConfig,
    /// Fixed RNG seed, for reproducible sessions
    seed: Option<u64>,
    /// Play log; `None` when running without persistence
    storage: Option<Storage>,
    /// Replayed from the play log whenever the menu is shown
    pub stats: LifetimeStats,
    /// Last known terminal size
    viewport: (u16, u16),
}

impl AppCoordinator {
    /// Create a new app coordinator starting at the menu
    pub fn new(config: EngineConfig, storage: Option<Storage>, seed: Option<u64>) -> Self {
        let mut coordinator = Self {
            screen: Screen::Menu { selected: 0 },
            should_quit: false,
            config,
            seed,
            storage,
            stats: LifetimeStats::default(),
            viewport: (0, 0),
        };
        coordinator.refresh_stats();
        coordinator
    }

    /// Quit the application, closing any session in progress
    pub fn quit(&mut self) {
        if let Screen::Playing { app } = &mut self.screen {
            app.quit();
        }
        self.should_quit = true;
    }

    /// Go back to the main menu
    pub fn go_to_menu(&mut self) {
        self.refresh_stats();
        self.screen = Screen::Menu { selected: 0 };
    }

    pub fn has_storage(&self) -> bool {
        self.storage.is_some()
    }

    fn refresh_stats(&mut self) {
        let Some(storage) = &self.storage else {
            return;
        };
        match storage.records() {
            Ok(records) => self.stats = LifetimeStats::from_stored(&records),
            Err(e) => warn!(error = %e, "could not read play log"),
        }
    }

    /// Handle menu navigation (up)
    pub fn menu_up(&mut self) {
        if let Screen::Menu { selected } = &mut self.screen {
            *selected = selected.saturating_sub(1);
        }
    }

    /// Handle menu navigation (down)
    pub fn menu_down(&mut self) {
        if let Screen::Menu { selected } = &mut self.screen {
            if *selected < MenuOption::all().len() - 1 {
                *selected += 1;
            }
        }
    }

    /// Handle menu selection (Enter)
    pub fn menu_select(&mut self) {
        let Screen::Menu { selected } = &self.screen else {
            return;
        };
        match MenuOption::all()[*selected] {
            MenuOption::Play(difficulty) => self.start_session(difficulty),
            MenuOption::Quit => self.quit(),
        }
    }

    /// Start playing straight away, skipping the menu
    pub fn start_session(&mut self, difficulty: Difficulty) {
        let config = self.config.clone();
        let session = match self.seed {
            Some(seed) => Session::with_seed(difficulty, config, seed),
            None => Session::new(difficulty, config),
        };
        info!(%difficulty, seed = ?self.seed, "starting session");
        let mut app = App::new(session, self.storage.take());
        let (cols, rows) = self.viewport;
        if cols > 0 && rows > 0 {
            app.on_resize(cols, rows);
        }
        app.start();
        self.screen = Screen::Playing { app: Box::new(app) };
        self.check_finished();
    }

    /// Leave the current session and show its results
    pub fn end_session(&mut self) {
        if let Screen::Playing { app } = &mut self.screen {
            app.quit();
        }
        self.check_finished();
    }

    /// Move to the results screen once the session is over
    fn check_finished(&mut self) {
        let Screen::Playing { app } = &mut self.screen else {
            return;
        };
        if !app.is_over() {
            return;
        }
        let summary = app.summary().clone();
        self.storage = app.take_storage();
        self.screen = Screen::Results { summary };
        self.refresh_stats();
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.viewport = (cols, rows);
        if let Screen::Playing { app } = &mut self.screen {
            app.on_resize(cols, rows);
        }
    }

    /// Run `f` against the live session, if any, then check whether it ended
    pub fn with_app(&mut self, f: impl FnOnce(&mut App)) {
        if let Screen::Playing { app } = &mut self.screen {
            f(app);
        }
        self.check_finished();
    }

    /// Advance the clock of the live session
    pub fn tick(&mut self, elapsed: Duration) {
        self.with_app(|app| app.tick(elapsed));
    }
}
