//! Application state and core logic

pub mod geometry;
pub mod screen;
pub mod state;

pub use geometry::BoardGeometry;
pub use screen::{AppCoordinator, MenuOption, Screen};
pub use state::{App, MissedWord, RoundSummary, SolvedWord, Tone};
