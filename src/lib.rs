//! letterdrop - drag-and-drop spelling game for dyslexic learners
//!
//! Spell the word. Drag the letters. Mind the look-alikes.

pub mod app;
pub mod config;
pub mod game;
pub mod logging;
pub mod stats;
pub mod storage;
pub mod tui;
