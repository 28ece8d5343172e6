//! Per-difficulty word lists
//!
//! Lists are embedded at build time, one lowercase word per line. Blank
//! lines and `#` comments are skipped.

use once_cell::sync::Lazy;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static EASY_DATA: &str = include_str!("../../data/easy.txt");
static MEDIUM_DATA: &str = include_str!("../../data/medium.txt");
static HARD_DATA: &str = include_str!("../../data/hard.txt");

static EASY_WORDS: Lazy<Vec<&'static str>> = Lazy::new(|| parse_list(EASY_DATA));
static MEDIUM_WORDS: Lazy<Vec<&'static str>> = Lazy::new(|| parse_list(MEDIUM_DATA));
static HARD_WORDS: Lazy<Vec<&'static str>> = Lazy::new(|| parse_list(HARD_DATA));

fn parse_list(data: &'static str) -> Vec<&'static str> {
    data.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn all() -> &'static [Difficulty] {
        &[Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn words(&self) -> &'static [&'static str] {
        match self {
            Difficulty::Easy => EASY_WORDS.as_slice(),
            Difficulty::Medium => MEDIUM_WORDS.as_slice(),
            Difficulty::Hard => HARD_WORDS.as_slice(),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {}", other)),
        }
    }
}

/// Words not yet played this session. Draws are uniform and without
/// replacement.
#[derive(Debug, Clone)]
pub struct WordPool {
    remaining: Vec<String>,
}

impl WordPool {
    pub fn new(difficulty: Difficulty) -> Self {
        Self::from_words(difficulty.words().iter().copied())
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            remaining: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Remove and return a random word, or `None` once exhausted.
    pub fn draw<R: Rng>(&mut self, rng: &mut R) -> Option<String> {
        if self.remaining.is_empty() {
            return None;
        }
        let idx = rng.random_range(0..self.remaining.len());
        Some(self.remaining.swap_remove(idx))
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }
}
