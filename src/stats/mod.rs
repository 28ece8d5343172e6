//! Lifetime statistics
//!
//! Stats are never stored directly; they are replayed from the play log so
//! that the log stays the single source of truth. Replay is deterministic:
//! the same records in the same order always give the same numbers.

use crate::game::Difficulty;
use crate::storage::{PlayRecord, StoredRecord};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LifetimeStats {
    pub sessions: u32,
    /// Sessions that ran through the whole word list.
    pub completed_sessions: u32,
    pub words_solved: u32,
    pub words_skipped: u32,
    pub incorrect_attempts: u32,
    pub total_score: u64,
    pub best_session_score: u32,
    pub best_by_difficulty: HashMap<Difficulty, u32>,
    /// Longest word solved; ties keep the earliest.
    pub longest_word: Option<String>,
    /// Solved on the first try.
    pub first_try_solves: u32,
}

impl LifetimeStats {
    /// Replay records in log order.
    pub fn replay<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a PlayRecord>,
    {
        let mut stats = LifetimeStats::default();
        for record in records {
            stats.apply(record);
        }
        stats
    }

    /// Replay stored records in log order.
    pub fn from_stored(records: &[StoredRecord]) -> Self {
        Self::replay(records.iter().map(|r| &r.record))
    }

    fn apply(&mut self, record: &PlayRecord) {
        match record {
            PlayRecord::SessionStart { .. } => self.sessions += 1,
            PlayRecord::WordSolved {
                word,
                points,
                attempts,
            } => {
                self.words_solved += 1;
                self.total_score += u64::from(*points);
                if *attempts <= 1 {
                    self.first_try_solves += 1;
                }
                let longer = self
                    .longest_word
                    .as_ref()
                    .map_or(true, |w| word.chars().count() > w.chars().count());
                if longer {
                    self.longest_word = Some(word.clone());
                }
            }
            PlayRecord::WordSkipped { .. } => self.words_skipped += 1,
            PlayRecord::WordMissed { .. } => self.incorrect_attempts += 1,
            PlayRecord::SessionEnd {
                difficulty,
                score,
                completed,
                ..
            } => {
                if *completed {
                    self.completed_sessions += 1;
                }
                self.best_session_score = self.best_session_score.max(*score);
                let best = self.best_by_difficulty.entry(*difficulty).or_insert(0);
                *best = (*best).max(*score);
            }
        }
    }

    /// Fraction of evaluated answers that were correct.
    pub fn accuracy(&self) -> Option<f64> {
        let evaluated = self.words_solved + self.incorrect_attempts;
        if evaluated == 0 {
            None
        } else {
            Some(f64::from(self.words_solved) / f64::from(evaluated))
        }
    }

    pub fn best_for(&self, difficulty: Difficulty) -> u32 {
        self.best_by_difficulty.get(&difficulty).copied().unwrap_or(0)
    }

    /// Human-readable summary, one stat per line.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Sessions played:    {} ({} completed)", self.sessions, self.completed_sessions),
            format!("Words solved:       {}", self.words_solved),
            format!("  first try:        {}", self.first_try_solves),
            format!("Words skipped:      {}", self.words_skipped),
            format!("Incorrect attempts: {}", self.incorrect_attempts),
            format!("Total score:        {}", self.total_score),
            format!("Best session:       {}", self.best_session_score),
        ];
        for difficulty in Difficulty::all() {
            lines.push(format!(
                "  best {:<6}        {}",
                difficulty.label(),
                self.best_for(*difficulty)
            ));
        }
        if let Some(accuracy) = self.accuracy() {
            lines.push(format!("Accuracy:           {:.0}%", accuracy * 100.0));
        }
        if let Some(word) = &self.longest_word {
            lines.push(format!("Longest word:       {}", word.to_uppercase()));
        }
        lines
    }
}
