//! Application state management

use crate::app::geometry::{BoardGeometry, CELL_H, CELL_W};
use crate::game::{Difficulty, EngineEvent, Phase, Session, TileId};
use crate::storage::{PlayRecord, Storage};
use std::time::Duration;
use tracing::warn;

/// A word spelled correctly, with its point value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolvedWord {
    pub word: String,
    pub points: u32,
    pub attempts: u32,
}

/// An incorrect answer and the word it was meant to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissedWord {
    pub word: String,
    pub attempt: String,
}

/// End-of-session summary
#[derive(Debug, Clone, Default)]
pub struct RoundSummary {
    pub difficulty: Difficulty,
    pub total_score: u32,
    pub solved: Vec<SolvedWord>,
    pub skipped: Vec<String>,
    pub missed: Vec<MissedWord>,
    /// False when the player left before the word list ran out.
    pub completed: bool,
}

impl RoundSummary {
    pub fn solved_count(&self) -> usize {
        self.solved.len()
    }

    pub fn miss_count(&self) -> usize {
        self.missed.len()
    }
}

/// How feedback text should be colored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Neutral,
    Good,
    Bad,
}

/// A tile being dragged and the cell the pointer was last seen in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PointerDrag {
    tile: TileId,
    last: (u16, u16),
}

/// One playing session as seen by the terminal host
pub struct App {
    session: Session,
    geometry: Option<BoardGeometry>,
    drag: Option<PointerDrag>,
    /// Feedback message from the last thing that happened
    pub feedback: String,
    pub tone: Tone,
    /// Whether the target word is printed above the slots
    pub show_word: bool,
    /// Incorrect attempts on the current word
    attempts: u32,
    summary: RoundSummary,
    ended: bool,
    storage: Option<Storage>,
}

impl App {
    /// Wrap a fresh session. Nothing is drawn until [`App::start`].
    pub fn new(session: Session, storage: Option<Storage>) -> Self {
        let summary = RoundSummary {
            difficulty: session.difficulty(),
            ..RoundSummary::default()
        };
        Self {
            session,
            geometry: None,
            drag: None,
            feedback: String::new(),
            tone: Tone::Neutral,
            show_word: true,
            attempts: 0,
            summary,
            ended: false,
            storage,
        }
    }

    pub fn start(&mut self) {
        self.record(PlayRecord::SessionStart {
            difficulty: self.session.difficulty(),
        });
        let events = self.session.start();
        self.handle_events(events);
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn geometry(&self) -> Option<&BoardGeometry> {
        self.geometry.as_ref()
    }

    pub fn dragging(&self) -> Option<TileId> {
        self.drag.map(|d| d.tile)
    }

    pub fn summary(&self) -> &RoundSummary {
        &self.summary
    }

    /// True once the word list is exhausted or the player has left.
    pub fn is_over(&self) -> bool {
        self.ended
    }

    /// The terminal was resized (or measured for the first time).
    pub fn on_resize(&mut self, cols: u16, rows: u16) {
        let geometry = BoardGeometry::compute(cols, rows, self.session.config());
        self.session.set_viewport(geometry.screen_area());
        self.session.measure_play_area(geometry.play_area());
        self.geometry = Some(geometry);
    }

    /// Pick up the topmost tile under the pointer.
    pub fn on_mouse_down(&mut self, col: u16, row: u16) {
        let Some(geometry) = self.geometry else {
            return;
        };
        if self.drag.is_some() {
            return;
        }
        let hit = self
            .session
            .tiles()
            .iter()
            .rev()
            .filter(|t| t.is_positioned())
            .find(|t| BoardGeometry::contains(geometry.tile_rect(t.position), col, row))
            .map(|t| t.id);
        let Some(tile) = hit else {
            return;
        };

        let events = self.session.drag_start(tile);
        if self.session.tiles().iter().any(|t| t.id == tile && t.is_dragging()) {
            self.drag = Some(PointerDrag {
                tile,
                last: (col, row),
            });
        }
        self.handle_events(events);
    }

    pub fn on_mouse_drag(&mut self, col: u16, row: u16) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let dx = (f32::from(col) - f32::from(drag.last.0)) * CELL_W;
        let dy = (f32::from(row) - f32::from(drag.last.1)) * CELL_H;
        drag.last = (col, row);
        let tile = drag.tile;
        self.session.drag_move(tile, dx, dy);
    }

    pub fn on_mouse_up(&mut self, col: u16, row: u16) {
        let (Some(drag), Some(geometry)) = (self.drag.take(), self.geometry) else {
            return;
        };
        let release = geometry.cell_center(col, row);
        let events = self.session.drag_end(drag.tile, release);
        self.handle_events(events);
    }

    pub fn on_reset(&mut self) {
        self.drag = None;
        let events = self.session.reset();
        self.handle_events(events);
    }

    pub fn on_skip(&mut self) {
        self.drag = None;
        let events = self.session.skip();
        self.handle_events(events);
    }

    pub fn toggle_word(&mut self) {
        self.show_word = !self.show_word;
    }

    /// Advance the session clock.
    pub fn tick(&mut self, elapsed: Duration) {
        let events = self.session.tick(elapsed);
        self.handle_events(events);
    }

    /// End the session early. Safe to call more than once.
    pub fn quit(&mut self) {
        if !self.ended {
            self.finish(false);
        }
    }

    fn handle_events(&mut self, events: Vec<EngineEvent>) {
        for event in events {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::WordStarted { remaining, .. } => {
                self.attempts = 0;
                self.drag = None;
                self.say(Tone::Neutral, format!("New word! {} left after this one", remaining));
            }
            EngineEvent::SlotCleared { slot, .. } => {
                self.say(Tone::Neutral, format!("Slot {} emptied", slot + 1));
            }
            EngineEvent::DropAccepted { .. } => {
                if self.session.phase() == Phase::Evaluating {
                    self.say(Tone::Neutral, "Checking...".to_string());
                } else {
                    self.feedback.clear();
                }
            }
            EngineEvent::DropRejected { reason, .. } => {
                self.say(Tone::Bad, format!("Missed: {}", reason));
            }
            EngineEvent::Correct { word, points } => {
                self.summary.solved.push(SolvedWord {
                    word: word.clone(),
                    points,
                    attempts: self.attempts + 1,
                });
                self.record(PlayRecord::WordSolved {
                    word: word.clone(),
                    points,
                    attempts: self.attempts + 1,
                });
                self.say(Tone::Good, format!("CORRECT! {} +{}", word.to_uppercase(), points));
            }
            EngineEvent::Incorrect { word, attempt } => {
                self.attempts += 1;
                self.summary.missed.push(MissedWord {
                    word: word.clone(),
                    attempt: attempt.clone(),
                });
                self.record(PlayRecord::WordMissed {
                    word,
                    attempt: attempt.clone(),
                });
                self.say(Tone::Bad, format!("Not quite: {}. Try again", attempt));
            }
            EngineEvent::BoardReset => {
                self.say(Tone::Neutral, "Board cleared".to_string());
            }
            EngineEvent::Skipped { word } => {
                self.summary.skipped.push(word.clone());
                self.record(PlayRecord::WordSkipped { word: word.clone() });
                self.say(Tone::Neutral, format!("Skipped {}", word.to_uppercase()));
            }
            EngineEvent::ScoreChanged { total, .. } => {
                self.summary.total_score = total;
            }
            EngineEvent::RoundComplete { score, .. } => {
                self.summary.total_score = score;
                self.finish(true);
            }
        }
    }

    fn finish(&mut self, completed: bool) {
        self.ended = true;
        self.drag = None;
        self.summary.completed = completed;
        self.record(PlayRecord::SessionEnd {
            difficulty: self.session.difficulty(),
            score: self.session.score(),
            solved: self.session.solved_count(),
            skipped: self.session.skipped_count(),
            misses: self.session.miss_count(),
            completed,
        });
    }

    fn say(&mut self, tone: Tone, message: String) {
        self.tone = tone;
        self.feedback = message;
    }

    fn record(&self, record: PlayRecord) {
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.append(&record) {
                warn!(error = %e, kind = record.kind(), "failed to record play event");
            }
        }
    }

    /// Give the storage handle back to the caller.
    pub fn take_storage(&mut self) -> Option<Storage> {
        self.storage.take()
    }
}
