//! Letter tiles, answer slots and the geometry they live in

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Process-wide serial; together with the issue timestamp it keeps ids unique
/// across repeated generations.
static NEXT_TILE_SERIAL: AtomicU32 = AtomicU32::new(1);

/// A point in board coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// A measured rectangle size (play area or screen).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Area {
    pub width: f32,
    pub height: f32,
}

impl Area {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True once both dimensions have been measured.
    pub fn is_measured(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Unique identifier of a letter tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId {
    issued_ms: u64,
    serial: u32,
}

impl TileId {
    /// Issue a fresh id.
    pub fn next() -> Self {
        let issued_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let serial = NEXT_TILE_SERIAL.fetch_add(1, Ordering::Relaxed);
        Self { issued_ms, serial }
    }

    pub fn serial(&self) -> u32 {
        self.serial
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{:x}-{}", self.issued_ms, self.serial)
    }
}

/// Where a tile is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileState {
    /// Generated but not laid out yet; has no home position.
    InPool,
    /// Resting at its home position.
    AtHome,
    /// Following the pointer.
    Dragging,
    /// Occupying the answer slot with this index.
    Consumed { slot: usize },
}

/// One draggable letter.
#[derive(Debug, Clone, PartialEq)]
pub struct LetterTile {
    pub id: TileId,
    pub letter: char,
    pub position: Point,
    pub home: Option<Point>,
    pub state: TileState,
}

impl LetterTile {
    /// Create a tile with a fresh id. The letter is uppercased.
    pub fn new(letter: char) -> Self {
        Self {
            id: TileId::next(),
            letter: letter.to_ascii_uppercase(),
            position: Point::default(),
            home: None,
            state: TileState::InPool,
        }
    }

    pub fn is_positioned(&self) -> bool {
        self.home.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, TileState::Dragging)
    }

    pub fn is_consumed(&self) -> bool {
        matches!(self.state, TileState::Consumed { .. })
    }

    /// Slot index the tile occupies, if any.
    pub fn slot(&self) -> Option<usize> {
        match self.state {
            TileState::Consumed { slot } => Some(slot),
            _ => None,
        }
    }

    /// Snap the live position back to home.
    pub(crate) fn return_home(&mut self) {
        if let Some(home) = self.home {
            self.position = home;
        }
    }
}

/// One blank in the answer row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSlot {
    pub index: usize,
    /// Letter the slot expects. Only used for hints; matching is positional.
    pub expected: char,
    pub occupant: Option<TileId>,
}

impl AnswerSlot {
    pub fn new(index: usize, expected: char) -> Self {
        Self {
            index,
            expected: expected.to_ascii_uppercase(),
            occupant: None,
        }
    }

    pub fn is_filled(&self) -> bool {
        self.occupant.is_some()
    }

    pub fn clear(&mut self) {
        self.occupant = None;
    }
}

/// One slot per character of the word, in order.
pub fn slots_for_word(word: &str) -> Vec<AnswerSlot> {
    word.chars()
        .enumerate()
        .map(|(index, ch)| AnswerSlot::new(index, ch))
        .collect()
}
