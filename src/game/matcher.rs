//! Placement matching: drag lifecycle, drop resolution and answer evaluation
//!
//! [`RoundState`] owns the tiles and slots of one word. Drops are resolved
//! against an estimated slot row (index, slot width, margin and centering on
//! the screen) rather than measured widget geometry, so the host only has to
//! draw slots where [`slot_center_x`] says they are.

use super::layout::apply_layout;
use super::tile::{slots_for_word, AnswerSlot, Area, LetterTile, Point, TileId, TileState};
use crate::config::EngineConfig;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a drag could not start or continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DragError {
    #[error("no tile {0} in this round")]
    UnknownTile(TileId),
    #[error("tile {0} has not been laid out yet")]
    NotPositioned(TileId),
    #[error("another tile is already being dragged")]
    AnotherDragActive,
    #[error("tile {0} is not being dragged")]
    NotDragging(TileId),
}

/// Why a released tile did not land in a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DropMiss {
    #[error("every answer slot is already filled")]
    NoEmptySlot,
    #[error("released outside the answer band")]
    OutsideAnswerBand,
}

/// Result of comparing the filled answer with the target word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect { attempt: String },
}

/// Vertical band (top, bottom) in which a release counts as an answer drop.
pub fn answer_band(screen: Area, config: &EngineConfig) -> (f32, f32) {
    (
        screen.height * config.answer_band_top,
        screen.height * config.answer_band_bottom,
    )
}

/// Estimated horizontal center of slot `index` in a centered row of
/// `slot_count` slots.
pub fn slot_center_x(index: usize, slot_count: usize, screen_width: f32, config: &EngineConfig) -> f32 {
    let pitch = config.slot_width + 2.0 * config.slot_margin;
    let row_width = slot_count as f32 * pitch;
    let row_start = screen_width / 2.0 - row_width / 2.0;
    row_start + index as f32 * pitch + config.slot_margin + config.slot_width / 2.0
}

/// Pick the slot for a release point, or say why there is none.
pub fn resolve_drop(
    slots: &[AnswerSlot],
    release: Point,
    screen: Area,
    config: &EngineConfig,
) -> Result<usize, DropMiss> {
    if slots.iter().all(|s| s.is_filled()) {
        return Err(DropMiss::NoEmptySlot);
    }
    let (top, bottom) = answer_band(screen, config);
    if release.y < top || release.y > bottom {
        return Err(DropMiss::OutsideAnswerBand);
    }
    slots
        .iter()
        .filter(|s| !s.is_filled())
        .map(|s| {
            let center = slot_center_x(s.index, slots.len(), screen.width, config);
            (s.index, (center - release.x).abs())
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
        .ok_or(DropMiss::NoEmptySlot)
}

/// Trimmed, lowercased form used for comparison.
pub fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}

/// Tiles and slots for one target word.
#[derive(Debug, Clone)]
pub struct RoundState {
    word: String,
    tiles: Vec<LetterTile>,
    slots: Vec<AnswerSlot>,
    active_drag: Option<TileId>,
}

impl RoundState {
    pub fn new(word: &str, tiles: Vec<LetterTile>) -> Self {
        Self {
            word: word.to_string(),
            slots: slots_for_word(word.trim()),
            tiles,
            active_drag: None,
        }
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn tiles(&self) -> &[LetterTile] {
        &self.tiles
    }

    pub fn slots(&self) -> &[AnswerSlot] {
        &self.slots
    }

    pub fn tile(&self, id: TileId) -> Option<&LetterTile> {
        self.tiles.iter().find(|t| t.id == id)
    }

    pub fn active_drag(&self) -> Option<TileId> {
        self.active_drag
    }

    pub fn is_laid_out(&self) -> bool {
        !self.tiles.is_empty() && self.tiles.iter().all(|t| t.is_positioned())
    }

    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_filled()).count()
    }

    pub fn consumed_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_consumed()).count()
    }

    pub fn all_filled(&self) -> bool {
        !self.slots.is_empty() && self.slots.iter().all(|s| s.is_filled())
    }

    /// Position the pool once the play area is measured.
    pub fn apply_layout(&mut self, area: Area, config: &EngineConfig) -> usize {
        apply_layout(&mut self.tiles, area, config)
    }

    /// Pick up a tile. A consumed tile is evicted from its slot first;
    /// the freed slot index is returned.
    pub fn drag_start(&mut self, id: TileId) -> Result<Option<usize>, DragError> {
        if let Some(active) = self.active_drag {
            if active != id {
                return Err(DragError::AnotherDragActive);
            }
        }
        let idx = self.tile_index(id).ok_or(DragError::UnknownTile(id))?;
        if !self.tiles[idx].is_positioned() {
            return Err(DragError::NotPositioned(id));
        }

        let evicted = self.tiles[idx].slot();
        if let Some(slot) = evicted {
            if let Some(s) = self.slots.get_mut(slot) {
                s.clear();
            }
            debug!(tile = %id, slot, "evicted tile from slot");
        }
        self.tiles[idx].state = TileState::Dragging;
        self.active_drag = Some(id);
        Ok(evicted)
    }

    /// Apply a pointer delta to the dragged tile's live position.
    pub fn drag_move(&mut self, id: TileId, dx: f32, dy: f32) -> Result<(), DragError> {
        let idx = self.dragging_index(id)?;
        let tile = &mut self.tiles[idx];
        tile.position = tile.position.offset(dx, dy);
        Ok(())
    }

    /// Release the dragged tile. On success the chosen slot index is returned;
    /// on a miss the tile goes back home.
    pub fn drag_end(
        &mut self,
        id: TileId,
        release: Point,
        screen: Area,
        config: &EngineConfig,
    ) -> Result<Result<usize, DropMiss>, DragError> {
        let idx = self.dragging_index(id)?;
        self.active_drag = None;

        let outcome = resolve_drop(&self.slots, release, screen, config);
        let tile = &mut self.tiles[idx];
        match outcome {
            Ok(slot) => {
                self.slots[slot].occupant = Some(id);
                tile.state = TileState::Consumed { slot };
            }
            Err(_) => tile.state = TileState::AtHome,
        }
        // Accepted tiles also snap back home; the slot shows the letter.
        tile.return_home();
        Ok(outcome)
    }

    /// Letters of the slot occupants in slot order. A slot whose occupant is
    /// missing contributes nothing, which can only make the attempt wrong.
    pub fn attempt(&self) -> String {
        let mut attempt = String::with_capacity(self.slots.len());
        for slot in &self.slots {
            let Some(id) = slot.occupant else {
                continue;
            };
            match self.tile(id) {
                Some(tile) if tile.slot() == Some(slot.index) => attempt.push(tile.letter),
                _ => warn!(slot = slot.index, tile = %id, "slot references a tile it does not hold"),
            }
        }
        attempt
    }

    pub fn evaluate(&self) -> Verdict {
        let attempt = self.attempt();
        if normalize(&attempt) == normalize(&self.word) {
            Verdict::Correct
        } else {
            Verdict::Incorrect { attempt }
        }
    }

    /// Empty every slot and send every tile home. The pool is kept.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.clear();
        }
        for tile in &mut self.tiles {
            if tile.is_positioned() {
                tile.state = TileState::AtHome;
                tile.return_home();
            }
        }
        self.active_drag = None;
    }

    fn tile_index(&self, id: TileId) -> Option<usize> {
        self.tiles.iter().position(|t| t.id == id)
    }

    fn dragging_index(&self, id: TileId) -> Result<usize, DragError> {
        let idx = self.tile_index(id).ok_or(DragError::UnknownTile(id))?;
        if self.tiles[idx].is_dragging() {
            Ok(idx)
        } else {
            Err(DragError::NotDragging(id))
        }
    }
}
