//! Game logic: letter pools, board layout, drop matching and sessions

pub mod generator;
pub mod layout;
pub mod matcher;
pub mod session;
pub mod tile;
pub mod words;

pub use generator::{generate_pool, GenerateError};
pub use layout::layout;
pub use matcher::{answer_band, slot_center_x, DragError, DropMiss, RoundState, Verdict};
pub use session::{EngineEvent, Phase, RoundToken, Session};
pub use tile::{AnswerSlot, Area, LetterTile, Point, TileId, TileState};
pub use words::{Difficulty, WordPool};
