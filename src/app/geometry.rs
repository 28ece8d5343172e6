//! Mapping between terminal cells and board coordinates
//!
//! The engine works in abstract board units. In the terminal one cell is
//! [`CELL_W`] units wide and [`CELL_H`] units tall, so the default tile and
//! slot sizes come out at a readable number of cells.

use crate::config::EngineConfig;
use crate::game::{answer_band, slot_center_x, Area, Point};
use ratatui::layout::Rect;

pub const CELL_W: f32 = 10.0;
pub const CELL_H: f32 = 20.0;

/// Rows reserved at the top for title and score.
const HEADER_ROWS: u16 = 2;
/// Rows reserved at the bottom for feedback and key help.
const FOOTER_ROWS: u16 = 2;
const TILE_ROWS: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardGeometry {
    /// Whole terminal, in cells.
    pub frame: Rect,
    /// Where the pool is drawn, in cells.
    pub pool: Rect,
    /// Row of the top border of the slot boxes.
    pub slot_row: u16,
    /// First and last rows of the answer band.
    pub band_rows: (u16, u16),
    tile_cols: u16,
    slot_cols: u16,
}

impl BoardGeometry {
    pub fn compute(cols: u16, rows: u16, config: &EngineConfig) -> Self {
        let frame = Rect::new(0, 0, cols, rows);
        let screen = Area::new(cols as f32 * CELL_W, rows as f32 * CELL_H);
        let (top, bottom) = answer_band(screen, config);
        let band_top = (top / CELL_H).ceil() as u16;
        let band_bottom = ((bottom / CELL_H).floor() as u16).max(band_top);
        let band_mid = band_top + (band_bottom - band_top) / 2;
        let slot_row = band_mid.saturating_sub(TILE_ROWS / 2).max(HEADER_ROWS);

        let pool_top = (band_bottom + 1).max(slot_row + TILE_ROWS);
        let pool_bottom = rows.saturating_sub(FOOTER_ROWS);
        let pool = Rect::new(0, pool_top, cols, pool_bottom.saturating_sub(pool_top));

        Self {
            frame,
            pool,
            slot_row,
            band_rows: (band_top, band_bottom),
            tile_cols: ((config.tile_size / CELL_W).round() as u16).max(3),
            slot_cols: ((config.slot_width / CELL_W).round() as u16).max(3),
        }
    }

    /// Terminal size in board units, used for drop matching.
    pub fn screen_area(&self) -> Area {
        Area::new(self.frame.width as f32 * CELL_W, self.frame.height as f32 * CELL_H)
    }

    /// Pool size in board units, used for layout.
    pub fn play_area(&self) -> Area {
        Area::new(self.pool.width as f32 * CELL_W, self.pool.height as f32 * CELL_H)
    }

    /// Center of a cell in screen board units.
    pub fn cell_center(&self, col: u16, row: u16) -> Point {
        Point::new((col as f32 + 0.5) * CELL_W, (row as f32 + 0.5) * CELL_H)
    }

    /// Cells covered by a tile at a pool-relative board position, clipped to
    /// the frame.
    pub fn tile_rect(&self, position: Point) -> Rect {
        let col = self.pool.x as f32 + (position.x / CELL_W).round();
        let row = self.pool.y as f32 + (position.y / CELL_H).round();
        let rect = Rect::new(
            col.max(0.0) as u16,
            row.max(0.0) as u16,
            self.tile_cols,
            TILE_ROWS,
        );
        rect.intersection(self.frame)
    }

    /// Cells of answer slot `index` in a row of `count`.
    pub fn slot_rect(&self, index: usize, count: usize, config: &EngineConfig) -> Rect {
        let center = slot_center_x(index, count, self.screen_area().width, config) / CELL_W;
        let left = (center - self.slot_cols as f32 / 2.0).round().max(0.0) as u16;
        Rect::new(left, self.slot_row, self.slot_cols, TILE_ROWS).intersection(self.frame)
    }

    /// Columns needed to draw `count` slots side by side.
    pub fn slot_row_cols(count: usize, config: &EngineConfig) -> u16 {
        let pitch = config.slot_width + 2.0 * config.slot_margin;
        (count as f32 * pitch / CELL_W).ceil() as u16
    }

    /// Whether a row of `count` slots fits without clipping.
    pub fn fits_slots(&self, count: usize, config: &EngineConfig) -> bool {
        Self::slot_row_cols(count, config) <= self.frame.width
    }

    pub fn contains(rect: Rect, col: u16, row: u16) -> bool {
        col >= rect.x && col < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
    }
}
