//! Grid layout of the tile pool inside the play area

use super::tile::{Area, LetterTile, Point, TileState};
use crate::config::EngineConfig;
use tracing::debug;

/// Padded region tiles are placed in, relative to the play area origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsableRect {
    pub origin: Point,
    pub size: Area,
}

impl UsableRect {
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.origin.x
            && p.y >= self.origin.y
            && p.x <= self.origin.x + self.size.width
            && p.y <= self.origin.y + self.size.height
    }
}

pub fn usable_rect(area: Area, config: &EngineConfig) -> UsableRect {
    let pad = config.layout_padding;
    UsableRect {
        origin: Point::new(pad, pad),
        size: Area::new(
            (area.width - 2.0 * pad).max(0.0),
            (area.height - 2.0 * pad).max(0.0),
        ),
    }
}

/// Number of grid rows needed for `pool_size` tiles.
pub fn row_count(pool_size: usize, columns: usize) -> usize {
    pool_size.div_ceil(columns.max(1))
}

/// Top-left position of every tile index, or nothing if the area has not
/// been measured yet.
pub fn layout(pool_size: usize, area: Area, config: &EngineConfig) -> Vec<Point> {
    if !area.is_measured() || pool_size == 0 {
        return Vec::new();
    }
    let columns = config.layout_columns.max(1);
    let rows = row_count(pool_size, columns);
    let usable = usable_rect(area, config);
    let cell_w = usable.size.width / columns as f32;
    let cell_h = usable.size.height / rows as f32;
    let inset_x = ((cell_w - config.tile_size) / 2.0).max(0.0);
    let inset_y = ((cell_h - config.tile_size) / 2.0).max(0.0);

    (0..pool_size)
        .map(|i| {
            let col = i % columns;
            let row = i / columns;
            Point::new(
                usable.origin.x + col as f32 * cell_w + inset_x,
                usable.origin.y + row as f32 * cell_h + inset_y,
            )
        })
        .collect()
}

/// Give every not-yet-positioned tile its home.
///
/// Tiles that already have a home are left alone, and a dragging tile keeps
/// its live position. Returns how many tiles were positioned.
pub fn apply_layout(tiles: &mut [LetterTile], area: Area, config: &EngineConfig) -> usize {
    if tiles.iter().all(|t| t.is_positioned()) {
        return 0;
    }
    let positions = layout(tiles.len(), area, config);
    if positions.is_empty() {
        debug!(width = area.width, height = area.height, "play area not measured, layout deferred");
        return 0;
    }

    let mut placed = 0;
    for (tile, pos) in tiles.iter_mut().zip(positions) {
        if tile.is_positioned() {
            continue;
        }
        tile.home = Some(pos);
        if tile.state == TileState::InPool {
            tile.state = TileState::AtHome;
            tile.position = pos;
        }
        placed += 1;
    }
    debug!(placed, "laid out tiles");
    placed
}
