//! Tile placement planning.
//!
//! # Coordinate System
//!
//! PDF uses a **bottom-left origin** coordinate system where:
//! - (0, 0) is at the bottom-left corner of the page
//! - X increases to the right
//! - Y increases upward
//!
//! Anchors are computed directly in this space, so no axis flip is needed
//! between planning and stamping.
//!
//! # Placement Strategy
//!
//! The grid divides the page into `columns x rows` cells. Spacing is derived
//! from the page dimensions, so larger pages spread tiles further apart while
//! the tile count stays constant. Anchors near the page edge may fall partly
//! or wholly outside the visible area; they are kept rather than clipped so
//! every page of a document gets the same tile pattern.

use crate::config::TileGrid;

/// Anchor point for one watermark tile, in document units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePosition {
    pub x: f32,
    pub y: f32,
}

/// Plan tile anchors for one page.
///
/// Returns exactly `grid.tile_count()` positions in column-major order:
/// all rows of the first column, then the second column, and so on.
#[allow(clippy::cast_precision_loss)]
pub fn plan_tiles(page_width: f32, page_height: f32, grid: &TileGrid) -> Vec<TilePosition> {
    let spacing_x = page_width / grid.columns as f32;
    let spacing_y = page_height / grid.rows as f32;

    let mut positions = Vec::with_capacity(grid.tile_count() as usize);
    for i in 0..grid.columns {
        for j in 0..grid.rows {
            positions.push(TilePosition {
                x: i as f32 * spacing_x + grid.margin_x,
                y: j as f32 * spacing_y + grid.margin_y,
            });
        }
    }

    positions
}
