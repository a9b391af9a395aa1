//! Row-tile work units for parallel rendering.
//!
//! The image is divided into bands of whole rows. Each band maps onto one
//! contiguous slice of the pixel buffer, so workers write without locking.

use std::ops::Range;

use crate::renderer::{render_pixel, RenderProgress};
use crate::sampling::pixel_seed;
use crate::{Color, Scene};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Default tile height in rows: one task per scanline.
pub const DEFAULT_ROWS_PER_TILE: u32 = 1;

/// A band of full-width rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowTile {
    /// Index of this tile, top to bottom
    pub index: usize,
    /// First row covered
    pub first_row: u32,
    /// Number of rows covered
    pub rows: u32,
}

impl RowTile {
    pub fn row_range(&self) -> Range<u32> {
        self.first_row..self.first_row + self.rows
    }

    /// Get the total number of pixels in this tile.
    pub fn pixel_count(&self, width: u32) -> usize {
        self.rows as usize * width as usize
    }
}

/// Split `height` rows into disjoint tiles of `rows_per_tile` rows.
///
/// The last tile may be shorter. A tile size of 0 is treated as 1.
pub fn generate_tiles(height: u32, rows_per_tile: u32) -> Vec<RowTile> {
    let rows_per_tile = rows_per_tile.max(1);

    (0..height)
        .step_by(rows_per_tile as usize)
        .enumerate()
        .map(|(index, first_row)| RowTile {
            index,
            first_row,
            rows: rows_per_tile.min(height - first_row),
        })
        .collect()
}

/// Render every pixel of `tile` into `pixels`, the tile's slice of the image.
///
/// Each pixel draws from its own generator seeded by its image index, so the
/// result does not depend on which worker runs the tile.
pub(crate) fn render_tile(
    tile: &RowTile,
    pixels: &mut [Color],
    scene: &Scene,
    seed: u64,
    progress: &RenderProgress,
) {
    let settings = &scene.settings().render;
    let width = settings.image_width;

    for (offset, pixel) in pixels.iter_mut().enumerate() {
        let x = (offset % width as usize) as u32;
        let y = tile.first_row + (offset / width as usize) as u32;
        let index = y as u64 * width as u64 + x as u64;

        let mut rng = StdRng::seed_from_u64(pixel_seed(seed, index));
        *pixel = render_pixel(scene.camera(), scene.world(), x, y, settings, &mut rng);
        progress.pixel_done();
    }
}
