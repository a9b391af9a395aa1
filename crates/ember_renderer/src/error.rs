//! Render errors.

use std::any::Any;
use std::fmt;

use crate::bvh::BvhError;
use crate::tile::RowTile;
use ember_core::SettingsError;
use thiserror::Error;

/// A tile whose worker panicked.
#[derive(Debug, Clone)]
pub struct TileFailure {
    pub tile: RowTile,
    pub message: String,
}

impl fmt::Display for TileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tile {} (rows {}..{}): {}",
            self.tile.index,
            self.tile.first_row,
            self.tile.first_row + self.tile.rows,
            self.message
        )
    }
}

/// Render errors
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Scene has no geometry: {0}")]
    Bvh(#[from] BvhError),

    #[error("Invalid scene settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("Image is {actual:?} but the scene renders {expected:?} (width, height, samples)")]
    ImageSize {
        expected: (u32, u32, u32),
        actual: (u32, u32, u32),
    },

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("{} tile(s) failed, first: {}", .0.len(), first_failure(.0))]
    TilesFailed(Vec<TileFailure>),

    #[error("Failed to spawn render thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Render thread panicked: {0}")]
    RenderThread(String),
}

fn first_failure(failures: &[TileFailure]) -> String {
    failures
        .first()
        .map_or_else(String::new, ToString::to_string)
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
