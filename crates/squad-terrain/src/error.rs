//! Errors raised by map construction and storage access.

use squad_core::types::TilePos;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TerrainError {
    #[error("tile ({}, {}) is outside the map", .0.x, .0.y)]
    OutOfBounds(TilePos),

    #[error("no storage at tile ({}, {})", .0.x, .0.y)]
    NoStorage(TilePos),

    #[error("unknown layout glyph '{glyph}' at row {row}, column {col}")]
    BadGlyph { glyph: char, row: usize, col: usize },

    #[error("layout row {row} has {len} tiles, expected {expected}")]
    RaggedLayout { row: usize, len: usize, expected: usize },

    #[error("layout of {width}x{height} tiles exceeds the {max} tile map limit")]
    LayoutTooLarge { width: usize, height: usize, max: i32 },
}
