//! Battlefield terrain for the squad battle.
//!
//! Tile map with destructible walls, doors, smoke and fire, ground storage,
//! line-of-sight, and A* pathfinding.

pub use squad_core as core;

pub mod error;
pub mod grid;
pub mod los;
pub mod path;
pub mod storage;

// Re-export key types for convenience.
pub use error::TerrainError;
pub use grid::{DamageOutcome, Lander, TileMap, WallMaterial};
pub use los::{blast_reaches, has_line_of_sight, LineWalk};
pub use path::{solve_path, PathResult};
pub use storage::Storage;
