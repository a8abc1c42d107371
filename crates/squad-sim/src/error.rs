//! Errors surfaced by the battle engine to its callers.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use squad_core::enums::{Team, WeaponMode};
use squad_core::error::CoreError;
use squad_terrain::error::TerrainError;

/// A player command that was rejected. The battle is left untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("no unit selected")]
    NoSelection,

    #[error("it is the {0:?} phase, not the player's")]
    NotPlayerTurn(Team),

    #[error("an action is still in progress")]
    ActionInProgress,

    #[error("unit {0} cannot act")]
    UnitUnavailable(usize),

    #[error("tile ({x}, {y}) is outside the map")]
    OutOfBounds { x: i32, y: i32 },

    #[error("no path to the destination")]
    NoPath,

    #[error("path needs {needed:.2} TU but only {available:.2} remain")]
    InsufficientTu { needed: f32, available: f32 },

    #[error("no target selected")]
    NoTarget,

    #[error("cannot fire in {0:?} mode")]
    CannotFire(WeaponMode),

    #[error("the battle is over")]
    BattleOver,

    #[error(transparent)]
    Path(#[from] CoreError),
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save file i/o failed: {0}")]
    Io(#[from] io::Error),

    #[error("save file is not valid: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported save version {0}")]
    UnknownVersion(u32),

    #[error("{team:?} has {count} units but only {capacity} slots")]
    TeamOverflow {
        team: Team,
        count: usize,
        capacity: usize,
    },

    #[error("cannot save while actions are resolving")]
    Busy,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse battle config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read battle config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A battle setup that could not be built.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Terrain(#[from] TerrainError),

    #[error(transparent)]
    Items(#[from] CoreError),

    #[error(transparent)]
    Placement(#[from] SaveError),
}
