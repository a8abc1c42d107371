//! Battle engine for the squad battle.
//!
//! Owns the unit arena, the map, and the action stack, advances them one tick
//! at a time, and produces `BattleSnapshot`s for the frontend.

pub mod action;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod save;
pub mod systems;
pub mod targets;
pub mod visibility;
pub mod world;
pub mod world_setup;

pub use squad_core as core;

pub use config::BattleConfig;
pub use engine::{BattleEngine, SimConfig};
pub use error::{CommandError, ConfigError, SaveError, ScenarioError};
pub use save::BattleSave;
pub use world_setup::Scenario;

#[cfg(test)]
mod tests;
