//! Headless skirmish runner.
//!
//! Wires the battle engine to a game loop thread, reads player commands as JSON
//! lines, and reports the outcome.

pub mod game_loop;
pub mod input;
pub mod state;

pub use squad_core as core;
