//! Core types and definitions for the squad battle simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! units, weapons, motion paths, visibility relations, commands, events,
//! snapshots, and constants. It has no engine logic.

pub mod commands;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod flags;
pub mod inventory;
pub mod motion_path;
pub mod state;
pub mod targets;
pub mod types;
pub mod unit;
pub mod weapon;
