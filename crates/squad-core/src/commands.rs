//! Player commands sent from the frontend to the battle.
//!
//! Commands are validated when applied; a rejected command leaves the battle untouched.

use serde::{Deserialize, Serialize};

use crate::enums::*;

/// All possible player actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Selection ---
    /// Select a soldier. Switching soldiers cancels whatever is on the action stack.
    SelectUnit { unit: usize },
    /// Cycle through the sub-turn order (`bias` +1 forward, -1 back).
    NextUnit { bias: i32 },
    /// Aim at a unit.
    SelectTarget { unit: usize },
    /// Aim at a tile.
    TargetTile { x: i32, y: i32 },

    // --- Orders for the selected soldier ---
    /// Walk to a tile.
    Move { x: i32, y: i32 },
    /// Turn to face a tile.
    Rotate { x: i32, y: i32 },
    /// Fire at the current target.
    Shoot { mode: WeaponMode },

    // --- Turn and view ---
    /// Hand the turn to the next team.
    EndTurn,
    /// Pan the camera to a tile over `duration_ms`.
    FocusCamera { x: i32, y: i32, duration_ms: u32 },
}
