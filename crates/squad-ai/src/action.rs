//! What an AI hands back to the turn controller.

use glam::Vec3;

use squad_core::enums::WeaponMode;
use squad_core::motion_path::MotionPath;

/// A proposed action. The controller validates it and pushes it onto the stack.
#[derive(Debug, Clone, PartialEq)]
pub enum AiAction {
    None,
    Move { path: MotionPath },
    Shoot {
        mode: WeaponMode,
        target: Vec3,
        target_unit: usize,
    },
    Rotate { x: i32, y: i32 },
    /// Re-arm from the storage the unit stands on.
    Inventory,
}

/// Result of a single think step.
#[derive(Debug, Clone, PartialEq)]
pub enum ThinkOutcome {
    /// A precondition failed (no weapon, unit down, think budget spent).
    NotOption,
    /// Nothing worth doing.
    NoAction,
    /// The goal is already met; no stack action needed.
    SolvedNoAction,
    Action(AiAction),
}

/// Result of one `think` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Thought {
    /// The unit is finished for this phase.
    pub done: bool,
    pub action: AiAction,
}

impl Thought {
    pub fn done() -> Self {
        Self {
            done: true,
            action: AiAction::None,
        }
    }

    pub fn act(action: AiAction) -> Self {
        Self {
            done: false,
            action,
        }
    }
}
