//! Events emitted by the battle for the log, the UI, and reaction logic.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::TilePos;

/// A visibility change produced at a decision point.
///
/// Target events live only for the decision point that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TargetEvent {
    /// `viewer` newly sees `target`.
    Unit { viewer: usize, target: usize },
    /// No member of `team` could see `target` before this decision point.
    Team { team: Team, target: usize },
}

impl TargetEvent {
    pub fn target(&self) -> usize {
        match *self {
            TargetEvent::Unit { target, .. } | TargetEvent::Team { target, .. } => target,
        }
    }

    pub fn is_team(&self) -> bool {
        matches!(self, TargetEvent::Team { .. })
    }
}

/// Feed of notable battle happenings, drained into each snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BattleEvent {
    TurnStarted { team: Team, turn: u32 },
    Sighting { event: TargetEvent },
    ShotFired {
        shooter: usize,
        mode: WeaponMode,
        from: Vec3,
        to: Vec3,
    },
    UnitHit { unit: usize, hp: i32 },
    UnitDown {
        unit: usize,
        status: UnitStatus,
        killer: Option<usize>,
    },
    WeaponShotOut { unit: usize },
    WallDestroyed { tile: TilePos },
    Explosion { center: TilePos },
    ReactionFire { shooter: usize, target: usize },
    MoveInterrupted { unit: usize },
    BattleEnded,
}
