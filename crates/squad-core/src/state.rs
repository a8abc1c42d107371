//! Battle snapshot: the visible state handed to the frontend after each tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::BattleEvent;
use crate::types::{SimTime, TilePos};
use crate::unit::Unit;

/// Headcount of one team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamTally {
    /// Slots in use.
    pub total: u32,
    pub alive: u32,
}

/// End-of-battle aggregate, computed on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TacticalEndData {
    pub terrans: TeamTally,
    pub civs: TeamTally,
    pub aliens: TeamTally,
    pub terrans_killed: u32,
    pub terrans_incapacitated: u32,
    /// Incapacitated soldiers left behind.
    pub terrans_missing: u32,
    pub turn_count: u32,
}

impl TacticalEndData {
    /// Count every in-use unit by team and outcome.
    pub fn tally(units: &[Unit], turn_count: u32) -> Self {
        let mut data = Self {
            turn_count,
            ..Self::default()
        };
        for unit in units.iter().filter(|u| u.in_use) {
            let tally = match unit.team {
                Team::Terran => &mut data.terrans,
                Team::Civilian => &mut data.civs,
                Team::Alien => &mut data.aliens,
            };
            tally.total += 1;
            if unit.is_alive() {
                tally.alive += 1;
            }
            if unit.team == Team::Terran {
                match unit.status {
                    UnitStatus::Dead => data.terrans_killed += 1,
                    UnitStatus::Incapacitated if unit.is_missing() => data.terrans_missing += 1,
                    UnitStatus::Incapacitated => data.terrans_incapacitated += 1,
                    UnitStatus::Alive => {}
                }
            }
        }
        data
    }

    /// Terrans won outright.
    pub fn victory(&self) -> bool {
        self.aliens.alive == 0 && self.terrans.alive > 0
    }
}

/// One unit as shown on the battlefield.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitView {
    pub id: usize,
    pub team: Team,
    pub name: String,
    pub status: UnitStatus,
    pub left: bool,
    pub pos: TilePos,
    pub rotation: f32,
    pub hp: i32,
    pub tu: f32,
    pub weapon: Option<String>,
    pub kills: u32,
    /// Visible to the player team (always true for Terrans).
    pub visible: bool,
}

/// Player selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionView {
    pub unit: Option<usize>,
    pub target_unit: Option<usize>,
    pub target_tile: Option<TilePos>,
}

/// Shots fired versus predicted hit chance, for feedback and tuning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AccuracyView {
    pub shots: u32,
    pub hits: u32,
    pub predicted: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    pub time: SimTime,
    pub turn: u32,
    pub current_team: Team,
    pub phase: BattlePhase,
    pub units: Vec<UnitView>,
    /// Bottom to top.
    pub action_stack: Vec<ActionKind>,
    pub selection: SelectionView,
    pub camera: Vec3,
    pub accuracy: AccuracyView,
    pub events: Vec<BattleEvent>,
    pub end: Option<TacticalEndData>,
}
