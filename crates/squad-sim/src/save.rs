//! Battle save files and unit placement into team buckets.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use squad_core::constants::MAX_UNITS;
use squad_core::enums::Team;
use squad_core::unit::Unit;
use squad_terrain::grid::TileMap;

use crate::error::SaveError;

pub const SAVE_VERSION: u32 = 1;

/// Everything needed to resume a battle at a phase boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSave {
    pub version: u32,
    pub current_team: Team,
    pub turn_count: u32,
    pub day_time: bool,
    pub map: TileMap,
    /// In-use units in slot order.
    pub units: Vec<Unit>,
}

impl BattleSave {
    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        let save: Self = serde_json::from_str(json)?;
        if save.version != SAVE_VERSION {
            return Err(SaveError::UnknownVersion(save.version));
        }
        Ok(save)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), SaveError> {
        fs::write(path, self.to_json()?)?;
        info!(target: "squad::save", path = %path.display(), turn = self.turn_count, "battle saved");
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self, SaveError> {
        let save = Self::from_json(&fs::read_to_string(path)?)?;
        info!(target: "squad::save", path = %path.display(), turn = save.turn_count, "battle loaded");
        Ok(save)
    }
}

/// Lay `units` out in the fixed arena, each team filling its bucket in order.
///
/// Records that are not in use are dropped. Slot ids are reassigned.
pub fn place_units(units: Vec<Unit>) -> Result<Vec<Unit>, SaveError> {
    let mut arena: Vec<Unit> = (0..MAX_UNITS)
        .map(|id| Unit::empty(id, Team::of_slot(id).unwrap_or(Team::Alien)))
        .collect();
    let mut next = Team::ALL.map(|t| t.unit_range().start);

    for mut unit in units.into_iter().filter(|u| u.in_use) {
        let team = unit.team;
        let range = team.unit_range();
        let slot = next[team.index()];
        if slot >= range.end {
            let count = 1 + slot - range.start;
            return Err(SaveError::TeamOverflow {
                team,
                count,
                capacity: range.len(),
            });
        }
        unit.id = slot;
        arena[slot] = unit;
        next[team.index()] += 1;
    }
    Ok(arena)
}
