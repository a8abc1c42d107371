//! Enumeration types used throughout the battle.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// The three factions on a battlefield. Discriminants are the turn-order index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    #[default]
    Terran = 0,
    Civilian = 1,
    Alien = 2,
}

impl Team {
    pub const ALL: [Team; 3] = [Team::Terran, Team::Civilian, Team::Alien];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Team> {
        Self::ALL.get(index).copied()
    }

    /// The team whose phase follows this one.
    pub fn next(self) -> Team {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Slots of the unit arena reserved for this team.
    pub fn unit_range(self) -> Range<usize> {
        match self {
            Team::Terran => TERRAN_UNITS_START..TERRAN_UNITS_END,
            Team::Civilian => CIV_UNITS_START..CIV_UNITS_END,
            Team::Alien => ALIEN_UNITS_START..ALIEN_UNITS_END,
        }
    }

    /// Team of the unit in arena slot `id`.
    pub fn of_slot(id: usize) -> Option<Team> {
        Self::ALL.into_iter().find(|t| t.unit_range().contains(&id))
    }

    /// The team that takes reaction shots during this team's phase. Civilians never react
    /// and are never reacted to.
    pub fn reaction_opponent(self) -> Option<Team> {
        match self {
            Team::Terran => Some(Team::Alien),
            Team::Alien => Some(Team::Terran),
            Team::Civilian => None,
        }
    }

    /// Whether units of `other` are hostile to this team.
    pub fn is_hostile_to(self, other: Team) -> bool {
        matches!(
            (self, other),
            (Team::Terran, Team::Alien) | (Team::Alien, Team::Terran) | (Team::Alien, Team::Civilian)
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Team::Terran => "Terran",
            Team::Civilian => "Civ",
            Team::Alien => "Alien",
        }
    }
}

/// Trigger mode of a weapon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponMode {
    /// Single aimed shot.
    #[default]
    Snap,
    /// Burst fire.
    Auto,
    /// Secondary mode (grenade launcher, charged beam).
    Alt,
}

impl WeaponMode {
    pub const ALL: [WeaponMode; 3] = [WeaponMode::Snap, WeaponMode::Auto, WeaponMode::Alt];
}

/// Physical condition of a unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitStatus {
    #[default]
    Alive,
    /// Down but recoverable. Becomes missing-in-action if left behind.
    Incapacitated,
    Dead,
}

/// Battle lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattlePhase {
    #[default]
    Active,
    /// End condition reached. The engine no longer advances.
    Complete,
}

/// Discriminant of an action on the stack, for snapshots and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    Move,
    Rotate,
    Shoot,
    Hit,
    Delay,
    Camera,
    CameraBounds,
}
