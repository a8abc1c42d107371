//! Unit records: the soldiers, civilians, and aliens on the battlefield.
//!
//! Units are never removed during a battle. Dead and departed units stay in the
//! arena as inert records so the end-of-battle tallies can count them.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::{Team, UnitStatus, WeaponMode};
use crate::flags::AiFlags;
use crate::inventory::Inventory;
use crate::types::{normalize_degrees, TilePos};
use crate::weapon::{BulletTarget, DamageDesc, FireStatistics, WeaponDef};

/// Fixed attributes of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Marksmanship in [0, 1]. 1 halves the weapon's base spread.
    pub accuracy: f32,
    /// Chance in [0, 1] to take a reaction shot when squarely facing a new enemy.
    pub reaction: f32,
    pub total_hp: i32,
    pub total_tu: f32,
    /// Fraction of kinetic damage absorbed.
    pub armor: f32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            accuracy: 0.5,
            reaction: 0.5,
            total_hp: 40,
            total_tu: 20.0,
            armor: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Arena slot. Assigned at placement.
    pub id: usize,
    pub team: Team,
    pub name: String,
    /// False for empty arena slots.
    pub in_use: bool,
    pub status: UnitStatus,
    /// Unit has left the battle area (evacuated or abandoned).
    pub left: bool,
    pub pos: TilePos,
    /// Facing in degrees. 0 faces +y, 90 faces +x.
    pub rotation: f32,
    pub hp: i32,
    pub tu: f32,
    pub stats: Stats,
    pub inventory: Inventory,
    #[serde(default)]
    pub ai_flags: AiFlags,
    pub kills: u32,
}

impl Unit {
    pub fn new(team: Team, name: impl Into<String>, pos: TilePos, stats: Stats, inventory: Inventory) -> Self {
        Self {
            id: 0,
            team,
            name: name.into(),
            in_use: true,
            status: UnitStatus::Alive,
            left: false,
            pos,
            rotation: 0.0,
            hp: stats.total_hp,
            tu: stats.total_tu,
            stats,
            inventory,
            ai_flags: AiFlags::empty(),
            kills: 0,
        }
    }

    /// An unused arena slot.
    pub fn empty(id: usize, team: Team) -> Self {
        Self {
            id,
            team,
            name: String::new(),
            in_use: false,
            status: UnitStatus::Dead,
            left: false,
            pos: TilePos::default(),
            rotation: 0.0,
            hp: 0,
            tu: 0.0,
            stats: Stats::default(),
            inventory: Inventory::new(),
            ai_flags: AiFlags::empty(),
            kills: 0,
        }
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = normalize_degrees(rotation);
        self
    }

    pub fn with_ai_flags(mut self, flags: AiFlags) -> Self {
        self.ai_flags = flags;
        self
    }

    pub fn is_alive(&self) -> bool {
        self.in_use && !self.left && self.status == UnitStatus::Alive
    }

    /// Refill per-turn resources.
    pub fn new_turn(&mut self) {
        if self.is_alive() {
            self.tu = self.stats.total_tu;
        }
    }

    pub fn use_tu(&mut self, amount: f32) {
        self.tu = (self.tu - amount).max(0.0);
    }

    pub fn weapon(&self) -> Option<&WeaponDef> {
        self.inventory.weapon()
    }

    /// TU cost of one trigger pull, or `None` when the weapon lacks the mode.
    pub fn fire_time_units(&self, mode: WeaponMode) -> Option<f32> {
        let def = self.weapon()?.mode(mode)?;
        Some(def.tu_fraction * self.stats.total_tu)
    }

    /// Whether the unit has the weapon mode, the rounds, and the TU to fire it now.
    pub fn can_fire(&self, mode: WeaponMode) -> bool {
        if !self.is_alive() {
            return false;
        }
        let Some(def) = self.weapon().and_then(|w| w.mode(mode)) else {
            return false;
        };
        let Some(tu) = self.fire_time_units(mode) else {
            return false;
        };
        self.inventory.rounds(&def.clip) >= def.rounds && self.tu >= tu
    }

    /// Spread radius per tile of range for this shooter and mode.
    pub fn calc_accuracy(&self, mode: WeaponMode) -> f32 {
        let spread = self
            .weapon()
            .and_then(|w| w.mode(mode))
            .map_or(1.0, |m| m.spread);
        spread * (2.0 - self.stats.accuracy.clamp(0.0, 1.0))
    }

    /// Predicted outcome of firing `mode` at `target`.
    pub fn fire_statistics(&self, mode: WeaponMode, target: &BulletTarget) -> Option<FireStatistics> {
        let def = self.weapon()?.mode(mode)?;
        let tu = self.fire_time_units(mode)?;

        let radius = self.calc_accuracy(mode) * target.distance.max(1.0);
        let spread_area = std::f32::consts::PI * radius * radius;
        let chance_to_hit = if spread_area <= f32::EPSILON {
            1.0
        } else {
            (target.width * target.height / spread_area).clamp(0.0, 1.0)
        };
        let chance_any_hit = 1.0 - (1.0 - chance_to_hit).powi(def.rounds as i32);
        let damage_per_tu = if tu > 0.0 {
            def.damage.total() * chance_to_hit * def.rounds as f32 / tu
        } else {
            0.0
        };
        Some(FireStatistics {
            chance_to_hit,
            chance_any_hit,
            tu,
            damage_per_tu,
        })
    }

    /// Apply damage. Returns true if this hit took the unit out of action.
    pub fn do_damage(&mut self, damage: &DamageDesc) -> bool {
        if !self.is_alive() {
            return false;
        }
        let absorbed = damage.kinetic * self.stats.armor.clamp(0.0, 1.0);
        let amount = (damage.total() - absorbed).round().max(0.0) as i32;
        self.hp -= amount;
        if self.hp <= 0 {
            self.status = if self.hp > -INCAPACITATED_MARGIN {
                UnitStatus::Incapacitated
            } else {
                UnitStatus::Dead
            };
            return true;
        }
        false
    }

    /// Leave the battle area. Anyone left behind while down is missing in action.
    pub fn leave(&mut self) {
        if self.in_use {
            self.left = true;
        }
    }

    /// Down when the battle ended and not recovered.
    pub fn is_missing(&self) -> bool {
        self.in_use && self.left && self.status == UnitStatus::Incapacitated
    }

    pub fn credit_kill(&mut self) {
        self.kills += 1;
    }

    /// Facing as a unit vector in tile space.
    pub fn facing(&self) -> Vec2 {
        let r = self.rotation.to_radians();
        Vec2::new(r.sin(), r.cos())
    }

    /// Rotation that faces `dst`, optionally snapped to 45 degree steps.
    pub fn angle_between(&self, dst: TilePos, quantize: bool) -> f32 {
        let dx = (dst.x - self.pos.x) as f32;
        let dy = (dst.y - self.pos.y) as f32;
        if dx == 0.0 && dy == 0.0 {
            return self.rotation;
        }
        let deg = normalize_degrees(dx.atan2(dy).to_degrees());
        if quantize {
            normalize_degrees((deg / 45.0).round() * 45.0)
        } else {
            deg
        }
    }

    /// World-space centre of the unit's tile.
    pub fn world_pos(&self) -> Vec3 {
        self.pos.center()
    }

    fn facing3(&self) -> Vec3 {
        let f = self.facing();
        Vec3::new(f.x, 0.0, f.y)
    }

    /// Muzzle position: where shots leave the weapon.
    pub fn trigger_point(&self) -> Vec3 {
        self.world_pos() + self.facing3() * TRIGGER_FORWARD + Vec3::Y * TRIGGER_HEIGHT
    }

    /// Centre of the carried weapon's hitbox.
    pub fn weapon_point(&self) -> Vec3 {
        self.world_pos() + self.facing3() * TRIGGER_FORWARD + Vec3::Y * (TRIGGER_HEIGHT - 0.1)
    }

    /// Point shooters aim at.
    pub fn target_point(&self) -> Vec3 {
        self.world_pos() + Vec3::Y * UNIT_TARGET_HEIGHT
    }

    /// Width and height presented to a shooter.
    pub fn target_size(&self) -> (f32, f32) {
        (UNIT_WIDTH, UNIT_HEIGHT)
    }
}
