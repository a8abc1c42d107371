//! Weapon definitions, damage, and shot spread.

use std::collections::BTreeMap;
use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::enums::WeaponMode;
use crate::error::CoreError;

/// Damage split by type. Armor and structures respond to each differently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageDesc {
    pub kinetic: f32,
    pub energy: f32,
    pub incendiary: f32,
}

impl DamageDesc {
    pub fn new(kinetic: f32, energy: f32, incendiary: f32) -> Self {
        Self {
            kinetic,
            energy,
            incendiary,
        }
    }

    pub fn total(&self) -> f32 {
        self.kinetic + self.energy + self.incendiary
    }

    pub fn scale(&mut self, s: f32) {
        self.kinetic *= s;
        self.energy *= s;
        self.incendiary *= s;
    }

    pub fn scaled(mut self, s: f32) -> Self {
        self.scale(s);
        self
    }
}

/// One trigger mode of a weapon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireModeDef {
    /// Rounds fired (and clip rounds spent) per trigger pull.
    pub rounds: u32,
    /// Fraction of the unit's full TU a trigger pull costs.
    pub tu_fraction: f32,
    /// Spread radius per tile of range for a perfectly accurate shooter.
    pub spread: f32,
    /// Damage of a single round.
    pub damage: DamageDesc,
    #[serde(default)]
    pub explosive: bool,
    /// Clip kind this mode draws from.
    pub clip: String,
    /// Projectile speed in tiles per second; beams and bullets resolve instantly.
    #[serde(default)]
    pub projectile_speed: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponDef {
    pub name: String,
    pub snap: FireModeDef,
    #[serde(default)]
    pub auto: Option<FireModeDef>,
    #[serde(default)]
    pub alt: Option<FireModeDef>,
}

impl WeaponDef {
    pub fn mode(&self, mode: WeaponMode) -> Option<&FireModeDef> {
        match mode {
            WeaponMode::Snap => Some(&self.snap),
            WeaponMode::Auto => self.auto.as_ref(),
            WeaponMode::Alt => self.alt.as_ref(),
        }
    }

    pub fn is_explosive(&self, mode: WeaponMode) -> bool {
        self.mode(mode).is_some_and(|m| m.explosive)
    }

    /// Distinct clip kinds used by the snap and alt modes, in that order.
    pub fn clip_kinds(&self) -> Vec<&str> {
        let mut kinds = vec![self.snap.clip.as_str()];
        if let Some(alt) = &self.alt {
            if alt.clip != self.snap.clip {
                kinds.push(alt.clip.as_str());
            }
        }
        kinds
    }

    /// Visual travel time of a shot over `length` tiles.
    pub fn effect_delay_ms(&self, mode: WeaponMode, length: f32) -> u32 {
        match self.mode(mode).and_then(|m| m.projectile_speed) {
            Some(speed) if speed > 0.0 => (length / speed * 1000.0).round() as u32,
            _ => 0,
        }
    }
}

/// A clip of ammunition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clip {
    pub kind: String,
    pub rounds: u32,
}

/// Anything that occupies an inventory or storage slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Item {
    Weapon(WeaponDef),
    Clip(Clip),
}

/// Geometry of what a shot is aimed at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulletTarget {
    /// Range in tiles.
    pub distance: f32,
    pub width: f32,
    pub height: f32,
}

impl BulletTarget {
    pub fn new(distance: f32) -> Self {
        Self {
            distance,
            width: crate::constants::UNIT_WIDTH,
            height: crate::constants::UNIT_HEIGHT,
        }
    }
}

/// Predicted outcome of a trigger pull.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FireStatistics {
    pub chance_to_hit: f32,
    pub chance_any_hit: f32,
    pub tu: f32,
    pub damage_per_tu: f32,
}

/// Scatters an aim point inside a disc perpendicular to the line of fire.
pub struct BulletSpread;

impl BulletSpread {
    /// Jitter `target` by up to `accuracy * distance` around the firing `normal`.
    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        accuracy: f32,
        distance: f32,
        normal: Vec3,
        target: Vec3,
    ) -> Vec3 {
        let radius = accuracy * distance * rng.gen::<f32>().sqrt();
        let theta = rng.gen::<f32>() * TAU;

        let right = normal.cross(Vec3::Y).try_normalize().unwrap_or(Vec3::X);
        let up = right.cross(normal).try_normalize().unwrap_or(Vec3::Y);
        target + right * (radius * theta.cos()) + up * (radius * theta.sin())
    }
}

/// Named weapon and clip definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemCatalog {
    pub weapons: BTreeMap<String, WeaponDef>,
    /// Rounds in a full clip, by kind.
    pub clips: BTreeMap<String, u32>,
}

#[derive(Deserialize)]
struct CatalogFile {
    weapons: Vec<WeaponDef>,
    clips: BTreeMap<String, u32>,
}

const BUILTIN_ITEMS_JSON: &str = include_str!("data/items.json");

impl ItemCatalog {
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|e| CoreError::Catalog(e.to_string()))?;
        let weapons = file
            .weapons
            .into_iter()
            .map(|w| (w.name.clone(), w))
            .collect::<BTreeMap<_, _>>();
        for w in weapons.values() {
            for mode in WeaponMode::ALL {
                if let Some(m) = w.mode(mode) {
                    if !file.clips.contains_key(&m.clip) {
                        return Err(CoreError::Catalog(format!(
                            "weapon '{}' uses unknown clip '{}'",
                            w.name, m.clip
                        )));
                    }
                }
            }
        }
        Ok(Self {
            weapons,
            clips: file.clips,
        })
    }

    /// The catalog shipped with the game.
    pub fn builtin() -> Result<Self, CoreError> {
        Self::from_json(BUILTIN_ITEMS_JSON)
    }

    pub fn weapon(&self, name: &str) -> Result<&WeaponDef, CoreError> {
        self.weapons
            .get(name)
            .ok_or_else(|| CoreError::UnknownWeapon(name.to_string()))
    }

    /// A full clip of `kind`, or `None` for an unknown kind.
    pub fn full_clip(&self, kind: &str) -> Option<Clip> {
        self.clips.get(kind).map(|&rounds| Clip {
            kind: kind.to_string(),
            rounds,
        })
    }
}
