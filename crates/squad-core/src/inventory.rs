//! What a unit carries: one weapon slot plus clip slots.

use serde::{Deserialize, Serialize};

use crate::constants::INVENTORY_SLOTS;
use crate::weapon::{Clip, Item, WeaponDef};

/// Clip slots left after the weapon slot.
pub const CLIP_SLOTS: usize = INVENTORY_SLOTS - 1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    weapon: Option<WeaponDef>,
    clips: Vec<Clip>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inventory with a weapon and the given clips.
    pub fn armed(weapon: WeaponDef, clips: impl IntoIterator<Item = Clip>) -> Self {
        let mut inv = Self {
            weapon: Some(weapon),
            clips: Vec::new(),
        };
        for clip in clips {
            if inv.add(Item::Clip(clip)).is_err() {
                break;
            }
        }
        inv
    }

    pub fn weapon(&self) -> Option<&WeaponDef> {
        self.weapon.as_ref()
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    /// Rounds available across all clips of `kind`.
    pub fn rounds(&self, kind: &str) -> u32 {
        self.clips
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.rounds)
            .sum()
    }

    /// Spend one round of `kind`. Emptied clips are discarded.
    pub fn use_clip_round(&mut self, kind: &str) -> bool {
        let Some(idx) = self
            .clips
            .iter()
            .position(|c| c.kind == kind && c.rounds > 0)
        else {
            return false;
        };
        self.clips[idx].rounds -= 1;
        if self.clips[idx].rounds == 0 {
            self.clips.remove(idx);
        }
        true
    }

    pub fn is_full(&self) -> bool {
        self.weapon.is_some() && self.clips.len() >= CLIP_SLOTS
    }

    /// Store an item. A full slot hands the item back.
    pub fn add(&mut self, item: Item) -> Result<(), Item> {
        match item {
            Item::Weapon(w) => {
                if self.weapon.is_some() {
                    return Err(Item::Weapon(w));
                }
                self.weapon = Some(w);
                Ok(())
            }
            Item::Clip(c) => {
                if self.clips.len() >= CLIP_SLOTS {
                    return Err(Item::Clip(c));
                }
                self.clips.push(c);
                Ok(())
            }
        }
    }

    pub fn remove_weapon(&mut self) -> Option<WeaponDef> {
        self.weapon.take()
    }

    /// Empty every weapon and clip slot.
    pub fn drain_weapons_and_clips(&mut self) -> Vec<Item> {
        let mut items = Vec::with_capacity(self.clips.len() + 1);
        if let Some(w) = self.weapon.take() {
            items.push(Item::Weapon(w));
        }
        items.extend(self.clips.drain(..).map(Item::Clip));
        items
    }
}
