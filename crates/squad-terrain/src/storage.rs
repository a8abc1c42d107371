//! Item caches on the ground: weapon racks, ammo crates, fallen gear.

use serde::{Deserialize, Serialize};

use squad_core::weapon::{Clip, Item, WeaponDef};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Storage {
    weapons: Vec<WeaponDef>,
    clips: Vec<Clip>,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: impl IntoIterator<Item = Item>) -> Self {
        let mut s = Self::new();
        for item in items {
            s.add_item(item);
        }
        s
    }

    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty() && self.clips.is_empty()
    }

    pub fn add_item(&mut self, item: Item) {
        match item {
            Item::Weapon(w) => self.weapons.push(w),
            Item::Clip(c) => self.clips.push(c),
        }
    }

    pub fn into_items(self) -> impl Iterator<Item = Item> {
        self.weapons
            .into_iter()
            .map(Item::Weapon)
            .chain(self.clips.into_iter().map(Item::Clip))
    }

    pub fn weapons(&self) -> &[WeaponDef] {
        &self.weapons
    }

    /// Number of clips of `kind` holding at least one round.
    pub fn clip_count(&self, kind: &str) -> usize {
        self.clips
            .iter()
            .filter(|c| c.kind == kind && c.rounds > 0)
            .count()
    }

    pub fn remove_weapon(&mut self, name: &str) -> Option<WeaponDef> {
        let idx = self.weapons.iter().position(|w| w.name == name)?;
        Some(self.weapons.remove(idx))
    }

    /// Take the fullest clip of `kind`.
    pub fn remove_clip(&mut self, kind: &str) -> Option<Clip> {
        let idx = self
            .clips
            .iter()
            .enumerate()
            .filter(|(_, c)| c.kind == kind && c.rounds > 0)
            .max_by_key(|(_, c)| c.rounds)
            .map(|(i, _)| i)?;
        Some(self.clips.remove(idx))
    }

    /// The weapon a unit carrying `current` should re-arm with here, if any.
    ///
    /// Keeps the current weapon when matching ammunition is stocked; otherwise picks
    /// the hardest-hitting stocked weapon that has ammunition for its snap mode. Both
    /// the AI's "is there ammo here" query and the actual resupply use this answer.
    pub fn is_resupply(&self, current: Option<&WeaponDef>) -> Option<WeaponDef> {
        if let Some(w) = current {
            if self.clip_count(&w.snap.clip) > 0 {
                return Some(w.clone());
            }
        }
        self.weapons
            .iter()
            .filter(|w| self.clip_count(&w.snap.clip) > 0)
            .max_by(|a, b| {
                let da = a.snap.damage.total() * a.snap.rounds as f32;
                let db = b.snap.damage.total() * b.snap.rounds as f32;
                da.total_cmp(&db)
            })
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use squad_core::weapon::ItemCatalog;

    #[test]
    fn test_resupply_prefers_current_weapon_with_ammo() {
        let cat = ItemCatalog::builtin().unwrap();
        let rifle = cat.weapon("Assault Rifle").unwrap().clone();
        let plasma = cat.weapon("Plasma Rifle").unwrap().clone();
        let storage = Storage::with_items([
            Item::Weapon(plasma.clone()),
            Item::Clip(cat.full_clip("plasma_pack").unwrap()),
            Item::Clip(cat.full_clip("rifle_clip").unwrap()),
        ]);
        assert_eq!(storage.is_resupply(Some(&rifle)).map(|w| w.name), Some(rifle.name.clone()));
        assert_eq!(storage.is_resupply(None).map(|w| w.name), Some(plasma.name));
    }

    #[test]
    fn test_no_resupply_without_matching_clips() {
        let cat = ItemCatalog::builtin().unwrap();
        let storage = Storage::with_items([
            Item::Weapon(cat.weapon("Laser Carbine").unwrap().clone()),
            Item::Clip(cat.full_clip("rocket").unwrap()),
        ]);
        assert!(storage.is_resupply(None).is_none());
    }

    #[test]
    fn test_remove_clip_takes_fullest() {
        let mut storage = Storage::with_items([
            Item::Clip(Clip {
                kind: "cell".into(),
                rounds: 3,
            }),
            Item::Clip(Clip {
                kind: "cell".into(),
                rounds: 9,
            }),
        ]);
        assert_eq!(storage.remove_clip("cell").map(|c| c.rounds), Some(9));
        assert_eq!(storage.clip_count("cell"), 1);
        assert!(storage.remove_clip("rocket").is_none());
    }
}
