//! TileMap: the battlefield grid with walls, doors, smoke, fire, and storage.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use squad_core::constants::*;
use squad_core::types::{Rect, TilePos};
use squad_core::weapon::DamageDesc;

use crate::error::TerrainError;
use crate::path::{self, PathResult};
use crate::storage::Storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallMaterial {
    Stone,
    /// Burns when hit with incendiary damage.
    Wood,
    /// Explodes when destroyed.
    FuelTank,
}

impl WallMaterial {
    pub fn starting_hp(self) -> i32 {
        match self {
            WallMaterial::Stone => STONE_WALL_HP,
            WallMaterial::Wood => WOOD_WALL_HP,
            WallMaterial::FuelTank => FUEL_TANK_HP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wall {
    pub material: WallMaterial,
    pub hp: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub wall: Option<Wall>,
    /// `Some(open)` for a door tile.
    pub door: Option<bool>,
    /// Remaining turns of smoke.
    pub smoke: u8,
    /// Remaining turns of fire.
    pub fire: u8,
    pub storage: Option<Storage>,
}

impl Tile {
    /// Walls and closed doors block sight and shots.
    pub fn is_solid(&self) -> bool {
        self.wall.is_some() || self.door == Some(false)
    }
}

/// The player's insertion craft. Its footprint is always revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lander {
    pub bounds: Rect,
    /// Degrees, a multiple of 90.
    pub rotation: i32,
}

/// Result of damaging one tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DamageOutcome {
    /// Tile whose wall was destroyed.
    pub destroyed: Option<TilePos>,
    /// Secondary blast centre (a destroyed fuel tank).
    pub blast: Option<TilePos>,
    /// A structure absorbed damage.
    pub hit_structure: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileMap {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
    pub lander: Option<Lander>,
    pub day_time: bool,
    /// Player-visible tiles. Derived state, rebuilt from visibility.
    #[serde(skip)]
    fog: Vec<bool>,
}

impl TileMap {
    /// An open map of the given size, clamped to `MAP_SIZE`.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.clamp(1, MAP_SIZE);
        let height = height.clamp(1, MAP_SIZE);
        Self {
            width,
            height,
            tiles: vec![Tile::default(); (width * height) as usize],
            lander: None,
            day_time: true,
            fog: vec![false; (width * height) as usize],
        }
    }

    /// Build a map from rows of glyphs.
    ///
    /// `.` floor, `#` stone, `w` wood, `F` fuel tank, `D` closed door,
    /// `s` empty storage, `L` lander footprint (walkable).
    pub fn from_layout(rows: &[&str]) -> Result<Self, TerrainError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.chars().count());
        if width as i32 > MAP_SIZE || height as i32 > MAP_SIZE || width == 0 {
            return Err(TerrainError::LayoutTooLarge {
                width,
                height,
                max: MAP_SIZE,
            });
        }
        let mut map = Self::new(width as i32, height as i32);
        let mut lander = Rect::invalid();

        for (y, row) in rows.iter().enumerate() {
            let len = row.chars().count();
            if len != width {
                return Err(TerrainError::RaggedLayout {
                    row: y,
                    len,
                    expected: width,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let p = TilePos::new(x as i32, y as i32);
                match glyph {
                    '.' => {}
                    '#' => map.set_wall(p, WallMaterial::Stone),
                    'w' => map.set_wall(p, WallMaterial::Wood),
                    'F' => map.set_wall(p, WallMaterial::FuelTank),
                    'D' => map.set_door(p),
                    's' => map.add_storage(p, Storage::new()),
                    'L' => lander = lander.union(&Rect::point(p)),
                    _ => {
                        return Err(TerrainError::BadGlyph {
                            glyph,
                            row: y,
                            col: x,
                        })
                    }
                }
            }
        }
        if lander.is_valid() {
            map.lander = Some(Lander {
                bounds: lander,
                rotation: 0,
            });
        }
        Ok(map)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width - 1, self.height - 1)
    }

    pub fn in_bounds(&self, p: TilePos) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    fn index(&self, p: TilePos) -> Option<usize> {
        self.in_bounds(p)
            .then(|| (p.y * self.width + p.x) as usize)
    }

    pub fn tile(&self, p: TilePos) -> Option<&Tile> {
        self.index(p).map(|i| &self.tiles[i])
    }

    fn tile_mut(&mut self, p: TilePos) -> Option<&mut Tile> {
        self.index(p).map(|i| &mut self.tiles[i])
    }

    pub fn set_wall(&mut self, p: TilePos, material: WallMaterial) {
        if let Some(t) = self.tile_mut(p) {
            t.wall = Some(Wall {
                material,
                hp: material.starting_hp(),
            });
        }
    }

    pub fn wall_at(&self, p: TilePos) -> Option<Wall> {
        self.tile(p).and_then(|t| t.wall)
    }

    /// Place a closed door.
    pub fn set_door(&mut self, p: TilePos) {
        if let Some(t) = self.tile_mut(p) {
            t.door = Some(false);
        }
    }

    pub fn door_open(&self, p: TilePos) -> Option<bool> {
        self.tile(p).and_then(|t| t.door)
    }

    pub fn set_lander(&mut self, bounds: Rect, rotation: i32) {
        self.lander = Some(Lander {
            bounds,
            rotation: rotation.rem_euclid(360) / 90 * 90,
        });
    }

    /// Walls and closed doors. Out of bounds counts as solid.
    pub fn is_solid(&self, p: TilePos) -> bool {
        self.tile(p).map_or(true, Tile::is_solid)
    }

    /// Opaque to eyesight: solid or smoke-filled.
    pub fn blocks_sight(&self, p: TilePos) -> bool {
        self.tile(p).map_or(true, |t| t.is_solid() || t.smoke > 0)
    }

    /// Walkable. Doors open for whoever walks through.
    pub fn is_passable(&self, p: TilePos) -> bool {
        self.tile(p).is_some_and(|t| t.wall.is_none())
    }

    /// Whether a diagonal step from `p` to `q` squeezes between two solid tiles.
    pub fn corner_blocked(&self, p: TilePos, q: TilePos) -> bool {
        let dx = q.x - p.x;
        let dy = q.y - p.y;
        dx != 0 && dy != 0 && self.is_solid(p.offset(dx, 0)) && self.is_solid(p.offset(0, dy))
    }

    /// Whether sight (or a blast) passes from `p` into the adjacent tile `q`.
    pub fn can_see(&self, p: TilePos, q: TilePos) -> bool {
        debug_assert!(p.chebyshev(q) <= 1);
        !self.is_solid(q) && !self.corner_blocked(p, q)
    }

    /// Damage whatever structure stands on `p`.
    pub fn do_damage(&mut self, p: TilePos, damage: &DamageDesc) -> DamageOutcome {
        let mut outcome = DamageOutcome::default();
        let Some(tile) = self.tile_mut(p) else {
            return outcome;
        };
        let Some(mut wall) = tile.wall else {
            return outcome;
        };

        outcome.hit_structure = true;
        wall.hp -= damage.total().round() as i32;
        if wall.material == WallMaterial::Wood && damage.incendiary > 0.0 {
            tile.fire = tile.fire.max(FIRE_TURNS);
        }

        if wall.hp <= 0 {
            tile.wall = None;
            outcome.destroyed = Some(p);
            if wall.material == WallMaterial::FuelTank {
                tile.fire = tile.fire.max(FIRE_TURNS);
                outcome.blast = Some(p);
            }
            debug!(target: "squad::map", x = p.x, y = p.y, material = ?wall.material, "wall destroyed");
        } else {
            tile.wall = Some(wall);
        }
        outcome
    }

    pub fn smoke(&self, p: TilePos) -> u8 {
        self.tile(p).map_or(0, |t| t.smoke)
    }

    pub fn fire(&self, p: TilePos) -> u8 {
        self.tile(p).map_or(0, |t| t.fire)
    }

    pub fn add_smoke(&mut self, p: TilePos, turns: u8) {
        if let Some(t) = self.tile_mut(p) {
            t.smoke = t.smoke.max(turns);
        }
    }

    pub fn set_fire(&mut self, p: TilePos, turns: u8) {
        if let Some(t) = self.tile_mut(p) {
            t.fire = t.fire.max(turns);
        }
    }

    /// Open doors that have a unit on or next to them; close the rest.
    ///
    /// Returns true if any door changed state.
    pub fn process_doors(&mut self, occupied: &[TilePos]) -> bool {
        let mut changed = false;
        for y in 0..self.height {
            for x in 0..self.width {
                let p = TilePos::new(x, y);
                let Some(idx) = self.index(p) else { continue };
                let Some(open) = self.tiles[idx].door else {
                    continue;
                };
                let should_open = occupied.iter().any(|o| o.chebyshev(p) <= 1);
                if open != should_open {
                    self.tiles[idx].door = Some(should_open);
                    changed = true;
                }
            }
        }
        changed
    }

    /// Advance smoke and fire by one team phase. Changed tiles are unioned into `dirty`.
    pub fn do_sub_turn(&mut self, dirty: &mut Rect) {
        for idx in 0..self.tiles.len() {
            let p = TilePos::new(idx as i32 % self.width, idx as i32 / self.width);
            let tile = &mut self.tiles[idx];
            let mut changed = false;

            if tile.fire > 0 {
                tile.fire -= 1;
                tile.smoke = tile.smoke.max(2);
                changed = true;
                if let Some(mut wall) = tile.wall {
                    if wall.material == WallMaterial::Wood {
                        wall.hp -= FIRE_DAMAGE_PER_SUBTURN;
                        tile.wall = (wall.hp > 0).then_some(wall);
                    }
                }
            } else if tile.smoke > 0 {
                tile.smoke -= 1;
                changed = true;
            }

            if changed {
                *dirty = dirty.union(&Rect::point(p));
            }
        }
    }

    /// Cheapest walk from `start` to `end` around walls and `blocked` tiles.
    pub fn solve_path(&self, start: TilePos, end: TilePos, blocked: &HashSet<TilePos>) -> PathResult {
        path::solve_path(self, start, end, blocked)
    }

    pub fn add_storage(&mut self, p: TilePos, storage: Storage) {
        if let Some(t) = self.tile_mut(p) {
            match t.storage.as_mut() {
                Some(existing) => {
                    for item in storage.into_items() {
                        existing.add_item(item);
                    }
                }
                None => t.storage = Some(storage),
            }
        }
    }

    pub fn storage_at(&self, p: TilePos) -> Option<&Storage> {
        self.tile(p).and_then(|t| t.storage.as_ref())
    }

    /// Every storage location, row-major.
    pub fn storages(&self) -> impl Iterator<Item = (TilePos, &Storage)> + '_ {
        let w = self.width;
        self.tiles.iter().enumerate().filter_map(move |(i, t)| {
            t.storage
                .as_ref()
                .map(|s| (TilePos::new(i as i32 % w, i as i32 / w), s))
        })
    }

    /// Take the storage at `p` out of the map for editing. Pair with `release_storage`.
    pub fn lock_storage(&mut self, p: TilePos) -> Result<Storage, TerrainError> {
        let tile = self.tile_mut(p).ok_or(TerrainError::OutOfBounds(p))?;
        tile.storage.take().ok_or(TerrainError::NoStorage(p))
    }

    /// Put a locked storage back.
    pub fn release_storage(&mut self, p: TilePos, storage: Storage) -> Result<(), TerrainError> {
        let tile = self.tile_mut(p).ok_or(TerrainError::OutOfBounds(p))?;
        tile.storage = Some(storage);
        Ok(())
    }

    fn fog_index(&mut self, p: TilePos) -> Option<usize> {
        let idx = self.index(p)?;
        if self.fog.len() != self.tiles.len() {
            self.fog = vec![false; self.tiles.len()];
        }
        Some(idx)
    }

    /// Mark a tile as seen (or unseen) by the player.
    pub fn set_fog(&mut self, p: TilePos, visible: bool) {
        if let Some(idx) = self.fog_index(p) {
            self.fog[idx] = visible;
        }
    }

    pub fn fog_visible(&self, p: TilePos) -> bool {
        self.index(p)
            .and_then(|i| self.fog.get(i).copied())
            .unwrap_or(false)
    }

    pub fn fog_visible_count(&self) -> usize {
        self.fog.iter().filter(|v| **v).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use squad_core::weapon::{Clip, Item};

    fn room() -> TileMap {
        TileMap::from_layout(&[
            "......", //
            ".###..", //
            ".#.D..", //
            ".#ww..", //
            "..F..s", //
        ])
        .unwrap()
    }

    #[test]
    fn test_layout_parsing() {
        let map = room();
        assert_eq!((map.width(), map.height()), (6, 5));
        assert_eq!(map.wall_at(TilePos::new(1, 1)).map(|w| w.material), Some(WallMaterial::Stone));
        assert_eq!(map.door_open(TilePos::new(3, 2)), Some(false));
        assert!(map.storage_at(TilePos::new(5, 4)).is_some());
        assert!(map.is_solid(TilePos::new(-1, 0)), "off-map is solid");
    }

    #[test]
    fn test_layout_errors() {
        assert!(matches!(
            TileMap::from_layout(&["..", "..."]),
            Err(TerrainError::RaggedLayout { row: 1, .. })
        ));
        assert!(matches!(
            TileMap::from_layout(&[".?"]),
            Err(TerrainError::BadGlyph { glyph: '?', .. })
        ));
    }

    #[test]
    fn test_can_see_blocks_walls_and_squeezed_diagonals() {
        let map = TileMap::from_layout(&[
            "...", //
            ".#.", //
            "#..", //
        ])
        .unwrap();
        assert!(!map.can_see(TilePos::new(0, 0), TilePos::new(1, 1)), "into a wall");
        assert!(map.can_see(TilePos::new(0, 0), TilePos::new(1, 0)));
        assert!(
            !map.can_see(TilePos::new(0, 1), TilePos::new(1, 2)),
            "diagonal between two walls"
        );
        assert!(map.can_see(TilePos::new(2, 1), TilePos::new(1, 2)), "one side open");
    }

    #[test]
    fn test_doors_open_next_to_units() {
        let mut map = room();
        let door = TilePos::new(3, 2);
        assert!(!map.process_doors(&[TilePos::new(0, 0)]));
        assert!(map.process_doors(&[TilePos::new(4, 2)]));
        assert_eq!(map.door_open(door), Some(true));
        assert!(!map.blocks_sight(door));
        assert!(map.process_doors(&[]));
        assert_eq!(map.door_open(door), Some(false));
    }

    #[test]
    fn test_fuel_tank_destruction_reports_blast() {
        let mut map = room();
        let tank = TilePos::new(2, 4);
        let out = map.do_damage(tank, &DamageDesc::new(FUEL_TANK_HP as f32, 0.0, 0.0));
        assert_eq!(out.destroyed, Some(tank));
        assert_eq!(out.blast, Some(tank));
        assert!(map.is_passable(tank));
        assert!(map.fire(tank) > 0);
    }

    #[test]
    fn test_wood_ignites_and_burns_down() {
        let mut map = room();
        let wood = TilePos::new(2, 3);
        let out = map.do_damage(wood, &DamageDesc::new(0.0, 0.0, 2.0));
        assert!(out.hit_structure);
        assert!(out.destroyed.is_none());
        assert_eq!(map.fire(wood), FIRE_TURNS);

        let mut dirty = Rect::invalid();
        for _ in 0..3 {
            map.do_sub_turn(&mut dirty);
        }
        assert!(map.wall_at(wood).is_none(), "fire burns wooden walls away");
        assert!(dirty.contains(wood));
        assert!(map.smoke(wood) > 0);
    }

    #[test]
    fn test_smoke_decays_each_sub_turn() {
        let mut map = TileMap::new(4, 4);
        let p = TilePos::new(1, 1);
        map.add_smoke(p, 2);
        assert!(map.blocks_sight(p));
        let mut dirty = Rect::invalid();
        map.do_sub_turn(&mut dirty);
        map.do_sub_turn(&mut dirty);
        assert_eq!(map.smoke(p), 0);
        assert!(!map.blocks_sight(p));
        assert_eq!(dirty, Rect::point(p));
    }

    #[test]
    fn test_storage_lock_release() {
        let mut map = room();
        let p = TilePos::new(5, 4);
        let mut storage = map.lock_storage(p).unwrap();
        assert!(map.storage_at(p).is_none(), "locked storage is out of the map");
        assert_eq!(map.lock_storage(p), Err(TerrainError::NoStorage(p)));
        storage.add_item(Item::Clip(Clip {
            kind: "cell".into(),
            rounds: 4,
        }));
        map.release_storage(p, storage).unwrap();
        assert_eq!(map.storage_at(p).map(|s| s.clip_count("cell")), Some(1));
        assert_eq!(map.storages().count(), 1);
    }

    #[test]
    fn test_map_survives_json_without_fog() {
        let mut map = room();
        map.set_fog(TilePos::new(0, 0), true);
        map.add_smoke(TilePos::new(4, 0), 3);
        let json = serde_json::to_string(&map).unwrap();
        let mut back: TileMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back.smoke(TilePos::new(4, 0)), 3);
        assert_eq!(back.wall_at(TilePos::new(1, 1)), map.wall_at(TilePos::new(1, 1)));
        assert!(!back.fog_visible(TilePos::new(0, 0)), "fog is rebuilt, not saved");
        back.set_fog(TilePos::new(0, 0), true);
        assert!(back.fog_visible(TilePos::new(0, 0)));
    }

    #[test]
    fn test_fog_defaults_hidden() {
        let mut map = TileMap::new(3, 3);
        assert!(!map.fog_visible(TilePos::new(1, 1)));
        map.set_fog(TilePos::new(1, 1), true);
        assert!(map.fog_visible(TilePos::new(1, 1)));
        assert_eq!(map.fog_visible_count(), 1);
    }
}
