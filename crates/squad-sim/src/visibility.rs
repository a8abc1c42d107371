//! Visibility model: who sees whom, recomputed lazily after invalidation.
//!
//! Rows (what a viewer sees) and columns (who sees a target) are marked dirty
//! when a unit moves or the map changes; `calc_vis_map` brings the matrix up to
//! date before anyone reads it.

use squad_core::constants::MAX_UNITS;
use squad_core::enums::Team;
use squad_core::targets::VisMatrix;
use squad_core::types::{Rect, TilePos};
use squad_core::unit::Unit;
use squad_terrain::grid::TileMap;
use squad_terrain::los::has_line_of_sight;

#[derive(Debug, Clone)]
pub struct Visibility {
    matrix: VisMatrix,
    dirty_rows: Vec<bool>,
    dirty_cols: Vec<bool>,
    /// Terran sight changed since the fog was last rewritten.
    fog_dirty: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self::new()
    }
}

impl Visibility {
    pub fn new() -> Self {
        Self {
            matrix: VisMatrix::new(),
            dirty_rows: vec![true; MAX_UNITS],
            dirty_cols: vec![true; MAX_UNITS],
            fog_dirty: true,
        }
    }

    /// The unit moved, turned, fell, or changed state.
    pub fn invalidate_unit(&mut self, id: usize) {
        if id < MAX_UNITS {
            self.dirty_rows[id] = true;
            self.dirty_cols[id] = true;
        }
    }

    /// Map geometry changed inside `dirty`. `None` invalidates everything.
    ///
    /// Only viewers within sight range of the rect can have their view changed.
    pub fn invalidate_all(&mut self, dirty: Option<Rect>, units: &[Unit], sight_range: i32) {
        match dirty {
            None => {
                self.dirty_rows.iter_mut().for_each(|d| *d = true);
                self.dirty_cols.iter_mut().for_each(|d| *d = true);
            }
            Some(rect) if !rect.is_valid() => {}
            Some(rect) => {
                let reach = rect.outset(sight_range);
                for unit in units.iter().filter(|u| u.in_use) {
                    if reach.contains(unit.pos) {
                        self.dirty_rows[unit.id.min(MAX_UNITS - 1)] = true;
                    }
                }
            }
        }
        self.fog_dirty = true;
    }

    /// Bring the matrix up to date and return it.
    pub fn calc_vis_map(&mut self, units: &[Unit], map: &TileMap, sight_range: i32) -> &VisMatrix {
        for viewer in 0..MAX_UNITS.min(units.len()) {
            for target in 0..MAX_UNITS.min(units.len()) {
                if !(self.dirty_rows[viewer] || self.dirty_cols[target]) {
                    continue;
                }
                let sees = can_see_unit(map, &units[viewer], &units[target], sight_range);
                if self.matrix.get(viewer, target) != sees {
                    self.matrix.set(viewer, target, sees);
                    if units[viewer].team == Team::Terran {
                        self.fog_dirty = true;
                    }
                }
            }
        }
        for (viewer, unit) in units.iter().enumerate().take(MAX_UNITS) {
            if self.dirty_rows[viewer] && unit.team == Team::Terran {
                self.fog_dirty = true;
            }
        }
        self.dirty_rows.iter_mut().for_each(|d| *d = false);
        self.dirty_cols.iter_mut().for_each(|d| *d = false);
        &self.matrix
    }

    /// Last computed matrix. Stale if anything was invalidated since.
    pub fn matrix(&self) -> &VisMatrix {
        &self.matrix
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_rows.iter().chain(&self.dirty_cols).any(|d| *d)
    }

    /// Whether any alive member of `team` can see `tile`.
    pub fn team_can_see(&self, team: Team, tile: TilePos, units: &[Unit], map: &TileMap, sight_range: i32) -> bool {
        units[team.unit_range()]
            .iter()
            .filter(|u| u.is_alive())
            .any(|u| has_line_of_sight(map, u.pos, tile, sight_range))
    }

    /// Returns true (once) when the player's fog needs rewriting.
    pub fn fog_check_and_clear(&mut self) -> bool {
        std::mem::take(&mut self.fog_dirty)
    }
}

fn can_see_unit(map: &TileMap, viewer: &Unit, target: &Unit, sight_range: i32) -> bool {
    viewer.id != target.id
        && viewer.is_alive()
        && target.is_alive()
        && has_line_of_sight(map, viewer.pos, target.pos, sight_range)
}

/// Rewrite the player's fog of war from what the Terran team can see.
pub fn set_fog_of_war(units: &[Unit], map: &mut TileMap, sight_range: i32) {
    let terrans: Vec<TilePos> = units[Team::Terran.unit_range()]
        .iter()
        .filter(|u| u.is_alive())
        .map(|u| u.pos)
        .collect();
    let lander = map.lander.map(|l| l.bounds);

    for y in 0..map.height() {
        for x in 0..map.width() {
            let tile = TilePos::new(x, y);
            let seen = lander.is_some_and(|b| b.contains(tile))
                || terrans
                    .iter()
                    .any(|&from| has_line_of_sight(map, from, tile, sight_range));
            map.set_fog(tile, seen);
        }
    }
}
