//! Read-only world view handed to an AI for one think call.

use std::collections::HashSet;

use squad_core::targets::VisMatrix;
use squad_core::types::TilePos;
use squad_core::unit::Unit;
use squad_terrain::grid::TileMap;

pub struct AiContext<'a> {
    /// The full unit arena, indexed by slot.
    pub units: &'a [Unit],
    pub vis: &'a VisMatrix,
    pub map: &'a TileMap,
    /// Tiles occupied by units that are still standing.
    pub blocked: &'a HashSet<TilePos>,
}

impl<'a> AiContext<'a> {
    pub fn unit(&self, id: usize) -> Option<&'a Unit> {
        self.units.get(id)
    }

    /// Alive units `viewer` currently sees that are hostile to it.
    pub fn visible_enemies(&self, viewer: &Unit) -> Vec<&'a Unit> {
        let units = self.units;
        self.vis
            .seen_by(viewer.id)
            .filter_map(|t| units.get(t))
            .filter(|t| t.is_alive() && viewer.team.is_hostile_to(t.team))
            .collect()
    }
}
