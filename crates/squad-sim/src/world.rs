//! Mutable battle state shared by the action systems.

use std::collections::HashSet;

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use squad_ai::TeamAi;
use squad_core::enums::Team;
use squad_core::events::BattleEvent;
use squad_core::state::{AccuracyView, SelectionView};
use squad_core::types::TilePos;
use squad_core::unit::Unit;
use squad_terrain::grid::TileMap;

use crate::action::ActionStack;
use crate::config::BattleConfig;
use crate::targets::TargetLog;
use crate::visibility::Visibility;

/// Predicted versus actual hits of non-explosive shots.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AccuracyLedger {
    shots: u32,
    hits: u32,
    predicted: f32,
}

impl AccuracyLedger {
    pub fn record(&mut self, chance: f32, hit: bool) {
        self.shots += 1;
        self.predicted += chance;
        if hit {
            self.hits += 1;
        }
    }

    pub fn view(&self) -> AccuracyView {
        AccuracyView {
            shots: self.shots,
            hits: self.hits,
            predicted: self.predicted,
        }
    }
}

pub struct BattleWorld {
    /// Fixed arena of `MAX_UNITS` slots, bucketed by team.
    pub units: Vec<Unit>,
    pub map: TileMap,
    pub stack: ActionStack,
    pub vis: Visibility,
    pub targets: TargetLog,
    pub current_team: Team,
    pub turn_count: u32,
    pub rng: ChaCha8Rng,
    /// Ground point the view is centred on.
    pub camera: Vec3,
    pub selection: SelectionView,
    pub accuracy: AccuracyLedger,
    /// Feed drained into the next snapshot.
    pub events: Vec<BattleEvent>,
    pub config: BattleConfig,
    /// Strategy per team index; `None` for player control.
    pub ais: [Option<TeamAi>; 3],
}

impl BattleWorld {
    pub fn new(units: Vec<Unit>, map: TileMap, config: BattleConfig, seed: u64) -> Self {
        let camera = map
            .lander
            .map(|l| l.bounds.min.center())
            .unwrap_or(Vec3::ZERO);
        Self {
            units,
            map,
            stack: ActionStack::new(),
            vis: Visibility::new(),
            targets: TargetLog::new(),
            current_team: Team::Alien,
            turn_count: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            camera,
            selection: SelectionView::default(),
            accuracy: AccuracyLedger::default(),
            events: Vec::new(),
            config,
            ais: [None, None, None],
        }
    }

    pub fn sight_range(&self) -> i32 {
        self.config.sight_range(self.map.day_time)
    }

    pub fn team_of(&self, unit: usize) -> Option<Team> {
        self.units.get(unit).map(|u| u.team)
    }

    /// Tiles held by standing units.
    pub fn occupied_tiles(&self) -> Vec<TilePos> {
        self.units
            .iter()
            .filter(|u| u.is_alive())
            .map(|u| u.pos)
            .collect()
    }

    /// Path blockers for `mover`: every other standing unit.
    pub fn blockers(&self, mover: Option<usize>) -> HashSet<TilePos> {
        self.units
            .iter()
            .filter(|u| u.is_alive() && Some(u.id) != mover)
            .map(|u| u.pos)
            .collect()
    }

    /// Standing unit on `tile`.
    pub fn unit_at(&self, tile: TilePos) -> Option<usize> {
        self.units
            .iter()
            .find(|u| u.is_alive() && u.pos == tile)
            .map(|u| u.id)
    }

    pub fn ai_controls(&self, team: Team) -> bool {
        self.ais[team.index()].is_some()
    }

    /// Bring the visibility matrix up to date.
    pub fn refresh_visibility(&mut self) {
        let range = self.sight_range();
        self.vis.calc_vis_map(&self.units, &self.map, range);
    }
}
