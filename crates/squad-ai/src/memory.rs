//! Per-team AI memory: last known enemy positions, travel goals, and
//! per-phase bookkeeping that keeps thinking bounded.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use squad_core::constants::{MAX_THINK_STEPS, MAX_TURNS_LKP, MAX_UNITS};
use squad_core::enums::Team;
use squad_core::targets::VisMatrix;
use squad_core::types::TilePos;
use squad_core::unit::Unit;

/// Where an enemy was last seen, and how many turns ago.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastKnown {
    pub pos: TilePos,
    pub turns: u32,
}

#[derive(Debug, Clone)]
pub struct AiMemory {
    pub team: Team,
    pub rng: ChaCha8Rng,
    pub max_think_steps: u32,
    lkp: Vec<Option<LastKnown>>,
    travel: Vec<Option<TilePos>>,
    think_count: Vec<u32>,
    /// Per-phase one-shot steps (inventory, guard turn).
    inventoried: Vec<bool>,
    rotated: Vec<bool>,
}

impl AiMemory {
    pub fn new(team: Team, seed: u64) -> Self {
        // One stream per team, independent of the engine's.
        let stream = seed ^ (0x5eed_0000_u64 + team.index() as u64 * 0x9e37_79b9);
        Self {
            team,
            rng: ChaCha8Rng::seed_from_u64(stream),
            max_think_steps: MAX_THINK_STEPS,
            lkp: vec![None; MAX_UNITS],
            travel: vec![None; MAX_UNITS],
            think_count: vec![0; MAX_UNITS],
            inventoried: vec![false; MAX_UNITS],
            rotated: vec![false; MAX_UNITS],
        }
    }

    /// Reset per-phase counters and refresh last known positions from what the team sees.
    pub fn start_turn(&mut self, units: &[Unit], vis: &VisMatrix) {
        self.think_count.iter_mut().for_each(|c| *c = 0);
        self.inventoried.iter_mut().for_each(|f| *f = false);
        self.rotated.iter_mut().for_each(|f| *f = false);

        for (slot, entry) in self.lkp.iter_mut().enumerate() {
            let Some(target) = units.get(slot) else {
                *entry = None;
                continue;
            };
            if !target.is_alive() || !self.team.is_hostile_to(target.team) {
                *entry = None;
            } else if vis.team_sees(self.team, slot) {
                *entry = Some(LastKnown {
                    pos: target.pos,
                    turns: 0,
                });
            } else if let Some(known) = entry {
                known.turns += 1;
                if known.turns > MAX_TURNS_LKP {
                    *entry = None;
                }
            }
        }
    }

    /// Learn the position of `unit`. Quality 0 carries no information.
    pub fn inform(&mut self, unit: &Unit, quality: u8) {
        if quality == 0 || !self.team.is_hostile_to(unit.team) {
            return;
        }
        if let Some(entry) = self.lkp.get_mut(unit.id) {
            *entry = Some(LastKnown {
                pos: unit.pos,
                turns: 0,
            });
        }
    }

    pub fn last_known(&self, slot: usize) -> Option<LastKnown> {
        self.lkp.get(slot).copied().flatten()
    }

    pub fn forget(&mut self, slot: usize) {
        if let Some(entry) = self.lkp.get_mut(slot) {
            *entry = None;
        }
    }

    /// Freshest remembered enemy closest to `from`.
    pub fn nearest_known(&self, from: TilePos) -> Option<(usize, LastKnown)> {
        self.lkp
            .iter()
            .enumerate()
            .filter_map(|(slot, k)| k.map(|k| (slot, k)))
            .min_by_key(|(slot, k)| (k.turns, from.distance_sq(k.pos), *slot))
    }

    pub fn travel_goal(&self, unit: usize) -> Option<TilePos> {
        self.travel.get(unit).copied().flatten()
    }

    pub fn set_travel_goal(&mut self, unit: usize, goal: Option<TilePos>) {
        if let Some(entry) = self.travel.get_mut(unit) {
            *entry = goal;
        }
    }

    /// Count a think call. Returns false once the unit has used up its think budget.
    pub fn count_think(&mut self, unit: usize) -> bool {
        let Some(count) = self.think_count.get_mut(unit) else {
            return false;
        };
        *count += 1;
        *count <= self.max_think_steps
    }

    pub fn think_count(&self, unit: usize) -> u32 {
        self.think_count.get(unit).copied().unwrap_or(0)
    }

    /// Claim the unit's inventory step for this phase.
    pub fn take_inventory_step(&mut self, unit: usize) -> bool {
        take_once(&mut self.inventoried, unit)
    }

    /// Claim the unit's guard rotation for this phase.
    pub fn take_rotate_step(&mut self, unit: usize) -> bool {
        take_once(&mut self.rotated, unit)
    }
}

fn take_once(flags: &mut [bool], unit: usize) -> bool {
    match flags.get_mut(unit) {
        Some(flag) if !*flag => {
            *flag = true;
            true
        }
        _ => false,
    }
}
