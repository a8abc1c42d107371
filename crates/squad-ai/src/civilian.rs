//! Passive strategy: civilians never fight. They run from aliens they can see
//! and otherwise mill about.

use squad_core::enums::Team;
use squad_core::targets::VisMatrix;
use squad_core::unit::Unit;

use crate::action::{ThinkOutcome, Thought};
use crate::context::AiContext;
use crate::memory::AiMemory;
use crate::think::{think_base, think_flee, think_wander};

#[derive(Debug, Clone)]
pub struct CivilianAi {
    pub memory: AiMemory,
}

impl CivilianAi {
    pub fn new(seed: u64) -> Self {
        Self {
            memory: AiMemory::new(Team::Civilian, seed),
        }
    }

    pub fn start_turn(&mut self, units: &[Unit], vis: &VisMatrix) {
        self.memory.start_turn(units, vis);
    }

    pub fn think(&mut self, unit: &Unit, ctx: &AiContext<'_>) -> Thought {
        let mem = &mut self.memory;
        if think_base(mem, unit).is_some() {
            return Thought::done();
        }
        if let ThinkOutcome::Action(action) = think_flee(ctx, unit) {
            return Thought::act(action);
        }
        // One stroll per phase.
        if mem.think_count(unit.id) == 1 {
            if let ThinkOutcome::Action(action) = think_wander(mem, ctx, unit) {
                return Thought::act(action);
            }
        }
        Thought::done()
    }
}
