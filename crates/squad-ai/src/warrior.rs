//! Aggressive strategy: shoot, re-arm, then follow standing orders.

use tracing::debug;

use squad_core::enums::Team;
use squad_core::flags::AiFlags;
use squad_core::targets::VisMatrix;
use squad_core::unit::Unit;

use crate::action::{ThinkOutcome, Thought};
use crate::context::AiContext;
use crate::memory::AiMemory;
use crate::think::*;

#[derive(Debug, Clone)]
pub struct WarriorAi {
    pub memory: AiMemory,
}

impl WarriorAi {
    pub fn new(team: Team, seed: u64) -> Self {
        Self {
            memory: AiMemory::new(team, seed),
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

        if let ThinkOutcome::Action(action) = think_shoot(ctx, unit) {
            return Thought::act(action);
        }

        match think_move_to_ammo(ctx, unit) {
            ThinkOutcome::SolvedNoAction => {
                if let ThinkOutcome::Action(action) = think_inventory(mem, unit) {
                    return Thought::act(action);
                }
            }
            ThinkOutcome::Action(action) => return Thought::act(action),
            ThinkOutcome::NotOption | ThinkOutcome::NoAction => {}
        }

        let outcome = if unit.ai_flags.contains(AiFlags::TRAVEL) {
            think_travel(mem, ctx, unit)
        } else if unit.ai_flags.contains(AiFlags::WANDER) {
            think_wander(mem, ctx, unit)
        } else if unit.ai_flags.contains(AiFlags::GUARD) {
            think_rotate(mem, unit)
        } else {
            think_search(mem, ctx, unit)
        };
        match outcome {
            ThinkOutcome::Action(action) => Thought::act(action),
            _ => {
                debug!(target: "squad::ai", unit = unit.id, flags = ?unit.ai_flags, "unit done");
                Thought::done()
            }
        }
    }
}
