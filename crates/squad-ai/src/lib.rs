//! AI decision engine for the squad battle.
//!
//! One strategy per AI-controlled team. Each `think` call looks at a single unit
//! and proposes at most one action; the turn controller decides whether to
//! queue it. Strategies only read the world.

pub mod action;
pub mod civilian;
pub mod context;
pub mod memory;
pub mod think;
pub mod warrior;

pub use squad_core as core;

pub use action::{AiAction, ThinkOutcome, Thought};
pub use civilian::CivilianAi;
pub use context::AiContext;
pub use warrior::WarriorAi;

use squad_core::enums::Team;
use squad_core::targets::VisMatrix;
use squad_core::unit::Unit;

/// The capability every team strategy provides.
pub trait Ai {
    fn team(&self) -> Team;

    /// Reset per-phase memory at the start of the team's phase.
    fn start_turn(&mut self, units: &[Unit], vis: &VisMatrix);

    /// Tell the AI where `unit` is. Higher quality means a better fix.
    fn inform(&mut self, unit: &Unit, quality: u8);

    /// Decide the next action for `unit_id`.
    fn think(&mut self, unit_id: usize, ctx: &AiContext<'_>) -> Thought;
}

/// Strategy chosen per team at battle setup.
#[derive(Debug, Clone)]
pub enum TeamAi {
    Warrior(WarriorAi),
    Civilian(CivilianAi),
}

impl TeamAi {
    pub fn warrior(team: Team, seed: u64) -> Self {
        TeamAi::Warrior(WarriorAi::new(team, seed))
    }

    pub fn civilian(seed: u64) -> Self {
        TeamAi::Civilian(CivilianAi::new(seed))
    }

    /// Cap the think steps each unit gets per phase.
    pub fn with_max_think_steps(mut self, steps: u32) -> Self {
        match &mut self {
            TeamAi::Warrior(ai) => ai.memory.max_think_steps = steps,
            TeamAi::Civilian(ai) => ai.memory.max_think_steps = steps,
        }
        self
    }

    fn memory(&self) -> &memory::AiMemory {
        match self {
            TeamAi::Warrior(ai) => &ai.memory,
            TeamAi::Civilian(ai) => &ai.memory,
        }
    }
}

impl Ai for TeamAi {
    fn team(&self) -> Team {
        self.memory().team
    }

    fn start_turn(&mut self, units: &[Unit], vis: &VisMatrix) {
        match self {
            TeamAi::Warrior(ai) => ai.start_turn(units, vis),
            TeamAi::Civilian(ai) => ai.start_turn(units, vis),
        }
    }

    fn inform(&mut self, unit: &Unit, quality: u8) {
        match self {
            TeamAi::Warrior(ai) => ai.memory.inform(unit, quality),
            TeamAi::Civilian(ai) => ai.memory.inform(unit, quality),
        }
    }

    fn think(&mut self, unit_id: usize, ctx: &AiContext<'_>) -> Thought {
        let Some(unit) = ctx.unit(unit_id) else {
            return Thought::done();
        };
        match self {
            TeamAi::Warrior(ai) => ai.think(unit, ctx),
            TeamAi::Civilian(ai) => ai.think(unit, ctx),
        }
    }
}

#[cfg(test)]
mod tests;
