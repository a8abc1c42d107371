//! Per-tick action processing.
//!
//! Each system advances one kind of action on top of the stack. Systems take
//! `&mut BattleWorld` and report what they accomplished as an `ActionResult`.

pub mod camera;
pub mod hit;
pub mod movement;
pub mod reaction;
pub mod rotate;
pub mod shoot;
pub mod snapshot;

use tracing::trace;

use squad_core::flags::ActionResult;

use crate::action::Action;
use crate::world::BattleWorld;

/// Advance the top of the action stack by one tick of `delta_ms`.
pub fn process_action(world: &mut BattleWorld, delta_ms: u32) -> ActionResult {
    let Some(top) = world.stack.top() else {
        return ActionResult::empty();
    };

    // A unit that went down after its action was queued forfeits it.
    if let Some(unit) = top.unit() {
        if !world.units.get(unit).is_some_and(|u| u.is_alive()) {
            trace!(target: "squad::action", unit, kind = ?top.kind(), "discarding action of downed unit");
            world.stack.pop();
            return ActionResult::STEP_COMPLETE;
        }
    }

    match top {
        Action::Move { .. } => movement::run(world, delta_ms),
        Action::Rotate { .. } => rotate::run(world, delta_ms),
        Action::Shoot { .. } => shoot::run(world),
        Action::Hit { .. } => hit::run(world),
        Action::Delay { .. } => camera::run_delay(world, delta_ms),
        Action::Camera { .. } => camera::run_camera(world, delta_ms),
        Action::CameraBounds { .. } => camera::run_bounds(world, delta_ms),
    }
}
