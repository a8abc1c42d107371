//! Turning units in place.

use squad_core::flags::ActionResult;
use squad_core::types::{min_delta_degrees, normalize_degrees, travel};

use crate::action::Action;
use crate::world::BattleWorld;

pub fn run(world: &mut BattleWorld, delta_ms: u32) -> ActionResult {
    let Some(&Action::Rotate { unit, rotation }) = world.stack.top() else {
        return ActionResult::empty();
    };
    let step = travel(delta_ms, world.config.rotation_speed);
    let u = &mut world.units[unit];
    let (delta, bias) = min_delta_degrees(u.rotation, rotation);

    if delta <= step {
        u.rotation = normalize_degrees(rotation);
        world.vis.invalidate_unit(unit);
        world.stack.pop();
        return ActionResult::UNIT_ACTION_COMPLETE;
    }
    u.rotation = normalize_degrees(u.rotation + bias * step);
    ActionResult::empty()
}
