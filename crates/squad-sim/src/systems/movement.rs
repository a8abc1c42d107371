//! Walking units along their motion path.
//!
//! A move consumes travel along the current segment each tick. Crossing into a
//! new tile charges the segment's TU, commits the unit's position, and ends the
//! tick with a decision point so sightings and reaction fire see every tile.

use tracing::debug;

use squad_core::flags::ActionResult;
use squad_core::types::{normalize_degrees, travel};

use crate::action::Action;
use crate::world::BattleWorld;

/// Advance the Move on top of the stack.
pub fn run(world: &mut BattleWorld, delta_ms: u32) -> ActionResult {
    let speed = world.config.move_speed;
    let unseen = world.config.unseen_move_multiplier;

    let Some(Action::Move { unit, path, cursor }) = world.stack.top_mut() else {
        return ActionResult::empty();
    };
    let unit = *unit;

    if path.at_end(cursor) {
        world.stack.pop();
        return ActionResult::STEP_COMPLETE | ActionResult::UNIT_ACTION_COMPLETE;
    }

    let here = path.tile(cursor.step);
    let next = path.tile(cursor.step + 1);

    // Someone stepped into the way since the path was solved.
    if cursor.fraction == 0.0 && world.units.iter().any(|u| u.is_alive() && u.id != unit && u.pos == next) {
        debug!(target: "squad::action", unit, x = next.x, y = next.y, "move blocked");
        world.stack.pop();
        return ActionResult::STEP_COMPLETE | ActionResult::UNIT_ACTION_COMPLETE;
    }

    let mut speed = speed;
    if !world.map.fog_visible(here) && !world.map.fog_visible(next) {
        speed *= unseen;
    }

    let step_before = cursor.step;
    let segment_cost = path.segment_cost(step_before);
    path.travel(travel(delta_ms, speed), cursor);
    let pose = path.get_pos(cursor);
    let crossed = cursor.step > step_before;
    let arrived = path.at_end(cursor);

    let u = &mut world.units[unit];
    u.rotation = normalize_degrees(pose.rotation);
    if !crossed {
        return ActionResult::empty();
    }

    u.pos = next;
    u.use_tu(segment_cost);
    debug!(target: "squad::action", unit, x = next.x, y = next.y, tu = u.tu, "step");
    world.vis.invalidate_unit(unit);

    if arrived {
        world.stack.pop();
        ActionResult::STEP_COMPLETE | ActionResult::UNIT_ACTION_COMPLETE
    } else {
        ActionResult::STEP_COMPLETE
    }
}
