//! Delay and camera actions. These only move time and the view.

use glam::Vec3;

use squad_core::constants::{CAMERA_CENTER_HALF, CAMERA_VIEW_HALF};
use squad_core::flags::ActionResult;
use squad_core::types::travel;

use crate::action::Action;
use crate::world::BattleWorld;

pub fn run_delay(world: &mut BattleWorld, delta_ms: u32) -> ActionResult {
    let Some(Action::Delay { remaining_ms }) = world.stack.top_mut() else {
        return ActionResult::empty();
    };
    if *remaining_ms <= delta_ms {
        world.stack.pop();
        return ActionResult::OTHER_ACTION_COMPLETE;
    }
    *remaining_ms -= delta_ms;
    ActionResult::empty()
}

/// Timed pan from one ground point to another.
pub fn run_camera(world: &mut BattleWorld, delta_ms: u32) -> ActionResult {
    let Some(Action::Camera {
        from,
        to,
        duration_ms,
        elapsed_ms,
    }) = world.stack.top_mut()
    else {
        return ActionResult::empty();
    };
    *elapsed_ms = elapsed_ms.saturating_add(delta_ms);
    if *elapsed_ms >= *duration_ms {
        world.camera = *to;
        world.stack.pop();
        return ActionResult::OTHER_ACTION_COMPLETE;
    }
    let t = *elapsed_ms as f32 / *duration_ms as f32;
    world.camera = from.lerp(*to, t);
    ActionResult::empty()
}

/// Scroll until the target is inside the view inset.
pub fn run_bounds(world: &mut BattleWorld, delta_ms: u32) -> ActionResult {
    let Some(&Action::CameraBounds { target, center }) = world.stack.top() else {
        return ActionResult::empty();
    };
    let half = if center { CAMERA_CENTER_HALF } else { CAMERA_VIEW_HALF };
    let step = travel(delta_ms, world.config.camera_speed);
    let goal = Vec3::new(target.x, world.camera.y, target.z);
    let offset = goal - world.camera;

    if (offset.x.abs() <= half && offset.z.abs() <= half) || offset.length() <= step {
        if offset.length() <= step {
            world.camera = goal;
        }
        world.stack.pop();
        return ActionResult::OTHER_ACTION_COMPLETE;
    }
    world.camera += offset.normalize_or_zero() * step;
    ActionResult::empty()
}
