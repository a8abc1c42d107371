//! Decision-point responses to new sightings: reaction fire from the side that
//! is not moving, and interrupting a move that just revealed an enemy.

use glam::Vec2;
use rand::Rng;
use tracing::{debug, info};

use squad_core::enums::{Team, WeaponMode};
use squad_core::events::{BattleEvent, TargetEvent};

use crate::systems::shoot::push_shoot_action;
use crate::world::BattleWorld;

/// Modes tried for a reaction shot, in order.
const REACTION_MODES: [WeaponMode; 2] = [WeaponMode::Auto, WeaponMode::Snap];

/// Whether the current team is still free to be interrupted: nothing is running,
/// or the top action is one of its own moves sitting on a tile boundary.
fn at_interruptible_point(world: &BattleWorld) -> bool {
    if world.stack.is_empty() {
        return true;
    }
    match world.stack.top_move() {
        Some((unit, cursor)) => world.team_of(unit) == Some(world.current_team) && cursor.fraction == 0.0,
        None => false,
    }
}

/// Let opponents of the current team shoot at units they just spotted.
///
/// Every event of an opponent seeing a current-team unit is consumed, whether or
/// not it leads to a shot.
pub fn do_reaction_fire(world: &mut BattleWorld) {
    let current = world.current_team;
    let Some(anti) = current.reaction_opponent() else {
        return;
    };
    if !at_interruptible_point(world) {
        return;
    }

    let mut i = 0;
    while i < world.targets.events().len() {
        let TargetEvent::Unit { viewer, target } = world.targets.events()[i] else {
            i += 1;
            continue;
        };
        if world.team_of(viewer) != Some(anti) || world.team_of(target) != Some(current) {
            i += 1;
            continue;
        }
        world.targets.remove_at(i);
        try_reaction_shot(world, viewer, target);
    }
}

fn try_reaction_shot(world: &mut BattleWorld, shooter: usize, target: usize) {
    let (Some(s), Some(t)) = (world.units.get(shooter), world.units.get(target)) else {
        return;
    };
    if !s.is_alive() || !t.is_alive() || s.weapon().is_none() {
        return;
    }

    let delta = t.pos.center() - s.pos.center();
    let to_target = Vec2::new(delta.x, delta.z).normalize_or_zero();
    let tuning = world.config.reaction;
    let alignment = if to_target == Vec2::ZERO {
        1.0
    } else {
        s.facing().dot(to_target) * tuning.facing_weight + tuning.facing_bias
    };
    let reaction = s.stats.reaction * alignment;
    let error = tuning.error_base - alignment;
    let aim = t.target_point();
    let distance_sq = s.pos.distance_sq(t.pos);
    let explosive_range_sq = world.config.explosive_range * world.config.explosive_range;

    let roll: f32 = world.rng.gen();
    debug!(target: "squad::reaction", shooter, target, roll, reaction, error, "reaction roll");
    if roll > reaction {
        return;
    }

    for mode in REACTION_MODES {
        let s = &world.units[shooter];
        if !s.can_fire(mode) {
            continue;
        }
        if s.weapon().is_some_and(|w| w.is_explosive(mode)) && distance_sq < explosive_range_sq {
            continue;
        }
        let clear_move = world.config.reaction.clear_move_if_shoot;
        if push_shoot_action(world, shooter, aim, mode, error, clear_move) {
            info!(target: "squad::reaction", shooter, target, ?mode, "reaction fire");
            world.events.push(BattleEvent::ReactionFire { shooter, target });
            return;
        }
    }
}

/// Stop a move the moment it reveals a new enemy, before the first step is
/// committed. Returns true if the stack was cleared.
///
/// For a player-controlled team only team-level sightings count, so a soldier
/// spotting an enemy a squadmate already sees keeps walking.
pub fn stop_for_new_team_target(world: &mut BattleWorld) -> bool {
    if world.stack.len() != 1 {
        return false;
    }
    let Some((mover, cursor)) = world.stack.top_move() else {
        return false;
    };
    let current = world.current_team;
    if world.team_of(mover) != Some(current) || cursor.fraction != 0.0 {
        return false;
    }

    let ai = world.ai_controls(current);
    let units = &world.units;
    let removed = world.targets.remove_where(|event| {
        let viewer_team = match *event {
            TargetEvent::Unit { viewer, .. } => units.get(viewer).map(|u| u.team),
            TargetEvent::Team { team, .. } => Some(team),
        };
        let target_team = units.get(event.target()).map(|u| u.team);
        (ai || event.is_team())
            && viewer_team == Some(current)
            && target_team.is_some_and(|t| t != Team::Civilian)
    });

    if removed == 0 {
        return false;
    }
    world.stack.clear();
    info!(target: "squad::reaction", unit = mover, sightings = removed, "move interrupted");
    world.events.push(BattleEvent::MoveInterrupted { unit: mover });
    true
}
