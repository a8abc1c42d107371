//! Queuing and resolving shots.
//!
//! `push_shoot_action` pays for a trigger pull and queues one Shoot per round.
//! `run` resolves the Shoot on top of the stack as a single ray cast against
//! unit, weapon, and wall hitboxes, then queues the Hit it produced.

use glam::Vec3;
use tracing::debug;

use squad_ai::Ai;
use squad_core::constants::{UNIT_HEIGHT, UNIT_WIDTH, WALL_HEIGHT, WEAPON_HALF_SIZE, WORLD_HEIGHT};
use squad_core::enums::WeaponMode;
use squad_core::events::BattleEvent;
use squad_core::flags::ActionResult;
use squad_core::types::{min_delta_degrees, TilePos};
use squad_core::weapon::{BulletSpread, BulletTarget};

use crate::action::{Action, Struck};
use crate::geometry::{intersect_model, world_exit, Aabb, Ray};
use crate::world::BattleWorld;

/// Quality of the position fix an AI gets from hearing a shot.
const SHOT_INFORM_QUALITY: u8 = 2;

/// Resolve the Shoot on top of the stack.
pub fn run(world: &mut BattleWorld) -> ActionResult {
    let Some(Action::Shoot {
        unit,
        target,
        mode,
        chance,
    }) = world.stack.pop()
    else {
        return ActionResult::empty();
    };

    for ai in world.ais.iter_mut().flatten() {
        ai.inform(&world.units[unit], SHOT_INFORM_QUALITY);
    }

    let shooter = &world.units[unit];
    let origin = shooter.trigger_point();
    let Some(weapon) = shooter.weapon().cloned() else {
        return ActionResult::UNIT_ACTION_COMPLETE;
    };
    let Some(def) = weapon.mode(mode).cloned() else {
        return ActionResult::UNIT_ACTION_COMPLETE;
    };
    let Some(ray) = Ray::between(origin, target) else {
        return ActionResult::UNIT_ACTION_COMPLETE;
    };

    let (struck, point, normal) = match intersect_model(&ray, hitboxes(world, unit)) {
        Some(hit) if hit.point.y >= 0.0 => (hit.struck, hit.point, hit.normal),
        _ => {
            let (point, normal) = world_exit(
                &ray,
                world.map.width() as f32,
                WORLD_HEIGHT,
                world.map.height() as f32,
            );
            (Struck::Ground, point, normal)
        }
    };

    if !def.explosive {
        let shooter_team = world.units[unit].team;
        let hit_enemy = match struck {
            Struck::Unit(id) | Struck::Weapon(id) => shooter_team.is_hostile_to(world.units[id].team),
            Struck::Wall(_) | Struck::Ground => false,
        };
        world.accuracy.record(chance, hit_enemy);
    }

    debug!(target: "squad::action", unit, ?mode, ?struck, x = point.x, y = point.y, z = point.z, "shot resolved");
    world.events.push(BattleEvent::ShotFired {
        shooter: unit,
        mode,
        from: origin,
        to: point,
    });

    // Shots that leave through the sides or the sky hit nothing.
    let impact = !matches!(struck, Struck::Ground) || point.y < 0.01;
    if impact {
        world.stack.push(Action::Hit {
            shooter: unit,
            struck,
            point,
            normal,
            damage: def.damage,
            explosive: def.explosive,
        });
        let delay = weapon.effect_delay_ms(mode, origin.distance(point));
        if delay > 0 {
            world.stack.push(Action::Delay { remaining_ms: delay });
        }
        if world.map.fog_visible(TilePos::from_world(point)) {
            world.stack.push(Action::CameraBounds {
                target: point,
                center: false,
            });
        }
    }
    ActionResult::UNIT_ACTION_COMPLETE
}

/// Everything a shot from `shooter` can strike.
fn hitboxes(world: &BattleWorld, shooter: usize) -> Vec<(Struck, Aabb)> {
    let half = UNIT_WIDTH / 2.0;
    let mut boxes = Vec::new();

    for u in world.units.iter().filter(|u| u.is_alive() && u.id != shooter) {
        let base = u.world_pos();
        boxes.push((
            Struck::Unit(u.id),
            Aabb::new(base + Vec3::new(-half, 0.0, -half), base + Vec3::new(half, UNIT_HEIGHT, half)),
        ));
        if u.weapon().is_some() {
            boxes.push((
                Struck::Weapon(u.id),
                Aabb::around(u.weapon_point(), Vec3::splat(WEAPON_HALF_SIZE)),
            ));
        }
    }

    for tile in world.map.bounds().tiles() {
        if world.map.is_solid(tile) {
            let min = Vec3::new(tile.x as f32, 0.0, tile.y as f32);
            boxes.push((Struck::Wall(tile), Aabb::new(min, min + Vec3::new(1.0, WALL_HEIGHT, 1.0))));
        }
    }
    boxes
}

/// Pay for a trigger pull of `mode` at `target` and queue its rounds.
///
/// `error` scales the weapon spread; 0 fires dead on. With `clear_move` set, a
/// Move on top of the stack is dropped, which is how a reaction shot stops the
/// unit it fires at. Returns false when the unit cannot fire.
pub fn push_shoot_action(
    world: &mut BattleWorld,
    unit: usize,
    target: Vec3,
    mode: WeaponMode,
    error: f32,
    clear_move: bool,
) -> bool {
    let Some(u) = world.units.get(unit) else {
        return false;
    };
    if !u.is_alive() || !u.can_fire(mode) {
        return false;
    }
    let Some(def) = u.weapon().and_then(|w| w.mode(mode)).cloned() else {
        return false;
    };
    let origin = u.trigger_point();
    let distance = origin.distance(target);
    let Some(stats) = u.fire_statistics(mode, &BulletTarget::new(distance)) else {
        return false;
    };
    let accuracy = u.calc_accuracy(mode);
    let normal = (target - origin).normalize_or_zero();

    world.units[unit].use_tu(stats.tu);
    debug!(
        target: "squad::action",
        unit,
        ?mode,
        chance = stats.chance_to_hit,
        any_hit = stats.chance_any_hit,
        dpt = stats.damage_per_tu,
        "trigger pulled"
    );

    for _ in 0..def.rounds {
        let aim = if error != 0.0 {
            BulletSpread::generate(&mut world.rng, accuracy * error, distance, normal, target)
        } else {
            target
        };
        if clear_move && matches!(world.stack.top(), Some(Action::Move { .. })) {
            world.stack.pop();
        }
        world.stack.push(Action::Shoot {
            unit,
            target: aim,
            mode,
            chance: stats.chance_to_hit,
        });
        world.units[unit].inventory.use_clip_round(&def.clip);
    }

    push_rotate_action(world, unit, TilePos::from_world(target), false);
    true
}

/// Queue a turn to face `dst` unless the unit already does.
pub fn push_rotate_action(world: &mut BattleWorld, unit: usize, dst: TilePos, quantize: bool) {
    let Some(u) = world.units.get(unit) else {
        return;
    };
    let rotation = u.angle_between(dst, quantize);
    if min_delta_degrees(u.rotation, rotation).0 > 0.01 {
        world.stack.push(Action::Rotate { unit, rotation });
    }
}
