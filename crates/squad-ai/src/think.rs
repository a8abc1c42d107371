//! Think steps shared by every AI strategy.
//!
//! Each step looks at one unit and either proposes an action or reports why it
//! could not. Strategies chain them in their own priority order.

use rand::Rng;
use tracing::trace;

use squad_core::constants::{EXPLOSIVE_RANGE, MAX_TU, TRAVEL_ARRIVE_RADIUS, WANDER_RADIUS};
use squad_core::enums::{Team, WeaponMode};
use squad_core::motion_path::MotionPath;
use squad_core::types::{min_delta_degrees, TilePos};
use squad_core::unit::Unit;
use squad_core::weapon::BulletTarget;
use squad_terrain::path::{trim_to_cost, PathResult};

use crate::action::{AiAction, ThinkOutcome};
use crate::context::AiContext;
use crate::memory::AiMemory;

/// Random picks tried before a wander or travel step gives up.
const RANDOM_TRIES: usize = 8;

/// Gate every think call: a unit that is down or out of think budget is finished.
pub fn think_base(mem: &mut AiMemory, unit: &Unit) -> Option<ThinkOutcome> {
    if !unit.is_alive() {
        return Some(ThinkOutcome::NotOption);
    }
    if !mem.count_think(unit.id) {
        trace!(target: "squad::ai", unit = unit.id, "think budget spent");
        return Some(ThinkOutcome::NotOption);
    }
    None
}

/// Best shot at a visible enemy, by damage per TU across every fireable mode.
pub fn think_shoot(ctx: &AiContext<'_>, unit: &Unit) -> ThinkOutcome {
    let Some(weapon) = unit.weapon() else {
        return ThinkOutcome::NotOption;
    };

    let mut best: Option<(f32, WeaponMode, &Unit)> = None;
    for target in ctx.visible_enemies(unit) {
        let dist_sq = unit.pos.distance_sq(target.pos);
        let (width, height) = target.target_size();
        let bullet_target = BulletTarget {
            distance: (dist_sq as f32).sqrt(),
            width,
            height,
        };
        for mode in WeaponMode::ALL {
            if !unit.can_fire(mode) {
                continue;
            }
            if weapon.is_explosive(mode) && dist_sq < EXPLOSIVE_RANGE * EXPLOSIVE_RANGE {
                continue;
            }
            let Some(stats) = unit.fire_statistics(mode, &bullet_target) else {
                continue;
            };
            if best.map_or(true, |(score, _, _)| stats.damage_per_tu > score) {
                best = Some((stats.damage_per_tu, mode, target));
            }
        }
    }

    match best {
        Some((_, mode, target)) => ThinkOutcome::Action(AiAction::Shoot {
            mode,
            target: target.target_point(),
            target_unit: target.id,
        }),
        None => ThinkOutcome::NoAction,
    }
}

/// No weapon, or not enough rounds for a snap shot.
pub fn needs_ammo(unit: &Unit) -> bool {
    match unit.weapon() {
        None => true,
        Some(w) => unit.inventory.rounds(&w.snap.clip) < w.snap.rounds,
    }
}

/// Head for the nearest storage that can re-arm the unit.
pub fn think_move_to_ammo(ctx: &AiContext<'_>, unit: &Unit) -> ThinkOutcome {
    if !needs_ammo(unit) {
        return ThinkOutcome::NoAction;
    }
    let resupply_here = ctx
        .map
        .storage_at(unit.pos)
        .and_then(|s| s.is_resupply(unit.weapon()))
        .is_some();
    if resupply_here {
        return ThinkOutcome::SolvedNoAction;
    }

    let mut stores: Vec<TilePos> = ctx
        .map
        .storages()
        .filter(|(_, s)| s.is_resupply(unit.weapon()).is_some())
        .map(|(p, _)| p)
        .collect();
    stores.sort_by_key(|p| (unit.pos.distance_sq(*p), *p));

    stores
        .into_iter()
        .map(|p| path_toward(ctx, unit, p))
        .find(|o| matches!(o, ThinkOutcome::Action(_)))
        .unwrap_or(ThinkOutcome::NoAction)
}

/// Re-arm at most once per phase.
pub fn think_inventory(mem: &mut AiMemory, unit: &Unit) -> ThinkOutcome {
    if mem.take_inventory_step(unit.id) {
        ThinkOutcome::Action(AiAction::Inventory)
    } else {
        ThinkOutcome::NoAction
    }
}

/// Hunt the freshest last known enemy position.
pub fn think_search(mem: &mut AiMemory, ctx: &AiContext<'_>, unit: &Unit) -> ThinkOutcome {
    let Some((slot, known)) = mem.nearest_known(unit.pos) else {
        return ThinkOutcome::NoAction;
    };
    if unit.pos.chebyshev(known.pos) <= 1 {
        // Arrived and the enemy is not here.
        mem.forget(slot);
        return ThinkOutcome::NoAction;
    }
    path_near(ctx, unit, known.pos)
}

/// Stroll to a random reachable tile nearby.
pub fn think_wander(mem: &mut AiMemory, ctx: &AiContext<'_>, unit: &Unit) -> ThinkOutcome {
    for _ in 0..RANDOM_TRIES {
        let dx = mem.rng.gen_range(-WANDER_RADIUS..=WANDER_RADIUS);
        let dy = mem.rng.gen_range(-WANDER_RADIUS..=WANDER_RADIUS);
        let goal = unit.pos.offset(dx, dy);
        if goal == unit.pos || !ctx.map.is_passable(goal) || ctx.blocked.contains(&goal) {
            continue;
        }
        if let outcome @ ThinkOutcome::Action(_) = path_toward(ctx, unit, goal) {
            return outcome;
        }
    }
    ThinkOutcome::NoAction
}

/// Walk toward a long-range goal, picking a new one when none is set.
pub fn think_travel(mem: &mut AiMemory, ctx: &AiContext<'_>, unit: &Unit) -> ThinkOutcome {
    let goal = match mem.travel_goal(unit.id) {
        Some(goal) => goal,
        None => {
            let Some(goal) = random_open_tile(mem, ctx) else {
                return ThinkOutcome::NoAction;
            };
            mem.set_travel_goal(unit.id, Some(goal));
            goal
        }
    };
    if unit.pos.chebyshev(goal) <= TRAVEL_ARRIVE_RADIUS {
        mem.set_travel_goal(unit.id, None);
        return ThinkOutcome::NoAction;
    }
    path_near(ctx, unit, goal)
}

/// Turn to watch the likeliest threat direction, once per phase.
pub fn think_rotate(mem: &mut AiMemory, unit: &Unit) -> ThinkOutcome {
    if !mem.take_rotate_step(unit.id) {
        return ThinkOutcome::NoAction;
    }
    let look_at = match mem.nearest_known(unit.pos) {
        Some((_, known)) => known.pos,
        None => {
            let dir = mem.rng.gen_range(0..8);
            let (dx, dy) = [(0, 1), (1, 1), (1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0), (-1, 1)][dir];
            unit.pos.offset(dx, dy)
        }
    };
    if min_delta_degrees(unit.rotation, unit.angle_between(look_at, true)).0 < 0.5 {
        return ThinkOutcome::NoAction;
    }
    ThinkOutcome::Action(AiAction::Rotate {
        x: look_at.x,
        y: look_at.y,
    })
}

/// Move to the open tile nearby that is farthest from every visible alien.
pub fn think_flee(ctx: &AiContext<'_>, unit: &Unit) -> ThinkOutcome {
    let threats: Vec<TilePos> = ctx
        .vis
        .seen_by(unit.id)
        .filter_map(|t| ctx.unit(t))
        .filter(|t| t.is_alive() && t.team == Team::Alien)
        .map(|t| t.pos)
        .collect();
    if threats.is_empty() {
        return ThinkOutcome::NoAction;
    }
    let safety = |p: TilePos| threats.iter().map(|t| p.distance_sq(*t)).min().unwrap_or(0);

    let here = safety(unit.pos);
    let mut candidates: Vec<(i32, TilePos)> = (-WANDER_RADIUS..=WANDER_RADIUS)
        .flat_map(|dy| (-WANDER_RADIUS..=WANDER_RADIUS).map(move |dx| (dx, dy)))
        .map(|(dx, dy)| unit.pos.offset(dx, dy))
        .filter(|p| ctx.map.is_passable(*p) && !ctx.blocked.contains(p))
        .map(|p| (safety(p), p))
        .filter(|(s, _)| *s > here)
        .collect();
    candidates.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    candidates
        .into_iter()
        .take(RANDOM_TRIES)
        .map(|(_, p)| path_toward(ctx, unit, p))
        .find(|o| matches!(o, ThinkOutcome::Action(_)))
        .unwrap_or(ThinkOutcome::NoAction)
}

/// Cut a solved path down to what `tu` can walk. `None` if not even one step fits.
pub fn trim_path_to_cost(tiles: &[TilePos], tu: f32) -> Option<MotionPath> {
    let trimmed = trim_to_cost(tiles, tu);
    let trimmed = &trimmed[..trimmed.len().min(MAX_TU)];
    MotionPath::new(trimmed).ok()
}

fn path_toward(ctx: &AiContext<'_>, unit: &Unit, goal: TilePos) -> ThinkOutcome {
    match ctx.map.solve_path(unit.pos, goal, ctx.blocked) {
        PathResult::Solved { tiles, .. } => match trim_path_to_cost(&tiles, unit.tu) {
            Some(path) => ThinkOutcome::Action(AiAction::Move { path }),
            None => ThinkOutcome::NoAction,
        },
        PathResult::NoSolution | PathResult::StartEndSame => ThinkOutcome::NoAction,
    }
}

/// Path to `goal`, or to a free neighbor of it when the goal itself is taken.
fn path_near(ctx: &AiContext<'_>, unit: &Unit, goal: TilePos) -> ThinkOutcome {
    if let outcome @ ThinkOutcome::Action(_) = path_toward(ctx, unit, goal) {
        return outcome;
    }
    let mut around: Vec<TilePos> = (-1..=1)
        .flat_map(|dy| (-1..=1).map(move |dx| goal.offset(dx, dy)))
        .filter(|p| *p != goal && *p != unit.pos)
        .collect();
    around.sort_by_key(|p| (unit.pos.distance_sq(*p), *p));
    around
        .into_iter()
        .map(|p| path_toward(ctx, unit, p))
        .find(|o| matches!(o, ThinkOutcome::Action(_)))
        .unwrap_or(ThinkOutcome::NoAction)
}

fn random_open_tile(mem: &mut AiMemory, ctx: &AiContext<'_>) -> Option<TilePos> {
    (0..RANDOM_TRIES).find_map(|_| {
        let p = TilePos::new(
            mem.rng.gen_range(0..ctx.map.width()),
            mem.rng.gen_range(0..ctx.map.height()),
        );
        (ctx.map.is_passable(p) && !ctx.blocked.contains(&p)).then_some(p)
    })
}
