//! Applying damage from a resolved shot: direct hits and blasts.

use std::collections::VecDeque;

use rand::Rng;
use tracing::{debug, info, warn};

use squad_core::constants::{EXPLOSION_BACKOFF, EXPLOSION_RADIUS, MAX_EXPLOSIONS};
use squad_core::events::BattleEvent;
use squad_core::flags::ActionResult;
use squad_core::types::{Rect, TilePos};
use squad_core::weapon::DamageDesc;
use squad_terrain::grid::DamageOutcome;
use squad_terrain::los::blast_reaches;

use crate::action::{Action, Struck};
use crate::world::BattleWorld;

/// Damage of a fuel tank going up.
fn fuel_blast_damage() -> DamageDesc {
    DamageDesc::new(30.0, 0.0, 15.0)
}

/// What an explosion chain did to the map.
#[derive(Debug, Clone, PartialEq)]
pub struct BlastReport {
    /// Blast centres in the order they went off.
    pub centers: Vec<TilePos>,
    /// Union of every centre's blast area.
    pub destroyed: Rect,
}

/// Resolve the Hit on top of the stack.
pub fn run(world: &mut BattleWorld) -> ActionResult {
    let Some(Action::Hit {
        shooter,
        struck,
        point,
        normal,
        damage,
        explosive,
    }) = world.stack.pop()
    else {
        return ActionResult::empty();
    };

    if explosive {
        let center = TilePos::from_world(point + normal * EXPLOSION_BACKOFF);
        explode(world, Some(shooter), center, damage);
    } else {
        match struck {
            Struck::Unit(id) => damage_unit(world, id, &damage, Some(shooter)),
            Struck::Weapon(id) => {
                if world.units[id].inventory.remove_weapon().is_some() {
                    info!(target: "squad::action", unit = id, shooter, "weapon shot out");
                    world.events.push(BattleEvent::WeaponShotOut { unit: id });
                }
            }
            Struck::Wall(tile) => {
                let outcome = damage_tile(world, tile, &damage);
                if outcome.destroyed.is_some() {
                    let range = world.sight_range();
                    world
                        .vis
                        .invalidate_all(Some(Rect::point(tile)), &world.units, range);
                }
                if let Some(blast) = outcome.blast {
                    explode(world, Some(shooter), blast, fuel_blast_damage());
                }
            }
            Struck::Ground => {}
        }
    }
    ActionResult::STEP_COMPLETE | ActionResult::UNIT_ACTION_COMPLETE
}

/// Damage a unit and handle it going down.
pub fn damage_unit(world: &mut BattleWorld, id: usize, damage: &DamageDesc, killer: Option<usize>) {
    let down = world.units[id].do_damage(damage);
    let hp = world.units[id].hp;
    debug!(target: "squad::action", unit = id, hp, "unit hit");
    world.events.push(BattleEvent::UnitHit { unit: id, hp });
    if down {
        unit_down(world, id, killer);
    }
}

fn unit_down(world: &mut BattleWorld, id: usize, killer: Option<usize>) {
    let status = world.units[id].status;
    if let Some(k) = killer.filter(|&k| k != id) {
        world.units[k].credit_kill();
    }
    if world.selection.target_unit == Some(id) {
        world.selection.target_unit = None;
    }
    world.vis.invalidate_unit(id);
    info!(target: "squad::action", unit = id, ?status, ?killer, "unit down");
    world.events.push(BattleEvent::UnitDown {
        unit: id,
        status,
        killer,
    });
}

fn damage_tile(world: &mut BattleWorld, tile: TilePos, damage: &DamageDesc) -> DamageOutcome {
    let outcome = world.map.do_damage(tile, damage);
    if let Some(gone) = outcome.destroyed {
        info!(target: "squad::action", x = gone.x, y = gone.y, "wall destroyed");
        world.events.push(BattleEvent::WallDestroyed { tile: gone });
    }
    outcome
}

/// Set off a blast at `center`, chaining through any fuel tanks it destroys.
///
/// Each centre damages the tiles within `EXPLOSION_RADIUS` that the blast can
/// reach, scaled down ring by ring. Visibility is invalidated over the union of
/// the blast areas once the chain is done.
pub fn explode(world: &mut BattleWorld, shooter: Option<usize>, center: TilePos, damage: DamageDesc) -> BlastReport {
    let radius = EXPLOSION_RADIUS;
    let mut queue = VecDeque::from([(center, damage)]);
    let mut report = BlastReport {
        centers: Vec::new(),
        destroyed: Rect::invalid(),
    };

    while let Some((c, dmg)) = queue.pop_front() {
        if report.centers.len() >= MAX_EXPLOSIONS {
            warn!(target: "squad::action", dropped = queue.len() + 1, "explosion chain capped");
            break;
        }
        report.centers.push(c);
        report.destroyed = report.destroyed.union(&Rect::point(c).outset(radius));
        info!(target: "squad::action", x = c.x, y = c.y, damage = dmg.total(), "explosion");
        world.events.push(BattleEvent::Explosion { center: c });

        let mut hit_something = false;
        for ring in 0..=radius {
            let scale = (1 + radius - ring) as f32 / (1 + radius) as f32;
            let ring_damage = dmg.scaled(scale);
            for y in c.y - ring..=c.y + ring {
                for x in c.x - ring..=c.x + ring {
                    let p = TilePos::new(x, y);
                    if p.chebyshev(c) != ring
                        || !world.map.in_bounds(p)
                        || c.distance_sq(p) > radius * radius
                        || !blast_reaches(&world.map, c, p)
                    {
                        continue;
                    }
                    if let Some(id) = world.unit_at(p) {
                        hit_something = true;
                        damage_unit(world, id, &ring_damage, shooter);
                    }
                    let outcome = damage_tile(world, p, &ring_damage);
                    hit_something |= outcome.hit_structure;
                    if let Some(blast) = outcome.blast {
                        queue.push_back((blast, fuel_blast_damage()));
                    }
                }
            }
        }

        if hit_something || world.rng.gen_bool(0.5) {
            spread_smoke(world, c);
        }
    }

    let range = world.sight_range();
    world
        .vis
        .invalidate_all(Some(report.destroyed), &world.units, range);
    report
}

fn spread_smoke(world: &mut BattleWorld, center: TilePos) {
    let extra = match world.config.smoke_random_turns {
        0 => 0,
        n => world.rng.gen_range(0..n),
    };
    let turns = world.config.smoke_min_turns.saturating_add(extra);
    for dy in -1..=1 {
        for dx in -1..=1 {
            let p = center.offset(dx, dy);
            if p == center || world.map.is_passable(p) {
                world.map.add_smoke(p, turns);
            }
        }
    }
}
