//! Snapshot system: builds the player-facing `BattleSnapshot`.
//!
//! Read-only; the caller hands over the drained event feed.

use squad_core::enums::{BattlePhase, Team};
use squad_core::events::BattleEvent;
use squad_core::state::{BattleSnapshot, TacticalEndData, UnitView};
use squad_core::types::SimTime;

use crate::world::BattleWorld;

pub fn build_snapshot(
    world: &BattleWorld,
    time: &SimTime,
    phase: BattlePhase,
    events: Vec<BattleEvent>,
) -> BattleSnapshot {
    BattleSnapshot {
        time: *time,
        turn: world.turn_count,
        current_team: world.current_team,
        phase,
        units: build_units(world),
        action_stack: world.stack.kinds(),
        selection: world.selection,
        camera: world.camera,
        accuracy: world.accuracy.view(),
        events,
        end: (phase == BattlePhase::Complete).then(|| TacticalEndData::tally(&world.units, world.turn_count)),
    }
}

/// In-use units. Non-Terrans are marked visible only while a Terran sees them.
fn build_units(world: &BattleWorld) -> Vec<UnitView> {
    let vis = world.vis.matrix();
    world
        .units
        .iter()
        .filter(|u| u.in_use)
        .map(|u| UnitView {
            id: u.id,
            team: u.team,
            name: u.name.clone(),
            status: u.status,
            left: u.left,
            pos: u.pos,
            rotation: u.rotation,
            hp: u.hp,
            tu: u.tu,
            weapon: u.weapon().map(|w| w.name.clone()),
            kills: u.kills,
            visible: u.team == Team::Terran || vis.team_sees(Team::Terran, u.id),
        })
        .collect()
}
