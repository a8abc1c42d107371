//! Tests for the battle engine: turns, commands, sightings, reaction fire,
//! explosions, saves, and AI-driven battles.

use squad_core::commands::PlayerCommand;
use squad_core::enums::{ActionKind, BattlePhase, Team, UnitStatus, WeaponMode};
use squad_core::events::{BattleEvent, TargetEvent};
use squad_core::inventory::Inventory;
use squad_core::motion_path::MotionPath;
use squad_core::targets::VisMatrix;
use squad_core::types::{Rect, TilePos};
use squad_core::unit::{Stats, Unit};
use squad_core::weapon::{DamageDesc, Item, ItemCatalog};
use squad_terrain::grid::TileMap;
use squad_terrain::storage::Storage;

use crate::action::Action;
use crate::config::BattleConfig;
use crate::engine::{BattleEngine, SimConfig};
use crate::error::{CommandError, SaveError};
use crate::save::{place_units, BattleSave};
use crate::systems;
use crate::targets::{calc_team_targets, TargetLog};
use crate::visibility::Visibility;
use crate::world::BattleWorld;
use crate::world_setup::{self, Scenario};

/// Open ground with an alien walled in at (15, 7), so battles stay live.
const SEALED: [&str; 10] = [
    "..................",
    "..................",
    "..................",
    "..................",
    "..................",
    "..................",
    "..............###.",
    "..............#.#.",
    "..............###.",
    "..................",
];

fn catalog() -> ItemCatalog {
    ItemCatalog::builtin().unwrap()
}

fn soldier(team: Team, x: i32, y: i32) -> Unit {
    Unit::new(team, format!("{team:?} {x},{y}"), TilePos::new(x, y), Stats::default(), Inventory::new())
}

fn armed(team: Team, x: i32, y: i32, weapon: &str, clips: &[&str]) -> Unit {
    let mut unit = soldier(team, x, y);
    unit.inventory = world_setup::armed(&catalog(), weapon, clips).unwrap();
    unit
}

fn sealed_alien() -> Unit {
    soldier(Team::Alien, 15, 7)
}

fn engine_on(map: TileMap, units: Vec<Unit>, terran_ai: bool) -> BattleEngine {
    let config = SimConfig {
        seed: 7,
        terran_ai,
        battle: BattleConfig::default(),
    };
    BattleEngine::new(config, Scenario { map, units }).unwrap()
}

fn sealed_engine(units: Vec<Unit>) -> BattleEngine {
    engine_on(TileMap::from_layout(&SEALED).unwrap(), units, false)
}

fn skirmish_engine(seed: u64, terran_ai: bool) -> BattleEngine {
    let scenario = world_setup::skirmish(&catalog()).unwrap();
    let config = SimConfig {
        seed,
        terran_ai,
        battle: BattleConfig::default(),
    };
    BattleEngine::new(config, scenario).unwrap()
}

/// Tick until the action stack drains, collecting every event on the way.
fn run_until_idle(engine: &mut BattleEngine) -> Vec<BattleEvent> {
    let mut events = Vec::new();
    for _ in 0..2000 {
        events.extend(engine.tick().events);
        if engine.world().stack.is_empty() {
            break;
        }
    }
    events
}

fn select(engine: &mut BattleEngine, unit: usize) {
    engine.apply_command(PlayerCommand::SelectUnit { unit }).unwrap();
    run_until_idle(engine);
}

/// Bare world with units placed into their team buckets.
fn world_with(map: TileMap, units: Vec<Unit>) -> BattleWorld {
    BattleWorld::new(place_units(units).unwrap(), map, BattleConfig::default(), 3)
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let mut engine_a = skirmish_engine(12345, true);
    let mut engine_b = skirmish_engine(12345, true);

    for _ in 0..400 {
        let snap_a = engine_a.tick();
        let snap_b = engine_b.tick();
        assert_eq!(
            serde_json::to_string(&snap_a).unwrap(),
            serde_json::to_string(&snap_b).unwrap(),
            "same seed diverged at turn {}",
            snap_a.turn
        );
    }
}

#[test]
fn test_time_advances_per_tick() {
    let mut engine = sealed_engine(vec![soldier(Team::Terran, 2, 2), sealed_alien()]);
    let tick_ms = engine.world().config.tick_ms;
    for _ in 0..10 {
        engine.tick();
    }
    assert_eq!(engine.time().tick, 10);
    assert_eq!(engine.time().elapsed_ms, 10 * u64::from(tick_ms));
}

// ---- Turns ----

#[test]
fn test_new_battle_opens_terran_phase() {
    let mut engine = sealed_engine(vec![soldier(Team::Terran, 2, 2), sealed_alien()]);
    assert_eq!(engine.current_team(), Team::Terran);
    assert_eq!(engine.turn_count(), 1);
    let snap = engine.tick();
    assert!(snap.events.contains(&BattleEvent::TurnStarted {
        team: Team::Terran,
        turn: 1
    }));
}

#[test]
fn test_end_turn_cycles_through_every_team() {
    let mut engine = sealed_engine(vec![soldier(Team::Terran, 2, 2), sealed_alien()]);
    engine.world_mut().units[0].tu = 3.0;

    engine.apply_command(PlayerCommand::EndTurn).unwrap();
    assert_eq!(engine.current_team(), Team::Civilian);
    assert_eq!(engine.turn_count(), 2);

    let mut teams = Vec::new();
    for _ in 0..5000 {
        let snap = engine.tick();
        for event in snap.events {
            if let BattleEvent::TurnStarted { team, .. } = event {
                teams.push(team);
            }
        }
        if engine.current_team() == Team::Terran {
            break;
        }
    }
    assert_eq!(teams, vec![Team::Civilian, Team::Alien, Team::Terran]);
    assert_eq!(engine.turn_count(), 4);
    assert_eq!(engine.phase(), BattlePhase::Active);
    // New phase, fresh time units.
    assert_eq!(engine.world().units[0].tu, engine.world().units[0].stats.total_tu);
}

#[test]
fn test_commands_rejected_outside_player_turn() {
    let mut engine = engine_on(
        TileMap::from_layout(&SEALED).unwrap(),
        vec![soldier(Team::Terran, 2, 2), sealed_alien()],
        true,
    );
    assert_eq!(
        engine.apply_command(PlayerCommand::SelectUnit { unit: 0 }),
        Err(CommandError::NotPlayerTurn(Team::Terran))
    );
    assert_eq!(
        engine.apply_command(PlayerCommand::EndTurn),
        Err(CommandError::NotPlayerTurn(Team::Terran))
    );
}

#[test]
fn test_autosave_at_terran_phase() {
    let mut battle = BattleConfig::default();
    battle.autosave = true;
    let config = SimConfig {
        seed: 7,
        terran_ai: false,
        battle,
    };
    let scenario = Scenario {
        map: TileMap::from_layout(&SEALED).unwrap(),
        units: vec![soldier(Team::Terran, 2, 2), sealed_alien()],
    };
    let engine = BattleEngine::new(config, scenario).unwrap();
    let save = engine.last_autosave().expect("autosave taken");
    assert_eq!(save.current_team, Team::Terran);
    assert_eq!(save.turn_count, 1);
}

// ---- Commands ----

#[test]
fn test_move_spends_tu_per_step() {
    let mut engine = sealed_engine(vec![soldier(Team::Terran, 2, 2), sealed_alien()]);
    engine.world_mut().units[0].tu = 2.0;
    select(&mut engine, 0);

    engine.apply_command(PlayerCommand::Move { x: 3, y: 3 }).unwrap();
    run_until_idle(&mut engine);
    let unit = &engine.world().units[0];
    assert_eq!(unit.pos, TilePos::new(3, 3));
    assert!((unit.tu - 0.59).abs() < 0.01, "tu left {}", unit.tu);

    // A second diagonal costs more than what is left and is never queued.
    let err = engine.apply_command(PlayerCommand::Move { x: 4, y: 4 }).unwrap_err();
    assert!(matches!(err, CommandError::InsufficientTu { .. }));
    assert!(engine.world().stack.is_empty());
    assert_eq!(engine.world().units[0].pos, TilePos::new(3, 3));
}

#[test]
fn test_move_command_errors() {
    let mut engine = sealed_engine(vec![soldier(Team::Terran, 2, 2), sealed_alien()]);
    assert_eq!(
        engine.apply_command(PlayerCommand::Move { x: 4, y: 2 }),
        Err(CommandError::NoSelection)
    );

    engine.apply_command(PlayerCommand::SelectUnit { unit: 0 }).unwrap();
    assert_eq!(
        engine.apply_command(PlayerCommand::Move { x: 4, y: 2 }),
        Err(CommandError::ActionInProgress),
        "selection camera still scrolling"
    );
    assert!(matches!(engine.save(), Err(SaveError::Busy)));
    run_until_idle(&mut engine);

    assert_eq!(
        engine.apply_command(PlayerCommand::Move { x: -1, y: 2 }),
        Err(CommandError::OutOfBounds { x: -1, y: 2 })
    );
    assert_eq!(
        engine.apply_command(PlayerCommand::Move { x: 15, y: 7 }),
        Err(CommandError::NoPath)
    );
    assert_eq!(
        engine.apply_command(PlayerCommand::SelectUnit { unit: 24 }),
        Err(CommandError::UnitUnavailable(24))
    );
}

#[test]
fn test_shoot_command_spends_tu_and_records_shot() {
    let mut engine = sealed_engine(vec![
        armed(Team::Terran, 2, 2, "Laser Carbine", &["cell"]),
        soldier(Team::Alien, 2, 5),
        sealed_alien(),
    ]);
    select(&mut engine, 0);
    assert_eq!(
        engine.apply_command(PlayerCommand::Shoot { mode: WeaponMode::Snap }),
        Err(CommandError::NoTarget)
    );

    engine.apply_command(PlayerCommand::SelectTarget { unit: 24 }).unwrap();
    let tu = engine.world().units[0].tu;
    engine.apply_command(PlayerCommand::Shoot { mode: WeaponMode::Snap }).unwrap();
    assert!(engine.world().units[0].tu < tu);
    assert_eq!(engine.world().units[0].inventory.rounds("cell"), 11);

    let events = run_until_idle(&mut engine);
    assert!(events.iter().any(|e| matches!(e, BattleEvent::ShotFired { shooter: 0, .. })));
    assert_eq!(engine.snapshot().accuracy.shots, 1);
    assert_eq!(
        engine.apply_command(PlayerCommand::Shoot { mode: WeaponMode::Alt }),
        Err(CommandError::CannotFire(WeaponMode::Alt))
    );
}

#[test]
fn test_projectile_delays_hit() {
    let mut shooter = armed(Team::Terran, 1, 1, "Rocket Launcher", &["rocket"]);
    shooter.rotation = 90.0;
    let mut w = world_with(TileMap::new(8, 4), vec![shooter]);

    let target = TilePos::new(5, 1).center();
    assert!(systems::shoot::push_shoot_action(&mut w, 0, target, WeaponMode::Snap, 0.0, false));
    assert_eq!(w.stack.len(), 1);

    systems::shoot::run(&mut w);
    assert_eq!(w.stack.kinds(), vec![ActionKind::Hit, ActionKind::Delay]);
    // Explosive shots stay off the accuracy ledger.
    assert_eq!(w.accuracy.view().shots, 0);
}

// ---- Sightings ----

#[test]
fn test_sighting_produces_unit_and_team_events_once() {
    let mut map = TileMap::new(12, 12);
    map.set_wall(TilePos::new(5, 7), squad_terrain::grid::WallMaterial::Stone);
    let units = place_units(vec![soldier(Team::Terran, 5, 5), soldier(Team::Alien, 5, 10)]).unwrap();
    let (a, b) = (0, 24);
    let mut vis = Visibility::new();
    let mut log = TargetLog::new();

    let current = vis.calc_vis_map(&units, &map, 14);
    calc_team_targets(&mut log, current, &units);
    assert!(log.is_empty(), "wall hides both sides");

    map.do_damage(TilePos::new(5, 7), &DamageDesc::new(500.0, 0.0, 0.0));
    vis.invalidate_all(None, &units, 14);
    let current = vis.calc_vis_map(&units, &map, 14);
    calc_team_targets(&mut log, current, &units);

    let count = |wanted: TargetEvent| log.events().iter().filter(|&&e| e == wanted).count();
    assert_eq!(count(TargetEvent::Unit { viewer: a, target: b }), 1);
    assert_eq!(
        count(TargetEvent::Team {
            team: Team::Terran,
            target: b
        }),
        1
    );

    // Events live for one decision point only.
    log.clear();
    let current = vis.calc_vis_map(&units, &map, 14);
    calc_team_targets(&mut log, current, &units);
    assert!(log.is_empty(), "no change, no new events");
}

#[test]
fn test_team_event_only_for_first_viewer() {
    let units = place_units(vec![
        soldier(Team::Terran, 1, 1),
        soldier(Team::Terran, 2, 1),
        soldier(Team::Alien, 6, 6),
    ])
    .unwrap();
    let mut log = TargetLog::new();
    let mut current = VisMatrix::new();
    current.set(0, 24, true);
    current.set(1, 24, true);
    calc_team_targets(&mut log, &current, &units);

    let teams = log.events().iter().filter(|e| e.is_team()).count();
    assert_eq!(log.events().len(), 3);
    assert_eq!(teams, 1);
}

// ---- Reaction fire ----

/// Terran at (2, 2) watched by an alien at (2, 6) facing it.
fn reaction_world(current: Team) -> BattleWorld {
    let mut watcher = armed(Team::Alien, 2, 6, "Laser Carbine", &["cell"]);
    watcher.rotation = 180.0;
    watcher.stats.reaction = 1.0;
    let mut w = world_with(
        TileMap::new(10, 10),
        vec![soldier(Team::Terran, 2, 2), soldier(Team::Civilian, 4, 2), watcher],
    );
    w.current_team = current;
    w
}

#[test]
fn test_reaction_fire_at_mover() {
    let mut w = reaction_world(Team::Terran);
    let mut current = VisMatrix::new();
    current.set(24, 0, true);
    calc_team_targets(&mut w.targets, &current, &w.units);

    systems::reaction::do_reaction_fire(&mut w);
    assert_eq!(w.stack.len(), 3, "auto fire queues three rounds");
    assert!(matches!(w.stack.top(), Some(Action::Shoot { unit: 24, .. })));
    assert!(w.events.contains(&BattleEvent::ReactionFire { shooter: 24, target: 0 }));
    assert_eq!(
        w.targets.events(),
        &[TargetEvent::Team {
            team: Team::Alien,
            target: 0
        }],
        "the unit event is consumed"
    );
}

#[test]
fn test_civilians_never_trigger_reaction_fire() {
    let mut w = reaction_world(Team::Civilian);
    let mut current = VisMatrix::new();
    current.set(24, 8, true);
    calc_team_targets(&mut w.targets, &current, &w.units);

    systems::reaction::do_reaction_fire(&mut w);
    assert!(w.stack.is_empty());
    assert_eq!(w.targets.events().len(), 2);
    assert!(!w.events.iter().any(|e| matches!(e, BattleEvent::ReactionFire { .. })));
}

#[test]
fn test_reaction_waits_for_step_boundary() {
    let mut w = reaction_world(Team::Terran);
    let path = MotionPath::new(&[TilePos::new(2, 2), TilePos::new(3, 2)]).unwrap();
    let mut action = Action::new_move(0, path);
    if let Action::Move { cursor, .. } = &mut action {
        cursor.fraction = 0.5;
    }
    w.stack.push(action);
    let mut current = VisMatrix::new();
    current.set(24, 0, true);
    calc_team_targets(&mut w.targets, &current, &w.units);

    systems::reaction::do_reaction_fire(&mut w);
    assert_eq!(w.stack.len(), 1);
    assert_eq!(w.targets.events().len(), 2);
}

#[test]
fn test_visibility_recomputed_before_reaction() {
    let mut map = TileMap::new(14, 10);
    map.day_time = false;
    let mut watcher = armed(Team::Alien, 11, 5, "Laser Carbine", &["cell"]);
    watcher.rotation = 270.0;
    watcher.stats.reaction = 1.0;
    let mut engine = engine_on(map, vec![soldier(Team::Terran, 2, 5), watcher], false);
    select(&mut engine, 0);

    // One step brings the alien to the edge of night sight.
    engine.apply_command(PlayerCommand::Move { x: 3, y: 5 }).unwrap();
    let mut events = Vec::new();
    for _ in 0..200 {
        events.extend(engine.tick().events);
        if engine.world().units[0].pos == TilePos::new(3, 5) {
            break;
        }
    }
    assert!(events.contains(&BattleEvent::Sighting {
        event: TargetEvent::Unit { viewer: 24, target: 0 }
    }));
    assert!(events.contains(&BattleEvent::ReactionFire { shooter: 24, target: 0 }));
}

// ---- Interrupted moves ----

#[test]
fn test_stop_for_new_team_target() {
    let mut w = reaction_world(Team::Terran);
    let path = MotionPath::new(&[TilePos::new(2, 2), TilePos::new(3, 2), TilePos::new(4, 3)]).unwrap();
    w.stack.push(Action::new_move(0, path));
    let mut current = VisMatrix::new();
    current.set(0, 24, true);
    calc_team_targets(&mut w.targets, &current, &w.units);

    assert!(systems::reaction::stop_for_new_team_target(&mut w));
    assert!(w.stack.is_empty());
    assert!(w.events.contains(&BattleEvent::MoveInterrupted { unit: 0 }));
    // The player only stops for team sightings; the unit event stays.
    assert_eq!(w.targets.events(), &[TargetEvent::Unit { viewer: 0, target: 24 }]);
}

#[test]
fn test_civilian_sighting_does_not_stop_move() {
    let mut w = reaction_world(Team::Terran);
    let path = MotionPath::new(&[TilePos::new(2, 2), TilePos::new(3, 3)]).unwrap();
    w.stack.push(Action::new_move(0, path));
    let mut current = VisMatrix::new();
    current.set(0, 8, true);
    calc_team_targets(&mut w.targets, &current, &w.units);

    assert!(!systems::reaction::stop_for_new_team_target(&mut w));
    assert_eq!(w.stack.len(), 1);
}

#[test]
fn test_move_interrupted_on_new_enemy() {
    let mut map = TileMap::new(14, 10);
    map.day_time = false;
    let mut engine = engine_on(
        map,
        vec![soldier(Team::Terran, 2, 5), soldier(Team::Alien, 11, 5)],
        false,
    );
    select(&mut engine, 0);

    engine.apply_command(PlayerCommand::Move { x: 6, y: 5 }).unwrap();
    let events = run_until_idle(&mut engine);
    assert!(events.contains(&BattleEvent::MoveInterrupted { unit: 0 }));
    assert_eq!(engine.world().units[0].pos, TilePos::new(3, 5));
}

// ---- Explosions ----

#[test]
fn test_explosion_chains_through_fuel_tank() {
    let layout = ["........", "...w....", ".F......", "........", "........"];
    let mut w = world_with(TileMap::from_layout(&layout).unwrap(), Vec::new());
    let center = TilePos::new(1, 1);

    let report = systems::hit::explode(&mut w, None, center, DamageDesc::new(45.0, 0.0, 20.0));
    assert_eq!(report.centers, vec![center, TilePos::new(1, 2)]);
    assert!(report.destroyed.contains(TilePos::new(-1, -1)));
    assert!(report.destroyed.contains(TilePos::new(3, 3)));
    assert!(report.destroyed.contains(TilePos::new(3, 4)), "second blast widens the area");

    assert!(w.map.wall_at(TilePos::new(3, 1)).is_none(), "wood at the rim is gone");
    assert!(w.map.wall_at(TilePos::new(1, 2)).is_none());
    let walls = w
        .events
        .iter()
        .filter(|e| matches!(e, BattleEvent::WallDestroyed { .. }))
        .count();
    assert_eq!(walls, 2);
}

#[test]
fn test_explosion_chain_is_capped() {
    let row = "F".repeat(20);
    let layout: Vec<&str> = (0..3).map(|_| row.as_str()).collect();
    let mut w = world_with(TileMap::from_layout(&layout).unwrap(), Vec::new());
    let report = systems::hit::explode(&mut w, None, TilePos::new(0, 1), DamageDesc::new(60.0, 0.0, 0.0));
    assert_eq!(report.centers.len(), squad_core::constants::MAX_EXPLOSIONS);
}

// ---- End of battle ----

#[test]
fn test_battle_ends_when_aliens_fall() {
    let mut engine = sealed_engine(vec![soldier(Team::Terran, 2, 2), sealed_alien()]);
    assert!(!engine.end_condition());
    engine.world_mut().units[24].status = UnitStatus::Dead;
    assert!(engine.end_condition());

    let data = engine.tactical_data();
    assert!(data.victory());
    assert!(!engine.world().units[0].left);
}

#[test]
fn test_downed_terrans_leave_and_go_missing() {
    let mut engine = sealed_engine(vec![
        soldier(Team::Terran, 2, 2),
        soldier(Team::Terran, 3, 2),
        sealed_alien(),
    ]);
    engine.world_mut().units[0].status = UnitStatus::Dead;
    engine.world_mut().units[1].status = UnitStatus::Incapacitated;

    assert!(engine.end_condition());
    assert!(engine.world().units[..2].iter().all(|u| u.left));
    let data = engine.tactical_data();
    assert_eq!(data.terrans_killed, 1);
    assert_eq!(data.terrans_missing, 1);
    assert!(!data.victory());
}

#[test]
fn test_finished_battle_rejects_commands() {
    let mut engine = sealed_engine(vec![soldier(Team::Terran, 2, 2), sealed_alien()]);
    engine.world_mut().units[24].status = UnitStatus::Dead;
    engine.apply_command(PlayerCommand::EndTurn).unwrap();

    assert_eq!(engine.phase(), BattlePhase::Complete);
    let snap = engine.tick();
    assert!(snap.end.is_some());
    assert!(snap.events.contains(&BattleEvent::BattleEnded));
    assert_eq!(
        engine.apply_command(PlayerCommand::EndTurn),
        Err(CommandError::BattleOver)
    );
}

// ---- Unit cycling ----

fn lander_engine() -> BattleEngine {
    let mut map = TileMap::from_layout(&SEALED).unwrap();
    map.set_lander(Rect::new(0, 0, 1, 1), 0);
    engine_on(
        map,
        vec![
            soldier(Team::Terran, 1, 1),
            soldier(Team::Terran, 2, 1),
            soldier(Team::Terran, 8, 6),
            sealed_alien(),
        ],
        false,
    )
}

#[test]
fn test_sub_turn_order_groups_clumps() {
    let engine = lander_engine();
    assert_eq!(engine.sub_turn_order(), &[2, 0, 1]);
}

#[test]
fn test_next_unit_wraps_through_no_selection() {
    let mut engine = lander_engine();
    let mut picks = Vec::new();
    for _ in 0..5 {
        engine.apply_command(PlayerCommand::NextUnit { bias: 1 }).unwrap();
        picks.push(engine.world().selection.unit);
    }
    assert_eq!(picks, vec![Some(2), Some(0), Some(1), None, Some(2)]);

    engine.apply_command(PlayerCommand::NextUnit { bias: -1 }).unwrap();
    assert_eq!(engine.world().selection.unit, None);
    engine.apply_command(PlayerCommand::NextUnit { bias: -1 }).unwrap();
    assert_eq!(engine.world().selection.unit, Some(1));
}

#[test]
fn test_next_unit_skips_downed() {
    let mut engine = lander_engine();
    engine.world_mut().units[0].status = UnitStatus::Dead;
    engine.apply_command(PlayerCommand::NextUnit { bias: 1 }).unwrap();
    engine.apply_command(PlayerCommand::NextUnit { bias: 1 }).unwrap();
    assert_eq!(engine.world().selection.unit, Some(1));
}

// ---- AI ----

#[test]
fn test_inventory_ai_resupplies_from_storage() {
    let cat = catalog();
    let mut map = TileMap::from_layout(&SEALED).unwrap();
    map.add_storage(
        TilePos::new(6, 2),
        Storage::with_items([
            Item::Weapon(cat.weapon("Plasma Rifle").unwrap().clone()),
            Item::Clip(cat.full_clip("plasma_pack").unwrap()),
            Item::Clip(cat.full_clip("plasma_pack").unwrap()),
        ]),
    );
    let mut dry = soldier(Team::Alien, 6, 2);
    dry.inventory = Inventory::armed(cat.weapon("Laser Carbine").unwrap().clone(), Vec::new());
    let mut engine = engine_on(map, vec![soldier(Team::Terran, 2, 8), dry], false);

    engine.process_inventory_ai(24);
    let unit = &engine.world().units[24];
    assert_eq!(unit.weapon().map(|w| w.name.as_str()), Some("Plasma Rifle"));
    assert_eq!(unit.inventory.rounds("plasma_pack"), 40);

    let storage = engine.world().map.storage_at(TilePos::new(6, 2)).unwrap();
    assert!(storage.weapons().iter().any(|w| w.name == "Laser Carbine"));
    assert_eq!(storage.clip_count("plasma_pack"), 0);
}

#[test]
fn test_ai_battle_runs_to_completion_or_advances() {
    let mut engine = skirmish_engine(2024, true);
    for _ in 0..20_000 {
        engine.tick();
        if engine.phase() == BattlePhase::Complete {
            break;
        }
    }
    assert!(engine.turn_count() > 1 || engine.phase() == BattlePhase::Complete);
    let data = engine.tactical_data();
    assert_eq!(data.terrans.total, 4);
    assert_eq!(data.aliens.total, 5);
}

// ---- Saves ----

#[test]
fn test_save_round_trip() {
    let engine = skirmish_engine(77, false);
    let json = engine.save().unwrap().to_json().unwrap();

    let save = BattleSave::from_json(&json).unwrap();
    let loaded = BattleEngine::from_save(SimConfig::default(), save).unwrap();
    assert_eq!(loaded.current_team(), Team::Terran);
    assert_eq!(loaded.turn_count(), 1);
    assert_eq!(loaded.save().unwrap().to_json().unwrap(), json);
    assert_eq!(loaded.snapshot().units, engine.snapshot().units);
}
