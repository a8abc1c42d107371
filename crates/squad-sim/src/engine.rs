//! Battle engine: the turn and phase controller.
//!
//! `BattleEngine` owns the battle world, applies player commands, advances the
//! action stack one tick at a time, runs decision points, drives the AI, and
//! produces `BattleSnapshot`s. Completely headless, so every battle is
//! reproducible from its seed and command stream.

use std::collections::VecDeque;

use glam::Vec3;
use tracing::{debug, info, warn};

use squad_ai::{Ai, AiAction, AiContext, TeamAi};
use squad_core::commands::PlayerCommand;
use squad_core::constants::{CLUMP_ADD_OUTSET, CLUMP_FIRST_OUTSET, MAP_SIZE};
use squad_core::enums::{BattlePhase, Team, WeaponMode};
use squad_core::events::BattleEvent;
use squad_core::flags::ActionResult;
use squad_core::motion_path::MotionPath;
use squad_core::state::{BattleSnapshot, TacticalEndData};
use squad_core::types::{Rect, SimTime, TilePos};
use squad_core::unit::Unit;
use squad_core::weapon::Item;
use squad_terrain::grid::TileMap;
use squad_terrain::path::PathResult;

use crate::action::Action;
use crate::config::BattleConfig;
use crate::error::{CommandError, SaveError};
use crate::save::{place_units, BattleSave, SAVE_VERSION};
use crate::systems;
use crate::targets;
use crate::visibility;
use crate::world::BattleWorld;
use crate::world_setup::Scenario;

/// Slack when comparing a path's cost to the TU left.
const TU_EPSILON: f32 = 1e-4;

/// Configuration for starting a battle.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed and commands, same battle.
    pub seed: u64,
    /// Hand the Terran team to a warrior AI instead of the player.
    pub terran_ai: bool,
    pub battle: BattleConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            terran_ai: false,
            battle: BattleConfig::builtin(),
        }
    }
}

pub struct BattleEngine {
    world: BattleWorld,
    time: SimTime,
    phase: BattlePhase,
    command_queue: VecDeque<PlayerCommand>,
    /// Next slot the current team's AI thinks for.
    current_unit_ai: usize,
    /// Player activation order, from the lander outward.
    sub_turn_order: Vec<usize>,
    last_autosave: Option<BattleSave>,
}

impl BattleEngine {
    /// Start a new battle. The first phase is Terran, turn 1.
    pub fn new(config: SimConfig, scenario: Scenario) -> Result<Self, SaveError> {
        let units = place_units(scenario.units)?;
        let mut engine = Self::assemble(config, scenario.map, units);
        // Begin just before the Terran phase so the first advance opens it.
        engine.world.current_team = Team::Alien;
        engine.world.turn_count = 0;
        engine.next_turn();
        Ok(engine)
    }

    /// Resume a saved battle at the start of its saved phase.
    pub fn from_save(config: SimConfig, save: BattleSave) -> Result<Self, SaveError> {
        if save.version != SAVE_VERSION {
            return Err(SaveError::UnknownVersion(save.version));
        }
        let units = place_units(save.units)?;
        let mut map = save.map;
        map.day_time = save.day_time;

        let mut engine = Self::assemble(config, map, units);
        engine.world.current_team = save.current_team;
        engine.world.turn_count = save.turn_count;
        engine.current_unit_ai = save.current_team.unit_range().start;
        engine.process_doors();
        engine.calc_team_targets();
        engine.world.targets.clear();
        engine.start_team_turn();
        info!(target: "squad::save", team = ?save.current_team, turn = save.turn_count, "battle resumed");
        Ok(engine)
    }

    fn assemble(config: SimConfig, map: TileMap, units: Vec<Unit>) -> Self {
        let seed = config.seed;
        let steps = config.battle.max_think_steps;
        let mut world = BattleWorld::new(units, map, config.battle, seed);
        world.ais = [
            config
                .terran_ai
                .then(|| TeamAi::warrior(Team::Terran, seed).with_max_think_steps(steps)),
            Some(TeamAi::civilian(seed).with_max_think_steps(steps)),
            Some(TeamAi::warrior(Team::Alien, seed).with_max_think_steps(steps)),
        ];
        Self {
            world,
            time: SimTime::default(),
            phase: BattlePhase::Active,
            command_queue: VecDeque::new(),
            current_unit_ai: 0,
            sub_turn_order: Vec::new(),
            last_autosave: None,
        }
    }

    /// Save the battle. Only possible while no action is resolving.
    pub fn save(&self) -> Result<BattleSave, SaveError> {
        if !self.world.stack.is_empty() {
            return Err(SaveError::Busy);
        }
        Ok(BattleSave {
            version: SAVE_VERSION,
            current_team: self.world.current_team,
            turn_count: self.world.turn_count,
            day_time: self.world.map.day_time,
            map: self.world.map.clone(),
            units: self.world.units.iter().filter(|u| u.in_use).cloned().collect(),
        })
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the battle by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> BattleSnapshot {
        self.process_commands();

        if self.phase == BattlePhase::Active {
            self.step();
            self.time.advance(self.world.config.tick_ms);
        }

        let events = std::mem::take(&mut self.world.events);
        systems::snapshot::build_snapshot(&self.world, &self.time, self.phase, events)
    }

    /// Snapshot of the current state without advancing or draining events.
    pub fn snapshot(&self) -> BattleSnapshot {
        systems::snapshot::build_snapshot(&self.world, &self.time, self.phase, self.world.events.clone())
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn current_team(&self) -> Team {
        self.world.current_team
    }

    pub fn turn_count(&self) -> u32 {
        self.world.turn_count
    }

    pub fn world(&self) -> &BattleWorld {
        &self.world
    }

    /// The save taken at the start of the latest Terran phase, if autosave is on.
    pub fn last_autosave(&self) -> Option<&BattleSave> {
        self.last_autosave.as_ref()
    }

    pub fn sub_turn_order(&self) -> &[usize] {
        &self.sub_turn_order
    }

    #[cfg(test)]
    pub(crate) fn world_mut(&mut self) -> &mut BattleWorld {
        &mut self.world
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            if let Err(err) = self.apply_command(command.clone()) {
                warn!(target: "squad::command", ?command, error = %err, "command rejected");
            }
        }
    }

    /// Apply a player command now.
    pub fn apply_command(&mut self, command: PlayerCommand) -> Result<(), CommandError> {
        if self.phase == BattlePhase::Complete {
            return Err(CommandError::BattleOver);
        }
        match command {
            PlayerCommand::SelectUnit { unit } => {
                self.require_player_turn()?;
                self.select_unit(unit)
            }
            PlayerCommand::NextUnit { bias } => {
                self.require_player_turn()?;
                self.handle_next_unit(bias);
                Ok(())
            }
            PlayerCommand::SelectTarget { unit } => {
                if !self.world.units.get(unit).is_some_and(|u| u.is_alive()) {
                    return Err(CommandError::UnitUnavailable(unit));
                }
                self.world.selection.target_unit = Some(unit);
                self.world.selection.target_tile = None;
                Ok(())
            }
            PlayerCommand::TargetTile { x, y } => {
                let tile = self.tile_in_bounds(x, y)?;
                self.world.selection.target_tile = Some(tile);
                self.world.selection.target_unit = None;
                Ok(())
            }
            PlayerCommand::Move { x, y } => {
                let tile = self.tile_in_bounds(x, y)?;
                self.command_move(tile)
            }
            PlayerCommand::Rotate { x, y } => {
                let tile = self.tile_in_bounds(x, y)?;
                let unit = self.ready_unit()?;
                self.push_rotate_action(unit, tile, true);
                Ok(())
            }
            PlayerCommand::Shoot { mode } => self.command_shoot(mode),
            PlayerCommand::EndTurn => {
                self.require_player_turn()?;
                if !self.world.stack.is_empty() {
                    return Err(CommandError::ActionInProgress);
                }
                self.next_turn();
                if self.end_condition() {
                    self.finish();
                }
                Ok(())
            }
            PlayerCommand::FocusCamera { x, y, duration_ms } => {
                let tile = self.tile_in_bounds(x, y)?;
                if !self.world.stack.is_empty() {
                    return Err(CommandError::ActionInProgress);
                }
                self.world.stack.push(Action::Camera {
                    from: self.world.camera,
                    to: tile.center(),
                    duration_ms,
                    elapsed_ms: 0,
                });
                Ok(())
            }
        }
    }

    fn require_player_turn(&self) -> Result<(), CommandError> {
        let team = self.world.current_team;
        if team != Team::Terran || self.world.ai_controls(team) {
            return Err(CommandError::NotPlayerTurn(team));
        }
        Ok(())
    }

    /// The selected unit, if the player may order it right now.
    fn ready_unit(&self) -> Result<usize, CommandError> {
        self.require_player_turn()?;
        if !self.world.stack.is_empty() {
            return Err(CommandError::ActionInProgress);
        }
        let unit = self.world.selection.unit.ok_or(CommandError::NoSelection)?;
        if !self.world.units[unit].is_alive() {
            return Err(CommandError::UnitUnavailable(unit));
        }
        Ok(unit)
    }

    fn tile_in_bounds(&self, x: i32, y: i32) -> Result<TilePos, CommandError> {
        let tile = TilePos::new(x, y);
        if !self.world.map.in_bounds(tile) {
            return Err(CommandError::OutOfBounds { x, y });
        }
        Ok(tile)
    }

    /// Select a player unit. Switching units abandons whatever was running.
    fn select_unit(&mut self, unit: usize) -> Result<(), CommandError> {
        let ok = Team::Terran.unit_range().contains(&unit) && self.world.units[unit].is_alive();
        if !ok {
            return Err(CommandError::UnitUnavailable(unit));
        }
        if self.world.selection.unit != Some(unit) {
            self.world.stack.clear();
        }
        self.world.selection.unit = Some(unit);
        if self.world.stack.is_empty() {
            self.world.stack.push(Action::CameraBounds {
                target: self.world.units[unit].world_pos(),
                center: true,
            });
        }
        Ok(())
    }

    fn command_move(&mut self, dst: TilePos) -> Result<(), CommandError> {
        let unit = self.ready_unit()?;
        let blockers = self.world.blockers(Some(unit));
        let (start, tu) = (self.world.units[unit].pos, self.world.units[unit].tu);

        match self.world.map.solve_path(start, dst, &blockers) {
            PathResult::Solved { cost, tiles } => {
                if cost > tu + TU_EPSILON {
                    return Err(CommandError::InsufficientTu {
                        needed: cost,
                        available: tu,
                    });
                }
                let path = MotionPath::new(&tiles)?;
                debug!(target: "squad::action", unit, x = dst.x, y = dst.y, cost, "move queued");
                self.world.stack.push(Action::new_move(unit, path));
                Ok(())
            }
            PathResult::NoSolution => Err(CommandError::NoPath),
            PathResult::StartEndSame => Ok(()),
        }
    }

    fn command_shoot(&mut self, mode: WeaponMode) -> Result<(), CommandError> {
        let unit = self.ready_unit()?;
        let selection = self.world.selection;
        let target = match (selection.target_unit, selection.target_tile) {
            (Some(target), _) => self.world.units[target].target_point(),
            (None, Some(tile)) => tile.center(),
            (None, None) => return Err(CommandError::NoTarget),
        };
        if !self.push_shoot_action(unit, target, mode, 1.0) {
            return Err(CommandError::CannotFire(mode));
        }
        Ok(())
    }

    /// Queue a trigger pull. See [`systems::shoot::push_shoot_action`].
    pub fn push_shoot_action(&mut self, unit: usize, target: Vec3, mode: WeaponMode, error: f32) -> bool {
        systems::shoot::push_shoot_action(&mut self.world, unit, target, mode, error, true)
    }

    pub fn push_rotate_action(&mut self, unit: usize, dst: TilePos, quantize: bool) {
        systems::shoot::push_rotate_action(&mut self.world, unit, dst, quantize);
    }

    /// Advance the battle by one tick.
    pub fn step(&mut self) {
        if self.phase == BattlePhase::Complete {
            return;
        }

        // 1. Active action
        let delta_ms = self.world.config.tick_ms;
        let result = systems::process_action(&mut self.world, delta_ms);

        // 2. Fog of war
        self.set_fog_of_war();

        // 3. Decision point
        if result.contains(ActionResult::STEP_COMPLETE) {
            self.process_doors();
            self.calc_team_targets();
            self.dump_targets();
            systems::reaction::stop_for_new_team_target(&mut self.world);
            systems::reaction::do_reaction_fire(&mut self.world);
            self.world.targets.clear();
        }

        // 4. End condition
        if !result.is_empty() && self.end_condition() {
            self.finish();
            return;
        }

        // 5. Selection
        if let Some(unit) = self.world.selection.unit {
            if !self.world.units[unit].is_alive() {
                self.world.selection.unit = None;
            }
        }

        // 6. AI
        let team = self.world.current_team;
        if self.world.stack.is_empty() && self.world.ai_controls(team) && self.process_ai() {
            self.next_turn();
            if self.end_condition() {
                self.finish();
            }
        }
    }

    fn set_fog_of_war(&mut self) {
        self.world.refresh_visibility();
        if self.world.vis.fog_check_and_clear() {
            let range = self.world.sight_range();
            visibility::set_fog_of_war(&self.world.units, &mut self.world.map, range);
        }
    }

    fn process_doors(&mut self) {
        let occupied = self.world.occupied_tiles();
        if self.world.map.process_doors(&occupied) {
            debug!(target: "squad::turn", "doors changed");
            let range = self.world.sight_range();
            self.world.vis.invalidate_all(None, &self.world.units, range);
        }
    }

    fn calc_team_targets(&mut self) {
        let range = self.world.sight_range();
        let current = self.world.vis.calc_vis_map(&self.world.units, &self.world.map, range);
        targets::calc_team_targets(&mut self.world.targets, current, &self.world.units);
    }

    fn dump_targets(&mut self) {
        for &event in self.world.targets.events() {
            debug!(target: "squad::turn", ?event, "sighting");
            self.world.events.push(BattleEvent::Sighting { event });
        }
    }

    /// Advance to the next team's phase.
    pub fn next_turn(&mut self) {
        let team = self.world.current_team.next();
        self.world.current_team = team;
        self.world.turn_count += 1;
        for unit in &mut self.world.units[team.unit_range()] {
            unit.new_turn();
        }
        self.current_unit_ai = team.unit_range().start;

        let mut dirty = Rect::invalid();
        self.world.map.do_sub_turn(&mut dirty);
        let range = self.world.sight_range();
        self.world.vis.invalidate_all(Some(dirty), &self.world.units, range);
        self.process_doors();
        self.calc_team_targets();
        self.world.targets.clear();

        if team == Team::Terran && self.world.config.autosave {
            match self.save() {
                Ok(save) => self.last_autosave = Some(save),
                Err(err) => warn!(target: "squad::save", error = %err, "autosave skipped"),
            }
        }

        self.start_team_turn();
        let turn = self.world.turn_count;
        info!(target: "squad::turn", team = ?team, turn, "turn started");
        self.world.events.push(BattleEvent::TurnStarted { team, turn });
    }

    fn start_team_turn(&mut self) {
        let team = self.world.current_team;
        if let Some(ai) = self.world.ais[team.index()].as_mut() {
            ai.start_turn(&self.world.units, self.world.vis.matrix());
        } else if self.world.map.lander.is_some() {
            self.order_next_prev();
        }
    }

    /// Order the player's units for `NextUnit`: by distance from the lander's
    /// back wall, gathered into clumps of nearby units.
    pub fn order_next_prev(&mut self) {
        let Some(lander) = self.world.map.lander else {
            return;
        };
        let units = &self.world.units;
        let score = |id: usize| {
            let p = units[id].pos.rotate_quarter(-lander.rotation);
            -p.x + MAP_SIZE * p.y
        };
        let mut remaining: Vec<usize> = Team::Terran.unit_range().filter(|&id| units[id].is_alive()).collect();
        remaining.sort_by_key(|&id| std::cmp::Reverse(score(id)));

        let mut order = Vec::with_capacity(remaining.len());
        while !remaining.is_empty() {
            let first = remaining.remove(0);
            order.push(first);
            let mut clump = Rect::point(units[first].pos).outset(CLUMP_FIRST_OUTSET);
            while let Some(i) = remaining.iter().position(|&id| clump.contains(units[id].pos)) {
                let id = remaining.remove(i);
                order.push(id);
                clump = clump.union(&Rect::point(units[id].pos).outset(CLUMP_ADD_OUTSET));
            }
        }
        debug!(target: "squad::turn", ?order, "sub-turn order");
        self.sub_turn_order = order;
    }

    /// Cycle the selection through the sub-turn order. A "no selection" slot sits
    /// between the last and first unit. Downed units are skipped.
    pub fn handle_next_unit(&mut self, bias: i32) {
        let order: Vec<usize> = if self.sub_turn_order.is_empty() {
            Team::Terran
                .unit_range()
                .filter(|&id| self.world.units[id].is_alive())
                .collect()
        } else {
            self.sub_turn_order.clone()
        };
        let slots = order.len() + 1;
        let mut index = self
            .world
            .selection
            .unit
            .and_then(|s| order.iter().position(|&id| id == s))
            .map_or(0, |p| p + 1);
        let step = if bias < 0 { slots - 1 } else { 1 };

        for _ in 0..slots {
            index = (index + step) % slots;
            if index == 0 {
                self.world.selection.unit = None;
                return;
            }
            let id = order[index - 1];
            if self.world.units[id].is_alive() {
                if let Err(err) = self.select_unit(id) {
                    debug!(target: "squad::command", error = %err, "next unit skipped");
                    continue;
                }
                return;
            }
        }
    }

    /// Whether the battle is over. With no Terrans standing, every Terran leaves
    /// the area, so anyone down but alive goes missing.
    pub fn end_condition(&mut self) -> bool {
        let data = self.tactical_data();
        if data.terrans.alive == 0 {
            for unit in &mut self.world.units[Team::Terran.unit_range()] {
                if unit.in_use {
                    unit.leave();
                }
            }
        }
        data.aliens.alive == 0 || data.terrans.alive == 0
    }

    pub fn tactical_data(&self) -> TacticalEndData {
        TacticalEndData::tally(&self.world.units, self.world.turn_count)
    }

    fn finish(&mut self) {
        self.phase = BattlePhase::Complete;
        self.world.stack.clear();
        let data = self.tactical_data();
        info!(
            target: "squad::turn",
            turn = data.turn_count,
            victory = data.victory(),
            terrans = data.terrans.alive,
            aliens = data.aliens.alive,
            "battle over"
        );
        self.world.events.push(BattleEvent::BattleEnded);
    }

    /// Let the current team's AI act until it queues something or every unit is
    /// done. Returns true when the whole team is done.
    pub fn process_ai(&mut self) -> bool {
        let team = self.world.current_team;
        let end = team.unit_range().end;

        while self.world.stack.is_empty() {
            if self.current_unit_ai >= end {
                return true;
            }
            let id = self.current_unit_ai;
            if !self.world.units[id].is_alive() {
                self.current_unit_ai += 1;
                continue;
            }

            self.world.refresh_visibility();
            let blocked = self.world.blockers(None);
            let thought = {
                let ctx = AiContext {
                    units: &self.world.units,
                    vis: self.world.vis.matrix(),
                    map: &self.world.map,
                    blocked: &blocked,
                };
                let Some(ai) = self.world.ais[team.index()].as_mut() else {
                    return true;
                };
                ai.think(id, &ctx)
            };

            let mut done = thought.done;
            debug!(target: "squad::ai", unit = id, team = ?team, done, action = ?thought.action, "think");
            match thought.action {
                AiAction::Shoot { mode, target, target_unit } => {
                    if !self.push_shoot_action(id, target, mode, 1.0) {
                        debug!(target: "squad::ai", unit = id, target_unit, ?mode, "shot refused");
                        done = true;
                    }
                }
                AiAction::Move { path } => {
                    if path.first() == self.world.units[id].pos {
                        self.world.stack.push(Action::new_move(id, path));
                    } else {
                        done = true;
                    }
                }
                AiAction::Rotate { x, y } => self.push_rotate_action(id, TilePos::new(x, y), true),
                AiAction::Inventory => self.process_inventory_ai(id),
                AiAction::None => {}
            }
            if done {
                self.current_unit_ai += 1;
            }
        }
        false
    }

    /// Re-arm `unit` from the storage it stands on: put everything carried into
    /// the storage, take the best weapon, then fill up on its clips.
    pub fn process_inventory_ai(&mut self, unit: usize) {
        let pos = self.world.units[unit].pos;
        let Ok(mut storage) = self.world.map.lock_storage(pos) else {
            return;
        };

        if let Some(choice) = storage.is_resupply(self.world.units[unit].weapon()) {
            let inventory = &mut self.world.units[unit].inventory;
            for item in inventory.drain_weapons_and_clips() {
                storage.add_item(item);
            }
            if let Some(weapon) = storage.remove_weapon(&choice.name) {
                if let Err(item) = inventory.add(Item::Weapon(weapon)) {
                    storage.add_item(item);
                }
            }
            let kinds: Vec<String> = choice.clip_kinds().into_iter().map(str::to_string).collect();
            'fill: while !inventory.is_full() {
                let mut took = false;
                for kind in &kinds {
                    if inventory.is_full() {
                        break 'fill;
                    }
                    if let Some(clip) = storage.remove_clip(kind) {
                        took = true;
                        if let Err(item) = inventory.add(Item::Clip(clip)) {
                            storage.add_item(item);
                            break 'fill;
                        }
                    }
                }
                if !took {
                    break;
                }
            }
            info!(
                target: "squad::ai",
                unit,
                weapon = %choice.name,
                clips = inventory.clips().len(),
                "resupplied"
            );
        }

        if let Err(err) = self.world.map.release_storage(pos, storage) {
            warn!(target: "squad::ai", unit, error = %err, "storage release failed");
        }
    }
}
