//! Application state shared between the command reader, the game loop thread,
//! and `main`.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use squad_core::commands::PlayerCommand;
use squad_core::state::BattleSnapshot;
use squad_sim::BattleEngine;

use crate::game_loop::{self, LoopOptions};

/// Messages for the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A player command to forward to the battle engine.
    PlayerCommand(PlayerCommand),
    /// Stop the game loop after the current tick.
    Shutdown,
}

/// Handles to a running battle.
///
/// `mpsc::Sender` is not `Sync`, so it sits behind a `Mutex`; the latest
/// snapshot is shared with the loop thread through an `Arc`.
pub struct AppState {
    /// `None` until [`AppState::start`] is called.
    pub command_tx: Mutex<Option<mpsc::Sender<GameLoopCommand>>>,
    /// Updated by the game loop after each tick.
    pub latest_snapshot: Arc<Mutex<Option<BattleSnapshot>>>,
    pub running: Mutex<bool>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            command_tx: Mutex::new(None),
            latest_snapshot: Arc::new(Mutex::new(None)),
            running: Mutex::new(false),
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand `engine` to a new game loop thread. The handle yields the engine
    /// back once the loop stops.
    pub fn start(&self, engine: BattleEngine, options: LoopOptions) -> Result<JoinHandle<BattleEngine>, String> {
        let mut running = self.running.lock().map_err(|e| e.to_string())?;
        if *running {
            return Err("battle already running".into());
        }

        let (cmd_tx, handle) = game_loop::spawn_game_loop(engine, options, self.latest_snapshot.clone())
            .map_err(|e| format!("failed to spawn game loop: {e}"))?;

        let mut tx_lock = self.command_tx.lock().map_err(|e| e.to_string())?;
        *tx_lock = Some(cmd_tx);
        *running = true;
        Ok(handle)
    }

    /// A sender for another producer of commands, such as the stdin reader.
    pub fn command_sender(&self) -> Result<mpsc::Sender<GameLoopCommand>, String> {
        let tx_lock = self.command_tx.lock().map_err(|e| e.to_string())?;
        tx_lock.clone().ok_or_else(|| "battle not started".into())
    }

    pub fn send_command(&self, command: PlayerCommand) -> Result<(), String> {
        let tx_lock = self.command_tx.lock().map_err(|e| e.to_string())?;
        match tx_lock.as_ref() {
            Some(tx) => tx
                .send(GameLoopCommand::PlayerCommand(command))
                .map_err(|e| format!("failed to send command: {e}")),
            None => Err("battle not started".into()),
        }
    }

    /// Ask the loop to stop. A loop that already finished is not an error.
    pub fn shutdown(&self) -> Result<(), String> {
        let tx_lock = self.command_tx.lock().map_err(|e| e.to_string())?;
        if let Some(tx) = tx_lock.as_ref() {
            let _ = tx.send(GameLoopCommand::Shutdown);
        }
        Ok(())
    }

    pub fn latest_snapshot(&self) -> Result<Option<BattleSnapshot>, String> {
        let lock = self.latest_snapshot.lock().map_err(|e| e.to_string())?;
        Ok(lock.clone())
    }
}
