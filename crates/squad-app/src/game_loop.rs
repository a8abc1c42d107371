//! Game loop thread: advances the battle engine tick by tick and publishes
//! snapshots.
//!
//! The engine moves into the thread and comes back through the join handle when
//! the loop ends. Commands arrive via `mpsc` channel. Snapshots are stored in
//! shared state for polling and, when asked for, written to stdout as JSON lines.

use std::io::{self, Write};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use squad_core::enums::BattlePhase;
use squad_core::state::BattleSnapshot;
use squad_sim::BattleEngine;

use crate::state::GameLoopCommand;

#[derive(Debug, Clone, Copy)]
pub struct LoopOptions {
    /// Stop after this many ticks even if the battle is undecided.
    pub max_ticks: u64,
    /// Write every n-th snapshot to stdout.
    pub snapshot_every: Option<u64>,
    /// Sleep out each tick instead of running flat out.
    pub realtime: bool,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            max_ticks: 200_000,
            snapshot_every: None,
            realtime: false,
        }
    }
}

/// Spawns the game loop in a new thread.
///
/// Returns the command sender and a handle that yields the engine back.
pub fn spawn_game_loop(
    mut engine: BattleEngine,
    options: LoopOptions,
    latest_snapshot: Arc<Mutex<Option<BattleSnapshot>>>,
) -> io::Result<(mpsc::Sender<GameLoopCommand>, JoinHandle<BattleEngine>)> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();

    let handle = std::thread::Builder::new()
        .name("squad-game-loop".into())
        .spawn(move || {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            run_game_loop(&mut engine, &cmd_rx, options, &latest_snapshot, &mut out);
            engine
        })?;

    Ok((cmd_tx, handle))
}

/// The game loop. Runs until the battle ends, the tick limit is hit, or a
/// Shutdown command arrives.
pub fn run_game_loop(
    engine: &mut BattleEngine,
    cmd_rx: &mpsc::Receiver<GameLoopCommand>,
    options: LoopOptions,
    latest_snapshot: &Mutex<Option<BattleSnapshot>>,
    out: &mut impl Write,
) {
    let tick_duration = Duration::from_millis(u64::from(engine.world().config.tick_ms));
    let mut next_tick_time = Instant::now();

    for tick in 1..=options.max_ticks {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::PlayerCommand(cmd)) => engine.queue_command(cmd),
                Ok(GameLoopCommand::Shutdown) => {
                    info!(target: "squad::app", tick, "game loop shut down");
                    return;
                }
                Err(mpsc::TryRecvError::Empty | mpsc::TryRecvError::Disconnected) => break,
            }
        }

        // 2. Advance one tick
        let snapshot = engine.tick();

        // 3. Publish
        if options.snapshot_every.is_some_and(|n| n > 0 && tick % n == 0) {
            match serde_json::to_string(&snapshot) {
                Ok(json) => {
                    if let Err(err) = writeln!(out, "{json}") {
                        warn!(target: "squad::app", error = %err, "snapshot write failed");
                    }
                }
                Err(err) => warn!(target: "squad::app", error = %err, "snapshot serialization failed"),
            }
        }
        let done = snapshot.phase == BattlePhase::Complete;
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }
        if done {
            info!(target: "squad::app", tick, "battle complete");
            return;
        }

        // 4. Pace
        if options.realtime {
            next_tick_time += tick_duration;
            let now = Instant::now();
            if next_tick_time > now {
                std::thread::sleep(next_tick_time - now);
            } else if now - next_tick_time > tick_duration * 2 {
                // Too far behind; reset to avoid a catch-up spiral
                next_tick_time = now;
            }
        }
    }
    warn!(target: "squad::app", max_ticks = options.max_ticks, "tick limit reached");
}
