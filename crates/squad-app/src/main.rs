use std::io;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use squad_app::game_loop::LoopOptions;
use squad_app::input;
use squad_app::state::AppState;
use squad_core::weapon::ItemCatalog;
use squad_sim::{world_setup, BattleConfig, BattleEngine, BattleSave, SimConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless squad skirmish", long_about = None)]
struct Args {
    /// RNG seed; the same seed and commands replay the same battle
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Override the tick length in milliseconds
    #[arg(long)]
    tick_ms: Option<u32>,

    /// Stop after this many ticks
    #[arg(long, default_value_t = 200_000)]
    max_ticks: u64,

    /// Command the Terrans yourself: JSON-line commands on stdin
    #[arg(long)]
    player: bool,

    /// Battle config JSON (defaults to the builtin config)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Resume a saved battle instead of starting the skirmish
    #[arg(long)]
    load: Option<PathBuf>,

    /// Write a save here when the loop stops
    #[arg(long)]
    save: Option<PathBuf>,

    /// Save at the start of every Terran phase
    #[arg(long)]
    autosave: bool,

    /// Print every n-th snapshot to stdout as a JSON line
    #[arg(long)]
    snapshot_every: Option<u64>,

    /// Pace ticks in real time
    #[arg(long)]
    realtime: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let engine = build_engine(&args)?;
    let options = LoopOptions {
        max_ticks: args.max_ticks,
        snapshot_every: args.snapshot_every,
        realtime: args.realtime,
    };

    let state = AppState::new();
    let handle = state.start(engine, options).map_err(|e| anyhow!(e))?;
    if args.player {
        let tx = state.command_sender().map_err(|e| anyhow!(e))?;
        input::spawn_stdin_reader(tx).context("failed to spawn stdin reader")?;
    }
    let engine = handle.join().map_err(|_| anyhow!("game loop panicked"))?;

    if let Some(path) = &args.save {
        write_save(&engine, path)?;
    }

    let data = engine.tactical_data();
    info!(
        target: "squad::app",
        turns = data.turn_count,
        victory = data.victory(),
        "run finished"
    );
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}

fn build_engine(args: &Args) -> Result<BattleEngine> {
    let mut battle = match &args.config {
        Some(path) => BattleConfig::from_path(path).with_context(|| format!("bad config {}", path.display()))?,
        None => BattleConfig::load(),
    };
    if let Some(tick_ms) = args.tick_ms {
        battle.tick_ms = tick_ms;
    }
    battle.autosave |= args.autosave;

    let config = SimConfig {
        seed: args.seed,
        terran_ai: !args.player,
        battle,
    };
    let engine = match &args.load {
        Some(path) => {
            let save = BattleSave::read_from(path).with_context(|| format!("cannot load {}", path.display()))?;
            BattleEngine::from_save(config, save)?
        }
        None => {
            let catalog = ItemCatalog::builtin()?;
            BattleEngine::new(config, world_setup::skirmish(&catalog)?)?
        }
    };
    info!(
        target: "squad::app",
        seed = args.seed,
        team = ?engine.current_team(),
        turn = engine.turn_count(),
        "battle ready"
    );
    Ok(engine)
}

/// Save the final state, or the last autosave when an action was still running.
fn write_save(engine: &BattleEngine, path: &Path) -> Result<()> {
    let save = match engine.save() {
        Ok(save) => save,
        Err(err) => {
            warn!(target: "squad::app", error = %err, "falling back to autosave");
            engine
                .last_autosave()
                .cloned()
                .ok_or_else(|| anyhow!("nothing to save: {err}"))?
        }
    };
    save.write_to(path)?;
    Ok(())
}
