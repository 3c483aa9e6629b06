use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use hullbreak_app::game_loop::{self, RunSummary};
use hullbreak_app::state::AppState;
use hullbreak_core::commands::PlayerCommand;
use hullbreak_core::config::WorldSettings;
use hullbreak_core::constants::TICK_RATE;
use hullbreak_sim::{SimConfig, SimulationEngine};

#[derive(Parser, Debug)]
#[command(name = "hullbreak", about = "Block-ship space combat simulation")]
struct Cli {
    /// RNG seed; the same seed replays the same mission.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// World settings JSON. Missing keys keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulation speed multiplier (0 to 4).
    #[arg(long, default_value_t = 1.0)]
    time_scale: f64,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Tick as fast as possible and report the outcome.
    Run {
        #[arg(long, default_value_t = 60 * 60 * 5)]
        ticks: u64,

        /// Leave the player ship idle instead of letting it return fire.
        #[arg(long)]
        no_autopilot: bool,

        /// Write the final snapshot here as JSON.
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
    /// Run the paced game loop for a while, polling its snapshots.
    Live {
        #[arg(long, default_value_t = 10)]
        seconds: u64,
    },
}

fn load_settings(path: Option<&Path>) -> Result<WorldSettings> {
    let Some(path) = path else {
        return Ok(WorldSettings::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    WorldSettings::from_json_str(&json).with_context(|| format!("bad settings in {}", path.display()))
}

fn report(summary: &RunSummary) {
    log::info!(
        "{:?} after {} ticks ({:.1}s): {} waves started, {} cleared",
        summary.phase,
        summary.ticks,
        summary.elapsed_secs,
        summary.waves_started,
        summary.score.waves_cleared
    );
    log::info!(
        "{} kills, {} objects destroyed, {} ships alive, {} incidents ({} completed), {} currency",
        summary.score.kills,
        summary.ships_destroyed,
        summary.live_ships,
        summary.incidents_triggered,
        summary.score.incidents_completed,
        summary.score.currency
    );
}

fn run(config: SimConfig, ticks: u64, autopilot: bool, snapshot_path: Option<&Path>) -> Result<()> {
    let mut engine = SimulationEngine::new(config).context("failed to build the simulation")?;
    let mut last = None;
    let summary = game_loop::run_headless(&mut engine, ticks, autopilot, |snap| {
        if snapshot_path.is_some() {
            last = Some(snap.clone());
        }
    });
    report(&summary);

    if let (Some(path), Some(snap)) = (snapshot_path, last) {
        let json = serde_json::to_string_pretty(&snap)?;
        fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))?;
        log::info!("final snapshot written to {}", path.display());
    }
    Ok(())
}

fn live(config: SimConfig, seconds: u64) -> Result<()> {
    let state = AppState::new();
    state.start(config)?;
    state.send(PlayerCommand::StartMission)?;

    for _ in 0..seconds {
        std::thread::sleep(Duration::from_secs(1));
        if let Some(snap) = state.snapshot()? {
            log::info!(
                "t={:.0}s wave {}/{} ships={} kills={}",
                snap.time.elapsed_secs,
                snap.waves.current_wave,
                snap.waves.total_waves,
                snap.ships.len(),
                snap.score.kills
            );
        }
    }
    state.shutdown()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = SimConfig {
        seed: cli.seed,
        time_scale: cli.time_scale,
        world: load_settings(cli.config.as_deref())?,
    };
    log::info!("seed {} at {} ticks/s", config.seed, TICK_RATE);

    match cli.mode {
        Mode::Run {
            ticks,
            no_autopilot,
            snapshot,
        } => run(config, ticks, !no_autopilot, snapshot.as_deref()),
        Mode::Live { seconds } => live(config, seconds),
    }
}
