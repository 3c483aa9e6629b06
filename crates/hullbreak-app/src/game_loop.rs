//! Game loops: a real-time thread paced at the tick rate, and a headless
//! batch runner that ticks as fast as it can.
//!
//! The real-time loop owns the engine. Commands arrive via `mpsc` channel and
//! the latest snapshot is stored in shared state for polling.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use hullbreak_core::commands::PlayerCommand;
use hullbreak_core::constants::TICK_RATE;
use hullbreak_core::enums::GamePhase;
use hullbreak_core::events::GameEvent;
use hullbreak_core::state::{GameStateSnapshot, ScoreView};
use hullbreak_sim::{SimConfig, SimulationEngine};

use crate::autopilot;
use crate::state::GameLoopCommand;

/// Nominal duration of one tick at 1x speed.
pub const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// Spawn the real-time game loop in a new thread.
///
/// Returns the command sender and the thread handle.
pub fn spawn_game_loop(
    config: SimConfig,
    latest_snapshot: Arc<Mutex<Option<GameStateSnapshot>>>,
) -> Result<(mpsc::Sender<GameLoopCommand>, JoinHandle<()>)> {
    let engine = SimulationEngine::new(config).context("failed to build the simulation")?;
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();

    let handle = std::thread::Builder::new()
        .name("hullbreak-game-loop".into())
        .spawn(move || run_game_loop(engine, cmd_rx, &latest_snapshot))
        .context("failed to spawn game loop thread")?;

    Ok((cmd_tx, handle))
}

/// The real-time loop. Runs until Shutdown or channel disconnect.
fn run_game_loop(
    mut engine: SimulationEngine,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    latest_snapshot: &Mutex<Option<GameStateSnapshot>>,
) {
    let mut next_tick_time = Instant::now();

    loop {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::PlayerCommand(cmd)) => engine.queue_command(cmd),
                Ok(GameLoopCommand::Shutdown) => return,
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return,
            }
        }

        // 2. Advance one tick (the engine handles pause internally)
        let snapshot = engine.tick();

        // 3. Store the latest snapshot for polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        // 4. Sleep until the next tick, adjusted for time scale
        let time_scale = engine.time_scale();
        let effective_tick_duration = if time_scale > 0.001 {
            TICK_DURATION.div_f64(time_scale)
        } else {
            TICK_DURATION
        };

        next_tick_time += effective_tick_duration;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > effective_tick_duration * 2 {
            // Too far behind, reset instead of catching up
            next_tick_time = now;
        }
    }
}

/// Totals gathered over a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub elapsed_secs: f64,
    pub phase: GamePhase,
    pub waves_started: usize,
    pub ships_destroyed: usize,
    pub incidents_triggered: usize,
    pub pickups_collected: usize,
    pub live_ships: usize,
    pub score: ScoreView,
}

impl RunSummary {
    /// Fold one tick's snapshot into the totals.
    pub fn observe(&mut self, snapshot: &GameStateSnapshot) {
        self.ticks = snapshot.time.tick;
        self.elapsed_secs = snapshot.time.elapsed_secs;
        self.phase = snapshot.phase;
        self.live_ships = snapshot.ships.len();
        self.score = snapshot.score.clone();
        for event in &snapshot.events {
            match event {
                GameEvent::WaveStarted { .. } => self.waves_started += 1,
                GameEvent::EntityDestroyed { .. } => self.ships_destroyed += 1,
                GameEvent::IncidentTriggered { .. } => self.incidents_triggered += 1,
                GameEvent::PickupCollected { .. } => self.pickups_collected += 1,
                _ => {}
            }
        }
    }
}

/// Start a mission and run up to `ticks` ticks without pacing. Stops early
/// once the mission is over. With `autopilot`, the player ship engages
/// nearby enemies on its own.
pub fn run_headless(
    engine: &mut SimulationEngine,
    ticks: u64,
    autopilot: bool,
    mut on_snapshot: impl FnMut(&GameStateSnapshot),
) -> RunSummary {
    let mut summary = RunSummary::default();
    engine.queue_command(PlayerCommand::StartMission);

    for _ in 0..ticks {
        let snapshot = engine.tick();
        summary.observe(&snapshot);
        on_snapshot(&snapshot);
        if snapshot.phase == GamePhase::Complete {
            break;
        }
        if autopilot {
            if let Some(intent) = autopilot::intent_for(&snapshot) {
                engine.queue_command(PlayerCommand::SetIntent { intent });
            }
        }
    }
    summary
}
