//! State shared between the command-line front end and the game loop thread.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use anyhow::{anyhow, bail, Result};

use hullbreak_core::commands::PlayerCommand;
use hullbreak_core::state::GameStateSnapshot;
use hullbreak_sim::SimConfig;

use crate::game_loop;

/// Commands sent from the front end to the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A player command to forward to the simulation engine.
    PlayerCommand(PlayerCommand),
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

/// Handle on a running real-time game loop.
///
/// The sender sits behind a `Mutex` so the state can be shared across
/// threads; the latest snapshot is shared with the loop itself.
#[derive(Default)]
pub struct AppState {
    /// `None` until `start` is called.
    pub command_tx: Mutex<Option<mpsc::Sender<GameLoopCommand>>>,
    /// Updated by the game loop thread after each tick.
    pub latest_snapshot: Arc<Mutex<Option<GameStateSnapshot>>>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the game loop. Fails if one is already running.
    pub fn start(&self, config: SimConfig) -> Result<()> {
        let mut tx_lock = self.command_tx.lock().map_err(|e| anyhow!("{e}"))?;
        if tx_lock.is_some() {
            bail!("simulation already running");
        }
        let (tx, handle) = game_loop::spawn_game_loop(config, Arc::clone(&self.latest_snapshot))?;
        *tx_lock = Some(tx);
        *self.thread.lock().map_err(|e| anyhow!("{e}"))? = Some(handle);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.command_tx.lock().is_ok_and(|tx| tx.is_some())
    }

    /// Forward a player command to the running loop.
    pub fn send(&self, command: PlayerCommand) -> Result<()> {
        let tx_lock = self.command_tx.lock().map_err(|e| anyhow!("{e}"))?;
        match tx_lock.as_ref() {
            Some(tx) => tx
                .send(GameLoopCommand::PlayerCommand(command))
                .map_err(|e| anyhow!("failed to send command: {e}")),
            None => bail!("simulation not started"),
        }
    }

    pub fn snapshot(&self) -> Result<Option<GameStateSnapshot>> {
        let lock = self.latest_snapshot.lock().map_err(|e| anyhow!("{e}"))?;
        Ok(lock.clone())
    }

    /// Stop the loop and wait for its thread to exit.
    pub fn shutdown(&self) -> Result<()> {
        if let Some(tx) = self.command_tx.lock().map_err(|e| anyhow!("{e}"))?.take() {
            let _ = tx.send(GameLoopCommand::Shutdown);
        }
        if let Some(handle) = self.thread.lock().map_err(|e| anyhow!("{e}"))?.take() {
            handle
                .join()
                .map_err(|_| anyhow!("game loop thread panicked"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_creation() {
        let state = AppState::new();
        assert!(state.command_tx.lock().unwrap().is_none());
        assert!(state.latest_snapshot.lock().unwrap().is_none());
        assert!(!state.is_running());
    }

    #[test]
    fn test_send_before_start_fails() {
        let state = AppState::new();
        assert!(state.send(PlayerCommand::StartMission).is_err());
    }
}
