//! Game state snapshot: the complete visible state produced each tick.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::{GameEvent, SoundRequest};
use crate::types::{ObjectId, SimTime};

/// Complete game state produced after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub player: Option<ObjectId>,
    pub ships: Vec<ShipView>,
    pub asteroids: Vec<ObjectView>,
    pub projectiles: Vec<ProjectileView>,
    pub pickups: Vec<PickupView>,
    /// Objects with a block inside the camera viewport.
    pub visible: Vec<ObjectId>,
    pub waves: WaveView,
    pub incidents: Vec<String>,
    pub events: Vec<GameEvent>,
    pub sounds: Vec<SoundRequest>,
    pub score: ScoreView,
}

/// A ship or station.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShipView {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub faction: Faction,
    pub position: DVec2,
    pub velocity: DVec2,
    pub rotation: f64,
    pub blocks: usize,
    pub shield_active: bool,
    pub energy: Option<f64>,
    /// Name of the AI state, absent for the player.
    pub ai_state: Option<String>,
    pub formation: Option<String>,
}

/// A passive block object such as an asteroid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectView {
    pub id: ObjectId,
    pub position: DVec2,
    pub rotation: f64,
    pub blocks: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectileView {
    pub owner: ObjectId,
    pub fire_type: FireType,
    pub position: DVec2,
    pub velocity: DVec2,
    /// Particle colors, brightest first.
    pub palette: [String; 3],
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PickupView {
    pub kind: PickupKind,
    pub position: DVec2,
    pub amount: u32,
}

/// Wave schedule progress.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaveView {
    /// Number of waves spawned so far.
    pub current_wave: usize,
    pub total_waves: usize,
    /// Seconds until the next wave, if it is on a timer.
    pub time_until_next: Option<f64>,
    pub active_remaining: usize,
    pub boss_active: bool,
    pub all_spawned: bool,
    pub paused: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreView {
    pub kills: u32,
    pub waves_cleared: u32,
    pub incidents_completed: u32,
    /// Currency picked up by the player.
    pub currency: u32,
}
