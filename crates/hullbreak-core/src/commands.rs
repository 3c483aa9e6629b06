//! Commands sent from the outside world into the simulation.

use serde::{Deserialize, Serialize};

use crate::intent::ShipIntent;
use crate::types::Rect;
use crate::waves::WaveDefinition;

/// Commands processed at the start of the next tick, in arrival order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    /// Spawn the player ship and start the wave schedule.
    StartMission,
    Pause,
    Resume,
    /// Set simulation speed multiplier (clamped to 0.0..=4.0).
    SetTimeScale { scale: f64 },
    /// Latest intent for the player ship; the last one before a tick wins.
    SetIntent { intent: ShipIntent },
    /// Camera viewport in world units.
    SetViewport { viewport: Rect },
    SkipToNextWave,
    /// Spawn a one-shot wave tracked under `tag`. Ignored if the tag is live.
    SpawnTaggedWave { tag: String, wave: WaveDefinition },
    ClearTaggedWave { tag: String },
}
