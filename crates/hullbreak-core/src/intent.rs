//! Per-tick intents produced by controllers and consumed by ship systems.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::FiringMode;

/// Helm commands for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementIntent {
    pub thrust_forward: bool,
    pub brake: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
}

impl MovementIntent {
    /// Hold position: brake, no thrust, no rotation.
    pub fn idle() -> Self {
        Self {
            brake: true,
            ..Default::default()
        }
    }
}

/// Fire commands for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaponIntent {
    pub fire_primary: bool,
    pub fire_secondary: bool,
    /// World-space aim point.
    pub aim_at: DVec2,
    #[serde(default)]
    pub firing_mode: FiringMode,
}

/// Utility commands for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UtilityIntent {
    /// Held state of the shield toggle; the toggle acts on the rising edge.
    pub toggle_shields: bool,
}

/// Everything a controller wants a ship to do this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipIntent {
    pub movement: MovementIntent,
    pub weapons: WeaponIntent,
    pub utility: UtilityIntent,
}

impl ShipIntent {
    /// No movement, no fire, no utility.
    pub fn inert() -> Self {
        Self::default()
    }
}
