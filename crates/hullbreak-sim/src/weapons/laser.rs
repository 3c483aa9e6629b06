//! Continuous beam weapons.
//!
//! The backend only decides whether a ship's lasers are firing this tick.
//! Beam geometry, energy cost and damage are resolved by the laser system.

use rand::RngCore;

use hullbreak_core::constants::LASER_MIN_ENERGY;
use hullbreak_core::intent::WeaponIntent;

use super::{LaserRequest, WeaponBackend, WeaponEffects};
use crate::composite::CompositeBlockObject;

#[derive(Debug, Default)]
pub struct LaserBackend;

impl LaserBackend {
    pub fn new() -> Self {
        Self
    }
}

impl WeaponBackend for LaserBackend {
    fn update(
        &mut self,
        _dt: f64,
        ship: &mut CompositeBlockObject,
        intent: &WeaponIntent,
        _rng: &mut dyn RngCore,
        fx: &mut WeaponEffects,
    ) {
        if !intent.fire_secondary {
            return;
        }
        let Some(energy) = ship.systems().and_then(|s| s.energy_current()) else {
            return;
        };
        if energy < LASER_MIN_ENERGY {
            return;
        }
        if !ship.blocks().any(|b| b.block_type.is_laser()) {
            return;
        }
        fx.lasers.push(LaserRequest {
            ship: ship.id,
            transform: ship.transform,
            aim_at: intent.aim_at,
        });
    }
}
