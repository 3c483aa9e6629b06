//! Edge-triggered shield switch.

use std::collections::BTreeMap;

use hullbreak_core::events::{GameEvent, SoundRequest};
use hullbreak_core::intent::UtilityIntent;
use hullbreak_core::types::ObjectId;

use super::{UtilityBackend, WeaponEffects};
use crate::composite::CompositeBlockObject;

const ACTIVATE_SOUND: &str = "energy-shield_00.wav";
const DEACTIVATE_SOUND: &str = "energy-shield-reverse_00.wav";
const SOUND_MAX_SIMULTANEOUS: u32 = 3;

/// Flips a ship's shield when the toggle goes from released to pressed.
/// Holding the toggle does nothing further.
#[derive(Debug, Default)]
pub struct ShieldToggleBackend {
    was_pressed: BTreeMap<ObjectId, bool>,
}

impl ShieldToggleBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget a ship's last toggle state.
    pub fn forget(&mut self, ship: ObjectId) {
        self.was_pressed.remove(&ship);
    }
}

impl UtilityBackend for ShieldToggleBackend {
    fn update(
        &mut self,
        _dt: f64,
        ship: &mut CompositeBlockObject,
        intent: &UtilityIntent,
        fx: &mut WeaponEffects,
    ) {
        let pressed = intent.toggle_shields;
        let was_pressed = self.was_pressed.insert(ship.id, pressed).unwrap_or(false);
        if !pressed || was_pressed {
            return;
        }

        let id = ship.id;
        let Some(systems) = ship.systems_mut() else {
            return;
        };
        if !systems.shield.has_emitters() {
            return;
        }

        let active = if systems.shield.is_active() {
            systems.shield.deactivate();
            false
        } else {
            systems.shield.activate()
        };
        log::debug!("ship {id} shield {}", if active { "up" } else { "down" });

        let sound = if active { ACTIVATE_SOUND } else { DEACTIVATE_SOUND };
        fx.sounds
            .push(SoundRequest::sfx(sound).with_max_simultaneous(SOUND_MAX_SIMULTANEOUS));
        fx.events.push(GameEvent::ShieldToggled { id, active });
    }
}
