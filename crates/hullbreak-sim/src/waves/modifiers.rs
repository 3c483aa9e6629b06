//! Named wave modifiers and their affix deltas.

use hullbreak_core::affixes::{HasAffixes, ShipAffixes};
use hullbreak_core::types::ObjectId;

use crate::sector::Sector;

/// Affix delta for a modifier tag, or `None` for an unknown tag.
pub fn modifier_affixes(tag: &str) -> Option<ShipAffixes> {
    match tag {
        "extra-aggressive" => Some(ShipAffixes {
            fire_rate_multi: Some(1.5),
            thrust_power_multi: Some(1.2),
            turn_power_multi: Some(1.2),
            ramming_damage_inflict_multiplier: Some(1.3),
            ..Default::default()
        }),
        "shielded" => Some(ShipAffixes {
            shield_efficiency_multi: Some(1.4),
            shield_radius_multi: Some(1.25),
            shield_energy_drain_multi: Some(0.75),
            ..Default::default()
        }),
        "fast" => Some(ShipAffixes {
            thrust_power_multi: Some(1.6),
            turn_power_multi: Some(1.6),
            ..Default::default()
        }),
        _ => None,
    }
}

/// Folds wave modifier tags into ship affixes.
///
/// Numeric multipliers compound across calls: applying the same tag twice
/// applies its multipliers twice. Unknown tags are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaveModifiersApplier;

impl WaveModifiersApplier {
    pub fn new() -> Self {
        Self
    }

    pub fn apply(&self, target: &mut dyn HasAffixes, mods: &[String]) {
        for tag in mods {
            match modifier_affixes(tag) {
                Some(delta) => target.apply_affixes(&delta),
                None => log::trace!("ignoring unknown wave modifier '{tag}'"),
            }
        }
    }

    /// Apply to a ship in the sector and refresh its shield coverage, which
    /// depends on the radius and efficiency multipliers.
    pub fn apply_to_ship(&self, sector: &mut Sector, id: ObjectId, mods: &[String]) {
        if mods.is_empty() {
            return;
        }
        let Some(ship) = sector.get_mut(id) else {
            return;
        };
        let Some(target) = ship.affixed_mut() else {
            return;
        };
        self.apply(target, mods);
        ship.recalculate_shield_coverage();
    }
}
