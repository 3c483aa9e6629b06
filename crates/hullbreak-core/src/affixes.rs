//! Ship affixes: multiplicative modifiers layered on a ship by waves and blueprints.

use serde::{Deserialize, Serialize};

/// Optional modifiers on a ship. Absent numeric fields behave as 1.0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipAffixes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fire_rate_multi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thrust_power_multi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_power_multi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ramming_damage_inflict_multiplier: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shield_efficiency_multi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shield_radius_multi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shield_energy_drain_multi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invulnerable: Option<bool>,
}

fn compound(base: &mut Option<f64>, delta: Option<f64>) {
    if let Some(d) = delta {
        *base = Some(base.unwrap_or(1.0) * d);
    }
}

impl ShipAffixes {
    /// Fold `delta` into these affixes: numeric fields multiply, flags overwrite.
    pub fn merge(&mut self, delta: &ShipAffixes) {
        compound(&mut self.fire_rate_multi, delta.fire_rate_multi);
        compound(&mut self.thrust_power_multi, delta.thrust_power_multi);
        compound(&mut self.turn_power_multi, delta.turn_power_multi);
        compound(
            &mut self.ramming_damage_inflict_multiplier,
            delta.ramming_damage_inflict_multiplier,
        );
        compound(&mut self.shield_efficiency_multi, delta.shield_efficiency_multi);
        compound(&mut self.shield_radius_multi, delta.shield_radius_multi);
        compound(&mut self.shield_energy_drain_multi, delta.shield_energy_drain_multi);
        if delta.invulnerable.is_some() {
            self.invulnerable = delta.invulnerable;
        }
    }

    pub fn fire_rate(&self) -> f64 {
        self.fire_rate_multi.unwrap_or(1.0)
    }

    pub fn thrust_power(&self) -> f64 {
        self.thrust_power_multi.unwrap_or(1.0)
    }

    pub fn turn_power(&self) -> f64 {
        self.turn_power_multi.unwrap_or(1.0)
    }

    pub fn shield_efficiency(&self) -> f64 {
        self.shield_efficiency_multi.unwrap_or(1.0)
    }

    pub fn shield_radius(&self) -> f64 {
        self.shield_radius_multi.unwrap_or(1.0)
    }

    pub fn shield_energy_drain(&self) -> f64 {
        self.shield_energy_drain_multi.unwrap_or(1.0)
    }

    pub fn ramming_damage(&self) -> f64 {
        self.ramming_damage_inflict_multiplier.unwrap_or(1.0)
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable.unwrap_or(false)
    }
}

/// Capability of entities that carry affixes.
pub trait HasAffixes {
    fn affixes(&self) -> &ShipAffixes;
    fn affixes_mut(&mut self) -> &mut ShipAffixes;

    fn apply_affixes(&mut self, delta: &ShipAffixes) {
        self.affixes_mut().merge(delta);
    }
}
