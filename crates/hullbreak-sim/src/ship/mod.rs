//! Subsystems carried by ships: weapons plan, shields, energy, and flags.

pub mod energy;
pub mod firing_plan;
pub mod shield;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use hullbreak_core::affixes::{HasAffixes, ShipAffixes};
use hullbreak_core::blocks::BlockType;
use hullbreak_core::constants::DEFAULT_ENERGY_RECHARGE;
use hullbreak_core::enums::BehaviorKind;
use hullbreak_core::types::GridCoord;

use crate::composite::BlockInstance;

pub use energy::EnergyComponent;
pub use firing_plan::{FiringPlan, WeaponFiringPlanEntry};
pub use shield::ShieldComponent;

/// Ship-only state of a composite object.
#[derive(Debug, Clone, Default)]
pub struct ShipSystems {
    pub blueprint_id: String,
    pub firing_plan: FiringPlan,
    pub shield: ShieldComponent,
    pub energy: Option<EnergyComponent>,
    pub affixes: ShipAffixes,
    pub behavior: BehaviorKind,
    pub is_player: bool,
    /// Goes straight for the player instead of patrolling.
    pub hunter: bool,
    /// Exempt from distance culling and always AI-active.
    pub uncullable: bool,
    /// Touched another object this tick.
    pub colliding: bool,
}

/// Flags chosen at spawn time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipFlags {
    pub is_player: bool,
    pub hunter: bool,
    pub uncullable: bool,
    pub behavior: BehaviorKind,
}

impl ShipSystems {
    pub fn new(blueprint_id: &str, flags: ShipFlags) -> Self {
        Self {
            blueprint_id: blueprint_id.to_string(),
            behavior: flags.behavior,
            is_player: flags.is_player,
            hunter: flags.hunter,
            uncullable: flags.uncullable,
            ..Default::default()
        }
    }

    pub(crate) fn on_block_added(&mut self, coord: GridCoord, block_type: &BlockType) {
        self.firing_plan.add_block(coord, block_type);
        if block_type.is_shield_emitter() {
            self.shield.add_emitter(coord);
        }
    }

    pub(crate) fn on_block_removed(&mut self, coord: GridCoord) {
        self.firing_plan.remove_block(coord);
        self.shield.remove_emitter(coord);
    }

    /// Rebuild the energy pool from the current blocks. A ship has energy
    /// only while some block raises its capacity.
    pub(crate) fn refresh_energy(&mut self, blocks: &BTreeMap<GridCoord, BlockInstance>) {
        let (max, rate) = blocks
            .values()
            .filter_map(|b| b.block_type.behavior.as_ref())
            .fold((0.0, 0.0), |(max, rate), b| {
                (
                    max + b.energy_max_increase.unwrap_or(0.0),
                    rate + b.energy_charge_rate.unwrap_or(0.0),
                )
            });
        if max <= 0.0 {
            self.energy = None;
            return;
        }
        let rate = if rate > 0.0 { rate } else { DEFAULT_ENERGY_RECHARGE };
        match &mut self.energy {
            Some(energy) => {
                energy.set_max(max);
                energy.set_recharge_rate(rate);
            }
            None => self.energy = Some(EnergyComponent::new(max, rate)),
        }
    }

    /// Total shield drain per second, before affixes.
    pub fn shield_drain(&self, blocks: &BTreeMap<GridCoord, BlockInstance>) -> f64 {
        self.shield
            .emitters()
            .iter()
            .filter_map(|c| blocks.get(c))
            .filter_map(|b| b.block_type.behavior.as_ref()?.shield_energy_drain)
            .sum()
    }

    pub fn energy_current(&self) -> Option<f64> {
        self.energy.as_ref().map(EnergyComponent::current)
    }
}

impl HasAffixes for ShipSystems {
    fn affixes(&self) -> &ShipAffixes {
        &self.affixes
    }

    fn affixes_mut(&mut self) -> &mut ShipAffixes {
        &mut self.affixes
    }
}
