//! Shield emitters and the blocks they cover.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use hullbreak_core::affixes::ShipAffixes;
use hullbreak_core::types::GridCoord;

use crate::composite::BlockInstance;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShieldComponent {
    active: bool,
    emitters: Vec<GridCoord>,
}

impl ShieldComponent {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn has_emitters(&self) -> bool {
        !self.emitters.is_empty()
    }

    pub fn emitters(&self) -> &[GridCoord] {
        &self.emitters
    }

    pub fn add_emitter(&mut self, coord: GridCoord) {
        if !self.emitters.contains(&coord) {
            self.emitters.push(coord);
        }
    }

    pub fn remove_emitter(&mut self, coord: GridCoord) -> bool {
        let before = self.emitters.len();
        self.emitters.retain(|c| *c != coord);
        before != self.emitters.len()
    }

    /// Turn on, unless there is nothing to emit with.
    pub fn activate(&mut self) -> bool {
        self.active = self.has_emitters();
        self.active
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Recompute which blocks are covered. Each covered block keeps the
    /// strongest efficiency among the emitters reaching it. With no emitters
    /// left the shield is forced off.
    pub fn recalculate_coverage(
        &mut self,
        blocks: &mut BTreeMap<GridCoord, BlockInstance>,
        affixes: &ShipAffixes,
    ) {
        for block in blocks.values_mut() {
            block.shield_efficiency = None;
        }

        self.emitters.retain(|c| blocks.contains_key(c));
        if self.emitters.is_empty() {
            self.deactivate();
            return;
        }

        let sources: Vec<(GridCoord, i32, f64)> = self
            .emitters
            .iter()
            .filter_map(|c| {
                let behavior = blocks.get(c)?.block_type.behavior.as_ref()?;
                let radius = behavior.shield_radius? as f64 * affixes.shield_radius();
                let efficiency =
                    behavior.shield_efficiency.unwrap_or(0.0) * affixes.shield_efficiency();
                Some((*c, radius.round() as i32, efficiency))
            })
            .collect();

        for (coord, block) in blocks.iter_mut() {
            for &(emitter, radius, efficiency) in &sources {
                if coord.chebyshev(&emitter) <= radius
                    && efficiency >= block.shield_efficiency.unwrap_or(0.0)
                {
                    block.shield_efficiency = Some(efficiency);
                }
            }
        }
    }
}
