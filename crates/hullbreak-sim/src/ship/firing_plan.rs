//! Per-ship list of weapon blocks and their cooldown clocks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use hullbreak_core::blocks::BlockType;
use hullbreak_core::enums::FireType;
use hullbreak_core::types::GridCoord;

/// Cooldown state of one weapon block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponFiringPlanEntry {
    pub coord: GridCoord,
    pub block_id: String,
    pub fire_type: FireType,
    /// Shots per second.
    pub fire_rate: f64,
    /// Seconds between shots.
    pub fire_cooldown: f64,
    pub time_since_last_shot: f64,
}

impl WeaponFiringPlanEntry {
    /// Entry for a firing block, or `None` if the type cannot fire.
    pub fn for_block(coord: GridCoord, block_type: &BlockType) -> Option<Self> {
        let fire = block_type.fire_stats()?;
        let fire_rate = if fire.fire_rate > 0.0 { fire.fire_rate } else { 1.0 };
        Some(Self {
            coord,
            block_id: block_type.id.clone(),
            fire_type: fire.fire_type,
            fire_rate,
            fire_cooldown: 1.0 / fire_rate,
            time_since_last_shot: 0.0,
        })
    }

    pub fn is_turret(&self) -> bool {
        self.block_id.starts_with("turret")
    }
}

/// Weapon entries kept in step with the ship's block layout.
#[derive(Debug, Clone, Default)]
pub struct FiringPlan {
    entries: Vec<WeaponFiringPlanEntry>,
    slots: HashMap<GridCoord, usize>,
}

impl FiringPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a newly placed block. Non-weapons are ignored.
    pub fn add_block(&mut self, coord: GridCoord, block_type: &BlockType) {
        let Some(entry) = WeaponFiringPlanEntry::for_block(coord, block_type) else {
            return;
        };
        if let Some(&i) = self.slots.get(&coord) {
            self.entries[i] = entry;
            return;
        }
        self.slots.insert(coord, self.entries.len());
        self.entries.push(entry);
    }

    pub fn remove_block(&mut self, coord: GridCoord) -> Option<WeaponFiringPlanEntry> {
        let i = self.slots.remove(&coord)?;
        let removed = self.entries.swap_remove(i);
        if let Some(moved) = self.entries.get(i) {
            self.slots.insert(moved.coord, i);
        }
        Some(removed)
    }

    /// Drop entries whose block no longer exists.
    pub fn validate(&mut self, mut exists: impl FnMut(GridCoord) -> bool) -> usize {
        let stale: Vec<GridCoord> = self
            .entries
            .iter()
            .map(|e| e.coord)
            .filter(|c| !exists(*c))
            .collect();
        for coord in &stale {
            self.remove_block(*coord);
        }
        stale.len()
    }

    pub fn entries(&self) -> &[WeaponFiringPlanEntry] {
        &self.entries
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut WeaponFiringPlanEntry> {
        self.entries.get_mut(index)
    }

    pub fn entry_at(&self, coord: GridCoord) -> Option<&WeaponFiringPlanEntry> {
        self.slots.get(&coord).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indices of turret entries, in plan order.
    pub fn turret_indices(&self) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_turret())
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of entries firing `fire_type`, in plan order.
    pub fn indices_of(&self, fire_type: FireType) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.fire_type == fire_type)
            .map(|(i, _)| i)
            .collect()
    }
}
