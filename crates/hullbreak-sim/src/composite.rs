//! Composite block objects: ships, stations and asteroids built from blocks
//! that share one rigid transform.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use glam::DVec2;

use hullbreak_core::affixes::HasAffixes;
use hullbreak_core::blocks::BlockType;
use hullbreak_core::constants::*;
use hullbreak_core::enums::{Faction, ObjectKind};
use hullbreak_core::types::{GridCoord, ObjectId, Transform};
use hullbreak_core::{Error, Result};

use crate::block_index::BlockHandle;
use crate::ship::ShipSystems;

/// One placed block.
#[derive(Debug, Clone)]
pub struct BlockInstance {
    pub handle: BlockHandle,
    pub block_type: Arc<BlockType>,
    pub hp: f64,
    pub coord: GridCoord,
    /// Degrees, relative to the owning object.
    pub rotation: f64,
    pub owner: ObjectId,
    pub faction: Faction,
    /// Efficiency of the strongest shield emitter covering this block.
    pub shield_efficiency: Option<f64>,
}

impl BlockInstance {
    pub fn is_covered(&self) -> bool {
        self.shield_efficiency.is_some_and(|e| e > 0.0)
    }

    pub fn max_hp(&self) -> f64 {
        self.block_type.armor
    }
}

/// What kind of entity a composite object is, with its kind-specific state.
#[derive(Debug, Clone)]
pub enum EntityKind {
    Ship(Box<ShipSystems>),
    Asteroid,
}

#[derive(Debug, Clone)]
pub struct CompositeBlockObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub faction: Faction,
    pub transform: Transform,
    pub entity: EntityKind,
    blocks: BTreeMap<GridCoord, BlockInstance>,
    destroyed: bool,
}

impl CompositeBlockObject {
    pub fn ship(id: ObjectId, faction: Faction, transform: Transform, systems: ShipSystems) -> Self {
        let kind = if systems.behavior == hullbreak_core::enums::BehaviorKind::Siege {
            ObjectKind::Station
        } else {
            ObjectKind::Ship
        };
        Self {
            id,
            kind,
            faction,
            transform,
            entity: EntityKind::Ship(Box::new(systems)),
            blocks: BTreeMap::new(),
            destroyed: false,
        }
    }

    pub fn asteroid(id: ObjectId, transform: Transform) -> Self {
        Self {
            id,
            kind: ObjectKind::Asteroid,
            faction: Faction::Neutral,
            transform,
            entity: EntityKind::Asteroid,
            blocks: BTreeMap::new(),
            destroyed: false,
        }
    }

    pub fn is_ship(&self) -> bool {
        matches!(self.entity, EntityKind::Ship(_))
    }

    pub fn systems(&self) -> Option<&ShipSystems> {
        match &self.entity {
            EntityKind::Ship(s) => Some(&**s),
            EntityKind::Asteroid => None,
        }
    }

    pub fn systems_mut(&mut self) -> Option<&mut ShipSystems> {
        match &mut self.entity {
            EntityKind::Ship(s) => Some(&mut **s),
            EntityKind::Asteroid => None,
        }
    }

    /// The affix capability, for entity kinds that have one.
    pub fn affixed(&self) -> Option<&dyn HasAffixes> {
        self.systems().map(|s| s as &dyn HasAffixes)
    }

    pub fn affixed_mut(&mut self) -> Option<&mut dyn HasAffixes> {
        self.systems_mut().map(|s| s as &mut dyn HasAffixes)
    }

    /// Stations hold their position when something rams them.
    pub fn is_immovable(&self) -> bool {
        self.kind == ObjectKind::Station
    }

    pub fn is_player(&self) -> bool {
        self.systems().is_some_and(|s| s.is_player)
    }

    pub fn is_invulnerable(&self) -> bool {
        self.systems().is_some_and(|s| s.affixes.is_invulnerable())
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub(crate) fn mark_destroyed(&mut self) {
        self.destroyed = true;
    }

    /// Add a block at a free slot. The caller registers it in the indices.
    pub(crate) fn insert_block(&mut self, block: BlockInstance) -> Result<()> {
        let coord = block.coord;
        if self.blocks.contains_key(&coord) {
            return Err(Error::DuplicateCoordinate {
                x: coord.x,
                y: coord.y,
            });
        }
        let block_type = Arc::clone(&block.block_type);
        self.blocks.insert(coord, block);
        if let EntityKind::Ship(systems) = &mut self.entity {
            systems.on_block_added(coord, &block_type);
        }
        self.refresh_systems();
        Ok(())
    }

    /// Detach a block. The caller unregisters it from the indices.
    pub(crate) fn remove_block(&mut self, coord: GridCoord) -> Option<BlockInstance> {
        let removed = self.blocks.remove(&coord)?;
        if let EntityKind::Ship(systems) = &mut self.entity {
            systems.on_block_removed(coord);
        }
        self.refresh_systems();
        Some(removed)
    }

    fn refresh_systems(&mut self) {
        if let EntityKind::Ship(systems) = &mut self.entity {
            let systems: &mut ShipSystems = systems;
            systems.refresh_energy(&self.blocks);
            systems
                .shield
                .recalculate_coverage(&mut self.blocks, &systems.affixes);
        }
    }

    /// Re-run shield coverage, e.g. after affixes changed.
    pub fn recalculate_shield_coverage(&mut self) {
        self.refresh_systems();
    }

    pub fn block_at(&self, coord: GridCoord) -> Option<&BlockInstance> {
        self.blocks.get(&coord)
    }

    pub fn block_at_mut(&mut self, coord: GridCoord) -> Option<&mut BlockInstance> {
        self.blocks.get_mut(&coord)
    }

    pub fn has_block(&self, coord: GridCoord) -> bool {
        self.blocks.contains_key(&coord)
    }

    pub fn blocks(&self) -> impl Iterator<Item = &BlockInstance> {
        self.blocks.values()
    }

    pub fn blocks_mut(&mut self) -> impl Iterator<Item = &mut BlockInstance> {
        self.blocks.values_mut()
    }

    pub fn block_map(&self) -> &BTreeMap<GridCoord, BlockInstance> {
        &self.blocks
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn has_cockpit(&self) -> bool {
        self.blocks
            .get(&GridCoord::ORIGIN)
            .is_some_and(|b| b.block_type.is_cockpit())
    }

    pub fn mass(&self) -> f64 {
        self.blocks.values().map(|b| b.block_type.mass).sum()
    }

    pub fn block_world_position(&self, coord: GridCoord) -> DVec2 {
        self.transform.block_world_position(coord)
    }

    pub fn has_shield_blocks(&self) -> bool {
        self.systems().is_some_and(|s| s.shield.has_emitters())
    }

    pub fn shield_active(&self) -> bool {
        self.systems().is_some_and(|s| s.shield.is_active())
    }

    /// Engines as `(block rotation in degrees, thrust power)`.
    pub fn engines(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.blocks.values().filter_map(|b| {
            let behavior = b.block_type.behavior.as_ref()?;
            behavior
                .can_thrust
                .then(|| (b.rotation, behavior.thrust_power.unwrap_or(DEFAULT_ENGINE_THRUST)))
        })
    }

    pub fn total_engine_thrust(&self) -> f64 {
        self.engines().map(|(_, p)| p).sum()
    }

    pub fn total_turn_power(&self) -> f64 {
        self.blocks
            .values()
            .filter_map(|b| b.block_type.behavior.as_ref()?.turn_power)
            .sum()
    }

    /// Blocks not edge-connected to the cockpit. With no cockpit, every block.
    pub fn disconnected_blocks(&self) -> Vec<GridCoord> {
        if !self.blocks.contains_key(&GridCoord::ORIGIN) {
            return self.blocks.keys().copied().collect();
        }
        let mut reached = BTreeSet::from([GridCoord::ORIGIN]);
        let mut queue = VecDeque::from([GridCoord::ORIGIN]);
        while let Some(coord) = queue.pop_front() {
            for next in coord.neighbors() {
                if self.blocks.contains_key(&next) && reached.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        self.blocks
            .keys()
            .filter(|c| !reached.contains(c))
            .copied()
            .collect()
    }

    /// Rough bounding radius around the transform origin.
    pub fn radius(&self) -> f64 {
        self.blocks
            .keys()
            .map(|c| c.local_offset().length())
            .fold(0.0, f64::max)
            + BLOCK_SIZE
    }
}
