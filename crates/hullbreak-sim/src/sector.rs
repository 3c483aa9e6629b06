//! The shared world index: registry, block grid and block back references,
//! kept in step with each other.

use std::collections::BTreeSet;
use std::sync::Arc;

use glam::DVec2;

use hullbreak_core::blocks::BlockType;
use hullbreak_core::enums::Faction;
use hullbreak_core::types::{GridCoord, ObjectId, Rect, Transform};
use hullbreak_core::{Error, Result};

use crate::block_index::{BlockHandle, BlockRef, BlockToObjectIndex};
use crate::composite::{BlockInstance, CompositeBlockObject};
use crate::grid::Grid;
use crate::registry::CompositeBlockObjectRegistry;
use crate::ship::ShipSystems;

/// Every mutation that adds, removes or moves blocks goes through here so the
/// grid and the block index never hold stale entries.
#[derive(Debug, Clone, Default)]
pub struct Sector {
    grid: Grid,
    index: BlockToObjectIndex,
    registry: CompositeBlockObjectRegistry,
}

impl Sector {
    pub fn new(cell_size: f64) -> Self {
        Self {
            grid: Grid::new(cell_size),
            index: BlockToObjectIndex::new(),
            registry: CompositeBlockObjectRegistry::new(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn index(&self) -> &BlockToObjectIndex {
        &self.index
    }

    pub fn registry(&self) -> &CompositeBlockObjectRegistry {
        &self.registry
    }

    pub fn get(&self, id: ObjectId) -> Option<&CompositeBlockObject> {
        self.registry.get(id)
    }

    /// Mutable access for transform and subsystem updates. Call
    /// [`Sector::sync_object`] after moving the object.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut CompositeBlockObject> {
        self.registry.get_mut(id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.registry.contains(id)
    }

    pub fn create_ship(&mut self, faction: Faction, transform: Transform, systems: ShipSystems) -> ObjectId {
        let id = self.registry.allocate_id();
        self.registry
            .add(CompositeBlockObject::ship(id, faction, transform, systems))
    }

    pub fn create_asteroid(&mut self, transform: Transform) -> ObjectId {
        let id = self.registry.allocate_id();
        self.registry.add(CompositeBlockObject::asteroid(id, transform))
    }

    /// Place a full-health block on an object and index it.
    pub fn place_block(
        &mut self,
        id: ObjectId,
        coord: GridCoord,
        block_type: Arc<BlockType>,
        rotation: f64,
    ) -> Result<BlockHandle> {
        let object = self
            .registry
            .get_mut(id)
            .ok_or_else(|| Error::Config(format!("no object {id} to place a block on")))?;
        if object.has_block(coord) {
            return Err(Error::DuplicateCoordinate {
                x: coord.x,
                y: coord.y,
            });
        }
        let handle = self.index.register_block(id, coord);
        let position = object.block_world_position(coord);
        let block = BlockInstance {
            handle,
            hp: block_type.armor,
            block_type,
            coord,
            rotation,
            owner: id,
            faction: object.faction,
            shield_efficiency: None,
        };
        object.insert_block(block)?;
        self.grid.insert(handle, position);
        Ok(handle)
    }

    /// Detach one block and drop its index entries.
    pub fn remove_block(&mut self, id: ObjectId, coord: GridCoord) -> Option<BlockInstance> {
        let block = self.registry.get_mut(id)?.remove_block(coord)?;
        self.grid.remove(block.handle);
        self.index.unregister_block(block.handle);
        Some(block)
    }

    /// Remove an object and every index entry of its blocks.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<CompositeBlockObject> {
        let mut object = self.registry.remove(id)?;
        for block in object.blocks() {
            self.grid.remove(block.handle);
            self.index.unregister_block(block.handle);
        }
        object.mark_destroyed();
        Some(object)
    }

    /// Re-bucket an object's blocks after its transform changed.
    pub fn sync_object(&mut self, id: ObjectId) {
        let Some(object) = self.registry.get(id) else {
            return;
        };
        for block in object.blocks() {
            self.grid
                .update(block.handle, object.block_world_position(block.coord));
        }
    }

    pub fn resolve(&self, handle: BlockHandle) -> Option<(&CompositeBlockObject, &BlockInstance)> {
        let BlockRef { object, coord } = self.index.get(handle)?;
        let object = self.registry.get(object)?;
        let block = object.block_at(coord)?;
        Some((object, block))
    }

    /// Distinct objects with a block in any grid cell touching `rect`, in id order.
    pub fn objects_in_rect(&self, rect: &Rect) -> Vec<ObjectId> {
        let owners: BTreeSet<ObjectId> = self
            .grid
            .blocks_in_rect(rect)
            .into_iter()
            .filter_map(|h| self.index.get_object(h))
            .collect();
        owners.into_iter().collect()
    }

    /// Blocks in the cells around `position`, resolved to their owners.
    pub fn blocks_near(&self, position: DVec2) -> Vec<BlockRef> {
        self.grid
            .blocks_near(position)
            .into_iter()
            .filter_map(|h| self.index.get(h))
            .collect()
    }

    pub fn blocks_along_ray(&self, start: DVec2, end: DVec2) -> Vec<BlockRef> {
        self.grid
            .blocks_along_ray(start, end)
            .into_iter()
            .filter_map(|h| self.index.get(h))
            .collect()
    }

    pub fn ships(&self) -> impl Iterator<Item = &CompositeBlockObject> {
        self.registry.ships()
    }

    pub fn objects(&self) -> impl Iterator<Item = &CompositeBlockObject> {
        self.registry.iter()
    }

    pub fn ids(&self) -> Vec<ObjectId> {
        self.registry.ids()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn clear(&mut self) {
        self.grid.clear();
        self.index.clear();
        self.registry.clear();
    }

    /// True when the registry, grid and index agree block for block.
    #[cfg(test)]
    pub fn indices_consistent(&self) -> bool {
        let mut total = 0;
        for object in self.registry.iter() {
            for block in object.blocks() {
                total += 1;
                let expected = BlockRef {
                    object: object.id,
                    coord: block.coord,
                };
                if self.index.get(block.handle) != Some(expected) || !self.grid.contains(block.handle) {
                    return false;
                }
            }
        }
        total == self.index.len() && total == self.grid.len()
    }
}
