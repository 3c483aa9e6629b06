//! Block-to-owner back references.
//!
//! Blocks are addressed by generational handles into a slot array. Each live
//! slot records the owning object and the block's slot on that object, so a
//! grid query can be resolved to a concrete block without scanning objects.

use serde::{Deserialize, Serialize};

use hullbreak_core::types::{GridCoord, ObjectId};

/// Stable identity of a placed block.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BlockHandle {
    pub index: u32,
    pub generation: u32,
}

/// Where a registered block lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    pub object: ObjectId,
    pub coord: GridCoord,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    owner: Option<BlockRef>,
}

#[derive(Debug, Clone, Default)]
pub struct BlockToObjectIndex {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl BlockToObjectIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a handle for a block owned by `object` at `coord`.
    pub fn register_block(&mut self, object: ObjectId, coord: GridCoord) -> BlockHandle {
        let owner = Some(BlockRef { object, coord });
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.owner = owner;
            return BlockHandle {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            owner,
        });
        BlockHandle {
            index: (self.slots.len() - 1) as u32,
            generation: 0,
        }
    }

    /// Drop the entry for `handle`. The handle is dead afterwards even if its
    /// slot is reused. Returns the former owner.
    pub fn unregister_block(&mut self, handle: BlockHandle) -> Option<BlockRef> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let owner = slot.owner.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.live -= 1;
        Some(owner)
    }

    pub fn get(&self, handle: BlockHandle) -> Option<BlockRef> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.owner)
    }

    pub fn get_object(&self, handle: BlockHandle) -> Option<ObjectId> {
        self.get(handle).map(|r| r.object)
    }

    pub fn contains(&self, handle: BlockHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Number of registered blocks.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Unregister everything. Slots are kept so handles issued before the
    /// clear never resolve again, even once their slot is reused.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            if slot.owner.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
        }
        self.free = (0..self.slots.len() as u32).rev().collect();
        self.live = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_handle_after_reuse() {
        let mut index = BlockToObjectIndex::new();
        let a = index.register_block(ObjectId(1), GridCoord::ORIGIN);
        assert_eq!(index.unregister_block(a).map(|r| r.object), Some(ObjectId(1)));
        let b = index.register_block(ObjectId(2), GridCoord::new(1, 0));
        assert_eq!(a.index, b.index);
        assert_eq!(index.get_object(a), None);
        assert_eq!(index.get_object(b), Some(ObjectId(2)));
        assert!(index.unregister_block(a).is_none());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_clear_keeps_old_handles_dead() {
        let mut index = BlockToObjectIndex::new();
        let a = index.register_block(ObjectId(1), GridCoord::ORIGIN);
        let b = index.register_block(ObjectId(1), GridCoord::new(0, 1));
        index.clear();
        assert!(index.is_empty());
        assert!(!index.contains(a));
        assert!(!index.contains(b));

        let c = index.register_block(ObjectId(2), GridCoord::ORIGIN);
        let d = index.register_block(ObjectId(2), GridCoord::new(1, 0));
        assert_eq!(c.index, a.index);
        assert_eq!(d.index, b.index);
        assert_eq!(index.get_object(a), None);
        assert_eq!(index.get_object(b), None);
        assert_eq!(index.get_object(c), Some(ObjectId(2)));
        assert!(index.unregister_block(a).is_none());
        assert_eq!(index.len(), 2);
    }
}
