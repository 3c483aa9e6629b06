//! Owner of every live composite object.

use std::collections::BTreeMap;

use hullbreak_core::types::ObjectId;

use crate::composite::CompositeBlockObject;

/// Live composite objects keyed by id, iterated in id order.
#[derive(Debug, Clone, Default)]
pub struct CompositeBlockObjectRegistry {
    objects: BTreeMap<ObjectId, CompositeBlockObject>,
    next_id: u32,
}

impl CompositeBlockObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids are never reused within one registry.
    pub fn allocate_id(&mut self) -> ObjectId {
        self.next_id += 1;
        ObjectId(self.next_id)
    }

    pub fn add(&mut self, object: CompositeBlockObject) -> ObjectId {
        let id = object.id;
        self.objects.insert(id, object);
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<CompositeBlockObject> {
        self.objects.remove(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&CompositeBlockObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut CompositeBlockObject> {
        self.objects.get_mut(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompositeBlockObject> {
        self.objects.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut CompositeBlockObject> {
        self.objects.values_mut()
    }

    pub fn ids(&self) -> Vec<ObjectId> {
        self.objects.keys().copied().collect()
    }

    pub fn ships(&self) -> impl Iterator<Item = &CompositeBlockObject> {
        self.objects.values().filter(|o| o.is_ship())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }
}
