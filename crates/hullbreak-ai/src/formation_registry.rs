//! Live formations keyed by id.

use std::collections::BTreeMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use hullbreak_core::types::ObjectId;

/// A spawned formation: one leader and its followers' slot offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formation {
    pub formation_id: String,
    pub leader_id: ObjectId,
    /// Follower ship and its offset in the leader's local frame.
    pub members: Vec<(ObjectId, DVec2)>,
}

impl Formation {
    pub fn contains(&self, ship: ObjectId) -> bool {
        self.leader_id == ship || self.members.iter().any(|(id, _)| *id == ship)
    }

    pub fn offset_of(&self, ship: ObjectId) -> Option<DVec2> {
        self.members
            .iter()
            .find(|(id, _)| *id == ship)
            .map(|(_, offset)| *offset)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormationRegistry {
    formations: BTreeMap<String, Formation>,
    next_serial: u64,
}

impl FormationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh id for a formation instance spawned from `template`.
    pub fn allocate_id(&mut self, template: &str) -> String {
        self.next_serial += 1;
        if template.is_empty() {
            format!("formation-{}", self.next_serial)
        } else {
            format!("{template}-{}", self.next_serial)
        }
    }

    /// Insert or replace a formation under its id.
    pub fn register(&mut self, formation: Formation) {
        log::debug!(
            "formation {} registered: leader {} with {} followers",
            formation.formation_id,
            formation.leader_id,
            formation.members.len()
        );
        self.formations
            .insert(formation.formation_id.clone(), formation);
    }

    pub fn get(&self, formation_id: &str) -> Option<&Formation> {
        self.formations.get(formation_id)
    }

    pub fn remove(&mut self, formation_id: &str) -> Option<Formation> {
        let removed = self.formations.remove(formation_id);
        if removed.is_some() {
            log::debug!("formation {formation_id} removed");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.formations.clear();
    }

    pub fn len(&self) -> usize {
        self.formations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Formation> {
        self.formations.values()
    }

    /// Formation the ship belongs to, as leader or follower.
    pub fn formation_for_ship(&self, ship: ObjectId) -> Option<&Formation> {
        self.formations.values().find(|f| f.contains(ship))
    }

    pub fn leader_for_ship(&self, ship: ObjectId) -> Option<ObjectId> {
        self.formation_for_ship(ship).map(|f| f.leader_id)
    }

    /// Slot offset of a follower; `None` for leaders and loose ships.
    pub fn offset_for_ship(&self, ship: ObjectId) -> Option<DVec2> {
        self.formation_for_ship(ship)
            .and_then(|f| f.offset_of(ship))
    }
}
