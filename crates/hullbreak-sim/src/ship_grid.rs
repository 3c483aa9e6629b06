//! Coarse per-faction bucket grid over ship positions.
//!
//! Used for target search and global culling, where block-level precision is
//! unnecessary. Query results are always sorted by ship id.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use glam::DVec2;

use hullbreak_core::constants::SHIP_GRID_CELL_SIZE;
use hullbreak_core::enums::Faction;
use hullbreak_core::types::ObjectId;

use crate::sector::Sector;

type Cell = (i32, i32);

#[derive(Debug, Clone, Copy, PartialEq)]
struct Tracked {
    cell: Cell,
    faction: Faction,
    position: DVec2,
}

#[derive(Debug, Clone)]
pub struct ShipGrid {
    cell_size: f64,
    buckets: HashMap<Faction, HashMap<Cell, BTreeSet<ObjectId>>>,
    ships: BTreeMap<ObjectId, Tracked>,
}

impl Default for ShipGrid {
    fn default() -> Self {
        Self::new(SHIP_GRID_CELL_SIZE)
    }
}

impl ShipGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            buckets: HashMap::new(),
            ships: BTreeMap::new(),
        }
    }

    fn cell_of(&self, p: DVec2) -> Cell {
        (
            (p.x / self.cell_size).floor() as i32,
            (p.y / self.cell_size).floor() as i32,
        )
    }

    /// Track a ship, moving it if it is already tracked.
    pub fn add(&mut self, id: ObjectId, faction: Faction, position: DVec2) {
        self.remove(id);
        let cell = self.cell_of(position);
        self.buckets
            .entry(faction)
            .or_default()
            .entry(cell)
            .or_default()
            .insert(id);
        self.ships.insert(
            id,
            Tracked {
                cell,
                faction,
                position,
            },
        );
    }

    pub fn remove(&mut self, id: ObjectId) -> bool {
        let Some(tracked) = self.ships.remove(&id) else {
            return false;
        };
        if let Some(cells) = self.buckets.get_mut(&tracked.faction) {
            if let Some(bucket) = cells.get_mut(&tracked.cell) {
                bucket.remove(&id);
                if bucket.is_empty() {
                    cells.remove(&tracked.cell);
                }
            }
        }
        true
    }

    /// Refresh a ship's position; re-buckets only on a cell change.
    pub fn update(&mut self, id: ObjectId, faction: Faction, position: DVec2) {
        let cell = self.cell_of(position);
        match self.ships.get_mut(&id) {
            Some(t) if t.cell == cell && t.faction == faction => t.position = position,
            _ => self.add(id, faction, position),
        }
    }

    /// Mirror the sector's ships: drop the gone, track the new, move the rest.
    pub fn sync(&mut self, sector: &Sector) {
        let gone: Vec<ObjectId> = self
            .ships
            .keys()
            .filter(|id| !sector.get(**id).is_some_and(|o| o.is_ship()))
            .copied()
            .collect();
        for id in gone {
            self.remove(id);
        }
        for ship in sector.ships() {
            self.update(ship.id, ship.faction, ship.transform.position);
        }
    }

    pub fn position(&self, id: ObjectId) -> Option<DVec2> {
        self.ships.get(&id).map(|t| t.position)
    }

    fn sources(&self, exclude: Option<Faction>) -> impl Iterator<Item = &HashMap<Cell, BTreeSet<ObjectId>>> {
        self.buckets
            .iter()
            .filter(move |(f, _)| Some(**f) != exclude)
            .map(|(_, cells)| cells)
    }

    /// Ships in every cell overlapping the box, optionally skipping one faction.
    pub fn ships_in_area(&self, min: DVec2, max: DVec2, exclude: Option<Faction>) -> Vec<ObjectId> {
        let (x0, y0) = self.cell_of(min);
        let (x1, y1) = self.cell_of(max);
        let mut found = BTreeSet::new();
        for cells in self.sources(exclude) {
            for cx in x0..=x1 {
                for cy in y0..=y1 {
                    if let Some(bucket) = cells.get(&(cx, cy)) {
                        found.extend(bucket.iter().copied());
                    }
                }
            }
        }
        found.into_iter().collect()
    }

    /// Ships within `radius` of `center`, optionally skipping one faction.
    pub fn ships_in_radius(&self, center: DVec2, radius: f64, exclude: Option<Faction>) -> Vec<ObjectId> {
        let r = DVec2::splat(radius);
        self.ships_in_area(center - r, center + r, exclude)
            .into_iter()
            .filter(|id| {
                self.ships
                    .get(id)
                    .is_some_and(|t| t.position.distance_squared(center) <= radius * radius)
            })
            .collect()
    }

    pub fn all_ships(&self, exclude: Option<Faction>) -> Vec<ObjectId> {
        self.ships
            .iter()
            .filter(|(_, t)| Some(t.faction) != exclude)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn ship_count(&self, exclude: Option<Faction>) -> usize {
        self.ships
            .values()
            .filter(|t| Some(t.faction) != exclude)
            .count()
    }

    pub fn len(&self) -> usize {
        self.ships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ships.is_empty()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.ships.clear();
    }
}
