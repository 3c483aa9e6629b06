//! Viewport culling and the global enemy budget.

use glam::DVec2;

use hullbreak_core::constants::*;
use hullbreak_core::enums::DestructionCause;
use hullbreak_core::events::EventBus;
use hullbreak_core::types::{ObjectId, Rect};

use crate::destruction::destroy_entity;
use crate::sector::Sector;
use crate::ship_grid::ShipGrid;

/// Grid-backed visibility queries over composite objects. Pure reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeBlockObjectCullingSystem {
    pub nearby_margin: f64,
}

impl Default for CompositeBlockObjectCullingSystem {
    fn default() -> Self {
        Self {
            nearby_margin: NEARBY_MARGIN,
        }
    }
}

impl CompositeBlockObjectCullingSystem {
    pub fn new(nearby_margin: f64) -> Self {
        Self { nearby_margin }
    }

    /// Objects with a block in a grid cell touching the viewport, each once.
    pub fn visible_objects(&self, sector: &Sector, viewport: &Rect) -> Vec<ObjectId> {
        sector.objects_in_rect(viewport)
    }

    /// Objects near enough to the viewport to be worth simulating in detail.
    pub fn nearby_objects(&self, sector: &Sector, viewport: &Rect) -> Vec<ObjectId> {
        sector.objects_in_rect(&viewport.expand(self.nearby_margin))
    }

    /// Ships whose AI should run this tick. Every ship runs while the
    /// population is small; past that only ships near the viewport do.
    pub fn active_ai_ships(&self, sector: &Sector, viewport: &Rect) -> Vec<ObjectId> {
        let ships: Vec<ObjectId> = sector.ships().map(|s| s.id).collect();
        if ships.len() < ACTIVE_AI_ALL_THRESHOLD {
            return ships;
        }
        self.nearby_objects(sector, viewport)
            .into_iter()
            .filter(|id| sector.get(*id).is_some_and(|o| o.is_ship()))
            .collect()
    }
}

/// Removes far-away enemies and keeps the live enemy count under a cap.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalEnemyCulling {
    pub cull_radius: f64,
    pub fetch_padding: f64,
    pub enemy_cap: usize,
    since_last_check: f64,
}

impl Default for GlobalEnemyCulling {
    fn default() -> Self {
        Self::new(5000.0, 3000.0, 100)
    }
}

impl GlobalEnemyCulling {
    pub fn new(cull_radius: f64, fetch_padding: f64, enemy_cap: usize) -> Self {
        Self {
            cull_radius,
            fetch_padding,
            enemy_cap,
            since_last_check: 0.0,
        }
    }

    /// Returns the ships destroyed this call.
    pub fn update(
        &mut self,
        dt: f64,
        sector: &mut Sector,
        ship_grid: &ShipGrid,
        bus: &mut EventBus,
        player: Option<ObjectId>,
    ) -> Vec<ObjectId> {
        self.since_last_check += dt;
        if self.since_last_check < CULL_INTERVAL_SECS {
            return Vec::new();
        }
        self.since_last_check = 0.0;

        let Some((player_pos, player_faction)) = player
            .and_then(|id| sector.get(id))
            .map(|p| (p.transform.position, p.faction))
        else {
            return Vec::new();
        };

        let cullable = |sector: &Sector, id: ObjectId| -> Option<DVec2> {
            let ship = sector.get(id)?;
            let systems = ship.systems()?;
            (!systems.is_player && !systems.uncullable).then_some(ship.transform.position)
        };

        let mut culled = Vec::new();
        let fetch = self.cull_radius + self.fetch_padding;
        for id in ship_grid.ships_in_radius(player_pos, fetch, Some(player_faction)) {
            let Some(pos) = cullable(sector, id) else {
                continue;
            };
            if pos.distance_squared(player_pos) > self.cull_radius * self.cull_radius
                && destroy_entity(sector, bus, id, DestructionCause::Replaced)
            {
                culled.push(id);
            }
        }

        let mut remaining: Vec<(ObjectId, f64)> = ship_grid
            .all_ships(Some(player_faction))
            .into_iter()
            .filter_map(|id| Some((id, cullable(sector, id)?.distance_squared(player_pos))))
            .collect();
        if remaining.len() > self.enemy_cap {
            let surplus = remaining.len() - self.enemy_cap;
            remaining.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
            for (id, _) in remaining.into_iter().take(surplus) {
                if destroy_entity(sector, bus, id, DestructionCause::Replaced) {
                    culled.push(id);
                }
            }
        }

        if !culled.is_empty() {
            log::debug!("culled {} distant ships", culled.len());
        }
        culled
    }
}
