//! Repairs the blocks of player-side ships parked near it.

use glam::DVec2;
use hecs::Entity;

use hullbreak_core::components::HazardKind;
use hullbreak_core::constants::{
    HEALING_BEACON_RADIUS, HEALING_BEACON_RATE, INCIDENT_TIMED_LIFETIME_SECS,
};
use hullbreak_core::enums::Faction;
use hullbreak_core::types::ObjectId;

use super::{despawn_hazard, spawn_hazard, IncidentScript, IncidentSetup};
use crate::context::SimContext;

#[derive(Debug)]
pub struct HealingBeacon {
    id: String,
    center: DVec2,
    radius: f64,
    elapsed: f64,
    hazard: Option<Entity>,
}

impl HealingBeacon {
    pub fn new(setup: IncidentSetup) -> Self {
        Self {
            center: setup.position(),
            radius: setup.options.radius.unwrap_or(HEALING_BEACON_RADIUS),
            id: setup.id,
            elapsed: 0.0,
            hazard: None,
        }
    }
}

impl IncidentScript for HealingBeacon {
    fn on_trigger(&mut self, ctx: &mut SimContext) {
        self.hazard = Some(spawn_hazard(
            ctx.world,
            &self.id,
            HazardKind::HealingBeacon,
            self.center,
            self.radius,
        ));
    }

    fn update(&mut self, dt: f64, ctx: &mut SimContext) {
        self.elapsed += dt;
        let in_range: Vec<ObjectId> = ctx
            .sector
            .ships()
            .filter(|s| s.faction == Faction::Player)
            .filter(|s| s.transform.position.distance(self.center) <= self.radius)
            .map(|s| s.id)
            .collect();
        let heal = HEALING_BEACON_RATE * dt;
        for id in in_range {
            let Some(ship) = ctx.sector.get_mut(id) else {
                continue;
            };
            for block in ship.blocks_mut() {
                block.hp = (block.hp + heal).min(block.max_hp());
            }
        }
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= INCIDENT_TIMED_LIFETIME_SECS
    }

    fn destroy(&mut self, ctx: &mut SimContext) {
        despawn_hazard(ctx.world, &mut self.hazard);
    }
}
