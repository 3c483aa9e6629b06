//! A gravity well that drags nearby ships toward its center.

use glam::DVec2;
use hecs::Entity;

use hullbreak_core::components::HazardKind;
use hullbreak_core::constants::{
    BLACK_HOLE_PULL_RADIUS, BLACK_HOLE_PULL_STRENGTH, INCIDENT_TIMED_LIFETIME_SECS,
};
use hullbreak_core::types::ObjectId;

use super::{despawn_hazard, spawn_hazard, IncidentScript, IncidentSetup};
use crate::context::SimContext;

#[derive(Debug)]
pub struct BlackHole {
    id: String,
    center: DVec2,
    radius: f64,
    elapsed: f64,
    lifetime: f64,
    hazard: Option<Entity>,
}

impl BlackHole {
    pub fn new(setup: IncidentSetup) -> Self {
        Self {
            center: setup.position(),
            radius: setup.options.radius.unwrap_or(BLACK_HOLE_PULL_RADIUS),
            id: setup.id,
            elapsed: 0.0,
            lifetime: INCIDENT_TIMED_LIFETIME_SECS,
            hazard: None,
        }
    }

    /// Velocity change for a ship at `position` over `dt`.
    pub fn pull(&self, position: DVec2, dt: f64) -> DVec2 {
        let offset = self.center - position;
        let dist = offset.length();
        if dist >= self.radius || dist < f64::EPSILON {
            return DVec2::ZERO;
        }
        offset / dist * BLACK_HOLE_PULL_STRENGTH * (1.0 - dist / self.radius) * dt
    }
}

impl IncidentScript for BlackHole {
    fn on_trigger(&mut self, ctx: &mut SimContext) {
        self.hazard = Some(spawn_hazard(
            ctx.world,
            &self.id,
            HazardKind::BlackHole,
            self.center,
            self.radius,
        ));
        log::info!(
            "black hole opened at ({:.0}, {:.0})",
            self.center.x,
            self.center.y
        );
    }

    fn update(&mut self, dt: f64, ctx: &mut SimContext) {
        self.elapsed += dt;
        let pulled: Vec<(ObjectId, DVec2)> = ctx
            .sector
            .ships()
            .map(|s| (s.id, self.pull(s.transform.position, dt)))
            .filter(|(_, dv)| *dv != DVec2::ZERO)
            .collect();
        for (id, dv) in pulled {
            if let Some(ship) = ctx.sector.get_mut(id) {
                ship.transform.velocity += dv;
            }
        }
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.lifetime
    }

    fn destroy(&mut self, ctx: &mut SimContext) {
        despawn_hazard(ctx.world, &mut self.hazard);
    }
}
