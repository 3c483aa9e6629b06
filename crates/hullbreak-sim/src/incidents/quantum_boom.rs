//! A ring of currency around a quantum attractor. Done once the attractor
//! is picked up.

use std::f64::consts::TAU;

use glam::DVec2;
use rand::Rng;

use hullbreak_core::constants::{QUANTUM_BOOM_PICKUPS, QUANTUM_BOOM_RADIUS};
use hullbreak_core::enums::PickupKind;
use hullbreak_core::events::GameEvent;

use super::{IncidentScript, IncidentSetup};
use crate::context::SimContext;
use crate::systems::pickups::spawn_pickup;

#[derive(Debug)]
pub struct QuantumBoom {
    id: String,
    center: DVec2,
    radius: f64,
    pickup_count: usize,
    collected: bool,
}

impl QuantumBoom {
    pub fn new(setup: IncidentSetup) -> Self {
        Self {
            center: setup.position(),
            radius: setup.options.radius.unwrap_or(QUANTUM_BOOM_RADIUS),
            pickup_count: setup.options.pickup_count.unwrap_or(QUANTUM_BOOM_PICKUPS),
            id: setup.id,
            collected: false,
        }
    }
}

impl IncidentScript for QuantumBoom {
    fn on_trigger(&mut self, ctx: &mut SimContext) {
        for i in 0..self.pickup_count {
            let theta = i as f64 / self.pickup_count as f64 * TAU;
            let position = self.center + DVec2::from_angle(theta) * self.radius;
            let amount = 10 + ctx.rng.gen_range(0..20);
            spawn_pickup(ctx.world, ctx.bus, PickupKind::Currency, position, amount, None);
        }
        spawn_pickup(
            ctx.world,
            ctx.bus,
            PickupKind::QuantumAttractor,
            self.center,
            1,
            None,
        );
        log::info!("{}: {} pickups around the attractor", self.id, self.pickup_count);
    }

    fn update(&mut self, _dt: f64, _ctx: &mut SimContext) {}

    fn is_complete(&self) -> bool {
        self.collected
    }

    // The pickups outlive the incident.
    fn destroy(&mut self, _ctx: &mut SimContext) {}

    fn on_event(&mut self, event: &GameEvent) {
        if let GameEvent::PickupCollected {
            kind: PickupKind::QuantumAttractor,
            ..
        } = event
        {
            self.collected = true;
        }
    }
}
