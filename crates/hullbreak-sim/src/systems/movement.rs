//! Ship flight model and kinematic integration of composite objects.
//!
//! Ships turn and accelerate from their movement intent; everything else
//! drifts. After integration each object's blocks are re-bucketed in the grid.

use std::collections::BTreeMap;

use glam::DVec2;

use hullbreak_ai::steering::block_thrust_direction;
use hullbreak_core::affixes::HasAffixes;
use hullbreak_core::constants::*;
use hullbreak_core::intent::MovementIntent;
use hullbreak_core::types::{rotate, ObjectId, Transform};

use crate::composite::CompositeBlockObject;
use crate::sector::Sector;

/// Flight parameters derived from a ship's current blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightModel {
    pub total_thrust: f64,
    pub turn_power: f64,
    pub accel_scale: f64,
}

impl FlightModel {
    pub fn of(ship: &CompositeBlockObject) -> Self {
        let (thrust_multi, turn_multi) = ship
            .affixed()
            .map(|a| (a.affixes().thrust_power(), a.affixes().turn_power()))
            .unwrap_or((1.0, 1.0));
        let mass = ship.mass().max(1.0);
        Self {
            total_thrust: (BASE_THRUST + ship.total_engine_thrust()) * thrust_multi,
            turn_power: (1.0 + ship.total_turn_power()) * turn_multi,
            accel_scale: (BASE_MASS / mass).powf(MASS_SCALE_EXPONENT).min(1.0),
        }
    }

    pub fn angular_accel(&self) -> f64 {
        self.turn_power * 0.2 * self.accel_scale
    }

    pub fn max_angular_speed(&self) -> f64 {
        self.turn_power * 0.3
    }
}

/// Apply one tick of intent to a ship's transform.
pub fn apply_intent(ship: &mut CompositeBlockObject, intent: &MovementIntent, dt: f64) {
    let model = FlightModel::of(ship);
    let thrust_multi = ship
        .affixed()
        .map(|a| a.affixes().thrust_power())
        .unwrap_or(1.0);
    let engines: Vec<(f64, f64)> = ship.engines().collect();
    let t = &mut ship.transform;

    if intent.rotate_left {
        t.angular_velocity -= model.angular_accel() * dt;
    } else if intent.rotate_right {
        t.angular_velocity += model.angular_accel() * dt;
    } else {
        t.angular_velocity *= ANGULAR_FRICTION;
    }
    let max_spin = model.max_angular_speed();
    t.angular_velocity = t.angular_velocity.clamp(-max_spin, max_spin);

    if intent.thrust_forward {
        let mut push = t.forward() * FALLBACK_THRUST_POWER * thrust_multi;
        let mut push_power = FALLBACK_THRUST_POWER * thrust_multi;
        for (rotation_deg, power) in &engines {
            let power = power * thrust_multi;
            push += rotate(block_thrust_direction(*rotation_deg), t.rotation) * power;
            push_power += power;
        }

        let next = t.velocity + push * dt * model.accel_scale;
        let max_speed = push_power * THRUST_TO_SPEED;
        let speed = next.length();
        t.velocity = if speed <= max_speed {
            next
        } else {
            next * (max_speed / speed)
        };
    }

    if intent.brake {
        brake(t, model.total_thrust * dt * 1.2);
    }

    integrate(t, dt);
}

/// Slow down by `force` without ever reversing direction.
fn brake(t: &mut Transform, force: f64) {
    let speed = t.velocity.length();
    if speed <= 0.0 {
        return;
    }
    let next = t.velocity - t.velocity / speed * force;
    t.velocity = if next.dot(t.velocity) < 0.0 {
        DVec2::ZERO
    } else {
        next
    };
}

fn integrate(t: &mut Transform, dt: f64) {
    t.rotation += t.angular_velocity * dt;
    t.position += t.velocity * dt;
}

/// Move every object. Ships with an entry in `intents` fly it, other ships
/// coast under angular friction, and passive objects drift.
pub fn run(sector: &mut Sector, intents: &BTreeMap<ObjectId, MovementIntent>, dt: f64) {
    let coast = MovementIntent::default();
    for id in sector.ids() {
        let Some(object) = sector.get_mut(id) else {
            continue;
        };
        if object.is_ship() {
            apply_intent(object, intents.get(&id).unwrap_or(&coast), dt);
        } else {
            integrate(&mut object.transform, dt);
        }
        sector.sync_object(id);
    }
}
