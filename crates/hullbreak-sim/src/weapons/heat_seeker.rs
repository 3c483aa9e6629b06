//! Heat-seeking missiles.
//!
//! The backend only runs the launch clocks. Target selection happens when the
//! engine applies the spawn request, since it needs the rest of the sector.
//! A launcher whose cooldown is up spends it even if nothing is in range.

use rand::{Rng, RngCore};

use hullbreak_core::affixes::HasAffixes;
use hullbreak_core::constants::*;
use hullbreak_core::enums::FireType;
use hullbreak_core::intent::WeaponIntent;

use super::{SeekerSpawn, WeaponBackend, WeaponEffects};
use crate::composite::CompositeBlockObject;

#[derive(Debug, Default)]
pub struct HeatSeekerBackend;

impl HeatSeekerBackend {
    pub fn new() -> Self {
        Self
    }
}

impl WeaponBackend for HeatSeekerBackend {
    fn update(
        &mut self,
        dt: f64,
        ship: &mut CompositeBlockObject,
        intent: &WeaponIntent,
        rng: &mut dyn RngCore,
        fx: &mut WeaponEffects,
    ) {
        let Some(systems) = ship.systems() else {
            return;
        };
        let fire_rate_multi = systems.affixes().fire_rate().max(f64::EPSILON);
        let indices = systems.firing_plan.indices_of(FireType::HeatSeeker);
        if indices.is_empty() {
            return;
        }

        let mut ready = Vec::new();
        if let Some(systems) = ship.systems_mut() {
            for i in indices {
                let Some(entry) = systems.firing_plan.get_mut(i) else {
                    continue;
                };
                entry.time_since_last_shot += dt;
                if intent.fire_primary && entry.time_since_last_shot >= entry.fire_cooldown / fire_rate_multi {
                    entry.time_since_last_shot = 0.0;
                    ready.push(entry.coord);
                }
            }
        }

        let forward = ship.transform.forward();
        for coord in ready {
            let Some(block) = ship.block_at(coord) else {
                continue;
            };
            let Some(stats) = block.block_type.fire_stats() else {
                continue;
            };
            let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            fx.seekers.push(SeekerSpawn {
                owner: ship.id,
                owner_faction: ship.faction,
                origin: ship.block_world_position(coord),
                forward,
                side,
                forward_fire: stats.seeker_forward_fire,
                fire_damage: stats.fire_damage,
                explosion_damage: stats.explosion_damage.unwrap_or(stats.fire_damage * 2.0),
                explosion_radius: stats.explosion_radius_blocks.unwrap_or(2),
                speed: stats.projectile_speed.unwrap_or(DEFAULT_SEEKER_SPEED),
                lifetime: stats.lifetime.unwrap_or(DEFAULT_SEEKER_LIFETIME),
                turning_power: stats.turning_power.unwrap_or(2.5),
                targeting_range: stats.targeting_range.unwrap_or(DEFAULT_SEEKER_RANGE),
            });
        }
    }
}
