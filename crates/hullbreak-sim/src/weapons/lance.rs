//! Explosive lances: slow-firing spikes that stick into a hull and blow up
//! after a short fuse.

use rand::RngCore;

use hullbreak_core::affixes::HasAffixes;
use hullbreak_core::constants::*;
use hullbreak_core::enums::FireType;
use hullbreak_core::events::{GameEvent, SoundRequest};
use hullbreak_core::intent::WeaponIntent;

use super::{LanceSpawn, WeaponBackend, WeaponEffects};
use crate::composite::CompositeBlockObject;
use crate::projectiles::lance_palette;

const FIRE_SOUND: &str = "lance_launch.wav";

#[derive(Debug, Default)]
pub struct ExplosiveLanceBackend;

impl ExplosiveLanceBackend {
    pub fn new() -> Self {
        Self
    }
}

impl WeaponBackend for ExplosiveLanceBackend {
    fn update(
        &mut self,
        dt: f64,
        ship: &mut CompositeBlockObject,
        intent: &WeaponIntent,
        _rng: &mut dyn RngCore,
        fx: &mut WeaponEffects,
    ) {
        let Some(systems) = ship.systems() else {
            return;
        };
        let fire_rate_multi = systems.affixes().fire_rate().max(f64::EPSILON);
        let indices = systems.firing_plan.indices_of(FireType::ExplosiveLance);
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

        for coord in &ready {
            let Some(block) = ship.block_at(*coord) else {
                continue;
            };
            let Some(stats) = block.block_type.fire_stats() else {
                continue;
            };
            let origin = ship.block_world_position(*coord);
            fx.lances.push(LanceSpawn {
                owner: ship.id,
                origin,
                aim_at: intent.aim_at,
                fire_damage: stats.fire_damage,
                explosion_damage: stats.explosion_damage.unwrap_or(stats.fire_damage),
                explosion_radius: stats.explosion_radius_blocks.unwrap_or(1),
                detonation_delay: stats.detonation_delay.unwrap_or(DEFAULT_LANCE_DETONATION_DELAY),
                speed: stats.projectile_speed.unwrap_or(DEFAULT_LANCE_SPEED),
                lifetime: stats.lifetime.unwrap_or(DEFAULT_LANCE_LIFETIME),
                accuracy: stats.accuracy.unwrap_or(DEFAULT_PROJECTILE_ACCURACY),
                palette: lance_palette(&block.block_type.id),
            });
            fx.events.push(GameEvent::ProjectileFired { owner: ship.id, origin });
        }
        if !ready.is_empty() {
            fx.sounds.push(SoundRequest::sfx(FIRE_SOUND));
        }
    }
}
