//! Bullet weapons driven by the firing plan's turret entries.
//!
//! In synced mode every ready turret fires at once. In sequence mode the
//! turrets of one block type take turns, so a group of `n` turrets fires
//! every `cooldown / n` seconds instead of in bursts.

use std::collections::BTreeMap;

use rand::{Rng, RngCore};

use hullbreak_core::affixes::HasAffixes;
use hullbreak_core::constants::*;
use hullbreak_core::enums::FiringMode;
use hullbreak_core::events::{GameEvent, SoundRequest};
use hullbreak_core::intent::WeaponIntent;
use hullbreak_core::types::GridCoord;

use super::{ProjectileSpawn, WeaponBackend, WeaponEffects};
use crate::composite::CompositeBlockObject;
use crate::projectiles::turret_palette;
use crate::ship::FiringPlan;

const FIRE_SOUND: &str = "turret_00.wav";
const FIRE_SOUND_MAX_SIMULTANEOUS: u32 = 7;

/// Rotation through one group of same-type turrets.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SequenceState {
    next: usize,
    /// Seconds since the group last fired.
    since_fired: f64,
}

#[derive(Debug, Default)]
pub struct TurretBackend {
    /// Updates since the last fire sound.
    sound_timer: u32,
    was_firing: bool,
    sequences: BTreeMap<String, SequenceState>,
}

impl TurretBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A turret slot as seen by this tick's dispatch.
struct Slot {
    plan_index: usize,
    coord: GridCoord,
    block_id: String,
}

fn is_ready(plan: &FiringPlan, slot: &Slot, fire_rate_multi: f64) -> bool {
    plan.entries()
        .get(slot.plan_index)
        .is_some_and(|e| e.time_since_last_shot >= e.fire_cooldown / fire_rate_multi)
}

impl WeaponBackend for TurretBackend {
    fn update(
        &mut self,
        dt: f64,
        ship: &mut CompositeBlockObject,
        intent: &WeaponIntent,
        rng: &mut dyn RngCore,
        fx: &mut WeaponEffects,
    ) {
        self.sound_timer += 1;

        let Some(systems) = ship.systems() else {
            return;
        };
        let fire_rate_multi = systems.affixes().fire_rate().max(f64::EPSILON);
        let slots: Vec<Slot> = systems
            .firing_plan
            .turret_indices()
            .into_iter()
            .map(|i| {
                let entry = &systems.firing_plan.entries()[i];
                Slot {
                    plan_index: i,
                    coord: entry.coord,
                    block_id: entry.block_id.clone(),
                }
            })
            .filter(|s| ship.has_block(s.coord))
            .collect();
        if slots.is_empty() {
            return;
        }

        let Some(systems) = ship.systems_mut() else {
            return;
        };
        let plan = &mut systems.firing_plan;

        // Clocks run whether or not the trigger is held.
        for slot in &slots {
            if let Some(entry) = plan.get_mut(slot.plan_index) {
                entry.time_since_last_shot += dt;
            }
        }
        let resumed = intent.fire_primary && !self.was_firing;
        self.was_firing = intent.fire_primary;
        if !intent.fire_primary {
            return;
        }

        let mut fired: Vec<usize> = Vec::new();
        match intent.firing_mode {
            FiringMode::Synced => {
                for (n, slot) in slots.iter().enumerate().rev() {
                    if is_ready(plan, slot, fire_rate_multi) {
                        fired.push(n);
                    }
                }
            }
            FiringMode::Sequence => {
                let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
                for (n, slot) in slots.iter().enumerate() {
                    groups.entry(slot.block_id.as_str()).or_default().push(n);
                }
                for (block_id, members) in groups {
                    let Some(first) = plan.entries().get(slots[members[0]].plan_index) else {
                        continue;
                    };
                    let interval = first.fire_cooldown / fire_rate_multi / members.len() as f64;
                    let state = self
                        .sequences
                        .entry(block_id.to_string())
                        .or_insert(SequenceState {
                            next: 0,
                            since_fired: interval,
                        });

                    if resumed {
                        let first_ready = members
                            .iter()
                            .position(|&n| is_ready(plan, &slots[n], fire_rate_multi));
                        if let Some(pos) = first_ready {
                            fired.push(members[pos]);
                            state.next = (pos + 1) % members.len();
                            state.since_fired = 0.0;
                            continue;
                        }
                    }

                    state.since_fired += dt;
                    if state.since_fired < interval {
                        continue;
                    }
                    let n = members[state.next % members.len()];
                    if is_ready(plan, &slots[n], fire_rate_multi) {
                        fired.push(n);
                        state.next = (state.next + 1) % members.len();
                        state.since_fired = 0.0;
                    }
                }
            }
        }

        for &n in &fired {
            if let Some(entry) = plan.get_mut(slots[n].plan_index) {
                entry.time_since_last_shot = 0.0;
            }
        }

        for &n in &fired {
            let coord = slots[n].coord;
            let Some(block) = ship.block_at(coord) else {
                continue;
            };
            let Some(stats) = block.block_type.fire_stats() else {
                continue;
            };
            let origin = ship.transform.block_world_position(coord);
            fx.projectiles.push(ProjectileSpawn {
                owner: ship.id,
                origin,
                aim_at: intent.aim_at,
                damage: stats.fire_damage,
                speed: stats.projectile_speed.unwrap_or(DEFAULT_PROJECTILE_SPEED),
                lifetime: stats.lifetime.unwrap_or(DEFAULT_PROJECTILE_LIFETIME),
                accuracy: stats.accuracy.unwrap_or(DEFAULT_PROJECTILE_ACCURACY),
                palette: turret_palette(&block.block_type.id),
            });
            fx.events.push(GameEvent::ProjectileFired {
                owner: ship.id,
                origin,
            });
        }

        if !fired.is_empty() && self.sound_timer > TURRET_SOUND_FRAME_INTERVAL {
            self.sound_timer = 0;
            fx.sounds.push(
                SoundRequest::sfx(FIRE_SOUND)
                    .with_pitch(rng.gen_range(0.7..1.4))
                    .with_max_simultaneous(FIRE_SOUND_MAX_SIMULTANEOUS),
            );
        }
    }
}
