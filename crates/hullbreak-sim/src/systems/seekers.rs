//! Heat seeker launch, homing and impact.
//!
//! A seeker picks a random hostile in range when it launches and keeps
//! chasing it. It speeds up and turns harder as it ages. If its target dies
//! it switches to the nearest hostile with half its remaining life, and
//! fizzles when there is nobody left to chase.

use std::f64::consts::PI;

use glam::DVec2;
use hecs::{Entity, World};
use rand::RngCore;

use hullbreak_ai::targeting::{find_nearest_target, find_random_target, Seeker, TargetCandidate};
use hullbreak_core::components::{HeatSeeker, Position, Velocity};
use hullbreak_core::constants::*;
use hullbreak_core::enums::{DestructionCause, Faction};
use hullbreak_core::events::EventBus;
use hullbreak_core::types::{GridCoord, ObjectId};

use crate::combat::{apply_blast, apply_damage_to_block, LostBlock};
use crate::projectiles::spawn_seeker;
use crate::sector::Sector;
use crate::ship_grid::ShipGrid;
use crate::weapons::SeekerSpawn;

struct Impact {
    entity: Entity,
    object: ObjectId,
    coord: GridCoord,
    seeker: HeatSeeker,
}

fn candidates(
    sector: &Sector,
    ship_grid: &ShipGrid,
    center: DVec2,
    range: f64,
    faction: Faction,
) -> Vec<TargetCandidate> {
    ship_grid
        .ships_in_radius(center, range, Some(faction))
        .into_iter()
        .filter_map(|id| sector.get(id))
        .map(|s| TargetCandidate {
            id: s.id,
            faction: s.faction,
            position: s.transform.position,
            velocity: s.transform.velocity,
            invulnerable: s.is_invulnerable(),
        })
        .collect()
}

/// Launch a requested seeker at a random hostile within its range. Returns
/// `None`, launching nothing, when no hostile is in range.
pub fn launch(
    world: &mut World,
    sector: &Sector,
    ship_grid: &ShipGrid,
    spawn: &SeekerSpawn,
    rng: &mut dyn RngCore,
) -> Option<Entity> {
    let pool = candidates(sector, ship_grid, spawn.origin, spawn.targeting_range, spawn.owner_faction);
    let me = Seeker {
        id: spawn.owner,
        faction: spawn.owner_faction,
        position: spawn.origin,
    };
    let target = find_random_target(&me, spawn.targeting_range, &pool, rng)?;

    let direction = if spawn.forward_fire {
        target.position - spawn.origin
    } else {
        DVec2::new(-spawn.forward.y, spawn.forward.x) * spawn.side
    };
    let heading = direction.y.atan2(direction.x);
    Some(spawn_seeker(world, spawn, target.id, target.position, heading))
}

/// Wrap an angle into `[-PI, PI]`.
fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped < -PI {
        wrapped + 2.0 * PI
    } else {
        wrapped
    }
}

/// Steer, move and age seekers, then resolve impacts against their targets.
pub fn run(
    world: &mut World,
    sector: &mut Sector,
    ship_grid: &ShipGrid,
    bus: &mut EventBus,
    dt: f64,
    lost: &mut Vec<LostBlock>,
    despawn_buffer: &mut Vec<Entity>,
) {
    despawn_buffer.clear();
    let mut impacts = Vec::new();

    for (entity, (pos, vel, seeker)) in world.query_mut::<(&mut Position, &mut Velocity, &mut HeatSeeker)>() {
        seeker.age += dt;
        if seeker.age > seeker.ttl {
            despawn_buffer.push(entity);
            continue;
        }

        let alive = seeker.target.and_then(|t| sector.get(t)).is_some();
        if !alive {
            let pool = candidates(sector, ship_grid, pos.0, seeker.targeting_range, seeker.owner_faction);
            let me = Seeker {
                id: seeker.owner,
                faction: seeker.owner_faction,
                position: pos.0,
            };
            let Some(next) = find_nearest_target(&me, seeker.targeting_range, &pool) else {
                despawn_buffer.push(entity);
                continue;
            };
            seeker.target = Some(next.id);
            seeker.last_known_target = Some(next.position);
            seeker.ttl = seeker.age + (seeker.ttl - seeker.age) * 0.5;
            seeker.ticks_since_refresh = 0;
        }
        let Some(target_id) = seeker.target else {
            despawn_buffer.push(entity);
            continue;
        };

        seeker.ticks_since_refresh += 1;
        if seeker.ticks_since_refresh >= SEEKER_TARGET_REFRESH_TICKS || seeker.last_known_target.is_none() {
            seeker.ticks_since_refresh = 0;
            seeker.last_known_target = sector.get(target_id).map(|t| t.transform.position);
        }
        let Some(aim) = seeker.last_known_target else {
            despawn_buffer.push(entity);
            continue;
        };

        let progress = (seeker.age / seeker.ttl.max(f64::EPSILON)).clamp(0.0, 1.0);
        let speed = seeker.launch_speed * (1.0 + (SEEKER_SPEED_GROWTH - 1.0) * progress);
        let turning = seeker.turning_power
            * SEEKER_TURNING_COMPENSATION
            * (1.0 + (SEEKER_TURNING_GROWTH - 1.0) * progress);

        let heading = vel.0.y.atan2(vel.0.x);
        let to_target = aim - pos.0;
        let desired = to_target.y.atan2(to_target.x);
        let max_turn = turning * dt;
        let turn = wrap_angle(desired - heading).clamp(-max_turn, max_turn);
        let new_heading = heading + turn;
        vel.0 = DVec2::new(new_heading.cos(), new_heading.sin()) * speed;
        pos.0 += vel.0 * dt;

        let hit = sector
            .blocks_near(pos.0)
            .into_iter()
            .filter(|b| b.object == target_id)
            .filter_map(|b| {
                let object = sector.get(b.object)?;
                let dist = object.block_world_position(b.coord).distance(pos.0);
                (dist < ORDNANCE_CONTACT_RADIUS).then_some((b, dist))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((block, _)) = hit {
            impacts.push(Impact {
                entity,
                object: block.object,
                coord: block.coord,
                seeker: *seeker,
            });
        }
    }

    for impact in impacts {
        let Impact {
            entity,
            object,
            coord,
            seeker,
        } = impact;
        apply_damage_to_block(
            sector,
            bus,
            object,
            coord,
            seeker.fire_damage,
            DestructionCause::HeatSeeker,
            lost,
        );
        apply_blast(
            sector,
            bus,
            object,
            coord,
            seeker.explosion_radius,
            seeker.explosion_damage,
            DestructionCause::HeatSeeker,
            lost,
        );
        despawn_buffer.push(entity);
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
