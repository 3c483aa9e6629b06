//! Bullet flight, expiry and block hits.

use hecs::{Entity, World};

use hullbreak_core::components::{Lifetime, Position, Projectile, Velocity};
use hullbreak_core::constants::{BLOCK_SIZE, PROJECTILE_HIT_RADIUS};
use hullbreak_core::enums::DestructionCause;
use hullbreak_core::events::EventBus;
use hullbreak_core::types::{GridCoord, ObjectId};

use crate::combat::{apply_damage_to_block, DamageOutcome, LostBlock};
use crate::sector::Sector;

struct Hit {
    entity: Entity,
    object: ObjectId,
    coord: GridCoord,
    damage: f64,
}

/// Move projectiles, expire old ones, and resolve hits. A projectile never
/// hits its own ship and is spent on the first block it damages.
pub fn run(
    world: &mut World,
    sector: &mut Sector,
    bus: &mut EventBus,
    dt: f64,
    lost: &mut Vec<LostBlock>,
    despawn_buffer: &mut Vec<Entity>,
) {
    despawn_buffer.clear();

    for (entity, (pos, vel, life, _)) in
        world.query_mut::<(&mut Position, &Velocity, &mut Lifetime, &Projectile)>()
    {
        pos.0 += vel.0 * dt;
        life.remaining -= dt;
        if life.remaining <= 0.0 {
            despawn_buffer.push(entity);
        }
    }

    let reach = PROJECTILE_HIT_RADIUS + BLOCK_SIZE * 0.5;
    let mut hits = Vec::new();
    for (entity, (pos, projectile)) in world.query::<(&Position, &Projectile)>().iter() {
        if despawn_buffer.contains(&entity) {
            continue;
        }
        let nearest = sector
            .blocks_near(pos.0)
            .into_iter()
            .filter(|b| b.object != projectile.owner)
            .filter_map(|b| {
                let object = sector.get(b.object)?;
                let dist = object.block_world_position(b.coord).distance(pos.0);
                (dist < reach).then_some((b, dist))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((block, _)) = nearest {
            hits.push(Hit {
                entity,
                object: block.object,
                coord: block.coord,
                damage: projectile.damage,
            });
        }
    }

    for hit in hits {
        let outcome = apply_damage_to_block(
            sector,
            bus,
            hit.object,
            hit.coord,
            hit.damage,
            DestructionCause::Projectile,
            lost,
        );
        if outcome != DamageOutcome::Missed {
            despawn_buffer.push(hit.entity);
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
