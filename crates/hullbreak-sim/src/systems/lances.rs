//! Explosive lance flight, sticking and detonation.

use glam::DVec2;
use hecs::{Entity, World};

use hullbreak_core::components::{Lance, LanceAnchor, Position, Velocity};
use hullbreak_core::constants::ORDNANCE_CONTACT_RADIUS;
use hullbreak_core::enums::DestructionCause;
use hullbreak_core::events::EventBus;
use hullbreak_core::types::{GridCoord, ObjectId};

use crate::combat::{apply_blast, apply_damage_to_block, DamageOutcome, LostBlock};
use crate::sector::Sector;

enum Step {
    Stick(Entity, LanceAnchor),
    Detonate(Entity, LanceAnchor),
}

/// Fly free lances, stick them into the first foreign block they reach, and
/// detonate stuck lances once their fuse runs out. A lance whose target is
/// gone, or that never hits anything before its flight time ends, is removed
/// without a blast.
pub fn run(
    world: &mut World,
    sector: &mut Sector,
    bus: &mut EventBus,
    dt: f64,
    lost: &mut Vec<LostBlock>,
    despawn_buffer: &mut Vec<Entity>,
) {
    despawn_buffer.clear();
    let mut steps = Vec::new();

    for (entity, (pos, vel, lance)) in world.query_mut::<(&mut Position, &mut Velocity, &mut Lance)>() {
        match lance.anchor {
            Some(anchor) => {
                let Some(object) = sector.get(anchor.object).filter(|o| o.has_block(anchor.coord)) else {
                    despawn_buffer.push(entity);
                    continue;
                };
                pos.0 = object.transform.position + anchor.offset;
                lance.fuse += dt;
                if lance.fuse >= lance.detonation_delay {
                    steps.push(Step::Detonate(entity, anchor));
                }
            }
            None => {
                pos.0 += vel.0 * dt;
                lance.ttl -= dt;
                if lance.ttl <= 0.0 {
                    despawn_buffer.push(entity);
                    continue;
                }
                let Some((object, coord)) = contact(sector, pos.0, lance) else {
                    continue;
                };
                let Some(target) = sector.get(object) else {
                    continue;
                };
                vel.0 = DVec2::ZERO;
                let anchor = LanceAnchor {
                    object,
                    coord,
                    offset: pos.0 - target.transform.position,
                };
                lance.anchor = Some(anchor);
                steps.push(Step::Stick(entity, anchor));
            }
        }
    }

    for step in steps {
        match step {
            Step::Stick(entity, anchor) => {
                let Ok(lance) = world.get::<&Lance>(entity).map(|l| *l) else {
                    continue;
                };
                let outcome = apply_damage_to_block(
                    sector,
                    bus,
                    anchor.object,
                    anchor.coord,
                    lance.fire_damage,
                    DestructionCause::ExplosiveLance,
                    lost,
                );
                // Nothing left to stick to: blow up on the spot.
                if matches!(outcome, DamageOutcome::BlockDestroyed | DamageOutcome::EntityDestroyed) {
                    detonate(sector, bus, &lance, anchor, lost);
                    despawn_buffer.push(entity);
                }
            }
            Step::Detonate(entity, anchor) => {
                if let Ok(lance) = world.get::<&Lance>(entity).map(|l| *l) {
                    detonate(sector, bus, &lance, anchor, lost);
                }
                despawn_buffer.push(entity);
            }
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}

fn contact(sector: &Sector, position: DVec2, lance: &Lance) -> Option<(ObjectId, GridCoord)> {
    sector
        .blocks_near(position)
        .into_iter()
        .filter(|b| b.object != lance.owner)
        .filter_map(|b| {
            let object = sector.get(b.object)?;
            let dist = object.block_world_position(b.coord).distance(position);
            (dist < ORDNANCE_CONTACT_RADIUS).then_some((b, dist))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(b, _)| (b.object, b.coord))
}

fn detonate(sector: &mut Sector, bus: &mut EventBus, lance: &Lance, anchor: LanceAnchor, lost: &mut Vec<LostBlock>) {
    let touched = apply_blast(
        sector,
        bus,
        anchor.object,
        anchor.coord,
        lance.explosion_radius,
        lance.explosion_damage,
        DestructionCause::ExplosiveLance,
        lost,
    );
    log::debug!("lance from {} detonated on {}, {touched} blocks hit", lance.owner, anchor.object);
}
