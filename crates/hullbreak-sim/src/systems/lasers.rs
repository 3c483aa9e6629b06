//! Beam resolution for ships whose lasers fired this tick.

use hullbreak_core::constants::{LASER_BEAM_LENGTH, LASER_ENERGY_PER_BLOCK};
use hullbreak_core::enums::DestructionCause;
use hullbreak_core::events::EventBus;
use hullbreak_core::types::{rotate, GridCoord};

use crate::combat::{apply_damage_to_block, LostBlock};
use crate::sector::Sector;
use crate::weapons::LaserRequest;

struct Beam {
    coord: GridCoord,
    damage: f64,
    start: glam::DVec2,
    end: glam::DVec2,
}

/// Fire every queued laser. Each ship pays per laser block; a ship that
/// cannot pay fires nothing. A beam damages the first foreign block on its
/// path, scaled by `dt`.
pub fn run(
    sector: &mut Sector,
    bus: &mut EventBus,
    requests: &mut Vec<LaserRequest>,
    dt: f64,
    lost: &mut Vec<LostBlock>,
) {
    for request in requests.drain(..) {
        let Some(ship) = sector.get_mut(request.ship) else {
            continue;
        };
        let transform = ship.transform;
        let beams: Vec<Beam> = ship
            .blocks()
            .filter(|b| b.block_type.is_laser())
            .map(|b| {
                let start = transform.block_world_position(b.coord);
                let dir = rotate(transform.forward(), b.rotation.to_radians());
                Beam {
                    coord: b.coord,
                    damage: b.block_type.fire_stats().map_or(0.0, |f| f.fire_damage),
                    start,
                    end: start + dir * LASER_BEAM_LENGTH,
                }
            })
            .collect();
        if beams.is_empty() {
            continue;
        }
        let cost = beams.len() as f64 * LASER_ENERGY_PER_BLOCK;
        let paid = ship
            .systems_mut()
            .and_then(|s| s.energy.as_mut())
            .is_some_and(|e| e.spend(cost));
        if !paid {
            continue;
        }

        for beam in beams {
            // The emitting block may have been shot off by an earlier beam.
            if !sector.get(request.ship).is_some_and(|s| s.has_block(beam.coord)) {
                continue;
            }
            let target = sector
                .blocks_along_ray(beam.start, beam.end)
                .into_iter()
                .find(|b| b.object != request.ship);
            if let Some(target) = target {
                apply_damage_to_block(
                    sector,
                    bus,
                    target.object,
                    target.coord,
                    beam.damage * dt,
                    DestructionCause::Laser,
                    lost,
                );
            }
        }
    }
}
