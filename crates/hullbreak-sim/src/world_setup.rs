//! Initial mission world: the player ship and a scattering of asteroids.

use glam::DVec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use hullbreak_core::blocks::{BlockCatalog, ASTEROID_BLOCKS};
use hullbreak_core::enums::Faction;
use hullbreak_core::types::{GridCoord, ObjectId};
use hullbreak_core::Result;

use crate::blueprints::ShipBlueprints;
use crate::factory::{spawn_ship, ShipSpawn};
use crate::sector::Sector;
use crate::serializer::{load_asteroid, SerializedBlock, SerializedBlockObject, SerializedTransform};
use crate::ship::ShipFlags;

/// Blueprint flown by the player.
pub const PLAYER_BLUEPRINT: &str = "player";

/// Asteroids scattered at mission start.
pub const ASTEROID_COUNT: usize = 12;

/// Asteroids stay this far from the player's start.
const ASTEROID_CLEARANCE: f64 = 1500.0;

/// Spawn the player ship at the origin, uncullable.
pub fn spawn_player(
    sector: &mut Sector,
    catalog: &BlockCatalog,
    blueprints: &ShipBlueprints,
) -> Result<ObjectId> {
    let spawn = ShipSpawn::new(PLAYER_BLUEPRINT, Faction::Player, DVec2::ZERO).with_flags(ShipFlags {
        is_player: true,
        uncullable: true,
        ..Default::default()
    });
    spawn_ship(sector, catalog, blueprints, &spawn)
}

/// A blob of rock blocks grown outward from the center.
fn asteroid_layout(position: DVec2, rng: &mut ChaCha8Rng) -> SerializedBlockObject {
    let radius: i32 = rng.gen_range(1..=3);
    let mut blocks = Vec::new();
    for y in -radius..=radius {
        for x in -radius..=radius {
            let coord = GridCoord::new(x, y);
            if coord.chebyshev(&GridCoord::ORIGIN) == radius && rng.gen_bool(0.4) {
                continue;
            }
            let id = if coord == GridCoord::ORIGIN {
                "rock0"
            } else {
                ASTEROID_BLOCKS[rng.gen_range(0..ASTEROID_BLOCKS.len())]
            };
            blocks.push(SerializedBlock {
                id: id.to_string(),
                coord,
                rotation: 0.0,
            });
        }
    }
    SerializedBlockObject {
        transform: SerializedTransform {
            position: position.into(),
            rotation: rng.gen_range(0.0..std::f64::consts::TAU),
            angular_velocity: rng.gen_range(-0.2..0.2),
            ..Default::default()
        },
        blocks,
    }
}

/// Scatter `count` asteroids across the world, clear of the start point.
pub fn scatter_asteroids(
    sector: &mut Sector,
    catalog: &BlockCatalog,
    rng: &mut ChaCha8Rng,
    count: usize,
    half_size: f64,
) -> Result<Vec<ObjectId>> {
    let mut ids = Vec::with_capacity(count);
    if half_size <= ASTEROID_CLEARANCE {
        return Ok(ids);
    }
    while ids.len() < count {
        let position = DVec2::new(
            rng.gen_range(-half_size..half_size),
            rng.gen_range(-half_size..half_size),
        );
        if position.length() < ASTEROID_CLEARANCE {
            continue;
        }
        let layout = asteroid_layout(position, rng);
        ids.push(load_asteroid(sector, catalog, &layout)?);
    }
    Ok(ids)
}
