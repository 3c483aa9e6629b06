//! Projectile creation and turret particle palettes.

use glam::DVec2;
use hecs::{Entity, World};
use rand::{Rng, RngCore};

use hullbreak_core::components::{HeatSeeker, Lance, Lifetime, Position, Projectile, Velocity};
use hullbreak_core::constants::MAX_PROJECTILE_SPREAD;
use hullbreak_core::enums::{Faction, FireType};
use hullbreak_core::types::ObjectId;

use crate::weapons::{LanceSpawn, ProjectileSpawn, SeekerSpawn};

pub type Palette = [&'static str; 3];

const TURRET_PALETTES: [(&str, Palette); 5] = [
    ("turret0", ["#ffff88", "#ffaa00", "#ffcc33"]),
    ("turret1", ["#ff8888", "#ff3333", "#ffaaaa"]),
    ("turret2", ["#88ff88", "#33dd33", "#aaffaa"]),
    ("turret3", ["#88ccff", "#3399ff", "#66ddff"]),
    ("turret4", ["#cc88ff", "#9933ff", "#ddaaff"]),
];

/// Particle colors for a turret block id. Unknown ids get the tier-0 palette.
pub fn turret_palette(block_id: &str) -> Palette {
    TURRET_PALETTES
        .iter()
        .find(|(id, _)| *id == block_id)
        .map(|(_, p)| *p)
        .unwrap_or(TURRET_PALETTES[0].1)
}

const LANCE_PALETTES: [(&str, Palette); 5] = [
    ("explosiveLance0", ["#ffcc00", "#ff6600", "#cc2200"]),
    ("explosiveLance1", ["#ffcc00", "#ff6600", "#cc2200"]),
    ("explosiveLance2", ["#aaffaa", "#66dd66", "#228822"]),
    ("explosiveLance3", ["#ccccff", "#9999ff", "#4444aa"]),
    ("explosiveLance4", ["#ff66cc", "#ff3399", "#990066"]),
];

pub fn lance_palette(block_id: &str) -> Palette {
    LANCE_PALETTES
        .iter()
        .find(|(id, _)| *id == block_id)
        .map(|(_, p)| *p)
        .unwrap_or(LANCE_PALETTES[0].1)
}

/// Exhaust colors of a seeker: hostile missiles burn red.
pub fn seeker_palette(owner_faction: Faction) -> Palette {
    match owner_faction {
        Faction::Enemy => ["#ff8866", "#ff3322", "#aa1100"],
        _ => ["#dddddd", "#a9a9a9", "#666666"],
    }
}

/// Heading of a shot after accuracy spread is applied. Accuracy 1.0 is exact.
pub fn spread_angle(base: f64, accuracy: f64, rng: &mut dyn RngCore) -> f64 {
    let inaccuracy = (1.0 - accuracy.clamp(0.0, 1.0)) * MAX_PROJECTILE_SPREAD;
    if inaccuracy <= 0.0 {
        return base;
    }
    base + inaccuracy * rng.gen_range(-1.0..=1.0)
}

/// Spawn a bullet entity. Returns `None` when the origin and aim point
/// coincide, since there is no direction to fire in.
pub fn spawn_projectile(world: &mut World, spawn: &ProjectileSpawn, rng: &mut dyn RngCore) -> Option<Entity> {
    let delta = spawn.aim_at - spawn.origin;
    if delta.length_squared() <= f64::EPSILON {
        return None;
    }
    let angle = spread_angle(delta.y.atan2(delta.x), spawn.accuracy, rng);
    let velocity = glam::DVec2::new(angle.cos(), angle.sin()) * spawn.speed;

    Some(world.spawn((
        Position(spawn.origin),
        Velocity(velocity),
        Lifetime {
            remaining: spawn.lifetime,
        },
        Projectile {
            owner: spawn.owner,
            damage: spawn.damage,
            fire_type: FireType::Bullet,
            palette: spawn.palette,
        },
    )))
}

/// Spawn a lance entity flying toward its aim point.
pub fn spawn_lance(world: &mut World, spawn: &LanceSpawn, rng: &mut dyn RngCore) -> Option<Entity> {
    let delta = spawn.aim_at - spawn.origin;
    if delta.length_squared() <= f64::EPSILON {
        return None;
    }
    let angle = spread_angle(delta.y.atan2(delta.x), spawn.accuracy, rng);
    let velocity = glam::DVec2::new(angle.cos(), angle.sin()) * spawn.speed;

    Some(world.spawn((
        Position(spawn.origin),
        Velocity(velocity),
        Lance {
            owner: spawn.owner,
            fire_damage: spawn.fire_damage,
            explosion_damage: spawn.explosion_damage,
            explosion_radius: spawn.explosion_radius,
            detonation_delay: spawn.detonation_delay,
            ttl: spawn.lifetime,
            anchor: None,
            fuse: 0.0,
            palette: spawn.palette,
        },
    )))
}

/// Spawn a seeker locked onto `target`, leaving at `heading` radians.
pub fn spawn_seeker(
    world: &mut World,
    spawn: &SeekerSpawn,
    target: ObjectId,
    target_position: DVec2,
    heading: f64,
) -> Entity {
    world.spawn((
        Position(spawn.origin),
        Velocity(DVec2::new(heading.cos(), heading.sin()) * spawn.speed),
        HeatSeeker {
            owner: spawn.owner,
            owner_faction: spawn.owner_faction,
            target: Some(target),
            fire_damage: spawn.fire_damage,
            explosion_damage: spawn.explosion_damage,
            explosion_radius: spawn.explosion_radius,
            targeting_range: spawn.targeting_range,
            turning_power: spawn.turning_power,
            launch_speed: spawn.speed,
            ttl: spawn.lifetime,
            age: 0.0,
            ticks_since_refresh: 0,
            last_known_target: Some(target_position),
        },
    ))
}
