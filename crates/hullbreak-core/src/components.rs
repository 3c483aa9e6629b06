//! ECS components for hecs entities: projectiles and world props.
//!
//! Components are plain data; the systems in the simulation crate own the logic.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{GridCoord, ObjectId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub DVec2);

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub DVec2);

/// Seconds left before the entity expires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lifetime {
    pub remaining: f64,
}

/// A discrete shot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Projectile {
    /// Ship that fired it; its blocks are never hit.
    pub owner: ObjectId,
    pub damage: f64,
    pub fire_type: FireType,
    /// Particle colors for the renderer, brightest first.
    pub palette: [&'static str; 3],
}

/// Where a lance is stuck: the block it hit and its offset from that
/// object's origin at the moment of impact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LanceAnchor {
    pub object: ObjectId,
    pub coord: GridCoord,
    pub offset: DVec2,
}

/// An explosive lance, in flight or stuck to a hull.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Lance {
    pub owner: ObjectId,
    pub fire_damage: f64,
    pub explosion_damage: f64,
    /// Blast radius in block slots.
    pub explosion_radius: i32,
    pub detonation_delay: f64,
    /// Flight time left before an unstuck lance fizzles.
    pub ttl: f64,
    pub anchor: Option<LanceAnchor>,
    /// Seconds since the lance stuck.
    pub fuse: f64,
    pub palette: [&'static str; 3],
}

/// A homing missile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatSeeker {
    pub owner: ObjectId,
    pub owner_faction: Faction,
    pub target: Option<ObjectId>,
    pub fire_damage: f64,
    pub explosion_damage: f64,
    pub explosion_radius: i32,
    pub targeting_range: f64,
    /// Turn rate at launch, in radians per second.
    pub turning_power: f64,
    pub launch_speed: f64,
    pub ttl: f64,
    pub age: f64,
    pub ticks_since_refresh: u32,
    /// Cached aim point, refreshed every few ticks.
    pub last_known_target: Option<DVec2>,
}

/// Something a ship can fly over to collect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub kind: PickupKind,
    pub amount: u32,
}

/// Kinds of incident hazard shown in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardKind {
    BlackHole,
    HealingBeacon,
}

/// Marker for an area effect owned by an incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub incident_id: String,
    pub kind: HazardKind,
    pub radius: f64,
}
