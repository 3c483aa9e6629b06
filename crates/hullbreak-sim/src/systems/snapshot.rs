//! Snapshot system: reads the sector and world into a GameStateSnapshot.
//!
//! Read-only; it never modifies the simulation.

use hecs::World;

use hullbreak_core::components::{HeatSeeker, Lance, Pickup, Position, Projectile, Velocity};
use hullbreak_core::enums::{FireType, GamePhase, ObjectKind};
use hullbreak_core::events::{GameEvent, SoundRequest};
use hullbreak_core::state::*;
use hullbreak_core::types::{ObjectId, SimTime};

use crate::ai_controller::AiOrchestrator;
use crate::composite::CompositeBlockObject;
use crate::projectiles::seeker_palette;
use crate::sector::Sector;

/// Per-tick outputs gathered by the engine.
#[derive(Debug, Default)]
pub struct TickOutputs {
    pub visible: Vec<ObjectId>,
    pub waves: WaveView,
    pub incidents: Vec<String>,
    pub events: Vec<GameEvent>,
    pub sounds: Vec<SoundRequest>,
    pub score: ScoreView,
}

/// Build a complete GameStateSnapshot from the current state.
pub fn build_snapshot(
    sector: &Sector,
    world: &World,
    ai: &AiOrchestrator,
    time: &SimTime,
    phase: GamePhase,
    player: Option<ObjectId>,
    outputs: TickOutputs,
) -> GameStateSnapshot {
    GameStateSnapshot {
        time: *time,
        phase,
        player,
        ships: build_ships(sector, ai),
        asteroids: build_asteroids(sector),
        projectiles: build_projectiles(world),
        pickups: build_pickups(world),
        visible: outputs.visible,
        waves: outputs.waves,
        incidents: outputs.incidents,
        events: outputs.events,
        sounds: outputs.sounds,
        score: outputs.score,
    }
}

fn build_ships(sector: &Sector, ai: &AiOrchestrator) -> Vec<ShipView> {
    sector
        .ships()
        .map(|ship| ship_view(ship, ai))
        .collect()
}

fn ship_view(ship: &CompositeBlockObject, ai: &AiOrchestrator) -> ShipView {
    let controller = ai.get(ship.id);
    ShipView {
        id: ship.id,
        kind: ship.kind,
        faction: ship.faction,
        position: ship.transform.position,
        velocity: ship.transform.velocity,
        rotation: ship.transform.rotation,
        blocks: ship.block_count(),
        shield_active: ship.shield_active(),
        energy: ship.systems().and_then(|s| s.energy_current()),
        ai_state: controller.map(|c| c.state().name().to_string()),
        formation: ai
            .formations()
            .formation_for_ship(ship.id)
            .map(|f| f.formation_id.clone()),
    }
}

fn build_asteroids(sector: &Sector) -> Vec<ObjectView> {
    sector
        .objects()
        .filter(|o| o.kind == ObjectKind::Asteroid)
        .map(|o| ObjectView {
            id: o.id,
            position: o.transform.position,
            rotation: o.transform.rotation,
            blocks: o.block_count(),
        })
        .collect()
}

fn build_projectiles(world: &World) -> Vec<ProjectileView> {
    let mut projectiles: Vec<ProjectileView> = world
        .query::<(&Position, &Velocity, &Projectile)>()
        .iter()
        .map(|(_, (pos, vel, p))| ProjectileView {
            owner: p.owner,
            fire_type: p.fire_type,
            position: pos.0,
            velocity: vel.0,
            palette: p.palette.map(str::to_string),
        })
        .collect();
    projectiles.extend(world.query::<(&Position, &Velocity, &Lance)>().iter().map(
        |(_, (pos, vel, lance))| ProjectileView {
            owner: lance.owner,
            fire_type: FireType::ExplosiveLance,
            position: pos.0,
            velocity: vel.0,
            palette: lance.palette.map(str::to_string),
        },
    ));
    projectiles.extend(world.query::<(&Position, &Velocity, &HeatSeeker)>().iter().map(
        |(_, (pos, vel, seeker))| ProjectileView {
            owner: seeker.owner,
            fire_type: FireType::HeatSeeker,
            position: pos.0,
            velocity: vel.0,
            palette: seeker_palette(seeker.owner_faction).map(str::to_string),
        },
    ));
    // hecs iteration order follows archetype layout; sort for stable output.
    projectiles.sort_by(|a, b| {
        a.owner
            .cmp(&b.owner)
            .then(a.position.x.total_cmp(&b.position.x))
            .then(a.position.y.total_cmp(&b.position.y))
    });
    projectiles
}

fn build_pickups(world: &World) -> Vec<PickupView> {
    let mut pickups: Vec<PickupView> = world
        .query::<(&Position, &Pickup)>()
        .iter()
        .map(|(_, (pos, p))| PickupView {
            kind: p.kind,
            position: pos.0,
            amount: p.amount,
        })
        .collect();
    pickups.sort_by(|a, b| {
        a.position
            .x
            .total_cmp(&b.position.x)
            .then(a.position.y.total_cmp(&b.position.y))
    });
    pickups
}
