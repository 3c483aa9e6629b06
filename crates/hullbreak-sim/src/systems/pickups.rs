//! World pickups: spawning, expiry and collection by the player.

use glam::DVec2;
use hecs::{Entity, World};

use hullbreak_core::components::{Lifetime, Pickup, Position};
use hullbreak_core::constants::{PICKUP_COLLECT_RADIUS, PICKUP_LIFETIME_SECS};
use hullbreak_core::enums::{Faction, PickupKind};
use hullbreak_core::events::{EventBus, GameEvent};
use hullbreak_core::types::ObjectId;

use crate::combat::LostBlock;
use crate::sector::Sector;

/// Place a pickup. Pickups without a lifetime stay until collected.
pub fn spawn_pickup(
    world: &mut World,
    bus: &mut EventBus,
    kind: PickupKind,
    position: DVec2,
    amount: u32,
    lifetime: Option<f64>,
) -> Entity {
    let entity = world.spawn((Position(position), Pickup { kind, amount }));
    if let Some(remaining) = lifetime {
        let _ = world.insert_one(entity, Lifetime { remaining });
    }
    bus.publish(GameEvent::PickupSpawned {
        kind,
        position,
        amount,
    });
    entity
}

/// Currency dropped by blocks knocked off ships not on `player_faction`'s side.
pub fn drop_currency(world: &mut World, bus: &mut EventBus, lost: &[LostBlock], player_faction: Faction) {
    for block in lost {
        if block.faction == player_faction || block.faction == Faction::Neutral || block.cost == 0 {
            continue;
        }
        spawn_pickup(
            world,
            bus,
            PickupKind::Currency,
            block.position,
            block.cost,
            Some(PICKUP_LIFETIME_SECS),
        );
    }
}

/// Expire timed pickups and let the player collect the ones it touches.
/// Returns the currency collected this tick.
pub fn run(
    world: &mut World,
    sector: &Sector,
    bus: &mut EventBus,
    dt: f64,
    player: Option<ObjectId>,
    despawn_buffer: &mut Vec<Entity>,
) -> u32 {
    despawn_buffer.clear();

    for (entity, (life, _)) in world.query_mut::<(&mut Lifetime, &Pickup)>() {
        life.remaining -= dt;
        if life.remaining <= 0.0 {
            despawn_buffer.push(entity);
        }
    }

    let mut currency = 0;
    if let Some(ship) = player.and_then(|id| sector.get(id)) {
        let reach = PICKUP_COLLECT_RADIUS + ship.radius();
        let center = ship.transform.position;
        for (entity, (pos, pickup)) in world.query::<(&Position, &Pickup)>().iter() {
            if despawn_buffer.contains(&entity) || pos.0.distance(center) > reach {
                continue;
            }
            despawn_buffer.push(entity);
            if pickup.kind == PickupKind::Currency {
                currency += pickup.amount;
            }
            bus.publish(GameEvent::PickupCollected {
                kind: pickup.kind,
                collector: ship.id,
            });
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
    currency
}
