//! Removing composite objects from the world.

use hullbreak_core::enums::DestructionCause;
use hullbreak_core::events::{EventBus, GameEvent};
use hullbreak_core::types::ObjectId;

use crate::sector::Sector;

/// Remove an object and all of its index entries, then announce it.
/// Returns false if the object was already gone.
pub fn destroy_entity(
    sector: &mut Sector,
    bus: &mut EventBus,
    id: ObjectId,
    cause: DestructionCause,
) -> bool {
    let Some(object) = sector.remove_object(id) else {
        return false;
    };
    log::debug!("{} destroyed by {:?}", id, cause);
    bus.publish(GameEvent::EntityDestroyed {
        id,
        faction: object.faction,
        cause,
        position: object.transform.position,
    });
    true
}
