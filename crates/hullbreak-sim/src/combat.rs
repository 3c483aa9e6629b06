//! Damage resolution against individual blocks.

use glam::DVec2;

use hullbreak_core::constants::MIN_SHIELD_EFFICIENCY;
use hullbreak_core::enums::{DestructionCause, Faction};
use hullbreak_core::events::EventBus;
use hullbreak_core::types::{GridCoord, ObjectId};

use crate::destruction::destroy_entity;
use crate::sector::Sector;

/// Result of one damage application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// No such object or block.
    Missed,
    /// The shield paid for the hit with energy.
    Absorbed,
    Damaged,
    BlockDestroyed,
    /// The hit took out the cockpit or the last block.
    EntityDestroyed,
}

/// A block knocked off an object, for pickup drops.
#[derive(Debug, Clone, PartialEq)]
pub struct LostBlock {
    pub owner: ObjectId,
    pub faction: Faction,
    pub position: DVec2,
    pub cost: u32,
}

/// Hit the block at `coord` of object `id` for `damage`.
///
/// Active shields covering the block absorb the hit if the ship can pay
/// `damage / efficiency` energy. Otherwise hit points drop; a destroyed
/// cockpit destroys the object, and any other loss prunes blocks no longer
/// connected to the cockpit.
pub fn apply_damage_to_block(
    sector: &mut Sector,
    bus: &mut EventBus,
    id: ObjectId,
    coord: GridCoord,
    damage: f64,
    cause: DestructionCause,
    lost: &mut Vec<LostBlock>,
) -> DamageOutcome {
    let Some(object) = sector.get_mut(id) else {
        return DamageOutcome::Missed;
    };
    let shield_active = object.shield_active();
    let invulnerable = object.is_invulnerable();
    let Some(efficiency) = object.block_at(coord).map(|b| b.shield_efficiency) else {
        return DamageOutcome::Missed;
    };

    if shield_active {
        if let (Some(eff), Some(systems)) = (efficiency, object.systems_mut()) {
            if eff > 0.0 {
                let cost = damage / eff.max(MIN_SHIELD_EFFICIENCY);
                if systems.energy.as_mut().is_some_and(|e| e.spend(cost)) {
                    return DamageOutcome::Absorbed;
                }
            }
        }
    }

    let scale = if invulnerable { 0.0 } else { 1.0 };
    let Some(block) = object.block_at_mut(coord) else {
        return DamageOutcome::Missed;
    };
    block.hp -= damage * scale;
    if block.hp > 0.0 {
        return DamageOutcome::Damaged;
    }

    let is_cockpit = block.block_type.is_cockpit();
    let faction = object.faction;
    let position = object.block_world_position(coord);
    if let Some(removed) = sector.remove_block(id, coord) {
        lost.push(LostBlock {
            owner: id,
            faction,
            position,
            cost: removed.block_type.cost,
        });
    }

    if is_cockpit {
        destroy_entity(sector, bus, id, cause);
        return DamageOutcome::EntityDestroyed;
    }

    prune_disconnected(sector, id, lost);

    if sector.get(id).is_some_and(|o| o.block_count() == 0) {
        destroy_entity(sector, bus, id, cause);
        return DamageOutcome::EntityDestroyed;
    }
    DamageOutcome::BlockDestroyed
}

/// Hit every block of object `id` within Chebyshev `radius` slots of
/// `center` for `damage`. Returns how many blocks were touched.
#[allow(clippy::too_many_arguments)]
pub fn apply_blast(
    sector: &mut Sector,
    bus: &mut EventBus,
    id: ObjectId,
    center: GridCoord,
    radius: i32,
    damage: f64,
    cause: DestructionCause,
    lost: &mut Vec<LostBlock>,
) -> usize {
    let Some(object) = sector.get(id) else {
        return 0;
    };
    let coords: Vec<GridCoord> = object
        .block_map()
        .keys()
        .copied()
        .filter(|c| c.chebyshev(&center) <= radius)
        .collect();
    let mut touched = 0;
    for coord in coords {
        if apply_damage_to_block(sector, bus, id, coord, damage, cause, lost) != DamageOutcome::Missed {
            touched += 1;
        }
    }
    touched
}

/// Drop blocks cut off from the cockpit. Objects without a cockpit (asteroids)
/// are left as they are.
pub fn prune_disconnected(sector: &mut Sector, id: ObjectId, lost: &mut Vec<LostBlock>) {
    let Some(object) = sector.get(id) else {
        return;
    };
    if !object.has_cockpit() {
        return;
    }
    let faction = object.faction;
    let orphans: Vec<(GridCoord, DVec2)> = object
        .disconnected_blocks()
        .into_iter()
        .map(|c| (c, object.block_world_position(c)))
        .collect();
    for (coord, position) in orphans {
        if let Some(removed) = sector.remove_block(id, coord) {
            lost.push(LostBlock {
                owner: id,
                faction,
                position,
                cost: removed.block_type.cost,
            });
        }
    }
}
