//! Contact between composite objects: ramming damage, separation and
//! bounce.
//!
//! Every unordered pair with at least one ship is resolved once per tick.
//! Two objects touch when any of their blocks sit closer than one block
//! width on both axes. Touching ships get their `colliding` flag set, which
//! the AI reads on its next update.

use std::collections::BTreeSet;

use glam::DVec2;

use hullbreak_core::affixes::HasAffixes;
use hullbreak_core::constants::*;
use hullbreak_core::enums::DestructionCause;
use hullbreak_core::events::EventBus;
use hullbreak_core::types::{GridCoord, ObjectId, Rect};

use crate::combat::{apply_damage_to_block, LostBlock};
use crate::composite::CompositeBlockObject;
use crate::sector::Sector;

/// Two blocks in contact, one from each object.
#[derive(Debug, Clone, Copy)]
struct ContactPair {
    a: GridCoord,
    b: GridCoord,
    /// World position of `a` minus that of `b`.
    delta: DVec2,
}

/// World-space box around every block of an object.
fn bounds(object: &CompositeBlockObject) -> Option<Rect> {
    let half = BLOCK_SIZE * 0.5;
    let mut positions = object.blocks().map(|b| object.block_world_position(b.coord));
    let first = positions.next()?;
    let (min, max) = positions.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
    Some(Rect {
        min: min - DVec2::splat(half),
        max: max + DVec2::splat(half),
    })
}

fn contacts(a: &CompositeBlockObject, b: &CompositeBlockObject) -> Vec<ContactPair> {
    let b_blocks: Vec<(GridCoord, DVec2)> = b
        .blocks()
        .map(|block| (block.coord, b.block_world_position(block.coord)))
        .collect();
    let mut pairs = Vec::new();
    for block in a.blocks() {
        let pa = a.block_world_position(block.coord);
        for &(coord, pb) in &b_blocks {
            let delta = pa - pb;
            if delta.x.abs() < BLOCK_SIZE && delta.y.abs() < BLOCK_SIZE {
                pairs.push(ContactPair {
                    a: block.coord,
                    b: coord,
                    delta,
                });
            }
        }
    }
    pairs
}

/// Base ramming damage for a closing speed. Slow bumps do nothing; above
/// the soft cap the damage stops growing.
pub fn ramming_damage(relative_speed: f64) -> f64 {
    if relative_speed < RAM_MIN_DAMAGE_SPEED {
        return 0.0;
    }
    let normalized = (relative_speed.min(RAM_SOFT_CAP_SPEED) - RAM_MIN_DAMAGE_SPEED)
        / (RAM_SOFT_CAP_SPEED - RAM_MIN_DAMAGE_SPEED);
    normalized.powf(RAM_DAMAGE_EXPONENT) * RAM_MAX_DAMAGE
}

fn affix_ramming(object: &CompositeBlockObject) -> f64 {
    object
        .affixed()
        .map(|a| a.affixes().ramming_damage())
        .unwrap_or(1.0)
}

fn block_ramming(object: &CompositeBlockObject, coord: GridCoord) -> (f64, f64) {
    object
        .block_at(coord)
        .and_then(|b| b.block_type.behavior.as_ref())
        .map(|b| (b.ramming_multiplier(), b.ramming_armor()))
        .unwrap_or((1.0, 0.0))
}

/// Candidate pairs, each unordered pair once, lowest id first.
fn candidate_pairs(sector: &Sector) -> BTreeSet<(ObjectId, ObjectId)> {
    let mut pairs = BTreeSet::new();
    for ship in sector.ships() {
        let Some(rect) = bounds(ship) else {
            continue;
        };
        for other in sector.objects_in_rect(&rect) {
            if other == ship.id {
                continue;
            }
            pairs.insert((ship.id.min(other), ship.id.max(other)));
        }
    }
    pairs
}

/// Clear last tick's contact flags, then resolve every touching pair.
pub fn run(sector: &mut Sector, bus: &mut EventBus, lost: &mut Vec<LostBlock>) {
    for id in sector.ids() {
        if let Some(systems) = sector.get_mut(id).and_then(|o| o.systems_mut()) {
            systems.colliding = false;
        }
    }

    for (a, b) in candidate_pairs(sector) {
        resolve_pair(sector, bus, a, b, lost);
    }
}

fn resolve_pair(sector: &mut Sector, bus: &mut EventBus, a_id: ObjectId, b_id: ObjectId, lost: &mut Vec<LostBlock>) {
    let (Some(a), Some(b)) = (sector.get(a_id), sector.get(b_id)) else {
        return;
    };
    if !a.is_ship() && !b.is_ship() {
        return;
    }
    let pairs = contacts(a, b);
    if pairs.is_empty() {
        return;
    }

    let relative = a.transform.velocity - b.transform.velocity;
    let base = ramming_damage(relative.length());
    let mut hits: Vec<(ObjectId, GridCoord, f64)> = Vec::new();
    if base > 0.0 {
        let (affix_a, affix_b) = (affix_ramming(a), affix_ramming(b));
        for pair in &pairs {
            let (mult_a, armor_a) = block_ramming(a, pair.a);
            let (mult_b, armor_b) = block_ramming(b, pair.b);
            let to_b = (base * mult_a * affix_a - armor_b).max(0.0);
            let to_a = (base * mult_b * affix_b - armor_a).max(0.0);
            if to_b > 0.0 {
                hits.push((b_id, pair.b, to_b));
            }
            if to_a > 0.0 {
                hits.push((a_id, pair.a, to_a));
            }
        }
    }

    let mut push = pairs.iter().map(|p| p.delta).sum::<DVec2>() / pairs.len() as f64;
    if push.length_squared() <= f64::EPSILON {
        push = a.transform.position - b.transform.position;
    }
    let normal = push.try_normalize().unwrap_or(DVec2::X);
    let correction = normal * (BLOCK_SIZE * 0.5 - COLLISION_PENETRATION_SLOP) * COLLISION_CORRECTION_RATIO;

    // Share of the correction each side takes; an immovable side takes none.
    let (mass_a, mass_b) = (a.mass().max(1.0), b.mass().max(1.0));
    let (share_a, share_b) = match (a.is_immovable(), b.is_immovable()) {
        (true, true) => (0.0, 0.0),
        (true, false) => (0.0, 1.0),
        (false, true) => (1.0, 0.0),
        (false, false) => (mass_b / (mass_a + mass_b), mass_a / (mass_a + mass_b)),
    };

    let closing = relative.dot(normal);
    let impulse = if closing < 0.0 {
        let clamped = closing.max(-COLLISION_MAX_CLOSING_SPEED);
        let j = -(1.0 + COLLISION_RESTITUTION) * clamped;
        (j >= COLLISION_IMPULSE_EPSILON).then_some(j)
    } else {
        None
    };

    for (id, sign, share) in [(a_id, 1.0, share_a), (b_id, -1.0, share_b)] {
        let Some(object) = sector.get_mut(id) else {
            continue;
        };
        if let Some(systems) = object.systems_mut() {
            systems.colliding = true;
        }
        if share <= 0.0 {
            continue;
        }
        object.transform.position += correction * sign * share;
        if let Some(j) = impulse {
            object.transform.velocity += normal * j * sign * share;
        }
        object.transform.velocity *= COLLISION_DAMPING;
        sector.sync_object(id);
    }

    for (id, coord, damage) in hits {
        apply_damage_to_block(sector, bus, id, coord, damage, DestructionCause::Collision, lost);
    }
}
