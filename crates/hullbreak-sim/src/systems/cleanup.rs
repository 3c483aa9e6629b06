//! Cleanup system: removes props that left the world.

use hecs::{Entity, World};

use hullbreak_core::components::Position;

/// Despawn every positioned entity outside the square world of the given
/// half size. Uses the caller's buffer to avoid per-tick allocation.
pub fn run(world: &mut World, half_size: f64, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.clear();

    for (entity, pos) in world.query_mut::<&Position>() {
        if pos.0.x.abs() > half_size || pos.0.y.abs() > half_size {
            despawn_buffer.push(entity);
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
