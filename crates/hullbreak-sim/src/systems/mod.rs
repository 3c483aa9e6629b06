//! Systems that advance the simulation each tick.
//!
//! Systems are free functions over the sector and the hecs world. They keep
//! no state of their own; callers pass in whatever buffers they reuse.

pub mod cleanup;
pub mod collision;
pub mod energy;
pub mod lances;
pub mod lasers;
pub mod movement;
pub mod pickups;
pub mod projectiles;
pub mod seekers;
pub mod snapshot;
