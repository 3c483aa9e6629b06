//! Simulation engine for HULLBREAK.
//!
//! Owns the composite block objects and their spatial indices, runs ship
//! AI, weapons, waves and incidents, and produces `GameStateSnapshot`s each
//! tick. Completely headless, so it can be tested without any front end.

pub mod ai_controller;
pub mod block_index;
pub mod blueprints;
pub mod combat;
pub mod composite;
pub mod context;
pub mod culling;
pub mod destruction;
pub mod engine;
pub mod factory;
pub mod grid;
pub mod incidents;
pub mod projectiles;
pub mod registry;
pub mod sector;
pub mod serializer;
pub mod ship;
pub mod ship_grid;
pub mod systems;
pub mod waves;
pub mod weapons;
pub mod world_setup;

pub use engine::{SimConfig, SimulationEngine};
pub use hullbreak_core as core;

#[cfg(test)]
mod tests;
