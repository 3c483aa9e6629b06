//! HULLBREAK runner.
//!
//! Wires the simulation crates into a real-time game loop and a headless
//! batch runner, driven from the command line.

pub mod autopilot;
pub mod game_loop;
pub mod state;

pub use hullbreak_core as core;
