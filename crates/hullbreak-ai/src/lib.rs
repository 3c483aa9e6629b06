//! Ship AI for HULLBREAK.
//!
//! Implements the controller state machine, steering helpers, target
//! selection, behavior profiles, and formation templates. Everything here
//! operates on plain data; the simulation crate builds the inputs.

pub mod formation_registry;
pub mod formations;
pub mod fsm;
pub mod profiles;
pub mod steering;
pub mod targeting;

pub use hullbreak_core as core;

#[cfg(test)]
mod tests;
