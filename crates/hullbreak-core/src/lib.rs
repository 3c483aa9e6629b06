//! Core types and definitions for the HULLBREAK simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! block definitions, ECS components, intents, affixes, commands, state snapshots,
//! events, configuration, constants, and the error type.
//! It has no dependency on any runtime framework.

pub mod affixes;
pub mod blocks;
pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod intent;
pub mod state;
pub mod types;
pub mod waves;

pub use error::{Error, Result};
