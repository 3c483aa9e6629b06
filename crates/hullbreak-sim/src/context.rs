//! Mutable view of the world handed to waves, incidents and spawners.

use hecs::World;
use rand_chacha::ChaCha8Rng;

use hullbreak_core::blocks::BlockCatalog;
use hullbreak_core::config::WorldSettings;
use hullbreak_core::events::EventBus;
use hullbreak_core::types::ObjectId;

use crate::ai_controller::AiOrchestrator;
use crate::blueprints::ShipBlueprints;
use crate::sector::Sector;

/// Borrowed engine state for one orchestration step.
pub struct SimContext<'a> {
    pub sector: &'a mut Sector,
    /// Projectiles, pickups and hazards.
    pub world: &'a mut World,
    pub catalog: &'a BlockCatalog,
    pub blueprints: &'a ShipBlueprints,
    pub ai: &'a mut AiOrchestrator,
    pub bus: &'a mut EventBus,
    pub rng: &'a mut ChaCha8Rng,
    pub settings: &'a WorldSettings,
    pub player: Option<ObjectId>,
}

impl SimContext<'_> {
    pub fn player_position(&self) -> Option<glam::DVec2> {
        self.player
            .and_then(|id| self.sector.get(id))
            .map(|p| p.transform.position)
    }
}
