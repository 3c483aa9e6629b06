//! Turns a wave definition into live ships and incidents.

use rand::Rng;

use hullbreak_core::enums::Faction;
use hullbreak_core::types::ObjectId;
use hullbreak_core::waves::WaveDefinition;

use super::context::WaveExecutionContext;
use super::modifiers::WaveModifiersApplier;
use super::spawn_coords::SpawnCoordinateResolver;
use crate::context::SimContext;
use crate::factory::{spawn_ai_ship, spawn_formation, ShipSpawn};
use crate::incidents::IncidentOrchestrator;
use crate::ship::ShipFlags;

/// Spawns formations, then loose ships, then rolls incidents.
#[derive(Debug, Clone)]
pub struct WaveExecutor {
    resolver: SpawnCoordinateResolver,
    applier: WaveModifiersApplier,
    faction: Faction,
}

impl WaveExecutor {
    pub fn new(world_size: f64) -> Self {
        Self {
            resolver: SpawnCoordinateResolver::new(world_size),
            applier: WaveModifiersApplier::new(),
            faction: Faction::Enemy,
        }
    }

    pub fn resolver(&self) -> &SpawnCoordinateResolver {
        &self.resolver
    }

    /// Spawn everything in `wave`. A ship or formation that fails to spawn is
    /// logged and skipped; the rest of the wave still goes out.
    pub fn execute(
        &self,
        wave: &WaveDefinition,
        wave_index: Option<usize>,
        tag: Option<String>,
        ctx: &mut SimContext,
        incidents: &mut IncidentOrchestrator,
    ) -> WaveExecutionContext {
        let mut exec = WaveExecutionContext::new(wave.clone(), wave_index, tag);
        let distribution = wave.spawn_distribution;

        for entry in &wave.formations {
            let group = exec.open_group(None);
            for _ in 0..entry.count {
                let at = self
                    .resolver
                    .coords(distribution, ctx.player_position(), &mut *ctx.rng);
                match spawn_formation(ctx, entry, self.faction, at.x, at.y) {
                    Ok(ids) => self.track(&mut exec, group, ids, wave, ctx),
                    Err(e) => log::warn!("formation {} failed to spawn: {e}", entry.formation_id),
                }
            }
        }

        for entry in &wave.ships {
            let group = exec.open_group(entry.on_all_defeated.clone());
            let flags = ShipFlags {
                hunter: entry.hunter,
                behavior: entry.behavior.unwrap_or_default(),
                ..Default::default()
            };
            for _ in 0..entry.count {
                let at = self
                    .resolver
                    .coords(distribution, ctx.player_position(), &mut *ctx.rng);
                let spawn = ShipSpawn::new(&entry.ship_id, self.faction, at)
                    .with_flags(flags)
                    .with_affixes(entry.affixes);
                match spawn_ai_ship(ctx, &spawn) {
                    Ok(id) => self.track(&mut exec, group, vec![id], wave, ctx),
                    Err(e) => log::warn!("wave ship {} failed to spawn: {e}", entry.ship_id),
                }
            }
        }

        for entry in &wave.incidents {
            let roll: f64 = ctx.rng.gen();
            if roll > entry.spawn_chance {
                continue;
            }
            let mut options = entry.options.clone();
            if options.position().is_none() {
                let at = self
                    .resolver
                    .coords(distribution, ctx.player_position(), &mut *ctx.rng);
                options.x = Some(at.x);
                options.y = Some(at.y);
            }
            incidents.trigger(&entry.script, &options, wave_index, ctx);
        }

        exec
    }

    fn track(
        &self,
        exec: &mut WaveExecutionContext,
        group: usize,
        ids: Vec<ObjectId>,
        wave: &WaveDefinition,
        ctx: &mut SimContext,
    ) {
        for id in ids {
            self.applier.apply_to_ship(ctx.sector, id, &wave.mods);
            exec.track_ship(id, group);
        }
    }
}
