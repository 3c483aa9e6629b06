//! Per-wave bookkeeping and the named scripts waves can fire.

use std::collections::{BTreeMap, BTreeSet};

use hullbreak_core::commands::PlayerCommand;
use hullbreak_core::enums::DestructionCause;
use hullbreak_core::events::EventBus;
use hullbreak_core::types::ObjectId;
use hullbreak_core::waves::WaveDefinition;

use crate::destruction::destroy_entity;
use crate::sector::Sector;

/// What a script is told about the wave that fired it.
#[derive(Debug, Clone, Copy)]
pub struct ScriptContext<'a> {
    /// `None` for tagged one-shot waves.
    pub wave_index: Option<usize>,
    pub wave: &'a WaveDefinition,
}

/// A script reacts by queueing commands for the next tick.
pub type ScriptHandler = Box<dyn FnMut(&ScriptContext, &mut Vec<PlayerCommand>) + Send>;

/// Named callbacks fired by waves.
#[derive(Default)]
pub struct ScriptRunner {
    scripts: BTreeMap<String, ScriptHandler>,
    queued: Vec<PlayerCommand>,
}

impl ScriptRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a script, replacing any previous one of the same name.
    pub fn register(
        &mut self,
        name: &str,
        handler: impl FnMut(&ScriptContext, &mut Vec<PlayerCommand>) + Send + 'static,
    ) {
        if self.scripts.contains_key(name) {
            log::warn!("script '{name}' is already registered, overwriting");
        }
        self.scripts.insert(name.to_string(), Box::new(handler));
    }

    /// Run a script. Unknown names are logged and skipped.
    pub fn execute(&mut self, name: &str, ctx: &ScriptContext) -> bool {
        let Some(handler) = self.scripts.get_mut(name) else {
            log::warn!("unknown script '{name}'");
            return false;
        };
        handler(ctx, &mut self.queued);
        true
    }

    pub fn has(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }

    /// Commands queued by scripts since the last call.
    pub fn take_commands(&mut self) -> Vec<PlayerCommand> {
        std::mem::take(&mut self.queued)
    }
}

impl std::fmt::Debug for ScriptRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptRunner")
            .field("scripts", &self.scripts.keys().collect::<Vec<_>>())
            .field("queued", &self.queued.len())
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
struct ShipGroup {
    remaining: BTreeSet<ObjectId>,
    on_all_defeated: Option<String>,
    script_fired: bool,
}

/// Ships spawned by one wave, grouped by the entry that spawned them.
#[derive(Debug, Clone)]
pub struct WaveExecutionContext {
    wave: WaveDefinition,
    wave_index: Option<usize>,
    tag: Option<String>,
    ships: BTreeSet<ObjectId>,
    groups: Vec<ShipGroup>,
    kills: u32,
    destroyed: bool,
}

impl WaveExecutionContext {
    pub fn new(wave: WaveDefinition, wave_index: Option<usize>, tag: Option<String>) -> Self {
        Self {
            wave,
            wave_index,
            tag,
            ships: BTreeSet::new(),
            groups: Vec::new(),
            kills: 0,
            destroyed: false,
        }
    }

    /// Start a new group of ships that share an `on_all_defeated` script.
    pub fn open_group(&mut self, on_all_defeated: Option<String>) -> usize {
        self.groups.push(ShipGroup {
            on_all_defeated,
            ..Default::default()
        });
        self.groups.len() - 1
    }

    pub fn track_ship(&mut self, id: ObjectId, group: usize) {
        self.ships.insert(id);
        if let Some(g) = self.groups.get_mut(group) {
            g.remaining.insert(id);
        }
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.ships.contains(&id)
    }

    /// Record a destroyed ship. Fires each group's script once, when its last
    /// ship goes. Returns true if the ship belonged to this wave.
    pub fn notify_ship_destroyed(
        &mut self,
        id: ObjectId,
        cause: DestructionCause,
        scripts: &mut ScriptRunner,
    ) -> bool {
        if !self.ships.remove(&id) {
            return false;
        }
        if !matches!(cause, DestructionCause::Replaced | DestructionCause::Scripted) {
            self.kills += 1;
        }
        let ctx = ScriptContext {
            wave_index: self.wave_index,
            wave: &self.wave,
        };
        for group in &mut self.groups {
            if !group.remaining.remove(&id) {
                continue;
            }
            if group.remaining.is_empty() && !group.script_fired {
                if let Some(script) = &group.on_all_defeated {
                    scripts.execute(script, &ctx);
                    group.script_fired = true;
                }
            }
        }
        true
    }

    pub fn is_complete(&self) -> bool {
        self.ships.is_empty()
    }

    /// Remove every remaining ship from the world.
    pub fn destroy(&mut self, sector: &mut Sector, bus: &mut EventBus) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        for id in std::mem::take(&mut self.ships) {
            destroy_entity(sector, bus, id, DestructionCause::Scripted);
        }
        self.groups.clear();
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn wave(&self) -> &WaveDefinition {
        &self.wave
    }

    pub fn wave_index(&self) -> Option<usize> {
        self.wave_index
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn remaining(&self) -> usize {
        self.ships.len()
    }

    pub fn ships(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.ships.iter().copied()
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }
}
