//! Incidents: scripted world events a wave may roll for, such as a black
//! hole or a field of pickups.

pub mod black_hole;
pub mod healing_beacon;
pub mod quantum_boom;

use std::collections::BTreeMap;

use glam::DVec2;
use hecs::{Entity, World};

use hullbreak_core::components::{Hazard, HazardKind, Position};
use hullbreak_core::events::GameEvent;
use hullbreak_core::waves::IncidentOptions;

use crate::context::SimContext;

pub use black_hole::BlackHole;
pub use healing_beacon::HealingBeacon;
pub use quantum_boom::QuantumBoom;

/// Ids of the built-in scripts.
pub const BLACK_HOLE: &str = "black-hole";
pub const HEALING_BEACON: &str = "healing-beacon";
pub const QUANTUM_BOOM: &str = "quantum-boom";

/// Lifecycle of one running incident.
pub trait IncidentScript: Send {
    /// Called once, right after the incident is created.
    fn on_trigger(&mut self, ctx: &mut SimContext);

    fn update(&mut self, dt: f64, ctx: &mut SimContext);

    fn is_complete(&self) -> bool;

    /// Called once when `is_complete` turns true, before `destroy`.
    fn on_complete(&mut self, _ctx: &mut SimContext) {}

    /// Remove whatever the incident placed in the world.
    fn destroy(&mut self, ctx: &mut SimContext);

    fn on_event(&mut self, _event: &GameEvent) {}
}

/// Everything a script is constructed from.
#[derive(Debug, Clone)]
pub struct IncidentSetup {
    /// Unique instance id.
    pub id: String,
    pub options: IncidentOptions,
    pub wave_id: Option<usize>,
}

impl IncidentSetup {
    /// Anchor point, or the origin when the options carry none.
    pub fn position(&self) -> DVec2 {
        self.options.position().unwrap_or(DVec2::ZERO)
    }
}

pub type IncidentConstructor = fn(IncidentSetup) -> Box<dyn IncidentScript>;

/// Script constructors by id.
#[derive(Clone, Default)]
pub struct IncidentRegistry {
    constructors: BTreeMap<String, IncidentConstructor>,
}

impl IncidentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in scripts.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(BLACK_HOLE, |setup| Box::new(BlackHole::new(setup)));
        registry.register(HEALING_BEACON, |setup| Box::new(HealingBeacon::new(setup)));
        registry.register(QUANTUM_BOOM, |setup| Box::new(QuantumBoom::new(setup)));
        registry
    }

    pub fn register(&mut self, id: &str, constructor: IncidentConstructor) {
        if self.constructors.insert(id.to_string(), constructor).is_some() {
            log::warn!("incident script '{id}' registered twice, overwriting");
        }
    }

    pub fn has(&self, id: &str) -> bool {
        self.constructors.contains_key(id)
    }

    pub fn create(&self, id: &str, setup: IncidentSetup) -> Option<Box<dyn IncidentScript>> {
        self.constructors.get(id).map(|ctor| ctor(setup))
    }

    pub fn script_ids(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for IncidentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncidentRegistry")
            .field("scripts", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}

struct ActiveIncident {
    script_id: String,
    wave_id: Option<usize>,
    script: Box<dyn IncidentScript>,
}

/// Runs triggered incidents until they complete or are cleared.
#[derive(Default)]
pub struct IncidentOrchestrator {
    registry: IncidentRegistry,
    active: BTreeMap<String, ActiveIncident>,
    next_serial: u64,
    completed: u32,
}

impl IncidentOrchestrator {
    pub fn new(registry: IncidentRegistry) -> Self {
        Self {
            registry,
            ..Default::default()
        }
    }

    pub fn registry_mut(&mut self) -> &mut IncidentRegistry {
        &mut self.registry
    }

    /// Start an incident. Returns its instance id, or `None` for an unknown script.
    pub fn trigger(
        &mut self,
        script_id: &str,
        options: &IncidentOptions,
        wave_id: Option<usize>,
        ctx: &mut SimContext,
    ) -> Option<String> {
        self.next_serial += 1;
        let id = format!("{script_id}-{}", self.next_serial);
        let setup = IncidentSetup {
            id: id.clone(),
            options: options.clone(),
            wave_id,
        };
        let Some(mut script) = self.registry.create(script_id, setup) else {
            log::warn!("unknown incident script '{script_id}'");
            return None;
        };
        script.on_trigger(ctx);
        log::info!("incident {id} triggered");
        ctx.bus.publish(GameEvent::IncidentTriggered {
            incident_id: id.clone(),
            script: script_id.to_string(),
        });
        self.active.insert(
            id.clone(),
            ActiveIncident {
                script_id: script_id.to_string(),
                wave_id,
                script,
            },
        );
        Some(id)
    }

    /// Advance every incident; completed ones are finished and dropped.
    pub fn update(&mut self, dt: f64, ctx: &mut SimContext) {
        let mut finished = Vec::new();
        for (id, incident) in &mut self.active {
            incident.script.update(dt, ctx);
            if incident.script.is_complete() {
                finished.push(id.clone());
            }
        }
        for id in finished {
            let Some(mut incident) = self.active.remove(&id) else {
                continue;
            };
            incident.script.on_complete(ctx);
            incident.script.destroy(ctx);
            self.completed += 1;
            log::info!("incident {id} ({}) completed", incident.script_id);
            ctx.bus.publish(GameEvent::IncidentCompleted { incident_id: id });
        }
    }

    pub fn handle_event(&mut self, event: &GameEvent) {
        for incident in self.active.values_mut() {
            incident.script.on_event(event);
        }
    }

    /// Destroy the incidents of one wave, or all of them for `None`.
    pub fn clear(&mut self, wave_id: Option<usize>, ctx: &mut SimContext) {
        let doomed: Vec<String> = self
            .active
            .iter()
            .filter(|(_, i)| wave_id.is_none() || i.wave_id == wave_id)
            .map(|(id, _)| id.clone())
            .collect();
        for id in doomed {
            if let Some(mut incident) = self.active.remove(&id) {
                incident.script.destroy(ctx);
            }
        }
    }

    /// Tear everything down.
    pub fn destroy(&mut self, ctx: &mut SimContext) {
        self.clear(None, ctx);
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn active_ids(&self) -> Vec<String> {
        self.active.keys().cloned().collect()
    }

    pub fn completed_count(&self) -> u32 {
        self.completed
    }
}

impl std::fmt::Debug for IncidentOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncidentOrchestrator")
            .field("registry", &self.registry)
            .field("active", &self.active.keys().collect::<Vec<_>>())
            .field("completed", &self.completed)
            .finish()
    }
}

/// Place the visible marker of an area effect.
pub(crate) fn spawn_hazard(
    world: &mut World,
    incident_id: &str,
    kind: HazardKind,
    position: DVec2,
    radius: f64,
) -> Entity {
    world.spawn((
        Position(position),
        Hazard {
            incident_id: incident_id.to_string(),
            kind,
            radius,
        },
    ))
}

pub(crate) fn despawn_hazard(world: &mut World, hazard: &mut Option<Entity>) {
    if let Some(entity) = hazard.take() {
        let _ = world.despawn(entity);
    }
}
