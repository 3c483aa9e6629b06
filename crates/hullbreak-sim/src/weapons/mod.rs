//! Weapon and utility dispatch.
//!
//! A `WeaponSystem` holds the latest weapon intent and a list of pluggable
//! backends. Each update passes the same intent snapshot to every backend in
//! registration order. Backends never talk to each other; anything a backend
//! remembers between ticks is kept per ship inside that backend.
//!
//! Backends do not touch the world directly. They describe what should happen
//! in a `WeaponEffects` buffer which the engine applies after dispatch.

pub mod heat_seeker;
pub mod lance;
pub mod laser;
pub mod shield_toggle;
pub mod turret;

use glam::DVec2;
use rand::RngCore;

use hullbreak_core::enums::Faction;
use hullbreak_core::events::{GameEvent, SoundRequest};
use hullbreak_core::intent::{UtilityIntent, WeaponIntent};
use hullbreak_core::types::{ObjectId, Transform};

use crate::composite::CompositeBlockObject;

pub use heat_seeker::HeatSeekerBackend;
pub use lance::ExplosiveLanceBackend;
pub use laser::LaserBackend;
pub use shield_toggle::ShieldToggleBackend;
pub use turret::TurretBackend;

/// Request to create one projectile.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileSpawn {
    pub owner: ObjectId,
    pub origin: DVec2,
    pub aim_at: DVec2,
    pub damage: f64,
    pub speed: f64,
    pub lifetime: f64,
    pub accuracy: f64,
    pub palette: [&'static str; 3],
}

/// Request to launch one explosive lance.
#[derive(Debug, Clone, PartialEq)]
pub struct LanceSpawn {
    pub owner: ObjectId,
    pub origin: DVec2,
    pub aim_at: DVec2,
    pub fire_damage: f64,
    pub explosion_damage: f64,
    pub explosion_radius: i32,
    pub detonation_delay: f64,
    pub speed: f64,
    pub lifetime: f64,
    pub accuracy: f64,
    pub palette: [&'static str; 3],
}

/// Request to launch one heat seeker. The engine picks the target; with
/// none in range nothing launches.
#[derive(Debug, Clone, PartialEq)]
pub struct SeekerSpawn {
    pub owner: ObjectId,
    pub owner_faction: Faction,
    pub origin: DVec2,
    /// Unit vector the launching hull points along.
    pub forward: DVec2,
    /// Which side to launch from: 1.0 or -1.0.
    pub side: f64,
    pub forward_fire: bool,
    pub fire_damage: f64,
    pub explosion_damage: f64,
    pub explosion_radius: i32,
    pub speed: f64,
    pub lifetime: f64,
    pub turning_power: f64,
    pub targeting_range: f64,
}

/// A beam to resolve this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaserRequest {
    pub ship: ObjectId,
    pub transform: Transform,
    pub aim_at: DVec2,
}

/// Everything backends asked for during one dispatch.
#[derive(Debug, Clone, Default)]
pub struct WeaponEffects {
    pub projectiles: Vec<ProjectileSpawn>,
    pub lasers: Vec<LaserRequest>,
    pub lances: Vec<LanceSpawn>,
    pub seekers: Vec<SeekerSpawn>,
    pub sounds: Vec<SoundRequest>,
    pub events: Vec<GameEvent>,
}

impl WeaponEffects {
    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
            && self.lasers.is_empty()
            && self.lances.is_empty()
            && self.seekers.is_empty()
            && self.sounds.is_empty()
            && self.events.is_empty()
    }

    pub fn append(&mut self, other: &mut WeaponEffects) {
        self.projectiles.append(&mut other.projectiles);
        self.lasers.append(&mut other.lasers);
        self.lances.append(&mut other.lances);
        self.seekers.append(&mut other.seekers);
        self.sounds.append(&mut other.sounds);
        self.events.append(&mut other.events);
    }
}

pub trait WeaponBackend: Send {
    fn update(
        &mut self,
        dt: f64,
        ship: &mut CompositeBlockObject,
        intent: &WeaponIntent,
        rng: &mut dyn RngCore,
        fx: &mut WeaponEffects,
    );
}

pub trait UtilityBackend: Send {
    fn update(
        &mut self,
        dt: f64,
        ship: &mut CompositeBlockObject,
        intent: &UtilityIntent,
        fx: &mut WeaponEffects,
    );
}

#[derive(Default)]
pub struct WeaponSystem {
    backends: Vec<Box<dyn WeaponBackend>>,
    intent: Option<WeaponIntent>,
}

impl WeaponSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turret, laser, lance and seeker backends, in that order.
    pub fn standard() -> Self {
        let mut system = Self::new();
        system.add_backend(Box::new(TurretBackend::new()));
        system.add_backend(Box::new(LaserBackend::new()));
        system.add_backend(Box::new(ExplosiveLanceBackend::new()));
        system.add_backend(Box::new(HeatSeekerBackend::new()));
        system
    }

    pub fn add_backend(&mut self, backend: Box<dyn WeaponBackend>) {
        self.backends.push(backend);
    }

    /// Replace the pending intent. Only the last one set before `update` counts.
    pub fn set_intent(&mut self, intent: WeaponIntent) {
        self.intent = Some(intent);
    }

    pub fn intent(&self) -> Option<&WeaponIntent> {
        self.intent.as_ref()
    }

    pub fn backend_count(&self) -> usize {
        self.backends.len()
    }

    /// Run every backend against the current intent. With no intent set yet,
    /// backends see a do-nothing intent.
    pub fn update(
        &mut self,
        dt: f64,
        ship: &mut CompositeBlockObject,
        rng: &mut dyn RngCore,
        fx: &mut WeaponEffects,
    ) {
        let intent = self.intent.unwrap_or_default();
        for backend in &mut self.backends {
            backend.update(dt, ship, &intent, rng, fx);
        }
    }
}

impl std::fmt::Debug for WeaponSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeaponSystem")
            .field("backends", &self.backends.len())
            .field("intent", &self.intent)
            .finish()
    }
}

#[derive(Default)]
pub struct UtilitySystem {
    backends: Vec<Box<dyn UtilityBackend>>,
    intent: Option<UtilityIntent>,
}

impl UtilitySystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shield toggle only.
    pub fn standard() -> Self {
        let mut system = Self::new();
        system.add_backend(Box::new(ShieldToggleBackend::new()));
        system
    }

    pub fn add_backend(&mut self, backend: Box<dyn UtilityBackend>) {
        self.backends.push(backend);
    }

    pub fn set_intent(&mut self, intent: UtilityIntent) {
        self.intent = Some(intent);
    }

    pub fn intent(&self) -> Option<&UtilityIntent> {
        self.intent.as_ref()
    }

    pub fn update(&mut self, dt: f64, ship: &mut CompositeBlockObject, fx: &mut WeaponEffects) {
        let intent = self.intent.unwrap_or_default();
        for backend in &mut self.backends {
            backend.update(dt, ship, &intent, fx);
        }
    }
}

impl std::fmt::Debug for UtilitySystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UtilitySystem")
            .field("backends", &self.backends.len())
            .field("intent", &self.intent)
            .finish()
    }
}
