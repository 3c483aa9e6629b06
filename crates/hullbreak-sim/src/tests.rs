//! Tests for the simulation engine and its systems.

use glam::DVec2;
use hecs::World;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use hullbreak_ai::fsm::{AiState, AiStateKind, RamPhase};
use hullbreak_ai::formations::{small_wedge_formation, FormationAffixes};
use hullbreak_core::affixes::{HasAffixes, ShipAffixes};
use hullbreak_core::blocks::BlockCatalog;
use hullbreak_core::commands::PlayerCommand;
use hullbreak_core::components::{HeatSeeker, Lance, Pickup, Projectile};
use hullbreak_core::config::WorldSettings;
use hullbreak_core::enums::{
    BehaviorKind, DestructionCause, Faction, FiringMode, GamePhase, PickupKind, SpawnDistribution,
};
use hullbreak_core::events::{EventBus, GameEvent};
use hullbreak_core::intent::{ShipIntent, UtilityIntent, WeaponIntent};
use hullbreak_core::types::{GridCoord, ObjectId, Rect};
use hullbreak_core::waves::{IncidentOptions, WaveDefinition, WaveShipEntry};

use crate::ai_controller::AiOrchestrator;
use crate::block_index::BlockToObjectIndex;
use crate::blueprints::ShipBlueprints;
use crate::combat::{apply_damage_to_block, DamageOutcome, LostBlock};
use crate::context::SimContext;
use crate::culling::{CompositeBlockObjectCullingSystem, GlobalEnemyCulling};
use crate::destruction::destroy_entity;
use crate::engine::{SimConfig, SimulationEngine};
use crate::factory::{spawn_ai_ship, spawn_formation, spawn_ship, ShipSpawn};
use crate::grid::Grid;
use crate::incidents::{
    IncidentOrchestrator, IncidentRegistry, BLACK_HOLE, HEALING_BEACON, QUANTUM_BOOM,
};
use crate::projectiles::{spawn_lance, spawn_projectile};
use crate::sector::Sector;
use crate::ship::{ShipFlags, ShipSystems};
use crate::ship_grid::ShipGrid;
use crate::systems;
use crate::waves::{ScriptRunner, WaveExecutionContext, WaveExecutor, WaveModifiersApplier, WaveOrchestrator};
use crate::weapons::{
    ExplosiveLanceBackend, HeatSeekerBackend, LanceSpawn, LaserRequest, ProjectileSpawn, SeekerSpawn,
    ShieldToggleBackend, TurretBackend, UtilityBackend, WeaponBackend, WeaponEffects, WeaponSystem,
};

/// Engine state without the engine, for driving systems one at a time.
struct Fixture {
    sector: Sector,
    world: World,
    catalog: BlockCatalog,
    blueprints: ShipBlueprints,
    ai: AiOrchestrator,
    bus: EventBus,
    rng: ChaCha8Rng,
    settings: WorldSettings,
    player: Option<ObjectId>,
}

impl Fixture {
    fn new() -> Self {
        let settings = WorldSettings::default();
        Self {
            sector: Sector::new(settings.grid_cell_size),
            world: World::new(),
            catalog: BlockCatalog::standard(),
            blueprints: ShipBlueprints::builtin().unwrap(),
            ai: AiOrchestrator::new(),
            bus: EventBus::new(),
            rng: ChaCha8Rng::seed_from_u64(7),
            settings,
            player: None,
        }
    }

    fn ctx(&mut self) -> SimContext<'_> {
        SimContext {
            sector: &mut self.sector,
            world: &mut self.world,
            catalog: &self.catalog,
            blueprints: &self.blueprints,
            ai: &mut self.ai,
            bus: &mut self.bus,
            rng: &mut self.rng,
            settings: &self.settings,
            player: self.player,
        }
    }

    fn spawn(&mut self, blueprint: &str, faction: Faction, position: DVec2) -> ObjectId {
        let spawn = ShipSpawn::new(blueprint, faction, position);
        spawn_ship(&mut self.sector, &self.catalog, &self.blueprints, &spawn).unwrap()
    }

    fn spawn_player(&mut self, position: DVec2) -> ObjectId {
        let id = self.spawn("player", Faction::Player, position);
        self.player = Some(id);
        id
    }

    fn total_hp(&self, id: ObjectId) -> f64 {
        self.sector.get(id).unwrap().blocks().map(|b| b.hp).sum()
    }

    fn pickups(&self) -> usize {
        self.world.query::<&Pickup>().iter().count()
    }
}

fn started_engine(seed: u64) -> SimulationEngine {
    let mut engine = SimulationEngine::new(SimConfig {
        seed,
        ..Default::default()
    })
    .unwrap();
    engine.queue_command(PlayerCommand::StartMission);
    engine.tick();
    engine
}

fn scouts_wave(count: u32, duration: Option<f64>) -> WaveDefinition {
    WaveDefinition {
        duration,
        spawn_distribution: SpawnDistribution::AroundPlayer,
        ships: vec![WaveShipEntry::new("scout", count)],
        ..Default::default()
    }
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let mut a = started_engine(12345);
    let mut b = started_engine(12345);
    a.queue_command(PlayerCommand::SkipToNextWave);
    b.queue_command(PlayerCommand::SkipToNextWave);

    for _ in 0..300 {
        let snap_a = a.tick();
        let snap_b = b.tick();
        let json_a = serde_json::to_string(&snap_a).unwrap();
        let json_b = serde_json::to_string(&snap_b).unwrap();
        assert_eq!(json_a, json_b, "snapshots diverged at t={}", snap_a.time.elapsed_secs);
    }
}

#[test]
fn test_different_seeds_diverge() {
    let mut a = started_engine(1);
    let mut b = started_engine(2);
    let snap_a = a.tick();
    let snap_b = b.tick();
    assert_ne!(
        serde_json::to_string(&snap_a.asteroids).unwrap(),
        serde_json::to_string(&snap_b.asteroids).unwrap(),
    );
}

// ---- Engine lifecycle ----

#[test]
fn test_start_mission_spawns_player_and_asteroids() {
    let engine = started_engine(42);
    assert_eq!(engine.phase(), GamePhase::Active);
    let player = engine.player().unwrap();
    assert!(engine.sector().get(player).unwrap().is_player());
    assert_eq!(engine.sector().len(), 1 + crate::world_setup::ASTEROID_COUNT);
    assert!(engine.sector().indices_consistent());
}

#[test]
fn test_start_mission_only_once() {
    let mut engine = started_engine(42);
    let before = engine.sector().len();
    engine.queue_command(PlayerCommand::StartMission);
    engine.tick();
    assert_eq!(engine.sector().len(), before);
}

#[test]
fn test_setup_phase_does_not_advance_time() {
    let mut engine = SimulationEngine::new(SimConfig::default()).unwrap();
    for _ in 0..10 {
        engine.tick();
    }
    assert_eq!(engine.phase(), GamePhase::Setup);
    assert_eq!(engine.time().tick, 0);
}

#[test]
fn test_pause_and_resume() {
    let mut engine = started_engine(42);
    engine.queue_command(PlayerCommand::Pause);
    engine.tick();
    assert_eq!(engine.phase(), GamePhase::Paused);
    assert!(engine.waves().is_paused());
    let t = engine.time().tick;
    for _ in 0..30 {
        engine.tick();
    }
    assert_eq!(engine.time().tick, t);

    engine.queue_command(PlayerCommand::Resume);
    engine.tick();
    assert_eq!(engine.phase(), GamePhase::Active);
    assert_eq!(engine.time().tick, t + 1);
}

#[test]
fn test_time_scale_is_clamped() {
    let mut engine = started_engine(42);
    engine.queue_command(PlayerCommand::SetTimeScale { scale: 10.0 });
    engine.tick();
    assert_eq!(engine.time_scale(), 4.0);
    engine.queue_command(PlayerCommand::SetTimeScale { scale: -1.0 });
    engine.tick();
    assert_eq!(engine.time_scale(), 0.0);
}

#[test]
fn test_invalid_settings_rejected() {
    let config = SimConfig {
        world: WorldSettings {
            world_size: -1.0,
            ..Default::default()
        },
        ..Default::default()
    };
    assert!(SimulationEngine::new(config).is_err());
}

#[test]
fn test_player_turrets_fire_projectiles() {
    let mut engine = started_engine(42);
    engine.queue_command(PlayerCommand::SetIntent {
        intent: ShipIntent {
            weapons: WeaponIntent {
                fire_primary: true,
                aim_at: DVec2::new(0.0, -800.0),
                ..Default::default()
            },
            ..Default::default()
        },
    });
    let mut fired = 0;
    let mut seen_projectile = false;
    for _ in 0..120 {
        let snap = engine.tick();
        fired += snap
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::ProjectileFired { .. }))
            .count();
        seen_projectile |= !snap.projectiles.is_empty();
    }
    assert!(fired >= 2, "player has two turrets, fired {fired}");
    assert!(seen_projectile);
}

#[test]
fn test_viewport_follows_player_until_pinned() {
    let mut engine = started_engine(42);
    let snap = engine.tick();
    let player = engine.player().unwrap();
    assert!(snap.visible.contains(&player));

    let far = Rect::centered(DVec2::new(9000.0, 9000.0), 100.0, 100.0);
    engine.queue_command(PlayerCommand::SetViewport { viewport: far });
    let snap = engine.tick();
    assert!(!snap.visible.contains(&player));
}

// ---- Waves ----

#[test]
fn test_first_wave_waits_for_initial_delay() {
    let mut engine = started_engine(42);
    let snap = engine.tick();
    assert_eq!(snap.waves.current_wave, 0);
    assert_eq!(snap.waves.time_until_next, Some(10.0));

    for _ in 0..300 {
        engine.tick();
    }
    assert_eq!(engine.waves().current_wave_number(), 0);

    let mut started = false;
    for _ in 0..320 {
        let snap = engine.tick();
        started |= snap
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::WaveStarted { wave_index: 0, .. }));
    }
    assert!(started);
    assert_eq!(engine.waves().current_wave_number(), 1);
}

#[test]
fn test_skip_to_next_wave() {
    let mut engine = started_engine(42);
    let ships_before = engine.sector().ships().count();
    engine.queue_command(PlayerCommand::SkipToNextWave);
    let snap = engine.tick();
    assert_eq!(snap.waves.current_wave, 1);
    assert!(engine.sector().ships().count() > ships_before);
    assert!(snap.waves.active_remaining > 0);
}

#[test]
fn test_mission_completes_when_last_wave_is_empty() {
    let config = SimConfig {
        world: WorldSettings {
            waves: vec![WaveDefinition::default()],
            ..Default::default()
        },
        ..Default::default()
    };
    let mut engine = SimulationEngine::new(config).unwrap();
    engine.queue_command(PlayerCommand::StartMission);
    engine.queue_command(PlayerCommand::SkipToNextWave);
    engine.tick();
    let snap = engine.tick();
    assert_eq!(snap.phase, GamePhase::Complete);
    assert_eq!(snap.score.waves_cleared, 1);
}

#[test]
fn test_tagged_wave_spawn_and_clear() {
    let mut engine = started_engine(42);
    let before = engine.sector().ships().count();

    engine.queue_command(PlayerCommand::SpawnTaggedWave {
        tag: "ambush".into(),
        wave: scouts_wave(2, None),
    });
    engine.tick();
    assert!(engine.waves().has_tagged("ambush"));
    assert_eq!(engine.sector().ships().count(), before + 2);

    // A live tag is not spawned twice.
    engine.queue_command(PlayerCommand::SpawnTaggedWave {
        tag: "ambush".into(),
        wave: scouts_wave(2, None),
    });
    engine.tick();
    assert_eq!(engine.sector().ships().count(), before + 2);

    engine.queue_command(PlayerCommand::ClearTaggedWave {
        tag: "ambush".into(),
    });
    let snap = engine.tick();
    assert!(!engine.waves().has_tagged("ambush"));
    assert_eq!(engine.sector().ships().count(), before);
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::TaggedWaveCompleted { tag } if tag == "ambush")));
    assert_eq!(snap.score.kills, 0, "scripted removal is not a kill");
}

#[test]
fn test_orchestrator_timed_waves_advance() {
    let mut fx = Fixture::new();
    fx.spawn_player(DVec2::ZERO);
    let mut incidents = IncidentOrchestrator::new(IncidentRegistry::builtin());
    let mut waves = WaveOrchestrator::new(
        vec![scouts_wave(1, Some(5.0)), scouts_wave(1, Some(5.0))],
        WaveExecutor::new(fx.settings.world_size),
    );
    waves.start();

    for _ in 0..9 {
        waves.update(1.0, &mut fx.ctx(), &mut incidents);
    }
    assert_eq!(waves.current_wave_number(), 0);
    assert_eq!(waves.time_until_next_wave(), Some(1.0));

    waves.update(1.0, &mut fx.ctx(), &mut incidents);
    assert_eq!(waves.current_wave_number(), 1);

    for _ in 0..5 {
        waves.update(1.0, &mut fx.ctx(), &mut incidents);
    }
    assert_eq!(waves.current_wave_number(), 2);
    assert_eq!(waves.waves_cleared(), 1, "elapsed timer counts as cleared");
    assert!(waves.all_waves_completed());
    assert!(!waves.is_finished());
    assert!(!waves.skip_to_next_wave(&mut fx.ctx(), &mut incidents));
}

#[test]
fn test_orchestrator_waits_for_wipe_out() {
    let mut fx = Fixture::new();
    fx.spawn_player(DVec2::ZERO);
    let mut incidents = IncidentOrchestrator::new(IncidentRegistry::builtin());
    let mut waves = WaveOrchestrator::new(
        vec![scouts_wave(2, None), scouts_wave(1, None)],
        WaveExecutor::new(fx.settings.world_size),
    );
    waves.start();
    assert!(waves.skip_to_next_wave(&mut fx.ctx(), &mut incidents));

    for _ in 0..100 {
        waves.update(1.0, &mut fx.ctx(), &mut incidents);
    }
    assert_eq!(waves.current_wave_number(), 1);

    let ships: Vec<ObjectId> = waves.active_wave().unwrap().ships().collect();
    for id in ships {
        destroy_entity(&mut fx.sector, &mut fx.bus, id, DestructionCause::Projectile);
        waves.notify_ship_destroyed(id, DestructionCause::Projectile, &mut fx.bus);
    }
    waves.update(1.0, &mut fx.ctx(), &mut incidents);
    assert_eq!(waves.current_wave_number(), 2);
    assert_eq!(waves.waves_cleared(), 1);
}

#[test]
fn test_paused_orchestrator_ignores_updates() {
    let mut fx = Fixture::new();
    let mut incidents = IncidentOrchestrator::new(IncidentRegistry::builtin());
    let mut waves = WaveOrchestrator::new(
        vec![scouts_wave(1, None)],
        WaveExecutor::new(fx.settings.world_size),
    );
    waves.start();
    waves.pause();
    for _ in 0..20 {
        waves.update(1.0, &mut fx.ctx(), &mut incidents);
    }
    assert_eq!(waves.current_wave_number(), 0);
    assert_eq!(waves.time_until_next_wave(), None);
    waves.resume();
    assert_eq!(waves.time_until_next_wave(), Some(10.0));
}

#[test]
fn test_wave_group_script_fires_once() {
    let mut scripts = ScriptRunner::new();
    scripts.register("reinforce", |_ctx, commands| {
        commands.push(PlayerCommand::SkipToNextWave);
    });

    let mut exec = WaveExecutionContext::new(scouts_wave(2, None), Some(0), None);
    let group = exec.open_group(Some("reinforce".into()));
    exec.track_ship(ObjectId(1), group);
    exec.track_ship(ObjectId(2), group);

    assert!(exec.notify_ship_destroyed(ObjectId(1), DestructionCause::Projectile, &mut scripts));
    assert!(scripts.take_commands().is_empty());
    assert!(exec.notify_ship_destroyed(ObjectId(2), DestructionCause::Replaced, &mut scripts));
    assert_eq!(scripts.take_commands().len(), 1);
    assert!(exec.is_complete());
    assert_eq!(exec.kills(), 1, "replaced ships are not kills");

    assert!(!exec.notify_ship_destroyed(ObjectId(2), DestructionCause::Projectile, &mut scripts));
    assert!(scripts.take_commands().is_empty());
}

#[test]
fn test_unknown_script_is_skipped() {
    let mut scripts = ScriptRunner::new();
    let wave = WaveDefinition::default();
    let ctx = crate::waves::ScriptContext {
        wave_index: None,
        wave: &wave,
    };
    assert!(!scripts.execute("missing", &ctx));
}

#[test]
fn test_modifiers_compound() {
    let mut systems = ShipSystems::default();
    let applier = WaveModifiersApplier::new();
    let mods = vec!["extra-aggressive".to_string(), "no-such-mod".to_string()];
    applier.apply(&mut systems, &mods);
    applier.apply(&mut systems, &mods);
    assert!((systems.affixes().fire_rate() - 2.25).abs() < 1e-9);
    assert_eq!(systems.affixes().shield_radius(), 1.0);
}

#[test]
fn test_wave_mods_reach_spawned_ships() {
    let mut fx = Fixture::new();
    fx.spawn_player(DVec2::ZERO);
    let mut incidents = IncidentOrchestrator::new(IncidentRegistry::builtin());
    let wave = WaveDefinition {
        mods: vec!["fast".into()],
        ..scouts_wave(1, None)
    };
    let exec = WaveExecutor::new(fx.settings.world_size).execute(
        &wave,
        Some(0),
        None,
        &mut fx.ctx(),
        &mut incidents,
    );
    let id = exec.ships().next().unwrap();
    let systems = fx.sector.get(id).unwrap().systems().unwrap();
    assert!((systems.affixes.thrust_power() - 1.6).abs() < 1e-9);
    assert!(fx.ai.contains(id));
}

// ---- Weapons ----

#[test]
fn test_turret_cadence() {
    let mut fx = Fixture::new();
    let id = fx.spawn("scout", Faction::Enemy, DVec2::ZERO);
    let mut backend = TurretBackend::new();
    let mut effects = WeaponEffects::default();
    let intent = WeaponIntent {
        fire_primary: true,
        aim_at: DVec2::new(0.0, -500.0),
        ..Default::default()
    };
    let ship = fx.sector.get_mut(id).unwrap();
    for _ in 0..16 {
        backend.update(0.25, ship, &intent, &mut fx.rng, &mut effects);
    }
    assert_eq!(effects.projectiles.len(), 4);
    assert_eq!(effects.projectiles[0].owner, id);
}

#[test]
fn test_turret_holds_fire_without_trigger() {
    let mut fx = Fixture::new();
    let id = fx.spawn("scout", Faction::Enemy, DVec2::ZERO);
    let mut backend = TurretBackend::new();
    let mut effects = WeaponEffects::default();
    let ship = fx.sector.get_mut(id).unwrap();
    for _ in 0..16 {
        backend.update(0.25, ship, &WeaponIntent::default(), &mut fx.rng, &mut effects);
    }
    assert!(effects.is_empty());
}

#[test]
fn test_fire_rate_affix_speeds_up_turrets() {
    let mut fx = Fixture::new();
    let spawn = ShipSpawn::new("scout", Faction::Enemy, DVec2::ZERO).with_affixes(ShipAffixes {
        fire_rate_multi: Some(2.0),
        ..Default::default()
    });
    let id = spawn_ship(&mut fx.sector, &fx.catalog, &fx.blueprints, &spawn).unwrap();
    let mut backend = TurretBackend::new();
    let mut effects = WeaponEffects::default();
    let intent = WeaponIntent {
        fire_primary: true,
        aim_at: DVec2::new(0.0, -500.0),
        ..Default::default()
    };
    let ship = fx.sector.get_mut(id).unwrap();
    for _ in 0..16 {
        backend.update(0.25, ship, &intent, &mut fx.rng, &mut effects);
    }
    assert_eq!(effects.projectiles.len(), 8);
}

#[test]
fn test_shield_toggle_is_edge_triggered() {
    let mut fx = Fixture::new();
    let id = fx.spawn_player(DVec2::ZERO);
    let mut backend = ShieldToggleBackend::new();
    let mut effects = WeaponEffects::default();
    let ship = fx.sector.get_mut(id).unwrap();
    for pressed in [false, true, true, false, true] {
        let intent = UtilityIntent {
            toggle_shields: pressed,
        };
        backend.update(1.0 / 60.0, ship, &intent, &mut effects);
    }
    let toggles: Vec<bool> = effects
        .events
        .iter()
        .filter_map(|e| match e {
            GameEvent::ShieldToggled { active, .. } => Some(*active),
            _ => None,
        })
        .collect();
    assert_eq!(toggles, vec![true, false]);
    assert!(!ship.shield_active());
}

#[test]
fn test_shield_toggle_without_emitters() {
    let mut fx = Fixture::new();
    let id = fx.spawn("scout", Faction::Enemy, DVec2::ZERO);
    let mut backend = ShieldToggleBackend::new();
    let mut effects = WeaponEffects::default();
    let ship = fx.sector.get_mut(id).unwrap();
    let intent = UtilityIntent {
        toggle_shields: true,
    };
    backend.update(1.0 / 60.0, ship, &intent, &mut effects);
    assert!(effects.events.is_empty());
    assert!(!ship.shield_active());
}

#[test]
fn test_sequence_mode_staggers_same_type_turrets() {
    let mut fx = Fixture::new();
    let id = fx.spawn("player", Faction::Player, DVec2::ZERO);
    let mut backend = TurretBackend::new();
    let intent = WeaponIntent {
        fire_primary: true,
        aim_at: DVec2::new(0.0, -500.0),
        firing_mode: FiringMode::Sequence,
        ..Default::default()
    };
    let ship = fx.sector.get_mut(id).unwrap();
    let mut origins = Vec::new();
    for _ in 0..16 {
        let mut effects = WeaponEffects::default();
        backend.update(0.25, ship, &intent, &mut fx.rng, &mut effects);
        assert!(effects.projectiles.len() <= 1, "sequence fired a volley");
        origins.extend(effects.projectiles.iter().map(|p| p.origin));
    }
    // Two turret0s at one shot per second each: one shot every half second
    // once the first has cycled.
    assert_eq!(origins.len(), 7);
    for pair in origins.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }
}

#[test]
fn test_synced_mode_fires_volleys() {
    let mut fx = Fixture::new();
    let id = fx.spawn("player", Faction::Player, DVec2::ZERO);
    let mut backend = TurretBackend::new();
    let intent = WeaponIntent {
        fire_primary: true,
        aim_at: DVec2::new(0.0, -500.0),
        ..Default::default()
    };
    let ship = fx.sector.get_mut(id).unwrap();
    let mut volleys = Vec::new();
    for _ in 0..16 {
        let mut effects = WeaponEffects::default();
        backend.update(0.25, ship, &intent, &mut fx.rng, &mut effects);
        if !effects.projectiles.is_empty() {
            volleys.push(effects.projectiles.len());
        }
    }
    assert_eq!(volleys, vec![2, 2, 2, 2]);
}

#[test]
fn test_standard_weapon_system_covers_every_fire_type() {
    assert_eq!(WeaponSystem::standard().backend_count(), 4);
}

#[test]
fn test_lance_backend_launches_on_cooldown() {
    let mut fx = Fixture::new();
    let id = fx.spawn("lancer", Faction::Enemy, DVec2::ZERO);
    let mut backend = ExplosiveLanceBackend::new();
    let mut effects = WeaponEffects::default();
    let intent = WeaponIntent {
        fire_primary: true,
        aim_at: DVec2::new(0.0, -500.0),
        ..Default::default()
    };
    let ship = fx.sector.get_mut(id).unwrap();
    for _ in 0..8 {
        backend.update(0.25, ship, &intent, &mut fx.rng, &mut effects);
    }
    // explosiveLance0 fires every two seconds; the lancer carries two.
    assert_eq!(effects.lances.len(), 2);
    let lance = &effects.lances[0];
    assert_eq!(lance.owner, id);
    assert_eq!(lance.fire_damage, 5.0);
    assert_eq!(lance.explosion_damage, 10.0);
    assert_eq!(lance.explosion_radius, 3);
    assert_eq!(lance.palette[0], "#ffcc00");
    assert!(effects.projectiles.is_empty());
}

#[test]
fn test_seeker_backend_spends_cooldown_with_or_without_target() {
    let mut fx = Fixture::new();
    let id = fx.spawn("lancer", Faction::Enemy, DVec2::ZERO);
    let mut backend = HeatSeekerBackend::new();
    let mut effects = WeaponEffects::default();
    let intent = WeaponIntent {
        fire_primary: true,
        ..Default::default()
    };
    let ship = fx.sector.get_mut(id).unwrap();
    for _ in 0..8 {
        backend.update(0.25, ship, &intent, &mut fx.rng, &mut effects);
    }
    assert_eq!(effects.seekers.len(), 2);
    assert!(effects.seekers.iter().all(|s| s.side.abs() == 1.0 && !s.forward_fire));

    // Nobody hostile in range: the requests launch nothing.
    let mut grid = ShipGrid::default();
    grid.sync(&fx.sector);
    for spawn in &effects.seekers {
        assert!(systems::seekers::launch(&mut fx.world, &fx.sector, &grid, spawn, &mut fx.rng).is_none());
    }
    assert_eq!(fx.world.query::<&HeatSeeker>().iter().count(), 0);

    // The cooldown was still spent.
    let mut again = WeaponEffects::default();
    let ship = fx.sector.get_mut(id).unwrap();
    backend.update(0.25, ship, &intent, &mut fx.rng, &mut again);
    assert!(again.seekers.is_empty());
}

// ---- Combat ----

#[test]
fn test_projectile_hits_nearest_foreign_block() {
    let mut fx = Fixture::new();
    let target = fx.spawn("scout", Faction::Enemy, DVec2::ZERO);
    let spawn = ProjectileSpawn {
        owner: ObjectId(999),
        origin: DVec2::new(0.0, 60.0),
        aim_at: DVec2::ZERO,
        damage: 5.0,
        speed: 300.0,
        lifetime: 2.0,
        accuracy: 1.0,
        palette: crate::projectiles::turret_palette("turret0"),
    };
    spawn_projectile(&mut fx.world, &spawn, &mut fx.rng).unwrap();

    let mut lost = Vec::new();
    let mut despawn = Vec::new();
    systems::projectiles::run(&mut fx.world, &mut fx.sector, &mut fx.bus, 1.0 / 60.0, &mut lost, &mut despawn);

    assert_eq!(fx.world.query::<&Projectile>().iter().count(), 0);
    let engine_block = fx.sector.get(target).unwrap().block_at(GridCoord::new(0, 1)).unwrap();
    assert_eq!(engine_block.hp, engine_block.max_hp() - 5.0);
}

#[test]
fn test_projectile_ignores_owner() {
    let mut fx = Fixture::new();
    let ship = fx.spawn("scout", Faction::Enemy, DVec2::ZERO);
    let before = fx.total_hp(ship);
    let spawn = ProjectileSpawn {
        owner: ship,
        origin: DVec2::new(0.0, 60.0),
        aim_at: DVec2::ZERO,
        damage: 5.0,
        speed: 300.0,
        lifetime: 2.0,
        accuracy: 1.0,
        palette: crate::projectiles::turret_palette("turret0"),
    };
    spawn_projectile(&mut fx.world, &spawn, &mut fx.rng).unwrap();
    let mut lost = Vec::new();
    let mut despawn = Vec::new();
    systems::projectiles::run(&mut fx.world, &mut fx.sector, &mut fx.bus, 1.0 / 60.0, &mut lost, &mut despawn);
    assert_eq!(fx.world.query::<&Projectile>().iter().count(), 1);
    assert_eq!(fx.total_hp(ship), before);
}

#[test]
fn test_active_shield_absorbs_damage() {
    let mut fx = Fixture::new();
    let id = fx.spawn_player(DVec2::ZERO);
    {
        let ship = fx.sector.get_mut(id).unwrap();
        ship.systems_mut().unwrap().shield.activate();
        ship.recalculate_shield_coverage();
    }
    let energy_before = fx.sector.get(id).unwrap().systems().unwrap().energy_current().unwrap();
    let mut lost = Vec::new();
    let outcome = apply_damage_to_block(
        &mut fx.sector,
        &mut fx.bus,
        id,
        GridCoord::ORIGIN,
        10.0,
        DestructionCause::Projectile,
        &mut lost,
    );
    assert_eq!(outcome, DamageOutcome::Absorbed);
    let ship = fx.sector.get(id).unwrap();
    let energy_after = ship.systems().unwrap().energy_current().unwrap();
    // shield0 runs at half efficiency, so 10 damage costs 20 energy.
    assert!((energy_before - energy_after - 20.0).abs() < 1e-9);
    let cockpit = ship.block_at(GridCoord::ORIGIN).unwrap();
    assert_eq!(cockpit.hp, cockpit.max_hp());
}

#[test]
fn test_cockpit_loss_destroys_ship() {
    let mut fx = Fixture::new();
    let id = fx.spawn("scout", Faction::Enemy, DVec2::ZERO);
    let mut lost = Vec::new();
    let outcome = apply_damage_to_block(
        &mut fx.sector,
        &mut fx.bus,
        id,
        GridCoord::ORIGIN,
        1000.0,
        DestructionCause::Projectile,
        &mut lost,
    );
    assert_eq!(outcome, DamageOutcome::EntityDestroyed);
    assert!(!fx.sector.contains(id));
    assert!(fx.sector.indices_consistent());
    assert!(fx.bus.pending().iter().any(|e| matches!(
        e,
        GameEvent::EntityDestroyed { id: gone, cause: DestructionCause::Projectile, .. } if *gone == id
    )));
}

#[test]
fn test_losing_a_link_prunes_disconnected_blocks() {
    let mut fx = Fixture::new();
    let id = fx.spawn("scout", Faction::Enemy, DVec2::ZERO);
    let before = fx.sector.get(id).unwrap().block_count();
    let mut lost = Vec::new();
    // The engine hangs off the cockpit alone; shooting it off leaves the rest.
    let outcome = apply_damage_to_block(
        &mut fx.sector,
        &mut fx.bus,
        id,
        GridCoord::new(0, 1),
        1000.0,
        DestructionCause::Projectile,
        &mut lost,
    );
    assert_eq!(outcome, DamageOutcome::BlockDestroyed);
    assert_eq!(fx.sector.get(id).unwrap().block_count(), before - 1);
    assert_eq!(lost.len(), 1);
    assert!(fx.sector.indices_consistent());
}

#[test]
fn test_laser_spends_energy_and_damages_target() {
    let mut fx = Fixture::new();
    let player = fx.spawn_player(DVec2::ZERO);
    let target = fx.spawn("scout", Faction::Enemy, DVec2::new(32.0, -400.0));
    let hp_before = fx.total_hp(target);
    let energy_before = fx.sector.get(player).unwrap().systems().unwrap().energy_current().unwrap();

    let transform = fx.sector.get(player).unwrap().transform;
    let mut requests = vec![LaserRequest {
        ship: player,
        transform,
        aim_at: DVec2::new(32.0, -400.0),
    }];
    let mut lost = Vec::new();
    systems::lasers::run(&mut fx.sector, &mut fx.bus, &mut requests, 1.0, &mut lost);

    let energy_after = fx.sector.get(player).unwrap().systems().unwrap().energy_current().unwrap();
    assert!((energy_before - energy_after - 0.25).abs() < 1e-9);
    assert!((hp_before - fx.total_hp(target) - 1.0).abs() < 1e-9);
    assert!(requests.is_empty());
}

#[test]
fn test_laser_without_energy_does_nothing() {
    let mut fx = Fixture::new();
    let player = fx.spawn_player(DVec2::ZERO);
    let target = fx.spawn("scout", Faction::Enemy, DVec2::new(32.0, -400.0));
    let hp_before = fx.total_hp(target);
    {
        let energy = fx
            .sector
            .get_mut(player)
            .unwrap()
            .systems_mut()
            .unwrap()
            .energy
            .as_mut()
            .unwrap();
        let drain = energy.current() - 0.1;
        assert!(energy.spend(drain));
    }
    let transform = fx.sector.get(player).unwrap().transform;
    let mut requests = vec![LaserRequest {
        ship: player,
        transform,
        aim_at: DVec2::ZERO,
    }];
    let mut lost = Vec::new();
    systems::lasers::run(&mut fx.sector, &mut fx.bus, &mut requests, 1.0, &mut lost);
    assert_eq!(fx.total_hp(target), hp_before);
}

// ---- Ordnance ----

fn test_lance(owner: ObjectId, origin: DVec2, aim_at: DVec2) -> LanceSpawn {
    LanceSpawn {
        owner,
        origin,
        aim_at,
        fire_damage: 1.0,
        explosion_damage: 5.0,
        explosion_radius: 1,
        detonation_delay: 1.5,
        speed: 300.0,
        lifetime: 2.0,
        accuracy: 1.0,
        palette: ["#ffcc00", "#ff6600", "#cc2200"],
    }
}

fn run_lances(fx: &mut Fixture, dt: f64) {
    let mut lost = Vec::new();
    let mut buffer = Vec::new();
    systems::lances::run(&mut fx.world, &mut fx.sector, &mut fx.bus, dt, &mut lost, &mut buffer);
}

fn hp_at(fx: &Fixture, id: ObjectId, coord: GridCoord) -> f64 {
    fx.sector.get(id).unwrap().block_at(coord).unwrap().hp
}

#[test]
fn test_lance_sticks_then_detonates() {
    let mut fx = Fixture::new();
    let target = fx.spawn("scout", Faction::Enemy, DVec2::ZERO);
    let spawn = test_lance(ObjectId(999), DVec2::new(0.0, 60.0), DVec2::ZERO);
    spawn_lance(&mut fx.world, &spawn, &mut fx.rng).unwrap();

    run_lances(&mut fx, 0.1);
    let anchor = fx
        .world
        .query::<&Lance>()
        .iter()
        .next()
        .and_then(|(_, l)| l.anchor)
        .expect("lance should be stuck");
    assert_eq!(anchor.object, target);
    assert_eq!(anchor.coord, GridCoord::new(0, 1));
    assert_eq!(hp_at(&fx, target, GridCoord::new(0, 1)), 14.0);

    for _ in 0..14 {
        run_lances(&mut fx, 0.1);
    }
    assert_eq!(fx.world.query::<&Lance>().iter().count(), 1);
    assert_eq!(hp_at(&fx, target, GridCoord::ORIGIN), 20.0);

    for _ in 0..3 {
        run_lances(&mut fx, 0.1);
    }
    assert_eq!(fx.world.query::<&Lance>().iter().count(), 0);
    assert_eq!(hp_at(&fx, target, GridCoord::new(0, 1)), 9.0);
    assert_eq!(hp_at(&fx, target, GridCoord::ORIGIN), 15.0);
    assert_eq!(hp_at(&fx, target, GridCoord::new(-1, 0)), 5.0);
    assert_eq!(hp_at(&fx, target, GridCoord::new(1, 0)), 5.0);
    // Two slots from the impact: outside the blast.
    assert_eq!(hp_at(&fx, target, GridCoord::new(0, -1)), 20.0);
}

#[test]
fn test_lance_that_kills_its_block_explodes_at_once() {
    let mut fx = Fixture::new();
    let target = fx.spawn("scout", Faction::Enemy, DVec2::ZERO);
    let spawn = LanceSpawn {
        fire_damage: 50.0,
        ..test_lance(ObjectId(999), DVec2::new(0.0, 60.0), DVec2::ZERO)
    };
    spawn_lance(&mut fx.world, &spawn, &mut fx.rng).unwrap();
    run_lances(&mut fx, 0.1);
    assert_eq!(fx.world.query::<&Lance>().iter().count(), 0);
    assert!(!fx.sector.get(target).unwrap().has_block(GridCoord::new(0, 1)));
    assert_eq!(hp_at(&fx, target, GridCoord::ORIGIN), 15.0);
}

#[test]
fn test_lance_fizzles_without_contact() {
    let mut fx = Fixture::new();
    let owner = fx.spawn("scout", Faction::Enemy, DVec2::ZERO);
    let before = fx.total_hp(owner);
    let spawn = test_lance(owner, DVec2::ZERO, DVec2::new(0.0, -500.0));
    spawn_lance(&mut fx.world, &spawn, &mut fx.rng).unwrap();
    for _ in 0..25 {
        run_lances(&mut fx, 0.1);
    }
    assert_eq!(fx.world.query::<&Lance>().iter().count(), 0);
    assert_eq!(fx.total_hp(owner), before);
}

fn test_seeker(owner: ObjectId, origin: DVec2) -> SeekerSpawn {
    SeekerSpawn {
        owner,
        owner_faction: Faction::Player,
        origin,
        forward: DVec2::new(0.0, -1.0),
        side: 1.0,
        forward_fire: false,
        fire_damage: 12.0,
        explosion_damage: 24.0,
        explosion_radius: 2,
        speed: 250.0,
        lifetime: 4.0,
        turning_power: 2.5,
        targeting_range: 1000.0,
    }
}

#[test]
fn test_seeker_homes_in_and_hits() {
    let mut fx = Fixture::new();
    let player = fx.spawn_player(DVec2::ZERO);
    let target = fx.spawn("gunship", Faction::Enemy, DVec2::new(0.0, -600.0));
    let before = fx.total_hp(target);
    let mut grid = ShipGrid::default();
    grid.sync(&fx.sector);

    let spawn = test_seeker(player, DVec2::ZERO);
    let entity = systems::seekers::launch(&mut fx.world, &fx.sector, &grid, &spawn, &mut fx.rng).unwrap();
    {
        let seeker = fx.world.get::<&HeatSeeker>(entity).unwrap();
        assert_eq!(seeker.target, Some(target));
        // Sideways launch off a hull pointing up the screen.
        let vel = fx.world.get::<&hullbreak_core::components::Velocity>(entity).unwrap();
        assert!(vel.0.x > 0.0 && vel.0.y.abs() < 1e-9);
    }

    let mut lost = Vec::new();
    let mut buffer = Vec::new();
    for _ in 0..240 {
        systems::seekers::run(&mut fx.world, &mut fx.sector, &grid, &mut fx.bus, 1.0 / 60.0, &mut lost, &mut buffer);
        if fx.world.query::<&HeatSeeker>().iter().count() == 0 {
            break;
        }
    }
    assert_eq!(fx.world.query::<&HeatSeeker>().iter().count(), 0);
    let after = fx.sector.get(target).map_or(0.0, |t| t.blocks().map(|b| b.hp).sum());
    assert!(after < before, "seeker never connected");
}

#[test]
fn test_seeker_retargets_when_its_target_dies() {
    let mut fx = Fixture::new();
    let player = fx.spawn_player(DVec2::ZERO);
    let first = fx.spawn("scout", Faction::Enemy, DVec2::new(0.0, -600.0));
    let mut grid = ShipGrid::default();
    grid.sync(&fx.sector);
    let entity = systems::seekers::launch(&mut fx.world, &fx.sector, &grid, &test_seeker(player, DVec2::ZERO), &mut fx.rng)
        .unwrap();

    destroy_entity(&mut fx.sector, &mut fx.bus, first, DestructionCause::Projectile);
    let second = fx.spawn("scout", Faction::Enemy, DVec2::new(500.0, 0.0));
    grid.sync(&fx.sector);

    let mut lost = Vec::new();
    let mut buffer = Vec::new();
    systems::seekers::run(&mut fx.world, &mut fx.sector, &grid, &mut fx.bus, 0.1, &mut lost, &mut buffer);
    let seeker = *fx.world.get::<&HeatSeeker>(entity).unwrap();
    assert_eq!(seeker.target, Some(second));
    assert!((seeker.ttl - 2.05).abs() < 1e-9);

    // With nobody left to chase it fizzles.
    destroy_entity(&mut fx.sector, &mut fx.bus, second, DestructionCause::Projectile);
    grid.sync(&fx.sector);
    systems::seekers::run(&mut fx.world, &mut fx.sector, &grid, &mut fx.bus, 0.1, &mut lost, &mut buffer);
    assert_eq!(fx.world.query::<&HeatSeeker>().iter().count(), 0);
}

// ---- Collisions ----

fn run_collisions(fx: &mut Fixture) -> Vec<LostBlock> {
    let mut lost = Vec::new();
    systems::collision::run(&mut fx.sector, &mut fx.bus, &mut lost);
    lost
}

fn colliding(fx: &Fixture, id: ObjectId) -> bool {
    fx.sector.get(id).unwrap().systems().unwrap().colliding
}

#[test]
fn test_overlapping_ships_collide_and_separate() {
    let mut fx = Fixture::new();
    let a = fx.spawn("scout", Faction::Enemy, DVec2::ZERO);
    let b = fx.spawn("scout", Faction::Enemy, DVec2::new(10.0, 0.0));
    let (hp_a, hp_b) = (fx.total_hp(a), fx.total_hp(b));
    run_collisions(&mut fx);

    assert!(colliding(&fx, a));
    assert!(colliding(&fx, b));
    let pa = fx.sector.get(a).unwrap().transform.position;
    let pb = fx.sector.get(b).unwrap().transform.position;
    assert!(pb.x - pa.x > 10.0, "objects were not pushed apart");
    // At rest: contact, but no ramming damage.
    assert_eq!(fx.total_hp(a), hp_a);
    assert_eq!(fx.total_hp(b), hp_b);
    assert!(fx.sector.indices_consistent());
}

#[test]
fn test_fast_contact_deals_ramming_damage() {
    let mut fx = Fixture::new();
    let a = fx.spawn("scout", Faction::Enemy, DVec2::ZERO);
    let b = fx.spawn("scout", Faction::Enemy, DVec2::new(10.0, 0.0));
    fx.sector.get_mut(a).unwrap().transform.velocity = DVec2::new(150.0, 0.0);
    fx.sector.get_mut(b).unwrap().transform.velocity = DVec2::new(-150.0, 0.0);
    let (hp_a, hp_b) = (fx.total_hp(a), fx.total_hp(b));
    run_collisions(&mut fx);

    assert!(fx.total_hp(a) < hp_a);
    assert!(fx.total_hp(b) < hp_b);
    // The bounce takes out most of the closing speed.
    let va = fx.sector.get(a).unwrap().transform.velocity;
    let vb = fx.sector.get(b).unwrap().transform.velocity;
    assert!(va.x - vb.x < 150.0);
}

#[test]
fn test_collision_flags_clear_once_apart() {
    let mut fx = Fixture::new();
    let a = fx.spawn("scout", Faction::Enemy, DVec2::ZERO);
    let b = fx.spawn("scout", Faction::Enemy, DVec2::new(10.0, 0.0));
    run_collisions(&mut fx);
    assert!(colliding(&fx, a));
    fx.sector.get_mut(b).unwrap().transform.position = DVec2::new(2000.0, 0.0);
    fx.sector.sync_object(b);
    run_collisions(&mut fx);
    assert!(!colliding(&fx, a));
    assert!(!colliding(&fx, b));
}

#[test]
fn test_asteroids_do_not_collide_with_each_other() {
    let mut fx = Fixture::new();
    let rock = fx.catalog.get("rock0").unwrap();
    let mut rocks = Vec::new();
    for x in [0.0, 10.0] {
        let id = fx
            .sector
            .create_asteroid(hullbreak_core::types::Transform::at(DVec2::new(x, 0.0)));
        fx.sector.place_block(id, GridCoord::ORIGIN, rock.clone(), 0.0).unwrap();
        rocks.push(id);
    }
    run_collisions(&mut fx);
    assert_eq!(fx.sector.get(rocks[0]).unwrap().transform.position, DVec2::ZERO);
    assert_eq!(fx.sector.get(rocks[1]).unwrap().transform.position, DVec2::new(10.0, 0.0));
}

#[test]
fn test_station_holds_position_when_rammed() {
    let mut fx = Fixture::new();
    let spawn = ShipSpawn::new("station", Faction::Enemy, DVec2::ZERO).with_flags(ShipFlags {
        behavior: BehaviorKind::Siege,
        ..Default::default()
    });
    let station = spawn_ship(&mut fx.sector, &fx.catalog, &fx.blueprints, &spawn).unwrap();
    let scout = fx.spawn("scout", Faction::Player, DVec2::new(100.0, 0.0));
    assert!(fx.sector.get(station).unwrap().is_immovable());
    run_collisions(&mut fx);
    assert_eq!(fx.sector.get(station).unwrap().transform.position, DVec2::ZERO);
    assert!(fx.sector.get(scout).unwrap().transform.position.x > 100.0);
}

#[test]
fn test_rammer_breaks_off_after_contact() {
    let mut engine = started_engine(42);
    let player = engine.player().unwrap();
    let spawn = ShipSpawn::new("rammer", Faction::Enemy, DVec2::new(40.0, 0.0)).with_flags(ShipFlags {
        behavior: BehaviorKind::Ramming,
        ..Default::default()
    });
    let rammer = engine.spawn_test_ship(&spawn).unwrap();
    engine
        .ai_mut()
        .get_mut(rammer)
        .unwrap()
        .set_state(AiState::attack(player));

    engine.tick();
    assert!(engine.sector().get(rammer).unwrap().systems().unwrap().colliding);
    engine.tick();
    assert!(matches!(
        engine.ai().get(rammer).unwrap().state(),
        AiState::Attack {
            phase: RamPhase::Orbiting,
            ..
        }
    ));
}

#[test]
fn test_collisions_can_be_disabled() {
    let mut engine = SimulationEngine::new(SimConfig {
        world: WorldSettings {
            collisions_enabled: false,
            ..Default::default()
        },
        ..Default::default()
    })
    .unwrap();
    engine.queue_command(PlayerCommand::StartMission);
    engine.tick();
    let spawn = ShipSpawn::new("scout", Faction::Enemy, DVec2::new(10.0, 0.0));
    let scout = engine.spawn_test_ship(&spawn).unwrap();
    engine.tick();
    assert!(!engine.sector().get(scout).unwrap().systems().unwrap().colliding);
}

// ---- Pickups ----

#[test]
fn test_currency_drops_from_enemy_blocks_only() {
    let mut fx = Fixture::new();
    let lost = vec![
        LostBlock {
            owner: ObjectId(1),
            faction: Faction::Enemy,
            position: DVec2::new(100.0, 0.0),
            cost: 10,
        },
        LostBlock {
            owner: ObjectId(2),
            faction: Faction::Player,
            position: DVec2::ZERO,
            cost: 10,
        },
        LostBlock {
            owner: ObjectId(3),
            faction: Faction::Enemy,
            position: DVec2::ZERO,
            cost: 0,
        },
    ];
    systems::pickups::drop_currency(&mut fx.world, &mut fx.bus, &lost, Faction::Player);
    assert_eq!(fx.pickups(), 1);
}

#[test]
fn test_player_collects_nearby_pickups() {
    let mut fx = Fixture::new();
    let player = fx.spawn_player(DVec2::ZERO);
    systems::pickups::spawn_pickup(
        &mut fx.world,
        &mut fx.bus,
        PickupKind::Currency,
        DVec2::new(50.0, 0.0),
        15,
        Some(30.0),
    );
    systems::pickups::spawn_pickup(
        &mut fx.world,
        &mut fx.bus,
        PickupKind::Currency,
        DVec2::new(5000.0, 0.0),
        15,
        Some(30.0),
    );
    let mut despawn = Vec::new();
    let collected = systems::pickups::run(&mut fx.world, &fx.sector, &mut fx.bus, 1.0 / 60.0, Some(player), &mut despawn);
    assert_eq!(collected, 15);
    assert_eq!(fx.pickups(), 1);
    assert!(fx.bus.pending().iter().any(|e| matches!(
        e,
        GameEvent::PickupCollected { kind: PickupKind::Currency, collector } if *collector == player
    )));
}

#[test]
fn test_timed_pickups_expire() {
    let mut fx = Fixture::new();
    systems::pickups::spawn_pickup(&mut fx.world, &mut fx.bus, PickupKind::Currency, DVec2::ZERO, 5, Some(1.0));
    systems::pickups::spawn_pickup(&mut fx.world, &mut fx.bus, PickupKind::Currency, DVec2::ZERO, 5, None);
    let mut despawn = Vec::new();
    for _ in 0..2 {
        systems::pickups::run(&mut fx.world, &fx.sector, &mut fx.bus, 0.6, None, &mut despawn);
    }
    assert_eq!(fx.pickups(), 1);
}

// ---- Incidents ----

#[test]
fn test_black_hole_pulls_ships() {
    let mut fx = Fixture::new();
    let ship = fx.spawn("scout", Faction::Enemy, DVec2::new(1000.0, 0.0));
    let far = fx.spawn("scout", Faction::Enemy, DVec2::new(4000.0, 0.0));
    let mut incidents = IncidentOrchestrator::new(IncidentRegistry::builtin());
    let id = incidents
        .trigger(BLACK_HOLE, &IncidentOptions::at(DVec2::ZERO), None, &mut fx.ctx())
        .unwrap();
    assert!(id.starts_with(BLACK_HOLE));

    incidents.update(1.0, &mut fx.ctx());
    let v = fx.sector.get(ship).unwrap().transform.velocity;
    assert!((v.x + 120.0 * 0.6).abs() < 1e-9, "pulled toward center, got {v:?}");
    assert_eq!(fx.sector.get(far).unwrap().transform.velocity, DVec2::ZERO);
}

#[test]
fn test_timed_incident_completes_and_removes_hazard() {
    let mut fx = Fixture::new();
    let mut incidents = IncidentOrchestrator::new(IncidentRegistry::builtin());
    incidents.trigger(BLACK_HOLE, &IncidentOptions::default(), None, &mut fx.ctx());
    assert_eq!(fx.world.len(), 1);

    for _ in 0..180 {
        incidents.update(1.0, &mut fx.ctx());
    }
    assert_eq!(incidents.active_count(), 0);
    assert_eq!(incidents.completed_count(), 1);
    assert_eq!(fx.world.len(), 0);
    assert!(fx
        .bus
        .pending()
        .iter()
        .any(|e| matches!(e, GameEvent::IncidentCompleted { .. })));
}

#[test]
fn test_healing_beacon_caps_at_armor() {
    let mut fx = Fixture::new();
    let player = fx.spawn_player(DVec2::ZERO);
    let enemy = fx.spawn("scout", Faction::Enemy, DVec2::new(200.0, 0.0));
    for id in [player, enemy] {
        let block = fx.sector.get_mut(id).unwrap().block_at_mut(GridCoord::ORIGIN).unwrap();
        block.hp -= 10.0;
    }

    let mut incidents = IncidentOrchestrator::new(IncidentRegistry::builtin());
    incidents.trigger(HEALING_BEACON, &IncidentOptions::at(DVec2::ZERO), None, &mut fx.ctx());
    incidents.update(1.0, &mut fx.ctx());
    let cockpit = fx.sector.get(player).unwrap().block_at(GridCoord::ORIGIN).unwrap();
    assert!((cockpit.hp - (cockpit.max_hp() - 5.0)).abs() < 1e-9);

    for _ in 0..5 {
        incidents.update(1.0, &mut fx.ctx());
    }
    let cockpit = fx.sector.get(player).unwrap().block_at(GridCoord::ORIGIN).unwrap();
    assert_eq!(cockpit.hp, cockpit.max_hp());
    let enemy_cockpit = fx.sector.get(enemy).unwrap().block_at(GridCoord::ORIGIN).unwrap();
    assert_eq!(enemy_cockpit.hp, enemy_cockpit.max_hp() - 10.0);
}

#[test]
fn test_quantum_boom_completes_on_attractor_pickup() {
    let mut fx = Fixture::new();
    let player = fx.spawn_player(DVec2::ZERO);
    let mut incidents = IncidentOrchestrator::new(IncidentRegistry::builtin());
    incidents.trigger(QUANTUM_BOOM, &IncidentOptions::at(DVec2::ZERO), None, &mut fx.ctx());
    assert_eq!(fx.pickups(), 25);

    incidents.update(1.0, &mut fx.ctx());
    assert_eq!(incidents.active_count(), 1);

    incidents.handle_event(&GameEvent::PickupCollected {
        kind: PickupKind::QuantumAttractor,
        collector: player,
    });
    incidents.update(1.0, &mut fx.ctx());
    assert_eq!(incidents.active_count(), 0);
    assert_eq!(incidents.completed_count(), 1);
}

#[test]
fn test_unknown_incident_is_ignored() {
    let mut fx = Fixture::new();
    let mut incidents = IncidentOrchestrator::new(IncidentRegistry::builtin());
    assert!(incidents
        .trigger("meteor-shower", &IncidentOptions::default(), None, &mut fx.ctx())
        .is_none());
    assert_eq!(incidents.active_count(), 0);
}

#[test]
fn test_clearing_incidents_by_wave() {
    let mut fx = Fixture::new();
    let mut incidents = IncidentOrchestrator::new(IncidentRegistry::builtin());
    incidents.trigger(BLACK_HOLE, &IncidentOptions::default(), Some(0), &mut fx.ctx());
    incidents.trigger(HEALING_BEACON, &IncidentOptions::default(), Some(1), &mut fx.ctx());
    incidents.clear(Some(0), &mut fx.ctx());
    assert_eq!(incidents.active_count(), 1);
    assert!(incidents.active_ids()[0].starts_with(HEALING_BEACON));
    incidents.destroy(&mut fx.ctx());
    assert_eq!(incidents.active_count(), 0);
    assert_eq!(fx.world.len(), 0);
    assert_eq!(incidents.completed_count(), 0);
}

// ---- Formations ----

#[test]
fn test_formation_torn_down_when_leader_dies() {
    let mut engine = started_engine(42);
    let entry = small_wedge_formation("fighter", ["scout", "scout"], FormationAffixes::default(), 300.0);
    // Outside the followers' wake radius from the player, inside the cull radius.
    let ids = engine
        .spawn_test_formation(&entry, Faction::Enemy, DVec2::new(4200.0, 0.0))
        .unwrap();
    assert_eq!(ids.len(), 3);
    let (leader, followers) = (ids[0], ids[1..].to_vec());
    engine.tick();
    assert_eq!(engine.ai().formations().len(), 1);
    for id in &followers {
        let controller = engine.ai().get(*id).unwrap();
        assert!(controller.formation_id().is_some());
        assert_eq!(controller.state().kind(), AiStateKind::Formation);
    }

    assert!(engine.destroy_test_object(leader, DestructionCause::Projectile));
    engine.tick();

    assert!(engine.ai().formations().is_empty());
    assert!(!engine.ai().contains(leader));
    for id in &followers {
        let controller = engine.ai().get(*id).unwrap();
        assert_eq!(controller.formation_id(), None);
        assert_eq!(controller.state().kind(), AiStateKind::Patrol);
    }
}

#[test]
fn test_formation_with_unknown_follower_spawns_nothing() {
    let mut fx = Fixture::new();
    let entry = small_wedge_formation("fighter", ["scout", "nope"], FormationAffixes::default(), 300.0);
    assert!(spawn_formation(&mut fx.ctx(), &entry, Faction::Enemy, 0.0, 0.0).is_err());
    assert!(fx.sector.is_empty());
    assert!(fx.ai.formations().is_empty());
    assert_eq!(fx.ai.count(), 0);
}

// ---- Culling ----

#[test]
fn test_far_enemies_are_culled_once() {
    let mut fx = Fixture::new();
    let player = fx.spawn_player(DVec2::ZERO);
    let near = fx.spawn("scout", Faction::Enemy, DVec2::new(1000.0, 0.0));
    let far = fx.spawn("scout", Faction::Enemy, DVec2::new(6000.0, 0.0));
    let mut grid = ShipGrid::default();
    grid.sync(&fx.sector);
    let mut culling = GlobalEnemyCulling::new(5000.0, 3000.0, 100);

    let culled = culling.update(1.0, &mut fx.sector, &grid, &mut fx.bus, Some(player));
    assert_eq!(culled, vec![far]);
    assert!(fx.sector.contains(near));

    grid.sync(&fx.sector);
    let again = culling.update(1.0, &mut fx.sector, &grid, &mut fx.bus, Some(player));
    assert!(again.is_empty());
}

#[test]
fn test_enemy_cap_culls_farthest_first() {
    let mut fx = Fixture::new();
    let player = fx.spawn_player(DVec2::ZERO);
    let ids: Vec<ObjectId> = (1..=5)
        .map(|i| fx.spawn("scout", Faction::Enemy, DVec2::new(500.0 * i as f64, 0.0)))
        .collect();
    let mut grid = ShipGrid::default();
    grid.sync(&fx.sector);
    let mut culling = GlobalEnemyCulling::new(5000.0, 3000.0, 2);

    let mut culled = culling.update(1.0, &mut fx.sector, &grid, &mut fx.bus, Some(player));
    culled.sort();
    assert_eq!(culled, ids[2..].to_vec());
    assert!(fx.sector.contains(player));
    assert!(fx.bus.pending().iter().all(|e| matches!(
        e,
        GameEvent::EntityDestroyed { cause: DestructionCause::Replaced, .. }
    )));
}

#[test]
fn test_uncullable_ships_survive() {
    let mut fx = Fixture::new();
    let player = fx.spawn_player(DVec2::ZERO);
    let spawn = ShipSpawn::new("scout", Faction::Enemy, DVec2::new(7000.0, 0.0)).with_flags(ShipFlags {
        uncullable: true,
        ..Default::default()
    });
    let id = spawn_ai_ship(&mut fx.ctx(), &spawn).unwrap();
    let mut grid = ShipGrid::default();
    grid.sync(&fx.sector);
    let mut culling = GlobalEnemyCulling::new(5000.0, 3000.0, 0);
    assert!(culling.update(1.0, &mut fx.sector, &grid, &mut fx.bus, Some(player)).is_empty());
    assert!(fx.sector.contains(id));
}

// ---- Spatial index ----

proptest! {
    #[test]
    fn prop_grid_finds_inserted_blocks(
        points in proptest::collection::vec((-5000.0f64..5000.0, -5000.0f64..5000.0), 1..40),
    ) {
        let mut index = BlockToObjectIndex::new();
        let mut grid = Grid::new(256.0);
        let mut placed = Vec::new();
        for (i, (x, y)) in points.iter().enumerate() {
            let handle = index.register_block(ObjectId(1), GridCoord::new(i as i32, 0));
            let position = DVec2::new(*x, *y);
            grid.insert(handle, position);
            placed.push((handle, position));
        }
        prop_assert_eq!(grid.len(), points.len());
        for (handle, position) in &placed {
            prop_assert!(grid.blocks_near(*position).contains(handle));
        }
        for (handle, _) in &placed {
            prop_assert!(grid.remove(*handle));
        }
        prop_assert!(grid.is_empty());
    }

    #[test]
    fn prop_moved_blocks_leave_old_cells(
        (x0, y0) in (-5000.0f64..5000.0, -5000.0f64..5000.0),
        (x1, y1) in (-5000.0f64..5000.0, -5000.0f64..5000.0),
    ) {
        let mut index = BlockToObjectIndex::new();
        let mut grid = Grid::new(256.0);
        let handle = index.register_block(ObjectId(1), GridCoord::ORIGIN);
        let from = DVec2::new(x0, y0);
        let to = DVec2::new(x1, y1);
        grid.insert(handle, from);
        grid.update(handle, to);
        prop_assert_eq!(grid.len(), 1);
        prop_assert!(grid.blocks_near(to).contains(&handle));
        if from.distance(to) > 256.0 * 3.0 {
            prop_assert!(!grid.blocks_near(from).contains(&handle));
        }
    }

    #[test]
    fn prop_index_resolves_only_live_blocks(
        ops in proptest::collection::vec((any::<bool>(), 0u32..4, any::<prop::sample::Index>()), 1..80),
    ) {
        let mut index = BlockToObjectIndex::new();
        let mut live: Vec<(crate::block_index::BlockHandle, ObjectId)> = Vec::new();
        let mut dead = Vec::new();
        for (n, (insert, owner, pick)) in ops.into_iter().enumerate() {
            if insert || live.is_empty() {
                let object = ObjectId(owner);
                let handle = index.register_block(object, GridCoord::new(n as i32, 0));
                live.push((handle, object));
            } else {
                let (handle, object) = live.swap_remove(pick.index(live.len()));
                prop_assert_eq!(index.unregister_block(handle).map(|r| r.object), Some(object));
                dead.push(handle);
            }
        }
        prop_assert_eq!(index.len(), live.len());
        for (handle, object) in &live {
            prop_assert_eq!(index.get_object(*handle), Some(*object));
        }
        for handle in &dead {
            prop_assert!(!index.contains(*handle));
        }
    }
    #[test]
    fn prop_visible_objects_match_block_cells(
        objects in proptest::collection::vec(
            ((-3000.0f64..3000.0, -3000.0f64..3000.0), 1usize..5),
            1..12,
        ),
        (cx, cy, w, h) in (-2000.0f64..2000.0, -2000.0f64..2000.0, 10.0f64..2500.0, 10.0f64..2500.0),
    ) {
        let catalog = BlockCatalog::standard();
        let rock = catalog.get("rock0").unwrap();
        let mut sector = Sector::new(256.0);
        for ((x, y), blocks) in &objects {
            let id = sector.create_asteroid(hullbreak_core::types::Transform::at(DVec2::new(*x, *y)));
            for n in 0..*blocks {
                sector.place_block(id, GridCoord::new(n as i32, 0), rock.clone(), 0.0).unwrap();
            }
        }
        let viewport = Rect::centered(DVec2::new(cx, cy), w, h);
        let culling = CompositeBlockObjectCullingSystem::default();
        let visible = culling.visible_objects(&sector, &viewport);

        let mut unique = visible.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(unique.len(), visible.len());

        let size = sector.grid().cell_size();
        let cell_hits = |p: DVec2| {
            let (bx, by) = ((p.x / size).floor(), (p.y / size).floor());
            bx * size <= viewport.max.x
                && (bx + 1.0) * size > viewport.min.x
                && by * size <= viewport.max.y
                && (by + 1.0) * size > viewport.min.y
        };
        for object in sector.objects() {
            let expected = object
                .blocks()
                .any(|b| cell_hits(object.block_world_position(b.coord)));
            prop_assert_eq!(visible.contains(&object.id), expected, "object {}", object.id);
        }
    }

    #[test]
    fn prop_area_query_returns_every_block_once(
        points in proptest::collection::vec((-5000.0f64..5000.0, -5000.0f64..5000.0), 1..60),
    ) {
        let mut index = BlockToObjectIndex::new();
        let mut grid = Grid::new(256.0);
        let (mut min, mut max) = (DVec2::splat(f64::MAX), DVec2::splat(f64::MIN));
        for (i, (x, y)) in points.iter().enumerate() {
            let handle = index.register_block(ObjectId(i as u32), GridCoord::ORIGIN);
            let position = DVec2::new(*x, *y);
            grid.insert(handle, position);
            min = min.min(position);
            max = max.max(position);
        }

        let mut by_area = grid.blocks_in_area(min.x, min.y, max.x, max.y);
        prop_assert_eq!(by_area.len(), points.len());
        by_area.sort();
        by_area.dedup();
        prop_assert_eq!(by_area.len(), points.len());

        let by_rect = grid.blocks_in_rect(&Rect { min, max });
        prop_assert_eq!(by_rect.len(), points.len());
        for handle in &by_rect {
            prop_assert!(by_area.binary_search(handle).is_ok());
        }
    }
}
