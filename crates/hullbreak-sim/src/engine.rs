//! Simulation engine: the core of the game.
//!
//! `SimulationEngine` owns the sector, the hecs world for props, the AI,
//! waves and incidents. It processes player commands, runs every system in a
//! fixed order, and produces `GameStateSnapshot`s. Headless and seeded, so
//! two engines with the same seed and commands produce the same snapshots.

use std::collections::VecDeque;

use glam::DVec2;
use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use hullbreak_core::blocks::BlockCatalog;
use hullbreak_core::commands::PlayerCommand;
use hullbreak_core::config::WorldSettings;
use hullbreak_core::constants::DT;
use hullbreak_core::enums::{DestructionCause, Faction, GamePhase};
use hullbreak_core::events::{EventBus, GameEvent, SoundRequest};
use hullbreak_core::intent::MovementIntent;
use hullbreak_core::state::{GameStateSnapshot, ScoreView};
use hullbreak_core::types::{ObjectId, Rect, SimTime};
use hullbreak_core::Result;

use crate::ai_controller::{AiOrchestrator, AiTick};
use crate::blueprints::ShipBlueprints;
use crate::combat::LostBlock;
use crate::context::SimContext;
use crate::culling::{CompositeBlockObjectCullingSystem, GlobalEnemyCulling};
use crate::incidents::{IncidentOrchestrator, IncidentRegistry};
use crate::projectiles::{spawn_lance, spawn_projectile};
use crate::sector::Sector;
use crate::ship_grid::ShipGrid;
use crate::systems;
use crate::systems::snapshot::TickOutputs;
use crate::waves::{default_mission, WaveExecutor, WaveOrchestrator};
use crate::weapons::{LaserRequest, UtilitySystem, WeaponEffects, WeaponSystem};
use crate::world_setup;

/// Default camera size in world units.
const DEFAULT_VIEWPORT: (f64, f64) = (1920.0, 1080.0);

/// Configuration for starting a new simulation.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Initial time scale (1.0 = normal).
    pub time_scale: f64,
    pub world: WorldSettings,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            time_scale: 1.0,
            world: WorldSettings::default(),
        }
    }
}

/// The simulation engine. Owns the world and all sim state.
pub struct SimulationEngine {
    sector: Sector,
    world: World,
    catalog: BlockCatalog,
    blueprints: ShipBlueprints,
    settings: WorldSettings,
    time: SimTime,
    phase: GamePhase,
    time_scale: f64,
    rng: ChaCha8Rng,
    command_queue: VecDeque<PlayerCommand>,
    despawn_buffer: Vec<hecs::Entity>,
    bus: EventBus,
    /// Events already routed to AI, waves and incidents this tick.
    routed: usize,
    sounds: Vec<SoundRequest>,

    ai: AiOrchestrator,
    ship_grid: ShipGrid,
    object_culling: CompositeBlockObjectCullingSystem,
    enemy_culling: GlobalEnemyCulling,
    waves: WaveOrchestrator,
    incidents: IncidentOrchestrator,

    player: Option<ObjectId>,
    player_movement: MovementIntent,
    player_weapons: WeaponSystem,
    player_utility: UtilitySystem,
    laser_queue: Vec<LaserRequest>,
    lost_blocks: Vec<LostBlock>,
    viewport: Rect,
    /// Set once a viewport command arrives; until then the camera follows the player.
    viewport_pinned: bool,

    kills: u32,
    currency: u32,
}

impl SimulationEngine {
    /// Create a new simulation engine with the given config. Fails on
    /// invalid world settings or a broken built-in blueprint.
    pub fn new(config: SimConfig) -> Result<Self> {
        config.world.validate()?;
        let settings = config.world;
        let mission = if settings.waves.is_empty() {
            default_mission()
        } else {
            settings.waves.clone()
        };
        let mut waves = WaveOrchestrator::new(mission, WaveExecutor::new(settings.world_size));
        waves.scripts_mut().register("boss-defeated", |ctx, _commands| {
            log::info!("boss of wave {:?} defeated", ctx.wave_index.map(|i| i + 1));
        });

        Ok(Self {
            sector: Sector::new(settings.grid_cell_size),
            world: World::new(),
            catalog: BlockCatalog::standard(),
            blueprints: ShipBlueprints::builtin()?,
            time: SimTime::default(),
            phase: GamePhase::default(),
            time_scale: config.time_scale.clamp(0.0, 4.0),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            bus: EventBus::new(),
            routed: 0,
            sounds: Vec::new(),
            ai: AiOrchestrator::with_culling(CompositeBlockObjectCullingSystem::new(settings.nearby_margin)),
            ship_grid: ShipGrid::default(),
            object_culling: CompositeBlockObjectCullingSystem::new(settings.nearby_margin),
            enemy_culling: GlobalEnemyCulling::new(
                settings.cull_radius,
                settings.cull_fetch_padding,
                settings.enemy_cap,
            ),
            waves,
            incidents: IncidentOrchestrator::new(IncidentRegistry::builtin()),
            player: None,
            player_movement: MovementIntent::idle(),
            player_weapons: WeaponSystem::standard(),
            player_utility: UtilitySystem::standard(),
            laser_queue: Vec::new(),
            lost_blocks: Vec::new(),
            viewport: Rect::centered(DVec2::ZERO, DEFAULT_VIEWPORT.0, DEFAULT_VIEWPORT.1),
            viewport_pinned: false,
            kills: 0,
            currency: 0,
            settings,
        })
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> GameStateSnapshot {
        self.process_commands();

        if self.phase == GamePhase::Active {
            let dt = DT * self.time_scale;
            self.run_systems(dt);
            self.time.advance(dt);
        }

        self.route_events();
        let scripted = self.waves.take_script_commands();
        self.command_queue.extend(scripted);

        let events = self.bus.drain();
        self.routed = 0;
        let outputs = TickOutputs {
            visible: self.object_culling.visible_objects(&self.sector, &self.viewport),
            waves: self.waves.view(),
            incidents: self.incidents.active_ids(),
            events,
            sounds: std::mem::take(&mut self.sounds),
            score: ScoreView {
                kills: self.kills,
                waves_cleared: self.waves.waves_cleared(),
                incidents_completed: self.incidents.completed_count(),
                currency: self.currency,
            },
        };
        systems::snapshot::build_snapshot(
            &self.sector,
            &self.world,
            &self.ai,
            &self.time,
            self.phase,
            self.player,
            outputs,
        )
    }

    /// Get the current game phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Get the current time scale.
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Read-only view of every composite object.
    pub fn sector(&self) -> &Sector {
        &self.sector
    }

    /// Read-only view of projectiles, pickups and hazards.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn player(&self) -> Option<ObjectId> {
        self.player
    }

    pub fn ai(&self) -> &AiOrchestrator {
        &self.ai
    }

    pub fn waves(&self) -> &WaveOrchestrator {
        &self.waves
    }

    pub fn incidents(&self) -> &IncidentOrchestrator {
        &self.incidents
    }

    /// Spawn an AI ship directly (for tests).
    #[cfg(test)]
    pub fn spawn_test_ship(&mut self, spawn: &crate::factory::ShipSpawn) -> Result<ObjectId> {
        let (mut ctx, _, _) = self.orchestration();
        crate::factory::spawn_ai_ship(&mut ctx, spawn)
    }

    /// Spawn a formation directly (for tests).
    #[cfg(test)]
    pub fn spawn_test_formation(
        &mut self,
        entry: &hullbreak_core::waves::ShipFormationEntry,
        faction: Faction,
        position: DVec2,
    ) -> Result<Vec<ObjectId>> {
        let (mut ctx, _, _) = self.orchestration();
        crate::factory::spawn_formation(&mut ctx, entry, faction, position.x, position.y)
    }

    /// Destroy an object the way combat would, publishing its event (for tests).
    #[cfg(test)]
    pub fn destroy_test_object(&mut self, id: ObjectId, cause: DestructionCause) -> bool {
        crate::destruction::destroy_entity(&mut self.sector, &mut self.bus, id, cause)
    }

    /// Mutable AI access (for tests).
    #[cfg(test)]
    pub fn ai_mut(&mut self) -> &mut AiOrchestrator {
        &mut self.ai
    }

    /// Trigger an incident directly (for tests).
    #[cfg(test)]
    pub fn trigger_test_incident(
        &mut self,
        script: &str,
        options: &hullbreak_core::waves::IncidentOptions,
    ) -> Option<String> {
        let (mut ctx, _, incidents) = self.orchestration();
        incidents.trigger(script, options, None, &mut ctx)
    }

    /// Mutable sector access (for tests).
    #[cfg(test)]
    pub fn sector_mut(&mut self) -> &mut Sector {
        &mut self.sector
    }

    /// Split the engine into the context handed to waves and incidents.
    fn orchestration(&mut self) -> (SimContext<'_>, &mut WaveOrchestrator, &mut IncidentOrchestrator) {
        let ctx = SimContext {
            sector: &mut self.sector,
            world: &mut self.world,
            catalog: &self.catalog,
            blueprints: &self.blueprints,
            ai: &mut self.ai,
            bus: &mut self.bus,
            rng: &mut self.rng,
            settings: &self.settings,
            player: self.player,
        };
        (ctx, &mut self.waves, &mut self.incidents)
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single player command.
    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::StartMission => {
                if self.phase == GamePhase::Setup {
                    self.start_mission();
                }
            }
            PlayerCommand::Pause => {
                if self.phase == GamePhase::Active {
                    self.phase = GamePhase::Paused;
                    self.waves.pause();
                }
            }
            PlayerCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = GamePhase::Active;
                    self.waves.resume();
                }
            }
            PlayerCommand::SetTimeScale { scale } => {
                self.time_scale = scale.clamp(0.0, 4.0);
            }
            PlayerCommand::SetIntent { intent } => {
                self.player_movement = intent.movement;
                self.player_weapons.set_intent(intent.weapons);
                self.player_utility.set_intent(intent.utility);
            }
            PlayerCommand::SetViewport { viewport } => {
                self.viewport = viewport;
                self.viewport_pinned = true;
            }
            PlayerCommand::SkipToNextWave => {
                let (mut ctx, waves, incidents) = self.orchestration();
                waves.skip_to_next_wave(&mut ctx, incidents);
            }
            PlayerCommand::SpawnTaggedWave { tag, wave } => {
                let (mut ctx, waves, incidents) = self.orchestration();
                waves.spawn_tagged(&tag, &wave, &mut ctx, incidents);
            }
            PlayerCommand::ClearTaggedWave { tag } => {
                self.waves.clear_tagged(&tag, &mut self.sector, &mut self.bus);
            }
        }
    }

    fn start_mission(&mut self) {
        let player = match world_setup::spawn_player(&mut self.sector, &self.catalog, &self.blueprints) {
            Ok(id) => id,
            Err(e) => {
                log::error!("cannot spawn the player ship: {e}");
                return;
            }
        };
        if let Err(e) = world_setup::scatter_asteroids(
            &mut self.sector,
            &self.catalog,
            &mut self.rng,
            world_setup::ASTEROID_COUNT,
            self.settings.half_size(),
        ) {
            log::warn!("asteroid field incomplete: {e}");
        }
        self.player = Some(player);
        self.waves.start();
        self.phase = GamePhase::Active;
        self.time = SimTime::default();
        log::info!("mission started, player is {player}");
    }

    /// Run all systems in order.
    fn run_systems(&mut self, dt: f64) {
        if !self.viewport_pinned {
            if let Some(ship) = self.player.and_then(|id| self.sector.get(id)) {
                self.viewport = Rect::centered(
                    ship.transform.position,
                    DEFAULT_VIEWPORT.0,
                    DEFAULT_VIEWPORT.1,
                );
            }
        }

        // 1. Waves and incidents
        {
            let (mut ctx, waves, incidents) = self.orchestration();
            waves.update(dt, &mut ctx, incidents);
            incidents.update(dt, &mut ctx);
        }
        self.route_events();

        // 2. AI decisions and weapon output
        self.ship_grid.sync(&self.sector);
        let mut fx = WeaponEffects::default();
        let tick = AiTick {
            dt,
            viewport: &self.viewport,
            world_half_size: self.settings.half_size(),
            player: self.player,
            ship_grid: &self.ship_grid,
        };
        let mut intents = self.ai.update(&tick, &mut self.sector, &mut self.rng, &mut fx);

        // 3. Player intent
        if let Some(id) = self.player {
            intents.insert(id, self.player_movement);
            if let Some(ship) = self.sector.get_mut(id) {
                self.player_weapons.update(dt, ship, &mut self.rng, &mut fx);
                self.player_utility.update(dt, ship, &mut fx);
            }
        }
        self.apply_weapon_effects(fx);

        // 4. Movement and contact
        self.lost_blocks.clear();
        systems::movement::run(&mut self.sector, &intents, dt);
        if self.settings.collisions_enabled {
            systems::collision::run(&mut self.sector, &mut self.bus, &mut self.lost_blocks);
        }

        // 5. Energy recharge and shield upkeep
        systems::energy::run(&mut self.sector, &mut self.bus, dt);

        // 6. Projectiles, ordnance and lasers
        systems::projectiles::run(
            &mut self.world,
            &mut self.sector,
            &mut self.bus,
            dt,
            &mut self.lost_blocks,
            &mut self.despawn_buffer,
        );
        systems::lances::run(
            &mut self.world,
            &mut self.sector,
            &mut self.bus,
            dt,
            &mut self.lost_blocks,
            &mut self.despawn_buffer,
        );
        self.ship_grid.sync(&self.sector);
        systems::seekers::run(
            &mut self.world,
            &mut self.sector,
            &self.ship_grid,
            &mut self.bus,
            dt,
            &mut self.lost_blocks,
            &mut self.despawn_buffer,
        );
        systems::lasers::run(
            &mut self.sector,
            &mut self.bus,
            &mut self.laser_queue,
            dt,
            &mut self.lost_blocks,
        );

        // 7. Pickups
        systems::pickups::drop_currency(&mut self.world, &mut self.bus, &self.lost_blocks, Faction::Player);
        self.currency += systems::pickups::run(
            &mut self.world,
            &self.sector,
            &mut self.bus,
            dt,
            self.player,
            &mut self.despawn_buffer,
        );

        // 8. Destruction and cleanup
        self.route_events();
        systems::cleanup::run(&mut self.world, self.settings.half_size(), &mut self.despawn_buffer);

        // 9. Global culling
        self.ship_grid.sync(&self.sector);
        self.enemy_culling
            .update(dt, &mut self.sector, &self.ship_grid, &mut self.bus, self.player);
        self.route_events();

        if self.phase == GamePhase::Active && self.waves.is_finished() {
            log::info!("all waves cleared");
            self.phase = GamePhase::Complete;
        }
    }

    fn apply_weapon_effects(&mut self, fx: WeaponEffects) {
        for spawn in &fx.projectiles {
            spawn_projectile(&mut self.world, spawn, &mut self.rng);
        }
        for spawn in &fx.lances {
            spawn_lance(&mut self.world, spawn, &mut self.rng);
        }
        for spawn in &fx.seekers {
            if systems::seekers::launch(&mut self.world, &self.sector, &self.ship_grid, spawn, &mut self.rng).is_none() {
                log::trace!("seeker from {} found no target", spawn.owner);
            }
        }
        self.laser_queue.extend(fx.lasers);
        self.sounds.extend(fx.sounds);
        for event in fx.events {
            self.bus.publish(event);
        }
    }

    /// Hand newly published events to the AI, waves and incidents.
    fn route_events(&mut self) {
        while let Some(event) = self.bus.pending().get(self.routed).cloned() {
            self.routed += 1;
            self.incidents.handle_event(&event);
            let GameEvent::EntityDestroyed { id, faction, cause, .. } = event else {
                continue;
            };
            self.ai.remove_controllers_for_ship(id);
            self.waves.notify_ship_destroyed(id, cause, &mut self.bus);
            if self.player == Some(id) {
                log::info!("player ship destroyed by {cause:?}");
                self.player = None;
                self.phase = GamePhase::Complete;
            } else if is_kill(faction, cause) {
                self.kills += 1;
            }
        }
    }
}

fn is_kill(faction: Faction, cause: DestructionCause) -> bool {
    !matches!(faction, Faction::Player | Faction::Neutral)
        && matches!(
            cause,
            DestructionCause::Projectile
                | DestructionCause::Laser
                | DestructionCause::Collision
                | DestructionCause::Bomb
                | DestructionCause::ExplosiveLance
                | DestructionCause::HeatSeeker
        )
}
