//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Blocks ---

/// Edge length of one block in world units.
pub const BLOCK_SIZE: f64 = 32.0;

/// Mass assigned to a block type that does not declare one.
pub const DEFAULT_BLOCK_MASS: f64 = 10.0;

/// Delay after a block object is destroyed before its visuals expire (seconds).
pub const VISUAL_EXPIRY_SECS: f64 = 2.0;

// --- Spatial indices ---

/// Default block grid cell size in world units.
pub const GRID_CELL_SIZE: f64 = 256.0;

/// Cell size of the per-faction ship grid.
pub const SHIP_GRID_CELL_SIZE: f64 = 3000.0;

/// Hard cap on DDA steps when walking a ray through the block grid.
pub const RAY_MAX_STEPS: usize = 500;

// --- Culling ---

/// Margin around the viewport for AI activation scoping.
pub const NEARBY_MARGIN: f64 = 2000.0;

/// Below this many ships every AI ship is considered active.
pub const ACTIVE_AI_ALL_THRESHOLD: usize = 20;

/// Interval between global enemy culling passes (seconds).
pub const CULL_INTERVAL_SECS: f64 = 0.01;

// --- Energy & shields ---

/// Delay after spending energy before recharge resumes (seconds).
pub const ENERGY_RECHARGE_DELAY_SECS: f64 = 0.25;

/// Recharge rate used when no block declares one (energy/s).
pub const DEFAULT_ENERGY_RECHARGE: f64 = 10.0;

/// Floor applied to shield efficiency when converting damage to energy cost.
pub const MIN_SHIELD_EFFICIENCY: f64 = 0.001;

// --- Weapons ---

/// Projectile speed used when a turret does not declare one.
pub const DEFAULT_PROJECTILE_SPEED: f64 = 300.0;

/// Projectile lifetime used when a turret does not declare one (seconds).
pub const DEFAULT_PROJECTILE_LIFETIME: f64 = 2.0;

/// Accuracy used when a turret does not declare one (1.0 = no spread).
pub const DEFAULT_PROJECTILE_ACCURACY: f64 = 1.0;

/// Maximum spread half-angle at accuracy 0 (radians).
pub const MAX_PROJECTILE_SPREAD: f64 = std::f64::consts::PI / 8.0;

/// Radius of a projectile for block hit tests.
pub const PROJECTILE_HIT_RADIUS: f64 = 15.0;

/// Minimum energy on hand before the laser may fire.
pub const LASER_MIN_ENERGY: f64 = 25.0;

/// Turret shots between two fire sounds.
pub const TURRET_SOUND_FRAME_INTERVAL: u32 = 5;

/// Reach of a laser beam from its block.
pub const LASER_BEAM_LENGTH: f64 = 2000.0;

/// Energy per laser block per tick of firing.
pub const LASER_ENERGY_PER_BLOCK: f64 = 0.25;

/// Distance from a foreign block at which a lance sticks or a seeker bursts.
pub const ORDNANCE_CONTACT_RADIUS: f64 = 32.0;

/// Lance flight speed when the block does not declare one.
pub const DEFAULT_LANCE_SPEED: f64 = 300.0;

/// Lance flight time when the block does not declare one (seconds).
pub const DEFAULT_LANCE_LIFETIME: f64 = 1.5;

/// Seconds a stuck lance waits before it explodes, when not declared.
pub const DEFAULT_LANCE_DETONATION_DELAY: f64 = 1.5;

/// Heat seeker launch speed when the block does not declare one.
pub const DEFAULT_SEEKER_SPEED: f64 = 250.0;

/// Heat seeker flight time when the block does not declare one (seconds).
pub const DEFAULT_SEEKER_LIFETIME: f64 = 4.0;

/// Heat seeker lock-on range when the block does not declare one.
pub const DEFAULT_SEEKER_RANGE: f64 = 1000.0;

/// A seeker's speed at the end of its life, as a multiple of launch speed.
pub const SEEKER_SPEED_GROWTH: f64 = 1.8;

/// A seeker's turning power at the end of its life, as a multiple of launch.
pub const SEEKER_TURNING_GROWTH: f64 = 3.0;

/// Scale on declared turning power, offsetting the cached target position.
pub const SEEKER_TURNING_COMPENSATION: f64 = 1.3;

/// Ticks between refreshes of a seeker's cached target position.
pub const SEEKER_TARGET_REFRESH_TICKS: u32 = 10;

/// Distance at which a ship picks up a world pickup.
pub const PICKUP_COLLECT_RADIUS: f64 = 64.0;

/// Seconds an uncollected pickup stays in the world.
pub const PICKUP_LIFETIME_SECS: f64 = 30.0;

// --- Movement ---

/// Reference mass for acceleration scaling.
pub const BASE_MASS: f64 = 100.0;

/// Thrust every hull gets before engines are counted.
pub const BASE_THRUST: f64 = 16.0;

/// Forward thrust applied without any engine blocks.
pub const FALLBACK_THRUST_POWER: f64 = 10.0;

/// Thrust of an engine block that does not declare one.
pub const DEFAULT_ENGINE_THRUST: f64 = 5.0;

/// Max speed per unit of thrust power.
pub const THRUST_TO_SPEED: f64 = 1.5;

/// Exponent applied to the mass ratio when scaling acceleration.
pub const MASS_SCALE_EXPONENT: f64 = 0.65;

/// Angular velocity decay per tick when not turning.
pub const ANGULAR_FRICTION: f64 = 0.99;

// --- Collisions ---

/// Overlap depth tolerated before two objects are pushed apart.
pub const COLLISION_PENETRATION_SLOP: f64 = 4.0;

/// Share of the separation vector resolved per tick.
pub const COLLISION_CORRECTION_RATIO: f64 = 0.4;

/// Bounce of a collision impulse; 0 is fully inelastic.
pub const COLLISION_RESTITUTION: f64 = 0.2;

/// Impulses below this are dropped.
pub const COLLISION_IMPULSE_EPSILON: f64 = 0.05;

/// Closing speed is clamped to this before computing the impulse.
pub const COLLISION_MAX_CLOSING_SPEED: f64 = 200.0;

/// Velocity kept by a movable object after an impulse.
pub const COLLISION_DAMPING: f64 = 0.95;

/// Relative speed below which a collision deals no damage.
pub const RAM_MIN_DAMAGE_SPEED: f64 = 100.0;

/// Relative speed at which ramming damage stops growing.
pub const RAM_SOFT_CAP_SPEED: f64 = 1500.0;

/// Base ramming damage per overlapping block pair at the soft cap.
pub const RAM_MAX_DAMAGE: f64 = 50.0;

/// Curve of ramming damage over the normalized speed.
pub const RAM_DAMAGE_EXPONENT: f64 = 1.35;

// --- AI ---

/// Patrol: distance to the patrol point counted as arrived.
pub const PATROL_ARRIVAL_RADIUS: f64 = 100.0;

/// Patrol: time spent idling at a patrol point (seconds).
pub const PATROL_DWELL_SECS: f64 = 4.0;

/// Patrol: farthest a new patrol point may be from the ship.
pub const PATROL_MAX_RADIUS: f64 = 6000.0;

/// Patrol: distance kept from the world edge.
pub const PATROL_EDGE_MARGIN: f64 = 1000.0;

/// Patrol/Idle: radius in which enemies wake the ship.
pub const WAKE_RADIUS: f64 = 3400.0;

/// Seek: range at which a seeker starts its attack.
pub const ENGAGEMENT_RANGE: f64 = 1200.0;

/// Attack: range beyond which the attacker goes back to seeking.
pub const DISENGAGE_RANGE: f64 = 1400.0;

/// Attack: preferred orbit radius around the target.
pub const ORBIT_RADIUS: f64 = 300.0;

/// Attack: projectile speed assumed when leading a target.
pub const LEAD_PROJECTILE_SPEED: f64 = 400.0;

/// Attack (ram): time spent orbiting after a collision (seconds).
pub const RAM_ORBIT_DURATION_SECS: f64 = 10.0;

/// Formation attack: range beyond which followers break off.
pub const FORMATION_DISENGAGE_RANGE: f64 = 1800.0;

/// Station: range beyond which a station stops firing.
pub const STATION_ATTACK_RANGE: f64 = 1600.0;

/// Steering: closer than this the ship brakes instead of thrusting.
pub const STEER_ARRIVAL_RADIUS: f64 = 100.0;

/// Steering: closing speed above which the ship brakes on arrival.
pub const STEER_BRAKE_SPEED: f64 = 10.0;

/// Steering: thrust is allowed when aligned within this angle (radians).
pub const STEER_ALIGN_TOLERANCE: f64 = 0.15;

/// Steering: rotation dead band (radians).
pub const STEER_TURN_TOLERANCE: f64 = 0.05;

/// Steering: orbit radius error tolerated before correcting.
pub const ORBIT_RADIUS_TOLERANCE: f64 = 20.0;

// --- Formations ---

/// Default spacing between formation slots.
pub const FORMATION_DEFAULT_DISTANCE: f64 = 1000.0;

/// Random jitter applied to a formation's spawn origin.
pub const FORMATION_SPAWN_JITTER: f64 = 4000.0;

// --- Waves ---

/// Delay before the first wave (seconds).
pub const WAVE_INITIAL_DELAY_SECS: f64 = 10.0;

/// Duration of a wave that does not declare one (seconds).
pub const WAVE_DEFAULT_INTERVAL_SECS: f64 = 120.0;

/// Half-extent of the square around the origin kept clear by "outer" spawns.
pub const SPAWN_FORBIDDEN_HALF_EXTENT: f64 = 1000.0;

/// Inner radius of the ring used by "around player" spawns.
pub const SPAWN_PLAYER_RING_MIN: f64 = 2600.0;

/// Width of the ring used by "around player" spawns.
pub const SPAWN_PLAYER_RING_WIDTH: f64 = 1200.0;

/// Padding from the world edge used by the "outer" fallback.
pub const SPAWN_OUTER_FALLBACK_PADDING: f64 = 200.0;

/// Rejection-sampling attempts before falling back.
pub const SPAWN_MAX_ATTEMPTS: usize = 10;

// --- Incidents ---

/// Lifetime of timed incidents such as black holes (seconds).
pub const INCIDENT_TIMED_LIFETIME_SECS: f64 = 180.0;

/// Ring radius of quantum boom pickups.
pub const QUANTUM_BOOM_RADIUS: f64 = 3000.0;

/// Number of pickups spawned by a quantum boom.
pub const QUANTUM_BOOM_PICKUPS: usize = 24;

/// Radius in which a healing beacon repairs blocks.
pub const HEALING_BEACON_RADIUS: f64 = 800.0;

/// Hit points restored per second by a healing beacon.
pub const HEALING_BEACON_RATE: f64 = 5.0;

/// Radius of the black hole's pull.
pub const BLACK_HOLE_PULL_RADIUS: f64 = 2500.0;

/// Peak pull acceleration of a black hole at its center.
pub const BLACK_HOLE_PULL_STRENGTH: f64 = 120.0;
