//! Ship controller finite state machine.
//!
//! States are plain data. `evaluate` reads an `AiContext` describing the
//! ship's surroundings, produces this tick's intent, and names the transition
//! to take. The caller owns applying the transition; nothing here touches
//! the world.

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use hullbreak_core::constants::*;
use hullbreak_core::enums::AttackBehavior;
use hullbreak_core::intent::{MovementIntent, ShipIntent, UtilityIntent, WeaponIntent};
use hullbreak_core::types::{ObjectId, Transform};

use crate::profiles::{BehaviorProfile, InitialState};
use crate::steering::{approach_target, lead_target, orbit_target, Kinematics};

/// Sub-phase of a ramming attack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RamPhase {
    #[default]
    Ramming,
    Orbiting,
}

/// Current behavior of an AI ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AiState {
    Idle,
    Patrol {
        target: Option<DVec2>,
        dwell: f64,
    },
    SeekTarget {
        target: ObjectId,
    },
    Attack {
        target: ObjectId,
        phase: RamPhase,
        phase_timer: f64,
    },
    Formation,
    FormationSeekTarget {
        target: ObjectId,
    },
    FormationAttack {
        target: ObjectId,
    },
    SpaceStationAttack {
        target: ObjectId,
    },
}

/// Identity of a state without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiStateKind {
    Idle,
    Patrol,
    SeekTarget,
    Attack,
    Formation,
    FormationSeekTarget,
    FormationAttack,
    SpaceStationAttack,
}

impl AiState {
    pub fn patrol() -> Self {
        AiState::Patrol {
            target: None,
            dwell: 0.0,
        }
    }

    pub fn seek(target: ObjectId) -> Self {
        AiState::SeekTarget { target }
    }

    pub fn attack(target: ObjectId) -> Self {
        AiState::Attack {
            target,
            phase: RamPhase::Ramming,
            phase_timer: 0.0,
        }
    }

    /// Starting state for a profile.
    pub fn initial_for(profile: &BehaviorProfile) -> Self {
        match profile.initial {
            InitialState::Patrol => AiState::patrol(),
            InitialState::Idle => AiState::Idle,
        }
    }

    pub fn kind(&self) -> AiStateKind {
        match self {
            AiState::Idle => AiStateKind::Idle,
            AiState::Patrol { .. } => AiStateKind::Patrol,
            AiState::SeekTarget { .. } => AiStateKind::SeekTarget,
            AiState::Attack { .. } => AiStateKind::Attack,
            AiState::Formation => AiStateKind::Formation,
            AiState::FormationSeekTarget { .. } => AiStateKind::FormationSeekTarget,
            AiState::FormationAttack { .. } => AiStateKind::FormationAttack,
            AiState::SpaceStationAttack { .. } => AiStateKind::SpaceStationAttack,
        }
    }

    /// The ship this state is focused on, if any.
    pub fn target(&self) -> Option<ObjectId> {
        match self {
            AiState::SeekTarget { target }
            | AiState::Attack { target, .. }
            | AiState::FormationSeekTarget { target }
            | AiState::FormationAttack { target }
            | AiState::SpaceStationAttack { target } => Some(*target),
            AiState::Idle | AiState::Patrol { .. } | AiState::Formation => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self.kind() {
            AiStateKind::Idle => "Idle",
            AiStateKind::Patrol => "Patrol",
            AiStateKind::SeekTarget => "SeekTarget",
            AiStateKind::Attack => "Attack",
            AiStateKind::Formation => "Formation",
            AiStateKind::FormationSeekTarget => "FormationSeekTarget",
            AiStateKind::FormationAttack => "FormationAttack",
            AiStateKind::SpaceStationAttack => "SpaceStationAttack",
        }
    }
}

/// A ship observed by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetInfo {
    pub id: ObjectId,
    pub position: DVec2,
    pub velocity: DVec2,
}

/// The live formation leader as seen by a follower.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeaderInfo {
    pub transform: Transform,
    pub state: AiStateKind,
    pub target: Option<ObjectId>,
}

/// Formation membership as seen by one controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormationView {
    /// Slot offset in the leader's frame; `None` for the leader itself or a
    /// formation that is no longer registered.
    pub offset: Option<DVec2>,
    /// `None` when the leader is destroyed or its controller is gone.
    pub leader: Option<LeaderInfo>,
}

impl FormationView {
    /// World position of this ship's slot.
    pub fn slot(&self) -> Option<DVec2> {
        let leader = self.leader?;
        Some(leader.transform.local_to_world(self.offset?))
    }
}

/// Everything the state machine may read for one ship on one tick.
#[derive(Debug, Clone)]
pub struct AiContext<'a> {
    pub dt: f64,
    pub me: Kinematics,
    pub profile: &'a BehaviorProfile,
    pub hunter: bool,
    pub world_half_size: f64,
    pub shield_active: bool,
    pub colliding: bool,
    pub player: Option<TargetInfo>,
    /// Closest hostile inside the wake radius.
    pub nearest_enemy: Option<TargetInfo>,
    /// The current state's target; `None` when it is destroyed or gone.
    pub target: Option<TargetInfo>,
    /// Present iff the controller carries a formation context.
    pub formation: Option<FormationView>,
}

/// What the controller should do with its state after this tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Stay,
    To(AiState),
    /// Return to the controller's initial state.
    ToInitial,
    /// Make the state both initial and current.
    Rebase(AiState),
    /// Tear down the formation and fall back to patrol.
    FormationLost,
}

/// Output of one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct AiUpdate {
    pub intent: ShipIntent,
    pub transition: Transition,
}

impl AiUpdate {
    fn stay(intent: ShipIntent) -> Self {
        Self {
            intent,
            transition: Transition::Stay,
        }
    }
}

/// Evaluate one tick for one ship. Internal timers of `state` advance in place.
pub fn evaluate<R: Rng + ?Sized>(state: &mut AiState, ctx: &AiContext, rng: &mut R) -> AiUpdate {
    match state {
        AiState::Idle => evaluate_idle(ctx),
        AiState::Patrol { target, dwell } => evaluate_patrol(target, dwell, ctx, rng),
        AiState::SeekTarget { .. } => evaluate_seek(ctx),
        AiState::Attack {
            phase, phase_timer, ..
        } => evaluate_attack(phase, phase_timer, ctx),
        AiState::Formation => evaluate_formation(ctx),
        AiState::FormationSeekTarget { .. } => evaluate_formation_seek(ctx),
        AiState::FormationAttack { .. } => evaluate_formation_attack(ctx),
        AiState::SpaceStationAttack { .. } => evaluate_station_attack(ctx),
    }
}

fn hold_intent(ctx: &AiContext) -> ShipIntent {
    ShipIntent {
        movement: MovementIntent::idle(),
        weapons: WeaponIntent {
            aim_at: ctx.me.position,
            ..Default::default()
        },
        utility: shields(ctx, false),
    }
}

/// Press the toggle only when the shield is not already in the wanted state.
fn shields(ctx: &AiContext, wanted: bool) -> UtilityIntent {
    UtilityIntent {
        toggle_shields: wanted != ctx.shield_active,
    }
}

fn evaluate_idle(ctx: &AiContext) -> AiUpdate {
    let intent = hold_intent(ctx);
    let Some(enemy) = ctx.nearest_enemy else {
        return AiUpdate::stay(intent);
    };
    let dist = ctx.me.position.distance(enemy.position);
    let transition = if ctx.profile.stationary {
        if dist <= STATION_ATTACK_RANGE {
            Transition::To(AiState::SpaceStationAttack { target: enemy.id })
        } else {
            Transition::Stay
        }
    } else if dist <= WAKE_RADIUS {
        Transition::To(AiState::seek(enemy.id))
    } else {
        Transition::Stay
    };
    AiUpdate { intent, transition }
}

fn choose_patrol_target<R: Rng + ?Sized>(ctx: &AiContext, rng: &mut R) -> DVec2 {
    let angle = rng.gen_range(0.0..std::f64::consts::TAU);
    let radius = rng.gen_range(0.0..PATROL_MAX_RADIUS);
    let raw = ctx.me.position + DVec2::new(angle.cos(), angle.sin()) * radius;
    let limit = (ctx.world_half_size - PATROL_EDGE_MARGIN).max(0.0);
    raw.clamp(DVec2::splat(-limit), DVec2::splat(limit))
}

fn evaluate_patrol<R: Rng + ?Sized>(
    target: &mut Option<DVec2>,
    dwell: &mut f64,
    ctx: &AiContext,
    rng: &mut R,
) -> AiUpdate {
    let goal = *target.get_or_insert_with(|| choose_patrol_target(ctx, rng));

    let movement = if ctx.me.position.distance_squared(goal)
        <= PATROL_ARRIVAL_RADIUS * PATROL_ARRIVAL_RADIUS
    {
        if *dwell >= PATROL_DWELL_SECS {
            *target = Some(choose_patrol_target(ctx, rng));
            *dwell = 0.0;
        } else {
            *dwell += ctx.dt;
        }
        MovementIntent::idle()
    } else {
        approach_target(&ctx.me, goal)
    };

    let intent = ShipIntent {
        movement,
        weapons: WeaponIntent {
            aim_at: goal,
            ..Default::default()
        },
        utility: shields(ctx, false),
    };

    let transition = if let (true, Some(player)) = (ctx.hunter, ctx.player) {
        Transition::Rebase(AiState::seek(player.id))
    } else if let Some(enemy) = ctx.nearest_enemy {
        if ctx.me.position.distance(enemy.position) <= WAKE_RADIUS {
            Transition::To(AiState::seek(enemy.id))
        } else {
            Transition::Stay
        }
    } else {
        Transition::Stay
    };

    AiUpdate { intent, transition }
}

fn evaluate_seek(ctx: &AiContext) -> AiUpdate {
    let Some(target) = ctx.target else {
        return AiUpdate {
            intent: ShipIntent::inert(),
            transition: Transition::ToInitial,
        };
    };

    let intent = ShipIntent {
        movement: approach_target(&ctx.me, target.position),
        weapons: WeaponIntent {
            aim_at: target.position,
            ..Default::default()
        },
        utility: shields(ctx, false),
    };

    let transition = if ctx.me.position.distance(target.position) <= ENGAGEMENT_RANGE {
        Transition::To(AiState::attack(target.id))
    } else {
        Transition::Stay
    };
    AiUpdate { intent, transition }
}

fn evaluate_attack(phase: &mut RamPhase, phase_timer: &mut f64, ctx: &AiContext) -> AiUpdate {
    let Some(target) = ctx.target else {
        return AiUpdate {
            intent: ShipIntent::inert(),
            transition: Transition::ToInitial,
        };
    };

    let intent = match ctx.profile.attack {
        AttackBehavior::Ram => {
            match phase {
                RamPhase::Ramming if ctx.colliding => {
                    *phase = RamPhase::Orbiting;
                    *phase_timer = 0.0;
                }
                RamPhase::Orbiting => {
                    *phase_timer += ctx.dt;
                    if *phase_timer >= RAM_ORBIT_DURATION_SECS {
                        *phase = RamPhase::Ramming;
                        *phase_timer = 0.0;
                    }
                }
                RamPhase::Ramming => {}
            }
            let ramming = *phase == RamPhase::Ramming;
            ShipIntent {
                movement: if ramming {
                    approach_target(&ctx.me, target.position)
                } else {
                    orbit_target(&ctx.me, target.position, ORBIT_RADIUS)
                },
                weapons: WeaponIntent {
                    aim_at: target.position,
                    ..Default::default()
                },
                utility: shields(ctx, ramming),
            }
        }
        AttackBehavior::Orbit => ShipIntent {
            movement: orbit_target(&ctx.me, target.position, ORBIT_RADIUS),
            weapons: WeaponIntent {
                fire_primary: true,
                fire_secondary: false,
                aim_at: lead_target(
                    ctx.me.position,
                    target.position,
                    target.velocity,
                    LEAD_PROJECTILE_SPEED,
                ),
                ..Default::default()
            },
            utility: shields(ctx, false),
        },
    };

    if let Some(formation) = ctx.formation {
        if formation.leader.is_none() {
            let next = if formation.offset.is_some() {
                AiState::Formation
            } else {
                AiState::patrol()
            };
            return AiUpdate {
                intent,
                transition: Transition::To(next),
            };
        }
    }

    let transition = if ctx.me.position.distance_squared(target.position)
        > DISENGAGE_RANGE * DISENGAGE_RANGE
    {
        Transition::To(AiState::seek(target.id))
    } else {
        Transition::Stay
    };
    AiUpdate { intent, transition }
}

/// Slot position and leader if the formation is intact.
fn formation_slot(ctx: &AiContext) -> Option<(DVec2, LeaderInfo)> {
    let formation = ctx.formation?;
    let leader = formation.leader?;
    Some((formation.slot()?, leader))
}

fn formation_intact(ctx: &AiContext) -> bool {
    ctx.formation.is_some_and(|f| f.leader.is_some())
}

fn evaluate_formation(ctx: &AiContext) -> AiUpdate {
    let intent = match formation_slot(ctx) {
        Some((slot, leader)) => ShipIntent {
            movement: approach_target(&ctx.me, slot),
            weapons: WeaponIntent {
                aim_at: leader.transform.position,
                ..Default::default()
            },
            utility: shields(ctx, false),
        },
        None => hold_intent(ctx),
    };

    let Some(leader) = ctx.formation.and_then(|f| f.leader) else {
        return AiUpdate {
            intent,
            transition: Transition::FormationLost,
        };
    };

    let transition = match (leader.state, leader.target) {
        (AiStateKind::SeekTarget, Some(target)) => {
            Transition::To(AiState::FormationSeekTarget { target })
        }
        (AiStateKind::Attack, Some(target)) => Transition::To(AiState::FormationAttack { target }),
        _ => Transition::Stay,
    };
    AiUpdate { intent, transition }
}

fn evaluate_formation_seek(ctx: &AiContext) -> AiUpdate {
    if !formation_intact(ctx) {
        return AiUpdate {
            intent: hold_intent(ctx),
            transition: Transition::FormationLost,
        };
    }
    let Some(target) = ctx.target else {
        return AiUpdate {
            intent: hold_intent(ctx),
            transition: Transition::To(AiState::Formation),
        };
    };

    let intent = match formation_slot(ctx) {
        Some((slot, _)) => ShipIntent {
            movement: approach_target(&ctx.me, slot),
            weapons: WeaponIntent {
                aim_at: target.position,
                ..Default::default()
            },
            utility: shields(ctx, false),
        },
        None => hold_intent(ctx),
    };

    let transition = if ctx.me.position.distance_squared(target.position)
        <= ENGAGEMENT_RANGE * ENGAGEMENT_RANGE
    {
        Transition::To(AiState::FormationAttack { target: target.id })
    } else {
        Transition::Stay
    };
    AiUpdate { intent, transition }
}

fn evaluate_formation_attack(ctx: &AiContext) -> AiUpdate {
    if !formation_intact(ctx) {
        return AiUpdate {
            intent: hold_intent(ctx),
            transition: Transition::FormationLost,
        };
    }
    let Some(target) = ctx.target else {
        return AiUpdate {
            intent: hold_intent(ctx),
            transition: Transition::To(AiState::Formation),
        };
    };

    let intent = match formation_slot(ctx) {
        Some((slot, _)) => ShipIntent {
            movement: approach_target(&ctx.me, slot),
            weapons: WeaponIntent {
                fire_primary: true,
                fire_secondary: false,
                aim_at: lead_target(
                    ctx.me.position,
                    target.position,
                    target.velocity,
                    LEAD_PROJECTILE_SPEED,
                ),
                ..Default::default()
            },
            utility: shields(ctx, true),
        },
        None => hold_intent(ctx),
    };

    let transition = if ctx.me.position.distance(target.position) > FORMATION_DISENGAGE_RANGE {
        Transition::To(AiState::FormationSeekTarget { target: target.id })
    } else {
        Transition::Stay
    };
    AiUpdate { intent, transition }
}

fn evaluate_station_attack(ctx: &AiContext) -> AiUpdate {
    let Some(target) = ctx.target else {
        return AiUpdate {
            intent: hold_intent(ctx),
            transition: Transition::To(AiState::Idle),
        };
    };

    let intent = ShipIntent {
        movement: MovementIntent::default(),
        weapons: WeaponIntent {
            fire_primary: true,
            fire_secondary: false,
            aim_at: lead_target(
                ctx.me.position,
                target.position,
                target.velocity,
                LEAD_PROJECTILE_SPEED,
            ),
            ..Default::default()
        },
        utility: shields(ctx, false),
    };

    let transition = if ctx.me.position.distance(target.position) > STATION_ATTACK_RANGE {
        Transition::To(AiState::Idle)
    } else {
        Transition::Stay
    };
    AiUpdate { intent, transition }
}
