//! Per-ship AI controllers and the orchestrator that ticks them.
//!
//! A controller owns its ship's FSM state and its weapon and utility systems.
//! Each tick the orchestrator builds a read-only `AiContext` from the sector,
//! evaluates the state machine, feeds the intent to the ship's systems and
//! applies the resulting transition.

use std::collections::{BTreeMap, BTreeSet};

use glam::DVec2;
use rand_chacha::ChaCha8Rng;

use hullbreak_ai::fsm::{
    evaluate, AiContext, AiState, AiStateKind, FormationView, LeaderInfo, TargetInfo, Transition,
};
use hullbreak_ai::formation_registry::FormationRegistry;
use hullbreak_ai::profiles::{get_profile, BehaviorProfile};
use hullbreak_ai::steering::{net_thrust_direction, Kinematics};
use hullbreak_ai::targeting::{find_nearest_target, Seeker, TargetCandidate};
use hullbreak_core::constants::WAKE_RADIUS;
use hullbreak_core::intent::{MovementIntent, ShipIntent};
use hullbreak_core::types::{ObjectId, Rect};

use crate::composite::CompositeBlockObject;
use crate::culling::CompositeBlockObjectCullingSystem;
use crate::sector::Sector;
use crate::ship_grid::ShipGrid;
use crate::weapons::{UtilitySystem, WeaponEffects, WeaponSystem};

#[derive(Debug)]
pub struct AiController {
    ship: ObjectId,
    profile: BehaviorProfile,
    state: AiState,
    initial: AiState,
    formation_id: Option<String>,
    uncullable: bool,
    weapons: WeaponSystem,
    utility: UtilitySystem,
    last_intent: ShipIntent,
}

impl AiController {
    pub fn new(ship: ObjectId, profile: BehaviorProfile) -> Self {
        let initial = AiState::initial_for(&profile);
        Self {
            ship,
            profile,
            state: initial.clone(),
            initial,
            formation_id: None,
            uncullable: false,
            weapons: WeaponSystem::standard(),
            utility: UtilitySystem::standard(),
            last_intent: ShipIntent::inert(),
        }
    }

    /// Controller matching a spawned ship's behavior and flags.
    pub fn for_ship(ship: &CompositeBlockObject) -> Self {
        let (behavior, uncullable) = ship
            .systems()
            .map(|s| (s.behavior, s.uncullable))
            .unwrap_or_default();
        let mut controller = Self::new(ship.id, get_profile(behavior));
        controller.uncullable = uncullable;
        controller
    }

    /// Follow a formation's leader, with `Formation` as the starting and
    /// fallback state.
    pub fn with_formation(mut self, formation_id: &str) -> Self {
        self.formation_id = Some(formation_id.to_string());
        self.set_initial_state(AiState::Formation);
        self
    }

    pub fn ship(&self) -> ObjectId {
        self.ship
    }

    pub fn state(&self) -> &AiState {
        &self.state
    }

    pub fn initial_state(&self) -> &AiState {
        &self.initial
    }

    pub fn profile(&self) -> &BehaviorProfile {
        &self.profile
    }

    pub fn formation_id(&self) -> Option<&str> {
        self.formation_id.as_deref()
    }

    pub fn is_uncullable(&self) -> bool {
        self.uncullable
    }

    pub fn last_intent(&self) -> &ShipIntent {
        &self.last_intent
    }

    /// Replace the current state. The previous state is discarded.
    pub fn set_state(&mut self, state: AiState) {
        self.state = state;
    }

    /// Make `state` both the fallback and the current state.
    pub fn set_initial_state(&mut self, state: AiState) {
        self.initial = state.clone();
        self.state = state;
    }

    /// Drop formation membership and fall back to patrolling.
    pub fn clear_formation(&mut self) {
        self.formation_id = None;
        self.set_initial_state(AiState::patrol());
    }
}

/// Inputs shared by every controller on one tick.
pub struct AiTick<'a> {
    pub dt: f64,
    pub viewport: &'a Rect,
    pub world_half_size: f64,
    pub player: Option<ObjectId>,
    pub ship_grid: &'a ShipGrid,
}

#[derive(Debug, Default)]
pub struct AiOrchestrator {
    controllers: BTreeMap<ObjectId, AiController>,
    formations: FormationRegistry,
    culling: CompositeBlockObjectCullingSystem,
}

impl AiOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// An orchestrator whose activity radius follows `culling`.
    pub fn with_culling(culling: CompositeBlockObjectCullingSystem) -> Self {
        Self {
            culling,
            ..Self::default()
        }
    }

    pub fn add(&mut self, controller: AiController) {
        self.controllers.insert(controller.ship, controller);
    }

    /// Add a controller that runs regardless of distance to the viewport.
    pub fn add_uncullable(&mut self, mut controller: AiController) {
        controller.uncullable = true;
        self.add(controller);
    }

    pub fn remove(&mut self, ship: ObjectId) -> Option<AiController> {
        self.controllers.remove(&ship)
    }

    /// Forget a ship that left the world. A dead leader takes its formation
    /// with it; its followers fall back to patrolling.
    pub fn remove_controllers_for_ship(&mut self, ship: ObjectId) -> bool {
        let removed = self.controllers.remove(&ship).is_some();
        let led: Vec<String> = self
            .formations
            .iter()
            .filter(|f| f.leader_id == ship)
            .map(|f| f.formation_id.clone())
            .collect();
        for formation_id in led {
            self.tear_down(&formation_id);
        }
        removed
    }

    fn tear_down(&mut self, formation_id: &str) {
        self.formations.remove(formation_id);
        for controller in self.controllers.values_mut() {
            if controller.formation_id.as_deref() == Some(formation_id) {
                controller.clear_formation();
            }
        }
        log::info!("formation {formation_id} torn down");
    }

    pub fn get(&self, ship: ObjectId) -> Option<&AiController> {
        self.controllers.get(&ship)
    }

    pub fn get_mut(&mut self, ship: ObjectId) -> Option<&mut AiController> {
        self.controllers.get_mut(&ship)
    }

    pub fn contains(&self, ship: ObjectId) -> bool {
        self.controllers.contains_key(&ship)
    }

    pub fn count(&self) -> usize {
        self.controllers.len()
    }

    pub fn clear(&mut self) {
        self.controllers.clear();
        self.formations.clear();
    }

    pub fn controllers(&self) -> impl Iterator<Item = &AiController> {
        self.controllers.values()
    }

    pub fn formations(&self) -> &FormationRegistry {
        &self.formations
    }

    pub fn formations_mut(&mut self) -> &mut FormationRegistry {
        &mut self.formations
    }

    /// Ships whose controllers run this tick.
    pub fn active_ships(&self, sector: &Sector, viewport: &Rect) -> BTreeSet<ObjectId> {
        let mut active: BTreeSet<ObjectId> = self
            .culling
            .active_ai_ships(sector, viewport)
            .into_iter()
            .collect();
        active.extend(
            self.controllers
                .values()
                .filter(|c| c.uncullable)
                .map(|c| c.ship),
        );
        active
    }

    /// Tick every active controller. Returns the movement intents to fly;
    /// weapon and utility output lands in `fx`.
    pub fn update(
        &mut self,
        tick: &AiTick,
        sector: &mut Sector,
        rng: &mut ChaCha8Rng,
        fx: &mut WeaponEffects,
    ) -> BTreeMap<ObjectId, MovementIntent> {
        let dead: Vec<ObjectId> = self
            .controllers
            .keys()
            .filter(|id| !sector.contains(**id))
            .copied()
            .collect();
        for id in dead {
            self.remove_controllers_for_ship(id);
        }

        let active = self.active_ships(sector, tick.viewport);
        let leaders: BTreeMap<ObjectId, (AiStateKind, Option<ObjectId>)> = self
            .controllers
            .iter()
            .map(|(id, c)| (*id, (c.state.kind(), c.state.target())))
            .collect();

        let mut movement = BTreeMap::new();
        let ids: Vec<ObjectId> = self.controllers.keys().copied().collect();
        for id in ids {
            if !active.contains(&id) {
                continue;
            }
            let Some(controller) = self.controllers.get_mut(&id) else {
                continue;
            };
            let Some(ship) = sector.get(id) else {
                continue;
            };

            let formation = controller
                .formation_id
                .as_deref()
                .map(|fid| formation_view(&self.formations, fid, id, sector, &leaders));
            let target = controller.state.target();
            let ctx = build_context(tick, ship, &controller.profile, sector, target, formation);

            let update = evaluate(&mut controller.state, &ctx, rng);
            controller.last_intent = update.intent;
            controller.weapons.set_intent(update.intent.weapons);
            controller.utility.set_intent(update.intent.utility);
            movement.insert(id, update.intent.movement);

            if let Some(ship) = sector.get_mut(id) {
                controller.weapons.update(tick.dt, ship, rng, fx);
                controller.utility.update(tick.dt, ship, fx);
            }

            let lost = self.apply_transition(id, update.transition, sector);
            if let Some(formation_id) = lost {
                self.formations.remove(&formation_id);
            }
        }
        movement
    }

    /// Returns the formation id to drop when the transition tore one down.
    fn apply_transition(
        &mut self,
        id: ObjectId,
        transition: Transition,
        sector: &mut Sector,
    ) -> Option<String> {
        let controller = self.controllers.get_mut(&id)?;
        let from = controller.state.name();
        match transition {
            Transition::Stay => return None,
            Transition::To(state) => {
                if matches!(state, AiState::Attack { .. }) {
                    controller.uncullable = true;
                    if let Some(systems) = sector.get_mut(id).and_then(|s| s.systems_mut()) {
                        systems.uncullable = true;
                    }
                }
                controller.set_state(state);
            }
            Transition::ToInitial => {
                let initial = controller.initial.clone();
                controller.set_state(initial);
            }
            Transition::Rebase(state) => controller.set_initial_state(state),
            Transition::FormationLost => {
                let formation_id = controller.formation_id.clone();
                controller.clear_formation();
                log::debug!("{id} lost its formation, patrolling");
                return formation_id;
            }
        }
        log::debug!("{id} {from} -> {}", controller.state.name());
        None
    }
}

fn target_info(ship: &CompositeBlockObject) -> TargetInfo {
    TargetInfo {
        id: ship.id,
        position: ship.transform.position,
        velocity: ship.transform.velocity,
    }
}

/// How a ship currently accelerates, for steering.
pub fn kinematics(ship: &CompositeBlockObject) -> Kinematics {
    let thrust = net_thrust_direction(ship.transform.rotation, ship.engines());
    Kinematics {
        position: ship.transform.position,
        velocity: ship.transform.velocity,
        thrust_dir: if thrust == DVec2::ZERO {
            ship.transform.forward()
        } else {
            thrust
        },
    }
}

fn formation_view(
    formations: &FormationRegistry,
    formation_id: &str,
    me: ObjectId,
    sector: &Sector,
    leaders: &BTreeMap<ObjectId, (AiStateKind, Option<ObjectId>)>,
) -> FormationView {
    let Some(formation) = formations.get(formation_id) else {
        return FormationView {
            offset: None,
            leader: None,
        };
    };
    let leader = sector.get(formation.leader_id).and_then(|ship| {
        let (state, target) = leaders.get(&ship.id)?;
        Some(LeaderInfo {
            transform: ship.transform,
            state: *state,
            target: *target,
        })
    });
    FormationView {
        offset: formation.offset_of(me),
        leader,
    }
}

fn build_context<'a>(
    tick: &AiTick,
    ship: &CompositeBlockObject,
    profile: &'a BehaviorProfile,
    sector: &Sector,
    target: Option<ObjectId>,
    formation: Option<FormationView>,
) -> AiContext<'a> {
    let me = kinematics(ship);
    let systems = ship.systems();

    let candidates: Vec<TargetCandidate> = tick
        .ship_grid
        .ships_in_radius(me.position, WAKE_RADIUS, Some(ship.faction))
        .into_iter()
        .filter_map(|id| sector.get(id))
        .map(|s| TargetCandidate {
            id: s.id,
            faction: s.faction,
            position: s.transform.position,
            velocity: s.transform.velocity,
            invulnerable: s.is_invulnerable(),
        })
        .collect();
    let seeker = Seeker {
        id: ship.id,
        faction: ship.faction,
        position: me.position,
    };
    let nearest_enemy = find_nearest_target(&seeker, WAKE_RADIUS, &candidates).map(|c| TargetInfo {
        id: c.id,
        position: c.position,
        velocity: c.velocity,
    });

    AiContext {
        dt: tick.dt,
        me,
        profile,
        hunter: systems.is_some_and(|s| s.hunter),
        world_half_size: tick.world_half_size,
        shield_active: ship.shield_active(),
        colliding: systems.is_some_and(|s| s.colliding),
        player: tick.player.and_then(|p| sector.get(p)).map(target_info),
        nearest_enemy,
        target: target.and_then(|t| sector.get(t)).map(target_info),
        formation,
    }
}
