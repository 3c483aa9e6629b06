//! Behavior profiles that parameterize the state machine per ship.

use hullbreak_core::enums::{AttackBehavior, BehaviorKind};

/// State a controller starts in and falls back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialState {
    Patrol,
    Idle,
}

/// Per-ship AI parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorProfile {
    pub attack: AttackBehavior,
    pub initial: InitialState,
    /// Stationary ships fight from where they stand and never chase.
    pub stationary: bool,
}

/// Get the profile for a named behavior.
pub fn get_profile(kind: BehaviorKind) -> BehaviorProfile {
    match kind {
        BehaviorKind::Default => BehaviorProfile {
            attack: AttackBehavior::Orbit,
            initial: InitialState::Patrol,
            stationary: false,
        },
        BehaviorKind::Ramming => BehaviorProfile {
            attack: AttackBehavior::Ram,
            initial: InitialState::Patrol,
            stationary: false,
        },
        BehaviorKind::Siege => BehaviorProfile {
            attack: AttackBehavior::Orbit,
            initial: InitialState::Idle,
            stationary: true,
        },
    }
}

impl Default for BehaviorProfile {
    fn default() -> Self {
        get_profile(BehaviorKind::Default)
    }
}
