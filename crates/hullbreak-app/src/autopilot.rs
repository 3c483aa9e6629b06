//! A stand-in pilot for unattended runs: hold position and shoot the
//! nearest enemy in range.

use glam::DVec2;

use hullbreak_core::constants::ENGAGEMENT_RANGE;
use hullbreak_core::enums::{Faction, FiringMode};
use hullbreak_core::intent::{MovementIntent, ShipIntent, UtilityIntent, WeaponIntent};
use hullbreak_core::state::GameStateSnapshot;

/// Intent for the player ship, or `None` once it is gone.
pub fn intent_for(snapshot: &GameStateSnapshot) -> Option<ShipIntent> {
    let player = snapshot.player?;
    let me = snapshot.ships.iter().find(|s| s.id == player)?;
    let target = nearest_enemy(snapshot, me.position);

    let weapons = match target {
        Some(aim_at) if aim_at.distance(me.position) <= ENGAGEMENT_RANGE => WeaponIntent {
            fire_primary: true,
            fire_secondary: true,
            aim_at,
            firing_mode: FiringMode::Sequence,
        },
        _ => WeaponIntent::default(),
    };
    Some(ShipIntent {
        movement: MovementIntent::idle(),
        weapons,
        utility: UtilityIntent {
            toggle_shields: false,
        },
    })
}

fn nearest_enemy(snapshot: &GameStateSnapshot, from: DVec2) -> Option<DVec2> {
    snapshot
        .ships
        .iter()
        .filter(|s| s.faction == Faction::Enemy)
        .map(|s| s.position)
        .min_by(|a, b| a.distance_squared(from).total_cmp(&b.distance_squared(from)))
}
