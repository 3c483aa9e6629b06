//! Energy recharge and shield upkeep.

use hullbreak_core::events::{EventBus, GameEvent};
use hullbreak_core::types::ObjectId;

use crate::sector::Sector;

/// Recharge every ship's energy, then charge active shields for the tick.
/// A shield that cannot be paid for drops.
pub fn run(sector: &mut Sector, bus: &mut EventBus, dt: f64) {
    let ships: Vec<ObjectId> = sector.ships().map(|s| s.id).collect();
    for id in ships {
        let Some(ship) = sector.get_mut(id) else {
            continue;
        };
        let drain = ship
            .systems()
            .filter(|s| s.shield.is_active())
            .map(|s| s.shield_drain(ship.block_map()) * s.affixes.shield_energy_drain() * dt);
        let Some(systems) = ship.systems_mut() else {
            continue;
        };
        if let Some(energy) = systems.energy.as_mut() {
            energy.update(dt);
        }
        let Some(drain) = drain else {
            continue;
        };
        let paid = systems.energy.as_mut().is_some_and(|e| e.spend(drain));
        if !paid {
            systems.shield.deactivate();
            log::debug!("{id} shield dropped: out of energy");
            bus.publish(GameEvent::ShieldToggled { id, active: false });
        }
    }
}
