//! The built-in mission used when the settings carry no waves.

use hullbreak_ai::formations::{
    hourglass_formation, medium_wedge_formation, small_wedge_formation, FormationAffixes,
};
use hullbreak_core::affixes::ShipAffixes;
use hullbreak_core::constants::WAVE_DEFAULT_INTERVAL_SECS;
use hullbreak_core::enums::{BehaviorKind, SpawnDistribution};
use hullbreak_core::waves::{
    IncidentOptions, ShipFormationEntry, WaveDefinition, WaveIncidentEntry, WaveShipEntry,
};

use crate::incidents::{BLACK_HOLE, HEALING_BEACON, QUANTUM_BOOM};

const FAST: ShipAffixes = ShipAffixes {
    thrust_power_multi: Some(1.8),
    turn_power_multi: Some(1.8),
    fire_rate_multi: None,
    ramming_damage_inflict_multiplier: None,
    shield_efficiency_multi: None,
    shield_radius_multi: None,
    shield_energy_drain_multi: None,
    invulnerable: None,
};

fn fast() -> FormationAffixes {
    FormationAffixes {
        leader: Some(FAST),
        followers: Some(FAST),
        ..Default::default()
    }
}

/// Fast, with the leader hunting the player.
fn hunting() -> FormationAffixes {
    FormationAffixes {
        leader_is_hunter: true,
        ..fast()
    }
}

fn named(mut entry: ShipFormationEntry, id: &str, count: u32) -> ShipFormationEntry {
    entry.formation_id = id.to_string();
    entry.count = count;
    entry
}

fn hunters(ship_id: &str, count: u32) -> WaveShipEntry {
    WaveShipEntry {
        hunter: true,
        ..WaveShipEntry::new(ship_id, count)
    }
}

fn incident(script: &str, spawn_chance: f64) -> WaveIncidentEntry {
    WaveIncidentEntry {
        spawn_chance,
        script: script.to_string(),
        options: IncidentOptions::default(),
        label: None,
    }
}

/// Five waves ending in a boss that must be destroyed.
pub fn default_mission() -> Vec<WaveDefinition> {
    let timed = Some(WAVE_DEFAULT_INTERVAL_SECS);
    vec![
        WaveDefinition {
            duration: timed,
            spawn_distribution: SpawnDistribution::AroundPlayer,
            ships: vec![hunters("scout", 4)],
            formations: vec![named(
                small_wedge_formation("fighter", ["scout", "scout"], fast(), 800.0),
                "small-wedge",
                1,
            )],
            ..Default::default()
        },
        WaveDefinition {
            duration: timed,
            spawn_distribution: SpawnDistribution::Outer,
            ships: vec![
                hunters("fighter", 4),
                WaveShipEntry {
                    behavior: Some(BehaviorKind::Ramming),
                    ..hunters("rammer", 3)
                },
            ],
            incidents: vec![incident(QUANTUM_BOOM, 0.5)],
            ..Default::default()
        },
        WaveDefinition {
            duration: timed,
            spawn_distribution: SpawnDistribution::Random,
            mods: vec!["shielded".to_string()],
            ships: vec![
                WaveShipEntry::new("gunship", 3),
                WaveShipEntry {
                    behavior: Some(BehaviorKind::Siege),
                    ..WaveShipEntry::new("station", 2)
                },
            ],
            formations: vec![named(
                medium_wedge_formation(
                    "gunship",
                    ["fighter", "fighter", "fighter", "fighter"],
                    fast(),
                    700.0,
                ),
                "medium-wedge",
                2,
            )],
            incidents: vec![incident(HEALING_BEACON, 1.0)],
            ..Default::default()
        },
        WaveDefinition {
            duration: timed,
            spawn_distribution: SpawnDistribution::AroundPlayer,
            mods: vec!["fast".to_string(), "extra-aggressive".to_string()],
            ships: vec![hunters("fighter", 6), hunters("lancer", 2)],
            formations: vec![named(
                hourglass_formation(
                    "gunship",
                    ["scout", "scout", "scout", "scout", "scout", "scout"],
                    hunting(),
                    600.0,
                ),
                "hourglass",
                1,
            )],
            incidents: vec![incident(BLACK_HOLE, 0.35)],
            ..Default::default()
        },
        WaveDefinition {
            duration: None,
            spawn_distribution: SpawnDistribution::Center,
            mods: vec!["shielded".to_string()],
            ships: vec![
                WaveShipEntry {
                    on_all_defeated: Some("boss-defeated".to_string()),
                    ..hunters("dreadnought", 1)
                },
                hunters("fighter", 4),
            ],
            is_boss: true,
            ..Default::default()
        },
    ]
}
