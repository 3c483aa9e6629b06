//! Immutable block type definitions and the catalog that shares them.
//!
//! A `BlockType` is created once and handed out as `Arc<BlockType>`; every
//! placed block of that type points at the same definition.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::enums::{BlockCategory, FireType};

/// Weapon statistics of a firing block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FireStats {
    pub fire_type: FireType,
    /// Shots per second.
    pub fire_rate: f64,
    pub fire_damage: f64,
    pub projectile_speed: Option<f64>,
    /// Seconds.
    pub lifetime: Option<f64>,
    /// 1.0 = perfectly accurate.
    pub accuracy: Option<f64>,
    /// Energy drained per second of beam.
    pub energy_cost: Option<f64>,
    /// Damage dealt to each block caught in a lance or seeker blast.
    pub explosion_damage: Option<f64>,
    /// Blast radius in block slots (Chebyshev).
    pub explosion_radius_blocks: Option<i32>,
    /// Seconds between a lance sticking and its blast.
    pub detonation_delay: Option<f64>,
    /// Seeker turn rate in radians per second at launch.
    pub turning_power: Option<f64>,
    /// Seeker lock-on range.
    pub targeting_range: Option<f64>,
    /// Seekers launch straight at the target instead of sideways.
    pub seeker_forward_fire: bool,
}

/// Optional capabilities of a block type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockBehavior {
    pub can_fire: bool,
    pub fire: Option<FireStats>,
    pub can_thrust: bool,
    pub thrust_power: Option<f64>,
    pub turn_power: Option<f64>,
    /// Chebyshev radius in block slots.
    pub shield_radius: Option<i32>,
    pub shield_efficiency: Option<f64>,
    pub shield_energy_drain: Option<f64>,
    pub energy_max_increase: Option<f64>,
    pub energy_charge_rate: Option<f64>,
    /// Resources gathered per second from asteroids.
    pub harvest_rate: Option<f64>,
    /// Scale on collision damage this block deals.
    pub ramming_damage_multiplier: Option<f64>,
    /// Flat reduction of collision damage this block takes.
    pub ramming_armor: Option<f64>,
}

impl BlockBehavior {
    pub fn ramming_multiplier(&self) -> f64 {
        self.ramming_damage_multiplier.unwrap_or(1.0)
    }

    pub fn ramming_armor(&self) -> f64 {
        self.ramming_armor.unwrap_or(0.0)
    }
}

/// Immutable definition of a block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockType {
    pub id: String,
    pub category: BlockCategory,
    /// Starting hit points.
    pub armor: f64,
    pub mass: f64,
    pub cost: u32,
    pub sprite: String,
    pub behavior: Option<BlockBehavior>,
}

impl BlockType {
    fn new(id: &str, category: BlockCategory, armor: f64, mass: f64, cost: u32) -> Self {
        Self {
            id: id.to_string(),
            category,
            armor,
            mass,
            cost,
            sprite: format!("blocks/{id}.png"),
            behavior: None,
        }
    }

    fn with_behavior(mut self, behavior: BlockBehavior) -> Self {
        self.behavior = Some(behavior);
        self
    }

    /// Fire statistics if this block is a weapon.
    pub fn fire_stats(&self) -> Option<&FireStats> {
        self.behavior
            .as_ref()
            .filter(|b| b.can_fire)
            .and_then(|b| b.fire.as_ref())
    }

    pub fn is_turret(&self) -> bool {
        self.id.starts_with("turret")
    }

    pub fn is_laser(&self) -> bool {
        self.id.starts_with("laser")
            && self
                .fire_stats()
                .is_some_and(|f| f.fire_type == FireType::Laser)
    }

    pub fn is_cockpit(&self) -> bool {
        self.category == BlockCategory::Cockpit
    }

    pub fn is_shield_emitter(&self) -> bool {
        self.behavior
            .as_ref()
            .is_some_and(|b| b.shield_radius.is_some())
    }

    pub fn is_engine(&self) -> bool {
        self.behavior.as_ref().is_some_and(|b| b.can_thrust)
    }
}

/// Registry of block types keyed by id.
#[derive(Debug, Clone, Default)]
pub struct BlockCatalog {
    types: HashMap<String, Arc<BlockType>>,
}

impl BlockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type, returning the definition it replaced.
    pub fn register(&mut self, block_type: BlockType) -> Option<Arc<BlockType>> {
        self.types
            .insert(block_type.id.clone(), Arc::new(block_type))
    }

    pub fn get(&self, id: &str) -> Option<Arc<BlockType>> {
        self.types.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.types.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Sorted type ids.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.types.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// The built-in block set.
    pub fn standard() -> Self {
        let mut catalog = Self::new();

        catalog.register(BlockType::new("cockpit0", BlockCategory::Cockpit, 20.0, 50.0, 50));
        catalog.register(BlockType::new("cockpit1", BlockCategory::Cockpit, 150.0, 50.0, 50));

        let hulls = [(15.0, 50.0, 20), (50.0, 50.0, 20), (75.0, 60.0, 40), (100.0, 75.0, 80), (150.0, 90.0, 140)];
        for (tier, (armor, mass, cost)) in hulls.into_iter().enumerate() {
            catalog.register(BlockType::new(&format!("hull{tier}"), BlockCategory::Hull, armor, mass, cost));
        }

        let plates = [(20.0, 30.0, 30), (75.0, 30.0, 30), (100.0, 40.0, 60), (125.0, 50.0, 100), (175.0, 60.0, 120)];
        for (tier, (armor, mass, cost)) in plates.into_iter().enumerate() {
            let id = format!("facetplate{tier}");
            catalog.register(BlockType::new(&id, BlockCategory::Facetplate, armor, mass, cost));
        }

        // (armor, mass, cost, rate, damage, speed, lifetime, accuracy)
        let turrets = [
            (20.0, 40.0, 40, 1.0, 2.0, 700.0, 2.2, 0.5),
            (40.0, 40.0, 40, 1.0, 10.0, 800.0, 1.8, 0.7),
            (50.0, 50.0, 100, 2.0, 16.0, 800.0, 2.2, 0.8),
            (75.0, 60.0, 200, 3.0, 20.0, 900.0, 2.2, 0.9),
            (100.0, 100.0, 400, 4.0, 30.0, 1000.0, 2.2, 0.95),
        ];
        for (tier, (armor, mass, cost, rate, damage, speed, lifetime, accuracy)) in
            turrets.into_iter().enumerate()
        {
            catalog.register(
                BlockType::new(&format!("turret{tier}"), BlockCategory::Turret, armor, mass, cost)
                    .with_behavior(firing(FireStats {
                        fire_type: FireType::Bullet,
                        fire_rate: rate,
                        fire_damage: damage,
                        projectile_speed: Some(speed),
                        lifetime: Some(lifetime),
                        accuracy: Some(accuracy),
                        ..Default::default()
                    })),
            );
        }

        // (armor, mass, cost, rate, damage, blast damage, blast radius, lifetime, accuracy)
        let lances = [
            (60.0, 80.0, 120, 0.5, 5.0, 10.0, 3, 0.8, 0.95),
            (60.0, 80.0, 140, 0.5, 10.0, 20.0, 3, 0.8, 0.95),
            (80.0, 90.0, 220, 0.6, 15.0, 25.0, 4, 0.85, 0.97),
            (90.0, 110.0, 360, 0.7, 20.0, 30.0, 5, 0.9, 0.98),
            (100.0, 120.0, 600, 0.8, 25.0, 40.0, 6, 1.0, 0.99),
        ];
        for (tier, (armor, mass, cost, rate, damage, blast, radius, lifetime, accuracy)) in
            lances.into_iter().enumerate()
        {
            let id = format!("explosiveLance{tier}");
            catalog.register(
                BlockType::new(&id, BlockCategory::ExplosiveLance, armor, mass, cost).with_behavior(firing(
                    FireStats {
                        fire_type: FireType::ExplosiveLance,
                        fire_rate: rate,
                        fire_damage: damage,
                        explosion_damage: Some(blast),
                        explosion_radius_blocks: Some(radius),
                        detonation_delay: Some(1.5),
                        projectile_speed: Some(1600.0),
                        lifetime: Some(lifetime),
                        accuracy: Some(accuracy),
                        ..Default::default()
                    },
                )),
            );
        }

        catalog.register(
            BlockType::new("heatSeeker0", BlockCategory::HeatSeeker, 40.0, 60.0, 300).with_behavior(firing(
                FireStats {
                    fire_type: FireType::HeatSeeker,
                    fire_rate: 0.5,
                    fire_damage: 12.0,
                    explosion_damage: Some(24.0),
                    explosion_radius_blocks: Some(2),
                    projectile_speed: Some(250.0),
                    lifetime: Some(4.0),
                    turning_power: Some(2.5),
                    targeting_range: Some(1000.0),
                    ..Default::default()
                },
            )),
        );

        // (armor, mass, cost, damage, energy cost, capacity)
        let lasers = [
            (40.0, 80.0, 500, 1.0, 0.15, None),
            (80.0, 100.0, 500, 2.0, 0.15, Some(60.0)),
            (100.0, 160.0, 1000, 3.5, 0.2, Some(80.0)),
            (100.0, 160.0, 1800, 5.0, 0.3, Some(100.0)),
        ];
        for (tier, (armor, mass, cost, damage, energy_cost, energy_max)) in lasers.into_iter().enumerate() {
            catalog.register(
                BlockType::new(&format!("laser{tier}"), BlockCategory::Laser, armor, mass, cost).with_behavior(
                    BlockBehavior {
                        energy_max_increase: energy_max,
                        ..firing(FireStats {
                            fire_type: FireType::Laser,
                            fire_damage: damage,
                            energy_cost: Some(energy_cost),
                            accuracy: Some(1.0),
                            ..Default::default()
                        })
                    },
                ),
            );
        }

        let reactors = [(25.0, 60.0, 400, 10.0), (50.0, 60.0, 400, 10.0), (75.0, 80.0, 800, 20.0)];
        for (tier, (armor, mass, cost, rate)) in reactors.into_iter().enumerate() {
            catalog.register(
                BlockType::new(&format!("reactor{tier}"), BlockCategory::Reactor, armor, mass, cost).with_behavior(
                    BlockBehavior {
                        energy_charge_rate: Some(rate),
                        ..Default::default()
                    },
                ),
            );
        }

        let batteries = [(20.0, 40.0, 200, 100.0), (30.0, 50.0, 200, 50.0), (40.0, 60.0, 400, 100.0)];
        for (tier, (armor, mass, cost, capacity)) in batteries.into_iter().enumerate() {
            catalog.register(
                BlockType::new(&format!("battery{tier}"), BlockCategory::Battery, armor, mass, cost).with_behavior(
                    BlockBehavior {
                        energy_max_increase: Some(capacity),
                        ..Default::default()
                    },
                ),
            );
        }

        // (armor, mass, cost, efficiency, radius, capacity, drain)
        let shields = [
            (20.0, 40.0, 200, 0.5, 2, 30.0, 1.0),
            (60.0, 50.0, 160, 0.65, 2, 30.0, 3.0),
            (80.0, 60.0, 300, 0.8, 3, 40.0, 5.0),
            (100.0, 70.0, 600, 1.0, 4, 50.0, 7.0),
        ];
        for (tier, (armor, mass, cost, efficiency, radius, capacity, drain)) in shields.into_iter().enumerate() {
            catalog.register(
                BlockType::new(&format!("shield{tier}"), BlockCategory::Shield, armor, mass, cost).with_behavior(
                    BlockBehavior {
                        shield_radius: Some(radius),
                        shield_efficiency: Some(efficiency),
                        shield_energy_drain: Some(drain),
                        energy_max_increase: Some(capacity),
                        ..Default::default()
                    },
                ),
            );
        }

        let engines = [(15.0, 35, 25.0), (40.0, 35, 40.0), (45.0, 60, 60.0), (50.0, 80, 80.0), (55.0, 160, 100.0)];
        for (tier, (armor, cost, thrust)) in engines.into_iter().enumerate() {
            catalog.register(
                BlockType::new(&format!("engine{tier}"), BlockCategory::Engine, armor, 30.0, cost).with_behavior(
                    BlockBehavior {
                        can_thrust: true,
                        thrust_power: Some(thrust),
                        ..Default::default()
                    },
                ),
            );
        }

        let fins = [(10.0, 20.0, 30, 0.1), (50.0, 10.0, 60, 1.0), (75.0, 10.0, 120, 1.4), (90.0, 10.0, 180, 2.0), (120.0, 10.0, 250, 2.8)];
        for (tier, (armor, mass, cost, turn)) in fins.into_iter().enumerate() {
            catalog.register(
                BlockType::new(&format!("fin{tier}"), BlockCategory::Fin, armor, mass, cost).with_behavior(
                    BlockBehavior {
                        turn_power: Some(turn),
                        ..Default::default()
                    },
                ),
            );
        }

        let harvesters = [(50.0, 30.0, 120, 5.0), (50.0, 30.0, 120, 3.0), (80.0, 40.0, 200, 5.0)];
        for (tier, (armor, mass, cost, rate)) in harvesters.into_iter().enumerate() {
            catalog.register(
                BlockType::new(&format!("harvester{tier}"), BlockCategory::Harvester, armor, mass, cost)
                    .with_behavior(BlockBehavior {
                        harvest_rate: Some(rate),
                        ..Default::default()
                    }),
            );
        }

        for id in ASTEROID_BLOCKS {
            catalog.register(BlockType::new(id, BlockCategory::Rock, 5.0, 120.0, 0));
        }

        catalog
    }
}

/// Rock shapes asteroids are built from.
pub const ASTEROID_BLOCKS: [&str; 5] = ["circleRock0", "rock0", "facetRock0", "facetRock1", "facetRockSlim0"];

fn firing(fire: FireStats) -> BlockBehavior {
    BlockBehavior {
        can_fire: true,
        fire: Some(fire),
        ..Default::default()
    }
}
