//! Declarative wave, formation, and incident definitions.
//!
//! These are authored data: they deserialize from JSON and carry no runtime state.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::affixes::ShipAffixes;
use crate::enums::{BehaviorKind, FormationLayout, SpawnDistribution};

fn one() -> u32 {
    1
}

/// A batch of identical ships in a wave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveShipEntry {
    pub ship_id: String,
    #[serde(default = "one")]
    pub count: u32,
    #[serde(default)]
    pub hunter: bool,
    #[serde(default)]
    pub affixes: ShipAffixes,
    #[serde(default)]
    pub behavior: Option<BehaviorKind>,
    /// Script run once when every ship of this entry is destroyed.
    #[serde(default)]
    pub on_all_defeated: Option<String>,
}

impl WaveShipEntry {
    pub fn new(ship_id: &str, count: u32) -> Self {
        Self {
            ship_id: ship_id.to_string(),
            count,
            hunter: false,
            affixes: ShipAffixes::default(),
            behavior: None,
            on_all_defeated: None,
        }
    }
}

/// Free-form parameters of an incident script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentOptions {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub radius: Option<f64>,
    pub pickup_count: Option<usize>,
}

impl IncidentOptions {
    pub fn at(position: DVec2) -> Self {
        Self {
            x: Some(position.x),
            y: Some(position.y),
            ..Default::default()
        }
    }

    /// Anchor point, if both coordinates are set.
    pub fn position(&self) -> Option<DVec2> {
        Some(DVec2::new(self.x?, self.y?))
    }
}

/// An incident a wave may roll for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveIncidentEntry {
    /// Probability in [0, 1].
    pub spawn_chance: f64,
    pub script: String,
    #[serde(default)]
    pub options: IncidentOptions,
    #[serde(default)]
    pub label: Option<String>,
}

/// Ship slot in a formation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormationMember {
    pub ship_id: String,
    #[serde(default)]
    pub affixes: ShipAffixes,
    #[serde(default)]
    pub behavior: Option<BehaviorKind>,
}

/// The formation leader slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormationLeader {
    pub ship_id: String,
    #[serde(default)]
    pub affixes: ShipAffixes,
    #[serde(default)]
    pub behavior: Option<BehaviorKind>,
    #[serde(default)]
    pub hunter: bool,
}

/// A declarative formation template: a leader, followers, and their local offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipFormationEntry {
    pub formation_id: String,
    pub layout_kind: FormationLayout,
    /// One offset per follower, in the leader's local frame.
    pub layout: Vec<DVec2>,
    pub leader: FormationLeader,
    pub followers: Vec<FormationMember>,
    #[serde(default = "one")]
    pub count: u32,
    #[serde(default)]
    pub un_cullable: bool,
}

/// One wave of a mission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveDefinition {
    /// Seconds until the next wave; `None` waits for this wave to be wiped out.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub spawn_distribution: SpawnDistribution,
    #[serde(default)]
    pub mods: Vec<String>,
    #[serde(default)]
    pub ships: Vec<WaveShipEntry>,
    #[serde(default)]
    pub formations: Vec<ShipFormationEntry>,
    #[serde(default)]
    pub incidents: Vec<WaveIncidentEntry>,
    #[serde(default)]
    pub is_boss: bool,
}

impl WaveDefinition {
    /// Ships spawned by this wave, formation members included.
    pub fn total_ships(&self) -> usize {
        let singles: u32 = self.ships.iter().map(|s| s.count).sum();
        let grouped: usize = self
            .formations
            .iter()
            .map(|f| f.count as usize * (f.followers.len() + 1))
            .sum();
        singles as usize + grouped
    }
}
