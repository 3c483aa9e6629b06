//! Enumerations shared across the simulation.

use serde::{Deserialize, Serialize};

/// Allegiance of a composite object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Friendly,
    #[default]
    Enemy,
    Neutral,
}

/// What a composite object is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    #[default]
    Ship,
    Station,
    Asteroid,
}

/// Broad grouping of block types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockCategory {
    Cockpit,
    #[default]
    Hull,
    Facetplate,
    Engine,
    Fin,
    Turret,
    ExplosiveLance,
    HeatSeeker,
    Laser,
    Reactor,
    Shield,
    Battery,
    Harvester,
    Rock,
}

/// How a weapon block delivers damage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FireType {
    #[default]
    Bullet,
    Laser,
    /// Sticks to the first foreign block it reaches and detonates later.
    ExplosiveLance,
    /// Homing missile that bursts on impact.
    HeatSeeker,
}

/// How a ship's turrets of one type share their cooldown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FiringMode {
    /// Every ready turret fires at once.
    #[default]
    Synced,
    /// Turrets of the same type take turns, spread evenly over the cooldown.
    Sequence,
}

/// Why a composite object was destroyed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DestructionCause {
    #[default]
    Projectile,
    Collision,
    ExplosiveLance,
    HeatSeeker,
    Bomb,
    Laser,
    SelfDestruct,
    Scripted,
    Replaced,
}

/// Where a wave places its ships.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpawnDistribution {
    #[default]
    Random,
    Outer,
    Inner,
    AroundPlayer,
    Center,
}

impl SpawnDistribution {
    /// Parse a distribution tag; unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "random" => Some(Self::Random),
            "outer" => Some(Self::Outer),
            "inner" => Some(Self::Inner),
            "aroundPlayer" | "around_player" => Some(Self::AroundPlayer),
            "center" => Some(Self::Center),
            _ => None,
        }
    }
}

/// How an attacking ship closes on its target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttackBehavior {
    #[default]
    Orbit,
    Ram,
}

/// Named behavior profile a ship is spawned with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BehaviorKind {
    #[default]
    Default,
    Ramming,
    Siege,
}

/// Canonical formation shapes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormationLayout {
    #[default]
    Box,
    X,
    Diamond,
    Convoy,
    Arrowhead,
    Line,
    Phalanx,
    Hourglass,
    WingedColumn,
    SmallWedge,
    MediumWedge,
    LargeWedge,
}

impl FormationLayout {
    /// Parse a layout tag such as `"winged-column"`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.tag() == tag)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            FormationLayout::Box => "box",
            FormationLayout::X => "x",
            FormationLayout::Diamond => "diamond",
            FormationLayout::Convoy => "convoy",
            FormationLayout::Arrowhead => "arrowhead",
            FormationLayout::Line => "line",
            FormationLayout::Phalanx => "phalanx",
            FormationLayout::Hourglass => "hourglass",
            FormationLayout::WingedColumn => "winged-column",
            FormationLayout::SmallWedge => "small-wedge",
            FormationLayout::MediumWedge => "medium-wedge",
            FormationLayout::LargeWedge => "large-wedge",
        }
    }

    pub const ALL: [FormationLayout; 12] = [
        FormationLayout::Box,
        FormationLayout::X,
        FormationLayout::Diamond,
        FormationLayout::Convoy,
        FormationLayout::Arrowhead,
        FormationLayout::Line,
        FormationLayout::Phalanx,
        FormationLayout::Hourglass,
        FormationLayout::WingedColumn,
        FormationLayout::SmallWedge,
        FormationLayout::MediumWedge,
        FormationLayout::LargeWedge,
    ];
}

/// Audio bus a sound request is played on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioChannel {
    #[default]
    Sfx,
    Ui,
    Music,
}

/// Kinds of world pickups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    #[default]
    Currency,
    QuantumAttractor,
}

/// Top-level simulation phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Setup,
    Active,
    Paused,
    Complete,
}
