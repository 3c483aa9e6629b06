//! Formation prefabs: declarative leader/follower templates.
//!
//! Offsets are in the leader's local frame, in multiples of `distance`.
//! Local -y is the leader's forward, so positive y sits behind it.

use glam::DVec2;

use hullbreak_core::affixes::ShipAffixes;
use hullbreak_core::enums::FormationLayout;
use hullbreak_core::waves::{FormationLeader, FormationMember, ShipFormationEntry};
use hullbreak_core::{Error, Result};

const BOX: [(f64, f64); 4] = [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)];
const DIAMOND: [(f64, f64); 4] = [(0.0, -1.0), (-1.0, 0.0), (1.0, 0.0), (0.0, 1.0)];
const CONVOY: [(f64, f64); 4] = [(0.0, -2.0), (0.0, -1.0), (0.0, 1.0), (0.0, 2.0)];
const ARROWHEAD: [(f64, f64); 4] = [(-2.0, 1.0), (-1.0, 0.5), (1.0, 0.5), (2.0, 1.0)];
const LINE: [(f64, f64); 6] = [
    (-3.0, 0.0),
    (-2.0, 0.0),
    (-1.0, 0.0),
    (1.0, 0.0),
    (2.0, 0.0),
    (3.0, 0.0),
];
const PHALANX: [(f64, f64); 6] = [
    (-1.0, 1.0),
    (0.0, 1.0),
    (1.0, 1.0),
    (-1.0, 2.0),
    (0.0, 2.0),
    (1.0, 2.0),
];
const HOURGLASS: [(f64, f64); 6] = [
    (-1.0, -1.0),
    (1.0, -1.0),
    (0.0, -2.0),
    (-1.0, 1.0),
    (1.0, 1.0),
    (0.0, 2.0),
];
const WINGED_COLUMN: [(f64, f64); 6] = [
    (0.0, 1.0),
    (0.0, 2.0),
    (-1.0, 0.5),
    (1.0, 0.5),
    (-1.0, 1.5),
    (1.0, 1.5),
];
const WEDGE: [(f64, f64); 6] = [
    (-0.866, 0.5),
    (0.866, 0.5),
    (-1.732, 1.5),
    (1.732, 1.5),
    (-2.598, 2.5),
    (2.598, 2.5),
];

fn unit_offsets(layout: FormationLayout) -> &'static [(f64, f64)] {
    match layout {
        FormationLayout::Box | FormationLayout::X => &BOX,
        FormationLayout::Diamond => &DIAMOND,
        FormationLayout::Convoy => &CONVOY,
        FormationLayout::Arrowhead => &ARROWHEAD,
        FormationLayout::Line => &LINE,
        FormationLayout::Phalanx => &PHALANX,
        FormationLayout::Hourglass => &HOURGLASS,
        FormationLayout::WingedColumn => &WINGED_COLUMN,
        FormationLayout::SmallWedge => &WEDGE[..2],
        FormationLayout::MediumWedge => &WEDGE[..4],
        FormationLayout::LargeWedge => &WEDGE,
    }
}

/// Number of followers a layout holds.
pub fn follower_count(layout: FormationLayout) -> usize {
    unit_offsets(layout).len()
}

/// Follower offsets for a layout scaled by `distance`.
pub fn layout_offsets(layout: FormationLayout, distance: f64) -> Vec<DVec2> {
    unit_offsets(layout)
        .iter()
        .map(|&(x, y)| DVec2::new(x, y) * distance)
        .collect()
}

/// Affixes and spawn flags applied to every ship of a prefab.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FormationAffixes {
    pub leader: Option<ShipAffixes>,
    pub followers: Option<ShipAffixes>,
    /// Every member ignores distance culling.
    pub uncullable: bool,
    /// The leader heads for the player instead of patrolling.
    pub leader_is_hunter: bool,
}

fn assemble(
    layout: FormationLayout,
    leader_id: &str,
    follower_ids: &[&str],
    affixes: FormationAffixes,
    distance: f64,
) -> ShipFormationEntry {
    let follower_affixes = affixes.followers.unwrap_or_default();
    ShipFormationEntry {
        formation_id: String::new(),
        layout_kind: layout,
        layout: layout_offsets(layout, distance),
        leader: FormationLeader {
            ship_id: leader_id.to_string(),
            affixes: affixes.leader.unwrap_or_default(),
            behavior: None,
            hunter: affixes.leader_is_hunter,
        },
        followers: follower_ids
            .iter()
            .map(|id| FormationMember {
                ship_id: id.to_string(),
                affixes: follower_affixes,
                behavior: None,
            })
            .collect(),
        count: 1,
        un_cullable: affixes.uncullable,
    }
}

/// Build a formation entry from ship blueprint ids.
///
/// The `formation_id` is left empty; the spawner assigns one per instance.
pub fn build_formation(
    layout: FormationLayout,
    leader_id: &str,
    follower_ids: &[&str],
    affixes: FormationAffixes,
    distance: f64,
) -> Result<ShipFormationEntry> {
    let expected = follower_count(layout);
    if follower_ids.len() != expected {
        return Err(Error::FormationArity {
            layout: layout.tag().to_string(),
            expected,
            got: follower_ids.len(),
        });
    }

    Ok(assemble(layout, leader_id, follower_ids, affixes, distance))
}

/// Same as `build_formation` with the layout named by its tag.
pub fn build_formation_by_tag(
    tag: &str,
    leader_id: &str,
    follower_ids: &[&str],
    affixes: FormationAffixes,
    distance: f64,
) -> Result<ShipFormationEntry> {
    let layout = FormationLayout::from_tag(tag)
        .ok_or_else(|| Error::UnknownFormationLayout(tag.to_string()))?;
    build_formation(layout, leader_id, follower_ids, affixes, distance)
}

macro_rules! prefab {
    ($(#[$doc:meta])* $name:ident, $layout:expr, $n:literal) => {
        $(#[$doc])*
        pub fn $name(
            leader_id: &str,
            follower_ids: [&str; $n],
            affixes: FormationAffixes,
            distance: f64,
        ) -> ShipFormationEntry {
            assemble($layout, leader_id, &follower_ids, affixes, distance)
        }
    };
}

prefab!(
    /// Four followers on the corners of a square.
    box_formation, FormationLayout::Box, 4
);
prefab!(x_formation, FormationLayout::X, 4);
prefab!(diamond_formation, FormationLayout::Diamond, 4);
prefab!(
    /// Two ahead, two behind, single file.
    convoy_formation, FormationLayout::Convoy, 4
);
prefab!(arrowhead_formation, FormationLayout::Arrowhead, 4);
prefab!(line_formation, FormationLayout::Line, 6);
prefab!(phalanx_formation, FormationLayout::Phalanx, 6);
prefab!(hourglass_formation, FormationLayout::Hourglass, 6);
prefab!(winged_column_formation, FormationLayout::WingedColumn, 6);
prefab!(small_wedge_formation, FormationLayout::SmallWedge, 2);
prefab!(medium_wedge_formation, FormationLayout::MediumWedge, 4);
prefab!(
    /// Three ranks of a V trailing the leader.
    large_wedge_formation, FormationLayout::LargeWedge, 6
);
