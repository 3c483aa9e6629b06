//! Ship layouts by id.

use std::collections::BTreeMap;

use hullbreak_core::types::GridCoord;
use hullbreak_core::{Error, Result};

use crate::serializer::{SerializedBlock, SerializedBlockObject, SerializedTransform};

// One character per slot. `C`/`K` mark the cockpit, which sits at (0, 0);
// rows grow toward +y, the stern.
const LEGEND: &[(char, &str)] = &[
    ('C', "cockpit0"),
    ('K', "cockpit1"),
    ('h', "hull0"),
    ('m', "hull1"),
    ('H', "hull2"),
    ('X', "hull3"),
    ('A', "hull4"),
    ('e', "engine0"),
    ('E', "engine1"),
    ('f', "fin0"),
    ('0', "turret0"),
    ('1', "turret1"),
    ('2', "turret2"),
    ('3', "turret3"),
    ('4', "turret4"),
    ('L', "laser0"),
    ('x', "explosiveLance0"),
    ('q', "heatSeeker0"),
    ('s', "shield0"),
    ('S', "shield1"),
    ('b', "battery0"),
];

const BUILTIN: &[(&str, &str)] = &[
    (
        "player",
        "
        .0.0.
        fmCmf
        .sbL.
        .e.e.
        ",
    ),
    (
        "scout",
        "
        .0.
        fCf
        .e.
        ",
    ),
    (
        "fighter",
        "
        1.1
        mCm
        fmf
        e.e
        ",
    ),
    (
        "gunship",
        "
        .2H2.
        HHKHH
        .sbs.
        .E.E.
        ",
    ),
    (
        "lancer",
        "
        x.x
        mKm
        qhq
        e.e
        ",
    ),
    (
        "rammer",
        "
        XXX
        XKX
        fSf
        E.E
        ",
    ),
    (
        "station",
        "
        3A3A3
        ASbSA
        3AKA3
        AbAbA
        3A3A3
        ",
    ),
    (
        "dreadnought",
        "
        .4.4.4.
        AAAAAAA
        4SAKAS4
        fAbbbAf
        .E.E.E.
        ",
    ),
];

/// Parse a legend drawing into a layout centered on its cockpit.
fn parse_design(id: &str, drawing: &str) -> Result<SerializedBlockObject> {
    let mut cells = Vec::new();
    let mut cockpit = None;
    let rows = drawing
        .lines()
        .map(str::trim)
        .filter(|row| !row.is_empty());
    for (y, row) in rows.enumerate() {
        for (x, ch) in row.chars().enumerate() {
            if ch == '.' {
                continue;
            }
            let block_id = LEGEND
                .iter()
                .find(|(c, _)| *c == ch)
                .map(|(_, id)| *id)
                .ok_or_else(|| Error::InvalidBlueprint {
                    id: id.to_string(),
                    reason: format!("unknown legend symbol '{ch}'"),
                })?;
            if matches!(ch, 'C' | 'K') {
                cockpit = Some((x as i32, y as i32));
            }
            cells.push((x as i32, y as i32, block_id));
        }
    }
    let (cx, cy) = cockpit.ok_or_else(|| Error::InvalidBlueprint {
        id: id.to_string(),
        reason: "no cockpit".to_string(),
    })?;
    Ok(SerializedBlockObject {
        transform: SerializedTransform::default(),
        blocks: cells
            .into_iter()
            .map(|(x, y, block_id)| SerializedBlock {
                id: block_id.to_string(),
                coord: GridCoord::new(x - cx, y - cy),
                rotation: 0.0,
            })
            .collect(),
    })
}

/// Registered ship layouts.
#[derive(Debug, Clone, Default)]
pub struct ShipBlueprints {
    layouts: BTreeMap<String, SerializedBlockObject>,
}

impl ShipBlueprints {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in designs.
    pub fn builtin() -> Result<Self> {
        let mut blueprints = Self::new();
        for (id, drawing) in BUILTIN {
            blueprints.insert(id, parse_design(id, drawing)?)?;
        }
        Ok(blueprints)
    }

    /// Register a layout, replacing any previous one with the same id.
    /// The cockpit must be at (0, 0).
    pub fn insert(&mut self, id: &str, layout: SerializedBlockObject) -> Result<()> {
        let has_cockpit = layout
            .blocks
            .iter()
            .any(|b| b.coord == GridCoord::ORIGIN && b.id.starts_with("cockpit"));
        if !has_cockpit {
            return Err(Error::InvalidBlueprint {
                id: id.to_string(),
                reason: "no cockpit at (0, 0)".to_string(),
            });
        }
        self.layouts.insert(id.to_string(), layout);
        Ok(())
    }

    pub fn insert_json(&mut self, id: &str, json: &str) -> Result<()> {
        let layout = SerializedBlockObject::from_json_str(json)?;
        self.insert(id, layout)
    }

    pub fn get(&self, id: &str) -> Result<&SerializedBlockObject> {
        self.layouts
            .get(id)
            .ok_or_else(|| Error::UnknownBlueprint(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.layouts.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.layouts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}
