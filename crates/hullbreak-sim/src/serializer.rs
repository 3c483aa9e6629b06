//! JSON form of composite objects: transform plus a block list.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use hullbreak_core::blocks::BlockCatalog;
use hullbreak_core::types::{GridCoord, ObjectId, Transform};
use hullbreak_core::{Error, Result};

use crate::composite::CompositeBlockObject;
use crate::sector::Sector;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl From<DVec2> for Point {
    fn from(v: DVec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<Point> for DVec2 {
    fn from(p: Point) -> Self {
        DVec2::new(p.x, p.y)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedTransform {
    pub position: Point,
    #[serde(default)]
    pub velocity: Point,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub angular_velocity: f64,
}

impl From<&Transform> for SerializedTransform {
    fn from(t: &Transform) -> Self {
        Self {
            position: t.position.into(),
            velocity: t.velocity.into(),
            rotation: t.rotation,
            angular_velocity: t.angular_velocity,
        }
    }
}

impl From<SerializedTransform> for Transform {
    fn from(t: SerializedTransform) -> Self {
        Transform {
            position: t.position.into(),
            velocity: t.velocity.into(),
            rotation: t.rotation,
            angular_velocity: t.angular_velocity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedBlock {
    pub id: String,
    pub coord: GridCoord,
    #[serde(default)]
    pub rotation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedBlockObject {
    pub transform: SerializedTransform,
    pub blocks: Vec<SerializedBlock>,
}

impl SerializedBlockObject {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Snapshot an object's transform and layout.
pub fn serialize_object(object: &CompositeBlockObject) -> SerializedBlockObject {
    SerializedBlockObject {
        transform: SerializedTransform::from(&object.transform),
        blocks: object
            .blocks()
            .map(|b| SerializedBlock {
                id: b.block_type.id.clone(),
                coord: b.coord,
                rotation: b.rotation,
            })
            .collect(),
    }
}

/// Build an asteroid from JSON and index it in the sector.
/// Fails without touching the sector if any block id is unknown.
pub fn load_asteroid_from_json(
    sector: &mut Sector,
    catalog: &BlockCatalog,
    json: &str,
) -> Result<ObjectId> {
    let data = SerializedBlockObject::from_json_str(json)?;
    load_asteroid(sector, catalog, &data)
}

pub fn load_asteroid(
    sector: &mut Sector,
    catalog: &BlockCatalog,
    data: &SerializedBlockObject,
) -> Result<ObjectId> {
    let mut placed = Vec::with_capacity(data.blocks.len());
    for b in &data.blocks {
        let block_type = catalog
            .get(&b.id)
            .ok_or_else(|| Error::UnknownBlockType(b.id.clone()))?;
        placed.push((b.coord, block_type, b.rotation));
    }

    let id = sector.create_asteroid(data.transform.into());
    for (coord, block_type, rotation) in placed {
        if let Err(e) = sector.place_block(id, coord, block_type, rotation) {
            sector.remove_object(id);
            return Err(e);
        }
    }
    Ok(id)
}
