//! Fundamental geometric and simulation types.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::constants::BLOCK_SIZE;

/// Identifier of a composite block object (ship, asteroid, station).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ObjectId(pub u32);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Integer coordinate of a block in its object's local block grid.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    /// The cockpit slot.
    pub const ORIGIN: GridCoord = GridCoord { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The four edge-adjacent coordinates.
    pub fn neighbors(&self) -> [GridCoord; 4] {
        [
            GridCoord::new(self.x + 1, self.y),
            GridCoord::new(self.x - 1, self.y),
            GridCoord::new(self.x, self.y + 1),
            GridCoord::new(self.x, self.y - 1),
        ]
    }

    /// Chebyshev (king-move) distance.
    pub fn chebyshev(&self, other: &GridCoord) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Offset of this slot from the object origin in world units, unrotated.
    pub fn local_offset(&self) -> DVec2 {
        DVec2::new(self.x as f64 * BLOCK_SIZE, self.y as f64 * BLOCK_SIZE)
    }
}

/// Rigid transform shared by every block of a composite object.
/// Rotation is in radians; forward is local -y.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: DVec2,
    pub velocity: DVec2,
    pub rotation: f64,
    pub angular_velocity: f64,
}

impl Transform {
    pub fn at(position: DVec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Rotate a local-space offset by this transform's rotation and translate it.
    pub fn local_to_world(&self, offset: DVec2) -> DVec2 {
        self.position + rotate(offset, self.rotation)
    }

    /// World position of a block slot.
    pub fn block_world_position(&self, coord: GridCoord) -> DVec2 {
        self.local_to_world(coord.local_offset())
    }

    /// Unit vector the hull points along.
    pub fn forward(&self) -> DVec2 {
        rotate(DVec2::new(0.0, -1.0), self.rotation)
    }
}

/// Rotate a vector counter-clockwise by `angle` radians.
pub fn rotate(v: DVec2, angle: f64) -> DVec2 {
    let (sin, cos) = angle.sin_cos();
    DVec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Axis-aligned world rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: DVec2,
    pub max: DVec2,
}

impl Rect {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min: DVec2::new(min_x.min(max_x), min_y.min(max_y)),
            max: DVec2::new(min_x.max(max_x), min_y.max(max_y)),
        }
    }

    /// Rectangle of the given size centered on `center`.
    pub fn centered(center: DVec2, width: f64, height: f64) -> Self {
        let half = DVec2::new(width * 0.5, height * 0.5);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Grow the rectangle by `margin` on every side.
    pub fn expand(&self, margin: f64) -> Self {
        Self {
            min: self.min - DVec2::splat(margin),
            max: self.max + DVec2::splat(margin),
        }
    }

    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Seconds per tick at the fixed tick rate.
    pub fn dt(&self) -> f64 {
        crate::constants::DT
    }

    /// Advance by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.elapsed_secs += dt;
    }
}
