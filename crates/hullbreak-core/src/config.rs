//! World settings passed explicitly into the simulation.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Error, Result};
use crate::waves::WaveDefinition;

/// Tunable world parameters. Every field has a default, so a partial JSON
/// document overrides only the keys it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorldSettings {
    /// Edge length of the square world, centered on the origin.
    pub world_size: f64,
    pub grid_cell_size: f64,
    /// How far beyond the viewport ships keep their AI running.
    pub nearby_margin: f64,
    /// Non-player ships farther than this from the player are culled.
    pub cull_radius: f64,
    /// Extra radius scanned beyond `cull_radius` when culling.
    pub cull_fetch_padding: f64,
    /// Maximum live non-player ships.
    pub enemy_cap: usize,
    /// Block-level collisions between objects.
    pub collisions_enabled: bool,
    /// Wave schedule; empty means the built-in mission.
    pub waves: Vec<WaveDefinition>,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            world_size: 20_000.0,
            grid_cell_size: GRID_CELL_SIZE,
            nearby_margin: NEARBY_MARGIN,
            cull_radius: 5000.0,
            cull_fetch_padding: 3000.0,
            enemy_cap: 100,
            collisions_enabled: true,
            waves: Vec::new(),
        }
    }
}

impl WorldSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: WorldSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.world_size.is_finite() || self.world_size <= 0.0 {
            return Err(Error::Config(format!(
                "world size must be positive, got {}",
                self.world_size
            )));
        }
        if !self.grid_cell_size.is_finite() || self.grid_cell_size <= 0.0 {
            return Err(Error::Config(format!(
                "grid cell size must be positive, got {}",
                self.grid_cell_size
            )));
        }
        Ok(())
    }

    /// Half the world edge length.
    pub fn half_size(&self) -> f64 {
        self.world_size * 0.5
    }
}
