//! Appearance parameters read by scene components every frame

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::Result;

/// Water and fog appearance settings.
///
/// Components only read these; the host owns the value and may swap it
/// between frames. Missing fields in a JSON file fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneParameters {
    /// Specular exponent of the sun highlight
    pub water_shininess: f32,
    /// Specular intensity multiplier
    pub water_specular: f32,
    /// Water depth (world units) at which the deep colour is fully reached
    pub water_max_depth: f32,
    /// Scroll speed of the normal map layers (UV units per second)
    pub water_normal_map_speed: f32,
    /// World-space size of one normal map tile
    pub water_normal_map_size: f32,
    /// Colour of shallow water (linear RGB)
    pub water_colour_shallow: [f32; 3],
    /// Colour of deep water (linear RGB)
    pub water_colour_deep: [f32; 3],
    /// Exponential fog density
    pub fog_density: f32,
    /// Fog colour (linear RGB)
    pub fog_colour: [f32; 3],
}

impl Default for SceneParameters {
    fn default() -> Self {
        Self {
            water_shininess: 80.0,
            water_specular: 0.8,
            water_max_depth: 6.0,
            water_normal_map_speed: 0.015,
            water_normal_map_size: 40.0,
            water_colour_shallow: [0.24, 0.66, 0.78],
            water_colour_deep: [0.02, 0.10, 0.22],
            fog_density: 0.0025,
            fog_colour: [0.74, 0.81, 0.88],
        }
    }
}

impl SceneParameters {
    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save as pretty-printed JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }
}
