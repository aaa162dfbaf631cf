//! Shader-driven water surface

pub mod surface;

pub use surface::{WaterConfig, WaterSurface, WATER_MATERIAL, WATER_SHADER};

use crate::scene::{Scene, ShaderSource};

/// WGSL source of the water vertex/fragment pair
pub const WATER_WGSL: &str = include_str!("../../shaders/water.wgsl");

/// Register the water shader pair in the scene's shader store
pub fn register_shaders(scene: &mut Scene) {
    scene.register_shader(WATER_SHADER, ShaderSource::wgsl(WATER_WGSL));
}
