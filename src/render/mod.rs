//! Rendering system and GPU interfaces

pub mod context;
pub mod buffer;
pub mod material;
pub mod pipeline;
pub mod renderer;
pub mod texture;

pub use material::{ShaderInterface, ShaderMaterial, UniformValue};
pub use renderer::WaterSceneRenderer;
