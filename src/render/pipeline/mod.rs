//! Render pipelines

pub mod opaque;
pub mod water;

pub use opaque::{NodeUniforms, OpaquePipeline};
pub use water::{WaterPipeline, WaterUniforms};
