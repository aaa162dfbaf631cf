//! Texture sources, the scene texture registry types, and GPU upload

pub mod source;
pub mod gpu;

pub use source::{SamplingMode, TextureSource};
pub use gpu::{GpuTextures, DEPTH_FORMAT};

use image::RgbaImage;

/// Opaque handle to a texture registered with a scene
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub(crate) u32);

impl TextureHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A texture registered with a scene
#[derive(Clone, Debug)]
pub enum TextureData {
    /// Decoded RGBA pixels, uploaded once
    Image {
        label: String,
        image: RgbaImage,
        sampling: SamplingMode,
    },
    /// Depth attachment rendered by the opaque pass, sized to the surface
    DepthTarget { label: String },
}

impl TextureData {
    pub fn label(&self) -> &str {
        match self {
            TextureData::Image { label, .. } | TextureData::DepthTarget { label } => label,
        }
    }
}
