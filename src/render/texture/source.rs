//! CPU-side texture sources: decoded image files and procedural normal maps

use std::path::PathBuf;

use image::{imageops::FilterType, Rgba, RgbaImage};
use noise::{NoiseFn, Perlin};

use crate::core::{Error, Result};

/// Filtering applied when a texture is sampled
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SamplingMode {
    Nearest,
    #[default]
    Bilinear,
    /// Linear filtering between texels and between mip levels
    Trilinear,
}

impl SamplingMode {
    /// Whether textures sampled this way need a full mip chain
    pub fn uses_mipmaps(self) -> bool {
        matches!(self, SamplingMode::Trilinear)
    }
}

/// Where a texture's pixels come from
#[derive(Clone, Debug, PartialEq)]
pub enum TextureSource {
    /// Image file decoded with the `image` crate
    File(PathBuf),
    /// Tileable normal map generated from Perlin noise
    Procedural { size: u32, seed: u32 },
}

impl Default for TextureSource {
    fn default() -> Self {
        TextureSource::Procedural { size: 512, seed: 325 }
    }
}

impl TextureSource {
    /// Human-readable label used for GPU resources and logs
    pub fn label(&self) -> String {
        match self {
            TextureSource::File(path) => path.display().to_string(),
            TextureSource::Procedural { size, seed } => format!("procedural_normal_{size}_{seed}"),
        }
    }

    /// Decode or generate the texture as RGBA8
    pub fn load(&self) -> Result<RgbaImage> {
        let image = match self {
            TextureSource::File(path) => image::open(path)?.to_rgba8(),
            TextureSource::Procedural { size, seed } => procedural_normal_map(*size, *seed)?,
        };

        if image.width() == 0 || image.height() == 0 {
            return Err(Error::InvalidTexture(format!("{} has zero size", self.label())));
        }
        Ok(image)
    }
}

/// Generate a tileable tangent-space normal map.
///
/// Heights come from three octaves of 4D Perlin noise sampled on a torus, so
/// the left/right and top/bottom edges wrap seamlessly. Normals are encoded
/// as `n * 0.5 + 0.5` with +Z (blue) pointing out of the surface.
pub fn procedural_normal_map(size: u32, seed: u32) -> Result<RgbaImage> {
    if size == 0 {
        return Err(Error::InvalidTexture("procedural normal map size is zero".into()));
    }

    let perlin = Perlin::new(seed);
    let n = size as usize;
    let tau = std::f64::consts::TAU;

    let mut heights = vec![0.0f32; n * n];
    for y in 0..n {
        for x in 0..n {
            let a = tau * x as f64 / n as f64;
            let b = tau * y as f64 / n as f64;
            let mut h = 0.0;
            let mut amplitude = 1.0;
            let mut radius = 1.5;
            for _ in 0..3 {
                let p = [
                    a.cos() * radius,
                    a.sin() * radius,
                    b.cos() * radius,
                    b.sin() * radius,
                ];
                h += perlin.get(p) * amplitude;
                amplitude *= 0.5;
                radius *= 2.0;
            }
            heights[y * n + x] = h as f32;
        }
    }

    let strength = size as f32 / 64.0;
    let height_at = |x: usize, y: usize| heights[(y % n) * n + (x % n)];

    let mut image = RgbaImage::new(size, size);
    for y in 0..n {
        for x in 0..n {
            let dx = height_at(x + 1, y) - height_at(x + n - 1, y);
            let dy = height_at(x, y + 1) - height_at(x, y + n - 1);
            let normal = glam::Vec3::new(-dx * strength, -dy * strength, 1.0).normalize();
            let encoded = normal * 0.5 + glam::Vec3::splat(0.5);
            image.put_pixel(
                x as u32,
                y as u32,
                Rgba([
                    (encoded.x * 255.0).round() as u8,
                    (encoded.y * 255.0).round() as u8,
                    (encoded.z * 255.0).round() as u8,
                    255,
                ]),
            );
        }
    }

    Ok(image)
}

/// Number of mip levels for a full chain down to 1x1
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Build the full mip chain, level 0 first
pub fn mip_chain(image: &RgbaImage) -> Vec<RgbaImage> {
    let levels = mip_level_count(image.width(), image.height());
    let mut chain = Vec::with_capacity(levels as usize);
    chain.push(image.clone());

    for level in 1..levels {
        let width = (image.width() >> level).max(1);
        let height = (image.height() >> level).max(1);
        let previous = &chain[level as usize - 1];
        chain.push(image::imageops::resize(previous, width, height, FilterType::Triangle));
    }

    chain
}
