//! GPU residency for scene textures

use std::collections::HashMap;

use wgpu::util::DeviceExt;

use super::source::{mip_chain, SamplingMode};
use super::{TextureData, TextureHandle};

/// Format of depth targets produced by the opaque pass
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

struct GpuTexture {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// Uploaded scene textures, surface-sized depth targets and one sampler per
/// [`SamplingMode`]
pub struct GpuTextures {
    images: HashMap<TextureHandle, GpuTexture>,
    depth_targets: HashMap<TextureHandle, (String, GpuTexture)>,
    samplers: HashMap<SamplingMode, wgpu::Sampler>,
}

impl GpuTextures {
    /// Upload every registered texture. Image textures sampled trilinearly get
    /// a full mip chain; depth targets are created at `width` x `height`.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        textures: &[TextureData],
        width: u32,
        height: u32,
    ) -> Self {
        let mut images = HashMap::new();
        let mut depth_targets = HashMap::new();

        for (index, data) in textures.iter().enumerate() {
            let handle = TextureHandle(index as u32);
            match data {
                TextureData::Image { label, image, sampling } => {
                    let levels = if sampling.uses_mipmaps() {
                        mip_chain(image)
                    } else {
                        vec![image.clone()]
                    };
                    let bytes: Vec<u8> = levels.iter().flat_map(|level| level.as_raw().iter().copied()).collect();

                    let texture = device.create_texture_with_data(
                        queue,
                        &wgpu::TextureDescriptor {
                            label: Some(label),
                            size: wgpu::Extent3d {
                                width: image.width(),
                                height: image.height(),
                                depth_or_array_layers: 1,
                            },
                            mip_level_count: levels.len() as u32,
                            sample_count: 1,
                            dimension: wgpu::TextureDimension::D2,
                            format: wgpu::TextureFormat::Rgba8Unorm,
                            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                            view_formats: &[],
                        },
                        wgpu::util::TextureDataOrder::LayerMajor,
                        &bytes,
                    );
                    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
                    log::debug!("Uploaded texture '{}' ({} mip levels)", label, levels.len());
                    images.insert(handle, GpuTexture { texture, view });
                }
                TextureData::DepthTarget { label } => {
                    let target = create_depth_target(device, label, width, height);
                    depth_targets.insert(handle, (label.clone(), target));
                }
            }
        }

        let samplers = [SamplingMode::Nearest, SamplingMode::Bilinear, SamplingMode::Trilinear]
            .into_iter()
            .map(|mode| (mode, create_sampler(device, mode)))
            .collect();

        Self {
            images,
            depth_targets,
            samplers,
        }
    }

    /// Recreate depth targets at the new surface size
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        for (label, target) in self.depth_targets.values_mut() {
            *target = create_depth_target(device, label, width, height);
        }
    }

    /// View for any registered texture
    pub fn view(&self, handle: TextureHandle) -> Option<&wgpu::TextureView> {
        self.images
            .get(&handle)
            .or_else(|| self.depth_targets.get(&handle).map(|(_, target)| target))
            .map(|t| &t.view)
    }

    /// View for a depth target, `None` if `handle` is not one
    pub fn depth_view(&self, handle: TextureHandle) -> Option<&wgpu::TextureView> {
        self.depth_targets.get(&handle).map(|(_, target)| &target.view)
    }

    pub fn sampler(&self, mode: SamplingMode) -> &wgpu::Sampler {
        &self.samplers[&mode]
    }
}

fn create_depth_target(device: &wgpu::Device, label: &str, width: u32, height: u32) -> GpuTexture {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    GpuTexture { texture, view }
}

fn create_sampler(device: &wgpu::Device, mode: SamplingMode) -> wgpu::Sampler {
    let (filter, mipmap_filter) = match mode {
        SamplingMode::Nearest => (wgpu::FilterMode::Nearest, wgpu::MipmapFilterMode::Nearest),
        SamplingMode::Bilinear => (wgpu::FilterMode::Linear, wgpu::MipmapFilterMode::Nearest),
        SamplingMode::Trilinear => (wgpu::FilterMode::Linear, wgpu::MipmapFilterMode::Linear),
    };

    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(&format!("{:?}_sampler", mode).to_lowercase()),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: filter,
        min_filter: filter,
        mipmap_filter,
        ..Default::default()
    })
}
