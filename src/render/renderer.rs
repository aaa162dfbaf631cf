//! Frame renderer for a scene containing one water surface
//!
//! Pass order: opaque nodes (colour + depth target), then the water mesh
//! blended on top while reading that depth target.

use crate::core::{Error, Result};
use crate::render::buffer::MeshBuffer;
use crate::render::context::GpuContext;
use crate::render::pipeline::{OpaquePipeline, WaterPipeline};
use crate::render::texture::GpuTextures;
use crate::scene::{Scene, SceneHost, SceneParameters};
use crate::water::WaterSurface;

pub struct WaterSceneRenderer {
    textures: GpuTextures,
    opaque: OpaquePipeline,
    water_pipeline: WaterPipeline,
    water_mesh: MeshBuffer,
    water_textures: wgpu::BindGroup,
}

impl WaterSceneRenderer {
    /// Upload `scene` and build both pipelines.
    ///
    /// Fails if the water material's shader or textures are missing.
    pub fn new(gpu: &GpuContext, scene: &Scene, water: &WaterSurface) -> Result<Self> {
        let (width, height) = gpu.size();
        let textures = GpuTextures::new(&gpu.device, &gpu.queue, scene.textures(), width, height);
        let opaque = OpaquePipeline::new(&gpu.device, gpu.format(), scene);

        let material = water.material();
        let shader = scene.shader(material.shader_key())?;
        let water_pipeline = WaterPipeline::new(&gpu.device, gpu.format(), shader, material);

        let node = scene
            .node(water.mesh())
            .ok_or_else(|| Error::Gpu(format!("water mesh {:?} missing from scene", water.mesh())))?;
        let water_mesh = MeshBuffer::new(&gpu.device, &node.name, &node.mesh);
        let water_textures = water_pipeline.create_texture_bind_group(&gpu.device, &textures, material)?;

        log::info!("Water mesh: {} triangles", water_mesh.index_count() / 3);

        Ok(Self {
            textures,
            opaque,
            water_pipeline,
            water_mesh,
            water_textures,
        })
    }

    /// Recreate surface-sized targets
    pub fn resize(&mut self, device: &wgpu::Device, water: &WaterSurface, width: u32, height: u32) -> Result<()> {
        self.textures.resize(device, width, height);
        self.water_textures = self
            .water_pipeline
            .create_texture_bind_group(device, &self.textures, water.material())?;
        Ok(())
    }

    /// Upload this frame's uniforms and draw into `target`
    pub fn render(
        &self,
        gpu: &GpuContext,
        target: &wgpu::TextureView,
        scene: &Scene,
        water: &WaterSurface,
        params: &SceneParameters,
    ) -> Result<()> {
        let material = water.material();
        let depth_handle = material
            .texture("_DepthTex")
            .ok_or_else(|| Error::InvalidTexture("water has no depth texture bound".into()))?;
        let depth_view = self
            .textures
            .depth_view(depth_handle)
            .ok_or_else(|| Error::InvalidTexture(format!("{depth_handle:?} is not a depth target")))?;

        let light_position = water.sun_position(scene).unwrap_or_default();
        self.opaque.update(&gpu.queue, scene, scene.camera(), light_position);
        self.water_pipeline.update_uniforms(&gpu.queue, material);

        let mut encoder = gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });
        self.opaque.render(&mut encoder, target, depth_view, params.fog_colour);
        self.water_pipeline.render(&mut encoder, target, &self.water_textures, &self.water_mesh);
        gpu.queue.submit(std::iter::once(encoder.finish()));

        Ok(())
    }
}
