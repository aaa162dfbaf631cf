//! Water rendering pipeline

use bytemuck::{Pod, Zeroable};

use crate::core::{Error, Result};
use crate::render::buffer::MeshBuffer;
use crate::render::material::{ShaderMaterial, UniformValue};
use crate::render::texture::{GpuTextures, SamplingMode};
use crate::scene::{ShaderSource, Vertex};

/// Water uniform block (must match `WaterUniforms` in water.wgsl).
///
/// Each vec3 shares its 16-byte slot with the scalar that follows it.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct WaterUniforms {
    /// offset 0
    pub world_view_projection: [[f32; 4]; 4],
    /// offset 64
    pub world: [[f32; 4]; 4],
    /// offset 128
    pub sun_position: [f32; 3],
    pub time: f32,
    /// offset 144
    pub cam_position: [f32; 3],
    pub shininess: f32,
    /// offset 160
    pub colour_shallow: [f32; 3],
    pub specular: f32,
    /// offset 176
    pub colour_deep: [f32; 3],
    pub max_depth: f32,
    /// offset 192
    pub fog_colour: [f32; 3],
    pub fog_density: f32,
    /// offset 208
    pub cam_near_far: [f32; 2],
    pub normal_map_speed: f32,
    pub normal_map_size: f32,
}

impl Default for WaterUniforms {
    fn default() -> Self {
        Self {
            world_view_projection: glam::Mat4::IDENTITY.to_cols_array_2d(),
            world: glam::Mat4::IDENTITY.to_cols_array_2d(),
            sun_position: [0.0; 3],
            time: 0.0,
            cam_position: [0.0; 3],
            shininess: 1.0,
            colour_shallow: [1.0; 3],
            specular: 0.0,
            colour_deep: [0.0; 3],
            max_depth: 1.0,
            fog_colour: [1.0; 3],
            fog_density: 0.0,
            cam_near_far: [0.1, 1000.0],
            normal_map_speed: 0.0,
            normal_map_size: 1.0,
        }
    }
}

impl WaterUniforms {
    /// Pack the material's uniform store. Unset or mistyped slots keep their
    /// default value.
    pub fn from_material(material: &ShaderMaterial) -> Self {
        let mut u = Self::default();

        let mat4 = |name: &str, out: &mut [[f32; 4]; 4]| {
            if let Some(UniformValue::Mat4(m)) = material.uniform(name) {
                *out = m.to_cols_array_2d();
            }
        };
        mat4("worldViewProjection", &mut u.world_view_projection);
        mat4("world", &mut u.world);

        let vec3 = |name: &str, out: &mut [f32; 3]| match material.uniform(name) {
            Some(UniformValue::Vec3(v)) => *out = v.to_array(),
            Some(UniformValue::Color3(c)) => *out = c,
            _ => {}
        };
        vec3("_SunPosition", &mut u.sun_position);
        vec3("_CamPosition", &mut u.cam_position);
        vec3("_ColourShallow", &mut u.colour_shallow);
        vec3("_ColourDeep", &mut u.colour_deep);
        vec3("_FogColour", &mut u.fog_colour);

        let float = |name: &str, out: &mut f32| {
            if let Some(v) = material.float(name) {
                *out = v;
            }
        };
        float("_Time", &mut u.time);
        float("_Shininess", &mut u.shininess);
        float("_Specular", &mut u.specular);
        float("_MaxDepth", &mut u.max_depth);
        float("_FogDensity", &mut u.fog_density);
        float("_NormalMapSpeed", &mut u.normal_map_speed);
        float("_NormalMapSize", &mut u.normal_map_size);

        if let Some(UniformValue::Vec2(v)) = material.uniform("_CamNearFar") {
            u.cam_near_far = v.to_array();
        }

        u
    }
}

/// Forward pass drawing the water mesh over the opaque scene.
///
/// Group 0 holds the uniform block; group 1 the depth texture (`_DepthTex`),
/// normal map (`_NormalMap`) and its sampler.
pub struct WaterPipeline {
    pipeline: wgpu::RenderPipeline,
    uniforms_buffer: wgpu::Buffer,
    uniforms_bind_group: wgpu::BindGroup,
    texture_bind_group_layout: wgpu::BindGroupLayout,
}

impl WaterPipeline {
    /// Compile the material's shader pair and create the pipeline
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        shader: &ShaderSource,
        material: &ShaderMaterial,
    ) -> Self {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("water_shader"),
            source: wgpu::ShaderSource::Wgsl(shader.wgsl.as_str().into()),
        });

        let uniforms_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("water_uniforms"),
            size: std::mem::size_of::<WaterUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniforms_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("water_uniforms_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniforms_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("water_uniforms_bind_group"),
            layout: &uniforms_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms_buffer.as_entire_binding(),
            }],
        });

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("water_textures_layout"),
                entries: &[
                    // _DepthTex
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Depth,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    // _NormalMap
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("water_pipeline_layout"),
            bind_group_layouts: &[&uniforms_bind_group_layout, &texture_bind_group_layout],
            immediate_size: 0,
        });

        let blend = if material.needs_alpha_blending() {
            Some(wgpu::BlendState::ALPHA_BLENDING)
        } else {
            None
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("water_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some(shader.vertex_entry.as_str()),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            // occlusion against the opaque scene is resolved in the shader
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some(shader.fragment_entry.as_str()),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            uniforms_buffer,
            uniforms_bind_group,
            texture_bind_group_layout,
        }
    }

    /// Bind the textures the material's sampler slots point at.
    ///
    /// Must be recreated whenever the depth target is resized.
    pub fn create_texture_bind_group(
        &self,
        device: &wgpu::Device,
        textures: &GpuTextures,
        material: &ShaderMaterial,
    ) -> Result<wgpu::BindGroup> {
        let slot = |name: &str| {
            material
                .texture(name)
                .ok_or_else(|| Error::InvalidTexture(format!("sampler '{name}' has no texture bound")))
        };
        let depth = slot("_DepthTex")?;
        let normal = slot("_NormalMap")?;

        let depth_view = textures
            .depth_view(depth)
            .ok_or_else(|| Error::InvalidTexture(format!("{depth:?} is not a depth target")))?;
        let normal_view = textures
            .view(normal)
            .ok_or_else(|| Error::InvalidTexture(format!("{normal:?} was never uploaded")))?;

        Ok(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("water_textures_bind_group"),
            layout: &self.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(depth_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(normal_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(textures.sampler(SamplingMode::Trilinear)),
                },
            ],
        }))
    }

    /// Upload the material's current uniform values
    pub fn update_uniforms(&self, queue: &wgpu::Queue, material: &ShaderMaterial) {
        let uniforms = WaterUniforms::from_material(material);
        queue.write_buffer(&self.uniforms_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Draw `mesh` over the existing contents of `target`
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        texture_bind_group: &wgpu::BindGroup,
        mesh: &MeshBuffer,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("water_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniforms_bind_group, &[]);
        pass.set_bind_group(1, texture_bind_group, &[]);
        mesh.draw(&mut pass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::material::ShaderInterface;
    use crate::water::surface::{ATTRIBUTES, SAMPLERS, UNIFORMS};
    use glam::{Mat4, Vec2, Vec3};

    fn water_material() -> ShaderMaterial {
        ShaderMaterial::new("waterShader", "water", ShaderInterface::new(&ATTRIBUTES, &SAMPLERS, &UNIFORMS))
    }

    #[test]
    fn test_uniform_size() {
        // Must be exactly 224 bytes to match the WGSL struct layout
        assert_eq!(std::mem::size_of::<WaterUniforms>(), 224);
        assert_eq!(std::mem::size_of::<WaterUniforms>() % 16, 0);
    }

    #[test]
    fn test_unset_material_packs_defaults() {
        assert_eq!(WaterUniforms::from_material(&water_material()), WaterUniforms::default());
    }

    #[test]
    fn test_from_material() {
        let mut m = water_material();
        m.set_float("_Time", 2.5);
        m.set_vector2("_CamNearFar", Vec2::new(0.5, 800.0));
        m.set_vector3("_SunPosition", Vec3::new(3.0, 15.0, 200.0));
        m.set_color3("_ColourDeep", [0.0, 0.1, 0.2]);
        m.set_float("_NormalMapSize", 40.0);
        m.set_matrix("world", Mat4::from_translation(Vec3::Y));

        let u = WaterUniforms::from_material(&m);
        assert_eq!(u.time, 2.5);
        assert_eq!(u.cam_near_far, [0.5, 800.0]);
        assert_eq!(u.sun_position, [3.0, 15.0, 200.0]);
        assert_eq!(u.colour_deep, [0.0, 0.1, 0.2]);
        assert_eq!(u.normal_map_size, 40.0);
        assert_eq!(u.world[3], [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_mistyped_value_keeps_default() {
        let mut m = water_material();
        m.set_vector3("_Time", Vec3::ONE);
        assert_eq!(WaterUniforms::from_material(&m).time, 0.0);
    }
}
