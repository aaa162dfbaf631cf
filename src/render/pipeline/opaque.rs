//! Opaque mesh pipeline
//!
//! Draws every opaque scene node with Lambert shading and writes the depth
//! target that later passes (water) read as `_DepthTex`.

use bytemuck::{Pod, Zeroable};

use crate::core::camera::Camera;
use crate::render::buffer::MeshBuffer;
use crate::render::texture::DEPTH_FORMAT;
use crate::scene::{NodeShading, Scene, SceneHost, SceneNodeId, Vertex};

/// Per-node uniforms (must match opaque.wgsl)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct NodeUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub colour: [f32; 3],
    pub ambient: f32,
    pub light_position: [f32; 3],
    pub _pad: f32,
}

/// Pack uniforms for one node, `None` if it is gone or no longer opaque
fn node_uniforms(
    scene: &dyn SceneHost,
    id: SceneNodeId,
    view_proj: glam::Mat4,
    light_position: glam::Vec3,
) -> Option<NodeUniforms> {
    let node = scene.node(id)?;
    let NodeShading::Opaque { colour } = node.shading else {
        return None;
    };
    Some(NodeUniforms {
        view_proj: view_proj.to_cols_array_2d(),
        model: node.world_matrix().to_cols_array_2d(),
        colour,
        ambient: 0.25,
        light_position: light_position.to_array(),
        _pad: 0.0,
    })
}

struct OpaqueDraw {
    node: SceneNodeId,
    mesh: MeshBuffer,
    uniforms_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Render pipeline for opaque scene nodes
pub struct OpaquePipeline {
    pipeline: wgpu::RenderPipeline,
    draws: Vec<OpaqueDraw>,
}

impl OpaquePipeline {
    /// Create the pipeline and upload every opaque node of `scene`
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat, scene: &Scene) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("opaque_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../../shaders/opaque.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("opaque_node_layout"),
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("opaque_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("opaque_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        let draws = scene
            .opaque_nodes()
            .map(|node| {
                let uniforms_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(&format!("{}_uniforms", node.name)),
                    size: std::mem::size_of::<NodeUniforms>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("{}_bind_group", node.name)),
                    layout: &bind_group_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniforms_buffer.as_entire_binding(),
                    }],
                });
                OpaqueDraw {
                    node: node.id,
                    mesh: MeshBuffer::new(device, &node.name, &node.mesh),
                    uniforms_buffer,
                    bind_group,
                }
            })
            .collect::<Vec<_>>();

        log::info!("Opaque pass: {} nodes", draws.len());

        Self { pipeline, draws }
    }

    /// Write per-node uniforms for this frame
    pub fn update(&self, queue: &wgpu::Queue, scene: &Scene, camera: &Camera, light_position: glam::Vec3) {
        let view_proj = camera.view_projection();
        for draw in &self.draws {
            if let Some(uniforms) = node_uniforms(scene, draw.node, view_proj, light_position) {
                queue.write_buffer(&draw.uniforms_buffer, 0, bytemuck::bytes_of(&uniforms));
            }
        }
    }

    /// Clear colour and depth, then draw all opaque nodes
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        depth: &wgpu::TextureView,
        clear_colour: [f32; 3],
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("opaque_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: clear_colour[0] as f64,
                        g: clear_colour[1] as f64,
                        b: clear_colour[2] as f64,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_pipeline(&self.pipeline);
        for draw in &self.draws {
            pass.set_bind_group(0, &draw.bind_group, &[]);
            draw.mesh.draw(&mut pass);
        }
    }
}
