//! CPU-side scene: mesh nodes, texture registry, shader store and camera.
//!
//! [`SceneHost`] is the surface scene components are built against. [`Scene`]
//! is the in-process implementation the renderer uploads from.

use std::collections::{BTreeMap, HashMap};

use glam::Vec3;

use crate::core::camera::Camera;
use crate::core::{Error, Result};
use crate::render::texture::{SamplingMode, TextureData, TextureHandle, TextureSource};

use super::mesh::MeshData;
use super::node::{NodeShading, SceneNode, SceneNodeId};

/// WGSL source for a vertex/fragment pair registered under a key
#[derive(Clone, Debug, PartialEq)]
pub struct ShaderSource {
    pub wgsl: String,
    pub vertex_entry: String,
    pub fragment_entry: String,
}

impl ShaderSource {
    /// Single module exposing `vs_main` and `fs_main`
    pub fn wgsl(source: impl Into<String>) -> Self {
        Self {
            wgsl: source.into(),
            vertex_entry: "vs_main".to_string(),
            fragment_entry: "fs_main".to_string(),
        }
    }
}

/// What a scene component may ask of the scene it lives in
pub trait SceneHost {
    /// Add a mesh node at the origin; returns its ID
    fn add_mesh(&mut self, name: &str, mesh: MeshData) -> SceneNodeId;

    fn node(&self, id: SceneNodeId) -> Option<&SceneNode>;

    fn node_mut(&mut self, id: SceneNodeId) -> Option<&mut SceneNode>;

    /// Move a node; unknown IDs are ignored
    fn set_position(&mut self, id: SceneNodeId, position: Vec3) {
        if let Some(node) = self.node_mut(id) {
            node.transform.position = position;
        }
    }

    fn position(&self, id: SceneNodeId) -> Option<Vec3> {
        self.node(id).map(|node| node.transform.position)
    }

    /// Decode or generate a texture and register it
    fn load_texture(&mut self, source: &TextureSource, sampling: SamplingMode) -> Result<TextureHandle>;

    /// Look up a registered shader pair
    fn shader(&self, key: &str) -> Result<&ShaderSource>;

    /// Active camera
    fn camera(&self) -> &Camera;
}

/// In-process scene
pub struct Scene {
    nodes: BTreeMap<SceneNodeId, SceneNode>,
    next_id: u64,
    textures: Vec<TextureData>,
    shaders: HashMap<String, ShaderSource>,
    camera: Camera,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_id: 0,
            textures: Vec::new(),
            shaders: HashMap::new(),
            camera,
        }
    }

    /// Register a shader pair under `key`, replacing any previous one
    pub fn register_shader(&mut self, key: impl Into<String>, source: ShaderSource) {
        self.shaders.insert(key.into(), source);
    }

    /// Register a surface-sized depth target the opaque pass renders into
    pub fn register_depth_target(&mut self, label: impl Into<String>) -> TextureHandle {
        self.push_texture(TextureData::DepthTarget { label: label.into() })
    }

    /// Register already-decoded pixels
    pub fn register_image(&mut self, label: impl Into<String>, image: image::RgbaImage, sampling: SamplingMode) -> TextureHandle {
        self.push_texture(TextureData::Image {
            label: label.into(),
            image,
            sampling,
        })
    }

    pub fn textures(&self) -> &[TextureData] {
        &self.textures
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&TextureData> {
        self.textures.get(handle.index())
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.values()
    }

    /// Visible nodes drawn by the opaque pass
    pub fn opaque_nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes
            .values()
            .filter(|n| n.visible && matches!(n.shading, NodeShading::Opaque { .. }))
    }

    /// Visible nodes drawn with the named material
    pub fn nodes_with_material<'a>(&'a self, material: &'a str) -> impl Iterator<Item = &'a SceneNode> + 'a {
        self.nodes
            .values()
            .filter(move |n| n.visible && matches!(&n.shading, NodeShading::Material(m) if m == material))
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    fn push_texture(&mut self, data: TextureData) -> TextureHandle {
        let handle = TextureHandle(self.textures.len() as u32);
        log::debug!("Registered texture '{}' as {:?}", data.label(), handle);
        self.textures.push(data);
        handle
    }
}

impl SceneHost for Scene {
    fn add_mesh(&mut self, name: &str, mesh: MeshData) -> SceneNodeId {
        let id = SceneNodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, SceneNode::new(id, name, mesh));
        id
    }

    fn node(&self, id: SceneNodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    fn node_mut(&mut self, id: SceneNodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }

    fn load_texture(&mut self, source: &TextureSource, sampling: SamplingMode) -> Result<TextureHandle> {
        let image = source.load()?;
        log::info!("Loaded texture '{}' ({}x{})", source.label(), image.width(), image.height());
        Ok(self.register_image(source.label(), image, sampling))
    }

    fn shader(&self, key: &str) -> Result<&ShaderSource> {
        self.shaders
            .get(key)
            .ok_or_else(|| Error::MissingShader(key.to_string()))
    }

    fn camera(&self) -> &Camera {
        &self.camera
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::mesh;

    #[test]
    fn test_add_mesh_assigns_sequential_ids() {
        let mut scene = Scene::new(Camera::default());
        let a = scene.add_mesh("a", mesh::ground(1.0, 1));
        let b = scene.add_mesh("b", mesh::sphere(4, 1.0));
        assert_eq!(a, SceneNodeId(0));
        assert_eq!(b, SceneNodeId(1));
        assert_eq!(scene.node(b).map(|n| n.name.as_str()), Some("b"));
    }

    #[test]
    fn test_missing_shader_errors() {
        let scene = Scene::new(Camera::default());
        assert!(matches!(scene.shader("water"), Err(Error::MissingShader(key)) if key == "water"));
    }

    #[test]
    fn test_registered_shader_found() {
        let mut scene = Scene::new(Camera::default());
        scene.register_shader("water", ShaderSource::wgsl("// empty"));
        assert_eq!(scene.shader("water").unwrap().vertex_entry, "vs_main");
    }

    #[test]
    fn test_texture_handles_index_registry() {
        let mut scene = Scene::new(Camera::default());
        let depth = scene.register_depth_target("depth");
        let normal = scene
            .load_texture(&TextureSource::Procedural { size: 4, seed: 1 }, SamplingMode::Trilinear)
            .unwrap();

        assert!(matches!(scene.texture(depth), Some(TextureData::DepthTarget { .. })));
        assert!(matches!(
            scene.texture(normal),
            Some(TextureData::Image { sampling: SamplingMode::Trilinear, .. })
        ));
    }

    #[test]
    fn test_material_nodes_are_not_opaque() {
        let mut scene = Scene::new(Camera::default());
        let a = scene.add_mesh("water", mesh::ground(1.0, 1));
        scene.add_mesh("rock", mesh::sphere(4, 1.0));
        scene.node_mut(a).unwrap().shading = NodeShading::Material("waterShader".into());

        let opaque: Vec<_> = scene.opaque_nodes().map(|n| n.name.clone()).collect();
        let water: Vec<_> = scene.nodes_with_material("waterShader").map(|n| n.name.clone()).collect();
        assert_eq!(opaque, vec!["rock"]);
        assert_eq!(water, vec!["water"]);
    }

    #[test]
    fn test_set_position_moves_node() {
        let mut scene = Scene::new(Camera::default());
        let sun = scene.add_mesh("Sun", mesh::sphere(4, 1.0));

        scene.set_position(sun, Vec3::new(3.0, 15.0, 200.0));
        assert_eq!(scene.position(sun), Some(Vec3::new(3.0, 15.0, 200.0)));

        // unknown nodes are ignored
        scene.set_position(SceneNodeId(99), Vec3::ONE);
        assert_eq!(scene.position(SceneNodeId(99)), None);
    }
}
