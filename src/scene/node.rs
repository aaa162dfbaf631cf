//! Scene node types
//!
//! Node IDs, transforms, and what a node draws with.

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

use super::mesh::MeshData;

/// Unique identifier for a scene node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneNodeId(pub u64);

/// Node transform in world space.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }
}

impl LocalTransform {
    /// Convert to a 4x4 matrix.
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.rotation,
            self.position,
        )
    }
}

/// How a node is shaded.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeShading {
    /// Lambert-lit flat colour, drawn by the opaque pass (writes depth).
    Opaque { colour: [f32; 3] },
    /// Drawn by the pipeline owning the named shader material.
    Material(String),
}

/// A mesh placed in the scene.
#[derive(Clone, Debug)]
pub struct SceneNode {
    pub id: SceneNodeId,
    pub name: String,
    pub mesh: Arc<MeshData>,
    pub transform: LocalTransform,
    pub shading: NodeShading,
    pub visible: bool,
}

impl SceneNode {
    pub fn new(id: SceneNodeId, name: impl Into<String>, mesh: MeshData) -> Self {
        Self {
            id,
            name: name.into(),
            mesh: Arc::new(mesh),
            transform: LocalTransform::default(),
            shading: NodeShading::Opaque { colour: [0.8, 0.8, 0.8] },
            visible: true,
        }
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.transform.to_mat4()
    }
}
