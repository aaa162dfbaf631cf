//! Host scene: mesh nodes, textures, shaders and appearance parameters

pub mod frame;
pub mod graph;
pub mod mesh;
pub mod node;
pub mod params;

pub use frame::{FrameContext, Renderable};
pub use graph::{Scene, SceneHost, ShaderSource};
pub use mesh::{MeshData, Vertex};
pub use node::{LocalTransform, NodeShading, SceneNode, SceneNodeId};
pub use params::SceneParameters;
