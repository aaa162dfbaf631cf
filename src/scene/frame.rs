//! Per-frame update contract between the host loop and scene components

use std::time::Instant;

use crate::core::camera::Camera;

use super::graph::SceneHost;
use super::params::SceneParameters;

/// Everything a component may read during a frame update
#[derive(Clone, Copy)]
pub struct FrameContext<'a> {
    /// Wall-clock instant of this frame
    pub now: Instant,
    /// Seconds since the previous frame
    pub delta_secs: f32,
    /// Scene as it stands this frame; node transforms are read live from here
    pub scene: &'a dyn SceneHost,
    pub params: &'a SceneParameters,
}

impl<'a> FrameContext<'a> {
    pub fn camera(&self) -> &'a Camera {
        self.scene.camera()
    }
}

/// A scene component driven once per rendered frame by the host loop
pub trait Renderable {
    fn update(&mut self, frame: &FrameContext<'_>);
}
