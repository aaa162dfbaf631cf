//! Shader materials: a shader pair, its declared interface, and the values
//! bound to it.
//!
//! A material only ever holds bindings for names its [`ShaderInterface`]
//! declares. Writes to anything else are dropped with a warning, so the set
//! of bound names can never drift from what the shader expects.

use std::collections::BTreeMap;

use crate::core::types::{Mat4, Vec2, Vec3};
use crate::render::texture::TextureHandle;

/// A value stored in a uniform slot
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    /// Linear RGB colour
    Color3([f32; 3]),
    Mat4(Mat4),
}

/// Attribute, sampler and uniform names a shader pair consumes
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShaderInterface {
    pub attributes: Vec<String>,
    pub samplers: Vec<String>,
    pub uniforms: Vec<String>,
}

impl ShaderInterface {
    pub fn new(attributes: &[&str], samplers: &[&str], uniforms: &[&str]) -> Self {
        let owned = |names: &[&str]| names.iter().map(|n| n.to_string()).collect();
        Self {
            attributes: owned(attributes),
            samplers: owned(samplers),
            uniforms: owned(uniforms),
        }
    }

    pub fn declares_uniform(&self, name: &str) -> bool {
        self.uniforms.iter().any(|u| u == name)
    }

    pub fn declares_sampler(&self, name: &str) -> bool {
        self.samplers.iter().any(|s| s == name)
    }
}

/// Shader program reference plus uniform and sampler bindings
#[derive(Clone, Debug)]
pub struct ShaderMaterial {
    name: String,
    shader_key: String,
    interface: ShaderInterface,
    uniforms: BTreeMap<String, UniformValue>,
    samplers: BTreeMap<String, TextureHandle>,
    needs_alpha_blending: bool,
}

impl ShaderMaterial {
    /// Create a material for the vertex/fragment pair registered as `shader_key`
    pub fn new(name: &str, shader_key: &str, interface: ShaderInterface) -> Self {
        Self {
            name: name.to_string(),
            shader_key: shader_key.to_string(),
            interface,
            uniforms: BTreeMap::new(),
            samplers: BTreeMap::new(),
            needs_alpha_blending: false,
        }
    }

    pub fn with_alpha_blending(mut self, enabled: bool) -> Self {
        self.needs_alpha_blending = enabled;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shader_key(&self) -> &str {
        &self.shader_key
    }

    pub fn interface(&self) -> &ShaderInterface {
        &self.interface
    }

    pub fn needs_alpha_blending(&self) -> bool {
        self.needs_alpha_blending
    }

    /// Store a uniform value. Undeclared names are ignored.
    pub fn set_uniform(&mut self, name: &str, value: UniformValue) {
        if !self.interface.declares_uniform(name) {
            log::warn!("Material '{}': ignoring undeclared uniform '{}'", self.name, name);
            return;
        }
        self.uniforms.insert(name.to_string(), value);
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.set_uniform(name, UniformValue::Float(value));
    }

    pub fn set_vector2(&mut self, name: &str, value: Vec2) {
        self.set_uniform(name, UniformValue::Vec2(value));
    }

    pub fn set_vector3(&mut self, name: &str, value: Vec3) {
        self.set_uniform(name, UniformValue::Vec3(value));
    }

    pub fn set_color3(&mut self, name: &str, value: [f32; 3]) {
        self.set_uniform(name, UniformValue::Color3(value));
    }

    pub fn set_matrix(&mut self, name: &str, value: Mat4) {
        self.set_uniform(name, UniformValue::Mat4(value));
    }

    /// Bind a texture to a sampler slot. Undeclared names are ignored.
    pub fn set_texture(&mut self, name: &str, texture: TextureHandle) {
        if !self.interface.declares_sampler(name) {
            log::warn!("Material '{}': ignoring undeclared sampler '{}'", self.name, name);
            return;
        }
        self.samplers.insert(name.to_string(), texture);
    }

    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.get(name).copied()
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.uniform(name)? {
            UniformValue::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn texture(&self, name: &str) -> Option<TextureHandle> {
        self.samplers.get(name).copied()
    }

    /// Names of uniforms that currently hold a value
    pub fn bound_uniforms(&self) -> impl Iterator<Item = &str> {
        self.uniforms.keys().map(String::as_str)
    }

    /// Names of samplers that currently hold a texture
    pub fn bound_samplers(&self) -> impl Iterator<Item = &str> {
        self.samplers.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material() -> ShaderMaterial {
        ShaderMaterial::new(
            "test",
            "test",
            ShaderInterface::new(&["position"], &["_Tex"], &["_A", "_B"]),
        )
    }

    #[test]
    fn test_declared_uniform_is_stored() {
        let mut m = material();
        m.set_float("_A", 2.5);
        assert_eq!(m.float("_A"), Some(2.5));
        assert_eq!(m.bound_uniforms().collect::<Vec<_>>(), vec!["_A"]);
    }

    #[test]
    fn test_undeclared_uniform_is_dropped() {
        let mut m = material();
        m.set_float("_Missing", 1.0);
        m.set_texture("_Other", TextureHandle(0));
        assert_eq!(m.uniform("_Missing"), None);
        assert_eq!(m.bound_uniforms().count(), 0);
        assert_eq!(m.bound_samplers().count(), 0);
    }

    #[test]
    fn test_overwrite_keeps_single_binding() {
        let mut m = material();
        m.set_vector3("_B", Vec3::ONE);
        m.set_vector3("_B", Vec3::ZERO);
        assert_eq!(m.uniform("_B"), Some(UniformValue::Vec3(Vec3::ZERO)));
        assert_eq!(m.bound_uniforms().count(), 1);
    }

    #[test]
    fn test_float_accessor_rejects_other_kinds() {
        let mut m = material();
        m.set_color3("_A", [1.0, 0.0, 0.0]);
        assert_eq!(m.float("_A"), None);
    }
}
