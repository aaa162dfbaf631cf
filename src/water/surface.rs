//! Animated water surface: a subdivided plane shaded by the `water` shader
//! pair, with a sphere marking the sun the shader lights against.

use std::time::Instant;

use glam::Vec3;

use crate::core::time::elapsed_secs;
use crate::core::Result;
use crate::render::material::{ShaderInterface, ShaderMaterial};
use crate::render::texture::{SamplingMode, TextureHandle, TextureSource};
use crate::scene::mesh;
use crate::scene::{FrameContext, NodeShading, Renderable, SceneHost, SceneNodeId};

/// Shader store key of the water vertex/fragment pair
pub const WATER_SHADER: &str = "water";
/// Name of the water material; scene nodes reference it
pub const WATER_MATERIAL: &str = "waterShader";

pub const ATTRIBUTES: [&str; 3] = ["position", "normal", "uv"];

pub const SAMPLERS: [&str; 2] = ["_DepthTex", "_NormalMap"];

pub const UNIFORMS: [&str; 15] = [
    // transforms
    "worldViewProjection",
    "world",
    // set once at construction / every frame
    "_Time",
    "_CamNearFar",
    "_SunPosition",
    "_CamPosition",
    // appearance
    "_Shininess",
    "_Specular",
    "_MaxDepth",
    "_NormalMapSpeed",
    "_NormalMapSize",
    "_ColourShallow",
    "_ColourDeep",
    "_FogDensity",
    "_FogColour",
];

/// Construction constants for a [`WaterSurface`]
#[derive(Clone, Debug, PartialEq)]
pub struct WaterConfig {
    /// Side length of the square surface
    pub size: f32,
    /// Quads per side
    pub subdivisions: u32,
    /// Height of the surface above the scene origin
    pub elevation: f32,
    pub sun_position: Vec3,
    pub sun_diameter: f32,
    pub sun_segments: u32,
    pub normal_map: TextureSource,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            size: 1000.0,
            subdivisions: 128,
            elevation: 1.0,
            sun_position: Vec3::new(3.0, 15.0, 200.0),
            sun_diameter: 1.0,
            sun_segments: 16,
            normal_map: TextureSource::default(),
        }
    }
}

/// Water surface component.
///
/// Owns one mesh node, one shader material and the debug sun marker. The
/// material's bound names are fixed at construction; [`Renderable::update`]
/// only changes values.
pub struct WaterSurface {
    mesh: SceneNodeId,
    debug_sun: SceneNodeId,
    material: ShaderMaterial,
    start: Instant,
    time: f32,
}

impl WaterSurface {
    /// Build the surface with [`WaterConfig::default`]
    pub fn new<H: SceneHost + ?Sized>(host: &mut H, depth_texture: TextureHandle) -> Result<Self> {
        Self::with_config(host, depth_texture, &WaterConfig::default())
    }

    pub fn with_config<H: SceneHost + ?Sized>(
        host: &mut H,
        depth_texture: TextureHandle,
        config: &WaterConfig,
    ) -> Result<Self> {
        Self::with_config_at(host, depth_texture, config, Instant::now())
    }

    /// Build the surface with its animation clock starting at `start`.
    ///
    /// Fails if the `water` shader is not registered with the host or the
    /// normal map cannot be loaded. Nothing is added to the scene on failure.
    pub fn with_config_at<H: SceneHost + ?Sized>(
        host: &mut H,
        depth_texture: TextureHandle,
        config: &WaterConfig,
        start: Instant,
    ) -> Result<Self> {
        host.shader(WATER_SHADER)?;
        let normal_map = host.load_texture(&config.normal_map, SamplingMode::Trilinear)?;

        let mut material = ShaderMaterial::new(
            WATER_MATERIAL,
            WATER_SHADER,
            ShaderInterface::new(&ATTRIBUTES, &SAMPLERS, &UNIFORMS),
        )
        .with_alpha_blending(true);
        material.set_texture("_DepthTex", depth_texture);
        material.set_texture("_NormalMap", normal_map);
        material.set_vector2("_CamNearFar", host.camera().near_far());

        let water_mesh = host.add_mesh("water", mesh::ground(config.size, config.subdivisions));
        if let Some(node) = host.node_mut(water_mesh) {
            node.transform.position.y += config.elevation;
            node.shading = NodeShading::Material(WATER_MATERIAL.to_string());
        }

        let debug_sun = host.add_mesh("Sun", mesh::sphere(config.sun_segments, config.sun_diameter));
        if let Some(node) = host.node_mut(debug_sun) {
            node.transform.position = config.sun_position;
            node.shading = NodeShading::Opaque { colour: [1.0, 0.9, 0.4] };
        }

        log::info!(
            "Water surface created: {}x{} units, {} subdivisions",
            config.size, config.size, config.subdivisions
        );

        Ok(Self {
            mesh: water_mesh,
            debug_sun,
            material,
            start,
            time: 0.0,
        })
    }

    pub fn material(&self) -> &ShaderMaterial {
        &self.material
    }

    pub fn mesh(&self) -> SceneNodeId {
        self.mesh
    }

    pub fn debug_sun(&self) -> SceneNodeId {
        self.debug_sun
    }

    /// Current position of the sun marker in `host`
    pub fn sun_position<H: SceneHost + ?Sized>(&self, host: &H) -> Option<Vec3> {
        host.position(self.debug_sun)
    }

    /// Move the sun marker; the shader picks it up on the next update
    pub fn set_sun_position<H: SceneHost + ?Sized>(&self, host: &mut H, position: Vec3) {
        host.set_position(self.debug_sun, position);
    }

    /// Animation time pushed by the last update, in seconds
    pub fn time(&self) -> f32 {
        self.time
    }
}

impl Renderable for WaterSurface {
    fn update(&mut self, frame: &FrameContext<'_>) {
        // never step backwards if the host hands us an older instant
        self.time = self.time.max(elapsed_secs(self.start, frame.now));

        let params = frame.params;
        let camera = frame.camera();
        let m = &mut self.material;
        m.set_float("_Time", self.time);

        // nodes removed by the host keep their last pushed values
        if let Some(node) = frame.scene.node(self.mesh) {
            let world = node.world_matrix();
            m.set_matrix("world", world);
            m.set_matrix("worldViewProjection", camera.view_projection() * world);
        }
        if let Some(sun) = frame.scene.position(self.debug_sun) {
            m.set_vector3("_SunPosition", sun);
        }
        m.set_vector3("_CamPosition", camera.position);
        m.set_float("_Shininess", params.water_shininess);
        m.set_float("_Specular", params.water_specular);
        m.set_float("_MaxDepth", params.water_max_depth);
        m.set_float("_NormalMapSpeed", params.water_normal_map_speed);
        m.set_float("_NormalMapSize", params.water_normal_map_size);
        m.set_color3("_ColourShallow", params.water_colour_shallow);
        m.set_color3("_ColourDeep", params.water_colour_deep);
        m.set_float("_FogDensity", params.fog_density);
        m.set_color3("_FogColour", params.fog_colour);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::time::Duration;

    use super::*;
    use crate::core::camera::Camera;
    use crate::core::Error;
    use crate::render::material::UniformValue;
    use crate::render::texture::TextureData;
    use crate::scene::{Scene, SceneParameters, ShaderSource};

    fn small_config() -> WaterConfig {
        WaterConfig {
            subdivisions: 4,
            normal_map: TextureSource::Procedural { size: 8, seed: 1 },
            ..Default::default()
        }
    }

    fn scene_with_shader() -> (Scene, TextureHandle) {
        let mut scene = Scene::new(Camera::default());
        scene.register_shader(WATER_SHADER, ShaderSource::wgsl("// water"));
        let depth = scene.register_depth_target("depth");
        (scene, depth)
    }

    fn frame<'a>(now: Instant, scene: &'a Scene, params: &'a SceneParameters) -> FrameContext<'a> {
        FrameContext {
            now,
            delta_secs: 0.016,
            scene,
            params,
        }
    }

    fn names(iter: impl Iterator<Item = impl Into<String>>) -> BTreeSet<String> {
        iter.map(Into::into).collect()
    }

    #[test]
    fn test_construction_declares_exact_interface() {
        let (mut scene, depth) = scene_with_shader();
        let water = WaterSurface::with_config(&mut scene, depth, &small_config()).unwrap();
        let interface = water.material().interface();

        assert_eq!(interface.attributes, ATTRIBUTES.map(String::from).to_vec());
        assert_eq!(interface.samplers, SAMPLERS.map(String::from).to_vec());
        assert_eq!(interface.uniforms, UNIFORMS.map(String::from).to_vec());
        assert!(water.material().needs_alpha_blending());
        assert_eq!(water.material().shader_key(), WATER_SHADER);
    }

    #[test]
    fn test_construction_binds_samplers_and_near_far_only() {
        let (mut scene, depth) = scene_with_shader();
        let water = WaterSurface::with_config(&mut scene, depth, &small_config()).unwrap();
        let material = water.material();

        assert_eq!(names(material.bound_samplers()), names(SAMPLERS.into_iter()));
        assert_eq!(material.texture("_DepthTex"), Some(depth));
        let normal = material.texture("_NormalMap").unwrap();
        assert!(matches!(
            scene.texture(normal),
            Some(TextureData::Image { sampling: SamplingMode::Trilinear, .. })
        ));

        assert_eq!(names(material.bound_uniforms()), names(["_CamNearFar"].into_iter()));
        assert_eq!(
            material.uniform("_CamNearFar"),
            Some(UniformValue::Vec2(scene.camera().near_far()))
        );
    }

    #[test]
    fn test_update_binds_only_declared_uniforms() {
        let (mut scene, depth) = scene_with_shader();
        let mut water = WaterSurface::with_config(&mut scene, depth, &small_config()).unwrap();
        let params = SceneParameters::default();
        water.update(&frame(Instant::now(), &scene, &params));

        assert_eq!(names(water.material().bound_uniforms()), names(UNIFORMS.into_iter()));
        assert_eq!(names(water.material().bound_samplers()), names(SAMPLERS.into_iter()));
    }

    #[test]
    fn test_mesh_and_sun_placement() {
        let (mut scene, depth) = scene_with_shader();
        let config = small_config();
        let water = WaterSurface::with_config(&mut scene, depth, &config).unwrap();

        let mesh = scene.node(water.mesh()).unwrap();
        assert_eq!(mesh.transform.position, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(mesh.mesh.vertices.len(), 25);
        assert_eq!(mesh.shading, NodeShading::Material(WATER_MATERIAL.to_string()));

        let sun = scene.node(water.debug_sun()).unwrap();
        assert_eq!(sun.name, "Sun");
        assert_eq!(sun.transform.position, Vec3::new(3.0, 15.0, 200.0));
        assert_eq!(scene.nodes().count(), 2);
    }

    #[test]
    fn test_time_is_elapsed_millis_over_thousand() {
        let (mut scene, depth) = scene_with_shader();
        let start = Instant::now();
        let mut water = WaterSurface::with_config_at(&mut scene, depth, &small_config(), start).unwrap();
        let params = SceneParameters::default();

        water.update(&frame(start + Duration::from_millis(1250), &scene, &params));
        assert_eq!(water.material().float("_Time"), Some(1.25));
    }

    #[test]
    fn test_time_is_monotonic() {
        let (mut scene, depth) = scene_with_shader();
        let start = Instant::now();
        let mut water = WaterSurface::with_config_at(&mut scene, depth, &small_config(), start).unwrap();
        let params = SceneParameters::default();

        let mut previous = 0.0;
        for ms in [16u64, 33, 33, 50, 20, 400] {
            water.update(&frame(start + Duration::from_millis(ms), &scene, &params));
            let t = water.material().float("_Time").unwrap();
            assert!(t >= previous, "time went backwards: {t} < {previous}");
            previous = t;
        }
        assert_eq!(previous, 0.4);
    }

    #[test]
    fn test_update_pushes_parameters_and_positions() {
        let (mut scene, depth) = scene_with_shader();
        let mut water = WaterSurface::with_config(&mut scene, depth, &small_config()).unwrap();
        let params = SceneParameters {
            water_shininess: 12.0,
            fog_colour: [0.1, 0.2, 0.3],
            ..Default::default()
        };

        water.set_sun_position(&mut scene, Vec3::new(0.0, 50.0, 0.0));
        water.update(&frame(Instant::now(), &scene, &params));
        let m = water.material();

        assert_eq!(m.float("_Shininess"), Some(12.0));
        assert_eq!(m.uniform("_FogColour"), Some(UniformValue::Color3([0.1, 0.2, 0.3])));
        assert_eq!(m.uniform("_SunPosition"), Some(UniformValue::Vec3(Vec3::new(0.0, 50.0, 0.0))));
        assert_eq!(m.uniform("_CamPosition"), Some(UniformValue::Vec3(scene.camera().position)));
        assert_eq!(
            scene.node(water.debug_sun()).unwrap().transform.position,
            Vec3::new(0.0, 50.0, 0.0)
        );
    }

    #[test]
    fn test_update_follows_moved_nodes() {
        let (mut scene, depth) = scene_with_shader();
        let mut water = WaterSurface::with_config(&mut scene, depth, &small_config()).unwrap();
        let params = SceneParameters::default();

        scene.set_position(water.debug_sun(), Vec3::new(0.0, 99.0, 0.0));
        scene.set_position(water.mesh(), Vec3::new(0.0, 5.0, 0.0));
        water.update(&frame(Instant::now(), &scene, &params));

        let m = water.material();
        let world = glam::Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(m.uniform("_SunPosition"), Some(UniformValue::Vec3(Vec3::new(0.0, 99.0, 0.0))));
        assert_eq!(m.uniform("world"), Some(UniformValue::Mat4(world)));
        assert_eq!(
            m.uniform("worldViewProjection"),
            Some(UniformValue::Mat4(scene.camera().view_projection() * world))
        );
        assert_eq!(water.sun_position(&scene), Some(Vec3::new(0.0, 99.0, 0.0)));
    }

    #[test]
    fn test_missing_shader_propagates() {
        let mut scene = Scene::new(Camera::default());
        let depth = scene.register_depth_target("depth");

        let result = WaterSurface::with_config(&mut scene, depth, &small_config());
        assert!(matches!(result, Err(Error::MissingShader(_))));
        assert_eq!(scene.nodes().count(), 0);
    }

    #[test]
    fn test_invalid_normal_map_propagates() {
        let (mut scene, depth) = scene_with_shader();
        let config = WaterConfig {
            normal_map: TextureSource::Procedural { size: 0, seed: 1 },
            ..small_config()
        };

        let result = WaterSurface::with_config(&mut scene, depth, &config);
        assert!(matches!(result, Err(Error::InvalidTexture(_))));
        assert_eq!(scene.nodes().count(), 0);
    }
}
