//! Floe - water surface viewer
//!
//! Usage: cargo run --release -- [OPTIONS]
//!
//! Options:
//!   --params <FILE>       SceneParameters JSON (default: built-in values)
//!   --normal-map <IMAGE>  Water normal map (default: procedural)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use noise::{NoiseFn, Perlin};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use floe::core::{camera::Camera, logging, time::FrameTimer, Result, Vec3};
use floe::render::{context::GpuContext, texture::TextureSource, WaterSceneRenderer};
use floe::scene::{mesh, FrameContext, NodeShading, Renderable, Scene, SceneHost, SceneParameters};
use floe::water::{self, WaterConfig, WaterSurface};

const ORBIT_RADIUS: f32 = 140.0;
const ORBIT_HEIGHT: f32 = 28.0;
/// Radians per second
const ORBIT_SPEED: f32 = 0.03;

struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    renderer: Option<WaterSceneRenderer>,
    scene: Scene,
    water: WaterSurface,
    params: SceneParameters,
    timer: FrameTimer,
}

impl App {
    fn new(params: SceneParameters, normal_map: TextureSource) -> Result<Self> {
        let mut scene = Scene::new(Camera::default());
        water::register_shaders(&mut scene);

        let seabed = scene.add_mesh("seabed", seabed_mesh(7));
        if let Some(node) = scene.node_mut(seabed) {
            node.shading = NodeShading::Opaque { colour: [0.55, 0.5, 0.4] };
        }

        let depth = scene.register_depth_target("scene_depth");
        let config = WaterConfig {
            normal_map,
            ..Default::default()
        };
        let water = WaterSurface::with_config(&mut scene, depth, &config)?;

        Ok(Self {
            window: None,
            gpu: None,
            renderer: None,
            scene,
            water,
            params,
            timer: FrameTimer::new(),
        })
    }

    fn orbit_camera(&mut self) {
        let angle = self.timer.elapsed().as_secs_f32() * ORBIT_SPEED;
        let camera = self.scene.camera_mut();
        camera.position = Vec3::new(angle.cos() * ORBIT_RADIUS, ORBIT_HEIGHT, angle.sin() * ORBIT_RADIUS);
        camera.face(Vec3::new(0.0, 1.0, 0.0));
    }

    fn render(&mut self) {
        let (Some(gpu), Some(renderer)) = (&self.gpu, &self.renderer) else {
            return;
        };

        let output = match gpu.get_current_texture() {
            Ok(t) => t,
            Err(e) => {
                log::error!("Failed to get surface texture: {}", e);
                return;
            }
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        if let Err(e) = renderer.render(gpu, &view, &self.scene, &self.water, &self.params) {
            log::error!("Frame failed: {}", e);
        }
        output.present();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title("Floe")
            .with_inner_size(PhysicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let gpu = match pollster::block_on(GpuContext::new(window.clone())) {
            Ok(gpu) => gpu,
            Err(e) => {
                log::error!("Failed to create GPU context: {}", e);
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.scene.camera_mut().set_aspect(size.width as f32, size.height as f32);
        log::info!("Window created: {}x{}", size.width, size.height);

        match WaterSceneRenderer::new(&gpu, &self.scene, &self.water) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(e) => {
                log::error!("Failed to create renderer: {}", e);
                event_loop.exit();
                return;
            }
        }

        self.window = Some(window);
        self.gpu = Some(gpu);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if size.width > 0 && size.height > 0 {
                    if let Some(gpu) = &mut self.gpu {
                        gpu.resize(size.width, size.height);
                        self.scene.camera_mut().set_aspect(size.width as f32, size.height as f32);

                        if let Some(renderer) = &mut self.renderer {
                            if let Err(e) = renderer.resize(&gpu.device, &self.water, size.width, size.height) {
                                log::error!("Resize failed: {}", e);
                            }
                        }
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                let now = self.timer.tick();
                self.orbit_camera();

                let frame = FrameContext {
                    now,
                    delta_secs: self.timer.delta_secs(),
                    scene: &self.scene,
                    params: &self.params,
                };
                self.water.update(&frame);

                self.render();

                if self.timer.frame_count() % 120 == 0 {
                    log::debug!("{:.1} FPS, t={:.1}s", self.timer.fps(), self.water.time());
                }

                if let Some(window) = &self.window {
                    window.set_title(&format!("Floe - {:.1} FPS", self.timer.fps()));
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Sea floor below the water with a few islands breaking the surface
fn seabed_mesh(seed: u32) -> mesh::MeshData {
    let perlin = Perlin::new(seed);
    mesh::heightfield(1000.0, 256, |x, z| {
        let (x, z) = (x as f64, z as f64);
        let broad = perlin.get([x / 180.0, z / 180.0]);
        let detail = perlin.get([x / 40.0, z / 40.0]) * 0.25;
        (-4.0 + (broad + detail) * 9.0) as f32
    })
}

fn main() {
    logging::init();
    log::info!("Floe starting...");

    let args: Vec<String> = std::env::args().collect();

    let params = match parse_path_arg(&args, "--params") {
        Some(path) => match SceneParameters::load(&path) {
            Ok(params) => {
                log::info!("Loaded scene parameters from {}", path.display());
                params
            }
            Err(e) => {
                log::error!("Failed to load {}: {}", path.display(), e);
                return;
            }
        },
        None => SceneParameters::default(),
    };

    let normal_map = parse_path_arg(&args, "--normal-map")
        .map(TextureSource::File)
        .unwrap_or_default();

    let started = Instant::now();
    let mut app = match App::new(params, normal_map) {
        Ok(app) => app,
        Err(e) => {
            log::error!("Failed to build scene: {}", e);
            return;
        }
    };
    log::info!("Scene built in {:.2?}", started.elapsed());

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {}", e);
            return;
        }
    };

    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
    }
}

/// Parse `<flag> <path>` from command line
fn parse_path_arg(args: &[String], flag: &str) -> Option<PathBuf> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}
