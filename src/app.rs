//! The scene viewer: a canvas, a mesh cache, an asset source and the local
//! executor loads run on, driven one frame at a time by the host.

use std::{path::Path, rc::Rc};

use anyhow::{bail, Context};
use cgmath::{Matrix4, Vector3};
use futures::executor::LocalPool;

use crate::{
    config::{ViewerConfig, DEFAULT_SHADER},
    error::{RenderError, SpecError},
    gfx::{
        camera::{Camera, RotationInterpolation},
        mesh::{MeshHandle, NORMAL_SHADER, POINT_SHADER},
        rendering::{
            shader::{FLAT_SLOTS, LIT_SLOTS, NORMAL_LINE_SLOTS},
            Canvas, RenderBackend,
        },
        resources::material::{color_from_hex, Material},
        scene::{RepaintSignal, Scene, SceneContext, SceneSpec},
    },
    loader::{AssetSource, MeshCache, Primitive},
};

/// Shader camera and light beacons are drawn with.
pub const FLAT_SHADER: &str = "flat";

/// Hex color of camera beacons.
pub const CAMERA_BEACON_COLOR: &str = "A7383E";

/// A fly-through between scene cameras.
#[derive(Debug, Clone)]
struct CameraAnimation {
    sequence: Vec<usize>,
    frames_per_step: usize,
    frame: usize,
    interpolation: RotationInterpolation,
    camera_before: Camera,
}

pub struct SceneViewer<B: RenderBackend> {
    config: ViewerConfig,
    pub canvas: Canvas<B>,
    cache: MeshCache,
    source: Rc<dyn AssetSource>,
    pool: LocalPool,
    repaint: RepaintSignal,
    scene: Option<Scene>,
    /// Scene camera the canvas is looking through
    camera_index: Option<usize>,
    animation: Option<CameraAnimation>,
    pub show_cameras: bool,
    pub show_lights: bool,
}

impl<B: RenderBackend> SceneViewer<B> {
    /// Creates a viewer with no render context yet.
    ///
    /// The configured default shader, the flat beacon shader and the
    /// overlay shaders are registered and the default shader is selected.
    pub fn new(config: ViewerConfig, source: impl AssetSource + 'static) -> Self {
        let mut canvas = Canvas::new();
        let default_shader = if config.default_shader.is_empty() {
            DEFAULT_SHADER
        } else {
            config.default_shader.as_str()
        };
        canvas.register_shader(default_shader, LIT_SLOTS.iter().copied());
        canvas.register_shader(FLAT_SHADER, FLAT_SLOTS.iter().copied());
        canvas.register_shader(POINT_SHADER, FLAT_SLOTS.iter().copied());
        canvas.register_shader(NORMAL_SHADER, NORMAL_LINE_SLOTS.iter().copied());
        canvas.use_shader(default_shader);

        Self {
            cache: MeshCache::new(&config),
            show_cameras: config.show_cameras,
            show_lights: config.show_lights,
            config,
            canvas,
            source: Rc::new(source),
            pool: LocalPool::new(),
            repaint: RepaintSignal::default(),
            scene: None,
            camera_index: None,
            animation: None,
        }
    }

    pub fn with_backend(mut self, backend: B) -> Self {
        self.init_backend(backend);
        self
    }

    /// Attaches the render context and marks every mesh for upload to it.
    pub fn init_backend(&mut self, backend: B) {
        self.canvas.init(backend);
        self.cache.mark_all_dirty();
        self.update_mesh_drawings();
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn cache(&self) -> &MeshCache {
        &self.cache
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn camera_index(&self) -> Option<usize> {
        self.camera_index
    }

    /// Replaces the current scene and looks through its first camera.
    pub fn setup_scene(&mut self, spec: &SceneSpec) -> Result<(), SpecError> {
        let ctx = SceneContext::new(
            &self.config,
            self.cache.clone(),
            self.source.clone(),
            self.pool.spawner(),
            self.repaint.clone(),
        );
        let scene = Scene::from_spec(spec, &ctx)?;
        log::info!(
            "loaded scene `{}`: {} lights, {} cameras, {} materials",
            scene.name,
            scene.lights.len(),
            scene.cameras.len(),
            scene.materials.borrow().len()
        );

        self.canvas.lights = scene.lights.clone();
        self.animation = None;
        self.camera_index = None;
        self.scene = Some(scene);
        self.select_camera(0);
        Ok(())
    }

    pub fn load_scene_json(&mut self, text: &str) -> Result<(), SpecError> {
        self.setup_scene(&SceneSpec::from_json(text)?)
    }

    pub fn load_scene_file(&mut self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scene file {}", path.display()))?;
        self.load_scene_json(&text)
            .with_context(|| format!("failed to set up scene {}", path.display()))?;
        Ok(())
    }

    /// Runs pending loads as far as they can go without blocking. Returns
    /// whether the scene should be repainted.
    pub fn poll(&mut self) -> bool {
        self.pool.run_until_stalled();
        self.repaint.take() || self.animation.is_some()
    }

    /// Runs pending loads until every one has finished.
    pub fn run_until_loaded(&mut self) -> bool {
        self.pool.run();
        self.repaint.take()
    }

    pub fn request_repaint(&self) {
        self.repaint.request();
    }

    /// Looks through scene camera `index`.
    pub fn select_camera(&mut self, index: usize) -> bool {
        let Some(camera) = self.scene.as_ref().and_then(|s| s.cameras.get(index)) else {
            log::warn!("no camera {index} in the scene");
            return false;
        };
        self.canvas.camera = *camera;
        self.camera_index = Some(index);
        self.repaint.request();
        true
    }

    /// Marks every mesh of the scene for a buffer update.
    pub fn update_mesh_drawings(&self) {
        if let Some(scene) = &self.scene {
            scene.mark_meshes_dirty();
        }
        self.repaint.request();
    }

    pub fn set_draw_edges(&mut self, on: bool) {
        self.canvas.draw_edges = on;
        self.repaint.request();
    }

    pub fn set_draw_normals(&mut self, on: bool) {
        self.canvas.draw_normals = on;
        self.repaint.request();
    }

    pub fn set_draw_points(&mut self, on: bool) {
        self.canvas.draw_points = on;
        self.repaint.request();
    }

    /// Starts flying through the scene cameras listed in `sequence`,
    /// spending `frames_per_step` repaints between consecutive cameras.
    pub fn animate_cameras(
        &mut self,
        sequence: Vec<usize>,
        frames_per_step: usize,
        interpolation: RotationInterpolation,
    ) -> anyhow::Result<()> {
        let Some(scene) = &self.scene else {
            bail!("no scene is loaded");
        };
        if sequence.len() < 2 {
            bail!("a camera animation needs at least two cameras");
        }
        if let Some(&bad) = sequence.iter().find(|&&i| i >= scene.cameras.len()) {
            bail!(
                "camera {bad} does not exist, the scene has {}",
                scene.cameras.len()
            );
        }
        if frames_per_step == 0 {
            bail!("frames per step must be positive");
        }

        self.animation = Some(CameraAnimation {
            sequence,
            frames_per_step,
            frame: 0,
            interpolation,
            camera_before: self.canvas.camera,
        });
        self.repaint.request();
        Ok(())
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Moves the canvas camera to the current animation frame, ending the
    /// animation after its last leg.
    fn advance_animation(&mut self) {
        let Some(a) = &mut self.animation else {
            return;
        };
        let Some(scene) = &self.scene else {
            return;
        };

        let frame = a.frame % a.frames_per_step;
        let leg = a.frame / a.frames_per_step;
        if leg + 1 >= a.sequence.len() {
            self.canvas.camera = a.camera_before;
            self.animation = None;
            return;
        }

        let from = &scene.cameras[a.sequence[leg]];
        let to = &scene.cameras[a.sequence[leg + 1]];
        let t = frame as f32 / a.frames_per_step as f32;
        self.canvas.camera = from.interpolate(to, t, a.interpolation);
        a.frame += 1;
    }

    /// Draws the scene, then the camera and light beacons.
    ///
    /// Scene geometry is only drawn while a shader is selected. The camera
    /// being looked through gets no beacon, and no camera gets one during a
    /// fly-through.
    pub fn repaint(&mut self) -> Result<(), RenderError> {
        if self.scene.is_none() {
            return Ok(());
        }
        self.advance_animation();

        let Some(scene) = &self.scene else {
            return Ok(());
        };
        let canvas = &mut self.canvas;
        canvas.lights = scene.lights.clone();
        if canvas.active_shader().is_ok() {
            scene.render(canvas)?;
        }

        let beacon = self.cache.primitive(Primitive::Beacon);
        if self.show_cameras && self.animation.is_none() {
            let color = color_from_hex(CAMERA_BEACON_COLOR).unwrap_or([1.0, 0.0, 0.0]);
            for (i, camera) in scene.cameras.iter().enumerate() {
                if Some(i) != self.camera_index {
                    draw_beacon(canvas, &beacon, camera.pos, color)?;
                }
            }
        }
        if self.show_lights {
            for light in &scene.lights {
                draw_beacon(canvas, &beacon, light.pos, light.color)?;
            }
        }
        Ok(())
    }
}

/// Draws the beacon mesh at `pos` in a flat `color`, leaving the canvas's
/// shader, material and overlay settings as they were.
fn draw_beacon<B: RenderBackend>(
    canvas: &mut Canvas<B>,
    beacon: &MeshHandle,
    pos: Vector3<f32>,
    color: [f32; 3],
) -> Result<(), RenderError> {
    if !canvas.shaders.contains(FLAT_SHADER) {
        return Ok(());
    }
    let shader = canvas.swap_shader(Some(FLAT_SHADER.to_string()));
    let material = canvas.material.clone();
    let flat_color = canvas.color;
    let overlays = (canvas.draw_edges, canvas.draw_normals, canvas.draw_points);

    canvas.material = Rc::new(Material::default().with_diffuse(color[0], color[1], color[2]));
    canvas.color = Some(color);
    canvas.draw_edges = false;
    canvas.draw_normals = false;
    canvas.draw_points = false;

    let result = beacon
        .borrow_mut()
        .render(canvas, &Matrix4::from_translation(pos));

    canvas.swap_shader(shader);
    canvas.material = material;
    canvas.color = flat_color;
    (canvas.draw_edges, canvas.draw_normals, canvas.draw_points) = overlays;
    result
}
