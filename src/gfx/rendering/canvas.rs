//! Binds a render backend to the current camera, lights, material and
//! shader selection.

use std::rc::Rc;

use cgmath::{Matrix, Matrix3, Matrix4, SquareMatrix};

use crate::{
    error::RenderError,
    gfx::{camera::Camera, resources::material::Material, scene::light::Light},
};

use super::{
    backend::{DrawCall, RenderBackend},
    shader::{CompiledShader, ShaderId, ShaderLibrary, ShaderSlot},
    uniforms::{Uniforms, MAX_LIGHTS},
};

/// Render state shared by every mesh drawn in a frame.
///
/// The backend is optional so a canvas can be configured before the render
/// context exists; drawing before [`Canvas::init`] fails with
/// [`RenderError::NoContext`].
pub struct Canvas<B: RenderBackend> {
    backend: Option<B>,
    pub shaders: ShaderLibrary,
    active_shader: Option<String>,
    pub camera: Camera,
    pub lights: Vec<Light>,
    /// Material of the shape currently being drawn
    pub material: Rc<Material>,
    /// Flat color for shaders with a color uniform
    pub color: Option<[f32; 3]>,
    pub draw_edges: bool,
    pub draw_normals: bool,
    pub draw_points: bool,
}

impl<B: RenderBackend> Default for Canvas<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: RenderBackend> Canvas<B> {
    /// A canvas with no render context yet.
    pub fn new() -> Self {
        Self {
            backend: None,
            shaders: ShaderLibrary::new(),
            active_shader: None,
            camera: Camera::default(),
            lights: Vec::new(),
            material: Rc::new(Material::builtin_default()),
            color: None,
            draw_edges: false,
            draw_normals: false,
            draw_points: false,
        }
    }

    pub fn with_backend(backend: B) -> Self {
        let mut canvas = Self::new();
        canvas.init(backend);
        canvas
    }

    /// Attaches the render context.
    pub fn init(&mut self, backend: B) {
        self.backend = Some(backend);
    }

    pub fn is_initialized(&self) -> bool {
        self.backend.is_some()
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> Result<&mut B, RenderError> {
        self.backend.as_mut().ok_or(RenderError::NoContext)
    }

    pub fn register_shader(
        &mut self,
        name: &str,
        slots: impl IntoIterator<Item = ShaderSlot>,
    ) -> ShaderId {
        self.shaders.register(name, slots)
    }

    /// Makes `name` the shader meshes are drawn with. Returns `false`, and
    /// leaves the selection unchanged, if no such shader is registered.
    pub fn use_shader(&mut self, name: &str) -> bool {
        if !self.shaders.contains(name) {
            log::warn!("shader `{name}` is not registered");
            return false;
        }
        self.active_shader = Some(name.to_string());
        true
    }

    /// Replaces the selection without checking the library and returns the
    /// previous one, for temporarily drawing with another shader.
    pub(crate) fn swap_shader(&mut self, name: Option<String>) -> Option<String> {
        std::mem::replace(&mut self.active_shader, name)
    }

    pub fn active_shader_name(&self) -> Option<&str> {
        self.active_shader.as_deref()
    }

    pub fn active_shader(&self) -> Result<Rc<CompiledShader>, RenderError> {
        self.active_shader
            .as_deref()
            .and_then(|name| self.shaders.get(name))
            .ok_or(RenderError::NoShader)
    }

    /// Uniform values for drawing with `shader` under `transform`, limited to
    /// the slots the shader has.
    pub fn uniforms(&self, shader: &CompiledShader, transform: &Matrix4<f32>) -> Uniforms {
        let view = self.camera.view_matrix();
        let mut uniforms = Uniforms::default();

        if shader.accepts(ShaderSlot::Projection) {
            uniforms.projection = Some(self.camera.projection_matrix());
        }
        if shader.accepts(ShaderSlot::ModelView) {
            uniforms.model_view = Some(view);
        }
        if shader.accepts(ShaderSlot::Transform) {
            uniforms.transform = Some(*transform);
        }
        if shader.accepts(ShaderSlot::NormalMatrix) {
            uniforms.normal_matrix = Some(normal_matrix(&(view * *transform)));
        }
        if shader.accepts(ShaderSlot::TransformNormal) {
            uniforms.transform_normal = Some(normal_matrix(transform));
        }
        if shader.accepts(ShaderSlot::Material) {
            uniforms.material = Some(self.material.to_uniform());
        }
        if shader.accepts(ShaderSlot::Eye) {
            uniforms.eye = Some(self.camera.pos);
        }
        if shader.accepts(ShaderSlot::Near) {
            uniforms.near = Some(self.camera.near);
        }
        if shader.accepts(ShaderSlot::Far) {
            uniforms.far = Some(self.camera.far);
        }
        if shader.accepts(ShaderSlot::Lights) {
            if self.lights.len() > MAX_LIGHTS {
                log::warn!(
                    "scene has {} lights, only the first {MAX_LIGHTS} are used",
                    self.lights.len()
                );
            }
            uniforms.lights = Some(
                self.lights
                    .iter()
                    .take(MAX_LIGHTS)
                    .map(Light::to_uniform)
                    .collect(),
            );
        }
        if shader.accepts(ShaderSlot::UColor) {
            uniforms.color = self.color;
        }
        uniforms
    }

    pub fn submit(&mut self, call: &DrawCall) -> Result<(), RenderError> {
        self.backend_mut()?.draw(call);
        Ok(())
    }
}

/// Inverse transpose of the upper 3x3, or identity if it is singular.
fn normal_matrix(m: &Matrix4<f32>) -> Matrix3<f32> {
    let upper = Matrix3::from_cols(m.x.truncate(), m.y.truncate(), m.z.truncate());
    upper
        .invert()
        .map(|inv| inv.transpose())
        .unwrap_or_else(Matrix3::identity)
}
