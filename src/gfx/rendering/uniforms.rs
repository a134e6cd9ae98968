//! Per-draw uniform values.
//!
//! Every field is optional: a value is only filled in when the shader the
//! draw uses has the matching [`ShaderSlot`](super::ShaderSlot).

use cgmath::{Matrix3, Matrix4, Vector3};

use crate::gfx::{resources::material::MaterialUniform, scene::light::LightUniform};

/// Upper bound on the number of lights handed to a shader.
pub const MAX_LIGHTS: usize = 10;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Uniforms {
    pub projection: Option<Matrix4<f32>>,
    pub model_view: Option<Matrix4<f32>>,
    pub transform: Option<Matrix4<f32>>,
    pub normal_matrix: Option<Matrix3<f32>>,
    pub transform_normal: Option<Matrix3<f32>>,
    pub material: Option<MaterialUniform>,
    pub eye: Option<Vector3<f32>>,
    pub near: Option<f32>,
    pub far: Option<f32>,
    /// At most [`MAX_LIGHTS`] entries
    pub lights: Option<Vec<LightUniform>>,
    pub color: Option<[f32; 3]>,
    pub normal_scale: Option<f32>,
}
