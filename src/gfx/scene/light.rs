//! Point and spot lights.

use std::f32::consts::PI;

use cgmath::Vector3;

/// GPU uniform data for one light
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub pos: [f32; 3],
    pub angle: f32,
    pub color: [f32; 3],
    _padding0: f32,
    pub atten: [f32; 3],
    _padding1: f32,
    pub towards: [f32; 3],
    _padding2: f32,
}

/// A light source.
///
/// `atten` holds the constant, linear and quadratic attenuation terms. A
/// light with `angle` π shines in every direction; smaller angles make a
/// spot light pointing along `towards`.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub pos: Vector3<f32>,
    pub color: [f32; 3],
    pub atten: [f32; 3],
    pub towards: Vector3<f32>,
    pub angle: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            pos: Vector3::new(0.0, 0.0, 0.0),
            color: [1.0, 1.0, 1.0],
            atten: [1.0, 0.0, 0.0],
            towards: Vector3::new(0.0, -1.0, 0.0),
            angle: PI,
        }
    }
}

impl Light {
    pub fn to_uniform(&self) -> LightUniform {
        LightUniform {
            pos: self.pos.into(),
            angle: self.angle,
            color: self.color,
            _padding0: 0.0,
            atten: self.atten,
            _padding1: 0.0,
            towards: self.towards.into(),
            _padding2: 0.0,
        }
    }
}
