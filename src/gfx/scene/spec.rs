//! Deserialized scene descriptions.
//!
//! These types mirror the JSON a scene file is written in. Every optional
//! field stays optional here; defaults are applied once when the scene is
//! built (see [`super::Scene::from_spec`]).

use std::collections::HashMap;

use cgmath::{Quaternion, Vector3};
use serde::Deserialize;

use crate::{
    error::SpecError,
    gfx::{camera::Camera, resources::material::Material},
};

use super::light::Light;

/// Top level of a scene file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SceneSpec {
    pub name: Option<String>,
    pub lights: Vec<LightSpec>,
    pub cameras: Vec<CameraSpec>,
    pub materials: HashMap<String, MaterialSpec>,
    pub children: Vec<NodeSpec>,
}

impl SceneSpec {
    pub fn from_json(text: &str) -> Result<Self, SpecError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LightSpec {
    pub pos: Option<[f32; 3]>,
    pub color: Option<[f32; 3]>,
    pub atten: Option<[f32; 3]>,
    pub towards: Option<[f32; 3]>,
    pub angle: Option<f32>,
}

impl LightSpec {
    pub fn to_light(&self) -> Light {
        let defaults = Light::default();
        Light {
            pos: self.pos.map(Vector3::from).unwrap_or(defaults.pos),
            color: self.color.unwrap_or(defaults.color),
            atten: self.atten.unwrap_or(defaults.atten),
            towards: self.towards.map(Vector3::from).unwrap_or(defaults.towards),
            angle: self.angle.unwrap_or(defaults.angle),
        }
    }
}

/// A camera entry. `rot` is a quaternion written `[x, y, z, w]`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraSpec {
    pub pos: Option<[f32; 3]>,
    pub rot: Option<[f32; 4]>,
    pub fovx: Option<f32>,
    pub fovy: Option<f32>,
    pub near: Option<f32>,
    pub far: Option<f32>,
}

impl CameraSpec {
    pub fn to_camera(&self) -> Camera {
        let defaults = Camera::default();
        Camera {
            pos: self.pos.map(Vector3::from).unwrap_or(defaults.pos),
            rot: self
                .rot
                .map(|[x, y, z, w]| Quaternion::new(w, x, y, z))
                .unwrap_or(defaults.rot),
            fovx: self.fovx.unwrap_or(defaults.fovx),
            fovy: self.fovy.unwrap_or(defaults.fovy),
            near: self.near.unwrap_or(defaults.near),
            far: self.far.unwrap_or(defaults.far),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MaterialSpec {
    pub ka: Option<[f32; 3]>,
    pub kd: Option<[f32; 3]>,
    pub ks: Option<[f32; 3]>,
    pub kt: Option<[f32; 3]>,
    pub shininess: Option<f32>,
    pub refraction: Option<f32>,
    pub special: Option<bool>,
}

impl MaterialSpec {
    pub fn to_material(&self) -> Material {
        let defaults = Material::default();
        Material {
            ka: self.ka.unwrap_or(defaults.ka),
            kd: self.kd.unwrap_or(defaults.kd),
            ks: self.ks.unwrap_or(defaults.ks),
            kt: self.kt.unwrap_or(defaults.kt),
            shininess: self.shininess.unwrap_or(defaults.shininess),
            refraction: self.refraction.unwrap_or(defaults.refraction),
            special: self.special.unwrap_or(defaults.special),
        }
    }
}

/// A node: an optional row-major 4x4 transform, shapes and child nodes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NodeSpec {
    pub transform: Option<Vec<f32>>,
    pub shapes: Vec<ShapeSpec>,
    pub children: Vec<NodeSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShapeSpec {
    #[serde(flatten)]
    pub kind: ShapeKindSpec,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub hidden: bool,
}

/// Shape-specific fields, selected by the `type` key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeKindSpec {
    /// A mesh file, or inline mesh text in `src`
    Mesh {
        #[serde(default)]
        filename: Option<String>,
        #[serde(default)]
        src: Option<String>,
    },
    /// A single planar face
    Polygon { vertices: Vec<[f32; 3]> },
    Sphere {
        #[serde(default)]
        radius: Option<f32>,
        #[serde(default)]
        center: Option<[f32; 3]>,
    },
    #[serde(rename = "box")]
    Cuboid {
        #[serde(default)]
        width: Option<f32>,
        #[serde(default)]
        height: Option<f32>,
        #[serde(default)]
        length: Option<f32>,
        #[serde(default)]
        center: Option<[f32; 3]>,
    },
    Cylinder {
        #[serde(default)]
        radius: Option<f32>,
        #[serde(default)]
        height: Option<f32>,
        #[serde(default)]
        center: Option<[f32; 3]>,
    },
    Cone {
        #[serde(default)]
        radius: Option<f32>,
        #[serde(default)]
        height: Option<f32>,
        #[serde(default)]
        center: Option<[f32; 3]>,
    },
    /// Another scene file whose children are attached under this node
    Scene { filename: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_scene() {
        let spec = SceneSpec::from_json("{}").unwrap();
        assert!(spec.name.is_none());
        assert!(spec.children.is_empty());
    }

    #[test]
    fn test_shape_kinds() {
        let node: NodeSpec = serde_json::from_str(
            r#"{
                "transform": [1,0,0,0, 0,1,0,0, 0,0,1,0, 0,0,0,1],
                "shapes": [
                    {"type": "sphere", "radius": 2, "center": [1, 0, 0], "material": "red"},
                    {"type": "box", "width": 3},
                    {"type": "mesh", "filename": "bunny.off", "hidden": true},
                    {"type": "scene", "filename": "room.json"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(node.transform.as_ref().map(Vec::len), Some(16));
        assert_eq!(
            node.shapes[0].kind,
            ShapeKindSpec::Sphere {
                radius: Some(2.0),
                center: Some([1.0, 0.0, 0.0])
            }
        );
        assert_eq!(node.shapes[0].material.as_deref(), Some("red"));
        assert!(matches!(
            node.shapes[1].kind,
            ShapeKindSpec::Cuboid {
                width: Some(w),
                height: None,
                ..
            } if w == 3.0
        ));
        assert!(node.shapes[2].hidden);
        assert!(!node.shapes[3].hidden);
    }

    #[test]
    fn test_unknown_shape_type_is_error() {
        let err = SceneSpec::from_json(r#"{"children": [{"shapes": [{"type": "torus"}]}]}"#);
        assert!(matches!(err, Err(SpecError::Json(_))));
    }

    #[test]
    fn test_camera_and_light_defaults() {
        let camera = CameraSpec {
            rot: Some([0.0, 0.0, 0.0, 1.0]),
            fovx: Some(1.0),
            ..Default::default()
        }
        .to_camera();
        assert_eq!(camera.rot, Quaternion::new(1.0, 0.0, 0.0, 0.0));
        assert_eq!(camera.fovx, 1.0);
        assert_eq!(camera.fovy, crate::gfx::camera::scene_camera::DEFAULT_FOVY);

        let light = LightSpec {
            color: Some([1.0, 0.0, 0.0]),
            ..Default::default()
        }
        .to_light();
        assert_eq!(light.color, [1.0, 0.0, 0.0]);
        assert_eq!(light.atten, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_material_defaults() {
        let material = MaterialSpec {
            kd: Some([1.0, 0.0, 0.0]),
            ..Default::default()
        }
        .to_material();
        assert_eq!(material.kd, [1.0, 0.0, 0.0]);
        assert_eq!(material.shininess, 50.0);
        assert_eq!(material.ka, [0.05, 0.05, 0.05]);
    }
}
