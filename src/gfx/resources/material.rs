//! Material system for Phong-style lighting
//!
//! Materials are stored in a [`MaterialManager`] keyed by name and shared
//! with the shapes that use them through `Rc`.

use std::{collections::HashMap, rc::Rc};

/// Material ID for referencing materials
pub type MaterialId = String;

/// Name of the material shapes get when they do not name one.
pub const DEFAULT_MATERIAL: &str = "default";

/// GPU uniform data for materials
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub ka: [f32; 3],
    pub shininess: f32,
    pub kd: [f32; 3],
    pub refraction: f32,
    pub ks: [f32; 3],
    /// 1 for special materials, 0 otherwise
    pub special: u32,
    pub kt: [f32; 3],
    _padding: f32,
}

/// Reflectance coefficients of a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Ambient
    pub ka: [f32; 3],
    /// Diffuse
    pub kd: [f32; 3],
    /// Specular
    pub ks: [f32; 3],
    /// Transmission
    pub kt: [f32; 3],
    pub shininess: f32,
    /// Ratio of refractive indices
    pub refraction: f32,
    /// Opaque flag interpreted by application shaders
    pub special: bool,
}

impl Default for Material {
    /// Values for any coefficient a scene file leaves out.
    fn default() -> Self {
        Self {
            ka: [0.05, 0.05, 0.05],
            kd: [0.5, 0.55, 0.5],
            ks: [0.0, 0.0, 0.0],
            kt: [0.0, 0.0, 0.0],
            shininess: 50.0,
            refraction: 1.0,
            special: false,
        }
    }
}

impl Material {
    /// The material registered as [`DEFAULT_MATERIAL`] in every scene.
    pub fn builtin_default() -> Self {
        Self {
            ka: [0.0, 0.0, 0.0],
            shininess: 1.0,
            ..Self::default()
        }
    }

    /// Builder pattern: Set diffuse color
    pub fn with_diffuse(mut self, r: f32, g: f32, b: f32) -> Self {
        self.kd = [r, g, b];
        self
    }

    pub fn to_uniform(&self) -> MaterialUniform {
        MaterialUniform {
            ka: self.ka,
            shininess: self.shininess,
            kd: self.kd,
            refraction: self.refraction,
            ks: self.ks,
            special: self.special as u32,
            kt: self.kt,
            _padding: 0.0,
        }
    }
}

/// Parses a `RRGGBB` hex color (an optional leading `#` is allowed) into
/// 0-1 floats.
pub fn color_from_hex(hex: &str) -> Option<[f32; 3]> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .ok()
            .map(|c| c as f32 / 255.0)
    };
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Centralized material storage
///
/// Always contains [`DEFAULT_MATERIAL`].
#[derive(Debug, Clone)]
pub struct MaterialManager {
    materials: HashMap<MaterialId, Rc<Material>>,
}

impl Default for MaterialManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialManager {
    /// Creates a new material manager holding only the default material
    pub fn new() -> Self {
        let mut materials = HashMap::new();
        materials.insert(
            DEFAULT_MATERIAL.to_string(),
            Rc::new(Material::builtin_default()),
        );
        Self { materials }
    }

    /// Adds a material, replacing any material with the same name
    ///
    /// Shapes that already hold the replaced material keep it.
    pub fn add_material(&mut self, name: &str, material: Material) {
        self.materials.insert(name.to_string(), Rc::new(material));
    }

    /// Gets a material by ID
    ///
    /// # Arguments
    /// * `id` - Material ID
    ///
    /// # Returns
    /// Shared handle to the material if found
    pub fn get_material(&self, id: &str) -> Option<Rc<Material>> {
        self.materials.get(id).cloned()
    }

    /// Adds every material of `other`, overwriting existing names
    pub fn merge(&mut self, other: impl IntoIterator<Item = (MaterialId, Material)>) {
        for (name, material) in other {
            if self.materials.contains_key(&name) {
                log::debug!("material `{name}` redefined by a sub-scene");
            }
            self.materials.insert(name, Rc::new(material));
        }
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_starts_with_default() {
        let manager = MaterialManager::new();
        assert_eq!(manager.len(), 1);
        let default = manager.get_material(DEFAULT_MATERIAL).unwrap();
        assert_eq!(default.ka, [0.0, 0.0, 0.0]);
        assert_eq!(default.kd, [0.5, 0.55, 0.5]);
        assert_eq!(default.shininess, 1.0);
    }

    #[test]
    fn test_merge_overwrites() {
        let mut manager = MaterialManager::new();
        manager.add_material("red", Material::default().with_diffuse(1.0, 0.0, 0.0));
        let held = manager.get_material("red").unwrap();

        manager.merge(vec![(
            "red".to_string(),
            Material::default().with_diffuse(0.9, 0.1, 0.1),
        )]);
        assert_eq!(manager.get_material("red").unwrap().kd, [0.9, 0.1, 0.1]);
        // Existing holders are unaffected
        assert_eq!(held.kd, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_uniform_layout() {
        let uniform = Material::default().to_uniform();
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 64);
        assert_eq!(uniform.shininess, 50.0);
        assert_eq!(uniform.special, 0);
    }

    #[test]
    fn test_color_from_hex() {
        let c = color_from_hex("#A7383E").unwrap();
        assert!((c[0] - 167.0 / 255.0).abs() < 1e-6);
        assert!((c[2] - 62.0 / 255.0).abs() < 1e-6);
        assert_eq!(color_from_hex("378B2E").map(|c| c[1]), Some(139.0 / 255.0));
        assert_eq!(color_from_hex("xyz"), None);
        assert_eq!(color_from_hex("GG0000"), None);
    }
}
