//! Compiled shader handles and the library that names them.
//!
//! Shader sources are compiled by the backend's owner; the core only sees
//! the resulting [`CompiledShader`], which lists the attribute and uniform
//! slots the program consumes. Uniform blocks are assembled from that list
//! once per draw.

use std::{
    collections::{HashMap, HashSet},
    rc::Rc,
};

/// Backend-assigned shader identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u32);

/// Named attribute and uniform slots a shader may consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderSlot {
    // Vertex attributes
    Position,
    Normal,
    Color,

    // Uniforms
    Projection,
    ModelView,
    Transform,
    /// Inverse transpose of the model-view-transform upper 3x3
    NormalMatrix,
    /// Inverse transpose of the transform upper 3x3
    TransformNormal,
    Material,
    Eye,
    Near,
    Far,
    Lights,
    /// Flat color override
    UColor,
    /// Length of drawn normal lines
    NormalScale,
}

/// A compiled shader program as seen by the scene core.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledShader {
    pub id: ShaderId,
    pub name: String,
    slots: HashSet<ShaderSlot>,
}

impl CompiledShader {
    pub fn new(id: ShaderId, name: &str, slots: impl IntoIterator<Item = ShaderSlot>) -> Self {
        Self {
            id,
            name: name.to_string(),
            slots: slots.into_iter().collect(),
        }
    }

    /// Whether the program has the given attribute or uniform.
    pub fn accepts(&self, slot: ShaderSlot) -> bool {
        self.slots.contains(&slot)
    }

    pub fn slots(&self) -> impl Iterator<Item = &ShaderSlot> {
        self.slots.iter()
    }
}

/// Shaders registered by name.
#[derive(Debug, Default)]
pub struct ShaderLibrary {
    shaders: HashMap<String, Rc<CompiledShader>>,
    next_id: u32,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a shader under `name`, replacing any previous one.
    ///
    /// # Arguments
    /// * `name` - Identifier the scene and viewer refer to the shader by
    /// * `slots` - Attributes and uniforms the compiled program exposes
    ///
    /// # Returns
    /// The id assigned to the shader
    pub fn register(&mut self, name: &str, slots: impl IntoIterator<Item = ShaderSlot>) -> ShaderId {
        let id = ShaderId(self.next_id);
        self.next_id += 1;
        if self
            .shaders
            .insert(name.to_string(), Rc::new(CompiledShader::new(id, name, slots)))
            .is_some()
        {
            log::debug!("replaced shader `{name}`");
        }
        id
    }

    pub fn get(&self, name: &str) -> Option<Rc<CompiledShader>> {
        self.shaders.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.shaders.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }
}

/// Slots of a lit shader with material and light uniforms.
pub const LIT_SLOTS: &[ShaderSlot] = &[
    ShaderSlot::Position,
    ShaderSlot::Normal,
    ShaderSlot::Color,
    ShaderSlot::Projection,
    ShaderSlot::ModelView,
    ShaderSlot::Transform,
    ShaderSlot::NormalMatrix,
    ShaderSlot::TransformNormal,
    ShaderSlot::Material,
    ShaderSlot::Eye,
    ShaderSlot::Lights,
];

/// Slots of a single-color shader, used for edges, points and beacons.
pub const FLAT_SLOTS: &[ShaderSlot] = &[
    ShaderSlot::Position,
    ShaderSlot::Projection,
    ShaderSlot::ModelView,
    ShaderSlot::Transform,
    ShaderSlot::UColor,
];

/// Slots of the normal-line shader.
pub const NORMAL_LINE_SLOTS: &[ShaderSlot] = &[
    ShaderSlot::Position,
    ShaderSlot::Normal,
    ShaderSlot::Projection,
    ShaderSlot::ModelView,
    ShaderSlot::Transform,
    ShaderSlot::TransformNormal,
    ShaderSlot::UColor,
    ShaderSlot::NormalScale,
];
