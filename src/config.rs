//! Viewer configuration.
//!
//! Every field has a default, so a configuration file only needs to name
//! what it changes:
//!
//! ```
//! use sceneview::config::ViewerConfig;
//!
//! let config = ViewerConfig::from_json(r#"{ "verbose": true, "beacon_size": 0.25 }"#).unwrap();
//! assert!(config.verbose);
//! assert!(config.cache_meshes);
//! ```

use std::path::PathBuf;

use serde::Deserialize;

use crate::{error::SpecError, gfx::mesh::OffOptions};

/// Shader used for scene geometry unless configured otherwise.
pub const DEFAULT_SHADER: &str = "blinnPhong";

/// Size of the icosahedron drawn at camera and light positions.
pub const DEFAULT_BEACON_SIZE: f32 = 0.1;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Directory, relative to the asset source root, that mesh filenames in
    /// scene files are resolved against.
    pub meshes_path: PathBuf,
    /// Keep loaded meshes by filename and share them between shapes.
    /// Procedural base meshes are always cached.
    pub cache_meshes: bool,
    /// Log cache traffic and dump the scene tree after parsing.
    pub verbose: bool,
    /// Name of the shader scene geometry is drawn with.
    pub default_shader: String,
    /// OFF vertex colors are given in 0-255 rather than 0-1.
    pub divide_color: bool,
    pub beacon_size: f32,
    pub show_cameras: bool,
    pub show_lights: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            meshes_path: PathBuf::new(),
            cache_meshes: true,
            verbose: false,
            default_shader: DEFAULT_SHADER.to_string(),
            divide_color: false,
            beacon_size: DEFAULT_BEACON_SIZE,
            show_cameras: true,
            show_lights: true,
        }
    }
}

impl ViewerConfig {
    pub fn from_json(text: &str) -> Result<Self, SpecError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn with_meshes_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.meshes_path = path.into();
        self
    }

    pub fn with_mesh_cache(mut self, enabled: bool) -> Self {
        self.cache_meshes = enabled;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_default_shader(mut self, name: &str) -> Self {
        self.default_shader = name.to_string();
        self
    }

    pub fn with_divide_color(mut self, divide: bool) -> Self {
        self.divide_color = divide;
        self
    }

    pub fn with_beacon_size(mut self, size: f32) -> Self {
        self.beacon_size = size;
        self
    }

    /// Options handed to the OFF parser for every mesh this viewer loads.
    pub fn off_options(&self) -> OffOptions {
        OffOptions {
            divide_color: self.divide_color,
        }
    }
}
