//! # Sceneview Prelude
//!
//! Commonly used types in one import.
//!
//! ## Usage
//!
//! ```rust
//! use sceneview::prelude::*;
//!
//! let source = MemorySource::new().with_file("tri.off", "OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n");
//! let mut viewer: SceneViewer<RecordingBackend> = SceneViewer::new(ViewerConfig::default(), source)
//!     .with_backend(RecordingBackend::new());
//!
//! viewer
//!     .load_scene_json(r#"{"children": [{"shapes": [{"type": "mesh", "filename": "tri.off"}]}]}"#)
//!     .unwrap();
//! viewer.run_until_loaded();
//! viewer.repaint().unwrap();
//! ```

// Core application
pub use crate::app::SceneViewer;
pub use crate::config::ViewerConfig;
pub use crate::logging::{init_logging, LoggingConfig};

// Errors
pub use crate::error::{LoadError, MeshError, ParseError, RenderError, SpecError};

// Geometry and meshes
pub use crate::gfx::geometry::AABox3D;
pub use crate::gfx::mesh::{parse_off, Mesh, MeshFormat, MeshHandle, OffOptions};

// Scene graph
pub use crate::gfx::camera::{Camera, RotationInterpolation};
pub use crate::gfx::resources::{Material, MaterialManager};
pub use crate::gfx::scene::{Light, Scene, SceneNode, SceneSpec, Shape};

// Rendering
pub use crate::gfx::rendering::{Canvas, RecordingBackend, RenderBackend, ShaderSlot};

// Loading
pub use crate::loader::{AssetSource, FileSource, MemorySource, MeshCache};

// Math types
pub use cgmath::{Matrix4, Quaternion, Vector3};
