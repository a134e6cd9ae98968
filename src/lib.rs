// src/lib.rs
//! Sceneview
//!
//! The scene-graph and mesh core of a small 3D viewer: polygon meshes read
//! from OFF and OBJ text, deduplicated asynchronous mesh loading, scene
//! trees parsed from JSON and drawn through an abstract render backend.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod loader;
pub mod logging;
pub mod prelude;

use std::path::PathBuf;

// Re-export main types for convenience
pub use app::SceneViewer;
pub use config::ViewerConfig;

use gfx::rendering::RecordingBackend;
use loader::FileSource;

/// Creates a viewer that reads assets below `root` and draws into a
/// [`RecordingBackend`].
pub fn headless(root: impl Into<PathBuf>) -> SceneViewer<RecordingBackend> {
    SceneViewer::new(ViewerConfig::default(), FileSource::new(root))
        .with_backend(RecordingBackend::new())
}
