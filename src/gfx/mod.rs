//! # Graphics Module
//!
//! Geometry, meshes, cameras, materials, the scene graph and the render
//! contract they are drawn through.
//!
//! ## Architecture Overview
//!
//! - **Geometry** ([`geometry`]) - pure vector math, bounding boxes and the
//!   procedural base meshes
//! - **Meshes** ([`mesh`]) - polygon meshes, OFF/OBJ text and buffer upload
//! - **Cameras** ([`camera`]) - perspective scene cameras and interpolation
//! - **Resources** ([`resources`]) - materials and the material table
//! - **Scene Graph** ([`scene`]) - nodes, shapes, lights and scene parsing
//! - **Rendering** ([`rendering`]) - the backend trait, shaders with named
//!   slots and the canvas that binds render state together
//!
//! ## Usage
//!
//! ```
//! use cgmath::{Matrix4, SquareMatrix};
//! use sceneview::gfx::{
//!     geometry::generate_cube,
//!     rendering::{shader::LIT_SLOTS, Canvas, RecordingBackend},
//! };
//!
//! let mut canvas = Canvas::with_backend(RecordingBackend::new());
//! canvas.register_shader("blinnPhong", LIT_SLOTS.iter().copied());
//! canvas.use_shader("blinnPhong");
//!
//! let mut cube = generate_cube();
//! cube.render(&mut canvas, &Matrix4::identity()).unwrap();
//! assert_eq!(canvas.backend().unwrap().triangle_count(), 12);
//! ```

pub mod camera;
pub mod geometry;
pub mod mesh;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::Camera;
pub use mesh::{Mesh, MeshHandle};
pub use rendering::{Canvas, RenderBackend};
pub use scene::{Scene, SceneNode};
