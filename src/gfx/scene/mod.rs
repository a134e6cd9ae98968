//! # Scene Graph
//!
//! A scene is parsed once from a JSON description into a tree of
//! [`SceneNode`]s and traversed every frame.
//!
//! ## Key Components
//!
//! - [`Scene`] - lights, cameras, the material table and the node tree
//! - [`SceneNode`] - a local transform, shapes and child nodes
//! - [`Shape`] - a mesh slot, a corrective matrix and a material
//! - [`SceneSpec`] - the deserialized description a scene is built from
//!
//! ## Usage
//!
//! ```
//! use std::rc::Rc;
//!
//! use futures::executor::LocalPool;
//! use sceneview::{
//!     config::ViewerConfig,
//!     gfx::scene::{RepaintSignal, Scene, SceneContext, SceneSpec},
//!     loader::{MemorySource, MeshCache},
//! };
//!
//! let config = ViewerConfig::default();
//! let pool = LocalPool::new();
//! let ctx = SceneContext::new(
//!     &config,
//!     MeshCache::new(&config),
//!     Rc::new(MemorySource::new()),
//!     pool.spawner(),
//!     RepaintSignal::default(),
//! );
//!
//! let spec = SceneSpec::from_json(r#"{"children": [{"shapes": [{"type": "sphere"}]}]}"#).unwrap();
//! let scene = Scene::from_spec(&spec, &ctx).unwrap();
//! assert_eq!(scene.root.children.len(), 1);
//! ```
//!
//! ## Mesh resolution
//!
//! Primitive shapes share the cache's base meshes and are ready at once.
//! Mesh files load asynchronously: until the load finishes the shape draws
//! an empty placeholder, and a failed load leaves it that way.

pub mod light;
pub mod node;
pub mod scene;
pub mod spec;

pub use light::{Light, LightUniform};
pub use node::{
    mark_meshes_dirty, render_tree, scene_string, MeshSlot, ResolveState, SceneNode, Shape,
    ShapeKind,
};
pub use scene::{default_scene_camera, parse_tree, RepaintSignal, Scene, SceneContext};
pub use spec::{CameraSpec, LightSpec, MaterialSpec, NodeSpec, SceneSpec, ShapeKindSpec, ShapeSpec};
