//! Asynchronous, deduplicated mesh loading.
//!
//! Loads run as local futures on the viewer's single-threaded executor.
//! Completion is observed by continuations on that same thread.

pub mod cache;
pub mod source;

pub use cache::{CacheLookup, MeshCache, Primitive, SharedLoad};
pub use source::{load_mesh_file, AssetSource, FileSource, MemorySource};
