//! Core rendering contract
//!
//! Everything the scene graph and meshes need from a renderer: buffers,
//! compiled shaders with named slots, uniform assembly and draw submission.

pub mod backend;
pub mod canvas;
pub mod recording;
pub mod shader;
pub mod uniforms;

// Re-export main types
pub use backend::{
    BufferId, BufferKind, DrawCall, RenderBackend, Topology, VertexAttribute, VertexBufferLayout,
};
pub use canvas::Canvas;
pub use recording::RecordingBackend;
pub use shader::{CompiledShader, ShaderId, ShaderLibrary, ShaderSlot};
pub use uniforms::{Uniforms, MAX_LIGHTS};
