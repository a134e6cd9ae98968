//! The render backend contract.
//!
//! A backend owns the actual GPU (or test) resources. The scene core only
//! creates buffers, writes bytes into them and submits draw calls.

use super::{
    shader::{ShaderId, ShaderSlot},
    uniforms::Uniforms,
};

/// Backend-assigned buffer identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// One attribute in an interleaved vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader slot the attribute feeds
    pub slot: ShaderSlot,
    /// Byte offset from the start of the vertex
    pub offset: usize,
    /// Number of `f32` components
    pub components: usize,
}

/// How the bytes of a vertex buffer map onto shader attribute slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexBufferLayout {
    /// Byte stride between consecutive vertices
    pub array_stride: usize,
    pub attributes: &'static [VertexAttribute],
}

impl VertexBufferLayout {
    /// Whole vertices in `bytes` bytes, or `None` if they do not divide
    /// evenly.
    pub fn vertex_count(&self, bytes: usize) -> Option<usize> {
        if self.array_stride == 0 || bytes % self.array_stride != 0 {
            return None;
        }
        Some(bytes / self.array_stride)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// Interleaved vertex data in the given layout
    Vertex(VertexBufferLayout),
    /// `u32` indices
    Index,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    Lines,
    Points,
}

/// One draw submission.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub shader: ShaderId,
    pub topology: Topology,
    pub vertex_buffer: BufferId,
    /// Indexed draw when present, otherwise `count` vertices in order
    pub index_buffer: Option<BufferId>,
    /// Number of indices (or vertices) to draw
    pub count: u32,
    pub uniforms: Uniforms,
}

impl DrawCall {
    /// Number of whole primitives this call draws.
    pub fn primitive_count(&self) -> u32 {
        match self.topology {
            Topology::Triangles => self.count / 3,
            Topology::Lines => self.count / 2,
            Topology::Points => self.count,
        }
    }
}

/// Sink for buffer uploads and draw calls.
pub trait RenderBackend {
    /// Vertex buffers carry the layout shaders bind their attributes with.
    fn create_buffer(&mut self, kind: BufferKind, label: &str) -> BufferId;

    /// Replaces the whole contents of a buffer.
    fn write_buffer(&mut self, id: BufferId, data: &[u8]);

    fn draw(&mut self, call: &DrawCall);
}
