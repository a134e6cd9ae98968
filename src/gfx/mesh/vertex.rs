//! # Vertex Data Structures
//!
//! [`Vertex`] is the editable per-vertex record owned by a [`Mesh`](super::Mesh).
//! [`Vertex3D`] is the interleaved, GPU-compatible layout it is flattened into
//! when the mesh uploads its buffers.

use cgmath::{Vector3, Zero};

use crate::gfx::rendering::{ShaderSlot, VertexAttribute, VertexBufferLayout};

/// Color used for vertices that were not given one.
pub const DEFAULT_VERTEX_COLOR: [f32; 3] = [0.6, 0.6, 0.6];

/// A mesh vertex.
///
/// The normal is derived from the incident faces each time the mesh
/// re-uploads its buffers. The `id` is assigned at the same time (and while
/// serializing) and is not stable across uploads.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub position: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub color: Option<[f32; 3]>,
    pub id: Option<usize>,
}

impl Vertex {
    pub fn new(position: Vector3<f32>) -> Self {
        Self {
            position,
            normal: Vector3::zero(),
            color: None,
            id: None,
        }
    }

    pub fn with_color(position: Vector3<f32>, color: [f32; 3]) -> Self {
        Self {
            color: Some(color),
            ..Self::new(position)
        }
    }

    /// The vertex color, or the default gray.
    pub fn color_or_default(&self) -> [f32; 3] {
        self.color.unwrap_or(DEFAULT_VERTEX_COLOR)
    }

    pub(crate) fn to_gpu(&self) -> Vertex3D {
        Vertex3D {
            position: self.position.into(),
            normal: self.normal.into(),
            color: self.color_or_default(),
        }
    }
}

/// A vertex as laid out in a vertex buffer.
///
/// The `#[repr(C)]` attribute gives the struct the C-compatible layout
/// buffer uploads rely on.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    /// 3D position coordinates [x, y, z]
    pub position: [f32; 3],
    /// Unit normal [nx, ny, nz] for lighting calculations
    pub normal: [f32; 3],
    /// Linear RGB color in 0-1
    pub color: [f32; 3],
}

static VERTEX3D_ATTRIBUTES: [VertexAttribute; 3] = [
    VertexAttribute {
        slot: ShaderSlot::Position,
        offset: 0,
        components: 3,
    },
    VertexAttribute {
        slot: ShaderSlot::Normal,
        offset: std::mem::size_of::<[f32; 3]>(),
        components: 3,
    },
    VertexAttribute {
        slot: ShaderSlot::Color,
        offset: std::mem::size_of::<[f32; 6]>(),
        components: 3,
    },
];

impl Vertex3D {
    /// Byte stride between consecutive vertices.
    pub const STRIDE: usize = std::mem::size_of::<Vertex3D>();

    /// Describes how the interleaved data maps onto shader attribute slots:
    /// - position (3 floats) at offset 0
    /// - normal (3 floats) after the position
    /// - color (3 floats) after the normal
    pub fn desc() -> VertexBufferLayout {
        VertexBufferLayout {
            array_stride: Self::STRIDE,
            attributes: &VERTEX3D_ATTRIBUTES,
        }
    }
}
