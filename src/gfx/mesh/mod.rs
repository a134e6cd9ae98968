//! # Polygon Meshes
//!
//! A [`Mesh`] owns an ordered list of vertices and an ordered list of
//! polygonal faces (vertex index lists, counter-clockwise around the outward
//! normal). Edges, the bounding box, vertex normals and the render buffers
//! are all derived from those two lists.
//!
//! Any geometric mutation sets the "needs display update" flag. The next
//! [`Mesh::render`] re-derives and uploads the buffers and clears it.
//!
//! Meshes are populated in one of four ways:
//! - from OFF text ([`parse_off`]) or OBJ text ([`obj::parse_obj`])
//! - from flat position / triangle buffers ([`Mesh::from_buffers`])
//! - by a procedural generator in [`crate::gfx::geometry`]
//! - by structural edits ([`Mesh::add_vertex`], [`Mesh::add_face`])

pub mod obj;
pub mod off;
pub mod render;
pub mod vertex;

use std::{cell::OnceCell, cell::RefCell, path::Path, rc::Rc};

use cgmath::{InnerSpace, Matrix4, Point3, Transform, Vector3, Zero};

use crate::{
    error::{MeshError, ParseError},
    gfx::geometry::AABox3D,
};

pub use off::{parse_off, parse_off_lines, OffOptions};
pub use render::{NORMAL_SHADER, POINT_SHADER};
pub use vertex::{Vertex, Vertex3D, DEFAULT_VERTEX_COLOR};

/// A mesh shared between the cache and every shape that displays it.
pub type MeshHandle = Rc<RefCell<Mesh>>;

/// Wraps a mesh into a shareable handle.
pub fn into_handle(mesh: Mesh) -> MeshHandle {
    Rc::new(RefCell::new(mesh))
}

/// Text formats a mesh can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Off,
    Obj,
}

impl MeshFormat {
    /// Picks the format from a file extension (case-insensitive).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match ext.as_str() {
            "off" | "coff" => Ok(MeshFormat::Off),
            "obj" => Ok(MeshFormat::Obj),
            _ => Err(ParseError::UnsupportedFormat(ext)),
        }
    }

    pub fn parse(self, text: &str, options: OffOptions) -> Result<Mesh, ParseError> {
        match self {
            MeshFormat::Off => parse_off(text, options),
            MeshFormat::Obj => obj::parse_obj(text),
        }
    }
}

/// An indexed polygon mesh.
#[derive(Debug)]
pub struct Mesh {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) faces: Vec<Vec<usize>>,
    edges: OnceCell<Vec<u32>>,
    bbox: AABox3D,
    needs_display_update: bool,
    pub(crate) buffers: Option<render::MeshBuffers>,
    buffer_updates: usize,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Mesh {
    /// An empty mesh. Rendering it is a no-op.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            edges: OnceCell::new(),
            bbox: AABox3D::zero(),
            needs_display_update: true,
            buffers: None,
            buffer_updates: 0,
        }
    }

    /// Builds a triangle mesh from flat buffers.
    ///
    /// `positions` holds `x y z` triples, `triangles` holds index triples
    /// and `colors`, when given, holds one `r g b` triple per vertex.
    pub fn from_buffers(
        positions: &[f32],
        triangles: &[u32],
        colors: Option<&[f32]>,
    ) -> Result<Self, MeshError> {
        let mut mesh = Self::new();
        for (i, p) in positions.chunks_exact(3).enumerate() {
            let position = Vector3::new(p[0], p[1], p[2]);
            match colors.and_then(|c| c.get(i * 3..i * 3 + 3)) {
                Some(c) => mesh.add_vertex_with_color(position, [c[0], c[1], c[2]]),
                None => mesh.add_vertex(position),
            };
        }
        for tri in triangles.chunks_exact(3) {
            mesh.add_face(tri.iter().map(|&i| i as usize).collect())?;
        }
        Ok(mesh)
    }

    /// A single-face mesh from the polygon's corners, in order.
    pub fn from_polygon(corners: &[Vector3<f32>]) -> Self {
        let mut mesh = Self::new();
        for &c in corners {
            mesh.add_vertex(c);
        }
        if corners.len() >= 3 {
            mesh.faces.push((0..corners.len()).collect());
        }
        mesh
    }

    /// Appends a vertex and returns its index.
    pub fn add_vertex(&mut self, position: Vector3<f32>) -> usize {
        self.push_vertex(Vertex::new(position))
    }

    pub fn add_vertex_with_color(&mut self, position: Vector3<f32>, color: [f32; 3]) -> usize {
        self.push_vertex(Vertex::with_color(position, color))
    }

    fn push_vertex(&mut self, vertex: Vertex) -> usize {
        self.vertices.push(vertex);
        self.structure_changed();
        self.vertices.len() - 1
    }

    /// Appends a face and returns its index.
    ///
    /// Every index must refer to an existing vertex.
    pub fn add_face(&mut self, indices: Vec<usize>) -> Result<usize, MeshError> {
        let count = self.vertices.len();
        if let Some(&index) = indices.iter().find(|&&i| i >= count) {
            return Err(MeshError::InvalidIndex { index, count });
        }
        self.faces.push(indices);
        self.structure_changed();
        Ok(self.faces.len() - 1)
    }

    fn structure_changed(&mut self) {
        self.edges = OnceCell::new();
        self.needs_display_update = true;
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn has_colors(&self) -> bool {
        self.vertices.iter().any(|v| v.color.is_some())
    }

    /// Applies `matrix` to every vertex position.
    pub fn transform(&mut self, matrix: &Matrix4<f32>) {
        for v in &mut self.vertices {
            let p = matrix.transform_point(Point3::new(v.position.x, v.position.y, v.position.z));
            v.position = Vector3::new(p.x, p.y, p.z);
        }
        self.needs_display_update = true;
    }

    pub fn translate(&mut self, offset: Vector3<f32>) {
        for v in &mut self.vertices {
            v.position += offset;
        }
        self.needs_display_update = true;
    }

    pub fn scale(&mut self, sx: f32, sy: f32, sz: f32) {
        for v in &mut self.vertices {
            v.position.x *= sx;
            v.position.y *= sy;
            v.position.z *= sz;
        }
        self.needs_display_update = true;
    }

    /// Tight box around the current vertex positions.
    pub fn get_bbox(&self) -> AABox3D {
        AABox3D::from_points(self.vertices.iter().map(|v| v.position))
    }

    /// Tight box around the vertex positions as they would be after
    /// applying `matrix`. The mesh itself is not modified.
    pub fn get_bbox_transformed(&self, matrix: &Matrix4<f32>) -> AABox3D {
        AABox3D::from_points(self.vertices.iter().map(|v| {
            let p = matrix.transform_point(Point3::new(v.position.x, v.position.y, v.position.z));
            Vector3::new(p.x, p.y, p.z)
        }))
    }

    /// Bounding box as of the last buffer upload.
    pub fn bbox(&self) -> AABox3D {
        self.bbox
    }

    /// Fan triangulation of every face, flattened.
    pub fn triangle_indices(&self) -> Vec<u32> {
        let mut indices = Vec::new();
        for face in &self.faces {
            for i in 2..face.len() {
                indices.push(face[0] as u32);
                indices.push(face[i - 1] as u32);
                indices.push(face[i] as u32);
            }
        }
        indices
    }

    /// Consecutive vertex pairs around every face, flattened.
    ///
    /// Edges shared by two faces appear twice.
    pub fn edge_indices(&self) -> &[u32] {
        self.edges.get_or_init(|| {
            let mut indices = Vec::new();
            for face in &self.faces {
                let k = face.len();
                if k < 2 {
                    continue;
                }
                for i in 0..k {
                    indices.push(face[i] as u32);
                    indices.push(face[(i + 1) % k] as u32);
                }
            }
            indices
        })
    }

    /// Per-vertex normals.
    ///
    /// Each face contributes the sum of its fan cross products
    /// `(v[i-1] - v[0]) x (v[i] - v[0])` to every one of its vertices, so
    /// degenerate faces contribute nothing. A vertex whose sum is zero gets +Z.
    pub fn vertex_normals(&self) -> Vec<Vector3<f32>> {
        let mut sums = vec![Vector3::zero(); self.vertices.len()];
        for face in &self.faces {
            if face.len() < 3 {
                continue;
            }
            let v0 = self.vertices[face[0]].position;
            let mut n = Vector3::zero();
            for i in 2..face.len() {
                let a = self.vertices[face[i - 1]].position - v0;
                let b = self.vertices[face[i]].position - v0;
                n += a.cross(b);
            }
            for &idx in face {
                sums[idx] += n;
            }
        }
        sums.into_iter()
            .map(|n: Vector3<f32>| {
                if n.magnitude2() > 0.0 {
                    n.normalize()
                } else {
                    Vector3::unit_z()
                }
            })
            .collect()
    }

    /// Forces a buffer re-derivation on the next render.
    pub fn mark_dirty(&mut self) {
        self.needs_display_update = true;
    }

    pub fn needs_display_update(&self) -> bool {
        self.needs_display_update
    }

    /// How many times the render buffers have been re-derived.
    pub fn buffer_updates(&self) -> usize {
        self.buffer_updates
    }

    /// Sets vertex IDs to their current indices.
    pub(crate) fn assign_ids(&mut self) {
        for (i, v) in self.vertices.iter_mut().enumerate() {
            v.id = Some(i);
        }
    }
}
