//! Buffer upload and draw submission for meshes.

use cgmath::Matrix4;

use crate::{
    error::RenderError,
    gfx::rendering::{BufferId, BufferKind, Canvas, DrawCall, RenderBackend, ShaderSlot, Topology},
};

use super::{vertex::Vertex3D, Mesh};

/// Shader used for edges and points.
pub const POINT_SHADER: &str = "point";
/// Shader used for normal lines.
pub const NORMAL_SHADER: &str = "normal";

pub const EDGE_COLOR: [f32; 3] = [0.136, 0.846, 0.136];
pub const POINT_COLOR: [f32; 3] = [1.0, 0.498, 0.055];
pub const NORMAL_COLOR: [f32; 3] = [0.58, 0.404, 0.741];

/// Normal lines are this fraction of the bounding box half-diagonal.
const NORMAL_LINE_FRACTION: f32 = 0.05;

/// Backend buffers owned by one mesh and the element counts last written.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MeshBuffers {
    vertices: BufferId,
    triangles: BufferId,
    edges: BufferId,
    normal_lines: BufferId,
    vertex_count: u32,
    triangle_index_count: u32,
    edge_index_count: u32,
    normal_line_vertex_count: u32,
    normal_scale: f32,
}

struct Overlay {
    shader: &'static str,
    color: [f32; 3],
    topology: Topology,
    vertex_buffer: BufferId,
    index_buffer: Option<BufferId>,
    count: u32,
}

impl Mesh {
    /// Re-derives everything the renderer needs and writes it to `backend`:
    /// vertex IDs, the bounding box, vertex normals, the interleaved vertex
    /// buffer, triangle and edge index buffers and the normal-line buffer.
    pub fn update_buffers<B: RenderBackend>(&mut self, backend: &mut B) {
        self.assign_ids();
        self.bbox = self.get_bbox();
        let normals = self.vertex_normals();
        for (v, n) in self.vertices.iter_mut().zip(normals) {
            v.normal = n;
        }

        let vertex_data: Vec<Vertex3D> = self.vertices.iter().map(|v| v.to_gpu()).collect();
        let triangles = self.triangle_indices();
        let edges = self.edge_indices().to_vec();

        let normal_scale = NORMAL_LINE_FRACTION * self.bbox.diag_length();
        let normal_lines: Vec<Vertex3D> = self
            .vertices
            .iter()
            .flat_map(|v| {
                let start = v.to_gpu();
                let end = Vertex3D {
                    position: (v.position + v.normal * normal_scale).into(),
                    ..start
                };
                [start, end]
            })
            .collect();

        let mut buffers = match self.buffers {
            Some(buffers) => buffers,
            None => MeshBuffers {
                vertices: backend
                    .create_buffer(BufferKind::Vertex(Vertex3D::desc()), "mesh vertices"),
                triangles: backend.create_buffer(BufferKind::Index, "mesh triangles"),
                edges: backend.create_buffer(BufferKind::Index, "mesh edges"),
                normal_lines: backend
                    .create_buffer(BufferKind::Vertex(Vertex3D::desc()), "mesh normal lines"),
                vertex_count: 0,
                triangle_index_count: 0,
                edge_index_count: 0,
                normal_line_vertex_count: 0,
                normal_scale: 0.0,
            },
        };

        backend.write_buffer(buffers.vertices, bytemuck::cast_slice(&vertex_data));
        backend.write_buffer(buffers.triangles, bytemuck::cast_slice(&triangles));
        backend.write_buffer(buffers.edges, bytemuck::cast_slice(&edges));
        backend.write_buffer(buffers.normal_lines, bytemuck::cast_slice(&normal_lines));

        buffers.vertex_count = vertex_data.len() as u32;
        buffers.triangle_index_count = triangles.len() as u32;
        buffers.edge_index_count = edges.len() as u32;
        buffers.normal_line_vertex_count = normal_lines.len() as u32;
        buffers.normal_scale = normal_scale;
        self.buffers = Some(buffers);
        self.buffer_updates += 1;

        log::trace!(
            "uploaded mesh buffers: {} vertices, {} triangles, bbox {}",
            buffers.vertex_count,
            buffers.triangle_index_count / 3,
            self.bbox
        );
    }

    /// Draws the mesh with the canvas's active shader under `transform`,
    /// followed by the edge, normal and point overlays the canvas asks for.
    ///
    /// Buffers are re-derived first if the mesh changed since the last
    /// render. An empty mesh draws nothing.
    pub fn render<B: RenderBackend>(
        &mut self,
        canvas: &mut Canvas<B>,
        transform: &Matrix4<f32>,
    ) -> Result<(), RenderError> {
        canvas.backend_mut()?;
        let shader = canvas.active_shader()?;

        if self.vertices.is_empty() {
            return Ok(());
        }

        if self.needs_display_update || self.buffers.is_none() {
            self.update_buffers(canvas.backend_mut()?);
        }
        let Some(buffers) = self.buffers else {
            return Ok(());
        };

        let uniforms = canvas.uniforms(&shader, transform);
        canvas.submit(&DrawCall {
            shader: shader.id,
            topology: Topology::Triangles,
            vertex_buffer: buffers.vertices,
            index_buffer: Some(buffers.triangles),
            count: buffers.triangle_index_count,
            uniforms,
        })?;

        if canvas.draw_edges {
            self.draw_edges(canvas, transform)?;
        }
        if canvas.draw_normals {
            self.draw_normals(canvas, transform)?;
        }
        if canvas.draw_points {
            self.draw_points(canvas, transform)?;
        }

        self.needs_display_update = false;
        Ok(())
    }

    pub fn draw_edges<B: RenderBackend>(
        &self,
        canvas: &mut Canvas<B>,
        transform: &Matrix4<f32>,
    ) -> Result<(), RenderError> {
        let Some(buffers) = self.buffers else {
            return Ok(());
        };
        draw_overlay(
            canvas,
            transform,
            &Overlay {
                shader: POINT_SHADER,
                color: EDGE_COLOR,
                topology: Topology::Lines,
                vertex_buffer: buffers.vertices,
                index_buffer: Some(buffers.edges),
                count: buffers.edge_index_count,
            },
            None,
        )
    }

    pub fn draw_normals<B: RenderBackend>(
        &self,
        canvas: &mut Canvas<B>,
        transform: &Matrix4<f32>,
    ) -> Result<(), RenderError> {
        let Some(buffers) = self.buffers else {
            return Ok(());
        };
        draw_overlay(
            canvas,
            transform,
            &Overlay {
                shader: NORMAL_SHADER,
                color: NORMAL_COLOR,
                topology: Topology::Lines,
                vertex_buffer: buffers.normal_lines,
                index_buffer: None,
                count: buffers.normal_line_vertex_count,
            },
            Some(buffers.normal_scale),
        )
    }

    pub fn draw_points<B: RenderBackend>(
        &self,
        canvas: &mut Canvas<B>,
        transform: &Matrix4<f32>,
    ) -> Result<(), RenderError> {
        let Some(buffers) = self.buffers else {
            return Ok(());
        };
        draw_overlay(
            canvas,
            transform,
            &Overlay {
                shader: POINT_SHADER,
                color: POINT_COLOR,
                topology: Topology::Points,
                vertex_buffer: buffers.vertices,
                index_buffer: None,
                count: buffers.vertex_count,
            },
            None,
        )
    }
}

fn draw_overlay<B: RenderBackend>(
    canvas: &mut Canvas<B>,
    transform: &Matrix4<f32>,
    overlay: &Overlay,
    normal_scale: Option<f32>,
) -> Result<(), RenderError> {
    let Some(shader) = canvas.shaders.get(overlay.shader) else {
        log::debug!("no `{}` shader registered, skipping overlay", overlay.shader);
        return Ok(());
    };

    let saved = canvas.color.replace(overlay.color);
    let mut uniforms = canvas.uniforms(&shader, transform);
    canvas.color = saved;
    if shader.accepts(ShaderSlot::NormalScale) {
        uniforms.normal_scale = normal_scale;
    }

    canvas.submit(&DrawCall {
        shader: shader.id,
        topology: overlay.topology,
        vertex_buffer: overlay.vertex_buffer,
        index_buffer: overlay.index_buffer,
        count: overlay.count,
        uniforms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        mesh::{parse_off, OffOptions},
        rendering::{shader::FLAT_SLOTS, shader::LIT_SLOTS, shader::NORMAL_LINE_SLOTS, RecordingBackend},
    };
    use cgmath::{SquareMatrix, Vector3};

    fn canvas() -> Canvas<RecordingBackend> {
        let mut canvas = Canvas::with_backend(RecordingBackend::new());
        canvas.register_shader("blinnPhong", LIT_SLOTS.iter().copied());
        canvas.register_shader(POINT_SHADER, FLAT_SLOTS.iter().copied());
        canvas.register_shader(NORMAL_SHADER, NORMAL_LINE_SLOTS.iter().copied());
        canvas.use_shader("blinnPhong");
        canvas
    }

    fn square() -> Mesh {
        parse_off(
            "OFF\n4 1 0\n0 0 0\n2 0 0\n2 2 0\n0 2 0\n4 0 1 2 3\n",
            OffOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_render_before_init_fails() {
        let mut canvas: Canvas<RecordingBackend> = Canvas::new();
        let mut mesh = square();
        assert_eq!(
            mesh.render(&mut canvas, &Matrix4::identity()),
            Err(RenderError::NoContext)
        );
    }

    #[test]
    fn test_render_without_shader_fails() {
        let mut canvas = Canvas::with_backend(RecordingBackend::new());
        let mut mesh = square();
        assert_eq!(
            mesh.render(&mut canvas, &Matrix4::identity()),
            Err(RenderError::NoShader)
        );
        assert!(mesh.needs_display_update());
    }

    #[test]
    fn test_render_rederives_once() {
        let mut canvas = canvas();
        let mut mesh = square();
        assert!(mesh.needs_display_update());

        mesh.render(&mut canvas, &Matrix4::identity()).unwrap();
        assert!(!mesh.needs_display_update());
        assert_eq!(mesh.buffer_updates(), 1);
        let writes = canvas.backend().unwrap().write_count();

        mesh.render(&mut canvas, &Matrix4::identity()).unwrap();
        assert!(!mesh.needs_display_update());
        assert_eq!(mesh.buffer_updates(), 1);
        assert_eq!(canvas.backend().unwrap().write_count(), writes);
        assert_eq!(canvas.backend().unwrap().draws().len(), 2);

        mesh.translate(Vector3::new(1.0, 0.0, 0.0));
        mesh.render(&mut canvas, &Matrix4::identity()).unwrap();
        assert_eq!(mesh.buffer_updates(), 2);
        // Buffers are reused, not recreated
        assert_eq!(canvas.backend().unwrap().buffer_count(), 4);
    }

    #[test]
    fn test_upload_contents() {
        let mut canvas = canvas();
        let mut mesh = square();
        mesh.render(&mut canvas, &Matrix4::identity()).unwrap();

        let backend = canvas.backend().unwrap();
        let draw = &backend.draws()[0];
        assert_eq!(draw.count, 6);
        assert_eq!(backend.triangle_count(), 2);

        let index_bytes = &backend.buffer(draw.index_buffer.unwrap()).unwrap().data;
        let indices: Vec<u32> = index_bytes
            .chunks_exact(4)
            .map(bytemuck::pod_read_unaligned)
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 0, 2, 3]);

        let vertex_buffer = backend.buffer(draw.vertex_buffer).unwrap();
        assert_eq!(vertex_buffer.kind, BufferKind::Vertex(Vertex3D::desc()));
        assert_eq!(vertex_buffer.element_count(), Some(4));
        let vertices: Vec<Vertex3D> = vertex_buffer
            .data
            .chunks_exact(Vertex3D::STRIDE)
            .map(bytemuck::pod_read_unaligned)
            .collect();
        assert_eq!(vertices.len(), 4);
        assert_eq!(vertices[2].position, [2.0, 2.0, 0.0]);
        assert_eq!(vertices[2].normal, [0.0, 0.0, 1.0]);

        assert_eq!(mesh.bbox().max, Vector3::new(2.0, 2.0, 0.0));
        assert_eq!(mesh.vertices()[3].id, Some(3));
    }

    #[test]
    fn test_overlays() {
        let mut canvas = canvas();
        canvas.draw_edges = true;
        canvas.draw_normals = true;
        canvas.draw_points = true;
        let mut mesh = square();
        mesh.render(&mut canvas, &Matrix4::identity()).unwrap();

        let draws = canvas.backend().unwrap().draws();
        assert_eq!(draws.len(), 4);

        let edges = &draws[1];
        assert_eq!(edges.topology, Topology::Lines);
        assert_eq!(edges.count, 8);
        assert_eq!(edges.uniforms.color, Some(EDGE_COLOR));

        let normals = &draws[2];
        assert_eq!(normals.count, 8);
        assert!(normals.uniforms.normal_scale.unwrap() > 0.0);

        let points = &draws[3];
        assert_eq!(points.topology, Topology::Points);
        assert_eq!(points.uniforms.color, Some(POINT_COLOR));

        // The flat color override does not leak into later draws
        assert_eq!(canvas.color, None);
    }

    #[test]
    fn test_empty_mesh_is_noop() {
        let mut canvas = canvas();
        let mut mesh = Mesh::new();
        mesh.render(&mut canvas, &Matrix4::identity()).unwrap();
        assert!(canvas.backend().unwrap().draws().is_empty());
        assert_eq!(mesh.buffer_updates(), 0);
    }
}
