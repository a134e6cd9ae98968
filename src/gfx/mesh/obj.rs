//! Wavefront OBJ import through `tobj`.
//!
//! Polygonal faces are kept as they are (no triangulation) and all models in
//! the file are merged into one mesh. Material libraries are not read.

use std::io::BufReader;

use cgmath::Vector3;

use crate::error::ParseError;

use super::Mesh;

pub fn parse_obj(text: &str) -> Result<Mesh, ParseError> {
    let mut reader = BufReader::new(text.as_bytes());
    let (models, _materials) = tobj::load_obj_buf(
        &mut reader,
        &tobj::LoadOptions {
            triangulate: false,
            single_index: true,
            ..Default::default()
        },
        |_| Err(tobj::LoadError::OpenFileFailed),
    )
    .map_err(|e| ParseError::Obj(e.to_string()))?;

    let mut mesh = Mesh::new();
    for model in &models {
        let m = &model.mesh;
        let offset = mesh.vertex_count();
        let has_colors = m.vertex_color.len() == m.positions.len();

        for (i, p) in m.positions.chunks_exact(3).enumerate() {
            let position = Vector3::new(p[0], p[1], p[2]);
            if has_colors {
                let c = &m.vertex_color[i * 3..i * 3 + 3];
                mesh.add_vertex_with_color(position, [c[0], c[1], c[2]]);
            } else {
                mesh.add_vertex(position);
            }
        }

        // An empty arity list means every face is a triangle
        let mut start = 0;
        let arities: Vec<usize> = if m.face_arities.is_empty() {
            vec![3; m.indices.len() / 3]
        } else {
            m.face_arities.iter().map(|&k| k as usize).collect()
        };
        for k in arities {
            let Some(face) = m.indices.get(start..start + k) else {
                return Err(ParseError::Obj(format!(
                    "model `{}` has fewer indices than its faces declare",
                    model.name
                )));
            };
            mesh.add_face(face.iter().map(|&i| offset + i as usize).collect())?;
            start += k;
        }

        log::trace!(
            "merged OBJ model `{}` ({} vertices)",
            model.name,
            m.positions.len() / 3
        );
    }

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_is_not_triangulated() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces(), &[vec![0, 1, 2, 3]]);
        assert_eq!(mesh.triangle_indices().len(), 6);
    }

    #[test]
    fn test_models_are_merged() {
        let text = "o a\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\no b\nv 0 0 1\nv 1 0 1\nv 0 1 1\nf 4 5 6\n";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.get_bbox().max.z, 1.0);
    }
}
