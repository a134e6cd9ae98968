//! OFF / COFF reading and writing.
//!
//! ```text
//! OFF                      (COFF when vertices carry colors)
//! nVertices nFaces nEdges  (nEdges is ignored)
//! x y z [r g b]            (nVertices lines)
//! k i0 i1 ... i(k-1)       (nFaces lines)
//! ```
//!
//! Blank lines and `#` comments are skipped anywhere. The counts may follow
//! the tag on the same line, and the tag may be left out entirely when the
//! first line is a count line with at least three fields. Content after the
//! last declared face is ignored, and a file that ends early yields the
//! vertices and faces read so far.

use std::{fmt::Write as _, path::Path, str::FromStr};

use cgmath::Vector3;

use crate::error::ParseError;

use super::Mesh;

/// Options for reading OFF files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OffOptions {
    /// Vertex colors are written in 0-255 and must be scaled to 0-1.
    pub divide_color: bool,
}

enum State {
    Tag,
    Counts,
    Vertices { remaining: usize, faces: usize },
    Faces { remaining: usize },
    Done,
}

impl State {
    fn after_counts(vertices: usize, faces: usize) -> Self {
        if vertices > 0 {
            State::Vertices {
                remaining: vertices,
                faces,
            }
        } else {
            State::after_vertices(faces)
        }
    }

    fn after_vertices(faces: usize) -> Self {
        if faces > 0 {
            State::Faces { remaining: faces }
        } else {
            State::Done
        }
    }
}

fn number<T: FromStr>(token: &str, line: usize) -> Result<T, ParseError> {
    token.parse().map_err(|_| ParseError::Number {
        line,
        token: token.to_string(),
    })
}

fn counts(fields: &[&str], line: usize) -> Result<State, ParseError> {
    let vertices = number(fields[0], line)?;
    let faces = number(fields[1], line)?;
    Ok(State::after_counts(vertices, faces))
}

fn is_tag(token: &str) -> bool {
    token.eq_ignore_ascii_case("OFF") || token.eq_ignore_ascii_case("COFF")
}

/// Parses OFF text.
pub fn parse_off(text: &str, options: OffOptions) -> Result<Mesh, ParseError> {
    parse_off_lines(text.lines(), options)
}

/// Parses OFF text that has already been split into lines.
pub fn parse_off_lines<'a, I>(lines: I, options: OffOptions) -> Result<Mesh, ParseError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut mesh = Mesh::new();
    let mut state = State::Tag;

    for (i, raw) in lines.into_iter().enumerate() {
        let line = i + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('\0') {
            continue;
        }
        let fields: Vec<&str> = trimmed.split_whitespace().collect();

        state = match state {
            State::Tag => {
                let token = fields[0];
                if is_tag(token) {
                    if fields.len() > 2 {
                        counts(&fields[1..], line)?
                    } else {
                        State::Counts
                    }
                } else if token.parse::<usize>().is_ok() {
                    if fields.len() < 3 {
                        return Err(ParseError::Header { line });
                    }
                    counts(&fields, line)?
                } else {
                    return Err(ParseError::UnsupportedFormat(token.to_string()));
                }
            }
            State::Counts => {
                if fields.len() < 3 {
                    return Err(ParseError::Header { line });
                }
                counts(&fields, line)?
            }
            State::Vertices { remaining, faces } => {
                if fields.len() < 3 {
                    return Err(ParseError::VertexFields { line });
                }
                let position = Vector3::new(
                    number(fields[0], line)?,
                    number(fields[1], line)?,
                    number(fields[2], line)?,
                );
                if fields.len() >= 6 {
                    let mut color: [f32; 3] = [
                        number(fields[3], line)?,
                        number(fields[4], line)?,
                        number(fields[5], line)?,
                    ];
                    if options.divide_color {
                        color.iter_mut().for_each(|c| *c /= 255.0);
                    }
                    mesh.add_vertex_with_color(position, color);
                } else {
                    mesh.add_vertex(position);
                }

                if remaining > 1 {
                    State::Vertices {
                        remaining: remaining - 1,
                        faces,
                    }
                } else {
                    State::after_vertices(faces)
                }
            }
            State::Faces { remaining } => {
                let declared: usize = number(fields[0], line)?;
                let found = fields.len() - 1;
                if found < declared {
                    return Err(ParseError::FaceFields {
                        line,
                        declared,
                        found,
                    });
                }
                let indices = fields[1..=declared]
                    .iter()
                    .map(|token| number(token, line))
                    .collect::<Result<Vec<usize>, _>>()?;
                mesh.add_face(indices)?;

                if remaining > 1 {
                    State::Faces {
                        remaining: remaining - 1,
                    }
                } else {
                    State::Done
                }
            }
            State::Done => break,
        };
    }

    log::trace!(
        "parsed OFF mesh with {} vertices and {} faces",
        mesh.vertex_count(),
        mesh.face_count()
    );
    Ok(mesh)
}

impl Mesh {
    /// Writes the mesh as OFF text, or COFF when any vertex has a color.
    ///
    /// Vertex IDs are reassigned first and faces are written in terms of
    /// them. Colors are written in 0-1; vertices without one get the default
    /// gray.
    pub fn to_off_string(&mut self) -> String {
        self.assign_ids();
        let colored = self.has_colors();

        let mut out = String::new();
        out.push_str(if colored { "COFF\n" } else { "OFF\n" });
        let _ = writeln!(out, "{} {} 0", self.vertices.len(), self.faces.len());

        for v in &self.vertices {
            let p = v.position;
            if colored {
                let c = v.color_or_default();
                let _ = writeln!(out, "{} {} {} {} {} {}", p.x, p.y, p.z, c[0], c[1], c[2]);
            } else {
                let _ = writeln!(out, "{} {} {}", p.x, p.y, p.z);
            }
        }

        for face in &self.faces {
            let _ = write!(out, "{}", face.len());
            for &i in face {
                let id = self.vertices[i].id.unwrap_or(i);
                let _ = write!(out, " {}", id);
            }
            out.push('\n');
        }
        out
    }

    /// Writes [`Mesh::to_off_string`] to `path`.
    pub fn save_off(&mut self, path: impl AsRef<Path>) -> std::io::Result<()> {
        std::fs::write(path, self.to_off_string())
    }
}
