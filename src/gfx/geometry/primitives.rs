//! # Primitive Shape Generation
//!
//! Unit meshes shared by every procedural shape in a scene. A shape places
//! one of these with its own corrective matrix, so the meshes themselves are
//! fixed:
//!
//! - sphere: radius 1, centered at the origin
//! - box: side 1, centered at the origin
//! - cylinder and cone: radius 1, height 1, base at the origin, axis +Y
//!
//! Faces are polygons wound counter-clockwise seen from outside. Vertices
//! are shared between faces, so derived normals are smooth.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Vector3};

use crate::gfx::mesh::Mesh;

/// Longitude segments of the base sphere
pub const SPHERE_LONGITUDE_SEGMENTS: u32 = 32;
/// Latitude segments of the base sphere
pub const SPHERE_LATITUDE_SEGMENTS: u32 = 16;
/// Segments around the base cylinder and cone
pub const ROUND_SEGMENTS: u32 = 32;

/// Builds a mesh from positions and faces that are known to be valid.
fn assemble(positions: &[Vector3<f32>], faces: Vec<Vec<usize>>) -> Mesh {
    let mut mesh = Mesh::new();
    for &p in positions {
        mesh.add_vertex(p);
    }
    mesh.faces = faces;
    mesh.mark_dirty();
    mesh
}

fn ring(segments: u32, y: f32, radius: f32) -> impl Iterator<Item = Vector3<f32>> {
    (0..segments).map(move |j| {
        let phi = j as f32 * 2.0 * PI / segments as f32;
        Vector3::new(radius * phi.cos(), y, radius * phi.sin())
    })
}

/// Generate a unit cube centered at the origin
///
/// Returns a cube with vertices from -0.5 to 0.5 on all axes.
pub fn generate_cube() -> Mesh {
    // Vertex i has x, y, z set from bits 0, 1, 2
    let positions: Vec<Vector3<f32>> = (0..8)
        .map(|i| {
            let coord = |bit: u32| if i & (1 << bit) != 0 { 0.5 } else { -0.5 };
            Vector3::new(coord(0), coord(1), coord(2))
        })
        .collect();

    let faces = vec![
        vec![5, 1, 3, 7], // +x
        vec![0, 4, 6, 2], // -x
        vec![2, 6, 7, 3], // +y
        vec![0, 1, 5, 4], // -y
        vec![4, 5, 7, 6], // +z
        vec![0, 2, 3, 1], // -z
    ];
    assemble(&positions, faces)
}

/// Generate a UV sphere with specified resolution
///
/// # Arguments
/// * `longitude_segments` - Number of vertical segments (longitude lines)
/// * `latitude_segments` - Number of horizontal segments (latitude lines)
///
/// Returns a sphere of radius 1.0 centered at the origin with one vertex at
/// each pole.
pub fn generate_sphere(longitude_segments: u32, latitude_segments: u32) -> Mesh {
    let long_segs = longitude_segments.max(3);
    let lat_segs = latitude_segments.max(2);
    let n = long_segs as usize;

    let mut positions = vec![Vector3::new(0.0, 1.0, 0.0)];
    for lat in 1..lat_segs {
        let theta = lat as f32 * PI / lat_segs as f32;
        positions.extend(ring(long_segs, theta.cos(), theta.sin()));
    }
    positions.push(Vector3::new(0.0, -1.0, 0.0));

    let top = 0;
    let bottom = positions.len() - 1;
    let ring_start = |r: usize| 1 + r * n;
    let rings = (lat_segs - 1) as usize;

    let mut faces = Vec::new();
    for j in 0..n {
        let next = (j + 1) % n;
        faces.push(vec![top, ring_start(0) + next, ring_start(0) + j]);
    }
    for r in 0..rings - 1 {
        for j in 0..n {
            let next = (j + 1) % n;
            faces.push(vec![
                ring_start(r) + j,
                ring_start(r) + next,
                ring_start(r + 1) + next,
                ring_start(r + 1) + j,
            ]);
        }
    }
    let last = ring_start(rings - 1);
    for j in 0..n {
        let next = (j + 1) % n;
        faces.push(vec![last + j, last + next, bottom]);
    }

    assemble(&positions, faces)
}

/// Generate a cylinder of radius 1 and height 1 standing on the XZ plane
///
/// # Arguments
/// * `segments` - Number of circular segments
pub fn generate_cylinder(segments: u32) -> Mesh {
    let segs = segments.max(3);
    let n = segs as usize;

    let mut positions: Vec<Vector3<f32>> = ring(segs, 0.0, 1.0).collect();
    positions.extend(ring(segs, 1.0, 1.0));

    let mut faces = Vec::new();
    for j in 0..n {
        let next = (j + 1) % n;
        faces.push(vec![n + j, n + next, next, j]);
    }
    // Caps
    faces.push((0..n).rev().map(|j| n + j).collect());
    faces.push((0..n).collect());

    assemble(&positions, faces)
}

/// Generate a cone of radius 1 and height 1 with its base on the XZ plane
/// and its apex on +Y
///
/// # Arguments
/// * `segments` - Number of circular segments
pub fn generate_cone(segments: u32) -> Mesh {
    let segs = segments.max(3);
    let n = segs as usize;

    let mut positions: Vec<Vector3<f32>> = ring(segs, 0.0, 1.0).collect();
    positions.push(Vector3::new(0.0, 1.0, 0.0));
    let apex = n;

    let mut faces: Vec<Vec<usize>> = (0..n).map(|j| vec![apex, (j + 1) % n, j]).collect();
    faces.push((0..n).collect());

    assemble(&positions, faces)
}

/// Generate a regular icosahedron inscribed in the unit sphere
pub fn generate_icosahedron() -> Mesh {
    let t = (1.0 + 5f32.sqrt()) / 2.0;
    let positions: Vec<Vector3<f32>> = [
        (-1.0, t, 0.0),
        (1.0, t, 0.0),
        (-1.0, -t, 0.0),
        (1.0, -t, 0.0),
        (0.0, -1.0, t),
        (0.0, 1.0, t),
        (0.0, -1.0, -t),
        (0.0, 1.0, -t),
        (t, 0.0, -1.0),
        (t, 0.0, 1.0),
        (-t, 0.0, -1.0),
        (-t, 0.0, 1.0),
    ]
    .into_iter()
    .map(|(x, y, z)| Vector3::new(x, y, z).normalize())
    .collect();

    let faces: Vec<Vec<usize>> = [
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ]
    .iter()
    .map(|f| f.to_vec())
    .collect();

    assemble(&positions, faces)
}

/// The icosahedron used to mark camera and light positions, scaled to `size`.
pub fn generate_beacon(size: f32) -> Mesh {
    let mut mesh = generate_icosahedron();
    mesh.scale(size, size, size);
    mesh
}
