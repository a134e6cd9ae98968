//! # Geometry
//!
//! Pure math over `cgmath` value types and procedural base meshes.
//!
//! ## Usage
//!
//! ```rust
//! use sceneview::gfx::geometry::{generate_cube, generate_sphere, AABox3D};
//!
//! // A unit cube spans -0.5..0.5
//! let cube = generate_cube();
//! assert_eq!(cube.get_bbox().x_len(), 1.0);
//!
//! // A sphere with 32 longitude and 16 latitude segments
//! let sphere = generate_sphere(32, 16);
//! assert!(sphere.face_count() > 0);
//! # let _ = AABox3D::zero();
//! ```

pub mod bbox;
pub mod primitives;
pub mod utils;

pub use bbox::AABox3D;
pub use primitives::*;
pub use utils::{Line3D, LineIntersection, Plane3D, PlaneSide};
