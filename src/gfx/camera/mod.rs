pub mod camera_utils;
pub mod scene_camera;

// Re-export main types
pub use camera_utils::matrix4_from_row_major;
pub use scene_camera::{Camera, RotationInterpolation};
