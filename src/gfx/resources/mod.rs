//! Shared render resources

pub mod material;

// Re-export main types
pub use material::{color_from_hex, Material, MaterialManager, MaterialUniform, DEFAULT_MATERIAL};
