//! # Error Types
//!
//! One error enum per failure domain. Parse and spec errors are fatal to the
//! operation that raised them; load errors are reported and leave the
//! requesting shape unresolved; render errors are programmer errors.

use thiserror::Error;

/// A structural mesh edit referenced a vertex that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    #[error("vertex index {index} is out of range for a mesh with {count} vertices")]
    InvalidIndex { index: usize, count: usize },
}

/// Malformed mesh text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unsupported mesh file type `{0}`")]
    UnsupportedFormat(String),

    #[error("line {line}: not enough fields for nVertices, nFaces, nEdges")]
    Header { line: usize },

    #[error("line {line}: too few fields on a vertex line")]
    VertexFields { line: usize },

    #[error("line {line}: face declares {declared} vertices but only {found} indices are given")]
    FaceFields {
        line: usize,
        declared: usize,
        found: usize,
    },

    #[error("line {line}: `{token}` is not a valid number")]
    Number { line: usize, token: String },

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error("obj: {0}")]
    Obj(String),
}

/// Malformed scene description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("invalid scene description: {0}")]
    Json(String),

    #[error("4x4 transformation matrix must have 16 entries, found {0}")]
    TransformLength(usize),

    #[error("shape references unknown material `{0}`")]
    UnknownMaterial(String),

    #[error("mesh shape specifies neither `filename` nor `src`")]
    MissingMeshSource,
}

impl From<serde_json::Error> for SpecError {
    fn from(err: serde_json::Error) -> Self {
        SpecError::Json(err.to_string())
    }
}

/// A failed asynchronous load. Cloneable so a single failure can be handed
/// to every waiter of a shared load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("could not fetch `{path}`: {reason}")]
    Fetch { path: String, reason: String },

    #[error("could not parse `{path}`: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },

    #[error("could not parse scene `{path}`: {source}")]
    Scene {
        path: String,
        #[source]
        source: SpecError,
    },
}

/// Render called before the required context exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("render context has not been initialized")]
    NoContext,

    #[error("no compiled shader is bound for rendering")]
    NoShader,
}
