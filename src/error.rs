//! Error types for loop resolution, fitting and application.

use thiserror::Error;

use crate::idx::{EdgeId, FaceId, VertexId};

/// Result type for geometry operations.
pub type Result<T> = std::result::Result<T, GeometryError>;

/// Errors surfaced by the circularize pipeline.
///
/// None of these leave the mesh partially modified: every check runs
/// before the first vertex position is written.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    /// The raw selection holds no vertices, edges or faces.
    #[error("no component selected")]
    NoComponentSelected,

    /// An explicit radius of zero was supplied.
    #[error("the radius can not be zero")]
    ZeroRadius,

    /// An explicit negative radius was supplied.
    #[error("the radius can not be negative (got {0})")]
    NegativeRadius(f64),

    /// An explicit radius that is NaN or infinite.
    #[error("the radius must be finite (got {0})")]
    InvalidRadius(f64),

    /// An explicit pivot with a NaN or infinite coordinate.
    #[error("the pivot must be finite")]
    InvalidPivot,

    /// The averaged (or supplied) normal has near-zero length.
    #[error("circle normal is degenerate (length {length})")]
    DegenerateNormal {
        /// Length of the summed normal.
        length: f64,
    },

    /// The selected edges could not be walked into a usable loop.
    #[error("no continuous loop found: {reason}")]
    NoContinuousLoopFound {
        /// What went wrong while ordering.
        reason: String,
    },

    /// Undo or redo was requested without a captured snapshot.
    #[error("no undo state available")]
    MissingUndoState,

    /// A loop vertex does not exist in the mesh.
    #[error("vertex {0} is not part of the mesh")]
    UnknownVertex(VertexId),

    /// A selected edge does not exist in the mesh.
    #[error("edge {0} is not part of the mesh")]
    UnknownEdge(EdgeId),

    /// A selected face does not exist in the mesh.
    #[error("face {0} is not part of the mesh")]
    UnknownFace(FaceId),

    /// The arc span is NaN or infinite.
    #[error("invalid degree span {0}")]
    InvalidDegreeSpan(f64),

    /// A position list does not line up with its loop.
    #[error("expected {expected} positions, got {actual}")]
    PointCountMismatch {
        /// Loop length.
        expected: usize,
        /// Number of positions supplied.
        actual: usize,
    },
}

/// Errors raised while building the reference [`Mesh`](crate::mesh::Mesh).
#[derive(Debug, Error)]
pub enum MeshError {
    /// A face references a vertex index past the end of the position list.
    #[error("invalid vertex index {index} (mesh has {vertex_count} vertices)")]
    InvalidVertexIndex {
        /// The invalid index.
        index: usize,
        /// Total number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A face has fewer than three corners or repeats a corner.
    #[error("face {face} is degenerate")]
    DegenerateFace {
        /// Position of the face in the input list.
        face: usize,
    },

    /// Reading or writing a Wavefront OBJ file failed.
    #[error("obj: {0}")]
    Obj(#[from] obj::ObjError),
}
