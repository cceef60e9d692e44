//! Reshape a loop of mesh vertices into a circle or arc.
//!
//! The pipeline runs in the order of the modules below: a raw selection is
//! resolved to a set of vertices and edges, walked into an ordered loop,
//! measured for a frame, split into inner and outer neighbourhoods, fitted
//! to an ideal circle and finally written back to the mesh.

pub mod apply;
pub mod classify;
pub mod command;
pub mod config;
pub mod error;
pub mod fit;
pub mod frame;
pub mod idx;
pub mod mesh;
pub mod ops;
pub mod query;
pub mod resolve;
pub mod test_data;

pub use apply::UndoSnapshot;
pub use command::{circlelize, CircleCommand};
pub use error::{GeometryError, MeshError, Result};
pub use frame::Frame;
pub use idx::{EdgeId, FaceId, VertexId};
pub use mesh::Mesh;
pub use ops::{Axis, CircleParams, Component, FrameOverrides, MeshSelection, Pivot};
pub use query::MeshQuery;
pub use resolve::{OrderedLoop, Selection};
