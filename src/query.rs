//! The narrow view of a host mesh that the circularize pipeline consumes.

use nalgebra::{Point3, Vector3};

use crate::idx::{EdgeId, FaceId, VertexId};

/// Read/write access to a polygon mesh.
///
/// Handles are stable for the duration of one operation. Adjacency queries
/// return handles in a fixed, deterministic order.
pub trait MeshQuery {
    fn has_vertex(&self, id: VertexId) -> bool;

    fn has_edge(&self, id: EdgeId) -> bool;

    fn has_face(&self, id: FaceId) -> bool;

    fn vertex_position(&self, id: VertexId) -> Point3<f64>;

    fn set_vertex_position(&mut self, id: VertexId, position: Point3<f64>);

    /// Unit surface normal at a vertex. May be zero for isolated vertices.
    fn vertex_normal(&self, id: VertexId) -> Vector3<f64>;

    fn connected_vertices(&self, id: VertexId) -> Vec<VertexId>;

    fn connected_edges(&self, id: VertexId) -> Vec<EdgeId>;

    fn connected_faces(&self, id: VertexId) -> Vec<FaceId>;

    fn edge_endpoints(&self, id: EdgeId) -> (VertexId, VertexId);

    fn edge_faces(&self, id: EdgeId) -> Vec<FaceId>;

    /// True when the edge borders exactly one face.
    fn is_boundary_edge(&self, id: EdgeId) -> bool;

    fn is_boundary_vertex(&self, id: VertexId) -> bool;

    fn incident_vertices_of_face(&self, id: FaceId) -> Vec<VertexId>;

    /// Closest point where the line `origin + t * direction` meets the
    /// surface, for `|t| <= max_distance`. Both directions are tested.
    fn closest_surface_intersection(
        &self,
        origin: Point3<f64>,
        direction: Vector3<f64>,
        max_distance: f64,
    ) -> Option<Point3<f64>>;

    /// Edge joining two vertices, if any.
    fn edge_between(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.connected_edges(a).into_iter().find(|&e| {
            let (p, q) = self.edge_endpoints(e);
            (p == a && q == b) || (p == b && q == a)
        })
    }
}
