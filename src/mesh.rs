use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use nalgebra::{Point3, Vector3};

use crate::config::RAY_EPSILON;
use crate::error::MeshError;
use crate::idx::{EdgeId, FaceId, IdVec, VertexId};
use crate::query::MeshQuery;

#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, Debug)]
pub struct Corner {
    pub face: FaceId,
    pub index: usize,
}

#[derive(Clone, Debug)]
pub struct Edge {
    pub a: VertexId,
    pub b: VertexId,
    pub faces: Vec<FaceId>,
}

/// Polygon mesh with an undirected edge table.
///
/// Topology is fixed at construction; only positions change afterwards.
#[derive(Clone, Debug)]
pub struct Mesh {
    positions: IdVec<VertexId, Point3<f64>>,
    faces: IdVec<FaceId, Vec<VertexId>>,
    edges: IdVec<EdgeId, Edge>,
    vertex_edges: IdVec<VertexId, Vec<EdgeId>>,
    vertex_faces: IdVec<VertexId, Vec<FaceId>>,
}

pub struct FaceCornersIter {
    face: FaceId,
    index: usize,
    count: usize,
}

impl Iterator for FaceCornersIter {
    type Item = Corner;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        let index = self.index;
        self.index += 1;
        Some(Corner {
            face: self.face,
            index,
        })
    }
}

impl Mesh {
    pub fn from_polygons(
        positions: Vec<Point3<f64>>,
        polygons: Vec<Vec<usize>>,
    ) -> Result<Self, MeshError> {
        let vertex_count = positions.len();
        let mut mesh = Mesh {
            positions: positions.into_iter().collect(),
            faces: IdVec::with_capacity(polygons.len()),
            edges: IdVec::new(),
            vertex_edges: (0..vertex_count).map(|_| Vec::new()).collect(),
            vertex_faces: (0..vertex_count).map(|_| Vec::new()).collect(),
        };

        let mut edge_lookup: HashMap<(VertexId, VertexId), EdgeId> = HashMap::new();
        for (f, polygon) in polygons.into_iter().enumerate() {
            if let Some(&index) = polygon.iter().find(|&&i| i >= vertex_count) {
                return Err(MeshError::InvalidVertexIndex {
                    index,
                    vertex_count,
                });
            }
            if is_degenerate(&polygon) {
                return Err(MeshError::DegenerateFace { face: f });
            }

            let face = mesh
                .faces
                .push(polygon.into_iter().map(VertexId).collect());
            for corner in face.corners(&mesh).collect::<Vec<_>>() {
                let a = corner.to_vertex(&mesh);
                let b = corner.next(&mesh).to_vertex(&mesh);
                let key = if a < b { (a, b) } else { (b, a) };
                let edge = match edge_lookup.get(&key) {
                    Some(&edge) => edge,
                    None => {
                        let edge = mesh.edges.push(Edge {
                            a: key.0,
                            b: key.1,
                            faces: vec![],
                        });
                        mesh.vertex_edges[key.0].push(edge);
                        mesh.vertex_edges[key.1].push(edge);
                        edge_lookup.insert(key, edge);
                        edge
                    }
                };
                mesh.edges[edge].faces.push(face);
                mesh.vertex_faces[a].push(face);
            }
        }
        Ok(mesh)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn positions(&self) -> impl Iterator<Item = (VertexId, &Point3<f64>)> {
        self.positions.iter()
    }

    pub fn boundary_edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges
            .iter()
            .filter(|(_, edge)| edge.faces.len() == 1)
            .map(|(id, _)| id)
    }

    /// Boundary edges reachable from `start` through shared boundary
    /// vertices, in ascending handle order.
    pub fn boundary_component(&self, start: EdgeId) -> Vec<EdgeId> {
        let mut found = BTreeSet::new();
        if !self.is_boundary_edge(start) {
            return vec![];
        }
        let mut stack = vec![start];
        while let Some(edge) = stack.pop() {
            if !found.insert(edge) {
                continue;
            }
            let Edge { a, b, .. } = self.edges[edge];
            for v in [a, b] {
                stack.extend(
                    self.vertex_edges[v]
                        .iter()
                        .copied()
                        .filter(|&e| self.is_boundary_edge(e) && !found.contains(&e)),
                );
            }
        }
        found.into_iter().collect()
    }

    /// Builds a mesh from every polygon of every group in an OBJ file.
    pub fn from_obj(data: &obj::ObjData) -> Result<Self, MeshError> {
        let positions = data
            .position
            .iter()
            .map(|p| Point3::new(p[0] as f64, p[1] as f64, p[2] as f64))
            .collect();
        let polygons = data
            .objects
            .iter()
            .flat_map(|object| object.groups.iter())
            .flat_map(|group| group.polys.iter())
            .map(|poly| poly.0.iter().map(|tuple| tuple.0).collect())
            .collect();
        Mesh::from_polygons(positions, polygons)
    }

    /// Loads an OBJ file, returning the parsed file alongside the mesh so the
    /// positions can later be written back with [`Mesh::write_positions`].
    pub fn load_obj(path: &Path) -> Result<(obj::Obj, Self), MeshError> {
        let file = obj::Obj::load(path)?;
        let mesh = Mesh::from_obj(&file.data)?;
        Ok((file, mesh))
    }

    /// Copies positions back into the OBJ data this mesh was built from.
    pub fn write_positions(&self, data: &mut obj::ObjData) {
        for (slot, (_, p)) in data.position.iter_mut().zip(self.positions.iter()) {
            *slot = [p.x as f32, p.y as f32, p.z as f32];
        }
    }
}

fn is_degenerate(polygon: &[usize]) -> bool {
    if polygon.len() < 3 {
        return true;
    }
    for a in 0..(polygon.len() - 1) {
        for b in (a + 1)..polygon.len() {
            if polygon[a] == polygon[b] {
                return true;
            }
        }
    }
    false
}

impl FaceId {
    pub fn to_vertices(self, mesh: &Mesh) -> &[VertexId] {
        &mesh.faces[self]
    }

    pub fn corner_count(&self, mesh: &Mesh) -> usize {
        mesh.faces[*self].len()
    }

    pub fn corners(&self, mesh: &Mesh) -> FaceCornersIter {
        FaceCornersIter {
            face: *self,
            index: 0,
            count: self.corner_count(mesh),
        }
    }

    /// Area-weighted normal (Newell's method); its length is twice the
    /// polygon's area.
    pub fn area_normal(&self, mesh: &Mesh) -> Vector3<f64> {
        let mut n = Vector3::zeros();
        for corner in self.corners(mesh) {
            let p = corner.to_point(mesh);
            let q = corner.next(mesh).to_point(mesh);
            n.x += (p.y - q.y) * (p.z + q.z);
            n.y += (p.z - q.z) * (p.x + q.x);
            n.z += (p.x - q.x) * (p.y + q.y);
        }
        n
    }

    pub fn compute_normal(&self, mesh: &Mesh) -> Vector3<f64> {
        let n = self.area_normal(mesh);
        if n.norm_squared() == 0. {
            return n;
        }
        n.normalize()
    }

    /// Signed ray parameter of the closest hit on this polygon, testing the
    /// fan triangles `(v0, vi, vi+1)`.
    fn intersect(&self, mesh: &Mesh, origin: &Point3<f64>, dir: &Vector3<f64>) -> Option<f64> {
        let verts = self.to_vertices(mesh);
        let v0 = mesh.positions[verts[0]];
        verts
            .windows(2)
            .skip(1)
            .filter_map(|pair| {
                intersect_triangle(
                    origin,
                    dir,
                    &v0,
                    &mesh.positions[pair[0]],
                    &mesh.positions[pair[1]],
                )
            })
            .min_by(|a, b| a.abs().total_cmp(&b.abs()))
    }
}

/// Möller–Trumbore. Returns the signed distance along `dir`, which may be
/// negative: callers decide which side they accept.
fn intersect_triangle(
    origin: &Point3<f64>,
    dir: &Vector3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> Option<f64> {
    let e1 = b - a;
    let e2 = c - a;
    let h = dir.cross(&e2);
    let det = e1.dot(&h);
    if det.abs() < RAY_EPSILON {
        return None;
    }
    let inv = 1.0 / det;
    let s = origin - a;
    let u = inv * s.dot(&h);
    if !(-RAY_EPSILON..=1.0 + RAY_EPSILON).contains(&u) {
        return None;
    }
    let q = s.cross(&e1);
    let v = inv * dir.dot(&q);
    if v < -RAY_EPSILON || u + v > 1.0 + RAY_EPSILON {
        return None;
    }
    Some(inv * e2.dot(&q))
}

impl Corner {
    fn to_vertex(self, mesh: &Mesh) -> VertexId {
        mesh.faces[self.face][self.index]
    }

    fn next(&self, mesh: &Mesh) -> Corner {
        let index = (self.index + 1) % self.face.corner_count(mesh);
        Self {
            face: self.face,
            index,
        }
    }

    fn to_point(self, mesh: &Mesh) -> &Point3<f64> {
        &mesh.positions[self.to_vertex(mesh)]
    }
}

impl MeshQuery for Mesh {
    fn has_vertex(&self, id: VertexId) -> bool {
        self.positions.contains(id)
    }

    fn has_edge(&self, id: EdgeId) -> bool {
        self.edges.contains(id)
    }

    fn has_face(&self, id: FaceId) -> bool {
        self.faces.contains(id)
    }

    fn vertex_position(&self, id: VertexId) -> Point3<f64> {
        self.positions[id]
    }

    fn set_vertex_position(&mut self, id: VertexId, position: Point3<f64>) {
        self.positions[id] = position;
    }

    fn vertex_normal(&self, id: VertexId) -> Vector3<f64> {
        let sum: Vector3<f64> = self.vertex_faces[id]
            .iter()
            .map(|f| f.area_normal(self))
            .sum();
        if sum.norm_squared() == 0. {
            return sum;
        }
        sum.normalize()
    }

    fn connected_vertices(&self, id: VertexId) -> Vec<VertexId> {
        self.vertex_edges[id]
            .iter()
            .map(|&e| {
                let edge = &self.edges[e];
                if edge.a == id {
                    edge.b
                } else {
                    edge.a
                }
            })
            .collect()
    }

    fn connected_edges(&self, id: VertexId) -> Vec<EdgeId> {
        self.vertex_edges[id].clone()
    }

    fn connected_faces(&self, id: VertexId) -> Vec<FaceId> {
        self.vertex_faces[id].clone()
    }

    fn edge_endpoints(&self, id: EdgeId) -> (VertexId, VertexId) {
        let edge = &self.edges[id];
        (edge.a, edge.b)
    }

    fn edge_faces(&self, id: EdgeId) -> Vec<FaceId> {
        self.edges[id].faces.clone()
    }

    fn is_boundary_edge(&self, id: EdgeId) -> bool {
        self.edges[id].faces.len() == 1
    }

    fn is_boundary_vertex(&self, id: VertexId) -> bool {
        self.vertex_edges[id]
            .iter()
            .any(|&e| self.is_boundary_edge(e))
    }

    fn incident_vertices_of_face(&self, id: FaceId) -> Vec<VertexId> {
        self.faces[id].clone()
    }

    fn closest_surface_intersection(
        &self,
        origin: Point3<f64>,
        direction: Vector3<f64>,
        max_distance: f64,
    ) -> Option<Point3<f64>> {
        let dir = direction.try_normalize(RAY_EPSILON)?;
        self.faces
            .keys()
            .filter_map(|f| f.intersect(self, &origin, &dir))
            .filter(|t| t.abs() <= max_distance)
            .min_by(|a, b| a.abs().total_cmp(&b.abs()))
            .map(|t| origin + dir * t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_data;
    use approx::assert_relative_eq;

    #[test]
    fn edges_are_shared_between_faces() {
        let mesh = test_data::grid(3, 3, 1.0);
        // 2x2 quads: 12 unique edges, 8 of them on the border.
        assert_eq!(mesh.face_count(), 4);
        assert_eq!(mesh.edge_count(), 12);
        assert_eq!(mesh.boundary_edges().count(), 8);
        assert!(!mesh.is_boundary_vertex(VertexId(4)));
        assert!(mesh.is_boundary_vertex(VertexId(0)));
        assert!(mesh.has_edge(EdgeId(11)) && !mesh.has_edge(EdgeId(12)));
        assert!(mesh.has_face(FaceId(3)) && !mesh.has_face(FaceId(4)));
        assert_eq!(mesh.connected_vertices(VertexId(4)).len(), 4);
    }

    #[test]
    fn rejects_bad_polygons() {
        let positions = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        assert!(matches!(
            Mesh::from_polygons(positions.clone(), vec![vec![0, 1, 5]]),
            Err(MeshError::InvalidVertexIndex { index: 5, .. })
        ));
        assert!(matches!(
            Mesh::from_polygons(positions, vec![vec![0, 1, 1]]),
            Err(MeshError::DegenerateFace { face: 0 })
        ));
    }

    #[test]
    fn flat_grid_normals_point_up() {
        let mesh = test_data::grid(3, 3, 1.0);
        for v in 0..mesh.vertex_count() {
            assert_relative_eq!(
                mesh.vertex_normal(VertexId(v)),
                Vector3::y(),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn ray_hits_in_both_directions() {
        let mesh = test_data::grid(3, 3, 1.0);
        let below = Point3::new(0.5, -2.0, 0.5);
        let hit = mesh
            .closest_surface_intersection(below, Vector3::y(), 10.0)
            .unwrap();
        assert_relative_eq!(hit, Point3::new(0.5, 0.0, 0.5), epsilon = 1e-12);

        let above = Point3::new(1.5, 3.0, 1.5);
        let hit = mesh
            .closest_surface_intersection(above, Vector3::y(), 10.0)
            .unwrap();
        assert_relative_eq!(hit, Point3::new(1.5, 0.0, 1.5), epsilon = 1e-12);
    }

    #[test]
    fn ray_misses_outside_range() {
        let mesh = test_data::grid(3, 3, 1.0);
        let far = Point3::new(0.5, 50.0, 0.5);
        assert!(mesh
            .closest_surface_intersection(far, Vector3::y(), 10.0)
            .is_none());
        let beside = Point3::new(5.0, 1.0, 5.0);
        assert!(mesh
            .closest_surface_intersection(beside, Vector3::y(), 10.0)
            .is_none());
    }

    #[test]
    fn boundary_component_follows_one_hole() {
        let mesh = test_data::grid(3, 3, 1.0);
        let start = mesh.boundary_edges().next().unwrap();
        assert_eq!(mesh.boundary_component(start).len(), 8);
    }
}
