//! # Test Data Generator
//!
//! Small flat meshes with known topology, shared by unit and integration
//! tests. All of them lie in the XZ plane with faces wound so that their
//! normals point along +Y.

use std::f64::consts::TAU;

use nalgebra::Point3;

use crate::idx::VertexId;
use crate::mesh::Mesh;

/// Regular grid of `nx * nz` vertices spaced `spacing` apart, starting at
/// the origin. Vertex `(i, j)` has handle `i * nz + j`.
pub fn grid(nx: usize, nz: usize, spacing: f64) -> Mesh {
    let mut positions = Vec::with_capacity(nx * nz);
    for i in 0..nx {
        for j in 0..nz {
            positions.push(Point3::new(i as f64 * spacing, 0.0, j as f64 * spacing));
        }
    }
    let at = |i: usize, j: usize| i * nz + j;
    let mut faces = Vec::new();
    for i in 0..nx.saturating_sub(1) {
        for j in 0..nz.saturating_sub(1) {
            faces.push(vec![at(i, j), at(i, j + 1), at(i + 1, j + 1), at(i + 1, j)]);
        }
    }
    Mesh::from_polygons(positions, faces).expect("grid topology is valid")
}

/// Disc made of a centre vertex (handle 0) and concentric rings of
/// `segments` vertices each. Ring `k`, vertex `j` has handle
/// `1 + k * segments + j` and sits at angle `j * TAU / segments`.
/// The centre is fanned to the first ring, successive rings are joined by
/// quads.
pub fn disc(segments: usize, radii: &[f64]) -> Mesh {
    let mut positions = vec![Point3::origin()];
    for &r in radii {
        for j in 0..segments {
            let phi = j as f64 * TAU / segments as f64;
            positions.push(Point3::new(r * phi.cos(), 0.0, r * phi.sin()));
        }
    }
    let mut faces = Vec::new();
    if !radii.is_empty() {
        for j in 0..segments {
            faces.push(vec![0, ring_vertex(segments, 0, j + 1), ring_vertex(segments, 0, j)]);
        }
    }
    for k in 1..radii.len() {
        for j in 0..segments {
            faces.push(vec![
                ring_vertex(segments, k - 1, j),
                ring_vertex(segments, k - 1, j + 1),
                ring_vertex(segments, k, j + 1),
                ring_vertex(segments, k, j),
            ]);
        }
    }
    Mesh::from_polygons(positions, faces).expect("disc topology is valid")
}

/// Handle of vertex `j` (wrapping) on ring `k` of a [`disc`].
pub fn ring_vertex(segments: usize, k: usize, j: usize) -> usize {
    1 + k * segments + j % segments
}

/// Handles of every vertex on ring `k` of a [`disc`], in angular order.
pub fn ring(segments: usize, k: usize) -> Vec<VertexId> {
    (0..segments)
        .map(|j| VertexId(ring_vertex(segments, k, j)))
        .collect()
}
