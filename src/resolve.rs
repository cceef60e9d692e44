//! Selection resolution and loop ordering.
//!
//! A raw vertex/edge/face selection is reduced to the edges that bound it,
//! and those edges are walked into a single ordered run of vertices.

use std::collections::{BTreeSet, HashSet};

use log::{debug, warn};

use crate::error::{GeometryError, Result};
use crate::idx::{EdgeId, VertexId};
use crate::ops::{Component, MeshSelection};
use crate::query::MeshQuery;

/// Canonical selection: every edge joins two vertices of `vertices`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub vertices: BTreeSet<VertexId>,
    pub edges: BTreeSet<EdgeId>,
    /// Selected vertices that lie on an open border of the mesh. Always a
    /// subset of `vertices`.
    pub boundary_vertices: BTreeSet<VertexId>,
}

/// Ordered run of vertices; neighbours in the sequence share an edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderedLoop {
    vertices: Vec<VertexId>,
    closed: bool,
}

impl OrderedLoop {
    pub fn new(vertices: Vec<VertexId>, closed: bool) -> Self {
        Self { vertices, closed }
    }

    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// True when the last vertex connects back to the first.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn contains(&self, v: VertexId) -> bool {
        self.vertices.contains(&v)
    }

    pub fn reversed(&self) -> Self {
        Self {
            vertices: self.vertices.iter().rev().copied().collect(),
            closed: self.closed,
        }
    }
}

/// Turns the first non-empty component of `selection` into a [`Selection`] of
/// boundary edges and their vertices.
pub fn resolve_selection<M: MeshQuery>(mesh: &M, selection: &MeshSelection) -> Result<Selection> {
    let mut components = selection.components.iter().filter(|c| !c.is_empty());
    let component = components
        .next()
        .ok_or(GeometryError::NoComponentSelected)?;
    let ignored = components.count();
    if ignored > 0 {
        warn!(
            "only the first selection component is processed, ignoring {} more",
            ignored
        );
    }

    let selected = incident_vertices(mesh, component)?;
    if let Some(&v) = selected.iter().find(|&&v| !mesh.has_vertex(v)) {
        return Err(GeometryError::UnknownVertex(v));
    }

    let mut edges = BTreeSet::new();
    let mut boundary_vertices = BTreeSet::new();
    for &v in &selected {
        for e in mesh.connected_edges(v) {
            if !mesh.is_boundary_edge(e) {
                continue;
            }
            let (a, b) = mesh.edge_endpoints(e);
            if selected.contains(&a) && selected.contains(&b) {
                edges.insert(e);
                boundary_vertices.insert(a);
                boundary_vertices.insert(b);
            }
        }
    }

    // A vertex with three or more selected neighbours means the selection is
    // an area, not a ring; contained edges would then include interior chords.
    let branching = selected.iter().any(|&v| {
        mesh.connected_vertices(v)
            .iter()
            .filter(|n| selected.contains(*n))
            .count()
            > 2
    });
    let converted = if branching {
        perimeter_edges(mesh, &selected)
    } else {
        contained_edges(mesh, &selected)
    };

    let mut vertices = boundary_vertices.clone();
    for &e in &converted {
        let (a, b) = mesh.edge_endpoints(e);
        vertices.insert(a);
        vertices.insert(b);
    }
    edges.extend(converted);

    debug!(
        "resolved selection: {} vertices, {} edges, {} on mesh border (branching: {})",
        vertices.len(),
        edges.len(),
        boundary_vertices.len(),
        branching
    );
    Ok(Selection {
        vertices,
        edges,
        boundary_vertices,
    })
}

fn incident_vertices<M: MeshQuery>(
    mesh: &M,
    component: &Component,
) -> Result<BTreeSet<VertexId>> {
    let mut selected = BTreeSet::new();
    match component {
        Component::Vertices(vertices) => selected.extend(vertices.iter().copied()),
        Component::Edges(edges) => {
            for &e in edges {
                if !mesh.has_edge(e) {
                    return Err(GeometryError::UnknownEdge(e));
                }
                let (a, b) = mesh.edge_endpoints(e);
                selected.extend([a, b]);
            }
        }
        Component::Faces(faces) => {
            for &f in faces {
                if !mesh.has_face(f) {
                    return Err(GeometryError::UnknownFace(f));
                }
                selected.extend(mesh.incident_vertices_of_face(f));
            }
        }
    }
    Ok(selected)
}

/// Edges whose two endpoints are both selected.
fn contained_edges<M: MeshQuery>(mesh: &M, selected: &BTreeSet<VertexId>) -> BTreeSet<EdgeId> {
    selected
        .iter()
        .flat_map(|&v| mesh.connected_edges(v))
        .filter(|&e| {
            let (a, b) = mesh.edge_endpoints(e);
            selected.contains(&a) && selected.contains(&b)
        })
        .collect()
}

/// Contained edges that border exactly one fully selected face.
fn perimeter_edges<M: MeshQuery>(mesh: &M, selected: &BTreeSet<VertexId>) -> BTreeSet<EdgeId> {
    let inside: HashSet<_> = selected
        .iter()
        .flat_map(|&v| mesh.connected_faces(v))
        .filter(|&f| {
            mesh.incident_vertices_of_face(f)
                .iter()
                .all(|v| selected.contains(v))
        })
        .collect();
    contained_edges(mesh, selected)
        .into_iter()
        .filter(|&e| {
            mesh.edge_faces(e)
                .iter()
                .filter(|f| inside.contains(*f))
                .count()
                == 1
        })
        .collect()
}

/// Walks the selected edges into one ordered run.
///
/// The walk starts on an arbitrary edge and follows unused edges from its
/// second endpoint. When it runs dry while edges remain (or before the first
/// endpoint was reached), it restarts once from the first endpoint and
/// extends the run backwards. Edges still unused after that are dropped, so
/// selections with more than two open ends lose vertices.
pub fn order_loop<M: MeshQuery>(mesh: &M, selection: &Selection) -> Result<OrderedLoop> {
    let mut unused = selection.edges.clone();
    let start_edge = unused
        .pop_first()
        .ok_or_else(|| GeometryError::NoContinuousLoopFound {
            reason: "selection contains no edges".to_string(),
        })?;
    let (anchor, start) = mesh.edge_endpoints(start_edge);

    let mut forward = vec![start];
    let mut backward = Vec::new();
    let mut seen = HashSet::from([start]);
    let mut current = start;
    let mut reanchored = false;
    loop {
        let next = mesh
            .connected_edges(current)
            .into_iter()
            .find(|e| unused.contains(e));
        match next {
            Some(edge) => {
                unused.remove(&edge);
                let (a, b) = mesh.edge_endpoints(edge);
                current = if current == a { b } else { a };
                if seen.insert(current) {
                    if reanchored {
                        backward.push(current);
                    } else {
                        forward.push(current);
                    }
                }
            }
            None if !reanchored && (!unused.is_empty() || !seen.contains(&anchor)) => {
                reanchored = true;
                current = anchor;
                if seen.insert(anchor) {
                    backward.push(anchor);
                }
            }
            None => break,
        }
    }

    if !unused.is_empty() {
        warn!(
            "{} selected edges are not reachable from the loop and were ignored",
            unused.len()
        );
    }

    let vertices: Vec<VertexId> = backward.into_iter().rev().chain(forward).collect();
    let closed = vertices.len() >= 3
        && match (vertices.first(), vertices.last()) {
            (Some(&first), Some(&last)) => mesh
                .edge_between(first, last)
                .map_or(false, |e| selection.edges.contains(&e)),
            _ => false,
        };
    debug!(
        "ordered loop of {} vertices ({})",
        vertices.len(),
        if closed { "closed" } else { "open" }
    );
    Ok(OrderedLoop::new(vertices, closed))
}

/// Resolves the raw selection and orders it into a loop.
pub fn resolve_and_order<M: MeshQuery>(
    mesh: &M,
    selection: &MeshSelection,
) -> Result<(OrderedLoop, Selection)> {
    let resolved = resolve_selection(mesh, selection)?;
    let ordered = order_loop(mesh, &resolved)?;
    Ok((ordered, resolved))
}
