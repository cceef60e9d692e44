//! Inner/outer split of the vertices surrounding a loop.
//!
//! Only correct when the selection is locally flat and does not overlap
//! itself; folded geometry gets misclassified.

use std::collections::BTreeSet;

use log::debug;
use nalgebra::Point3;

use crate::idx::VertexId;
use crate::query::MeshQuery;
use crate::resolve::OrderedLoop;

/// Neighbours of the loop that are not themselves on the loop.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Classification {
    /// At most as far from the centre as the loop vertex they touch.
    pub inner: BTreeSet<VertexId>,
    /// Further out than the loop vertex they touch, and never inner.
    pub outer: BTreeSet<VertexId>,
}

impl Classification {
    pub fn is_inner(&self, v: VertexId) -> bool {
        self.inner.contains(&v)
    }
}

/// Splits the non-loop neighbours of every loop vertex by their distance to
/// `center`. Once inner, a vertex stays inner.
pub fn classify<M: MeshQuery>(
    mesh: &M,
    ordered: &OrderedLoop,
    center: &Point3<f64>,
) -> Classification {
    let mut result = Classification::default();
    for &v in ordered.vertices() {
        let reach = nalgebra::distance(&mesh.vertex_position(v), center);
        for neighbour in mesh.connected_vertices(v) {
            if ordered.contains(neighbour) || result.inner.contains(&neighbour) {
                continue;
            }
            if nalgebra::distance(&mesh.vertex_position(neighbour), center) <= reach {
                result.outer.remove(&neighbour);
                result.inner.insert(neighbour);
            } else {
                result.outer.insert(neighbour);
            }
        }
    }
    debug!(
        "classified loop neighbours: {} inner, {} outer",
        result.inner.len(),
        result.outer.len()
    );
    result
}
