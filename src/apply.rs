//! Writing fitted positions back to the mesh, optional surface projection,
//! and undo/redo replay.

use log::{debug, info, warn};
use nalgebra::{Point3, Unit, Vector3};

use crate::error::{GeometryError, Result};
use crate::frame::Frame;
use crate::idx::VertexId;
use crate::query::MeshQuery;
use crate::resolve::OrderedLoop;

/// Positions captured around one apply, replayed by undo and redo.
#[derive(Clone, Debug, PartialEq)]
pub struct UndoSnapshot {
    pub ordered: OrderedLoop,
    /// Positions before the apply, in loop order.
    pub previous_positions: Vec<Point3<f64>>,
    /// Positions the apply wrote, in loop order.
    pub applied_positions: Vec<Point3<f64>>,
}

/// Scoped write access to a mesh.
///
/// Writes are staged and validated, and only reach the mesh on
/// [`commit`](MeshEdit::commit). Dropping an uncommitted edit leaves the
/// mesh untouched.
pub struct MeshEdit<'m, M: MeshQuery> {
    mesh: &'m mut M,
    staged: Vec<(VertexId, Point3<f64>)>,
    committed: bool,
}

impl<'m, M: MeshQuery> MeshEdit<'m, M> {
    pub fn begin(mesh: &'m mut M) -> Self {
        Self {
            mesh,
            staged: vec![],
            committed: false,
        }
    }

    pub fn mesh(&self) -> &M {
        &*self.mesh
    }

    pub fn stage(&mut self, vertex: VertexId, position: Point3<f64>) -> Result<()> {
        if !self.mesh.has_vertex(vertex) {
            return Err(GeometryError::UnknownVertex(vertex));
        }
        self.staged.push((vertex, position));
        Ok(())
    }

    /// Writes every staged position, in staging order. Returns the number
    /// of writes.
    pub fn commit(mut self) -> usize {
        let count = self.staged.len();
        for (vertex, position) in self.staged.drain(..) {
            self.mesh.set_vertex_position(vertex, position);
        }
        self.committed = true;
        count
    }
}

impl<'m, M: MeshQuery> Drop for MeshEdit<'m, M> {
    fn drop(&mut self) {
        if !self.committed && !self.staged.is_empty() {
            warn!("discarding {} staged vertex writes", self.staged.len());
        }
    }
}

/// Moves fitted offsets to `frame.centroid`.
pub fn place(frame: &Frame, offsets: &[Vector3<f64>]) -> Vec<Point3<f64>> {
    offsets.iter().map(|&o| frame.centroid + o).collect()
}

/// Snaps each point to the closest surface hit along `normal` (either
/// direction) within `max_distance`. Points without a hit stay put.
pub fn project_points<M: MeshQuery>(
    mesh: &M,
    points: &[Point3<f64>],
    normal: &Unit<Vector3<f64>>,
    max_distance: f64,
) -> Vec<Point3<f64>> {
    let mut misses = 0;
    let projected: Vec<Point3<f64>> = points
        .iter()
        .map(|&p| {
            mesh.closest_surface_intersection(p, normal.into_inner(), max_distance)
                .unwrap_or_else(|| {
                    misses += 1;
                    p
                })
        })
        .collect();
    debug!(
        "projected {} of {} points onto the surface",
        points.len() - misses,
        points.len()
    );
    projected
}

/// Places the fitted offsets around the frame centroid, optionally projects
/// them onto the surface (`project_within` bounds the ray), and writes them
/// to the loop vertices.
///
/// Nothing is written unless every vertex exists and the counts match.
pub fn apply<M: MeshQuery>(
    mesh: &mut M,
    ordered: &OrderedLoop,
    offsets: &[Vector3<f64>],
    frame: &Frame,
    project_within: Option<f64>,
) -> Result<UndoSnapshot> {
    if offsets.len() != ordered.len() {
        return Err(GeometryError::PointCountMismatch {
            expected: ordered.len(),
            actual: offsets.len(),
        });
    }
    if let Some(&v) = ordered.vertices().iter().find(|&&v| !mesh.has_vertex(v)) {
        return Err(GeometryError::UnknownVertex(v));
    }

    let mut targets = place(frame, offsets);
    if let Some(max_distance) = project_within {
        targets = project_points(mesh, &targets, &frame.normal, max_distance);
    }
    let previous_positions: Vec<Point3<f64>> = ordered
        .vertices()
        .iter()
        .map(|&v| mesh.vertex_position(v))
        .collect();

    let written = write_all(mesh, ordered, &targets)?;
    info!("circularized {} vertices", written);
    Ok(UndoSnapshot {
        ordered: ordered.clone(),
        previous_positions,
        applied_positions: targets,
    })
}

/// Restores the positions captured before the apply.
pub fn undo<M: MeshQuery>(mesh: &mut M, snapshot: &UndoSnapshot) -> Result<()> {
    replay(mesh, &snapshot.ordered, &snapshot.previous_positions)?;
    info!("undid circularize on {} vertices", snapshot.ordered.len());
    Ok(())
}

/// Writes previously computed positions again.
pub fn redo<M: MeshQuery>(
    mesh: &mut M,
    ordered: &OrderedLoop,
    positions: &[Point3<f64>],
) -> Result<()> {
    replay(mesh, ordered, positions)?;
    info!("redid circularize on {} vertices", ordered.len());
    Ok(())
}

fn replay<M: MeshQuery>(
    mesh: &mut M,
    ordered: &OrderedLoop,
    positions: &[Point3<f64>],
) -> Result<()> {
    if ordered.is_empty() || ordered.vertices().iter().any(|&v| !mesh.has_vertex(v)) {
        return Err(GeometryError::MissingUndoState);
    }
    if positions.len() != ordered.len() {
        return Err(GeometryError::PointCountMismatch {
            expected: ordered.len(),
            actual: positions.len(),
        });
    }
    write_all(mesh, ordered, positions)?;
    Ok(())
}

fn write_all<M: MeshQuery>(
    mesh: &mut M,
    ordered: &OrderedLoop,
    positions: &[Point3<f64>],
) -> Result<usize> {
    let mut edit = MeshEdit::begin(mesh);
    for (&v, &p) in ordered.vertices().iter().zip(positions) {
        edit.stage(v, p)?;
    }
    Ok(edit.commit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Mesh;
    use crate::test_data;
    use approx::assert_relative_eq;

    fn unit_frame() -> Frame {
        Frame {
            centroid: Point3::new(1.0, 0.0, 1.0),
            sample_center: Point3::new(1.0, 0.0, 1.0),
            normal: Vector3::y_axis(),
            radius: 0.5,
        }
    }

    fn square_loop() -> OrderedLoop {
        // Centre cell of a 4x4 grid: (1,1) (1,2) (2,2) (2,1).
        OrderedLoop::new(vec![VertexId(5), VertexId(6), VertexId(10), VertexId(9)], true)
    }

    fn offsets() -> Vec<Vector3<f64>> {
        crate::fit::ideal_circle(4, 360.0, 0.5)
    }

    fn positions(mesh: &Mesh, ordered: &OrderedLoop) -> Vec<Point3<f64>> {
        ordered
            .vertices()
            .iter()
            .map(|&v| mesh.vertex_position(v))
            .collect()
    }

    #[test]
    fn apply_then_undo_restores_exact_positions() {
        let mut mesh = test_data::grid(4, 4, 1.0);
        let ordered = square_loop();
        let before = positions(&mesh, &ordered);

        let snapshot = apply(&mut mesh, &ordered, &offsets(), &unit_frame(), None).unwrap();
        assert_eq!(snapshot.previous_positions, before);
        assert_relative_eq!(
            mesh.vertex_position(VertexId(5)),
            Point3::new(1.5, 0.0, 1.0),
            epsilon = 1e-12
        );

        undo(&mut mesh, &snapshot).unwrap();
        assert_eq!(positions(&mesh, &ordered), before);

        redo(&mut mesh, &snapshot.ordered, &snapshot.applied_positions).unwrap();
        assert_eq!(positions(&mesh, &ordered), snapshot.applied_positions);
    }

    #[test]
    fn projection_onto_the_fitting_plane_is_a_no_op() {
        let mut mesh = test_data::grid(4, 4, 1.0);
        let ordered = square_loop();
        let frame = unit_frame();
        let flat = place(&frame, &offsets());
        let snapshot = apply(&mut mesh, &ordered, &offsets(), &frame, Some(100.0)).unwrap();
        for (projected, expected) in snapshot.applied_positions.iter().zip(&flat) {
            assert_relative_eq!(*projected, *expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn projection_lifts_points_onto_a_raised_surface() {
        let mesh = test_data::grid(4, 4, 1.0);
        let raised: Vec<Point3<f64>> = vec![Point3::new(1.2, 3.0, 1.4), Point3::new(7.0, 3.0, 7.0)];
        let projected = project_points(&mesh, &raised, &Vector3::y_axis(), 10.0);
        assert_relative_eq!(projected[0], Point3::new(1.2, 0.0, 1.4), epsilon = 1e-12);
        // Off the mesh: kept as is.
        assert_eq!(projected[1], raised[1]);
    }

    #[test]
    fn mismatched_input_writes_nothing() {
        let mut mesh = test_data::grid(4, 4, 1.0);
        let ordered = square_loop();
        let before = positions(&mesh, &ordered);
        let full = offsets();
        assert_eq!(
            apply(&mut mesh, &ordered, &full[..3], &unit_frame(), None),
            Err(GeometryError::PointCountMismatch {
                expected: 4,
                actual: 3
            })
        );
        let stray = OrderedLoop::new(vec![VertexId(5), VertexId(6), VertexId(10), VertexId(99)], true);
        assert_eq!(
            apply(&mut mesh, &stray, &offsets(), &unit_frame(), None),
            Err(GeometryError::UnknownVertex(VertexId(99)))
        );
        assert_eq!(positions(&mesh, &ordered), before);
    }

    #[test]
    fn replay_without_state_is_rejected() {
        let mut mesh = test_data::grid(2, 2, 1.0);
        let empty = UndoSnapshot {
            ordered: OrderedLoop::new(vec![], false),
            previous_positions: vec![],
            applied_positions: vec![],
        };
        assert_eq!(undo(&mut mesh, &empty), Err(GeometryError::MissingUndoState));
        let gone = OrderedLoop::new(vec![VertexId(40)], false);
        assert_eq!(
            redo(&mut mesh, &gone, &[Point3::origin()]),
            Err(GeometryError::MissingUndoState)
        );
    }

    #[test]
    fn dropped_edit_leaves_mesh_alone() {
        let mut mesh = test_data::grid(2, 2, 1.0);
        {
            let mut edit = MeshEdit::begin(&mut mesh);
            edit.stage(VertexId(0), Point3::new(9.0, 9.0, 9.0)).unwrap();
            assert!(edit.stage(VertexId(7), Point3::origin()).is_err());
            assert_eq!(edit.mesh().vertex_position(VertexId(0)), Point3::origin());
        }
        assert_eq!(mesh.vertex_position(VertexId(0)), Point3::origin());
    }
}
