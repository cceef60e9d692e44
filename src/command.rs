//! The circularize operation as an undoable command.

use log::{info, warn};

use crate::apply::{self, UndoSnapshot};
use crate::error::{GeometryError, Result};
use crate::fit::fit_circle;
use crate::frame::{compute_frame, orient};
use crate::ops::{CircleParams, MeshSelection};
use crate::query::MeshQuery;
use crate::resolve::resolve_and_order;

/// Runs the whole pipeline once: resolve, order, frame, orient, fit and
/// apply. The mesh is only written in the final step.
pub fn circlelize<M: MeshQuery>(
    mesh: &mut M,
    selection: &MeshSelection,
    params: &CircleParams,
) -> Result<UndoSnapshot> {
    params.validate()?;
    let (ordered, resolved) = resolve_and_order(mesh, selection)?;
    let frame = compute_frame(mesh, &resolved, &params.overrides)?;
    let ordered = orient(mesh, &ordered, &frame.normal);
    let offsets = fit_circle(mesh, &ordered, &frame, params.degree_span);
    let projection = params.project_on_mesh.then_some(params.max_ray_distance);
    apply::apply(mesh, &ordered, &offsets, &frame, projection)
}

/// Holds the state of the last successful [`circlelize`] so it can be
/// undone and redone.
#[derive(Clone, Debug, Default)]
pub struct CircleCommand {
    snapshot: Option<UndoSnapshot>,
}

impl CircleCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// On failure the mesh is untouched and the previous snapshot, if any,
    /// is kept.
    pub fn execute<M: MeshQuery>(
        &mut self,
        mesh: &mut M,
        selection: &MeshSelection,
        params: &CircleParams,
    ) -> Result<&UndoSnapshot> {
        match circlelize(mesh, selection, params) {
            Ok(snapshot) => Ok(&*self.snapshot.insert(snapshot)),
            Err(e) => {
                warn!("circularize failed: {}", e);
                Err(e)
            }
        }
    }

    pub fn undo<M: MeshQuery>(&self, mesh: &mut M) -> Result<()> {
        let snapshot = self.snapshot.as_ref().ok_or(GeometryError::MissingUndoState)?;
        apply::undo(mesh, snapshot)
    }

    pub fn redo<M: MeshQuery>(&self, mesh: &mut M) -> Result<()> {
        let snapshot = self.snapshot.as_ref().ok_or(GeometryError::MissingUndoState)?;
        apply::redo(mesh, &snapshot.ordered, &snapshot.applied_positions)
    }

    pub fn is_undoable(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn snapshot(&self) -> Option<&UndoSnapshot> {
        self.snapshot.as_ref()
    }

    /// Forgets the stored state.
    pub fn clear(&mut self) {
        if self.snapshot.take().is_some() {
            info!("dropped circularize undo state");
        }
    }
}
