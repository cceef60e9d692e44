//! Ideal circle generation and twist alignment.
//!
//! All points here are offsets from the circle centre. The circle is built
//! in the local XZ plane (Y is the circle axis), rotated about Y to match
//! the loop's surroundings, then rotated back into the frame's plane.

use std::f64::consts::TAU;

use log::debug;
use nalgebra::{Point3, UnitQuaternion, Vector3};

use crate::classify::{classify, Classification};
use crate::config::TWIST_SNAP_EPSILON;
use crate::frame::Frame;
use crate::query::MeshQuery;
use crate::resolve::OrderedLoop;

/// `count` points evenly spaced by `degree_span / count` degrees on a circle
/// of `radius` in the XZ plane, starting on +X.
pub fn ideal_circle(count: usize, degree_span: f64, radius: f64) -> Vec<Vector3<f64>> {
    if count == 0 {
        return vec![];
    }
    let step = degree_span / count as f64;
    (0..count)
        .map(|i| {
            let phi = (i as f64 * step).to_radians();
            Vector3::new(radius * phi.cos(), 0.0, radius * phi.sin())
        })
        .collect()
}

/// For each loop vertex, the direction the surrounding surface points to,
/// in the local plane and scaled to `frame.radius`.
///
/// The direction is the mean of the vertex's non-loop, non-inner
/// neighbours; a vertex without such neighbours sits on a true border and
/// stands in for itself.
pub fn surrounding_points<M: MeshQuery>(
    mesh: &M,
    ordered: &OrderedLoop,
    frame: &Frame,
    classification: &Classification,
) -> Vec<Vector3<f64>> {
    let to_plane = frame.to_plane();
    let local = |p: Point3<f64>| to_plane * (p - frame.sample_center);

    ordered
        .vertices()
        .iter()
        .map(|&v| {
            let neighbours: Vec<Vector3<f64>> = mesh
                .connected_vertices(v)
                .into_iter()
                .filter(|&n| !ordered.contains(n) && !classification.is_inner(n))
                .map(|n| local(mesh.vertex_position(n)))
                .collect();
            let direction = match neighbours.len() {
                0 => local(mesh.vertex_position(v)),
                1 => neighbours[0],
                n => neighbours.iter().sum::<Vector3<f64>>() / n as f64,
            };
            direction
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(Vector3::zeros)
                * frame.radius
        })
        .collect()
}

/// Mean angle, about +Y, from each ideal point to its surrounding point.
/// Each difference is wrapped into `[0, 2π)`; differences within
/// [`TWIST_SNAP_EPSILON`] of a full turn or of zero count as zero.
pub fn twist_angle(surrounding: &[Vector3<f64>], ideal: &[Vector3<f64>]) -> f64 {
    if ideal.is_empty() {
        return 0.0;
    }
    let total: f64 = surrounding
        .iter()
        .zip(ideal)
        .map(|(s, c)| {
            let angle = (s.z.atan2(s.x) - c.z.atan2(c.x)).rem_euclid(TAU);
            if angle < TWIST_SNAP_EPSILON || TAU - angle < TWIST_SNAP_EPSILON {
                0.0
            } else {
                angle
            }
        })
        .sum();
    total / ideal.len() as f64
}

/// Fits `ordered` (already oriented) to a circle or arc in `frame`.
///
/// Returns one offset from `frame.centroid` per loop vertex, in loop order.
pub fn fit_circle<M: MeshQuery>(
    mesh: &M,
    ordered: &OrderedLoop,
    frame: &Frame,
    degree_span: f64,
) -> Vec<Vector3<f64>> {
    let classification = classify(mesh, ordered, &frame.sample_center);
    fit_circle_with(mesh, ordered, frame, &classification, degree_span)
}

/// [`fit_circle`] with a precomputed classification.
pub fn fit_circle_with<M: MeshQuery>(
    mesh: &M,
    ordered: &OrderedLoop,
    frame: &Frame,
    classification: &Classification,
    degree_span: f64,
) -> Vec<Vector3<f64>> {
    let ideal = ideal_circle(ordered.len(), degree_span, frame.radius);
    let surrounding = surrounding_points(mesh, ordered, frame, classification);
    let twist = twist_angle(&surrounding, &ideal);
    debug!(
        "fitting {} points over {} degrees, twist {:.6} rad",
        ideal.len(),
        degree_span,
        twist
    );

    let spin = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), -twist);
    let from_plane = frame.to_plane().inverse();
    ideal
        .into_iter()
        .map(|p| from_plane * (spin * p))
        .collect()
}
