//! Centre, axis and radius of the circle, and the winding of the loop
//! around that axis.

use std::f64::consts::PI;

use log::debug;
use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};

use crate::config::NORMAL_EPSILON;
use crate::error::{GeometryError, Result};
use crate::ops::{Axis, FrameOverrides, Pivot};
use crate::query::MeshQuery;
use crate::resolve::{OrderedLoop, Selection};

/// Plane and scale the circle is fitted in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    /// Where the circle ends up.
    pub centroid: Point3<f64>,
    /// Mean of the selected vertex positions. Neighbourhoods are measured
    /// relative to this point even when `centroid` was overridden.
    pub sample_center: Point3<f64>,
    pub normal: Unit<Vector3<f64>>,
    pub radius: f64,
}

impl Frame {
    /// Rotation taking `normal` onto +Y, so the circle plane becomes XZ.
    pub fn to_plane(&self) -> UnitQuaternion<f64> {
        plane_rotation(&self.normal)
    }
}

/// Rotation taking `normal` onto +Y. An exactly opposite normal gets a half
/// turn about X.
pub fn plane_rotation(normal: &Unit<Vector3<f64>>) -> UnitQuaternion<f64> {
    UnitQuaternion::rotation_between_axis(normal, &Vector3::y_axis())
        .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI))
}

/// Measures the frame from every selected vertex, honouring overrides.
pub fn compute_frame<M: MeshQuery>(
    mesh: &M,
    selection: &Selection,
    overrides: &FrameOverrides,
) -> Result<Frame> {
    overrides.validate()?;
    if selection.vertices.is_empty() {
        return Err(GeometryError::NoComponentSelected);
    }
    let count = selection.vertices.len() as f64;

    let sum = selection
        .vertices
        .iter()
        .fold(Vector3::zeros(), |acc, &v| acc + mesh.vertex_position(v).coords);
    let sample_center = Point3::from(sum / count);

    let centroid = match overrides.pivot {
        Pivot::GlobalCentroid => sample_center,
        Pivot::Point(p) => p,
    };

    let radius = match overrides.radius {
        Some(r) => r,
        None => {
            let total: f64 = selection
                .vertices
                .iter()
                .map(|&v| nalgebra::distance(&mesh.vertex_position(v), &sample_center))
                .sum();
            total / count
        }
    };
    if !radius.is_finite() {
        return Err(GeometryError::InvalidRadius(radius));
    }
    if radius <= 0.0 {
        return Err(GeometryError::ZeroRadius);
    }

    let normal = match overrides.axis {
        Axis::Fixed(n) if !n.iter().all(|c| c.is_finite()) => {
            return Err(GeometryError::DegenerateNormal { length: n.norm() })
        }
        Axis::Fixed(n) => Unit::try_new(n, NORMAL_EPSILON)
            .ok_or(GeometryError::DegenerateNormal { length: n.norm() })?,
        Axis::AverageNormal => {
            let sum: Vector3<f64> = selection
                .vertices
                .iter()
                .map(|&v| mesh.vertex_normal(v))
                .sum();
            let mean = sum / count;
            Unit::try_new(mean, NORMAL_EPSILON)
                .ok_or(GeometryError::DegenerateNormal { length: mean.norm() })?
        }
    };

    debug!(
        "frame: centroid {:?}, sample centre {:?}, normal {:?}, radius {}",
        centroid, sample_center, normal, radius
    );
    Ok(Frame {
        centroid,
        sample_center,
        normal,
        radius,
    })
}

/// Sum of the signed areas of consecutive vertex triplets, measured in the
/// plane orthogonal to `normal`. Open loops skip the wrap-around triplets.
pub fn winding_area<M: MeshQuery>(
    mesh: &M,
    ordered: &OrderedLoop,
    normal: &Unit<Vector3<f64>>,
) -> f64 {
    let rotation = plane_rotation(normal);
    let points: Vec<Point3<f64>> = ordered
        .vertices()
        .iter()
        .map(|&v| rotation * mesh.vertex_position(v))
        .collect();
    let n = points.len();
    let triplets = if ordered.is_closed() {
        n
    } else {
        n.saturating_sub(2)
    };
    (0..triplets)
        .map(|i| {
            let a = &points[i];
            let b = &points[(i + 1) % n];
            let c = &points[(i + 2) % n];
            (b.x - a.x) * (c.z - a.z) - (c.x - a.x) * (b.z - a.z)
        })
        .sum()
}

pub fn is_clockwise<M: MeshQuery>(
    mesh: &M,
    ordered: &OrderedLoop,
    normal: &Unit<Vector3<f64>>,
) -> bool {
    winding_area(mesh, ordered, normal) < 0.0
}

/// Returns the loop running counter-clockwise around `normal`, the winding
/// the generated circle uses.
pub fn orient<M: MeshQuery>(
    mesh: &M,
    ordered: &OrderedLoop,
    normal: &Unit<Vector3<f64>>,
) -> OrderedLoop {
    if is_clockwise(mesh, ordered, normal) {
        debug!("loop runs clockwise, reversing");
        ordered.reversed()
    } else {
        ordered.clone()
    }
}
