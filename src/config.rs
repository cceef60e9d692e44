//! Tunable constants shared by every pipeline stage.

/// Arc covered by the generated points, in degrees. A full turn closes the
/// circle.
pub const DEFAULT_DEGREE_SPAN: f64 = 360.0;

/// Longest distance, in mesh units, that a projection ray travels in either
/// direction before the unprojected point is kept.
pub const DEFAULT_MAX_RAY_DISTANCE: f64 = 100.0;

/// Twist differences closer than this (radians) to zero or to a full turn
/// are treated as zero.
pub const TWIST_SNAP_EPSILON: f64 = 1e-4;

/// Averaged normals shorter than this are rejected as degenerate.
pub const NORMAL_EPSILON: f64 = 1e-9;

/// Tolerance for ray/triangle tests: parallel rays and barycentric
/// coordinates sitting on a triangle edge.
pub const RAY_EPSILON: f64 = 1e-9;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerances_are_ordered() {
        assert!(NORMAL_EPSILON < TWIST_SNAP_EPSILON);
        assert!(RAY_EPSILON > 0.0);
        assert!(DEFAULT_MAX_RAY_DISTANCE > 0.0);
        assert_eq!(DEFAULT_DEGREE_SPAN, 360.0);
    }
}
