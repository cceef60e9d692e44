use approx::assert_relative_eq;
use circlelize::fit::fit_circle;
use circlelize::frame::{compute_frame, orient};
use circlelize::resolve::resolve_and_order;
use circlelize::{
    circlelize, test_data, CircleCommand, CircleParams, EdgeId, FaceId, FrameOverrides,
    GeometryError, Mesh, MeshQuery, MeshSelection, VertexId,
};
use nalgebra::{Point3, Vector3};

fn positions(mesh: &Mesh) -> Vec<Point3<f64>> {
    mesh.positions().map(|(_, p)| *p).collect()
}

/// The 8 vertices around the centre of a 5x5 grid, in walking order.
fn grid_ring() -> Vec<VertexId> {
    [6, 7, 8, 13, 18, 17, 16, 11].into_iter().map(VertexId).collect()
}

#[test]
fn regular_ring_stays_where_it_is() {
    let mut mesh = test_data::disc(8, &[1.0, 2.0, 3.0]);
    let before = positions(&mesh);
    let snapshot = circlelize(
        &mut mesh,
        &MeshSelection::vertices(test_data::ring(8, 1)),
        &CircleParams::default(),
    )
    .unwrap();
    assert_eq!(snapshot.ordered.len(), 8);
    assert!(snapshot.ordered.is_closed());
    for (after, before) in positions(&mesh).iter().zip(&before) {
        assert_relative_eq!(*after, *before, epsilon = 1e-4);
    }
}

#[test]
fn face_patch_moves_its_perimeter_only() {
    let mut mesh = test_data::disc(8, &[1.0, 2.0, 3.0]);
    let inner = positions(&mesh)[..9].to_vec();
    let patch = MeshSelection::faces((0..16).map(FaceId));
    circlelize(&mut mesh, &patch, &CircleParams::default().with_radius(2.5)).unwrap();

    for (j, v) in test_data::ring(8, 1).into_iter().enumerate() {
        let phi = (j as f64 * 45.0).to_radians();
        let expected = Point3::new(2.5 * phi.cos(), 0.0, 2.5 * phi.sin());
        assert_relative_eq!(mesh.vertex_position(v), expected, epsilon = 1e-4);
    }
    assert_eq!(positions(&mesh)[..9], inner[..]);
}

#[test]
fn open_strip_becomes_an_evenly_spaced_arc() {
    let mut mesh = test_data::grid(5, 2, 1.0);
    let strip = MeshSelection::vertices([0, 2, 4, 6, 8].into_iter().map(VertexId));
    let snapshot = circlelize(&mut mesh, &strip, &CircleParams::default()).unwrap();
    assert_eq!(snapshot.ordered.len(), 5);
    assert!(!snapshot.ordered.is_closed());

    let centre = Point3::new(2.0, 0.0, 0.0);
    let offsets: Vec<Vector3<f64>> = snapshot
        .applied_positions
        .iter()
        .map(|&p| p - centre)
        .collect();
    for pair in offsets.windows(2) {
        assert_relative_eq!(pair[0].norm(), 1.2, epsilon = 1e-9);
        assert_relative_eq!(pair[0].y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(pair[0].angle(&pair[1]), 72f64.to_radians(), epsilon = 1e-9);
    }
}

#[test]
fn walk_direction_does_not_change_the_result() {
    let mut mesh = test_data::disc(8, &[1.0, 2.0, 3.0]);
    let ring = test_data::ring(8, 1);
    for (&v, dr) in ring.iter().zip([0.3, -0.2, 0.1, 0.25, -0.3, 0.05, -0.1, 0.2]) {
        let p = mesh.vertex_position(v);
        let scale = (2.0 + dr) / 2.0;
        mesh.set_vertex_position(v, Point3::new(p.x * scale, p.y, p.z * scale));
    }

    let (ordered, selection) = resolve_and_order(&mesh, &MeshSelection::vertices(ring)).unwrap();
    let frame = compute_frame(&mesh, &selection, &FrameOverrides::default()).unwrap();
    let forward = orient(&mesh, &ordered, &frame.normal);
    let backward = orient(&mesh, &ordered.reversed(), &frame.normal);
    assert_eq!(forward, backward);

    let a = fit_circle(&mesh, &forward, &frame, 360.0);
    let b = fit_circle(&mesh, &backward, &frame, 360.0);
    assert_eq!(a, b);
}

#[test]
fn rejected_input_leaves_the_mesh_alone() {
    let mut mesh = test_data::disc(8, &[1.0, 2.0]);
    let before = positions(&mesh);
    let ring = MeshSelection::vertices(test_data::ring(8, 0));

    let cases = [
        (CircleParams::default().with_radius(0.0), GeometryError::ZeroRadius),
        (
            CircleParams::default().with_radius(-1.0),
            GeometryError::NegativeRadius(-1.0),
        ),
        (
            CircleParams::default().with_normal(Vector3::zeros()),
            GeometryError::DegenerateNormal { length: 0.0 },
        ),
    ];
    for (params, expected) in cases {
        assert_eq!(circlelize(&mut mesh, &ring, &params), Err(expected));
    }
    assert_eq!(
        circlelize(&mut mesh, &MeshSelection::new(), &CircleParams::default()),
        Err(GeometryError::NoComponentSelected)
    );
    assert!(matches!(
        circlelize(&mut mesh, &ring, &CircleParams::default().with_radius(f64::NAN)),
        Err(GeometryError::InvalidRadius(_))
    ));
    assert_eq!(
        circlelize(
            &mut mesh,
            &ring,
            &CircleParams::default().with_pivot(Point3::new(f64::INFINITY, 0.0, 0.0))
        ),
        Err(GeometryError::InvalidPivot)
    );
    assert_eq!(
        circlelize(&mut mesh, &MeshSelection::edges([EdgeId(999)]), &CircleParams::default()),
        Err(GeometryError::UnknownEdge(EdgeId(999)))
    );
    assert_eq!(positions(&mesh), before);
}

#[test]
fn undo_and_redo_round_trip() {
    let mut mesh = test_data::grid(5, 5, 1.0);
    let before = positions(&mesh);
    let mut command = CircleCommand::new();
    command
        .execute(&mut mesh, &MeshSelection::vertices(grid_ring()), &CircleParams::default())
        .unwrap();
    let after = positions(&mesh);
    assert_ne!(after, before);

    command.undo(&mut mesh).unwrap();
    assert_eq!(positions(&mesh), before);
    command.redo(&mut mesh).unwrap();
    assert_eq!(positions(&mesh), after);
}

#[test]
fn projection_pulls_a_raised_circle_back_onto_the_surface() {
    let lifted = CircleParams::default().with_pivot(Point3::new(2.0, 1.0, 2.0));

    let mut floating = test_data::grid(5, 5, 1.0);
    let free = circlelize(&mut floating, &MeshSelection::vertices(grid_ring()), &lifted).unwrap();

    let mut projected = test_data::grid(5, 5, 1.0);
    let snapped = circlelize(
        &mut projected,
        &MeshSelection::vertices(grid_ring()),
        &lifted.project_on_mesh(true),
    )
    .unwrap();

    assert_eq!(free.ordered, snapped.ordered);
    for (up, down) in free.applied_positions.iter().zip(&snapped.applied_positions) {
        assert_relative_eq!(up.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(*down, Point3::new(up.x, 0.0, up.z), epsilon = 1e-9);
    }
}
