use crate::config::{DEFAULT_DEGREE_SPAN, DEFAULT_MAX_RAY_DISTANCE};
use crate::error::{GeometryError, Result};
use crate::idx::{EdgeId, FaceId, VertexId};
use nalgebra::{Point3, Vector3};

/// One homogeneous chunk of a user selection.
#[derive(Clone, Debug, PartialEq)]
pub enum Component {
    Vertices(Vec<VertexId>),
    Edges(Vec<EdgeId>),
    Faces(Vec<FaceId>),
}

impl Component {
    pub fn is_empty(&self) -> bool {
        match self {
            Component::Vertices(v) => v.is_empty(),
            Component::Edges(e) => e.is_empty(),
            Component::Faces(f) => f.is_empty(),
        }
    }
}

/// Raw selection as handed over by the host. Only the first non-empty
/// component is ever processed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshSelection {
    pub components: Vec<Component>,
}

impl MeshSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(vertices: impl IntoIterator<Item = VertexId>) -> Self {
        Self {
            components: vec![Component::Vertices(vertices.into_iter().collect())],
        }
    }

    pub fn edges(edges: impl IntoIterator<Item = EdgeId>) -> Self {
        Self {
            components: vec![Component::Edges(edges.into_iter().collect())],
        }
    }

    pub fn faces(faces: impl IntoIterator<Item = FaceId>) -> Self {
        Self {
            components: vec![Component::Faces(faces.into_iter().collect())],
        }
    }

    pub fn push(&mut self, component: Component) {
        self.components.push(component);
    }

    pub fn is_empty(&self) -> bool {
        self.components.iter().all(Component::is_empty)
    }
}

/// Where the finished circle is centred.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Pivot {
    /// Mean position of the selected vertices.
    #[default]
    GlobalCentroid,
    Point(Point3<f64>),
}

/// Axis the circle is built around.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Axis {
    /// Mean of the selected vertices' surface normals.
    #[default]
    AverageNormal,
    Fixed(Vector3<f64>),
}

/// User-supplied replacements for the measured frame. Anything left at its
/// default is measured from the selection.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameOverrides {
    pub pivot: Pivot,
    pub axis: Axis,
    pub radius: Option<f64>,
}

impl FrameOverrides {
    pub fn validate(&self) -> Result<()> {
        match self.radius {
            Some(r) if !r.is_finite() => return Err(GeometryError::InvalidRadius(r)),
            Some(r) if r == 0.0 => return Err(GeometryError::ZeroRadius),
            Some(r) if r < 0.0 => return Err(GeometryError::NegativeRadius(r)),
            _ => {}
        }
        if let Pivot::Point(p) = self.pivot {
            if !p.coords.iter().all(|c| c.is_finite()) {
                return Err(GeometryError::InvalidPivot);
            }
        }
        Ok(())
    }
}

/// Everything one circularize invocation needs besides the selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleParams {
    pub overrides: FrameOverrides,
    /// Arc covered by the loop, in degrees.
    pub degree_span: f64,
    pub project_on_mesh: bool,
    pub max_ray_distance: f64,
}

impl Default for CircleParams {
    fn default() -> Self {
        Self {
            overrides: FrameOverrides::default(),
            degree_span: DEFAULT_DEGREE_SPAN,
            project_on_mesh: false,
            max_ray_distance: DEFAULT_MAX_RAY_DISTANCE,
        }
    }
}

impl CircleParams {
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.overrides.radius = Some(radius);
        self
    }

    pub fn with_pivot(mut self, pivot: Point3<f64>) -> Self {
        self.overrides.pivot = Pivot::Point(pivot);
        self
    }

    pub fn with_normal(mut self, normal: Vector3<f64>) -> Self {
        self.overrides.axis = Axis::Fixed(normal);
        self
    }

    pub fn with_degree_span(mut self, degrees: f64) -> Self {
        self.degree_span = degrees;
        self
    }

    pub fn project_on_mesh(mut self, project: bool) -> Self {
        self.project_on_mesh = project;
        self
    }

    pub fn with_max_ray_distance(mut self, distance: f64) -> Self {
        self.max_ray_distance = distance;
        self
    }

    /// Rejects bad user input before any geometry is touched.
    pub fn validate(&self) -> Result<()> {
        self.overrides.validate()?;
        if !self.degree_span.is_finite() {
            return Err(GeometryError::InvalidDegreeSpan(self.degree_span));
        }
        Ok(())
    }
}
