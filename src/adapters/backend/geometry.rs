use crate::core::actions::render_frame::ports::render_backend::BackendError;
use crate::core::data::point::Point;

/// Validated triangle strip in normalized device coordinates.
///
/// Triangle `i` is made of vertices `i`, `i + 1` and `i + 2`. Coverage is
/// tested per triangle, so a strip that does not fill its bounding box leaves
/// the rest uncovered.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleStrip {
    vertices: Vec<Point>,
}

impl TriangleStrip {
    pub fn new(vertices: &[[f32; 2]]) -> Result<Self, BackendError> {
        if vertices.len() < 3 {
            return Err(BackendError::InvalidGeometry(format!(
                "a triangle strip needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }

        if vertices.iter().flatten().any(|v| !v.is_finite()) {
            return Err(BackendError::InvalidGeometry(
                "vertex coordinates must be finite".to_string(),
            ));
        }

        Ok(Self {
            vertices: vertices
                .iter()
                .map(|&[x, y]| Point::new(f64::from(x), f64::from(y)))
                .collect(),
        })
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        self.vertices
            .windows(3)
            .any(|t| triangle_contains(t[0], t[1], t[2], p))
    }
}

/// Twice the signed area of `(a, b, p)`; positive when `p` is left of `a -> b`.
fn edge(a: Point, b: Point, p: Point) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Strips alternate winding, so either orientation counts. Points on an edge
/// are inside.
fn triangle_contains(a: Point, b: Point, c: Point, p: Point) -> bool {
    let (e0, e1, e2) = (edge(a, b, p), edge(b, c, p), edge(c, a, p));

    (e0 >= 0.0 && e1 >= 0.0 && e2 >= 0.0) || (e0 <= 0.0 && e1 <= 0.0 && e2 <= 0.0)
}
