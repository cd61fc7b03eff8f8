use crate::core::data::point::Point;
use crate::core::data::rect::Rect;
use thiserror::Error;

#[derive(Debug, Copy, Clone, PartialEq, Error)]
#[error("cannot build a transform from a degenerate rect: {width}x{height}")]
pub struct DegenerateRectError {
    pub width: f64,
    pub height: f64,
}

impl DegenerateRectError {
    fn check(rect: &Rect) -> Result<(), Self> {
        if rect.is_degenerate() || !rect.is_finite() {
            return Err(Self {
                width: rect.width(),
                height: rect.height(),
            });
        }

        Ok(())
    }
}

/// 3x3 affine matrix with the last row fixed to `[0, 0, 1]`.
///
/// ```text
/// | a11 a12 a13 |
/// | a21 a22 a23 |
/// |  0   0   1  |
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AffineTransform {
    a11: f64,
    a12: f64,
    a13: f64,
    a21: f64,
    a22: f64,
    a23: f64,
}

impl AffineTransform {
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            a11: 1.0,
            a12: 0.0,
            a13: 0.0,
            a21: 0.0,
            a22: 1.0,
            a23: 0.0,
        }
    }

    /// Maps every point of `from` to the corresponding point of `to`, anchor corner
    /// onto anchor corner, with an independent scale per axis.
    pub fn between(from: &Rect, to: &Rect) -> Result<Self, DegenerateRectError> {
        DegenerateRectError::check(from)?;
        DegenerateRectError::check(to)?;

        let scale_x = to.width() / from.width();
        let scale_y = to.height() / from.height();

        Ok(Self {
            a11: scale_x,
            a12: 0.0,
            a13: to.x() - scale_x * from.x(),
            a21: 0.0,
            a22: scale_y,
            a23: to.y() - scale_y * from.y(),
        })
    }

    #[must_use]
    pub fn apply(&self, point: Point) -> Point {
        Point {
            x: self.a11 * point.x + self.a12 * point.y + self.a13,
            y: self.a21 * point.x + self.a22 * point.y + self.a23,
        }
    }

    /// Applies `self` first, then `next`.
    #[must_use]
    pub fn then(&self, next: &Self) -> Self {
        Self {
            a11: next.a11 * self.a11 + next.a12 * self.a21,
            a12: next.a11 * self.a12 + next.a12 * self.a22,
            a13: next.a11 * self.a13 + next.a12 * self.a23 + next.a13,
            a21: next.a21 * self.a11 + next.a22 * self.a21,
            a22: next.a21 * self.a12 + next.a22 * self.a22,
            a23: next.a21 * self.a13 + next.a22 * self.a23 + next.a23,
        }
    }

    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        let det = self.a11 * self.a22 - self.a12 * self.a21;

        if det == 0.0 || !det.is_finite() {
            return None;
        }

        let a11 = self.a22 / det;
        let a12 = -self.a12 / det;
        let a21 = -self.a21 / det;
        let a22 = self.a11 / det;

        Some(Self {
            a11,
            a12,
            a13: -(a11 * self.a13 + a12 * self.a23),
            a21,
            a22,
            a23: -(a21 * self.a13 + a22 * self.a23),
        })
    }

    /// Diagonal entries: how far one unit along each source axis moves in the target space.
    #[must_use]
    pub fn scale_factors(&self) -> (f64, f64) {
        (self.a11, self.a22)
    }

    /// Column-major single-precision layout, as consumed by `mat3` uniforms.
    #[must_use]
    pub fn to_column_major_f32(&self) -> [f32; 9] {
        [
            self.a11 as f32,
            self.a21 as f32,
            0.0,
            self.a12 as f32,
            self.a22 as f32,
            0.0,
            self.a13 as f32,
            self.a23 as f32,
            1.0,
        ]
    }

    #[must_use]
    pub fn from_column_major_f32(m: &[f32; 9]) -> Self {
        Self {
            a11: f64::from(m[0]),
            a12: f64::from(m[3]),
            a13: f64::from(m[6]),
            a21: f64::from(m[1]),
            a22: f64::from(m[4]),
            a23: f64::from(m[7]),
        }
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}
