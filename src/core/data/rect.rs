use crate::core::data::point::Point;

/// Axis-aligned rectangle with one corner at `(x, y)`.
///
/// Which corner `(x, y)` names is up to the caller, but must be the same for
/// rectangles that are mapped onto each other. Extents may be negative: the
/// device rectangle uses a negative height so that device y grows downward
/// while plane y grows upward.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Device-pixel rectangle for a client area, anchored at its bottom-left corner.
    #[must_use]
    pub fn device(width: u32, height: u32) -> Self {
        Self::new(0.0, f64::from(height), f64::from(width), -f64::from(height))
    }

    #[must_use]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Scales about `anchor`, which keeps its position in this rectangle's space.
    #[must_use]
    pub fn scale(&self, factor: f64, anchor: Point) -> Self {
        if factor == 1.0 {
            return *self;
        }

        Self {
            x: (self.x - anchor.x) * factor + anchor.x,
            y: (self.y - anchor.y) * factor + anchor.y,
            width: self.width * factor,
            height: self.height * factor,
        }
    }

    #[must_use]
    pub fn scale_about_center(&self, factor: f64) -> Self {
        self.scale(factor, self.center())
    }

    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Position of `point` relative to this rectangle, `(0, 0)` at the anchor corner
    /// and `(1, 1)` at the opposite one.
    #[must_use]
    pub fn normalized_position(&self, point: Point) -> Point {
        Point::new(
            (point.x - self.x) / self.width,
            (point.y - self.y) / self.height,
        )
    }
}
