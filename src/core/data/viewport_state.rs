use crate::core::data::point::Point;
use crate::core::data::rect::Rect;
use thiserror::Error;

/// Frames the classic Mandelbrot silhouette.
pub const DEFAULT_VIEW: Rect = Rect::new(-2.0, -1.25, 2.75, 2.5);

#[derive(Debug, Copy, Clone, PartialEq, Error)]
pub enum ViewportError {
    #[error("viewport rect is degenerate: {width}x{height}")]
    Degenerate { width: f64, height: f64 },
    #[error("viewport rect is not finite: {0:?}")]
    NonFinite(Rect),
    #[error("scale factor must be positive and finite, got {0}")]
    InvalidScaleFactor(f64),
}

/// The visible window onto the complex plane.
///
/// Immutable: every operation returns a replacement state, and a mutation that
/// would leave the window degenerate or non-finite is rejected.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportState {
    view: Rect,
}

impl ViewportState {
    pub fn new(view: Rect) -> Result<Self, ViewportError> {
        if !view.is_finite() {
            return Err(ViewportError::NonFinite(view));
        }

        if view.is_degenerate() {
            return Err(ViewportError::Degenerate {
                width: view.width(),
                height: view.height(),
            });
        }

        Ok(Self { view })
    }

    #[must_use]
    pub fn current_view(&self) -> Rect {
        self.view
    }

    /// Scales about `anchor` (plane coordinates), or about the view's centre when
    /// no anchor is given. Factors below 1 zoom in, above 1 zoom out.
    pub fn apply_scale(&self, factor: f64, anchor: Option<Point>) -> Result<Self, ViewportError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ViewportError::InvalidScaleFactor(factor));
        }

        let anchor = anchor.unwrap_or_else(|| self.view.center());

        Self::new(self.view.scale(factor, anchor))
    }

    pub fn apply_translate(&self, dx: f64, dy: f64) -> Result<Self, ViewportError> {
        Self::new(self.view.translate(dx, dy))
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self { view: DEFAULT_VIEW }
    }
}
