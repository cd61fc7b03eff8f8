use thiserror::Error;

use crate::core::actions::cancellation::Cancelled;
use crate::core::actions::render_frame::ports::render_backend::BackendError;
use crate::core::data::affine_transform::DegenerateRectError;
use crate::core::data::pixel_buffer::PixelBufferError;
use crate::core::fractals::mandelbrot::errors::MandelbrotError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// A newer request superseded this frame. Expected control flow, not a
    /// failure to report.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
    #[error("invalid render configuration: {0}")]
    Config(#[from] MandelbrotError),
    #[error(transparent)]
    DegenerateRect(#[from] DegenerateRectError),
    #[error("render backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("pixel buffer error: {0}")]
    PixelBuffer(#[from] PixelBufferError),
}

impl RenderError {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}
