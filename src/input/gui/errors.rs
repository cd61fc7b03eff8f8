use thiserror::Error;

use crate::core::fractals::mandelbrot::errors::MandelbrotError;

#[derive(Debug, Error)]
pub enum GuiError {
    #[error("invalid configuration: {0}")]
    Config(#[from] MandelbrotError),
    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("graphics context unavailable: {0}")]
    Pixels(#[from] pixels::Error),
    #[error("failed to resize surface: {0}")]
    Texture(#[from] pixels::TextureError),
}
