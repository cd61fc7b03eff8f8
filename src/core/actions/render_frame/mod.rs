//! Full-frame rendering.
//!
//! Two interchangeable strategies produce the same image for the same view:
//! - [`render_cpu`]: a sequential loop over device pixels into a [`PixelBuffer`].
//! - [`render_pipeline`]: a full-viewport program driven through a
//!   [`RenderBackend`], with the view supplied as a `mat3` uniform.
//!
//! [`PixelBuffer`]: crate::core::data::pixel_buffer::PixelBuffer
//! [`RenderBackend`]: ports::render_backend::RenderBackend

pub mod errors;
pub mod fragment;
pub mod ports;
pub mod render_cpu;
pub mod render_pipeline;
