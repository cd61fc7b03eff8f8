use log::trace;

use crate::core::actions::cancellation::{CANCEL_CHECK_INTERVAL_PIXELS, CancelToken, NeverCancel};
use crate::core::actions::render_frame::errors::RenderError;
use crate::core::actions::render_frame::fragment::shade_pixel;
use crate::core::data::affine_transform::AffineTransform;
use crate::core::data::device_size::DeviceSize;
use crate::core::data::pixel_buffer::{BYTES_PER_PIXEL, PixelBuffer};
use crate::core::data::rect::Rect;
use crate::core::fractals::mandelbrot::colour_mapping::map::ColourMap;

/// Renders `view` into a fresh buffer of `size`, one pixel at a time.
///
/// For cancel-aware rendering, use [`render_frame_cpu_cancelable`].
pub fn render_frame_cpu(
    view: &Rect,
    size: DeviceSize,
    max_iterations: u32,
    colour_map: &dyn ColourMap,
) -> Result<PixelBuffer, RenderError> {
    render_frame_cpu_cancelable(view, size, max_iterations, colour_map, &NeverCancel)
}

/// Like [`render_frame_cpu`], but polls `cancel` every
/// [`CANCEL_CHECK_INTERVAL_PIXELS`] pixels and returns
/// [`RenderError::Cancelled`] once it fires.
pub fn render_frame_cpu_cancelable<C: CancelToken>(
    view: &Rect,
    size: DeviceSize,
    max_iterations: u32,
    colour_map: &dyn ColourMap,
    cancel: &C,
) -> Result<PixelBuffer, RenderError> {
    let mut pixel_buffer = PixelBuffer::new(size);

    if size.is_empty() {
        return Ok(pixel_buffer);
    }

    let device_to_plane = AffineTransform::between(&size.rect(), view)?;

    trace!(
        "cpu render {}x{} of {:?} at {} iterations",
        size.width, size.height, view, max_iterations
    );

    let pixels = pixel_buffer.buffer_mut().chunks_exact_mut(BYTES_PER_PIXEL);

    for (index, pixel) in pixels.enumerate() {
        if index % CANCEL_CHECK_INTERVAL_PIXELS == 0 {
            cancel.check()?;
        }

        let x = (index % size.width as usize) as u32;
        let y = (index / size.width as usize) as u32;
        let colour = shade_pixel(&device_to_plane, x, y, max_iterations, colour_map);

        pixel.copy_from_slice(&[colour.r, colour.g, colour.b, colour.a]);
    }

    Ok(pixel_buffer)
}
