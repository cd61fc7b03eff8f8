use crate::core::data::colour::Colour;
use crate::core::data::device_size::DeviceSize;
use thiserror::Error;

pub const BYTES_PER_PIXEL: usize = 4;

fn size_to_buffer_len(size: DeviceSize) -> usize {
    size.pixel_count() * BYTES_PER_PIXEL
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PixelBufferError {
    #[error("pixel at x:{x}, y:{y} outside of {}x{} buffer", .size.width, .size.height)]
    PixelOutsideBounds { x: u32, y: u32, size: DeviceSize },
    #[error("buffer of {expected} bytes expected, got {actual}")]
    BoundsMismatch { expected: usize, actual: usize },
}

pub type PixelBufferData = Vec<u8>;

/// Row-major RGBA framebuffer, row 0 at the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    size: DeviceSize,
    buffer: PixelBufferData,
}

impl PixelBuffer {
    #[must_use]
    pub fn new(size: DeviceSize) -> Self {
        Self {
            size,
            buffer: vec![0; size_to_buffer_len(size)],
        }
    }

    pub fn from_data(size: DeviceSize, buffer: PixelBufferData) -> Result<Self, PixelBufferError> {
        let expected = size_to_buffer_len(size);

        if expected != buffer.len() {
            return Err(PixelBufferError::BoundsMismatch {
                expected,
                actual: buffer.len(),
            });
        }

        Ok(Self { size, buffer })
    }

    #[must_use]
    pub fn size(&self) -> DeviceSize {
        self.size
    }

    #[must_use]
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    #[must_use]
    pub fn into_data(self) -> PixelBufferData {
        self.buffer
    }

    /// Reallocates to `size`, clearing the contents when the size changes.
    pub fn resize(&mut self, size: DeviceSize) {
        if size != self.size {
            self.size = size;
            self.buffer = vec![0; size_to_buffer_len(size)];
        }
    }

    fn index(&self, x: u32, y: u32) -> Result<usize, PixelBufferError> {
        if x >= self.size.width || y >= self.size.height {
            return Err(PixelBufferError::PixelOutsideBounds {
                x,
                y,
                size: self.size,
            });
        }

        Ok((y as usize * self.size.width as usize + x as usize) * BYTES_PER_PIXEL)
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, colour: Colour) -> Result<(), PixelBufferError> {
        let index = self.index(x, y)?;

        self.buffer[index..index + BYTES_PER_PIXEL].copy_from_slice(&[
            colour.r, colour.g, colour.b, colour.a,
        ]);

        Ok(())
    }

    pub fn pixel(&self, x: u32, y: u32) -> Result<Colour, PixelBufferError> {
        let index = self.index(x, y)?;
        let p = &self.buffer[index..index + BYTES_PER_PIXEL];

        Ok(Colour {
            r: p[0],
            g: p[1],
            b: p[2],
            a: p[3],
        })
    }
}
