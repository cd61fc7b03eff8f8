//! Pixel format conversion helpers for presentation adapters.

use crate::core::data::pixel_buffer::BYTES_PER_PIXEL;

/// Drops the alpha channel of packed RGBA data. A trailing partial pixel is ignored.
#[must_use]
pub fn rgba_to_rgb(src: &[u8]) -> Vec<u8> {
    let mut dst = Vec::with_capacity(src.len() / BYTES_PER_PIXEL * 3);

    for pixel in src.chunks_exact(BYTES_PER_PIXEL) {
        dst.extend_from_slice(&pixel[..3]);
    }

    dst
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_to_rgb_known_values() {
        let src = vec![
            255, 0, 0, 255, // red
            0, 255, 0, 128, // green, half transparent
            0, 0, 255, 0, // blue, transparent
        ];

        assert_eq!(rgba_to_rgb(&src), vec![255, 0, 0, 0, 255, 0, 0, 0, 255]);
    }

    #[test]
    fn test_rgba_to_rgb_empty_buffer() {
        assert!(rgba_to_rgb(&[]).is_empty());
    }

    #[test]
    fn test_rgba_to_rgb_ignores_partial_pixel() {
        assert_eq!(rgba_to_rgb(&[1, 2, 3, 4, 5, 6]), vec![1, 2, 3]);
    }
}
