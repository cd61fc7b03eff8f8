//! Per-fragment shading shared by every render strategy.

use crate::core::data::affine_transform::AffineTransform;
use crate::core::data::colour::Colour;
use crate::core::data::complex::Complex;
use crate::core::data::point::Point;
use crate::core::fractals::mandelbrot::algorithm::evaluate;
use crate::core::fractals::mandelbrot::colour_mapping::map::ColourMap;

/// Device-space centre of pixel `(x, y)`.
#[must_use]
pub fn pixel_center(x: u32, y: u32) -> Point {
    Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5)
}

#[must_use]
pub fn shade_point(point: Point, max_iterations: u32, colour_map: &dyn ColourMap) -> Colour {
    let result = evaluate(Complex::new(point.x, point.y), max_iterations);

    colour_map.map(&result)
}

/// Shades pixel `(x, y)` given the device-to-plane transform.
#[must_use]
pub fn shade_pixel(
    device_to_plane: &AffineTransform,
    x: u32,
    y: u32,
    max_iterations: u32,
    colour_map: &dyn ColourMap,
) -> Colour {
    shade_point(
        device_to_plane.apply(pixel_center(x, y)),
        max_iterations,
        colour_map,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::rect::Rect;
    use crate::core::fractals::mandelbrot::colour_mapping::maps::magnitude_tint::MagnitudeTintColourMap;

    #[test]
    fn test_pixel_center_is_offset_by_half() {
        assert_eq!(pixel_center(0, 0), Point::new(0.5, 0.5));
        assert_eq!(pixel_center(3, 7), Point::new(3.5, 7.5));
    }

    #[test]
    fn test_interior_point_is_black() {
        let map = MagnitudeTintColourMap::new();

        assert_eq!(shade_point(Point::new(0.0, 0.0), 100, &map), Colour::BLACK);
    }

    #[test]
    fn test_shade_pixel_uses_transform() {
        let map = MagnitudeTintColourMap::new();
        // A single pixel covering a rect centred on (3, 3), far outside the set.
        let transform =
            AffineTransform::between(&Rect::device(1, 1), &Rect::new(2.5, 2.5, 1.0, 1.0)).unwrap();

        assert_ne!(shade_pixel(&transform, 0, 0, 100, &map), Colour::BLACK);
    }
}
