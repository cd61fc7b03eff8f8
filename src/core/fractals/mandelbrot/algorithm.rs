use crate::core::data::complex::Complex;
use crate::core::fractals::mandelbrot::escape_result::EscapeResult;

/// Escape radius 2, compared squared.
pub const ESCAPE_RADIUS_SQUARED: f64 = 4.0;

/// Iterates `z <- z^2 + c` from `z = 0` until `|z| > 2` or `max_iterations` steps.
///
/// Pure and order-independent, so every point of a frame may be evaluated in
/// parallel. A cap of zero returns a bounded result without iterating.
#[must_use]
pub fn evaluate(c: Complex, max_iterations: u32) -> EscapeResult {
    let mut z = Complex::ZERO;

    for iteration in 0..max_iterations {
        z = z * z + c;

        if z.magnitude_squared() > ESCAPE_RADIUS_SQUARED {
            return EscapeResult::escaped(iteration, z.magnitude());
        }
    }

    EscapeResult::bounded(max_iterations, z.magnitude())
}
