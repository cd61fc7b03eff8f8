pub mod factory;
pub mod kinds;
pub mod map;
pub mod maps;

use crate::core::fractals::mandelbrot::escape_result::EscapeResult;

/// Normalized escape fraction in `[0, 1]`.
///
/// The plain fraction is `iterations / max_iterations`. The smooth variant adds
/// the fractional escape count `1 - log2(ln |z|)` so that bands blend into a
/// continuous gradient.
#[must_use]
pub fn escape_fraction(result: &EscapeResult, max_iterations: u32, smooth: bool) -> f64 {
    if max_iterations == 0 {
        return 0.0;
    }

    let mut steps = f64::from(result.iterations);

    if smooth && result.escaped && result.magnitude > 1.0 {
        steps += 1.0 - result.magnitude.ln().log2();
    }

    let fraction = steps / f64::from(max_iterations);

    if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    }
}
