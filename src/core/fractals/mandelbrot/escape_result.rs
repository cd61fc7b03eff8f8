/// Outcome of iterating `z <- z^2 + c` for one point.
///
/// `iterations` is the zero-based step at which `|z|` first exceeded the escape
/// radius, or the iteration cap when the point stayed bounded.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EscapeResult {
    pub escaped: bool,
    pub iterations: u32,
    pub magnitude: f64,
}

impl EscapeResult {
    #[must_use]
    pub const fn bounded(max_iterations: u32, magnitude: f64) -> Self {
        Self {
            escaped: false,
            iterations: max_iterations,
            magnitude,
        }
    }

    #[must_use]
    pub const fn escaped(iterations: u32, magnitude: f64) -> Self {
        Self {
            escaped: true,
            iterations,
            magnitude,
        }
    }
}
