use crate::core::data::colour::Colour;
use crate::core::fractals::mandelbrot::colour_mapping::escape_fraction;
use crate::core::fractals::mandelbrot::colour_mapping::kinds::ColourMapKind;
use crate::core::fractals::mandelbrot::colour_mapping::map::ColourMap;
use crate::core::fractals::mandelbrot::escape_result::EscapeResult;

const RATE: f64 = 5.0;

/// Grayscale ramp `(1 - e^(-k t)) / (1 - e^(-k))` over the escape fraction `t`.
#[derive(Debug)]
pub struct ExponentialColourMap {
    max_iterations: u32,
    smooth: bool,
}

impl ExponentialColourMap {
    #[must_use]
    pub fn new(max_iterations: u32, smooth: bool) -> Self {
        Self {
            max_iterations,
            smooth,
        }
    }

    #[must_use]
    pub fn intensity(t: f64) -> f64 {
        (1.0 - (-RATE * t).exp()) / (1.0 - (-RATE).exp())
    }
}

impl ColourMap for ExponentialColourMap {
    fn map(&self, result: &EscapeResult) -> Colour {
        if !result.escaped {
            return Colour::BLACK;
        }

        let t = escape_fraction(result, self.max_iterations, self.smooth);
        let value = Colour::channel(Self::intensity(t));

        Colour::rgb(value, value, value)
    }

    fn kind(&self) -> ColourMapKind {
        ColourMapKind::Exponential
    }
}
