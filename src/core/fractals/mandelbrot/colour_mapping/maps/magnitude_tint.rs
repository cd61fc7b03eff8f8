use crate::core::data::colour::Colour;
use crate::core::fractals::mandelbrot::colour_mapping::kinds::ColourMapKind;
use crate::core::fractals::mandelbrot::colour_mapping::map::ColourMap;
use crate::core::fractals::mandelbrot::escape_result::EscapeResult;

const MAGNITUDE_GAIN: f64 = 40.0;

/// Blue base tinted towards white by the final `|z|` of escaped points.
#[derive(Debug, Default)]
pub struct MagnitudeTintColourMap;

impl MagnitudeTintColourMap {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ColourMap for MagnitudeTintColourMap {
    fn map(&self, result: &EscapeResult) -> Colour {
        if !result.escaped {
            return Colour::BLACK;
        }

        let tint = Colour::channel(result.magnitude * MAGNITUDE_GAIN / 255.0);

        Colour::rgb(tint, tint, 255)
    }

    fn kind(&self) -> ColourMapKind {
        ColourMapKind::MagnitudeTint
    }
}
