use std::sync::Arc;

use crate::core::data::colour::Colour;
use crate::core::data::palette::Palette;
use crate::core::fractals::mandelbrot::colour_mapping::escape_fraction;
use crate::core::fractals::mandelbrot::colour_mapping::kinds::ColourMapKind;
use crate::core::fractals::mandelbrot::colour_mapping::map::ColourMap;
use crate::core::fractals::mandelbrot::escape_result::EscapeResult;

#[derive(Debug)]
pub struct PaletteGradientColourMap {
    palette: Arc<Palette>,
    max_iterations: u32,
    smooth: bool,
}

impl PaletteGradientColourMap {
    #[must_use]
    pub fn new(palette: Arc<Palette>, max_iterations: u32, smooth: bool) -> Self {
        Self {
            palette,
            max_iterations,
            smooth,
        }
    }

    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }
}

impl ColourMap for PaletteGradientColourMap {
    fn map(&self, result: &EscapeResult) -> Colour {
        if !result.escaped {
            return Colour::BLACK;
        }

        self.palette
            .sample(escape_fraction(result, self.max_iterations, self.smooth))
    }

    fn kind(&self) -> ColourMapKind {
        ColourMapKind::Palette
    }
}
