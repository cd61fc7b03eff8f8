use std::sync::Arc;

use crate::core::data::palette::Palette;
use crate::core::fractals::mandelbrot::colour_mapping::kinds::ColourMapKind;
use crate::core::fractals::mandelbrot::colour_mapping::map::ColourMap;
use crate::core::fractals::mandelbrot::colour_mapping::maps::{
    exponential::ExponentialColourMap, magnitude_tint::MagnitudeTintColourMap,
    palette_gradient::PaletteGradientColourMap,
};

#[must_use]
pub fn colour_map_factory(
    kind: ColourMapKind,
    max_iterations: u32,
    smooth: bool,
    palette: Arc<Palette>,
) -> Box<dyn ColourMap> {
    match kind {
        ColourMapKind::Palette => Box::new(PaletteGradientColourMap::new(
            palette,
            max_iterations,
            smooth,
        )),
        ColourMapKind::Exponential => Box::new(ExponentialColourMap::new(max_iterations, smooth)),
        ColourMapKind::MagnitudeTint => Box::new(MagnitudeTintColourMap::new()),
    }
}
