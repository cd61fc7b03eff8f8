use std::sync::Arc;

use crate::core::data::palette::{Palette, PaletteKind};
use crate::core::fractals::mandelbrot::colour_mapping::factory::colour_map_factory;
use crate::core::fractals::mandelbrot::colour_mapping::kinds::ColourMapKind;
use crate::core::fractals::mandelbrot::colour_mapping::map::ColourMap;
use crate::core::fractals::mandelbrot::errors::MandelbrotError;

pub const DEFAULT_MAX_ITERATIONS: u32 = 200;

/// Render parameters that stay fixed across pan and zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MandelbrotConfig {
    pub max_iterations: u32,
    pub colour_map_kind: ColourMapKind,
    pub palette_kind: PaletteKind,
    pub smooth: bool,
}

impl Default for MandelbrotConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            colour_map_kind: ColourMapKind::default(),
            palette_kind: PaletteKind::default(),
            smooth: false,
        }
    }
}

impl MandelbrotConfig {
    pub fn validate(&self) -> Result<(), MandelbrotError> {
        if self.max_iterations == 0 {
            return Err(MandelbrotError::ZeroMaxIterations);
        }

        Ok(())
    }

    #[must_use]
    pub fn palette(&self) -> Arc<Palette> {
        Arc::new(self.palette_kind.palette())
    }

    #[must_use]
    pub fn build_colour_map(&self, palette: Arc<Palette>) -> Box<dyn ColourMap> {
        colour_map_factory(self.colour_map_kind, self.max_iterations, self.smooth, palette)
    }
}
