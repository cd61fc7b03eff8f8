use crate::core::data::colour::Colour;
use crate::core::fractals::mandelbrot::colour_mapping::kinds::ColourMapKind;
use crate::core::fractals::mandelbrot::escape_result::EscapeResult;

/// Colours one escape result. Implementations are total and shared read-only
/// across every lane of a frame.
pub trait ColourMap: Send + Sync {
    fn map(&self, result: &EscapeResult) -> Colour;

    fn kind(&self) -> ColourMapKind;

    fn display_name(&self) -> &str {
        self.kind().display_name()
    }
}
