use crate::core::data::colour::Colour;
use thiserror::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum PaletteError {
    #[error("palette needs at least two colours, got {0}")]
    TooFewColours(usize),
}

/// Ordered colour ramp sampled by a normalized position in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colours: Vec<Colour>,
}

impl Palette {
    pub fn new(colours: Vec<Colour>) -> Result<Self, PaletteError> {
        if colours.len() < 2 {
            return Err(PaletteError::TooFewColours(colours.len()));
        }

        Ok(Self { colours })
    }

    /// Builds a palette from packed RGB triples.
    pub fn from_rgb(rgb: &[[u8; 3]]) -> Result<Self, PaletteError> {
        Self::new(rgb.iter().map(|&[r, g, b]| Colour::rgb(r, g, b)).collect())
    }

    #[must_use]
    pub fn colours(&self) -> &[Colour] {
        &self.colours
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.colours.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colours.is_empty()
    }

    /// Linear interpolation between the two entries nearest to `position`.
    /// Positions outside `[0, 1]` clamp to the end colours.
    #[must_use]
    pub fn sample(&self, position: f64) -> Colour {
        let last = self.colours.len() - 1;
        let position = if position.is_nan() {
            0.0
        } else {
            position.clamp(0.0, 1.0)
        };

        let scaled = position * last as f64;
        let index = (scaled.floor() as usize).min(last - 1);
        let fraction = scaled - index as f64;

        self.colours[index].lerp(self.colours[index + 1], fraction)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteKind {
    Wikipedia,
    Fire,
    Grayscale,
}

const WIKIPEDIA: [[u8; 3]; 16] = [
    [66, 30, 15],
    [25, 7, 26],
    [9, 1, 47],
    [4, 4, 73],
    [0, 7, 100],
    [12, 44, 138],
    [24, 82, 177],
    [57, 125, 209],
    [134, 181, 229],
    [211, 236, 248],
    [241, 233, 191],
    [248, 201, 95],
    [255, 170, 0],
    [204, 128, 0],
    [153, 87, 0],
    [106, 52, 3],
];

const FIRE: [[u8; 3]; 5] = [
    [0, 0, 0],
    [128, 0, 0],
    [255, 64, 0],
    [255, 200, 0],
    [255, 255, 255],
];

const GRAYSCALE: [[u8; 3]; 2] = [[0, 0, 0], [255, 255, 255]];

impl PaletteKind {
    pub const ALL: &'static [Self] = &[Self::Wikipedia, Self::Fire, Self::Grayscale];

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Wikipedia => "Wikipedia",
            Self::Fire => "Fire",
            Self::Grayscale => "Grayscale",
        }
    }

    #[must_use]
    pub fn palette(self) -> Palette {
        let rgb: &[[u8; 3]] = match self {
            Self::Wikipedia => &WIKIPEDIA,
            Self::Fire => &FIRE,
            Self::Grayscale => &GRAYSCALE,
        };

        Palette {
            colours: rgb.iter().map(|&[r, g, b]| Colour::rgb(r, g, b)).collect(),
        }
    }
}

impl Default for PaletteKind {
    fn default() -> Self {
        Self::Wikipedia
    }
}

impl std::fmt::Display for PaletteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).display_name())
    }
}
