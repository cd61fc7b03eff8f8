use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use mandelbrot_viewer::{
    ColourMapKind, DEFAULT_MAX_ITERATIONS, MandelbrotConfig, PaletteKind, run_gui,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Colouring {
    Palette,
    Exponential,
    MagnitudeTint,
}

impl From<Colouring> for ColourMapKind {
    fn from(value: Colouring) -> Self {
        match value {
            Colouring::Palette => Self::Palette,
            Colouring::Exponential => Self::Exponential,
            Colouring::MagnitudeTint => Self::MagnitudeTint,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PaletteChoice {
    Wikipedia,
    Fire,
    Grayscale,
}

impl From<PaletteChoice> for PaletteKind {
    fn from(value: PaletteChoice) -> Self {
        match value {
            PaletteChoice::Wikipedia => Self::Wikipedia,
            PaletteChoice::Fire => Self::Fire,
            PaletteChoice::Grayscale => Self::Grayscale,
        }
    }
}

/// Explore the Mandelbrot set: drag to pan, scroll to zoom, R to reset.
#[derive(Debug, Parser)]
#[command(name = "mandelbrot-gui", version)]
struct Args {
    /// Iteration cap per point
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS, value_parser = clap::value_parser!(u32).range(1..))]
    max_iterations: u32,

    /// How escaped points are coloured
    #[arg(long, value_enum, default_value_t = Colouring::Palette)]
    colouring: Colouring,

    /// Palette used by palette colouring
    #[arg(long, value_enum, default_value_t = PaletteChoice::Wikipedia)]
    palette: PaletteChoice,

    /// Blend iteration bands into a continuous gradient
    #[arg(long)]
    smooth: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = MandelbrotConfig {
        max_iterations: args.max_iterations,
        colour_map_kind: args.colouring.into(),
        palette_kind: args.palette.into(),
        smooth: args.smooth,
    };

    run_gui(config).context("viewer failed")
}
