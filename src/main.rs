use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use log::info;

use mandelbrot_viewer::{
    CliRenderController, CliRenderOptions, ColourMapKind, DEFAULT_MAX_ITERATIONS, DEFAULT_VIEW,
    DeviceSize, InputEvent, MandelbrotConfig, PaletteKind, PpmFilePresenter, Rect, RenderStrategy,
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Strategy {
    Cpu,
    Gpu,
    Software,
}

impl From<Strategy> for RenderStrategy {
    fn from(value: Strategy) -> Self {
        match value {
            Strategy::Cpu => Self::Cpu,
            Strategy::Gpu => Self::Gpu,
            Strategy::Software => Self::Software,
        }
    }
}

/// Render a view of the Mandelbrot set to a binary PPM image.
#[derive(Debug, Parser)]
#[command(name = "mandelbrot", version)]
struct Args {
    /// Image width in pixels
    #[arg(long, default_value_t = 800, value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 600, value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,

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

    /// Plane window, bottom-left corner then size
    #[arg(
        long,
        num_args = 4,
        value_names = ["X", "Y", "WIDTH", "HEIGHT"],
        allow_negative_numbers = true
    )]
    view: Option<Vec<f64>>,

    /// Scroll AMOUNT wheel units at pixel X Y before rendering; repeatable
    #[arg(
        long,
        num_args = 3,
        value_names = ["X", "Y", "AMOUNT"],
        allow_negative_numbers = true,
        action = ArgAction::Append
    )]
    zoom: Vec<f64>,

    /// Drag by DX DY pixels after zooming; repeatable
    #[arg(
        long,
        num_args = 2,
        value_names = ["DX", "DY"],
        allow_negative_numbers = true,
        action = ArgAction::Append
    )]
    drag: Vec<f64>,

    /// Render strategy
    #[arg(long, value_enum, default_value_t = Strategy::Cpu)]
    strategy: Strategy,

    /// Output file
    #[arg(short, long, default_value = "output/mandelbrot.ppm")]
    output: PathBuf,
}

impl Args {
    fn view(&self) -> Rect {
        match self.view.as_deref() {
            Some(&[x, y, width, height]) => Rect::new(x, y, width, height),
            _ => DEFAULT_VIEW,
        }
    }

    fn events(&self) -> Vec<InputEvent> {
        let zooms = self.zoom.chunks_exact(3).map(|z| InputEvent::Wheel {
            x: z[0],
            y: z[1],
            amount: z[2],
        });

        let drags = self.drag.chunks_exact(2).flat_map(|d| {
            [
                InputEvent::PointerDown,
                InputEvent::PointerMove { dx: d[0], dy: d[1] },
                InputEvent::PointerUp,
            ]
        });

        zooms.chain(drags).collect()
    }

    fn options(&self) -> CliRenderOptions {
        CliRenderOptions {
            size: DeviceSize::new(self.width, self.height),
            view: self.view(),
            config: MandelbrotConfig {
                max_iterations: self.max_iterations,
                colour_map_kind: self.colouring.into(),
                palette_kind: self.palette.into(),
                smooth: self.smooth,
            },
            strategy: self.strategy.into(),
            events: self.events(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut controller = CliRenderController::new(PpmFilePresenter::new());

    controller
        .generate(&args.options())
        .context("failed to render frame")?;
    controller
        .write(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    if let Some(view) = controller.final_view() {
        info!(
            "view x={} y={} width={} height={}",
            view.x(),
            view.y(),
            view.width(),
            view.height()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["mandelbrot"]).unwrap();
        let options = args.options();

        assert_eq!(options.size, DeviceSize::new(800, 600));
        assert_eq!(options.view, DEFAULT_VIEW);
        assert_eq!(options.config, MandelbrotConfig::default());
        assert_eq!(options.strategy, RenderStrategy::Cpu);
        assert!(options.events.is_empty());
        assert_eq!(args.output, PathBuf::from("output/mandelbrot.ppm"));
    }

    #[test]
    fn test_parses_view_zoom_and_drag() {
        let args = Args::try_parse_from([
            "mandelbrot",
            "--view",
            "-1.5",
            "-0.5",
            "1",
            "1",
            "--zoom",
            "400",
            "300",
            "-200",
            "--zoom",
            "10",
            "10",
            "40",
            "--drag",
            "5",
            "-3",
            "--colouring",
            "magnitude-tint",
            "--strategy",
            "software",
        ])
        .unwrap();
        let options = args.options();

        assert_eq!(options.view, Rect::new(-1.5, -0.5, 1.0, 1.0));
        assert_eq!(options.config.colour_map_kind, ColourMapKind::MagnitudeTint);
        assert_eq!(options.strategy, RenderStrategy::Software);
        assert_eq!(
            options.events,
            vec![
                InputEvent::Wheel {
                    x: 400.0,
                    y: 300.0,
                    amount: -200.0
                },
                InputEvent::Wheel {
                    x: 10.0,
                    y: 10.0,
                    amount: 40.0
                },
                InputEvent::PointerDown,
                InputEvent::PointerMove { dx: 5.0, dy: -3.0 },
                InputEvent::PointerUp,
            ]
        );
    }

    #[test]
    fn test_rejects_zero_iterations_and_sizes() {
        assert!(Args::try_parse_from(["mandelbrot", "--max-iterations", "0"]).is_err());
        assert!(Args::try_parse_from(["mandelbrot", "--width", "0"]).is_err());
    }
}
