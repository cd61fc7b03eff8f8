//! Interactive Mandelbrot set viewer.
//!
//! Pan and zoom a window over the complex plane; each visible point is run
//! through the escape-time iteration and coloured by how quickly it escapes.

pub mod adapters;
pub mod controllers;
pub mod core;
#[cfg(feature = "gui")]
pub mod input;
pub mod presenters;

pub use crate::adapters::backend::gpu::GpuBackend;
pub use crate::adapters::backend::software::SoftwareBackend;
pub use crate::controllers::cli::render_to_file::{
    CliError, CliRenderController, CliRenderOptions, RenderStrategy,
};
pub use crate::controllers::interactive::controller::{
    InteractionCommand, InteractionController, InteractionState,
};
pub use crate::controllers::interactive::events::input_event::InputEvent;
pub use crate::controllers::interactive::session::MandelbrotSession;
pub use crate::core::actions::render_frame::render_cpu::render_frame_cpu;
pub use crate::core::actions::render_frame::render_pipeline::RenderPipeline;
pub use crate::core::data::device_size::DeviceSize;
pub use crate::core::data::palette::PaletteKind;
pub use crate::core::data::rect::Rect;
pub use crate::core::data::viewport_state::{DEFAULT_VIEW, ViewportState};
pub use crate::core::fractals::mandelbrot::colour_mapping::kinds::ColourMapKind;
pub use crate::core::fractals::mandelbrot::mandelbrot_config::{DEFAULT_MAX_ITERATIONS, MandelbrotConfig};
#[cfg(feature = "gui")]
pub use crate::input::gui::run_gui;
pub use crate::presenters::file::ppm::PpmFilePresenter;
