//! Windowed viewer: winit for the window and input, pixels for presentation.

mod app;
pub mod errors;
pub mod events;
pub mod translate;

pub use app::run_gui;
pub use errors::GuiError;
