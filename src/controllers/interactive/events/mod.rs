pub mod input_event;
pub mod render_event;
