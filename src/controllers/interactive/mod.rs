//! Interactive viewing: input state machine, render session and background
//! render worker.
//!
//! - **Input**: [`InputEvent`]s from a [`HostEvents`] source or pushed directly
//! - **Output**: frames drawn through a render pipeline, or [`RenderEvent`]s
//!   delivered to a [`FrameSink`]
//! - **Core**: viewport, transform and render actions from `core/`
//!
//! [`InputEvent`]: events::input_event::InputEvent
//! [`HostEvents`]: ports::host_events::HostEvents
//! [`RenderEvent`]: events::render_event::RenderEvent
//! [`FrameSink`]: ports::frame_sink::FrameSink

pub mod controller;
pub mod data;
pub mod errors;
pub mod events;
pub mod ports;
pub mod render_worker;
pub mod session;
