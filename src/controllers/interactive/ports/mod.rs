pub mod frame_sink;
pub mod host_events;
