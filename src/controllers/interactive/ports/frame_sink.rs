use crate::controllers::interactive::events::render_event::RenderEvent;

/// Receives finished frames from the render worker thread.
pub trait FrameSink: Send + Sync {
    fn submit(&self, event: RenderEvent);
}
