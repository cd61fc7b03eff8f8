use std::sync::{Mutex, PoisonError};

use winit::event_loop::EventLoopProxy;

use crate::controllers::interactive::events::render_event::RenderEvent;
use crate::controllers::interactive::ports::frame_sink::FrameSink;
use crate::input::gui::events::GuiEvent;

/// Hands frames from the render worker to the UI thread.
///
/// Holds only the newest event; an unread older one is replaced.
pub struct PixelsFrameSink {
    render_event: Mutex<Option<RenderEvent>>,
    event_loop_proxy: EventLoopProxy<GuiEvent>,
}

impl PixelsFrameSink {
    pub fn new(event_loop_proxy: EventLoopProxy<GuiEvent>) -> Self {
        Self {
            render_event: Mutex::new(None),
            event_loop_proxy,
        }
    }

    pub fn take_render_event(&self) -> Option<RenderEvent> {
        self.render_event
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl FrameSink for PixelsFrameSink {
    fn submit(&self, event: RenderEvent) {
        *self
            .render_event
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(event);

        // The loop is gone once the window closes; nothing left to wake.
        let _ = self.event_loop_proxy.send_event(GuiEvent::FrameReady);
    }
}
