/// Custom user events for the GUI event loop.
///
/// These let the render worker wake the UI thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuiEvent {
    /// A frame or error may be waiting in the frame sink. Receiving it does
    /// not by itself trigger a redraw.
    FrameReady,
}
