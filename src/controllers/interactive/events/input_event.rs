use crate::core::data::device_size::DeviceSize;

/// Host input, already reduced to what the interaction state machine needs.
///
/// Positions and deltas are in device pixels with y growing downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Current client size of the render target.
    Resize(DeviceSize),
    /// Scroll at `(x, y)`; positive `amount` zooms out.
    Wheel { x: f64, y: f64, amount: f64 },
    PointerDown,
    PointerUp,
    PointerMove { dx: f64, dy: f64 },
}
