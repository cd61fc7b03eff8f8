use winit::event::MouseScrollDelta;

use crate::controllers::interactive::controller::WHEEL_UNITS_PER_DOUBLING;
use crate::controllers::interactive::events::input_event::InputEvent;

/// Wheel units per scrolled line.
pub const LINE_HEIGHT: f64 = 100.0;

/// Largest wheel amount forwarded per event. Keeps `1 + amount / 400`
/// positive so a fast flick still zooms instead of being rejected.
pub const MAX_WHEEL_AMOUNT: f64 = WHEEL_UNITS_PER_DOUBLING - 1.0;

/// Turns winit's absolute cursor positions and scroll deltas into
/// [`InputEvent`]s.
///
/// winit reports scrolling up as a positive delta; the viewer zooms out on a
/// positive amount, so the sign is flipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputTranslator {
    cursor: Option<(f64, f64)>,
}

impl InputTranslator {
    #[must_use]
    pub fn cursor(&self) -> Option<(f64, f64)> {
        self.cursor
    }

    /// Records the new position; yields the movement since the last one.
    pub fn cursor_moved(&mut self, x: f64, y: f64) -> Option<InputEvent> {
        let previous = self.cursor.replace((x, y))?;

        Some(InputEvent::PointerMove {
            dx: x - previous.0,
            dy: y - previous.1,
        })
    }

    pub fn cursor_left(&mut self) {
        self.cursor = None;
    }

    /// Wheel event at the last known cursor position.
    #[must_use]
    pub fn wheel(&self, delta: MouseScrollDelta) -> Option<InputEvent> {
        let (x, y) = self.cursor?;
        let amount = match delta {
            MouseScrollDelta::LineDelta(_, lines) => -f64::from(lines) * LINE_HEIGHT,
            MouseScrollDelta::PixelDelta(position) => -position.y,
        }
        .clamp(-MAX_WHEEL_AMOUNT, MAX_WHEEL_AMOUNT);

        Some(InputEvent::Wheel { x, y, amount })
    }
}
