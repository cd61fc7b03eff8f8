use log::{debug, warn};

use crate::controllers::interactive::events::input_event::InputEvent;
use crate::core::data::affine_transform::AffineTransform;
use crate::core::data::device_size::DeviceSize;
use crate::core::data::point::Point;
use crate::core::data::rect::Rect;
use crate::core::data::viewport_state::{ViewportError, ViewportState};

/// Wheel units per doubling of the view.
pub const WHEEL_UNITS_PER_DOUBLING: f64 = 400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Panning,
}

/// What the render side must do after an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionCommand {
    /// Draw `view` at the current size.
    Render(Rect),
    /// Adopt the new device size, then draw `view`.
    Resize { size: DeviceSize, view: Rect },
}

/// Pan/zoom state machine over a [`ViewportState`].
///
/// Every event goes through [`handle_event`](Self::handle_event); the returned
/// command, if any, is the render request for the resulting view.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    state: InteractionState,
    viewport: ViewportState,
    device_size: Option<DeviceSize>,
}

impl InteractionController {
    #[must_use]
    pub fn new(viewport: ViewportState) -> Self {
        Self {
            state: InteractionState::Idle,
            viewport,
            device_size: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> InteractionState {
        self.state
    }

    #[must_use]
    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    #[must_use]
    pub fn current_view(&self) -> Rect {
        self.viewport.current_view()
    }

    #[must_use]
    pub fn device_size(&self) -> Option<DeviceSize> {
        self.device_size
    }

    /// Device pixels to plane coordinates for the current view, once a
    /// non-empty size is known.
    #[must_use]
    pub fn device_to_plane(&self) -> Option<AffineTransform> {
        let size = self.device_size.filter(|s| !s.is_empty())?;

        AffineTransform::between(&size.rect(), &self.viewport.current_view()).ok()
    }

    pub fn handle_event(&mut self, event: InputEvent) -> Option<InteractionCommand> {
        match event {
            InputEvent::Resize(size) => self.on_resize(size),
            InputEvent::Wheel { x, y, amount } => self.on_wheel(x, y, amount),
            InputEvent::PointerDown => {
                self.transition(InteractionState::Panning);
                None
            }
            InputEvent::PointerUp => {
                self.transition(InteractionState::Idle);
                None
            }
            InputEvent::PointerMove { dx, dy } => match self.state {
                InteractionState::Panning => self.on_drag(dx, dy),
                InteractionState::Idle => None,
            },
        }
    }

    /// Restores the default view.
    pub fn reset_view(&mut self) -> Option<InteractionCommand> {
        self.commit(Ok(ViewportState::default()))
    }

    fn transition(&mut self, next: InteractionState) {
        if self.state != next {
            debug!("interaction {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    fn on_resize(&mut self, size: DeviceSize) -> Option<InteractionCommand> {
        if self.device_size == Some(size) {
            return None;
        }

        debug!("device size now {}x{}", size.width, size.height);
        self.device_size = Some(size);

        if size.is_empty() {
            return None;
        }

        Some(InteractionCommand::Resize {
            size,
            view: self.current_view(),
        })
    }

    fn on_wheel(&mut self, x: f64, y: f64, amount: f64) -> Option<InteractionCommand> {
        let Some(device_to_plane) = self.device_to_plane() else {
            debug!("ignoring wheel before the device size is known");
            return None;
        };

        let factor = 1.0 + amount / WHEEL_UNITS_PER_DOUBLING;
        let anchor = device_to_plane.apply(Point::new(x, y));

        self.commit(self.viewport.apply_scale(factor, Some(anchor)))
    }

    fn on_drag(&mut self, dx: f64, dy: f64) -> Option<InteractionCommand> {
        let (sx, sy) = self.device_to_plane()?.scale_factors();

        self.commit(self.viewport.apply_translate(dx * sx, dy * sy))
    }

    fn commit(&mut self, next: Result<ViewportState, ViewportError>) -> Option<InteractionCommand> {
        match next {
            Ok(next) if next == self.viewport => None,
            Ok(next) => {
                self.viewport = next;
                let view = next.current_view();
                debug!("view now {view:?}");

                self.device_size
                    .filter(|s| !s.is_empty())
                    .map(|_| InteractionCommand::Render(view))
            }
            Err(err) => {
                warn!("ignoring viewport change: {err}");
                None
            }
        }
    }
}
