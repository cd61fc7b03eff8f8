use log::{debug, info};

use crate::controllers::interactive::controller::{InteractionCommand, InteractionController};
use crate::controllers::interactive::events::input_event::InputEvent;
use crate::controllers::interactive::ports::host_events::HostEvents;
use crate::core::actions::render_frame::errors::RenderError;
use crate::core::actions::render_frame::ports::render_backend::RenderBackend;
use crate::core::actions::render_frame::render_pipeline::RenderPipeline;
use crate::core::data::rect::Rect;

/// One interactive session: the interaction state machine feeding a render
/// pipeline on a single timeline.
pub struct MandelbrotSession<B: RenderBackend> {
    controller: InteractionController,
    pipeline: RenderPipeline<B>,
    frames_rendered: u64,
}

impl<B: RenderBackend> MandelbrotSession<B> {
    pub fn new(controller: InteractionController, pipeline: RenderPipeline<B>) -> Self {
        info!("session started at {:?}", controller.current_view());

        Self {
            controller,
            pipeline,
            frames_rendered: 0,
        }
    }

    #[must_use]
    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    #[must_use]
    pub fn pipeline(&self) -> &RenderPipeline<B> {
        &self.pipeline
    }

    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Processes everything the host has queued, then draws at most once.
    pub fn pump<H: HostEvents>(&mut self, host: &mut H) -> Result<bool, RenderError> {
        self.handle_events(host.drain())
    }

    /// Applies `events` in order. Only the view left by the last state-changing
    /// event is drawn; intermediate views are never rendered.
    pub fn handle_events<I>(&mut self, events: I) -> Result<bool, RenderError>
    where
        I: IntoIterator<Item = InputEvent>,
    {
        let mut pending: Option<Rect> = None;

        for event in events {
            match self.controller.handle_event(event) {
                Some(InteractionCommand::Resize { size, view }) => {
                    self.pipeline.set_viewport_size(size);
                    pending = Some(view);
                }
                Some(InteractionCommand::Render(view)) => pending = Some(view),
                None => {}
            }
        }

        let Some(view) = pending else {
            return Ok(false);
        };

        debug!("rendering {view:?}");

        let drawn = self.pipeline.render_view(&view)?;

        if drawn {
            self.frames_rendered += 1;
        }

        Ok(drawn)
    }

    /// Returns to the default view and redraws if anything changed.
    pub fn reset_view(&mut self) -> Result<bool, RenderError> {
        match self.controller.reset_view() {
            Some(InteractionCommand::Render(view)) => {
                let drawn = self.pipeline.render_view(&view)?;
                self.frames_rendered += u64::from(drawn);
                Ok(drawn)
            }
            _ => Ok(false),
        }
    }

    #[must_use]
    pub fn into_parts(self) -> (InteractionController, RenderPipeline<B>) {
        (self.controller, self.pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use crate::adapters::backend::software::SoftwareBackend;
    use crate::core::data::colour::Colour;
    use crate::core::data::device_size::DeviceSize;
    use crate::core::data::viewport_state::DEFAULT_VIEW;
    use crate::core::fractals::mandelbrot::mandelbrot_config::MandelbrotConfig;

    #[derive(Default)]
    struct QueuedEvents(VecDeque<InputEvent>);

    impl QueuedEvents {
        fn push(&mut self, event: InputEvent) {
            self.0.push_back(event);
        }
    }

    impl HostEvents for QueuedEvents {
        fn drain(&mut self) -> Vec<InputEvent> {
            self.0.drain(..).collect()
        }
    }

    fn session() -> MandelbrotSession<SoftwareBackend> {
        let config = MandelbrotConfig {
            max_iterations: 32,
            ..MandelbrotConfig::default()
        };
        let pipeline = RenderPipeline::new(SoftwareBackend::new(), config).unwrap();

        MandelbrotSession::new(InteractionController::default(), pipeline)
    }

    #[test]
    fn test_first_resize_draws_a_frame() {
        let mut session = session();
        let mut host = QueuedEvents::default();
        host.push(InputEvent::Resize(DeviceSize::new(8, 6)));

        assert!(session.pump(&mut host).unwrap());
        assert_eq!(session.frames_rendered(), 1);
        assert_eq!(session.pipeline().view(), Some(DEFAULT_VIEW));

        let frame = session.pipeline().backend().framebuffer();
        assert_eq!(frame.size(), DeviceSize::new(8, 6));
        assert!(frame.buffer().chunks_exact(4).all(|p| p[3] == 255));
    }

    #[test]
    fn test_batch_renders_once_with_latest_view() {
        let mut session = session();
        let mut host = QueuedEvents::default();
        host.push(InputEvent::Resize(DeviceSize::new(8, 6)));
        host.push(InputEvent::Wheel {
            x: 4.0,
            y: 3.0,
            amount: 400.0,
        });
        host.push(InputEvent::PointerDown);
        host.push(InputEvent::PointerMove { dx: 2.0, dy: 0.0 });
        host.push(InputEvent::PointerMove { dx: 2.0, dy: 1.0 });
        host.push(InputEvent::PointerUp);

        assert!(session.pump(&mut host).unwrap());
        assert_eq!(session.frames_rendered(), 1);
        assert_eq!(
            session.pipeline().view(),
            Some(session.controller().current_view())
        );
        assert_ne!(session.controller().current_view(), DEFAULT_VIEW);
    }

    #[test]
    fn test_empty_batch_and_repeated_resize_render_nothing() {
        let mut session = session();
        let mut host = QueuedEvents::default();

        assert!(!session.pump(&mut host).unwrap());

        host.push(InputEvent::Resize(DeviceSize::new(8, 6)));
        session.pump(&mut host).unwrap();
        host.push(InputEvent::Resize(DeviceSize::new(8, 6)));

        assert!(!session.pump(&mut host).unwrap());
        assert_eq!(session.frames_rendered(), 1);
    }

    #[test]
    fn test_events_before_resize_do_not_render() {
        let mut session = session();

        let drawn = session
            .handle_events([
                InputEvent::PointerDown,
                InputEvent::PointerMove { dx: 5.0, dy: 5.0 },
                InputEvent::Wheel {
                    x: 0.0,
                    y: 0.0,
                    amount: 100.0,
                },
            ])
            .unwrap();

        assert!(!drawn);
        assert_eq!(session.controller().current_view(), DEFAULT_VIEW);
    }

    #[test]
    fn test_reset_view_redraws_default() {
        let mut session = session();
        session
            .handle_events([
                InputEvent::Resize(DeviceSize::new(8, 6)),
                InputEvent::Wheel {
                    x: 1.0,
                    y: 1.0,
                    amount: -200.0,
                },
            ])
            .unwrap();

        assert!(session.reset_view().unwrap());
        assert_eq!(session.pipeline().view(), Some(DEFAULT_VIEW));
        assert!(!session.reset_view().unwrap());
    }

    #[test]
    fn test_zoomed_out_frame_shows_exterior() {
        let mut session = session();
        session
            .handle_events([
                InputEvent::Resize(DeviceSize::new(8, 8)),
                InputEvent::Wheel {
                    x: 4.0,
                    y: 4.0,
                    amount: 4000.0,
                },
            ])
            .unwrap();

        // Zoomed out 11x, the corners sit far outside the set.
        let frame = session.pipeline().backend().framebuffer();
        assert_ne!(frame.pixel(0, 0).unwrap(), Colour::BLACK);
        assert_ne!(frame.pixel(7, 7).unwrap(), Colour::BLACK);
    }
}
