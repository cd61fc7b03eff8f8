//! Main GUI application loop.

use log::{error, info};
use winit::{
    dpi::LogicalSize,
    event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent},
    event_loop::{EventLoopBuilder, EventLoopWindowTarget},
    keyboard::{Key, NamedKey},
    window::{Window, WindowBuilder},
};

use crate::controllers::interactive::controller::{InteractionCommand, InteractionController};
use crate::controllers::interactive::data::frame_request::FrameRequest;
use crate::controllers::interactive::events::input_event::InputEvent;
use crate::controllers::interactive::render_worker::RenderWorker;
use crate::core::data::device_size::DeviceSize;
use crate::core::fractals::mandelbrot::mandelbrot_config::MandelbrotConfig;
use crate::input::gui::errors::GuiError;
use crate::input::gui::events::GuiEvent;
use crate::input::gui::translate::InputTranslator;
use crate::presenters::pixels::presenter::PixelsPresenter;

struct GuiApp {
    controller: InteractionController,
    worker: RenderWorker,
    presenter: PixelsPresenter,
    translator: InputTranslator,
}

impl GuiApp {
    fn dispatch(&mut self, event: InputEvent) {
        if let Some(command) = self.controller.handle_event(event) {
            self.execute(command);
        }
    }

    fn execute(&mut self, command: InteractionCommand) {
        let request = match command {
            InteractionCommand::Resize { size, view } => FrameRequest::new(view, size),
            InteractionCommand::Render(view) => match self.controller.device_size() {
                Some(size) => FrameRequest::new(view, size),
                None => return,
            },
        };

        self.worker.submit_request(request);
    }

    fn resize(&mut self, size: DeviceSize) -> Result<(), GuiError> {
        self.presenter.resize(size)?;
        self.dispatch(InputEvent::Resize(size));

        Ok(())
    }

    fn handle_window_event(
        &mut self,
        window: &Window,
        event: WindowEvent,
        elwt: &EventLoopWindowTarget<GuiEvent>,
    ) -> Result<(), GuiError> {
        match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(size) => {
                self.resize(DeviceSize::new(size.width, size.height))?;
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = window.inner_size();
                self.resize(DeviceSize::new(size.width, size.height))?;
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => self.dispatch(InputEvent::PointerDown),
                ElementState::Released => self.dispatch(InputEvent::PointerUp),
            },
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(event) = self.translator.cursor_moved(position.x, position.y) {
                    self.dispatch(event);
                }
            }
            WindowEvent::CursorLeft { .. } => self.translator.cursor_left(),
            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(event) = self.translator.wheel(delta) {
                    self.dispatch(event);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => match logical_key {
                Key::Named(NamedKey::Escape) => elwt.exit(),
                Key::Character(c) if c.eq_ignore_ascii_case("r") => {
                    if let Some(command) = self.controller.reset_view() {
                        self.execute(command);
                    }
                }
                _ => {}
            },
            WindowEvent::RedrawRequested => self.presenter.render()?,
            _ => {}
        }

        Ok(())
    }
}

/// Opens the viewer window and runs until it is closed.
///
/// Rendering happens on a background worker; finished frames wake the loop
/// through a [`GuiEvent`].
pub fn run_gui(config: MandelbrotConfig) -> Result<(), GuiError> {
    config.validate()?;

    let event_loop = EventLoopBuilder::<GuiEvent>::with_user_event().build()?;

    // Leak the window to get a 'static reference for pixels
    let window: &'static Window = Box::leak(Box::new(
        WindowBuilder::new()
            .with_title("Mandelbrot Viewer")
            .with_inner_size(LogicalSize::new(800.0, 600.0))
            .with_min_inner_size(LogicalSize::new(200.0, 200.0))
            .build(&event_loop)?,
    ));

    let presenter = PixelsPresenter::new(window, event_loop.create_proxy())?;
    let worker = RenderWorker::new(&config, presenter.frame_sink());

    let mut app = GuiApp {
        controller: InteractionController::default(),
        worker,
        presenter,
        translator: InputTranslator::default(),
    };

    let size = window.inner_size();
    app.dispatch(InputEvent::Resize(DeviceSize::new(size.width, size.height)));
    info!("viewer started at {}x{}", size.width, size.height);

    let mut failure: Option<GuiError> = None;

    event_loop.run(|event, elwt| match event {
        Event::WindowEvent { event, window_id } if window_id == window.id() => {
            if let Err(err) = app.handle_window_event(window, event, elwt) {
                error!("{err}");
                failure = Some(err);
                elwt.exit();
            }
        }
        Event::UserEvent(GuiEvent::FrameReady) => {
            if app.presenter.maybe_draw_frame() {
                window.request_redraw();
            }
        }
        _ => {}
    })?;

    app.worker.shutdown();

    failure.map_or(Ok(()), Err)
}
