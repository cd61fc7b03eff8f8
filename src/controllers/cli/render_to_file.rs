use std::path::Path;
use std::time::Instant;

use log::info;
use thiserror::Error;

use crate::adapters::backend::gpu::GpuBackend;
use crate::adapters::backend::software::SoftwareBackend;
use crate::controllers::interactive::controller::InteractionController;
use crate::controllers::interactive::events::input_event::InputEvent;
use crate::controllers::interactive::session::MandelbrotSession;
use crate::controllers::ports::file_presenter::FilePresenterPort;
use crate::core::actions::render_frame::errors::RenderError;
use crate::core::actions::render_frame::ports::render_backend::RenderBackend;
use crate::core::actions::render_frame::render_cpu::render_frame_cpu;
use crate::core::actions::render_frame::render_pipeline::RenderPipeline;
use crate::core::data::device_size::DeviceSize;
use crate::core::data::pixel_buffer::PixelBuffer;
use crate::core::data::rect::Rect;
use crate::core::data::viewport_state::{DEFAULT_VIEW, ViewportError, ViewportState};
use crate::core::fractals::mandelbrot::mandelbrot_config::MandelbrotConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderStrategy {
    /// Sequential loop over device pixels.
    #[default]
    Cpu,
    /// The bundled program on a wgpu device.
    Gpu,
    /// The bundled program's interface on the in-process software backend.
    Software,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliRenderOptions {
    pub size: DeviceSize,
    pub view: Rect,
    pub config: MandelbrotConfig,
    pub strategy: RenderStrategy,
    /// Replayed after the initial resize, as if a user had produced them.
    pub events: Vec<InputEvent>,
}

impl Default for CliRenderOptions {
    fn default() -> Self {
        Self {
            size: DeviceSize::new(800, 600),
            view: DEFAULT_VIEW,
            config: MandelbrotConfig::default(),
            strategy: RenderStrategy::default(),
            events: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("image size must be non-zero, got {}x{}", .0.width, .0.height)]
    EmptyImage(DeviceSize),
    #[error("invalid view: {0}")]
    InvalidView(#[from] ViewportError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("nothing rendered yet")]
    NoFrame,
    #[error("failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

/// Drives `events` through a session on `backend`; returns the final view
/// and the backend holding the last frame.
fn replay<B: RenderBackend>(
    backend: B,
    controller: InteractionController,
    events: impl IntoIterator<Item = InputEvent>,
    config: MandelbrotConfig,
) -> Result<(Rect, B), RenderError> {
    let pipeline = RenderPipeline::new(backend, config)?;
    let mut session = MandelbrotSession::new(controller, pipeline);
    session.handle_events(events)?;

    let (controller, pipeline) = session.into_parts();

    Ok((controller.current_view(), pipeline.into_backend()))
}

/// Renders a single frame headlessly and hands it to a file presenter.
pub struct CliRenderController<P: FilePresenterPort> {
    presenter: P,
    buffer: Option<PixelBuffer>,
    final_view: Option<Rect>,
}

impl<P: FilePresenterPort> CliRenderController<P> {
    pub fn new(presenter: P) -> Self {
        Self {
            presenter,
            buffer: None,
            final_view: None,
        }
    }

    #[must_use]
    pub fn buffer(&self) -> Option<&PixelBuffer> {
        self.buffer.as_ref()
    }

    /// View the last frame was rendered at, after replaying input events.
    #[must_use]
    pub fn final_view(&self) -> Option<Rect> {
        self.final_view
    }

    pub fn generate(&mut self, options: &CliRenderOptions) -> Result<&PixelBuffer, CliError> {
        if options.size.is_empty() {
            return Err(CliError::EmptyImage(options.size));
        }

        options.config.validate().map_err(RenderError::from)?;

        let controller = InteractionController::new(ViewportState::new(options.view)?);
        let events = std::iter::once(InputEvent::Resize(options.size))
            .chain(options.events.iter().copied());

        info!(
            "rendering {}x{} with {:?} strategy, {} iterations",
            options.size.width,
            options.size.height,
            options.strategy,
            options.config.max_iterations
        );

        let start = Instant::now();

        let (view, buffer) = match options.strategy {
            RenderStrategy::Cpu => {
                let mut controller = controller;
                for event in events {
                    controller.handle_event(event);
                }

                let view = controller.current_view();
                let colour_map = options.config.build_colour_map(options.config.palette());
                let buffer = render_frame_cpu(
                    &view,
                    options.size,
                    options.config.max_iterations,
                    colour_map.as_ref(),
                )?;

                (view, buffer)
            }
            RenderStrategy::Gpu => {
                let backend = GpuBackend::new().map_err(RenderError::from)?;
                let (view, backend) = replay(backend, controller, events, options.config)?;
                (view, backend.into_framebuffer())
            }
            RenderStrategy::Software => {
                let (view, backend) =
                    replay(SoftwareBackend::new(), controller, events, options.config)?;
                (view, backend.into_framebuffer())
            }
        };

        info!("rendered {view:?} in {:?}", start.elapsed());

        self.final_view = Some(view);
        self.buffer = Some(buffer);

        self.buffer.as_ref().ok_or(CliError::NoFrame)
    }

    pub fn write(&self, filepath: &Path) -> Result<(), CliError> {
        let buffer = self.buffer.as_ref().ok_or(CliError::NoFrame)?;

        self.presenter.present(buffer, filepath)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use crate::core::data::pixel_buffer::BYTES_PER_PIXEL;

    #[derive(Default)]
    struct RecordingPresenter {
        written: Mutex<Vec<(PathBuf, DeviceSize)>>,
    }

    impl FilePresenterPort for RecordingPresenter {
        fn present(&self, buffer: &PixelBuffer, filepath: &Path) -> std::io::Result<()> {
            self.written
                .lock()
                .unwrap()
                .push((filepath.to_path_buf(), buffer.size()));
            Ok(())
        }
    }

    fn options(strategy: RenderStrategy) -> CliRenderOptions {
        CliRenderOptions {
            size: DeviceSize::new(48, 36),
            config: MandelbrotConfig {
                max_iterations: 48,
                ..MandelbrotConfig::default()
            },
            strategy,
            ..CliRenderOptions::default()
        }
    }

    #[test]
    fn test_generate_then_write() {
        let mut controller = CliRenderController::new(RecordingPresenter::default());

        let buffer = controller.generate(&options(RenderStrategy::Cpu)).unwrap();
        assert_eq!(buffer.buffer().len(), 48 * 36 * BYTES_PER_PIXEL);

        controller.write(Path::new("out/frame.ppm")).unwrap();

        assert_eq!(
            *controller.presenter.written.lock().unwrap(),
            vec![(PathBuf::from("out/frame.ppm"), DeviceSize::new(48, 36))]
        );
        assert_eq!(controller.final_view(), Some(DEFAULT_VIEW));
    }

    #[test]
    fn test_write_before_generate_fails() {
        let controller = CliRenderController::new(RecordingPresenter::default());

        assert!(matches!(
            controller.write(Path::new("never.ppm")),
            Err(CliError::NoFrame)
        ));
    }

    #[test]
    fn test_strategies_agree() {
        let mut cpu = CliRenderController::new(RecordingPresenter::default());
        let mut software = CliRenderController::new(RecordingPresenter::default());

        let a = cpu.generate(&options(RenderStrategy::Cpu)).unwrap().clone();
        let b = software
            .generate(&options(RenderStrategy::Software))
            .unwrap()
            .clone();

        let matching = a
            .buffer()
            .chunks_exact(BYTES_PER_PIXEL)
            .zip(b.buffer().chunks_exact(BYTES_PER_PIXEL))
            .filter(|(x, y)| x == y)
            .count();

        assert!(matching as f64 >= 0.98 * a.size().pixel_count() as f64);
    }

    #[test]
    fn test_gpu_strategy_agrees_when_a_device_exists() {
        if GpuBackend::new().is_err() {
            return;
        }

        let mut cpu = CliRenderController::new(RecordingPresenter::default());
        let mut gpu = CliRenderController::new(RecordingPresenter::default());

        let a = cpu.generate(&options(RenderStrategy::Cpu)).unwrap().clone();
        let b = gpu.generate(&options(RenderStrategy::Gpu)).unwrap().clone();

        assert_eq!(b.size(), a.size());
        assert_ne!(b.buffer(), PixelBuffer::new(b.size()).buffer());
    }

    #[test]
    fn test_replayed_events_move_the_view() {
        let mut options = options(RenderStrategy::Cpu);
        options.events = vec![
            InputEvent::Wheel {
                x: 24.0,
                y: 18.0,
                amount: -200.0,
            },
            InputEvent::PointerDown,
            InputEvent::PointerMove { dx: 4.0, dy: 0.0 },
            InputEvent::PointerUp,
        ];

        let mut cpu = CliRenderController::new(RecordingPresenter::default());
        let mut software = CliRenderController::new(RecordingPresenter::default());
        cpu.generate(&options).unwrap();
        options.strategy = RenderStrategy::Software;
        software.generate(&options).unwrap();

        let view = cpu.final_view().unwrap();
        assert_eq!(view.width(), DEFAULT_VIEW.width() / 2.0);
        assert!(view.x() < DEFAULT_VIEW.center().x);
        assert_eq!(software.final_view(), Some(view));
    }

    #[test]
    fn test_rejects_bad_input() {
        let mut controller = CliRenderController::new(RecordingPresenter::default());

        let mut empty = options(RenderStrategy::Cpu);
        empty.size = DeviceSize::new(0, 10);
        assert!(matches!(
            controller.generate(&empty),
            Err(CliError::EmptyImage(_))
        ));

        let mut degenerate = options(RenderStrategy::Cpu);
        degenerate.view = Rect::new(0.0, 0.0, 1.0, 0.0);
        assert!(matches!(
            controller.generate(&degenerate),
            Err(CliError::InvalidView(_))
        ));

        let mut zero_iterations = options(RenderStrategy::Software);
        zero_iterations.config.max_iterations = 0;
        assert!(matches!(
            controller.generate(&zero_iterations),
            Err(CliError::Render(RenderError::Config(_)))
        ));
    }
}
