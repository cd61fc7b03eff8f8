use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use pixels::{Pixels, SurfaceTexture};
use winit::event_loop::EventLoopProxy;
use winit::window::Window;

use crate::controllers::interactive::data::frame_data::FrameData;
use crate::controllers::interactive::events::render_event::RenderEvent;
use crate::controllers::interactive::ports::frame_sink::FrameSink;
use crate::core::data::device_size::DeviceSize;
use crate::input::gui::events::GuiEvent;
use crate::presenters::pixels::adapter::PixelsFrameSink;

/// Shows worker frames in the window through a `pixels` surface.
pub struct PixelsPresenter {
    pixels: Pixels<'static>,
    sink: Arc<PixelsFrameSink>,
    size: DeviceSize,
    last_presented_generation: u64,
    last_render_duration: Option<Duration>,
}

impl PixelsPresenter {
    pub fn new(
        window: &'static Window,
        event_loop_proxy: EventLoopProxy<GuiEvent>,
    ) -> Result<Self, pixels::Error> {
        let size = window.inner_size();
        let surface_texture = SurfaceTexture::new(size.width, size.height, window);
        let pixels = Pixels::new(size.width.max(1), size.height.max(1), surface_texture)?;

        Ok(Self {
            pixels,
            sink: Arc::new(PixelsFrameSink::new(event_loop_proxy)),
            size: DeviceSize::new(size.width, size.height),
            last_presented_generation: 0,
            last_render_duration: None,
        })
    }

    pub fn frame_sink(&self) -> Arc<dyn FrameSink> {
        Arc::clone(&self.sink) as Arc<dyn FrameSink>
    }

    #[must_use]
    pub fn last_render_duration(&self) -> Option<Duration> {
        self.last_render_duration
    }

    pub fn resize(&mut self, size: DeviceSize) -> Result<(), pixels::TextureError> {
        if size == self.size || size.is_empty() {
            return Ok(());
        }

        self.pixels.resize_surface(size.width, size.height)?;
        self.pixels.resize_buffer(size.width, size.height)?;
        self.size = size;
        self.clear();

        Ok(())
    }

    /// Copies the newest finished frame into the surface. Returns whether a
    /// redraw is needed.
    pub fn maybe_draw_frame(&mut self) -> bool {
        match self.sink.take_render_event() {
            Some(RenderEvent::Frame(frame)) => self.draw_frame(&frame),
            Some(RenderEvent::Error(error)) => {
                if error.generation > self.last_presented_generation {
                    warn!("{error}");
                }
                false
            }
            None => false,
        }
    }

    pub fn render(&mut self) -> Result<(), pixels::Error> {
        if self.size.is_empty() {
            return Ok(());
        }

        self.pixels.render()
    }

    fn draw_frame(&mut self, frame: &FrameData) -> bool {
        if frame.generation <= self.last_presented_generation {
            return false;
        }

        if frame.pixel_buffer.size() != self.size {
            debug!(
                "dropping frame {} rendered for {:?}, window is {:?}",
                frame.generation,
                frame.pixel_buffer.size(),
                self.size
            );
            return false;
        }

        self.pixels
            .frame_mut()
            .copy_from_slice(frame.pixel_buffer.buffer());
        self.last_presented_generation = frame.generation;
        self.last_render_duration = Some(frame.render_duration);

        true
    }

    fn clear(&mut self) {
        for pixel in self.pixels.frame_mut().chunks_exact_mut(4) {
            pixel.copy_from_slice(&[0, 0, 0, 255]);
        }
    }
}
