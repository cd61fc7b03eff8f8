use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use log::{debug, trace, warn};

use crate::controllers::interactive::data::frame_data::FrameData;
use crate::controllers::interactive::data::frame_request::FrameRequest;
use crate::controllers::interactive::errors::render_failure::RenderFailure;
use crate::controllers::interactive::events::render_event::RenderEvent;
use crate::controllers::interactive::ports::frame_sink::FrameSink;
use crate::core::actions::cancellation::GenerationToken;
use crate::core::actions::render_frame::errors::RenderError;
use crate::core::actions::render_frame::render_cpu::render_frame_cpu_cancelable;
use crate::core::fractals::mandelbrot::colour_mapping::map::ColourMap;
use crate::core::fractals::mandelbrot::mandelbrot_config::MandelbrotConfig;

struct SharedState {
    generation: AtomicU64,
    last_completed_generation: AtomicU64,
    latest_request: Mutex<Option<(u64, FrameRequest)>>,
    wake: Condvar,
    shutdown: AtomicBool,
    max_iterations: u32,
    colour_map: Arc<dyn ColourMap>,
    frame_sink: Arc<dyn FrameSink>,
}

impl SharedState {
    fn lock_request(&self) -> MutexGuard<'_, Option<(u64, FrameRequest)>> {
        self.latest_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Renders frames on a background thread, latest request wins.
///
/// Submitting a request bumps the generation; the frame in flight notices on
/// its next cancellation check and is dropped without an event. Only frames
/// whose generation is still current reach the [`FrameSink`].
pub struct RenderWorker {
    shared: Arc<SharedState>,
    worker: Option<JoinHandle<()>>,
}

impl RenderWorker {
    pub fn new(config: &MandelbrotConfig, frame_sink: Arc<dyn FrameSink>) -> Self {
        let shared = Arc::new(SharedState {
            generation: AtomicU64::new(0),
            last_completed_generation: AtomicU64::new(0),
            latest_request: Mutex::new(None),
            wake: Condvar::new(),
            shutdown: AtomicBool::new(false),
            max_iterations: config.max_iterations,
            colour_map: Arc::from(config.build_colour_map(config.palette())),
            frame_sink,
        });

        let worker_shared = Arc::clone(&shared);

        let worker = thread::spawn(move || {
            Self::worker_loop(&worker_shared);
        });

        Self {
            shared,
            worker: Some(worker),
        }
    }

    pub fn submit_request(&self, request: FrameRequest) -> u64 {
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;

        *self.shared.lock_request() = Some((generation, request));
        self.shared.wake.notify_one();

        trace!("submitted render {generation}: {request:?}");

        generation
    }

    pub fn shutdown(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        self.shared.wake.notify_one();

        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("render worker panicked");
            }
        }
    }

    #[must_use]
    pub fn last_completed_generation(&self) -> u64 {
        self.shared
            .last_completed_generation
            .load(Ordering::Acquire)
    }

    fn worker_loop(shared: &Arc<SharedState>) {
        loop {
            let (job_generation, request) = {
                let mut guard = shared.lock_request();
                loop {
                    if shared.shutdown.load(Ordering::Acquire) {
                        return;
                    }

                    if let Some(req) = guard.take() {
                        break req;
                    }

                    guard = shared
                        .wake
                        .wait(guard)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            };

            let cancel_token =
                GenerationToken::new(job_generation, &shared.generation, &shared.shutdown);

            let start = Instant::now();
            let result = render_frame_cpu_cancelable(
                &request.view,
                request.size,
                shared.max_iterations,
                shared.colour_map.as_ref(),
                &cancel_token,
            );
            let render_duration = start.elapsed();

            if job_generation != shared.generation.load(Ordering::Acquire) {
                debug!("render {job_generation} superseded");
                continue;
            }

            let event = match result {
                Ok(pixel_buffer) => {
                    trace!("render {job_generation} took {render_duration:?}");
                    RenderEvent::Frame(FrameData {
                        generation: job_generation,
                        view: request.view,
                        pixel_buffer,
                        render_duration,
                    })
                }
                Err(RenderError::Cancelled(_)) => continue,
                Err(err) => {
                    warn!("render {job_generation} failed: {err}");
                    RenderEvent::Error(RenderFailure {
                        generation: job_generation,
                        message: err.to_string(),
                    })
                }
            };

            shared.frame_sink.submit(event);
            shared
                .last_completed_generation
                .store(job_generation, Ordering::Release);
        }
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::core::data::device_size::DeviceSize;
    use crate::core::data::pixel_buffer::BYTES_PER_PIXEL;
    use crate::core::data::rect::Rect;
    use crate::core::data::viewport_state::DEFAULT_VIEW;

    #[derive(Default)]
    struct MockFrameSink {
        events: Mutex<Vec<RenderEvent>>,
    }

    impl MockFrameSink {
        fn take_events(&self) -> Vec<RenderEvent> {
            let mut guard = self.events.lock().unwrap();
            std::mem::take(&mut *guard)
        }
    }

    impl FrameSink for MockFrameSink {
        fn submit(&self, event: RenderEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn wait_for_events(sink: &MockFrameSink, timeout: Duration) -> Vec<RenderEvent> {
        let start = Instant::now();
        loop {
            let events = sink.take_events();
            if !events.is_empty() || start.elapsed() >= timeout {
                return events;
            }
            thread::sleep(Duration::from_millis(10));
        }
    }

    fn worker(sink: &Arc<MockFrameSink>) -> RenderWorker {
        let config = MandelbrotConfig {
            max_iterations: 20,
            ..MandelbrotConfig::default()
        };

        RenderWorker::new(&config, Arc::clone(sink) as Arc<dyn FrameSink>)
    }

    fn small_request() -> FrameRequest {
        FrameRequest::new(DEFAULT_VIEW, DeviceSize::new(4, 3))
    }

    #[test]
    fn test_submit_request_emits_frame() {
        let sink = Arc::new(MockFrameSink::default());
        let mut worker = worker(&sink);

        let generation = worker.submit_request(small_request());
        let events = wait_for_events(&sink, Duration::from_secs(2));

        assert!(!events.is_empty(), "expected a render event");

        for event in events {
            match event {
                RenderEvent::Frame(frame) => {
                    assert_eq!(frame.generation, generation);
                    assert_eq!(frame.view, DEFAULT_VIEW);
                    assert_eq!(frame.pixel_buffer.size(), DeviceSize::new(4, 3));
                    assert_eq!(frame.pixel_buffer.buffer().len(), 4 * 3 * BYTES_PER_PIXEL);
                }
                RenderEvent::Error(error) => panic!("unexpected render error: {error}"),
            }
        }

        worker.shutdown();
    }

    #[test]
    fn test_generation_ids_increment() {
        let sink = Arc::new(MockFrameSink::default());
        let mut worker = worker(&sink);

        worker.submit_request(small_request());
        let gen_a = wait_for_events(&sink, Duration::from_secs(2))[0].generation();

        worker.submit_request(small_request());
        let gen_b = wait_for_events(&sink, Duration::from_secs(2))[0].generation();

        assert!(gen_b > gen_a, "generation {gen_b} should follow {gen_a}");

        worker.shutdown();
    }

    #[test]
    fn test_last_completed_generation_tracks_frames() {
        let sink = Arc::new(MockFrameSink::default());
        let mut worker = worker(&sink);

        assert_eq!(worker.last_completed_generation(), 0);

        let generation = worker.submit_request(small_request());
        let events = wait_for_events(&sink, Duration::from_secs(2));

        assert_eq!(events[0].generation(), generation);
        assert_eq!(worker.last_completed_generation(), generation);

        worker.shutdown();
    }

    #[test]
    fn test_degenerate_view_reports_error() {
        let sink = Arc::new(MockFrameSink::default());
        let mut worker = worker(&sink);

        let generation = worker.submit_request(FrameRequest::new(
            Rect::new(0.0, 0.0, 0.0, 1.0),
            DeviceSize::new(4, 4),
        ));
        let events = wait_for_events(&sink, Duration::from_secs(2));

        match &events[..] {
            [RenderEvent::Error(error)] => assert_eq!(error.generation, generation),
            other => panic!("expected one error event, got {other:?}"),
        }
        assert_eq!(worker.last_completed_generation(), generation);

        worker.shutdown();
    }

    #[test]
    fn test_rapid_requests_emit_no_cancellation_errors() {
        let sink = Arc::new(MockFrameSink::default());
        let mut worker = worker(&sink);
        let big = FrameRequest::new(DEFAULT_VIEW, DeviceSize::new(320, 240));

        let mut last_generation = 0;
        for _ in 0..5 {
            last_generation = worker.submit_request(big);
        }

        let start = Instant::now();
        while worker.last_completed_generation() != last_generation
            && start.elapsed() < Duration::from_secs(5)
        {
            thread::sleep(Duration::from_millis(10));
        }

        let events = sink.take_events();

        assert!(events.iter().all(|e| matches!(e, RenderEvent::Frame(_))));
        assert_eq!(
            events.iter().map(RenderEvent::generation).max(),
            Some(last_generation)
        );

        worker.shutdown();
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let sink = Arc::new(MockFrameSink::default());
        let mut worker = worker(&sink);

        worker.shutdown();
        worker.shutdown();

        assert!(sink.take_events().is_empty());
    }
}
