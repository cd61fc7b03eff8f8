use log::{debug, info};

use crate::core::actions::render_frame::errors::RenderError;
use crate::core::actions::render_frame::ports::render_backend::{RenderBackend, UniformValue};
use crate::core::data::affine_transform::AffineTransform;
use crate::core::data::device_size::DeviceSize;
use crate::core::data::rect::Rect;
use crate::core::fractals::mandelbrot::mandelbrot_config::MandelbrotConfig;

pub const VERTEX_SHADER_SOURCE: &str = include_str!("../../../shaders/mandelbrot.vert");
pub const FRAGMENT_SHADER_SOURCE: &str = include_str!("../../../shaders/mandelbrot.frag");

/// Normalized device coordinates of the full viewport.
pub const NDC_RECT: Rect = Rect::new(-1.0, -1.0, 2.0, 2.0);

/// Triangle strip covering [`NDC_RECT`].
pub const FULL_VIEWPORT_QUAD: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]];

pub const PALETTE_TEXTURE_UNIT: u32 = 0;

pub const UNIFORM_VIEW_MATRIX: &str = "view_mat";
pub const UNIFORM_MAX_ITERATIONS: &str = "u_max_iterations";
pub const UNIFORM_COLOURING: &str = "u_colouring";
pub const UNIFORM_SMOOTH: &str = "u_smooth";
pub const UNIFORM_PALETTE_SAMPLER: &str = "u_palette_sampler";

/// Matrix taking normalized device coordinates onto `view`.
pub fn view_matrix(view: &Rect) -> Result<[f32; 9], RenderError> {
    Ok(AffineTransform::between(&NDC_RECT, view)?.to_column_major_f32())
}

/// Draws the set by running the bundled program over a full-viewport quad.
///
/// All one-off setup happens in [`RenderPipeline::new`]; per frame only the
/// view matrix changes.
pub struct RenderPipeline<B: RenderBackend> {
    backend: B,
    program: B::Program,
    config: MandelbrotConfig,
    viewport_size: DeviceSize,
    view: Option<Rect>,
}

impl<B: RenderBackend> RenderPipeline<B> {
    pub fn new(mut backend: B, config: MandelbrotConfig) -> Result<Self, RenderError> {
        config.validate()?;

        let program = backend.compile_program(VERTEX_SHADER_SOURCE, FRAGMENT_SHADER_SOURCE)?;
        backend.upload_geometry(&FULL_VIEWPORT_QUAD)?;
        backend.bind_palette(config.palette(), PALETTE_TEXTURE_UNIT)?;

        let max_iterations = i32::try_from(config.max_iterations).unwrap_or(i32::MAX);
        let uniforms = [
            (UNIFORM_MAX_ITERATIONS, UniformValue::Int(max_iterations)),
            (
                UNIFORM_COLOURING,
                UniformValue::Int(config.colour_map_kind.uniform_code()),
            ),
            (UNIFORM_SMOOTH, UniformValue::Int(i32::from(config.smooth))),
            (
                UNIFORM_PALETTE_SAMPLER,
                UniformValue::Sampler(PALETTE_TEXTURE_UNIT),
            ),
        ];

        for (name, value) in uniforms {
            backend.set_uniform(&program, name, value)?;
        }

        info!(
            "render pipeline ready: {} colouring, {} palette, {} iterations",
            config.colour_map_kind, config.palette_kind, config.max_iterations
        );

        Ok(Self {
            backend,
            program,
            config,
            viewport_size: DeviceSize::default(),
            view: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> &MandelbrotConfig {
        &self.config
    }

    #[must_use]
    pub fn viewport_size(&self) -> DeviceSize {
        self.viewport_size
    }

    #[must_use]
    pub fn view(&self) -> Option<Rect> {
        self.view
    }

    pub fn set_viewport_size(&mut self, size: DeviceSize) {
        if size != self.viewport_size {
            debug!("viewport resized to {}x{}", size.width, size.height);
            self.viewport_size = size;
            self.backend.set_viewport_size(size);
        }
    }

    pub fn set_view(&mut self, view: &Rect) -> Result<(), RenderError> {
        let matrix = view_matrix(view)?;

        self.backend
            .set_uniform(&self.program, UNIFORM_VIEW_MATRIX, UniformValue::Matrix3(matrix))?;
        self.view = Some(*view);

        Ok(())
    }

    /// Draws one frame. Returns `false` without drawing while the viewport is empty.
    pub fn render(&mut self) -> Result<bool, RenderError> {
        if self.viewport_size.is_empty() {
            debug!("skipping draw into empty viewport");
            return Ok(false);
        }

        self.backend.draw(&self.program)?;

        Ok(true)
    }

    /// Sets the view and draws in one step.
    pub fn render_view(&mut self, view: &Rect) -> Result<bool, RenderError> {
        self.set_view(view)?;
        self.render()
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::actions::render_frame::ports::render_backend::BackendError;
    use crate::core::data::palette::Palette;
    use std::sync::Arc;

    /// Records every call so tests can assert on what the pipeline asked for.
    #[derive(Default)]
    struct RecordingBackend {
        compiled: usize,
        geometry: Vec<[f32; 2]>,
        uniforms: Vec<(String, UniformValue)>,
        palette_unit: Option<u32>,
        viewport_sizes: Vec<DeviceSize>,
        draws: usize,
        fail_compile: bool,
    }

    impl RecordingBackend {
        fn last_uniform(&self, name: &str) -> Option<UniformValue> {
            self.uniforms
                .iter()
                .rev()
                .find(|(n, _)| n == name)
                .map(|(_, v)| *v)
        }
    }

    impl RenderBackend for RecordingBackend {
        type Program = ();

        fn compile_program(&mut self, vertex: &str, fragment: &str) -> Result<(), BackendError> {
            if self.fail_compile {
                return Err(BackendError::ShaderLink {
                    log: "varying mismatch".to_string(),
                });
            }

            assert!(vertex.contains(UNIFORM_VIEW_MATRIX));
            assert!(fragment.contains(UNIFORM_PALETTE_SAMPLER));
            self.compiled += 1;
            Ok(())
        }

        fn upload_geometry(&mut self, vertices: &[[f32; 2]]) -> Result<(), BackendError> {
            self.geometry = vertices.to_vec();
            Ok(())
        }

        fn set_uniform(&mut self, _: &(), name: &str, value: UniformValue) -> Result<(), BackendError> {
            self.uniforms.push((name.to_string(), value));
            Ok(())
        }

        fn bind_palette(&mut self, _: Arc<Palette>, unit: u32) -> Result<(), BackendError> {
            self.palette_unit = Some(unit);
            Ok(())
        }

        fn draw(&mut self, _: &()) -> Result<(), BackendError> {
            self.draws += 1;
            Ok(())
        }

        fn set_viewport_size(&mut self, size: DeviceSize) {
            self.viewport_sizes.push(size);
        }
    }

    #[test]
    fn test_new_performs_one_off_setup() {
        let pipeline = RenderPipeline::new(RecordingBackend::default(), MandelbrotConfig::default())
            .unwrap();
        let backend = pipeline.backend();

        assert_eq!(backend.compiled, 1);
        assert_eq!(backend.geometry, FULL_VIEWPORT_QUAD.to_vec());
        assert_eq!(backend.palette_unit, Some(PALETTE_TEXTURE_UNIT));
        assert_eq!(
            backend.last_uniform(UNIFORM_MAX_ITERATIONS),
            Some(UniformValue::Int(200))
        );
        assert_eq!(
            backend.last_uniform(UNIFORM_PALETTE_SAMPLER),
            Some(UniformValue::Sampler(0))
        );
        assert_eq!(backend.last_uniform(UNIFORM_VIEW_MATRIX), None);
        assert_eq!(backend.draws, 0);
    }

    #[test]
    fn test_compile_failure_is_surfaced() {
        let backend = RecordingBackend {
            fail_compile: true,
            ..RecordingBackend::default()
        };
        let result = RenderPipeline::new(backend, MandelbrotConfig::default());

        assert!(matches!(
            result,
            Err(RenderError::Backend(BackendError::ShaderLink { .. }))
        ));
    }

    #[test]
    fn test_zero_iterations_is_rejected_before_compiling() {
        let config = MandelbrotConfig {
            max_iterations: 0,
            ..MandelbrotConfig::default()
        };

        assert!(matches!(
            RenderPipeline::new(RecordingBackend::default(), config),
            Err(RenderError::Config(_))
        ));
    }

    #[test]
    fn test_render_uploads_view_matrix_and_draws() {
        let mut pipeline =
            RenderPipeline::new(RecordingBackend::default(), MandelbrotConfig::default()).unwrap();
        let view = Rect::new(-2.0, -1.25, 2.75, 2.5);

        pipeline.set_viewport_size(DeviceSize::new(800, 600));
        assert!(pipeline.render_view(&view).unwrap());

        let expected = AffineTransform::between(&NDC_RECT, &view)
            .unwrap()
            .to_column_major_f32();

        assert_eq!(
            pipeline.backend().last_uniform(UNIFORM_VIEW_MATRIX),
            Some(UniformValue::Matrix3(expected))
        );
        assert_eq!(pipeline.backend().draws, 1);
        assert_eq!(pipeline.view(), Some(view));
    }

    #[test]
    fn test_view_matrix_maps_ndc_corners() {
        let m = view_matrix(&Rect::new(-2.0, -1.0, 4.0, 2.0)).unwrap();

        // Column-major: scale on the diagonal, translation in the last column.
        assert_eq!(m, [2.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_empty_viewport_skips_draw() {
        let mut pipeline =
            RenderPipeline::new(RecordingBackend::default(), MandelbrotConfig::default()).unwrap();

        assert!(!pipeline.render_view(&Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap());
        assert_eq!(pipeline.backend().draws, 0);
    }

    #[test]
    fn test_viewport_size_is_forwarded_once_per_change() {
        let mut pipeline =
            RenderPipeline::new(RecordingBackend::default(), MandelbrotConfig::default()).unwrap();

        pipeline.set_viewport_size(DeviceSize::new(10, 10));
        pipeline.set_viewport_size(DeviceSize::new(10, 10));
        pipeline.set_viewport_size(DeviceSize::new(20, 10));

        assert_eq!(
            pipeline.backend().viewport_sizes,
            vec![DeviceSize::new(10, 10), DeviceSize::new(20, 10)]
        );
    }

    #[test]
    fn test_degenerate_view_is_rejected() {
        let mut pipeline =
            RenderPipeline::new(RecordingBackend::default(), MandelbrotConfig::default()).unwrap();

        assert!(matches!(
            pipeline.set_view(&Rect::new(0.0, 0.0, 1.0, 0.0)),
            Err(RenderError::DegenerateRect(_))
        ));
        assert_eq!(pipeline.view(), None);
    }
}
