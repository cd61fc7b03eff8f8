use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, trace};
use rayon::prelude::*;

use crate::adapters::backend::geometry::TriangleStrip;
use crate::adapters::backend::glsl::{LinkedProgram, compile_program};
use crate::core::actions::render_frame::fragment::{pixel_center, shade_point};
use crate::core::actions::render_frame::ports::render_backend::{
    BackendError, RenderBackend, UniformValue,
};
use crate::core::actions::render_frame::render_pipeline::{
    NDC_RECT, UNIFORM_COLOURING, UNIFORM_MAX_ITERATIONS, UNIFORM_SMOOTH, UNIFORM_VIEW_MATRIX,
};
use crate::core::data::affine_transform::AffineTransform;
use crate::core::data::colour::Colour;
use crate::core::data::device_size::DeviceSize;
use crate::core::data::palette::Palette;
use crate::core::data::pixel_buffer::{BYTES_PER_PIXEL, PixelBuffer};
use crate::core::data::point::Point;
use crate::core::fractals::mandelbrot::colour_mapping::factory::colour_map_factory;
use crate::core::fractals::mandelbrot::colour_mapping::kinds::ColourMapKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftwareProgram(usize);

#[derive(Debug)]
struct ProgramState {
    linked: LinkedProgram,
    values: HashMap<String, UniformValue>,
}

impl ProgramState {
    fn value(&self, name: &str) -> Result<UniformValue, BackendError> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| BackendError::MissingUniform(name.to_string()))
    }

    fn int(&self, name: &str) -> Result<i32, BackendError> {
        match self.value(name)? {
            UniformValue::Int(v) => Ok(v),
            other => Err(type_mismatch(name, "int", &other)),
        }
    }
}

fn type_mismatch(name: &str, declared: &'static str, value: &UniformValue) -> BackendError {
    BackendError::UniformTypeMismatch {
        name: name.to_string(),
        declared,
        assigned: value.type_name(),
    }
}

/// In-process stand-in for a graphics device.
///
/// Programs go through the same naga compile, validate and link step as on
/// [`GpuBackend`](crate::adapters::backend::gpu::GpuBackend), and uniforms
/// are checked against the reflected interface. Shading does not execute the
/// program: covered fragments are evaluated by the Rust escape-time loop and
/// colour maps, with the interpolated plane position rounded to single
/// precision as the varying would be. Rows are shaded in parallel.
#[derive(Debug)]
pub struct SoftwareBackend {
    programs: Vec<ProgramState>,
    geometry: Option<TriangleStrip>,
    palettes: HashMap<u32, Arc<Palette>>,
    framebuffer: PixelBuffer,
}

impl SoftwareBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            programs: Vec::new(),
            geometry: None,
            palettes: HashMap::new(),
            framebuffer: PixelBuffer::new(DeviceSize::default()),
        }
    }

    /// Result of the last draw.
    #[must_use]
    pub fn framebuffer(&self) -> &PixelBuffer {
        &self.framebuffer
    }

    #[must_use]
    pub fn into_framebuffer(self) -> PixelBuffer {
        self.framebuffer
    }

    fn program(&self, program: &SoftwareProgram) -> Result<&ProgramState, BackendError> {
        self.programs.get(program.0).ok_or(BackendError::UnknownProgram)
    }
}

impl Default for SoftwareBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for SoftwareBackend {
    type Program = SoftwareProgram;

    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<SoftwareProgram, BackendError> {
        let linked = compile_program(vertex_source, fragment_source)?;

        debug!(
            "linked program {} with {} uniforms",
            self.programs.len(),
            linked.uniforms.len()
        );

        self.programs.push(ProgramState {
            linked,
            values: HashMap::new(),
        });

        Ok(SoftwareProgram(self.programs.len() - 1))
    }

    fn upload_geometry(&mut self, vertices: &[[f32; 2]]) -> Result<(), BackendError> {
        self.geometry = Some(TriangleStrip::new(vertices)?);

        Ok(())
    }

    fn set_uniform(
        &mut self,
        program: &SoftwareProgram,
        name: &str,
        value: UniformValue,
    ) -> Result<(), BackendError> {
        let state = self
            .programs
            .get_mut(program.0)
            .ok_or(BackendError::UnknownProgram)?;

        let uniform = state
            .linked
            .uniform(name)
            .ok_or_else(|| BackendError::UnknownUniform(name.to_string()))?;

        if !uniform.ty.accepts(&value) {
            return Err(type_mismatch(name, uniform.ty.name(), &value));
        }

        state.values.insert(name.to_string(), value);

        Ok(())
    }

    fn bind_palette(&mut self, palette: Arc<Palette>, unit: u32) -> Result<(), BackendError> {
        self.palettes.insert(unit, palette);

        Ok(())
    }

    fn draw(&mut self, program: &SoftwareProgram) -> Result<(), BackendError> {
        let state = self.program(program)?;
        let geometry = self.geometry.as_ref().ok_or(BackendError::MissingGeometry)?;

        if let Some(unset) = state
            .linked
            .uniforms
            .iter()
            .find(|u| !state.values.contains_key(&u.name))
        {
            return Err(BackendError::MissingUniform(unset.name.clone()));
        }

        let view = match state.value(UNIFORM_VIEW_MATRIX)? {
            UniformValue::Matrix3(m) => AffineTransform::from_column_major_f32(&m),
            other => return Err(type_mismatch(UNIFORM_VIEW_MATRIX, "mat3", &other)),
        };

        let max_iterations = u32::try_from(state.int(UNIFORM_MAX_ITERATIONS)?).map_err(|_| {
            BackendError::InvalidUniformValue {
                name: UNIFORM_MAX_ITERATIONS.to_string(),
                reason: "must not be negative".to_string(),
            }
        })?;

        let colouring = state.int(UNIFORM_COLOURING)?;
        let kind = ColourMapKind::from_uniform_code(colouring).ok_or_else(|| {
            BackendError::InvalidUniformValue {
                name: UNIFORM_COLOURING.to_string(),
                reason: format!("unknown colouring code {colouring}"),
            }
        })?;

        let smooth = state.int(UNIFORM_SMOOTH)? != 0;

        let sampler = state
            .linked
            .sampler()
            .ok_or_else(|| BackendError::MissingUniform(state.linked.texture.name.clone()))?;
        let unit = match state.value(&sampler.name)? {
            UniformValue::Sampler(unit) => unit,
            other => return Err(type_mismatch(&sampler.name, "sampler", &other)),
        };
        let palette = self
            .palettes
            .get(&unit)
            .cloned()
            .ok_or(BackendError::MissingPalette(unit))?;

        let size = self.framebuffer.size();

        if size.is_empty() {
            return Ok(());
        }

        let device_to_ndc = AffineTransform::between(&size.rect(), &NDC_RECT)?;
        let colour_map = colour_map_factory(kind, max_iterations, smooth, palette);
        let colour_map = colour_map.as_ref();
        let row_bytes = size.width as usize * BYTES_PER_PIXEL;

        trace!(
            "software draw {}x{}, {} colouring",
            size.width, size.height, kind
        );

        self.framebuffer
            .buffer_mut()
            .par_chunks_mut(row_bytes)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, pixel) in row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
                    let ndc = device_to_ndc.apply(pixel_center(x as u32, y as u32));

                    let colour = if geometry.contains(ndc) {
                        let plane = view.apply(ndc);
                        let varying = Point::new(
                            f64::from(plane.x as f32),
                            f64::from(plane.y as f32),
                        );
                        shade_point(varying, max_iterations, colour_map)
                    } else {
                        Colour::BLACK
                    };

                    pixel.copy_from_slice(&[colour.r, colour.g, colour.b, colour.a]);
                }
            });

        Ok(())
    }

    fn set_viewport_size(&mut self, size: DeviceSize) {
        self.framebuffer.resize(size);
    }
}
