use std::sync::Arc;

use thiserror::Error;

use crate::core::data::affine_transform::DegenerateRectError;
use crate::core::data::device_size::DeviceSize;
use crate::core::data::palette::Palette;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error("failed to compile {stage} shader: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },
    #[error("failed to link shader program: {log}")]
    ShaderLink { log: String },
    #[error("unknown program handle")]
    UnknownProgram,
    #[error("program has no active uniform named `{0}`")]
    UnknownUniform(String),
    #[error("uniform `{name}` is declared as {declared}, cannot assign {assigned}")]
    UniformTypeMismatch {
        name: String,
        declared: &'static str,
        assigned: &'static str,
    },
    #[error("uniform `{name}` holds an invalid value: {reason}")]
    InvalidUniformValue { name: String, reason: String },
    #[error("uniform `{0}` was never set")]
    MissingUniform(String),
    #[error("no geometry uploaded")]
    MissingGeometry,
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("no palette bound to texture unit {0}")]
    MissingPalette(u32),
    #[error("invalid viewport: {0}")]
    InvalidViewport(#[from] DegenerateRectError),
    #[error("no graphics device available: {0}")]
    Unavailable(String),
    #[error("graphics device error: {0}")]
    Device(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// Column-major 3x3 matrix.
    Matrix3([f32; 9]),
    /// Texture unit index.
    Sampler(u32),
    Int(i32),
    Float(f32),
}

impl UniformValue {
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Matrix3(_) => "mat3",
            Self::Sampler(_) => "sampler",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
        }
    }
}

/// Capabilities the render pipeline needs from a graphics backend.
///
/// Calls happen on the single render timeline; a backend never sees two
/// frames interleaved.
pub trait RenderBackend {
    type Program;

    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self::Program, BackendError>;

    /// Uploads a triangle strip in normalized device coordinates.
    fn upload_geometry(&mut self, vertices: &[[f32; 2]]) -> Result<(), BackendError>;

    fn set_uniform(
        &mut self,
        program: &Self::Program,
        name: &str,
        value: UniformValue,
    ) -> Result<(), BackendError>;

    fn bind_palette(&mut self, palette: Arc<Palette>, unit: u32) -> Result<(), BackendError>;

    fn draw(&mut self, program: &Self::Program) -> Result<(), BackendError>;

    fn set_viewport_size(&mut self, size: DeviceSize);
}
