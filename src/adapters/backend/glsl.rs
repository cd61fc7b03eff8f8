//! GLSL 4.50 program stages, compiled and validated by naga.
//!
//! Compilation yields a validated naga module per stage. Linking matches the
//! stages' location-bound interfaces and reflects the resources both stages
//! bind in group 0: uniform blocks (with std140 member offsets), one 2D
//! palette texture and its sampler.

use naga::back::wgsl::WriterFlags;
use naga::front::glsl::{Frontend, Options};
use naga::valid::{Capabilities, ModuleInfo, ValidationFlags, Validator};
use naga::{AddressSpace, Binding, Handle, ImageDimension, Module, ScalarKind, Type, TypeInner, VectorSize};

use crate::core::actions::render_frame::ports::render_backend::{
    BackendError, ShaderStage, UniformValue,
};

/// Bytes per `vec3` column of a `mat3` in std140 layout.
const MAT3_COLUMN_STRIDE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformType {
    Float,
    Int,
    Mat3,
    Sampler,
}

impl UniformType {
    fn from_inner(inner: &TypeInner) -> Option<Self> {
        match inner {
            TypeInner::Matrix {
                columns: VectorSize::Tri,
                rows: VectorSize::Tri,
                ..
            } => Some(Self::Mat3),
            TypeInner::Sampler { comparison: false } => Some(Self::Sampler),
            TypeInner::Scalar { .. } => match inner.scalar_kind() {
                Some(ScalarKind::Float) => Some(Self::Float),
                Some(ScalarKind::Sint) => Some(Self::Int),
                _ => None,
            },
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Int => "int",
            Self::Mat3 => "mat3",
            Self::Sampler => "sampler",
        }
    }

    #[must_use]
    pub fn accepts(self, value: &UniformValue) -> bool {
        matches!(
            (self, value),
            (Self::Mat3, UniformValue::Matrix3(_))
                | (Self::Sampler, UniformValue::Sampler(_))
                | (Self::Int, UniformValue::Int(_))
                | (Self::Float, UniformValue::Float(_))
        )
    }
}

/// Shader stages a resource is visible in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stages {
    pub vertex: bool,
    pub fragment: bool,
}

impl Stages {
    fn insert(&mut self, stage: ShaderStage) {
        match stage {
            ShaderStage::Vertex => self.vertex = true,
            ShaderStage::Fragment => self.fragment = true,
        }
    }

    fn only(stage: ShaderStage) -> Self {
        let mut stages = Self::default();
        stages.insert(stage);
        stages
    }
}

/// Where a uniform's value lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformSlot {
    /// Member of the uniform block at `binding`, `offset` bytes in.
    Block { binding: u32, offset: u32 },
    Sampler { binding: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uniform {
    pub name: String,
    pub ty: UniformType,
    pub slot: UniformSlot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformBlock {
    pub binding: u32,
    /// std140 size of the block in bytes.
    pub size: u32,
    pub stages: Stages,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureSlot {
    pub name: String,
    pub binding: u32,
    pub stages: Stages,
}

/// One validated program stage.
#[derive(Debug)]
pub struct CompiledStage {
    stage: ShaderStage,
    module: Module,
    info: ModuleInfo,
}

impl CompiledStage {
    #[must_use]
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    #[must_use]
    pub fn module(&self) -> &Module {
        &self.module
    }

    #[must_use]
    pub fn entry_point(&self) -> &str {
        self.module
            .entry_points
            .first()
            .map_or("main", |entry| entry.name.as_str())
    }

    /// WGSL rendition of the stage, as handed to wgpu.
    pub fn to_wgsl(&self) -> Result<String, BackendError> {
        naga::back::wgsl::write_string(&self.module, &self.info, WriterFlags::empty())
            .map_err(|err| compile_error(self.stage, err.to_string()))
    }
}

/// A vertex and fragment stage that agree on their interface.
#[derive(Debug)]
pub struct LinkedProgram {
    pub vertex: CompiledStage,
    pub fragment: CompiledStage,
    /// Location of the single `vec2` vertex attribute.
    pub attribute_location: u32,
    pub uniforms: Vec<Uniform>,
    pub blocks: Vec<UniformBlock>,
    pub texture: TextureSlot,
}

impl LinkedProgram {
    #[must_use]
    pub fn uniform(&self, name: &str) -> Option<&Uniform> {
        self.uniforms.iter().find(|u| u.name == name)
    }

    /// The sampler paired with [`texture`](Self::texture).
    #[must_use]
    pub fn sampler(&self) -> Option<&Uniform> {
        self.uniforms.iter().find(|u| u.ty == UniformType::Sampler)
    }

    #[must_use]
    pub fn block(&self, binding: u32) -> Option<&UniformBlock> {
        self.blocks.iter().find(|b| b.binding == binding)
    }
}

fn compile_error(stage: ShaderStage, log: impl Into<String>) -> BackendError {
    BackendError::ShaderCompile {
        stage,
        log: log.into(),
    }
}

fn link_error(log: impl Into<String>) -> BackendError {
    BackendError::ShaderLink { log: log.into() }
}

fn naga_stage(stage: ShaderStage) -> naga::ShaderStage {
    match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
    }
}

/// Parses and validates one stage.
pub fn compile(stage: ShaderStage, source: &str) -> Result<CompiledStage, BackendError> {
    let module = Frontend::default()
        .parse(&Options::from(naga_stage(stage)), source)
        .map_err(|errs| {
            let log = errs
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("\n");
            compile_error(stage, log)
        })?;

    let info = Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|err| compile_error(stage, err.to_string()))?;

    match module.entry_points.as_slice() {
        [entry] if entry.stage == naga_stage(stage) => {}
        _ => return Err(compile_error(stage, "expected a single `main` entry point")),
    }

    Ok(CompiledStage {
        stage,
        module,
        info,
    })
}

/// Compiles both stages and links them.
pub fn compile_program(
    vertex_source: &str,
    fragment_source: &str,
) -> Result<LinkedProgram, BackendError> {
    let vertex = compile(ShaderStage::Vertex, vertex_source)?;
    let fragment = compile(ShaderStage::Fragment, fragment_source)?;

    link(vertex, fragment)
}

#[derive(Debug, Clone, PartialEq)]
struct Varying {
    location: u32,
    ty: TypeInner,
}

fn collect_varyings(
    module: &Module,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    out: &mut Vec<Varying>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push(Varying {
            location: *location,
            ty: module.types[ty].inner.clone(),
        }),
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_varyings(module, member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}

fn inputs(stage: &CompiledStage) -> Vec<Varying> {
    let mut out = Vec::new();

    for entry in &stage.module.entry_points {
        for argument in &entry.function.arguments {
            collect_varyings(&stage.module, argument.ty, argument.binding.as_ref(), &mut out);
        }
    }

    out
}

fn outputs(stage: &CompiledStage) -> Vec<Varying> {
    let mut out = Vec::new();

    for entry in &stage.module.entry_points {
        if let Some(result) = &entry.function.result {
            collect_varyings(&stage.module, result.ty, result.binding.as_ref(), &mut out);
        }
    }

    out
}

fn is_float_vector(inner: &TypeInner, size: VectorSize) -> bool {
    matches!(inner, TypeInner::Vector { size: s, .. } if *s == size)
        && inner.scalar_kind() == Some(ScalarKind::Float)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct BlockMember {
    name: String,
    ty: UniformType,
    offset: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ResourceKind {
    Block { size: u32, members: Vec<BlockMember> },
    Texture,
    Sampler,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Resource {
    name: String,
    binding: u32,
    kind: ResourceKind,
}

fn resources(stage: &CompiledStage) -> Result<Vec<Resource>, BackendError> {
    let module = &stage.module;
    let mut found = Vec::new();

    for (_, global) in module.global_variables.iter() {
        let Some(binding) = &global.binding else {
            continue;
        };

        let name = global.name.clone().unwrap_or_default();

        if binding.group != 0 {
            return Err(compile_error(
                stage.stage,
                format!("`{name}` is bound in group {}, only group 0 is used", binding.group),
            ));
        }

        let kind = match (global.space, &module.types[global.ty].inner) {
            (AddressSpace::Uniform, TypeInner::Struct { members, span }) => {
                let members = members
                    .iter()
                    .map(|member| {
                        let name = member.name.clone().unwrap_or_default();
                        let ty = UniformType::from_inner(&module.types[member.ty].inner)
                            .filter(|ty| *ty != UniformType::Sampler)
                            .ok_or_else(|| {
                                compile_error(
                                    stage.stage,
                                    format!("uniform `{name}` has an unsupported type"),
                                )
                            })?;

                        Ok(BlockMember {
                            name,
                            ty,
                            offset: member.offset,
                        })
                    })
                    .collect::<Result<Vec<_>, BackendError>>()?;

                ResourceKind::Block {
                    size: *span,
                    members,
                }
            }
            (
                AddressSpace::Handle,
                TypeInner::Image {
                    dim: ImageDimension::D2,
                    arrayed: false,
                    ..
                },
            ) => ResourceKind::Texture,
            (AddressSpace::Handle, TypeInner::Sampler { comparison: false }) => {
                ResourceKind::Sampler
            }
            _ => {
                return Err(compile_error(
                    stage.stage,
                    format!("resource `{name}` has an unsupported type"),
                ));
            }
        };

        found.push(Resource {
            name,
            binding: binding.binding,
            kind,
        });
    }

    Ok(found)
}

/// Matches fragment inputs to vertex outputs by location and type, and merges
/// the resources of both stages.
pub fn link(vertex: CompiledStage, fragment: CompiledStage) -> Result<LinkedProgram, BackendError> {
    let produced = outputs(&vertex);

    for input in inputs(&fragment) {
        match produced.iter().find(|o| o.location == input.location) {
            None => {
                return Err(link_error(format!(
                    "fragment input at location {} is not written by the vertex stage",
                    input.location
                )));
            }
            Some(output) if output.ty != input.ty => {
                return Err(link_error(format!(
                    "location {} is {:?} in the vertex stage but {:?} in the fragment stage",
                    input.location, output.ty, input.ty
                )));
            }
            Some(_) => {}
        }
    }

    let attribute_location = match inputs(&vertex).as_slice() {
        [attribute] if is_float_vector(&attribute.ty, VectorSize::Bi) => attribute.location,
        _ => return Err(link_error("vertex stage must take exactly one vec2 attribute")),
    };

    if !matches!(outputs(&fragment).as_slice(), [colour] if is_float_vector(&colour.ty, VectorSize::Quad))
    {
        return Err(link_error("fragment stage must write exactly one vec4 colour"));
    }

    let mut merged: Vec<(Resource, Stages)> = Vec::new();

    for stage in [&vertex, &fragment] {
        for resource in resources(stage)? {
            match merged.iter_mut().find(|(r, _)| r.binding == resource.binding) {
                Some((existing, stages)) if *existing == resource => stages.insert(stage.stage),
                Some((existing, _)) => {
                    return Err(link_error(format!(
                        "binding {} is `{}` in one stage and `{}` in the other",
                        resource.binding, existing.name, resource.name
                    )));
                }
                None => merged.push((resource, Stages::only(stage.stage))),
            }
        }
    }

    let mut uniforms: Vec<Uniform> = Vec::new();
    let mut blocks = Vec::new();
    let mut textures = Vec::new();

    for (resource, stages) in merged {
        match resource.kind {
            ResourceKind::Block { size, members } => {
                blocks.push(UniformBlock {
                    binding: resource.binding,
                    size,
                    stages,
                });
                uniforms.extend(members.into_iter().map(|member| Uniform {
                    name: member.name,
                    ty: member.ty,
                    slot: UniformSlot::Block {
                        binding: resource.binding,
                        offset: member.offset,
                    },
                }));
            }
            ResourceKind::Sampler => uniforms.push(Uniform {
                name: resource.name,
                ty: UniformType::Sampler,
                slot: UniformSlot::Sampler {
                    binding: resource.binding,
                },
            }),
            ResourceKind::Texture => textures.push(TextureSlot {
                name: resource.name,
                binding: resource.binding,
                stages,
            }),
        }
    }

    for (i, uniform) in uniforms.iter().enumerate() {
        if uniforms[..i].iter().any(|u| u.name == uniform.name) {
            return Err(link_error(format!(
                "uniform `{}` is declared twice",
                uniform.name
            )));
        }
    }

    let samplers = uniforms
        .iter()
        .filter(|u| u.ty == UniformType::Sampler)
        .count();

    let texture = match (textures.as_slice(), samplers) {
        ([texture], 1) => texture.clone(),
        _ => {
            return Err(link_error(
                "program must sample exactly one 2D palette texture through one sampler",
            ));
        }
    };

    Ok(LinkedProgram {
        vertex,
        fragment,
        attribute_location,
        uniforms,
        blocks,
        texture,
    })
}

/// Writes `value` into a std140 block at `offset`.
pub fn write_uniform(block: &mut [u8], offset: u32, value: &UniformValue) -> Result<(), BackendError> {
    let offset = offset as usize;
    let out_of_range = || BackendError::InvalidUniformValue {
        name: format!("offset {offset}"),
        reason: "outside its uniform block".to_string(),
    };

    match value {
        UniformValue::Matrix3(m) => {
            for (column, values) in m.chunks_exact(3).enumerate() {
                let start = offset + column * MAT3_COLUMN_STRIDE;
                block
                    .get_mut(start..start + 12)
                    .ok_or_else(out_of_range)?
                    .copy_from_slice(bytemuck::cast_slice(values));
            }
        }
        UniformValue::Int(v) => block
            .get_mut(offset..offset + 4)
            .ok_or_else(out_of_range)?
            .copy_from_slice(bytemuck::bytes_of(v)),
        UniformValue::Float(v) => block
            .get_mut(offset..offset + 4)
            .ok_or_else(out_of_range)?
            .copy_from_slice(bytemuck::bytes_of(v)),
        UniformValue::Sampler(_) => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::actions::render_frame::render_pipeline::{
        FRAGMENT_SHADER_SOURCE, VERTEX_SHADER_SOURCE,
    };

    const VERTEX: &str = "#version 450
layout(location = 0) in vec2 a_pos;
layout(location = 0) out vec2 v_plane;
layout(set = 0, binding = 0) uniform View { mat3 view_mat; };
void main() {
    v_plane = (view_mat * vec3(a_pos, 1.0)).xy;
    gl_Position = vec4(a_pos, 0.0, 1.0);
}
";

    const FRAGMENT: &str = "#version 450
layout(location = 0) in vec2 v_plane;
layout(location = 0) out vec4 colour;
layout(set = 0, binding = 1) uniform Frame { int u_count; float u_gain; };
layout(set = 0, binding = 2) uniform texture2D u_ramp;
layout(set = 0, binding = 3) uniform sampler u_ramp_sampler;
void main() {
    vec4 ramp = texture(sampler2D(u_ramp, u_ramp_sampler), v_plane);
    colour = ramp * u_gain * float(u_count);
}
";

    #[test]
    fn test_undefined_function_fails_to_compile() {
        let broken = FRAGMENT_SHADER_SOURCE.replace(
            "vec2 z = vec2(0.0);",
            "vec2 z = no_such_function(c, u_undeclared) * mat3(1.0);",
        );
        assert_ne!(broken, FRAGMENT_SHADER_SOURCE);

        assert!(matches!(
            compile(ShaderStage::Fragment, &broken),
            Err(BackendError::ShaderCompile {
                stage: ShaderStage::Fragment,
                ..
            })
        ));
    }

    #[test]
    fn test_type_error_in_body_fails_to_compile() {
        let broken = VERTEX.replace("gl_Position = vec4(a_pos, 0.0, 1.0);", "gl_Position = a_pos;");

        assert!(matches!(
            compile(ShaderStage::Vertex, &broken),
            Err(BackendError::ShaderCompile {
                stage: ShaderStage::Vertex,
                ..
            })
        ));
    }

    #[test]
    fn test_missing_main_fails_to_compile() {
        let source = VERTEX.replace("void main()", "void helper()");

        assert!(compile(ShaderStage::Vertex, &source).is_err());
    }

    #[test]
    fn test_compile_error_carries_the_log() {
        let broken = FRAGMENT.replace("u_gain *", "u_missing *");
        let err = compile(ShaderStage::Fragment, &broken).unwrap_err();

        assert!(err.to_string().contains("fragment"), "{err}");
        assert!(err.to_string().len() > "failed to compile fragment shader: ".len());
    }

    #[test]
    fn test_link_reflects_uniforms() {
        let linked = compile_program(VERTEX, FRAGMENT).unwrap();

        assert_eq!(linked.attribute_location, 0);
        assert_eq!(
            linked.uniform("view_mat").map(|u| (u.ty, u.slot)),
            Some((
                UniformType::Mat3,
                UniformSlot::Block {
                    binding: 0,
                    offset: 0
                }
            ))
        );
        assert_eq!(
            linked.uniform("u_gain").map(|u| (u.ty, u.slot)),
            Some((
                UniformType::Float,
                UniformSlot::Block {
                    binding: 1,
                    offset: 4
                }
            ))
        );
        assert_eq!(
            linked.sampler().map(|u| u.name.as_str()),
            Some("u_ramp_sampler")
        );
        assert_eq!(linked.texture.name, "u_ramp");
        assert!(linked.texture.stages.fragment);
        assert!(!linked.texture.stages.vertex);
        assert!(linked.uniform("missing").is_none());

        let view = linked.block(0).unwrap();
        assert_eq!(view.size, 48);
        assert!(view.stages.vertex && !view.stages.fragment);
    }

    #[test]
    fn test_link_rejects_unmatched_varying() {
        let vertex = compile(
            ShaderStage::Vertex,
            &VERTEX.replace("layout(location = 0) out", "layout(location = 1) out"),
        )
        .unwrap();
        let fragment = compile(ShaderStage::Fragment, FRAGMENT).unwrap();

        assert!(matches!(
            link(vertex, fragment),
            Err(BackendError::ShaderLink { .. })
        ));
    }

    #[test]
    fn test_link_rejects_varying_type_mismatch() {
        let vertex = compile(
            ShaderStage::Vertex,
            &VERTEX
                .replace("out vec2 v_plane", "out vec3 v_plane")
                .replace(").xy;", ");"),
        )
        .unwrap();
        let fragment = compile(ShaderStage::Fragment, FRAGMENT).unwrap();

        assert!(matches!(
            link(vertex, fragment),
            Err(BackendError::ShaderLink { .. })
        ));
    }

    #[test]
    fn test_link_rejects_conflicting_bindings() {
        let vertex = compile(
            ShaderStage::Vertex,
            &VERTEX.replace("binding = 0", "binding = 1"),
        )
        .unwrap();
        let fragment = compile(ShaderStage::Fragment, FRAGMENT).unwrap();

        assert!(matches!(
            link(vertex, fragment),
            Err(BackendError::ShaderLink { .. })
        ));
    }

    #[test]
    fn test_bundled_program_links() {
        let linked = compile_program(VERTEX_SHADER_SOURCE, FRAGMENT_SHADER_SOURCE).unwrap();

        for (name, ty) in [
            ("view_mat", UniformType::Mat3),
            ("u_max_iterations", UniformType::Int),
            ("u_colouring", UniformType::Int),
            ("u_smooth", UniformType::Int),
            ("u_palette_sampler", UniformType::Sampler),
        ] {
            assert_eq!(linked.uniform(name).map(|u| u.ty), Some(ty), "{name}");
        }

        assert_eq!(linked.uniforms.len(), 5);
        assert_eq!(linked.texture.name, "u_palette");
        assert_eq!(linked.vertex.entry_point(), "main");
        assert!(linked.vertex.to_wgsl().unwrap().contains("@vertex"));
        assert!(linked.fragment.to_wgsl().unwrap().contains("@fragment"));
    }

    #[test]
    fn test_write_uniform_pads_matrix_columns() {
        let mut block = [0_u8; 48];
        let m = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0_f32];

        write_uniform(&mut block, 0, &UniformValue::Matrix3(m)).unwrap();

        let floats: Vec<f32> = block
            .chunks_exact(4)
            .map(|b| bytemuck::pod_read_unaligned(b))
            .collect();
        assert_eq!(
            floats,
            [1.0, 2.0, 3.0, 0.0, 4.0, 5.0, 6.0, 0.0, 7.0, 8.0, 9.0, 0.0]
        );
        assert!(write_uniform(&mut block, 46, &UniformValue::Int(1)).is_err());
    }
}
