use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::{Arc, mpsc};

use log::{debug, info, trace};
use wgpu::util::DeviceExt;

use crate::adapters::backend::geometry::TriangleStrip;
use crate::adapters::backend::glsl::{LinkedProgram, Stages, UniformSlot, compile_program, write_uniform};
use crate::core::actions::render_frame::ports::render_backend::{
    BackendError, RenderBackend, UniformValue,
};
use crate::core::data::device_size::DeviceSize;
use crate::core::data::palette::Palette;
use crate::core::data::pixel_buffer::{BYTES_PER_PIXEL, PixelBuffer};

const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const PALETTE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const UNIFORM_ALIGNMENT: u64 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuProgram(usize);

struct UniformBuffer {
    binding: u32,
    bytes: Vec<u8>,
    buffer: wgpu::Buffer,
}

struct ProgramState {
    linked: LinkedProgram,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    buffers: Vec<UniformBuffer>,
    values: HashMap<String, UniformValue>,
}

struct Geometry {
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

struct PaletteTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// Offscreen colour target plus the buffer it is copied back through.
struct RenderTarget {
    size: DeviceSize,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    readback: wgpu::Buffer,
    padded_row_bytes: u32,
}

impl RenderTarget {
    fn new(device: &wgpu::Device, size: DeviceSize) -> Result<Self, BackendError> {
        let limit = device.limits().max_texture_dimension_2d;
        if size.width > limit || size.height > limit {
            return Err(BackendError::Device(format!(
                "{}x{} exceeds the {limit} pixel texture limit",
                size.width, size.height
            )));
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("mandelbrot-target"),
            size: extent(size),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let padded_row_bytes = padded_row_bytes(size.width);
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("mandelbrot-readback"),
            size: u64::from(padded_row_bytes) * u64::from(size.height),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            size,
            texture,
            view,
            readback,
            padded_row_bytes,
        })
    }
}

fn extent(size: DeviceSize) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: size.width,
        height: size.height,
        depth_or_array_layers: 1,
    }
}

/// Texture rows copied to a buffer must start on a 256 byte boundary.
fn padded_row_bytes(width: u32) -> u32 {
    let unpadded = width * BYTES_PER_PIXEL as u32;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

    unpadded.div_ceil(align) * align
}

fn visibility(stages: Stages) -> wgpu::ShaderStages {
    let mut visibility = wgpu::ShaderStages::NONE;

    if stages.vertex {
        visibility |= wgpu::ShaderStages::VERTEX;
    }
    if stages.fragment {
        visibility |= wgpu::ShaderStages::FRAGMENT;
    }

    visibility
}

fn type_mismatch(name: &str, declared: &'static str, value: &UniformValue) -> BackendError {
    BackendError::UniformTypeMismatch {
        name: name.to_string(),
        declared,
        assigned: value.type_name(),
    }
}

/// Runs programs on a wgpu device and reads each frame back into a
/// [`PixelBuffer`].
///
/// Sources are compiled and linked through naga, translated to WGSL and
/// built into a triangle-strip render pipeline whose bind group layout comes
/// from the reflected interface. Drawing is synchronous: [`draw`] returns
/// once the frame is in [`framebuffer`](Self::framebuffer).
///
/// [`draw`]: RenderBackend::draw
pub struct GpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    programs: Vec<ProgramState>,
    geometry: Option<Geometry>,
    palettes: HashMap<u32, PaletteTexture>,
    sampler: wgpu::Sampler,
    target: Option<RenderTarget>,
    framebuffer: PixelBuffer,
}

impl GpuBackend {
    /// Opens a headless device on the default adapter.
    pub fn new() -> Result<Self, BackendError> {
        pollster::block_on(Self::request())
    }

    async fn request() -> Result<Self, BackendError> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| BackendError::Unavailable("no compatible adapter".to_string()))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("mandelbrot-device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: adapter.limits(),
                },
                None,
            )
            .await
            .map_err(|err| BackendError::Unavailable(err.to_string()))?;

        let adapter_info = adapter.get_info();
        info!(
            "gpu backend on {} ({:?})",
            adapter_info.name, adapter_info.backend
        );

        // Linear filtering between texel centres interpolates palette entries.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("palette-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Ok(Self {
            device,
            queue,
            programs: Vec::new(),
            geometry: None,
            palettes: HashMap::new(),
            sampler,
            target: None,
            framebuffer: PixelBuffer::new(DeviceSize::default()),
        })
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

    /// Turns wgpu validation failures raised inside `f` into errors instead
    /// of panics.
    fn scoped<T>(&self, f: impl FnOnce(&Self) -> T) -> Result<T, BackendError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f(self);

        match pollster::block_on(self.device.pop_error_scope()) {
            Some(err) => Err(BackendError::Device(err.to_string())),
            None => Ok(value),
        }
    }

    fn build_pipeline(
        &self,
        linked: &LinkedProgram,
        vertex_wgsl: String,
        fragment_wgsl: String,
    ) -> (wgpu::RenderPipeline, wgpu::BindGroupLayout) {
        let vertex_module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mandelbrot-vertex"),
            source: wgpu::ShaderSource::Wgsl(vertex_wgsl.into()),
        });
        let fragment_module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mandelbrot-fragment"),
            source: wgpu::ShaderSource::Wgsl(fragment_wgsl.into()),
        });

        let mut entries: Vec<wgpu::BindGroupLayoutEntry> = linked
            .blocks
            .iter()
            .map(|block| wgpu::BindGroupLayoutEntry {
                binding: block.binding,
                visibility: visibility(block.stages),
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(u64::from(block.size)),
                },
                count: None,
            })
            .collect();

        entries.push(wgpu::BindGroupLayoutEntry {
            binding: linked.texture.binding,
            visibility: visibility(linked.texture.stages),
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        });

        if let Some(UniformSlot::Sampler { binding }) = linked.sampler().map(|s| s.slot) {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding,
                visibility: visibility(linked.texture.stages),
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            });
        }

        let bind_group_layout =
            self.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("mandelbrot-bind-group-layout"),
                    entries: &entries,
                });

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("mandelbrot-pipeline-layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

        let attributes = [wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x2,
            offset: 0,
            shader_location: linked.attribute_location,
        }];

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("mandelbrot-pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vertex_module,
                    entry_point: linked.vertex.entry_point(),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &attributes,
                    }],
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleStrip,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &fragment_module,
                    entry_point: linked.fragment.entry_point(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: TARGET_FORMAT,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                multiview: None,
            });

        (pipeline, bind_group_layout)
    }

    /// Maps the readback buffer and copies the unpadded rows out.
    fn read_back(&mut self) -> Result<(), BackendError> {
        let Some(target) = &self.target else {
            return Ok(());
        };

        let slice = target.readback.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);

        receiver
            .recv()
            .map_err(|err| BackendError::Device(err.to_string()))?
            .map_err(|err| BackendError::Device(err.to_string()))?;

        {
            let data = slice.get_mapped_range();
            let row_bytes = target.size.width as usize * BYTES_PER_PIXEL;

            for (row, padded) in self
                .framebuffer
                .buffer_mut()
                .chunks_exact_mut(row_bytes)
                .zip(data.chunks(target.padded_row_bytes as usize))
            {
                row.copy_from_slice(&padded[..row_bytes]);
            }
        }

        target.readback.unmap();

        Ok(())
    }
}

impl RenderBackend for GpuBackend {
    type Program = GpuProgram;

    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<GpuProgram, BackendError> {
        let linked = compile_program(vertex_source, fragment_source)?;
        let vertex_wgsl = linked.vertex.to_wgsl()?;
        let fragment_wgsl = linked.fragment.to_wgsl()?;

        let (pipeline, bind_group_layout) = self
            .scoped(|backend| backend.build_pipeline(&linked, vertex_wgsl, fragment_wgsl))
            .map_err(|err| BackendError::ShaderLink {
                log: err.to_string(),
            })?;

        let buffers = linked
            .blocks
            .iter()
            .map(|block| {
                let size = u64::from(block.size)
                    .div_ceil(UNIFORM_ALIGNMENT)
                    .max(1)
                    * UNIFORM_ALIGNMENT;

                UniformBuffer {
                    binding: block.binding,
                    bytes: vec![0; size as usize],
                    buffer: self.device.create_buffer(&wgpu::BufferDescriptor {
                        label: Some("mandelbrot-uniforms"),
                        size,
                        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                        mapped_at_creation: false,
                    }),
                }
            })
            .collect();

        debug!(
            "gpu program {} with {} uniforms in {} blocks",
            self.programs.len(),
            linked.uniforms.len(),
            linked.blocks.len()
        );

        self.programs.push(ProgramState {
            linked,
            pipeline,
            bind_group_layout,
            buffers,
            values: HashMap::new(),
        });

        Ok(GpuProgram(self.programs.len() - 1))
    }

    fn upload_geometry(&mut self, vertices: &[[f32; 2]]) -> Result<(), BackendError> {
        let strip = TriangleStrip::new(vertices)?;
        let vertex_count = u32::try_from(strip.vertex_count())
            .map_err(|_| BackendError::InvalidGeometry("too many vertices".to_string()))?;

        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mandelbrot-geometry"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        self.geometry = Some(Geometry {
            buffer,
            vertex_count,
        });

        Ok(())
    }

    fn set_uniform(
        &mut self,
        program: &GpuProgram,
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

        if let UniformSlot::Block { binding, offset } = uniform.slot {
            let block = state
                .buffers
                .iter_mut()
                .find(|b| b.binding == binding)
                .ok_or_else(|| BackendError::UnknownUniform(name.to_string()))?;

            write_uniform(&mut block.bytes, offset, &value)?;
        }

        state.values.insert(name.to_string(), value);

        Ok(())
    }

    fn bind_palette(&mut self, palette: Arc<Palette>, unit: u32) -> Result<(), BackendError> {
        let width = u32::try_from(palette.len())
            .map_err(|_| BackendError::Device("palette too long".to_string()))?;
        let size = DeviceSize::new(width, 1);

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("palette"),
            size: extent(size),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: PALETTE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let texels: Vec<u8> = palette
            .colours()
            .iter()
            .flat_map(|c| [c.r, c.g, c.b, c.a])
            .collect();

        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &texels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(width * BYTES_PER_PIXEL as u32),
                rows_per_image: None,
            },
            extent(size),
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.palettes.insert(
            unit,
            PaletteTexture {
                _texture: texture,
                view,
            },
        );

        Ok(())
    }

    fn draw(&mut self, program: &GpuProgram) -> Result<(), BackendError> {
        let state = self
            .programs
            .get(program.0)
            .ok_or(BackendError::UnknownProgram)?;
        let geometry = self.geometry.as_ref().ok_or(BackendError::MissingGeometry)?;

        if let Some(unset) = state
            .linked
            .uniforms
            .iter()
            .find(|u| !state.values.contains_key(&u.name))
        {
            return Err(BackendError::MissingUniform(unset.name.clone()));
        }

        let (sampler_binding, unit) = match state.linked.sampler() {
            Some(sampler) => match (sampler.slot, state.values.get(&sampler.name)) {
                (UniformSlot::Sampler { binding }, Some(UniformValue::Sampler(unit))) => {
                    (binding, *unit)
                }
                _ => return Err(BackendError::MissingUniform(sampler.name.clone())),
            },
            None => return Err(BackendError::MissingUniform(state.linked.texture.name.clone())),
        };
        let palette = self
            .palettes
            .get(&unit)
            .ok_or(BackendError::MissingPalette(unit))?;

        let size = self.framebuffer.size();

        if size.is_empty() {
            return Ok(());
        }

        let target = match self.target.take() {
            Some(target) if target.size == size => target,
            _ => RenderTarget::new(&self.device, size)?,
        };
        let target = self.target.insert(target);

        trace!("gpu draw {}x{}", size.width, size.height);

        for block in &state.buffers {
            self.queue.write_buffer(&block.buffer, 0, &block.bytes);
        }

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let mut entries: Vec<wgpu::BindGroupEntry> = state
            .buffers
            .iter()
            .map(|block| wgpu::BindGroupEntry {
                binding: block.binding,
                resource: block.buffer.as_entire_binding(),
            })
            .collect();
        entries.push(wgpu::BindGroupEntry {
            binding: state.linked.texture.binding,
            resource: wgpu::BindingResource::TextureView(&palette.view),
        });
        entries.push(wgpu::BindGroupEntry {
            binding: sampler_binding,
            resource: wgpu::BindingResource::Sampler(&self.sampler),
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mandelbrot-bind-group"),
            layout: &state.bind_group_layout,
            entries: &entries,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("mandelbrot-encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("mandelbrot-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&state.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.set_vertex_buffer(0, geometry.buffer.slice(..));
            pass.draw(0..geometry.vertex_count, 0..1);
        }

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &target.readback,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(target.padded_row_bytes),
                    rows_per_image: Some(size.height),
                },
            },
            extent(size),
        );

        self.queue.submit(Some(encoder.finish()));

        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(BackendError::Device(err.to_string()));
        }

        self.read_back()
    }

    fn set_viewport_size(&mut self, size: DeviceSize) {
        self.framebuffer.resize(size);
    }
}
