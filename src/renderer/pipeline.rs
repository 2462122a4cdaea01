//! WebGPU pipeline that draws a [`RenderBatch`] in one indexed call

use std::path::Path;

use wgpu::util::DeviceExt;

use super::batch::RenderBatch;
use super::gpu::GpuContext;
use super::texture::AtlasTexture;
use super::vertex::GlyphVertex;
use crate::persistence::file;

/// Shader compiled into the binary
pub const BUILTIN_SHADER: &str = include_str!("glyph.wgsl");

/// Read WGSL source from `path`, falling back to the built-in shader
pub fn load_shader_source(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return BUILTIN_SHADER.to_string();
    };
    match file::read_to_string(path) {
        Ok(source) if !source.trim().is_empty() => {
            log::info!("Loaded shader from {}", path.display());
            source
        }
        Ok(_) => {
            log::warn!("Shader {} is empty, using built-in", path.display());
            BUILTIN_SHADER.to_string()
        }
        Err(e) => {
            log::warn!("Could not read shader {}: {}, using built-in", path.display(), e);
            BUILTIN_SHADER.to_string()
        }
    }
}

fn glyph_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("glyph_bind_group_layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

fn glyph_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    source: &str,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("glyph_shader"),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("glyph_pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[GlyphVertex::desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

/// Build the pipeline from `source`, returning the first validation error
/// instead of letting it reach the device's uncaptured error handler.
fn try_glyph_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    source: &str,
) -> Result<wgpu::RenderPipeline, wgpu::Error> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let pipeline = glyph_pipeline(device, layout, format, source);
    match pollster::block_on(scope.pop()) {
        Some(e) => Err(e),
        None => Ok(pipeline),
    }
}

/// GPU side of the glyph batch: pipeline, buffers and atlas binding
pub struct BatchRenderer {
    pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    /// Quads the buffers can hold
    capacity: u32,
    /// Packed indices, reused across frames
    indices: Vec<u32>,
}

impl BatchRenderer {
    pub fn new(gpu: &GpuContext, atlas: &AtlasTexture, shader_source: &str, max_glyphs: u32) -> Self {
        let device = &gpu.device;
        let capacity = max_glyphs.max(1);

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::cast_slice(&glam::Mat4::IDENTITY.to_cols_array()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("glyph_vertices"),
            size: (capacity as usize * 4 * std::mem::size_of::<GlyphVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("glyph_indices"),
            size: (capacity as usize * 6 * std::mem::size_of::<u32>()) as u64,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = glyph_bind_group_layout(device);

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("glyph_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&atlas.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&atlas.sampler),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("glyph_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = match try_glyph_pipeline(device, &pipeline_layout, gpu.format(), shader_source) {
            Ok(pipeline) => pipeline,
            Err(e) => {
                log::warn!("Shader failed validation: {}, using built-in", e);
                glyph_pipeline(device, &pipeline_layout, gpu.format(), BUILTIN_SHADER)
            }
        };
        log::info!("Glyph pipeline ready ({} glyph capacity)", capacity);

        Self {
            pipeline,
            globals_buffer,
            vertex_buffer,
            index_buffer,
            bind_group,
            capacity,
            indices: Vec::with_capacity(capacity as usize * 6),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Upload the batch and draw it to the surface.
    ///
    /// An empty batch still clears and presents the frame.
    pub fn render(&mut self, gpu: &GpuContext, batch: &RenderBatch) -> Result<(), wgpu::SurfaceError> {
        let max_quads = self.capacity as usize;
        let vertices = batch.vertices();
        let vertices = &vertices[..vertices.len().min(max_quads * 4)];
        batch.pack_indices(&mut self.indices);
        // A batch larger than the buffers loses its trailing quads
        let vertex_limit = vertices.len() as u32;
        self.indices.retain(|&i| i < vertex_limit);

        gpu.queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::cast_slice(&batch.projection().to_cols_array()),
        );
        if !vertices.is_empty() {
            gpu.queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(vertices));
        }
        if !self.indices.is_empty() {
            gpu.queue
                .write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&self.indices));
        }

        let output = gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("glyph_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("glyph_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.02,
                            g: 0.02,
                            b: 0.05,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if !self.indices.is_empty() {
                let index_bytes = (self.indices.len() * std::mem::size_of::<u32>()) as u64;
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_bind_group(0, &self.bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                render_pass.set_index_buffer(
                    self.index_buffer.slice(..index_bytes),
                    wgpu::IndexFormat::Uint32,
                );
                render_pass.draw_indexed(0..self.indices.len() as u32, 0, 0..1);
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
