//! GPU update program - the fullscreen pass that advances the simulation.

use std::path::Path;

use crate::sim::{StepError, UpdateProgram};

use super::geometry::QuadGeometry;
use super::state_buffer::{create_state_sampler, StateBuffer, STATE_TEXTURE_FORMAT};
use super::RenderError;

// Embed the default update rule at compile time
pub const DEFAULT_UPDATE_SHADER: &str = include_str!("shaders/update.wgsl");

/// Uniform block handed to every update pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct PassParams {
    delta_ms: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
}

/// Runs an update rule over the whole grid as one fullscreen render pass.
///
/// The rule itself is opaque WGSL; this type only fixes the binding
/// contract (previous state texture, sampler, pass parameters) and the
/// fullscreen-quad plumbing around it.
pub struct GpuUpdateProgram {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    quad: QuadGeometry,
}

impl GpuUpdateProgram {
    /// Build the update pipeline from WGSL source.
    ///
    /// Compile and link problems surface as [`RenderError::ProgramLink`]
    /// carrying the driver diagnostic; the renderer refuses to start
    /// without a working update program.
    pub async fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        source: &str,
    ) -> Result<Self, RenderError> {
        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Update Shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let bind_group_layout = create_update_bind_group_layout(device);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Update Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            ..Default::default()
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Update Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadGeometry::vertex_layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: STATE_TEXTURE_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview_mask: None,
            cache: None,
        });

        if let Some(error) = scope.pop().await {
            return Err(RenderError::ProgramLink(error.to_string()));
        }

        let sampler = create_state_sampler(device);
        let quad = QuadGeometry::new(device);

        Ok(Self {
            device: device.clone(),
            queue: queue.clone(),
            pipeline,
            bind_group_layout,
            sampler,
            quad,
        })
    }

    /// Read WGSL from `path`, or fall back to the embedded default rule.
    ///
    /// An unreadable file is reported the same way as a rule that fails to
    /// compile: the renderer must not come up with a silently different
    /// program than the one asked for.
    pub fn load_source(path: Option<&Path>) -> Result<String, RenderError> {
        match path {
            Some(path) => std::fs::read_to_string(path).map_err(|e| {
                RenderError::ProgramLink(format!("failed to read {}: {}", path.display(), e))
            }),
            None => Ok(DEFAULT_UPDATE_SHADER.to_string()),
        }
    }
}

impl UpdateProgram<StateBuffer> for GpuUpdateProgram {
    /// Encode and submit one fullscreen pass reading `source`, writing
    /// `target`. The target is cleared to black first, so the rule fully
    /// determines every cell it leaves non-black.
    fn apply(
        &mut self,
        source: &StateBuffer,
        target: &StateBuffer,
        delta_ms: f32,
    ) -> Result<(), StepError> {
        let params = PassParams {
            delta_ms,
            _pad0: 0.0,
            _pad1: 0.0,
            _pad2: 0.0,
        };

        let params_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Pass Params"),
            size: std::mem::size_of::<PassParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.queue
            .write_buffer(&params_buffer, 0, bytemuck::bytes_of(&params));

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Update Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(source.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        });

        // Scope the whole pass so a validation failure becomes a transient
        // step error instead of tearing the renderer down.
        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Update Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Update Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.view(),
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            self.quad.draw(&mut pass);
        }

        self.queue.submit(std::iter::once(encoder.finish()));

        // Validation on native resolves synchronously at submit, so this
        // does not stall the frame.
        if let Some(error) = pollster::block_on(scope.pop()) {
            return Err(StepError(error.to_string()));
        }

        Ok(())
    }
}

fn create_update_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Update Bind Group Layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
    })
}
