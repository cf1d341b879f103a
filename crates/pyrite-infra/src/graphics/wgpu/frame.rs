// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! An immediate-mode device context emulated on top of wgpu.
//!
//! The core submits immediate-mode calls: persistent binds, one constant
//! buffer, a draw after every write. wgpu batches queue writes per
//! submission, so a naive mapping would leave every draw of a frame
//! reading the *last* value
//! written. Instead, each constant-buffer bind snapshots the buffer's
//! current bytes into a per-frame uniform arena bound with dynamic offsets;
//! [`WgpuFrameContext::present`] then replays the recorded draws into a
//! single render pass. The write→bind→draw ordering the core relies on is
//! preserved exactly: a draw observes the snapshot taken by the bind that
//! precedes it.
//!
//! Clears are frame-initial in this backend: they become the pass load ops
//! of the next presented frame.

use pyrite_core::math::LinearRgba;
use pyrite_core::renderer::api::{
    BufferId, IndexFormat, PrimitiveTopology, ShaderModuleId, VertexAttributeDescriptor,
    VertexBufferLayoutDescriptor,
};
use pyrite_core::renderer::error::RenderError;
use pyrite_core::renderer::traits::DeviceContext;
use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::{Arc, Mutex};

use super::context::WgpuGraphicsContext;
use super::conversions::IntoWgpu;
use super::device::WgpuDevice;

/// Minimum uniform alignment required by most APIs.
const UNIFORM_ALIGNMENT: u32 = 256;
/// Initial capacity of the per-frame uniform arena, in bytes.
const INITIAL_ARENA_CAPACITY: u64 = 64 * 1024;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// The persistent pipeline state of the emulated immediate context.
#[derive(Debug, Default)]
struct BoundState {
    input_layout: Option<OwnedVertexLayout>,
    vertex_buffer: Option<(u32, BufferId)>,
    index_buffer: Option<(BufferId, IndexFormat)>,
    topology: Option<PrimitiveTopology>,
    vertex_shader: Option<ShaderModuleId>,
    pixel_shader: Option<ShaderModuleId>,
    constant_buffer: Option<(u32, BufferId)>,
}

#[derive(Debug, Clone)]
struct OwnedVertexLayout {
    array_stride: u64,
    attributes: Vec<VertexAttributeDescriptor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    vertex_shader: ShaderModuleId,
    pixel_shader: ShaderModuleId,
    topology: PrimitiveTopology,
}

#[derive(Debug)]
struct DrawCmd {
    pipeline: PipelineKey,
    vertex_buffer: BufferId,
    index_buffer: (BufferId, IndexFormat),
    uniform_offset: u32,
    index_count: u32,
    first_index: u32,
    base_vertex: i32,
}

/// A [`DeviceContext`] implementation that records one frame of immediate
/// submissions and replays them into a wgpu render pass on
/// [`present`](Self::present).
pub struct WgpuFrameContext {
    device: Arc<WgpuDevice>,
    context: Arc<Mutex<WgpuGraphicsContext>>,

    state: BoundState,

    clear_color: Option<LinearRgba>,
    clear_depth: Option<f32>,
    draws: Vec<DrawCmd>,
    uniform_staging: Vec<u8>,
    max_element_size: u64,
    current_uniform_offset: Option<u32>,

    uniform_layout: wgpu::BindGroupLayout,
    uniform_buffer: Option<wgpu::Buffer>,
    uniform_capacity: u64,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    depth_view: wgpu::TextureView,
}

impl WgpuFrameContext {
    /// Creates a frame context submitting through `device`.
    pub fn new(device: Arc<WgpuDevice>) -> Self {
        let context = device.context();
        let (uniform_layout, depth_view) = {
            let guard = context.lock().unwrap();
            let layout =
                guard
                    .device
                    .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                        label: Some("frame constants layout"),
                        entries: &[wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::VERTEX,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Uniform,
                                has_dynamic_offset: true,
                                min_binding_size: None,
                            },
                            count: None,
                        }],
                    });
            let (width, height) = guard.get_size();
            let depth_view = create_depth_view(&guard.device, width, height);
            (layout, depth_view)
        };

        Self {
            device,
            context,
            state: BoundState::default(),
            clear_color: None,
            clear_depth: None,
            draws: Vec::new(),
            uniform_staging: Vec::new(),
            max_element_size: 0,
            current_uniform_offset: None,
            uniform_layout,
            uniform_buffer: None,
            uniform_capacity: 0,
            pipelines: HashMap::new(),
            depth_view,
        }
    }

    /// Resizes the surface and recreates the depth target to match.
    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        let mut context = self.context.lock().unwrap();
        context.resize(new_width, new_height);
        let (width, height) = context.get_size();
        self.depth_view = create_depth_view(&context.device, width, height);
    }

    /// Copies the bound constant buffer's current bytes into the frame arena
    /// and returns the dynamic offset of the copy.
    fn snapshot_constants(&mut self, buffer: BufferId) -> Result<u32, RenderError> {
        let bytes = self.device.uniform_shadow(buffer).ok_or_else(|| {
            RenderError::SubmissionRejected(format!(
                "buffer {buffer:?} cannot be bound as a shader constant"
            ))
        })?;

        let offset = self.uniform_staging.len() as u32;
        self.uniform_staging.extend_from_slice(&bytes);
        self.max_element_size = self.max_element_size.max(bytes.len() as u64);

        // Pad to the dynamic-offset alignment.
        let aligned =
            (self.uniform_staging.len() + UNIFORM_ALIGNMENT as usize - 1) & !(UNIFORM_ALIGNMENT as usize - 1);
        self.uniform_staging.resize(aligned, 0);

        Ok(offset)
    }

    /// Submits the recorded frame: uploads the constant snapshots, replays
    /// every draw into one render pass, and presents the surface.
    ///
    /// A lost or outdated surface reconfigures the swapchain and silently
    /// drops the frame; the next tick renders normally.
    pub fn present(&mut self) -> Result<(), RenderError> {
        let draws = std::mem::take(&mut self.draws);
        let staging = std::mem::take(&mut self.uniform_staging);
        let max_element_size = std::mem::take(&mut self.max_element_size);
        let clear_color = self.clear_color.take();
        let clear_depth = self.clear_depth.take();
        self.current_uniform_offset = None;

        // Resolve every pipeline the frame needs before the pass begins.
        for cmd in &draws {
            if !self.pipelines.contains_key(&cmd.pipeline) {
                let layout = self.state.input_layout.as_ref().ok_or_else(|| {
                    RenderError::SubmissionRejected("no input layout set".to_string())
                })?;
                let pipeline = self.create_pipeline(&cmd.pipeline, layout)?;
                self.pipelines.insert(cmd.pipeline, pipeline);
            }
        }

        let mut context = self.context.lock().map_err(|e| {
            RenderError::SubmissionRejected(format!("Mutex poisoned (context): {e}"))
        })?;

        let surface_texture = match context.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("WgpuFrameContext: surface lost or outdated, reconfiguring");
                context.reconfigure();
                return Ok(());
            }
            Err(e) => {
                return Err(RenderError::SubmissionRejected(format!(
                    "surface acquisition failed: {e}"
                )))
            }
        };
        let target_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Upload this frame's constant snapshots and bind them once; each
        // draw selects its slice with a dynamic offset.
        let bind_group = if staging.is_empty() {
            None
        } else {
            if staging.len() as u64 > self.uniform_capacity {
                let capacity = (staging.len() as u64)
                    .next_power_of_two()
                    .max(INITIAL_ARENA_CAPACITY);
                self.uniform_buffer = Some(context.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("frame constants arena"),
                    size: capacity,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                }));
                self.uniform_capacity = capacity;
            }
            let arena = self.uniform_buffer.as_ref().expect("arena just ensured");
            context.queue.write_buffer(arena, 0, &staging);

            Some(context.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("frame constants"),
                layout: &self.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: arena,
                        offset: 0,
                        size: NonZeroU64::new(max_element_size),
                    }),
                }],
            }))
        };

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pyrite frame"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: clear_color
                            .map(|c| wgpu::LoadOp::Clear(c.into_wgpu()))
                            .unwrap_or(wgpu::LoadOp::Load),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: clear_depth
                            .map(wgpu::LoadOp::Clear)
                            .unwrap_or(wgpu::LoadOp::Load),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for cmd in &draws {
                let pipeline = self
                    .pipelines
                    .get(&cmd.pipeline)
                    .expect("pipeline resolved above");
                pass.set_pipeline(pipeline);

                if let Some(vertex_buffer) = self.device.get_wgpu_buffer(cmd.vertex_buffer) {
                    pass.set_vertex_buffer(0, vertex_buffer.slice(..));
                }
                if let Some(index_buffer) = self.device.get_wgpu_buffer(cmd.index_buffer.0) {
                    pass.set_index_buffer(index_buffer.slice(..), cmd.index_buffer.1.into_wgpu());
                }
                if let Some(bind_group) = bind_group.as_ref() {
                    pass.set_bind_group(0, bind_group, &[cmd.uniform_offset]);
                }
                pass.draw_indexed(
                    cmd.first_index..cmd.first_index + cmd.index_count,
                    cmd.base_vertex,
                    0..1,
                );
            }
        }

        context.queue.submit(std::iter::once(encoder.finish()));
        drop(context);
        surface_texture.present();

        Ok(())
    }

    fn create_pipeline(
        &self,
        key: &PipelineKey,
        layout: &OwnedVertexLayout,
    ) -> Result<wgpu::RenderPipeline, RenderError> {
        let (vs_module, vs_entry) =
            self.device.get_shader_entry(key.vertex_shader).ok_or_else(|| {
                RenderError::SubmissionRejected(format!(
                    "vertex shader {:?} is not a live module",
                    key.vertex_shader
                ))
            })?;
        let (ps_module, ps_entry) =
            self.device.get_shader_entry(key.pixel_shader).ok_or_else(|| {
                RenderError::SubmissionRejected(format!(
                    "pixel shader {:?} is not a live module",
                    key.pixel_shader
                ))
            })?;

        let attributes: Vec<wgpu::VertexAttribute> = layout
            .attributes
            .iter()
            .map(|attr| wgpu::VertexAttribute {
                format: attr.format.into_wgpu(),
                offset: attr.offset,
                shader_location: attr.shader_location,
            })
            .collect();
        let vertex_buffers = [wgpu::VertexBufferLayout {
            array_stride: layout.array_stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attributes,
        }];

        let context = self.context.lock().unwrap();
        let surface_format = context.surface_config.format;

        let pipeline_layout =
            context
                .device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("scene pipeline layout"),
                    bind_group_layouts: &[&self.uniform_layout],
                    push_constant_ranges: &[],
                });

        let pipeline = context
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("scene pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vs_module,
                    entry_point: Some(&vs_entry),
                    buffers: &vertex_buffers,
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &ps_module,
                    entry_point: Some(&ps_entry),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: key.topology.into_wgpu(),
                    strip_index_format: None,
                    // The cube's index list winds clockwise for the
                    // left-handed view.
                    front_face: wgpu::FrontFace::Cw,
                    cull_mode: Some(wgpu::Face::Back),
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        Ok(pipeline)
    }
}

impl DeviceContext for WgpuFrameContext {
    fn clear_color_target(&mut self, color: LinearRgba) -> Result<(), RenderError> {
        self.clear_color = Some(color);
        Ok(())
    }

    fn clear_depth_target(&mut self, depth: f32) -> Result<(), RenderError> {
        self.clear_depth = Some(depth);
        Ok(())
    }

    fn set_input_layout(
        &mut self,
        layout: &VertexBufferLayoutDescriptor,
    ) -> Result<(), RenderError> {
        self.state.input_layout = Some(OwnedVertexLayout {
            array_stride: layout.array_stride,
            attributes: layout.attributes.to_vec(),
        });
        // Cached pipelines baked the previous layout in.
        self.pipelines.clear();
        Ok(())
    }

    fn set_vertex_buffer(
        &mut self,
        slot: u32,
        buffer: BufferId,
        _stride: u32,
    ) -> Result<(), RenderError> {
        if slot != 0 {
            return Err(RenderError::SubmissionRejected(format!(
                "vertex buffer slot {slot} is not supported"
            )));
        }
        self.state.vertex_buffer = Some((slot, buffer));
        Ok(())
    }

    fn set_index_buffer(
        &mut self,
        buffer: BufferId,
        format: IndexFormat,
    ) -> Result<(), RenderError> {
        self.state.index_buffer = Some((buffer, format));
        Ok(())
    }

    fn set_primitive_topology(&mut self, topology: PrimitiveTopology) -> Result<(), RenderError> {
        self.state.topology = Some(topology);
        Ok(())
    }

    fn bind_vertex_shader(&mut self, module: ShaderModuleId) -> Result<(), RenderError> {
        if self.device.get_shader_entry(module).is_none() {
            return Err(RenderError::SubmissionRejected(format!(
                "vertex shader {module:?} is not a live module"
            )));
        }
        self.state.vertex_shader = Some(module);
        Ok(())
    }

    fn bind_pixel_shader(&mut self, module: ShaderModuleId) -> Result<(), RenderError> {
        if self.device.get_shader_entry(module).is_none() {
            return Err(RenderError::SubmissionRejected(format!(
                "pixel shader {module:?} is not a live module"
            )));
        }
        self.state.pixel_shader = Some(module);
        Ok(())
    }

    fn bind_vertex_constant_buffer(
        &mut self,
        slot: u32,
        buffer: BufferId,
    ) -> Result<(), RenderError> {
        if slot != 0 {
            return Err(RenderError::SubmissionRejected(format!(
                "constant buffer slot {slot} is not supported"
            )));
        }
        // The draw that follows must observe the value as of this bind.
        let offset = self.snapshot_constants(buffer)?;
        self.state.constant_buffer = Some((slot, buffer));
        self.current_uniform_offset = Some(offset);
        Ok(())
    }

    fn draw_indexed(
        &mut self,
        index_count: u32,
        first_index: u32,
        base_vertex: i32,
    ) -> Result<(), RenderError> {
        let vertex_shader = self.state.vertex_shader.ok_or_else(|| {
            RenderError::SubmissionRejected("no vertex shader bound".to_string())
        })?;
        let pixel_shader = self.state.pixel_shader.ok_or_else(|| {
            RenderError::SubmissionRejected("no pixel shader bound".to_string())
        })?;
        let topology = self.state.topology.ok_or_else(|| {
            RenderError::SubmissionRejected("no primitive topology set".to_string())
        })?;
        let (_, vertex_buffer) = self.state.vertex_buffer.ok_or_else(|| {
            RenderError::SubmissionRejected("no vertex buffer bound".to_string())
        })?;
        let index_buffer = self.state.index_buffer.ok_or_else(|| {
            RenderError::SubmissionRejected("no index buffer bound".to_string())
        })?;
        let (_, constant_buffer) = self.state.constant_buffer.ok_or_else(|| {
            RenderError::SubmissionRejected("no constant buffer bound".to_string())
        })?;

        // A bind earlier in the frame left a snapshot; a draw with none yet
        // (the bind predates this frame) snapshots the current contents now.
        let uniform_offset = match self.current_uniform_offset {
            Some(offset) => offset,
            None => {
                let offset = self.snapshot_constants(constant_buffer)?;
                self.current_uniform_offset = Some(offset);
                offset
            }
        };

        self.draws.push(DrawCmd {
            pipeline: PipelineKey {
                vertex_shader,
                pixel_shader,
                topology,
            },
            vertex_buffer,
            index_buffer,
            uniform_offset,
            index_count,
            first_index,
            base_vertex,
        });
        Ok(())
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth target"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
