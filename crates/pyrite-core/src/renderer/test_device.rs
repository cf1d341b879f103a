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

//! A recording double of the device traits for unit tests.
//!
//! `RecordingDevice` keeps a CPU backing store per buffer so written bytes can
//! be read back, and shares one event log with the contexts it hands out so
//! ordering across resource writes and submissions can be asserted on a
//! single stream.

use crate::math::LinearRgba;
use crate::renderer::api::{
    BufferDescriptor, BufferId, IndexFormat, PrimitiveTopology, ShaderModuleDescriptor,
    ShaderModuleId, VertexBufferLayoutDescriptor,
};
use crate::renderer::error::{RenderError, ResourceError};
use crate::renderer::traits::{DeviceContext, GraphicsDevice};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A single call observed by the recording device or one of its contexts.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    CreateBuffer(BufferId),
    CreateShaderModule(ShaderModuleId),
    DestroyBuffer(BufferId),
    DestroyShaderModule(ShaderModuleId),
    WriteBuffer {
        buffer: BufferId,
        offset: u64,
        data: Vec<u8>,
    },
    ClearColor(LinearRgba),
    ClearDepth(f32),
    SetInputLayout,
    SetVertexBuffer {
        slot: u32,
        buffer: BufferId,
        stride: u32,
    },
    SetIndexBuffer {
        buffer: BufferId,
        format: IndexFormat,
    },
    SetTopology(PrimitiveTopology),
    BindVertexShader(ShaderModuleId),
    BindPixelShader(ShaderModuleId),
    BindConstantBuffer {
        slot: u32,
        buffer: BufferId,
    },
    DrawIndexed {
        index_count: u32,
        first_index: u32,
        base_vertex: i32,
    },
}

/// A `GraphicsDevice` double that records every call and mirrors buffer
/// contents in CPU memory.
#[derive(Debug, Default)]
pub(crate) struct RecordingDevice {
    log: Arc<Mutex<Vec<Event>>>,
    next_id: AtomicUsize,
    creations: AtomicUsize,
    fail_creations_from: Mutex<Option<usize>>,
    buffers: Mutex<HashMap<BufferId, Vec<u8>>>,
    shaders: Mutex<HashSet<ShaderModuleId>>,
}

impl RecordingDevice {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns a context that appends to this device's event log.
    pub(crate) fn context(&self) -> RecordingContext {
        RecordingContext {
            log: Arc::clone(&self.log),
            submissions: 0,
            fail_submissions_from: None,
        }
    }

    /// Snapshot of every recorded event, in call order.
    pub(crate) fn events(&self) -> Vec<Event> {
        self.log.lock().unwrap().clone()
    }

    /// The current bytes of a live buffer.
    pub(crate) fn buffer_bytes(&self, id: BufferId) -> Option<Vec<u8>> {
        self.buffers.lock().unwrap().get(&id).cloned()
    }

    /// The number of buffers created and not yet destroyed.
    pub(crate) fn live_buffer_count(&self) -> usize {
        self.buffers.lock().unwrap().len()
    }

    /// The number of shader modules created and not yet destroyed.
    pub(crate) fn live_shader_count(&self) -> usize {
        self.shaders.lock().unwrap().len()
    }

    /// Makes every resource creation starting at the zero-based index `from`
    /// fail with a backend error.
    pub(crate) fn fail_creations_from(&self, from: usize) {
        *self.fail_creations_from.lock().unwrap() = Some(from);
    }

    fn check_creation(&self) -> Result<(), ResourceError> {
        let index = self.creations.fetch_add(1, Ordering::SeqCst);
        if let Some(from) = *self.fail_creations_from.lock().unwrap() {
            if index >= from {
                return Err(ResourceError::BackendError(
                    "injected creation failure".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn record(&self, event: Event) {
        self.log.lock().unwrap().push(event);
    }
}

impl GraphicsDevice for RecordingDevice {
    fn create_shader_module(
        &self,
        _descriptor: &ShaderModuleDescriptor,
    ) -> Result<ShaderModuleId, ResourceError> {
        self.check_creation()?;
        let id = ShaderModuleId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.shaders.lock().unwrap().insert(id);
        self.record(Event::CreateShaderModule(id));
        Ok(id)
    }

    fn destroy_shader_module(&self, id: ShaderModuleId) -> Result<(), ResourceError> {
        if !self.shaders.lock().unwrap().remove(&id) {
            return Err(ResourceError::InvalidHandle);
        }
        self.record(Event::DestroyShaderModule(id));
        Ok(())
    }

    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError> {
        self.check_creation()?;
        let id = BufferId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.buffers
            .lock()
            .unwrap()
            .insert(id, vec![0u8; descriptor.size as usize]);
        self.record(Event::CreateBuffer(id));
        Ok(id)
    }

    fn create_buffer_with_data(
        &self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> Result<BufferId, ResourceError> {
        let id = self.create_buffer(descriptor)?;
        self.write_buffer(id, 0, data)?;
        Ok(id)
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        if self.buffers.lock().unwrap().remove(&id).is_none() {
            return Err(ResourceError::InvalidHandle);
        }
        self.record(Event::DestroyBuffer(id));
        Ok(())
    }

    fn write_buffer(&self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), ResourceError> {
        let mut buffers = self.buffers.lock().unwrap();
        let backing = buffers.get_mut(&id).ok_or(ResourceError::InvalidHandle)?;
        let start = offset as usize;
        let end = start + data.len();
        if end > backing.len() {
            return Err(ResourceError::OutOfBounds);
        }
        backing[start..end].copy_from_slice(data);
        drop(buffers);
        self.record(Event::WriteBuffer {
            buffer: id,
            offset,
            data: data.to_vec(),
        });
        Ok(())
    }
}

/// A `DeviceContext` double sharing the owning device's event log.
pub(crate) struct RecordingContext {
    log: Arc<Mutex<Vec<Event>>>,
    submissions: usize,
    fail_submissions_from: Option<usize>,
}

impl RecordingContext {
    /// Makes every submission call starting at the zero-based index `from`
    /// fail as rejected.
    pub(crate) fn fail_submissions_from(&mut self, from: usize) {
        self.fail_submissions_from = Some(from);
    }

    fn submit(&mut self, event: Event) -> Result<(), RenderError> {
        let index = self.submissions;
        self.submissions += 1;
        if let Some(from) = self.fail_submissions_from {
            if index >= from {
                return Err(RenderError::SubmissionRejected(
                    "injected submission failure".to_string(),
                ));
            }
        }
        self.log.lock().unwrap().push(event);
        Ok(())
    }
}

impl DeviceContext for RecordingContext {
    fn clear_color_target(&mut self, color: LinearRgba) -> Result<(), RenderError> {
        self.submit(Event::ClearColor(color))
    }

    fn clear_depth_target(&mut self, depth: f32) -> Result<(), RenderError> {
        self.submit(Event::ClearDepth(depth))
    }

    fn set_input_layout(
        &mut self,
        _layout: &VertexBufferLayoutDescriptor,
    ) -> Result<(), RenderError> {
        self.submit(Event::SetInputLayout)
    }

    fn set_vertex_buffer(
        &mut self,
        slot: u32,
        buffer: BufferId,
        stride: u32,
    ) -> Result<(), RenderError> {
        self.submit(Event::SetVertexBuffer {
            slot,
            buffer,
            stride,
        })
    }

    fn set_index_buffer(
        &mut self,
        buffer: BufferId,
        format: IndexFormat,
    ) -> Result<(), RenderError> {
        self.submit(Event::SetIndexBuffer { buffer, format })
    }

    fn set_primitive_topology(&mut self, topology: PrimitiveTopology) -> Result<(), RenderError> {
        self.submit(Event::SetTopology(topology))
    }

    fn bind_vertex_shader(&mut self, module: ShaderModuleId) -> Result<(), RenderError> {
        self.submit(Event::BindVertexShader(module))
    }

    fn bind_pixel_shader(&mut self, module: ShaderModuleId) -> Result<(), RenderError> {
        self.submit(Event::BindPixelShader(module))
    }

    fn bind_vertex_constant_buffer(
        &mut self,
        slot: u32,
        buffer: BufferId,
    ) -> Result<(), RenderError> {
        self.submit(Event::BindConstantBuffer { slot, buffer })
    }

    fn draw_indexed(
        &mut self,
        index_count: u32,
        first_index: u32,
        base_vertex: i32,
    ) -> Result<(), RenderError> {
        self.submit(Event::DrawIndexed {
            index_count,
            first_index,
            base_vertex,
        })
    }
}
