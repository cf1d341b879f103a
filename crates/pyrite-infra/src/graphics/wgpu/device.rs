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

use pyrite_core::renderer::api::{
    BufferDescriptor, BufferId, BufferUsage, ShaderModuleDescriptor, ShaderModuleId,
    ShaderSourceData,
};
use pyrite_core::renderer::error::{ResourceError, ShaderError};
use pyrite_core::renderer::traits::GraphicsDevice;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wgpu::util::DeviceExt;

use super::context::WgpuGraphicsContext;
use super::conversions::IntoWgpu;

#[derive(Debug)]
struct WgpuShaderModuleEntry {
    module: Arc<wgpu::ShaderModule>,
    entry_point: String,
}

#[derive(Debug)]
struct WgpuBufferEntry {
    buffer: Arc<wgpu::Buffer>,
    /// CPU mirror of the last written contents, kept for uniform buffers so
    /// the frame context can snapshot per-draw values at bind time.
    shadow: Option<Vec<u8>>,
}

/// The internal, non-clonable state of the [`WgpuDevice`].
#[derive(Debug)]
struct WgpuDeviceInternal {
    context: Arc<Mutex<WgpuGraphicsContext>>,
    shader_modules: Mutex<HashMap<ShaderModuleId, WgpuShaderModuleEntry>>,
    buffers: Mutex<HashMap<BufferId, WgpuBufferEntry>>,

    next_shader_id: AtomicUsize,
    next_buffer_id: AtomicUsize,
}

/// A clonable, thread-safe handle to the WGPU graphics device.
///
/// Implements the core's [`GraphicsDevice`] contract over id→resource tables
/// behind a shared handle, so command recording and resource creation can
/// share one device.
#[derive(Clone, Debug)]
pub struct WgpuDevice {
    internal: Arc<WgpuDeviceInternal>,
}

impl WgpuDevice {
    /// Wraps an initialized graphics context in a device handle.
    pub fn new(context: Arc<Mutex<WgpuGraphicsContext>>) -> Self {
        Self {
            internal: Arc::new(WgpuDeviceInternal {
                context,
                shader_modules: Mutex::new(HashMap::new()),
                buffers: Mutex::new(HashMap::new()),
                next_shader_id: AtomicUsize::new(0),
                next_buffer_id: AtomicUsize::new(0),
            }),
        }
    }

    fn generate_shader_id(&self) -> ShaderModuleId {
        ShaderModuleId(self.internal.next_shader_id.fetch_add(1, Ordering::Relaxed))
    }

    fn generate_buffer_id(&self) -> BufferId {
        BufferId(self.internal.next_buffer_id.fetch_add(1, Ordering::Relaxed))
    }

    /// The graphics context this device submits through.
    pub(crate) fn context(&self) -> Arc<Mutex<WgpuGraphicsContext>> {
        Arc::clone(&self.internal.context)
    }

    /// Retrieves a reference-counted pointer to the internal WGPU buffer.
    /// Returns `None` if the ID is invalid.
    pub(crate) fn get_wgpu_buffer(&self, id: BufferId) -> Option<Arc<wgpu::Buffer>> {
        let buffers = self.internal.buffers.lock().unwrap();
        buffers.get(&id).map(|entry| Arc::clone(&entry.buffer))
    }

    /// Retrieves the module and entry point of a compiled shader.
    /// Returns `None` if the ID is invalid.
    pub(crate) fn get_shader_entry(
        &self,
        id: ShaderModuleId,
    ) -> Option<(Arc<wgpu::ShaderModule>, String)> {
        let modules = self.internal.shader_modules.lock().unwrap();
        modules
            .get(&id)
            .map(|entry| (Arc::clone(&entry.module), entry.entry_point.clone()))
    }

    /// The CPU mirror of a uniform buffer's last written contents.
    /// Returns `None` for unknown ids and for non-uniform buffers.
    pub(crate) fn uniform_shadow(&self, id: BufferId) -> Option<Vec<u8>> {
        let buffers = self.internal.buffers.lock().unwrap();
        buffers.get(&id).and_then(|entry| entry.shadow.clone())
    }
}

impl GraphicsDevice for WgpuDevice {
    fn create_shader_module(
        &self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<ShaderModuleId, ResourceError> {
        let wgpu_source = match &descriptor.source {
            ShaderSourceData::Wgsl(cow_str) => wgpu::ShaderSource::Wgsl(cow_str.clone()),
        };

        let context = self.internal.context.lock().map_err(|e| {
            ResourceError::BackendError(format!("Mutex poisoned (context): {e}"))
        })?;

        context.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = context.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: descriptor.label,
            source: wgpu_source,
        });
        if let Some(error) = pollster::block_on(context.device.pop_error_scope()) {
            return Err(ShaderError::CompilationError {
                label: descriptor.label.unwrap_or_default().to_string(),
                details: error.to_string(),
            }
            .into());
        }
        drop(context);

        let id = self.generate_shader_id();
        self.internal.shader_modules.lock().unwrap().insert(
            id,
            WgpuShaderModuleEntry {
                module: Arc::new(module),
                entry_point: descriptor.entry_point.to_string(),
            },
        );

        log::debug!(
            "WgpuDevice: created shader module '{:?}' with ID: {id:?}",
            descriptor.label.unwrap_or_default()
        );
        Ok(id)
    }

    fn destroy_shader_module(&self, id: ShaderModuleId) -> Result<(), ResourceError> {
        let mut modules = self.internal.shader_modules.lock().unwrap();
        if modules.remove(&id).is_some() {
            log::debug!("WgpuDevice: destroyed shader module with ID: {id:?}");
            Ok(())
        } else {
            Err(ShaderError::NotFound { id }.into())
        }
    }

    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError> {
        let context = self.internal.context.lock().unwrap();

        let buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: descriptor.label.as_deref(),
            size: descriptor.size,
            usage: descriptor.usage.into_wgpu(),
            mapped_at_creation: false,
        });
        drop(context);

        let id = self.generate_buffer_id();
        let shadow = descriptor
            .usage
            .contains(BufferUsage::UNIFORM)
            .then(|| vec![0u8; descriptor.size as usize]);
        self.internal.buffers.lock().unwrap().insert(
            id,
            WgpuBufferEntry {
                buffer: Arc::new(buffer),
                shadow,
            },
        );

        log::debug!(
            "WgpuDevice: created buffer '{:?}' with ID: {id:?}, size: {} bytes",
            descriptor.label.as_deref().unwrap_or_default(),
            descriptor.size
        );
        Ok(id)
    }

    fn create_buffer_with_data(
        &self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> Result<BufferId, ResourceError> {
        let context = self.internal.context.lock().unwrap();

        let buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: descriptor.label.as_deref(),
                contents: data,
                usage: descriptor.usage.into_wgpu(),
            });
        drop(context);

        let id = self.generate_buffer_id();
        let shadow = descriptor
            .usage
            .contains(BufferUsage::UNIFORM)
            .then(|| data.to_vec());
        self.internal.buffers.lock().unwrap().insert(
            id,
            WgpuBufferEntry {
                buffer: Arc::new(buffer),
                shadow,
            },
        );

        log::debug!(
            "WgpuDevice: created buffer '{:?}' with initial data. ID: {id:?}, size: {} bytes",
            descriptor.label.as_deref().unwrap_or_default(),
            data.len()
        );
        Ok(id)
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        let mut buffers = self.internal.buffers.lock().unwrap();
        if buffers.remove(&id).is_some() {
            log::debug!("WgpuDevice: destroyed buffer with ID: {id:?}");
            Ok(())
        } else {
            Err(ResourceError::InvalidHandle)
        }
    }

    fn write_buffer(&self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), ResourceError> {
        let mut buffers = self.internal.buffers.lock().unwrap();
        let entry = buffers.get_mut(&id).ok_or(ResourceError::InvalidHandle)?;

        let end_offset = offset + data.len() as u64;
        if end_offset > entry.buffer.size() {
            return Err(ResourceError::OutOfBounds);
        }

        if let Some(shadow) = entry.shadow.as_mut() {
            shadow[offset as usize..end_offset as usize].copy_from_slice(data);
        }

        let context = self.internal.context.lock().unwrap();
        context.queue.write_buffer(&entry.buffer, offset, data);
        Ok(())
    }
}
