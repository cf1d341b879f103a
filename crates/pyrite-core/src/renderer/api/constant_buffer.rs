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

//! A typed, single-value GPU constant buffer.

use crate::renderer::api::{BufferDescriptor, BufferId, BufferUsage};
use crate::renderer::error::ResourceError;
use crate::renderer::traits::GraphicsDevice;
use std::borrow::Cow;
use std::mem;

/// A GPU-resident buffer holding exactly one value of a fixed-layout record `T`.
///
/// The buffer is allocated once at construction, sized to `size_of::<T>()`,
/// and usable as a shader constant. Writing replaces the whole value; the
/// GPU-visible contents always equal the most recent write by the time the
/// next draw that binds this buffer executes. No history is kept.
#[derive(Debug)]
pub struct ConstantBuffer<T: bytemuck::Pod> {
    buffer: Option<BufferId>,
    value: T,
}

impl<T: bytemuck::Pod> ConstantBuffer<T> {
    /// Allocates the underlying GPU buffer on `device`.
    pub fn new(device: &dyn GraphicsDevice) -> Result<Self, ResourceError> {
        let buffer = device.create_buffer(&BufferDescriptor {
            label: Some(Cow::Owned(format!(
                "constants<{}>",
                std::any::type_name::<T>()
            ))),
            size: mem::size_of::<T>() as u64,
            usage: BufferUsage::UNIFORM | BufferUsage::COPY_DST,
        })?;
        Ok(Self {
            buffer: Some(buffer),
            value: T::zeroed(),
        })
    }

    /// Stores `value` and uploads its bytes verbatim at offset 0.
    pub fn write(&mut self, device: &dyn GraphicsDevice, value: T) -> Result<(), ResourceError> {
        let buffer = self.buffer.ok_or(ResourceError::InvalidHandle)?;
        self.value = value;
        device.write_buffer(buffer, 0, bytemuck::bytes_of(&self.value))
    }

    /// Returns the most recently written value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Returns the handle of the underlying GPU buffer, or `None` once destroyed.
    pub fn id(&self) -> Option<BufferId> {
        self.buffer
    }

    /// Releases the underlying GPU buffer. Calling this more than once is a
    /// no-op; a failed release is logged and never propagated.
    pub fn destroy(&mut self, device: &dyn GraphicsDevice) {
        if let Some(buffer) = self.buffer.take() {
            if let Err(e) = device.destroy_buffer(buffer) {
                log::warn!("ConstantBuffer: failed to destroy buffer {buffer:?}: {e}");
            }
        }
    }
}
