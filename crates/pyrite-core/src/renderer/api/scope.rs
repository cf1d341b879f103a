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

//! A rollback group for transient setup-time GPU resources.

use crate::renderer::api::{BufferId, ShaderModuleId};
use crate::renderer::traits::GraphicsDevice;

/// A GPU resource handle registered with a [`ResourceScope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopedResource {
    /// A buffer handle.
    Buffer(BufferId),
    /// A shader module handle.
    ShaderModule(ShaderModuleId),
}

impl From<BufferId> for ScopedResource {
    fn from(id: BufferId) -> Self {
        ScopedResource::Buffer(id)
    }
}

impl From<ShaderModuleId> for ScopedResource {
    fn from(id: ShaderModuleId) -> Self {
        ScopedResource::ShaderModule(id)
    }
}

/// Groups resources acquired during a multi-step initialization sequence so
/// that every exit path releases them deterministically.
///
/// Resources are registered with [`acquire`](Self::acquire) as they are
/// created. If the sequence fails partway (an early return through `?`),
/// dropping the scope releases everything still registered, newest first,
/// since later acquisitions may depend on earlier ones. Resources that
/// survive initialization are excluded with [`promote`](Self::promote)
/// before the scope closes, transferring ownership to the longer-lived
/// owner.
///
/// Release is best-effort: a failed destroy is logged and never panics.
pub struct ResourceScope<'a> {
    device: &'a dyn GraphicsDevice,
    acquired: Vec<ScopedResource>,
}

impl<'a> ResourceScope<'a> {
    /// Creates an empty scope releasing through `device`.
    pub fn new(device: &'a dyn GraphicsDevice) -> Self {
        Self {
            device,
            acquired: Vec::new(),
        }
    }

    /// Registers `resource` for release at scope exit and hands it back.
    pub fn acquire<R>(&mut self, resource: R) -> R
    where
        R: Into<ScopedResource> + Copy,
    {
        self.acquired.push(resource.into());
        resource
    }

    /// Removes `resource` from the group without releasing it.
    ///
    /// Promoting a resource that was never acquired (or was already promoted)
    /// is a no-op.
    pub fn promote<R>(&mut self, resource: R)
    where
        R: Into<ScopedResource> + Copy,
    {
        let target = resource.into();
        if let Some(position) = self.acquired.iter().rposition(|r| *r == target) {
            self.acquired.remove(position);
        }
    }

    /// Returns the number of resources still registered for release.
    pub fn pending(&self) -> usize {
        self.acquired.len()
    }
}

impl Drop for ResourceScope<'_> {
    fn drop(&mut self) {
        // Reverse acquisition order: later resources may depend on earlier ones.
        while let Some(resource) = self.acquired.pop() {
            let result = match resource {
                ScopedResource::Buffer(id) => self.device.destroy_buffer(id),
                ScopedResource::ShaderModule(id) => self.device.destroy_shader_module(id),
            };
            if let Err(e) = result {
                log::warn!("ResourceScope: failed to release {resource:?}: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::{BufferDescriptor, BufferUsage, ShaderModuleDescriptor, ShaderModuleId, ShaderSourceData, ShaderStage};
    use crate::renderer::error::ResourceError;
    use crate::renderer::test_device::{Event, RecordingDevice};
    use std::borrow::Cow;

    fn make_buffer(device: &RecordingDevice, size: u64) -> Result<BufferId, ResourceError> {
        device.create_buffer(&BufferDescriptor {
            label: None,
            size,
            usage: BufferUsage::VERTEX,
        })
    }

    fn make_shader(device: &RecordingDevice) -> Result<ShaderModuleId, ResourceError> {
        device.create_shader_module(&ShaderModuleDescriptor {
            label: None,
            source: ShaderSourceData::Wgsl(Cow::Borrowed("fn vs_main() {}")),
            stage: ShaderStage::Vertex,
            entry_point: "vs_main",
        })
    }

    #[test]
    fn releases_everything_in_reverse_order_on_drop() {
        let device = RecordingDevice::new();
        let shader;
        let first;
        let second;
        {
            let mut scope = ResourceScope::new(&device);
            shader = scope.acquire(make_shader(&device).unwrap());
            first = scope.acquire(make_buffer(&device, 16).unwrap());
            second = scope.acquire(make_buffer(&device, 32).unwrap());
        }

        let releases: Vec<Event> = device
            .events()
            .into_iter()
            .filter(|e| matches!(e, Event::DestroyBuffer(_) | Event::DestroyShaderModule(_)))
            .collect();
        assert_eq!(
            releases,
            vec![
                Event::DestroyBuffer(second),
                Event::DestroyBuffer(first),
                Event::DestroyShaderModule(shader),
            ]
        );
    }

    #[test]
    fn promoted_resources_survive_scope_exit() {
        let device = RecordingDevice::new();
        let kept;
        let dropped;
        {
            let mut scope = ResourceScope::new(&device);
            kept = scope.acquire(make_buffer(&device, 16).unwrap());
            dropped = scope.acquire(make_buffer(&device, 32).unwrap());
            scope.promote(kept);
            assert_eq!(scope.pending(), 1);
        }

        let events = device.events();
        assert!(!events.contains(&Event::DestroyBuffer(kept)));
        assert!(events.contains(&Event::DestroyBuffer(dropped)));
    }

    #[test]
    fn failure_mid_sequence_rolls_back_prior_steps_exactly_once() {
        let device = RecordingDevice::new();
        // The third resource creation is rejected by the backend.
        device.fail_creations_from(2);

        let attempt = || -> Result<(BufferId, BufferId, BufferId), ResourceError> {
            let mut scope = ResourceScope::new(&device);
            let a = scope.acquire(make_buffer(&device, 16)?);
            let b = scope.acquire(make_buffer(&device, 32)?);
            let c = scope.acquire(make_buffer(&device, 64)?);
            scope.promote(a);
            scope.promote(b);
            scope.promote(c);
            Ok((a, b, c))
        };

        assert!(attempt().is_err());

        let destroys: Vec<Event> = device
            .events()
            .into_iter()
            .filter(|e| matches!(e, Event::DestroyBuffer(_)))
            .collect();
        // Steps 1..N-1 released exactly once, newest first.
        assert_eq!(destroys.len(), 2);
        assert_eq!(device.live_buffer_count(), 0);
    }

    #[test]
    fn promote_of_unknown_resource_is_a_no_op() {
        let device = RecordingDevice::new();
        let stray = make_buffer(&device, 8).unwrap();
        {
            let mut scope = ResourceScope::new(&device);
            scope.promote(stray);
            assert_eq!(scope.pending(), 0);
        }
        assert!(!device.events().contains(&Event::DestroyBuffer(stray)));
    }
}
