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

//! The backend-agnostic rendering layer.
//!
//! Resource creation goes through [`GraphicsDevice`], submission through
//! [`DeviceContext`]; both are object-safe so backends plug in behind
//! trait objects. Everything above them (constant buffer, resource scope,
//! scene renderer) is backend-independent.

pub mod api;
pub mod error;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_device;

pub use api::{
    BufferDescriptor, BufferId, BufferUsage, ConstantBuffer, IndexFormat, PrimitiveTopology,
    ResourceScope, ScopedResource, ShaderModuleDescriptor, ShaderModuleId, ShaderSourceData,
    ShaderStage, VertexAttributeDescriptor, VertexBufferLayoutDescriptor, VertexFormat,
};
pub use error::{RenderError, ResourceError, ShaderError};
pub use traits::{DeviceContext, GraphicsDevice};
