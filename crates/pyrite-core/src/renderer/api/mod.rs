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

//! Backend-agnostic resource descriptors, opaque handles, and the typed
//! constant buffer and resource scope built on top of them.

pub mod buffer;
pub mod constant_buffer;
pub mod pipeline;
pub mod scope;
pub mod shader;

pub use self::buffer::{BufferDescriptor, BufferId, BufferUsage};
pub use self::constant_buffer::ConstantBuffer;
pub use self::pipeline::{
    IndexFormat, PrimitiveTopology, VertexAttributeDescriptor, VertexBufferLayoutDescriptor,
    VertexFormat,
};
pub use self::scope::{ResourceScope, ScopedResource};
pub use self::shader::{ShaderModuleDescriptor, ShaderModuleId, ShaderSourceData, ShaderStage};
