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

use crate::math::LinearRgba;
use crate::renderer::api::{
    BufferId, IndexFormat, PrimitiveTopology, ShaderModuleId, VertexBufferLayoutDescriptor,
};
use crate::renderer::error::RenderError;

/// The submission contract of the graphics backend.
///
/// A `DeviceContext` is an immediate, stateful command stream: binds persist
/// until replaced, and every call is recorded in program order on one logical
/// queue. There is no return payload beyond the error channel; a rejected
/// call poisons nothing and the caller decides whether to abandon the frame.
///
/// Ordering is a correctness contract, not an optimization: a constant-buffer
/// write issued through the [`GraphicsDevice`] happens-before the bind that
/// follows it, which happens-before the draw that consumes it. Implementations
/// must preserve that chain even when they internally batch submission.
///
/// [`GraphicsDevice`]: crate::renderer::traits::GraphicsDevice
pub trait DeviceContext {
    /// Clears the color target to the given color.
    fn clear_color_target(&mut self, color: LinearRgba) -> Result<(), RenderError>;

    /// Clears the depth target to the given depth value. The stencil aspect,
    /// if any, is left untouched.
    fn clear_depth_target(&mut self, depth: f32) -> Result<(), RenderError>;

    /// Sets the vertex input layout consumed by subsequent draws.
    fn set_input_layout(
        &mut self,
        layout: &VertexBufferLayoutDescriptor,
    ) -> Result<(), RenderError>;

    /// Binds a vertex buffer to the given input slot.
    fn set_vertex_buffer(
        &mut self,
        slot: u32,
        buffer: BufferId,
        stride: u32,
    ) -> Result<(), RenderError>;

    /// Binds an index buffer for indexed drawing.
    fn set_index_buffer(
        &mut self,
        buffer: BufferId,
        format: IndexFormat,
    ) -> Result<(), RenderError>;

    /// Sets how vertex/index data is assembled into primitives.
    fn set_primitive_topology(&mut self, topology: PrimitiveTopology) -> Result<(), RenderError>;

    /// Binds the vertex-stage shader program.
    fn bind_vertex_shader(&mut self, module: ShaderModuleId) -> Result<(), RenderError>;

    /// Binds the pixel-stage shader program.
    fn bind_pixel_shader(&mut self, module: ShaderModuleId) -> Result<(), RenderError>;

    /// Binds a constant buffer to the given vertex-stage slot.
    ///
    /// The draw that follows observes the buffer contents as of this bind.
    fn bind_vertex_constant_buffer(
        &mut self,
        slot: u32,
        buffer: BufferId,
    ) -> Result<(), RenderError>;

    /// Records an indexed draw call over the currently bound state.
    fn draw_indexed(
        &mut self,
        index_count: u32,
        first_index: u32,
        base_vertex: i32,
    ) -> Result<(), RenderError>;
}
