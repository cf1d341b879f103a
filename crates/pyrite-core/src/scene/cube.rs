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

//! The fixed cube geometry reused for every instance drawn.

use crate::renderer::api::{
    VertexAttributeDescriptor, VertexBufferLayoutDescriptor, VertexFormat,
};
use std::borrow::Cow;
use std::mem;

/// A single cube vertex: a position and an RGBA color, packed contiguously.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Linear RGBA color.
    pub color: [f32; 4],
}

impl Vertex {
    /// The size of one vertex in bytes.
    pub const SIZE: usize = mem::size_of::<Self>();

    const ATTRIBUTES: [VertexAttributeDescriptor; 2] = [
        // @location(0) in shader: position
        VertexAttributeDescriptor {
            shader_location: 0,
            format: VertexFormat::Float32x3,
            offset: 0,
        },
        // @location(1) in shader: color
        VertexAttributeDescriptor {
            shader_location: 1,
            format: VertexFormat::Float32x4,
            offset: mem::size_of::<[f32; 3]>() as u64,
        },
    ];

    /// The input-layout description of the cube vertex buffer.
    pub fn buffer_layout<'a>() -> VertexBufferLayoutDescriptor<'a> {
        VertexBufferLayoutDescriptor {
            array_stride: Self::SIZE as u64,
            attributes: Cow::Borrowed(&Self::ATTRIBUTES),
        }
    }
}

const fn vertex(position: [f32; 3], color: [f32; 4]) -> Vertex {
    Vertex { position, color }
}

/// The eight corners of the unit cube, each with a distinct color.
#[rustfmt::skip]
pub const VERTICES: [Vertex; 8] = [
    vertex([-1.0,  1.0, -1.0], [0.0, 0.0, 1.0, 1.0]),
    vertex([ 1.0,  1.0, -1.0], [0.0, 1.0, 0.0, 1.0]),
    vertex([ 1.0,  1.0,  1.0], [0.0, 1.0, 1.0, 1.0]),
    vertex([-1.0,  1.0,  1.0], [1.0, 0.0, 0.0, 1.0]),
    vertex([-1.0, -1.0, -1.0], [1.0, 0.0, 1.0, 1.0]),
    vertex([ 1.0, -1.0, -1.0], [1.0, 1.0, 0.0, 1.0]),
    vertex([ 1.0, -1.0,  1.0], [1.0, 1.0, 1.0, 1.0]),
    vertex([-1.0, -1.0,  1.0], [0.0, 0.0, 0.0, 1.0]),
];

/// The twelve triangles of the cube, two per face.
#[rustfmt::skip]
pub const INDICES: [u16; 36] = [
    3, 1, 0,
    2, 1, 3,

    0, 5, 4,
    1, 5, 0,

    3, 4, 7,
    0, 4, 3,

    1, 6, 5,
    2, 6, 1,

    2, 7, 6,
    3, 7, 2,

    6, 4, 5,
    7, 4, 6,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_28_bytes() {
        // 3 floats of position + 4 floats of color, 4-byte packed.
        assert_eq!(Vertex::SIZE, 28);
    }

    #[test]
    fn layout_matches_vertex_fields() {
        let layout = Vertex::buffer_layout();
        assert_eq!(layout.array_stride, Vertex::SIZE as u64);
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(
            layout.attributes[0].format.size() + layout.attributes[1].format.size(),
            layout.array_stride
        );
    }

    #[test]
    fn indices_form_twelve_triangles_over_eight_vertices() {
        assert_eq!(INDICES.len(), 36);
        assert!(INDICES.iter().all(|&i| (i as usize) < VERTICES.len()));

        // Every vertex is referenced by at least one triangle.
        for v in 0..VERTICES.len() as u16 {
            assert!(INDICES.contains(&v), "vertex {v} is unused");
        }
    }
}
