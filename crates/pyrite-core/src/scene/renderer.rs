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

//! The per-frame scene-update-and-draw pipeline.
//!
//! One spinning cube at the origin, a second scaled cube orbiting it, and a
//! 20×20×20 field of copies of the second cube's spin: 8002 indexed draws
//! per frame, each preceded by a constant-buffer write and re-bind. The
//! workload is a stress demo, not an optimization target, but the
//! write→bind→draw ordering per instance is a correctness requirement: the
//! constant buffer holds a single value at a time.

use crate::math::{LinearRgba, Mat4, Vec3, FRAC_PI_2};
use crate::renderer::api::{
    BufferDescriptor, BufferId, BufferUsage, ConstantBuffer, IndexFormat, PrimitiveTopology,
    ResourceScope, ShaderModuleDescriptor, ShaderModuleId, ShaderSourceData, ShaderStage,
};
use crate::renderer::error::{RenderError, ResourceError};
use crate::renderer::traits::{DeviceContext, GraphicsDevice};
use crate::scene::camera::Camera;
use crate::scene::cube;
use std::borrow::Cow;
use std::mem;
use std::sync::Arc;

/// The constant-buffer payload: world, view, and projection matrices, 64
/// bytes each with 4-byte element packing.
///
/// All three matrices are stored as the transpose of the crate's
/// column-vector matrices. Shaders consume them with the vector on the left
/// (`v * M`), which undoes the transpose, so the uploaded bytes are the
/// row-major form of each transform.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniforms {
    /// The object-to-world matrix, transposed.
    pub world: [[f32; 4]; 4],
    /// The world-to-camera matrix, transposed.
    pub view: [[f32; 4]; 4],
    /// The camera-to-clip matrix, transposed.
    pub projection: [[f32; 4]; 4],
}

impl TransformUniforms {
    /// Builds the record from untransposed matrices, applying the transpose
    /// convention uniformly to all three.
    pub fn new(world: &Mat4, view: &Mat4, projection: &Mat4) -> Self {
        Self {
            world: world.transpose().to_cols_array_2d(),
            view: view.transpose().to_cols_array_2d(),
            projection: projection.transpose().to_cols_array_2d(),
        }
    }
}

/// Counters for a single rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// The number of draw calls submitted.
    pub draw_calls: u32,
    /// The total number of triangles submitted.
    pub triangles: u32,
}

impl FrameStats {
    fn record_draw(&mut self, index_count: u32) {
        self.draw_calls += 1;
        self.triangles += index_count / 3;
    }
}

/// The background color every frame clears to.
pub const BACKGROUND_COLOR: LinearRgba = LinearRgba::new(0.5, 0.5, 0.99, 1.0);

/// Edge length of the instance grid, in cubes per axis.
const GRID_EXTENT: i32 = 20;
/// Distance between neighboring grid instances, per axis.
const GRID_SPACING: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RendererState {
    Ready,
    Disposed,
}

/// Owns the cube geometry, the shader program handles, the typed constant
/// buffer and the camera, and turns an elapsed-time value into one frame of
/// GPU submissions.
///
/// The renderer is `Ready` from construction until [`destroy`](Self::destroy)
/// moves it to `Disposed`; rendering is only valid while `Ready`.
pub struct SceneRenderer {
    device: Arc<dyn GraphicsDevice>,
    vertex_shader: ShaderModuleId,
    pixel_shader: ShaderModuleId,
    vertex_buffer: BufferId,
    index_buffer: BufferId,
    constants: ConstantBuffer<TransformUniforms>,
    camera: Camera,
    state: RendererState,
}

impl SceneRenderer {
    /// Creates the renderer: compiles both shader stages, uploads the fixed
    /// cube geometry, allocates the constant buffer, and performs the
    /// one-time input-assembly binds on `ctx`.
    ///
    /// Setup is transactional. Every resource is registered with a
    /// [`ResourceScope`] as it is created; if any step fails, everything
    /// acquired so far is released before the error propagates.
    pub fn new(
        device: Arc<dyn GraphicsDevice>,
        ctx: &mut dyn DeviceContext,
        shader_source: &str,
    ) -> Result<Self, RenderError> {
        let mut scope = ResourceScope::new(device.as_ref());

        let vertex_shader = scope.acquire(device.create_shader_module(&ShaderModuleDescriptor {
            label: Some("cube_vs"),
            source: ShaderSourceData::Wgsl(Cow::Borrowed(shader_source)),
            stage: ShaderStage::Vertex,
            entry_point: "vs_main",
        })?);
        let pixel_shader = scope.acquire(device.create_shader_module(&ShaderModuleDescriptor {
            label: Some("cube_ps"),
            source: ShaderSourceData::Wgsl(Cow::Borrowed(shader_source)),
            stage: ShaderStage::Pixel,
            entry_point: "ps_main",
        })?);

        let vertex_buffer = scope.acquire(device.create_buffer_with_data(
            &BufferDescriptor {
                label: Some(Cow::Borrowed("cube vertices")),
                size: mem::size_of_val(&cube::VERTICES) as u64,
                usage: BufferUsage::VERTEX,
            },
            bytemuck::cast_slice(&cube::VERTICES),
        )?);
        let index_buffer = scope.acquire(device.create_buffer_with_data(
            &BufferDescriptor {
                label: Some(Cow::Borrowed("cube indices")),
                size: mem::size_of_val(&cube::INDICES) as u64,
                usage: BufferUsage::INDEX,
            },
            bytemuck::cast_slice(&cube::INDICES),
        )?);

        let constants = ConstantBuffer::<TransformUniforms>::new(device.as_ref())?;
        let constants_id = constants.id().ok_or(ResourceError::InvalidHandle)?;
        scope.acquire(constants_id);

        // One-time input-assembly state; binds persist on the context.
        ctx.set_input_layout(&cube::Vertex::buffer_layout())?;
        ctx.set_vertex_buffer(0, vertex_buffer, cube::Vertex::SIZE as u32)?;
        ctx.set_index_buffer(index_buffer, IndexFormat::Uint16)?;
        ctx.set_primitive_topology(PrimitiveTopology::TriangleList)?;
        ctx.bind_vertex_constant_buffer(0, constants_id)?;

        // Everything below outlives construction.
        scope.promote(vertex_shader);
        scope.promote(pixel_shader);
        scope.promote(vertex_buffer);
        scope.promote(index_buffer);
        scope.promote(constants_id);
        drop(scope);

        let mut camera = Camera::new_perspective(FRAC_PI_2, 1.0, 0.01, 100.0);
        camera.set_view_params(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO);

        Ok(Self {
            device,
            vertex_shader,
            pixel_shader,
            vertex_buffer,
            index_buffer,
            constants,
            camera,
            state: RendererState::Ready,
        })
    }

    /// Returns the camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Returns the camera mutably, e.g. to track viewport aspect changes.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Renders one frame at `total_time` seconds of elapsed scene time.
    ///
    /// A failed submission abandons the rest of the frame and propagates;
    /// the driver decides whether to try again on the next tick.
    pub fn render_frame(
        &mut self,
        ctx: &mut dyn DeviceContext,
        total_time: f32,
    ) -> Result<FrameStats, RenderError> {
        if self.state != RendererState::Ready {
            return Err(RenderError::Disposed);
        }
        let constants_id = self.constants.id().ok_or(RenderError::Disposed)?;
        let device = Arc::clone(&self.device);
        let mut stats = FrameStats::default();

        ctx.clear_color_target(BACKGROUND_COLOR)?;
        ctx.clear_depth_target(1.0)?;

        let view = self.camera.view();
        let projection = self.camera.projection();
        let index_count = cube::INDICES.len() as u32;

        // First cube: a pure spin about the vertical axis, one radian per
        // second of total time.
        let world = Mat4::from_rotation_y(total_time);
        self.constants
            .write(device.as_ref(), TransformUniforms::new(&world, &view, &projection))?;
        ctx.bind_vertex_shader(self.vertex_shader)?;
        ctx.bind_vertex_constant_buffer(0, constants_id)?;
        ctx.bind_pixel_shader(self.pixel_shader)?;
        ctx.draw_indexed(index_count, 0, 0)?;
        stats.record_draw(index_count);

        // Second cube: shrunk, spinning about its own Z-axis, pushed out on
        // X, orbiting the origin at double speed. Scale is applied to a
        // point first, orbit last.
        let spin = Mat4::from_rotation_z(-total_time);
        let orbit = Mat4::from_rotation_y(-2.0 * total_time);
        let translate = Mat4::from_translation(Vec3::new(-2.0, 0.0, 0.0));
        let scale = Mat4::from_scale(Vec3::splat(0.3));
        let world = orbit * translate * spin * scale;
        self.constants
            .write(device.as_ref(), TransformUniforms::new(&world, &view, &projection))?;
        ctx.bind_vertex_constant_buffer(0, constants_id)?;
        ctx.draw_indexed(index_count, 0, 0)?;
        stats.record_draw(index_count);

        // A centered grid of copies of the spin matrix, 3 units apart per
        // axis. The bind must follow the write it is meant to reflect, for
        // every single instance.
        let min_pos = -(GRID_EXTENT / 2);
        for i in 0..GRID_EXTENT {
            for j in 0..GRID_EXTENT {
                for k in 0..GRID_EXTENT {
                    let position = Vec3::new(
                        (min_pos + i) as f32 * GRID_SPACING,
                        (min_pos + j) as f32 * GRID_SPACING,
                        (min_pos + k) as f32 * GRID_SPACING,
                    );
                    let world = spin.with_translation(position);
                    self.constants.write(
                        device.as_ref(),
                        TransformUniforms::new(&world, &view, &projection),
                    )?;
                    ctx.bind_vertex_constant_buffer(0, constants_id)?;
                    ctx.draw_indexed(index_count, 0, 0)?;
                    stats.record_draw(index_count);
                }
            }
        }

        Ok(stats)
    }

    /// Releases every GPU resource the renderer owns, exactly once.
    ///
    /// Safe to call repeatedly; failures are logged and never propagate, so
    /// teardown cannot fail.
    pub fn destroy(&mut self) {
        if self.state == RendererState::Disposed {
            return;
        }
        self.state = RendererState::Disposed;

        let device = self.device.as_ref();
        if let Err(e) = device.destroy_shader_module(self.vertex_shader) {
            log::warn!("SceneRenderer: failed to release vertex shader: {e}");
        }
        if let Err(e) = device.destroy_shader_module(self.pixel_shader) {
            log::warn!("SceneRenderer: failed to release pixel shader: {e}");
        }
        self.constants.destroy(device);
        if let Err(e) = device.destroy_buffer(self.vertex_buffer) {
            log::warn!("SceneRenderer: failed to release vertex buffer: {e}");
        }
        if let Err(e) = device.destroy_buffer(self.index_buffer) {
            log::warn!("SceneRenderer: failed to release index buffer: {e}");
        }
    }
}

impl Drop for SceneRenderer {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{approx_eq, approx_eq_eps, Vec4};
    use crate::renderer::test_device::{Event, RecordingContext, RecordingDevice};

    const TEST_SHADER: &str = "fn vs_main() {} fn ps_main() {}";

    fn build(device: &Arc<RecordingDevice>) -> (SceneRenderer, RecordingContext) {
        let mut ctx = device.context();
        let renderer = SceneRenderer::new(
            Arc::clone(device) as Arc<dyn GraphicsDevice>,
            &mut ctx,
            TEST_SHADER,
        )
        .expect("construction succeeds");
        (renderer, ctx)
    }

    fn uploads(events: &[Event]) -> Vec<TransformUniforms> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::WriteBuffer { data, .. }
                    if data.len() == mem::size_of::<TransformUniforms>() =>
                {
                    Some(bytemuck::pod_read_unaligned::<TransformUniforms>(data))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn construction_performs_one_time_binds() {
        let device = Arc::new(RecordingDevice::new());
        let (renderer, _ctx) = build(&device);
        let constants_id = renderer.constants.id().unwrap();

        let events = device.events();
        let binds: Vec<&Event> = events
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    Event::SetInputLayout
                        | Event::SetVertexBuffer { .. }
                        | Event::SetIndexBuffer { .. }
                        | Event::SetTopology(_)
                        | Event::BindConstantBuffer { .. }
                )
            })
            .collect();
        assert_eq!(
            binds,
            vec![
                &Event::SetInputLayout,
                &Event::SetVertexBuffer {
                    slot: 0,
                    buffer: renderer.vertex_buffer,
                    stride: 28,
                },
                &Event::SetIndexBuffer {
                    buffer: renderer.index_buffer,
                    format: IndexFormat::Uint16,
                },
                &Event::SetTopology(PrimitiveTopology::TriangleList),
                &Event::BindConstantBuffer {
                    slot: 0,
                    buffer: constants_id,
                },
            ]
        );
    }

    #[test]
    fn frame_issues_8002_draws_of_36_indices() {
        let device = Arc::new(RecordingDevice::new());
        let (mut renderer, mut ctx) = build(&device);

        let stats = renderer.render_frame(&mut ctx, 1.25).unwrap();
        assert_eq!(stats.draw_calls, 8002);
        assert_eq!(stats.triangles, 8002 * 12);

        let events = device.events();
        let draws: Vec<&Event> = events
            .iter()
            .filter(|e| matches!(e, Event::DrawIndexed { .. }))
            .collect();
        assert_eq!(draws.len(), 8002);
        assert!(draws.iter().all(|e| matches!(
            e,
            Event::DrawIndexed {
                index_count: 36,
                first_index: 0,
                base_vertex: 0,
            }
        )));
    }

    #[test]
    fn frame_clears_color_and_depth_first() {
        let device = Arc::new(RecordingDevice::new());
        let (mut renderer, mut ctx) = build(&device);
        let construction_events = device.events().len();

        renderer.render_frame(&mut ctx, 0.5).unwrap();

        let events = device.events();
        assert_eq!(
            events[construction_events],
            Event::ClearColor(BACKGROUND_COLOR)
        );
        assert_eq!(events[construction_events + 1], Event::ClearDepth(1.0));
    }

    #[test]
    fn first_upload_at_t0_carries_the_identity_world() {
        let device = Arc::new(RecordingDevice::new());
        let (mut renderer, mut ctx) = build(&device);

        renderer.render_frame(&mut ctx, 0.0).unwrap();

        let records = uploads(&device.events());
        let expected = TransformUniforms::new(
            &Mat4::IDENTITY,
            &renderer.camera().view(),
            &renderer.camera().projection(),
        );
        assert_eq!(records[0], expected);
        assert_eq!(records[0].world, Mat4::IDENTITY.to_cols_array_2d());
    }

    #[test]
    fn every_draw_observes_the_write_bound_before_it() {
        let device = Arc::new(RecordingDevice::new());
        let (mut renderer, mut ctx) = build(&device);
        let skip = device.events().len();

        renderer.render_frame(&mut ctx, 2.0).unwrap();

        // Between any two consecutive draws there is exactly one constant
        // write followed by one re-bind, in that order.
        let events = device.events().split_off(skip);
        let mut last_op = None;
        let mut draws = 0;
        for event in &events {
            match event {
                Event::WriteBuffer { .. } => {
                    assert_ne!(last_op, Some("write"), "two writes without a bind");
                    last_op = Some("write");
                }
                Event::BindConstantBuffer { .. } => {
                    assert_eq!(last_op, Some("write"), "bind without a preceding write");
                    last_op = Some("bind");
                }
                Event::DrawIndexed { .. } => {
                    draws += 1;
                    assert_ne!(last_op, Some("write"), "draw consumed an unbound write");
                    last_op = Some("draw");
                }
                _ => {}
            }
        }
        assert_eq!(draws, 8002);
    }

    #[test]
    fn grid_uploads_carry_the_spin_matrix_at_each_lattice_point() {
        let device = Arc::new(RecordingDevice::new());
        let (mut renderer, mut ctx) = build(&device);

        let t = 1.7;
        renderer.render_frame(&mut ctx, t).unwrap();

        let records = uploads(&device.events());
        assert_eq!(records.len(), 8002);

        let view = renderer.camera().view();
        let projection = renderer.camera().projection();
        let spin = Mat4::from_rotation_z(-t);

        // Instance (i, j, k) sits at ((i-10)*3, (j-10)*3, (k-10)*3) with the
        // spin's rotation part unchanged.
        let mut index = 2;
        for i in 0..20 {
            for j in 0..20 {
                for k in 0..20 {
                    let position = Vec3::new(
                        (i - 10) as f32 * 3.0,
                        (j - 10) as f32 * 3.0,
                        (k - 10) as f32 * 3.0,
                    );
                    let expected = TransformUniforms::new(
                        &spin.with_translation(position),
                        &view,
                        &projection,
                    );
                    assert_eq!(records[index], expected, "instance ({i}, {j}, {k})");
                    index += 1;
                }
            }
        }
    }

    #[test]
    fn cube2_world_composes_scale_spin_translate_orbit() {
        let t = 0.9;
        let spin = Mat4::from_rotation_z(-t);
        let orbit = Mat4::from_rotation_y(-2.0 * t);
        let translate = Mat4::from_translation(Vec3::new(-2.0, 0.0, 0.0));
        let scale = Mat4::from_scale(Vec3::splat(0.3));
        let world = orbit * translate * spin * scale;

        // Uniform scale: the volume scaling factor is 0.3³.
        assert!(approx_eq_eps(world.determinant(), 0.3f32.powi(3), 1e-4));

        // Each basis column keeps length 0.3 under the rotations.
        for col in 0..3 {
            assert!(approx_eq(world.cols[col].truncate().length(), 0.3));
        }

        // The cube's center ends up where the orbit carries the offset.
        let center = world * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let expected = orbit * Vec4::new(-2.0, 0.0, 0.0, 1.0);
        assert!(approx_eq(center.x, expected.x));
        assert!(approx_eq(center.y, expected.y));
        assert!(approx_eq(center.z, expected.z));
    }

    #[test]
    fn destroy_releases_each_resource_exactly_once() {
        let device = Arc::new(RecordingDevice::new());
        let (mut renderer, _ctx) = build(&device);

        renderer.destroy();
        renderer.destroy();

        let destroys = device
            .events()
            .into_iter()
            .filter(|e| matches!(e, Event::DestroyBuffer(_) | Event::DestroyShaderModule(_)))
            .count();
        assert_eq!(destroys, 5);
        assert_eq!(device.live_buffer_count(), 0);
        assert_eq!(device.live_shader_count(), 0);
    }

    #[test]
    fn drop_tears_down_like_destroy() {
        let device = Arc::new(RecordingDevice::new());
        {
            let (_renderer, _ctx) = build(&device);
        }
        assert_eq!(device.live_buffer_count(), 0);
        assert_eq!(device.live_shader_count(), 0);
    }

    #[test]
    fn render_after_destroy_is_rejected() {
        let device = Arc::new(RecordingDevice::new());
        let (mut renderer, mut ctx) = build(&device);

        renderer.destroy();
        let result = renderer.render_frame(&mut ctx, 1.0);
        assert!(matches!(result, Err(RenderError::Disposed)));
    }

    #[test]
    fn construction_failure_releases_everything_acquired() {
        let device = Arc::new(RecordingDevice::new());
        // Shaders and vertex buffer succeed, the index buffer creation fails.
        device.fail_creations_from(3);

        let mut ctx = device.context();
        let result = SceneRenderer::new(
            Arc::clone(&device) as Arc<dyn GraphicsDevice>,
            &mut ctx,
            TEST_SHADER,
        );

        assert!(result.is_err());
        assert_eq!(device.live_buffer_count(), 0);
        assert_eq!(device.live_shader_count(), 0);
    }

    #[test]
    fn submission_failure_abandons_the_frame() {
        let device = Arc::new(RecordingDevice::new());
        let (mut renderer, mut ctx) = build(&device);

        // Fail somewhere in the middle of the grid.
        ctx.fail_submissions_from(100);
        let result = renderer.render_frame(&mut ctx, 0.3);
        assert!(matches!(result, Err(RenderError::SubmissionRejected(_))));
    }
}
