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

// Pyrite Sandbox
// Render-loop driver for the spinning cube field demo.

use anyhow::{Context, Result};
use pyrite_core::renderer::traits::GraphicsDevice;
use pyrite_core::scene::SceneRenderer;
use pyrite_infra::{WgpuDevice, WgpuFrameContext, WgpuGraphicsContext};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Both shader stages consume the transposed transform convention: the
/// vertex is multiplied with the vector on the left.
const CUBE_SHADER: &str = r#"
struct Transforms {
    world: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
};

@group(0) @binding(0) var<uniform> transforms: Transforms;

struct VsInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct VsOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(in: VsInput) -> VsOutput {
    var out: VsOutput;
    var pos = vec4<f32>(in.position, 1.0);
    pos = pos * transforms.world;
    pos = pos * transforms.view;
    pos = pos * transforms.projection;
    out.position = pos;
    out.color = in.color;
    return out;
}

@fragment
fn ps_main(in: VsOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

struct App {
    window: Option<Arc<Window>>,
    frame: Option<WgpuFrameContext>,
    renderer: Option<SceneRenderer>,
    started: Instant,
}

impl App {
    fn new() -> Self {
        Self {
            window: None,
            frame: None,
            renderer: None,
            started: Instant::now(),
        }
    }

    fn init_graphics(&mut self, window: Arc<Window>) -> Result<()> {
        let context = pollster::block_on(WgpuGraphicsContext::new(window))
            .context("Failed to initialize the graphics context")?;
        let device = Arc::new(WgpuDevice::new(Arc::new(Mutex::new(context))));
        let mut frame = WgpuFrameContext::new(Arc::clone(&device));

        let renderer = SceneRenderer::new(
            device as Arc<dyn GraphicsDevice>,
            &mut frame,
            CUBE_SHADER,
        )
        .context("Failed to create the scene renderer")?;

        self.frame = Some(frame);
        self.renderer = Some(renderer);
        self.started = Instant::now();
        Ok(())
    }

    fn render(&mut self) {
        let total_time = self.started.elapsed().as_secs_f32();
        let (Some(renderer), Some(frame)) = (self.renderer.as_mut(), self.frame.as_mut()) else {
            return;
        };

        match renderer.render_frame(frame, total_time) {
            Ok(stats) => {
                log::trace!("Frame submitted: {} draw calls", stats.draw_calls);
                if let Err(e) = frame.present() {
                    log::error!("Present failed: {e}");
                }
            }
            Err(e) => {
                // The frame is abandoned; the next tick tries again.
                log::error!("Render failed: {e}");
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title("pyrite sandbox")
            .with_inner_size(winit::dpi::PhysicalSize::new(900u32, 900u32));

        let window = match event_loop.create_window(attributes) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        if let Err(e) = self.init_graphics(Arc::clone(&window)) {
            log::error!("Failed to initialize graphics: {e:?}");
            event_loop.exit();
            return;
        }

        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, shutting down...");
                if let Some(mut renderer) = self.renderer.take() {
                    renderer.destroy();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(frame) = self.frame.as_mut() {
                    frame.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed()
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                {
                    log::info!("Escape pressed, exiting...");
                    if let Some(mut renderer) = self.renderer.take() {
                        renderer.destroy();
                    }
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    log::info!("Starting pyrite sandbox");

    let event_loop = EventLoop::new()?;
    let mut app = App::new();
    event_loop.run_app(&mut app)?;
    Ok(())
}
