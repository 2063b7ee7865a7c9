//! egui integration: winit input in, wgpu draw calls out.

use egui::{ClippedPrimitive, Context, TexturesDelta, ViewportId};
use egui_wgpu::ScreenDescriptor;
use renderer::Overlay;
use wgpu::{CommandBuffer, CommandEncoder, Device, Queue, RenderPass, TextureFormat};
use winit::event::WindowEvent;
use winit::window::Window;

struct PreparedFrame {
    primitives: Vec<ClippedPrimitive>,
    textures: TexturesDelta,
    screen: ScreenDescriptor,
}

pub struct EguiOverlay {
    ctx: Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    frame: Option<PreparedFrame>,
}

impl EguiOverlay {
    pub fn new(window: &Window, device: &Device, format: TextureFormat) -> Self {
        let ctx = Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(device, format, None, 1, false);
        Self {
            ctx,
            state,
            renderer,
            frame: None,
        }
    }

    /// Feed a window event to egui. `consumed` means the UI owns it.
    pub fn on_window_event(
        &mut self,
        window: &Window,
        event: &WindowEvent,
    ) -> egui_winit::EventResponse {
        self.state.on_window_event(window, event)
    }

    #[inline]
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Run the UI closure and tessellate the result for this frame.
    pub fn run(&mut self, window: &Window, build_ui: impl FnMut(&Context)) {
        let input = self.state.take_egui_input(window);
        let output = self.ctx.run(input, build_ui);
        self.state
            .handle_platform_output(window, output.platform_output);

        let primitives = self.ctx.tessellate(output.shapes, output.pixels_per_point);
        let size = window.inner_size();
        self.frame = Some(PreparedFrame {
            primitives,
            textures: output.textures_delta,
            screen: ScreenDescriptor {
                size_in_pixels: [size.width, size.height],
                pixels_per_point: output.pixels_per_point,
            },
        });
    }

    /// Release textures egui no longer needs. Call after the frame is submitted.
    pub fn end_frame(&mut self) {
        if let Some(frame) = self.frame.take() {
            for id in &frame.textures.free {
                self.renderer.free_texture(id);
            }
        }
    }
}

impl Overlay for EguiOverlay {
    fn prepare(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
    ) -> Vec<CommandBuffer> {
        let Some(frame) = &self.frame else {
            return Vec::new();
        };
        for (id, delta) in &frame.textures.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }
        self.renderer
            .update_buffers(device, queue, encoder, &frame.primitives, &frame.screen)
    }

    fn paint(&self, pass: &mut RenderPass<'static>) {
        if let Some(frame) = &self.frame {
            self.renderer
                .render(pass, &frame.primitives, &frame.screen);
        }
    }
}
