//! Platform layer: window, event loop, UI overlay and per-frame driving.
//!
//! Frame order: load the pending model (after the first blank frame), run the
//! UI, sync selection into the material, update the orbit camera, tick frame
//! hooks, render.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use corelib::scene::ModelSettings;
use renderer::{GpuState, Viewport};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

mod clock;
pub mod config;
pub mod input;
mod overlay;
pub mod state;
mod ui;

pub use config::ViewerConfig;

use clock::FrameClock;
use input::PointerInput;
use overlay::EguiOverlay;
use state::ViewerState;

const WINDOW_TITLE: &str = "Tintbox";

/// Run the viewer until the window is closed.
pub fn run(config: ViewerConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config)?;
    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow!("Event loop error: {e:?}"))?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ModelSlot {
    Pending,
    Ready,
    Failed,
}

struct Graphics {
    window: Arc<Window>,
    gpu: GpuState,
    overlay: EguiOverlay,
}

struct App {
    config: ViewerConfig,
    state: ViewerState,
    input: PointerInput,
    clock: FrameClock,
    model: ModelSlot,
    viewport: Viewport,
    gfx: Option<Graphics>,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: ViewerConfig) -> Result<Self> {
        let state = ViewerState::new(&config).context("Failed to build scene")?;
        let viewport = Viewport::full(config.width, config.height);
        Ok(Self {
            config,
            state,
            input: PointerInput::new(),
            clock: FrameClock::new(),
            model: ModelSlot::Pending,
            viewport,
            gfx: None,
            error: None,
        })
    }

    fn init_graphics(&self, event_loop: &ActiveEventLoop) -> Result<Graphics> {
        let attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("Failed to create window")?,
        );
        let size = window.inner_size();
        log::info!("Window created: {}x{}", size.width, size.height);

        let gpu = pollster::block_on(GpuState::new(window.clone(), self.config.backends))
            .context("Failed to initialise GPU")?;
        let overlay = EguiOverlay::new(&window, gpu.device(), gpu.surface_format());
        Ok(Graphics {
            window,
            gpu,
            overlay,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error = Some(err);
        event_loop.exit();
    }

    /// Cursor or touch position lies inside the 3D canvas.
    fn in_canvas(&self, x: f32, y: f32) -> bool {
        let vp = self.viewport;
        x >= vp.x && x < vp.x + vp.width && y >= vp.y && y < vp.y + vp.height
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let elapsed = self.clock.tick();
        let Some(gfx) = self.gfx.as_mut() else {
            return;
        };

        // The first frame goes out blank; the model is loaded right after it.
        if self.model == ModelSlot::Pending && self.clock.frames() > 1 {
            self.model = match load_model(&mut gfx.gpu, &mut self.state) {
                Ok(()) => ModelSlot::Ready,
                Err(err) => {
                    log::error!("Model unavailable, scene stays blank: {err:#}");
                    ModelSlot::Failed
                }
            };
        }

        let fps = self.config.show_fps.then(|| self.clock.fps()).flatten();
        let dragging = self.input.is_dragging();
        let ViewerState {
            palette, selection, ..
        } = &mut self.state;
        let mut canvas = None;
        gfx.overlay.run(&gfx.window, |ctx| {
            canvas = Some(ui::draw(ctx, palette, selection, fps, dragging));
        });
        if let Some(rect) = canvas {
            let ppp = gfx.overlay.context().pixels_per_point();
            self.viewport = Viewport {
                x: rect.min.x * ppp,
                y: rect.min.y * ppp,
                width: rect.width() * ppp,
                height: rect.height() * ppp,
            };
        }

        self.state.frame(elapsed);

        let result = gfx.gpu.render(
            &self.state.scene,
            self.state.camera(),
            self.viewport,
            Some(&mut gfx.overlay),
        );
        gfx.overlay.end_frame();

        match result {
            Ok(()) => {}
            Err(err) if GpuState::is_surface_lost(&err) => {
                log::warn!("Surface {err:?}; reconfiguring");
                gfx.gpu.recreate_surface();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fail(event_loop, anyhow!("GPU out of memory"));
            }
            Err(err) => log::warn!("Frame skipped: {err:?}"),
        }
    }
}

/// Read the model file, upload its mesh and hand it to the scene.
fn load_model(gpu: &mut GpuState, state: &mut ViewerState) -> Result<()> {
    let ModelSettings {
        path,
        mesh_node,
        material,
        ..
    } = state.scene.model_settings().clone();
    let selector = asset::ModelSelector {
        mesh_node: mesh_node.clone(),
        material,
    };
    let model = asset::load_model(&path, &selector)?;
    let mesh = gpu.upload_mesh(&mesh_node, &model.mesh)?;
    state.attach_model(mesh, &model.material);
    Ok(())
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gfx.is_some() {
            return;
        }
        match self.init_graphics(event_loop) {
            Ok(gfx) => self.gfx = Some(gfx),
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gfx) = self.gfx.as_mut() else {
            return;
        };
        let response = gfx.overlay.on_window_event(&gfx.window, &event);
        let viewport_h = self.viewport.height;

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting event loop.");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                log::debug!("Resized: {}x{}", size.width, size.height);
                gfx.gpu.resize(size.width, size.height);
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.input.set_shift(modifiers.state().shift_key());
            }
            WindowEvent::CursorMoved { position, .. } => {
                let gesture = self
                    .input
                    .cursor_moved(position.x as f32, position.y as f32);
                if let Some(g) = gesture {
                    self.state.apply_gesture(g, viewport_h);
                }
            }
            WindowEvent::CursorLeft { .. } => self.input.cursor_left(),
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = state == ElementState::Pressed;
                let may_start = !response.consumed
                    && self
                        .input
                        .cursor()
                        .is_some_and(|(x, y)| self.in_canvas(x, y));
                self.input.button(button, pressed, may_start);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let over_canvas = self
                    .input
                    .cursor()
                    .is_some_and(|(x, y)| self.in_canvas(x, y));
                if !response.consumed && over_canvas {
                    let gesture = self.input.wheel(delta);
                    self.state.apply_gesture(gesture, viewport_h);
                }
            }
            WindowEvent::Touch(touch) => {
                let (x, y) = (touch.location.x as f32, touch.location.y as f32);
                let may_start = !response.consumed && self.in_canvas(x, y);
                for g in self.input.touch(touch.id, touch.phase, x, y, may_start) {
                    self.state.apply_gesture(g, viewport_h);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gfx) = &self.gfx {
            gfx.window.request_redraw();
        }
    }
}
