//! Renderer: wgpu surface + depth, backdrop gradient, lit model with color
//! override, contact-shadow ground plane, then a caller-supplied overlay.
//! wgpu = 23.x, winit = 0.30.x

use std::sync::Arc;

use corelib::camera::Camera;
use corelib::ecs::MeshId;
use corelib::scene::Scene;
use thiserror::Error;
use wgpu::{
    BindGroup, BindGroupLayout, Buffer, BufferUsages, CommandBuffer, CommandEncoder,
    CommandEncoderDescriptor, Device, DeviceDescriptor, Extent3d, Features, Instance,
    InstanceDescriptor, Limits, LoadOp, Operations, PowerPreference, PresentMode, Queue,
    RenderPass, RenderPassColorAttachment, RenderPassDescriptor, RenderPipeline, ShaderStages,
    StoreOp, Surface, SurfaceConfiguration, SurfaceError, TextureDescriptor, TextureDimension,
    TextureFormat, TextureUsages, TextureView, TextureViewDescriptor, util::DeviceExt,
};
use winit::{dpi::PhysicalSize, window::Window};

mod mesh;
mod pipelines;
pub mod uniforms;

pub use mesh::{GpuMesh, Vertex};
use pipelines::DEPTH_FORMAT;
use uniforms::{BackdropUniform, GlobalsUniform, GroundUniform, ModelUniform};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("No suitable GPU adapter for backends {0:?}")]
    NoAdapter(wgpu::Backends),
    #[error("Failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("Surface reports no supported formats")]
    NoSurfaceFormat,
    #[error("Mesh '{0}' is empty")]
    EmptyMesh(String),
}

/// Pixel rectangle of the surface the 3D scene is drawn into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
        }
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width / self.height.max(1.0)
    }

    /// Intersect with a `width`×`height` target; `None` if nothing is left.
    pub fn clamped(&self, width: u32, height: u32) -> Option<Self> {
        let x0 = self.x.max(0.0);
        let y0 = self.y.max(0.0);
        let x1 = (self.x + self.width).min(width as f32);
        let y1 = (self.y + self.height).min(height as f32);
        (x1 - x0 >= 1.0 && y1 - y0 >= 1.0).then(|| Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }
}

/// Anything drawn on top of the scene after the 3D passes (the UI).
pub trait Overlay {
    /// Upload buffers/textures; returned command buffers are submitted first.
    fn prepare(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
    ) -> Vec<CommandBuffer>;

    fn paint(&self, pass: &mut RenderPass<'static>);
}

pub struct GpuState {
    // Surface
    surface: Surface<'static>,
    surface_format: TextureFormat,
    surface_config: SurfaceConfiguration,

    // Device/queue
    device: Device,
    queue: Queue,

    // Globals (camera + lights)
    globals_buf: Buffer,
    globals_bg: BindGroup,

    // Backdrop
    backdrop_pipeline: RenderPipeline,
    backdrop_buf: Buffer,
    backdrop_bg: BindGroup,

    // Model
    model_pipeline: RenderPipeline,
    model_bgl: BindGroupLayout,
    meshes: Vec<GpuMesh>,

    // Ground shadow
    ground_pipeline: RenderPipeline,
    ground_buf: Buffer,
    ground_bg: BindGroup,

    // Depth
    depth_view: TextureView,

    // Size cache
    width: u32,
    height: u32,
}

impl GpuState {
    /// Create GPU state bound to an Arc<Window>.
    pub async fn new(window: Arc<Window>, backends: wgpu::Backends) -> Result<Self, RenderError> {
        let PhysicalSize { width, height } = window.inner_size();
        let width = width.max(1);
        let height = height.max(1);

        // Instance & surface
        let instance = Instance::new(InstanceDescriptor {
            backends,
            ..Default::default()
        });
        let surface: Surface<'static> = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter(backends))?;
        let info = adapter.get_info();
        log::info!("GPU adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    label: Some("Tintbox Device"),
                    required_features: Features::empty(),
                    required_limits: Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        // Surface format (prefer sRGB)
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or(RenderError::NoSurfaceFormat)?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth_view = create_depth_view(&device, &surface_config);

        // ==== Globals ====
        let globals_bgl = pipelines::uniform_layout(
            &device,
            "Globals BGL",
            std::mem::size_of::<GlobalsUniform>(),
            ShaderStages::VERTEX_FRAGMENT,
        );
        let globals_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Globals UBO"),
            size: std::mem::size_of::<GlobalsUniform>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bg = bind_uniform(&device, "Globals BG", &globals_bgl, &globals_buf);

        // ==== Backdrop ====
        let backdrop_bgl = pipelines::uniform_layout(
            &device,
            "Backdrop BGL",
            std::mem::size_of::<BackdropUniform>(),
            ShaderStages::FRAGMENT,
        );
        let backdrop_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Backdrop UBO"),
            size: std::mem::size_of::<BackdropUniform>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let backdrop_bg = bind_uniform(&device, "Backdrop BG", &backdrop_bgl, &backdrop_buf);
        let backdrop_pipeline =
            pipelines::backdrop_pipeline(&device, surface_format, &backdrop_bgl);

        // ==== Model ====
        let model_bgl = pipelines::uniform_layout(
            &device,
            "Model BGL",
            std::mem::size_of::<ModelUniform>(),
            ShaderStages::VERTEX_FRAGMENT,
        );
        let model_pipeline =
            pipelines::model_pipeline(&device, surface_format, &globals_bgl, &model_bgl);

        // ==== Ground shadow ====
        let ground_bgl = pipelines::uniform_layout(
            &device,
            "Ground BGL",
            std::mem::size_of::<GroundUniform>(),
            ShaderStages::VERTEX_FRAGMENT,
        );
        let ground_init = GroundUniform {
            plane: [0.0; 4],
            occluder: [0.0; 4],
            params: [0.0; 4],
        };
        let ground_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Ground UBO"),
            contents: bytemuck::bytes_of(&ground_init),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let ground_bg = bind_uniform(&device, "Ground BG", &ground_bgl, &ground_buf);
        let ground_pipeline =
            pipelines::ground_pipeline(&device, surface_format, &globals_bgl, &ground_bgl);

        Ok(Self {
            surface,
            surface_format,
            surface_config,
            device,
            queue,
            globals_buf,
            globals_bg,
            backdrop_pipeline,
            backdrop_buf,
            backdrop_bg,
            model_pipeline,
            model_bgl,
            meshes: Vec::new(),
            ground_pipeline,
            ground_buf,
            ground_bg,
            depth_view,
            width,
            height,
        })
    }

    #[inline]
    pub fn device(&self) -> &Device {
        &self.device
    }

    #[inline]
    pub fn surface_format(&self) -> TextureFormat {
        self.surface_format
    }

    /// Upload a mesh; the returned id goes into a `Renderable`.
    pub fn upload_mesh(&mut self, label: &str, data: &asset::MeshData) -> Result<MeshId, RenderError> {
        let bounds = match data.bounds() {
            Some(b) if data.is_valid() => b,
            _ => return Err(RenderError::EmptyMesh(label.to_string())),
        };
        let id = MeshId(self.meshes.len() as u32);
        self.meshes
            .push(GpuMesh::upload(&self.device, &self.model_bgl, label, data, bounds));
        log::debug!("Uploaded mesh '{label}' as {id:?}");
        Ok(id)
    }

    /// Resize: reconfigure surface & recreate depth view.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.surface_config.width = self.width;
        self.surface_config.height = self.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, &self.surface_config);
    }

    /// Render one frame: backdrop, scene inside `viewport`, then `overlay`.
    pub fn render(
        &mut self,
        scene: &Scene,
        camera: &Camera,
        viewport: Viewport,
        overlay: Option<&mut dyn Overlay>,
    ) -> Result<(), SurfaceError> {
        let viewport = viewport.clamped(self.width, self.height);
        self.write_uniforms(scene, camera, viewport);
        let draw_ground = self.ground_occluder(scene).is_some();

        // --- frame & pass
        let frame = self.surface.get_current_texture()?;
        let view = frame.texture.create_view(&Default::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("MainEncoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("ScenePass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(wgpu::Color::BLACK),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            rpass.set_pipeline(&self.backdrop_pipeline);
            rpass.set_bind_group(0, &self.backdrop_bg, &[]);
            rpass.draw(0..3, 0..1);

            if let Some(vp) = viewport {
                rpass.set_viewport(vp.x, vp.y, vp.width, vp.height, 0.0, 1.0);

                rpass.set_pipeline(&self.model_pipeline);
                rpass.set_bind_group(0, &self.globals_bg, &[]);
                for (_, r) in scene.world().iter_renderables() {
                    let Some(mesh) = self.meshes.get(r.mesh.0 as usize) else {
                        continue;
                    };
                    rpass.set_bind_group(1, &mesh.bind_group, &[]);
                    rpass.set_vertex_buffer(0, mesh.vertex_buf.slice(..));
                    rpass.set_index_buffer(mesh.index_buf.slice(..), wgpu::IndexFormat::Uint32);
                    rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
                }

                if draw_ground {
                    rpass.set_pipeline(&self.ground_pipeline);
                    rpass.set_bind_group(0, &self.globals_bg, &[]);
                    rpass.set_bind_group(1, &self.ground_bg, &[]);
                    rpass.draw(0..6, 0..1);
                }
            }
        }

        let mut command_buffers = Vec::new();
        if let Some(overlay) = overlay {
            command_buffers = overlay.prepare(&self.device, &self.queue, &mut encoder);
            let mut rpass = encoder
                .begin_render_pass(&RenderPassDescriptor {
                    label: Some("OverlayPass"),
                    color_attachments: &[Some(RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: Operations {
                            load: LoadOp::Load,
                            store: StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();
            overlay.paint(&mut rpass);
        }

        command_buffers.push(encoder.finish());
        self.queue.submit(command_buffers);
        frame.present();
        Ok(())
    }

    pub fn is_surface_lost(err: &SurfaceError) -> bool {
        matches!(err, SurfaceError::Lost | SurfaceError::Outdated)
    }

    pub fn recreate_surface(&mut self) {
        self.resize(self.width, self.height);
    }

    fn write_uniforms(&self, scene: &Scene, camera: &Camera, viewport: Option<Viewport>) {
        let aspect = viewport.map_or(camera.aspect, |vp| vp.aspect());
        let cam = camera.with_aspect(aspect);
        let globals = GlobalsUniform::new(scene, &cam);
        self.queue
            .write_buffer(&self.globals_buf, 0, bytemuck::bytes_of(&globals));

        let backdrop = BackdropUniform::new(&scene.backdrop.from, &scene.backdrop.to);
        self.queue
            .write_buffer(&self.backdrop_buf, 0, bytemuck::bytes_of(&backdrop));

        for (t, r) in scene.world().iter_renderables() {
            let Some(mesh) = self.meshes.get(r.mesh.0 as usize) else {
                log::warn!("Renderable references unknown {:?}", r.mesh);
                continue;
            };
            let m = &r.material;
            let uniform = ModelUniform::new(
                t.matrix() * r.local.matrix(),
                m.effective_color(),
                m.metallic,
                m.roughness,
            );
            self.queue
                .write_buffer(&mesh.uniform_buf, 0, bytemuck::bytes_of(&uniform));
        }

        if let Some(ground) = self.ground_occluder(scene) {
            self.queue
                .write_buffer(&self.ground_buf, 0, bytemuck::bytes_of(&ground));
        }
    }

    /// Ground shadow parameters for the model, `None` while it is not loaded.
    fn ground_occluder(&self, scene: &Scene) -> Option<GroundUniform> {
        let e = scene.model_entity();
        let t = scene.world().transform(e)?;
        let r = scene.world().renderable(e)?;
        let bounds = self.meshes.get(r.mesh.0 as usize)?.bounds;
        let cs = &scene.contact_shadows;

        // Spin is about Y only, so the vertical extent is rotation-invariant.
        let scale_y = t.scale.y * r.local.scale.y;
        let scale_xz = t.scale.x.max(t.scale.z) * r.local.scale.x.max(r.local.scale.z);
        let bottom = t.translation.y + r.local.translation.y + bounds.min[1] * scale_y;
        Some(GroundUniform {
            plane: [cs.position.x, cs.position.y, cs.position.z, cs.scale * 0.5],
            occluder: [
                t.translation.x + r.local.translation.x,
                t.translation.z + r.local.translation.z,
                bounds.footprint_radius() * scale_xz,
                bottom - cs.position.y,
            ],
            params: [cs.opacity, cs.blur, cs.far, 0.0],
        })
    }
}

fn bind_uniform(device: &Device, label: &str, layout: &BindGroupLayout, buf: &Buffer) -> BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buf.as_entire_binding(),
        }],
    })
}

/// Create a depth texture view matching the surface config.
fn create_depth_view(device: &Device, sc: &SurfaceConfiguration) -> TextureView {
    let tex = device.create_texture(&TextureDescriptor {
        label: Some("DepthTex"),
        size: Extent3d {
            width: sc.width.max(1),
            height: sc.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_clamps_to_target() {
        let vp = Viewport {
            x: -10.0,
            y: 20.0,
            width: 500.0,
            height: 100.0,
        };
        let c = vp.clamped(400, 560).unwrap();
        assert_eq!(c.x, 0.0);
        assert_eq!(c.width, 400.0);
        assert_eq!(c.height, 100.0);
    }

    #[test]
    fn degenerate_viewport_is_skipped() {
        let vp = Viewport {
            x: 390.0,
            y: 0.0,
            width: 50.0,
            height: 0.5,
        };
        assert!(vp.clamped(400, 560).is_none());
        assert!(Viewport::full(1, 1).clamped(1, 1).is_some());
    }
}
