//! GPU-resident meshes and their per-instance uniform.

use asset::{Bounds, MeshData};
use bytemuck::{Pod, Zeroable};
use wgpu::{
    BindGroup, BindGroupLayout, Buffer, BufferUsages, Device, VertexBufferLayout, VertexStepMode,
    util::DeviceExt,
};

use crate::uniforms::ModelUniform;

/// Vertex: position + normal.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub const LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
    };
}

/// Uploaded geometry plus the uniform slot for the one instance drawing it.
pub struct GpuMesh {
    pub(crate) vertex_buf: Buffer,
    pub(crate) index_buf: Buffer,
    pub(crate) index_count: u32,
    pub(crate) uniform_buf: Buffer,
    pub(crate) bind_group: BindGroup,
    pub bounds: Bounds,
}

impl GpuMesh {
    pub(crate) fn upload(
        device: &Device,
        layout: &BindGroupLayout,
        label: &str,
        data: &MeshData,
        bounds: Bounds,
    ) -> Self {
        let vertices: Vec<Vertex> = data
            .vertices
            .iter()
            .map(|v| Vertex {
                pos: v.position,
                normal: v.normal,
            })
            .collect();

        let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} VB")),
            contents: bytemuck::cast_slice(&vertices),
            usage: BufferUsages::VERTEX,
        });
        let index_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} IB")),
            contents: bytemuck::cast_slice(&data.indices),
            usage: BufferUsages::INDEX,
        });

        let uniform = ModelUniform::new(glam::Mat4::IDENTITY, [1.0; 4], 0.0, 1.0);
        let uniform_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} UBO")),
            contents: bytemuck::bytes_of(&uniform),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} BG")),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buf.as_entire_binding(),
            }],
        });

        Self {
            vertex_buf,
            index_buf,
            index_count: data.indices.len() as u32,
            uniform_buf,
            bind_group,
            bounds,
        }
    }
}
