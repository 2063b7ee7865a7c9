//! Pipeline construction for the three scene passes: backdrop, model, ground shadow.

use std::num::NonZeroU64;

use wgpu::{
    BindGroupLayout, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType, BlendState,
    BufferBindingType, ColorTargetState, ColorWrites, CompareFunction, DepthBiasState,
    DepthStencilState, Device, FragmentState, PipelineLayoutDescriptor, RenderPipeline,
    RenderPipelineDescriptor, ShaderModuleDescriptor, ShaderSource, ShaderStages, StencilState,
    TextureFormat, VertexBufferLayout, VertexState,
};

use crate::mesh::Vertex;

pub(crate) const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

const MODEL_WGSL: &str = concat!(
    include_str!("shaders/globals.wgsl"),
    include_str!("shaders/model.wgsl")
);
const GROUND_WGSL: &str = concat!(
    include_str!("shaders/globals.wgsl"),
    include_str!("shaders/ground.wgsl")
);
const BACKDROP_WGSL: &str = include_str!("shaders/backdrop.wgsl");

/// Layout with a single uniform buffer at binding 0.
pub(crate) fn uniform_layout(
    device: &Device,
    label: &str,
    size: usize,
    visibility: ShaderStages,
) -> BindGroupLayout {
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(size as u64),
            },
            count: None,
        }],
    })
}

struct PipelineParts<'a> {
    label: &'a str,
    source: &'a str,
    layouts: &'a [&'a BindGroupLayout],
    buffers: &'a [VertexBufferLayout<'a>],
    blend: BlendState,
    depth_write: bool,
    depth_compare: CompareFunction,
    cull_mode: Option<wgpu::Face>,
}

fn build(device: &Device, color_format: TextureFormat, parts: PipelineParts<'_>) -> RenderPipeline {
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some(parts.label),
        source: ShaderSource::Wgsl(parts.source.into()),
    });
    let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some(parts.label),
        bind_group_layouts: parts.layouts,
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some(parts.label),
        layout: Some(&layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: parts.buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format: color_format,
                blend: Some(parts.blend),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            cull_mode: parts.cull_mode,
            ..Default::default()
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: parts.depth_write,
            depth_compare: parts.depth_compare,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

pub(crate) fn model_pipeline(
    device: &Device,
    color_format: TextureFormat,
    globals: &BindGroupLayout,
    model: &BindGroupLayout,
) -> RenderPipeline {
    build(
        device,
        color_format,
        PipelineParts {
            label: "Model Pipeline",
            source: MODEL_WGSL,
            layouts: &[globals, model],
            buffers: &[Vertex::LAYOUT],
            blend: BlendState::REPLACE,
            depth_write: true,
            depth_compare: CompareFunction::LessEqual,
            cull_mode: Some(wgpu::Face::Back),
        },
    )
}

/// Alpha-blended, depth-tested, no depth writes; quad generated in the shader.
pub(crate) fn ground_pipeline(
    device: &Device,
    color_format: TextureFormat,
    globals: &BindGroupLayout,
    ground: &BindGroupLayout,
) -> RenderPipeline {
    build(
        device,
        color_format,
        PipelineParts {
            label: "Ground Shadow Pipeline",
            source: GROUND_WGSL,
            layouts: &[globals, ground],
            buffers: &[],
            blend: BlendState::ALPHA_BLENDING,
            depth_write: false,
            depth_compare: CompareFunction::LessEqual,
            cull_mode: None,
        },
    )
}

/// Fullscreen triangle, ignores and leaves depth untouched.
pub(crate) fn backdrop_pipeline(
    device: &Device,
    color_format: TextureFormat,
    backdrop: &BindGroupLayout,
) -> RenderPipeline {
    build(
        device,
        color_format,
        PipelineParts {
            label: "Backdrop Pipeline",
            source: BACKDROP_WGSL,
            layouts: &[backdrop],
            buffers: &[],
            blend: BlendState::REPLACE,
            depth_write: false,
            depth_compare: CompareFunction::Always,
            cull_mode: None,
        },
    )
}
