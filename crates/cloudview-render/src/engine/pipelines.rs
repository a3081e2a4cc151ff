use std::num::NonZeroU64;

use crate::geometry::{ColorVertex, ViewUniforms};

use super::DEPTH_FORMAT;

/// Render pipelines for every kind of world geometry, sharing one
/// per-viewport bind group layout.
pub struct ScenePipelines {
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub points: wgpu::RenderPipeline,
    pub triangles: wgpu::RenderPipeline,
    pub lines: wgpu::RenderPipeline,
}

struct PipelineDesc<'a> {
    label: &'a str,
    entry_point: &'a str,
    buffer: wgpu::VertexBufferLayout<'static>,
    topology: wgpu::PrimitiveTopology,
    depth_compare: wgpu::CompareFunction,
}

impl ScenePipelines {
    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat) -> Self {
        let shader_source = include_str!("../shaders/scene.wgsl");
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("viewport bind group layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<ViewUniforms>() as u64),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let create = |desc: PipelineDesc<'_>| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(desc.label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some(desc.entry_point),
                    buffers: &[desc.buffer],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: color_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: desc.topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: desc.depth_compare,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        let points = create(PipelineDesc {
            label: "point pipeline",
            entry_point: "vs_point",
            buffer: ColorVertex::layout(wgpu::VertexStepMode::Instance),
            topology: wgpu::PrimitiveTopology::TriangleList,
            depth_compare: wgpu::CompareFunction::Less,
        });
        let triangles = create(PipelineDesc {
            label: "mesh pipeline",
            entry_point: "vs_world",
            buffer: ColorVertex::layout(wgpu::VertexStepMode::Vertex),
            topology: wgpu::PrimitiveTopology::TriangleList,
            depth_compare: wgpu::CompareFunction::Less,
        });
        let lines = create(PipelineDesc {
            label: "line pipeline",
            entry_point: "vs_world",
            buffer: ColorVertex::layout(wgpu::VertexStepMode::Vertex),
            topology: wgpu::PrimitiveTopology::LineList,
            depth_compare: wgpu::CompareFunction::LessEqual,
        });

        Self {
            bind_group_layout,
            points,
            triangles,
            lines,
        }
    }
}
