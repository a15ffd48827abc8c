use bytemuck::{Pod, Zeroable};
use nalgebra::Matrix4;
use wgpu::{
    vertex_attr_array, BindGroupLayout, Device, PrimitiveTopology, RenderPipeline,
    SamplerBindingType, ShaderStages, TextureFormat, TextureSampleType,
};

use crate::{
    bind::{bind_group_layout, BindEntry, BindEntryType},
    pipeline::PipelineBuilder,
};

use super::{layout::GlyphQuad, Albedo};

/// Vertices per glyph: one triangle strip.
pub const QUAD_VERTICES: u32 = 4;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct TextVertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub albedo: [f32; 4],
}

impl TextVertex {
    /// Strip order: top-left, top-right, bottom-left, bottom-right. The bitmap's first row is
    /// its top, so v grows downwards with the screen.
    pub fn quad(quad: &GlyphQuad, albedo: Albedo) -> [TextVertex; 4] {
        let (x, y) = (quad.x, quad.y);
        let (right, bottom) = (quad.right(), quad.bottom());
        [
            TextVertex {
                pos: [x, y],
                uv: [0.0, 0.0],
                albedo,
            },
            TextVertex {
                pos: [right, y],
                uv: [1.0, 0.0],
                albedo,
            },
            TextVertex {
                pos: [x, bottom],
                uv: [0.0, 1.0],
                albedo,
            },
            TextVertex {
                pos: [right, bottom],
                uv: [1.0, 1.0],
                albedo,
            },
        ]
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GlobalsUniform {
    pub projection: [[f32; 4]; 4],
}

impl From<Matrix4<f32>> for GlobalsUniform {
    fn from(projection: Matrix4<f32>) -> Self {
        Self {
            projection: projection.into(),
        }
    }
}

pub struct TextPipeline {
    pub pipeline: RenderPipeline,
    /// Group 0: the projection.
    pub globals_layout: BindGroupLayout,
    /// Group 1: one glyph texture and its sampler.
    pub glyph_layout: BindGroupLayout,
}

pub fn text_pipeline(device: &Device, format: TextureFormat) -> anyhow::Result<TextPipeline> {
    let globals_layout = bind_group_layout(
        device,
        "text globals",
        &[BindEntry {
            visibility: ShaderStages::VERTEX,
            ty: BindEntryType::BufferUniform,
        }],
    );

    let glyph_layout = bind_group_layout(
        device,
        "glyph texture",
        &[
            BindEntry {
                visibility: ShaderStages::FRAGMENT,
                ty: BindEntryType::Texture {
                    sample_type: TextureSampleType::Float { filterable: true },
                },
            },
            BindEntry {
                visibility: ShaderStages::FRAGMENT,
                ty: BindEntryType::Sampler(SamplerBindingType::Filtering),
            },
        ],
    );

    let pipeline = PipelineBuilder::new()
        .with_label("text")
        .with_format(format)
        .with_topology(PrimitiveTopology::TriangleStrip)
        .with_bind_layout(&globals_layout)
        .with_bind_layout(&glyph_layout)
        .with_shader(include_str!("../shaders/text.wgsl"))
        .with_vb::<TextVertex>(
            wgpu::VertexStepMode::Vertex,
            &vertex_attr_array![
                // position
                0 => Float32x2,
                // uv
                1 => Float32x2,
                // albedo
                2 => Float32x4,
            ],
        )
        .build(device)?;

    Ok(TextPipeline {
        pipeline,
        globals_layout,
        glyph_layout,
    })
}
