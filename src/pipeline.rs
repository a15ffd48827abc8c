use wgpu::{
    BindGroupLayout, BlendState, ColorTargetState, ColorWrites, Device, FragmentState,
    MultisampleState, PipelineCompilationOptions, PipelineLayoutDescriptor, PrimitiveState,
    PrimitiveTopology, RenderPipeline, RenderPipelineDescriptor, ShaderModule,
    ShaderModuleDescriptor, TextureFormat, VertexAttribute, VertexState, VertexStepMode,
};

use crate::bind::VertexBufferEntry;

/// Bundles the creation of a [wgpu::RenderPipeline] and its shader module.
///
/// ```ignore
/// let pipeline = PipelineBuilder::new()
///     .with_format(config.format)
///     .with_bind_layout(&globals_layout)
///     .with_shader(include_str!("shaders/text.wgsl"))
///     .build(&device);
/// ```
pub struct PipelineBuilder<'a> {
    bind_layouts: Vec<&'a BindGroupLayout>,
    shader_src: Option<&'a str>,
    primitive_state: PrimitiveState,
    format: TextureFormat,
    blend: Option<BlendState>,
    vertex_entries: Vec<VertexBufferEntry>,
    label: Option<&'a str>,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new() -> Self {
        Self {
            bind_layouts: Vec::new(),
            shader_src: None,
            primitive_state: PrimitiveState::default(),
            format: TextureFormat::Bgra8UnormSrgb,
            blend: Some(BlendState::ALPHA_BLENDING),
            vertex_entries: Vec::new(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_topology(mut self, topology: PrimitiveTopology) -> Self {
        self.primitive_state.topology = topology;
        self
    }

    pub fn with_shader(mut self, shader_src: &'a str) -> Self {
        self.shader_src = Some(shader_src);
        self
    }

    pub fn with_format(mut self, format: TextureFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_blend(mut self, blend: Option<BlendState>) -> Self {
        self.blend = blend;
        self
    }

    /// Layouts are bound in the order they are added: the first is group 0.
    pub fn with_bind_layout(mut self, layout: &'a BindGroupLayout) -> Self {
        self.bind_layouts.push(layout);
        self
    }

    pub fn with_vb<T>(mut self, step_mode: VertexStepMode, attributes: &[VertexAttribute]) -> Self {
        self.vertex_entries.push(VertexBufferEntry {
            array_stride: std::mem::size_of::<T>() as u64,
            step_mode,
            attributes: attributes.into(),
        });
        self
    }

    fn create_module(&self, device: &Device, shader_src: &str) -> ShaderModule {
        device.create_shader_module(ShaderModuleDescriptor {
            label: self.label,
            source: wgpu::ShaderSource::Wgsl(shader_src.into()),
        })
    }

    pub fn build(self, device: &Device) -> anyhow::Result<RenderPipeline> {
        let shader_src = self
            .shader_src
            .ok_or(anyhow::anyhow!("Shader source should be set."))?;

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: self.label,
            bind_group_layouts: self.bind_layouts.as_slice(),
            push_constant_ranges: &[],
        });

        let module = self.create_module(device, shader_src);

        let vbs = self
            .vertex_entries
            .iter()
            .map(|ent| ent.layout())
            .collect::<Vec<_>>();

        Ok(device.create_render_pipeline(&RenderPipelineDescriptor {
            label: self.label,
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &module,
                entry_point: "vertex",
                buffers: vbs.as_slice(),
                compilation_options: PipelineCompilationOptions::default(),
            },
            primitive: self.primitive_state,
            // text is drawn in submission order, no depth test
            depth_stencil: None,
            multisample: MultisampleState::default(),
            fragment: Some(FragmentState {
                module: &module,
                entry_point: "fragment",
                targets: &[Some(ColorTargetState {
                    format: self.format,
                    blend: self.blend,
                    write_mask: ColorWrites::all(),
                })],
                compilation_options: PipelineCompilationOptions::default(),
            }),
            multiview: None,
        }))
    }
}

impl<'a> Default for PipelineBuilder<'a> {
    fn default() -> Self {
        Self::new()
    }
}
