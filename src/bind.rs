use wgpu::{
    BindGroupLayout, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType,
    BufferBindingType, Device, SamplerBindingType, ShaderStages, TextureSampleType,
    TextureViewDimension, VertexAttribute, VertexBufferLayout, VertexStepMode,
};

#[derive(Clone, Copy, Debug)]
pub enum BindEntryType {
    BufferUniform,
    Texture { sample_type: TextureSampleType },
    Sampler(SamplerBindingType),
}

/// One slot of a bind group layout. Slots are numbered by their position in the list passed
/// to [`bind_group_layout`].
#[derive(Clone, Copy, Debug)]
pub struct BindEntry {
    pub visibility: ShaderStages,
    pub ty: BindEntryType,
}

impl BindEntry {
    pub fn layout_entry(&self, binding: u32) -> BindGroupLayoutEntry {
        BindGroupLayoutEntry {
            binding,
            visibility: self.visibility,
            ty: match self.ty {
                BindEntryType::BufferUniform => BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                BindEntryType::Texture { sample_type } => BindingType::Texture {
                    sample_type,
                    view_dimension: TextureViewDimension::D2,
                    multisampled: false,
                },
                BindEntryType::Sampler(binding_type) => BindingType::Sampler(binding_type),
            },
            count: None,
        }
    }
}

pub fn bind_group_layout(device: &Device, label: &str, entries: &[BindEntry]) -> BindGroupLayout {
    let layout_entries = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| entry.layout_entry(idx as u32))
        .collect::<Vec<_>>();

    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &layout_entries,
    })
}

pub struct VertexBufferEntry {
    pub array_stride: u64,
    pub step_mode: VertexStepMode,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexBufferEntry {
    pub fn layout(&self) -> VertexBufferLayout {
        VertexBufferLayout {
            array_stride: self.array_stride,
            step_mode: self.step_mode,
            attributes: self.attributes.as_slice(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_texture_slot_is_a_filterable_2d_texture() {
        let entry = BindEntry {
            visibility: ShaderStages::FRAGMENT,
            ty: BindEntryType::Texture {
                sample_type: TextureSampleType::Float { filterable: true },
            },
        };

        let layout = entry.layout_entry(0);

        assert_eq!(layout.binding, 0);
        assert_eq!(
            layout.ty,
            BindingType::Texture {
                sample_type: TextureSampleType::Float { filterable: true },
                view_dimension: TextureViewDimension::D2,
                multisampled: false,
            }
        );
    }

    #[test]
    fn uniform_slot_keeps_its_visibility() {
        let entry = BindEntry {
            visibility: ShaderStages::VERTEX,
            ty: BindEntryType::BufferUniform,
        };

        let layout = entry.layout_entry(3);

        assert_eq!(layout.binding, 3);
        assert_eq!(layout.visibility, ShaderStages::VERTEX);
    }
}
