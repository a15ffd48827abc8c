use std::sync::Arc;

use anyhow::{anyhow, Result};
use generational_arena::{Arena, Index};
use itertools::Itertools;
use log::{info, trace, warn};
use wgpu::{
    util::{BufferInitDescriptor, DeviceExt},
    AddressMode, BindGroup, BindGroupDescriptor, BindGroupEntry, BindingResource, Buffer,
    BufferDescriptor, BufferUsages, Color, CommandEncoderDescriptor, Device, DeviceDescriptor,
    Extent3d, FilterMode, ImageDataLayout, Instance, LoadOp, Operations, Queue,
    RenderPassColorAttachment, RenderPassDescriptor, RequestAdapterOptions, Sampler,
    SamplerDescriptor, StoreOp, Surface, SurfaceConfiguration, SurfaceError, TextureDescriptor,
    TextureDimension, TextureFormat, TextureUsages, TextureViewDescriptor,
};
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    error::TextError,
    projection::ScreenProjection,
    text::{
        layout::GlyphQuad,
        pipeline::{text_pipeline, GlobalsUniform, TextPipeline, TextVertex, QUAD_VERTICES},
        Albedo, GlyphBackend, RasterGlyph,
    },
};

/// Names a glyph texture owned by a backend. Stale handles never resolve again.
#[derive(Debug, Eq, Hash, PartialEq, Clone, Copy)]
pub struct TextureHandle(pub Index);

struct GlyphTexture {
    texture: wgpu::Texture,
    bind_group: BindGroup,
}

struct GlyphDraw {
    texture: TextureHandle,
    vertices: [TextVertex; 4],
}

// glyphs the vertex buffer grows by when a frame outgrows it
const VERTEX_BUFFER_GROWTH: usize = 64;

const CLEAR_COLOR: Color = Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 0.5,
};

// renderer draws glyph quads
pub struct Render {
    surface: Surface<'static>,
    config: SurfaceConfiguration,
    device: Device,
    queue: Queue,
    text: TextPipeline,
    globals: Buffer,
    globals_bind_group: BindGroup,
    sampler: Sampler,
    textures: Arena<GlyphTexture>,
    draws: Vec<GlyphDraw>,
    vertex_buffer: Buffer,
    vertex_capacity: usize,
    projection: ScreenProjection,
}

impl Render {
    pub fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();
        let instance = Instance::default();

        let surface = instance.create_surface(window)?;

        let (adapter, device, queue) = pollster::block_on(async {
            let adapter = instance
                .request_adapter(&RequestAdapterOptions {
                    compatible_surface: Some(&surface),
                    ..Default::default()
                })
                .await
                .ok_or(anyhow!("No suitable adapter found."))?;

            let (device, queue) = adapter
                .request_device(&DeviceDescriptor::default(), None)
                .await?;

            Ok::<(wgpu::Adapter, wgpu::Device, wgpu::Queue), anyhow::Error>((
                adapter, device, queue,
            ))
        })?;
        info!("using adapter {:?}", adapter.get_info().name);

        let capabilities = surface.get_capabilities(&adapter);
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(TextureFormat::is_srgb)
            .or(capabilities.formats.first().copied())
            .ok_or(anyhow!("No formats found."))?;

        let config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let text = text_pipeline(&device, format)?;
        let projection = ScreenProjection::new(config.width, config.height);

        let globals = device.create_buffer_init(&BufferInitDescriptor {
            label: Some("text globals"),
            contents: bytemuck::bytes_of(&GlobalsUniform::from(projection.matrix())),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let globals_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("text globals"),
            layout: &text.globals_layout,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: globals.as_entire_binding(),
            }],
        });

        // clamped so partially covered edge texels never wrap around to the other side
        let sampler = device.create_sampler(&SamplerDescriptor {
            label: Some("glyph sampler"),
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            address_mode_w: AddressMode::ClampToEdge,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            ..Default::default()
        });

        let vertex_buffer = Self::create_vertex_buffer(&device, VERTEX_BUFFER_GROWTH);

        Ok(Self {
            surface,
            config,
            device,
            queue,
            text,
            globals,
            globals_bind_group,
            sampler,
            textures: Arena::new(),
            draws: Vec::new(),
            vertex_buffer,
            vertex_capacity: VERTEX_BUFFER_GROWTH,
            projection,
        })
    }

    fn create_vertex_buffer(device: &Device, glyphs: usize) -> Buffer {
        device.create_buffer(&BufferDescriptor {
            label: Some("glyph vertices"),
            size: (glyphs * std::mem::size_of::<[TextVertex; 4]>()) as u64,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.config.width, self.config.height)
    }

    /// Glyph textures created and not yet released.
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);

        self.projection = ScreenProjection::new(size.width, size.height);
        self.queue.write_buffer(
            &self.globals,
            0,
            bytemuck::bytes_of(&GlobalsUniform::from(self.projection.matrix())),
        );
    }

    /// Draws everything queued since the last frame, in the order it was queued, and presents.
    pub fn present(&mut self) -> Result<()> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                warn!("surface lost, reconfiguring and skipping the frame");
                self.surface.configure(&self.device, &self.config);
                self.draws.clear();
                return Ok(());
            }
            Err(SurfaceError::Timeout) => {
                warn!("timed out waiting for the surface, skipping the frame");
                self.draws.clear();
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let draws = self
            .draws
            .drain(..)
            .filter(|draw| self.textures.contains(draw.texture.0))
            .collect_vec();

        if draws.len() > self.vertex_capacity {
            self.vertex_capacity = draws.len() + VERTEX_BUFFER_GROWTH;
            self.vertex_buffer = Self::create_vertex_buffer(&self.device, self.vertex_capacity);
        }
        if !draws.is_empty() {
            let vertices = draws.iter().flat_map(|draw| draw.vertices).collect_vec();
            self.queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
        }

        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor { label: Some("text") });

        {
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("text"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(CLEAR_COLOR),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rpass.set_pipeline(&self.text.pipeline);
            rpass.set_bind_group(0, &self.globals_bind_group, &[]);
            rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

            // one draw call per glyph, each with its own texture bound
            for (idx, draw) in draws.iter().enumerate() {
                let glyph = &self.textures[draw.texture.0];
                rpass.set_bind_group(1, &glyph.bind_group, &[]);
                let first = idx as u32 * QUAD_VERTICES;
                rpass.draw(first..first + QUAD_VERTICES, 0..1);
            }
        }

        self.queue.submit([encoder.finish()]);
        frame.present();
        trace!("presented {} glyphs", draws.len());

        Ok(())
    }
}

impl GlyphBackend for Render {
    fn create_glyph_texture(&mut self, glyph: &RasterGlyph<'_>) -> Result<TextureHandle, TextError> {
        let expected = (glyph.width * glyph.height) as usize;
        if glyph.bitmap.len() != expected {
            return Err(TextError::TextureUpload(format!(
                "bitmap is {} bytes, expected {}x{}",
                glyph.bitmap.len(),
                glyph.width,
                glyph.height
            )));
        }

        // wgpu has no empty textures, so blank glyphs (spaces) get one transparent texel
        let (width, height, data) = if expected == 0 {
            (1, 1, &[0u8][..])
        } else {
            (glyph.width, glyph.height, glyph.bitmap)
        };
        let size = Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = self.device.create_texture(&TextureDescriptor {
            label: Some("glyph"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::R8Unorm,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });
        // rows are tightly packed, one byte per texel
        self.queue.write_texture(
            texture.as_image_copy(),
            data,
            ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&BindGroupDescriptor {
            label: Some("glyph"),
            layout: &self.text.glyph_layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::TextureView(&view),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        Ok(TextureHandle(self.textures.insert(GlyphTexture {
            texture,
            bind_group,
        })))
    }

    fn release_glyph_texture(&mut self, handle: TextureHandle) {
        match self.textures.remove(handle.0) {
            Some(glyph) => glyph.texture.destroy(),
            None => warn!("glyph texture {:?} released twice", handle),
        }
    }

    fn draw_glyph(&mut self, handle: TextureHandle, quad: &GlyphQuad, albedo: Albedo) {
        self.draws.push(GlyphDraw {
            texture: handle,
            vertices: TextVertex::quad(quad, albedo),
        });
    }
}

impl Drop for Render {
    fn drop(&mut self) {
        if !self.textures.is_empty() {
            warn!(
                "renderer dropped with {} glyph textures still alive",
                self.textures.len()
            );
        }
    }
}
