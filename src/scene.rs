use std::path::PathBuf;

use anyhow::{anyhow, Result};
use log::debug;
use nalgebra::{point, Point2};

use crate::{
    render::Render,
    text::{font_face::FontFace, text_renderer::TextRenderer, Albedo, GlyphBackend},
    window::AppLoop,
};

/// Draws one fixed string every frame.
pub struct TextScene {
    font_path: PathBuf,
    pixel_size: u32,
    text: String,
    origin: Point2<f32>,
    scale: f32,
    albedo: Albedo,
    warm_ascii: bool,
    renderer: Option<TextRenderer<FontFace>>,
}

impl TextScene {
    pub fn new<P: Into<PathBuf>>(font_path: P) -> Self {
        Self {
            font_path: font_path.into(),
            pixel_size: 48,
            text: "我的世界从新开始".into(),
            origin: point![100.0, 200.0],
            scale: 1.0,
            albedo: [1.0, 0.0, 0.0, 1.0],
            warm_ascii: false,
            renderer: None,
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_origin(mut self, x: f32, y: f32) -> Self {
        self.origin = point![x, y];
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_albedo(mut self, albedo: Albedo) -> Self {
        self.albedo = albedo;
        self
    }

    /// Font size in pixels. Fixed once the scene is initialized.
    pub fn with_pixel_size(mut self, pixel_size: u32) -> Self {
        self.pixel_size = pixel_size;
        self
    }

    /// Rasterize printable ASCII up front instead of on first use.
    pub fn with_ascii_warmup(mut self, warm_ascii: bool) -> Self {
        self.warm_ascii = warm_ascii;
        self
    }

    fn load<B: GlyphBackend + ?Sized>(&mut self, backend: &mut B) -> Result<()> {
        let face = FontFace::open(&self.font_path, self.pixel_size)?;
        debug!("text scene using '{}'", face.path().display());
        let mut renderer = TextRenderer::new(face);
        if self.warm_ascii {
            let added = renderer.warm(backend, ' '..='~');
            debug!("warmed {added} ascii glyphs");
        }
        self.renderer = Some(renderer);
        Ok(())
    }

    fn draw<B: GlyphBackend + ?Sized>(&mut self, backend: &mut B) -> Result<()> {
        let renderer = self
            .renderer
            .as_mut()
            .ok_or(anyhow!("text scene drawn before it was initialized"))?;
        renderer.draw_text(backend, &self.text, self.origin, self.scale, self.albedo);
        Ok(())
    }

    fn unload<B: GlyphBackend + ?Sized>(&mut self, backend: &mut B) {
        if let Some(mut renderer) = self.renderer.take() {
            let released = renderer.destroy(backend);
            debug!("released {released} glyph textures");
        }
    }
}

impl AppLoop for TextScene {
    fn initialize(&mut self, render: &mut Render) -> Result<()> {
        self.load(render)
    }

    fn render(&mut self, render: &mut Render) -> Result<()> {
        self.draw(render)
    }

    fn teardown(&mut self, render: &mut Render) {
        self.unload(render);
    }
}
