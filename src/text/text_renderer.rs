use log::trace;
use nalgebra::Point2;

use super::{
    glyph_cache::GlyphCache,
    layout::{advance, glyph_quad},
    Albedo, GlyphBackend, Rasterize,
};

/// Draws strings with one font at one size.
///
/// Glyphs are laid out left to right on a single line; there is no shaping, wrapping or
/// fallback. Everything runs on the thread that owns the backend.
pub struct TextRenderer<F: Rasterize> {
    face: F,
    cache: GlyphCache,
    baseline_offset: f32,
}

impl<F: Rasterize> TextRenderer<F> {
    pub fn new(face: F) -> Self {
        // keeps the pixel size as the baseline distance from the pen, whatever the font's
        // actual ascent is
        let baseline_offset = face.pixel_size() as f32;
        Self {
            face,
            cache: GlyphCache::new(),
            baseline_offset,
        }
    }

    pub fn face(&self) -> &F {
        &self.face
    }

    pub fn cache(&self) -> &GlyphCache {
        &self.cache
    }

    /// Distance from the pen's y to the baseline.
    pub fn baseline_offset(&self) -> f32 {
        self.baseline_offset
    }

    /// Rasterizes `characters` now instead of on first draw.
    pub fn warm<B, I>(&mut self, backend: &mut B, characters: I) -> usize
    where
        B: GlyphBackend + ?Sized,
        I: IntoIterator<Item = char>,
    {
        self.cache.warm(characters, &mut self.face, backend)
    }

    /// Draws `text` with the pen starting at `origin`, one draw per character that has a glyph.
    ///
    /// Characters without a glyph draw nothing and don't move the pen. Returns where the pen
    /// ended up.
    pub fn draw_text<B: GlyphBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        text: &str,
        origin: Point2<f32>,
        scale: f32,
        albedo: Albedo,
    ) -> Point2<f32> {
        let mut pen = origin;

        for character in text.chars() {
            let glyph = *self.cache.get(character, &mut self.face, backend);
            let Some(texture) = glyph.texture() else {
                continue;
            };

            let quad = glyph_quad(pen, &glyph, scale, self.baseline_offset);
            trace!("{character:?} at ({}, {}) {}x{}", quad.x, quad.y, quad.width, quad.height);
            backend.draw_glyph(texture, &quad, albedo);
            pen.x += advance(&glyph, scale);
        }

        pen
    }

    /// Unscaled width the pen would travel drawing `text`. Populates the cache.
    pub fn measure<B: GlyphBackend + ?Sized>(&mut self, backend: &mut B, text: &str) -> f32 {
        text.chars()
            .map(|character| advance(self.cache.get(character, &mut self.face, backend), 1.0))
            .sum()
    }

    /// Releases every glyph texture. Has to happen while `backend` is still alive.
    pub fn destroy<B: GlyphBackend + ?Sized>(&mut self, backend: &mut B) -> usize {
        self.cache.destroy(backend)
    }
}
