// text drawing, kept simple:
// - a font library turns a character's outline into a coverage bitmap, one glyph at a time
// - each bitmap gets its own single-channel texture the first time the character shows up
// - a string is drawn as one textured quad per character, walking the pen along the baseline

pub mod font_face;
pub mod glyph_cache;
pub mod layout;
pub mod pipeline;
pub mod text_renderer;

#[cfg(test)]
pub(crate) mod testing;

use crate::{error::TextError, render::TextureHandle};

use self::layout::GlyphQuad;

/// RGBA color applied to every glyph of a draw.
pub type Albedo = [f32; 4];

/// One rasterized glyph, borrowed from the rasterizer's reusable buffer.
///
/// The bitmap is only valid until the next call to [`Rasterize::rasterize`]; anything that
/// needs the pixels afterwards has to copy them out first.
#[derive(Debug, Clone, Copy)]
pub struct RasterGlyph<'a> {
    /// 8-bit coverage, `width` bytes per row, no padding.
    pub bitmap: &'a [u8],
    pub width: u32,
    pub height: u32,
    /// Offset from the pen to the bitmap's left edge.
    pub left: i32,
    /// Distance from the baseline up to the bitmap's top edge.
    pub top: i32,
    /// Horizontal advance in 1/64 pixels.
    pub advance: i32,
}

pub trait Rasterize {
    /// The fixed em height the face was opened at.
    fn pixel_size(&self) -> u32;

    /// Rasterizes `character`. Fails with [`TextError::GlyphLoad`] when the face has no glyph
    /// for it.
    fn rasterize(&mut self, character: char) -> Result<RasterGlyph<'_>, TextError>;
}

/// What the text core needs from the graphics side: somewhere to keep glyph textures and a way
/// to draw one of them as a quad.
pub trait GlyphBackend {
    /// Copies `glyph` into a new single-channel texture (linear filtering, clamped edges).
    fn create_glyph_texture(&mut self, glyph: &RasterGlyph<'_>) -> Result<TextureHandle, TextError>;

    fn release_glyph_texture(&mut self, handle: TextureHandle);

    /// Queues one draw of `handle` covering `quad`, tinted with `albedo`.
    fn draw_glyph(&mut self, handle: TextureHandle, quad: &GlyphQuad, albedo: Albedo);
}
