//! A rasterizer and a backend that need neither a font file nor a GPU.
use std::collections::HashMap;

use generational_arena::Arena;

use crate::{error::TextError, render::TextureHandle};

use super::{layout::GlyphQuad, Albedo, GlyphBackend, RasterGlyph, Rasterize};

/// DejaVu Sans, checked in under `tests/fonts` with its license.
pub const TEST_FONT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fonts/DejaVuSans.ttf");

#[derive(Clone, Copy, Debug)]
pub struct FakeGlyph {
    pub width: u32,
    pub height: u32,
    pub left: i32,
    pub top: i32,
    pub advance: i32,
}

impl FakeGlyph {
    /// A glyph whose advance is `advance_px` whole pixels.
    pub fn new(width: u32, height: u32, left: i32, top: i32, advance_px: i32) -> Self {
        Self {
            width,
            height,
            left,
            top,
            advance: advance_px << 6,
        }
    }
}

pub struct FakeFace {
    px: u32,
    glyphs: HashMap<char, FakeGlyph>,
    buffer: Vec<u8>,
    /// Every character asked for, including ones without a glyph.
    pub requests: Vec<char>,
}

impl FakeFace {
    pub fn new(px: u32) -> Self {
        Self {
            px,
            glyphs: HashMap::new(),
            buffer: Vec::new(),
            requests: Vec::new(),
        }
    }

    pub fn with_glyph(mut self, character: char, glyph: FakeGlyph) -> Self {
        self.glyphs.insert(character, glyph);
        self
    }

    /// 'A' and 'B' with different heights, plus an empty space.
    pub fn latin(px: u32) -> Self {
        Self::new(px)
            .with_glyph('A', FakeGlyph::new(10, 12, 1, 12, 11))
            .with_glyph('B', FakeGlyph::new(9, 12, 2, 12, 10))
            .with_glyph('g', FakeGlyph::new(8, 13, 1, 9, 9))
            .with_glyph('x', FakeGlyph::new(8, 9, 0, 9, 9))
            .with_glyph(' ', FakeGlyph::new(0, 0, 0, 0, 5))
    }
}

impl Rasterize for FakeFace {
    fn pixel_size(&self) -> u32 {
        self.px
    }

    fn rasterize(&mut self, character: char) -> Result<RasterGlyph<'_>, TextError> {
        self.requests.push(character);
        let glyph = *self
            .glyphs
            .get(&character)
            .ok_or(TextError::GlyphLoad(character))?;
        self.buffer.clear();
        self.buffer
            .resize((glyph.width * glyph.height) as usize, character as u8);
        Ok(RasterGlyph {
            bitmap: &self.buffer,
            width: glyph.width,
            height: glyph.height,
            left: glyph.left,
            top: glyph.top,
            advance: glyph.advance,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub texture: TextureHandle,
    pub quad: GlyphQuad,
    pub albedo: Albedo,
}

/// Keeps textures in an arena the same way the wgpu backend does, and records every call.
#[derive(Default)]
pub struct RecordingBackend {
    pub textures: Arena<Vec<u8>>,
    pub uploads: usize,
    pub releases: Vec<TextureHandle>,
    pub stale_releases: usize,
    pub draws: Vec<RecordedDraw>,
    pub fail_uploads: bool,
}

impl GlyphBackend for RecordingBackend {
    fn create_glyph_texture(&mut self, glyph: &RasterGlyph<'_>) -> Result<TextureHandle, TextError> {
        if self.fail_uploads {
            return Err(TextError::TextureUpload("out of texture memory".into()));
        }
        self.uploads += 1;
        Ok(TextureHandle(self.textures.insert(glyph.bitmap.to_vec())))
    }

    fn release_glyph_texture(&mut self, handle: TextureHandle) {
        if self.textures.remove(handle.0).is_none() {
            self.stale_releases += 1;
        }
        self.releases.push(handle);
    }

    fn draw_glyph(&mut self, handle: TextureHandle, quad: &GlyphQuad, albedo: Albedo) {
        self.draws.push(RecordedDraw {
            texture: handle,
            quad: *quad,
            albedo,
        });
    }
}
