use std::collections::{hash_map::Entry, HashMap};

use log::{debug, warn};
use nalgebra::Vector2;

use crate::render::TextureHandle;

use super::{GlyphBackend, RasterGlyph, Rasterize};

/// A rasterized character: its texture plus the metrics needed to place it.
///
/// Records never change once created. The texture belongs to the [`GlyphCache`] that made the
/// record; copies of a record only borrow the handle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphRecord {
    texture: Option<TextureHandle>,
    size: [u32; 2],
    bearing: [i32; 2],
    advance: i32,
}

impl GlyphRecord {
    /// Stands in for a character the face can't render: nothing to draw, no advance.
    pub const EMPTY: GlyphRecord = GlyphRecord {
        texture: None,
        size: [0, 0],
        bearing: [0, 0],
        advance: 0,
    };

    fn new(texture: TextureHandle, glyph: &RasterGlyph<'_>) -> Self {
        Self {
            texture: Some(texture),
            size: [glyph.width, glyph.height],
            bearing: [glyph.left, glyph.top],
            advance: glyph.advance,
        }
    }

    pub fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    /// Bitmap width and height in pixels.
    pub fn size(&self) -> Vector2<u32> {
        Vector2::from(self.size)
    }

    /// (left, top) from the pen origin to the bitmap's top-left corner; top points up.
    pub fn bearing(&self) -> Vector2<i32> {
        Vector2::from(self.bearing)
    }

    /// Advance in 1/64 pixels.
    pub fn advance(&self) -> i32 {
        self.advance
    }

    pub fn is_empty(&self) -> bool {
        self.texture.is_none()
    }
}

/// Maps characters to their [`GlyphRecord`]s, rasterizing and uploading each character once.
///
/// The cache owns every texture it created. Call [`GlyphCache::destroy`] with the same backend
/// before that backend goes away; texture handles are meaningless afterwards.
#[derive(Debug, Default)]
pub struct GlyphCache {
    glyphs: HashMap<char, GlyphRecord>,
}

impl GlyphCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn contains(&self, character: char) -> bool {
        self.glyphs.contains_key(&character)
    }

    /// Looks a character up without populating the cache.
    pub fn peek(&self, character: char) -> Option<&GlyphRecord> {
        self.glyphs.get(&character)
    }

    /// Returns the record for `character`, creating it on first use.
    ///
    /// Characters the face can't rasterize, or whose texture can't be created, are cached as
    /// [`GlyphRecord::EMPTY`] so the failure is only paid (and logged) once.
    pub fn get<R, B>(&mut self, character: char, face: &mut R, backend: &mut B) -> &GlyphRecord
    where
        R: Rasterize + ?Sized,
        B: GlyphBackend + ?Sized,
    {
        match self.glyphs.entry(character) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(Self::load(character, face, backend)),
        }
    }

    fn load<R, B>(character: char, face: &mut R, backend: &mut B) -> GlyphRecord
    where
        R: Rasterize + ?Sized,
        B: GlyphBackend + ?Sized,
    {
        let glyph = match face.rasterize(character) {
            Ok(glyph) => glyph,
            Err(err) => {
                warn!("{err}, skipping");
                return GlyphRecord::EMPTY;
            }
        };

        match backend.create_glyph_texture(&glyph) {
            Ok(texture) => {
                debug!(
                    "cached {:?}: {}x{} bearing ({}, {}) advance {}/64",
                    character, glyph.width, glyph.height, glyph.left, glyph.top, glyph.advance
                );
                GlyphRecord::new(texture, &glyph)
            }
            Err(err) => {
                warn!("{err} while uploading {character:?}, skipping");
                GlyphRecord::EMPTY
            }
        }
    }

    /// Populates the cache ahead of time. Returns how many characters were new.
    pub fn warm<I, R, B>(&mut self, characters: I, face: &mut R, backend: &mut B) -> usize
    where
        I: IntoIterator<Item = char>,
        R: Rasterize + ?Sized,
        B: GlyphBackend + ?Sized,
    {
        let before = self.len();
        for character in characters {
            self.get(character, face, backend);
        }
        self.len() - before
    }

    /// Releases every texture the cache owns and empties it. Returns the number released.
    pub fn destroy<B: GlyphBackend + ?Sized>(&mut self, backend: &mut B) -> usize {
        let mut released = 0;
        for (_, record) in self.glyphs.drain() {
            if let Some(texture) = record.texture {
                backend.release_glyph_texture(texture);
                released += 1;
            }
        }
        debug!("released {released} glyph textures");
        released
    }
}

impl Drop for GlyphCache {
    fn drop(&mut self) {
        let live = self.glyphs.values().filter(|record| !record.is_empty()).count();
        if live > 0 {
            warn!("glyph cache dropped while still holding {live} textures");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::testing::{FakeFace, RecordingBackend};

    #[test]
    fn second_get_reuses_the_record() {
        let mut face = FakeFace::latin(48);
        let mut backend = RecordingBackend::default();
        let mut cache = GlyphCache::new();

        let first = *cache.get('A', &mut face, &mut backend);
        let second = *cache.get('A', &mut face, &mut backend);

        assert_eq!(first, second);
        assert_eq!(face.requests, vec!['A']);
        assert_eq!(backend.uploads, 1);
        assert_eq!(cache.len(), 1);
        cache.destroy(&mut backend);
    }

    #[test]
    fn record_carries_the_raster_metrics() {
        let mut face = FakeFace::latin(48);
        let mut backend = RecordingBackend::default();
        let mut cache = GlyphCache::new();

        let record = *cache.get('g', &mut face, &mut backend);

        assert_eq!(record.size(), Vector2::new(8, 13));
        assert_eq!(record.bearing(), Vector2::new(1, 9));
        assert_eq!(record.advance(), 9 * 64);
        let texture = record.texture().unwrap();
        assert_eq!(backend.textures[texture.0].len(), 8 * 13);
        cache.destroy(&mut backend);
    }

    #[test]
    fn missing_glyph_yields_the_empty_record() {
        let mut face = FakeFace::latin(48);
        let mut backend = RecordingBackend::default();
        let mut cache = GlyphCache::new();

        let record = *cache.get('\u{10ffff}', &mut face, &mut backend);

        assert!(record.is_empty());
        assert_eq!(record, GlyphRecord::EMPTY);
        assert_eq!(record.size(), Vector2::zeros());
        assert_eq!(backend.uploads, 0);

        // the miss is remembered, not retried
        cache.get('\u{10ffff}', &mut face, &mut backend);
        assert!(cache.contains('\u{10ffff}'));
        assert_eq!(face.requests, vec!['\u{10ffff}']);
    }

    #[test]
    fn failed_upload_yields_the_empty_record() {
        let mut face = FakeFace::latin(48);
        let mut backend = RecordingBackend {
            fail_uploads: true,
            ..Default::default()
        };
        let mut cache = GlyphCache::new();

        assert!(cache.get('A', &mut face, &mut backend).is_empty());
        assert_eq!(cache.destroy(&mut backend), 0);
    }

    #[test]
    fn empty_bitmaps_still_get_a_texture() {
        let mut face = FakeFace::latin(48);
        let mut backend = RecordingBackend::default();
        let mut cache = GlyphCache::new();

        let space = *cache.get(' ', &mut face, &mut backend);

        assert!(!space.is_empty());
        assert_eq!(space.size(), Vector2::zeros());
        assert_eq!(space.advance(), 5 * 64);
        cache.destroy(&mut backend);
    }

    #[test]
    fn warm_counts_only_new_characters() {
        let mut face = FakeFace::latin(48);
        let mut backend = RecordingBackend::default();
        let mut cache = GlyphCache::new();

        assert_eq!(cache.warm("AB".chars(), &mut face, &mut backend), 2);
        assert_eq!(cache.warm("ABx".chars(), &mut face, &mut backend), 1);
        assert_eq!(backend.uploads, 3);
        cache.destroy(&mut backend);
    }

    #[test]
    fn destroy_releases_each_texture_once() {
        let mut face = FakeFace::latin(48);
        let mut backend = RecordingBackend::default();
        let mut cache = GlyphCache::new();
        for character in "ABAgxB\u{e000}".chars() {
            cache.get(character, &mut face, &mut backend);
        }
        assert_eq!(backend.textures.len(), 4);

        assert_eq!(cache.destroy(&mut backend), 4);
        assert!(cache.is_empty());
        assert!(backend.textures.is_empty());
        assert_eq!(backend.releases.len(), 4);
        assert_eq!(backend.stale_releases, 0);

        assert_eq!(cache.destroy(&mut backend), 0);
        assert_eq!(backend.releases.len(), 4);
    }

    #[test]
    fn peek_does_not_populate() {
        let mut face = FakeFace::latin(48);
        let mut backend = RecordingBackend::default();
        let mut cache = GlyphCache::new();

        assert!(cache.peek('A').is_none());
        assert!(cache.is_empty());
        cache.get('A', &mut face, &mut backend);
        assert!(cache.peek('A').is_some());
        cache.destroy(&mut backend);
    }
}
