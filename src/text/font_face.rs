use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use fontdue::{Font, FontSettings};
use log::info;

use crate::error::TextError;

use super::{RasterGlyph, Rasterize};

/// One font loaded at one pixel size.
///
/// The face owns a single raster buffer that every [`Rasterize::rasterize`] call overwrites,
/// so the returned [`RasterGlyph`] borrows the face mutably until the caller is done with it.
pub struct FontFace {
    font: Font,
    px: u32,
    buffer: Vec<u8>,
    path: PathBuf,
}

impl FontFace {
    pub fn open<P: AsRef<Path>>(path: P, px: u32) -> Result<Self, TextError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| TextError::font_load(path, err))?;
        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        let _ = reader
            .read_to_end(&mut buf)
            .map_err(|err| TextError::font_load(path, err))?;
        Self::from_bytes(buf, px, path)
    }

    /// Loads a font that is already in memory. `label` is only used in errors and logs.
    pub fn from_bytes<P: Into<PathBuf>>(bytes: Vec<u8>, px: u32, label: P) -> Result<Self, TextError> {
        let path = label.into();
        if px == 0 {
            return Err(TextError::font_load(path, "pixel size must be at least 1"));
        }

        let settings = FontSettings {
            scale: px as f32,
            ..FontSettings::default()
        };
        let font = Font::from_bytes(bytes, settings).map_err(|err| TextError::font_load(&path, err))?;
        info!(
            "loaded font '{}' at {}px ({} glyphs)",
            path.display(),
            px,
            font.glyph_count()
        );

        Ok(Self {
            font,
            px,
            buffer: Vec::new(),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_glyph(&self, character: char) -> bool {
        self.font.lookup_glyph_index(character) != 0
    }

    /// Distance between two baselines at this face's size, when the font provides one.
    pub fn line_height(&self) -> Option<f32> {
        self.font
            .horizontal_line_metrics(self.px as f32)
            .map(|metrics| metrics.new_line_size)
    }
}

impl Rasterize for FontFace {
    fn pixel_size(&self) -> u32 {
        self.px
    }

    fn rasterize(&mut self, character: char) -> Result<RasterGlyph<'_>, TextError> {
        // index 0 is .notdef, which we treat as "no glyph" instead of drawing a box
        let index = self.font.lookup_glyph_index(character);
        if index == 0 {
            return Err(TextError::GlyphLoad(character));
        }

        let (metrics, bitmap) = self.font.rasterize_indexed(index, self.px as f32);
        self.buffer.clear();
        self.buffer.extend_from_slice(&bitmap);

        Ok(RasterGlyph {
            bitmap: &self.buffer,
            width: metrics.width as u32,
            height: metrics.height as u32,
            left: metrics.xmin,
            // fontdue measures ymin from the baseline to the bitmap's bottom edge
            top: metrics.ymin + metrics.height as i32,
            advance: (metrics.advance_width * 64.0).round() as i32,
        })
    }
}
