//! Errors produced by the text core.
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TextError {
    /// The font file is missing, unreadable or not a font. Fatal to initialization.
    #[error("font: could not load '{}': {reason}", .path.display())]
    FontLoad { path: PathBuf, reason: String },
    /// The loaded face has no glyph for this character.
    #[error("glyph: no glyph for {0:?}")]
    GlyphLoad(char),
    #[error("texture: {0}")]
    TextureUpload(String),
}

impl TextError {
    pub fn font_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        TextError::FontLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
