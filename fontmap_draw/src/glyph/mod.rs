// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph outlines and bitmaps, cached per face.

mod cache;
mod outline;
mod raster;
mod synth;

use fontmap::{Face, SubstFont};

use crate::bitmap::DibBitmap;

pub use cache::{FontCache, GlyphCache, SizeKey};
pub use raster::rasterize_path;
pub use synth::{embolden_path, skew_from_angle, weight_level, SKEW_TABLE};

/// Largest width or height of a rendered glyph, in pixels.
pub const MAX_GLYPH_DIMENSION: u32 = 2048;

/// How glyph coverage is quantized.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Debug)]
pub enum AntiAlias {
    /// 256 levels of coverage.
    #[default]
    Normal,
    /// Pixels are either fully covered or empty.
    Mono,
}

/// A rendered glyph.
#[derive(Clone, PartialEq, Debug)]
pub struct GlyphBitmap {
    /// Device x of the first column, relative to the glyph origin.
    pub left: i32,
    /// Device y of the top edge, relative to the glyph origin, y up.
    pub top: i32,
    /// Coverage as an [`PixelFormat::EightBppMask`](crate::PixelFormat::EightBppMask).
    pub bitmap: DibBitmap,
}

/// A face as used for drawing text: possibly standing in for a requested
/// font, in which case the substitution asks for synthetic style.
#[derive(Clone, Debug)]
pub struct Font {
    face: Face,
    subst: Option<SubstFont>,
    vertical: bool,
}

impl Font {
    /// Creates a font that draws `face` as designed.
    pub fn new(face: Face) -> Self {
        Self {
            face,
            subst: None,
            vertical: false,
        }
    }

    /// Sets the substitution record filled in when `face` was chosen.
    #[must_use]
    pub fn with_subst(mut self, subst: SubstFont) -> Self {
        self.subst = Some(subst);
        self
    }

    /// Sets whether glyphs are laid out top to bottom.
    #[must_use]
    pub fn with_vertical(mut self, vertical: bool) -> Self {
        self.vertical = vertical;
        self
    }

    /// Returns the face.
    pub fn face(&self) -> &Face {
        &self.face
    }

    /// Returns the substitution record, if the face stands in for another.
    pub fn subst(&self) -> Option<&SubstFont> {
        self.subst.as_ref()
    }

    /// Returns true for vertical writing.
    pub fn is_vertical(&self) -> bool {
        self.vertical
    }
}
