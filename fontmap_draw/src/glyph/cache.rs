// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-face glyph caches.

#![allow(
    clippy::cast_possible_truncation,
    reason = "matrix coefficients are quantized to i32 keys"
)]

use core::fmt;

use fontmap::{Error, Face, SubstFont};
use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use kurbo::Affine;

use super::{outline, raster, synth, AntiAlias, Font, GlyphBitmap};
use crate::path::Path;

/// Identifies a rendering size and style of a face.
///
/// Matrix coefficients are compared at a precision of 1/10000.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct SizeKey {
    coeffs: [i32; 4],
    dest_width: i32,
    anti_alias: AntiAlias,
    style: Option<StyleKey>,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
struct StyleKey {
    weight: i32,
    italic_angle: i32,
    vertical: bool,
}

impl SizeKey {
    /// Creates a key for glyphs drawn with the linear part of `matrix`.
    pub fn new(matrix: &Affine, dest_width: i32, anti_alias: AntiAlias) -> Self {
        let [a, b, c, d, ..] = matrix.as_coeffs();
        Self {
            coeffs: [a, b, c, d].map(|v| (v * 10000.0) as i32),
            dest_width,
            anti_alias,
            style: None,
        }
    }

    /// Adds the synthetic style of a substitution to the key.
    #[must_use]
    pub fn with_style(mut self, subst: &SubstFont, vertical: bool) -> Self {
        self.style = Some(StyleKey {
            weight: subst.weight,
            italic_angle: subst.italic_angle,
            vertical,
        });
        self
    }

    fn for_font(
        font: &Font,
        font_style: bool,
        matrix: &Affine,
        dest_width: i32,
        anti_alias: AntiAlias,
    ) -> Self {
        let key = Self::new(matrix, dest_width, anti_alias);
        match font.subst() {
            Some(subst) if font_style => key.with_style(subst, font.is_vertical()),
            _ => key,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
struct PathKey {
    glyph: u32,
    dest_width: i32,
    weight: i32,
    italic_angle: i32,
    vertical: bool,
}

/// Rendered bitmaps and outlines of one face.
///
/// Entries live as long as the cache. Glyphs that fail to load are cached
/// as missing so they are not retried.
#[derive(Default)]
pub struct GlyphCache {
    bitmaps: HashMap<SizeKey, HashMap<u32, Option<GlyphBitmap>>>,
    paths: HashMap<PathKey, Option<Path>>,
}

impl GlyphCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bitmap of `glyph_index` drawn with `matrix`, which maps em
    /// units to device pixels with y up. Translation is ignored.
    ///
    /// When `font_style` is set and the font is a substitute, the synthetic
    /// italic and bold it asks for are applied. `dest_width` is the width the
    /// document expects for the glyph and only distinguishes cache entries.
    pub fn look_up_glyph_bitmap(
        &mut self,
        font: &Font,
        glyph_index: u32,
        font_style: bool,
        matrix: &Affine,
        dest_width: i32,
        anti_alias: AntiAlias,
    ) -> Option<&GlyphBitmap> {
        let key = SizeKey::for_font(font, font_style, matrix, dest_width, anti_alias);
        match self.bitmaps.entry(key).or_default().entry(glyph_index) {
            Entry::Occupied(entry) => entry.into_mut().as_ref(),
            Entry::Vacant(entry) => {
                log::debug!("rendering glyph {glyph_index} for {key:?}");
                let bitmap = render_glyph(font, glyph_index, font_style, matrix, anti_alias);
                entry.insert(bitmap).as_ref()
            }
        }
    }

    /// Returns the outline of `glyph_index` in em units, y up, with the
    /// synthetic style of the font's substitution applied.
    pub fn load_glyph_path(
        &mut self,
        font: &Font,
        glyph_index: u32,
        dest_width: i32,
    ) -> Option<&Path> {
        let subst = font.subst();
        let key = PathKey {
            glyph: glyph_index,
            dest_width,
            weight: subst.map_or(0, |s| s.weight),
            italic_angle: subst.map_or(0, |s| s.italic_angle),
            vertical: font.is_vertical(),
        };
        match self.paths.entry(key) {
            Entry::Occupied(entry) => entry.into_mut().as_ref(),
            Entry::Vacant(entry) => {
                log::debug!("loading outline of glyph {glyph_index}");
                entry.insert(load_path(font, glyph_index)).as_ref()
            }
        }
    }

    /// Returns the number of cached bitmaps, including failures.
    pub fn bitmap_count(&self) -> usize {
        self.bitmaps.values().map(HashMap::len).sum()
    }

    /// Returns the number of cached outlines, including failures.
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }
}

impl fmt::Debug for GlyphCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphCache")
            .field("sizes", &self.bitmaps.len())
            .field("bitmaps", &self.bitmap_count())
            .field("paths", &self.paths.len())
            .finish_non_exhaustive()
    }
}

fn load_path(font: &Font, glyph_index: u32) -> Option<Path> {
    let mut path = outline::glyph_outline(font.face(), glyph_index)?;
    if let Some(subst) = font.subst() {
        if let Some(skew) = synth::italic_transform(subst, font.is_vertical()) {
            path.transform(&skew);
        }
        if let Some(strength) = synth::outline_embolden_strength(subst) {
            synth::embolden_path(&mut path, strength);
        }
    }
    Some(path)
}

fn render_glyph(
    font: &Font,
    glyph_index: u32,
    font_style: bool,
    matrix: &Affine,
    anti_alias: AntiAlias,
) -> Option<GlyphBitmap> {
    let mut path = outline::glyph_outline(font.face(), glyph_index)?;
    let [a, b, c, d, ..] = matrix.as_coeffs();
    let matrix = Affine::new([a, b, c, d, 0.0, 0.0]);
    let subst = font.subst().filter(|_| font_style);
    let skew = subst.and_then(|subst| synth::italic_transform(subst, font.is_vertical()));
    let matrix = matrix * skew.unwrap_or(Affine::IDENTITY);
    path.transform(&matrix);
    if let Some(strength) = subst.and_then(|subst| synth::bitmap_embolden_strength(subst, &matrix))
    {
        synth::embolden_path(&mut path, strength);
    }
    match raster::rasterize_path(&path, anti_alias) {
        Ok(bitmap) => bitmap,
        Err(Error::ResourceLimitExceeded { width, height }) => {
            log::warn!("glyph {glyph_index} is too large to render ({width}x{height})");
            None
        }
        Err(err) => {
            log::debug!("glyph {glyph_index} failed to render: {err}");
            None
        }
    }
}

/// Glyph caches for every face in use, keyed by font data and face index.
#[derive(Default)]
pub struct FontCache {
    faces: HashMap<(u64, u32), GlyphCache>,
}

impl FontCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the glyph cache of `face`, creating it if needed.
    pub fn glyph_cache(&mut self, face: &Face) -> &mut GlyphCache {
        self.faces.entry(face.id()).or_default()
    }

    /// Drops the cache of `face`. Returns true if there was one.
    pub fn release(&mut self, face: &Face) -> bool {
        self.faces.remove(&face.id()).is_some()
    }

    /// Returns the number of faces with a cache.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Returns true if no face has a cache.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

impl fmt::Debug for FontCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontCache")
            .field("faces", &self.faces.len())
            .finish_non_exhaustive()
    }
}
