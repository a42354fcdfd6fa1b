// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory index of scanned faces and the scored best-face search.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use std::path::{Path, PathBuf};

use hashbrown::HashMap;

use crate::attributes::{FontStyleFlags, PitchFamily, FW_NORMAL};
use crate::charset::{Charset, CharsetFlags};
use crate::names::{family_name_matches, NameKey};
use crate::{Error, Result};

/// Highest score [`FontFaceInfo::similarity_score`] can produce.
pub const SIMILARITY_SCORE_MAX: i32 = 68;

/// Family tried for fixed pitch Western requests with no other match.
const FIXED_PITCH_FALLBACK: &str = "Courier New";

/// A face discovered by the folder scanner.
///
/// Records are immutable once built and shared behind an [`Arc`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FontFaceInfo {
    path: PathBuf,
    face_name: String,
    tables: Vec<u8>,
    font_offset: u32,
    file_size: u32,
    styles: FontStyleFlags,
    charsets: CharsetFlags,
}

impl FontFaceInfo {
    /// Creates a record.
    pub fn new(
        path: impl Into<PathBuf>,
        face_name: impl Into<String>,
        tables: Vec<u8>,
        font_offset: u32,
        file_size: u32,
        styles: FontStyleFlags,
        charsets: CharsetFlags,
    ) -> Self {
        Self {
            path: path.into(),
            face_name: face_name.into(),
            tables,
            font_offset,
            file_size,
            styles,
            charsets,
        }
    }

    /// Returns the path of the file that holds the face.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the face name: the family, followed by the style unless it
    /// is "Regular".
    pub fn face_name(&self) -> &str {
        &self.face_name
    }

    /// Returns the raw table directory records.
    pub fn tables(&self) -> &[u8] {
        &self.tables
    }

    /// Returns the offset of the face within a collection, 0 for single
    /// face files.
    pub fn font_offset(&self) -> u32 {
        self.font_offset
    }

    /// Returns the size of the containing file.
    pub fn file_size(&self) -> u32 {
        self.file_size
    }

    /// Returns the style bits derived from the names.
    pub fn styles(&self) -> FontStyleFlags {
        self.styles
    }

    /// Returns the charsets declared by the face.
    pub fn charsets(&self) -> CharsetFlags {
        self.charsets
    }

    /// Returns true if the face may be considered for `charset`.
    ///
    /// [`Charset::Default`] accepts every face.
    pub fn is_eligible(&self, charset: Charset) -> bool {
        self.charsets.intersects(charset.flag()) || charset == Charset::Default
    }

    /// Scores how well the face fits the requested attributes.
    pub fn similarity_score(
        &self,
        weight: i32,
        italic: bool,
        pitch_family: PitchFamily,
        exact_match_bonus: bool,
    ) -> i32 {
        let styles = self.styles;
        let mut score = 0;
        if styles.contains(FontStyleFlags::FORCE_BOLD) == (weight > FW_NORMAL) {
            score += 16;
        }
        if styles.contains(FontStyleFlags::ITALIC) == italic {
            score += 16;
        }
        if styles.contains(FontStyleFlags::SERIF) == pitch_family.contains(PitchFamily::ROMAN) {
            score += 16;
        }
        if styles.contains(FontStyleFlags::SCRIPT) == pitch_family.contains(PitchFamily::SCRIPT) {
            score += 8;
        }
        if styles.contains(FontStyleFlags::FIXED_PITCH)
            == pitch_family.contains(PitchFamily::FIXED_PITCH)
        {
            score += 8;
        }
        if exact_match_bonus {
            score += 4;
        }
        debug_assert!(score <= SIMILARITY_SCORE_MAX);
        score
    }
}

/// Ordered, name-unique collection of faces.
///
/// Iteration follows insertion order. Names are compared case-insensitively.
#[derive(Clone, Default)]
pub struct FontFaceCatalog {
    faces: Vec<Arc<FontFaceInfo>>,
    index: HashMap<Arc<[u8]>, usize>,
}

impl FontFaceCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of faces.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Returns true if the catalog holds no faces.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Adds a face and returns its position.
    ///
    /// A face with the same name replaces the existing record and keeps its
    /// position.
    pub fn insert(&mut self, info: FontFaceInfo) -> usize {
        let key = NameKey::from_str(info.face_name());
        let info = Arc::new(info);
        if let Some(&position) = self.index.get(key.as_bytes()) {
            self.faces[position] = info;
            return position;
        }
        let position = self.faces.len();
        self.faces.push(info);
        self.index.insert(key.as_bytes().into(), position);
        position
    }

    /// Returns the position of the face with the given name.
    pub fn position(&self, face_name: &str) -> Option<usize> {
        let key = NameKey::from_str(face_name);
        self.index.get(key.as_bytes()).copied()
    }

    /// Returns the face with the given name.
    pub fn get(&self, face_name: &str) -> Option<&Arc<FontFaceInfo>> {
        self.position(face_name).map(|position| &self.faces[position])
    }

    /// Returns the face at `position`.
    pub fn get_index(&self, position: usize) -> Option<&Arc<FontFaceInfo>> {
        self.faces.get(position)
    }

    /// Returns an iterator over the faces in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<FontFaceInfo>> + Clone {
        self.faces.iter()
    }

    /// Removes every face.
    pub fn clear(&mut self) {
        self.faces.clear();
        self.index.clear();
    }

    /// Finds the position of the face that best fits the request.
    ///
    /// Faces that do not support `charset` are never returned. With
    /// `match_name`, candidates must contain `family` as a whole word prefix
    /// and an exact name hit with a perfect score wins immediately. Ties go
    /// to the face inserted first.
    pub fn find_font(
        &self,
        weight: i32,
        italic: bool,
        charset: Charset,
        pitch_family: PitchFamily,
        family: &str,
        match_name: bool,
    ) -> Result<usize> {
        let mut best: Option<usize> = None;
        let mut best_score = 0;
        if match_name {
            if let Some(position) = self.position(family) {
                let face = &self.faces[position];
                if face.is_eligible(charset) {
                    best_score = face.similarity_score(weight, italic, pitch_family, true);
                    if best_score == SIMILARITY_SCORE_MAX {
                        return Ok(position);
                    }
                    best = Some(position);
                }
            }
        }
        for (position, face) in self.faces.iter().enumerate() {
            if !face.is_eligible(charset) {
                continue;
            }
            let exact = match_name && family.len() == face.face_name().len();
            let score = face.similarity_score(weight, italic, pitch_family, exact);
            if score > best_score {
                if match_name && !family_name_matches(face.face_name(), family) {
                    continue;
                }
                best_score = score;
                best = Some(position);
            }
        }
        if let Some(position) = best {
            return Ok(position);
        }
        if charset == Charset::Ansi && pitch_family.contains(PitchFamily::FIXED_PITCH) {
            if let Some(position) = self.position(FIXED_PITCH_FALLBACK) {
                return Ok(position);
            }
        }
        Err(Error::NotFound)
    }
}

impl core::fmt::Debug for FontFaceCatalog {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.faces.iter().map(|face| face.face_name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn face(name: &str, styles: FontStyleFlags, charsets: CharsetFlags) -> FontFaceInfo {
        FontFaceInfo::new("", name, vec![], 0, 0, styles, charsets)
    }

    fn catalog(faces: &[(&str, FontStyleFlags, CharsetFlags)]) -> FontFaceCatalog {
        let mut catalog = FontFaceCatalog::new();
        for &(name, styles, charsets) in faces {
            catalog.insert(face(name, styles, charsets));
        }
        catalog
    }

    fn name_of(catalog: &FontFaceCatalog, found: Result<usize>) -> Option<&str> {
        found
            .ok()
            .and_then(|position| catalog.get_index(position))
            .map(|face| face.face_name())
    }

    #[test]
    fn bookshelf_prefix_match() {
        let symbol = CharsetFlags::SYMBOL;
        let catalog = catalog(&[
            ("Symbol", FontStyleFlags::NORMAL, symbol),
            ("Bookshelf Symbol 7", FontStyleFlags::NORMAL, symbol),
            (
                "Tofu, Bold Italic",
                FontStyleFlags::FORCE_BOLD | FontStyleFlags::ITALIC,
                symbol,
            ),
        ]);
        let found = catalog.find_font(0, false, Charset::Symbol, PitchFamily::ROMAN, "Bookshelf", true);
        assert_eq!(name_of(&catalog, found), Some("Bookshelf Symbol 7"));
        let found = catalog.find_font(0, false, Charset::Symbol, PitchFamily::ROMAN, "Book", true);
        assert!(matches!(found, Err(Error::NotFound)));
    }

    #[test]
    fn bookshelf_score() {
        let face = face("Bookshelf Symbol 7", FontStyleFlags::NORMAL, CharsetFlags::SYMBOL);
        // Everything but the serif bit agrees with a roman request.
        assert_eq!(face.similarity_score(0, false, PitchFamily::ROMAN, false), 48);
        assert_eq!(face.similarity_score(0, false, PitchFamily::NONE, true), SIMILARITY_SCORE_MAX);
    }

    #[test]
    fn charset_is_a_hard_filter() {
        let catalog = catalog(&[
            ("Arial", FontStyleFlags::NORMAL, CharsetFlags::ANSI),
            ("MS Gothic", FontStyleFlags::NORMAL, CharsetFlags::SHIFT_JIS | CharsetFlags::ANSI),
            ("SimSun", FontStyleFlags::NORMAL, CharsetFlags::GB),
        ]);
        for charset in [Charset::ShiftJis, Charset::ChineseSimplified, Charset::Hangul, Charset::Ansi] {
            for match_name in [false, true] {
                if let Ok(position) =
                    catalog.find_font(400, false, charset, PitchFamily::NONE, "Arial", match_name)
                {
                    let face = catalog.get_index(position).unwrap();
                    assert!(
                        face.charsets().intersects(charset.flag()),
                        "{} returned for {charset:?}",
                        face.face_name()
                    );
                }
            }
        }
        assert!(catalog
            .find_font(400, false, Charset::Greek, PitchFamily::NONE, "Arial", false)
            .is_err());
        assert!(catalog
            .find_font(400, false, Charset::Default, PitchFamily::NONE, "SimSun", true)
            .is_ok());
    }

    #[test]
    fn ties_go_to_first_inserted() {
        let catalog = catalog(&[
            ("Alpha", FontStyleFlags::NORMAL, CharsetFlags::ANSI),
            ("Beta", FontStyleFlags::NORMAL, CharsetFlags::ANSI),
        ]);
        let found = catalog.find_font(400, false, Charset::Ansi, PitchFamily::NONE, "", false);
        assert_eq!(name_of(&catalog, found), Some("Alpha"));
    }

    #[test]
    fn best_style_wins() {
        let catalog = catalog(&[
            ("Arial", FontStyleFlags::NORMAL, CharsetFlags::ANSI),
            ("Arial Bold", FontStyleFlags::FORCE_BOLD, CharsetFlags::ANSI),
            ("Arialic", FontStyleFlags::FORCE_BOLD | FontStyleFlags::ITALIC, CharsetFlags::ANSI),
        ]);
        let found = catalog.find_font(700, false, Charset::Ansi, PitchFamily::NONE, "Arial", true);
        assert_eq!(name_of(&catalog, found), Some("Arial Bold"));
        let found = catalog.find_font(700, true, Charset::Ansi, PitchFamily::NONE, "Arial", true);
        assert_eq!(
            name_of(&catalog, found),
            Some("Arial Bold"),
            "Arialic is not a word match for Arial"
        );
    }

    #[test]
    fn courier_new_fallback() {
        let catalog = catalog(&[("Courier New", FontStyleFlags::NORMAL, CharsetFlags::SYMBOL)]);
        let found = catalog.find_font(400, false, Charset::Ansi, PitchFamily::FIXED_PITCH, "Mono", true);
        assert_eq!(name_of(&catalog, found), Some("Courier New"));
        let found = catalog.find_font(400, false, Charset::Ansi, PitchFamily::NONE, "Mono", true);
        assert!(found.is_err());
    }

    #[test]
    fn duplicate_replaces_in_place() {
        let mut catalog = catalog(&[
            ("First", FontStyleFlags::NORMAL, CharsetFlags::ANSI),
            ("Second", FontStyleFlags::NORMAL, CharsetFlags::ANSI),
        ]);
        let position = catalog.insert(face("first", FontStyleFlags::ITALIC, CharsetFlags::ANSI));
        assert_eq!(position, 0);
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get("FIRST").unwrap().styles().contains(FontStyleFlags::ITALIC));
    }
}
