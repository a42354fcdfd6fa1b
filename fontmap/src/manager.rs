// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Process-wide font state: the mapper, cached font data and built-in
//! faces.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use std::path::PathBuf;

use hashbrown::HashMap;
use linebender_resource_handle::Blob;

use crate::attributes::FontStyleFlags;
use crate::face::Face;
use crate::folder::FolderFontInfo;
use crate::mapper::{blob_from_vec, FaceSources, FontMapper};
use crate::standard::StandardFont;
use crate::subst::SubstFont;
use crate::system::SystemFontInfo;

/// Directories searched for fonts when no platform info is injected.
#[cfg(target_os = "linux")]
pub const SYSTEM_FONT_DIRS: &[&str] = &[
    "/usr/share/fonts",
    "/usr/share/X11/fonts/Type1",
    "/usr/share/X11/fonts/TTF",
    "/usr/local/share/fonts",
];
/// Directories searched for fonts when no platform info is injected.
#[cfg(target_os = "macos")]
pub const SYSTEM_FONT_DIRS: &[&str] = &["/Library/Fonts", "/System/Library/Fonts"];
/// Directories searched for fonts when no platform info is injected.
#[cfg(target_os = "windows")]
pub const SYSTEM_FONT_DIRS: &[&str] = &["C:\\Windows\\Fonts"];
/// Directories searched for fonts when no platform info is injected.
#[cfg(target_os = "android")]
pub const SYSTEM_FONT_DIRS: &[&str] = &["/system/fonts"];
/// Directories searched for fonts when no platform info is injected.
#[cfg(not(any(
    target_os = "linux",
    target_os = "macos",
    target_os = "windows",
    target_os = "android"
)))]
pub const SYSTEM_FONT_DIRS: &[&str] = &[];

/// Source of the faces that ship with the renderer.
///
/// Embedders provide the fourteen standard fonts and the generic fallbacks
/// from whatever storage they bundle them in.
pub trait BuiltinFonts {
    /// Returns data for one of the standard fonts.
    fn standard_font(&self, font: StandardFont) -> Option<Blob<u8>>;

    /// Returns data for the serif fallback.
    fn generic_serif_font(&self) -> Option<Blob<u8>>;

    /// Returns data for the sans serif fallback.
    fn generic_sans_font(&self) -> Option<Blob<u8>>;
}

/// Provider with no built-in faces.
#[derive(Copy, Clone, Default, Debug)]
pub struct NoBuiltinFonts;

impl BuiltinFonts for NoBuiltinFonts {
    fn standard_font(&self, _font: StandardFont) -> Option<Blob<u8>> {
        None
    }

    fn generic_serif_font(&self) -> Option<Blob<u8>> {
        None
    }

    fn generic_sans_font(&self) -> Option<Blob<u8>> {
        None
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
struct FaceDescKey {
    name: String,
    weight: i32,
    italic: bool,
}

/// Font data loaded from the system, shared by every face created from it.
///
/// Single faces are keyed by name, weight and italic. Collections are
/// keyed by size and checksum so that every face in a collection shares
/// one copy of the data.
#[derive(Clone, Default, Debug)]
pub struct FontDescCache {
    faces: HashMap<FaceDescKey, Blob<u8>>,
    collections: HashMap<(usize, u32), Blob<u8>>,
}

impl FontDescCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns cached data for a single face.
    pub fn get_cached_font_desc(&self, name: &str, weight: i32, italic: bool) -> Option<&Blob<u8>> {
        self.faces.get(&FaceDescKey {
            name: name.into(),
            weight,
            italic,
        })
    }

    /// Caches data for a single face and returns the shared blob.
    pub fn add_cached_font_desc(
        &mut self,
        name: &str,
        weight: i32,
        italic: bool,
        data: Vec<u8>,
    ) -> Blob<u8> {
        let blob = blob_from_vec(data);
        self.faces.insert(
            FaceDescKey {
                name: name.into(),
                weight,
                italic,
            },
            blob.clone(),
        );
        blob
    }

    /// Returns cached data for a collection.
    pub fn get_cached_ttc_font_desc(&self, size: usize, checksum: u32) -> Option<&Blob<u8>> {
        self.collections.get(&(size, checksum))
    }

    /// Caches data for a collection and returns the shared blob.
    pub fn add_cached_ttc_font_desc(&mut self, size: usize, checksum: u32, data: Vec<u8>) -> Blob<u8> {
        let blob = blob_from_vec(data);
        self.collections.insert((size, checksum), blob.clone());
        blob
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.faces.len() + self.collections.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops all cached data.
    ///
    /// Faces already handed out keep their data alive.
    pub fn clear(&mut self) {
        self.faces.clear();
        self.collections.clear();
    }
}

/// Options for a font manager.
#[derive(Clone, Default, Debug)]
pub struct FontManagerOptions {
    /// Directories scanned by the folder font info.
    pub font_paths: Vec<PathBuf>,
    /// If true, the platform's usual font directories are scanned after
    /// [`font_paths`](Self::font_paths).
    ///
    /// The default value is false.
    pub scan_system_paths: bool,
}

impl FontManagerOptions {
    /// Adds directories to scan.
    #[must_use]
    pub fn with_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.font_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Also scans [`SYSTEM_FONT_DIRS`].
    #[must_use]
    pub fn with_system_paths(mut self) -> Self {
        self.scan_system_paths = true;
        self
    }

    /// Adds the directories listed in the environment variable `var`,
    /// separated the way `PATH` is on this platform.
    #[must_use]
    pub fn with_env_paths(mut self, var: &str) -> Self {
        if let Some(value) = std::env::var_os(var) {
            self.font_paths.extend(std::env::split_paths(&value));
        }
        self
    }
}

/// Owns the font mapper and the font data it loads.
pub struct FontManager {
    mapper: FontMapper,
    cache: FontDescCache,
    builtins: Box<dyn BuiltinFonts>,
}

impl FontManager {
    /// Creates a manager that discovers fonts by scanning directories.
    pub fn new(options: FontManagerOptions) -> Self {
        let mut info = FolderFontInfo::new();
        for path in options.font_paths {
            info.add_path(path);
        }
        if options.scan_system_paths {
            for path in SYSTEM_FONT_DIRS {
                info.add_path(*path);
            }
        }
        log::debug!("scanning fonts in {:?}", info.paths());
        let mut mapper = FontMapper::new();
        mapper.set_system_font_info(Box::new(info));
        Self {
            mapper,
            cache: FontDescCache::new(),
            builtins: Box::new(NoBuiltinFonts),
        }
    }

    /// Replaces the platform font info.
    pub fn set_system_font_info(&mut self, font_info: Box<dyn SystemFontInfo>) {
        self.mapper.set_system_font_info(font_info);
    }

    /// Replaces the provider of built-in faces.
    pub fn set_builtin_fonts(&mut self, builtins: Box<dyn BuiltinFonts>) {
        self.builtins = builtins;
    }

    /// Returns the font mapper.
    pub fn mapper(&self) -> &FontMapper {
        &self.mapper
    }

    /// Returns the font mapper for modification.
    pub fn mapper_mut(&mut self) -> &mut FontMapper {
        &mut self.mapper
    }

    /// Returns the cache of loaded font data.
    pub fn font_desc_cache(&self) -> &FontDescCache {
        &self.cache
    }

    /// Chooses a face for a font requested by a document.
    ///
    /// `weight` and `italic_angle` are honored only when `flags` contains
    /// [`FontStyleFlags::USE_EXTERNAL_ATTR`]. A nonzero `code_page` selects
    /// the charset to match. The substitution that was made is written to
    /// `subst`. Returns `None` when neither the system nor the built-in
    /// provider has a usable face.
    pub fn find_subst_font(
        &mut self,
        name: &str,
        is_truetype: bool,
        flags: FontStyleFlags,
        weight: i32,
        italic_angle: i32,
        code_page: u16,
        subst: &mut SubstFont,
    ) -> Option<Face> {
        let mut sources = FaceSources {
            cache: &mut self.cache,
            builtins: &*self.builtins,
        };
        self.mapper.find_subst_font(
            &mut sources,
            name,
            is_truetype,
            flags,
            weight,
            italic_angle,
            code_page,
            subst,
        )
    }
}

impl fmt::Debug for FontManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontManager")
            .field("mapper", &self.mapper)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::FW_BOLD;
    use crate::charset::{Charset, CharsetFlags};
    use crate::sfnt::test_fonts::styled_font;
    use crate::system::mock::MemoryFontInfo;

    #[test]
    fn cache_keys() {
        let mut cache = FontDescCache::new();
        assert!(cache.is_empty());
        let blob = cache.add_cached_font_desc("Arial", 400, false, vec![1, 2, 3]);
        assert_eq!(cache.get_cached_font_desc("Arial", 400, false).map(Blob::id), Some(blob.id()));
        assert!(cache.get_cached_font_desc("Arial", 700, false).is_none());
        assert!(cache.get_cached_font_desc("Arial", 400, true).is_none());

        let ttc = cache.add_cached_ttc_font_desc(1024, 7, vec![0; 4]);
        assert_eq!(cache.get_cached_ttc_font_desc(1024, 7).map(Blob::id), Some(ttc.id()));
        assert!(cache.get_cached_ttc_font_desc(1024, 8).is_none());
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn options() {
        let options = FontManagerOptions::default()
            .with_paths(["/a", "/b"])
            .with_system_paths();
        assert_eq!(options.font_paths, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
        assert!(options.scan_system_paths);
        let options = FontManagerOptions::default().with_env_paths("FONTMAP_TEST_UNSET_VARIABLE");
        assert!(options.font_paths.is_empty());
    }

    #[test]
    fn manager_uses_injected_info() {
        let mut info = MemoryFontInfo::new();
        info.add_face(
            "Verdana Bold",
            styled_font("Verdana", "Bold"),
            0,
            FontStyleFlags::FORCE_BOLD,
            CharsetFlags::ANSI,
        );
        let mut manager = FontManager::new(FontManagerOptions::default());
        manager.set_system_font_info(Box::new(info));
        let mut subst = SubstFont::new();
        let face = manager
            .find_subst_font("Verdana Bold", true, FontStyleFlags::NORMAL, 0, 0, 0, &mut subst)
            .unwrap();
        assert!(face.is_bold());
        assert_eq!(subst.family, "Verdana Bold");
        assert_eq!(subst.charset, Charset::Ansi);
        assert_eq!(manager.font_desc_cache().len(), 1);
        assert_eq!(manager.mapper().face_size(), 1);
    }

    #[test]
    fn missing_fonts_without_builtins() {
        let mut manager = FontManager::new(FontManagerOptions::default());
        let mut subst = SubstFont::new();
        let face = manager.find_subst_font(
            "Nonexistent",
            false,
            FontStyleFlags::USE_EXTERNAL_ATTR,
            FW_BOLD,
            0,
            0,
            &mut subst,
        );
        assert!(face.is_none());
        assert_eq!(subst.family, "Chrome Sans");
        assert_eq!(subst.weight, FW_BOLD);
        assert!(subst.is_built_in_generic_font);
    }
}
