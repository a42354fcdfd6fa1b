// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Portable font discovery by scanning directories for font files.

use alloc::string::String;
use alloc::vec::Vec;
use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::attributes::{FontStyleFlags, PitchFamily};
use crate::catalog::{FontFaceCatalog, FontFaceInfo};
use crate::charset::{Charset, CharsetFlags};
use crate::sfnt::{self, TableDirectory, SFNT_HEADER_LEN};
use crate::standard::base14_substitute;
use crate::system::{FontHandle, InstalledFonts, SystemFontInfo};
use crate::tag::{TABLE_NAME, TABLE_OS2, TABLE_TTCF};

const FONT_EXTENSIONS: [&str; 3] = [".ttf", ".ttc", ".otf"];

/// Charsets reported for a face, in the order they are forwarded.
const REPORTED_CHARSETS: [(CharsetFlags, Charset); 5] = [
    (CharsetFlags::SHIFT_JIS, Charset::ShiftJis),
    (CharsetFlags::GB, Charset::ChineseSimplified),
    (CharsetFlags::BIG5, Charset::ChineseTraditional),
    (CharsetFlags::KOREAN, Charset::Hangul),
    (CharsetFlags::SYMBOL, Charset::Symbol),
];

/// [`SystemFontInfo`] backed by font files found under a set of
/// directories.
///
/// Directories are scanned when the font list is first enumerated.
#[derive(Clone, Default, Debug)]
pub struct FolderFontInfo {
    paths: Vec<PathBuf>,
    catalog: FontFaceCatalog,
}

impl FolderFontInfo {
    /// Creates an info with no directories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directory to scan.
    pub fn add_path(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    /// Returns the directories that will be scanned.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Returns the faces found so far.
    pub fn catalog(&self) -> &FontFaceCatalog {
        &self.catalog
    }

    /// Scans a directory tree and reports every face found.
    ///
    /// Entries are visited in name order. Only `.ttf`, `.ttc` and `.otf`
    /// files are opened. Symbolic links to directories are not followed.
    pub fn scan_path(&mut self, path: &Path, sink: &mut InstalledFonts) {
        let entries = match fs::read_dir(path) {
            Ok(entries) => entries,
            Err(err) => {
                log::debug!("skipping font directory {}: {err}", path.display());
                return;
            }
        };
        let mut entries: Vec<_> = entries.filter_map(|entry| entry.ok()).collect();
        entries.sort_by_key(|entry| entry.file_name());
        for entry in entries {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let full_path = entry.path();
            if file_type.is_dir() {
                self.scan_path(&full_path, sink);
            } else if has_font_extension(&entry.file_name().to_string_lossy()) {
                self.scan_file(&full_path, sink);
            }
        }
    }

    /// Scans one font file or collection.
    pub fn scan_file(&mut self, path: &Path, sink: &mut InstalledFonts) {
        let Some(data) = map_file(path) else {
            log::debug!("skipping unreadable font file {}", path.display());
            return;
        };
        let data = &data[..];
        if data.len() < SFNT_HEADER_LEN {
            log::debug!("skipping truncated font file {}", path.display());
            return;
        }
        if !sfnt::is_collection(data) {
            self.report_face(path, data, 0, sink);
            return;
        }
        let Some(offsets) = sfnt::collection_offsets(data) else {
            log::debug!("skipping collection with a bad header {}", path.display());
            return;
        };
        for offset in offsets {
            self.report_face(path, data, offset, sink);
        }
    }

    fn report_face(&mut self, path: &Path, data: &[u8], offset: u32, sink: &mut InstalledFonts) {
        let Ok(file_size) = u32::try_from(data.len()) else {
            log::debug!("skipping oversized font file {}", path.display());
            return;
        };
        let Some(tables) = sfnt::read_table_directory(data, offset).filter(|t| !t.is_empty())
        else {
            log::debug!("skipping face at {offset} in {}: no tables", path.display());
            return;
        };
        let directory = TableDirectory::new(tables);
        let Some(names) = directory.table(data, TABLE_NAME) else {
            log::debug!("skipping face at {offset} in {}: no name table", path.display());
            return;
        };
        let Some(mut face_name) = sfnt::name_string(names, 1) else {
            log::debug!("skipping face at {offset} in {}: no family name", path.display());
            return;
        };
        let style = sfnt::name_string(names, 2).unwrap_or_default();
        if !style.is_empty() && style != "Regular" {
            face_name.push(' ');
            face_name.push_str(&style);
        }

        let mut charsets = directory
            .table(data, TABLE_OS2)
            .map(sfnt::os2_charsets)
            .unwrap_or_default();
        for (flag, charset) in REPORTED_CHARSETS {
            if charsets.contains(flag) {
                sink.add(face_name.as_str(), charset);
            }
        }
        sink.add(face_name.as_str(), Charset::Ansi);
        charsets |= CharsetFlags::ANSI;

        let styles = face_styles(&face_name, &style, sfnt::is_fixed_pitch(&directory, data));
        log::trace!("found {face_name:?} in {}: {styles:?} {charsets:?}", path.display());
        self.catalog.insert(FontFaceInfo::new(
            path,
            face_name,
            tables.to_vec(),
            offset,
            file_size,
            styles,
            charsets,
        ));
    }

    /// Returns the best face for the request. See
    /// [`FontFaceCatalog::find_font`].
    pub fn find_font(
        &self,
        weight: i32,
        italic: bool,
        charset: Charset,
        pitch_family: PitchFamily,
        family: &str,
        match_name: bool,
    ) -> Option<FontHandle> {
        self.catalog
            .find_font(weight, italic, charset, pitch_family, family, match_name)
            .ok()
            .map(handle_for)
    }

    /// Returns the installed TrueType substitute for a Latin standard font
    /// name, such as "Arial Bold" for `Helvetica-Bold`.
    pub fn get_subst_font(&mut self, face: &str) -> Option<FontHandle> {
        base14_substitute(face).and_then(|subst| self.get_font(subst))
    }

    fn face(&self, handle: FontHandle) -> Option<&FontFaceInfo> {
        let position = usize::try_from(handle.value()).ok()?;
        self.catalog.get_index(position).map(|face| &**face)
    }

    /// Returns the face with the file offset and size of `table`.
    fn data_range(&self, handle: FontHandle, table: u32) -> Option<(&FontFaceInfo, u32, usize)> {
        let face = self.face(handle)?;
        let (offset, size) = match table {
            0 if face.font_offset() == 0 => (0, face.file_size()),
            TABLE_TTCF if face.font_offset() != 0 => (0, face.file_size()),
            0 | TABLE_TTCF => (0, 0),
            tag => TableDirectory::new(face.tables())
                .find(tag)
                .unwrap_or((0, 0)),
        };
        Some((face, offset, size as usize))
    }
}

impl SystemFontInfo for FolderFontInfo {
    fn enum_font_list(&mut self, sink: &mut InstalledFonts) -> bool {
        let paths = self.paths.clone();
        for path in &paths {
            self.scan_path(path, sink);
        }
        true
    }

    fn map_font(
        &mut self,
        weight: i32,
        italic: bool,
        charset: Charset,
        pitch_family: PitchFamily,
        face: &str,
    ) -> Option<FontHandle> {
        self.find_font(weight, italic, charset, pitch_family, face, true)
    }

    fn get_font(&mut self, face: &str) -> Option<FontHandle> {
        self.catalog.position(face).map(handle_for)
    }

    fn get_font_data(&self, handle: FontHandle, table: u32, buf: &mut [u8]) -> usize {
        let Some((face, offset, size)) = self.data_range(handle, table) else {
            return 0;
        };
        if size == 0 || buf.len() < size {
            return size;
        }
        read_or_log(face, offset, &mut buf[..size])
    }

    fn get_font_data_prefix(&self, handle: FontHandle, table: u32, buf: &mut [u8]) -> usize {
        let Some((face, offset, size)) = self.data_range(handle, table) else {
            return 0;
        };
        let len = size.min(buf.len());
        if len == 0 {
            return 0;
        }
        read_or_log(face, offset, &mut buf[..len])
    }

    fn get_face_name(&self, handle: FontHandle) -> Option<String> {
        self.face(handle).map(|face| face.face_name().into())
    }

    fn get_font_charset(&self, _handle: FontHandle) -> Option<Charset> {
        None
    }

    fn delete_font(&mut self, _handle: FontHandle) {}
}

fn read_or_log(face: &FontFaceInfo, offset: u32, buf: &mut [u8]) -> usize {
    match read_range(face.path(), offset, buf) {
        Ok(()) => buf.len(),
        Err(err) => {
            log::debug!("reading {} failed: {err}", face.path().display());
            0
        }
    }
}

fn handle_for(position: usize) -> FontHandle {
    FontHandle::new(position as u64)
}

fn has_font_extension(file_name: &str) -> bool {
    let Some(ext) = file_name
        .len()
        .checked_sub(4)
        .and_then(|start| file_name.get(start..))
    else {
        return false;
    };
    FONT_EXTENSIONS
        .iter()
        .any(|known| ext.eq_ignore_ascii_case(known))
}

fn face_styles(face_name: &str, style: &str, fixed_pitch: bool) -> FontStyleFlags {
    let mut styles = FontStyleFlags::NORMAL;
    if style.contains("Bold") {
        styles |= FontStyleFlags::FORCE_BOLD;
    }
    if style.contains("Italic") || style.contains("Oblique") {
        styles |= FontStyleFlags::ITALIC;
    }
    if face_name.contains("Serif") {
        styles |= FontStyleFlags::SERIF;
    }
    if fixed_pitch {
        styles |= FontStyleFlags::FIXED_PITCH;
    }
    styles
}

fn read_range(path: &Path, offset: u32, buf: &mut [u8]) -> std::io::Result<()> {
    let mut file = fs::File::open(path)?;
    file.seek(SeekFrom::Start(offset.into()))?;
    file.read_exact(buf)
}

#[expect(
    unsafe_code,
    reason = "Memory mapping is unsafe if the file is modified while mapped."
)]
fn map_file(path: &Path) -> Option<memmap2::Mmap> {
    let file = fs::File::open(path).ok()?;
    unsafe { memmap2::Mmap::map(&file).ok() }
}
