// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The platform font capability interface.

use alloc::string::String;
use alloc::vec::Vec;

use crate::attributes::PitchFamily;
use crate::charset::Charset;

/// Opaque reference to a font owned by a [`SystemFontInfo`].
///
/// Handles are only meaningful to the implementation that produced them
/// and must be passed back to [`SystemFontInfo::delete_font`] when the
/// caller is done with them.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct FontHandle(u64);

impl FontHandle {
    /// Creates a handle from an implementation defined value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the implementation defined value.
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Receives installed faces during [`SystemFontInfo::enum_font_list`].
///
/// Entries are replayed into the font mapper in the order they were
/// added once enumeration completes.
#[derive(Clone, Default, Debug)]
pub struct InstalledFonts {
    entries: Vec<(String, Charset)>,
}

impl InstalledFonts {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that a face supports `charset`.
    pub fn add(&mut self, name: impl Into<String>, charset: Charset) {
        self.entries.push((name.into(), charset));
    }

    /// Returns the number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the recorded entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Charset)> + '_ {
        self.entries
            .iter()
            .map(|(name, charset)| (name.as_str(), *charset))
    }

    pub(crate) fn into_entries(self) -> Vec<(String, Charset)> {
        self.entries
    }
}

/// Access to the fonts available on a host.
///
/// Each platform provides its own implementation and the host injects it
/// into the [`FontManager`](crate::FontManager). The folder scanner in
/// [`FolderFontInfo`](crate::FolderFontInfo) is the portable one.
pub trait SystemFontInfo {
    /// Reports every installed face to `sink`.
    ///
    /// Returns false if enumeration is not supported.
    fn enum_font_list(&mut self, sink: &mut InstalledFonts) -> bool;

    /// Finds the face that best fits the request.
    fn map_font(
        &mut self,
        weight: i32,
        italic: bool,
        charset: Charset,
        pitch_family: PitchFamily,
        face: &str,
    ) -> Option<FontHandle>;

    /// Looks up a face by exact name.
    fn get_font(&mut self, face: &str) -> Option<FontHandle>;

    /// Copies font data for `handle` into `buf`.
    ///
    /// `table` is an sfnt tag, 0 for the whole file, or
    /// [`TABLE_TTCF`](crate::tag::TABLE_TTCF) for the whole collection.
    /// Returns the size of the data. When `buf` is too small nothing is
    /// written, so an empty buffer probes the size. Returns 0 when the data
    /// is missing or could not be read.
    fn get_font_data(&self, handle: FontHandle, table: u32, buf: &mut [u8]) -> usize;

    /// Copies the start of the font data for `handle` into `buf`.
    ///
    /// Unlike [`get_font_data`](Self::get_font_data) a short buffer is
    /// filled as far as it goes. Returns the number of bytes written.
    fn get_font_data_prefix(&self, handle: FontHandle, table: u32, buf: &mut [u8]) -> usize {
        let size = self.get_font_data(handle, table, &mut []);
        if size == 0 {
            return 0;
        }
        let mut data = alloc::vec![0_u8; size];
        if self.get_font_data(handle, table, &mut data) != size {
            return 0;
        }
        let len = data.len().min(buf.len());
        buf[..len].copy_from_slice(&data[..len]);
        len
    }

    /// Returns the face name of `handle`.
    fn get_face_name(&self, handle: FontHandle) -> Option<String>;

    /// Returns the charset of `handle`, when the platform knows it.
    fn get_font_charset(&self, handle: FontHandle) -> Option<Charset>;

    /// Releases a handle.
    fn delete_font(&mut self, handle: FontHandle);
}

/// Reads a whole table or file for `handle`.
///
/// Returns `None` if the data is empty or the read came back short.
pub fn read_font_data(
    info: &dyn SystemFontInfo,
    handle: FontHandle,
    table: u32,
) -> Option<Vec<u8>> {
    let size = info.get_font_data(handle, table, &mut []);
    if size == 0 {
        return None;
    }
    let mut buf = alloc::vec![0_u8; size];
    (info.get_font_data(handle, table, &mut buf) == size).then_some(buf)
}

#[cfg(test)]
pub(crate) mod mock {
    //! In-memory [`SystemFontInfo`] for tests.

    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::cell::Cell;

    use super::{FontHandle, InstalledFonts, SystemFontInfo};
    use crate::attributes::{FontStyleFlags, PitchFamily};
    use crate::catalog::{FontFaceCatalog, FontFaceInfo};
    use crate::charset::{Charset, CharsetFlags};
    use crate::sfnt::{self, TableDirectory};
    use crate::tag::TABLE_TTCF;

    const CHARSETS: [(CharsetFlags, Charset); 6] = [
        (CharsetFlags::SHIFT_JIS, Charset::ShiftJis),
        (CharsetFlags::GB, Charset::ChineseSimplified),
        (CharsetFlags::BIG5, Charset::ChineseTraditional),
        (CharsetFlags::KOREAN, Charset::Hangul),
        (CharsetFlags::SYMBOL, Charset::Symbol),
        (CharsetFlags::ANSI, Charset::Ansi),
    ];

    /// Serves fonts from memory. Faces inside a collection report the size
    /// from their offset to the end of the data for tag 0, as desktop
    /// platforms do.
    #[derive(Default)]
    pub(crate) struct MemoryFontInfo {
        catalog: FontFaceCatalog,
        data: Vec<Vec<u8>>,
        collection_reads: Rc<Cell<usize>>,
    }

    impl MemoryFontInfo {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn add_face(
            &mut self,
            name: &str,
            data: Vec<u8>,
            offset: u32,
            styles: FontStyleFlags,
            charsets: CharsetFlags,
        ) {
            let tables = sfnt::read_table_directory(&data, offset)
                .map(<[u8]>::to_vec)
                .unwrap_or_default();
            let info = FontFaceInfo::new(
                "",
                name,
                tables,
                offset,
                data.len() as u32,
                styles,
                charsets,
            );
            let position = self.catalog.insert(info);
            if position == self.data.len() {
                self.data.push(data);
            } else {
                self.data[position] = data;
            }
        }

        /// Counts reads that copied out a whole collection.
        pub(crate) fn collection_reads(&self) -> Rc<Cell<usize>> {
            self.collection_reads.clone()
        }

        fn bytes(&self, handle: FontHandle, table: u32) -> &[u8] {
            let position = handle.value() as usize;
            let (Some(face), Some(data)) =
                (self.catalog.get_index(position), self.data.get(position))
            else {
                return &[];
            };
            let offset = face.font_offset() as usize;
            let range = match table {
                0 => offset..data.len(),
                TABLE_TTCF if offset != 0 => 0..data.len(),
                TABLE_TTCF => 0..0,
                tag => match TableDirectory::new(face.tables()).find(tag) {
                    Some((start, len)) => start as usize..(start + len) as usize,
                    None => 0..0,
                },
            };
            data.get(range).unwrap_or_default()
        }
    }

    impl SystemFontInfo for MemoryFontInfo {
        fn enum_font_list(&mut self, sink: &mut InstalledFonts) -> bool {
            for face in self.catalog.iter() {
                for (flag, charset) in CHARSETS {
                    if face.charsets().contains(flag) {
                        sink.add(face.face_name(), charset);
                    }
                }
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
            self.catalog
                .find_font(weight, italic, charset, pitch_family, face, true)
                .ok()
                .map(|position| FontHandle::new(position as u64))
        }

        fn get_font(&mut self, face: &str) -> Option<FontHandle> {
            self.catalog
                .position(face)
                .map(|position| FontHandle::new(position as u64))
        }

        fn get_font_data(&self, handle: FontHandle, table: u32, buf: &mut [u8]) -> usize {
            let bytes = self.bytes(handle, table);
            let size = bytes.len();
            if size == 0 || buf.len() < size {
                return size;
            }
            buf[..size].copy_from_slice(bytes);
            if table == TABLE_TTCF {
                self.collection_reads.set(self.collection_reads.get() + 1);
            }
            size
        }

        fn get_font_data_prefix(&self, handle: FontHandle, table: u32, buf: &mut [u8]) -> usize {
            let bytes = self.bytes(handle, table);
            let len = bytes.len().min(buf.len());
            buf[..len].copy_from_slice(&bytes[..len]);
            len
        }

        fn get_face_name(&self, handle: FontHandle) -> Option<String> {
            self.catalog
                .get_index(handle.value() as usize)
                .map(|face| face.face_name().into())
        }

        fn get_font_charset(&self, _handle: FontHandle) -> Option<Charset> {
            None
        }

        fn delete_font(&mut self, _handle: FontHandle) {}
    }
}
