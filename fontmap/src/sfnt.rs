// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal sfnt and TrueType collection parsing for the folder scanner.
//!
//! Only the pieces needed to catalog a face are read here: the table
//! directory, the `name` strings, the `OS/2` code page ranges and the
//! fixed pitch markers. Everything is big-endian and bounds checked.

use alloc::string::String;
use alloc::vec::Vec;
use read_fonts::tables::name::{Name, NameId};
use read_fonts::{FontData, FontRead};

use crate::charset::CharsetFlags;
use crate::tag::{TABLE_OS2, TABLE_POST, TABLE_TTCF};

/// Size of the sfnt offset table (and of the TTC header prefix).
pub const SFNT_HEADER_LEN: usize = 12;
/// Size of one table directory record.
pub const TABLE_RECORD_LEN: usize = 16;

pub(crate) fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

pub(crate) fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Returns true if the data starts with a TrueType collection header.
pub fn is_collection(data: &[u8]) -> bool {
    read_u32(data, 0) == Some(TABLE_TTCF)
}

/// Returns the face offsets of a TrueType collection.
///
/// Returns `None` when the header or the offset array is truncated.
pub fn collection_offsets(data: &[u8]) -> Option<Vec<u32>> {
    if !is_collection(data) {
        return None;
    }
    let count = read_u32(data, 8)? as usize;
    let len = count.checked_mul(4)?;
    let end = SFNT_HEADER_LEN.checked_add(len)?;
    let bytes = data.get(SFNT_HEADER_LEN..end)?;
    Some(
        bytes
            .chunks_exact(4)
            .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    )
}

/// Returns the index of the face whose offset in the collection equals
/// `offset`, or 0 when there is no such face.
pub fn collection_face_index(data: &[u8], offset: u32) -> u32 {
    collection_offsets(data)
        .and_then(|offsets| offsets.iter().position(|&o| o == offset))
        .map_or(0, |index| index as u32)
}

/// Reads the raw table directory of the face at `offset`.
pub fn read_table_directory(data: &[u8], offset: u32) -> Option<&[u8]> {
    let offset = offset as usize;
    let num_tables = read_u16(data, offset.checked_add(4)?)? as usize;
    let start = offset.checked_add(SFNT_HEADER_LEN)?;
    let end = start.checked_add(num_tables * TABLE_RECORD_LEN)?;
    data.get(start..end)
}

/// Raw sfnt table directory: 16 bytes per record of tag, checksum, offset
/// and length.
#[derive(Copy, Clone, Debug)]
pub struct TableDirectory<'a> {
    records: &'a [u8],
}

impl<'a> TableDirectory<'a> {
    /// Wraps raw directory records.
    pub fn new(records: &'a [u8]) -> Self {
        Self { records }
    }

    /// Returns the number of complete records.
    pub fn len(&self) -> usize {
        self.records.len() / TABLE_RECORD_LEN
    }

    /// Returns true if there are no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `(offset, length)` for the table with the given tag.
    ///
    /// When a tag occurs more than once, the last record wins.
    pub fn find(&self, tag: u32) -> Option<(u32, u32)> {
        self.records
            .chunks_exact(TABLE_RECORD_LEN)
            .filter(|record| read_u32(record, 0) == Some(tag))
            .filter_map(|record| Some((read_u32(record, 8)?, read_u32(record, 12)?)))
            .last()
    }

    /// Returns the bytes of a table, or `None` when it is missing or does
    /// not fit in `data`.
    pub fn table(&self, data: &'a [u8], tag: u32) -> Option<&'a [u8]> {
        let (offset, len) = self.find(tag)?;
        if offset > u32::MAX - len {
            return None;
        }
        let end = offset as usize + len as usize;
        data.get(offset as usize..end)
    }
}

/// Decodes a string from a `name` table.
///
/// Windows Unicode records are preferred, followed by Unicode and then
/// Macintosh Roman.
pub fn name_string(name_table: &[u8], name_id: u16) -> Option<String> {
    let name = Name::read(FontData::new(name_table)).ok()?;
    let id = NameId::new(name_id);
    let string_data = name.string_data();
    for platform in [3_u16, 0, 1] {
        for record in name.name_record() {
            if record.name_id() != id || record.platform_id() != platform {
                continue;
            }
            if platform == 1 && record.encoding_id() != 0 {
                continue;
            }
            if let Ok(string) = record.string(string_data) {
                let decoded: String = string.chars().collect();
                if !decoded.is_empty() {
                    return Some(decoded);
                }
            }
        }
    }
    None
}

/// Minimum `OS/2` length that contains `ulCodePageRange1`.
const OS2_CODE_PAGE_END: usize = 86;
const OS2_CODE_PAGE_OFFSET: usize = 78;
const OS2_PANOSE_PROPORTION_OFFSET: usize = 35;
const PANOSE_MONOSPACED: u8 = 9;
const POST_IS_FIXED_PITCH_OFFSET: usize = 12;

/// Maps the `OS/2` code page range to charset flags.
///
/// Returns an empty set when the table is too short to carry code pages.
pub fn os2_charsets(os2: &[u8]) -> CharsetFlags {
    const BITS: [(u32, CharsetFlags); 6] = [
        (17, CharsetFlags::SHIFT_JIS),
        (18, CharsetFlags::GB),
        (20, CharsetFlags::BIG5),
        (19, CharsetFlags::KOREAN),
        (21, CharsetFlags::KOREAN),
        (31, CharsetFlags::SYMBOL),
    ];
    if os2.len() < OS2_CODE_PAGE_END {
        return CharsetFlags::EMPTY;
    }
    let Some(code_pages) = read_u32(os2, OS2_CODE_PAGE_OFFSET) else {
        return CharsetFlags::EMPTY;
    };
    let mut flags = CharsetFlags::EMPTY;
    for (bit, flag) in BITS {
        if code_pages & (1 << bit) != 0 {
            flags |= flag;
        }
    }
    flags
}

/// Returns true if the face declares itself monospaced through the `OS/2`
/// PANOSE proportion or the `post` fixed pitch field.
pub fn is_fixed_pitch(directory: &TableDirectory<'_>, data: &[u8]) -> bool {
    let panose = directory
        .table(data, TABLE_OS2)
        .and_then(|os2| os2.get(OS2_PANOSE_PROPORTION_OFFSET).copied());
    if panose == Some(PANOSE_MONOSPACED) {
        return true;
    }
    directory
        .table(data, TABLE_POST)
        .and_then(|post| read_u32(post, POST_IS_FIXED_PITCH_OFFSET))
        .is_some_and(|fixed| fixed != 0)
}
