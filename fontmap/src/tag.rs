// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Table tag packing.

/// Packs four bytes into a big-endian table tag.
///
/// Bytes are promoted without sign extension, so `make_tag(0xFF, 0xFF, 0xFF, 0xFF)`
/// is `0xFFFF_FFFF`.
pub const fn make_tag(c1: u8, c2: u8, c3: u8, c4: u8) -> u32 {
    (c1 as u32) << 24 | (c2 as u32) << 16 | (c3 as u32) << 8 | c4 as u32
}

/// The `name` table.
pub const TABLE_NAME: u32 = make_tag(b'n', b'a', b'm', b'e');
/// The `OS/2` table.
pub const TABLE_OS2: u32 = make_tag(b'O', b'S', b'/', b'2');
/// The `post` table.
pub const TABLE_POST: u32 = make_tag(b'p', b'o', b's', b't');
/// Pseudo tag used to request a whole TrueType collection.
pub const TABLE_TTCF: u32 = make_tag(b't', b't', b'c', b'f');
