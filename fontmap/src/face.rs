// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loaded font faces.

use core::fmt;

use linebender_resource_handle::Blob;
use read_fonts::{FontRef, TableProvider};

use crate::{Error, Result};

const MAC_STYLE_BOLD: u16 = 1;
const MAC_STYLE_ITALIC: u16 = 1 << 1;

/// A face within shared font data.
///
/// Cloning is cheap: the data is reference counted.
#[derive(Clone)]
pub struct Face {
    data: Blob<u8>,
    index: u32,
    mac_style: u16,
}

impl Face {
    /// Creates a face for the `index`th font in `data`.
    ///
    /// Fails with [`Error::MalformedFontData`] if the data does not parse as
    /// an sfnt font or collection.
    pub fn new(data: Blob<u8>, index: u32) -> Result<Self> {
        let font = FontRef::from_index(data.data(), index)
            .map_err(|_| Error::MalformedFontData("not an sfnt font"))?;
        let mac_style = font.head().map(|head| head.mac_style().bits()).unwrap_or(0);
        Ok(Self {
            data,
            index,
            mac_style,
        })
    }

    /// Returns the shared font data.
    pub fn data(&self) -> &Blob<u8> {
        &self.data
    }

    /// Returns the index of the face within a collection.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Returns a parsed view of the face.
    pub fn font_ref(&self) -> Option<FontRef<'_>> {
        FontRef::from_index(self.data.data(), self.index).ok()
    }

    /// Returns true if the face is designed bold.
    pub fn is_bold(&self) -> bool {
        self.mac_style & MAC_STYLE_BOLD != 0
    }

    /// Returns true if the face is designed italic.
    pub fn is_italic(&self) -> bool {
        self.mac_style & MAC_STYLE_ITALIC != 0
    }

    /// Returns an identifier for the face, unique within the process for
    /// the lifetime of its data.
    pub fn id(&self) -> (u64, u32) {
        (self.data.id(), self.index)
    }
}

impl fmt::Debug for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Face")
            .field("data_id", &self.data.id())
            .field("len", &self.data.len())
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}
