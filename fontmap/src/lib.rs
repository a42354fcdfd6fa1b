// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font discovery, matching and substitution for document renderers.
//!
//! Documents name fonts that may not be installed. A [`FontManager`] takes
//! such a request (a name, descriptor flags, a weight and a code page) and
//! picks the best face it can find:
//!
//! - one of the fourteen standard fonts from a [`BuiltinFonts`] provider,
//! - an installed face reported by a [`SystemFontInfo`] implementation,
//! - or a generic serif or sans serif fallback.
//!
//! The [`SubstFont`] filled in by the lookup records the weight and italic
//! angle the renderer should synthesize when the chosen face lacks them.
//!
//! [`FolderFontInfo`] is the portable [`SystemFontInfo`]; it scans
//! directories for TrueType, OpenType and collection files.
//!
//! ```no_run
//! use fontmap::{FontManager, FontManagerOptions, FontStyleFlags, SubstFont};
//!
//! let mut manager = FontManager::new(FontManagerOptions::default().with_system_paths());
//! let mut subst = SubstFont::new();
//! let face = manager.find_subst_font("Arial,Bold", false, FontStyleFlags::NORMAL, 0, 0, 0, &mut subst);
//! println!("{:?} as {}", face, subst.family);
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

#[cfg(not(feature = "std"))]
compile_error!("fontmap requires the `std` feature to be enabled");

extern crate alloc;

mod attributes;
mod catalog;
mod charset;
mod error;
mod face;
mod folder;
mod manager;
mod mapper;
pub mod names;
pub mod sfnt;
mod standard;
mod subst;
mod system;
pub mod tag;

pub use linebender_resource_handle::Blob;

pub use attributes::{FontStyleFlags, PitchFamily, FW_BOLD, FW_BOLD_BOLD, FW_NORMAL};
pub use catalog::{FontFaceCatalog, FontFaceInfo, SIMILARITY_SCORE_MAX};
pub use charset::{Charset, CharsetFlags, CODE_PAGE_DEFAULT_ANSI};
pub use error::{Error, Result};
pub use face::Face;
pub use folder::FolderFontInfo;
pub use manager::{
    BuiltinFonts, FontDescCache, FontManager, FontManagerOptions, NoBuiltinFonts,
    SYSTEM_FONT_DIRS,
};
pub use mapper::{collection_checksum, FontMapper};
pub use standard::{
    alternate_family, base14_substitute, is_standard_font_name, standard_font,
    standard_font_name, StandardFont, BASE14_FONT_NAMES, NARROW_FAMILY, NUM_STANDARD_FONTS,
};
pub use subst::{
    SubstFont, DINGBATS_FAMILY, GENERIC_SANS_FAMILY, GENERIC_SERIF_FAMILY, SYMBOL_FAMILY,
};
pub use system::{read_font_data, FontHandle, InstalledFonts, SystemFontInfo};
