// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rasterization and compositing for documents whose fonts come from
//! [`fontmap`].
//!
//! - [`Path`] holds the point-and-flag paths that document content and glyph
//!   outlines are described with, along with bounds and rectangle tests.
//! - [`FontCache`] and [`GlyphCache`] turn glyphs of a [`Font`] into outlines
//!   and coverage bitmaps, adding synthetic bold and italic for substituted
//!   faces.
//! - [`DibBitmap`] is a device-independent pixel buffer. Rectangles, other
//!   bitmaps and coverage masks are blended into it one scanline at a time
//!   by the [`ScanlineCompositor`], restricted by a [`ClipRegion`].
//!
//! ## Features
//!
//! - `std` (enabled by default): required by `fontmap`.

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

pub use kurbo;

mod bitmap;
mod blend;
mod clip;
mod color;
mod compositor;
mod glyph;
mod math;
mod path;

pub use bitmap::{DibBitmap, PixelFormat};
pub use blend::{alpha_merge, alpha_union, blend, blend_rgb, gray, BlendMode, Rgb};
pub use clip::{ClipRegion, IntRect};
pub use color::{argb, argb_components, cmyk_to_rgb, Bgra, ColorTransform};
pub use compositor::ScanlineCompositor;
pub use fontmap::{Error, Result};
pub use glyph::{
    embolden_path, rasterize_path, skew_from_angle, weight_level, AntiAlias, Font, FontCache,
    GlyphBitmap, GlyphCache, SizeKey, MAX_GLYPH_DIMENSION, SKEW_TABLE,
};
pub use path::{Path, PathPoint, PointKind, ZeroAreaPath};
