// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;

use crate::charset::Charset;

/// Family reported for the built-in serif fallback.
pub const GENERIC_SERIF_FAMILY: &str = "Chrome Serif";
/// Family reported for the built-in sans serif fallback.
pub const GENERIC_SANS_FAMILY: &str = "Chrome Sans";
/// Family reported for the built-in Symbol face.
pub const SYMBOL_FAMILY: &str = "Chrome Symbol";
/// Family reported for the built-in ZapfDingbats face.
pub const DINGBATS_FAMILY: &str = "Chrome Dingbats";

/// Describes how a requested font was substituted.
///
/// The glyph renderer reads the weight and italic angle to synthesize bold
/// and oblique styles the substitute face lacks.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct SubstFont {
    /// Family of the face that was chosen.
    pub family: String,
    /// Charset the face was chosen for.
    pub charset: Charset,
    /// Requested weight, or 0 when the face already has the right weight.
    pub weight: i32,
    /// Synthetic italic angle in degrees, 0 for upright.
    pub italic_angle: i32,
    /// A CJK request fell back to a non-matching face.
    pub subst_cjk: bool,
    /// Weight to synthesize for CJK substitutes.
    pub weight_cjk: i32,
    /// Italic should be synthesized for CJK substitutes.
    pub italic_cjk: bool,
    /// The substitute is a multiple master instance.
    pub flag_mm: bool,
    /// The substitute is one of the built-in generic faces.
    pub is_built_in_generic_font: bool,
}

impl SubstFont {
    /// Creates an empty substitution record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the record as using a built-in generic face.
    pub fn set_is_built_in_generic_font(&mut self) {
        self.is_built_in_generic_font = true;
    }

    /// Switches to the built-in serif family.
    pub fn use_generic_serif(&mut self) {
        self.family = GENERIC_SERIF_FAMILY.into();
    }
}
