// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style flags, pitch families and weights used for font matching.

use core::fmt;
use core::ops::{BitAnd, BitOr, BitOrAssign, Not};

/// Normal font weight.
pub const FW_NORMAL: i32 = 400;
/// Bold font weight.
pub const FW_BOLD: i32 = 700;
/// Weight used when a name carries two bold markers.
pub const FW_BOLD_BOLD: i32 = 900;

/// Font descriptor style flags.
///
/// The low bits follow the PDF font descriptor layout. [`FORCE_BOLD`] and
/// [`USE_EXTERNAL_ATTR`] are matching hints layered on top.
///
/// [`FORCE_BOLD`]: Self::FORCE_BOLD
/// [`USE_EXTERNAL_ATTR`]: Self::USE_EXTERNAL_ATTR
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct FontStyleFlags(u32);

impl FontStyleFlags {
    /// No flags.
    pub const NORMAL: Self = Self(0);
    /// All glyphs have the same width.
    pub const FIXED_PITCH: Self = Self(1);
    /// Glyphs have serifs.
    pub const SERIF: Self = Self(1 << 1);
    /// Font uses a symbol encoding.
    pub const SYMBOLIC: Self = Self(1 << 2);
    /// Glyphs resemble cursive handwriting.
    pub const SCRIPT: Self = Self(1 << 3);
    /// Font uses the standard Latin character set.
    pub const NON_SYMBOLIC: Self = Self(1 << 5);
    /// Glyphs are slanted.
    pub const ITALIC: Self = Self(1 << 6);
    /// No lowercase letters.
    pub const ALL_CAP: Self = Self(1 << 16);
    /// Lowercase letters are small capitals.
    pub const SMALL_CAP: Self = Self(1 << 17);
    /// Glyphs should be drawn bold.
    pub const FORCE_BOLD: Self = Self(1 << 18);
    /// Caller supplied weight and italic angle should be honored.
    pub const USE_EXTERNAL_ATTR: Self = Self(1 << 19);

    /// Creates flags from raw bits.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns true if no flag is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if every flag in `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if any flag in `other` is set.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns a copy with the flags in `other` cleared.
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl BitOr for FontStyleFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for FontStyleFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for FontStyleFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for FontStyleFlags {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl fmt::Debug for FontStyleFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(FontStyleFlags, &str); 10] = [
            (FontStyleFlags::FIXED_PITCH, "FIXED_PITCH"),
            (FontStyleFlags::SERIF, "SERIF"),
            (FontStyleFlags::SYMBOLIC, "SYMBOLIC"),
            (FontStyleFlags::SCRIPT, "SCRIPT"),
            (FontStyleFlags::NON_SYMBOLIC, "NON_SYMBOLIC"),
            (FontStyleFlags::ITALIC, "ITALIC"),
            (FontStyleFlags::ALL_CAP, "ALL_CAP"),
            (FontStyleFlags::SMALL_CAP, "SMALL_CAP"),
            (FontStyleFlags::FORCE_BOLD, "FORCE_BOLD"),
            (FontStyleFlags::USE_EXTERNAL_ATTR, "USE_EXTERNAL_ATTR"),
        ];
        let mut set = f.debug_set();
        for (flag, name) in NAMES {
            if self.contains(flag) {
                set.entry(&format_args!("{name}"));
            }
        }
        set.finish()
    }
}

/// Pitch and family hints passed to the platform font lookup.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Debug)]
pub struct PitchFamily(u8);

impl PitchFamily {
    /// No preference.
    pub const NONE: Self = Self(0);
    /// Monospaced.
    pub const FIXED_PITCH: Self = Self(1);
    /// Serif (roman) family.
    pub const ROMAN: Self = Self(1 << 4);
    /// Script family.
    pub const SCRIPT: Self = Self(4 << 4);

    /// Creates a pitch family from raw bits.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns true if every bit in `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns a copy with the bits in `other` cleared.
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Derives the pitch family from descriptor style flags.
    pub fn from_style_flags(flags: FontStyleFlags) -> Self {
        let mut pitch = Self::NONE;
        if flags.contains(FontStyleFlags::SERIF) {
            pitch |= Self::ROMAN;
        }
        if flags.contains(FontStyleFlags::SCRIPT) {
            pitch |= Self::SCRIPT;
        }
        if flags.contains(FontStyleFlags::FIXED_PITCH) {
            pitch |= Self::FIXED_PITCH;
        }
        pitch
    }
}

impl BitOr for PitchFamily {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for PitchFamily {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_from_flags() {
        let flags = FontStyleFlags::SERIF | FontStyleFlags::FIXED_PITCH;
        let pitch = PitchFamily::from_style_flags(flags);
        assert!(pitch.contains(PitchFamily::ROMAN));
        assert!(pitch.contains(PitchFamily::FIXED_PITCH));
        assert!(!pitch.contains(PitchFamily::SCRIPT));
    }

    #[test]
    fn flag_debug_lists_names() {
        let flags = FontStyleFlags::ITALIC | FontStyleFlags::FORCE_BOLD;
        assert_eq!(format!("{flags:?}"), "{ITALIC, FORCE_BOLD}");
        assert!(flags.without(FontStyleFlags::ITALIC) == FontStyleFlags::FORCE_BOLD);
    }
}
