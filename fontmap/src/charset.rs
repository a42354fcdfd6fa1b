// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Character sets and the coarse charset flags used as a matching filter.

use core::fmt;
use core::ops::{BitAnd, BitOr, BitOrAssign};

/// Windows character set identifiers.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[repr(u8)]
pub enum Charset {
    /// Western (code page 1252).
    #[default]
    Ansi = 0,
    /// Charset-agnostic request.
    Default = 1,
    /// Symbol encoding.
    Symbol = 2,
    /// Japanese.
    ShiftJis = 128,
    /// Korean.
    Hangul = 129,
    /// Simplified Chinese.
    ChineseSimplified = 134,
    /// Traditional Chinese.
    ChineseTraditional = 136,
    /// Greek.
    Greek = 161,
    /// Turkish.
    Turkish = 162,
    /// Vietnamese.
    Vietnamese = 163,
    /// Hebrew.
    Hebrew = 177,
    /// Arabic.
    Arabic = 178,
    /// Baltic.
    Baltic = 186,
    /// Cyrillic.
    Russian = 204,
    /// Thai.
    Thai = 222,
    /// Central European.
    EasternEuropean = 238,
}

impl Charset {
    /// Returns true for the Chinese, Japanese and Korean charsets.
    pub fn is_cjk(self) -> bool {
        matches!(
            self,
            Self::ShiftJis | Self::Hangul | Self::ChineseSimplified | Self::ChineseTraditional
        )
    }

    /// Maps a Windows code page to its charset.
    ///
    /// Unknown code pages map to [`Charset::Default`].
    pub fn from_code_page(code_page: u16) -> Self {
        match code_page {
            0 | 1252 => Self::Ansi,
            42 => Self::Symbol,
            874 => Self::Thai,
            932 => Self::ShiftJis,
            936 => Self::ChineseSimplified,
            949 | 1361 => Self::Hangul,
            950 => Self::ChineseTraditional,
            1250 => Self::EasternEuropean,
            1251 => Self::Russian,
            1253 => Self::Greek,
            1254 => Self::Turkish,
            1255 => Self::Hebrew,
            1256 => Self::Arabic,
            1257 => Self::Baltic,
            1258 => Self::Vietnamese,
            _ => Self::Default,
        }
    }

    /// Returns the coarse flag used when filtering catalog faces.
    ///
    /// Charsets without a flag map to [`CharsetFlags::EMPTY`], so only
    /// [`Charset::Default`] bypasses the filter.
    pub fn flag(self) -> CharsetFlags {
        match self {
            Self::ShiftJis => CharsetFlags::SHIFT_JIS,
            Self::ChineseSimplified => CharsetFlags::GB,
            Self::ChineseTraditional => CharsetFlags::BIG5,
            Self::Hangul => CharsetFlags::KOREAN,
            Self::Symbol => CharsetFlags::SYMBOL,
            Self::Ansi => CharsetFlags::ANSI,
            _ => CharsetFlags::EMPTY,
        }
    }
}

/// Code page passed by callers that have no encoding information.
pub const CODE_PAGE_DEFAULT_ANSI: u16 = 0;

/// Bitset over the charsets a face supports.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct CharsetFlags(u32);

impl CharsetFlags {
    /// No charset.
    pub const EMPTY: Self = Self(0);
    /// Western.
    pub const ANSI: Self = Self(1);
    /// Symbol encoding.
    pub const SYMBOL: Self = Self(2);
    /// Japanese.
    pub const SHIFT_JIS: Self = Self(4);
    /// Traditional Chinese.
    pub const BIG5: Self = Self(8);
    /// Simplified Chinese.
    pub const GB: Self = Self(16);
    /// Korean.
    pub const KOREAN: Self = Self(32);

    /// Returns the raw bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns true if no flag is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if any flag in `other` is also set in `self`.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns true if every flag in `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for CharsetFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for CharsetFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for CharsetFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for CharsetFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(CharsetFlags, &str); 6] = [
            (CharsetFlags::ANSI, "ANSI"),
            (CharsetFlags::SYMBOL, "SYMBOL"),
            (CharsetFlags::SHIFT_JIS, "SHIFT_JIS"),
            (CharsetFlags::BIG5, "BIG5"),
            (CharsetFlags::GB, "GB"),
            (CharsetFlags::KOREAN, "KOREAN"),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_default_has_no_filter() {
        assert!(Charset::Default.flag().is_empty());
        assert!(Charset::Greek.flag().is_empty(), "unflagged charsets filter everything");
        assert_eq!(Charset::ChineseSimplified.flag(), CharsetFlags::GB);
    }

    #[test]
    fn code_pages() {
        assert_eq!(Charset::from_code_page(932), Charset::ShiftJis);
        assert_eq!(Charset::from_code_page(CODE_PAGE_DEFAULT_ANSI), Charset::Ansi);
        assert_eq!(Charset::from_code_page(65001), Charset::Default);
        assert!(Charset::from_code_page(949).is_cjk());
    }
}
