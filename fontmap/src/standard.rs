// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The fourteen standard PDF fonts and their common aliases.

use core::cmp::Ordering;

/// One of the fourteen standard fonts every PDF consumer must provide.
///
/// The discriminants index [`BASE14_FONT_NAMES`]. Within each Latin family
/// the order is regular, bold, bold italic, italic.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum StandardFont {
    /// `Courier`.
    Courier = 0,
    /// `Courier-Bold`.
    CourierBold,
    /// `Courier-BoldOblique`.
    CourierBoldOblique,
    /// `Courier-Oblique`.
    CourierOblique,
    /// `Helvetica`.
    Helvetica,
    /// `Helvetica-Bold`.
    HelveticaBold,
    /// `Helvetica-BoldOblique`.
    HelveticaBoldOblique,
    /// `Helvetica-Oblique`.
    HelveticaOblique,
    /// `Times-Roman`.
    Times,
    /// `Times-Bold`.
    TimesBold,
    /// `Times-BoldItalic`.
    TimesBoldOblique,
    /// `Times-Italic`.
    TimesOblique,
    /// `Symbol`.
    Symbol,
    /// `ZapfDingbats`.
    Dingbats,
}

/// Number of standard fonts.
pub const NUM_STANDARD_FONTS: usize = 14;

/// PostScript names of the standard fonts, indexed by [`StandardFont`].
pub const BASE14_FONT_NAMES: [&str; NUM_STANDARD_FONTS] = [
    "Courier",
    "Courier-Bold",
    "Courier-BoldOblique",
    "Courier-Oblique",
    "Helvetica",
    "Helvetica-Bold",
    "Helvetica-BoldOblique",
    "Helvetica-Oblique",
    "Times-Roman",
    "Times-Bold",
    "Times-BoldItalic",
    "Times-Italic",
    "Symbol",
    "ZapfDingbats",
];

impl StandardFont {
    const ALL: [Self; NUM_STANDARD_FONTS] = [
        Self::Courier,
        Self::CourierBold,
        Self::CourierBoldOblique,
        Self::CourierOblique,
        Self::Helvetica,
        Self::HelveticaBold,
        Self::HelveticaBoldOblique,
        Self::HelveticaOblique,
        Self::Times,
        Self::TimesBold,
        Self::TimesBoldOblique,
        Self::TimesOblique,
        Self::Symbol,
        Self::Dingbats,
    ];

    /// Returns the font at `index`, if it is in range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Returns the position of the font in [`BASE14_FONT_NAMES`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the PostScript name.
    pub fn name(self) -> &'static str {
        BASE14_FONT_NAMES[self.index()]
    }

    /// Returns true for Symbol and ZapfDingbats.
    pub fn is_symbolic(self) -> bool {
        matches!(self, Self::Symbol | Self::Dingbats)
    }

    /// Returns true for the Courier family.
    pub fn is_fixed(self) -> bool {
        matches!(
            self,
            Self::Courier | Self::CourierBold | Self::CourierBoldOblique | Self::CourierOblique
        )
    }
}

/// Returns true if `name` is exactly one of the fourteen standard names.
///
/// The comparison is case-sensitive.
pub fn is_standard_font_name(name: &str) -> bool {
    BASE14_FONT_NAMES.contains(&name)
}

use StandardFont as S;

/// Aliases that resolve to a standard font, sorted case-insensitively.
const ALT_FONT_NAMES: &[(&str, StandardFont)] = &[
    ("Arial", S::Helvetica),
    ("Arial,Bold", S::HelveticaBold),
    ("Arial,BoldItalic", S::HelveticaBoldOblique),
    ("Arial,Italic", S::HelveticaOblique),
    ("Arial-Bold", S::HelveticaBold),
    ("Arial-BoldItalic", S::HelveticaBoldOblique),
    ("Arial-BoldItalicMT", S::HelveticaBoldOblique),
    ("Arial-BoldMT", S::HelveticaBold),
    ("Arial-Italic", S::HelveticaOblique),
    ("Arial-ItalicMT", S::HelveticaOblique),
    ("ArialBold", S::HelveticaBold),
    ("ArialBoldItalic", S::HelveticaBoldOblique),
    ("ArialItalic", S::HelveticaOblique),
    ("ArialMT", S::Helvetica),
    ("ArialMT,Bold", S::HelveticaBold),
    ("ArialMT,BoldItalic", S::HelveticaBoldOblique),
    ("ArialMT,Italic", S::HelveticaOblique),
    ("ArialRoundedMTBold", S::HelveticaBold),
    ("Courier", S::Courier),
    ("Courier,Bold", S::CourierBold),
    ("Courier,BoldItalic", S::CourierBoldOblique),
    ("Courier,Italic", S::CourierOblique),
    ("Courier-Bold", S::CourierBold),
    ("Courier-BoldOblique", S::CourierBoldOblique),
    ("Courier-Oblique", S::CourierOblique),
    ("CourierBold", S::CourierBold),
    ("CourierBoldItalic", S::CourierBoldOblique),
    ("CourierItalic", S::CourierOblique),
    ("CourierNew", S::Courier),
    ("CourierNew,Bold", S::CourierBold),
    ("CourierNew,BoldItalic", S::CourierBoldOblique),
    ("CourierNew,Italic", S::CourierOblique),
    ("CourierNew-Bold", S::CourierBold),
    ("CourierNew-BoldItalic", S::CourierBoldOblique),
    ("CourierNew-Italic", S::CourierOblique),
    ("CourierNewBold", S::CourierBold),
    ("CourierNewBoldItalic", S::CourierBoldOblique),
    ("CourierNewItalic", S::CourierOblique),
    ("CourierNewPS-BoldItalicMT", S::CourierBoldOblique),
    ("CourierNewPS-BoldMT", S::CourierBold),
    ("CourierNewPS-ItalicMT", S::CourierOblique),
    ("CourierNewPSMT", S::Courier),
    ("CourierStd", S::Courier),
    ("CourierStd-Bold", S::CourierBold),
    ("CourierStd-BoldOblique", S::CourierBoldOblique),
    ("CourierStd-Oblique", S::CourierOblique),
    ("Helvetica", S::Helvetica),
    ("Helvetica,Bold", S::HelveticaBold),
    ("Helvetica,BoldItalic", S::HelveticaBoldOblique),
    ("Helvetica,Italic", S::HelveticaOblique),
    ("Helvetica-Bold", S::HelveticaBold),
    ("Helvetica-BoldItalic", S::HelveticaBoldOblique),
    ("Helvetica-BoldOblique", S::HelveticaBoldOblique),
    ("Helvetica-Italic", S::HelveticaOblique),
    ("Helvetica-Oblique", S::HelveticaOblique),
    ("HelveticaBold", S::HelveticaBold),
    ("HelveticaBoldItalic", S::HelveticaBoldOblique),
    ("HelveticaItalic", S::HelveticaOblique),
    ("Symbol", S::Symbol),
    ("SymbolMT", S::Symbol),
    ("Times-Bold", S::TimesBold),
    ("Times-BoldItalic", S::TimesBoldOblique),
    ("Times-Italic", S::TimesOblique),
    ("Times-Roman", S::Times),
    ("TimesBold", S::TimesBold),
    ("TimesBoldItalic", S::TimesBoldOblique),
    ("TimesItalic", S::TimesOblique),
    ("TimesNewRoman", S::Times),
    ("TimesNewRoman,Bold", S::TimesBold),
    ("TimesNewRoman,BoldItalic", S::TimesBoldOblique),
    ("TimesNewRoman,Italic", S::TimesOblique),
    ("TimesNewRoman-Bold", S::TimesBold),
    ("TimesNewRoman-BoldItalic", S::TimesBoldOblique),
    ("TimesNewRoman-Italic", S::TimesOblique),
    ("TimesNewRomanBold", S::TimesBold),
    ("TimesNewRomanBoldItalic", S::TimesBoldOblique),
    ("TimesNewRomanItalic", S::TimesOblique),
    ("TimesNewRomanPS", S::Times),
    ("TimesNewRomanPS-Bold", S::TimesBold),
    ("TimesNewRomanPS-BoldItalic", S::TimesBoldOblique),
    ("TimesNewRomanPS-BoldItalicMT", S::TimesBoldOblique),
    ("TimesNewRomanPS-BoldMT", S::TimesBold),
    ("TimesNewRomanPS-Italic", S::TimesOblique),
    ("TimesNewRomanPS-ItalicMT", S::TimesOblique),
    ("TimesNewRomanPSMT", S::Times),
    ("TimesNewRomanPSMT,Bold", S::TimesBold),
    ("TimesNewRomanPSMT,BoldItalic", S::TimesBoldOblique),
    ("TimesNewRomanPSMT,Italic", S::TimesOblique),
    ("ZapfDingbats", S::Dingbats),
];

fn cmp_ignore_ascii_case(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|b| b.to_ascii_lowercase())
        .cmp(b.bytes().map(|b| b.to_ascii_lowercase()))
}

/// Resolves an alias such as `Arial,Bold` to its standard font.
///
/// The lookup ignores ASCII case.
pub fn standard_font(name: &str) -> Option<StandardFont> {
    ALT_FONT_NAMES
        .binary_search_by(|(alias, _)| cmp_ignore_ascii_case(alias, name))
        .ok()
        .map(|index| ALT_FONT_NAMES[index].1)
}

/// Returns the PostScript name of the standard font that `name` aliases.
pub fn standard_font_name(name: &str) -> Option<&'static str> {
    standard_font(name).map(StandardFont::name)
}

/// Family names used in place of fonts whose PostScript names differ from
/// their installed family.
const ALT_FONT_FAMILIES: &[(&str, &str)] = &[
    ("AGaramondPro", "Adobe Garamond Pro"),
    ("BankGothicBT-Medium", "BankGothic Md BT"),
    ("ForteMT", "Forte"),
];

/// Returns an installed family name to try for `name`.
///
/// Script fonts are special cased: any bold script maps to `ScriptMTBold`
/// and only three known script families are recognized.
pub fn alternate_family(name: &str, force_bold: bool) -> Option<&'static str> {
    if name.contains("Script") {
        if force_bold {
            return Some("ScriptMTBold");
        }
        return if name.contains("Palace") {
            Some("PalaceScriptMT")
        } else if name.contains("French") {
            Some("FrenchScriptMT")
        } else if name.contains("FreeStyle") {
            Some("FreeStyleScript")
        } else {
            None
        };
    }
    ALT_FONT_FAMILIES
        .iter()
        .find(|(font, _)| name.contains(font))
        .map(|(_, family)| *family)
}

/// Family used for narrow and condensed requests that have no installed
/// match.
pub const NARROW_FAMILY: &str = if cfg!(target_os = "linux") {
    "LiberationSansNarrow"
} else if cfg!(target_os = "android") {
    "RobotoCondensed"
} else {
    "ArialNarrow"
};

/// TrueType substitutes for the standard fonts, as found on most systems.
const BASE14_SUBSTS: [&str; 12] = [
    "Courier New",
    "Courier New Bold",
    "Courier New Bold Italic",
    "Courier New Italic",
    "Arial",
    "Arial Bold",
    "Arial Bold Italic",
    "Arial Italic",
    "Times New Roman",
    "Times New Roman Bold",
    "Times New Roman Bold Italic",
    "Times New Roman Italic",
];

/// Returns the usual installed face for a Latin standard font name.
pub fn base14_substitute(name: &str) -> Option<&'static str> {
    BASE14_FONT_NAMES[..BASE14_SUBSTS.len()]
        .iter()
        .position(|base| *base == name)
        .map(|index| BASE14_SUBSTS[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_table_is_sorted() {
        for pair in ALT_FONT_NAMES.windows(2) {
            assert_eq!(
                cmp_ignore_ascii_case(pair[0].0, pair[1].0),
                Ordering::Less,
                "{} must sort before {}",
                pair[0].0,
                pair[1].0
            );
        }
    }

    #[test]
    fn standard_names() {
        for name in BASE14_FONT_NAMES {
            assert!(is_standard_font_name(name));
        }
        assert!(!is_standard_font_name("Arial"));
        assert!(!is_standard_font_name("courier"));
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(standard_font_name("Arial,Bold"), Some("Helvetica-Bold"));
        assert_eq!(standard_font_name("timesnewromanpsmt"), Some("Times-Roman"));
        assert_eq!(standard_font_name("SymbolMT"), Some("Symbol"));
        assert_eq!(standard_font_name("Verdana"), None);
    }

    #[test]
    fn index_round_trip() {
        for index in 0..NUM_STANDARD_FONTS {
            let font = StandardFont::from_index(index).unwrap();
            assert_eq!(font.index(), index);
        }
        assert!(StandardFont::from_index(NUM_STANDARD_FONTS).is_none());
        assert!(StandardFont::CourierOblique.is_fixed());
        assert!(StandardFont::Dingbats.is_symbolic());
    }

    #[test]
    fn families() {
        assert_eq!(alternate_family("ForteMT", false), Some("Forte"));
        assert_eq!(alternate_family("BrushScript", true), Some("ScriptMTBold"));
        assert_eq!(alternate_family("FrenchScript", false), Some("FrenchScriptMT"));
        assert_eq!(alternate_family("MysteryScript", false), None);
        assert_eq!(alternate_family("Verdana", false), None);
    }

    #[test]
    fn substitutes() {
        assert_eq!(base14_substitute("Courier"), Some("Courier New"));
        assert_eq!(base14_substitute("Helvetica-Bold"), Some("Arial Bold"));
        assert_eq!(base14_substitute("Times-BoldItalic"), Some("Times New Roman Bold Italic"));
        assert_eq!(base14_substitute("Symbol"), None);
    }
}
