// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolution of requested font names to installed or built-in faces.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use linebender_resource_handle::Blob;

use crate::attributes::{FontStyleFlags, PitchFamily, FW_BOLD, FW_BOLD_BOLD, FW_NORMAL};
use crate::charset::{Charset, CODE_PAGE_DEFAULT_ANSI};
use crate::face::Face;
use crate::manager::{BuiltinFonts, FontDescCache};
use crate::names::{is_narrow_name, normalize_name, remove_subset_prefix};
use crate::sfnt;
use crate::standard::{
    alternate_family, standard_font_name, StandardFont, BASE14_FONT_NAMES, NARROW_FAMILY,
    NUM_STANDARD_FONTS,
};
use crate::subst::{SubstFont, DINGBATS_FAMILY, GENERIC_SANS_FAMILY, SYMBOL_FAMILY};
use crate::system::{read_font_data, FontHandle, InstalledFonts, SystemFontInfo};
use crate::tag::{TABLE_NAME, TABLE_TTCF};

/// Style words recognized at the start or end of a name.
const FONT_STYLES: [(&str, FontStyleFlags); 5] = [
    ("Regular", FontStyleFlags::NORMAL),
    ("Reg", FontStyleFlags::NORMAL),
    (
        "BoldItalic",
        FontStyleFlags::from_bits(FontStyleFlags::FORCE_BOLD.bits() | FontStyleFlags::ITALIC.bits()),
    ),
    ("Italic", FontStyleFlags::ITALIC),
    ("Bold", FontStyleFlags::FORCE_BOLD),
];

/// Caches and providers a substitution may draw faces from.
pub(crate) struct FaceSources<'a> {
    pub(crate) cache: &'a mut FontDescCache,
    pub(crate) builtins: &'a dyn BuiltinFonts,
}

/// Maps font names from documents to installed faces.
///
/// Installed faces are reported by the injected [`SystemFontInfo`] the first
/// time a lookup needs them.
#[derive(Default)]
pub struct FontMapper {
    font_info: Option<Box<dyn SystemFontInfo>>,
    list_loaded: bool,
    last_family: String,
    face_array: Vec<(String, Charset)>,
    installed_fonts: Vec<String>,
    localized_fonts: Vec<(String, String)>,
    standard_faces: [Option<Face>; NUM_STANDARD_FONTS],
    generic_serif_face: Option<Face>,
    generic_sans_face: Option<Face>,
}

impl FontMapper {
    /// Creates a mapper with no system font info.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the platform font info and schedules a fresh enumeration.
    pub fn set_system_font_info(&mut self, font_info: Box<dyn SystemFontInfo>) {
        self.list_loaded = false;
        self.font_info = Some(font_info);
    }

    /// Removes and returns the platform font info.
    pub fn take_system_font_info(&mut self) -> Option<Box<dyn SystemFontInfo>> {
        self.font_info.take()
    }

    /// Returns the platform font info.
    pub fn system_font_info(&self) -> Option<&dyn SystemFontInfo> {
        self.font_info.as_deref()
    }

    /// Records an installed face that supports `charset`.
    ///
    /// Does nothing without system font info. Consecutive reports for the
    /// same family add one installed name. Names with non-ASCII bytes are
    /// also indexed by the PostScript name found in their `name` table.
    pub fn add_installed_font(&mut self, name: &str, charset: Charset) {
        let Some(info) = self.font_info.as_deref_mut() else {
            return;
        };
        self.face_array.push((name.to_string(), charset));
        if name == self.last_family {
            return;
        }
        let is_localized = name.bytes().any(|b| b > 0x80);
        if is_localized {
            let handle = match info.get_font(name) {
                Some(handle) => handle,
                None => match info.map_font(0, false, Charset::Default, PitchFamily::NONE, name) {
                    Some(handle) => handle,
                    None => return,
                },
            };
            let ps_name =
                read_font_data(&*info, handle, TABLE_NAME).and_then(|names| sfnt::name_string(&names, 6));
            info.delete_font(handle);
            if let Some(ps_name) = ps_name {
                self.localized_fonts.push((ps_name, name.to_string()));
            }
        }
        self.installed_fonts.push(name.to_string());
        self.last_family = name.to_string();
    }

    /// Enumerates installed faces if that has not happened yet.
    pub fn load_installed_fonts(&mut self) {
        if self.list_loaded {
            return;
        }
        let Some(info) = self.font_info.as_deref_mut() else {
            return;
        };
        let mut sink = InstalledFonts::new();
        if !info.enum_font_list(&mut sink) {
            log::debug!("system font info does not support enumeration");
        }
        self.list_loaded = true;
        for (name, charset) in sink.into_entries() {
            self.add_installed_font(&name, charset);
        }
    }

    /// Finds the most recently installed face whose normalized name equals
    /// `norm_name`, then tries localized names by their PostScript name.
    pub fn match_installed_fonts(&mut self, norm_name: &str) -> Option<String> {
        self.load_installed_fonts();
        if let Some(font) = self
            .installed_fonts
            .iter()
            .rev()
            .find(|font| normalize_name(font) == norm_name)
        {
            return Some(font.clone());
        }
        self.localized_fonts
            .iter()
            .rev()
            .find(|(ps_name, _)| normalize_name(ps_name) == norm_name)
            .map(|(_, name)| name.clone())
    }

    /// Returns the number of `(face, charset)` reports.
    pub fn face_size(&self) -> usize {
        self.face_array.len()
    }

    /// Returns the face name of the `index`th report.
    pub fn face_name(&self, index: usize) -> Option<&str> {
        self.face_array.get(index).map(|(name, _)| name.as_str())
    }

    /// Returns true if `name` was recorded as installed.
    pub fn has_installed_font(&self, name: &str) -> bool {
        self.installed_fonts.iter().any(|font| font == name)
    }

    /// Returns true if `name` is the PostScript name of a localized face.
    pub fn has_localized_font(&self, name: &str) -> bool {
        self.localized_fonts.iter().any(|(ps_name, _)| ps_name == name)
    }

    /// Reads the whole font file of the `index`th reported face.
    pub fn raw_bytes_for_index(&mut self, index: usize) -> Option<Vec<u8>> {
        let name = self.face_name(index)?.to_string();
        let info = self.font_info.as_deref_mut()?;
        let handle = info.map_font(0, false, Charset::Default, PitchFamily::NONE, &name)?;
        let bytes = read_font_data(&*info, handle, 0);
        info.delete_font(handle);
        bytes
    }

    /// Chooses a face for a font requested by name and descriptor flags and
    /// records how it was substituted in `subst`.
    pub(crate) fn find_subst_font(
        &mut self,
        sources: &mut FaceSources<'_>,
        name: &str,
        is_truetype: bool,
        flags: FontStyleFlags,
        weight: i32,
        italic_angle: i32,
        code_page: u16,
        subst: &mut SubstFont,
    ) -> Option<Face> {
        let mut weight = if weight == 0 { FW_NORMAL } else { weight };
        let mut italic_angle = italic_angle;
        if !flags.contains(FontStyleFlags::USE_EXTERNAL_ATTR) {
            weight = FW_NORMAL;
            italic_angle = 0;
        }
        let subst_name = subst_name(name, is_truetype);
        if subst_name == "Symbol" && !is_truetype {
            subst.family = SYMBOL_FAMILY.into();
            subst.charset = Charset::Symbol;
            return self.use_internal_subst(
                sources,
                Some(StandardFont::Symbol),
                weight,
                italic_angle,
                PitchFamily::NONE,
                subst,
            );
        }
        if subst_name == "ZapfDingbats" {
            subst.family = DINGBATS_FAMILY.into();
            subst.charset = Charset::Symbol;
            return self.use_internal_subst(
                sources,
                Some(StandardFont::Dingbats),
                weight,
                italic_angle,
                PitchFamily::NONE,
                subst,
            );
        }

        let mut has_hyphen = false;
        let (mut family, mut style, has_comma) = match subst_name.find(',') {
            Some(pos) => {
                let family = &subst_name[..pos];
                let family = standard_font_name(family).unwrap_or(family);
                (family.to_string(), subst_name[pos + 1..].to_string(), true)
            }
            None => (subst_name.clone(), String::new(), false),
        };
        let mut base_font = BASE14_FONT_NAMES[..StandardFont::Symbol.index()]
            .iter()
            .position(|base| *base == family)
            .and_then(StandardFont::from_index);
        let mut pitch_family;
        let mut state = StyleState::default();
        if let Some(base) = base_font {
            state.style = style_from_base_font(base);
            pitch_family = pitch_family_from_base_font(base);
        } else {
            if !has_comma {
                if let Some(pos) = family.rfind('-') {
                    style = family[pos + 1..].to_string();
                    family.truncate(pos);
                    has_hyphen = true;
                }
            }
            if !has_hyphen {
                if let Some((len, parsed)) = style_type(family.as_bytes(), true) {
                    family.truncate(family.len() - len);
                    state.style |= parsed;
                }
            }
            pitch_family = PitchFamily::from_style_flags(flags);
        }

        let old_weight = weight;
        state.weight = if state.style.contains(FontStyleFlags::FORCE_BOLD) {
            FW_BOLD
        } else {
            weight
        };
        if parse_styles(&style, &mut state) {
            family = subst_name.clone();
            base_font = None;
        }
        let StyleState {
            weight: parsed_weight,
            style: n_style,
            is_style_available,
        } = state;
        weight = parsed_weight;

        if self.font_info.is_none() {
            return self.use_internal_subst(
                sources,
                base_font,
                old_weight,
                italic_angle,
                pitch_family,
                subst,
            );
        }

        let charset = charset_for(code_page, base_font.is_some(), flags);
        let is_cjk = charset.is_cjk();
        let mut is_italic = n_style.contains(FontStyleFlags::ITALIC);

        if let Some(alternate) =
            alternate_family(&family, n_style.contains(FontStyleFlags::FORCE_BOLD))
        {
            family = alternate.to_string();
        }

        let mut matched = self.match_installed_fonts(&normalize_name(&family));
        if matched.is_none()
            && family != subst_name
            && !has_comma
            && (!has_hyphen || !is_style_available)
        {
            matched = self.match_installed_fonts(&normalize_name(&subst_name));
        }
        if matched.is_none() && base_font.is_none() {
            if !is_cjk {
                if !check_support_third_party_font(&family, &mut pitch_family) {
                    is_italic = italic_angle != 0;
                    weight = old_weight;
                }
                if is_narrow_name(&subst_name) {
                    family = NARROW_FAMILY.to_string();
                }
            } else {
                subst.subst_cjk = true;
                if !n_style.is_empty() {
                    subst.weight_cjk = weight;
                }
                if n_style.contains(FontStyleFlags::ITALIC) {
                    subst.italic_cjk = true;
                }
            }
        } else {
            italic_angle = 0;
            if n_style.is_empty() {
                weight = FW_NORMAL;
            }
        }

        if matched.is_some() || base_font.is_some() {
            if let Some(matched) = &matched {
                family.clone_from(matched);
            }
            if let Some(base) = base_font {
                let adjusted = adjust_base_font_for_style(base, n_style);
                base_font = Some(adjusted);
                family = adjusted.name().to_string();
            }
        } else if flags.contains(FontStyleFlags::ITALIC) {
            is_italic = true;
        }

        if let Some(handle) = self.map_font(weight, is_italic, charset, pitch_family, &family) {
            return self.use_external_subst(
                sources,
                handle,
                &subst_name,
                weight,
                is_italic,
                italic_angle,
                charset,
                subst,
            );
        }

        if is_cjk {
            is_italic = italic_angle != 0;
            weight = old_weight;
        }
        if let Some(matched) = &matched {
            let Some(handle) = self.get_font(matched) else {
                return self.use_internal_subst(
                    sources,
                    base_font,
                    old_weight,
                    italic_angle,
                    pitch_family,
                    subst,
                );
            };
            return self.use_external_subst(
                sources,
                handle,
                &subst_name,
                weight,
                is_italic,
                italic_angle,
                charset,
                subst,
            );
        }

        if charset == Charset::Symbol {
            if !cfg!(windows) && subst_name == "Symbol" {
                subst.family = SYMBOL_FAMILY.into();
                subst.charset = Charset::Symbol;
                return self.use_internal_subst(
                    sources,
                    Some(StandardFont::Symbol),
                    old_weight,
                    italic_angle,
                    pitch_family,
                    subst,
                );
            }
            return self.find_subst_font(
                sources,
                &family,
                is_truetype,
                flags.without(FontStyleFlags::SYMBOLIC),
                weight,
                italic_angle,
                CODE_PAGE_DEFAULT_ANSI,
                subst,
            );
        }

        if charset == Charset::Ansi {
            return self.use_internal_subst(
                sources,
                base_font,
                old_weight,
                italic_angle,
                pitch_family,
                subst,
            );
        }

        let Some(face_name) = self
            .face_array
            .iter()
            .find(|(_, face_charset)| *face_charset == charset)
            .map(|(name, _)| name.clone())
        else {
            return self.use_internal_subst(
                sources,
                base_font,
                old_weight,
                italic_angle,
                pitch_family,
                subst,
            );
        };
        let handle = self.get_font(&face_name)?;
        self.use_external_subst(
            sources,
            handle,
            &subst_name,
            weight,
            is_italic,
            italic_angle,
            charset,
            subst,
        )
    }

    fn map_font(
        &mut self,
        weight: i32,
        italic: bool,
        charset: Charset,
        pitch_family: PitchFamily,
        face: &str,
    ) -> Option<FontHandle> {
        self.font_info
            .as_deref_mut()?
            .map_font(weight, italic, charset, pitch_family, face)
    }

    fn get_font(&mut self, face: &str) -> Option<FontHandle> {
        self.font_info.as_deref_mut()?.get_font(face)
    }

    fn use_internal_subst(
        &mut self,
        sources: &FaceSources<'_>,
        base_font: Option<StandardFont>,
        weight: i32,
        italic_angle: i32,
        pitch_family: PitchFamily,
        subst: &mut SubstFont,
    ) -> Option<Face> {
        if let Some(base) = base_font {
            let slot = &mut self.standard_faces[base.index()];
            if slot.is_none() {
                *slot = builtin_face(sources.builtins.standard_font(base));
            }
            return slot.clone();
        }
        subst.set_is_built_in_generic_font();
        subst.italic_angle = italic_angle;
        if weight != 0 {
            subst.weight = weight;
        }
        if pitch_family.contains(PitchFamily::ROMAN) {
            subst.use_generic_serif();
            if self.generic_serif_face.is_none() {
                self.generic_serif_face = builtin_face(sources.builtins.generic_serif_font());
            }
            return self.generic_serif_face.clone();
        }
        subst.family = GENERIC_SANS_FAMILY.into();
        if self.generic_sans_face.is_none() {
            self.generic_sans_face = builtin_face(sources.builtins.generic_sans_font());
        }
        self.generic_sans_face.clone()
    }

    fn use_external_subst(
        &mut self,
        sources: &mut FaceSources<'_>,
        handle: FontHandle,
        face_name: &str,
        weight: i32,
        is_italic: bool,
        italic_angle: i32,
        charset: Charset,
        subst: &mut SubstFont,
    ) -> Option<Face> {
        let info = self.font_info.as_deref_mut()?;
        let face = external_face(
            &*info,
            sources.cache,
            handle,
            face_name,
            weight,
            is_italic,
            italic_angle,
            charset,
            subst,
        );
        info.delete_font(handle);
        face
    }
}

impl fmt::Debug for FontMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontMapper")
            .field("has_font_info", &self.font_info.is_some())
            .field("list_loaded", &self.list_loaded)
            .field("faces", &self.face_array.len())
            .field("installed", &self.installed_fonts.len())
            .field("localized", &self.localized_fonts.len())
            .finish_non_exhaustive()
    }
}

fn builtin_face(data: Option<Blob<u8>>) -> Option<Face> {
    match Face::new(data?, 0) {
        Ok(face) => Some(face),
        Err(err) => {
            log::debug!("built-in font rejected: {err}");
            None
        }
    }
}

fn external_face(
    info: &dyn SystemFontInfo,
    cache: &mut FontDescCache,
    handle: FontHandle,
    face_name: &str,
    weight: i32,
    is_italic: bool,
    italic_angle: i32,
    charset: Charset,
    subst: &mut SubstFont,
) -> Option<Face> {
    let face_name = info
        .get_face_name(handle)
        .unwrap_or_else(|| face_name.to_string());
    let charset = match charset {
        Charset::Default => info.get_font_charset(handle).unwrap_or(charset),
        charset => charset,
    };
    let ttc_size = info.get_font_data(handle, TABLE_TTCF, &mut []);
    let font_size = info.get_font_data(handle, 0, &mut []);
    if ttc_size == 0 && font_size == 0 {
        return None;
    }
    let face = if ttc_size != 0 {
        cached_ttc_face(info, cache, handle, ttc_size, font_size)?
    } else {
        cached_face(info, cache, handle, &face_name, weight, is_italic, font_size)?
    };
    subst.family = face_name;
    subst.charset = charset;
    let face_weight = if face.is_bold() { FW_BOLD } else { FW_NORMAL };
    if weight != face_weight {
        subst.weight = weight;
    }
    if is_italic && !face.is_italic() {
        subst.italic_angle = if italic_angle == 0 {
            -12
        } else if italic_angle.abs() < 5 {
            0
        } else {
            italic_angle
        };
    }
    Some(face)
}

/// Sums the first 256 big-endian words of a collection.
pub fn collection_checksum(data: &[u8]) -> u32 {
    let mut words = [0_u8; 1024];
    let len = data.len().min(words.len());
    words[..len].copy_from_slice(&data[..len]);
    words
        .chunks_exact(4)
        .map(|w| u32::from_be_bytes([w[0], w[1], w[2], w[3]]))
        .fold(0_u32, u32::wrapping_add)
}

fn cached_ttc_face(
    info: &dyn SystemFontInfo,
    cache: &mut FontDescCache,
    handle: FontHandle,
    ttc_size: usize,
    data_size: usize,
) -> Option<Face> {
    let font_offset = ttc_size.checked_sub(data_size)?;
    let mut prefix = [0_u8; 1024];
    let len = info.get_font_data_prefix(handle, TABLE_TTCF, &mut prefix);
    if len == 0 {
        return None;
    }
    let checksum = collection_checksum(&prefix[..len]);
    let blob = match cache.get_cached_ttc_font_desc(ttc_size, checksum) {
        Some(blob) => blob.clone(),
        None => {
            let data =
                read_font_data(info, handle, TABLE_TTCF).filter(|data| data.len() == ttc_size)?;
            log::debug!("caching collection of {ttc_size} bytes");
            cache.add_cached_ttc_font_desc(ttc_size, checksum, data)
        }
    };
    let face_index = u32::try_from(font_offset)
        .map(|offset| sfnt::collection_face_index(blob.data(), offset))
        .unwrap_or(0);
    Face::new(blob, face_index).ok()
}

fn cached_face(
    info: &dyn SystemFontInfo,
    cache: &mut FontDescCache,
    handle: FontHandle,
    subst_name: &str,
    weight: i32,
    is_italic: bool,
    data_size: usize,
) -> Option<Face> {
    let blob = match cache.get_cached_font_desc(subst_name, weight, is_italic) {
        Some(blob) => blob.clone(),
        None => {
            let data = read_font_data(info, handle, 0).filter(|data| data.len() == data_size)?;
            log::debug!("caching {subst_name:?} weight {weight} italic {is_italic}");
            cache.add_cached_font_desc(subst_name, weight, is_italic, data)
        }
    };
    Face::new(blob, 0).ok()
}

pub(crate) fn blob_from_vec(data: Vec<u8>) -> Blob<u8> {
    Blob::new(Arc::new(data))
}

/// Applies the name clean-up shared by every lookup: a leading `@` on
/// TrueType names (vertical writing) is dropped, spaces are removed from
/// other names, then subset prefixes and standard aliases are resolved.
fn subst_name(name: &str, is_truetype: bool) -> String {
    let name = match name.strip_prefix('@') {
        Some(rest) if is_truetype => rest.to_string(),
        _ => name.replace(' ', ""),
    };
    let name = remove_subset_prefix(&name);
    standard_font_name(name).unwrap_or(name).to_string()
}

/// Matches a style word at the start of `name`, or at its end when
/// `reverse` is set. Returns the length of the word and its style.
fn style_type(name: &[u8], reverse: bool) -> Option<(usize, FontStyleFlags)> {
    if name.is_empty() {
        return None;
    }
    FONT_STYLES.iter().find_map(|&(word, style)| {
        let hit = if reverse {
            name.ends_with(word.as_bytes())
        } else {
            name.starts_with(word.as_bytes())
        };
        hit.then_some((word.len(), style))
    })
}

#[derive(Copy, Clone, Default, Debug)]
struct StyleState {
    weight: i32,
    style: FontStyleFlags,
    is_style_available: bool,
}

/// Applies comma separated style words such as `Bold,Italic`.
///
/// Returns true when the text is not a recognizable style list, in which
/// case the caller treats the whole name as the family.
fn parse_styles(styles: &str, state: &mut StyleState) -> bool {
    let bytes = styles.as_bytes();
    let mut i = 0;
    let mut is_first_item = true;
    while i < bytes.len() {
        let region = &bytes[i..];
        let item = &region[..region.iter().position(|&b| b == b',').unwrap_or(region.len())];
        let result = style_type(item, false);
        if (i != 0 && !state.is_style_available) || (i == 0 && result.is_none()) {
            return true;
        }
        let parsed = match result {
            Some((_, style)) => {
                state.is_style_available = true;
                style
            }
            None => FontStyleFlags::NORMAL,
        };
        if parsed.contains(FontStyleFlags::FORCE_BOLD) {
            if state.style.contains(FontStyleFlags::FORCE_BOLD) {
                state.weight = FW_BOLD_BOLD;
            } else {
                state.weight = FW_BOLD;
                state.style |= FontStyleFlags::FORCE_BOLD;
            }
            is_first_item = false;
        }
        if parsed.contains(FontStyleFlags::ITALIC) {
            if !parsed.contains(FontStyleFlags::FORCE_BOLD) {
                if !is_first_item {
                    return true;
                }
                state.style |= FontStyleFlags::ITALIC;
                break;
            }
            state.style |= FontStyleFlags::ITALIC;
        }
        i += item.len() + 1;
    }
    false
}

fn check_support_third_party_font(name: &str, pitch_family: &mut PitchFamily) -> bool {
    if name != "MyriadPro" {
        return false;
    }
    *pitch_family = pitch_family.without(PitchFamily::ROMAN);
    true
}

fn style_from_base_font(base: StandardFont) -> FontStyleFlags {
    let pos = base.index() % 4;
    let mut style = FontStyleFlags::NORMAL;
    if pos == 1 || pos == 2 {
        style |= FontStyleFlags::FORCE_BOLD;
    }
    if pos / 2 != 0 {
        style |= FontStyleFlags::ITALIC;
    }
    style
}

fn pitch_family_from_base_font(base: StandardFont) -> PitchFamily {
    match base.index() {
        0..4 => PitchFamily::FIXED_PITCH,
        4..8 => PitchFamily::NONE,
        _ => PitchFamily::ROMAN,
    }
}

fn adjust_base_font_for_style(base: StandardFont, style: FontStyleFlags) -> StandardFont {
    if style.is_empty() || base.index() % 4 != 0 {
        return base;
    }
    let bold = style.contains(FontStyleFlags::FORCE_BOLD);
    let italic = style.contains(FontStyleFlags::ITALIC);
    let step = match (bold, italic) {
        (true, true) => 2,
        (true, false) => 1,
        (false, true) => 3,
        (false, false) => 0,
    };
    StandardFont::from_index(base.index() + step).unwrap_or(base)
}

fn charset_for(code_page: u16, has_base_font: bool, flags: FontStyleFlags) -> Charset {
    if code_page != CODE_PAGE_DEFAULT_ANSI {
        return Charset::from_code_page(code_page);
    }
    if flags.contains(FontStyleFlags::SYMBOLIC) && !has_base_font {
        return Charset::Symbol;
    }
    Charset::Ansi
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::CharsetFlags;
    use crate::manager::NoBuiltinFonts;
    use crate::sfnt::test_fonts::{collection, name_table, face as sfnt_face, styled_font};
    use crate::system::mock::MemoryFontInfo;
    use alloc::vec;

    /// Built-in provider that hands out distinct tiny fonts.
    struct TestBuiltins {
        standard: Vec<Blob<u8>>,
        serif: Blob<u8>,
        sans: Blob<u8>,
    }

    impl TestBuiltins {
        fn new() -> Self {
            Self {
                standard: BASE14_FONT_NAMES
                    .iter()
                    .map(|name| blob_from_vec(styled_font(name, "Regular")))
                    .collect(),
                serif: blob_from_vec(styled_font("Serif", "Regular")),
                sans: blob_from_vec(styled_font("Sans", "Regular")),
            }
        }
    }

    impl BuiltinFonts for TestBuiltins {
        fn standard_font(&self, font: StandardFont) -> Option<Blob<u8>> {
            self.standard.get(font.index()).cloned()
        }

        fn generic_serif_font(&self) -> Option<Blob<u8>> {
            Some(self.serif.clone())
        }

        fn generic_sans_font(&self) -> Option<Blob<u8>> {
            Some(self.sans.clone())
        }
    }

    fn lookup(
        mapper: &mut FontMapper,
        builtins: &dyn BuiltinFonts,
        cache: &mut FontDescCache,
        name: &str,
        flags: FontStyleFlags,
        subst: &mut SubstFont,
    ) -> Option<Face> {
        let mut sources = FaceSources { cache, builtins };
        mapper.find_subst_font(&mut sources, name, false, flags, 0, 0, 0, subst)
    }

    #[test]
    fn add_installed_font_records_dummy() {
        let mut mapper = FontMapper::new();
        mapper.set_system_font_info(Box::new(MemoryFontInfo::new()));
        mapper.add_installed_font("dummy", Charset::Ansi);
        assert_eq!(mapper.face_size(), 1);
        assert_eq!(mapper.face_name(0), Some("dummy"));
        assert!(mapper.has_installed_font("dummy"));
    }

    #[test]
    fn add_installed_font_needs_font_info() {
        let mut mapper = FontMapper::new();
        mapper.add_installed_font("dummy", Charset::Ansi);
        assert_eq!(mapper.face_size(), 0);
    }

    #[test]
    fn repeated_family_is_installed_once() {
        let mut mapper = FontMapper::new();
        mapper.set_system_font_info(Box::new(MemoryFontInfo::new()));
        mapper.add_installed_font("MS Gothic", Charset::ShiftJis);
        mapper.add_installed_font("MS Gothic", Charset::Ansi);
        assert_eq!(mapper.face_size(), 2);
        assert_eq!(mapper.installed_fonts, vec!["MS Gothic".to_string()]);
    }

    #[test]
    fn localized_names_resolve_by_postscript_name() {
        let localized = "\u{FF2D}\u{FF33} \u{660E}\u{671D}";
        let names = name_table(&[(1, localized), (6, "MS-Mincho")]);
        let data = sfnt_face(0, &[(TABLE_NAME, names)]);
        let mut info = MemoryFontInfo::new();
        info.add_face(localized, data, 0, FontStyleFlags::NORMAL, CharsetFlags::ANSI);
        let mut mapper = FontMapper::new();
        mapper.set_system_font_info(Box::new(info));
        mapper.load_installed_fonts();
        assert!(mapper.has_localized_font("MS-Mincho"));
        assert_eq!(
            mapper.match_installed_fonts("msmincho").as_deref(),
            Some(localized)
        );
    }

    #[test]
    fn standard_aliases_use_builtin_faces() {
        let builtins = TestBuiltins::new();
        let mut cache = FontDescCache::default();
        let mut mapper = FontMapper::new();
        let mut subst = SubstFont::new();
        let face = lookup(
            &mut mapper,
            &builtins,
            &mut cache,
            "Arial,Bold",
            FontStyleFlags::NORMAL,
            &mut subst,
        )
        .unwrap();
        let expected = &builtins.standard[StandardFont::HelveticaBold.index()];
        assert_eq!(face.data().id(), expected.id());

        let face = lookup(
            &mut mapper,
            &builtins,
            &mut cache,
            "ABCDEF+TimesNewRomanPS-ItalicMT",
            FontStyleFlags::NORMAL,
            &mut subst,
        )
        .unwrap();
        let expected = &builtins.standard[StandardFont::TimesOblique.index()];
        assert_eq!(face.data().id(), expected.id(), "subset prefix is stripped");
    }

    #[test]
    fn symbol_and_dingbats_are_internal() {
        let builtins = TestBuiltins::new();
        let mut cache = FontDescCache::default();
        let mut mapper = FontMapper::new();
        let mut subst = SubstFont::new();
        let face = lookup(
            &mut mapper,
            &builtins,
            &mut cache,
            "Symbol",
            FontStyleFlags::SYMBOLIC,
            &mut subst,
        )
        .unwrap();
        assert_eq!(subst.family, SYMBOL_FAMILY);
        assert_eq!(subst.charset, Charset::Symbol);
        assert_eq!(face.data().id(), builtins.standard[StandardFont::Symbol.index()].id());

        let mut subst = SubstFont::new();
        lookup(&mut mapper, &builtins, &mut cache, "ZapfDingbats", FontStyleFlags::NORMAL, &mut subst)
            .unwrap();
        assert_eq!(subst.family, DINGBATS_FAMILY);
    }

    #[test]
    fn generic_fallback_follows_serif_flag() {
        let builtins = TestBuiltins::new();
        let mut cache = FontDescCache::default();
        let mut mapper = FontMapper::new();

        let mut subst = SubstFont::new();
        let face = lookup(&mut mapper, &builtins, &mut cache, "Verdana", FontStyleFlags::SERIF, &mut subst)
            .unwrap();
        assert_eq!(subst.family, "Chrome Serif");
        assert!(subst.is_built_in_generic_font);
        assert_eq!(face.data().id(), builtins.serif.id());

        let mut subst = SubstFont::new();
        let face = lookup(&mut mapper, &builtins, &mut cache, "Verdana", FontStyleFlags::NORMAL, &mut subst)
            .unwrap();
        assert_eq!(subst.family, GENERIC_SANS_FAMILY);
        assert_eq!(subst.weight, FW_NORMAL);
        assert_eq!(face.data().id(), builtins.sans.id());
    }

    #[test]
    fn missing_builtins_yield_none() {
        let mut cache = FontDescCache::default();
        let mut mapper = FontMapper::new();
        let mut subst = SubstFont::new();
        assert!(lookup(&mut mapper, &NoBuiltinFonts, &mut cache, "Courier", FontStyleFlags::NORMAL, &mut subst)
            .is_none());
    }

    fn verdana_info() -> MemoryFontInfo {
        let mut info = MemoryFontInfo::new();
        info.add_face(
            "Verdana",
            styled_font("Verdana", "Regular"),
            0,
            FontStyleFlags::NORMAL,
            CharsetFlags::ANSI,
        );
        info.add_face(
            "Verdana Bold",
            styled_font("Verdana", "Bold"),
            0,
            FontStyleFlags::FORCE_BOLD,
            CharsetFlags::ANSI,
        );
        info
    }

    #[test]
    fn installed_bold_face_is_used() {
        let builtins = TestBuiltins::new();
        let mut cache = FontDescCache::default();
        let mut mapper = FontMapper::new();
        mapper.set_system_font_info(Box::new(verdana_info()));

        let mut subst = SubstFont::new();
        let face = lookup(&mut mapper, &builtins, &mut cache, "Verdana,Bold", FontStyleFlags::NORMAL, &mut subst)
            .unwrap();
        assert_eq!(subst.family, "Verdana Bold");
        assert_eq!(subst.weight, 0, "the face is designed bold");
        assert!(face.is_bold());

        let mut again = SubstFont::new();
        let second = lookup(&mut mapper, &builtins, &mut cache, "Verdana,Bold", FontStyleFlags::NORMAL, &mut again)
            .unwrap();
        assert_eq!(face.data().id(), second.data().id(), "font data is cached");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn synthetic_italic_angle() {
        let builtins = TestBuiltins::new();
        let mut cache = FontDescCache::default();
        let mut mapper = FontMapper::new();
        mapper.set_system_font_info(Box::new(verdana_info()));

        let mut subst = SubstFont::new();
        lookup(&mut mapper, &builtins, &mut cache, "Verdana,Italic", FontStyleFlags::NORMAL, &mut subst)
            .unwrap();
        assert_eq!(subst.family, "Verdana");
        assert_eq!(subst.italic_angle, -12);
    }

    #[test]
    fn collection_face_index_from_offset() {
        let ttc = collection(&[("First", "Regular"), ("Second", "Regular")]);
        let offsets = sfnt::collection_offsets(&ttc).unwrap();
        let mut info = MemoryFontInfo::new();
        info.add_face("Second", ttc, offsets[1], FontStyleFlags::NORMAL, CharsetFlags::ANSI);
        let builtins = TestBuiltins::new();
        let mut cache = FontDescCache::default();
        let mut mapper = FontMapper::new();
        mapper.set_system_font_info(Box::new(info));

        let mut subst = SubstFont::new();
        let face = lookup(&mut mapper, &builtins, &mut cache, "Second", FontStyleFlags::NORMAL, &mut subst)
            .unwrap();
        assert_eq!(face.index(), 1);
        assert_eq!(subst.family, "Second");
    }

    #[test]
    fn cached_collections_are_read_once() {
        let ttc = collection(&[("First", "Regular"), ("Second", "Regular")]);
        let offsets = sfnt::collection_offsets(&ttc).unwrap();
        let mut info = MemoryFontInfo::new();
        info.add_face("Second", ttc, offsets[1], FontStyleFlags::NORMAL, CharsetFlags::ANSI);
        let reads = info.collection_reads();
        let builtins = TestBuiltins::new();
        let mut cache = FontDescCache::default();
        let mut mapper = FontMapper::new();
        mapper.set_system_font_info(Box::new(info));

        for _ in 0..3 {
            let mut subst = SubstFont::new();
            let face = lookup(&mut mapper, &builtins, &mut cache, "Second", FontStyleFlags::NORMAL, &mut subst)
                .unwrap();
            assert_eq!(face.index(), 1);
        }
        assert_eq!(reads.get(), 1, "later lookups only checksum the header");
    }

    #[test]
    fn style_words() {
        assert_eq!(style_type(b"BoldItalic", false).map(|(len, _)| len), Some(10));
        assert_eq!(style_type(b"ArialBold", true), Some((4, FontStyleFlags::FORCE_BOLD)));
        assert_eq!(style_type(b"Arial", true), None);
        assert_eq!(style_type(b"", false), None);
    }

    #[test]
    fn parse_style_lists() {
        let mut state = StyleState::default();
        assert!(!parse_styles("Bold,Italic", &mut state));
        assert_eq!(state.weight, FW_BOLD);
        assert_eq!(state.style, FontStyleFlags::FORCE_BOLD | FontStyleFlags::ITALIC);

        let mut state = StyleState {
            style: FontStyleFlags::FORCE_BOLD,
            ..StyleState::default()
        };
        assert!(!parse_styles("Bold", &mut state));
        assert_eq!(state.weight, FW_BOLD_BOLD, "bold twice is extra bold");

        let mut state = StyleState::default();
        assert!(parse_styles("Light", &mut state), "unknown style names the family");
    }

    #[test]
    fn base_font_helpers() {
        assert_eq!(
            style_from_base_font(StandardFont::TimesBoldOblique),
            FontStyleFlags::FORCE_BOLD | FontStyleFlags::ITALIC
        );
        assert_eq!(style_from_base_font(StandardFont::CourierOblique), FontStyleFlags::ITALIC);
        assert_eq!(pitch_family_from_base_font(StandardFont::Courier), PitchFamily::FIXED_PITCH);
        assert_eq!(pitch_family_from_base_font(StandardFont::Times), PitchFamily::ROMAN);
        assert_eq!(
            adjust_base_font_for_style(StandardFont::Helvetica, FontStyleFlags::ITALIC),
            StandardFont::HelveticaOblique
        );
        assert_eq!(
            adjust_base_font_for_style(StandardFont::HelveticaBold, FontStyleFlags::ITALIC),
            StandardFont::HelveticaBold
        );
    }

    #[test]
    fn charsets() {
        assert_eq!(charset_for(932, false, FontStyleFlags::NORMAL), Charset::ShiftJis);
        assert_eq!(charset_for(0, false, FontStyleFlags::SYMBOLIC), Charset::Symbol);
        assert_eq!(charset_for(0, true, FontStyleFlags::SYMBOLIC), Charset::Ansi);
    }

    #[test]
    fn subst_names() {
        assert_eq!(subst_name("@MS Mincho", true), "MS Mincho");
        assert_eq!(subst_name("Times New Roman", false), "Times-Roman");
        assert_eq!(subst_name("ABCDEF+Arial,Bold", false), "Helvetica-Bold");
    }

    #[test]
    fn checksum_wraps() {
        let data = vec![0xFF_u8; 2048];
        assert_eq!(collection_checksum(&data), 0xFFFF_FFFF_u32.wrapping_mul(256));
        assert_eq!(collection_checksum(&[0, 0, 0, 1]), 1);
    }
}
