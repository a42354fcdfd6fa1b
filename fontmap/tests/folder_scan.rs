// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scans synthetic font trees on disk and resolves requests against them.

use std::fs;
use std::path::Path;

use fontmap::tag::{make_tag, TABLE_NAME, TABLE_TTCF};
use fontmap::{
    Charset, FolderFontInfo, FontManager, FontManagerOptions, FontStyleFlags, InstalledFonts,
    SubstFont, SystemFontInfo, FW_BOLD,
};
use pretty_assertions::assert_eq;
use tempdir::TempDir;

/// Code page bit for Shift-JIS in `OS/2` `ulCodePageRange1`.
const CODE_PAGE_SHIFT_JIS: u32 = 1 << 17;

fn name_table(family: &str, style: &str) -> Vec<u8> {
    let names = [(1_u16, family), (2, style)];
    let mut strings = Vec::new();
    let mut records = Vec::new();
    for (id, value) in names {
        let encoded: Vec<u8> = value.encode_utf16().flat_map(u16::to_be_bytes).collect();
        records.push([3, 1, 0x409, id, encoded.len() as u16, strings.len() as u16]);
        strings.extend(encoded);
    }
    let mut out = Vec::new();
    for value in [0, records.len() as u16, 6 + 12 * records.len() as u16] {
        out.extend(value.to_be_bytes());
    }
    for record in records {
        for value in record {
            out.extend(value.to_be_bytes());
        }
    }
    out.extend(strings);
    out
}

fn os2_table(code_pages: u32) -> Vec<u8> {
    let mut os2 = vec![0_u8; 86];
    os2[78..82].copy_from_slice(&code_pages.to_be_bytes());
    os2
}

/// Lays out an sfnt face whose first byte sits at `base` in its file.
fn sfnt(base: usize, mut tables: Vec<(u32, Vec<u8>)>) -> Vec<u8> {
    tables.sort_by_key(|(tag, _)| *tag);
    let header_len = 12 + 16 * tables.len();
    let mut out = Vec::new();
    out.extend(0x0001_0000_u32.to_be_bytes());
    out.extend((tables.len() as u16).to_be_bytes());
    out.extend([0; 6]);
    let mut body = Vec::new();
    for (tag, data) in tables {
        let offset = (base + header_len + body.len()) as u32;
        out.extend(tag.to_be_bytes());
        out.extend(0_u32.to_be_bytes());
        out.extend(offset.to_be_bytes());
        out.extend((data.len() as u32).to_be_bytes());
        body.extend(data);
        body.resize(body.len().next_multiple_of(4), 0);
    }
    out.extend(body);
    out
}

fn ttc(faces: &[(&str, &str)]) -> Vec<u8> {
    let header_len = 12 + 4 * faces.len();
    let mut offsets = Vec::new();
    let mut body = Vec::new();
    for (family, style) in faces {
        let base = header_len + body.len();
        offsets.push(base as u32);
        body.extend(sfnt(base, vec![(TABLE_NAME, name_table(family, style))]));
    }
    let mut out = b"ttcf".to_vec();
    out.extend(0x0001_0000_u32.to_be_bytes());
    out.extend((faces.len() as u32).to_be_bytes());
    for offset in offsets {
        out.extend(offset.to_be_bytes());
    }
    out.extend(body);
    out
}

/// Writes:
///
/// ```text
/// a/Alpha.ttf    Alpha, Shift-JIS code page
/// b/pair.ttc     Beta, Beta Bold
/// notes.txt
/// short.ttf      truncated
/// ```
fn font_tree() -> TempDir {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = TempDir::new("fontmap").unwrap();
    let root = dir.path();
    fs::create_dir(root.join("a")).unwrap();
    fs::create_dir(root.join("b")).unwrap();
    let alpha = sfnt(
        0,
        vec![
            (TABLE_NAME, name_table("Alpha", "Regular")),
            (make_tag(b'O', b'S', b'/', b'2'), os2_table(CODE_PAGE_SHIFT_JIS)),
        ],
    );
    fs::write(root.join("a/Alpha.ttf"), alpha).unwrap();
    fs::write(root.join("b/pair.ttc"), ttc(&[("Beta", "Regular"), ("Beta", "Bold")])).unwrap();
    fs::write(root.join("notes.txt"), "not a font").unwrap();
    fs::write(root.join("short.ttf"), [0_u8, 1, 0, 0]).unwrap();
    dir
}

fn scanned(root: &Path) -> (FolderFontInfo, Vec<(String, Charset)>) {
    let mut info = FolderFontInfo::new();
    info.add_path(root);
    let mut sink = InstalledFonts::new();
    assert!(info.enum_font_list(&mut sink));
    let entries = sink
        .iter()
        .map(|(name, charset)| (name.to_string(), charset))
        .collect();
    (info, entries)
}

#[test]
fn scan_reports_faces_in_name_order() {
    let dir = font_tree();
    let (info, entries) = scanned(dir.path());
    assert_eq!(
        entries,
        vec![
            ("Alpha".to_string(), Charset::ShiftJis),
            ("Alpha".to_string(), Charset::Ansi),
            ("Beta".to_string(), Charset::Ansi),
            ("Beta Bold".to_string(), Charset::Ansi),
        ]
    );
    assert_eq!(info.catalog().len(), 3);
}

#[test]
fn font_data_follows_offsets() {
    let dir = font_tree();
    let (mut info, _) = scanned(dir.path());
    let alpha_len = fs::metadata(dir.path().join("a/Alpha.ttf")).unwrap().len() as usize;
    let ttc_len = fs::metadata(dir.path().join("b/pair.ttc")).unwrap().len() as usize;

    let alpha = info.get_font("Alpha").unwrap();
    assert_eq!(info.get_font_data(alpha, 0, &mut []), alpha_len);
    assert_eq!(info.get_font_data(alpha, TABLE_TTCF, &mut []), 0);

    let bold = info.get_font("Beta Bold").unwrap();
    assert_eq!(info.get_font_data(bold, 0, &mut []), 0);
    assert_eq!(info.get_font_data(bold, TABLE_TTCF, &mut []), ttc_len);

    let name_len = info.get_font_data(bold, TABLE_NAME, &mut []);
    let expected = name_table("Beta", "Bold");
    assert_eq!(name_len, expected.len());
    let mut buf = vec![0; name_len];
    assert_eq!(info.get_font_data(bold, TABLE_NAME, &mut buf), name_len);
    assert_eq!(buf, expected);

    let mut small = [0_u8; 4];
    assert_eq!(info.get_font_data(bold, TABLE_NAME, &mut small), name_len);
    assert_eq!(small, [0; 4], "short buffers are left untouched");
}

#[test]
fn manager_resolves_installed_collection_face() {
    let dir = font_tree();
    let mut manager = FontManager::new(FontManagerOptions::default().with_paths([dir.path()]));
    let ttc_len = fs::metadata(dir.path().join("b/pair.ttc")).unwrap().len() as usize;

    let mut subst = SubstFont::new();
    let face = manager
        .find_subst_font("Beta,Bold", false, FontStyleFlags::NORMAL, 0, 0, 0, &mut subst)
        .unwrap();
    assert_eq!(subst.family, "Beta Bold");
    assert_eq!(face.data().len(), ttc_len);
    assert_eq!(subst.weight, FW_BOLD, "the face has no bold style bits");

    let mut again = SubstFont::new();
    let second = manager
        .find_subst_font("Beta", false, FontStyleFlags::NORMAL, 0, 0, 0, &mut again)
        .unwrap();
    assert_eq!(again.family, "Beta");
    assert_eq!(face.data().id(), second.data().id(), "collection data is shared");
    assert_eq!(manager.font_desc_cache().len(), 1);
}

#[test]
fn cjk_requests_fall_back_to_a_face_with_the_charset() {
    let dir = font_tree();
    let mut manager = FontManager::new(FontManagerOptions::default().with_paths([dir.path()]));
    let mut subst = SubstFont::new();
    let face = manager
        .find_subst_font("MSGothic", false, FontStyleFlags::NORMAL, 0, 0, 932, &mut subst)
        .unwrap();
    assert_eq!(subst.family, "Alpha");
    assert_eq!(subst.charset, Charset::ShiftJis);
    assert!(subst.subst_cjk);
    assert_eq!(face.index(), 0);
    assert_eq!(manager.mapper().face_size(), 4);
}

#[test]
fn missing_directories_are_skipped() {
    let dir = font_tree();
    let mut info = FolderFontInfo::new();
    info.add_path(dir.path().join("missing"));
    let mut sink = InstalledFonts::new();
    assert!(info.enum_font_list(&mut sink));
    assert!(sink.is_empty());
    assert!(info.catalog().is_empty());
}
