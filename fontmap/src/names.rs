// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Name normalization helpers.

use alloc::string::String;
use smallvec::SmallVec;

/// Key for case-insensitive lookup of face names.
#[derive(Default)]
pub(crate) struct NameKey {
    data: SmallVec<[u8; 128]>,
}

impl NameKey {
    pub(crate) fn from_str(s: &str) -> Self {
        let mut res = Self::default();
        let mut buf = [0_u8; 4];
        for ch in s.chars() {
            for ch in ch.to_lowercase() {
                res.data
                    .extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            }
        }
        res
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Normalizes a face name for installed-font matching.
///
/// Spaces, hyphens and commas are removed, a `+` suffix is cut when it is not
/// the first character, and the result is lowercased.
pub fn normalize_name(name: &str) -> String {
    let mut norm: String = name
        .chars()
        .filter(|ch| !matches!(ch, ' ' | '-' | ','))
        .collect();
    if let Some(pos) = norm.find('+') {
        if pos > 0 {
            norm.truncate(pos);
        }
    }
    norm.make_ascii_lowercase();
    norm
}

/// Strips a six letter subset tag such as `ABCDEF+`.
pub fn remove_subset_prefix(name: &str) -> &str {
    let bytes = name.as_bytes();
    if bytes.len() > 6 && bytes[6] == b'+' && bytes[..6].iter().all(u8::is_ascii_uppercase) {
        &name[7..]
    } else {
        name
    }
}

/// Returns true when `name` contains `family` and the occurrence is not
/// followed by a lowercase ASCII letter.
///
/// `"Arial Bold"` matches `"Arial"`, `"Arialic"` does not.
pub fn family_name_matches(name: &str, family: &str) -> bool {
    let Some(pos) = name.find(family) else {
        return false;
    };
    match name.as_bytes().get(pos + family.len()) {
        Some(next) => !next.is_ascii_lowercase(),
        None => true,
    }
}

/// Returns true when the name has a `Narrow` or `Condensed` marker after its
/// first character.
pub fn is_narrow_name(name: &str) -> bool {
    ["Narrow", "Condensed"]
        .iter()
        .any(|marker| matches!(name.find(marker), Some(pos) if pos > 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_case_insensitive() {
        assert_eq!(
            NameKey::from_str("Bookshelf SYMBOL 7").as_bytes(),
            NameKey::from_str("bookshelf symbol 7").as_bytes()
        );
    }

    #[test]
    fn normalize() {
        assert_eq!(normalize_name("Times New-Roman,Bold"), "timesnewromanbold");
        assert_eq!(normalize_name("Arial+Extra"), "arial");
        assert_eq!(normalize_name("+Lead"), "+lead");
    }

    #[test]
    fn subset_prefix() {
        assert_eq!(remove_subset_prefix("ABCDEF+Arial"), "Arial");
        assert_eq!(remove_subset_prefix("ABCdEF+Arial"), "ABCdEF+Arial");
        assert_eq!(remove_subset_prefix("ABCDEF+"), "ABCDEF+");
    }

    #[test]
    fn family_match_respects_word_boundary() {
        assert!(family_name_matches("Bookshelf Symbol 7", "Bookshelf"));
        assert!(!family_name_matches("Bookshelf Symbol 7", "Book"));
        assert!(family_name_matches("Arial", "Arial"));
        assert!(!family_name_matches("Arial", "Times"));
    }

    #[test]
    fn narrow() {
        assert!(is_narrow_name("ArialNarrow"));
        assert!(is_narrow_name("Roboto Condensed"));
        assert!(!is_narrow_name("Narrow"));
    }
}
