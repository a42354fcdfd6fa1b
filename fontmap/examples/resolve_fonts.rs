// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Print the face chosen for each font name given on the command line.
//!
//! Fonts are searched for in the system directories and in the directories
//! listed in `FONTMAP_FONT_PATH`.

use fontmap::{FontManager, FontManagerOptions, FontStyleFlags, SubstFont};

fn main() {
    let options = FontManagerOptions::default()
        .with_system_paths()
        .with_env_paths("FONTMAP_FONT_PATH");
    let mut manager = FontManager::new(options);

    let names: Vec<String> = std::env::args().skip(1).collect();
    let names = if names.is_empty() {
        ["Helvetica", "Times-BoldItalic", "Arial,Bold", "MS Gothic"]
            .map(String::from)
            .to_vec()
    } else {
        names
    };

    for name in names {
        let mut subst = SubstFont::new();
        let face =
            manager.find_subst_font(&name, false, FontStyleFlags::NORMAL, 0, 0, 0, &mut subst);
        match face {
            Some(face) => println!(
                "{name}: {} (face {}), weight {}, italic angle {}",
                subst.family,
                face.index(),
                subst.weight,
                subst.italic_angle
            ),
            None => println!("{name}: no face"),
        }
    }
}
