// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Blend modes on 8-bit channels.
//!
//! All arithmetic is integer and truncating, so results are reproducible
//! bit for bit across platforms.

#![allow(
    clippy::cast_possible_truncation,
    reason = "channel arithmetic stays within 0..=255 before narrowing"
)]

/// How a source colour combines with the backdrop.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub enum BlendMode {
    /// The source replaces the backdrop.
    #[default]
    Normal,
    /// Product of the channels.
    Multiply,
    /// Inverse product of the inverted channels.
    Screen,
    /// Hard light with the layers swapped.
    Overlay,
    /// Per channel minimum.
    Darken,
    /// Per channel maximum.
    Lighten,
    /// Brightens the backdrop towards the source.
    ColorDodge,
    /// Darkens the backdrop towards the source.
    ColorBurn,
    /// Multiply or screen depending on the source.
    HardLight,
    /// Darken or lighten depending on the source.
    SoftLight,
    /// Absolute difference.
    Difference,
    /// Difference with lower contrast.
    Exclusion,
    /// Source hue with backdrop saturation and luminosity.
    Hue,
    /// Source saturation with backdrop hue and luminosity.
    Saturation,
    /// Source hue and saturation with backdrop luminosity.
    Color,
    /// Source luminosity with backdrop hue and saturation.
    Luminosity,
}

impl BlendMode {
    /// Returns true for the modes that mix all channels together.
    pub fn is_non_separable(self) -> bool {
        matches!(self, Self::Hue | Self::Saturation | Self::Color | Self::Luminosity)
    }
}

/// An RGB triple wide enough for intermediate blend results.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub struct Rgb {
    /// Red.
    pub r: i32,
    /// Green.
    pub g: i32,
    /// Blue.
    pub b: i32,
}

impl Rgb {
    /// Creates a triple from 8-bit channels.
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r.into(),
            g: g.into(),
            b: b.into(),
        }
    }

    fn min(self) -> i32 {
        self.r.min(self.g).min(self.b)
    }

    fn max(self) -> i32 {
        self.r.max(self.g).max(self.b)
    }

    fn map(self, f: impl Fn(i32) -> i32) -> Self {
        Self {
            r: f(self.r),
            g: f(self.g),
            b: f(self.b),
        }
    }
}

/// Merges `src` over `back` with coverage `alpha`.
#[inline]
pub fn alpha_merge(back: u8, src: u8, alpha: u8) -> u8 {
    let (back, src, alpha) = (u32::from(back), u32::from(src), u32::from(alpha));
    ((back * (255 - alpha) + src * alpha) / 255) as u8
}

/// Returns the coverage of two overlapping alphas.
#[inline]
pub fn alpha_union(dest: u8, src: u8) -> u8 {
    let (dest, src) = (u32::from(dest), u32::from(src));
    (dest + src - dest * src / 255) as u8
}

/// Converts a colour to gray with the integer luma weights 30/59/11.
#[inline]
pub fn gray(r: u8, g: u8, b: u8) -> u8 {
    ((u32::from(r) * 30 + u32::from(g) * 59 + u32::from(b) * 11) / 100) as u8
}

/// Blends one channel with a separable mode.
///
/// Non-separable modes return `src`; use [`blend_rgb`] for those.
pub fn blend(mode: BlendMode, back: u8, src: u8) -> u8 {
    let (b, s) = (i32::from(back), i32::from(src));
    let value = match mode {
        BlendMode::Multiply => s * b / 255,
        BlendMode::Screen => s + b - s * b / 255,
        BlendMode::Overlay => return blend(BlendMode::HardLight, src, back),
        BlendMode::Darken => s.min(b),
        BlendMode::Lighten => s.max(b),
        BlendMode::ColorDodge => {
            if s == 255 {
                s
            } else {
                (b * 255 / (255 - s)).min(255)
            }
        }
        BlendMode::ColorBurn => {
            if s == 0 {
                0
            } else {
                255 - ((255 - b) * 255 / s).min(255)
            }
        }
        BlendMode::HardLight => {
            if s < 128 {
                s * b * 2 / 255
            } else {
                return blend(BlendMode::Screen, back, (2 * s - 255) as u8);
            }
        }
        BlendMode::SoftLight => {
            if s < 128 {
                b - (255 - 2 * s) * b * (255 - b) / 255 / 255
            } else {
                b + (2 * s - 255) * (i32::from(SOFT_LIGHT_D[usize::from(back)]) - b) / 255
            }
        }
        BlendMode::Difference => (b - s).abs(),
        BlendMode::Exclusion => b + s - 2 * b * s / 255,
        _ => s,
    };
    value as u8
}

/// Blends a pixel with a non-separable mode.
///
/// Separable modes blend each channel with [`blend`].
pub fn blend_rgb(mode: BlendMode, back: Rgb, src: Rgb) -> Rgb {
    match mode {
        BlendMode::Hue => set_lum(set_sat(src, sat(back)), lum(back)),
        BlendMode::Saturation => set_lum(set_sat(back, sat(src)), lum(back)),
        BlendMode::Color => set_lum(src, lum(back)),
        BlendMode::Luminosity => set_lum(back, lum(src)),
        _ => Rgb {
            r: blend(mode, back.r as u8, src.r as u8).into(),
            g: blend(mode, back.g as u8, src.g as u8).into(),
            b: blend(mode, back.b as u8, src.b as u8).into(),
        },
    }
}

fn lum(c: Rgb) -> i32 {
    (c.r * 30 + c.g * 59 + c.b * 11) / 100
}

fn clip_color(mut c: Rgb) -> Rgb {
    let l = lum(c);
    let n = c.min();
    let x = c.max();
    if n < 0 {
        c = c.map(|v| l + (v - l) * l / (l - n));
    }
    if x > 255 {
        c = c.map(|v| l + (v - l) * (255 - l) / (x - l));
    }
    c
}

fn set_lum(c: Rgb, l: i32) -> Rgb {
    let d = l - lum(c);
    clip_color(c.map(|v| v + d))
}

fn sat(c: Rgb) -> i32 {
    c.max() - c.min()
}

fn set_sat(c: Rgb, s: i32) -> Rgb {
    let min = c.min();
    let max = c.max();
    if min == max {
        return Rgb::default();
    }
    c.map(|v| (v - min) * s / (max - min))
}

/// The soft light `D(x)` curve, scaled to bytes and truncated.
static SOFT_LIGHT_D: [u8; 256] = {
    let mut table = [0_u8; 256];
    let mut i = 0;
    while i < 256 {
        let x = i as f64 / 255.0;
        let d = if x <= 0.25 {
            ((16.0 * x - 12.0) * x + 4.0) * x
        } else {
            sqrt(x)
        };
        table[i] = (d * 255.0) as u8;
        i += 1;
    }
    table
};

/// Newton iteration, usable in a const context.
const fn sqrt(x: f64) -> f64 {
    let mut guess = if x < 1.0 { 1.0 } else { x };
    let mut i = 0;
    while i < 64 {
        guess = 0.5 * (guess + x / guess);
        i += 1;
    }
    guess
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_and_union() {
        assert_eq!(alpha_merge(0, 255, 255), 255);
        assert_eq!(alpha_merge(200, 100, 0), 200);
        assert_eq!(alpha_merge(0, 255, 128), 128);
        assert_eq!(alpha_union(100, 100), 161);
        assert_eq!(alpha_union(0, 77), 77);
        assert_eq!(alpha_union(255, 3), 255);
    }

    #[test]
    fn separable_formulas() {
        assert_eq!(blend(BlendMode::Normal, 10, 200), 200);
        assert_eq!(blend(BlendMode::Multiply, 128, 128), 64);
        assert_eq!(blend(BlendMode::Screen, 128, 128), 192);
        assert_eq!(blend(BlendMode::Darken, 10, 200), 10);
        assert_eq!(blend(BlendMode::Lighten, 10, 200), 200);
        assert_eq!(blend(BlendMode::Difference, 10, 200), 190);
        assert_eq!(blend(BlendMode::Exclusion, 255, 255), 0);
        assert_eq!(blend(BlendMode::ColorDodge, 100, 255), 255);
        assert_eq!(blend(BlendMode::ColorDodge, 100, 155), 255);
        assert_eq!(blend(BlendMode::ColorDodge, 50, 155), 127);
        assert_eq!(blend(BlendMode::ColorBurn, 100, 0), 0);
        assert_eq!(blend(BlendMode::ColorBurn, 200, 255), 200);
        assert_eq!(blend(BlendMode::HardLight, 100, 64), 50);
        assert_eq!(blend(BlendMode::HardLight, 100, 200), 189);
        assert_eq!(blend(BlendMode::Overlay, 64, 100), 50);
    }

    #[test]
    fn soft_light() {
        assert_eq!(SOFT_LIGHT_D[0], 0);
        assert_eq!(SOFT_LIGHT_D[255], 255);
        assert_eq!(blend(BlendMode::SoftLight, 0, 200), 0);
        assert_eq!(blend(BlendMode::SoftLight, 255, 10), 255);
        assert_eq!(blend(BlendMode::SoftLight, 128, 128), 128);
        assert!(blend(BlendMode::SoftLight, 128, 255) > 128, "light sources brighten");
        assert!(blend(BlendMode::SoftLight, 128, 0) < 128, "dark sources darken");
    }

    #[test]
    fn non_separable() {
        let red = Rgb::new(255, 0, 0);
        let gray = Rgb::new(128, 128, 128);
        assert_eq!(blend_rgb(BlendMode::Luminosity, red, gray), Rgb { r: 255, g: 75, b: 75 });
        assert_eq!(blend_rgb(BlendMode::Saturation, red, gray), Rgb { r: 76, g: 76, b: 76 });
        assert_eq!(
            blend_rgb(BlendMode::Hue, gray, red),
            Rgb { r: 128, g: 128, b: 128 },
            "a gray backdrop has no saturation to lend"
        );
        assert_eq!(
            blend_rgb(BlendMode::Color, gray, red),
            Rgb { r: 255, g: 75, b: 75 },
            "clipped back into range around the backdrop luminosity"
        );
        assert!(BlendMode::Hue.is_non_separable());
        assert!(!BlendMode::Multiply.is_non_separable());
        assert_eq!(blend_rgb(BlendMode::Multiply, red, gray), Rgb { r: 128, g: 0, b: 0 });
    }
}
