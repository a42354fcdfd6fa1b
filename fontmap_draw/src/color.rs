// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Packed colours and source colour conversion.

use core::fmt;

use bytemuck::{Pod, Zeroable};

/// Packs a colour as `0xAARRGGBB`.
#[inline]
pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Unpacks a `0xAARRGGBB` colour into `(a, r, g, b)`.
#[inline]
pub const fn argb_components(color: u32) -> (u8, u8, u8, u8) {
    let [a, r, g, b] = color.to_be_bytes();
    (a, r, g, b)
}

/// A pixel in the byte order of [`PixelFormat::Argb`](crate::PixelFormat::Argb)
/// scanlines.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug, Pod, Zeroable)]
#[repr(C)]
pub struct Bgra {
    /// Blue.
    pub b: u8,
    /// Green.
    pub g: u8,
    /// Red.
    pub r: u8,
    /// Alpha.
    pub a: u8,
}

impl Bgra {
    /// Creates a pixel.
    pub const fn new(b: u8, g: u8, r: u8, a: u8) -> Self {
        Self { b, g, r, a }
    }

    /// Unpacks a `0xAARRGGBB` colour.
    pub const fn from_argb(color: u32) -> Self {
        let (a, r, g, b) = argb_components(color);
        Self { b, g, r, a }
    }

    /// Packs the pixel as `0xAARRGGBB`.
    pub const fn to_argb(self) -> u32 {
        argb(self.a, self.r, self.g, self.b)
    }

    pub(crate) fn with_rgb(self, [r, g, b]: [u8; 3]) -> Self {
        Self { b, g, r, a: self.a }
    }
}

/// Converts source pixels to device RGB before blending.
///
/// This is the seam for colour management: an implementation can wrap an
/// ICC transform. Without one, CMYK sources use [`cmyk_to_rgb`] and RGB
/// sources are used as they are.
pub trait ColorTransform {
    /// Number of components in a source pixel.
    fn source_components(&self) -> usize;

    /// Converts one pixel whose components are given in colour space order
    /// (`r, g, b` or `c, m, y, k`) and returns `[r, g, b]`.
    fn transform(&self, src: &[u8]) -> [u8; 3];
}

impl fmt::Debug for dyn ColorTransform + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorTransform")
            .field("source_components", &self.source_components())
            .finish_non_exhaustive()
    }
}

/// Approximates a CMYK colour in RGB without a colour profile.
#[inline]
pub fn cmyk_to_rgb(c: u8, m: u8, y: u8, k: u8) -> [u8; 3] {
    let k = 255 - u32::from(k);
    let channel = |v: u8| ((255 - u32::from(v)) * k / 255) as u8;
    [channel(c), channel(m), channel(y)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing() {
        let color = argb(0x80, 0x10, 0x20, 0x30);
        assert_eq!(color, 0x8010_2030);
        assert_eq!(argb_components(color), (0x80, 0x10, 0x20, 0x30));
        let px = Bgra::from_argb(color);
        assert_eq!(px, Bgra::new(0x30, 0x20, 0x10, 0x80));
        assert_eq!(px.to_argb(), color);
        assert_eq!(bytemuck::bytes_of(&px), &[0x30, 0x20, 0x10, 0x80]);
    }

    #[test]
    fn cmyk() {
        assert_eq!(cmyk_to_rgb(0, 0, 0, 0), [255, 255, 255]);
        assert_eq!(cmyk_to_rgb(0, 0, 0, 255), [0, 0, 0]);
        assert_eq!(cmyk_to_rgb(255, 0, 0, 0), [0, 255, 255]);
        assert_eq!(cmyk_to_rgb(0, 128, 0, 128), [127, 63, 127]);
    }
}
