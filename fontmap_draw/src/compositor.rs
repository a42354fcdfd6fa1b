// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row compositing between pixel formats.
//!
//! A [`ScanlineCompositor`] is configured once per draw call with the source
//! and destination formats, then fed one scanline at a time. Every source
//! kind is reduced to a [`Bgra`] pixel with an effective alpha, which is then
//! written with the rules of the destination format:
//!
//! - destinations with alpha (`Argb`, or an alpha plane) accumulate coverage
//!   and weigh the blend result by the backdrop alpha;
//! - opaque colour destinations merge the blend result by the source alpha;
//! - gray destinations blend luma;
//! - mask destinations take the union of the alphas.

#![allow(
    clippy::cast_possible_truncation,
    reason = "channel arithmetic stays within 0..=255 before narrowing"
)]

use alloc::vec::Vec;
use core::fmt;

use fontmap::{Error, Result};

use crate::bitmap::PixelFormat;
use crate::blend::{alpha_merge, alpha_union, blend, blend_rgb, gray, BlendMode, Rgb};
use crate::color::{argb, argb_components, cmyk_to_rgb, Bgra, ColorTransform};

/// Source palette, prepared for the destination.
#[derive(Clone, Debug, PartialEq, Eq)]
enum SourcePalette {
    None,
    Gray(Vec<u8>),
    Argb(Vec<u32>),
}

#[derive(Copy, Clone, Debug)]
struct MaskColor {
    a: u8,
    r: u8,
    g: u8,
    b: u8,
}

struct State<'a> {
    dest: PixelFormat,
    src: PixelFormat,
    blend: BlendMode,
    clip_has_mask: bool,
    rgb_byte_order: bool,
    dest_alpha_plane: bool,
    mask: MaskColor,
    palette: SourcePalette,
    transform: Option<&'a dyn ColorTransform>,
}

/// Composites scanlines of one source format onto one destination format.
///
/// Call [`init`](Self::init) before any line operation. Line operations on a
/// compositor that was never initialized, or whose last `init` failed, do
/// nothing.
#[derive(Default)]
pub struct ScanlineCompositor<'a> {
    state: Option<State<'a>>,
}

impl fmt::Debug for ScanlineCompositor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ScanlineCompositor");
        if let Some(state) = &self.state {
            s.field("dest", &state.dest)
                .field("src", &state.src)
                .field("blend", &state.blend)
                .field("rgb_byte_order", &state.rgb_byte_order)
                .field("dest_alpha_plane", &state.dest_alpha_plane)
                .field("transform", &state.transform);
        }
        s.finish_non_exhaustive()
    }
}

impl<'a> ScanlineCompositor<'a> {
    /// Creates an uninitialized compositor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true after a successful [`init`](Self::init).
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Configures the compositor.
    ///
    /// - `src_palette` applies to palette sources; `None` selects the
    ///   default black and white or gray ramp.
    /// - `mask_color` is the `0xAARRGGBB` colour painted through mask
    ///   sources.
    /// - `clip_has_mask` announces that line calls will pass clip scans.
    /// - `rgb_byte_order` stores destination pixels as RGB rather than BGR.
    /// - `dest_has_alpha_plane` announces a separate destination alpha plane.
    /// - `transform` converts source colours before blending.
    ///
    /// Fails with [`Error::UnsupportedFormat`] for 1bpp or CMYK
    /// destinations, RGB byte order on 8bpp destinations, alpha planes on
    /// anything but `Rgb` and `Rgb32`, and transforms whose component count
    /// does not match the source.
    pub fn init(
        &mut self,
        dest_format: PixelFormat,
        src_format: PixelFormat,
        src_palette: Option<&[u32]>,
        mask_color: u32,
        blend_mode: BlendMode,
        clip_has_mask: bool,
        rgb_byte_order: bool,
        dest_has_alpha_plane: bool,
        transform: Option<&'a dyn ColorTransform>,
    ) -> Result<()> {
        self.state = None;
        if matches!(
            dest_format,
            PixelFormat::OneBppRgb | PixelFormat::OneBppMask | PixelFormat::Cmyk
        ) {
            return Err(Error::UnsupportedFormat);
        }
        if rgb_byte_order && dest_format.bits_per_pixel() == 8 {
            return Err(Error::UnsupportedFormat);
        }
        if dest_has_alpha_plane && !matches!(dest_format, PixelFormat::Rgb | PixelFormat::Rgb32)
        {
            return Err(Error::UnsupportedFormat);
        }
        if let Some(transform) = transform {
            let expected = match src_format {
                PixelFormat::Cmyk => Some(4),
                PixelFormat::Rgb | PixelFormat::Rgb32 | PixelFormat::Argb => Some(3),
                PixelFormat::OneBppRgb | PixelFormat::EightBppRgb => Some(3),
                PixelFormat::OneBppMask | PixelFormat::EightBppMask => None,
            };
            if expected.is_some_and(|n| n != transform.source_components()) {
                return Err(Error::UnsupportedFormat);
            }
        }

        let (a, mut r, g, b) = argb_components(mask_color);
        if dest_format == PixelFormat::EightBppRgb {
            r = gray(r, g, b);
        }
        let mask = MaskColor { a, r, g, b };

        let palette = match src_format {
            PixelFormat::OneBppRgb | PixelFormat::EightBppRgb
                if dest_format != PixelFormat::EightBppMask =>
            {
                prepare_palette(dest_format, src_format, src_palette, transform)
            }
            _ => SourcePalette::None,
        };

        self.state = Some(State {
            dest: dest_format,
            src: src_format,
            blend: blend_mode,
            clip_has_mask,
            rgb_byte_order,
            dest_alpha_plane: dest_has_alpha_plane,
            mask,
            palette,
            transform,
        });
        Ok(())
    }

    fn state(&self) -> Option<&State<'a>> {
        debug_assert!(
            self.state.is_some(),
            "scanline compositor used before a successful init"
        );
        self.state.as_ref()
    }

    /// Composites a row of an `Rgb`, `Rgb32`, `Argb` or `Cmyk` source.
    ///
    /// `src_alpha` is the row of the source's alpha plane, if it has one.
    /// Widths are clamped to the shortest scan passed in.
    pub fn composite_rgb_bitmap_line(
        &self,
        dest_scan: &mut [u8],
        src_scan: &[u8],
        width: usize,
        clip_scan: Option<&[u8]>,
        src_alpha: Option<&[u8]>,
        mut dest_alpha: Option<&mut [u8]>,
    ) {
        let Some(state) = self.state() else {
            return;
        };
        let src_bpp = state.src.bytes_per_pixel();
        let width = state.clamp_width(width, dest_scan, clip_scan, dest_alpha.as_deref());
        let width = width.min(src_scan.len() / src_bpp.max(1));
        let width = src_alpha.map_or(width, |scan| width.min(scan.len()));

        let mut emit = |col: usize, px: Bgra| {
            let a = scale(px.a, clip_scan.map(|scan| scan[col]));
            state.write(dest_scan, dest_alpha.as_deref_mut(), col, Bgra { a, ..px }, state.blend);
        };
        if state.src == PixelFormat::Argb {
            let pixels: &[Bgra] = bytemuck::cast_slice(&src_scan[..width * 4]);
            for (col, px) in pixels.iter().enumerate() {
                emit(col, state.transformed(*px));
            }
        } else {
            for col in 0..width {
                let bytes = &src_scan[col * src_bpp..(col + 1) * src_bpp];
                let a = src_alpha.map_or(255, |scan| scan[col]);
                let px = match state.src {
                    PixelFormat::Cmyk => {
                        let rgb = match state.transform {
                            Some(transform) => transform.transform(bytes),
                            None => cmyk_to_rgb(bytes[0], bytes[1], bytes[2], bytes[3]),
                        };
                        Bgra::default().with_rgb(rgb)
                    }
                    _ => state.transformed(Bgra::new(bytes[0], bytes[1], bytes[2], 0)),
                };
                emit(col, Bgra { a, ..px });
            }
        }
    }

    /// Composites a row of a 1bpp or 8bpp palette source.
    ///
    /// `src_scan` is the whole source row and `src_left` the first pixel to
    /// read. `src_alpha` starts at `src_left`.
    pub fn composite_pal_bitmap_line(
        &self,
        dest_scan: &mut [u8],
        src_scan: &[u8],
        src_left: usize,
        width: usize,
        clip_scan: Option<&[u8]>,
        src_alpha: Option<&[u8]>,
        mut dest_alpha: Option<&mut [u8]>,
    ) {
        let Some(state) = self.state() else {
            return;
        };
        let one_bit = state.src.bits_per_pixel() == 1;
        let available = if one_bit {
            (src_scan.len() * 8).saturating_sub(src_left)
        } else {
            src_scan.len().saturating_sub(src_left)
        };
        let width = state
            .clamp_width(width, dest_scan, clip_scan, dest_alpha.as_deref())
            .min(available);
        let width = src_alpha.map_or(width, |scan| width.min(scan.len()));
        // Palette colours are opaque and ignore the blend mode on colour
        // destinations.
        let blend_mode = match state.dest {
            PixelFormat::EightBppRgb => state.blend,
            _ => BlendMode::Normal,
        };
        for col in 0..width {
            let index = if one_bit {
                usize::from(bit(src_scan, src_left + col))
            } else {
                usize::from(src_scan[src_left + col])
            };
            let mut px = state.palette_color(index);
            px.a = scale(
                src_alpha.map_or(255, |scan| scan[col]),
                clip_scan.map(|scan| scan[col]),
            );
            state.write(dest_scan, dest_alpha.as_deref_mut(), col, px, blend_mode);
        }
    }

    /// Paints the mask colour through a row of 8bpp coverage.
    pub fn composite_byte_mask_line(
        &self,
        dest_scan: &mut [u8],
        src_scan: &[u8],
        width: usize,
        clip_scan: Option<&[u8]>,
        mut dest_alpha: Option<&mut [u8]>,
    ) {
        let Some(state) = self.state() else {
            return;
        };
        let width = state
            .clamp_width(width, dest_scan, clip_scan, dest_alpha.as_deref())
            .min(src_scan.len());
        for (col, &coverage) in src_scan[..width].iter().enumerate() {
            let px = state.mask_pixel(coverage, clip_scan.map(|scan| scan[col]));
            state.write(dest_scan, dest_alpha.as_deref_mut(), col, px, state.blend);
        }
    }

    /// Paints the mask colour through a row of 1bpp coverage starting at
    /// bit `src_left`.
    ///
    /// Pixels whose bit is clear are left untouched.
    pub fn composite_bit_mask_line(
        &self,
        dest_scan: &mut [u8],
        src_scan: &[u8],
        src_left: usize,
        width: usize,
        clip_scan: Option<&[u8]>,
        mut dest_alpha: Option<&mut [u8]>,
    ) {
        let Some(state) = self.state() else {
            return;
        };
        let width = state
            .clamp_width(width, dest_scan, clip_scan, dest_alpha.as_deref())
            .min((src_scan.len() * 8).saturating_sub(src_left));
        for col in 0..width {
            if !bit(src_scan, src_left + col) {
                continue;
            }
            let px = state.mask_pixel(255, clip_scan.map(|scan| scan[col]));
            state.write(dest_scan, dest_alpha.as_deref_mut(), col, px, state.blend);
        }
    }
}

impl State<'_> {
    fn clamp_width(
        &self,
        width: usize,
        dest_scan: &[u8],
        clip_scan: Option<&[u8]>,
        dest_alpha: Option<&[u8]>,
    ) -> usize {
        debug_assert!(
            clip_scan.is_none() || self.clip_has_mask,
            "clip scan passed to a compositor initialized without a clip mask"
        );
        debug_assert!(
            dest_alpha.is_none() || self.dest_alpha_plane,
            "alpha plane passed to a compositor initialized without one"
        );
        let mut width = width.min(dest_scan.len() / self.dest.bytes_per_pixel());
        if let Some(scan) = clip_scan {
            width = width.min(scan.len());
        }
        if let Some(scan) = dest_alpha {
            width = width.min(scan.len());
        }
        width
    }

    fn transformed(&self, px: Bgra) -> Bgra {
        match self.transform {
            Some(transform) => px.with_rgb(transform.transform(&[px.r, px.g, px.b])),
            None => px,
        }
    }

    fn palette_color(&self, index: usize) -> Bgra {
        match &self.palette {
            SourcePalette::Gray(grays) => {
                let v = grays.get(index).copied().unwrap_or(0);
                Bgra::new(v, v, v, 255)
            }
            SourcePalette::Argb(colors) => {
                Bgra::from_argb(colors.get(index).copied().unwrap_or(0xff00_0000))
            }
            SourcePalette::None => Bgra::new(0, 0, 0, 255),
        }
    }

    fn mask_pixel(&self, coverage: u8, clip: Option<u8>) -> Bgra {
        let alpha = u32::from(self.mask.a) * u32::from(coverage);
        let alpha = match clip {
            Some(clip) => alpha * u32::from(clip) / 255,
            None => alpha,
        };
        let MaskColor { r, g, b, .. } = self.mask;
        if self.dest == PixelFormat::EightBppRgb {
            // The gray value was stored in `r` by `init`.
            Bgra::new(r, r, r, (alpha / 255) as u8)
        } else {
            Bgra::new(b, g, r, (alpha / 255) as u8)
        }
    }

    fn write(
        &self,
        dest_scan: &mut [u8],
        dest_alpha: Option<&mut [u8]>,
        col: usize,
        src: Bgra,
        blend_mode: BlendMode,
    ) {
        match self.dest {
            PixelFormat::EightBppMask => {
                let back = &mut dest_scan[col];
                if *back == 0 {
                    *back = src.a;
                } else if src.a != 0 {
                    *back = alpha_union(*back, src.a);
                }
            }
            PixelFormat::EightBppRgb => {
                if src.a == 0 {
                    return;
                }
                let back = &mut dest_scan[col];
                let value = gray(src.r, src.g, src.b);
                let value = if blend_mode.is_non_separable() {
                    if blend_mode == BlendMode::Luminosity {
                        value
                    } else {
                        *back
                    }
                } else {
                    blend(blend_mode, *back, value)
                };
                *back = alpha_merge(*back, value, src.a);
            }
            PixelFormat::Argb => {
                let (color, alpha) = dest_scan[col * 4..col * 4 + 4].split_at_mut(3);
                self.write_with_alpha(color, &mut alpha[0], src, blend_mode);
            }
            _ => {
                let bpp = self.dest.bytes_per_pixel();
                let color = &mut dest_scan[col * bpp..col * bpp + 3];
                match dest_alpha {
                    Some(plane) => self.write_with_alpha(color, &mut plane[col], src, blend_mode),
                    None => self.write_opaque(color, src, blend_mode),
                }
            }
        }
    }

    fn write_with_alpha(&self, color: &mut [u8], back_alpha: &mut u8, src: Bgra, mode: BlendMode) {
        if src.a == 0 {
            return;
        }
        let back_a = *back_alpha;
        if back_a == 0 {
            self.store(color, Rgb::new(src.r, src.g, src.b));
            *back_alpha = src.a;
            return;
        }
        let dest_a = alpha_union(back_a, src.a);
        let ratio = (u32::from(src.a) * 255 / u32::from(dest_a)) as u8;
        let back = self.load(color);
        let source = Rgb::new(src.r, src.g, src.b);
        let blended = if mode == BlendMode::Normal {
            source
        } else {
            let mixed = blend_rgb(mode, back, source);
            Rgb {
                r: alpha_merge(src.r, channel(mixed.r), back_a).into(),
                g: alpha_merge(src.g, channel(mixed.g), back_a).into(),
                b: alpha_merge(src.b, channel(mixed.b), back_a).into(),
            }
        };
        self.store(color, merge_rgb(back, blended, ratio));
        *back_alpha = dest_a;
    }

    fn write_opaque(&self, color: &mut [u8], src: Bgra, mode: BlendMode) {
        if src.a == 0 {
            return;
        }
        let source = Rgb::new(src.r, src.g, src.b);
        if src.a == 255 && mode == BlendMode::Normal {
            self.store(color, source);
            return;
        }
        let back = self.load(color);
        let blended = if mode == BlendMode::Normal {
            source
        } else {
            blend_rgb(mode, back, source)
        };
        self.store(color, merge_rgb(back, blended, src.a));
    }

    fn load(&self, color: &[u8]) -> Rgb {
        if self.rgb_byte_order {
            Rgb::new(color[0], color[1], color[2])
        } else {
            Rgb::new(color[2], color[1], color[0])
        }
    }

    fn store(&self, color: &mut [u8], rgb: Rgb) {
        let (r, g, b) = (channel(rgb.r), channel(rgb.g), channel(rgb.b));
        if self.rgb_byte_order {
            color.copy_from_slice(&[r, g, b]);
        } else {
            color.copy_from_slice(&[b, g, r]);
        }
    }
}

fn prepare_palette(
    dest: PixelFormat,
    src: PixelFormat,
    palette: Option<&[u32]>,
    transform: Option<&dyn ColorTransform>,
) -> SourcePalette {
    let count = if src.bits_per_pixel() == 1 { 2 } else { 256 };
    let colors: Vec<u32> = (0..count)
        .map(|i| {
            let color = palette
                .and_then(|p| p.get(i).copied())
                .unwrap_or_else(|| default_palette_entry(src, i));
            match transform {
                Some(transform) => {
                    let (a, r, g, b) = argb_components(color);
                    let [r, g, b] = transform.transform(&[r, g, b]);
                    argb(a, r, g, b)
                }
                None => color,
            }
        })
        .collect();
    if dest == PixelFormat::EightBppRgb {
        SourcePalette::Gray(
            colors
                .iter()
                .map(|&color| {
                    let (_, r, g, b) = argb_components(color);
                    gray(r, g, b)
                })
                .collect(),
        )
    } else {
        SourcePalette::Argb(colors)
    }
}

/// Returns entry `index` of the palette a palette bitmap has when none was
/// set: black and white for 1bpp, a gray ramp for 8bpp.
pub(crate) fn default_palette_entry(format: PixelFormat, index: usize) -> u32 {
    if format.bits_per_pixel() == 1 {
        if index == 0 {
            0xff00_0000
        } else {
            0xffff_ffff
        }
    } else {
        let v = index.min(255) as u8;
        argb(0, v, v, v)
    }
}

fn bit(scan: &[u8], index: usize) -> bool {
    scan[index / 8] & (0x80 >> (index % 8)) != 0
}

fn scale(alpha: u8, clip: Option<u8>) -> u8 {
    match clip {
        Some(clip) => (u32::from(alpha) * u32::from(clip) / 255) as u8,
        None => alpha,
    }
}

fn channel(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

fn merge_rgb(back: Rgb, src: Rgb, alpha: u8) -> Rgb {
    let merge = |b: i32, s: i32| i32::from(alpha_merge(channel(b), channel(s), alpha));
    Rgb {
        r: merge(back.r, src.r),
        g: merge(back.g, src.g),
        b: merge(back.b, src.b),
    }
}
