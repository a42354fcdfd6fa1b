// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Device independent bitmaps.

#![allow(
    clippy::cast_possible_truncation,
    reason = "coordinates are clamped to the bitmap before narrowing"
)]

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use fontmap::{Error, Result};

use crate::blend::{alpha_merge, alpha_union, gray, BlendMode};
use crate::clip::{ClipRegion, IntRect};
use crate::color::{argb, argb_components, cmyk_to_rgb};
use crate::compositor::{default_palette_entry, ScanlineCompositor};

/// Pixel layout of a [`DibBitmap`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum PixelFormat {
    /// 1 bit palette index, most significant bit first.
    OneBppRgb,
    /// 1 bit coverage.
    OneBppMask,
    /// 8 bit palette index, or gray when there is no palette.
    EightBppRgb,
    /// 8 bit coverage.
    EightBppMask,
    /// 24 bit `b, g, r`.
    Rgb,
    /// 32 bit `b, g, r, x`.
    Rgb32,
    /// 32 bit `b, g, r, a`.
    Argb,
    /// 32 bit `c, m, y, k`. Only valid as a compositing source.
    Cmyk,
}

impl PixelFormat {
    /// Returns the number of bits per pixel.
    pub fn bits_per_pixel(self) -> u32 {
        match self {
            Self::OneBppRgb | Self::OneBppMask => 1,
            Self::EightBppRgb | Self::EightBppMask => 8,
            Self::Rgb => 24,
            Self::Rgb32 | Self::Argb | Self::Cmyk => 32,
        }
    }

    /// Returns the number of whole bytes per pixel, zero for 1bpp formats.
    pub fn bytes_per_pixel(self) -> usize {
        (self.bits_per_pixel() / 8) as usize
    }

    /// Returns true for coverage-only formats.
    pub fn is_mask(self) -> bool {
        matches!(self, Self::OneBppMask | Self::EightBppMask)
    }

    /// Returns true if pixels carry their own alpha.
    pub fn has_alpha(self) -> bool {
        self == Self::Argb
    }

    /// Returns true for palette formats.
    pub fn has_palette(self) -> bool {
        matches!(self, Self::OneBppRgb | Self::EightBppRgb)
    }
}

/// A bitmap with rows of `pitch` bytes, top row first.
#[derive(Clone, PartialEq)]
pub struct DibBitmap {
    width: u32,
    height: u32,
    pitch: usize,
    format: PixelFormat,
    buffer: Vec<u8>,
    alpha_mask: Option<Box<DibBitmap>>,
    palette: Option<Vec<u32>>,
}

impl fmt::Debug for DibBitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DibBitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pitch", &self.pitch)
            .field("format", &self.format)
            .field("alpha_mask", &self.alpha_mask.is_some())
            .field("palette", &self.palette.as_ref().map(Vec::len))
            .finish_non_exhaustive()
    }
}

/// Rows are padded to four bytes.
fn default_pitch(width: u32, format: PixelFormat) -> Option<usize> {
    let bits = u64::from(width) * u64::from(format.bits_per_pixel());
    usize::try_from(bits.checked_add(31)? / 32 * 4).ok()
}

impl DibBitmap {
    /// Creates a zeroed bitmap with the default pitch.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        Self::with_pitch(width, height, format, None)
    }

    /// Creates a zeroed bitmap.
    ///
    /// Fails with [`Error::UnsupportedFormat`] for empty dimensions or a
    /// pitch too small for a row, and with [`Error::ResourceLimitExceeded`]
    /// when the buffer size overflows.
    pub fn with_pitch(
        width: u32,
        height: u32,
        format: PixelFormat,
        pitch: Option<usize>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::UnsupportedFormat);
        }
        let min_pitch = (u64::from(width) * u64::from(format.bits_per_pixel())).div_ceil(8);
        let pitch = match pitch {
            Some(pitch) if (pitch as u64) < min_pitch => return Err(Error::UnsupportedFormat),
            Some(pitch) => pitch,
            None => default_pitch(width, format)
                .ok_or(Error::ResourceLimitExceeded { width, height })?,
        };
        let size = pitch
            .checked_mul(height as usize)
            .ok_or(Error::ResourceLimitExceeded { width, height })?;
        Ok(Self {
            width,
            height,
            pitch,
            format,
            buffer: vec![0; size],
            alpha_mask: None,
            palette: None,
        })
    }

    /// Returns the width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the number of bytes per row.
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// Returns the pixel format.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Returns the pixel data.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Returns the pixel data for writing.
    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    /// Returns row `y`, including padding.
    ///
    /// # Panics
    ///
    /// Panics if `y` is not less than the height.
    pub fn scanline(&self, y: u32) -> &[u8] {
        let start = y as usize * self.pitch;
        &self.buffer[start..start + self.pitch]
    }

    /// Returns row `y` for writing, including padding.
    ///
    /// # Panics
    ///
    /// Panics if `y` is not less than the height.
    pub fn scanline_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.pitch;
        &mut self.buffer[start..start + self.pitch]
    }

    /// Returns the separate alpha plane, if one was created.
    pub fn alpha_mask(&self) -> Option<&Self> {
        self.alpha_mask.as_deref()
    }

    /// Returns the separate alpha plane for writing.
    pub fn alpha_mask_mut(&mut self) -> Option<&mut Self> {
        self.alpha_mask.as_deref_mut()
    }

    /// Adds an opaque 8bpp alpha plane.
    ///
    /// Only `Rgb` and `Rgb32` bitmaps take a plane; others fail with
    /// [`Error::UnsupportedFormat`].
    pub fn create_alpha_mask(&mut self) -> Result<()> {
        if !matches!(self.format, PixelFormat::Rgb | PixelFormat::Rgb32) {
            return Err(Error::UnsupportedFormat);
        }
        let mut plane = Self::new(self.width, self.height, PixelFormat::EightBppMask)?;
        plane.buffer.fill(0xff);
        self.alpha_mask = Some(Box::new(plane));
        Ok(())
    }

    /// Returns the palette, if one was set.
    pub fn palette(&self) -> Option<&[u32]> {
        self.palette.as_deref()
    }

    /// Sets the `0xAARRGGBB` palette of a palette format.
    ///
    /// Missing entries take their default value; extra entries are dropped.
    pub fn set_palette(&mut self, palette: &[u32]) -> Result<()> {
        if !self.format.has_palette() {
            return Err(Error::UnsupportedFormat);
        }
        let count = 1_usize << self.format.bits_per_pixel();
        let entries = (0..count)
            .map(|i| {
                palette
                    .get(i)
                    .copied()
                    .unwrap_or_else(|| default_palette_entry(self.format, i))
            })
            .collect();
        self.palette = Some(entries);
        Ok(())
    }

    fn palette_entry(&self, index: usize) -> u32 {
        match &self.palette {
            Some(palette) => palette.get(index).copied().unwrap_or(0),
            None => default_palette_entry(self.format, index),
        }
    }

    /// Returns the palette index whose colour is nearest to `color` in gray.
    fn find_palette(&self, color: u32) -> usize {
        let (_, r, g, b) = argb_components(color);
        let target = i32::from(gray(r, g, b));
        let count = 1_usize << self.format.bits_per_pixel();
        (0..count)
            .min_by_key(|&i| {
                let (_, r, g, b) = argb_components(self.palette_entry(i));
                (i32::from(gray(r, g, b)) - target).abs()
            })
            .unwrap_or(0)
    }

    /// Returns the `0xAARRGGBB` colour of a pixel, or 0 outside the bitmap.
    pub fn get_pixel(&self, x: u32, y: u32) -> u32 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        let line = self.scanline(y);
        let x = x as usize;
        let color = match self.format {
            PixelFormat::OneBppMask => {
                if line[x / 8] & (0x80 >> (x % 8)) != 0 {
                    0xff00_0000
                } else {
                    0
                }
            }
            PixelFormat::OneBppRgb => {
                let index = usize::from(line[x / 8] & (0x80 >> (x % 8)) != 0);
                self.palette_entry(index)
            }
            PixelFormat::EightBppMask => u32::from(line[x]) << 24,
            PixelFormat::EightBppRgb => match self.palette {
                Some(_) => self.palette_entry(usize::from(line[x])),
                None => argb(0xff, line[x], line[x], line[x]),
            },
            PixelFormat::Rgb => argb(0xff, line[x * 3 + 2], line[x * 3 + 1], line[x * 3]),
            PixelFormat::Rgb32 => argb(0xff, line[x * 4 + 2], line[x * 4 + 1], line[x * 4]),
            PixelFormat::Argb => {
                let px = &line[x * 4..x * 4 + 4];
                argb(px[3], px[2], px[1], px[0])
            }
            PixelFormat::Cmyk => {
                let px = &line[x * 4..x * 4 + 4];
                let [r, g, b] = cmyk_to_rgb(px[0], px[1], px[2], px[3]);
                argb(0xff, r, g, b)
            }
        };
        match &self.alpha_mask {
            Some(plane) => color & 0x00ff_ffff | u32::from(plane.scanline(y)[x]) << 24,
            None => color,
        }
    }

    /// Stores a `0xAARRGGBB` colour. Pixels outside the bitmap are ignored.
    ///
    /// Palette formats store the nearest palette index, masks store alpha,
    /// and `Cmyk` stores the naive inverse of the colour.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: u32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let (a, r, g, b) = argb_components(color);
        let index = self.palette.as_ref().map(|_| self.find_palette(color));
        let format = self.format;
        let x = x as usize;
        let line = self.scanline_mut(y);
        match format {
            PixelFormat::OneBppMask | PixelFormat::OneBppRgb => {
                let set = match format {
                    PixelFormat::OneBppMask => a >= 0x80,
                    _ => index.unwrap_or_else(|| usize::from(gray(r, g, b) >= 0x80)) != 0,
                };
                let bit = 0x80 >> (x % 8);
                if set {
                    line[x / 8] |= bit;
                } else {
                    line[x / 8] &= !bit;
                }
            }
            PixelFormat::EightBppMask => line[x] = a,
            PixelFormat::EightBppRgb => {
                line[x] = index.map_or_else(|| gray(r, g, b), |index| index as u8);
            }
            PixelFormat::Rgb => line[x * 3..x * 3 + 3].copy_from_slice(&[b, g, r]),
            PixelFormat::Rgb32 => line[x * 4..x * 4 + 3].copy_from_slice(&[b, g, r]),
            PixelFormat::Argb => line[x * 4..x * 4 + 4].copy_from_slice(&[b, g, r, a]),
            PixelFormat::Cmyk => {
                line[x * 4..x * 4 + 4].copy_from_slice(&[255 - r, 255 - g, 255 - b, 0]);
            }
        }
        if let Some(plane) = self.alpha_mask.as_deref_mut() {
            plane.scanline_mut(y)[x] = a;
        }
    }

    /// Fills the whole bitmap with a `0xAARRGGBB` colour.
    pub fn clear(&mut self, color: u32) {
        let (a, r, g, b) = argb_components(color);
        match self.format {
            PixelFormat::OneBppMask => self.buffer.fill(if a != 0 { 0xff } else { 0 }),
            PixelFormat::OneBppRgb => {
                let index = match self.palette {
                    Some(_) => self.find_palette(color),
                    None => usize::from(gray(r, g, b) >= 0x80),
                };
                self.buffer.fill(if index != 0 { 0xff } else { 0 });
            }
            PixelFormat::EightBppMask => self.buffer.fill(a),
            PixelFormat::EightBppRgb => {
                let value = match self.palette {
                    Some(_) => self.find_palette(color) as u8,
                    None => gray(r, g, b),
                };
                self.buffer.fill(value);
            }
            format => {
                let px = match format {
                    PixelFormat::Argb => [b, g, r, a],
                    PixelFormat::Cmyk => [255 - r, 255 - g, 255 - b, 0],
                    _ => [b, g, r, 0xff],
                };
                let bpp = format.bytes_per_pixel();
                let width = self.width as usize;
                for row in self.buffer.chunks_exact_mut(self.pitch) {
                    for dest in row[..width * bpp].chunks_exact_mut(bpp) {
                        dest.copy_from_slice(&px[..bpp]);
                    }
                }
            }
        }
        if let Some(plane) = self.alpha_mask.as_deref_mut() {
            plane.buffer.fill(a);
        }
    }

    /// Copies the pixels inside `rect` into a new bitmap.
    ///
    /// `rect` is clamped to the bitmap. Palettes and alpha planes are copied
    /// along. 1bpp formats fail with [`Error::UnsupportedFormat`].
    pub fn clone_rect(&self, rect: IntRect) -> Result<Self> {
        let bpp = self.format.bytes_per_pixel();
        if bpp == 0 {
            return Err(Error::UnsupportedFormat);
        }
        let rect = rect.intersect(self.rect());
        let mut out = Self::new(rect.width() as u32, rect.height() as u32, self.format)?;
        let (left, width) = (rect.left as usize * bpp, rect.width() as usize * bpp);
        for row in 0..out.height {
            let src = &self.scanline(rect.top as u32 + row)[left..left + width];
            out.scanline_mut(row)[..width].copy_from_slice(src);
        }
        out.palette.clone_from(&self.palette);
        if let Some(plane) = &self.alpha_mask {
            out.alpha_mask = Some(Box::new(plane.clone_rect(rect)?));
        }
        Ok(out)
    }

    fn rect(&self) -> IntRect {
        IntRect::new(0, 0, clamp_i32(self.width), clamp_i32(self.height))
    }

    /// Fills a rectangle with a `0xAARRGGBB` colour.
    ///
    /// The rectangle is clipped to the bitmap, and a transparent colour does
    /// nothing. Fails with [`Error::UnsupportedFormat`] for `Cmyk` bitmaps.
    pub fn composite_rect(
        &mut self,
        left: i32,
        top: i32,
        width: i32,
        height: i32,
        color: u32,
        blend_mode: BlendMode,
    ) -> Result<()> {
        let (alpha, r, g, b) = argb_components(color);
        if alpha == 0 {
            return Ok(());
        }
        if self.format == PixelFormat::Cmyk {
            return Err(Error::UnsupportedFormat);
        }
        let rect = IntRect::from_origin_size(left, top, width, height).intersect(self.rect());
        if rect.is_empty() {
            return Ok(());
        }
        let (x0, x1) = (rect.left as usize, rect.right as usize);
        let rows = rect.top as u32..rect.bottom as u32;

        match self.format {
            PixelFormat::EightBppMask => {
                for y in rows {
                    let span = &mut self.scanline_mut(y)[x0..x1];
                    if alpha == 255 {
                        span.fill(255);
                    } else {
                        for px in span {
                            *px = alpha_union(*px, alpha);
                        }
                    }
                }
            }
            PixelFormat::EightBppRgb => {
                // Palette or not, 8bpp values are treated as gray levels.
                let value = gray(r, g, b);
                for y in rows {
                    let span = &mut self.scanline_mut(y)[x0..x1];
                    if alpha == 255 {
                        span.fill(value);
                    } else {
                        for px in span {
                            *px = alpha_merge(*px, value, alpha);
                        }
                    }
                }
            }
            PixelFormat::OneBppMask | PixelFormat::OneBppRgb => {
                let set = match self.format {
                    PixelFormat::OneBppMask => true,
                    _ => self.find_palette(color) != 0,
                };
                for y in rows {
                    let line = self.scanline_mut(y);
                    for x in x0..x1 {
                        let bit = 0x80 >> (x % 8);
                        if set {
                            line[x / 8] |= bit;
                        } else {
                            line[x / 8] &= !bit;
                        }
                    }
                }
            }
            _ if alpha == 255 && blend_mode == BlendMode::Normal => {
                let bpp = self.format.bytes_per_pixel();
                let px = [b, g, r, 0xff];
                for y in rows.clone() {
                    let span = &mut self.scanline_mut(y)[x0 * bpp..x1 * bpp];
                    for dest in span.chunks_exact_mut(bpp) {
                        dest.copy_from_slice(&px[..bpp]);
                    }
                }
                if let Some(plane) = self.alpha_mask.as_deref_mut() {
                    for y in rows {
                        plane.scanline_mut(y)[x0..x1].fill(0xff);
                    }
                }
            }
            _ => {
                let mut compositor = ScanlineCompositor::new();
                compositor.init(
                    self.format,
                    PixelFormat::EightBppMask,
                    None,
                    color,
                    blend_mode,
                    false,
                    false,
                    self.alpha_mask.is_some(),
                    None,
                )?;
                let coverage = vec![0xff_u8; x1 - x0];
                let bpp = self.format.bytes_per_pixel();
                let Self {
                    buffer,
                    pitch,
                    alpha_mask,
                    ..
                } = self;
                for y in rows {
                    let start = y as usize * *pitch;
                    let dest = &mut buffer[start + x0 * bpp..start + x1 * bpp];
                    let plane = alpha_mask
                        .as_deref_mut()
                        .map(|plane| &mut plane.scanline_mut(y)[x0..x1]);
                    compositor.composite_byte_mask_line(dest, &coverage, x1 - x0, None, plane);
                }
            }
        }
        Ok(())
    }

    /// Composites part of `src` onto this bitmap.
    ///
    /// `src` must not be a mask. The area is clipped to both bitmaps and to
    /// `clip`; an empty overlap succeeds without drawing.
    pub fn composite_bitmap(
        &mut self,
        dest_left: i32,
        dest_top: i32,
        width: i32,
        height: i32,
        src: &Self,
        src_left: i32,
        src_top: i32,
        blend_mode: BlendMode,
        clip: Option<&ClipRegion>,
        rgb_byte_order: bool,
    ) -> Result<()> {
        if src.format.is_mask() || self.format.bits_per_pixel() < 8 {
            return Err(Error::UnsupportedFormat);
        }
        let target = IntRect::from_origin_size(dest_left, dest_top, width, height);
        let Some(area) = self.overlap(target, src, src_left, src_top, clip) else {
            return Ok(());
        };
        let mut compositor = ScanlineCompositor::new();
        compositor.init(
            self.format,
            src.format,
            src.palette(),
            0,
            blend_mode,
            clip.and_then(ClipRegion::mask_bitmap).is_some(),
            rgb_byte_order,
            self.alpha_mask.is_some(),
            None,
        )?;
        let src_bpp = src.format.bytes_per_pixel();
        let src_left = area.src_left as usize;
        self.for_each_row(&area, clip, |dest, plane, row, clip_scan| {
            let src_y = area.src_top + row;
            let src_line = src.scanline(src_y);
            let src_alpha = src
                .alpha_mask()
                .map(|plane| &plane.scanline(src_y)[src_left..]);
            if src.format.has_palette() {
                compositor.composite_pal_bitmap_line(
                    dest, src_line, src_left, area.width, clip_scan, src_alpha, plane,
                );
            } else {
                compositor.composite_rgb_bitmap_line(
                    dest,
                    &src_line[src_left * src_bpp..],
                    area.width,
                    clip_scan,
                    src_alpha,
                    plane,
                );
            }
        });
        Ok(())
    }

    /// Paints `color` through part of the mask bitmap `mask`.
    ///
    /// `mask` must be a 1bpp or 8bpp mask. The area is clipped like
    /// [`composite_bitmap`](Self::composite_bitmap).
    pub fn composite_mask(
        &mut self,
        dest_left: i32,
        dest_top: i32,
        width: i32,
        height: i32,
        mask: &Self,
        color: u32,
        src_left: i32,
        src_top: i32,
        blend_mode: BlendMode,
        clip: Option<&ClipRegion>,
        rgb_byte_order: bool,
    ) -> Result<()> {
        if !mask.format.is_mask() || self.format.bits_per_pixel() < 8 {
            return Err(Error::UnsupportedFormat);
        }
        if argb_components(color).0 == 0 {
            return Ok(());
        }
        let target = IntRect::from_origin_size(dest_left, dest_top, width, height);
        let Some(area) = self.overlap(target, mask, src_left, src_top, clip) else {
            return Ok(());
        };
        let mut compositor = ScanlineCompositor::new();
        compositor.init(
            self.format,
            mask.format,
            None,
            color,
            blend_mode,
            clip.and_then(ClipRegion::mask_bitmap).is_some(),
            rgb_byte_order,
            self.alpha_mask.is_some(),
            None,
        )?;
        let src_left = area.src_left as usize;
        self.for_each_row(&area, clip, |dest, plane, row, clip_scan| {
            let src_line = mask.scanline(area.src_top + row);
            if mask.format == PixelFormat::OneBppMask {
                compositor.composite_bit_mask_line(
                    dest, src_line, src_left, area.width, clip_scan, plane,
                );
            } else {
                compositor.composite_byte_mask_line(
                    dest,
                    &src_line[src_left..],
                    area.width,
                    clip_scan,
                    plane,
                );
            }
        });
        Ok(())
    }

    /// Clips a copy from `src` at `(src_left, src_top)` to `target` against
    /// both bitmaps and the clip bounds.
    fn overlap(
        &self,
        target: IntRect,
        src: &Self,
        src_left: i32,
        src_top: i32,
        clip: Option<&ClipRegion>,
    ) -> Option<Overlap> {
        let dx = i64::from(target.left) - i64::from(src_left);
        let dy = i64::from(target.top) - i64::from(src_top);
        let src_in_dest = IntRect::new(
            saturate_i32(dx),
            saturate_i32(dy),
            saturate_i32(dx + i64::from(src.width)),
            saturate_i32(dy + i64::from(src.height)),
        );
        let mut dest = target.intersect(src_in_dest).intersect(self.rect());
        if let Some(clip) = clip {
            dest = dest.intersect(clip.bounds());
        }
        if dest.is_empty() {
            return None;
        }
        Some(Overlap {
            dest,
            width: dest.width() as usize,
            src_left: u32::try_from(i64::from(dest.left) - dx).ok()?,
            src_top: u32::try_from(i64::from(dest.top) - dy).ok()?,
        })
    }

    /// Runs `f` over the destination rows of `area` with the matching
    /// alpha plane row and clip scan, all starting at the left of the area.
    fn for_each_row(
        &mut self,
        area: &Overlap,
        clip: Option<&ClipRegion>,
        mut f: impl FnMut(&mut [u8], Option<&mut [u8]>, u32, Option<&[u8]>),
    ) {
        let bpp = self.format.bytes_per_pixel();
        let left = area.dest.left as usize;
        let clip_left = clip.map_or(0, |clip| clip.bounds().left);
        let Self {
            buffer,
            pitch,
            alpha_mask,
            ..
        } = self;
        for row in 0..area.dest.height() as u32 {
            let y = area.dest.top as u32 + row;
            let start = y as usize * *pitch;
            let dest = &mut buffer[start + left * bpp..start + (left + area.width) * bpp];
            let plane = alpha_mask
                .as_deref_mut()
                .map(|plane| &mut plane.scanline_mut(y)[left..left + area.width]);
            let clip_scan = clip
                .and_then(|clip| clip.mask_scan(y as i32))
                .map(|scan| &scan[(area.dest.left - clip_left) as usize..]);
            f(dest, plane, row, clip_scan);
        }
    }
}

/// A clipped copy rectangle.
#[derive(Clone, Copy, Debug)]
struct Overlap {
    dest: IntRect,
    width: usize,
    src_left: u32,
    src_top: u32,
}

fn clamp_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

fn saturate_i32(v: i64) -> i32 {
    i32::try_from(v).unwrap_or(if v < 0 { i32::MIN } else { i32::MAX })
}
