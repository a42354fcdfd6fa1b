// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coverage rasterization of glyph outlines.

#![allow(
    clippy::cast_possible_truncation,
    reason = "pixel coordinates are bounded by MAX_GLYPH_DIMENSION before conversion"
)]

use fontmap::{Error, Result};
use kurbo::{Line, PathEl, Point, Rect};

use super::{AntiAlias, GlyphBitmap, MAX_GLYPH_DIMENSION};
use crate::bitmap::{DibBitmap, PixelFormat};
use crate::path::Path;

/// Flattening tolerance in device pixels.
const TOLERANCE: f64 = 0.05;

/// Rasterizes a path given in device pixels, y up.
///
/// The bitmap covers the pixel bounds of the path. Its `left` and `top`
/// give the device position of its first column and of the top edge of its
/// first row. Returns `None` for a path that covers no pixels.
pub fn rasterize_path(path: &Path, anti_alias: AntiAlias) -> Result<Option<GlyphBitmap>> {
    let mut lines = Vec::new();
    let mut start = Point::ZERO;
    let mut last = Point::ZERO;
    kurbo::flatten(path.to_bez_path(), TOLERANCE, |el| match el {
        PathEl::MoveTo(p) => {
            if last != start {
                lines.push(Line::new(last, start));
            }
            start = p;
            last = p;
        }
        PathEl::LineTo(p) => {
            lines.push(Line::new(last, p));
            last = p;
        }
        PathEl::ClosePath => {
            if last != start {
                lines.push(Line::new(last, start));
            }
            last = start;
        }
        // Flattening only emits lines.
        PathEl::QuadTo(..) | PathEl::CurveTo(..) => {}
    });
    // Fill rules close every figure.
    if last != start {
        lines.push(Line::new(last, start));
    }

    let Some(first) = lines.first() else {
        return Ok(None);
    };
    let mut bounds = Rect::from_points(first.p0, first.p0);
    for line in &lines {
        bounds = bounds.union_pt(line.p0).union_pt(line.p1);
    }
    let (x0, y0) = (bounds.x0.floor(), bounds.y0.floor());
    let (x1, y1) = (bounds.x1.ceil(), bounds.y1.ceil());
    let limit = f64::from(MAX_GLYPH_DIMENSION);
    if x1 - x0 > limit || y1 - y0 > limit {
        return Err(Error::ResourceLimitExceeded {
            width: (x1 - x0).min(f64::from(u32::MAX)) as u32,
            height: (y1 - y0).min(f64::from(u32::MAX)) as u32,
        });
    }
    let (width, height) = ((x1 - x0) as usize, (y1 - y0) as usize);
    if width == 0 || height == 0 {
        return Ok(None);
    }

    let mut acc = Accumulator::new(width, height);
    for line in &lines {
        let flip = |p: Point| Point::new(p.x - x0, y1 - p.y);
        acc.draw_line(flip(line.p0), flip(line.p1));
    }

    let mut bitmap = DibBitmap::new(width as u32, height as u32, PixelFormat::EightBppMask)?;
    let mut sum = 0.0_f32;
    for (y, row) in acc.area.chunks(width).take(height).enumerate() {
        let scan = bitmap.scanline_mut(y as u32);
        for (dst, area) in scan.iter_mut().zip(row) {
            sum += area;
            let coverage = sum.abs().min(1.0);
            *dst = match anti_alias {
                AntiAlias::Normal => (coverage * 255.0 + 0.5) as u8,
                AntiAlias::Mono => {
                    if coverage >= 0.5 {
                        255
                    } else {
                        0
                    }
                }
            };
        }
    }
    Ok(Some(GlyphBitmap {
        left: x0 as i32,
        top: y1 as i32,
        bitmap,
    }))
}

/// Signed area accumulation buffer.
///
/// Each line adds, per cell, the change in coverage it causes; a running sum
/// along the buffer gives the coverage of each pixel.
struct Accumulator {
    width: usize,
    height: usize,
    area: Vec<f32>,
}

impl Accumulator {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            area: vec![0.0; width * height + 4],
        }
    }

    fn draw_line(&mut self, p0: Point, p1: Point) {
        if p0.y == p1.y {
            return;
        }
        let (dir, p0, p1) = if p0.y < p1.y {
            (1.0, p0, p1)
        } else {
            (-1.0, p1, p0)
        };
        let (p0x, p0y, p1x, p1y) = (p0.x as f32, p0.y as f32, p1.x as f32, p1.y as f32);
        let dxdy = (p1x - p0x) / (p1y - p0y);
        let mut x = p0x;
        if p0y < 0.0 {
            x -= p0y * dxdy;
        }
        let first_row = p0y.max(0.0) as usize;
        let last_row = self.height.min(p1y.ceil() as usize);
        for y in first_row..last_row {
            let line_start = y * self.width;
            let dy = ((y + 1) as f32).min(p1y) - (y as f32).max(p0y);
            let x_next = x + dxdy * dy;
            let d = dy * dir;
            let (xa, xb) = if x < x_next { (x, x_next) } else { (x_next, x) };
            let xa_floor = xa.floor();
            let xa_i = xa_floor.max(0.0) as usize;
            let xb_ceil = xb.ceil();
            let xb_i = xb_ceil.max(0.0) as usize;
            let at = line_start + xa_i;
            if xb_i <= xa_i + 1 {
                let mid = 0.5 * (x + x_next) - xa_floor;
                self.area[at] += d - d * mid;
                self.area[at + 1] += d * mid;
            } else {
                let s = (xb - xa).recip();
                let xa_frac = xa - xa_floor;
                let a0 = 0.5 * s * (1.0 - xa_frac) * (1.0 - xa_frac);
                let xb_frac = xb - xb_ceil + 1.0;
                let am = 0.5 * s * xb_frac * xb_frac;
                self.area[at] += d * a0;
                if xb_i == xa_i + 2 {
                    self.area[at + 1] += d * (1.0 - a0 - am);
                } else {
                    let a1 = s * (1.5 - xa_frac);
                    self.area[at + 1] += d * (a1 - a0);
                    for xi in xa_i + 2..xb_i - 1 {
                        self.area[line_start + xi] += d * s;
                    }
                    let a2 = a1 + (xb_i - xa_i - 3) as f32 * s;
                    self.area[line_start + xb_i - 1] += d * (1.0 - a2 - am);
                }
                self.area[line_start + xb_i] += d * am;
            }
            x = x_next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_path(rect: Rect) -> Path {
        let mut path = Path::new();
        path.append_float_rect(rect);
        path
    }

    fn rows(glyph: &GlyphBitmap) -> Vec<Vec<u8>> {
        let width = glyph.bitmap.width() as usize;
        (0..glyph.bitmap.height())
            .map(|y| glyph.bitmap.scanline(y)[..width].to_vec())
            .collect()
    }

    #[test]
    fn pixel_aligned_square_is_opaque() {
        let glyph = rasterize_path(&rect_path(Rect::new(2.0, 3.0, 4.0, 5.0)), AntiAlias::Normal)
            .unwrap()
            .unwrap();
        assert_eq!((glyph.left, glyph.top), (2, 5), "top is the upper edge, y up");
        assert_eq!(rows(&glyph), vec![vec![255, 255], vec![255, 255]]);
    }

    #[test]
    fn half_covered_pixels() {
        let glyph = rasterize_path(&rect_path(Rect::new(0.5, 0.0, 2.0, 1.0)), AntiAlias::Normal)
            .unwrap()
            .unwrap();
        assert_eq!(glyph.left, 0);
        assert_eq!(rows(&glyph), vec![vec![128, 255]]);

        let mono = rasterize_path(&rect_path(Rect::new(0.6, 0.0, 2.0, 1.0)), AntiAlias::Mono)
            .unwrap()
            .unwrap();
        assert_eq!(rows(&mono), vec![vec![0, 255]], "40% coverage is dropped");
    }

    #[test]
    fn empty_paths_have_no_bitmap() {
        assert!(rasterize_path(&Path::new(), AntiAlias::Normal).unwrap().is_none());
        let mut line = Path::new();
        line.append_line((0.0, 0.0), (4.0, 0.0));
        assert!(
            rasterize_path(&line, AntiAlias::Normal).unwrap().is_none(),
            "a horizontal line has no area"
        );
    }

    #[test]
    fn oversized_glyphs_are_rejected() {
        let path = rect_path(Rect::new(0.0, 0.0, 4096.0, 10.0));
        assert!(matches!(
            rasterize_path(&path, AntiAlias::Normal),
            Err(Error::ResourceLimitExceeded {
                width: 4096,
                height: 10
            })
        ));
        let edge = rect_path(Rect::new(0.0, 0.0, 2048.0, 2048.0));
        assert!(rasterize_path(&edge, AntiAlias::Mono).unwrap().is_some());
    }
}
