// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Synthetic bold and italic for substituted faces.

use core::ops::Range;

use fontmap::{Charset, SubstFont};
use kurbo::{Affine, Vec2};
use smallvec::SmallVec;

use crate::math::unit;
use crate::path::{Path, PointKind};

/// Horizontal shear, in hundredths, for italic angles 0 through -29 degrees.
pub const SKEW_TABLE: [i8; 30] = [
    -0, -2, -3, -5, -7, -9, -11, -12, -14, -16, -18, -19, -21, -23, -25, -27, -29, -31, -32, -34,
    -36, -38, -40, -42, -45, -47, -49, -51, -53, -55,
];

/// Shear used for angles outside [`SKEW_TABLE`].
const MAX_SKEW: i32 = -58;

/// Number of entries in the weight tables.
const WEIGHT_LEVELS: usize = 100;

/// Outline embolden strength, in 1/4096 em, per 10 units of weight above 400.
const WEIGHT_POW: [u8; WEIGHT_LEVELS] = [
    0, 6, 12, 14, 16, 18, 22, 24, 28, 30, 32, 34, 36, 38, 40, 42, 44, 46, 48, 50, 52, 54, 56, 58,
    60, 62, 64, 66, 68, 70, 70, 72, 72, 74, 74, 74, 76, 76, 76, 78, 78, 78, 80, 80, 80, 82, 82, 82,
    84, 84, 84, 84, 86, 86, 86, 88, 88, 88, 88, 90, 90, 90, 90, 92, 92, 92, 92, 94, 94, 94, 94, 96,
    96, 96, 96, 96, 98, 98, 98, 98, 100, 100, 100, 100, 100, 102, 102, 102, 102, 102, 104, 104,
    104, 104, 104, 106, 106, 106, 106, 106,
];

/// Bitmap embolden levels.
const WEIGHT_POW_11: [u8; WEIGHT_LEVELS] = [
    0, 4, 7, 8, 9, 10, 12, 13, 15, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 28, 29, 30, 31, 32, 33,
    34, 35, 36, 37, 39, 39, 40, 40, 41, 41, 41, 42, 42, 42, 43, 43, 43, 44, 44, 44, 45, 45, 45, 46,
    46, 46, 46, 43, 47, 47, 48, 48, 48, 48, 45, 50, 50, 50, 46, 51, 51, 51, 52, 52, 52, 52, 53, 53,
    53, 53, 53, 54, 54, 54, 54, 55, 55, 55, 55, 55, 56, 56, 56, 56, 56, 57, 57, 57, 57, 57, 58, 58,
    58, 58, 58,
];

/// Embolden levels for Japanese faces.
const WEIGHT_POW_SHIFT_JIS: [u8; WEIGHT_LEVELS] = [
    0, 0, 2, 4, 6, 8, 10, 14, 16, 20, 22, 26, 28, 32, 34, 38, 42, 44, 48, 52, 56, 60, 64, 66, 70,
    74, 78, 82, 86, 90, 96, 96, 96, 96, 98, 98, 98, 100, 100, 100, 100, 102, 102, 102, 102, 104,
    104, 104, 104, 104, 106, 106, 106, 106, 106, 108, 108, 108, 108, 108, 110, 110, 110, 110, 110,
    112, 112, 112, 112, 112, 112, 114, 114, 114, 114, 114, 114, 114, 116, 116, 116, 116, 116, 116,
    116, 118, 118, 118, 118, 118, 118, 118, 120, 120, 120, 120, 120, 120, 120, 120,
];

/// Returns the shear, in hundredths, for an italic angle in degrees.
///
/// Only angles from 0 down to -29 are in the table; anything else gives the
/// steepest shear.
pub fn skew_from_angle(angle: i32) -> i32 {
    if angle > 0 {
        return MAX_SKEW;
    }
    angle
        .checked_neg()
        .and_then(|index| SKEW_TABLE.get(index as usize))
        .map_or(MAX_SKEW, |&skew| i32::from(skew))
}

/// Returns the bitmap embolden level for a weight table index, or -1 if the
/// index is out of range.
pub fn weight_level(charset: Charset, index: usize) -> i32 {
    if index >= WEIGHT_LEVELS {
        return -1;
    }
    let table = if charset == Charset::ShiftJis {
        &WEIGHT_POW_SHIFT_JIS
    } else {
        &WEIGHT_POW_11
    };
    i32::from(table[index])
}

/// Index into the weight tables for a substitute that needs emboldening.
fn weight_index(subst: &SubstFont) -> Option<usize> {
    if subst.flag_mm || subst.weight <= 400 {
        return None;
    }
    let index = ((subst.weight - 400) / 10) as usize;
    Some(index.min(WEIGHT_LEVELS - 1))
}

/// Returns the total outline embolden strength in em units, if any.
pub(crate) fn outline_embolden_strength(subst: &SubstFont) -> Option<f64> {
    let index = weight_index(subst)?;
    let level = if subst.charset == Charset::ShiftJis {
        i32::from(WEIGHT_POW_SHIFT_JIS[index]) * 65536 / 36655
    } else {
        i32::from(WEIGHT_POW[index])
    };
    Some(f64::from(level) / 4096.0)
}

/// Returns the total bitmap embolden strength in device pixels for a glyph
/// drawn with `matrix`, if any.
pub(crate) fn bitmap_embolden_strength(subst: &SubstFont, matrix: &Affine) -> Option<f64> {
    let index = weight_index(subst)?;
    let level = weight_level(subst.charset, index);
    if level < 0 {
        return None;
    }
    let [a, _, c, ..] = matrix.as_coeffs();
    Some(f64::from(level) * (a.abs() + c.abs()) * 16.0 / 36655.0)
}

/// Returns the shear applied in glyph space for a substitute's italic angle.
pub(crate) fn italic_transform(subst: &SubstFont, vertical: bool) -> Option<Affine> {
    if subst.italic_angle == 0 {
        return None;
    }
    let skew = f64::from(skew_from_angle(subst.italic_angle)) / 100.0;
    Some(if vertical {
        Affine::new([1.0, skew, 0.0, 1.0, 0.0, 0.0])
    } else {
        Affine::new([1.0, 0.0, -skew, 1.0, 0.0, 0.0])
    })
}

/// Thickens every figure of `path` by `strength`, half on each side.
///
/// Points move along the bisector of their adjacent edges. Corners turning
/// by more than about 160 degrees are left in place, and shifts are limited
/// by the length of the shorter adjacent edge.
pub fn embolden_path(path: &mut Path, strength: f64) {
    if strength <= 0.0 || path.is_empty() {
        return;
    }
    let half = strength / 2.0;
    let contours = contours(path);
    // Outer figures wind clockwise in TrueType outlines.
    let clockwise = contours
        .iter()
        .map(|range| signed_area(path, range.clone()))
        .sum::<f64>()
        < 0.0;
    let normal = |v: Vec2| {
        if clockwise {
            Vec2::new(-v.y, v.x)
        } else {
            Vec2::new(v.y, -v.x)
        }
    };

    let before: Vec<_> = path.points().iter().map(|p| p.point).collect();
    let points = path.points_mut();
    for range in contours {
        let n = range.len();
        let at = |i: usize| before[range.start + i % n];
        for i in 0..n {
            let p = at(i);
            let Some(prev) = (1..n).map(|k| at(i + n - k)).find(|&q| q != p) else {
                break;
            };
            let Some(next) = (1..n).map(|k| at(i + k)).find(|&q| q != p) else {
                break;
            };
            let (l_in, l_out) = ((p - prev).hypot(), (next - p).hypot());
            let (Some(d_in), Some(d_out)) = (unit(p - prev), unit(next - p)) else {
                continue;
            };
            let d = d_in.dot(d_out);
            if d <= -0.9375 {
                continue;
            }
            let d = d + 1.0;
            let mut q = d_out.x * d_in.y - d_out.y * d_in.x;
            if clockwise {
                q = -q;
            }
            let l = l_in.min(l_out);
            let factor = if half * q <= l * d { half / d } else { l / q };
            points[range.start + i].point = p + (normal(d_in) + normal(d_out)) * factor;
        }
    }
}

/// Splits the path into index ranges, one per figure.
fn contours(path: &Path) -> SmallVec<[Range<usize>; 8]> {
    let mut contours = SmallVec::new();
    let mut start = 0;
    for (i, p) in path.points().iter().enumerate().skip(1) {
        if p.kind == PointKind::Move {
            contours.push(start..i);
            start = i;
        }
    }
    contours.push(start..path.len());
    contours
}

/// Twice the signed area of a figure, positive when counterclockwise in a
/// y-up space.
fn signed_area(path: &Path, range: Range<usize>) -> f64 {
    let points = &path.points()[range];
    let Some(last) = points.last() else {
        return 0.0;
    };
    let mut prev = last.point;
    let mut area = 0.0;
    for p in points {
        area += prev.x * p.point.y - p.point.x * prev.y;
        prev = p.point;
    }
    area
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Rect};

    use super::*;

    fn subst(weight: i32, charset: Charset) -> SubstFont {
        SubstFont {
            weight,
            charset,
            ..SubstFont::default()
        }
    }

    #[test]
    fn skew_table_lookup() {
        assert_eq!(skew_from_angle(0), 0);
        assert_eq!(skew_from_angle(-12), -21);
        assert_eq!(skew_from_angle(-29), -55);
        assert_eq!(skew_from_angle(-30), -58, "past the end of the table");
        assert_eq!(skew_from_angle(5), -58, "positive angles are out of range");
        assert_eq!(skew_from_angle(i32::MIN), -58);
    }

    #[test]
    fn weight_levels() {
        assert_eq!(weight_level(Charset::Ansi, 0), 0);
        assert_eq!(weight_level(Charset::Ansi, 30), 39);
        assert_eq!(weight_level(Charset::ShiftJis, 30), 96);
        assert_eq!(weight_level(Charset::Ansi, 100), -1);
    }

    #[test]
    fn embolden_strengths() {
        assert_eq!(outline_embolden_strength(&subst(400, Charset::Ansi)), None);
        assert_eq!(
            outline_embolden_strength(&subst(700, Charset::Ansi)),
            Some(70.0 / 4096.0)
        );
        assert_eq!(
            outline_embolden_strength(&subst(700, Charset::ShiftJis)),
            Some(f64::from(96 * 65536 / 36655) / 4096.0)
        );
        assert_eq!(
            outline_embolden_strength(&subst(5000, Charset::Ansi)),
            Some(106.0 / 4096.0),
            "weights clamp to the last entry"
        );
        let mm = SubstFont {
            flag_mm: true,
            ..subst(700, Charset::Ansi)
        };
        assert_eq!(outline_embolden_strength(&mm), None, "MM fonts adjust instead");

        let strength = bitmap_embolden_strength(&subst(700, Charset::Ansi), &Affine::scale(20.0));
        assert_eq!(strength, Some(39.0 * 20.0 * 16.0 / 36655.0));
    }

    #[test]
    fn italic_shears_the_right_axis() {
        let italic = SubstFont {
            italic_angle: -12,
            ..SubstFont::default()
        };
        let horizontal = italic_transform(&italic, false).unwrap();
        assert_eq!(horizontal * Point::new(0.0, 1.0), Point::new(0.21, 1.0));
        let vertical = italic_transform(&italic, true).unwrap();
        assert_eq!(vertical * Point::new(1.0, 0.0), Point::new(1.0, -0.21));
        assert!(italic_transform(&SubstFont::default(), false).is_none());
    }

    fn figures(contours: &[&[(f64, f64)]]) -> Path {
        let mut path = Path::new();
        for corners in contours {
            for (i, &corner) in corners.iter().enumerate() {
                let kind = if i == 0 { PointKind::Move } else { PointKind::Line };
                path.append_point(corner, kind, false);
            }
            path.close_path();
        }
        path
    }

    #[test]
    fn embolden_grows_square() {
        let clockwise: &[(f64, f64)] = &[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)];
        let counterclockwise: &[(f64, f64)] = &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        for corners in [clockwise, counterclockwise] {
            let mut path = figures(&[corners]);
            embolden_path(&mut path, 0.1);
            let bounds = path.bounding_box();
            let expected = Rect::new(-0.05, -0.05, 1.05, 1.05);
            assert!(
                (bounds.x0 - expected.x0).abs() < 1e-9
                    && (bounds.y0 - expected.y0).abs() < 1e-9
                    && (bounds.x1 - expected.x1).abs() < 1e-9
                    && (bounds.y1 - expected.y1).abs() < 1e-9,
                "{corners:?} grew to {bounds:?}"
            );
        }
    }

    #[test]
    fn embolden_shrinks_counters() {
        // Clockwise outer square with a counterclockwise hole.
        let mut path = figures(&[
            &[(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0)],
            &[(1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0)],
        ]);
        embolden_path(&mut path, 0.2);
        let hole = path.point(4).unwrap();
        assert!((hole.x - 1.1).abs() < 1e-9 && (hole.y - 1.1).abs() < 1e-9, "hole shrinks");
        assert!((path.point(0).unwrap().x + 0.1).abs() < 1e-9, "outline grows");
    }
}
