// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph outline extraction.

use kurbo::Point;
use skrifa::instance::{LocationRef, Size};
use skrifa::outline::{DrawSettings, OutlinePen};
use skrifa::{FontRef, GlyphId, MetadataProvider};

use fontmap::Face;

use crate::path::{Path, PointKind};

/// Builds a [`Path`] from outline drawing commands.
///
/// Every move closes the previous figure, and degenerate figures (a move
/// followed only by segments that return to the start point) are dropped.
#[derive(Debug)]
pub(crate) struct PathPen {
    path: Path,
    current: Point,
    scale: f64,
}

impl PathPen {
    pub(crate) fn new() -> Self {
        Self::with_scale(1.0)
    }

    /// Creates a pen that multiplies every coordinate by `scale`.
    pub(crate) fn with_scale(scale: f64) -> Self {
        Self {
            path: Path::new(),
            current: Point::ZERO,
            scale,
        }
    }

    fn point(&self, x: f32, y: f32) -> Point {
        Point::new(f64::from(x) * self.scale, f64::from(y) * self.scale)
    }

    /// Closes the last figure and returns the path, or `None` if nothing was
    /// drawn.
    pub(crate) fn finish(mut self) -> Option<Path> {
        if self.path.is_empty() {
            return None;
        }
        self.drop_empty_contour();
        self.path.close_path();
        (!self.path.is_empty()).then_some(self.path)
    }

    fn drop_empty_contour(&mut self) {
        let points = self.path.points();
        let len = points.len();
        if len >= 2
            && points[len - 2].is_kind_and_open(PointKind::Move)
            && points[len - 2].point == points[len - 1].point
        {
            self.path.trim_points(len - 2);
            return;
        }
        if len >= 4
            && points[len - 4].is_kind_and_open(PointKind::Move)
            && points[len - 3].is_kind_and_open(PointKind::Bezier)
            && points[len - 3..]
                .iter()
                .all(|p| p.point == points[len - 4].point)
        {
            self.path.trim_points(len - 4);
        }
    }

    fn bezier(&mut self, c1: Point, c2: Point, to: Point) {
        self.path.append_point(c1, PointKind::Bezier, false);
        self.path.append_point(c2, PointKind::Bezier, false);
        self.path.append_point(to, PointKind::Bezier, false);
        self.current = to;
    }
}

impl OutlinePen for PathPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.drop_empty_contour();
        self.path.close_path();
        let to = self.point(x, y);
        self.path.append_point(to, PointKind::Move, false);
        self.current = to;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let to = self.point(x, y);
        self.path.append_point(to, PointKind::Line, false);
        self.current = to;
    }

    fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        let ctrl = self.point(cx, cy);
        let to = self.point(x, y);
        let from = self.current;
        self.bezier(
            from + (ctrl - from) * (2.0 / 3.0),
            ctrl + (to - ctrl) * (1.0 / 3.0),
            to,
        );
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        let (c1, c2, to) = (self.point(cx0, cy0), self.point(cx1, cy1), self.point(x, y));
        self.bezier(c1, c2, to);
    }

    // Figures are closed on the next move.
    fn close(&mut self) {}
}

/// Draws the outline of `glyph_index` in em units, y up.
///
/// Returns `None` for glyphs without an outline and for faces whose outline
/// tables cannot be read.
pub(crate) fn glyph_outline(face: &Face, glyph_index: u32) -> Option<Path> {
    let font = FontRef::from_index(face.data().data(), face.index()).ok()?;
    let units_per_em = font
        .metrics(Size::unscaled(), LocationRef::default())
        .units_per_em;
    if units_per_em == 0 {
        return None;
    }
    let glyphs = font.outline_glyphs();
    let glyph = glyphs.get(GlyphId::new(glyph_index))?;
    let mut pen = PathPen::with_scale(1.0 / f64::from(units_per_em));
    let settings = DrawSettings::unhinted(Size::unscaled(), LocationRef::default());
    if let Err(err) = glyph.draw(settings, &mut pen) {
        log::debug!("glyph {glyph_index} failed to draw: {err}");
        return None;
    }
    pen.finish()
}
