// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paths stored as flat point lists.
//!
//! A [`Path`] keeps one entry per point rather than one per segment. Cubic
//! segments take three consecutive [`PointKind::Bezier`] points (two
//! controls, then the end point) and a figure is closed by setting the
//! `close` flag on its last point. This is the shape glyph outlines and
//! rectangle fills are built in, and it makes rectangle detection and
//! stroke bounds cheap.

use alloc::vec::Vec;

use kurbo::{Affine, BezPath, PathEl, Point, Rect};

/// Slope and distance tolerance for stroke bounds.
const STROKE_EPSILON: f64 = 1.0 / 20.0;

/// The role of a point in a [`Path`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum PointKind {
    /// Starts a new figure.
    Move,
    /// Ends a straight segment.
    Line,
    /// One of the three points of a cubic segment.
    Bezier,
}

/// A point in a [`Path`].
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct PathPoint {
    /// Position of the point.
    pub point: Point,
    /// How the point connects to its predecessor.
    pub kind: PointKind,
    /// The segment ending here closes the figure.
    pub close: bool,
}

impl PathPoint {
    /// Creates a path point.
    pub fn new(point: impl Into<Point>, kind: PointKind, close: bool) -> Self {
        Self {
            point: point.into(),
            kind,
            close,
        }
    }

    /// Returns true if the point has the given kind and does not close its
    /// figure.
    pub fn is_kind_and_open(&self, kind: PointKind) -> bool {
        self.kind == kind && !self.close
    }
}

/// Result of [`Path::zero_area_path`].
#[derive(Clone, Debug)]
pub struct ZeroAreaPath {
    /// Line segments that draw the degenerate parts of the path.
    pub path: Path,
    /// The path should be drawn as a hairline.
    pub thin: bool,
    /// The points were already transformed; draw them with the identity.
    pub set_identity: bool,
}

/// An ordered sequence of path points.
#[derive(Clone, Default, PartialEq, Debug)]
pub struct Path {
    points: Vec<PathPoint>,
}

impl Path {
    /// Creates an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the points of the path.
    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    pub(crate) fn points_mut(&mut self) -> &mut [PathPoint] {
        &mut self.points
    }

    /// Returns the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the path has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the position of the point at `index`.
    pub fn point(&self, index: usize) -> Option<Point> {
        self.points.get(index).map(|p| p.point)
    }

    /// Returns the kind of the point at `index`.
    pub fn kind(&self, index: usize) -> Option<PointKind> {
        self.points.get(index).map(|p| p.kind)
    }

    /// Returns true if the point at `index` closes its figure.
    pub fn is_closing_figure(&self, index: usize) -> bool {
        self.points.get(index).is_some_and(|p| p.close)
    }

    /// Removes every point.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Keeps only the first `len` points.
    pub fn trim_points(&mut self, len: usize) {
        self.points.truncate(len);
    }

    /// Appends a point.
    pub fn append_point(&mut self, point: impl Into<Point>, kind: PointKind, close: bool) {
        self.points.push(PathPoint::new(point, kind, close));
    }

    /// Appends a point that closes the current figure.
    pub fn append_point_and_close(&mut self, point: impl Into<Point>, kind: PointKind) {
        self.append_point(point, kind, true);
    }

    /// Appends a line from `from` to `to`, starting a new figure unless the
    /// path already ends at `from`.
    pub fn append_line(&mut self, from: impl Into<Point>, to: impl Into<Point>) {
        let from = from.into();
        if self.points.last().map(|p| p.point) != Some(from) {
            self.append_point(from, PointKind::Move, false);
        }
        self.append_point(to, PointKind::Line, false);
    }

    /// Appends a closed rectangle as five points: left-bottom, left-top,
    /// right-top, right-bottom and back to left-bottom.
    pub fn append_rect(&mut self, left: f64, bottom: f64, right: f64, top: f64) {
        self.append_point((left, bottom), PointKind::Move, false);
        self.append_point((left, top), PointKind::Line, false);
        self.append_point((right, top), PointKind::Line, false);
        self.append_point((right, bottom), PointKind::Line, false);
        self.append_point((left, bottom), PointKind::Line, true);
    }

    /// Appends `rect` with [`append_rect`](Self::append_rect), treating
    /// `y0` as the bottom edge.
    pub fn append_float_rect(&mut self, rect: Rect) {
        self.append_rect(rect.x0, rect.y0, rect.x1, rect.y1);
    }

    /// Marks the last point as closing its figure.
    pub fn close_path(&mut self) {
        if let Some(last) = self.points.last_mut() {
            last.close = true;
        }
    }

    /// Appends the points of `other`, transforming only the appended points.
    pub fn append(&mut self, other: &Self, transform: Option<&Affine>) {
        let start = self.points.len();
        self.points.extend_from_slice(&other.points);
        if let Some(transform) = transform {
            for p in &mut self.points[start..] {
                p.point = *transform * p.point;
            }
        }
    }

    /// Transforms every point in place.
    pub fn transform(&mut self, transform: &Affine) {
        for p in &mut self.points {
            p.point = *transform * p.point;
        }
    }

    /// Returns the bounds of the points, or [`Rect::ZERO`] for an empty
    /// path.
    ///
    /// Control points are included, so the result may be larger than the
    /// drawn shape.
    pub fn bounding_box(&self) -> Rect {
        let mut points = self.points.iter().map(|p| p.point);
        let Some(first) = points.next() else {
            return Rect::ZERO;
        };
        points.fold(Rect::from_points(first, first), |rect, p| rect.union_pt(p))
    }

    /// Returns the bounds of the path stroked with a pen that extends
    /// `half_width` on each side of the center line.
    ///
    /// Open ends get square caps and joins are extended to their miter
    /// point. Joins whose miter is longer than `miter_limit * half_width`
    /// fall back to the caps of both segments.
    pub fn bounding_box_for_stroke(&self, half_width: f64, miter_limit: f64) -> Rect {
        let points = &self.points;
        let mut bounds = None;
        let mut i = 0;
        while i < points.len() {
            let current = points[i];
            let next = points
                .get(i + 1)
                .filter(|p| p.kind != PointKind::Move)
                .map(|p| p.point);
            if current.kind == PointKind::Move || i == 0 {
                match next {
                    Some(next) => {
                        update_line_end_points(&mut bounds, next, current.point, half_width);
                    }
                    None if current.close => extend(&mut bounds, current.point),
                    None => {}
                }
                i += 1;
                continue;
            }
            if current.kind == PointKind::Bezier {
                if i + 2 >= points.len() {
                    break;
                }
                extend(&mut bounds, points[i].point);
                extend(&mut bounds, points[i + 1].point);
                i += 2;
            }
            let start = points[i - 1].point;
            let middle = points[i].point;
            match points.get(i + 1) {
                Some(end) if !end.is_kind_and_open(PointKind::Move) => {
                    update_line_join_points(
                        &mut bounds,
                        start,
                        middle,
                        end.point,
                        half_width,
                        miter_limit,
                    );
                }
                _ => update_line_end_points(&mut bounds, start, middle, half_width),
            }
            i += 1;
        }
        bounds.unwrap_or(Rect::ZERO)
    }

    /// Returns true if the path is an axis aligned rectangle.
    ///
    /// Only two encodings qualify: four points, or five points where the
    /// last returns to the first. Every edge must be a line that shares an
    /// x or y coordinate with its predecessor. Rectangles with zero width or
    /// height are rejected.
    pub fn is_rect(&self) -> bool {
        let points = &self.points;
        if !has_rect_shape(points) {
            return false;
        }
        if points[0].point == points[2].point {
            return false;
        }
        if !shares_axis(points[0].point, points[3].point) {
            return false;
        }
        (1..4).all(|i| {
            points[i].kind == PointKind::Line && shares_axis(points[i - 1].point, points[i].point)
        })
    }

    /// Returns the rectangle the path describes after applying `transform`.
    ///
    /// Returns `None` if the path is not a rectangle or the transform
    /// rotates or shears it off the axes.
    pub fn get_rect(&self, transform: Option<&Affine>) -> Option<Rect> {
        let points = &self.points;
        let Some(transform) = transform else {
            return self
                .is_rect()
                .then(|| Rect::from_points(points[0].point, points[2].point));
        };
        if !has_rect_shape(points) {
            return None;
        }
        if points.len() == 4 && !shares_axis(points[0].point, points[3].point) {
            return None;
        }
        let mut mapped = [Point::ZERO; 5];
        for (i, p) in points.iter().enumerate() {
            mapped[i] = *transform * p.point;
            if i == 0 {
                continue;
            }
            if p.kind != PointKind::Line || !shares_axis(mapped[i - 1], mapped[i]) {
                return None;
            }
        }
        (mapped[0] != mapped[2]).then(|| Rect::from_points(mapped[0], mapped[2]))
    }

    /// Finds the parts of the path that enclose no area and returns them as
    /// line segments, so they can be drawn as hairlines instead of being
    /// lost by the filler.
    ///
    /// With `adjust`, the segments of a lone line are transformed by
    /// `transform` and snapped to pixel centers.
    pub fn zero_area_path(&self, transform: Option<&Affine>, adjust: bool) -> Option<ZeroAreaPath> {
        let points = &self.points;
        let mut out = ZeroAreaPath {
            path: Self::new(),
            thin: false,
            set_identity: false,
        };
        if points.len() < 3 {
            return None;
        }
        if points.len() == 3
            && points[0].kind == PointKind::Move
            && points[1].kind == PointKind::Line
            && points[2].kind == PointKind::Line
            && points[0].point == points[2].point
        {
            for (i, p) in points[..2].iter().enumerate() {
                let mut point = p.point;
                if adjust {
                    if let Some(transform) = transform {
                        point = *transform * point;
                    }
                    point = Point::new(point.x.trunc() + 0.5, point.y.trunc() + 0.5);
                }
                let kind = if i == 0 { PointKind::Move } else { PointKind::Line };
                out.path.append_point(point, kind, false);
            }
            out.set_identity = adjust && transform.is_some();
            let (a, b) = (points[0].point, points[1].point);
            if a.x != b.x && a.y != b.y {
                out.thin = true;
            }
            return Some(out);
        }

        if points.len() > 3 && points.len() % 2 == 1 {
            if let Some(folded) = folded_path(points) {
                out.path = folded;
                out.thin = true;
                return Some(out);
            }
        }

        let mut start = 0;
        let mut i = 0;
        while i < points.len() {
            match points[i].kind {
                PointKind::Move => start = i,
                PointKind::Bezier => {
                    i += 3;
                    continue;
                }
                PointKind::Line if i > 0 => {
                    let mut next = (i + 1 - start) % (points.len() - start) + start;
                    let (prev, cur, after) = (points[i - 1], points[i], points[next]);
                    if after.kind != PointKind::Bezier && after.kind != PointKind::Move {
                        let (p, c, n) = (prev.point, cur.point, after.point);
                        if p.x == c.x && c.x == n.x && (c.y - p.y) * (c.y - n.y) > 0.0 {
                            let mut pre = i;
                            if (c.y - p.y).abs() < (c.y - n.y).abs() {
                                pre -= 1;
                                next = next.saturating_sub(1);
                            }
                            out.path.append_point(points[pre].point, PointKind::Move, false);
                            out.path.append_point(points[next].point, PointKind::Line, false);
                        } else if p.y == c.y && c.y == n.y && (c.x - p.x) * (c.x - n.x) > 0.0 {
                            let mut pre = i;
                            if (c.x - p.x).abs() < (c.x - n.x).abs() {
                                pre -= 1;
                                next = next.saturating_sub(1);
                            }
                            out.path.append_point(points[pre].point, PointKind::Move, false);
                            out.path.append_point(points[next].point, PointKind::Line, false);
                        } else if prev.kind == PointKind::Move
                            && after.kind == PointKind::Line
                            && p == n
                            && after.close
                        {
                            out.path.append_point(p, PointKind::Move, false);
                            out.path.append_point(c, PointKind::Line, false);
                            out.thin = true;
                        }
                    }
                }
                PointKind::Line => {}
            }
            i += 1;
        }
        if out.path.is_empty() {
            return None;
        }
        if points.len() > 3 {
            out.thin = true;
        }
        Some(out)
    }

    /// Converts the path to a kurbo path.
    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut i = 0;
        while i < self.points.len() {
            let p = self.points[i];
            let last = match p.kind {
                PointKind::Move => {
                    path.move_to(p.point);
                    p
                }
                PointKind::Line => {
                    path.line_to(p.point);
                    p
                }
                PointKind::Bezier => {
                    let (Some(c1), Some(end)) = (self.points.get(i + 1), self.points.get(i + 2))
                    else {
                        break;
                    };
                    path.curve_to(p.point, c1.point, end.point);
                    i += 2;
                    *end
                }
            };
            if last.close {
                path.close_path();
            }
            i += 1;
        }
        path
    }
}

impl FromIterator<PathEl> for Path {
    /// Collects kurbo path elements, converting quadratics to cubics.
    fn from_iter<I: IntoIterator<Item = PathEl>>(iter: I) -> Self {
        let mut path = Self::new();
        let mut current = Point::ZERO;
        for el in iter {
            match el {
                PathEl::MoveTo(p) => {
                    path.append_point(p, PointKind::Move, false);
                    current = p;
                }
                PathEl::LineTo(p) => {
                    path.append_point(p, PointKind::Line, false);
                    current = p;
                }
                PathEl::QuadTo(c, p) => {
                    let c1 = current + (c - current) * (2.0 / 3.0);
                    let c2 = c + (p - c) * (1.0 / 3.0);
                    path.append_point(c1, PointKind::Bezier, false);
                    path.append_point(c2, PointKind::Bezier, false);
                    path.append_point(p, PointKind::Bezier, false);
                    current = p;
                }
                PathEl::CurveTo(c1, c2, p) => {
                    path.append_point(c1, PointKind::Bezier, false);
                    path.append_point(c2, PointKind::Bezier, false);
                    path.append_point(p, PointKind::Bezier, false);
                    current = p;
                }
                PathEl::ClosePath => path.close_path(),
            }
        }
        path
    }
}

fn has_rect_shape(points: &[PathPoint]) -> bool {
    match points.len() {
        4 => points[1].point != points[3].point,
        5 => points[0].point == points[4].point && points[1].point != points[3].point,
        _ => false,
    }
}

fn shares_axis(a: Point, b: Point) -> bool {
    a.x == b.x || a.y == b.y
}

/// Recognizes an odd-length path that retraces itself around its middle
/// point and returns the traced segments.
fn folded_path(points: &[PathPoint]) -> Option<Path> {
    let mid = points.len() / 2;
    let mut path = Path::new();
    for i in 0..mid {
        let before = points[mid - i - 1];
        let after = points[mid + i + 1];
        if before.point != after.point
            || before.kind == PointKind::Bezier
            || after.kind == PointKind::Bezier
        {
            return None;
        }
        path.append_point(points[mid - i].point, PointKind::Move, false);
        path.append_point(before.point, PointKind::Line, false);
    }
    Some(path)
}

fn extend(bounds: &mut Option<Rect>, point: Point) {
    *bounds = Some(match bounds {
        Some(rect) => rect.union_pt(point),
        None => Rect::from_points(point, point),
    });
}

/// Extends `bounds` by a square cap at `end` of the segment from `start`.
fn update_line_end_points(bounds: &mut Option<Rect>, start: Point, end: Point, hw: f64) {
    if start.x == end.x {
        if start.y == end.y {
            extend(bounds, Point::new(end.x + hw, end.y + hw));
            extend(bounds, Point::new(end.x - hw, end.y - hw));
            return;
        }
        let y = if end.y < start.y { end.y - hw } else { end.y + hw };
        extend(bounds, Point::new(end.x + hw, y));
        extend(bounds, Point::new(end.x - hw, y));
        return;
    }
    if start.y == end.y {
        let x = if end.x < start.x { end.x - hw } else { end.x + hw };
        extend(bounds, Point::new(x, end.y + hw));
        extend(bounds, Point::new(x, end.y - hw));
        return;
    }
    let d = end - start;
    let len = d.hypot();
    let mx = end.x + hw * d.x / len;
    let my = end.y + hw * d.y / len;
    let dx1 = hw * d.y / len;
    let dy1 = hw * d.x / len;
    extend(bounds, Point::new(mx - dx1, my + dy1));
    extend(bounds, Point::new(mx + dx1, my - dy1));
}

/// A non-vertical line `y = k * x + c`, with `dc` the vertical offset of
/// the stroke edge from the center line.
#[derive(Copy, Clone)]
struct Edge {
    k: f64,
    c: f64,
    dc: f64,
}

impl Edge {
    fn new(from: Point, to: Point, hw: f64) -> Self {
        let k = (to.y - from.y) / (to.x - from.x);
        let c = to.y - k * to.x;
        let len = (from - to).hypot();
        let dc = (hw * len / (from.x - to.x)).abs();
        Self { k, c, dc }
    }

    fn at(&self, x: f64) -> f64 {
        self.k * x + self.c
    }

    /// Returns the intercept of the stroke edge on the far side from `p`.
    fn outside_c(&self, p: Point) -> f64 {
        if p.y < self.at(p.x) {
            self.c + self.dc
        } else {
            self.c - self.dc
        }
    }
}

/// Extends `bounds` by the outer corner of the join at `middle`.
fn update_line_join_points(
    bounds: &mut Option<Rect>,
    start: Point,
    middle: Point,
    end: Point,
    hw: f64,
    miter_limit: f64,
) {
    let start_vertical = (start.x - middle.x).abs() < STROKE_EPSILON;
    let end_vertical = (middle.x - end.x).abs() < STROKE_EPSILON;
    if start_vertical && end_vertical {
        let y = if middle.y > start.y { middle.y + hw } else { middle.y - hw };
        extend(bounds, Point::new(middle.x + hw, y));
        extend(bounds, Point::new(middle.x - hw, y));
        return;
    }
    let join = if start_vertical {
        let end_edge = Edge::new(middle, end, hw);
        let x = if end.x < start.x { start.x + hw } else { start.x - hw };
        Point::new(x, end_edge.k * x + end_edge.outside_c(start))
    } else if end_vertical {
        let start_edge = Edge::new(start, middle, hw);
        let x = if start.x < end.x { end.x + hw } else { end.x - hw };
        Point::new(x, start_edge.k * x + start_edge.outside_c(end))
    } else {
        let start_edge = Edge::new(start, middle, hw);
        let end_edge = Edge::new(middle, end, hw);
        if (start_edge.k - end_edge.k).abs() < STROKE_EPSILON {
            let start_dir = middle.x > start.x;
            let end_dir = end.x > middle.x;
            if start_dir == end_dir {
                update_line_end_points(bounds, middle, end, hw);
            } else {
                update_line_end_points(bounds, start, middle, hw);
            }
            return;
        }
        let start_c = start_edge.outside_c(end);
        let end_c = end_edge.outside_c(start);
        let x = (end_c - start_c) / (start_edge.k - end_edge.k);
        Point::new(x, start_edge.k * x + start_c)
    };
    if (join - middle).hypot() > miter_limit * hw {
        update_line_end_points(bounds, start, middle, hw);
        update_line_end_points(bounds, end, middle, hw);
        return;
    }
    extend(bounds, join);
}
