// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Device space clipping.

use alloc::sync::Arc;

use fontmap::{Error, Result};

use crate::bitmap::{DibBitmap, PixelFormat};

/// An integer rectangle in device pixels, exclusive of `right` and `bottom`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Debug)]
pub struct IntRect {
    /// Left edge.
    pub left: i32,
    /// Top edge.
    pub top: i32,
    /// Right edge, exclusive.
    pub right: i32,
    /// Bottom edge, exclusive.
    pub bottom: i32,
}

impl IntRect {
    /// Creates a rectangle from its edges.
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Creates a rectangle from an origin and a size.
    pub const fn from_origin_size(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self::new(left, top, left.saturating_add(width), top.saturating_add(height))
    }

    /// Returns the width, or zero for an inverted rectangle.
    pub fn width(self) -> i32 {
        self.right.saturating_sub(self.left).max(0)
    }

    /// Returns the height, or zero for an inverted rectangle.
    pub fn height(self) -> i32 {
        self.bottom.saturating_sub(self.top).max(0)
    }

    /// Returns true if the rectangle covers no pixels.
    pub fn is_empty(self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    /// Returns the overlap of two rectangles.
    ///
    /// Disjoint rectangles give an empty result with `right == left` and
    /// `bottom == top`.
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right.min(other.right).max(left);
        let bottom = self.bottom.min(other.bottom).max(top);
        Self::new(left, top, right, bottom)
    }

    /// Moves the rectangle by `(dx, dy)`, saturating at the `i32` range.
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.left.saturating_add(dx),
            self.top.saturating_add(dy),
            self.right.saturating_add(dx),
            self.bottom.saturating_add(dy),
        )
    }

    /// Returns true if the pixel at `(x, y)` lies inside.
    pub fn contains(self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }
}

/// The area a draw call may touch.
#[derive(Clone, Debug, PartialEq)]
pub enum ClipRegion {
    /// Everything inside the rectangle.
    Rect(IntRect),
    /// Pixels inside `rect`, weighted by an 8bpp coverage mask whose first
    /// pixel sits at the rectangle's top left corner.
    Mask {
        /// Bounds of the mask in device space.
        rect: IntRect,
        /// Coverage, one byte per pixel.
        mask: Arc<DibBitmap>,
    },
}

impl ClipRegion {
    /// Creates a rectangular region.
    pub fn rect(rect: IntRect) -> Self {
        Self::Rect(rect)
    }

    /// Creates a mask region.
    ///
    /// Fails with [`Error::UnsupportedFormat`] unless `mask` is an
    /// [`PixelFormat::EightBppMask`] bitmap the size of `rect`.
    pub fn mask(rect: IntRect, mask: Arc<DibBitmap>) -> Result<Self> {
        if mask.format() != PixelFormat::EightBppMask
            || i64::from(rect.width()) != i64::from(mask.width())
            || i64::from(rect.height()) != i64::from(mask.height())
        {
            return Err(Error::UnsupportedFormat);
        }
        Ok(Self::Mask { rect, mask })
    }

    /// Returns the bounding rectangle.
    pub fn bounds(&self) -> IntRect {
        match self {
            Self::Rect(rect) | Self::Mask { rect, .. } => *rect,
        }
    }

    /// Returns the coverage mask, if any.
    pub fn mask_bitmap(&self) -> Option<&Arc<DibBitmap>> {
        match self {
            Self::Rect(_) => None,
            Self::Mask { mask, .. } => Some(mask),
        }
    }

    /// Restricts the region to `rect`.
    ///
    /// A mask is cropped to the new bounds. If nothing is left, the region
    /// becomes an empty rectangle.
    pub fn intersect_rect(&mut self, rect: IntRect) {
        match self {
            Self::Rect(bounds) => *bounds = bounds.intersect(rect),
            Self::Mask {
                rect: bounds,
                mask,
            } => {
                let new_bounds = bounds.intersect(rect);
                if new_bounds == *bounds {
                    return;
                }
                if new_bounds.is_empty() {
                    *self = Self::Rect(new_bounds);
                    return;
                }
                let local = new_bounds.offset(-bounds.left, -bounds.top);
                match mask.clone_rect(local) {
                    Ok(cropped) => {
                        *bounds = new_bounds;
                        *mask = Arc::new(cropped);
                    }
                    Err(_) => *self = Self::Rect(IntRect::new(0, 0, 0, 0)),
                }
            }
        }
    }

    /// Returns the coverage row for device row `y`, starting at the left edge
    /// of the bounds.
    ///
    /// Rectangular regions and rows outside the mask have no scanline.
    pub fn mask_scan(&self, y: i32) -> Option<&[u8]> {
        let Self::Mask { rect, mask } = self else {
            return None;
        };
        let row = u32::try_from(y.checked_sub(rect.top)?).ok()?;
        if row >= mask.height() {
            return None;
        }
        let width = mask.width() as usize;
        Some(&mask.scanline(row)[..width])
    }
}
