// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Floating point helpers for outline geometry.

use kurbo::Vec2;

/// Tolerance below which lengths in em units are treated as zero.
const NEARLY_ZERO: f64 = 1.0 / (1 << 16) as f64;

pub(crate) trait FloatExt: Sized {
    /// Whether the number is approximately 0.
    fn is_nearly_zero(self) -> bool {
        self.is_nearly_zero_within_tolerance(NEARLY_ZERO)
    }

    /// Whether the number is approximately 0, with a given tolerance.
    fn is_nearly_zero_within_tolerance(self, tolerance: f64) -> bool;
}

impl FloatExt for f64 {
    #[inline(always)]
    fn is_nearly_zero_within_tolerance(self, tolerance: f64) -> bool {
        debug_assert!(tolerance >= 0.0, "tolerance must be positive");

        self.abs() <= tolerance
    }
}

/// Returns the unit vector along `v`, or `None` for a degenerate vector.
pub(crate) fn unit(v: Vec2) -> Option<Vec2> {
    let len = v.hypot();
    (!len.is_nearly_zero()).then(|| v / len)
}
