//! Screen geometry primitives in top-left global coordinates (y grows downward).

use serde::{Deserialize, Serialize};

/// Absolute screen position of a window's top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal offset.
    pub x: i32,
    /// Vertical offset.
    pub y: i32,
}

impl Point {
    /// Point at `(x, y)`.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Window extent in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    /// Horizontal extent.
    pub width: u32,
    /// Vertical extent.
    pub height: u32,
}

impl Size {
    /// Size of `width`x`height`.
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Screen rectangle: an icon's bounds, or a display work area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub w: u32,
    /// Height.
    pub h: u32,
}

impl Rect {
    /// Rectangle with origin `(x, y)`.
    #[inline]
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Left edge.
    #[inline]
    pub fn left(&self) -> i32 {
        self.x
    }
    /// Top edge.
    #[inline]
    pub fn top(&self) -> i32 {
        self.y
    }
    /// One past the right edge.
    #[inline]
    pub fn right(&self) -> i32 {
        self.x.saturating_add(extent(self.w))
    }
    /// One past the bottom edge.
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(extent(self.h))
    }
    /// Horizontal center.
    #[inline]
    pub fn cx(&self) -> i32 {
        self.x.saturating_add(extent(self.w) / 2)
    }
    /// Vertical center.
    #[inline]
    pub fn cy(&self) -> i32 {
        self.y.saturating_add(extent(self.h) / 2)
    }

    /// Icon backends report an all-zero origin when they have no real
    /// bounds to give; an x of 0 marks such a rectangle as unusable.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.x == 0
    }
}

/// Convert an unsigned extent into signed coordinate space.
#[inline]
pub(crate) fn extent(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// Clamp `v` into `[lo, hi]`, collapsing the range to `lo` if it is inverted.
#[inline]
pub(crate) fn clamp_axis(v: i32, lo: i32, hi: i32) -> i32 {
    let hi = hi.max(lo);
    v.clamp(lo, hi)
}
