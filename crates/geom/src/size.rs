use super::{Edges, Point, Rect};

/// The largest representable dimension. Stands in for "no maximum": saturating
/// arithmetic keeps it pinned at the ceiling, so a sum or union involving an
/// unbounded axis stays unbounded.
pub const MAX_DIM: u32 = u32::MAX;

/// A width and height without a location.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Size {
    /// Width.
    pub w: u32,
    /// Height.
    pub h: u32,
}

impl Default for Size {
    /// Constructs a zero-valued size.
    fn default() -> Self {
        Self { w: 0, h: 0 }
    }
}

impl Size {
    /// Construct a size from a width and height.
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    /// The zero size.
    pub fn zero() -> Self {
        Self::default()
    }

    /// A size unconstrained on both axes.
    pub fn unbounded() -> Self {
        Self {
            w: MAX_DIM,
            h: MAX_DIM,
        }
    }

    /// True if both components are zero.
    pub fn is_zero(&self) -> bool {
        self.w == 0 && self.h == 0
    }

    /// Component-wise minimum.
    pub fn min(&self, other: Self) -> Self {
        Self {
            w: self.w.min(other.w),
            h: self.h.min(other.h),
        }
    }

    /// Component-wise maximum.
    pub fn max(&self, other: Self) -> Self {
        Self {
            w: self.w.max(other.w),
            h: self.h.max(other.h),
        }
    }

    /// Component-wise saturating sum.
    pub fn add(&self, other: Self) -> Self {
        Self {
            w: self.w.saturating_add(other.w),
            h: self.h.saturating_add(other.h),
        }
    }

    /// Component-wise saturating difference.
    pub fn sub(&self, other: Self) -> Self {
        Self {
            w: self.w.saturating_sub(other.w),
            h: self.h.saturating_sub(other.h),
        }
    }

    /// Grow by the total extent of a set of edges.
    pub fn grow(&self, edges: Edges) -> Self {
        self.add(edges.size())
    }

    /// Clamp component-wise into the `lo..=hi` band. Where `lo` exceeds `hi`,
    /// `lo` wins: a minimum is never surrendered to satisfy a maximum.
    pub fn clamp(&self, lo: Self, hi: Self) -> Self {
        Self {
            w: self.w.min(hi.w).max(lo.w),
            h: self.h.min(hi.h).max(lo.h),
        }
    }

    /// True if this size can completely enclose the other in both dimensions.
    pub fn contains(&self, other: &Self) -> bool {
        self.w >= other.w && self.h >= other.h
    }

    /// Return a `Rect` with the same dimensions and a location at (0, 0).
    pub fn rect(&self) -> Rect {
        Rect {
            tl: Point::default(),
            w: self.w,
            h: self.h,
        }
    }
}

impl From<Rect> for Size {
    fn from(r: Rect) -> Self {
        Self { w: r.w, h: r.h }
    }
}

impl From<(u32, u32)> for Size {
    fn from(v: (u32, u32)) -> Self {
        Self { w: v.0, h: v.1 }
    }
}
