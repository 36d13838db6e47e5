use super::{Edges, Point, Size};

/// A rectangle in layout coordinates.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Rect {
    /// Top-left corner.
    pub tl: Point,
    /// Width.
    pub w: u32,
    /// Height.
    pub h: u32,
}

impl Rect {
    /// Construct a rectangle from a location and dimensions.
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            tl: Point { x, y },
            w,
            h,
        }
    }

    /// A zero-valued rectangle at the origin.
    pub fn zero() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Construct a rectangle at a location with the given size.
    pub fn at(tl: Point, size: Size) -> Self {
        Self {
            tl,
            w: size.w,
            h: size.h,
        }
    }

    /// The dimensions of this rectangle.
    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    /// Does this rectangle contain the point?
    pub fn contains_point(&self, p: Point) -> bool {
        if p.x < self.tl.x || p.x >= self.tl.x.saturating_add(self.w) {
            false
        } else {
            !(p.y < self.tl.y || p.y >= self.tl.y.saturating_add(self.h))
        }
    }

    /// Shrink by a set of edge widths. Edges larger than the rectangle
    /// collapse the affected dimension to zero.
    pub fn shrink(&self, edges: Edges) -> Self {
        Self {
            tl: Point {
                x: self.tl.x.saturating_add(edges.left),
                y: self.tl.y.saturating_add(edges.top),
            },
            w: self.w.saturating_sub(edges.horizontal()),
            h: self.h.saturating_sub(edges.vertical()),
        }
    }
}
