//! Plane rectangles and texture boxes.
//!
//! [`Rect`] addresses pixels of one plane for copies and crops;
//! [`Region`] addresses a box of a texture subresource for uploads.
//! Both put the origin at the top-left corner.
//!
//! ```rust
//! use gorgon_core::{Rect, Region};
//!
//! let visible = Rect::new(4, 4, 16, 8).clamp_to(12, 10).unwrap();
//! assert_eq!(visible, Rect::new(4, 4, 8, 6));
//!
//! let slab = Region::from_size(8, 8, 2);
//! assert!(slab.fits(8, 8, 4));
//! ```

use std::fmt;

/// Pixel rectangle: origin plus extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// First column.
    pub x: u32,
    /// First row.
    pub y: u32,
    /// Columns covered.
    pub width: u32,
    /// Rows covered.
    pub height: u32,
}

impl Rect {
    /// Rectangle at `(x, y)` spanning `width x height` pixels.
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Rect { x, y, width, height }
    }

    /// Rectangle covering a whole `width x height` plane.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Rect { x: 0, y: 0, width, height }
    }

    /// One past the last column.
    #[inline]
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// One past the last row.
    #[inline]
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// No pixels covered.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` when pixel `(x, y)` is covered.
    #[inline]
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && y >= self.y && x < self.right() && y < self.bottom()
    }

    /// Overlap of two rectangles; `None` when they share no pixel.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let (left, right) = (self.x.max(other.x), self.right().min(other.right()));
        let (top, bottom) = (self.y.max(other.y), self.bottom().min(other.bottom()));
        (left < right && top < bottom).then(|| Rect::new(left, top, right - left, bottom - top))
    }

    /// Part of the rectangle that lies on a `width x height` plane.
    #[inline]
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Rect> {
        self.intersect(&Rect::from_size(width, height))
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Box inside a texture subresource.
///
/// `left`, `top` and `front` are inclusive; `right`, `bottom` and `back`
/// are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Region {
    /// Left edge.
    pub left: u32,
    /// Top edge.
    pub top: u32,
    /// Front slice.
    pub front: u32,
    /// Right edge.
    pub right: u32,
    /// Bottom edge.
    pub bottom: u32,
    /// Back slice.
    pub back: u32,
}

impl Region {
    /// Box from its six edges.
    #[inline]
    pub const fn new(left: u32, top: u32, front: u32, right: u32, bottom: u32, back: u32) -> Self {
        Region { left, top, front, right, bottom, back }
    }

    /// Box anchored at the origin.
    #[inline]
    pub const fn from_size(width: u32, height: u32, depth: u32) -> Self {
        Region::new(0, 0, 0, width, height, depth)
    }

    /// Extent along x.
    #[inline]
    pub const fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    /// Extent along y.
    #[inline]
    pub const fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    /// Slices covered.
    #[inline]
    pub const fn depth(&self) -> u32 {
        self.back.saturating_sub(self.front)
    }

    /// Returns `true` when the box holds no texel.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0 || self.depth() == 0
    }

    /// Returns `true` when the box lies inside a `width x height x depth`
    /// subresource.
    #[inline]
    pub const fn fits(&self, width: u32, height: u32, depth: u32) -> bool {
        self.right <= width && self.bottom <= height && self.back <= depth
    }

    /// Footprint of one slice.
    #[inline]
    pub const fn footprint(&self) -> Rect {
        Rect::new(self.left, self.top, self.width(), self.height())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{} x {}..{} x {}..{}", self.left, self.right, self.top, self.bottom, self.front, self.back)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_overlap() {
        let plane = Rect::from_size(8, 8);
        assert_eq!(plane.intersect(&Rect::new(6, 2, 4, 4)), Some(Rect::new(6, 2, 2, 4)));
        assert_eq!(plane.intersect(&Rect::new(8, 0, 1, 1)), None);
        assert!(Rect::new(2, 2, 0, 5).is_empty());
    }

    #[test]
    fn test_rect_contains_edges() {
        let r = Rect::new(1, 1, 2, 2);
        assert!(r.contains(1, 1));
        assert!(r.contains(2, 2));
        assert!(!r.contains(3, 2));
        assert!(!r.contains(0, 1));
    }

    #[test]
    fn test_rect_clamp() {
        assert_eq!(Rect::new(3, 0, 10, 2).clamp_to(5, 5), Some(Rect::new(3, 0, 2, 2)));
        assert!(Rect::new(5, 5, 1, 1).clamp_to(4, 4).is_none());
        assert_eq!(Rect::new(u32::MAX - 1, 0, 10, 1).right(), u32::MAX);
    }

    #[test]
    fn test_region_extents() {
        let region = Region::new(2, 3, 1, 10, 7, 4);
        assert_eq!((region.width(), region.height(), region.depth()), (8, 4, 3));
        assert!(region.fits(10, 7, 4));
        assert!(!region.fits(9, 7, 4));
        assert_eq!(region.footprint(), Rect::new(2, 3, 8, 4));
        assert!(Region::from_size(4, 4, 0).is_empty());
        assert!(Region::new(3, 0, 0, 2, 1, 1).is_empty());
    }
}
