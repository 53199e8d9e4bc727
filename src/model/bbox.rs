//! Axis-aligned page rectangles.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in page pixels.
///
/// `x2`/`y2` are exclusive, so `width = x2 - x1`. Constructors keep
/// `x2 >= x1` and `y2 >= y1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BBox {
    /// Create a box from two corners, normalizing their order.
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Create a box from origin and size.
    pub fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width.max(0), y + height.max(0))
    }

    /// Box covering a whole `width` x `height` raster.
    pub fn of_image(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    /// Check if the box has no area.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Inflate the box symmetrically by `margin` pixels on every side.
    pub fn pad(&self, margin: i32) -> Self {
        Self::new(
            self.x1 - margin,
            self.y1 - margin,
            self.x2 + margin,
            self.y2 + margin,
        )
    }

    /// Clip the box to a `width` x `height` raster.
    pub fn clamp(&self, width: u32, height: u32) -> Self {
        let (w, h) = (width as i32, height as i32);
        Self::new(
            self.x1.clamp(0, w),
            self.y1.clamp(0, h),
            self.x2.clamp(0, w),
            self.y2.clamp(0, h),
        )
    }

    /// Shift the box by `(dx, dy)`.
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            x1: self.x1 + dx,
            y1: self.y1 + dy,
            x2: self.x2 + dx,
            y2: self.y2 + dy,
        }
    }

    /// Check if `other` lies entirely inside this box (edges may touch).
    pub fn contains(&self, other: &BBox) -> bool {
        other.x1 >= self.x1 && other.y1 >= self.y1 && other.x2 <= self.x2 && other.y2 <= self.y2
    }

    /// Check if the two boxes share any area.
    pub fn intersects(&self, other: &BBox) -> bool {
        self.x1 < other.x2 && other.x1 < self.x2 && self.y1 < other.y2 && other.y1 < self.y2
    }

    /// Smallest box covering both boxes.
    pub fn union(&self, other: &BBox) -> Self {
        Self {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }
}

impl std::fmt::Display for BBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_normalizes_corners() {
        let b = BBox::new(10, 20, 0, 5);
        assert_eq!(b, BBox::new(0, 5, 10, 20));
        assert_eq!(b.width(), 10);
        assert_eq!(b.height(), 15);
    }

    #[test]
    fn test_pad_and_clamp() {
        let b = BBox::new(2, 3, 10, 10).pad(5);
        assert_eq!(b, BBox::new(-3, -2, 15, 15));
        assert_eq!(b.clamp(12, 100), BBox::new(0, 0, 12, 15));
    }

    #[test]
    fn test_union() {
        let a = BBox::new(10, 20, 50, 40);
        let b = BBox::new(30, 5, 80, 25);
        assert_eq!(a.union(&b), BBox::new(10, 5, 80, 40));
        assert_eq!(a.union(&a), a);
        assert!(a.union(&b).contains(&a) && a.union(&b).contains(&b));
    }

    #[test]
    fn test_contains() {
        let outer = BBox::new(0, 0, 100, 100);
        assert!(outer.contains(&BBox::new(10, 10, 100, 50)));
        assert!(outer.contains(&outer));
        assert!(!outer.contains(&BBox::new(10, 10, 101, 50)));
    }

    #[test]
    fn test_intersects_excludes_touching_edges() {
        let a = BBox::new(0, 0, 10, 10);
        assert!(a.intersects(&BBox::new(5, 5, 20, 20)));
        assert!(!a.intersects(&BBox::new(10, 0, 20, 10)));
    }

    #[test]
    fn test_from_xywh() {
        let b = BBox::from_xywh(4, 6, 10, 2);
        assert_eq!(b, BBox::new(4, 6, 14, 8));
        assert_eq!(b.area(), 20);
        assert!(BBox::from_xywh(0, 0, 0, 5).is_empty());
    }
}
