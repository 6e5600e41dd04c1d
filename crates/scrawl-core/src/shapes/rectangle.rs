//! Rectangle shape.

use super::Color;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle with signed width/height. Negative delta
/// components mean the opposite corner lies above/left of the anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    /// Pointer-down corner; stays fixed for the life of the shape.
    pub anchor: Point,
    /// Signed width/height to the opposite corner.
    pub delta: Vec2,
    /// Stroke color.
    pub color: Color,
}

impl Rectangle {
    /// Create a zero-size rectangle at the pointer-down point.
    pub fn new(anchor: Point, color: Color) -> Self {
        Self {
            anchor,
            delta: Vec2::ZERO,
            color,
        }
    }

    /// Recompute the delta so the opposite corner tracks the pointer.
    pub fn drag_to(&mut self, point: Point) {
        self.delta = point - self.anchor;
    }

    /// Sign-normalized extents (min/max corners in canvas coordinates).
    pub fn extents(&self) -> Rect {
        Rect::from_points(self.anchor, self.anchor + self.delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_delta_extents() {
        // Drag up-left: stored delta is negative but extents normalize.
        let mut rect = Rectangle::new(Point::new(100.0, 100.0), Color::black());
        rect.drag_to(Point::new(40.0, 60.0));
        assert_eq!(rect.delta, Vec2::new(-60.0, -40.0));
        assert_eq!(rect.extents(), Rect::new(40.0, 60.0, 100.0, 100.0));
    }

    #[test]
    fn test_opposite_drags_same_extents() {
        let mut a = Rectangle::new(Point::new(10.0, 20.0), Color::black());
        a.drag_to(Point::new(50.0, 80.0));
        let mut b = Rectangle::new(Point::new(50.0, 80.0), Color::black());
        b.drag_to(Point::new(10.0, 20.0));
        assert_ne!(a.delta, b.delta);
        assert_eq!(a.extents(), b.extents());
    }
}
