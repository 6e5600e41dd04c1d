//! Straight line shape.

use super::Color;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// A line from an anchor to `anchor + delta`. The delta components may be
/// negative; rendering must honor the sign rather than assume positive
/// extents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Pointer-down point; stays fixed for the life of the shape.
    pub anchor: Point,
    /// Endpoint offset from the anchor.
    pub delta: Vec2,
    /// Stroke color.
    pub color: Color,
}

impl Line {
    /// Create a zero-length line at the pointer-down point.
    pub fn new(anchor: Point, color: Color) -> Self {
        Self {
            anchor,
            delta: Vec2::ZERO,
            color,
        }
    }

    /// Recompute the delta so the endpoint tracks the pointer.
    pub fn drag_to(&mut self, point: Point) {
        self.delta = point - self.anchor;
    }

    /// Absolute endpoint of the line.
    pub fn endpoint(&self) -> Point {
        self.anchor + self.delta
    }
}
