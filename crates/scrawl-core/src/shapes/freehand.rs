//! Freehand drawing shape (also the payload of erase strokes).

use super::Color;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A freehand polyline. The path always holds at least one vertex: it is
/// constructed from the pointer-down point and only ever appended to while
/// the stroke is in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Freehand {
    /// Origin point (the first vertex of the path).
    pub anchor: Point,
    /// Polyline vertices, in draw order.
    pub path: Vec<Point>,
    /// Stroke color.
    pub color: Color,
}

impl Freehand {
    /// Start a stroke at the pointer-down point.
    pub fn new(start: Point, color: Color) -> Self {
        Self {
            anchor: start,
            path: vec![start],
            color,
        }
    }

    /// Append a vertex to the path.
    pub fn add_point(&mut self, point: Point) {
        self.path.push(point);
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Bounding box of all path vertices.
    pub fn bounds(&self) -> Rect {
        let mut rect = Rect::from_origin_size(self.anchor, (0.0, 0.0));
        for p in &self.path {
            rect = rect.union_pt(*p);
        }
        rect
    }
}
