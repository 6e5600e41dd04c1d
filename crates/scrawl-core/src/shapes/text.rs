//! Text block shape.

use super::Color;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Vertical distance between successive text lines, in canvas units.
pub const LINE_PITCH: f64 = 30.0;

/// A block of text rendered line by line from the anchor at fixed pitch.
/// A text block is only ever committed with non-empty content; an empty
/// in-progress entry is discarded by the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Baseline origin of the first line.
    pub anchor: Point,
    /// Text content; may embed `\n` line separators.
    pub content: String,
    /// Fill color.
    pub color: Color,
}

impl TextBlock {
    pub fn new(anchor: Point, content: String, color: Color) -> Self {
        Self {
            anchor,
            content,
            color,
        }
    }

    /// Lines of the block, in render order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }

    /// Approximate bounding box from line count and the longest line.
    /// Width is a character-count estimate; exact metrics belong to the
    /// rasterizer.
    pub fn bounds(&self) -> Rect {
        let line_count = self.lines().count();
        let widest = self.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        Rect::from_origin_size(
            self.anchor,
            (widest as f64 * LINE_PITCH / 2.0, line_count as f64 * LINE_PITCH),
        )
    }
}
