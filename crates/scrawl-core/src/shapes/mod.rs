//! Shape definitions for the whiteboard.

mod freehand;
mod line;
mod rectangle;
mod text;

pub use freehand::Freehand;
pub use line::Line;
pub use rectangle::Rectangle;
pub use text::{TextBlock, LINE_PITCH};

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Stroke color (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Parse a hex color string (`#rgb`, `#rrggbb`, `#rrggbbaa`).
    /// Unparseable input falls back to black, matching the tolerant
    /// color handling of canvas color attributes.
    pub fn from_hex(value: &str) -> Self {
        let Some(hex) = value.strip_prefix('#') else {
            return Self::black();
        };
        let hex = hex.trim();
        if !hex.is_ascii() {
            return Self::black();
        }
        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).unwrap_or(0) * 17;
                let g = u8::from_str_radix(&hex[1..2], 16).unwrap_or(0) * 17;
                let b = u8::from_str_radix(&hex[2..3], 16).unwrap_or(0) * 17;
                Self::new(r, g, b, 255)
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
                Self::new(r, g, b, 255)
            }
            8 => {
                let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
                let a = u8::from_str_radix(&hex[6..8], 16).unwrap_or(255);
                Self::new(r, g, b, a)
            }
            _ => Self::black(),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// A drawn element. One variant per tool kind, each carrying only its
/// relevant geometry.
///
/// `Erase` shares the freehand payload: an erase stroke is a polyline
/// painted in the background color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Shape {
    Freehand(Freehand),
    Erase(Freehand),
    Line(Line),
    Rectangle(Rectangle),
    Text(TextBlock),
}

impl Shape {
    /// Origin point of the shape.
    pub fn anchor(&self) -> Point {
        match self {
            Shape::Freehand(s) | Shape::Erase(s) => s.anchor,
            Shape::Line(s) => s.anchor,
            Shape::Rectangle(s) => s.anchor,
            Shape::Text(s) => s.anchor,
        }
    }

    /// Stroke color of the shape.
    pub fn color(&self) -> Color {
        match self {
            Shape::Freehand(s) | Shape::Erase(s) => s.color,
            Shape::Line(s) => s.color,
            Shape::Rectangle(s) => s.color,
            Shape::Text(s) => s.color,
        }
    }

    /// Bounding box in canvas coordinates.
    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Freehand(s) | Shape::Erase(s) => s.bounds(),
            Shape::Line(s) => Rect::from_points(s.anchor, s.endpoint()),
            Shape::Rectangle(s) => s.extents(),
            Shape::Text(s) => s.bounds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Color::from_hex("#000000"), Color::black());
        assert_eq!(Color::from_hex("#fff"), Color::white());
        assert_eq!(Color::from_hex("#ff0000"), Color::new(255, 0, 0, 255));
        assert_eq!(Color::from_hex("#00ff0080"), Color::new(0, 255, 0, 128));
        // Garbage falls back to black
        assert_eq!(Color::from_hex("red"), Color::black());
        assert_eq!(Color::from_hex("#12345"), Color::black());
    }

    #[test]
    fn test_shape_accessors() {
        let line = Shape::Line(Line::new(Point::new(1.0, 2.0), Color::black()));
        assert_eq!(line.anchor(), Point::new(1.0, 2.0));
        assert_eq!(line.color(), Color::black());
    }
}
