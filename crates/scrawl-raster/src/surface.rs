//! Software raster surface.

use crate::font::{glyph, GLYPH_HEIGHT, GLYPH_WIDTH};
use kurbo::Point;
use scrawl_core::shapes::{Color, Shape, LINE_PITCH};

/// Integer glyph scale: 5x7 cells become 10x14 pixels, which sits well
/// under the 30px line pitch inherited from the canvas renderer.
const GLYPH_SCALE: u32 = 2;
/// Horizontal advance per character, in pixels.
const GLYPH_ADVANCE: i32 = ((GLYPH_WIDTH + 1) * GLYPH_SCALE) as i32;

/// An RGBA8 pixel buffer at canvas resolution. New surfaces start as a
/// white canvas, matching the clear color of the drawing surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![255u8; (width as usize) * (height as usize) * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 pixel data, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Replace the entire surface with new dimensions and pixel data.
    /// This is the receive path of snapshot sync: a full overwrite,
    /// never a merge.
    pub(crate) fn replace(&mut self, width: u32, height: u32, pixels: Vec<u8>) {
        self.width = width;
        self.height = height;
        self.pixels = pixels;
    }

    /// Read one pixel; out-of-bounds reads return None.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        Some(Color::new(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ))
    }

    /// Blend a pixel over the existing buffer contents. Out-of-bounds
    /// coordinates are clipped.
    fn blend_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        let idx = ((y as u32 * self.width + x as u32) * 4) as usize;
        let alpha = color.a as f32 / 255.0;
        let inv = 1.0 - alpha;
        self.pixels[idx] = (color.r as f32 * alpha + self.pixels[idx] as f32 * inv) as u8;
        self.pixels[idx + 1] = (color.g as f32 * alpha + self.pixels[idx + 1] as f32 * inv) as u8;
        self.pixels[idx + 2] = (color.b as f32 * alpha + self.pixels[idx + 2] as f32 * inv) as u8;
        self.pixels[idx + 3] = 255;
    }

    /// Draw a line segment with Bresenham's algorithm.
    pub fn draw_line(&mut self, from: Point, to: Point, color: Color) {
        let (x0, y0) = (from.x as i32, from.y as i32);
        let (x1, y1) = (to.x as i32, to.y as i32);

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            self.blend_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Draw connected segments through all points. A single point draws as
    /// a dot.
    pub fn draw_polyline(&mut self, points: &[Point], color: Color) {
        match points {
            [] => {}
            [only] => self.blend_pixel(only.x as i32, only.y as i32, color),
            _ => {
                for pair in points.windows(2) {
                    self.draw_line(pair[0], pair[1], color);
                }
            }
        }
    }

    /// Draw a rectangle outline between two opposite corners. Works for
    /// any corner order, so signed deltas render correctly.
    pub fn draw_rect_outline(&mut self, a: Point, b: Point, color: Color) {
        let c = Point::new(b.x, a.y);
        let d = Point::new(a.x, b.y);
        self.draw_line(a, c, color);
        self.draw_line(c, b, color);
        self.draw_line(b, d, color);
        self.draw_line(d, a, color);
    }

    /// Draw text line by line from the anchor at fixed pitch. The anchor is
    /// the baseline of the first line, as with canvas text.
    pub fn draw_text(&mut self, anchor: Point, content: &str, color: Color) {
        let glyph_height = (GLYPH_HEIGHT * GLYPH_SCALE) as i32;
        let mut baseline = anchor.y as i32;
        for line in content.split('\n') {
            let top = baseline - glyph_height;
            let mut left = anchor.x as i32;
            for c in line.chars() {
                self.draw_glyph(left, top, c, color);
                left += GLYPH_ADVANCE;
            }
            baseline += LINE_PITCH as i32;
        }
    }

    fn draw_glyph(&mut self, left: i32, top: i32, c: char, color: Color) {
        let rows = glyph(c);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (0x10 >> col) == 0 {
                    continue;
                }
                // Scale each font cell to a GLYPH_SCALE square block.
                for dy in 0..GLYPH_SCALE {
                    for dx in 0..GLYPH_SCALE {
                        self.blend_pixel(
                            left + (col * GLYPH_SCALE + dx) as i32,
                            top + (row as u32 * GLYPH_SCALE + dy) as i32,
                            color,
                        );
                    }
                }
            }
        }
    }

    /// Rasterize one shape.
    pub fn draw_shape(&mut self, shape: &Shape) {
        match shape {
            Shape::Freehand(stroke) | Shape::Erase(stroke) => {
                self.draw_polyline(&stroke.path, stroke.color);
            }
            Shape::Line(line) => self.draw_line(line.anchor, line.endpoint(), line.color),
            Shape::Rectangle(rect) => {
                self.draw_rect_outline(rect.anchor, rect.anchor + rect.delta, rect.color);
            }
            Shape::Text(text) => self.draw_text(text.anchor, &text.content, text.color),
        }
    }
}
