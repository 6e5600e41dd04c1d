//! Snapshot encode/apply.

use crate::surface::Surface;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use scrawl_core::shapes::Shape;
use thiserror::Error;

/// Snapshot codec failures.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("png encode failed: {0}")]
    Encode(#[from] png::EncodingError),
    #[error("png decode failed: {0}")]
    Decode(#[from] png::DecodingError),
    #[error("invalid base64 snapshot: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("unsupported snapshot pixel format")]
    UnsupportedFormat,
}

/// A full raster encoding of the canvas at a point in time: the unit of
/// network synchronization. Opaque PNG bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(Vec<u8>);

impl Snapshot {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Encode for the wire (the `snapshotBlob` field of drawing events).
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    /// Decode a wire blob. The PNG payload itself is validated lazily by
    /// [`apply`].
    pub fn from_base64(blob: &str) -> Result<Self, CodecError> {
        Ok(Self(STANDARD.decode(blob)?))
    }
}

/// Rasterize a derived shape sequence to a snapshot of the given canvas
/// size. Deterministic: identical shapes and dimensions produce identical
/// bytes.
pub fn encode(shapes: &[Shape], width: u32, height: u32) -> Result<Snapshot, CodecError> {
    let mut surface = Surface::new(width.max(1), height.max(1));
    for shape in shapes {
        surface.draw_shape(shape);
    }

    let mut data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut data, surface.width(), surface.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(surface.pixels())?;
    }
    Ok(Snapshot(data))
}

/// Display a received snapshot: decode it and fully overwrite the target
/// surface, dimensions included. Never a merge.
pub fn apply(snapshot: &Snapshot, target: &mut Surface) -> Result<(), CodecError> {
    let decoder = png::Decoder::new(snapshot.as_bytes());
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;

    if info.color_type != png::ColorType::Rgba || info.bit_depth != png::BitDepth::Eight {
        return Err(CodecError::UnsupportedFormat);
    }

    buf.truncate(info.buffer_size());
    target.replace(info.width, info.height, buf);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use scrawl_core::shapes::{Color, Line, Rectangle, TextBlock};

    fn sample_shapes() -> Vec<Shape> {
        let mut rect = Rectangle::new(Point::new(5.0, 5.0), Color::from_hex("#ff0000"));
        rect.drag_to(Point::new(30.0, 25.0));
        let mut line = Line::new(Point::new(0.0, 0.0), Color::black());
        line.drag_to(Point::new(40.0, 40.0));
        vec![
            Shape::Rectangle(rect),
            Shape::Line(line),
            Shape::Text(TextBlock::new(
                Point::new(4.0, 38.0),
                "hi".to_string(),
                Color::black(),
            )),
        ]
    }

    #[test]
    fn test_encode_is_deterministic() {
        let shapes = sample_shapes();
        let a = encode(&shapes, 64, 48).unwrap();
        let b = encode(&shapes, 64, 48).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_opposite_rect_drags_encode_identically() {
        let mut a = Rectangle::new(Point::new(10.0, 10.0), Color::black());
        a.drag_to(Point::new(30.0, 20.0));
        let mut b = Rectangle::new(Point::new(30.0, 20.0), Color::black());
        b.drag_to(Point::new(10.0, 10.0));

        let snap_a = encode(&[Shape::Rectangle(a)], 40, 30).unwrap();
        let snap_b = encode(&[Shape::Rectangle(b)], 40, 30).unwrap();
        assert_eq!(snap_a, snap_b);
    }

    #[test]
    fn test_apply_overwrites_target() {
        let snapshot = encode(&sample_shapes(), 64, 48).unwrap();

        // Target starts with different content and different dimensions.
        let mut target = Surface::new(10, 10);
        target.draw_line(Point::new(0.0, 0.0), Point::new(9.0, 9.0), Color::black());

        apply(&snapshot, &mut target).unwrap();
        assert_eq!(target.width(), 64);
        assert_eq!(target.height(), 48);

        let mut expected = Surface::new(64, 48);
        for shape in sample_shapes() {
            expected.draw_shape(&shape);
        }
        assert_eq!(target.pixels(), expected.pixels());
    }

    #[test]
    fn test_empty_shape_list_is_blank_canvas() {
        let snapshot = encode(&[], 16, 16).unwrap();
        let mut target = Surface::new(1, 1);
        apply(&snapshot, &mut target).unwrap();
        assert_eq!(target.pixels(), Surface::new(16, 16).pixels());
    }

    #[test]
    fn test_base64_roundtrip() {
        let snapshot = encode(&sample_shapes(), 32, 32).unwrap();
        let blob = snapshot.to_base64();
        let back = Snapshot::from_base64(&blob).unwrap();
        assert_eq!(snapshot, back);
    }

    #[test]
    fn test_invalid_base64_is_rejected() {
        assert!(matches!(
            Snapshot::from_base64("not//valid!!"),
            Err(CodecError::Base64(_))
        ));
    }

    #[test]
    fn test_garbage_bytes_fail_to_apply() {
        let bogus = Snapshot::from_bytes(vec![0u8; 16]);
        let mut target = Surface::new(4, 4);
        assert!(apply(&bogus, &mut target).is_err());
        // Failed apply leaves the target untouched.
        assert_eq!(target.pixels(), Surface::new(4, 4).pixels());
    }
}
