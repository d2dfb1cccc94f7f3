use std::io::Write;

use super::CodecError;
use crate::types::{Dot, Drawing, Stroke, Version};

/// Encode a drawing into a byte stream
pub fn write_drawing<W: Write>(drawing: &Drawing, writer: W) -> Result<(), CodecError> {
    DrawingWriter::new(writer).write(drawing)
}

/// Streaming writer for the binary drawing format.
///
/// Mirrors [`super::DrawingReader`] field for field, so anything read
/// re-encodes to identical bytes.
pub struct DrawingWriter<W: Write> {
    writer: W,
}

impl<W: Write> DrawingWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write(mut self, drawing: &Drawing) -> Result<(), CodecError> {
        let version = drawing.version;
        self.writer.write_all(version.header())?;
        self.write_count(drawing.layers.len(), "layers")?;

        for layer in &drawing.layers {
            self.write_count(layer.strokes.len(), "strokes")?;
            for stroke in &layer.strokes {
                self.write_stroke(stroke, version)?;
            }
        }

        self.writer.flush()?;
        Ok(())
    }

    fn write_stroke(&mut self, stroke: &Stroke, version: Version) -> Result<(), CodecError> {
        self.write_u32(stroke.brush_type.raw())?;
        self.write_u32(stroke.brush_color.raw())?;
        self.write_u32(stroke.reserved)?;
        self.write_f32(stroke.brush_size.raw())?;
        if version.has_stroke_extra() {
            self.write_f32(stroke.extra)?;
        }
        self.write_count(stroke.dots.len(), "dots")?;
        for dot in &stroke.dots {
            self.write_dot(dot)?;
        }
        Ok(())
    }

    fn write_dot(&mut self, dot: &Dot) -> Result<(), CodecError> {
        for value in [dot.x, dot.y, dot.speed, dot.tilt, dot.width, dot.pressure] {
            self.write_f32(value)?;
        }
        Ok(())
    }

    fn write_count(&mut self, count: usize, context: &'static str) -> Result<(), CodecError> {
        let count =
            u32::try_from(count).map_err(|_| CodecError::CountOverflow { context, count })?;
        self.write_u32(count)
    }

    fn write_u32(&mut self, value: u32) -> Result<(), CodecError> {
        self.writer.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    fn write_f32(&mut self, value: f32) -> Result<(), CodecError> {
        self.writer.write_all(&value.to_le_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{HEADER_LEN, HEADER_V3};
    use crate::types::{BrushColor, BrushSize, BrushType};

    #[test]
    fn test_empty_drawing_layout() {
        let bytes = Drawing::with_version(Version::V3).to_bytes().unwrap();

        assert_eq!(&bytes[..HEADER_LEN], HEADER_V3);
        // one layer, zero strokes
        assert_eq!(&bytes[HEADER_LEN..], &[1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_extra_field_only_in_v5() {
        let stroke = Stroke::new(BrushType::Fineliner, BrushColor::Black, BrushSize::Small);

        let mut v3 = Drawing::with_version(Version::V3);
        v3.append_stroke(stroke.clone());
        let mut v5 = Drawing::with_version(Version::V5);
        v5.append_stroke(stroke);

        let v3_bytes = v3.to_bytes().unwrap();
        let v5_bytes = v5.to_bytes().unwrap();
        assert_eq!(v5_bytes.len(), v3_bytes.len() + 4);
        assert_eq!(v3_bytes.len(), v3.encoded_len());
        assert_eq!(v5_bytes.len(), v5.encoded_len());
    }

    #[test]
    fn test_stroke_record_order() {
        let mut drawing = Drawing::with_version(Version::V5);
        let mut stroke = Stroke::new(BrushType::MarkerV5, BrushColor::White, BrushSize::Large);
        stroke.reserved = 7;
        stroke.extra = 1.5;
        drawing.append_stroke(stroke);

        let bytes = drawing.to_bytes().unwrap();
        let record = &bytes[HEADER_LEN + 8..];
        assert_eq!(&record[0..4], &16u32.to_le_bytes());
        assert_eq!(&record[4..8], &2u32.to_le_bytes());
        assert_eq!(&record[8..12], &7u32.to_le_bytes());
        assert_eq!(&record[12..16], &2.125f32.to_le_bytes());
        assert_eq!(&record[16..20], &1.5f32.to_le_bytes());
        assert_eq!(&record[20..24], &0u32.to_le_bytes());
    }
}
