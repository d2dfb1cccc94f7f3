use std::io::{ErrorKind, Read};

use tracing::debug;

use super::CodecError;
use crate::constants::{DOT_SIZE, HEADER_LEN, HEADER_V3, HEADER_V5, MAX_PREALLOC};
use crate::types::{BrushColor, BrushSize, BrushType, Dot, Drawing, Layer, Stroke, Version};

/// Decode a drawing from a byte stream
pub fn read_drawing<R: Read>(reader: R) -> Result<Drawing, CodecError> {
    DrawingReader::new(reader).read()
}

/// Streaming reader for the binary drawing format
pub struct DrawingReader<R: Read> {
    reader: R,
}

impl<R: Read> DrawingReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read one complete drawing.
    ///
    /// Consumes exactly the header when it is rejected.
    pub fn read(mut self) -> Result<Drawing, CodecError> {
        let version = self.read_header()?;
        let layer_count = self.read_u32("layer count")?;

        let mut layers = Vec::with_capacity((layer_count as usize).min(MAX_PREALLOC));
        for _ in 0..layer_count {
            layers.push(self.read_layer(version)?);
        }

        debug!(
            "DrawingReader::read: {:?} drawing with {} layers",
            version,
            layers.len()
        );

        Ok(Drawing { version, layers })
    }

    /// Consume the trailing reader, e.g. to check for unread bytes
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_header(&mut self) -> Result<Version, CodecError> {
        let mut header = [0u8; HEADER_LEN];
        let filled = self.fill(&mut header)?;

        if filled < HEADER_LEN {
            // A cut-off known header is truncation, anything else is not a drawing
            let prefix = &header[..filled];
            if HEADER_V3.starts_with(prefix) || HEADER_V5.starts_with(prefix) {
                return Err(CodecError::TruncatedData { context: "header" });
            }
            return Err(CodecError::MalformedHeader);
        }

        Version::from_header(&header).ok_or(CodecError::MalformedHeader)
    }

    fn read_layer(&mut self, version: Version) -> Result<Layer, CodecError> {
        let stroke_count = self.read_u32("stroke count")?;
        let mut strokes = Vec::with_capacity((stroke_count as usize).min(MAX_PREALLOC));
        for _ in 0..stroke_count {
            strokes.push(self.read_stroke(version)?);
        }
        Ok(Layer { strokes })
    }

    fn read_stroke(&mut self, version: Version) -> Result<Stroke, CodecError> {
        let brush_type = BrushType::from_raw(self.read_u32("brush type")?);
        let brush_color = BrushColor::from_raw(self.read_u32("brush color")?);
        let reserved = self.read_u32("reserved field")?;
        let brush_size = BrushSize::from_raw(self.read_f32("brush size")?);
        let extra = if version.has_stroke_extra() {
            self.read_f32("stroke extra field")?
        } else {
            0.0
        };

        let dot_count = self.read_u32("dot count")? as usize;
        let mut dots = Vec::with_capacity(dot_count.min(MAX_PREALLOC));
        let mut record = [0u8; DOT_SIZE];
        for _ in 0..dot_count {
            self.read_exact(&mut record, "dot")?;
            dots.push(decode_dot(&record));
        }

        Ok(Stroke {
            brush_type,
            brush_color,
            reserved,
            brush_size,
            extra,
            dots,
        })
    }

    fn read_u32(&mut self, context: &'static str) -> Result<u32, CodecError> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf, context)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn read_f32(&mut self, context: &'static str) -> Result<f32, CodecError> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf, context)?;
        Ok(f32::from_le_bytes(buf))
    }

    fn read_exact(&mut self, buf: &mut [u8], context: &'static str) -> Result<(), CodecError> {
        self.reader.read_exact(buf).map_err(|err| match err.kind() {
            ErrorKind::UnexpectedEof => CodecError::TruncatedData { context },
            _ => CodecError::Io(err),
        })
    }

    /// Read until `buf` is full or the stream ends, returning the byte count
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize, CodecError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(CodecError::Io(err)),
            }
        }
        Ok(filled)
    }
}

fn decode_dot(record: &[u8; DOT_SIZE]) -> Dot {
    let field = |i: usize| {
        let start = i * 4;
        f32::from_le_bytes([
            record[start],
            record[start + 1],
            record[start + 2],
            record[start + 3],
        ])
    };
    Dot {
        x: field(0),
        y: field(1),
        speed: field(2),
        tilt: field(3),
        width: field(4),
        pressure: field(5),
    }
}
