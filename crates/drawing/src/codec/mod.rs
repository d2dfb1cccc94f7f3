//! Binary codec for drawings
//!
//! Layout (little-endian throughout):
//!
//! ```text
//! header       43 bytes ASCII, identifies V3 or V5
//! layer_count  u32
//!   stroke_count u32
//!     brush_type u32, brush_color u32, reserved u32, brush_size f32,
//!     [extra f32, V5 only], dot_count u32
//!       x f32, y f32, speed f32, tilt f32, width f32, pressure f32
//! ```
//!
//! Decoding is all-or-nothing: a failed read never yields a partial drawing.

mod reader;
mod writer;

pub use reader::{read_drawing, DrawingReader};
pub use writer::{write_drawing, DrawingWriter};

use thiserror::Error;

use crate::types::Drawing;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Malformed header: not a V3 or V5 drawing")]
    MalformedHeader,

    #[error("Truncated data while reading {context}")]
    TruncatedData { context: &'static str },

    #[error("Too many {context} to encode: {count}")]
    CountOverflow { context: &'static str, count: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Drawing {
    /// Decode a drawing from an in-memory buffer
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        read_drawing(bytes)
    }

    /// Encode the drawing into a new buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::with_capacity(self.encoded_len());
        write_drawing(self, &mut out)?;
        Ok(out)
    }

    /// Exact size of the encoded drawing in bytes
    pub fn encoded_len(&self) -> usize {
        let stroke_len = 4 * 5 + if self.version.has_stroke_extra() { 4 } else { 0 };
        crate::constants::HEADER_LEN
            + 4
            + self
                .layers
                .iter()
                .map(|layer| {
                    4 + layer
                        .strokes
                        .iter()
                        .map(|s| stroke_len + s.dots.len() * crate::constants::DOT_SIZE)
                        .sum::<usize>()
                })
                .sum::<usize>()
    }
}
