use serde::{Deserialize, Serialize};

use crate::constants::{
    BRUSH_SIZE_LARGE, BRUSH_SIZE_MEDIUM, BRUSH_SIZE_SMALL, HEADER_LEN, HEADER_V3, HEADER_V5,
};

/// Binary layout version of a drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Version {
    V3,
    #[default]
    V5,
}

impl Version {
    /// The fixed ASCII header written at the start of a drawing of this version
    pub fn header(self) -> &'static [u8; HEADER_LEN] {
        match self {
            Version::V3 => HEADER_V3,
            Version::V5 => HEADER_V5,
        }
    }

    /// Identify the version from a complete header
    pub fn from_header(header: &[u8]) -> Option<Self> {
        if header == HEADER_V3 {
            Some(Version::V3)
        } else if header == HEADER_V5 {
            Some(Version::V5)
        } else {
            None
        }
    }

    /// Whether strokes carry the extra f32 field after the brush size
    #[inline]
    pub fn has_stroke_extra(self) -> bool {
        matches!(self, Version::V5)
    }
}

/// Brush type as stored in a stroke record.
///
/// V3 and V5 use distinct id ranges for the same tools. Ids that are not
/// part of either range are preserved in [`BrushType::Unknown`] so that a
/// decoded drawing re-encodes byte for byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BrushType {
    Paintbrush,
    Pencil,
    Ballpoint,
    Marker,
    Fineliner,
    Highlighter,
    Eraser,
    MechanicalPencil,
    EraseArea,
    PaintbrushV5,
    MechanicalPencilV5,
    PencilV5,
    #[default]
    BallpointV5,
    MarkerV5,
    FinelinerV5,
    HighlighterV5,
    CalligraphyV5,
    Unknown(u32),
}

impl BrushType {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => BrushType::Paintbrush,
            1 => BrushType::Pencil,
            2 => BrushType::Ballpoint,
            3 => BrushType::Marker,
            4 => BrushType::Fineliner,
            5 => BrushType::Highlighter,
            6 => BrushType::Eraser,
            7 => BrushType::MechanicalPencil,
            8 => BrushType::EraseArea,
            12 => BrushType::PaintbrushV5,
            13 => BrushType::MechanicalPencilV5,
            14 => BrushType::PencilV5,
            15 => BrushType::BallpointV5,
            16 => BrushType::MarkerV5,
            17 => BrushType::FinelinerV5,
            18 => BrushType::HighlighterV5,
            21 => BrushType::CalligraphyV5,
            other => BrushType::Unknown(other),
        }
    }

    pub fn raw(self) -> u32 {
        match self {
            BrushType::Paintbrush => 0,
            BrushType::Pencil => 1,
            BrushType::Ballpoint => 2,
            BrushType::Marker => 3,
            BrushType::Fineliner => 4,
            BrushType::Highlighter => 5,
            BrushType::Eraser => 6,
            BrushType::MechanicalPencil => 7,
            BrushType::EraseArea => 8,
            BrushType::PaintbrushV5 => 12,
            BrushType::MechanicalPencilV5 => 13,
            BrushType::PencilV5 => 14,
            BrushType::BallpointV5 => 15,
            BrushType::MarkerV5 => 16,
            BrushType::FinelinerV5 => 17,
            BrushType::HighlighterV5 => 18,
            BrushType::CalligraphyV5 => 21,
            BrushType::Unknown(raw) => raw,
        }
    }

    /// Whether this id belongs to the enumerated V3 or V5 ranges
    pub fn is_known(self) -> bool {
        !matches!(self, BrushType::Unknown(_))
    }

    /// Eraser strokes are recorded but their content was already removed
    /// on the device; they never produce pixels.
    pub fn is_eraser(self) -> bool {
        matches!(self, BrushType::Eraser | BrushType::EraseArea)
    }
}

/// Brush color as stored in a stroke record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BrushColor {
    #[default]
    Black,
    Gray,
    White,
    Unknown(u32),
}

impl BrushColor {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => BrushColor::Black,
            1 => BrushColor::Gray,
            2 => BrushColor::White,
            other => BrushColor::Unknown(other),
        }
    }

    pub fn raw(self) -> u32 {
        match self {
            BrushColor::Black => 0,
            BrushColor::Gray => 1,
            BrushColor::White => 2,
            BrushColor::Unknown(raw) => raw,
        }
    }

    pub fn is_known(self) -> bool {
        !matches!(self, BrushColor::Unknown(_))
    }
}

/// Brush size. This is a base scale, not a pixel width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum BrushSize {
    Small,
    #[default]
    Medium,
    Large,
    Other(f32),
}

impl BrushSize {
    pub fn from_raw(raw: f32) -> Self {
        if raw == BRUSH_SIZE_SMALL {
            BrushSize::Small
        } else if raw == BRUSH_SIZE_MEDIUM {
            BrushSize::Medium
        } else if raw == BRUSH_SIZE_LARGE {
            BrushSize::Large
        } else {
            BrushSize::Other(raw)
        }
    }

    pub fn raw(self) -> f32 {
        match self {
            BrushSize::Small => BRUSH_SIZE_SMALL,
            BrushSize::Medium => BRUSH_SIZE_MEDIUM,
            BrushSize::Large => BRUSH_SIZE_LARGE,
            BrushSize::Other(raw) => raw,
        }
    }

    pub fn is_known(self) -> bool {
        !matches!(self, BrushSize::Other(_))
    }
}

/// A single pen sample
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dot {
    /// Canvas x coordinate
    pub x: f32,
    /// Canvas y coordinate
    pub y: f32,
    pub speed: f32,
    /// Pen tilt in radians
    pub tilt: f32,
    /// Effective brush width as resolved by the tablet
    pub width: f32,
    /// Pressure 0.0-1.0
    pub pressure: f32,
}

impl Dot {
    /// A sample at the given position with unit pressure and no motion
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            speed: 0.0,
            tilt: 0.0,
            width: 2.0,
            pressure: 1.0,
        }
    }
}

/// One continuous pen motion
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Stroke {
    pub brush_type: BrushType,
    pub brush_color: BrushColor,
    /// Unused by the device, kept for round-tripping
    pub reserved: u32,
    pub brush_size: BrushSize,
    /// Present only in V5 records; its meaning is not known
    pub extra: f32,
    /// Samples in chronological order
    pub dots: Vec<Dot>,
}

impl Stroke {
    pub fn new(brush_type: BrushType, brush_color: BrushColor, brush_size: BrushSize) -> Self {
        Self {
            brush_type,
            brush_color,
            reserved: 0,
            brush_size,
            extra: 0.0,
            dots: Vec::new(),
        }
    }

    pub fn with_dots(mut self, dots: Vec<Dot>) -> Self {
        self.dots = dots;
        self
    }

    /// Consecutive dot pairs, in order
    pub fn segments(&self) -> impl Iterator<Item = (&Dot, &Dot)> {
        self.dots.windows(2).map(|pair| (&pair[0], &pair[1]))
    }
}

/// Ordered strokes, bottom to top
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Layer {
    pub strokes: Vec<Stroke>,
}

/// One page of handwritten content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    pub version: Version,
    /// Layers in paint order, bottom to top
    pub layers: Vec<Layer>,
}

impl Default for Drawing {
    fn default() -> Self {
        Self::new()
    }
}

impl Drawing {
    /// Create a V5 drawing with a single empty layer
    pub fn new() -> Self {
        Self::with_version(Version::V5)
    }

    /// Create a drawing of the given version with a single empty layer
    pub fn with_version(version: Version) -> Self {
        Self {
            version,
            layers: vec![Layer::default()],
        }
    }

    /// Append a new empty layer on top; it becomes the active layer
    pub fn add_layer(&mut self) -> &mut Layer {
        self.layers.push(Layer::default());
        let last = self.layers.len() - 1;
        &mut self.layers[last]
    }

    /// Append a stroke to the active (topmost) layer
    pub fn append_stroke(&mut self, stroke: Stroke) {
        if self.layers.is_empty() {
            self.layers.push(Layer::default());
        }
        let last = self.layers.len() - 1;
        self.layers[last].strokes.push(stroke);
    }

    /// Total number of strokes across all layers
    pub fn stroke_count(&self) -> usize {
        self.layers.iter().map(|l| l.strokes.len()).sum()
    }

    /// Iterate all strokes in paint order
    pub fn strokes(&self) -> impl Iterator<Item = &Stroke> {
        self.layers.iter().flat_map(|l| l.strokes.iter())
    }

    /// Bounding box of all dots as (min_x, min_y, max_x, max_y)
    pub fn bounding_box(&self) -> Option<(f32, f32, f32, f32)> {
        self.strokes()
            .flat_map(|s| s.dots.iter())
            .fold(None, |bounds, dot| {
                let (min_x, min_y, max_x, max_y) =
                    bounds.unwrap_or((dot.x, dot.y, dot.x, dot.y));
                Some((
                    min_x.min(dot.x),
                    min_y.min(dot.y),
                    max_x.max(dot.x),
                    max_y.max(dot.y),
                ))
            })
    }
}
