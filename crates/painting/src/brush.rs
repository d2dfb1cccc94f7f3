//! Brush model
//!
//! Maps pen telemetry (pressure, speed, tilt, resolved width) to stamp
//! parameters for each brush family, and stamps segments onto a canvas.
//! The family set is closed: it follows the brush ids of the drawing format.

use std::sync::Arc;

use inkpage_drawing::{BrushType, Dot};
use tracing::trace;

use crate::mask::AlphaMask;
use crate::stamp::Stamp;
use crate::surface::Canvas;

/// Smallest width a pressure-sensitive pen is drawn at
const MIN_PEN_WIDTH: f32 = 3.0;

/// Widest stamp ever drawn: the canvas diagonal (1404 x 1872). A centered
/// stamp this wide already covers the whole canvas.
pub const MAX_STAMP_WIDTH: f32 = 2340.0;

/// Rendering family of a brush type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrushFamily {
    Ballpoint,
    Pencil,
    MechanicalPencil,
    Marker,
    Fineliner,
    Highlighter,
    /// Plain round pen, also the fallback for unsupported brush types
    Base,
}

impl BrushFamily {
    pub const ALL: [BrushFamily; 7] = [
        BrushFamily::Ballpoint,
        BrushFamily::Pencil,
        BrushFamily::MechanicalPencil,
        BrushFamily::Marker,
        BrushFamily::Fineliner,
        BrushFamily::Highlighter,
        BrushFamily::Base,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BrushFamily::Ballpoint => "Ballpoint",
            BrushFamily::Pencil => "Pencil",
            BrushFamily::MechanicalPencil => "Mechanical pencil",
            BrushFamily::Marker => "Marker",
            BrushFamily::Fineliner => "Fineliner",
            BrushFamily::Highlighter => "Highlighter",
            BrushFamily::Base => "Base pen",
        }
    }

    /// Name of the stamp image in the brushes asset category
    pub fn asset_name(self) -> &'static str {
        match self {
            BrushFamily::Ballpoint => "ballpoint",
            BrushFamily::Pencil => "pencil",
            BrushFamily::MechanicalPencil => "mechanical-pencil",
            BrushFamily::Marker => "marker",
            BrushFamily::Fineliner => "fineliner",
            BrushFamily::Highlighter => "highlighter",
            BrushFamily::Base => "base",
        }
    }

    /// Stamp opacity for one segment, in 0..=1
    pub fn opacity(self, pressure: f32, speed: f32) -> f32 {
        let pressure = pressure.clamp(0.0, 1.0);
        let opacity = match self {
            BrushFamily::Ballpoint => {
                // Fast strokes lay down slightly less ink
                let fade = 1.0 - 0.2 * (speed.max(0.0) / 100.0).min(1.0);
                (0.75 + 0.25 * pressure.powi(2)) * fade
            }
            BrushFamily::Pencil => 0.15 + 0.85 * pressure.powi(4),
            BrushFamily::MechanicalPencil => 0.7,
            BrushFamily::Marker => 0.9,
            // Highlighter segments go to an off-screen buffer at full strength
            BrushFamily::Fineliner | BrushFamily::Highlighter | BrushFamily::Base => 1.0,
        };
        opacity.clamp(0.0, 1.0)
    }

    /// Stamp width in pixels for a segment whose dots resolved to `base`,
    /// at most [`MAX_STAMP_WIDTH`]
    pub fn width(self, base: f32, pressure: f32, _tilt: f32) -> f32 {
        let base = base.max(0.0);
        let pressure = pressure.clamp(0.0, 1.0);
        let width = match self {
            BrushFamily::Ballpoint => (base * (0.5 + pressure.powi(2))).max(MIN_PEN_WIDTH),
            BrushFamily::Fineliner => base.max(MIN_PEN_WIDTH),
            BrushFamily::Pencil
            | BrushFamily::MechanicalPencil
            | BrushFamily::Marker
            | BrushFamily::Highlighter
            | BrushFamily::Base => base,
        };
        width.min(MAX_STAMP_WIDTH)
    }

    /// Stamps per mask height; stamp pitch is `mask_height / overlap`
    pub fn overlap(self) -> f32 {
        match self {
            BrushFamily::Ballpoint => 2.0,
            BrushFamily::Pencil => 1.5,
            BrushFamily::MechanicalPencil => 4.0,
            BrushFamily::Marker => 5.0,
            BrushFamily::Fineliner => 3.0,
            BrushFamily::Highlighter => 2.0,
            BrushFamily::Base => 1.5,
        }
    }

    /// Whether a whole stroke is painted off-screen and composited once
    pub fn composites_per_stroke(self) -> bool {
        matches!(self, BrushFamily::Highlighter)
    }
}

/// How the renderer treats a stroke's brush type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushKind {
    /// Content already removed on the device; never rasterized
    Eraser,
    Family(BrushFamily),
    /// No dedicated family; drawn with [`BrushFamily::Base`]
    Unsupported(BrushType),
}

impl BrushKind {
    pub fn resolve(brush_type: BrushType) -> Self {
        use BrushType::*;
        match brush_type {
            Eraser | EraseArea => BrushKind::Eraser,
            Ballpoint | BallpointV5 => BrushKind::Family(BrushFamily::Ballpoint),
            Pencil | PencilV5 => BrushKind::Family(BrushFamily::Pencil),
            MechanicalPencil | MechanicalPencilV5 => {
                BrushKind::Family(BrushFamily::MechanicalPencil)
            }
            Marker | MarkerV5 => BrushKind::Family(BrushFamily::Marker),
            Fineliner | FinelinerV5 => BrushKind::Family(BrushFamily::Fineliner),
            Highlighter | HighlighterV5 => BrushKind::Family(BrushFamily::Highlighter),
            Paintbrush | PaintbrushV5 | CalligraphyV5 | Unknown(_) => {
                BrushKind::Unsupported(brush_type)
            }
        }
    }

    /// Family used to draw this kind, `None` for erasers
    pub fn family(self) -> Option<BrushFamily> {
        match self {
            BrushKind::Eraser => None,
            BrushKind::Family(family) => Some(family),
            BrushKind::Unsupported(_) => Some(BrushFamily::Base),
        }
    }
}

/// A brush family bound to its stamp mask and a concrete color
#[derive(Debug, Clone)]
pub struct Brush {
    family: BrushFamily,
    mask: Arc<AlphaMask>,
    color: [f32; 4],
}

impl Brush {
    pub fn new(family: BrushFamily, mask: Arc<AlphaMask>, color: [f32; 4]) -> Self {
        Self {
            family,
            mask,
            color,
        }
    }

    pub fn family(&self) -> BrushFamily {
        self.family
    }

    pub fn name(&self) -> &'static str {
        self.family.name()
    }

    pub fn opacity(&self, pressure: f32, speed: f32) -> f32 {
        self.family.opacity(pressure, speed)
    }

    pub fn width(&self, base: f32, pressure: f32, tilt: f32) -> f32 {
        self.family.width(base, pressure, tilt)
    }

    pub fn overlap(&self) -> f32 {
        self.family.overlap()
    }

    /// Stamp the segment `start -> end`, excluding the end point.
    /// Returns the number of stamps applied.
    pub fn render_segment(&self, canvas: &mut Canvas, start: &Dot, end: &Dot) -> usize {
        self.stamp_segment(canvas, start, end, false)
    }

    /// Stamp every segment of `dots` in order; the final dot is stamped too.
    /// A single dot is drawn as one stamp.
    pub fn render_dots(&self, canvas: &mut Canvas, dots: &[Dot]) -> usize {
        match dots {
            [] => 0,
            [dot] => self.stamp_segment(canvas, dot, dot, true),
            _ => {
                let last = dots.len() - 2;
                dots.windows(2)
                    .enumerate()
                    .map(|(i, pair)| self.stamp_segment(canvas, &pair[0], &pair[1], i == last))
                    .sum()
            }
        }
    }

    fn stamp_segment(
        &self,
        canvas: &mut Canvas,
        start: &Dot,
        end: &Dot,
        include_end: bool,
    ) -> usize {
        let pressure = (start.pressure + end.pressure) / 2.0;
        let speed = (start.speed + end.speed) / 2.0;
        let tilt = (start.tilt + end.tilt) / 2.0;
        let base = (start.width + end.width) / 2.0;

        let width = self.width(base, pressure, tilt);
        let opacity = self.opacity(pressure, speed);
        if width <= 0.0 || opacity <= 0.0 {
            return 0;
        }

        let dx = (end.x - start.x) as f64;
        let dy = (end.y - start.y) as f64;
        let angle = dy.atan2(dx);

        let stamp = Stamp::prepare(&self.mask, width, opacity, angle, self.color);
        let pitch = stamp.pitch(self.overlap());
        let count = stamp.stamp_along(
            canvas,
            (start.x as f64, start.y as f64),
            (end.x as f64, end.y as f64),
            pitch,
            include_end,
        );

        trace!(
            "Brush::stamp_segment: {} width={:.2} opacity={:.2} stamps={}",
            self.name(),
            width,
            opacity,
            count
        );
        count
    }
}
