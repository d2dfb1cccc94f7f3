use std::f32::consts::{FRAC_PI_2, PI};

use thiserror::Error;
use tracing::warn;

use crate::constants::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::types::{Dot, Drawing};

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Drawing has no layers")]
    NoLayers,
    #[error("Invalid {field} value {value} (layer {layer}, stroke {stroke})")]
    InvalidEnumValue {
        field: &'static str,
        value: String,
        layer: usize,
        stroke: usize,
    },
    #[error("Sample out of bounds: {field}={value} (layer {layer}, stroke {stroke}, dot {dot})")]
    OutOfBoundsSample {
        field: &'static str,
        value: f32,
        layer: usize,
        stroke: usize,
        dot: usize,
    },
}

/// Check a drawing's structure, returning the first violation found.
///
/// Tilt outside the documented quadrants is logged, not rejected: captured
/// data regularly falls outside them.
pub fn validate(drawing: &Drawing) -> Result<(), ValidationError> {
    if drawing.layers.is_empty() {
        return Err(ValidationError::NoLayers);
    }

    for (layer_index, layer) in drawing.layers.iter().enumerate() {
        for (stroke_index, stroke) in layer.strokes.iter().enumerate() {
            let invalid = |field: &'static str, value: String| ValidationError::InvalidEnumValue {
                field,
                value,
                layer: layer_index,
                stroke: stroke_index,
            };

            if !stroke.brush_type.is_known() {
                return Err(invalid("brush_type", stroke.brush_type.raw().to_string()));
            }
            if !stroke.brush_color.is_known() {
                return Err(invalid("brush_color", stroke.brush_color.raw().to_string()));
            }
            if !stroke.brush_size.is_known() {
                return Err(invalid("brush_size", stroke.brush_size.raw().to_string()));
            }

            let mut odd_tilts = 0usize;
            for (dot_index, dot) in stroke.dots.iter().enumerate() {
                if let Some((field, value)) = out_of_bounds_field(dot) {
                    return Err(ValidationError::OutOfBoundsSample {
                        field,
                        value,
                        layer: layer_index,
                        stroke: stroke_index,
                        dot: dot_index,
                    });
                }
                if !tilt_in_documented_range(dot.tilt) {
                    odd_tilts += 1;
                }
            }

            if odd_tilts > 0 {
                warn!(
                    "validate: layer {} stroke {} has {} dots with tilt outside [0, pi/2] and [3pi/2, 2pi]",
                    layer_index, stroke_index, odd_tilts
                );
            }
        }
    }

    Ok(())
}

/// Whether a tilt lies in `[0, pi/2]` or `[3pi/2, 2pi]`
pub fn tilt_in_documented_range(tilt: f32) -> bool {
    (0.0..=FRAC_PI_2).contains(&tilt) || (3.0 * FRAC_PI_2..=2.0 * PI).contains(&tilt)
}

/// First dot field outside its bounds. NaN never passes a range check.
fn out_of_bounds_field(dot: &Dot) -> Option<(&'static str, f32)> {
    if !(0.0..=CANVAS_WIDTH).contains(&dot.x) {
        return Some(("x", dot.x));
    }
    if !(0.0..=CANVAS_HEIGHT).contains(&dot.y) {
        return Some(("y", dot.y));
    }
    if !(0.0..).contains(&dot.speed) {
        return Some(("speed", dot.speed));
    }
    if !(0.0..).contains(&dot.width) {
        return Some(("width", dot.width));
    }
    if !(0.0..=1.0).contains(&dot.pressure) {
        return Some(("pressure", dot.pressure));
    }
    None
}

impl Drawing {
    /// See [`validate`]
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate(self)
    }
}
