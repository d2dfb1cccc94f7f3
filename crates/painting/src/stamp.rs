//! Stamp application for brush strokes

use tracing::warn;

use crate::mask::AlphaMask;
use crate::surface::Canvas;

/// Upper bound on stamps per segment. In-bounds segments stay far below it.
pub const MAX_SEGMENT_STAMPS: usize = 1 << 16;

/// A brush mask prepared for one segment: scaled to the stroke width,
/// opacity applied and rotated to the segment direction.
#[derive(Debug, Clone)]
pub struct Stamp {
    mask: AlphaMask,
    color: [f32; 4],
    /// Mask height before rotation, used for spacing
    scaled_height: u32,
}

impl Stamp {
    pub fn prepare(
        mask: &AlphaMask,
        width: f32,
        opacity: f32,
        angle: f64,
        color: [f32; 4],
    ) -> Self {
        let scaled = mask.scaled(width);
        let scaled_height = scaled.height();
        let mask = scaled.with_opacity(opacity).rotated(angle);
        Self {
            mask,
            color,
            scaled_height,
        }
    }

    pub fn mask(&self) -> &AlphaMask {
        &self.mask
    }

    /// Distance between consecutive stamps for a brush overlap factor
    pub fn pitch(&self, overlap: f32) -> f64 {
        self.scaled_height as f64 / overlap.max(f32::EPSILON) as f64
    }

    /// Composite the stamp centered on `(center_x, center_y)`.
    /// Coordinates are rounded to whole pixels only here.
    pub fn apply(&self, canvas: &mut Canvas, center_x: f64, center_y: f64) {
        let left = (center_x - self.mask.width() as f64 / 2.0).round() as i64;
        let top = (center_y - self.mask.height() as f64 / 2.0).round() as i64;

        // Part of the mask that lands on the canvas
        let clip = |origin: i64, size: u32, limit: u32| {
            let start = origin.saturating_neg().clamp(0, size as i64) as u32;
            let end = (limit as i64).saturating_sub(origin).clamp(0, size as i64) as u32;
            start..end
        };
        let rows = clip(top, self.mask.height(), canvas.height);
        let cols = clip(left, self.mask.width(), canvas.width);

        for my in rows {
            for mx in cols.clone() {
                let coverage = self.mask.get(mx, my);
                if coverage == 0 {
                    continue;
                }
                canvas.blend_pixel(
                    left + mx as i64,
                    top + my as i64,
                    self.color,
                    coverage as f32 / 255.0,
                );
            }
        }
    }

    /// Stamp `ceil(length / pitch)` times in equal steps from `start`
    /// towards `end`, plus once on `end` itself when `include_end` is set.
    /// The step count is capped at [`MAX_SEGMENT_STAMPS`].
    /// Returns the number of stamps placed.
    pub fn stamp_along(
        &self,
        canvas: &mut Canvas,
        start: (f64, f64),
        end: (f64, f64),
        pitch: f64,
        include_end: bool,
    ) -> usize {
        let dx = end.0 - start.0;
        let dy = end.1 - start.1;
        let length = (dx * dx + dy * dy).sqrt();

        let mut steps = if pitch > 0.0 && length > 0.0 {
            (length / pitch).ceil() as usize
        } else {
            0
        };
        if steps > MAX_SEGMENT_STAMPS {
            warn!(
                "Segment of length {:.0} needs {} stamps, capping at {}",
                length, steps, MAX_SEGMENT_STAMPS
            );
            steps = MAX_SEGMENT_STAMPS;
        }

        for i in 0..steps {
            let t = i as f64 / steps as f64;
            self.apply(canvas, start.0 + dx * t, start.1 + dy * t);
        }
        if include_end {
            self.apply(canvas, end.0, end.1);
            return steps + 1;
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

    fn square(size: u32) -> AlphaMask {
        AlphaMask::new(GrayImage::from_pixel(size, size, Luma([255])))
    }

    #[test]
    fn test_apply_is_centered() {
        let stamp = Stamp::prepare(&square(4), 4.0, 1.0, 0.0, BLACK);
        let mut canvas = Canvas::new(10, 10);
        stamp.apply(&mut canvas, 5.0, 5.0);

        for y in 0..10 {
            for x in 0..10 {
                let inside = (3..7).contains(&x) && (3..7).contains(&y);
                assert_eq!(canvas.get_pixel(x, y).unwrap()[3] > 0.0, inside, "({x}, {y})");
            }
        }
    }

    #[test]
    fn test_apply_clips_at_canvas_edge() {
        let stamp = Stamp::prepare(&square(4), 4.0, 1.0, 0.0, BLACK);
        let mut canvas = Canvas::new(10, 10);
        stamp.apply(&mut canvas, 0.0, 0.0);

        assert!(canvas.get_pixel(0, 0).unwrap()[3] > 0.0);
        assert_eq!(canvas.get_pixel(2, 2).unwrap()[3], 0.0);
    }

    #[test]
    fn test_opacity_scales_coverage() {
        let stamp = Stamp::prepare(&square(4), 4.0, 0.5, 0.0, BLACK);
        let mut canvas = Canvas::new(10, 10);
        stamp.apply(&mut canvas, 5.0, 5.0);

        let alpha = canvas.get_pixel(5, 5).unwrap()[3];
        assert!((alpha - 128.0 / 255.0).abs() < 1e-3);
    }

    #[test]
    fn test_stamp_count_follows_pitch() {
        let stamp = Stamp::prepare(&square(8), 8.0, 1.0, 0.0, BLACK);
        let mut canvas = Canvas::new(64, 64);
        let pitch = stamp.pitch(2.0);
        assert_eq!(pitch, 4.0);

        let mut along = |start: (f64, f64), end: (f64, f64), include_end: bool| {
            stamp.stamp_along(&mut canvas, start, end, pitch, include_end)
        };
        assert_eq!(along((10.0, 10.0), (30.0, 10.0), false), 5);
        assert_eq!(along((10.0, 10.0), (31.0, 10.0), false), 6);
        assert_eq!(along((10.0, 10.0), (30.0, 10.0), true), 6);
        // Zero-length segments only stamp their end point
        assert_eq!(along((5.0, 5.0), (5.0, 5.0), false), 0);
        assert_eq!(along((5.0, 5.0), (5.0, 5.0), true), 1);
    }

    #[test]
    fn test_rotated_stamp_follows_direction() {
        let mut image = GrayImage::new(12, 2);
        for x in 0..12 {
            image.put_pixel(x, 0, Luma([255]));
            image.put_pixel(x, 1, Luma([255]));
        }
        // A flat bar stamped along a vertical segment stands upright
        let angle = std::f64::consts::FRAC_PI_2;
        let stamp = Stamp::prepare(&AlphaMask::new(image), 2.0, 1.0, angle, BLACK);
        assert_eq!(stamp.mask().width(), 2);
        assert_eq!(stamp.mask().height(), 12);
    }

    #[test]
    fn test_far_segment_is_capped() {
        let stamp = Stamp::prepare(&square(2), 2.0, 1.0, 0.0, BLACK);
        let mut canvas = Canvas::new(16, 16);
        let pitch = stamp.pitch(3.0);

        let placed = stamp.stamp_along(&mut canvas, (0.0, 8.0), (1e12, 8.0), pitch, true);
        assert_eq!(placed, MAX_SEGMENT_STAMPS + 1);
        // Only the first stamp lands on the canvas
        assert!(canvas.get_pixel(0, 8).unwrap()[3] > 0.0);
        assert_eq!(canvas.get_pixel(8, 8).unwrap()[3], 0.0);
    }

    #[test]
    fn test_apply_far_off_canvas_is_ignored() {
        let stamp = Stamp::prepare(&square(4), 4.0, 1.0, 0.0, BLACK);
        let mut canvas = Canvas::new(10, 10);
        stamp.apply(&mut canvas, -1e15, 1e15);
        stamp.apply(&mut canvas, f64::INFINITY, 5.0);
        assert!(canvas.is_transparent());
    }
}
