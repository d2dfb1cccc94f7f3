//! Per-stroke painting

use inkpage_drawing::{Dot, Stroke};

use crate::brush::{Brush, MAX_STAMP_WIDTH};
use crate::surface::Canvas;

/// Paint one stroke with its resolved brush. Returns the number of stamps.
pub fn paint_stroke(
    canvas: &mut Canvas,
    brush: &Brush,
    stroke: &Stroke,
    stroke_opacity: f32,
) -> usize {
    if brush.family().composites_per_stroke() {
        paint_composited(canvas, brush, &stroke.dots, stroke_opacity)
    } else {
        brush.render_dots(canvas, &stroke.dots)
    }
}

/// Paint all segments into an off-screen buffer, then draw the buffer over
/// the canvas once at `opacity`. Overlapping segments of the same stroke do
/// not darken each other.
fn paint_composited(canvas: &mut Canvas, brush: &Brush, dots: &[Dot], opacity: f32) -> usize {
    let Some((left, top, right, bottom)) = stroke_region(canvas, dots) else {
        return 0;
    };

    let mut buffer = Canvas::new(right - left, bottom - top);
    let local: Vec<Dot> = dots
        .iter()
        .map(|dot| Dot {
            x: dot.x - left as f32,
            y: dot.y - top as f32,
            ..*dot
        })
        .collect();

    let stamps = brush.render_dots(&mut buffer, &local);
    canvas.draw_canvas(&buffer, left as i64, top as i64, opacity);
    stamps
}

/// Pixel region a stroke can touch, padded for the widest rotated stamp and
/// clipped to the canvas
fn stroke_region(canvas: &Canvas, dots: &[Dot]) -> Option<(u32, u32, u32, u32)> {
    let first = dots.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    let mut max_width = 0.0_f32;
    for dot in dots {
        min_x = min_x.min(dot.x);
        min_y = min_y.min(dot.y);
        max_x = max_x.max(dot.x);
        max_y = max_y.max(dot.y);
        max_width = max_width.max(dot.width);
    }
    let max_width = max_width.min(MAX_STAMP_WIDTH);

    let pad = (max_width * std::f32::consts::SQRT_2).ceil() + 2.0;
    let clip = |value: f32, limit: u32| value.clamp(0.0, limit as f32) as u32;
    let left = clip((min_x - pad).floor(), canvas.width);
    let top = clip((min_y - pad).floor(), canvas.height);
    let right = clip((max_x + pad).ceil(), canvas.width);
    let bottom = clip((max_y + pad).ceil(), canvas.height);

    (left < right && top < bottom).then_some((left, top, right, bottom))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::BrushFamily;
    use crate::mask::AlphaMask;
    use image::{GrayImage, Luma};
    use inkpage_drawing::{BrushColor, BrushSize, BrushType};
    use std::sync::Arc;

    fn highlighter() -> Brush {
        let mask = Arc::new(AlphaMask::new(GrayImage::from_pixel(8, 8, Luma([255]))));
        Brush::new(BrushFamily::Highlighter, mask, [1.0, 1.0, 0.0, 1.0])
    }

    fn highlighter_stroke(dots: Vec<Dot>) -> Stroke {
        Stroke::new(
            BrushType::HighlighterV5,
            BrushColor::Black,
            BrushSize::Medium,
        )
        .with_dots(dots)
    }

    fn wide_dot(x: f32, y: f32) -> Dot {
        Dot {
            width: 10.0,
            ..Dot::at(x, y)
        }
    }

    #[test]
    fn test_region_is_clipped_to_canvas() {
        let canvas = Canvas::new(100, 100);
        let region = stroke_region(&canvas, &[wide_dot(5.0, 50.0), wide_dot(40.0, 50.0)]);
        let (left, top, right, bottom) = region.unwrap();
        assert_eq!(left, 0);
        assert!(top < 40 && bottom > 60 && right > 50);

        assert!(stroke_region(&canvas, &[]).is_none());
        assert!(stroke_region(&canvas, &[wide_dot(500.0, 500.0)]).is_none());
    }

    #[test]
    fn test_composited_stroke_does_not_stack() {
        let mut canvas = Canvas::filled(100, 100, [1.0, 1.0, 1.0, 1.0]);
        let stroke = highlighter_stroke(vec![
            wide_dot(20.0, 50.0),
            wide_dot(80.0, 50.0),
            wide_dot(50.0, 20.0),
            wide_dot(50.0, 80.0),
        ]);

        assert!(paint_stroke(&mut canvas, &highlighter(), &stroke, 0.5) > 0);

        let crossing = canvas.get_pixel(50, 50).unwrap();
        let single = canvas.get_pixel(30, 50).unwrap();
        assert_eq!(crossing, single);
        assert!((single[2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_huge_width_region_stays_on_canvas() {
        let mut canvas = Canvas::new(100, 100);
        let dots = [
            Dot {
                width: 100_000.0,
                ..Dot::at(40.0, 50.0)
            },
            Dot {
                width: 100_000.0,
                ..Dot::at(60.0, 50.0)
            },
        ];
        assert_eq!(stroke_region(&canvas, &dots), Some((0, 0, 100, 100)));

        let stroke = highlighter_stroke(dots.to_vec());
        assert!(paint_stroke(&mut canvas, &highlighter(), &stroke, 0.5) > 0);
        assert!((canvas.get_pixel(0, 0).unwrap()[3] - 0.5).abs() < 1e-6);
    }
}
