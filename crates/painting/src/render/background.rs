//! Page background templates

use std::f64::consts::FRAC_PI_2;

use image::RgbaImage;
use inkpage_config::Orientation;

use crate::geometry;
use crate::surface::Canvas;

/// Rotation applied to a template for the page orientation
pub fn template_angle(orientation: Orientation) -> f64 {
    match orientation {
        Orientation::Portrait => 0.0,
        Orientation::Landscape => FRAC_PI_2,
    }
}

/// Draw `template` over the canvas, centered and rotated for `orientation`.
/// The canvas keeps its size; content outside it is cropped.
pub fn paint_template(canvas: &mut Canvas, template: &RgbaImage, orientation: Orientation) {
    let angle = template_angle(orientation);
    // Canvas pixel -> template pixel
    let inverse = geometry::center_rotation(
        canvas.width as f64,
        canvas.height as f64,
        template.width() as f64,
        template.height() as f64,
        -angle,
    );

    for y in 0..canvas.height {
        for x in 0..canvas.width {
            let (sx, sy) = geometry::transform(inverse, x as f64 + 0.5, y as f64 + 0.5);
            if sx < 0.0 || sy < 0.0 {
                continue;
            }
            let (sx, sy) = (sx.floor() as u32, sy.floor() as u32);
            if sx >= template.width() || sy >= template.height() {
                continue;
            }

            let [r, g, b, a] = template.get_pixel(sx, sy).0;
            if a == 0 {
                continue;
            }
            canvas.blend_pixel(
                x as i64,
                y as i64,
                [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0],
                a as f32 / 255.0,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    #[test]
    fn test_portrait_template_is_copied() {
        let mut template = RgbaImage::from_pixel(8, 6, Rgba([255, 255, 255, 255]));
        template.put_pixel(1, 2, RED);

        let mut canvas = Canvas::new(8, 6);
        paint_template(&mut canvas, &template, Orientation::Portrait);

        assert_eq!(canvas.get_pixel(1, 2), Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(canvas.get_pixel(0, 0), Some([1.0, 1.0, 1.0, 1.0]));
    }

    #[test]
    fn test_landscape_template_turns_a_quarter() {
        // 6x4 landscape template onto a 4x6 portrait canvas
        let mut template = RgbaImage::from_pixel(6, 4, Rgba([255, 255, 255, 255]));
        template.put_pixel(0, 0, RED);

        let mut canvas = Canvas::new(4, 6);
        paint_template(&mut canvas, &template, Orientation::Landscape);

        // Top-left of the template lands at the top-right of the page
        assert_eq!(canvas.get_pixel(3, 0), Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(canvas.get_pixel(0, 0), Some([1.0, 1.0, 1.0, 1.0]));
        assert!(canvas.pixels().iter().all(|p| p[3] == 1.0));
    }

    #[test]
    fn test_transparent_template_pixels_are_skipped() {
        let template = RgbaImage::new(4, 4);
        let mut canvas = Canvas::filled(4, 4, [0.0, 0.0, 1.0, 1.0]);
        paint_template(&mut canvas, &template, Orientation::Portrait);
        assert_eq!(canvas.get_pixel(2, 2), Some([0.0, 0.0, 1.0, 1.0]));
    }
}
