//! Alpha masks used to shape brush stamps

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma};

use crate::geometry;

/// A single-channel coverage mask, 0 = transparent, 255 = opaque.
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaMask {
    image: GrayImage,
}

impl AlphaMask {
    pub fn new(image: GrayImage) -> Self {
        Self { image }
    }

    /// Convert a stamp image into a mask: the gray value becomes alpha.
    /// Any alpha the image already carries is multiplied in.
    pub fn from_image(image: &DynamicImage) -> Self {
        let gray_alpha = image.to_luma_alpha8();
        let (width, height) = gray_alpha.dimensions();
        let image = GrayImage::from_fn(width, height, |x, y| {
            let [gray, alpha] = gray_alpha.get_pixel(x, y).0;
            Luma([((gray as u16 * alpha as u16 + 127) / 255) as u8])
        });
        Self { image }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Coverage at (x, y), 0 outside the mask
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        if x >= self.width() || y >= self.height() {
            return 0;
        }
        self.image.get_pixel(x, y).0[0]
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }

    /// Resize so the mask is `height` pixels tall, keeping its aspect ratio.
    /// The result is at least 1x1.
    pub fn scaled(&self, height: f32) -> AlphaMask {
        let target_h = height.round().max(1.0) as u32;
        let aspect = self.width() as f32 / self.height().max(1) as f32;
        let target_w = (height * aspect).round().max(1.0) as u32;

        if target_w == self.width() && target_h == self.height() {
            return self.clone();
        }
        AlphaMask::new(imageops::resize(
            &self.image,
            target_w,
            target_h,
            FilterType::Triangle,
        ))
    }

    /// Remap coverage by a constant opacity factor
    pub fn with_opacity(&self, opacity: f32) -> AlphaMask {
        let opacity = opacity.clamp(0.0, 1.0);
        let mut image = self.image.clone();
        for pixel in image.pixels_mut() {
            pixel.0[0] = (pixel.0[0] as f32 * opacity).round() as u8;
        }
        AlphaMask::new(image)
    }

    /// Rotate by `angle` radians about the mask center. The output grows to
    /// the rotated bounding box; uncovered corners are transparent.
    pub fn rotated(&self, angle: f64) -> AlphaMask {
        if angle == 0.0 {
            return self.clone();
        }

        let (w, h) = (self.width() as f64, self.height() as f64);
        let (sin, cos) = angle.sin_cos();
        // Trim float noise so quarter turns don't gain a pixel
        let out_w = (w * cos.abs() + h * sin.abs() - 1e-9).ceil().max(1.0);
        let out_h = (w * sin.abs() + h * cos.abs() - 1e-9).ceil().max(1.0);

        // Map output pixels back into source space
        let inverse = geometry::multiply(
            geometry::translation(w / 2.0, h / 2.0),
            geometry::multiply(
                geometry::rotation(-angle),
                geometry::translation(-out_w / 2.0, -out_h / 2.0),
            ),
        );

        let image = GrayImage::from_fn(out_w as u32, out_h as u32, |x, y| {
            let (sx, sy) = geometry::transform(inverse, x as f64 + 0.5, y as f64 + 0.5);
            Luma([self.sample_bilinear(sx - 0.5, sy - 0.5)])
        });
        AlphaMask::new(image)
    }

    fn sample_bilinear(&self, x: f64, y: f64) -> u8 {
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;

        let at = |dx: f64, dy: f64| -> f64 {
            let sx = x0 + dx;
            let sy = y0 + dy;
            if sx < 0.0 || sy < 0.0 {
                0.0
            } else {
                self.get(sx as u32, sy as u32) as f64
            }
        };

        let top = at(0.0, 0.0) * (1.0 - fx) + at(1.0, 0.0) * fx;
        let bottom = at(0.0, 1.0) * (1.0 - fx) + at(1.0, 1.0) * fx;
        (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8
    }

    /// Total coverage, used by tests and diagnostics
    pub fn coverage(&self) -> u64 {
        self.image.pixels().map(|p| p.0[0] as u64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayAlphaImage, LumaA};
    use std::f64::consts::FRAC_PI_2;

    fn solid(width: u32, height: u32, value: u8) -> AlphaMask {
        AlphaMask::new(GrayImage::from_pixel(width, height, Luma([value])))
    }

    #[test]
    fn test_from_image_gray_becomes_alpha() {
        let mut source = GrayAlphaImage::new(2, 1);
        source.put_pixel(0, 0, LumaA([255, 255]));
        source.put_pixel(1, 0, LumaA([200, 0]));

        let mask = AlphaMask::from_image(&DynamicImage::ImageLumaA8(source));
        assert_eq!(mask.get(0, 0), 255);
        assert_eq!(mask.get(1, 0), 0);
    }

    #[test]
    fn test_scaled_keeps_aspect() {
        let mask = solid(40, 20, 255).scaled(10.0);
        assert_eq!(mask.height(), 10);
        assert_eq!(mask.width(), 20);

        let tiny = solid(8, 8, 255).scaled(0.1);
        assert_eq!((tiny.width(), tiny.height()), (1, 1));
    }

    #[test]
    fn test_with_opacity() {
        let mask = solid(2, 2, 200).with_opacity(0.5);
        assert_eq!(mask.get(1, 1), 100);
        assert_eq!(solid(2, 2, 200).with_opacity(2.0).get(0, 0), 200);
    }

    #[test]
    fn test_rotated_quarter_turn_swaps_dimensions() {
        let mut image = GrayImage::new(10, 4);
        image.put_pixel(0, 0, Luma([255]));
        let rotated = AlphaMask::new(image).rotated(FRAC_PI_2);

        assert_eq!(rotated.width(), 4);
        assert_eq!(rotated.height(), 10);
        // Top-left corner moves to the top-right under a y-down quarter turn
        assert!(rotated.get(3, 0) > 200);
        assert_eq!(rotated.get(0, 0), 0);
    }

    #[test]
    fn test_rotation_preserves_solid_interior() {
        let rotated = solid(16, 16, 255).rotated(0.6);
        let cx = rotated.width() / 2;
        let cy = rotated.height() / 2;
        assert_eq!(rotated.get(cx, cy), 255);
        assert_eq!(rotated.get(0, 0), 0);
    }
}
