//! CPU canvas for painting - straight-alpha f32 RGBA storage

use image::{Rgba, RgbaImage};

/// A CPU canvas the raster engine paints into.
/// Stores pixels as straight (non-premultiplied) `[r, g, b, a]` in 0.0-1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    /// Canvas dimensions
    pub width: u32,
    pub height: u32,
    /// Pixel data in row-major order
    pixels: Vec<[f32; 4]>,
}

impl Canvas {
    /// Create a new canvas with the given dimensions, initialized to transparent black
    pub fn new(width: u32, height: u32) -> Self {
        let pixel_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            pixels: vec![[0.0, 0.0, 0.0, 0.0]; pixel_count],
        }
    }

    /// Create a new canvas filled with a solid color
    pub fn filled(width: u32, height: u32, color: [f32; 4]) -> Self {
        let mut canvas = Self::new(width, height);
        canvas.clear(color);
        canvas
    }

    /// Clear the canvas to a solid color
    pub fn clear(&mut self, color: [f32; 4]) {
        self.pixels.fill(color);
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    /// Get a pixel at the given coordinates
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Set a pixel at the given coordinates
    /// Does nothing if coordinates are out of bounds
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [f32; 4]) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Composite a color over an existing pixel ("draw-over").
    ///
    /// Source alpha is `color[3] * opacity`. Out-of-bounds writes, including
    /// negative coordinates, are ignored.
    #[inline]
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: [f32; 4], opacity: f32) {
        if x < 0 || y < 0 || x > u32::MAX as i64 || y > u32::MAX as i64 {
            return;
        }
        let Some(index) = self.index(x as u32, y as u32) else {
            return;
        };

        let src_alpha = (color[3] * opacity).clamp(0.0, 1.0);
        if src_alpha <= 0.0 {
            return;
        }
        let dst = self.pixels[index];
        let dst_weight = dst[3] * (1.0 - src_alpha);
        let out_alpha = src_alpha + dst_weight;

        self.pixels[index] = [
            (color[0] * src_alpha + dst[0] * dst_weight) / out_alpha,
            (color[1] * src_alpha + dst[1] * dst_weight) / out_alpha,
            (color[2] * src_alpha + dst[2] * dst_weight) / out_alpha,
            out_alpha,
        ];
    }

    /// Composite another canvas over this one with its top-left corner at
    /// `(offset_x, offset_y)`, scaling its alpha by `opacity`.
    pub fn draw_canvas(&mut self, other: &Canvas, offset_x: i64, offset_y: i64, opacity: f32) {
        if opacity <= 0.0 {
            return;
        }
        for y in 0..other.height {
            for x in 0..other.width {
                let pixel = other.pixels[(y as usize) * (other.width as usize) + (x as usize)];
                if pixel[3] > 0.0 {
                    self.blend_pixel(offset_x + x as i64, offset_y + y as i64, pixel, opacity);
                }
            }
        }
    }

    /// Whether every pixel is fully transparent
    pub fn is_transparent(&self) -> bool {
        self.pixels.iter().all(|p| p[3] == 0.0)
    }

    /// Get the total number of pixels
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    /// Get direct access to pixel data
    #[inline]
    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.pixels
    }

    /// Convert to an 8-bit RGBA image, rounding to the nearest level
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let p = self.pixels[(y as usize) * (self.width as usize) + (x as usize)];
            Rgba(p.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    #[test]
    fn test_new_canvas() {
        let canvas = Canvas::new(100, 100);
        assert_eq!(canvas.width, 100);
        assert_eq!(canvas.height, 100);
        assert_eq!(canvas.pixel_count(), 10000);
        assert!(canvas.is_transparent());
    }

    #[test]
    fn test_get_set_pixel() {
        let mut canvas = Canvas::new(10, 10);
        let color = [1.0, 0.5, 0.25, 1.0];

        canvas.set_pixel(5, 5, color);
        assert_eq!(canvas.get_pixel(5, 5), Some(color));

        // Out of bounds should return None
        assert_eq!(canvas.get_pixel(100, 100), None);
    }

    #[test]
    fn test_blend_over_white() {
        let mut canvas = Canvas::filled(10, 10, WHITE);

        // Blend 50% opaque red
        canvas.blend_pixel(5, 5, [1.0, 0.0, 0.0, 1.0], 0.5);

        let result = canvas.get_pixel(5, 5).unwrap();
        assert!((result[0] - 1.0).abs() < 0.001);
        assert!((result[1] - 0.5).abs() < 0.001);
        assert!((result[2] - 0.5).abs() < 0.001);
        assert!((result[3] - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_blend_over_transparent_keeps_color() {
        let mut canvas = Canvas::new(4, 4);
        canvas.blend_pixel(1, 1, [0.0, 0.0, 1.0, 1.0], 0.25);

        let result = canvas.get_pixel(1, 1).unwrap();
        assert_eq!(result[2], 1.0);
        assert!((result[3] - 0.25).abs() < 0.001);

        // Second layer accumulates alpha
        canvas.blend_pixel(1, 1, [0.0, 0.0, 1.0, 1.0], 0.25);
        let result = canvas.get_pixel(1, 1).unwrap();
        assert!((result[3] - 0.4375).abs() < 0.001);
    }

    #[test]
    fn test_blend_out_of_bounds_ignored() {
        let mut canvas = Canvas::new(4, 4);
        canvas.blend_pixel(-1, 2, [1.0; 4], 1.0);
        canvas.blend_pixel(2, 4, [1.0; 4], 1.0);
        assert!(canvas.is_transparent());
    }

    #[test]
    fn test_draw_canvas_with_offset() {
        let mut canvas = Canvas::filled(10, 10, WHITE);
        let overlay = Canvas::filled(2, 2, [0.0, 0.0, 0.0, 1.0]);

        canvas.draw_canvas(&overlay, 8, 8, 0.5);

        let inside = canvas.get_pixel(9, 9).unwrap();
        assert!((inside[0] - 0.5).abs() < 0.001);
        assert_eq!(canvas.get_pixel(7, 7), Some(WHITE));
    }

    #[test]
    fn test_to_rgba_image() {
        let mut canvas = Canvas::new(2, 1);
        canvas.set_pixel(1, 0, [1.0, 0.5, 0.0, 1.0]);
        let image = canvas.to_rgba_image();
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(image.get_pixel(1, 0).0, [255, 128, 0, 255]);
    }
}
