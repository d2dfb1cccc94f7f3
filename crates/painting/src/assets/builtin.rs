//! Procedural brush stamps and the blank page template.
//!
//! These stand in for the tablet's own stamp images when no asset directory
//! is configured. Every stamp is white-on-black grayscale: white is full
//! coverage once converted to a mask.

use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};
use inkpage_config::{CANVAS_HEIGHT, CANVAS_WIDTH};

use super::{AssetCategory, AssetSource, missing};
use crate::brush::BrushFamily;
use crate::error::RenderError;

/// Side length of generated stamps
const STAMP_SIZE: u32 = 64;

/// Name of the built-in white page
pub const BLANK_TEMPLATE: &str = "Blank";

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinAssets;

impl AssetSource for BuiltinAssets {
    fn load(&self, category: AssetCategory, name: &str) -> Result<DynamicImage, RenderError> {
        match category {
            AssetCategory::Brushes => BrushFamily::ALL
                .iter()
                .find(|family| family.asset_name() == name)
                .map(|family| DynamicImage::ImageLuma8(stamp_for(*family)))
                .ok_or_else(|| missing(category, name)),
            AssetCategory::Templates if name == BLANK_TEMPLATE => Ok(DynamicImage::ImageRgba8(
                RgbaImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, Rgba([255, 255, 255, 255])),
            )),
            AssetCategory::Templates => Err(missing(category, name)),
        }
    }
}

fn stamp_for(family: BrushFamily) -> GrayImage {
    match family {
        BrushFamily::Ballpoint => disc(0.9, 0.25, |_, _| 1.0),
        BrushFamily::Pencil => disc(0.95, 0.4, |x, y| 0.35 + 0.65 * grain(x, y, 1)),
        BrushFamily::MechanicalPencil => disc(0.8, 0.2, |x, y| 0.5 + 0.5 * grain(x, y, 2)),
        BrushFamily::Marker => ellipse(1.0, 0.7, 0.1),
        BrushFamily::Fineliner => disc(0.95, 0.05, |_, _| 1.0),
        BrushFamily::Highlighter => GrayImage::from_pixel(STAMP_SIZE, STAMP_SIZE, Luma([255])),
        BrushFamily::Base => disc(1.0, 0.0, |_, _| 1.0),
    }
}

fn disc(radius: f32, softness: f32, texture: impl Fn(u32, u32) -> f32) -> GrayImage {
    shape(STAMP_SIZE, |x, y, nx, ny| {
        let distance = (nx * nx + ny * ny).sqrt() / radius;
        edge(distance, softness) * texture(x, y)
    })
}

fn ellipse(rx: f32, ry: f32, softness: f32) -> GrayImage {
    shape(STAMP_SIZE, |_, _, nx, ny| {
        let distance = ((nx / rx).powi(2) + (ny / ry).powi(2)).sqrt();
        edge(distance, softness)
    })
}

/// Rasterize `f(x, y, nx, ny)` where (nx, ny) is the pixel center in -1..1
fn shape(size: u32, f: impl Fn(u32, u32, f32, f32) -> f32) -> GrayImage {
    let half = size as f32 / 2.0;
    GrayImage::from_fn(size, size, |x, y| {
        let nx = (x as f32 + 0.5 - half) / half;
        let ny = (y as f32 + 0.5 - half) / half;
        Luma([(f(x, y, nx, ny).clamp(0.0, 1.0) * 255.0).round() as u8])
    })
}

/// Coverage for a normalized distance: 1 inside, 0 outside, linear ramp of
/// width `softness` just inside the edge
fn edge(distance: f32, softness: f32) -> f32 {
    if distance >= 1.0 {
        0.0
    } else if softness <= 0.0 || distance <= 1.0 - softness {
        1.0
    } else {
        (1.0 - distance) / softness
    }
}

/// Deterministic per-pixel grain in 0..1
fn grain(x: u32, y: u32, seed: u32) -> f32 {
    let mut h = x.wrapping_mul(0x27d4_eb2d)
        ^ y.wrapping_mul(0x1656_67b1)
        ^ seed.wrapping_mul(0x9e37_79b9);
    h ^= h >> 15;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    (h & 0xffff) as f32 / 65535.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_family_has_a_stamp() {
        for family in BrushFamily::ALL {
            let image = BuiltinAssets
                .load(AssetCategory::Brushes, family.asset_name())
                .unwrap();
            assert_eq!(image.width(), STAMP_SIZE);
            let center = image.to_luma8().get_pixel(STAMP_SIZE / 2, STAMP_SIZE / 2).0[0];
            assert!(center > 0, "{family:?} stamp is empty at its center");
        }
    }

    #[test]
    fn test_disc_corners_are_empty() {
        let stamp = stamp_for(BrushFamily::Fineliner);
        assert_eq!(stamp.get_pixel(0, 0).0[0], 0);
        assert_eq!(stamp.get_pixel(STAMP_SIZE / 2, STAMP_SIZE / 2).0[0], 255);
    }

    #[test]
    fn test_blank_template() {
        let blank = BuiltinAssets
            .load(AssetCategory::Templates, BLANK_TEMPLATE)
            .unwrap();
        assert_eq!((blank.width(), blank.height()), (CANVAS_WIDTH, CANVAS_HEIGHT));
        assert!(BuiltinAssets.load(AssetCategory::Templates, "P Grid").is_err());
    }

    #[test]
    fn test_grain_is_deterministic() {
        assert_eq!(grain(3, 4, 1), grain(3, 4, 1));
        assert!((0.0..=1.0).contains(&grain(63, 63, 2)));
    }
}
