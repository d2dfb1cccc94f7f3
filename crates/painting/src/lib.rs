//! inkpage painting - brush model and raster engine
//!
//! This crate turns a decoded drawing into pixels:
//! - [`geometry`] - 2D affine transforms used for rotation
//! - [`surface`] - straight-alpha f32 RGBA canvas
//! - [`mask`] - grayscale stamp masks (scale, opacity, rotation)
//! - [`brush`] - brush families and their pressure/speed curves
//! - [`stamp`] - stamping a prepared mask along a segment
//! - [`assets`] - brush stamp and template sources, with a load-once cache
//! - [`render`] - the page raster engine

pub mod assets;
pub mod brush;
pub mod error;
pub mod geometry;
pub mod mask;
pub mod render;
pub mod stamp;
pub mod surface;

pub use assets::{
    AssetCache, AssetCategory, AssetSource, BLANK_TEMPLATE, BuiltinAssets, DirectoryAssets,
    LayeredAssets, MemoryAssets,
};
pub use brush::*;
pub use error::RenderError;
pub use mask::AlphaMask;
pub use render::RasterEngine;
pub use stamp::Stamp;
pub use surface::Canvas;
