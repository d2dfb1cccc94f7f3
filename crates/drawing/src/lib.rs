//! inkpage drawing format - stroke data model and binary codec
//!
//! This crate provides the data types for one page of handwritten content
//! and the reader/writer for its binary representation:
//! - [`types::Drawing`] - layers of strokes, in paint order
//! - [`types::Stroke`] - one continuous pen motion with its samples
//! - [`types::Dot`] - a single pen sample (position, speed, tilt, width, pressure)
//! - [`codec`] - little-endian V3/V5 reader and writer
//! - [`validation`] - structural checks used as a pre-condition gate

pub mod codec;
pub mod constants;
pub mod types;
pub mod validation;

pub use codec::*;
pub use constants::*;
pub use types::*;
pub use validation::*;
