/// Canvas width in pixels. Dot x coordinates lie in `0..=CANVAS_WIDTH`.
pub const CANVAS_WIDTH: f32 = 1404.0;

/// Canvas height in pixels. Dot y coordinates lie in `0..=CANVAS_HEIGHT`.
pub const CANVAS_HEIGHT: f32 = 1872.0;

/// Length of the ASCII header at the start of every drawing.
pub const HEADER_LEN: usize = 43;

/// Header identifying a version 3 drawing (space padded to [`HEADER_LEN`]).
pub const HEADER_V3: &[u8; HEADER_LEN] = b"reMarkable .lines file, version=3          ";

/// Header identifying a version 5 drawing (space padded to [`HEADER_LEN`]).
pub const HEADER_V5: &[u8; HEADER_LEN] = b"reMarkable .lines file, version=5          ";

/// Size of one encoded dot: six little-endian f32 fields.
pub const DOT_SIZE: usize = 24;

/// Base scale of the small brush size.
pub const BRUSH_SIZE_SMALL: f32 = 1.875;

/// Base scale of the medium brush size.
pub const BRUSH_SIZE_MEDIUM: f32 = 2.0;

/// Base scale of the large brush size.
pub const BRUSH_SIZE_LARGE: f32 = 2.125;

/// Upper bound on speculative allocation for counts read from untrusted input.
pub(crate) const MAX_PREALLOC: usize = 4096;
