//! 2D affine transforms as 3x3 homogeneous matrices
//!
//! Matrices act on column vectors, so `multiply(a, b)` applies `b` first.
//! Everything stays in f64; rounding to whole pixels happens only when a
//! sample is written to a raster.

use glam::{DMat3, DVec2};

pub type Matrix = DMat3;

#[inline]
pub fn identity() -> Matrix {
    DMat3::IDENTITY
}

/// Counter-clockwise rotation by `angle` radians. With the y axis pointing
/// down this turns clockwise on screen.
#[inline]
pub fn rotation(angle: f64) -> Matrix {
    DMat3::from_angle(angle)
}

#[inline]
pub fn translation(dx: f64, dy: f64) -> Matrix {
    DMat3::from_translation(DVec2::new(dx, dy))
}

/// Matrix product `a * b`
#[inline]
pub fn multiply(a: Matrix, b: Matrix) -> Matrix {
    a * b
}

#[inline]
pub fn transform(matrix: Matrix, x: f64, y: f64) -> (f64, f64) {
    let p = matrix.transform_point2(DVec2::new(x, y));
    (p.x, p.y)
}

/// Rotation about `(cx, cy)`: translate(-center), rotate, translate(+center)
pub fn rotation_about(cx: f64, cy: f64, angle: f64) -> Matrix {
    multiply(
        translation(cx, cy),
        multiply(rotation(angle), translation(-cx, -cy)),
    )
}

/// Map a `src_w`x`src_h` image onto a `dst_w`x`dst_h` raster, rotated by
/// `angle` about its center and with the two centers aligned.
pub fn center_rotation(src_w: f64, src_h: f64, dst_w: f64, dst_h: f64, angle: f64) -> Matrix {
    multiply(
        translation(dst_w / 2.0, dst_h / 2.0),
        multiply(rotation(angle), translation(-src_w / 2.0, -src_h / 2.0)),
    )
}
