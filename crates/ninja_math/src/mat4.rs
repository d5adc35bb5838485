//! 4x4 matrix utilities for affine world transforms
//!
//! Matrices are column-major: `m[column][row]`. Only affine matrices
//! (bottom row `0 0 0 1`) are produced and consumed here, which is all
//! the collision code needs for moving segments in and out of collider space.

use crate::{Quat, Vec3};

/// 4x4 matrix type (column-major)
pub type Mat4 = [[f32; 4]; 4];

/// Identity matrix
pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Pure translation
pub fn from_translation(t: Vec3) -> Mat4 {
    let mut m = IDENTITY;
    m[3][0] = t.x;
    m[3][1] = t.y;
    m[3][2] = t.z;
    m
}

/// Compose translation * rotation * scale
pub fn from_trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Mat4 {
    let [bx, by, bz] = rotation.to_basis();
    let bx = bx * scale.x;
    let by = by * scale.y;
    let bz = bz * scale.z;
    [
        [bx.x, bx.y, bx.z, 0.0],
        [by.x, by.y, by.z, 0.0],
        [bz.x, bz.y, bz.z, 0.0],
        [translation.x, translation.y, translation.z, 1.0],
    ]
}

/// Transform a point (w = 1)
#[inline]
pub fn transform_point(m: &Mat4, p: Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * p.x + m[1][0] * p.y + m[2][0] * p.z + m[3][0],
        m[0][1] * p.x + m[1][1] * p.y + m[2][1] * p.z + m[3][1],
        m[0][2] * p.x + m[1][2] * p.y + m[2][2] * p.z + m[3][2],
    )
}

/// Transform a direction (w = 0)
#[inline]
pub fn transform_vector(m: &Mat4, v: Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * v.x + m[1][0] * v.y + m[2][0] * v.z,
        m[0][1] * v.x + m[1][1] * v.y + m[2][1] * v.z,
        m[0][2] * v.x + m[1][2] * v.y + m[2][2] * v.z,
    )
}

/// Matrix product `a * b` (applies `b` first)
pub fn mul(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut out = [[0.0; 4]; 4];
    for (c, col) in out.iter_mut().enumerate() {
        for (r, cell) in col.iter_mut().enumerate() {
            *cell = (0..4).map(|k| a[k][r] * b[c][k]).sum();
        }
    }
    out
}

/// Inverse of an affine matrix
///
/// Returns `None` when the linear part is singular (e.g. a zero scale axis).
pub fn inverse_affine(m: &Mat4) -> Option<Mat4> {
    let (a, b, c) = (m[0][0], m[1][0], m[2][0]);
    let (d, e, f) = (m[0][1], m[1][1], m[2][1]);
    let (g, h, i) = (m[0][2], m[1][2], m[2][2]);

    let co_a = e * i - f * h;
    let co_b = -(d * i - f * g);
    let co_c = d * h - e * g;
    let det = a * co_a + b * co_b + c * co_c;
    if det.abs() < 1e-12 {
        return None;
    }
    let inv_det = 1.0 / det;

    // Rows of the inverse linear part
    let r0 = [co_a * inv_det, -(b * i - c * h) * inv_det, (b * f - c * e) * inv_det];
    let r1 = [co_b * inv_det, (a * i - c * g) * inv_det, -(a * f - c * d) * inv_det];
    let r2 = [co_c * inv_det, -(a * h - b * g) * inv_det, (a * e - b * d) * inv_det];

    let t = Vec3::new(m[3][0], m[3][1], m[3][2]);
    let tx = -(r0[0] * t.x + r0[1] * t.y + r0[2] * t.z);
    let ty = -(r1[0] * t.x + r1[1] * t.y + r1[2] * t.z);
    let tz = -(r2[0] * t.x + r2[1] * t.y + r2[2] * t.z);

    Some([
        [r0[0], r1[0], r2[0], 0.0],
        [r0[1], r1[1], r2[1], 0.0],
        [r0[2], r1[2], r2[2], 0.0],
        [tx, ty, tz, 1.0],
    ])
}

/// Largest per-axis scale factor encoded in the linear part
pub fn max_scale(m: &Mat4) -> f32 {
    let sx = Vec3::new(m[0][0], m[0][1], m[0][2]).length();
    let sy = Vec3::new(m[1][0], m[1][1], m[1][2]).length();
    let sz = Vec3::new(m[2][0], m[2][1], m[2][2]).length();
    sx.max(sy).max(sz)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPSILON
    }

    #[test]
    fn test_translation() {
        let m = from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(transform_point(&m, Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(transform_vector(&m, Vec3::X), Vec3::X);
    }

    #[test]
    fn test_trs_matches_manual() {
        let q = Quat::from_yaw(0.8);
        let m = from_trs(Vec3::new(5.0, -1.0, 2.0), q, Vec3::new(2.0, 3.0, 0.5));
        let p = Vec3::new(1.0, 1.0, 1.0);
        let expected = q.rotate(Vec3::new(2.0, 3.0, 0.5)) + Vec3::new(5.0, -1.0, 2.0);
        assert!(approx(transform_point(&m, p), expected));
    }

    #[test]
    fn test_inverse_roundtrip() {
        let m = from_trs(
            Vec3::new(-3.0, 4.0, 1.0),
            Quat::from_axis_angle(Vec3::new(1.0, 2.0, 0.5), 1.1),
            Vec3::new(1.5, 0.5, 2.0),
        );
        let inv = inverse_affine(&m).expect("invertible");
        let p = Vec3::new(0.3, -7.0, 2.2);
        assert!(approx(transform_point(&inv, transform_point(&m, p)), p));

        let id = mul(&m, &inv);
        for c in 0..4 {
            for r in 0..4 {
                assert!((id[c][r] - IDENTITY[c][r]).abs() < EPSILON);
            }
        }
    }

    #[test]
    fn test_singular_has_no_inverse() {
        let m = from_trs(Vec3::ZERO, Quat::IDENTITY, Vec3::new(1.0, 0.0, 1.0));
        assert!(inverse_affine(&m).is_none());
    }

    #[test]
    fn test_max_scale() {
        let m = from_trs(Vec3::ZERO, Quat::from_yaw(0.4), Vec3::new(1.0, 3.0, 2.0));
        assert!((max_scale(&m) - 3.0).abs() < EPSILON);
    }
}
