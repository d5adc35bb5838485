//! Line segments and rays

use serde::{Serialize, Deserialize};
use crate::{mat4, Mat4, Vec3};

const DEGENERATE_EPSILON: f32 = 1e-10;

/// A line segment between two points
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Vec3,
    pub end: Vec3,
}

impl Segment {
    /// Create a new segment
    pub const fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    /// Vector from start to end
    #[inline]
    pub fn delta(&self) -> Vec3 {
        self.end - self.start
    }

    /// Segment length
    #[inline]
    pub fn length(&self) -> f32 {
        self.delta().length()
    }

    /// Midpoint
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.start + self.end) * 0.5
    }

    /// Point at parameter `t` (0 = start, 1 = end)
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.start + self.delta() * t
    }

    /// Whether the segment has (numerically) zero length
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.delta().length_squared() < DEGENERATE_EPSILON
    }

    /// Translate both endpoints
    #[inline]
    pub fn translated(&self, offset: Vec3) -> Self {
        Self::new(self.start + offset, self.end + offset)
    }

    /// Apply an affine matrix to both endpoints
    pub fn transformed(&self, m: &Mat4) -> Self {
        Self::new(mat4::transform_point(m, self.start), mat4::transform_point(m, self.end))
    }

    /// Closest point on the segment to `p`
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        let d = self.delta();
        let len_sq = d.length_squared();
        if len_sq < DEGENERATE_EPSILON {
            return self.start;
        }
        let t = ((p - self.start).dot(d) / len_sq).clamp(0.0, 1.0);
        self.at(t)
    }

    /// Closest pair of points between this segment and another
    ///
    /// Returns `(point_on_self, point_on_other)`. Solves the 2x2 linear system
    /// for the unconstrained line parameters and clamps them to the segments;
    /// parallel segments pin the parameter on `self` to its start and clamp the
    /// other.
    pub fn closest_points(&self, other: &Segment) -> (Vec3, Vec3) {
        let d1 = self.delta();
        let d2 = other.delta();
        let r = self.start - other.start;
        let a = d1.length_squared();
        let e = d2.length_squared();
        let f = d2.dot(r);

        let (s, t) = if a <= DEGENERATE_EPSILON && e <= DEGENERATE_EPSILON {
            (0.0, 0.0)
        } else if a <= DEGENERATE_EPSILON {
            (0.0, (f / e).clamp(0.0, 1.0))
        } else {
            let c = d1.dot(r);
            if e <= DEGENERATE_EPSILON {
                ((-c / a).clamp(0.0, 1.0), 0.0)
            } else {
                let b = d1.dot(d2);
                let denom = a * e - b * b;
                let mut s = if denom.abs() > DEGENERATE_EPSILON {
                    ((b * f - c * e) / denom).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let mut t = (b * s + f) / e;
                if t < 0.0 {
                    t = 0.0;
                    s = (-c / a).clamp(0.0, 1.0);
                } else if t > 1.0 {
                    t = 1.0;
                    s = ((b - c) / a).clamp(0.0, 1.0);
                }
                (s, t)
            }
        };

        (self.at(s), other.at(t))
    }
}

/// A half-line starting at `origin` going along unit `direction`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray; the direction is normalized
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalized(),
        }
    }

    /// Point at distance `t` along the ray
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPSILON
    }

    #[test]
    fn test_closest_point_clamps() {
        let seg = Segment::new(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0));
        assert!(approx(seg.closest_point(Vec3::new(1.0, -0.5, 0.0)), Vec3::new(0.0, -0.5, 0.0)));
        assert!(approx(seg.closest_point(Vec3::new(0.0, 5.0, 0.0)), Vec3::ZERO));
        assert!(approx(seg.closest_point(Vec3::new(0.0, -5.0, 0.0)), Vec3::new(0.0, -1.0, 0.0)));
    }

    #[test]
    fn test_crossing_segments() {
        let a = Segment::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let b = Segment::new(Vec3::new(0.0, 1.0, -1.0), Vec3::new(0.0, 1.0, 1.0));
        let (pa, pb) = a.closest_points(&b);
        assert!(approx(pa, Vec3::ZERO));
        assert!(approx(pb, Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_parallel_segments() {
        let a = Segment::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let b = Segment::new(Vec3::new(2.0, 1.0, 0.0), Vec3::new(2.0, -1.0, 0.0));
        let (pa, pb) = a.closest_points(&b);
        assert!(((pa - pb).length() - 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_disjoint_collinear_segments() {
        let a = Segment::new(Vec3::ZERO, Vec3::X);
        let b = Segment::new(Vec3::new(3.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 0.0));
        let (pa, pb) = a.closest_points(&b);
        assert!(approx(pa, Vec3::X));
        assert!(approx(pb, Vec3::new(3.0, 0.0, 0.0)));
    }

    #[test]
    fn test_degenerate_segment_acts_as_point() {
        let p = Segment::new(Vec3::new(0.5, 2.0, 0.0), Vec3::new(0.5, 2.0, 0.0));
        let line = Segment::new(Vec3::ZERO, Vec3::X);
        assert!(p.is_degenerate());
        let (pa, pb) = p.closest_points(&line);
        assert!(approx(pa, Vec3::new(0.5, 2.0, 0.0)));
        assert!(approx(pb, Vec3::new(0.5, 0.0, 0.0)));
    }

    #[test]
    fn test_ray_normalizes_direction() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0));
        assert!(approx(ray.at(2.0), Vec3::new(0.0, 0.0, 2.0)));
    }
}
