//! Triangle primitive and its closest-point queries
//!
//! These are the narrow-phase building blocks of the capsule sweep: a
//! triangle-to-point projection, triangle-to-segment closest pair and a
//! double-sided ray test.

use crate::{Ray, Segment, Vec3};

/// A triangle given by three corners
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

/// Closest pair between a triangle and a segment
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriangleSegmentContact {
    /// Distance between the two points (0 when the segment pierces the triangle)
    pub distance: f32,
    /// Point on the triangle
    pub triangle_point: Vec3,
    /// Point on the segment
    pub segment_point: Vec3,
}

/// A ray hit against a triangle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Distance along the ray
    pub distance: f32,
    /// World point of the hit
    pub point: Vec3,
}

impl Triangle {
    /// Create a triangle
    pub const fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Unit face normal following the a→b→c winding (zero for slivers)
    pub fn normal(&self) -> Vec3 {
        (self.b - self.a).cross(self.c - self.a).normalized()
    }

    /// Centroid
    pub fn centroid(&self) -> Vec3 {
        (self.a + self.b + self.c) / 3.0
    }

    /// Component-wise min corner
    pub fn min(&self) -> Vec3 {
        self.a.min_components(self.b).min_components(self.c)
    }

    /// Component-wise max corner
    pub fn max(&self) -> Vec3 {
        self.a.max_components(self.b).max_components(self.c)
    }

    /// Closest point on the triangle to `p` (Voronoi region walk)
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        let (a, b, c) = (self.a, self.b, self.c);
        let ab = b - a;
        let ac = c - a;
        let ap = p - a;
        let d1 = ab.dot(ap);
        let d2 = ac.dot(ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a;
        }

        let bp = p - b;
        let d3 = ab.dot(bp);
        let d4 = ac.dot(bp);
        if d3 >= 0.0 && d4 <= d3 {
            return b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return a + ab * v;
        }

        let cp = p - c;
        let d5 = ab.dot(cp);
        let d6 = ac.dot(cp);
        if d6 >= 0.0 && d5 <= d6 {
            return c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return a + ac * w;
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return b + (c - b) * w;
        }

        let denom = va + vb + vc;
        if denom.abs() < f32::EPSILON {
            // Sliver triangle, fall back to the nearest corner
            return [a, b, c]
                .into_iter()
                .min_by(|x, y| x.distance_squared(p).total_cmp(&y.distance_squared(p)))
                .unwrap_or(a);
        }
        let v = vb / denom;
        let w = vc / denom;
        a + ab * v + ac * w
    }

    /// Point where the segment crosses the triangle, if it does
    pub fn intersect_segment(&self, segment: &Segment) -> Option<Vec3> {
        let dir = segment.delta();
        let t = self.intersect_line(segment.start, dir)?;
        (0.0..=1.0).contains(&t).then(|| segment.at(t))
    }

    /// Closest pair of points between the triangle and a segment
    pub fn closest_point_to_segment(&self, segment: &Segment) -> TriangleSegmentContact {
        if let Some(point) = self.intersect_segment(segment) {
            return TriangleSegmentContact {
                distance: 0.0,
                triangle_point: point,
                segment_point: point,
            };
        }

        let mut best = TriangleSegmentContact {
            distance: f32::INFINITY,
            triangle_point: self.a,
            segment_point: segment.start,
        };
        let mut consider = |tri_point: Vec3, seg_point: Vec3| {
            let distance = tri_point.distance(seg_point);
            if distance < best.distance {
                best = TriangleSegmentContact {
                    distance,
                    triangle_point: tri_point,
                    segment_point: seg_point,
                };
            }
        };

        for edge in [
            Segment::new(self.a, self.b),
            Segment::new(self.b, self.c),
            Segment::new(self.c, self.a),
        ] {
            let (on_edge, on_segment) = edge.closest_points(segment);
            consider(on_edge, on_segment);
        }
        consider(self.closest_point(segment.start), segment.start);
        consider(self.closest_point(segment.end), segment.end);

        best
    }

    /// Double-sided ray test, hits restricted to `[near, far]`
    pub fn raycast(&self, ray: &Ray, near: f32, far: f32) -> Option<RayHit> {
        let t = self.intersect_line(ray.origin, ray.direction)?;
        (t >= near && t <= far).then(|| RayHit {
            distance: t,
            point: ray.at(t),
        })
    }

    /// Möller–Trumbore line parameter where `origin + dir * t` meets the triangle
    fn intersect_line(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        let e1 = self.b - self.a;
        let e2 = self.c - self.a;
        let p = dir.cross(e2);
        let det = e1.dot(p);
        if det.abs() < 1e-9 {
            return None;
        }
        let inv_det = 1.0 / det;
        let s = origin - self.a;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(e1);
        let v = dir.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        Some(e2.dot(q) * inv_det)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn floor_triangle() -> Triangle {
        Triangle::new(
            Vec3::new(-5.0, 0.0, -5.0),
            Vec3::new(-5.0, 0.0, 5.0),
            Vec3::new(5.0, 0.0, 0.0),
        )
    }

    #[test]
    fn test_normal_winding() {
        let n = floor_triangle().normal();
        assert!((n.y - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_closest_point_inside_face() {
        let tri = floor_triangle();
        let p = tri.closest_point(Vec3::new(0.0, 3.0, 0.0));
        assert!((p - Vec3::ZERO).length() < EPSILON);
    }

    #[test]
    fn test_closest_point_vertex_region() {
        let tri = floor_triangle();
        let p = tri.closest_point(Vec3::new(10.0, 1.0, 0.0));
        assert!((p - Vec3::new(5.0, 0.0, 0.0)).length() < EPSILON);
    }

    #[test]
    fn test_segment_above_face() {
        let tri = floor_triangle();
        let seg = Segment::new(Vec3::new(0.0, 1.4, 0.0), Vec3::new(0.0, 0.4, 0.0));
        let contact = tri.closest_point_to_segment(&seg);
        assert!((contact.distance - 0.4).abs() < EPSILON);
        assert!((contact.segment_point - seg.end).length() < EPSILON);
        assert!(contact.triangle_point.y.abs() < EPSILON);
    }

    #[test]
    fn test_segment_beside_edge() {
        let tri = floor_triangle();
        // Horizontal segment just past the edge x=-5
        let seg = Segment::new(Vec3::new(-5.3, 0.0, -1.0), Vec3::new(-5.3, 0.0, 1.0));
        let contact = tri.closest_point_to_segment(&seg);
        assert!((contact.distance - 0.3).abs() < EPSILON);
    }

    #[test]
    fn test_segment_piercing_face() {
        let tri = floor_triangle();
        let seg = Segment::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let contact = tri.closest_point_to_segment(&seg);
        assert_eq!(contact.distance, 0.0);
        assert!(contact.triangle_point.length() < EPSILON);
    }

    #[test]
    fn test_raycast_double_sided() {
        let tri = floor_triangle();
        let down = Ray::new(Vec3::new(0.0, 2.0, 0.0), -Vec3::Y);
        let up = Ray::new(Vec3::new(0.0, -2.0, 0.0), Vec3::Y);
        let hit = tri.raycast(&down, 0.0, 10.0).expect("hit from above");
        assert!((hit.distance - 2.0).abs() < EPSILON);
        assert!(tri.raycast(&up, 0.0, 10.0).is_some());
        assert!(tri.raycast(&down, 0.0, 1.0).is_none());
    }
}
