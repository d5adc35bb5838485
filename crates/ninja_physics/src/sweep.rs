//! Capsule sweep resolution against the static collision mesh
//!
//! The capsule's core segment is pushed out of every triangle it overlaps,
//! one triangle at a time in hierarchy traversal order. One pass can leave
//! the segment inside a neighbour it was pushed toward (a floor/wall corner),
//! so passes repeat until one finds nothing left to resolve.

use ninja_math::{Segment, Triangle, Vec3};

use crate::aggregator::StaticCollisionMesh;
use crate::shapes::{Aabb, MIN_CAPSULE_RADIUS};

const DIRECTION_EPSILON: f32 = 1e-6;

/// Upper bound on traversal passes per resolve
pub const MAX_SWEEP_PASSES: usize = 4;

/// Push depth below which a pass counts as settled
const SETTLED_DEPTH: f32 = 1e-6;

/// One triangle the capsule was pushed out of
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepContact {
    /// Push direction in collider-local space
    pub normal: Vec3,
    /// Push distance
    pub depth: f32,
}

/// Outcome of a sweep
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepResult {
    /// Corrected segment in world space
    pub segment: Segment,
    /// Number of pushes applied, summed over all passes
    pub contacts: usize,
}

impl SweepResult {
    /// Displacement of the segment start relative to `original`
    pub fn correction(&self, original: &Segment) -> Vec3 {
        self.segment.start - original.start
    }
}

/// Pushes capsule segments out of static geometry
///
/// Keeps its own contact buffer between calls, so separate resolvers never
/// share mutable state.
#[derive(Debug, Default)]
pub struct CapsuleSweepResolver {
    contacts: Vec<SweepContact>,
}

impl CapsuleSweepResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a capsule of `radius` around `segment_world` against `mesh`
    ///
    /// With no mesh, or no overlapping triangle, the segment comes back
    /// unchanged.
    pub fn resolve(
        &mut self,
        segment_world: &Segment,
        mesh: Option<&StaticCollisionMesh>,
        radius: f32,
    ) -> SweepResult {
        self.contacts.clear();
        let Some(mesh) = mesh else {
            return SweepResult {
                segment: *segment_world,
                contacts: 0,
            };
        };
        let radius = radius.max(MIN_CAPSULE_RADIUS);

        let mut local = segment_world.transformed(mesh.inverse_transform());
        for _ in 0..MAX_SWEEP_PASSES {
            let broad_phase = Aabb::around_segment(&local, radius);
            let contacts = &mut self.contacts;
            let mut deepest = 0.0f32;

            mesh.bvh().shapecast(
                |bounds| bounds.intersects(&broad_phase),
                |tri| {
                    if let Some(contact) = push_out(tri, &local, radius) {
                        local = local.translated(contact.normal * contact.depth);
                        deepest = deepest.max(contact.depth);
                        contacts.push(contact);
                    }
                    false
                },
            );

            if deepest <= SETTLED_DEPTH {
                break;
            }
        }

        if self.contacts.is_empty() {
            return SweepResult {
                segment: *segment_world,
                contacts: 0,
            };
        }
        SweepResult {
            segment: local.transformed(mesh.world_transform()),
            contacts: self.contacts.len(),
        }
    }

    /// Contacts found by the most recent [`resolve`](Self::resolve)
    pub fn last_contacts(&self) -> &[SweepContact] {
        &self.contacts
    }
}

/// Push needed to move `segment` a full `radius` away from `tri`
///
/// A segment that pierces the triangle is pushed along the face normal
/// (oriented toward the segment start) far enough to clear both endpoints.
pub fn push_out(tri: &Triangle, segment: &Segment, radius: f32) -> Option<SweepContact> {
    let closest = tri.closest_point_to_segment(segment);
    if closest.distance >= radius {
        return None;
    }

    if closest.distance > DIRECTION_EPSILON {
        let normal = (closest.segment_point - closest.triangle_point) / closest.distance;
        return Some(SweepContact {
            normal,
            depth: radius - closest.distance,
        });
    }

    let mut normal = tri.normal();
    if normal.length_squared() < 0.5 {
        normal = Vec3::Y;
    }
    let anchor = closest.triangle_point;
    if normal.dot(segment.start - anchor) < 0.0 {
        normal = -normal;
    }
    let lowest = normal
        .dot(segment.start - anchor)
        .min(normal.dot(segment.end - anchor));
    Some(SweepContact {
        normal,
        depth: radius - lowest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{StaticGeometryAggregator, StaticSource};
    use ninja_math::{mat4, MeshGeometry};

    const EPSILON: f32 = 1e-4;

    fn mesh_from(sources: &[(Vec3, Vec3)]) -> StaticCollisionMesh {
        // (center, size) cuboids
        let geometries: Vec<(Vec3, MeshGeometry)> = sources
            .iter()
            .map(|(c, s)| (*c, MeshGeometry::cuboid(*s)))
            .collect();
        let mut agg = StaticGeometryAggregator::new();
        agg.rebuild_now(
            geometries
                .iter()
                .map(|(c, g)| StaticSource::new(mat4::from_translation(*c), g)),
        );
        agg.mesh().cloned().expect("non-empty mesh")
    }

    fn floor_mesh() -> StaticCollisionMesh {
        // Top face at y = 0
        mesh_from(&[(Vec3::new(0.0, -0.5, 0.0), Vec3::new(20.0, 1.0, 20.0))])
    }

    fn vertical(x: f32, top: f32) -> Segment {
        Segment::new(Vec3::new(x, top, 0.0), Vec3::new(x, top - 1.0, 0.0))
    }

    #[test]
    fn test_no_mesh_leaves_segment() {
        let mut resolver = CapsuleSweepResolver::new();
        let seg = vertical(0.0, 1.0);
        let result = resolver.resolve(&seg, None, 0.5);
        assert_eq!(result.segment, seg);
        assert_eq!(result.contacts, 0);
    }

    #[test]
    fn test_airborne_capsule_untouched() {
        let mesh = floor_mesh();
        let mut resolver = CapsuleSweepResolver::new();
        let seg = vertical(0.0, 3.0);
        let result = resolver.resolve(&seg, Some(&mesh), 0.5);
        assert_eq!(result.segment, seg);
        assert_eq!(result.contacts, 0);
    }

    #[test]
    fn test_resting_penetration_pushed_up() {
        let mesh = floor_mesh();
        let mut resolver = CapsuleSweepResolver::new();
        let seg = vertical(0.0, 1.4);
        let result = resolver.resolve(&seg, Some(&mesh), 0.5);

        let correction = result.correction(&seg);
        assert!((correction.y - 0.1).abs() < EPSILON);
        assert!(correction.x.abs() < EPSILON && correction.z.abs() < EPSILON);
        assert!(result.contacts >= 1);
        assert!(resolver.last_contacts().iter().all(|c| c.normal.y > 0.99));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mesh = floor_mesh();
        let mut resolver = CapsuleSweepResolver::new();
        let first = resolver.resolve(&vertical(0.3, 1.2), Some(&mesh), 0.5);
        let second = resolver.resolve(&first.segment, Some(&mesh), 0.5);
        assert!(second.correction(&first.segment).length() < EPSILON);
    }

    #[test]
    fn test_piercing_segment_cleared() {
        let mesh = floor_mesh();
        let mut resolver = CapsuleSweepResolver::new();
        let seg = vertical(0.3, 0.3);
        let result = resolver.resolve(&seg, Some(&mesh), 0.5);
        // Lower endpoint ends a full radius above the floor
        assert!(result.segment.end.y >= 0.5 - EPSILON);
        assert!(result.segment.start.y > result.segment.end.y);
    }

    #[test]
    fn test_non_penetration_in_corner() {
        // Floor plus a wall whose -X face sits at x = 1
        let mesh = mesh_from(&[
            (Vec3::new(0.0, -0.5, 0.0), Vec3::new(20.0, 1.0, 20.0)),
            (Vec3::new(1.5, 1.8, 0.0), Vec3::new(1.0, 2.4, 4.0)),
        ]);
        let mut resolver = CapsuleSweepResolver::new();
        let radius = 0.5;
        let seg = Segment::new(Vec3::new(0.8, 1.3, 0.0), Vec3::new(0.8, 0.3, 0.0));
        let result = resolver.resolve(&seg, Some(&mesh), radius);

        let broad = Aabb::around_segment(&result.segment, radius);
        for tri in mesh.bvh().triangles() {
            let tri_box = Aabb::from_points([tri.a, tri.b, tri.c]);
            if !tri_box.intersects(&broad) {
                continue;
            }
            let d = tri.closest_point_to_segment(&result.segment).distance;
            assert!(d >= radius - 1e-3, "penetrating {:?} at {}", tri, d);
        }
        assert!((result.segment.start.x - 0.5).abs() < 1e-3);
        assert!((result.segment.end.y - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_corner_resolve_is_idempotent() {
        let mesh = mesh_from(&[
            (Vec3::new(0.0, -0.5, 0.0), Vec3::new(20.0, 1.0, 20.0)),
            (Vec3::new(1.5, 1.8, 0.0), Vec3::new(1.0, 2.4, 4.0)),
        ]);
        let mut resolver = CapsuleSweepResolver::new();
        let seg = Segment::new(Vec3::new(0.8, 1.3, 0.0), Vec3::new(0.8, 0.3, 0.0));
        let first = resolver.resolve(&seg, Some(&mesh), 0.5);
        assert!(first.contacts >= 2);

        let second = resolver.resolve(&first.segment, Some(&mesh), 0.5);
        assert!(second.correction(&first.segment).length() < EPSILON);
    }

    #[test]
    fn test_transformed_collider() {
        let mesh = floor_mesh().with_transform(mat4::from_translation(Vec3::new(0.0, 5.0, 0.0)));
        let mut resolver = CapsuleSweepResolver::new();
        let seg = vertical(0.0, 6.4);
        let result = resolver.resolve(&seg, Some(&mesh), 0.5);
        assert!((result.correction(&seg).y - 0.1).abs() < EPSILON);
    }

    #[test]
    fn test_push_out_direction() {
        let tri = Triangle::new(
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(-1.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
        );
        let seg = Segment::new(Vec3::new(0.0, 0.2, 0.0), Vec3::new(0.0, 0.2, 0.0));
        let contact = push_out(&tri, &seg, 0.5).expect("overlap");
        assert!((contact.normal - Vec3::Y).length() < EPSILON);
        assert!((contact.depth - 0.3).abs() < EPSILON);
        assert!(push_out(&tri, &seg.translated(Vec3::Y), 0.5).is_none());
    }
}
