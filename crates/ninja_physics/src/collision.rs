//! Shape-pair intersection library
//!
//! Pure, stateless narrow-phase tests between the primitive [`Collider`]
//! shapes. Every test returns `None` when the shapes do not interact
//! (including degenerate input) and a fresh [`CollisionResult`] otherwise.
//!
//! Direction convention: `cast_direction` points from the first shape toward
//! the second, `receive_direction` is its negation. [`intersect`] dispatches
//! any pair and keeps that convention for swapped argument orders.
//!
//! Also provides collision filtering via layer masks.

use bitflags::bitflags;

use crate::shapes::{Aabb, Capsule, Collider, Sphere};
use ninja_math::Vec3;

const DEGENERATE_EPSILON: f32 = 1e-10;

bitflags! {
    /// Collision layers for filtering which objects can collide
    ///
    /// Each layer is a bit in a 32-bit mask. Objects can belong to multiple layers
    /// and can define which layers they collide with via a collision mask.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CollisionLayer: u32 {
        /// Default layer for most objects
        const DEFAULT = 1 << 0;
        /// Controlled character layer
        const PLAYER = 1 << 1;
        /// Static world geometry (floors, walls, ramps)
        const STATIC = 1 << 2;
        /// Movable props driven by the dynamic updater
        const PROP = 1 << 3;
        /// Trigger zones (detect but don't push)
        const TRIGGER = 1 << 4;
        /// All layers (collide with everything)
        const ALL = 0xFFFFFFFF;
    }
}

/// Collision filter determining what an object collides with
///
/// Two objects A and B collide if:
/// - (A.layer & B.mask) != 0, AND
/// - (B.layer & A.mask) != 0
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionFilter {
    /// Which layer(s) this object belongs to
    pub layer: CollisionLayer,
    /// Which layer(s) this object can collide with
    pub mask: CollisionLayer,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            layer: CollisionLayer::DEFAULT,
            mask: CollisionLayer::ALL,
        }
    }
}

impl CollisionFilter {
    /// Create a new collision filter with specified layer and mask
    pub fn new(layer: CollisionLayer, mask: CollisionLayer) -> Self {
        Self { layer, mask }
    }

    /// Check if this filter allows collision with another filter
    pub fn collides_with(&self, other: &Self) -> bool {
        self.layer.intersects(other.mask) && other.layer.intersects(self.mask)
    }

    /// Filter for the controlled character
    ///
    /// Collides with everything except triggers and other players.
    pub fn player() -> Self {
        Self {
            layer: CollisionLayer::PLAYER,
            mask: CollisionLayer::ALL & !CollisionLayer::PLAYER & !CollisionLayer::TRIGGER,
        }
    }

    /// Filter for static world geometry
    pub fn static_world() -> Self {
        Self {
            layer: CollisionLayer::STATIC,
            mask: CollisionLayer::ALL,
        }
    }

    /// Filter for a movable prop that rests on the static world
    pub fn prop() -> Self {
        Self {
            layer: CollisionLayer::PROP,
            mask: CollisionLayer::ALL,
        }
    }

    /// Filter for a prop that ignores the static world (falls through it)
    pub fn ghost_prop() -> Self {
        Self {
            layer: CollisionLayer::PROP,
            mask: CollisionLayer::ALL & !CollisionLayer::STATIC,
        }
    }

    /// Filter for trigger zones that detect the given layers
    pub fn trigger(detects: CollisionLayer) -> Self {
        Self {
            layer: CollisionLayer::TRIGGER,
            mask: detects,
        }
    }
}

/// Result of a shape-pair test
///
/// Produced fresh per query; `intersect` is always `true` for results
/// returned by the library.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionResult {
    /// Whether the shapes touch or overlap
    pub intersect: bool,
    /// Test-specific separation measure (see each test)
    pub distance: f32,
    /// Unit direction from the first shape toward the second
    pub cast_direction: Vec3,
    /// Unit direction from the second shape toward the first
    pub receive_direction: Vec3,
    /// Contact point in world space
    pub point: Vec3,
}

impl CollisionResult {
    /// Create an intersecting result
    pub fn new(distance: f32, cast_direction: Vec3, point: Vec3) -> Self {
        Self {
            intersect: true,
            distance,
            cast_direction,
            receive_direction: -cast_direction,
            point,
        }
    }

    /// Same contact seen from the other shape
    pub fn swapped(self) -> Self {
        Self {
            cast_direction: self.receive_direction,
            receive_direction: self.cast_direction,
            ..self
        }
    }
}

/// Test any pair of colliders
pub fn intersect(a: &Collider, b: &Collider) -> Option<CollisionResult> {
    match (a, b) {
        (Collider::Box(x), Collider::Box(y)) => box_vs_box(x, y),
        (Collider::Box(x), Collider::Sphere(y)) => sphere_vs_box(y, x).map(CollisionResult::swapped),
        (Collider::Box(x), Collider::Capsule(y)) => box_vs_capsule(x, y),
        (Collider::Sphere(x), Collider::Box(y)) => sphere_vs_box(x, y),
        (Collider::Sphere(x), Collider::Sphere(y)) => sphere_vs_sphere(x, y),
        (Collider::Sphere(x), Collider::Capsule(y)) => sphere_vs_capsule(x, y),
        (Collider::Capsule(x), Collider::Box(y)) => box_vs_capsule(y, x).map(CollisionResult::swapped),
        (Collider::Capsule(x), Collider::Sphere(y)) => {
            sphere_vs_capsule(y, x).map(CollisionResult::swapped)
        }
        (Collider::Capsule(x), Collider::Capsule(y)) => capsule_vs_capsule(x, y),
    }
}

/// Test an axis-aligned box against a capsule
///
/// The capsule is approximated by its loose bounds. The separating direction
/// is the dominant axis of the offset from the box center to the center of
/// the overlap region, the contact point sits on the box face along that axis
/// and `distance` is the gap between the capsule center and that face.
///
/// Boxes with coincident centers have no dominant axis; they report a
/// zero-distance contact at the box center pushing along +Y.
pub fn box_vs_capsule(boxed: &Aabb, capsule: &Capsule) -> Option<CollisionResult> {
    let capsule_box = capsule.bounds();
    if !boxed.intersects(&capsule_box) {
        return None;
    }

    let box_center = boxed.center();
    let overlap_center =
        (boxed.min.max_components(capsule_box.min) + boxed.max.min_components(capsule_box.max)) * 0.5;
    let offset = overlap_center - box_center;
    if offset.length_squared() < DEGENERATE_EPSILON {
        return Some(CollisionResult::new(0.0, Vec3::Y, box_center));
    }

    let axis = dominant_axis(offset);
    let positive = offset.axis(axis) > 0.0;
    let direction = unit_axis(axis, positive);

    let face = if positive { boxed.max.axis(axis) } else { boxed.min.axis(axis) };
    let probe = (box_center + offset.normalized()).clamp_components(boxed.min, boxed.max);
    let point = with_axis(probe, axis, face);
    let distance = (capsule.center().axis(axis) - face).abs();

    Some(CollisionResult::new(distance, direction, point))
}

/// Test two capsules
///
/// Collides when the closest distance between the core segments is at most
/// the sum of the radii; touching counts. Capsules whose core segment has
/// zero length yield `None`. `distance` is the core-segment distance and the
/// contact point is the midpoint of the closest pair.
pub fn capsule_vs_capsule(a: &Capsule, b: &Capsule) -> Option<CollisionResult> {
    if a.segment.is_degenerate() || b.segment.is_degenerate() {
        return None;
    }

    let (pa, pb) = a.segment.closest_points(&b.segment);
    let offset = pb - pa;
    let distance = offset.length();
    if distance > a.radius() + b.radius() {
        return None;
    }

    let direction = direction_or(offset, b.center() - a.center());
    Some(CollisionResult::new(distance, direction, pa.lerp(pb, 0.5)))
}

/// Test two spheres
///
/// `distance` is the center distance; the contact point lies on the first
/// sphere's surface toward the second.
pub fn sphere_vs_sphere(a: &Sphere, b: &Sphere) -> Option<CollisionResult> {
    let offset = b.center - a.center;
    let distance = offset.length();
    if distance > a.radius + b.radius {
        return None;
    }

    let normal = direction_or(offset, Vec3::Y);
    Some(CollisionResult::new(distance, normal, a.center + normal * a.radius))
}

/// Test a sphere against a capsule
///
/// `distance` is between the sphere center and the closest point of the
/// capsule core segment.
pub fn sphere_vs_capsule(sphere: &Sphere, capsule: &Capsule) -> Option<CollisionResult> {
    let closest = capsule.segment.closest_point(sphere.center);
    let offset = closest - sphere.center;
    let distance = offset.length();
    if distance > sphere.radius + capsule.radius() {
        return None;
    }

    let normal = direction_or(offset, Vec3::Y);
    Some(CollisionResult::new(distance, normal, sphere.center + normal * sphere.radius))
}

/// Test a sphere against an axis-aligned box
///
/// `distance` is between the sphere center and the closest point on the box.
pub fn sphere_vs_box(sphere: &Sphere, boxed: &Aabb) -> Option<CollisionResult> {
    let closest = boxed.closest_point(sphere.center);
    let delta = closest - sphere.center;
    let dist_squared = delta.length_squared();
    if dist_squared > sphere.radius * sphere.radius {
        return None;
    }

    let dist = dist_squared.sqrt();
    if dist > 1e-4 {
        return Some(CollisionResult::new(dist, delta / dist, closest));
    }

    // Sphere center is inside the box: leave through the nearest face
    let to_min = sphere.center - boxed.min;
    let to_max = boxed.max - sphere.center;
    let mut best = to_min.x;
    let mut axis = 0;
    let mut toward_max = false;
    for i in 0..3 {
        if to_min.axis(i) < best {
            best = to_min.axis(i);
            axis = i;
            toward_max = false;
        }
        if to_max.axis(i) < best {
            best = to_max.axis(i);
            axis = i;
            toward_max = true;
        }
    }
    let face = if toward_max { boxed.max.axis(axis) } else { boxed.min.axis(axis) };
    // Escape is toward the face, so the box lies the opposite way
    let cast = -unit_axis(axis, toward_max);
    Some(CollisionResult::new(0.0, cast, with_axis(sphere.center, axis, face)))
}

/// Test two axis-aligned boxes
///
/// Separates along the axis of least overlap. `distance` is the overlap
/// depth on that axis and the contact point is the center of the overlap
/// region.
pub fn box_vs_box(a: &Aabb, b: &Aabb) -> Option<CollisionResult> {
    if !a.intersects(b) {
        return None;
    }

    let overlap_min = a.min.max_components(b.min);
    let overlap_max = a.max.min_components(b.max);
    let overlap = overlap_max - overlap_min;

    let mut axis = 0;
    for i in 1..3 {
        if overlap.axis(i) < overlap.axis(axis) {
            axis = i;
        }
    }
    let toward_b = a.center().axis(axis) <= b.center().axis(axis);
    let point = (overlap_min + overlap_max) * 0.5;

    Some(CollisionResult::new(overlap.axis(axis), unit_axis(axis, toward_b), point))
}

/// Index of the largest absolute component, preferring X then Y on ties
fn dominant_axis(v: Vec3) -> usize {
    let a = v.abs();
    if a.x >= a.y && a.x >= a.z {
        0
    } else if a.y >= a.z {
        1
    } else {
        2
    }
}

fn unit_axis(axis: usize, positive: bool) -> Vec3 {
    let sign = if positive { 1.0 } else { -1.0 };
    match axis {
        0 => Vec3::new(sign, 0.0, 0.0),
        1 => Vec3::new(0.0, sign, 0.0),
        _ => Vec3::new(0.0, 0.0, sign),
    }
}

fn with_axis(v: Vec3, axis: usize, value: f32) -> Vec3 {
    match axis {
        0 => Vec3::new(value, v.y, v.z),
        1 => Vec3::new(v.x, value, v.z),
        _ => Vec3::new(v.x, v.y, value),
    }
}

/// Normalize `v`, falling back to `fallback` (then +Y) when `v` is zero
fn direction_or(v: Vec3, fallback: Vec3) -> Vec3 {
    if v.length_squared() > DEGENERATE_EPSILON {
        v.normalized()
    } else if fallback.length_squared() > DEGENERATE_EPSILON {
        fallback.normalized()
    } else {
        Vec3::Y
    }
}
