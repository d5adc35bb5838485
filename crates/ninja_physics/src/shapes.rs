//! Collision shapes
//!
//! These are lightweight primitives used for collision detection,
//! separate from the mesh geometry in ninja_math.

use ninja_math::{Segment, Vec3};

/// Smallest radius a capsule may have
pub const MIN_CAPSULE_RADIUS: f32 = 1e-3;

/// A sphere defined by center and radius
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    /// Create a new sphere at the given center with the given radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Create a sphere whose radius is scaled by the largest axis of `scale`
    ///
    /// Non-uniformly scaled spheres are treated as their bounding sphere.
    pub fn scaled(center: Vec3, radius: f32, scale: Vec3) -> Self {
        Self::new(center, radius * scale.abs().max_element())
    }

    /// Check if a point is inside or on the sphere
    pub fn contains(&self, point: Vec3) -> bool {
        (point - self.center).length_squared() <= self.radius * self.radius
    }

    /// Bounding box of the sphere
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_half_extents(self.center, Vec3::splat(self.radius))
    }
}

/// An axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner (all components are minimums)
    pub min: Vec3,
    /// Maximum corner (all components are maximums)
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    /// An inverted box that contains nothing; growing it by any point yields
    /// that point
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create a new AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a position with given half-extents
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Create a unit cube centered at the origin
    pub fn unit() -> Self {
        Self::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5))
    }

    /// Smallest box containing every point
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points.into_iter().fold(Self::EMPTY, |b, p| b.grown(p))
    }

    /// Box around a segment, inflated by `radius` on every side
    pub fn around_segment(segment: &Segment, radius: f32) -> Self {
        Self::from_points([segment.start, segment.end]).inflated(radius)
    }

    /// Whether min <= max on every axis
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the half-extents (half the size in each dimension)
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Get the full size in each dimension
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Check if a point is inside or on the AABB
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Check if two boxes overlap (touching counts)
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Get the closest point inside or on the AABB to a given point
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.clamp_components(self.min, self.max)
    }

    /// Translate the AABB by a delta
    pub fn translated(&self, delta: Vec3) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// Grow the box to include a point
    pub fn grown(&self, point: Vec3) -> Self {
        Self {
            min: self.min.min_components(point),
            max: self.max.max_components(point),
        }
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &Aabb) -> Self {
        Self {
            min: self.min.min_components(other.min),
            max: self.max.max_components(other.max),
        }
    }

    /// Expand every face outward by `margin`
    pub fn inflated(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec3::splat(margin),
            max: self.max + Vec3::splat(margin),
        }
    }
}

/// A capsule: a segment swept by a radius
///
/// The radius is private so that it can never drop to zero or below.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Capsule {
    /// Core segment (hemisphere centres)
    pub segment: Segment,
    radius: f32,
}

impl Default for Capsule {
    /// Player-sized capsule: radius 0.5 hanging one unit below its origin
    fn default() -> Self {
        Self::new(
            Segment::new(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0)),
            0.5,
        )
    }
}

impl Capsule {
    /// Create a capsule; the radius is clamped to [`MIN_CAPSULE_RADIUS`]
    pub fn new(segment: Segment, radius: f32) -> Self {
        let radius = if radius.is_finite() {
            radius.max(MIN_CAPSULE_RADIUS)
        } else {
            MIN_CAPSULE_RADIUS
        };
        Self { segment, radius }
    }

    /// Upright capsule centred at `center` with the given tip-to-tip length
    ///
    /// The core segment spans `length - 2 * radius`; a length at or below
    /// twice the radius gives a degenerate (sphere-like) core.
    pub fn upright(center: Vec3, radius: f32, length: f32) -> Self {
        let half_core = (length * 0.5 - radius).max(0.0);
        Self::new(
            Segment::new(
                center + Vec3::new(0.0, half_core, 0.0),
                center - Vec3::new(0.0, half_core, 0.0),
            ),
            radius,
        )
    }

    /// Capsule radius (always positive)
    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Center of the core segment
    pub fn center(&self) -> Vec3 {
        self.segment.center()
    }

    /// Loose axis-aligned bounds
    pub fn bounds(&self) -> Aabb {
        Aabb::around_segment(&self.segment, self.radius)
    }

    /// Translate the capsule by a delta
    pub fn translated(&self, delta: Vec3) -> Self {
        Self {
            segment: self.segment.translated(delta),
            radius: self.radius,
        }
    }
}

/// Collider enum over the supported primitive shapes
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Collider {
    Box(Aabb),
    Sphere(Sphere),
    Capsule(Capsule),
}

impl Collider {
    /// Get the center of the collider
    pub fn center(&self) -> Vec3 {
        match self {
            Collider::Box(b) => b.center(),
            Collider::Sphere(s) => s.center,
            Collider::Capsule(c) => c.center(),
        }
    }

    /// Axis-aligned bounds of the collider
    pub fn bounds(&self) -> Aabb {
        match self {
            Collider::Box(b) => *b,
            Collider::Sphere(s) => s.bounds(),
            Collider::Capsule(c) => c.bounds(),
        }
    }

    /// Translate the collider by a delta
    pub fn translated(&self, delta: Vec3) -> Self {
        match self {
            Collider::Box(b) => Collider::Box(b.translated(delta)),
            Collider::Sphere(s) => Collider::Sphere(Sphere::new(s.center + delta, s.radius)),
            Collider::Capsule(c) => Collider::Capsule(c.translated(delta)),
        }
    }

    /// Same shape re-centred at `center`
    pub fn at(&self, center: Vec3) -> Self {
        self.translated(center - self.center())
    }
}
