//! Movable props driven by the dynamic collision updater

use crate::collision::CollisionFilter;
use crate::material::PhysicsMaterial;
use crate::shapes::{Aabb, Capsule, Collider, Sphere};
use ninja_math::Vec3;
use slotmap::new_key_type;

// Define generational key type for props
new_key_type! {
    /// Key to a prop in the physics world
    ///
    /// Uses generational indexing: once a prop is removed, old keys return
    /// `None` instead of reaching whatever reuses the slot.
    pub struct PropKey;
}

/// A movable prop with a primitive collision shape
#[derive(Clone, Debug)]
pub struct DynamicProp {
    /// The collision shape (stores absolute world position)
    pub collider: Collider,
    /// Velocity in units per second
    pub velocity: Vec3,
    /// Surface response
    pub material: PhysicsMaterial,
    /// Which layers the prop collides with
    pub filter: CollisionFilter,
    /// Whether this prop is affected by gravity
    pub affected_by_gravity: bool,
    /// Set once the prop has fallen out of the world; it is never updated again
    pub retired: bool,
}

impl DynamicProp {
    /// Wrap an existing collider
    pub fn new(collider: Collider) -> Self {
        Self {
            collider,
            velocity: Vec3::ZERO,
            material: PhysicsMaterial::default(),
            filter: CollisionFilter::prop(),
            affected_by_gravity: true,
            retired: false,
        }
    }

    /// Create a sphere prop
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self::new(Collider::Sphere(Sphere::new(center, radius)))
    }

    /// Create a box prop
    pub fn cuboid(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(Collider::Box(Aabb::from_center_half_extents(center, half_extents)))
    }

    /// Create an upright capsule prop with the given tip-to-tip length
    pub fn capsule(center: Vec3, radius: f32, length: f32) -> Self {
        Self::new(Collider::Capsule(Capsule::upright(center, radius, length)))
    }

    /// Set the velocity of this prop
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the surface response
    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    /// Set the collision filter
    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set whether this prop is affected by gravity
    pub fn with_gravity(mut self, affected: bool) -> Self {
        self.affected_by_gravity = affected;
        self
    }

    /// Current center of the collider
    pub fn position(&self) -> Vec3 {
        self.collider.center()
    }

    /// Move the prop so its collider is centred at `position`
    pub fn set_position(&mut self, position: Vec3) {
        self.collider = self.collider.at(position);
    }

    /// Apply a positional correction (e.g., from collision resolution)
    pub fn apply_correction(&mut self, correction: Vec3) {
        self.collider = self.collider.translated(correction);
    }
}
