//! Character movement and collision for Ninja
//!
//! This crate provides the collision and movement core, including:
//! - Static geometry aggregation into a bounding volume hierarchy
//! - Capsule sweep resolution against the merged static mesh
//! - Fixed-substep player movement with jumping and ground detection
//! - Third-person camera obstruction handling
//! - Shape-pair intersection tests between primitive colliders
//! - Secondary physics for movable props

pub mod aggregator;
pub mod body;
pub mod bvh;
pub mod camera;
pub mod collision;
pub mod dynamics;
pub mod material;
pub mod player;
pub mod shapes;
pub mod sweep;
pub mod world;

// Re-export commonly used types
pub use aggregator::{AggregatorConfig, StaticCollisionMesh, StaticGeometryAggregator, StaticSource};
pub use body::{DynamicProp, PropKey};
pub use bvh::{Bvh, BvhNode, MAX_LEAF_TRIANGLES};
pub use camera::{CameraConfig, CameraMode, CameraObstructionResolver, CameraOutcome, CameraRig, OrbitRig};
pub use collision::{
    box_vs_box, box_vs_capsule, capsule_vs_capsule, intersect, sphere_vs_box, sphere_vs_capsule,
    sphere_vs_sphere, CollisionFilter, CollisionLayer, CollisionResult,
};
pub use dynamics::{triangle_contact, DynamicCollisionUpdater, PropConfig};
pub use material::PhysicsMaterial;
pub use player::{
    InputSnapshot, LocomotionState, MovementState, PlayerConfig, PlayerController,
    DEFAULT_JUMP_POWER, DEFAULT_PLAYER_RADIUS,
};
pub use shapes::{Aabb, Capsule, Collider, Sphere, MIN_CAPSULE_RADIUS};
pub use sweep::{push_out, CapsuleSweepResolver, SweepContact, SweepResult, MAX_SWEEP_PASSES};
pub use world::{PhysicsConfig, PhysicsWorld};
