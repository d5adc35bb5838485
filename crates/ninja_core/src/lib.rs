//! Scene-node world for the Ninja collision and movement core
//!
//! This crate connects externally owned scene nodes to the physics core:
//!
//! - [`Transform3D`] - Position, rotation, and scale of a node
//! - [`SceneNode`] - Transform, shared geometry and collision role
//! - [`NodeRole`] - Static, moveable, player or decoration
//! - [`World`] - Container for all nodes, optionally driving a [`PhysicsWorld`]
//! - [`NodeKey`] - Generational key to a node in the world
//! - [`TransformBus`] - Per-node transform listeners

mod transform;
mod node;
mod world;
mod events;

pub use transform::Transform3D;
pub use node::{DirtyFlags, NodeRole, SceneNode};
pub use world::{NodeKey, World};
pub use events::{SubscriptionKey, TransformBus, TransformCallback};

// Re-export commonly used types from ninja_math for convenience
pub use ninja_math::{Mat4, MeshGeometry, Quat, Vec3};

// Re-export physics types for convenient access through ninja_core
pub use ninja_physics::{CameraOutcome, DynamicProp, InputSnapshot, PhysicsConfig, PhysicsWorld, PropKey};
