//! SceneBuilder - Declarative scene construction
//!
//! Provides a fluent API for building collision scenes out of scene nodes.

use std::sync::Arc;

use ninja_core::{SceneNode, Transform3D, World};
use ninja_math::{MeshGeometry, Quat, Vec3};
use ninja_physics::{DynamicProp, PhysicsConfig, PhysicsMaterial};

/// Builder for constructing scenes with physics
///
/// # Example
/// ```ignore
/// let world = SceneBuilder::new()
///     .with_physics(PhysicsConfig::default())
///     .add_floor(60.0)
///     .add_player(Vec3::new(0.0, 0.0, 5.0))
///     .add_crate(Vec3::new(2.0, 4.0, 0.0), 1.0, "crate")
///     .build();
/// ```
pub struct SceneBuilder {
    world: World,
    player_start: Option<Vec3>,
}

impl SceneBuilder {
    /// Create a new scene builder
    pub fn new() -> Self {
        Self {
            world: World::new(),
            player_start: None,
        }
    }

    /// Create a scene builder with a pre-allocated world capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            world: World::with_capacity(capacity),
            player_start: None,
        }
    }

    /// Enable physics with the given configuration
    ///
    /// Call this before adding nodes so they are registered with physics.
    pub fn with_physics(mut self, config: PhysicsConfig) -> Self {
        self.world = self.world.with_physics(config);
        self
    }

    /// Add a square static floor at y = 0
    pub fn add_floor(mut self, size: f32) -> Self {
        self.world.add_node(
            SceneNode::static_geometry(Arc::new(MeshGeometry::plane(size)))
                .with_name("floor")
                .with_tag("static"),
        );
        self
    }

    /// Add a static box resting on the floor, e.g. a step or a platform
    ///
    /// `position` is the center of the box's bottom face.
    pub fn add_platform(mut self, position: Vec3, size: Vec3, name: &str) -> Self {
        let center = position + Vec3::new(0.0, size.y * 0.5, 0.0);
        self.world.add_node(
            SceneNode::static_geometry(Arc::new(MeshGeometry::cuboid(size)))
                .with_position(center)
                .with_name(name)
                .with_tag("static"),
        );
        self
    }

    /// Add a static wall turned by `yaw` radians around +Y
    pub fn add_wall(mut self, center: Vec3, size: Vec3, yaw: f32) -> Self {
        self.world.add_node(
            SceneNode::static_geometry(Arc::new(MeshGeometry::cuboid(size)))
                .with_transform(Transform3D::from_position_rotation(center, Quat::from_yaw(yaw)))
                .with_tag("static")
                .with_tag("wall"),
        );
        self
    }

    /// Add the player with its feet at `position`
    pub fn add_player(mut self, position: Vec3) -> Self {
        self.player_start = Some(position);
        let height = self
            .world
            .physics()
            .map_or(2.0, |p| p.player().config().height);
        self.world.add_node(
            SceneNode::player(Arc::new(MeshGeometry::cuboid(Vec3::new(1.0, height, 1.0))))
                .with_position(position)
                .with_name("player"),
        );
        self
    }

    /// Add a cube-shaped prop that falls and bounces
    pub fn add_crate(mut self, position: Vec3, size: f32, name: &str) -> Self {
        self.world.add_node(
            SceneNode::moveable(Arc::new(MeshGeometry::cuboid(Vec3::splat(size))))
                .with_position(position)
                .with_name(name)
                .with_tag("dynamic"),
        );
        self
    }

    /// Add a spherical prop with the given surface material
    pub fn add_ball(mut self, position: Vec3, radius: f32, material: PhysicsMaterial, name: &str) -> Self {
        let prop = DynamicProp::sphere(position, radius).with_material(material);
        self.world.add_node(
            SceneNode::moveable(Arc::new(MeshGeometry::cuboid(Vec3::splat(radius * 2.0))))
                .with_prop(prop)
                .with_position(position)
                .with_name(name)
                .with_tag("dynamic"),
        );
        self
    }

    /// Add a custom node to the scene
    ///
    /// For nodes that don't fit the standard patterns.
    pub fn add_node(mut self, node: SceneNode) -> Self {
        self.world.add_node(node);
        self
    }

    /// Build the scene and return the configured World
    ///
    /// Static geometry is merged right away so the first frame already
    /// collides.
    pub fn build(mut self) -> World {
        if self.world.static_count() > 0 {
            self.world.rebuild_static_now();
        }
        self.world
    }

    /// Get the player's starting position (if a player was added)
    pub fn player_start(&self) -> Option<Vec3> {
        self.player_start
    }
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}
