//! World container for scene nodes
//!
//! The World owns the scene nodes and, when physics is enabled, feeds them
//! to the [`PhysicsWorld`]: static nodes go to the geometry aggregator,
//! moveable nodes become props and the player node follows the movement
//! integrator. Corrected transforms are written back to the nodes and
//! published on the [`TransformBus`].

use crate::events::{SubscriptionKey, TransformBus, TransformCallback};
use crate::{NodeRole, SceneNode, Transform3D};
use ninja_math::{Quat, Vec3};
use ninja_physics::{CameraOutcome, InputSnapshot, PhysicsConfig, PhysicsWorld, StaticSource};
use slotmap::{new_key_type, SlotMap};

// Define generational key type for nodes
new_key_type! {
    /// Key to a node in the world
    ///
    /// Uses generational indexing so a key to a removed node stays invalid
    /// even after its slot is reused.
    pub struct NodeKey;
}

/// The scene world containing all nodes
///
/// The World is the central container for all scene objects.
/// It manages nodes and integrates with the physics core.
pub struct World {
    /// All nodes in the world
    nodes: SlotMap<NodeKey, SceneNode>,
    /// Optional physics simulation (None = no physics)
    physics_world: Option<PhysicsWorld>,
    /// Transform listeners
    bus: TransformBus,
    /// The node driven by the movement integrator
    player: Option<NodeKey>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            physics_world: None,
            bus: TransformBus::new(),
            player: None,
        }
    }

    /// Create a world with pre-allocated capacity for nodes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: SlotMap::with_capacity_and_key(capacity),
            ..Self::new()
        }
    }

    /// Enable physics for this world
    pub fn with_physics(mut self, config: PhysicsConfig) -> Self {
        self.physics_world = Some(PhysicsWorld::with_config(config));
        self
    }

    /// Get the physics world (if enabled)
    pub fn physics(&self) -> Option<&PhysicsWorld> {
        self.physics_world.as_ref()
    }

    /// Get mutable physics world (if enabled)
    pub fn physics_mut(&mut self) -> Option<&mut PhysicsWorld> {
        self.physics_world.as_mut()
    }

    /// Add a node to the world, returning its key
    ///
    /// With physics enabled, static nodes re-arm the aggregator, moveable
    /// nodes spawn a prop and a player node places the player at its feet.
    pub fn add_node(&mut self, mut node: SceneNode) -> NodeKey {
        if let Some(physics) = self.physics_world.as_mut() {
            match node.role {
                NodeRole::Moveable => {
                    if let Some(prop) = node.take_prop() {
                        node.prop_offset = prop.position() - node.transform.position;
                        node.prop = Some(physics.add_prop(prop));
                    }
                }
                NodeRole::Player => {
                    let config = physics.player().config();
                    let lift = Vec3::new(0.0, config.height - config.radius, 0.0);
                    physics.spawn_player(node.transform.position + lift);
                }
                NodeRole::Static | NodeRole::Decoration => {}
            }
        }

        let role = node.role;
        let key = self.nodes.insert(node);
        match role {
            NodeRole::Static => self.notify_static_count(),
            NodeRole::Player => {
                if let Some(previous) = self.player.replace(key) {
                    log::debug!("player node {:?} replaced by {:?}", previous, key);
                }
            }
            NodeRole::Moveable | NodeRole::Decoration => {}
        }
        key
    }

    /// Remove a node, dropping its prop and transform listeners
    pub fn remove_node(&mut self, key: NodeKey) -> Option<SceneNode> {
        let node = self.nodes.remove(key)?;
        self.bus.remove_node(key);

        if let (Some(prop), Some(physics)) = (node.prop, self.physics_world.as_mut()) {
            physics.remove_prop(prop);
        }
        match node.role {
            NodeRole::Static => self.notify_static_count(),
            NodeRole::Player if self.player == Some(key) => self.player = None,
            _ => {}
        }
        Some(node)
    }

    /// Get a reference to a node by key
    pub fn get_node(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    /// Get a mutable reference to a node by key
    ///
    /// Changes made here are not seen by the physics core; use
    /// [`World::set_node_position`] to move simulated nodes.
    pub fn get_node_mut(&mut self, key: NodeKey) -> Option<&mut SceneNode> {
        self.nodes.get_mut(key)
    }

    /// Find the first node with the given name
    pub fn find_by_name(&self, name: &str) -> Option<NodeKey> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name.as_deref() == Some(name))
            .map(|(key, _)| key)
    }

    /// All nodes carrying `tag`
    pub fn nodes_with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = NodeKey> + 'a {
        self.nodes
            .iter()
            .filter(move |(_, node)| node.has_tag(tag))
            .map(|(key, _)| key)
    }

    /// The player node, if one was added
    pub fn player_node(&self) -> Option<NodeKey> {
        self.player
    }

    /// Get the number of nodes
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes merged into the static collision mesh
    pub fn static_count(&self) -> usize {
        self.nodes.values().filter(|n| n.role == NodeRole::Static).count()
    }

    /// Check if the world is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Move a node, keeping its prop or the player in step
    pub fn set_node_position(&mut self, key: NodeKey, position: Vec3) -> bool {
        let Some(node) = self.nodes.get_mut(key) else {
            return false;
        };
        node.set_position(position);

        if let Some(physics) = self.physics_world.as_mut() {
            if let Some(prop) = node.prop.and_then(|k| physics.get_prop_mut(k)) {
                prop.set_position(position + node.prop_offset);
            } else if self.player == Some(key) {
                let config = physics.player().config();
                let lift = Vec3::new(0.0, config.height - config.radius, 0.0);
                physics.spawn_player(position + lift);
            }
        }
        true
    }

    /// Listen for transforms written back to `node`
    ///
    /// Returns `None` if the node does not exist.
    pub fn subscribe(&mut self, node: NodeKey, callback: TransformCallback) -> Option<SubscriptionKey> {
        self.nodes.contains_key(node).then(|| self.bus.subscribe(node, callback))
    }

    /// Stop listening
    pub fn unsubscribe(&mut self, key: SubscriptionKey) -> bool {
        self.bus.unsubscribe(key)
    }

    /// Merge the static nodes right away, skipping the debounce
    pub fn rebuild_static_now(&mut self) -> bool {
        let Self { nodes, physics_world, .. } = self;
        match physics_world.as_mut() {
            Some(physics) => physics.rebuild_static(static_sources(nodes)),
            None => false,
        }
    }

    /// Update the world by one frame
    ///
    /// This method:
    /// 1. Rebuilds the static collision mesh once its debounce has elapsed
    /// 2. Steps the physics simulation
    /// 3. Writes the player and prop transforms back and publishes them
    ///
    /// Returns the camera outcome, or `None` without physics.
    pub fn update(&mut self, dt: f32, input: &InputSnapshot) -> Option<CameraOutcome> {
        let Self { nodes, physics_world, bus, player } = self;
        let physics = physics_world.as_mut()?;

        physics.tick_static(|| static_sources(nodes));
        let outcome = physics.step(dt, input);

        // Sync the player node from the movement integrator
        if let Some(key) = *player {
            if let Some(node) = nodes.get_mut(key) {
                let transform = Transform3D {
                    position: physics.player().avatar_position(),
                    rotation: Quat::from_yaw(physics.player().facing_yaw()),
                    scale: node.transform.scale,
                };
                if transform != node.transform {
                    node.set_transform(transform);
                    bus.publish(key, &transform);
                }
            }
        }

        // Sync prop nodes; retired props are left alone
        for (key, node) in nodes.iter_mut() {
            let Some(prop) = node.prop.and_then(|k| physics.get_prop(k)) else {
                continue;
            };
            if prop.retired {
                continue;
            }
            let position = prop.position() - node.prop_offset;
            if position != node.transform.position {
                node.set_position(position);
                bus.publish(key, &node.transform);
            }
        }

        Some(outcome)
    }

    /// Clear all nodes from the world
    pub fn clear(&mut self) {
        let keys: Vec<NodeKey> = self.nodes.keys().collect();
        for key in keys {
            self.remove_node(key);
        }
    }

    /// Iterate over all nodes
    pub fn iter(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.values()
    }

    /// Iterate over all nodes mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SceneNode> {
        self.nodes.values_mut()
    }

    /// Iterate over keys and nodes
    pub fn iter_with_keys(&self) -> impl Iterator<Item = (NodeKey, &SceneNode)> {
        self.nodes.iter()
    }

    fn notify_static_count(&mut self) {
        let count = self.static_count();
        if let Some(physics) = self.physics_world.as_mut() {
            physics.notify_static_count(count);
        }
    }
}

fn static_sources(nodes: &SlotMap<NodeKey, SceneNode>) -> impl Iterator<Item = StaticSource<'_>> {
    nodes
        .values()
        .filter(|node| node.role == NodeRole::Static)
        .map(|node| StaticSource::new(node.world_matrix(), &node.geometry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ninja_math::MeshGeometry;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    const EPSILON: f32 = 1e-3;
    const FRAME: f32 = 0.1;

    fn floor() -> SceneNode {
        SceneNode::static_geometry(Arc::new(MeshGeometry::plane(100.0))).with_name("floor")
    }

    fn box_geometry() -> Arc<MeshGeometry> {
        Arc::new(MeshGeometry::cuboid(Vec3::ONE))
    }

    #[test]
    fn test_world_new() {
        let world = World::new();
        assert!(world.is_empty());
        assert_eq!(world.node_count(), 0);
        assert!(world.physics().is_none());
    }

    #[test]
    fn test_add_and_remove_node() {
        let mut world = World::new();
        let key = world.add_node(floor());
        assert_eq!(world.node_count(), 1);
        assert_eq!(world.static_count(), 1);
        assert_eq!(world.find_by_name("floor"), Some(key));

        let removed = world.remove_node(key).expect("node");
        assert_eq!(removed.name.as_deref(), Some("floor"));
        assert!(world.get_node(key).is_none());
        assert!(world.remove_node(key).is_none());
    }

    #[test]
    fn test_nodes_with_tag() {
        let mut world = World::new();
        let a = world.add_node(SceneNode::moveable(box_geometry()).with_tag("loot"));
        world.add_node(SceneNode::moveable(box_geometry()));
        let tagged: Vec<_> = world.nodes_with_tag("loot").collect();
        assert_eq!(tagged, vec![a]);
    }

    #[test]
    fn test_update_without_physics() {
        let mut world = World::new();
        world.add_node(floor());
        assert!(world.update(FRAME, &InputSnapshot::default()).is_none());
    }

    #[test]
    fn test_moveable_node_gets_prop() {
        let mut world = World::new().with_physics(PhysicsConfig::default());
        let key = world.add_node(
            SceneNode::moveable(box_geometry()).with_position(Vec3::new(3.0, 5.0, 0.0)),
        );
        let prop = world.get_node(key).and_then(|n| n.prop).expect("prop key");
        let physics = world.physics().expect("physics");
        let body = physics.get_prop(prop).expect("prop");
        assert!((body.position() - Vec3::new(3.0, 5.0, 0.0)).length() < EPSILON);

        world.remove_node(key);
        assert_eq!(world.physics().map(|p| p.prop_count()), Some(0));
    }

    #[test]
    fn test_player_node_sets_spawn() {
        let mut world = World::new().with_physics(PhysicsConfig::default());
        let key = world.add_node(
            SceneNode::player(box_geometry()).with_position(Vec3::new(1.0, 4.0, 2.0)),
        );
        assert_eq!(world.player_node(), Some(key));
        let physics = world.physics().expect("physics");
        // Avatar feet sit at the node position
        assert!((physics.player().avatar_position() - Vec3::new(1.0, 4.0, 2.0)).length() < EPSILON);
    }

    #[test]
    fn test_static_rebuild_is_debounced() {
        let mut world = World::new().with_physics(PhysicsConfig::default());
        world.add_node(floor());
        let idle = InputSnapshot::default();

        // 0.1 s debounce: nothing after the first frame
        world.update(0.05, &idle);
        assert!(world.physics().and_then(|p| p.static_mesh()).is_none());

        for _ in 0..3 {
            world.update(0.05, &idle);
        }
        let physics = world.physics().expect("physics");
        assert!(physics.static_mesh().is_some());
        assert_eq!(physics.aggregator().rebuild_count(), 1);
    }

    #[test]
    fn test_rebuild_static_now() {
        let mut world = World::new().with_physics(PhysicsConfig::default());
        world.add_node(floor());
        assert!(world.rebuild_static_now());
        assert_eq!(
            world.physics().and_then(|p| p.static_mesh()).map(|m| m.triangle_count()),
            Some(2)
        );
    }

    #[test]
    fn test_player_transform_published() {
        let mut world = World::new().with_physics(PhysicsConfig::default());
        world.add_node(floor());
        let player = world.add_node(
            SceneNode::player(box_geometry()).with_position(Vec3::new(0.2, 3.0, 0.3)),
        );
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        world
            .subscribe(player, Box::new(move |_, t| sink.borrow_mut().push(t.position)))
            .expect("subscription");

        world.rebuild_static_now();
        for _ in 0..20 {
            world.update(FRAME, &InputSnapshot::default());
        }

        let seen = seen.borrow();
        assert!(!seen.is_empty());
        let last = *seen.last().expect("update");
        let node = world.get_node(player).expect("player node");
        assert_eq!(node.transform.position, last);
        assert!(last.y.abs() < 0.1, "feet at {}", last.y);
    }

    #[test]
    fn test_subscribe_missing_node() {
        let mut world = World::new();
        let key = world.add_node(floor());
        world.remove_node(key);
        assert!(world.subscribe(key, Box::new(|_, _| {})).is_none());
    }

    #[test]
    fn test_set_node_position_moves_prop() {
        let mut world = World::new().with_physics(PhysicsConfig::default());
        let key = world.add_node(SceneNode::moveable(box_geometry()));
        assert!(world.set_node_position(key, Vec3::new(0.0, 7.0, 0.0)));

        let prop = world.get_node(key).and_then(|n| n.prop).expect("prop key");
        let body = world.physics().and_then(|p| p.get_prop(prop)).expect("prop");
        assert!((body.position() - Vec3::new(0.0, 7.0, 0.0)).length() < EPSILON);
    }

    #[test]
    fn test_clear() {
        let mut world = World::new().with_physics(PhysicsConfig::default());
        world.add_node(floor());
        world.add_node(SceneNode::moveable(box_geometry()));
        world.clear();
        assert!(world.is_empty());
        assert_eq!(world.physics().map(|p| p.prop_count()), Some(0));
    }
}
