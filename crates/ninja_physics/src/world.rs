//! Physics world and per-frame simulation

use crate::aggregator::{AggregatorConfig, StaticCollisionMesh, StaticGeometryAggregator, StaticSource};
use crate::body::{DynamicProp, PropKey};
use crate::camera::{CameraConfig, CameraMode, CameraObstructionResolver, CameraOutcome, CameraRig, OrbitRig};
use crate::collision::{intersect, CollisionResult};
use crate::dynamics::{DynamicCollisionUpdater, PropConfig};
use crate::player::{InputSnapshot, PlayerConfig, PlayerController};
use crate::shapes::Collider;
use ninja_math::Vec3;
use slotmap::SlotMap;

/// Configuration for the physics simulation
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PhysicsConfig {
    pub player: PlayerConfig,
    pub camera: CameraConfig,
    pub props: PropConfig,
    pub aggregator: AggregatorConfig,
}

impl PhysicsConfig {
    /// Create a config with custom player and prop gravity
    pub fn new(player_gravity: f32, prop_gravity: f32) -> Self {
        let mut config = Self::default();
        config.player.gravity = player_gravity;
        config.props.gravity = prop_gravity;
        config
    }
}

/// The physics world: static collision, the player, its camera and props
///
/// Every frame the player moves first, then the camera reacts to the new
/// player position, then props advance independently.
pub struct PhysicsWorld {
    aggregator: StaticGeometryAggregator,
    player: PlayerController,
    camera: CameraObstructionResolver,
    rig: OrbitRig,
    /// All props in the world (using generational keys)
    props: SlotMap<PropKey, DynamicProp>,
    updater: DynamicCollisionUpdater,
    /// Simulated seconds since creation
    time: f64,
    last_camera: Option<CameraOutcome>,
    /// Physics configuration
    pub config: PhysicsConfig,
}

impl PhysicsWorld {
    /// Create a new physics world with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        let player = PlayerController::new(config.player);
        let camera = CameraObstructionResolver::new(config.camera);
        let mut rig = OrbitRig::default();
        camera.place_initial(&mut rig, config.player.spawn);

        Self {
            aggregator: StaticGeometryAggregator::with_config(config.aggregator),
            player,
            camera,
            rig,
            props: SlotMap::with_key(),
            updater: DynamicCollisionUpdater::new(config.props),
            time: 0.0,
            last_camera: None,
            config,
        }
    }

    /// Simulated seconds since creation
    pub fn time(&self) -> f64 {
        self.time
    }

    // --- static geometry ---

    /// Report the current number of static nodes
    pub fn notify_static_count(&mut self, count: usize) {
        self.aggregator.notify_node_count(count, self.time);
    }

    /// Rebuild the static mesh if its debounce has elapsed
    ///
    /// Returns whether a rebuild happened.
    pub fn tick_static<'a, I>(&mut self, sources: impl FnOnce() -> I) -> bool
    where
        I: IntoIterator<Item = StaticSource<'a>>,
    {
        self.aggregator.tick(self.time, sources)
    }

    /// Rebuild the static mesh right away
    pub fn rebuild_static<'a>(&mut self, sources: impl IntoIterator<Item = StaticSource<'a>>) -> bool {
        self.aggregator.rebuild_now(sources)
    }

    /// Current merged static mesh
    pub fn static_mesh(&self) -> Option<&StaticCollisionMesh> {
        self.aggregator.mesh()
    }

    pub fn aggregator(&self) -> &StaticGeometryAggregator {
        &self.aggregator
    }

    // --- player and camera ---

    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlayerController {
        &mut self.player
    }

    /// Place the player and aim the camera at it
    pub fn spawn_player(&mut self, position: Vec3) {
        self.player.teleport(position);
        self.camera.place_initial(&mut self.rig, position);
    }

    /// Respawn the player and re-target the camera
    pub fn reset_player(&mut self) {
        self.player.reset();
        self.camera.place_initial(&mut self.rig, self.player.position());
    }

    pub fn camera_rig(&self) -> &OrbitRig {
        &self.rig
    }

    pub fn camera_rig_mut(&mut self) -> &mut OrbitRig {
        &mut self.rig
    }

    pub fn camera_mode(&self) -> CameraMode {
        self.camera.mode()
    }

    pub fn set_camera_mode(&mut self, mode: CameraMode) {
        self.camera.set_mode(mode);
    }

    /// Camera result of the most recent step
    pub fn last_camera_outcome(&self) -> Option<CameraOutcome> {
        self.last_camera
    }

    // --- props ---

    /// Add a prop to the world and return its key
    pub fn add_prop(&mut self, prop: DynamicProp) -> PropKey {
        self.props.insert(prop)
    }

    /// Remove a prop from the world and return it
    pub fn remove_prop(&mut self, key: PropKey) -> Option<DynamicProp> {
        self.props.remove(key)
    }

    /// Get an immutable reference to a prop by key
    pub fn get_prop(&self, key: PropKey) -> Option<&DynamicProp> {
        self.props.get(key)
    }

    /// Get a mutable reference to a prop by key
    pub fn get_prop_mut(&mut self, key: PropKey) -> Option<&mut DynamicProp> {
        self.props.get_mut(key)
    }

    /// Get the number of props in the world
    pub fn prop_count(&self) -> usize {
        self.props.len()
    }

    /// Iterate over all prop keys
    pub fn prop_keys(&self) -> impl Iterator<Item = PropKey> + '_ {
        self.props.keys()
    }

    /// Props whose collider touches `collider`, with the contact seen from
    /// `collider`
    ///
    /// Retired props are skipped.
    pub fn props_touching(&self, collider: &Collider) -> Vec<(PropKey, CollisionResult)> {
        self.props
            .iter()
            .filter(|(_, prop)| !prop.retired)
            .filter_map(|(key, prop)| intersect(collider, &prop.collider).map(|hit| (key, hit)))
            .collect()
    }

    // --- simulation ---

    /// Step the simulation forward by one frame
    ///
    /// This performs:
    /// 1. Player movement against the static mesh
    /// 2. Camera follow, obstruction and free look
    /// 3. Prop integration and static collision
    pub fn step(&mut self, dt: f32, input: &InputSnapshot) -> CameraOutcome {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.time += f64::from(dt);
        let mesh = self.aggregator.mesh();

        // Phase 1: player
        let azimuth = self.rig.azimuth();
        self.player.update(dt, input, azimuth, mesh);

        // Phase 2: camera
        let outcome = self.camera.resolve(
            &mut self.rig,
            self.player.position(),
            self.player.config().height,
            self.player.is_moving(),
            mesh,
        );
        self.camera.apply_free_look(&mut self.rig, input.free_look);
        self.last_camera = Some(outcome);

        // Phase 3: props
        let retired = self.updater.update(self.props.values_mut(), dt, mesh);
        if retired > 0 {
            log::debug!("{} prop(s) retired this frame", retired);
        }

        outcome
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}
