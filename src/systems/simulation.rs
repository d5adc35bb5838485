//! Game simulation system
//!
//! Manages the game loop simulation including:
//! - Delta time calculation
//! - Input → movement snapshot
//! - World and physics stepping
//! - Dirty node bookkeeping

use std::time::Instant;
use ninja_core::World;
use ninja_input::InputController;
use ninja_physics::CameraOutcome;

/// Longest real frame handed to the world
///
/// The physics core clamps further, this only guards against huge pauses.
const MAX_FRAME_DELTA: f32 = 0.25;

/// Result of a simulation update
#[derive(Clone, Copy, Debug, Default)]
pub struct SimulationResult {
    /// Camera outcome for this frame (None without physics)
    pub camera: Option<CameraOutcome>,
    /// Number of nodes whose transform changed this frame
    pub moved_nodes: usize,
}

/// Manages the game simulation loop
pub struct SimulationSystem {
    last_frame: Instant,
    frame: u64,
}

impl SimulationSystem {
    /// Create a new simulation system
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            frame: 0,
        }
    }

    /// Frames simulated so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Run one simulation frame using wall-clock time
    pub fn update(
        &mut self,
        world: &mut World,
        controller: &mut InputController,
        cursor_captured: bool,
    ) -> SimulationResult {
        let now = Instant::now();
        let raw_dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.step(world, controller, raw_dt.min(MAX_FRAME_DELTA), cursor_captured)
    }

    /// Run one simulation frame with an explicit delta
    ///
    /// # Arguments
    /// * `world` - Node world driving the physics core
    /// * `controller` - Input controller producing the movement snapshot
    /// * `dt` - Frame delta in seconds
    /// * `cursor_captured` - Whether cursor is captured (enables free look)
    pub fn step(
        &mut self,
        world: &mut World,
        controller: &mut InputController,
        dt: f32,
        cursor_captured: bool,
    ) -> SimulationResult {
        // 1. Snapshot the input for this frame
        let input = controller.snapshot(dt, cursor_captured);

        // 2. Step the world (static rebuilds, player, camera, props)
        let camera = world.update(dt, &input);

        // 3. Collect and clear dirty nodes
        let mut moved_nodes = 0;
        for node in world.iter_mut() {
            if node.is_dirty() {
                moved_nodes += 1;
                node.clear_dirty();
            }
        }

        self.frame += 1;
        SimulationResult { camera, moved_nodes }
    }
}

impl Default for SimulationSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneBuilder;
    use ninja_math::Vec3;
    use ninja_physics::PhysicsConfig;
    use winit::event::ElementState;
    use winit::keyboard::KeyCode;

    const FRAME: f32 = 1.0 / 60.0;

    fn scene() -> World {
        SceneBuilder::new()
            .with_physics(PhysicsConfig::default())
            .add_floor(60.0)
            .add_player(Vec3::new(0.2, 0.0, 0.3))
            .build()
    }

    #[test]
    fn test_default_construction() {
        let sim = SimulationSystem::default();
        assert_eq!(sim.frame(), 0);
        assert!(sim.last_frame.elapsed().as_millis() < 100);
    }

    #[test]
    fn test_step_counts_frames() {
        let mut world = scene();
        let mut controller = InputController::new();
        let mut sim = SimulationSystem::new();

        let first = sim.step(&mut world, &mut controller, FRAME, false);
        assert!(first.camera.is_some());
        // Every node starts dirty
        assert_eq!(first.moved_nodes, 2);
        assert_eq!(sim.frame(), 1);
    }

    #[test]
    fn test_keys_move_player() {
        let mut world = scene();
        let mut controller = InputController::new();
        let mut sim = SimulationSystem::new();
        for _ in 0..30 {
            sim.step(&mut world, &mut controller, FRAME, false);
        }
        let start = world.physics().unwrap().player().position();

        controller.process_keyboard(KeyCode::KeyW, ElementState::Pressed);
        let mut moved = 0;
        for _ in 0..60 {
            moved += sim.step(&mut world, &mut controller, FRAME, false).moved_nodes;
        }
        let end = world.physics().unwrap().player().position();
        assert!((end - start).horizontal().length() > 1.5);
        assert!(moved >= 60);
    }

    #[test]
    fn test_update_without_physics() {
        let mut world = World::new();
        let mut controller = InputController::new();
        let mut sim = SimulationSystem::new();
        let result = sim.update(&mut world, &mut controller, false);
        assert!(result.camera.is_none());
        assert_eq!(result.moved_nodes, 0);
    }
}
