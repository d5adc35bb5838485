//! Ninja - character movement and collision demo
//!
//! Runs the collision core headless: a small scene is built from the
//! configuration, a scripted sequence of key and mouse events drives the
//! player, and status lines are logged along the way.

use ninja::config::AppConfig;
use ninja::scene::SceneBuilder;
use ninja::systems::SimulationSystem;
use ninja_core::World;
use ninja_input::{ActionMapper, InputAction, InputController};
use ninja_math::Vec3;
use ninja_physics::{CameraMode, PhysicsMaterial};
use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// Fixed frame delta for the headless run
const FRAME_DELTA: f32 = 1.0 / 60.0;

/// One scripted input event
enum Scripted {
    Key(KeyCode, ElementState),
    Look(f64, f64),
}

/// Frame-indexed demo input: walk, dash, jump, look around, switch views, respawn
fn script() -> Vec<(u32, Scripted)> {
    use ElementState::{Pressed, Released};
    use Scripted::{Key, Look};
    vec![
        (30, Key(KeyCode::KeyW, Pressed)),
        (90, Key(KeyCode::ShiftLeft, Pressed)),
        (120, Key(KeyCode::Space, Pressed)),
        (125, Key(KeyCode::Space, Released)),
        (150, Key(KeyCode::ShiftLeft, Released)),
        (150, Look(40.0, 0.0)),
        (160, Key(KeyCode::KeyD, Pressed)),
        (180, Key(KeyCode::KeyW, Released)),
        (190, Key(KeyCode::KeyD, Released)),
        (200, Key(KeyCode::KeyV, Pressed)),
        (215, Key(KeyCode::KeyV, Pressed)),
        (230, Key(KeyCode::KeyR, Pressed)),
    ]
}

fn build_scene(config: &AppConfig) -> World {
    let [x, y, z] = config.player.spawn;
    SceneBuilder::with_capacity(8)
        .with_physics(config.to_physics_config())
        .add_floor(100.0)
        .add_platform(Vec3::new(x, 0.0, z - 6.0), Vec3::new(4.0, 0.2, 4.0), "step")
        .add_wall(Vec3::new(x, 1.5, z - 14.0), Vec3::new(8.0, 3.0, 0.5), 0.0)
        .add_player(Vec3::new(x, y, z))
        .add_crate(Vec3::new(x + 2.0, 4.0, z - 3.0), 1.0, "crate")
        .add_ball(Vec3::new(x - 2.0, 5.0, z - 3.0), 0.4, PhysicsMaterial::RUBBER, "ball")
        .build()
}

/// Apply a one-shot action; returns false when the demo should stop
fn handle_action(
    world: &mut World,
    controller: &mut InputController,
    cursor_captured: &mut bool,
    action: InputAction,
) -> bool {
    match action {
        InputAction::Exit => return false,
        InputAction::CaptureCursor => {
            *cursor_captured = true;
            log::info!("Cursor captured");
        }
        InputAction::ReleaseCursor => {
            *cursor_captured = false;
            controller.clear();
            log::info!("Cursor released");
        }
        InputAction::Respawn => {
            if let Some(physics) = world.physics_mut() {
                physics.reset_player();
                log::info!("Player respawned at {:?}", physics.player().position());
            }
        }
        InputAction::ToggleView => {
            if let Some(physics) = world.physics_mut() {
                let mode = match physics.camera_mode() {
                    CameraMode::ThirdPerson => CameraMode::FirstPerson,
                    CameraMode::FirstPerson => CameraMode::ThirdPerson,
                };
                physics.set_camera_mode(mode);
                log::info!("Camera mode: {:?}", mode);
            }
        }
        InputAction::ToggleSmoothing => {
            let enabled = controller.toggle_smoothing();
            log::info!("Input smoothing: {}", if enabled { "ON" } else { "OFF" });
        }
    }
    true
}

fn main() {
    // Load configuration
    let (config, load_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // Initialize logging, RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.debug.log_level.as_str()),
    )
    .init();
    if let Some(e) = load_error {
        log::warn!("Failed to load config: {}. Using defaults.", e);
    }
    log::info!("Starting Ninja");

    let mut world = build_scene(&config);
    log::info!(
        "Scene ready: {} nodes, {} static triangles",
        world.node_count(),
        world
            .physics()
            .and_then(|p| p.static_mesh())
            .map_or(0, |m| m.triangle_count())
    );

    let mut controller = InputController::new()
        .with_mouse_sensitivity(config.input.mouse_sensitivity)
        .with_smoothing_half_life(config.input.smoothing_half_life)
        .with_smoothing(config.input.smoothing_enabled);
    let mapper = ActionMapper::new();
    log::info!("Controls:");
    for (key, action) in mapper.bindings() {
        log::info!("  {:?}: {}", key, action.label());
    }
    let mut simulation = SimulationSystem::new();
    let mut cursor_captured = true;

    let script = script();
    let mut events = script.iter().peekable();

    for frame in 0..config.debug.demo_frames {
        while let Some((_, event)) = events.next_if(|(at, _)| *at == frame) {
            match event {
                Scripted::Key(key, state) => {
                    match mapper.map_key(*key, *state, cursor_captured) {
                        Some(action) => {
                            if !handle_action(&mut world, &mut controller, &mut cursor_captured, action) {
                                log::info!("Exit requested");
                                return;
                            }
                        }
                        None => {
                            controller.process_keyboard(*key, *state);
                        }
                    }
                }
                Scripted::Look(dx, dy) => controller.process_mouse_motion(*dx, *dy),
            }
        }

        let result = simulation.step(&mut world, &mut controller, FRAME_DELTA, cursor_captured);

        let report_every = config.debug.report_every;
        if report_every > 0 && frame % report_every == 0 {
            if let Some(physics) = world.physics() {
                let player = physics.player();
                log::info!(
                    "frame {:>4}: player {:?} {:?} grounded={} camera={:?} moved={}",
                    frame,
                    player.avatar_position(),
                    player.locomotion(),
                    player.is_grounded(),
                    result.camera,
                    result.moved_nodes,
                );
            }
        }
    }

    if let Some(physics) = world.physics() {
        for key in physics.prop_keys() {
            if let Some(prop) = physics.get_prop(key) {
                log::info!("prop at {:?} (retired: {})", prop.position(), prop.retired);
            }
        }
    }
    log::info!("Simulated {} frames", simulation.frame());
}
