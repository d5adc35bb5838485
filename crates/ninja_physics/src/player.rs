//! Player movement for third-person character control
//!
//! The player is a capsule hanging below its position. Each frame is split
//! into fixed substeps; every substep applies gravity and input, then pushes
//! the capsule out of the static collision mesh and derives the grounded
//! flag from how far it was pushed up.

use ninja_math::{Segment, Vec3};
use serde::{Deserialize, Serialize};

use crate::aggregator::StaticCollisionMesh;
use crate::shapes::Capsule;
use crate::sweep::CapsuleSweepResolver;

/// Default player collision radius
pub const DEFAULT_PLAYER_RADIUS: f32 = 0.5;

/// Default jump velocity
pub const DEFAULT_JUMP_POWER: f32 = 10.0;

/// Movement tuning
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Vertical acceleration (negative = down)
    pub gravity: f32,
    /// Walking speed in units per second
    pub base_speed: f32,
    /// Speed multiplier while dashing
    pub dash_ratio: f32,
    /// Upward velocity applied by a jump
    pub jump_power: f32,
    /// Minimum time between two jumps (seconds)
    pub jump_interval: f32,
    /// Substeps per frame
    pub substeps: u32,
    /// Longest frame delta that is simulated; longer frames are clamped
    pub max_frame_delta: f32,
    /// Falling below this height respawns the player
    pub dead_zone_y: f32,
    /// Respawn point
    pub spawn: Vec3,
    /// Extra height added to the respawn point
    pub spawn_offset_y: f32,
    /// Full avatar height
    pub height: f32,
    /// Capsule radius
    pub radius: f32,
    /// Length of the capsule core segment
    pub segment_length: f32,
    /// Share of the expected vertical travel an upward push must exceed to
    /// count as ground
    pub grounded_factor: f32,
    /// Amount each correction is shortened by, so a resting capsule keeps
    /// touching the floor
    pub resting_epsilon: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            gravity: -30.0,
            base_speed: 2.5,
            dash_ratio: 2.1,
            jump_power: DEFAULT_JUMP_POWER,
            jump_interval: 0.5,
            substeps: 5,
            max_frame_delta: 0.1,
            dead_zone_y: -25.0,
            spawn: Vec3::new(0.0, 3.0, -30.0),
            spawn_offset_y: 3.0,
            height: 2.0,
            radius: DEFAULT_PLAYER_RADIUS,
            segment_length: 1.0,
            grounded_factor: 0.25,
            resting_epsilon: 1e-5,
        }
    }
}

impl PlayerConfig {
    /// Where a respawn puts the player
    pub fn respawn_position(&self) -> Vec3 {
        self.spawn + Vec3::new(0.0, self.spawn_offset_y, 0.0)
    }
}

/// Controller input for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputSnapshot {
    pub forward: f32,
    pub backward: f32,
    pub left: f32,
    pub right: f32,
    /// Speed multiplier (1.0 = walk)
    pub speed: f32,
    pub dash: bool,
    pub jump: bool,
    /// Free-look stick axes (right, up)
    pub free_look: [f32; 2],
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self {
            forward: 0.0,
            backward: 0.0,
            left: 0.0,
            right: 0.0,
            speed: 1.0,
            dash: false,
            jump: false,
            free_look: [0.0, 0.0],
        }
    }
}

impl InputSnapshot {
    /// Net forward amount (forward minus backward)
    pub fn forward_amount(&self) -> f32 {
        self.forward - self.backward
    }

    /// Net strafe amount (right minus left)
    pub fn right_amount(&self) -> f32 {
        self.right - self.left
    }

    /// Whether any horizontal movement is requested
    pub fn has_horizontal_input(&self) -> bool {
        self.forward_amount() != 0.0 || self.right_amount() != 0.0
    }
}

/// What the avatar is doing, for animation consumers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LocomotionState {
    #[default]
    Idle,
    Walk,
    Run,
    Airborne,
}

/// Movement state that persists across frames
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct MovementState {
    /// Capsule origin (top of the core segment)
    pub position: Vec3,
    pub velocity: Vec3,
    /// Whether the player is standing on something
    pub grounded: bool,
    /// Time left before another jump is allowed
    pub jump_cooldown: f32,
    /// Jump input from the previous frame
    pub jump_latched: bool,
    /// Rotation about +Y the avatar faces
    pub facing_yaw: f32,
}

/// Capsule character controller
#[derive(Debug)]
pub struct PlayerController {
    config: PlayerConfig,
    capsule: Capsule,
    /// Current movement state
    pub state: MovementState,
    resolver: CapsuleSweepResolver,
    locomotion: LocomotionState,
    moving: bool,
}

impl Default for PlayerController {
    fn default() -> Self {
        Self::new(PlayerConfig::default())
    }
}

impl PlayerController {
    /// Create a player at the respawn point
    pub fn new(config: PlayerConfig) -> Self {
        let capsule = Capsule::new(
            Segment::new(Vec3::ZERO, Vec3::new(0.0, -config.segment_length, 0.0)),
            config.radius,
        );
        Self {
            config,
            capsule,
            state: MovementState {
                position: config.respawn_position(),
                ..Default::default()
            },
            resolver: CapsuleSweepResolver::new(),
            locomotion: LocomotionState::Airborne,
            moving: false,
        }
    }

    /// Start at `position` instead of the respawn point
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.state.position = position;
        self
    }

    /// Movement tuning
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// The collision capsule in player-local space
    pub fn capsule(&self) -> &Capsule {
        &self.capsule
    }

    /// The collision capsule at the current position
    pub fn world_capsule(&self) -> Capsule {
        self.capsule.translated(self.state.position)
    }

    pub fn position(&self) -> Vec3 {
        self.state.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.state.velocity
    }

    pub fn is_grounded(&self) -> bool {
        self.state.grounded
    }

    pub fn facing_yaw(&self) -> f32 {
        self.state.facing_yaw
    }

    /// Locomotion derived during the last update
    pub fn locomotion(&self) -> LocomotionState {
        self.locomotion
    }

    /// Whether horizontal input was active during the last update
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Where the avatar's feet are
    pub fn avatar_position(&self) -> Vec3 {
        self.state.position - Vec3::new(0.0, self.config.height - self.config.radius, 0.0)
    }

    /// Move the player without simulating
    pub fn teleport(&mut self, position: Vec3) {
        self.state.position = position;
        self.state.velocity = Vec3::ZERO;
    }

    /// Put the player back at the respawn point with no velocity
    pub fn reset(&mut self) {
        self.state.velocity = Vec3::ZERO;
        self.state.position = self.config.respawn_position();
        self.state.grounded = false;
        log::debug!("player respawned at {:?}", self.state.position);
    }

    /// Advance one frame
    ///
    /// # Arguments
    /// * `frame_delta` - Elapsed time in seconds; clamped to `max_frame_delta`
    /// * `input` - Controller input for this frame
    /// * `azimuth` - Camera rotation about +Y that input is relative to
    /// * `mesh` - Static collision mesh; `None` means nothing to collide with
    pub fn update(
        &mut self,
        frame_delta: f32,
        input: &InputSnapshot,
        azimuth: f32,
        mesh: Option<&StaticCollisionMesh>,
    ) {
        let frame = if frame_delta.is_finite() {
            frame_delta.clamp(0.0, self.config.max_frame_delta)
        } else {
            0.0
        };
        let substeps = self.config.substeps.max(1);
        let delta = frame / substeps as f32;

        self.state.jump_cooldown = (self.state.jump_cooldown - frame).max(0.0);
        let jump_pressed = input.jump && !self.state.jump_latched;
        self.state.jump_latched = input.jump;
        if jump_pressed && self.state.grounded && self.state.jump_cooldown <= 0.0 {
            self.state.velocity.y = self.config.jump_power;
            self.state.grounded = false;
            self.state.jump_cooldown = self.config.jump_interval;
        }

        self.moving = input.has_horizontal_input();
        // A respawn ends the frame; the player holds at the spawn point
        for _ in 0..substeps {
            if self.substep(delta, input, azimuth, mesh) {
                break;
            }
        }

        self.locomotion = if !self.state.grounded {
            LocomotionState::Airborne
        } else if !self.moving {
            LocomotionState::Idle
        } else if input.dash {
            LocomotionState::Run
        } else {
            LocomotionState::Walk
        };
    }

    /// One substep; returns `true` when the player was respawned
    fn substep(
        &mut self,
        delta: f32,
        input: &InputSnapshot,
        azimuth: f32,
        mesh: Option<&StaticCollisionMesh>,
    ) -> bool {
        let state = &mut self.state;

        if state.grounded {
            state.velocity.y = delta * self.config.gravity;
        } else {
            state.velocity.y += delta * self.config.gravity;
        }
        state.position += state.velocity * delta;

        let mut speed = self.config.base_speed * input.speed;
        if input.dash {
            speed *= self.config.dash_ratio;
        }
        let forward = Vec3::new(0.0, 0.0, -input.forward_amount()).rotate_y(azimuth);
        let right = Vec3::new(input.right_amount(), 0.0, 0.0).rotate_y(azimuth);
        if input.has_horizontal_input() {
            let movement = forward + right;
            state.facing_yaw = movement.x.atan2(movement.z);
            state.position += movement * (speed * delta);
        }

        let segment = self.capsule.segment.translated(state.position);
        let swept = self.resolver.resolve(&segment, mesh, self.capsule.radius());
        let correction = swept.correction(&segment);

        state.grounded =
            correction.y > (delta * state.velocity.y * self.config.grounded_factor).abs();

        let length = correction.length();
        let offset = (length - self.config.resting_epsilon).max(0.0);
        let direction = correction.normalized();
        state.position += direction * offset;

        if state.grounded {
            state.velocity = Vec3::ZERO;
        } else {
            state.velocity -= direction * direction.dot(state.velocity);
        }

        if state.position.y < self.config.dead_zone_y {
            self.reset();
            return true;
        }
        false
    }
}
