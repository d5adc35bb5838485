//! Keyboard and mouse state for third-person movement
//!
//! Controls:
//! - W/S or Up/Down: Forward/backward
//! - A/D or Left/Right: Strafe
//! - Shift: Dash
//! - Space: Jump
//! - Right-drag (or captured cursor): Free look

use ninja_physics::InputSnapshot;
use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

/// Collects raw input and produces one [`InputSnapshot`] per frame
pub struct InputController {
    // Movement state
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
    dash: bool,
    jump: bool,

    // Mouse state
    look_pressed: bool,
    pending_x: f32,
    pending_y: f32,

    // Input smoothing state
    smooth_x: f32,
    smooth_y: f32,

    // Configuration
    pub speed: f32,
    pub mouse_sensitivity: f32,
    pub smoothing_half_life: f32, // Exponential smoothing half-life in seconds
    pub smoothing_enabled: bool,
}

impl Default for InputController {
    fn default() -> Self {
        Self::new()
    }
}

impl InputController {
    pub fn new() -> Self {
        Self {
            forward: false,
            backward: false,
            left: false,
            right: false,
            dash: false,
            jump: false,

            look_pressed: false,
            pending_x: 0.0,
            pending_y: 0.0,

            smooth_x: 0.0,
            smooth_y: 0.0,

            speed: 1.0,
            mouse_sensitivity: 0.01,
            smoothing_half_life: 0.05,
            smoothing_enabled: false,
        }
    }

    /// Process keyboard input
    ///
    /// Returns whether the key is one this controller handles.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) -> bool {
        let pressed = state == ElementState::Pressed;

        match key {
            KeyCode::KeyW | KeyCode::ArrowUp => { self.forward = pressed; true }
            KeyCode::KeyS | KeyCode::ArrowDown => { self.backward = pressed; true }
            KeyCode::KeyA | KeyCode::ArrowLeft => { self.left = pressed; true }
            KeyCode::KeyD | KeyCode::ArrowRight => { self.right = pressed; true }
            KeyCode::ShiftLeft | KeyCode::ShiftRight => { self.dash = pressed; true }
            KeyCode::Space => { self.jump = pressed; true }
            _ => false,
        }
    }

    /// Process mouse button input
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Right {
            self.look_pressed = state == ElementState::Pressed;
        }
    }

    /// Process mouse movement
    pub fn process_mouse_motion(&mut self, delta_x: f64, delta_y: f64) {
        self.pending_x += delta_x as f32;
        self.pending_y += delta_y as f32;
    }

    /// Build the snapshot for this frame and consume pending mouse motion
    ///
    /// When `cursor_captured` is true, free look is enabled without holding
    /// the right mouse button.
    pub fn snapshot(&mut self, dt: f32, cursor_captured: bool) -> InputSnapshot {
        let (look_x, look_y) = if self.smoothing_enabled && dt > 0.0 {
            // factor = 2^(-dt / half_life), so smaller half_life = faster response
            let smooth_factor = 2.0f32.powf(-dt / self.smoothing_half_life);
            self.smooth_x = self.smooth_x * smooth_factor + self.pending_x * (1.0 - smooth_factor);
            self.smooth_y = self.smooth_y * smooth_factor + self.pending_y * (1.0 - smooth_factor);
            (self.smooth_x, self.smooth_y)
        } else {
            (self.pending_x, self.pending_y)
        };
        self.pending_x = 0.0;
        self.pending_y = 0.0;

        // Dragging right orbits the camera left; dragging down raises it
        let free_look = if cursor_captured || self.look_pressed {
            [look_x * self.mouse_sensitivity, look_y * self.mouse_sensitivity]
        } else {
            [0.0, 0.0]
        };

        InputSnapshot {
            forward: self.forward as i32 as f32,
            backward: self.backward as i32 as f32,
            left: self.left as i32 as f32,
            right: self.right as i32 as f32,
            speed: self.speed,
            dash: self.dash,
            jump: self.jump,
            free_look,
        }
    }

    /// Check if any movement keys are pressed
    pub fn is_moving(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }

    /// Toggle input smoothing on/off
    pub fn toggle_smoothing(&mut self) -> bool {
        self.smoothing_enabled = !self.smoothing_enabled;
        // Reset smoothing state when toggling
        self.smooth_x = 0.0;
        self.smooth_y = 0.0;
        self.smoothing_enabled
    }

    /// Release every key, e.g. when the window loses focus
    pub fn clear(&mut self) {
        self.forward = false;
        self.backward = false;
        self.left = false;
        self.right = false;
        self.dash = false;
        self.jump = false;
        self.look_pressed = false;
        self.pending_x = 0.0;
        self.pending_y = 0.0;
    }

    /// Builder: set the analog speed multiplier
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Builder: set mouse sensitivity
    pub fn with_mouse_sensitivity(mut self, sensitivity: f32) -> Self {
        self.mouse_sensitivity = sensitivity;
        self
    }

    /// Builder: set smoothing half-life (lower = more responsive)
    pub fn with_smoothing_half_life(mut self, half_life: f32) -> Self {
        self.smoothing_half_life = half_life;
        self
    }

    /// Builder: enable or disable smoothing
    pub fn with_smoothing(mut self, enabled: bool) -> Self {
        self.smoothing_enabled = enabled;
        self
    }
}
