//! Key bindings for discrete player and camera actions
//!
//! Movement (WASD, arrows, Space, Shift) is continuous and goes to
//! [`crate::InputController`]. Everything that happens once per press
//! (respawning, switching the view, releasing the cursor) is looked up in a
//! rebindable table here. Each action has at most one key.

use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

/// One-shot actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    /// Grab the cursor for free look
    CaptureCursor,
    /// Give the cursor back; becomes [`InputAction::Exit`] when it is already free
    ReleaseCursor,
    /// Leave the application
    Exit,
    /// Put the player back at the spawn point
    Respawn,
    /// Switch between third- and first-person view
    ToggleView,
    /// Turn input smoothing on or off
    ToggleSmoothing,
}

impl InputAction {
    /// Short label for help output
    pub fn label(self) -> &'static str {
        match self {
            InputAction::CaptureCursor => "capture cursor",
            InputAction::ReleaseCursor => "release cursor / exit",
            InputAction::Exit => "exit",
            InputAction::Respawn => "respawn",
            InputAction::ToggleView => "toggle view",
            InputAction::ToggleSmoothing => "toggle smoothing",
        }
    }
}

/// Table from keys to actions
#[derive(Debug, Clone)]
pub struct ActionMapper {
    bindings: Vec<(KeyCode, InputAction)>,
    capture_button: MouseButton,
}

impl Default for ActionMapper {
    fn default() -> Self {
        Self {
            bindings: vec![
                (KeyCode::Escape, InputAction::ReleaseCursor),
                (KeyCode::KeyR, InputAction::Respawn),
                (KeyCode::KeyV, InputAction::ToggleView),
                (KeyCode::KeyG, InputAction::ToggleSmoothing),
            ],
            capture_button: MouseButton::Left,
        }
    }
}

impl ActionMapper {
    /// Mapper with the default bindings
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapper with no key bound
    pub fn unbound() -> Self {
        Self {
            bindings: Vec::new(),
            capture_button: MouseButton::Left,
        }
    }

    /// Bind `key` to `action`
    ///
    /// Replaces the action's previous key and whatever `key` did before.
    pub fn with_binding(mut self, action: InputAction, key: KeyCode) -> Self {
        self.bind(action, key);
        self
    }

    /// Mouse button that captures a free cursor
    pub fn with_capture_button(mut self, button: MouseButton) -> Self {
        self.capture_button = button;
        self
    }

    /// Bind `key` to `action` in place
    pub fn bind(&mut self, action: InputAction, key: KeyCode) {
        self.bindings.retain(|&(k, a)| k != key && a != action);
        self.bindings.push((key, action));
    }

    /// Remove the binding of `action`, returning the key it had
    pub fn unbind(&mut self, action: InputAction) -> Option<KeyCode> {
        let index = self.bindings.iter().position(|&(_, a)| a == action)?;
        Some(self.bindings.remove(index).0)
    }

    /// Key bound to `action`
    pub fn key_for(&self, action: InputAction) -> Option<KeyCode> {
        self.bindings
            .iter()
            .find(|&&(_, a)| a == action)
            .map(|&(key, _)| key)
    }

    /// All bindings, in binding order
    pub fn bindings(&self) -> impl Iterator<Item = (KeyCode, InputAction)> + '_ {
        self.bindings.iter().copied()
    }

    /// Action for a key event, `None` for releases and unbound keys
    pub fn map_key(&self, key: KeyCode, state: ElementState, cursor_captured: bool) -> Option<InputAction> {
        if state != ElementState::Pressed {
            return None;
        }
        let (_, action) = self.bindings.iter().find(|&&(k, _)| k == key)?;
        match action {
            InputAction::ReleaseCursor if !cursor_captured => Some(InputAction::Exit),
            action => Some(*action),
        }
    }

    /// Action for a mouse button event
    pub fn map_mouse_button(
        &self,
        button: MouseButton,
        state: ElementState,
        cursor_captured: bool,
    ) -> Option<InputAction> {
        let pressed = state == ElementState::Pressed;
        (pressed && !cursor_captured && button == self.capture_button).then_some(InputAction::CaptureCursor)
    }
}
