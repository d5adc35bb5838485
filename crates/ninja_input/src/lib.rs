//! Input handling for the Ninja character controller
//!
//! Raw winit events become an [`ninja_physics::InputSnapshot`] per frame for
//! movement, plus discrete [`InputAction`]s for everything else.

mod action_mapper;
mod input_controller;

pub use action_mapper::{ActionMapper, InputAction};
pub use input_controller::InputController;
