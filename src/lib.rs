//! Ninja - character movement and collision core
//!
//! Library half of the demo binary: configuration loading, scene
//! construction and the per-frame simulation driver.

pub mod config;
pub mod scene;
pub mod systems;
