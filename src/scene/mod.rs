//! Scene construction utilities
//!
//! This module provides a declarative API for building collision scenes.

mod scene_builder;

pub use scene_builder::SceneBuilder;
