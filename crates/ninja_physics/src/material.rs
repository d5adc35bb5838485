//! Surface response of movable props

use ninja_math::Vec3;
use serde::{Deserialize, Serialize};

/// How a prop reacts when it hits static geometry
///
/// `restitution` scales the reflected normal velocity (0.0 = no bounce,
/// 1.0 = perfect bounce), `friction` is the share of tangential velocity
/// lost per contact and `drag` is linear damping per second.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsMaterial {
    pub restitution: f32,
    pub friction: f32,
    pub drag: f32,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            restitution: 0.3,
            friction: 0.2,
            drag: 0.1,
        }
    }
}

impl PhysicsMaterial {
    /// Bouncy ball
    pub const RUBBER: Self = Self {
        restitution: 0.8,
        friction: 0.1,
        drag: 0.05,
    };

    /// Crates and barrels
    pub const WOOD: Self = Self {
        restitution: 0.2,
        friction: 0.4,
        drag: 0.1,
    };

    /// Slides a long way
    pub const ICE: Self = Self {
        restitution: 0.1,
        friction: 0.0,
        drag: 0.0,
    };

    /// Create a material; restitution and friction are clamped to [0, 1],
    /// drag to non-negative
    pub fn new(restitution: f32, friction: f32, drag: f32) -> Self {
        Self {
            restitution: restitution.clamp(0.0, 1.0),
            friction: friction.clamp(0.0, 1.0),
            drag: drag.max(0.0),
        }
    }

    /// Velocity after hitting a surface with unit `normal`
    ///
    /// Only motion into the surface is reflected; a prop already moving away
    /// keeps its velocity.
    pub fn bounce(&self, velocity: Vec3, normal: Vec3) -> Vec3 {
        let into = velocity.dot(normal);
        if into >= 0.0 {
            return velocity;
        }
        let normal_part = normal * into;
        let tangent = velocity - normal_part;
        tangent * (1.0 - self.friction) - normal_part * self.restitution
    }

    /// Velocity after `dt` seconds of drag
    pub fn damp(&self, velocity: Vec3, dt: f32) -> Vec3 {
        velocity * (1.0 - self.drag * dt).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_new_clamps_values() {
        let material = PhysicsMaterial::new(1.5, -0.5, -2.0);
        assert_eq!(material.restitution, 1.0);
        assert_eq!(material.friction, 0.0);
        assert_eq!(material.drag, 0.0);
    }

    #[test]
    fn test_preset_constants() {
        assert!(PhysicsMaterial::RUBBER.restitution > 0.7);
        assert!(PhysicsMaterial::WOOD.friction > PhysicsMaterial::ICE.friction);
        assert_eq!(PhysicsMaterial::ICE.drag, 0.0);
    }

    #[test]
    fn test_bounce_reflects_normal_part() {
        let material = PhysicsMaterial::new(0.5, 0.0, 0.0);
        let v = material.bounce(Vec3::new(2.0, -4.0, 0.0), Vec3::Y);
        assert!((v - Vec3::new(2.0, 2.0, 0.0)).length() < EPSILON);
    }

    #[test]
    fn test_bounce_friction_slows_tangent() {
        let material = PhysicsMaterial::new(0.0, 0.25, 0.0);
        let v = material.bounce(Vec3::new(4.0, -1.0, 0.0), Vec3::Y);
        assert!((v - Vec3::new(3.0, 0.0, 0.0)).length() < EPSILON);
    }

    #[test]
    fn test_bounce_ignores_separating_motion() {
        let material = PhysicsMaterial::RUBBER;
        let v = Vec3::new(1.0, 3.0, 0.0);
        assert_eq!(material.bounce(v, Vec3::Y), v);
    }

    #[test]
    fn test_damp() {
        let material = PhysicsMaterial::new(0.0, 0.0, 0.5);
        let v = material.damp(Vec3::new(2.0, 0.0, 0.0), 0.1);
        assert!((v.x - 1.9).abs() < EPSILON);
        // Huge steps never reverse the velocity
        assert_eq!(material.damp(Vec3::X, 10.0), Vec3::ZERO);
    }
}
