//! 3D Transform (position, rotation, scale)
//!
//! A Transform3D represents the position, rotation, and scale of a scene node.

use ninja_math::{mat4, Mat4, Quat, Vec3};
use serde::{Serialize, Deserialize};

/// A 3D transform with position, rotation, and per-axis scale
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    /// Position in world space
    pub position: Vec3,
    /// Rotation as a unit quaternion
    pub rotation: Quat,
    /// Per-axis scale factor
    pub scale: Vec3,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform3D {
    /// Create an identity transform (no translation, rotation, or scale change)
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Create a transform with just a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            scale: Vec3::ONE,
        }
    }

    /// Builder: set the scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Local-to-world matrix (scale, then rotation, then translation)
    pub fn to_matrix(&self) -> Mat4 {
        mat4::from_trs(self.position, self.rotation, self.scale)
    }

    /// World-to-local matrix; `None` when a scale axis is zero
    pub fn inverse_matrix(&self) -> Option<Mat4> {
        mat4::inverse_affine(&self.to_matrix())
    }

    /// Transform a point from local space to world space
    ///
    /// Applies scale, then rotation, then translation.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation.rotate(p.component_mul(self.scale)) + self.position
    }

    /// Transform a direction from local space to world space
    ///
    /// Applies scale and rotation, but not translation.
    pub fn transform_direction(&self, d: Vec3) -> Vec3 {
        self.rotation.rotate(d.component_mul(self.scale))
    }

    /// Translate the transform by an offset
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Rotate the transform by a quaternion
    pub fn rotate(&mut self, rotation: Quat) {
        self.rotation = rotation.compose(&self.rotation).normalize();
    }

    /// Facing yaw around +Y
    pub fn yaw(&self) -> f32 {
        self.rotation.yaw()
    }
}
