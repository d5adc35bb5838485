//! Unit quaternion for 3D rotations

use serde::{Serialize, Deserialize};
use crate::Vec3;

/// Rotation quaternion `w + xi + yj + zk`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Rotation of `angle` radians around `axis`
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let axis = axis.normalized();
        let (sn, cs) = (angle * 0.5).sin_cos();
        Self {
            x: axis.x * sn,
            y: axis.y * sn,
            z: axis.z * sn,
            w: cs,
        }
    }

    /// Rotation around world up (+Y), i.e. a facing yaw
    pub fn from_yaw(yaw: f32) -> Self {
        Self::from_axis_angle(Vec3::Y, yaw)
    }

    /// Yaw angle (rotation around +Y) encoded by this rotation
    pub fn yaw(&self) -> f32 {
        let forward = self.rotate(Vec3::Z);
        forward.x.atan2(forward.z)
    }

    /// Hamilton product: `self * other` applies `other` first
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            w: self.w * other.w - self.x * other.x - self.y * other.y - self.z * other.z,
            x: self.w * other.x + self.x * other.w + self.y * other.z - self.z * other.y,
            y: self.w * other.y - self.x * other.z + self.y * other.w + self.z * other.x,
            z: self.w * other.z + self.x * other.y - self.y * other.x + self.z * other.w,
        }
    }

    /// Inverse of a unit quaternion
    pub fn conjugate(&self) -> Self {
        Self { x: -self.x, y: -self.y, z: -self.z, w: self.w }
    }

    /// Renormalize to unit length
    pub fn normalize(&self) -> Self {
        let len = (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt();
        if len > 0.0 {
            Self { x: self.x / len, y: self.y / len, z: self.z / len, w: self.w / len }
        } else {
            Self::IDENTITY
        }
    }

    /// Rotate a vector
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        let q = Vec3::new(self.x, self.y, self.z);
        let t = q.cross(v) * 2.0;
        v + t * self.w + q.cross(t)
    }

    /// 3x3 rotation as column vectors
    pub fn to_basis(&self) -> [Vec3; 3] {
        [self.rotate(Vec3::X), self.rotate(Vec3::Y), self.rotate(Vec3::Z)]
    }
}
