//! 3D Mathematics Library
//!
//! This crate provides the vector, rotation and geometry primitives used by
//! the Ninja collision and movement core.
//!
//! ## Core Types
//!
//! - [`Vec3`] - 3D vector with x, y, z components (Y up)
//! - [`Quat`] - unit quaternion rotation
//! - [`Mat4`] - 4x4 column-major affine transform
//!
//! ## Geometry Types
//!
//! - [`Segment`] / [`Ray`] - line primitives with closest-point queries
//! - [`Triangle`] - triangle with point, segment and ray queries
//! - [`MeshGeometry`] - position-only triangle mesh

mod vec3;
mod quat;
pub mod mat4;
pub mod segment;
pub mod triangle;
pub mod mesh;

pub use vec3::Vec3;
pub use quat::Quat;
pub use mat4::Mat4;
pub use segment::{Ray, Segment};
pub use triangle::{RayHit, Triangle, TriangleSegmentContact};
pub use mesh::MeshGeometry;
