//! Scene nodes
//!
//! A SceneNode is an externally owned object in the world: a transform, a
//! shared geometry reference and the role it plays in collision.

use std::collections::HashSet;
use std::sync::Arc;
use bitflags::bitflags;
use ninja_math::{mat4, Mat4, MeshGeometry, Vec3};
use ninja_physics::{Aabb, DynamicProp, PropKey};
use serde::{Serialize, Deserialize};
use crate::Transform3D;

bitflags! {
    /// Flags indicating which parts of a node have changed since the host last looked
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct DirtyFlags: u8 {
        /// No changes
        const NONE = 0;
        /// Transform (position, rotation, scale) has changed
        const TRANSFORM = 1 << 0;
        /// Geometry has changed
        const GEOMETRY = 1 << 1;
        /// All flags set
        const ALL = Self::TRANSFORM.bits() | Self::GEOMETRY.bits();
    }
}

/// How a node takes part in collision
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// Merged into the static collision mesh
    Static,
    /// Simulated as a dynamic prop
    Moveable,
    /// Driven by the movement integrator
    Player,
    /// Visual only, never collides
    #[default]
    Decoration,
}

/// A node in the scene
pub struct SceneNode {
    /// Optional name for this node (for lookup)
    pub name: Option<String>,
    /// Tags for categorization (e.g., "crate", "level")
    pub tags: HashSet<String>,
    /// The node's transform in world space
    pub transform: Transform3D,
    /// Shared geometry (several nodes may reference one mesh)
    pub geometry: Arc<MeshGeometry>,
    /// Collision role
    pub role: NodeRole,
    /// Prop driving this node, set once the node joins a physics world
    pub prop: Option<PropKey>,
    /// Custom prop description used instead of the default bounding box
    prop_template: Option<DynamicProp>,
    /// Prop center minus node position at registration
    pub(crate) prop_offset: Vec3,
    dirty: DirtyFlags,
}

impl SceneNode {
    /// Create a node with the given geometry and role
    pub fn new(geometry: Arc<MeshGeometry>, role: NodeRole) -> Self {
        Self {
            name: None,
            tags: HashSet::new(),
            transform: Transform3D::identity(),
            geometry,
            role,
            prop: None,
            prop_template: None,
            prop_offset: Vec3::ZERO,
            dirty: DirtyFlags::ALL, // New nodes are dirty
        }
    }

    /// Static collidable geometry
    pub fn static_geometry(geometry: Arc<MeshGeometry>) -> Self {
        Self::new(geometry, NodeRole::Static)
    }

    /// A moveable prop
    pub fn moveable(geometry: Arc<MeshGeometry>) -> Self {
        Self::new(geometry, NodeRole::Moveable)
    }

    /// The player avatar; its transform sits at the avatar's feet
    pub fn player(geometry: Arc<MeshGeometry>) -> Self {
        Self::new(geometry, NodeRole::Player)
    }

    /// Set the transform
    pub fn with_transform(mut self, transform: Transform3D) -> Self {
        self.transform = transform;
        self
    }

    /// Set the position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    /// Set the name of this node (for lookup)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a tag to this node
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Describe the prop explicitly
    ///
    /// The prop's collider position is taken as-is; the node keeps its
    /// offset from it when the prop moves.
    pub fn with_prop(mut self, prop: DynamicProp) -> Self {
        self.prop_template = Some(prop);
        self
    }

    /// Check if this node has a specific tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Local-to-world matrix
    pub fn world_matrix(&self) -> Mat4 {
        self.transform.to_matrix()
    }

    /// World-space bounds of the geometry, `None` for empty geometry
    pub fn world_bounds(&self) -> Option<Aabb> {
        let (min, max) = self.geometry.bounds()?;
        let matrix = self.world_matrix();
        let corners = (0..8).map(|i| {
            let corner = Vec3::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            );
            mat4::transform_point(&matrix, corner)
        });
        Some(Aabb::from_points(corners))
    }

    /// The prop this node should be simulated as
    ///
    /// Falls back to a box around the world bounds of the geometry.
    pub(crate) fn take_prop(&mut self) -> Option<DynamicProp> {
        if let Some(prop) = self.prop_template.take() {
            return Some(prop);
        }
        let bounds = self.world_bounds()?;
        Some(DynamicProp::cuboid(bounds.center(), bounds.half_extents()))
    }

    // --- Dirty tracking methods ---

    /// Check if this node has any dirty flags set
    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Get the current dirty flags
    #[inline]
    pub fn dirty_flags(&self) -> DirtyFlags {
        self.dirty
    }

    /// Mark this node as dirty with the given flags
    #[inline]
    pub fn mark_dirty(&mut self, flags: DirtyFlags) {
        self.dirty |= flags;
    }

    /// Clear all dirty flags
    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = DirtyFlags::NONE;
    }

    /// Set the position and mark the transform as dirty
    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
        self.mark_dirty(DirtyFlags::TRANSFORM);
    }

    /// Set the transform and mark it as dirty
    pub fn set_transform(&mut self, transform: Transform3D) {
        self.transform = transform;
        self.mark_dirty(DirtyFlags::TRANSFORM);
    }

    /// Swap the geometry and mark it as dirty
    pub fn set_geometry(&mut self, geometry: Arc<MeshGeometry>) {
        self.geometry = geometry;
        self.mark_dirty(DirtyFlags::GEOMETRY);
    }
}

impl std::fmt::Debug for SceneNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneNode")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("transform", &self.transform)
            .field("triangles", &self.geometry.triangle_count())
            .field("prop", &self.prop)
            .finish()
    }
}
