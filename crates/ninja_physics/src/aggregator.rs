//! Static geometry aggregation
//!
//! All static collidable nodes are merged into one world-space,
//! position-only triangle buffer with a [`Bvh`] on top. The merge is redone
//! whenever the number of tracked static nodes changes, debounced so a burst
//! of scene mutations costs a single rebuild.
//!
//! Time is supplied by the caller (seconds of simulated time), which keeps
//! the debounce deterministic.

use ninja_math::{mat4, Mat4, MeshGeometry, Triangle, Vec3};
use serde::{Deserialize, Serialize};

use crate::bvh::Bvh;

/// Aggregator tuning
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Quiet period after the last count change before rebuilding (seconds)
    pub debounce: f64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self { debounce: 0.1 }
    }
}

/// One static node handed to the aggregator: world transform + geometry
#[derive(Clone, Copy, Debug)]
pub struct StaticSource<'a> {
    pub transform: Mat4,
    pub geometry: &'a MeshGeometry,
}

impl<'a> StaticSource<'a> {
    pub fn new(transform: Mat4, geometry: &'a MeshGeometry) -> Self {
        Self { transform, geometry }
    }
}

/// Merged static triangles plus their hierarchy
#[derive(Clone, Debug)]
pub struct StaticCollisionMesh {
    positions: Vec<Vec3>,
    bvh: Bvh,
    world: Mat4,
    inverse: Mat4,
}

impl StaticCollisionMesh {
    /// Build from a flat position buffer (three vertices per triangle)
    ///
    /// Returns `None` when the buffer holds no complete triangle.
    pub fn from_positions(positions: Vec<Vec3>) -> Option<Self> {
        let triangles: Vec<Triangle> = positions
            .chunks_exact(3)
            .map(|t| Triangle::new(t[0], t[1], t[2]))
            .collect();
        if triangles.is_empty() {
            return None;
        }
        Some(Self {
            positions,
            bvh: Bvh::build(triangles),
            world: mat4::IDENTITY,
            inverse: mat4::IDENTITY,
        })
    }

    /// Place the collider in the world
    ///
    /// A singular transform cannot be inverted for queries and is ignored.
    pub fn with_transform(mut self, world: Mat4) -> Self {
        match mat4::inverse_affine(&world) {
            Some(inverse) => {
                self.world = world;
                self.inverse = inverse;
            }
            None => log::warn!("ignoring singular static collider transform"),
        }
        self
    }

    /// The hierarchy, in collider-local space
    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    /// Collider local-to-world transform
    pub fn world_transform(&self) -> &Mat4 {
        &self.world
    }

    /// Collider world-to-local transform
    pub fn inverse_transform(&self) -> &Mat4 {
        &self.inverse
    }

    /// Number of merged triangles
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Merged vertex positions
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Merged vertex positions as a flat float buffer
    pub fn position_buffer(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }
}

/// Owner of the merged static collision mesh
#[derive(Debug, Default)]
pub struct StaticGeometryAggregator {
    config: AggregatorConfig,
    tracked_count: Option<usize>,
    deadline: Option<f64>,
    rebuild_count: u64,
    mesh: Option<StaticCollisionMesh>,
}

impl StaticGeometryAggregator {
    /// Create an aggregator with default tuning
    pub fn new() -> Self {
        Self::with_config(AggregatorConfig::default())
    }

    /// Create an aggregator with custom tuning
    pub fn with_config(config: AggregatorConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Record the current number of tracked static nodes
    ///
    /// A changed count arms a rebuild `debounce` seconds from `now`; further
    /// changes push that deadline out.
    pub fn notify_node_count(&mut self, count: usize, now: f64) {
        if self.tracked_count == Some(count) {
            return;
        }
        self.tracked_count = Some(count);
        self.deadline = Some(now + self.config.debounce);
    }

    /// Whether a rebuild is armed
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Rebuild if the debounce deadline has passed
    ///
    /// `sources` is only evaluated when a rebuild actually happens. Returns
    /// whether it did.
    pub fn tick<'a, I>(&mut self, now: f64, sources: impl FnOnce() -> I) -> bool
    where
        I: IntoIterator<Item = StaticSource<'a>>,
    {
        match self.deadline {
            Some(deadline) if now >= deadline => self.rebuild_now(sources()),
            _ => false,
        }
    }

    /// Merge `sources` and rebuild the hierarchy immediately
    ///
    /// Bypasses the debounce and clears any armed rebuild. The exclusive
    /// borrow keeps notifications from landing mid-rebuild. Always returns
    /// `true`.
    pub fn rebuild_now<'a>(&mut self, sources: impl IntoIterator<Item = StaticSource<'a>>) -> bool {
        let mut positions = Vec::new();
        for source in sources {
            for tri in source.geometry.triangles() {
                positions.extend(
                    [tri.a, tri.b, tri.c]
                        .into_iter()
                        .map(|p| mat4::transform_point(&source.transform, p)),
                );
            }
        }
        self.mesh = StaticCollisionMesh::from_positions(positions);

        self.deadline = None;
        self.rebuild_count += 1;

        log::debug!(
            "static collision mesh rebuilt ({} triangles)",
            self.mesh.as_ref().map_or(0, |m| m.triangle_count())
        );
        true
    }

    /// Current merged mesh; `None` means "no collision"
    pub fn mesh(&self) -> Option<&StaticCollisionMesh> {
        self.mesh.as_ref()
    }

    /// Number of completed rebuilds
    pub fn rebuild_count(&self) -> u64 {
        self.rebuild_count
    }

    /// Aggregator tuning
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> MeshGeometry {
        MeshGeometry::plane(10.0)
    }

    #[test]
    fn test_rebuild_coalesces_bursts() {
        let geometry = floor();
        let mut agg = StaticGeometryAggregator::new();
        let sources = || [StaticSource::new(mat4::IDENTITY, &geometry)];

        agg.notify_node_count(1, 0.0);
        for (i, t) in [0.02, 0.04, 0.06, 0.08, 0.09].into_iter().enumerate() {
            agg.notify_node_count(2 + i, t);
            assert!(!agg.tick(t, sources));
        }
        // Still inside the window of the last mutation
        assert!(!agg.tick(0.15, sources));
        assert!(agg.tick(0.2, sources));
        assert!(!agg.tick(0.5, sources));
        assert_eq!(agg.rebuild_count(), 1);
    }

    #[test]
    fn test_unchanged_count_does_not_rearm() {
        let geometry = floor();
        let mut agg = StaticGeometryAggregator::new();
        let sources = || [StaticSource::new(mat4::IDENTITY, &geometry)];

        agg.notify_node_count(1, 0.0);
        assert!(agg.tick(0.1, sources));
        agg.notify_node_count(1, 0.2);
        assert!(!agg.is_pending());
        assert!(!agg.tick(1.0, sources));
        assert_eq!(agg.rebuild_count(), 1);
    }

    #[test]
    fn test_rebuild_now_disarms_pending_rebuild() {
        let geometry = floor();
        let mut agg = StaticGeometryAggregator::new();
        let sources = || [StaticSource::new(mat4::IDENTITY, &geometry)];

        agg.notify_node_count(1, 0.0);
        assert!(agg.is_pending());
        assert!(agg.rebuild_now(sources()));
        assert!(!agg.is_pending());
        assert!(!agg.tick(1.0, sources));

        // A later mutation arms the debounce again
        agg.notify_node_count(2, 1.0);
        assert!(agg.is_pending());
        assert!(agg.tick(1.2, sources));
        assert_eq!(agg.rebuild_count(), 2);
    }

    #[test]
    fn test_empty_sources_give_no_mesh() {
        let mut agg = StaticGeometryAggregator::new();
        assert!(agg.rebuild_now(std::iter::empty()));
        assert!(agg.mesh().is_none());
        assert_eq!(agg.rebuild_count(), 1);
    }

    #[test]
    fn test_merge_applies_transforms() {
        let geometry = floor();
        let cube = MeshGeometry::cuboid(Vec3::ONE);
        let mut agg = StaticGeometryAggregator::new();
        agg.rebuild_now([
            StaticSource::new(mat4::from_translation(Vec3::new(0.0, -1.0, 0.0)), &geometry),
            StaticSource::new(mat4::from_translation(Vec3::new(3.0, 0.5, 0.0)), &cube),
        ]);

        let mesh = agg.mesh().expect("mesh");
        assert_eq!(mesh.triangle_count(), 2 + 12);
        assert_eq!(mesh.bvh().triangle_count(), 14);
        assert_eq!(mesh.position_buffer().len(), 14 * 9);

        let bounds = mesh.bvh().bounds().expect("bounds");
        assert_eq!(bounds.min.y, -1.0);
        assert_eq!(bounds.max.y, 1.0);
        assert_eq!(bounds.max.x, 5.0);
    }

    #[test]
    fn test_singular_transform_is_ignored() {
        let mesh = StaticCollisionMesh::from_positions(vec![Vec3::ZERO, Vec3::X, Vec3::Z])
            .expect("one triangle")
            .with_transform(mat4::from_trs(Vec3::ZERO, ninja_math::Quat::IDENTITY, Vec3::ZERO));
        assert_eq!(*mesh.world_transform(), mat4::IDENTITY);
    }
}
