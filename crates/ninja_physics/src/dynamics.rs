//! Secondary physics for movable props
//!
//! Props fall under gravity and bounce off the static collision mesh. There
//! is no angular motion and props do not collide with each other; the
//! shape-pair library in [`crate::collision`] is available for gameplay
//! queries between them.

use ninja_math::{mat4, Segment, Triangle, Vec3};
use serde::{Deserialize, Serialize};

use crate::aggregator::StaticCollisionMesh;
use crate::body::DynamicProp;
use crate::collision::CollisionFilter;
use crate::shapes::{Aabb, Collider};
use crate::sweep::{push_out, SweepContact};

const DIRECTION_EPSILON: f32 = 1e-6;

/// Prop simulation tuning
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropConfig {
    /// Vertical acceleration (negative = down)
    pub gravity: f32,
    /// Props falling below this height are retired
    pub dead_zone_y: f32,
    /// Substeps per frame
    pub substeps: u32,
    /// Longest frame delta that is simulated
    pub max_frame_delta: f32,
}

impl Default for PropConfig {
    fn default() -> Self {
        Self {
            gravity: -9.8,
            dead_zone_y: -80.0,
            substeps: 5,
            max_frame_delta: 0.1,
        }
    }
}

/// Moves props and resolves them against static geometry
#[derive(Clone, Debug, Default)]
pub struct DynamicCollisionUpdater {
    config: PropConfig,
}

impl DynamicCollisionUpdater {
    pub fn new(config: PropConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PropConfig {
        &self.config
    }

    /// Advance every prop by one frame
    ///
    /// Returns how many props were retired during this frame.
    pub fn update<'a>(
        &self,
        props: impl IntoIterator<Item = &'a mut DynamicProp>,
        frame_delta: f32,
        mesh: Option<&StaticCollisionMesh>,
    ) -> usize {
        let frame = if frame_delta.is_finite() {
            frame_delta.clamp(0.0, self.config.max_frame_delta)
        } else {
            0.0
        };
        let substeps = self.config.substeps.max(1);
        let delta = frame / substeps as f32;

        let mut retired = 0;
        for prop in props {
            for _ in 0..substeps {
                if prop.retired {
                    break;
                }
                if self.step_prop(prop, delta, mesh) {
                    retired += 1;
                }
            }
        }
        retired
    }

    /// Advance one prop by one substep; returns `true` if it was retired
    pub fn step_prop(
        &self,
        prop: &mut DynamicProp,
        delta: f32,
        mesh: Option<&StaticCollisionMesh>,
    ) -> bool {
        if prop.retired {
            return false;
        }

        if prop.affected_by_gravity {
            prop.velocity.y += self.config.gravity * delta;
        }
        let before = prop.collider.bounds();
        prop.apply_correction(prop.velocity * delta);
        prop.velocity = prop.material.damp(prop.velocity, delta);

        if let Some(mesh) = mesh {
            if prop.filter.collides_with(&CollisionFilter::static_world()) {
                resolve_static(prop, &before, mesh);
            }
        }

        if prop.position().y < self.config.dead_zone_y {
            prop.retired = true;
            log::debug!("prop retired below dead zone at {:?}", prop.position());
            return true;
        }
        false
    }
}

/// Push `prop` out of the static mesh and bounce its velocity
///
/// `before` is the prop's bounds at the start of the substep. Props are
/// carried into collider space by their center only.
fn resolve_static(prop: &mut DynamicProp, before: &Aabb, mesh: &StaticCollisionMesh) {
    let center = prop.position();
    let local_center = mat4::transform_point(mesh.inverse_transform(), center);
    let shift = local_center - center;

    let mut local = prop.collider.at(local_center);
    let swept = before.translated(shift).union(&local.bounds());
    let mut total = Vec3::ZERO;

    mesh.bvh().shapecast(
        |bounds| bounds.intersects(&swept),
        |tri| {
            if let Some(contact) = triangle_contact(tri, &local) {
                let push = contact.normal * contact.depth;
                local = local.translated(push);
                total += push;
            }
            false
        },
    );

    if total.length_squared() == 0.0 {
        return;
    }
    let correction = mat4::transform_vector(mesh.world_transform(), total);
    prop.apply_correction(correction);
    prop.velocity = prop.material.bounce(prop.velocity, correction.normalized());
}

/// Push needed to separate a primitive collider from one triangle
pub fn triangle_contact(tri: &Triangle, collider: &Collider) -> Option<SweepContact> {
    match collider {
        Collider::Sphere(sphere) => push_out(
            tri,
            &Segment::new(sphere.center, sphere.center),
            sphere.radius,
        ),
        Collider::Capsule(capsule) => push_out(tri, &capsule.segment, capsule.radius()),
        Collider::Box(boxed) => box_contact(tri, boxed),
    }
}

/// Box vs triangle
///
/// The closest point on the triangle against the box's half-extent projected
/// onto the separating direction decides whether they touch; the push then
/// runs along the face normal so coplanar neighbours agree on the depth.
fn box_contact(tri: &Triangle, boxed: &Aabb) -> Option<SweepContact> {
    let center = boxed.center();
    let half = boxed.half_extents();
    let closest = tri.closest_point(center);
    let offset = center - closest;
    let distance = offset.length();

    let mut face = tri.normal();
    if face.length_squared() < 0.5 {
        face = Vec3::Y;
    }
    let toward = if distance > DIRECTION_EPSILON {
        offset / distance
    } else {
        face
    };
    if distance >= toward.abs().dot(half) {
        return None;
    }

    let mut normal = face;
    if normal.dot(center - tri.a) < 0.0 {
        normal = -normal;
    }
    let depth = normal.abs().dot(half) - normal.dot(center - tri.a);
    (depth > 0.0).then_some(SweepContact { normal, depth })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{StaticGeometryAggregator, StaticSource};
    use crate::material::PhysicsMaterial;
    use ninja_math::MeshGeometry;

    const EPSILON: f32 = 1e-3;
    const FRAME: f32 = 0.1;

    fn floor_mesh() -> StaticCollisionMesh {
        let floor = MeshGeometry::cuboid(Vec3::new(40.0, 1.0, 40.0));
        let mut agg = StaticGeometryAggregator::new();
        agg.rebuild_now([StaticSource::new(
            mat4::from_translation(Vec3::new(0.0, -0.5, 0.0)),
            &floor,
        )]);
        agg.mesh().cloned().expect("floor mesh")
    }

    fn run(prop: &mut DynamicProp, frames: usize, mesh: Option<&StaticCollisionMesh>) {
        let updater = DynamicCollisionUpdater::default();
        for _ in 0..frames {
            updater.update(std::iter::once(&mut *prop), FRAME, mesh);
        }
    }

    #[test]
    fn test_free_fall_without_mesh() {
        let mut prop = DynamicProp::sphere(Vec3::new(0.0, 10.0, 0.0), 0.5)
            .with_material(PhysicsMaterial::ICE);
        run(&mut prop, 1, None);
        assert!((prop.velocity.y + 0.98).abs() < 1e-4);
        assert!(prop.position().y < 10.0);
    }

    #[test]
    fn test_sphere_comes_to_rest() {
        let mesh = floor_mesh();
        let mut prop = DynamicProp::sphere(Vec3::new(0.3, 3.0, -1.1), 0.5);
        run(&mut prop, 40, Some(&mesh));
        assert!((prop.position().y - 0.5).abs() < EPSILON);
        assert!(prop.velocity.length() < 0.5);
    }

    #[test]
    fn test_box_lands_on_face() {
        let mesh = floor_mesh();
        let mut prop = DynamicProp::cuboid(Vec3::new(2.2, 3.0, 1.3), Vec3::new(0.5, 0.25, 0.5));
        run(&mut prop, 40, Some(&mesh));
        assert!((prop.position().y - 0.25).abs() < EPSILON);
    }

    #[test]
    fn test_capsule_lands_on_tip() {
        let mesh = floor_mesh();
        let mut prop = DynamicProp::capsule(Vec3::new(-1.7, 4.0, 0.4), 0.3, 2.0);
        run(&mut prop, 40, Some(&mesh));
        // Bottom tip touches the floor
        assert!((prop.position().y - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_rubber_bounces() {
        let mesh = floor_mesh();
        let mut prop = DynamicProp::sphere(Vec3::new(0.3, 3.0, -1.1), 0.5)
            .with_material(PhysicsMaterial::RUBBER);
        let updater = DynamicCollisionUpdater::default();
        let mut bounced = false;
        for _ in 0..20 {
            updater.update(std::iter::once(&mut prop), FRAME, Some(&mesh));
            if prop.velocity.y > 1.0 {
                bounced = true;
                break;
            }
        }
        assert!(bounced);
        assert!(prop.position().y >= 0.5 - EPSILON);
    }

    #[test]
    fn test_ghost_falls_through_and_retires() {
        let mesh = floor_mesh();
        let mut prop = DynamicProp::sphere(Vec3::new(0.3, 2.0, -1.1), 0.5)
            .with_filter(CollisionFilter::ghost_prop())
            .with_material(PhysicsMaterial::ICE);
        let updater = DynamicCollisionUpdater::default();

        let mut retired = 0;
        for _ in 0..60 {
            retired += updater.update(std::iter::once(&mut prop), FRAME, Some(&mesh));
        }
        assert_eq!(retired, 1);
        assert!(prop.retired);

        // Retired props are left where they are
        let parked = prop.position();
        updater.update(std::iter::once(&mut prop), FRAME, Some(&mesh));
        assert_eq!(prop.position(), parked);
        assert!(parked.y < -80.0);
    }

    #[test]
    fn test_gravity_disabled_drifts() {
        let mut prop = DynamicProp::sphere(Vec3::ZERO, 0.5)
            .with_gravity(false)
            .with_material(PhysicsMaterial::ICE)
            .with_velocity(Vec3::new(1.0, 0.0, 0.0));
        run(&mut prop, 10, None);
        assert!((prop.position() - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_box_contact_reach() {
        let tri = Triangle::new(
            Vec3::new(-5.0, 0.0, -5.0),
            Vec3::new(-5.0, 0.0, 5.0),
            Vec3::new(5.0, 0.0, 0.0),
        );
        let boxed = Aabb::from_center_half_extents(Vec3::new(0.0, 0.4, 0.0), Vec3::new(1.0, 0.5, 1.0));
        let contact = triangle_contact(&tri, &Collider::Box(boxed)).expect("overlap");
        assert!((contact.normal - Vec3::Y).length() < 1e-5);
        assert!((contact.depth - 0.1).abs() < 1e-5);

        let clear = boxed.translated(Vec3::new(0.0, 0.2, 0.0));
        assert!(triangle_contact(&tri, &Collider::Box(clear)).is_none());
    }
}
