//! Third-person camera obstruction handling
//!
//! The camera orbits the player. Once per frame the orbit is re-centred on
//! the player, and a ray from the camera toward the player's chest decides
//! whether static geometry hides the avatar; if it does, the camera jumps
//! to the hit point.

use ninja_math::{mat4, Ray, Vec3};
use serde::{Deserialize, Serialize};

use crate::aggregator::StaticCollisionMesh;

/// Trait for orbit-style cameras
/// Allows the resolver to work with different camera implementations
pub trait CameraRig {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    /// Point the camera orbits and looks at
    fn target(&self) -> Vec3;
    fn set_target(&mut self, target: Vec3);
    fn set_distance_limits(&mut self, min: f32, max: f32);
    /// Apply the rig's own constraints after the camera was moved
    fn update(&mut self);

    /// Rotation of the camera around the target about +Y
    ///
    /// Zero when the camera sits on the +Z side of its target.
    fn azimuth(&self) -> f32 {
        let offset = self.position() - self.target();
        offset.x.atan2(offset.z)
    }
}

/// Orbit camera that keeps its distance to the target within limits
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitRig {
    pub position: Vec3,
    pub target: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitRig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
        }
    }
}

impl OrbitRig {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            ..Default::default()
        }
    }

    /// Current camera-to-target distance
    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// Unit vectors (right, up) of the camera's view
    pub fn view_basis(&self) -> (Vec3, Vec3) {
        let forward = (self.target - self.position).normalized();
        let mut right = forward.cross(Vec3::Y).normalized();
        if right.length_squared() == 0.0 {
            right = Vec3::X;
        }
        let up = right.cross(forward).normalized();
        (right, up)
    }
}

impl CameraRig for OrbitRig {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn target(&self) -> Vec3 {
        self.target
    }

    fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    fn set_distance_limits(&mut self, min: f32, max: f32) {
        self.min_distance = min;
        self.max_distance = max.max(min);
    }

    fn update(&mut self) {
        let offset = self.position - self.target;
        let distance = offset.length();
        let direction = if distance > 0.0 { offset / distance } else { Vec3::Z };
        let clamped = distance.clamp(self.min_distance, self.max_distance);
        self.position = self.target + direction * clamped;
    }
}

/// Where the camera sits relative to the player
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    #[default]
    ThirdPerson,
    FirstPerson,
}

/// Camera tuning
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub mode: CameraMode,
    /// Preferred third-person distance, also the maximum
    pub desired_distance: f32,
    /// Closest the third-person camera may get
    pub min_distance: f32,
    /// Orbit distance in first person
    pub first_person_distance: f32,
    /// Initial camera position relative to the spawn point
    pub offset: Vec3,
    /// Free-look distance per unit of stick input
    pub free_look_speed: f32,
    /// Fraction of the way back to the desired distance per frame
    pub follow_lerp: f32,
    /// Obstruction ray near clip
    pub ray_near: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            mode: CameraMode::ThirdPerson,
            desired_distance: 3.5,
            min_distance: 1.0,
            first_person_distance: 1e-4,
            offset: Vec3::new(-0.25, 1.0, -5.0),
            free_look_speed: 0.27,
            follow_lerp: 0.1,
            ray_near: 0.01,
        }
    }
}

/// Result of one camera pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CameraOutcome {
    /// Whether the avatar mesh should be drawn
    pub avatar_visible: bool,
    /// Whether geometry blocked the view this frame
    pub obstructed: bool,
}

/// Keeps the player in view of an orbit camera
#[derive(Clone, Debug, Default)]
pub struct CameraObstructionResolver {
    config: CameraConfig,
}

impl CameraObstructionResolver {
    pub fn new(config: CameraConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn mode(&self) -> CameraMode {
        self.config.mode
    }

    pub fn set_mode(&mut self, mode: CameraMode) {
        self.config.mode = mode;
    }

    /// Put the camera at its starting spot relative to `spawn`
    pub fn place_initial(&self, rig: &mut impl CameraRig, spawn: Vec3) {
        rig.set_target(spawn);
        rig.set_position(spawn + self.config.offset);
    }

    /// Orbit limits for the current mode
    pub fn distance_limits(&self) -> (f32, f32) {
        match self.config.mode {
            CameraMode::FirstPerson => (
                self.config.first_person_distance,
                self.config.first_person_distance,
            ),
            CameraMode::ThirdPerson => (self.config.min_distance, self.config.desired_distance),
        }
    }

    /// Follow the player and pull the camera in front of any obstruction
    ///
    /// # Arguments
    /// * `rig` - The camera
    /// * `player_position` - Player capsule origin
    /// * `player_height` - Full avatar height
    /// * `moving` - Whether horizontal input was active this frame
    /// * `mesh` - Static collision mesh; `None` means nothing can obstruct
    pub fn resolve(
        &self,
        rig: &mut impl CameraRig,
        player_position: Vec3,
        player_height: f32,
        moving: bool,
        mesh: Option<&StaticCollisionMesh>,
    ) -> CameraOutcome {
        let (min, max) = self.distance_limits();
        rig.set_distance_limits(min, max);

        // Keep the camera's offset while the target follows the player
        let shift = player_position - rig.target();
        rig.set_position(rig.position() + shift);
        rig.set_target(player_position);

        if self.config.mode == CameraMode::FirstPerson {
            return CameraOutcome {
                avatar_visible: false,
                obstructed: false,
            };
        }

        let focus = player_position + Vec3::new(0.0, player_height * 0.5, 0.0);
        let camera = rig.position();
        let far = camera.distance(focus) - player_height * 0.5;

        if let Some(hit) = mesh.and_then(|m| obstruction(m, camera, focus, self.config.ray_near, far)) {
            rig.set_position(hit);
            return CameraOutcome {
                avatar_visible: true,
                obstructed: true,
            };
        }

        if moving {
            let away = (camera - focus).normalized();
            let goal = focus + away * self.config.desired_distance;
            rig.set_position(camera.lerp(goal, self.config.follow_lerp));
        }
        CameraOutcome {
            avatar_visible: true,
            obstructed: false,
        }
    }

    /// Nudge the camera along its view's right/up axes, then let the rig
    /// apply its limits
    ///
    /// Positive `axis[0]` moves the camera to its left, positive `axis[1]`
    /// moves it up.
    pub fn apply_free_look<R: CameraRig>(&self, rig: &mut R, axis: [f32; 2]) {
        let dx = axis[0] * self.config.free_look_speed;
        let dy = axis[1] * self.config.free_look_speed;
        if dx != 0.0 || dy != 0.0 {
            let view = OrbitRig::new(rig.position(), rig.target());
            let (right, up) = view.view_basis();
            rig.set_position(rig.position() - right * dx + up * dy);
        }
        rig.update();
    }
}

/// Closest static hit on the segment from `from` toward `to`, in world space
fn obstruction(
    mesh: &StaticCollisionMesh,
    from: Vec3,
    to: Vec3,
    near: f32,
    far: f32,
) -> Option<Vec3> {
    if far <= near {
        return None;
    }
    let direction = (to - from).normalized();
    if direction.length_squared() == 0.0 {
        return None;
    }

    // Query in collider space; distances are re-measured there so scaled
    // colliders keep the same clip points
    let inverse = mesh.inverse_transform();
    let origin = mat4::transform_point(inverse, from);
    let near_point = mat4::transform_point(inverse, from + direction * near);
    let far_point = mat4::transform_point(inverse, from + direction * far);
    let ray = Ray::new(origin, far_point - origin);

    let hit = mesh
        .bvh()
        .raycast(&ray, origin.distance(near_point), origin.distance(far_point))?;
    Some(mat4::transform_point(mesh.world_transform(), hit.point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{StaticGeometryAggregator, StaticSource};
    use ninja_math::MeshGeometry;

    const EPSILON: f32 = 1e-4;
    const HEIGHT: f32 = 2.0;

    fn wall_mesh() -> StaticCollisionMesh {
        // Thin wall across Z = 2 between player (origin) and camera (+Z),
        // offset so the test ray misses the face diagonals
        let wall = MeshGeometry::cuboid(Vec3::new(6.0, 6.0, 0.2));
        let mut agg = StaticGeometryAggregator::new();
        agg.rebuild_now([StaticSource::new(
            mat4::from_translation(Vec3::new(0.3, 1.0, 2.0)),
            &wall,
        )]);
        agg.mesh().cloned().expect("wall mesh")
    }

    #[test]
    fn test_orbit_rig_clamps_distance() {
        let mut rig = OrbitRig::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        rig.set_distance_limits(1.0, 3.5);
        rig.update();
        assert!((rig.distance() - 3.5).abs() < EPSILON);
        assert!((rig.position - Vec3::new(0.0, 0.0, 3.5)).length() < EPSILON);

        rig.position = Vec3::new(0.2, 0.0, 0.0);
        rig.update();
        assert!((rig.position - Vec3::new(1.0, 0.0, 0.0)).length() < EPSILON);
    }

    #[test]
    fn test_azimuth() {
        let rig = OrbitRig::new(Vec3::new(0.0, 1.0, 3.0), Vec3::ZERO);
        assert!(rig.azimuth().abs() < EPSILON);
        let rig = OrbitRig::new(Vec3::new(3.0, 1.0, 0.0), Vec3::ZERO);
        assert!((rig.azimuth() - std::f32::consts::FRAC_PI_2).abs() < EPSILON);
    }

    #[test]
    fn test_initial_placement() {
        let resolver = CameraObstructionResolver::default();
        let mut rig = OrbitRig::default();
        let spawn = Vec3::new(0.0, 3.0, -30.0);
        resolver.place_initial(&mut rig, spawn);
        assert_eq!(rig.target, spawn);
        assert!((rig.position - Vec3::new(-0.25, 4.0, -35.0)).length() < EPSILON);
    }

    #[test]
    fn test_recenters_on_player() {
        let resolver = CameraObstructionResolver::default();
        let mut rig = OrbitRig::new(Vec3::new(0.0, 1.0, 3.0), Vec3::ZERO);
        let moved = Vec3::new(2.0, 0.0, -1.0);
        let outcome = resolver.resolve(&mut rig, moved, HEIGHT, false, None);

        assert_eq!(rig.target, moved);
        assert!((rig.position - Vec3::new(2.0, 1.0, 2.0)).length() < EPSILON);
        assert!(outcome.avatar_visible);
        assert!(!outcome.obstructed);
    }

    #[test]
    fn test_obstruction_snaps_camera() {
        let mesh = wall_mesh();
        let resolver = CameraObstructionResolver::default();
        let mut rig = OrbitRig::new(Vec3::new(0.0, 1.0, 3.5), Vec3::ZERO);
        let outcome = resolver.resolve(&mut rig, Vec3::ZERO, HEIGHT, false, Some(&mesh));

        assert!(outcome.obstructed);
        // Camera-side face of the wall
        assert!((rig.position.z - 2.1).abs() < 1e-3);
        assert!((rig.position.y - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_obstruction_beyond_far_clip_ignored() {
        // Wall behind the player: the ray stops before reaching it
        let wall = MeshGeometry::cuboid(Vec3::new(6.0, 6.0, 0.2));
        let mut agg = StaticGeometryAggregator::new();
        agg.rebuild_now([StaticSource::new(
            mat4::from_translation(Vec3::new(0.0, 1.0, -2.0)),
            &wall,
        )]);
        let resolver = CameraObstructionResolver::default();
        let mut rig = OrbitRig::new(Vec3::new(0.0, 1.0, 3.5), Vec3::ZERO);
        let outcome = resolver.resolve(&mut rig, Vec3::ZERO, HEIGHT, false, agg.mesh());
        assert!(!outcome.obstructed);
        assert!((rig.position - Vec3::new(0.0, 1.0, 3.5)).length() < EPSILON);
    }

    #[test]
    fn test_follow_lerps_toward_desired_distance() {
        let resolver = CameraObstructionResolver::default();
        let mut rig = OrbitRig::new(Vec3::new(0.0, 1.0, 1.5), Vec3::ZERO);

        // Idle: no pull
        resolver.resolve(&mut rig, Vec3::ZERO, HEIGHT, false, None);
        assert!((rig.position.z - 1.5).abs() < EPSILON);

        // Moving: 10% of the way to 3.5 from the chest point
        resolver.resolve(&mut rig, Vec3::ZERO, HEIGHT, true, None);
        assert!((rig.position.z - (1.5 + 0.1 * 2.0)).abs() < EPSILON);
        assert!((rig.position.y - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_first_person_hides_avatar() {
        let mesh = wall_mesh();
        let mut resolver = CameraObstructionResolver::default();
        resolver.set_mode(CameraMode::FirstPerson);
        let mut rig = OrbitRig::new(Vec3::new(0.0, 1.0, 3.5), Vec3::ZERO);

        let outcome = resolver.resolve(&mut rig, Vec3::ZERO, HEIGHT, true, Some(&mesh));
        assert!(!outcome.avatar_visible);
        assert!(!outcome.obstructed);

        resolver.apply_free_look(&mut rig, [0.0, 0.0]);
        assert!(rig.distance() <= 1e-4 + 1e-6);
        assert_eq!(resolver.distance_limits(), (1e-4, 1e-4));
    }

    #[test]
    fn test_free_look_moves_sideways() {
        let resolver = CameraObstructionResolver::default();
        let mut rig = OrbitRig::new(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO);
        rig.set_distance_limits(1.0, 3.5);

        resolver.apply_free_look(&mut rig, [1.0, 0.0]);
        // Looking down -Z, the view's right is +X; positive input moves left
        assert!(rig.position.x < 0.0);
        assert!(rig.position.y.abs() < EPSILON);
        assert!((rig.distance() - 3.0).abs() < 0.05);

        let before = rig.position;
        resolver.apply_free_look(&mut rig, [0.0, 0.0]);
        assert!((rig.position - before).length() < EPSILON);
    }
}
