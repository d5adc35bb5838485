//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`NINJA_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use ninja_math::Vec3;
use ninja_physics::CameraMode;
use serde::{Serialize, Deserialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Shared simulation settings
    #[serde(default)]
    pub physics: PhysicsConfig,
    /// Player movement tuning
    #[serde(default)]
    pub player: PlayerConfig,
    /// Camera tuning
    #[serde(default)]
    pub camera: CameraConfig,
    /// Dynamic prop tuning
    #[serde(default)]
    pub props: PropsConfig,
    /// Static geometry aggregation
    #[serde(default)]
    pub aggregator: AggregatorConfig,
    /// Input configuration
    #[serde(default)]
    pub input: InputConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`NINJA_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        // Load user config (optional)
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // NINJA_PLAYER__BASE_SPEED=4 -> player.base_speed = 4.0
        figment = figment.merge(Env::prefixed("NINJA_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }

    /// Assemble the full physics configuration
    pub fn to_physics_config(&self) -> ninja_physics::PhysicsConfig {
        ninja_physics::PhysicsConfig {
            player: self.player.to_player_config(&self.physics),
            camera: self.camera.to_camera_config(),
            props: self.props.to_prop_config(&self.physics),
            aggregator: self.aggregator.to_aggregator_config(),
        }
    }
}

/// Settings shared by the player and the props
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity applied to the player (negative = downward)
    pub player_gravity: f32,
    /// Gravity applied to props
    pub prop_gravity: f32,
    /// Substeps per frame
    pub substeps: u32,
    /// Longest frame delta that is simulated
    pub max_frame_delta: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            player_gravity: -30.0,
            prop_gravity: -9.8,
            substeps: 5,
            max_frame_delta: 0.1,
        }
    }
}

/// Player movement configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Walking speed (units per second)
    pub base_speed: f32,
    /// Speed multiplier while dashing
    pub dash_ratio: f32,
    /// Jump velocity
    pub jump_power: f32,
    /// Minimum seconds between jumps
    pub jump_interval: f32,
    /// Falling below this height respawns the player
    pub dead_zone_y: f32,
    /// Spawn point [x, y, z]
    pub spawn: [f32; 3],
    /// Height added to the spawn point on respawn
    pub spawn_offset_y: f32,
    /// Avatar height
    pub height: f32,
    /// Player collision radius
    pub radius: f32,
    /// Capsule core segment length
    pub segment_length: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            base_speed: 2.5,
            dash_ratio: 2.1,
            jump_power: 10.0,
            jump_interval: 0.5,
            dead_zone_y: -25.0,
            spawn: [0.0, 3.0, -30.0],
            spawn_offset_y: 3.0,
            height: 2.0,
            radius: 0.5,
            segment_length: 1.0,
        }
    }
}

impl PlayerConfig {
    pub fn to_player_config(&self, physics: &PhysicsConfig) -> ninja_physics::PlayerConfig {
        let [x, y, z] = self.spawn;
        ninja_physics::PlayerConfig {
            gravity: physics.player_gravity,
            base_speed: self.base_speed,
            dash_ratio: self.dash_ratio,
            jump_power: self.jump_power,
            jump_interval: self.jump_interval,
            substeps: physics.substeps,
            max_frame_delta: physics.max_frame_delta,
            dead_zone_y: self.dead_zone_y,
            spawn: Vec3::new(x, y, z),
            spawn_offset_y: self.spawn_offset_y,
            height: self.height,
            radius: self.radius,
            segment_length: self.segment_length,
            ..Default::default()
        }
    }
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Starting view mode
    pub mode: CameraMode,
    /// Preferred third-person distance
    pub desired_distance: f32,
    /// Closest the third-person camera may get
    pub min_distance: f32,
    /// Initial camera offset from the spawn point [x, y, z]
    pub offset: [f32; 3],
    /// Free-look speed
    pub free_look_speed: f32,
    /// Follow interpolation per frame (0-1)
    pub follow_lerp: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            mode: CameraMode::ThirdPerson,
            desired_distance: 3.5,
            min_distance: 1.0,
            offset: [-0.25, 1.0, -5.0],
            free_look_speed: 0.27,
            follow_lerp: 0.1,
        }
    }
}

impl CameraConfig {
    pub fn to_camera_config(&self) -> ninja_physics::CameraConfig {
        let [x, y, z] = self.offset;
        ninja_physics::CameraConfig {
            mode: self.mode,
            desired_distance: self.desired_distance,
            min_distance: self.min_distance,
            offset: Vec3::new(x, y, z),
            free_look_speed: self.free_look_speed,
            follow_lerp: self.follow_lerp,
            ..Default::default()
        }
    }
}

/// Dynamic prop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PropsConfig {
    /// Props falling below this height are retired
    pub dead_zone_y: f32,
}

impl Default for PropsConfig {
    fn default() -> Self {
        Self { dead_zone_y: -80.0 }
    }
}

impl PropsConfig {
    pub fn to_prop_config(&self, physics: &PhysicsConfig) -> ninja_physics::PropConfig {
        ninja_physics::PropConfig {
            gravity: physics.prop_gravity,
            dead_zone_y: self.dead_zone_y,
            substeps: physics.substeps,
            max_frame_delta: physics.max_frame_delta,
        }
    }
}

/// Static geometry aggregation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Seconds without static node changes before the mesh is rebuilt
    pub debounce: f64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self { debounce: 0.1 }
    }
}

impl AggregatorConfig {
    pub fn to_aggregator_config(&self) -> ninja_physics::AggregatorConfig {
        ninja_physics::AggregatorConfig {
            debounce: self.debounce,
        }
    }
}

/// Input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Free-look units per pixel of mouse motion
    pub mouse_sensitivity: f32,
    /// Input smoothing half-life in seconds (lower = more responsive)
    pub smoothing_half_life: f32,
    /// Enable input smoothing by default
    pub smoothing_enabled: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 0.01,
            smoothing_half_life: 0.05,
            smoothing_enabled: false,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Frames simulated by the headless demo
    pub demo_frames: u32,
    /// Log a status line every this many frames (0 = never)
    pub report_every: u32,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            demo_frames: 240,
            report_every: 30,
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.physics.player_gravity, -30.0);
        assert_eq!(config.player.radius, 0.5);
        assert_eq!(config.camera.mode, CameraMode::ThirdPerson);
    }

    #[test]
    fn test_defaults_match_physics_defaults() {
        let physics = AppConfig::default().to_physics_config();
        assert_eq!(physics, ninja_physics::PhysicsConfig::default());
    }

    #[test]
    fn test_shared_settings_reach_both_configs() {
        let mut config = AppConfig::default();
        config.physics.substeps = 8;
        config.physics.prop_gravity = -5.0;
        let physics = config.to_physics_config();
        assert_eq!(physics.player.substeps, 8);
        assert_eq!(physics.props.substeps, 8);
        assert_eq!(physics.props.gravity, -5.0);
        assert_eq!(physics.player.gravity, -30.0);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("base_speed"));
        assert!(toml.contains("third_person"));
        assert!(toml.contains("debounce"));
    }
}
