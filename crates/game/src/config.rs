//! Simulation configuration (terrain, gait, scene). Loaded from config.ron at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not access config at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config at {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("could not serialize config: {0}")]
    Serialize(#[from] ron::Error),
}

/// Height-field generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainSettings {
    #[serde(default = "default_grid_size")]
    pub width: usize,
    #[serde(default = "default_grid_size")]
    pub height: usize,
    /// Spread of the random corner offset.
    #[serde(default = "default_height_interval")]
    pub height_interval: f32,
    /// Fixed seed for reproducible runs; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_grid_size() -> usize {
    51
}
fn default_height_interval() -> f32 {
    0.7
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            width: default_grid_size(),
            height: default_grid_size(),
            height_interval: default_height_interval(),
            seed: None,
        }
    }
}

impl TerrainSettings {
    pub fn to_terrain_config(&self) -> procgen::TerrainConfig {
        procgen::TerrainConfig {
            width: self.width,
            height: self.height,
            height_interval: self.height_interval,
        }
    }
}

/// Gait and body tuning shared by every walker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkerConfig {
    /// Body rest height above the ground.
    #[serde(default = "default_body_height")]
    pub body_height: f32,
    /// Distance from body center to each leg's ideal foot position.
    #[serde(default = "default_body_feet_radius")]
    pub body_feet_radius: f32,
    /// Base radius for the step threshold and the step length.
    #[serde(default = "default_feet_radius")]
    pub feet_radius: f32,
    #[serde(default = "default_placement_check_scale")]
    pub placement_check_scale: f32,
    #[serde(default = "default_placement_scale")]
    pub placement_scale: f32,
    /// Body linear speed (units/s).
    #[serde(default = "default_body_speed")]
    pub body_speed: f32,
    /// Body angular speed (rad/s).
    #[serde(default = "default_rotation_speed")]
    pub rotation_speed: f32,
    #[serde(default = "default_lift_height")]
    pub lift_height: f32,
    #[serde(default = "default_lift_speed")]
    pub lift_speed: f32,
    #[serde(default = "default_horizontal_speed")]
    pub horizontal_speed: f32,
    /// Initial foot jitter is `(random() - 0.5) / init_jitter_div`.
    #[serde(default = "default_init_jitter_div")]
    pub init_jitter_div: f32,
    #[serde(default = "default_roaming_wait")]
    pub roaming_wait: f32,
    #[serde(default = "default_roaming_variance")]
    pub roaming_variance: f32,
    #[serde(default = "default_idle_bob_rate")]
    pub idle_bob_rate: f32,
    #[serde(default = "default_idle_bob_amount")]
    pub idle_bob_amount: f32,
    /// Exponential easing rate of the body height under player control.
    #[serde(default = "default_height_rate")]
    pub height_rate: f32,
}

fn default_body_height() -> f32 {
    2.0
}
fn default_body_feet_radius() -> f32 {
    1.7
}
fn default_feet_radius() -> f32 {
    1.5
}
fn default_placement_check_scale() -> f32 {
    1.0
}
fn default_placement_scale() -> f32 {
    0.9
}
fn default_body_speed() -> f32 {
    1.5
}
fn default_rotation_speed() -> f32 {
    1.0
}
fn default_lift_height() -> f32 {
    1.0
}
fn default_lift_speed() -> f32 {
    5.0
}
fn default_horizontal_speed() -> f32 {
    7.0
}
fn default_init_jitter_div() -> f32 {
    4.0
}
fn default_roaming_wait() -> f32 {
    2.0
}
fn default_roaming_variance() -> f32 {
    7.0
}
fn default_idle_bob_rate() -> f32 {
    1.0
}
fn default_idle_bob_amount() -> f32 {
    0.1
}
fn default_height_rate() -> f32 {
    3.0
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            body_height: default_body_height(),
            body_feet_radius: default_body_feet_radius(),
            feet_radius: default_feet_radius(),
            placement_check_scale: default_placement_check_scale(),
            placement_scale: default_placement_scale(),
            body_speed: default_body_speed(),
            rotation_speed: default_rotation_speed(),
            lift_height: default_lift_height(),
            lift_speed: default_lift_speed(),
            horizontal_speed: default_horizontal_speed(),
            init_jitter_div: default_init_jitter_div(),
            roaming_wait: default_roaming_wait(),
            roaming_variance: default_roaming_variance(),
            idle_bob_rate: default_idle_bob_rate(),
            idle_bob_amount: default_idle_bob_amount(),
            height_rate: default_height_rate(),
        }
    }
}

/// Scene-level settings and the headless demo's run length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default = "default_walker_count")]
    pub walker_count: usize,
    /// Camera easing rate toward its desired position and target.
    #[serde(default = "default_camera_rate")]
    pub camera_rate: f32,
    /// Camera position relative to what it looks at.
    #[serde(default = "default_camera_offset")]
    pub camera_offset: [f32; 3],
    /// Seconds walkers stay frozen after a terrain reset.
    #[serde(default = "default_reset_duration")]
    pub reset_duration: f32,
    /// Fixed timestep used by the demo loop.
    #[serde(default = "default_fixed_dt")]
    pub fixed_dt: f32,
    /// Frames the demo simulates before exiting.
    #[serde(default = "default_demo_frames")]
    pub demo_frames: u32,
}

fn default_walker_count() -> usize {
    3
}
fn default_camera_rate() -> f32 {
    1.0
}
fn default_camera_offset() -> [f32; 3] {
    [10.0, 10.0, 10.0]
}
fn default_reset_duration() -> f32 {
    5.0
}
fn default_fixed_dt() -> f32 {
    1.0 / 60.0
}
fn default_demo_frames() -> u32 {
    1800
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            walker_count: default_walker_count(),
            camera_rate: default_camera_rate(),
            camera_offset: default_camera_offset(),
            reset_duration: default_reset_duration(),
            fixed_dt: default_fixed_dt(),
            demo_frames: default_demo_frames(),
        }
    }
}

/// Persistent simulation settings. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub terrain: TerrainSettings,
    #[serde(default)]
    pub walker: WalkerConfig,
    #[serde(default)]
    pub scene: SceneConfig,
}

impl SimConfig {
    /// Load config from `config.ron`. A missing file is created with the
    /// defaults; an invalid one is left alone and defaults are used.
    pub fn load() -> Self {
        Self::load_or_create(&config_path())
    }

    pub fn load_or_create(path: &Path) -> Self {
        if !path.exists() {
            let config = Self::default();
            match config.save_to(path) {
                Ok(()) => log::info!("Wrote default config to {}", path.display()),
                Err(e) => log::warn!("Could not write config: {}", e),
            }
            return config;
        }
        match Self::load_from(path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_ron(data: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(data)
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let s = self.to_ron()?;
        std::fs::write(path, s).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("config.ron")
}
