//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`GAUNTLET_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use gauntlet_physics::PhysicsConfig;
use gauntlet_render::RendererSettings;
use serde::{Serialize, Deserialize};
use std::path::{Path, PathBuf};

use crate::game::GameConfig;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Window configuration
    #[serde(default)]
    pub window: WindowConfig,
    /// Camera configuration
    #[serde(default)]
    pub camera: CameraConfig,
    /// Input configuration
    #[serde(default)]
    pub input: InputConfig,
    /// Player physics tuning
    #[serde(default)]
    pub physics: PhysicsConfig,
    /// Rendering configuration
    #[serde(default)]
    pub rendering: RenderingConfig,
    /// Level progression and lava
    #[serde(default)]
    pub game: GameSection,
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
    /// 3. Environment variables (`GAUNTLET_*`)
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

        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // GAUNTLET_WINDOW__TITLE=Test -> window.title = "Test"
        figment = figment.merge(Env::prefixed("GAUNTLET_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }

    /// Physics tuning with unusable clock settings replaced by defaults
    pub fn to_physics_config(&self) -> PhysicsConfig {
        let mut physics = self.physics.clone();
        let defaults = PhysicsConfig::default();
        if !(physics.tick_rate > 0.0) {
            log::warn!("physics.tick_rate {} is not positive, using {}", physics.tick_rate, defaults.tick_rate);
            physics.tick_rate = defaults.tick_rate;
        }
        if physics.max_steps_per_frame == 0 {
            log::warn!("physics.max_steps_per_frame is 0, using {}", defaults.max_steps_per_frame);
            physics.max_steps_per_frame = defaults.max_steps_per_frame;
        }
        physics
    }

    /// Game settings gathered from the camera, game and debug sections
    pub fn to_game_config(&self) -> GameConfig {
        GameConfig {
            start_level: self.game.start_level,
            level_dir: self.game.level_dir.clone(),
            restart_clock: self.game.restart_clock,
            lava_rise_rate: self.game.lava_rise_rate,
            lava_base: self.game.lava_base,
            taunt_seed: self.game.seed,
            eye_height: self.camera.eye_height,
            fov: self.camera.fov,
            near: self.camera.near,
            far: self.camera.far,
            level_skip_keys: self.debug.level_skip_keys,
            sandbox: self.debug.sandbox,
        }
    }

    /// Renderer settings from the rendering section
    pub fn to_renderer_settings(&self) -> RendererSettings {
        RendererSettings {
            shadow_area: self.rendering.shadow_area,
            shadow_focus_distance: self.rendering.shadow_focus_distance,
            clear_color: self.rendering.clear_color,
            light_intensity: self.rendering.light_intensity,
        }
    }
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Start in fullscreen mode
    pub fullscreen: bool,
    /// Enable VSync
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Gauntlet".to_string(),
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
        }
    }
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Camera height above the player center
    pub eye_height: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 80.0,
            near: 0.1,
            far: 200.0,
            eye_height: 1.5,
        }
    }
}

/// Input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Radians per mouse count
    pub mouse_sensitivity: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            mouse_sensitivity: gauntlet_input::DEFAULT_MOUSE_SENSITIVITY,
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    /// Upper bound on the shadow map edge (also capped by the device)
    pub shadow_map_size: u32,
    /// Edge length of the area covered by the shadow map
    pub shadow_area: f32,
    /// Depth of the shadow frustum, centered on the focus point
    pub shadow_depth_range: f32,
    /// Distance in front of the camera the shadow frustum follows
    pub shadow_focus_distance: f32,
    /// Background color [r, g, b, a]
    pub clear_color: [f32; 4],
    /// Direct light strength
    pub light_intensity: f32,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        let renderer = RendererSettings::default();
        Self {
            shadow_map_size: 2048,
            shadow_area: renderer.shadow_area,
            shadow_depth_range: 150.0,
            shadow_focus_distance: renderer.shadow_focus_distance,
            clear_color: renderer.clear_color,
            light_intensity: renderer.light_intensity,
        }
    }
}

/// Game section of the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSection {
    /// Index of the first level
    pub start_level: usize,
    /// Directory of RON level files replacing the built-in levels
    pub level_dir: Option<PathBuf>,
    /// Physics time after a restart (negative gives a grace period)
    pub restart_clock: f64,
    /// Lava rise per second of physics time
    pub lava_rise_rate: f32,
    /// Lava height at physics time zero
    pub lava_base: f32,
    /// Seed for picking death taunts
    pub seed: Option<u32>,
}

impl Default for GameSection {
    fn default() -> Self {
        let game = GameConfig::default();
        Self {
            start_level: game.start_level,
            level_dir: None,
            restart_clock: game.restart_clock,
            lava_rise_rate: game.lava_rise_rate,
            lava_base: game.lava_base,
            seed: None,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Arrow keys switch levels, Enter restarts
    pub level_skip_keys: bool,
    /// Play only the sandbox level
    pub sandbox: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            level_skip_keys: false,
            sandbox: false,
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
