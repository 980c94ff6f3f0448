//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Viewport settings.
    pub window: WindowConfig,
    /// Camera projection and start pose.
    pub camera: CameraConfig,
    /// Orbit controller tuning.
    pub controls: ControlsConfig,
    /// Planet surface and atmosphere settings.
    pub planet: PlanetConfig,
    /// Sun light settings.
    pub sun: SunConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Viewport configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Viewport width in logical pixels.
    pub width: u32,
    /// Viewport height in logical pixels.
    pub height: u32,
    /// Window title.
    pub title: String,
}

/// Camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clip plane distance in scene units.
    pub near: f32,
    /// Far clip plane distance in scene units.
    pub far: f32,
    /// Initial camera distance from the planet center along +Z.
    pub start_distance: f32,
}

/// Orbit controller configuration.
///
/// Upper bounds set to `None` are unbounded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlsConfig {
    /// Keep residual motion after input stops (inertia).
    pub enable_damping: bool,
    /// Allow orbiting around the target.
    pub enable_rotate: bool,
    /// Allow dolly/zoom.
    pub enable_zoom: bool,
    /// Allow panning the target.
    pub enable_pan: bool,
    /// Allow arrow-key panning.
    pub enable_keys: bool,
    /// Rotation speed multiplier.
    pub rotate_speed: f32,
    /// Fraction of the pending rotation removed per update.
    pub rotate_damping_factor: f32,
    /// Pan speed multiplier.
    pub pan_speed: f32,
    /// Fraction of the pending pan removed per update.
    pub pan_damping_factor: f32,
    /// Pixels panned per arrow key press.
    pub key_pan_speed: f32,
    /// Zoom speed multiplier.
    pub zoom_speed: f32,
    /// Fraction of the pending zoom removed per update.
    pub zoom_damping_factor: f32,
    /// Spin around the target while idle.
    pub auto_rotate: bool,
    /// Auto-rotate speed (2.0 = one turn per 30 seconds at 60 fps).
    pub auto_rotate_speed: f32,
    /// Minimum camera distance for perspective dolly.
    pub min_distance: f32,
    /// Maximum camera distance for perspective dolly.
    pub max_distance: Option<f32>,
    /// Minimum orthographic zoom.
    pub min_zoom: f32,
    /// Maximum orthographic zoom.
    pub max_zoom: Option<f32>,
    /// Lowest polar angle in radians (0 = looking down from above).
    pub min_polar_angle: f32,
    /// Highest polar angle in radians.
    pub max_polar_angle: f32,
    /// Azimuth bounds in radians, `None` for a full turn.
    pub azimuth_bounds: Option<(f32, f32)>,
}

/// Planet configuration: scattering constants and surface shading style.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlanetConfig {
    /// Surface radius in scene units.
    pub radius: f32,
    /// Sphere mesh segments around the equator.
    pub width_segments: u32,
    /// Sphere mesh segments from pole to pole.
    pub height_segments: u32,
    /// Altitude of average atmospheric density, as a fraction of the shell thickness.
    pub atmosphere_altitude_of_average_density: f32,
    /// Rayleigh scattering constant.
    pub atmosphere_kr: f32,
    /// Mie scattering constant.
    pub atmosphere_km: f32,
    /// Mie asymmetry factor.
    pub atmosphere_g: f32,
    /// Red, green and blue wavelengths in micrometers.
    pub wavelengths: [f32; 3],
    /// Integration steps per shaded vertex.
    pub scattering_samples: u32,
    /// Atmosphere fragments with a view-angle term below this are discarded.
    pub atmosphere_discard_threshold: f32,
    /// Absolute cloud shell radius. `None` places it at `radius * 1.0005`.
    pub cloud_altitude: Option<f32>,
    /// Project cloud shadows onto the ground.
    pub clouds_cast_shadows: bool,
    /// Specular power of oceans.
    pub shininess: f32,
    /// Scale applied to the bump map, in scene units.
    pub max_ground_altitude: f32,
    /// Tiling of the city light texture.
    pub city_scale: f32,
    /// Tiling of the suburbs mask.
    pub suburbs_scale: f32,
    /// Exponent applied to night-side emission.
    pub night_contrast: f32,
    /// Multiplier on night-side emission.
    pub emissive_map_intensity: f32,
    /// Tint of city lights.
    pub cities_color: [f32; 3],
    /// Albedo tint.
    pub color: [f32; 3],
    /// Emissive tint.
    pub emissive: [f32; 3],
}

/// Sun light configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SunConfig {
    /// World position of the directional light.
    pub position: [f32; 3],
    /// Light intensity.
    pub intensity: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Frames simulated by the headless demo.
    pub demo_frames: u32,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Terra".to_string(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 70.0,
            near: 0.005,
            far: 250.0,
            start_distance: 10.0,
        }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            enable_rotate: true,
            enable_zoom: true,
            enable_pan: true,
            enable_keys: true,
            rotate_speed: 0.005,
            rotate_damping_factor: 0.04,
            pan_speed: 0.04,
            pan_damping_factor: 0.04,
            key_pan_speed: 7.0,
            zoom_speed: 0.04,
            zoom_damping_factor: 0.04,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            min_distance: 0.0,
            max_distance: None,
            min_zoom: 0.0,
            max_zoom: None,
            min_polar_angle: 0.0,
            max_polar_angle: std::f32::consts::PI,
            azimuth_bounds: None,
        }
    }
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            radius: 5.0,
            width_segments: 150,
            height_segments: 150,
            atmosphere_altitude_of_average_density: 0.45,
            atmosphere_kr: 0.0025,
            atmosphere_km: 0.001,
            atmosphere_g: -0.84,
            wavelengths: [0.65, 0.57, 0.475],
            scattering_samples: 3,
            atmosphere_discard_threshold: 0.8,
            cloud_altitude: None,
            clouds_cast_shadows: true,
            shininess: 125.0,
            max_ground_altitude: 0.001,
            city_scale: 200.0,
            suburbs_scale: 80.0,
            night_contrast: 1.0,
            emissive_map_intensity: 1.0,
            // 0xffa54c
            cities_color: [1.0, 0.647, 0.298],
            color: [1.0, 1.0, 1.0],
            emissive: [1.0, 1.0, 1.0],
        }
    }
}

impl Default for SunConfig {
    fn default() -> Self {
        Self {
            position: [25.0, 0.0, 0.0],
            intensity: 15.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            demo_frames: 240,
        }
    }
}

/// Platform config directory for the viewer, e.g. `~/.config/terra`.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("terra")
}

// --- Load / Save / Reload ---

const CONFIG_FILE_NAME: &str = "config.ron";

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let config = read_config(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let write_error = |source| ConfigError::Write {
            path: config_dir.join(CONFIG_FILE_NAME),
            source,
        };
        std::fs::create_dir_all(config_dir).map_err(write_error)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(config_dir.join(CONFIG_FILE_NAME), serialized).map_err(write_error)
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = read_config(&config_dir.join(CONFIG_FILE_NAME))?;
        if &new_config == self {
            return Ok(None);
        }
        log::info!("Config reloaded with changes");
        Ok(Some(new_config))
    }
}
