//! Designer settings: scene scale, drag radius, camera, orbit and palette.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```
//! use habitat_logic::config::DesignerConfig;
//!
//! let config = DesignerConfig::from_json_str(r#"{ "orbit": { "enabled": false } }"#).unwrap();
//! assert!(!config.orbit.enabled);
//! assert_eq!(config.containment_radius, 11.0);
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::placement::{PerspectiveCamera, DEFAULT_CONTAINMENT_RADIUS};
use crate::scene::{AreaPalette, Rgb, SceneMode, SceneSettings, DEFAULT_HABITAT_SCALE};
use crate::view::OrbitCamera;

/// Default size change per resize button press (meters).
pub const DEFAULT_RESIZE_STEP: f32 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Initial eye position, looking at the origin.
    pub position: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            position: [15.0, 10.0, 15.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    pub radius: f32,
    pub height: f32,
    /// Radians per second.
    pub angular_speed: f32,
    pub enabled: bool,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            radius: 20.0,
            height: 10.0,
            angular_speed: 0.1,
            enabled: true,
        }
    }
}

/// Colour overrides merged over the built-in area palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub colors: BTreeMap<String, Rgb>,
    pub fallback: Rgb,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            colors: BTreeMap::new(),
            fallback: AreaPalette::default().fallback,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignerConfig {
    /// Multiplier on habitat height/width in the functional-area view.
    pub habitat_scale: f32,
    /// Drag acceptance radius around the origin.
    pub containment_radius: f32,
    pub resize_step: f32,
    pub camera: CameraConfig,
    pub orbit: OrbitConfig,
    pub palette: PaletteConfig,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            habitat_scale: DEFAULT_HABITAT_SCALE,
            containment_radius: DEFAULT_CONTAINMENT_RADIUS,
            resize_step: DEFAULT_RESIZE_STEP,
            camera: CameraConfig::default(),
            orbit: OrbitConfig::default(),
            palette: PaletteConfig::default(),
        }
    }
}

impl DesignerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigLoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&text)?;
        log::info!("loaded designer config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Load the file named by `--config <path>` on the command line, or
    /// fall back to defaults when the flag is absent.
    pub fn from_args() -> Result<Self, ConfigLoadError> {
        let args: Vec<String> = std::env::args().collect();
        match config_path(&args) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigLoadError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Built-in palette with this config's overrides applied.
    pub fn palette(&self) -> AreaPalette {
        let mut palette = AreaPalette::default().merged(&self.palette.colors);
        palette.fallback = self.palette.fallback;
        palette
    }

    pub fn scene_settings(&self, mode: SceneMode) -> SceneSettings {
        SceneSettings {
            mode,
            habitat_scale: self.habitat_scale,
        }
    }

    /// Initial camera for a viewport of the given aspect ratio.
    pub fn camera(&self, aspect: f32) -> PerspectiveCamera {
        PerspectiveCamera {
            position: Vec3::from_array(self.camera.position),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_degrees: self.camera.fov_y_degrees,
            aspect,
            near: self.camera.near,
            far: self.camera.far,
        }
    }

    pub fn orbit_camera(&self) -> OrbitCamera {
        OrbitCamera {
            radius: self.orbit.radius,
            height: self.orbit.height,
            angular_speed: self.orbit.angular_speed,
            angle: 0.0,
            enabled: self.orbit.enabled,
        }
    }
}

/// Value following the first `--config`/`-c` flag.
pub fn config_path(args: &[String]) -> Option<PathBuf> {
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" if i + 1 < args.len() => return Some(PathBuf::from(&args[i + 1])),
            _ => i += 1,
        }
    }
    None
}

/// Errors that can occur while loading a config or design file
#[derive(Debug)]
pub enum ConfigLoadError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl From<std::io::Error> for ConfigLoadError {
    fn from(e: std::io::Error) -> Self {
        ConfigLoadError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigLoadError {
    fn from(e: serde_json::Error) -> Self {
        ConfigLoadError::Json(e)
    }
}

impl std::fmt::Display for ConfigLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigLoadError::Io(e) => write!(f, "IO error: {}", e),
            ConfigLoadError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for ConfigLoadError {}
