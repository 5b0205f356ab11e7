//! Session configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use skyline_camera::CameraConfig;

use crate::error::ConfigError;
use crate::input::KeyBindings;

/// Per-session settings that are not part of a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Camera rig parameters. The level decides the camera mode.
    pub camera: CameraConfig,

    pub bindings: KeyBindings,

    /// Ticks between reaching the goal and invoking the completion callback.
    pub completion_delay_ticks: u32,

    /// Emit a status line at debug level every N ticks. Zero disables it.
    pub log_every_n_ticks: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            bindings: KeyBindings::default(),
            completion_delay_ticks: 120,
            log_every_n_ticks: 0,
        }
    }
}

impl SessionConfig {
    /// Parse and validate TOML text. Missing fields take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject camera values the rig cannot place a camera with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.camera.validate().map_err(ConfigError::Invalid)
    }

    /// Load from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}
