// SPDX-License-Identifier: GPL-3.0-only
//! Persisted settings
//!
//! Stored as pretty-printed JSON in `<config dir>/LiteBright/settings.json`
//! (`%APPDATA%` on Windows). A missing or unreadable file yields defaults so
//! the application always starts.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hotkeys::HotkeyBinding;

pub const APP_DIR: &str = "LiteBright";
pub const FILE_NAME: &str = "settings.json";

pub const DEFAULT_BRIGHTNESS_STEP: i32 = 10;
pub const MIN_BRIGHTNESS_STEP: i32 = 1;
pub const MAX_BRIGHTNESS_STEP: i32 = 10;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No configuration directory on this system")]
    NoConfigDir,

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Carried for the startup-registration collaborator
    pub start_with_system: bool,
    /// Carried for the UI collaborator
    pub show_contrast_control: bool,
    /// Percent per hotkey press or wheel notch
    pub brightness_step: i32,
    pub hotkeys: Vec<HotkeyBinding>,
    /// Last brightness per output device name
    pub last_brightness: HashMap<String, u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_with_system: true,
            show_contrast_control: false,
            brightness_step: DEFAULT_BRIGHTNESS_STEP,
            hotkeys: Vec::new(),
            last_brightness: HashMap::new(),
        }
    }
}

impl Config {
    /// `<config dir>/LiteBright/settings.json`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(FILE_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load from the default location
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load settings from `path`
    ///
    /// A missing file gives defaults. So does a file that isn't valid
    /// settings JSON, with a warning. Only I/O failures are errors.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("No settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        match serde_json::from_str::<Self>(&text) {
            Ok(config) => Ok(config.normalized()),
            Err(err) => {
                warn!("Ignoring corrupt settings file {}: {}", path.display(), err);
                Ok(Self::default())
            }
        }
    }

    /// Save to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::default_path()?)
    }

    /// Write settings to `path`, creating its directory
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Clamp values a hand-edited file may have pushed out of range
    pub fn normalized(mut self) -> Self {
        self.brightness_step = self
            .brightness_step
            .clamp(MIN_BRIGHTNESS_STEP, MAX_BRIGHTNESS_STEP);
        self
    }
}
