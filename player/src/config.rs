//! Configuration management (<config dir>/config.toml)

use anyhow::{Context, Result, bail};
use cartvox_core::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub input: InputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_volume")]
    pub master_volume: f32,
}

/// Terminal keyboard settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Ticks a key counts as held after one press event.
    ///
    /// Terminals report presses and auto-repeats, never releases, so held
    /// buttons are emulated.
    #[serde(default = "default_hold_ticks")]
    pub hold_ticks: u32,
}

fn default_volume() -> f32 {
    0.8
}
fn default_hold_ticks() -> u32 {
    8
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            master_volume: default_volume(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            hold_ticks: default_hold_ticks(),
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("io", "cartvox", "cartvox")
}

pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Load the config from `path`, or from the user config directory
///
/// A missing file in the config directory means defaults; a missing
/// explicit path is an error.
pub fn load(path: Option<&Path>) -> Result<PlayerConfig> {
    let path = match path {
        Some(path) => {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            path.to_path_buf()
        }
        None => match config_dir().map(|dir| dir.join(CONFIG_FILE)) {
            Some(path) if path.exists() => path,
            _ => {
                tracing::debug!("no config file, using defaults");
                return Ok(PlayerConfig::default());
            }
        },
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config = parse(&content).with_context(|| format!("Invalid config: {}", path.display()))?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(config)
}

pub fn parse(content: &str) -> Result<PlayerConfig> {
    let config: PlayerConfig = toml::from_str(content)?;
    config.engine.validate()?;
    if !(0.0..=1.0).contains(&config.audio.master_volume) {
        bail!(
            "audio.master_volume must be between 0.0 and 1.0, got {}",
            config.audio.master_volume
        );
    }
    Ok(config)
}
