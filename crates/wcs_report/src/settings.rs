//! Engine settings - optional YAML file, then command-line overrides.
//!
//! ```yaml
//! # wcs.yaml - only the named keys change
//! fps: 25.0
//! windows_seconds: [30, 60]
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use wcs_core::WcsConfig;

/// Values given on the command line win over the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub fps: Option<f64>,
    pub hsr_mps: Option<f64>,
    pub sprint_mps: Option<f64>,
    pub max_velocity_mps: Option<f64>,
    /// Empty keeps the configured windows
    pub windows_seconds: Vec<u32>,
}

impl ConfigOverrides {
    pub fn apply(&self, mut config: WcsConfig) -> WcsConfig {
        if let Some(fps) = self.fps {
            config.fps = fps;
        }
        if let Some(hsr) = self.hsr_mps {
            config.hsr_mps = hsr;
        }
        if let Some(spr) = self.sprint_mps {
            config.sprint_mps = spr;
        }
        if let Some(max_v) = self.max_velocity_mps {
            config.max_velocity_mps = max_v;
        }
        if !self.windows_seconds.is_empty() {
            config.windows_seconds = self.windows_seconds.clone();
        }
        config
    }
}

/// Read a YAML config file. Missing keys keep their defaults.
pub fn read_config_file(path: &Path) -> Result<WcsConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    if text.trim().is_empty() {
        return Ok(WcsConfig::default());
    }
    serde_yaml::from_str(&text)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Defaults ← optional file ← overrides, then validated.
pub fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<WcsConfig> {
    let base = match path {
        Some(path) => read_config_file(path)?,
        None => WcsConfig::skillcorner(),
    };
    let config = overrides.apply(base);
    config.validate().context("Invalid engine configuration")?;
    Ok(config)
}
