//! # Engine Configuration
//!
//! All tuning constants for the peak-intensity engine live here.
//!
//! ## Usage
//! ```rust
//! use wcs_core::config::WcsConfig;
//!
//! let config = WcsConfig::default();
//! let short = WcsConfig::default().with_windows(vec![30, 60]);
//! assert!(short.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, WcsError};

/// Default WCS window lengths in seconds.
pub const DEFAULT_WINDOWS_SECONDS: [u32; 5] = [60, 120, 180, 240, 300];

/// High-speed running threshold: 5.28 m/s (19.0 km/h)
pub const DEFAULT_HSR_MPS: f64 = 5.28;

/// Sprint threshold: 6.39 m/s (23.0 km/h)
pub const DEFAULT_SPRINT_MPS: f64 = 6.39;

/// SkillCorner broadcast tracking sample rate.
pub const DEFAULT_FPS: f64 = 10.0;

/// Anything faster than this is a tracking artifact, not a human.
pub const DEFAULT_MAX_VELOCITY_MPS: f64 = 20.0;

/// Peak-intensity engine parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WcsConfig {
    /// Rolling window lengths in seconds (default: 60, 120, 180, 240, 300)
    pub windows_seconds: Vec<u32>,
    /// High-speed running threshold in m/s (default: 5.28)
    pub hsr_mps: f64,
    /// Sprint threshold in m/s (default: 6.39)
    pub sprint_mps: f64,
    /// Tracking sample rate in Hz (default: 10.0)
    pub fps: f64,
    /// Velocities above this are discarded as artifacts (default: 20.0)
    pub max_velocity_mps: f64,
}

impl Default for WcsConfig {
    fn default() -> Self {
        Self {
            windows_seconds: DEFAULT_WINDOWS_SECONDS.to_vec(),
            hsr_mps: DEFAULT_HSR_MPS,
            sprint_mps: DEFAULT_SPRINT_MPS,
            fps: DEFAULT_FPS,
            max_velocity_mps: DEFAULT_MAX_VELOCITY_MPS,
        }
    }
}

impl WcsConfig {
    /// SkillCorner open-data settings (10 Hz, RLFC speed bands).
    pub fn skillcorner() -> Self {
        Self::default()
    }

    pub fn with_windows(mut self, windows_seconds: Vec<u32>) -> Self {
        self.windows_seconds = windows_seconds;
        self
    }

    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    pub fn with_thresholds(mut self, hsr_mps: f64, sprint_mps: f64) -> Self {
        self.hsr_mps = hsr_mps;
        self.sprint_mps = sprint_mps;
        self
    }

    /// Number of samples spanned by a window of `window_seconds`.
    ///
    /// Halves round to even. Zero means the window is shorter than one
    /// frame and is skipped.
    pub fn window_samples(&self, window_seconds: u32) -> usize {
        (f64::from(window_seconds) * self.fps).round_ties_even() as usize
    }

    /// Windows that span at least one sample, in configured order, without duplicates.
    pub fn effective_windows(&self) -> Vec<u32> {
        let mut windows = Vec::with_capacity(self.windows_seconds.len());
        for &w in &self.windows_seconds {
            if self.window_samples(w) >= 1 && !windows.contains(&w) {
                windows.push(w);
            }
        }
        windows
    }

    pub fn validate(&self) -> Result<()> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(WcsError::InvalidConfig(format!(
                "fps must be a positive number, got {}",
                self.fps
            )));
        }
        if !self.hsr_mps.is_finite() || self.hsr_mps < 0.0 {
            return Err(WcsError::InvalidConfig(format!(
                "hsr threshold must be non-negative, got {}",
                self.hsr_mps
            )));
        }
        if !self.sprint_mps.is_finite() || self.sprint_mps < self.hsr_mps {
            return Err(WcsError::InvalidConfig(format!(
                "sprint threshold ({}) must not be below the hsr threshold ({})",
                self.sprint_mps, self.hsr_mps
            )));
        }
        if !self.max_velocity_mps.is_finite() || self.max_velocity_mps <= 0.0 {
            return Err(WcsError::InvalidConfig(format!(
                "max velocity must be positive, got {}",
                self.max_velocity_mps
            )));
        }
        if self.windows_seconds.is_empty() {
            return Err(WcsError::InvalidConfig(
                "at least one window length is required".to_string(),
            ));
        }
        Ok(())
    }
}
