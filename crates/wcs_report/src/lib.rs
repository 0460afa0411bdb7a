//! WCS Report Library
//!
//! Tracking / event / phase CSV exports → wcs_core engine → CSV or JSON
//! report tables.

pub mod loader;
pub mod settings;
pub mod writer;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use wcs_core::WcsConfig;

pub use loader::{
    load_events_csv, load_phases_csv, load_tracking_csv, parse_cell, parse_match_clock, ParseStats,
};
pub use settings::{load_config, read_config_file, ConfigOverrides};
pub use writer::{OutputFormat, ReportTable};

/// Record of one report run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Tool version (wcs_report crate version)
    pub tool_version: String,
    /// Generation time (RFC3339)
    pub created_at: String,
    /// Effective engine configuration
    pub config: WcsConfig,
    pub tracking_rows_parsed: u32,
    pub tracking_rows_failed: u32,
    /// Rows in the written table
    pub output_rows: usize,
}

impl RunMetadata {
    pub fn new(config: &WcsConfig, stats: &ParseStats, output_rows: usize) -> Self {
        Self {
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            config: config.clone(),
            tracking_rows_parsed: stats.parsed,
            tracking_rows_failed: stats.failed,
            output_rows,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize metadata")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write metadata file: {}", path.display()))?;
        Ok(())
    }
}
