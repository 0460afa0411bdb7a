//! # wcs_core - Worst-Case-Scenario Running Intensity Engine
//!
//! Computes peak running intensities (m/min over rolling windows) from
//! football tracking data and correlates those peaks with game events.
//!
//! ## Features
//! - Validated step velocities with artifact filtering
//! - Total / high-speed / sprint distance bands
//! - Rolling-window peaks with window-start attribution
//! - Nearest-event matching under an optional frame tolerance
//! - Team-level event and intensity summaries
//!
//! All computations are pure: inputs are borrowed, new tables are returned.

pub mod analysis;
pub mod config;
pub mod error;
pub mod models;

pub use analysis::{
    assign_phases, compute_peak_intensities, extract_wcs_trajectory, merge_peaks_with_events,
    summarize_events_by_team, summarize_team_peaks, CorrelateOptions, MergedPeakEvent,
    MergedPeakTable, TeamEventSummaryRow, TeamPeakSummary, Trajectory,
};
pub use config::WcsConfig;
pub use error::{Result, WcsError};
pub use models::{
    EventRecord, EventTable, PeakIntensityRow, PeakTable, PhaseInterval, Possession,
    TrackingSample, WindowPeak,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
