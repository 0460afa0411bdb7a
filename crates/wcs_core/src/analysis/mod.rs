//! # Analysis Module
//!
//! Worst-case-scenario (WCS) running intensity and its event context.
//!
//! ## Submodules
//!
//! - `kinematics` - Step velocity, artifact filter, distance bands
//! - `rolling` - Trailing-window mean with running peak
//! - `peak_intensity` - Per-player WCS peaks and distances
//! - `correlator` - Nearest-event merge for each peak
//! - `event_summary` - Event types preceding WCS peaks, by team
//! - `team_summary` - Team mean / min / max per window
//! - `phases` - Phase-of-play labels for tracking samples
//! - `trajectory` - Movement sequence inside a WCS window

pub mod correlator;
pub mod event_summary;
pub mod kinematics;
pub mod peak_intensity;
pub mod phases;
pub mod rolling;
pub mod team_summary;
pub mod trajectory;

pub use correlator::{
    merge_peaks_with_events, validate_event_columns, validate_peak_columns, CorrelateOptions,
    MergedPeakEvent, MergedPeakTable, EVENT_FRAME_COLUMN,
};
pub use event_summary::{summarize_events_by_team, TeamEventSummaryRow, NO_SUBTYPE_LABEL};
pub use kinematics::{
    accumulate_bands, intensity_series, sanitize_velocity, step_kinematics, DistanceBands,
    StepKinematics,
};
pub use peak_intensity::{compute_group_peaks, compute_peak_intensities};
pub use phases::{assign_phases, PhaseLookup};
pub use rolling::{trailing_mean_peak, RollingPeak, TrailingPeakTracker};
pub use team_summary::{
    summarize_team_peaks, DescriptiveStats, TeamPeakSummary, TeamWindowSummary, NOT_AVAILABLE,
};
pub use trajectory::{extract_wcs_trajectory, Trajectory, TrajectoryPoint};
