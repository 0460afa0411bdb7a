//! # Peak Intensity Engine
//!
//! Worst-case-scenario (WCS) running intensity per player series.
//!
//! ## Algorithm
//! 1. Group samples by (match, player, team) and order each group by (period, frame)
//! 2. Derive step kinematics and distance bands (see `kinematics`)
//! 3. For each window W: trailing mean of m/min over `round(W * fps)` samples
//! 4. Report the highest mean and the frame/time where that window *starts*
//!
//! Groups are independent and are processed in parallel.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, info};

use super::kinematics::{accumulate_bands, filtered_count, intensity_series, step_kinematics};
use super::rolling::trailing_mean_peak;
use crate::config::WcsConfig;
use crate::error::Result;
use crate::models::{GroupKey, PeakIntensityRow, PeakTable, TrackingSample, WindowPeak};

/// Compute one peak row per (match, player, team) group.
///
/// Rows are ordered by group key. Windows shorter than one sample are skipped.
pub fn compute_peak_intensities(
    samples: &[TrackingSample],
    config: &WcsConfig,
) -> Result<PeakTable> {
    config.validate()?;
    let windows = config.effective_windows();

    let mut groups: BTreeMap<GroupKey, Vec<&TrackingSample>> = BTreeMap::new();
    for sample in samples {
        groups.entry(sample.group_key()).or_default().push(sample);
    }
    let groups: Vec<(GroupKey, Vec<&TrackingSample>)> = groups.into_iter().collect();
    let group_count = groups.len();

    let rows: Vec<PeakIntensityRow> = groups
        .into_par_iter()
        .filter_map(|(key, mut group)| {
            group.sort_by_key(|s| (s.period, s.frame));
            compute_group_peaks(key, &group, &windows, config)
        })
        .collect();

    info!(
        samples = samples.len(),
        groups = group_count,
        rows = rows.len(),
        windows = ?windows,
        "computed peak intensities"
    );

    Ok(PeakTable::new(windows, rows))
}

/// Peak row for one ordered group; `None` for an empty group.
pub fn compute_group_peaks(
    key: GroupKey,
    samples: &[&TrackingSample],
    windows_seconds: &[u32],
    config: &WcsConfig,
) -> Option<PeakIntensityRow> {
    if samples.is_empty() {
        return None;
    }

    let steps = step_kinematics(samples, config.fps, config.max_velocity_mps);
    let bands = accumulate_bands(&steps, config.hsr_mps, config.sprint_mps);
    let m_per_min = intensity_series(&steps);

    let mut peaks = Vec::with_capacity(windows_seconds.len());
    for &window_seconds in windows_seconds {
        let window_samples = config.window_samples(window_seconds);
        if window_samples < 1 {
            continue;
        }
        let Some(peak) = trailing_mean_peak(&m_per_min, window_samples) else {
            continue;
        };
        let start = samples[peak.start_index];
        peaks.push(WindowPeak {
            window_seconds,
            window_samples,
            peak_m_per_min: peak.value,
            frame_start: start.frame,
            time_start: start.timestamp,
            frame_end: samples[peak.end_index].frame,
        });
    }

    debug!(
        match_id = key.match_id,
        player_id = key.player_id,
        samples = samples.len(),
        filtered = filtered_count(&steps),
        total_m = bands.total_m,
        "processed player series"
    );

    Some(PeakIntensityRow {
        match_id: key.match_id,
        player_id: key.player_id,
        team_name: key.team_name,
        total_distance_m: bands.total_m,
        high_speed_distance_m: bands.high_speed_m,
        sprint_distance_m: bands.sprint_m,
        peaks,
    })
}
