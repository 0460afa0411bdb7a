//! # WCS Trajectory
//!
//! Movement sequence of one player during their peak window, with
//! instantaneous speed per point. This is the data a pitch animation
//! renders; filtered speeds show as standing still.

use serde::{Deserialize, Serialize};

use chrono::NaiveTime;

use super::kinematics::step_kinematics;
use crate::config::WcsConfig;
use crate::error::{Result, WcsError};
use crate::models::{PeakTable, TrackingSample};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub period: u8,
    pub frame: u64,
    pub timestamp: NaiveTime,
    pub x: f64,
    pub y: f64,
    pub speed_mps: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub match_id: u64,
    pub player_id: u64,
    pub window_seconds: u32,
    pub frame_start: u64,
    pub frame_end: u64,
    pub points: Vec<TrajectoryPoint>,
    /// Speed range, for colour scaling
    pub min_speed_mps: f64,
    pub max_speed_mps: f64,
}

/// Extract the player's movement during their `window_seconds` WCS window.
///
/// When several peak rows exist for the player (e.g. one per team), the
/// highest peak wins. The frame range is inclusive at both ends.
pub fn extract_wcs_trajectory(
    samples: &[TrackingSample],
    peaks: &PeakTable,
    match_id: u64,
    player_id: u64,
    window_seconds: u32,
    config: &WcsConfig,
) -> Result<Trajectory> {
    config.validate()?;

    let mut best: Option<(f64, u64)> = None;
    for row in peaks
        .rows
        .iter()
        .filter(|r| r.match_id == match_id && r.player_id == player_id)
    {
        let Some(peak) = row.peak(window_seconds) else {
            continue;
        };
        if best.map_or(true, |(value, _)| peak.peak_m_per_min > value) {
            best = Some((peak.peak_m_per_min, peak.frame_start));
        }
    }
    let (_, frame_start) = best.ok_or(WcsError::NoPeakRow {
        match_id,
        player_id,
    })?;
    let frame_end = frame_start + (f64::from(window_seconds) * config.fps) as u64;

    let mut window: Vec<&TrackingSample> = samples
        .iter()
        .filter(|s| {
            s.match_id == match_id
                && s.player_id == player_id
                && (frame_start..=frame_end).contains(&s.frame)
        })
        .collect();
    if window.is_empty() {
        return Err(WcsError::EmptyTrajectory {
            match_id,
            player_id,
            window_seconds,
        });
    }
    window.sort_by_key(|s| (s.period, s.frame));

    let steps = step_kinematics(&window, config.fps, config.max_velocity_mps);
    let points: Vec<TrajectoryPoint> = window
        .iter()
        .zip(&steps)
        .map(|(s, step)| TrajectoryPoint {
            period: s.period,
            frame: s.frame,
            timestamp: s.timestamp,
            x: s.x,
            y: s.y,
            speed_mps: step.velocity_mps.unwrap_or(0.0),
        })
        .collect();

    let min_speed_mps = points.iter().map(|p| p.speed_mps).fold(f64::INFINITY, f64::min);
    let max_speed_mps = points.iter().map(|p| p.speed_mps).fold(0.0, f64::max);

    Ok(Trajectory {
        match_id,
        player_id,
        window_seconds,
        frame_start,
        frame_end,
        points,
        min_speed_mps,
        max_speed_mps,
    })
}
