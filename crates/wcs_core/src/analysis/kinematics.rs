//! # Kinematics
//!
//! Turns an ordered player series into per-step time deltas, displacements
//! and validated velocities, then buckets step distance into speed bands.
//!
//! ## Rules
//! 1. `dt = frame_diff / fps` within a period
//! 2. First sample of every period: `dt = 1 / fps`, zero displacement
//! 3. Velocities outside `[0, max_velocity]` (or non-finite) are discarded
//! 4. A discarded step still counts toward total distance, but reads as 0 m/s for
//!    the high-speed / sprint bands and 0 m/min in the intensity series

use crate::models::TrackingSample;

/// One step from the previous sample (same period) to this one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepKinematics {
    /// Elapsed seconds since the previous sample
    pub dt_s: f64,
    /// Euclidean displacement in meters
    pub step_distance_m: f64,
    /// Validated velocity in m/s, `None` when filtered as an artifact
    pub velocity_mps: Option<f64>,
}

impl StepKinematics {
    /// Intensity contribution in m/min; filtered steps count as standing still.
    pub fn m_per_min(&self) -> f64 {
        self.velocity_mps.unwrap_or(0.0) * 60.0
    }

    /// Distance counted toward the high-speed and sprint bands.
    pub fn banded_distance_m(&self, threshold_mps: f64) -> f64 {
        if self.velocity_mps.unwrap_or(0.0) > threshold_mps {
            self.step_distance_m
        } else {
            0.0
        }
    }
}

/// Accumulated distance per speed band.
///
/// Bands overlap: sprint distance is also high-speed distance.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DistanceBands {
    pub total_m: f64,
    pub high_speed_m: f64,
    pub sprint_m: f64,
}

/// Keep physically plausible velocities only.
#[inline]
pub fn sanitize_velocity(velocity_mps: f64, max_velocity_mps: f64) -> Option<f64> {
    if velocity_mps.is_finite() && (0.0..=max_velocity_mps).contains(&velocity_mps) {
        Some(velocity_mps)
    } else {
        None
    }
}

/// Compute step kinematics for samples already ordered by (period, frame).
pub fn step_kinematics(
    samples: &[&TrackingSample],
    fps: f64,
    max_velocity_mps: f64,
) -> Vec<StepKinematics> {
    let mut steps = Vec::with_capacity(samples.len());

    for (i, curr) in samples.iter().enumerate() {
        let prev = if i > 0 && samples[i - 1].period == curr.period {
            Some(samples[i - 1])
        } else {
            None
        };

        let (frame_diff, step_distance_m) = match prev {
            Some(prev) => {
                let dx = curr.x - prev.x;
                let dy = curr.y - prev.y;
                (
                    curr.frame as f64 - prev.frame as f64,
                    (dx * dx + dy * dy).sqrt(),
                )
            }
            None => (1.0, 0.0),
        };

        let dt_s = frame_diff / fps;
        let velocity_mps = sanitize_velocity(step_distance_m / dt_s, max_velocity_mps);

        steps.push(StepKinematics {
            dt_s,
            step_distance_m,
            velocity_mps,
        });
    }

    steps
}

/// Sum step distances into total / high-speed / sprint bands.
///
/// Thresholds are strict: a step counts as high speed when `v > hsr_mps`.
/// Every step adds its displacement to the total.
pub fn accumulate_bands(
    steps: &[StepKinematics],
    hsr_mps: f64,
    sprint_mps: f64,
) -> DistanceBands {
    steps.iter().fold(DistanceBands::default(), |mut bands, step| {
        bands.total_m += step.step_distance_m;
        bands.high_speed_m += step.banded_distance_m(hsr_mps);
        bands.sprint_m += step.banded_distance_m(sprint_mps);
        bands
    })
}

/// Per-sample intensity series in m/min.
pub fn intensity_series(steps: &[StepKinematics]) -> Vec<f64> {
    steps.iter().map(StepKinematics::m_per_min).collect()
}

/// Count of steps whose velocity was discarded.
pub fn filtered_count(steps: &[StepKinematics]) -> usize {
    steps.iter().filter(|s| s.velocity_mps.is_none()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Possession;
    use chrono::NaiveTime;

    fn make_sample(period: u8, frame: u64, x: f64, y: f64) -> TrackingSample {
        TrackingSample {
            match_id: 1,
            period,
            frame,
            timestamp: NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
            player_id: 7,
            team_name: "Home".to_string(),
            possession: Possession::In,
            x,
            y,
            phase: None,
        }
    }

    #[test]
    fn test_two_samples_one_second_apart() {
        let samples = vec![make_sample(1, 0, 0.0, 0.0), make_sample(1, 10, 10.0, 0.0)];
        let refs: Vec<&TrackingSample> = samples.iter().collect();

        let steps = step_kinematics(&refs, 10.0, 20.0);
        assert_eq!(steps.len(), 2);
        assert!((steps[0].dt_s - 0.1).abs() < 1e-12);
        assert_eq!(steps[0].velocity_mps, Some(0.0));
        assert!((steps[1].dt_s - 1.0).abs() < 1e-12);
        assert!((steps[1].velocity_mps.unwrap() - 10.0).abs() < 1e-9);

        let bands = accumulate_bands(&steps, 5.28, 6.39);
        assert!((bands.total_m - 10.0).abs() < 1e-9);
        assert!((bands.high_speed_m - 10.0).abs() < 1e-9);
        assert!((bands.sprint_m - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_period_boundary_resets_displacement() {
        // Large jump across the half-time boundary must not count
        let samples = vec![
            make_sample(1, 0, 0.0, 0.0),
            make_sample(1, 1, 0.5, 0.0),
            make_sample(2, 2, 50.0, 0.0),
            make_sample(2, 3, 50.5, 0.0),
        ];
        let refs: Vec<&TrackingSample> = samples.iter().collect();

        let steps = step_kinematics(&refs, 10.0, 20.0);
        assert_eq!(steps[2].step_distance_m, 0.0);
        assert_eq!(steps[2].velocity_mps, Some(0.0));

        let bands = accumulate_bands(&steps, 5.28, 6.39);
        assert!((bands.total_m - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_artifact_velocity_kept_in_total_only() {
        // 3 m in 0.1 s = 30 m/s
        let samples = vec![make_sample(1, 0, 0.0, 0.0), make_sample(1, 1, 3.0, 0.0)];
        let refs: Vec<&TrackingSample> = samples.iter().collect();

        let steps = step_kinematics(&refs, 10.0, 20.0);
        assert_eq!(steps[1].velocity_mps, None);
        assert_eq!(steps[1].m_per_min(), 0.0);
        assert_eq!(filtered_count(&steps), 1);

        let bands = accumulate_bands(&steps, 5.28, 6.39);
        assert!((bands.total_m - 3.0).abs() < 1e-9);
        assert_eq!(bands.high_speed_m, 0.0);
        assert_eq!(bands.sprint_m, 0.0);
    }

    #[test]
    fn test_spike_after_slow_step() {
        // 5 m/s, then a 30 m/s jump: total 3.5 m, nothing banded
        let samples = vec![
            make_sample(1, 0, 0.0, 0.0),
            make_sample(1, 1, 0.5, 0.0),
            make_sample(1, 2, 3.5, 0.0),
        ];
        let refs: Vec<&TrackingSample> = samples.iter().collect();

        let bands = accumulate_bands(&step_kinematics(&refs, 10.0, 20.0), 5.28, 6.39);
        assert!((bands.total_m - 3.5).abs() < 1e-9);
        assert_eq!(bands.high_speed_m, 0.0);
        assert_eq!(bands.sprint_m, 0.0);
    }

    #[test]
    fn test_duplicate_frame_is_filtered() {
        let samples = vec![make_sample(1, 5, 0.0, 0.0), make_sample(1, 5, 1.0, 0.0)];
        let refs: Vec<&TrackingSample> = samples.iter().collect();

        let steps = step_kinematics(&refs, 10.0, 20.0);
        assert_eq!(steps[1].velocity_mps, None);
    }

    #[test]
    fn test_frame_gap_widens_dt() {
        // 2 m over a 4-frame gap at 10 Hz = 5 m/s
        let samples = vec![make_sample(1, 0, 0.0, 0.0), make_sample(1, 4, 0.0, 2.0)];
        let refs: Vec<&TrackingSample> = samples.iter().collect();

        let steps = step_kinematics(&refs, 10.0, 20.0);
        assert!((steps[1].velocity_mps.unwrap() - 5.0).abs() < 1e-9);
        assert!((steps[1].m_per_min() - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_sanitize_velocity_bounds() {
        assert_eq!(sanitize_velocity(20.0, 20.0), Some(20.0));
        assert_eq!(sanitize_velocity(20.01, 20.0), None);
        assert_eq!(sanitize_velocity(-0.1, 20.0), None);
        assert_eq!(sanitize_velocity(f64::INFINITY, 20.0), None);
        assert_eq!(sanitize_velocity(f64::NAN, 20.0), None);
    }
}
