//! # Phase-of-Play Assignment
//!
//! Labels every tracking sample with the phase of play active on its frame,
//! seen from the sample's own team (in or out of possession).

use tracing::debug;

use crate::models::{PhaseInterval, Possession, TrackingSample};

/// Sorted phase intervals with binary-search lookup.
///
/// Intervals are expected not to overlap.
#[derive(Debug, Clone, Default)]
pub struct PhaseLookup {
    intervals: Vec<PhaseInterval>,
}

impl PhaseLookup {
    pub fn new(intervals: &[PhaseInterval]) -> Self {
        let mut intervals = intervals.to_vec();
        intervals.sort_by_key(|p| (p.frame_start, p.frame_end));
        Self { intervals }
    }

    /// Interval containing `frame`, if any.
    pub fn interval_at(&self, frame: u64) -> Option<&PhaseInterval> {
        let idx = self.intervals.partition_point(|p| p.frame_start <= frame);
        let candidate = self.intervals.get(idx.checked_sub(1)?)?;
        candidate.contains(frame).then_some(candidate)
    }

    pub fn phase_for(&self, frame: u64, possession: Possession) -> Option<&str> {
        self.interval_at(frame)?.label_for(possession)
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

/// Return a copy of `samples` with `phase` filled from `intervals`.
///
/// Frames outside every interval get `None`.
pub fn assign_phases(
    samples: &[TrackingSample],
    intervals: &[PhaseInterval],
) -> Vec<TrackingSample> {
    let lookup = PhaseLookup::new(intervals);
    let mut unassigned = 0usize;

    let labelled: Vec<TrackingSample> = samples
        .iter()
        .map(|sample| {
            let phase = lookup
                .phase_for(sample.frame, sample.possession)
                .map(str::to_string);
            if phase.is_none() {
                unassigned += 1;
            }
            TrackingSample {
                phase,
                ..sample.clone()
            }
        })
        .collect();

    debug!(
        samples = samples.len(),
        intervals = lookup.len(),
        unassigned,
        "assigned phases of play"
    );

    labelled
}
