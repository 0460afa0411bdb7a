//! # Rolling Peak Tracker
//!
//! Trailing-window mean with a running maximum. Partial windows at the start
//! of a series are averaged over the samples available so far, so a window
//! longer than the series still yields a peak.

use std::collections::VecDeque;

/// Location and value of the highest trailing-window mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollingPeak {
    /// Peak mean
    pub value: f64,
    /// Index of the last sample in the peak window
    pub end_index: usize,
    /// Index of the first sample in the peak window, `end - window + 1` clamped to 0
    pub start_index: usize,
}

/// Streaming trailing-mean tracker.
///
/// Ties keep the earliest window.
#[derive(Debug, Clone)]
pub struct TrailingPeakTracker {
    window: usize,
    buffer: VecDeque<f64>,
    sum: f64,
    pushed: usize,
    best: Option<RollingPeak>,
}

impl TrailingPeakTracker {
    /// `window` is clamped to at least one sample.
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            buffer: VecDeque::with_capacity(window),
            sum: 0.0,
            pushed: 0,
            best: None,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Add the next sample and return the current trailing mean.
    pub fn push(&mut self, value: f64) -> f64 {
        if self.buffer.len() == self.window {
            if let Some(old) = self.buffer.pop_front() {
                self.sum -= old;
            }
        }
        self.buffer.push_back(value);
        self.sum += value;

        // Recompute exactly at every refill boundary to bound float drift
        if self.pushed % self.window == self.window - 1 {
            self.sum = self.buffer.iter().sum();
        }

        let mean = self.sum / self.buffer.len() as f64;
        let end_index = self.pushed;
        self.pushed += 1;

        let better = match self.best {
            None => true,
            Some(best) => mean > best.value,
        };
        if better {
            self.best = Some(RollingPeak {
                value: mean,
                end_index,
                start_index: (end_index + 1).saturating_sub(self.window),
            });
        }

        mean
    }

    pub fn peak(&self) -> Option<RollingPeak> {
        self.best
    }
}

/// Highest trailing-window mean over a whole series.
///
/// Returns `None` for an empty series.
pub fn trailing_mean_peak(values: &[f64], window: usize) -> Option<RollingPeak> {
    let mut tracker = TrailingPeakTracker::new(window);
    for &v in values {
        tracker.push(v);
    }
    tracker.peak()
}
