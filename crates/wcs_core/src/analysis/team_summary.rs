//! # Team WCS Summary
//!
//! Per-team descriptive statistics of peak intensity for every window.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::PeakTable;

/// Marker shown when a team has no values for a window.
pub const NOT_AVAILABLE: &str = "N/A";

/// Mean / min / max over a non-empty set of values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl DescriptiveStats {
    /// `None` when no finite value is present.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for v in values.into_iter().filter(|v| v.is_finite()) {
            count += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }

        (count > 0).then(|| Self {
            count,
            mean: sum / count as f64,
            min,
            max,
        })
    }
}

/// Statistics of one window for one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamWindowSummary {
    pub window_seconds: u32,
    /// `None` means "not available"
    pub stats: Option<DescriptiveStats>,
}

impl fmt::Display for TeamWindowSummary {
    /// `mean (min – max)` with one decimal, or `N/A`.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.stats {
            Some(s) => write!(f, "{:.1} ({:.1} – {:.1})", s.mean, s.min, s.max),
            None => write!(f, "{}", NOT_AVAILABLE),
        }
    }
}

/// One row per team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamPeakSummary {
    pub team_name: String,
    pub windows: Vec<TeamWindowSummary>,
}

impl TeamPeakSummary {
    pub fn window(&self, window_seconds: u32) -> Option<&TeamWindowSummary> {
        self.windows
            .iter()
            .find(|w| w.window_seconds == window_seconds)
    }
}

/// Collapse peak rows into per-team statistics, sorted by team name.
pub fn summarize_team_peaks(table: &PeakTable) -> Vec<TeamPeakSummary> {
    let mut by_team: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, row) in table.rows.iter().enumerate() {
        by_team.entry(row.team_name.as_str()).or_default().push(i);
    }

    by_team
        .into_iter()
        .map(|(team, rows)| TeamPeakSummary {
            team_name: team.to_string(),
            windows: table
                .windows_seconds
                .iter()
                .map(|&w| TeamWindowSummary {
                    window_seconds: w,
                    stats: DescriptiveStats::from_values(
                        rows.iter().filter_map(|&i| table.rows[i].peak_value(w)),
                    ),
                })
                .collect(),
        })
        .collect()
}
