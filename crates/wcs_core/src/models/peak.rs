use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Tabular column names shared with downstream consumers.
pub mod columns {
    pub const MATCH_ID: &str = "match_id";
    pub const PLAYER_ID: &str = "player_id";
    pub const TEAM_NAME: &str = "team_name";
    pub const TOTAL_DISTANCE: &str = "Total Distance (m)";
    pub const HIGH_SPEED_DISTANCE: &str = "High Speed Running Distance (m)";
    pub const SPRINT_DISTANCE: &str = "Sprint Distance (m)";
    /// Renamed frame-start column on merged rows
    pub const FRAME_PEAK_START: &str = "frame_peak_start";
    /// Renamed time-start column on merged rows
    pub const TIME_PEAK_START: &str = "time_peak_start";

    pub fn peak(window_seconds: u32) -> String {
        format!("Peak m/min {}s", window_seconds)
    }

    pub fn frame_start(window_seconds: u32) -> String {
        format!("Peak m/min {}s_FrameStart", window_seconds)
    }

    pub fn time_start(window_seconds: u32) -> String {
        format!("Peak m/min {}s_TimeStart", window_seconds)
    }
}

/// Highest trailing-window mean intensity for one window length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowPeak {
    pub window_seconds: u32,
    /// Samples spanned by a full window
    pub window_samples: usize,
    /// Peak mean intensity in m/min
    pub peak_m_per_min: f64,
    /// Frame of the first sample in the peak window
    pub frame_start: u64,
    /// Match clock of the first sample in the peak window
    pub time_start: NaiveTime,
    /// Frame of the sample where the peak window ends
    pub frame_end: u64,
}

/// WCS summary for one (match, player, team) series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakIntensityRow {
    pub match_id: u64,
    pub player_id: u64,
    pub team_name: String,
    pub total_distance_m: f64,
    pub high_speed_distance_m: f64,
    pub sprint_distance_m: f64,
    pub peaks: Vec<WindowPeak>,
}

impl PeakIntensityRow {
    pub fn peak(&self, window_seconds: u32) -> Option<&WindowPeak> {
        self.peaks.iter().find(|p| p.window_seconds == window_seconds)
    }

    /// Peak value for a window, `None` when absent or not a number.
    pub fn peak_value(&self, window_seconds: u32) -> Option<f64> {
        self.peak(window_seconds)
            .map(|p| p.peak_m_per_min)
            .filter(|v| v.is_finite())
    }
}

/// All peak rows of one computation plus the window lengths that were computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakTable {
    pub windows_seconds: Vec<u32>,
    pub rows: Vec<PeakIntensityRow>,
}

impl PeakTable {
    pub fn new(windows_seconds: Vec<u32>, rows: Vec<PeakIntensityRow>) -> Self {
        Self {
            windows_seconds,
            rows,
        }
    }

    pub fn has_window(&self, window_seconds: u32) -> bool {
        self.windows_seconds.contains(&window_seconds)
    }

    /// Column names this table exposes, in output order.
    pub fn column_names(&self) -> Vec<String> {
        let mut names = vec![
            columns::MATCH_ID.to_string(),
            columns::PLAYER_ID.to_string(),
            columns::TEAM_NAME.to_string(),
            columns::TOTAL_DISTANCE.to_string(),
            columns::HIGH_SPEED_DISTANCE.to_string(),
            columns::SPRINT_DISTANCE.to_string(),
        ];
        for &w in &self.windows_seconds {
            names.push(columns::peak(w));
            names.push(columns::frame_start(w));
            names.push(columns::time_start(w));
        }
        names
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
