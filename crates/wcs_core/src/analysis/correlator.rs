//! # Peak-Event Correlator
//!
//! Attaches to every WCS peak the discrete event of the same player that
//! lies closest to the peak window's start frame.
//!
//! ## Contract
//! - Left join: every peak row with a start frame appears exactly once
//! - Candidates share match_id and player id with the peak
//! - Nearest by |event.frame_start - peak.frame_start|, first in table order on ties
//! - Optional tolerance: farther matches are dropped (event fields null)
//! - Peak-side columns are never overwritten by event columns

use std::collections::{HashMap, HashSet};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{Result, WcsError};
use crate::models::{columns, value_as_u64, EventTable, PeakTable};

/// Event column that holds the event's first frame.
pub const EVENT_FRAME_COLUMN: &str = "frame_start";

/// Merge settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelateOptions {
    /// WCS window whose peaks are merged
    pub window_seconds: u32,
    /// Event column identifying the player
    pub player_column: String,
    /// Maximum allowed frame distance, unlimited when `None`
    pub tolerance_frames: Option<u64>,
}

impl Default for CorrelateOptions {
    fn default() -> Self {
        Self {
            window_seconds: 60,
            player_column: columns::PLAYER_ID.to_string(),
            tolerance_frames: None,
        }
    }
}

impl CorrelateOptions {
    pub fn for_window(window_seconds: u32) -> Self {
        Self {
            window_seconds,
            ..Default::default()
        }
    }

    pub fn with_tolerance(mut self, tolerance_frames: u64) -> Self {
        self.tolerance_frames = Some(tolerance_frames);
        self
    }

    pub fn with_player_column(mut self, column: &str) -> Self {
        self.player_column = column.to_string();
        self
    }
}

/// One peak row with its nearest event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedPeakEvent {
    pub match_id: u64,
    pub player_id: u64,
    pub team_name: String,
    pub peak_m_per_min: f64,
    pub frame_peak_start: u64,
    pub time_peak_start: NaiveTime,
    /// Event cells aligned with `MergedPeakTable::event_columns`; `None` when unmatched
    pub event: Option<Vec<Value>>,
    /// Frame distance to the matched event
    pub frame_distance: Option<u64>,
}

impl MergedPeakEvent {
    pub fn is_matched(&self) -> bool {
        self.event.is_some()
    }
}

/// Result of a peak-event merge for one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedPeakTable {
    pub window_seconds: u32,
    /// Event columns copied onto merged rows, in event-table order
    pub event_columns: Vec<String>,
    pub rows: Vec<MergedPeakEvent>,
}

impl MergedPeakTable {
    pub fn event_column_index(&self, name: &str) -> Option<usize> {
        self.event_columns.iter().position(|c| c == name)
    }

    /// Event cell for a row; `None` when the row is unmatched or the column absent.
    pub fn event_value<'a>(&self, row: &'a MergedPeakEvent, column: &str) -> Option<&'a Value> {
        let idx = self.event_column_index(column)?;
        row.event.as_ref().and_then(|cells| cells.get(idx))
    }

    pub fn matched_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_matched()).count()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Check that the peak table carries the columns for `window_seconds`.
pub fn validate_peak_columns(peaks: &PeakTable, window_seconds: u32) -> Result<()> {
    if peaks.has_window(window_seconds) {
        return Ok(());
    }
    Err(WcsError::MissingPeakColumns {
        window_seconds,
        missing: vec![
            columns::peak(window_seconds),
            columns::frame_start(window_seconds),
            columns::time_start(window_seconds),
        ],
    })
}

/// Check the event table for the merge keys.
pub fn validate_event_columns(events: &EventTable, player_column: &str) -> Result<()> {
    if !events.has_column(player_column) {
        return Err(WcsError::UnknownPlayerColumn {
            column: player_column.to_string(),
        });
    }
    let missing: Vec<String> = [columns::MATCH_ID, player_column, EVENT_FRAME_COLUMN]
        .iter()
        .filter(|c| !events.has_column(c))
        .map(|c| c.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(WcsError::MissingEventColumns { missing })
    }
}

/// Candidate event: row index in the event table and its start frame.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    row: usize,
    frame_start: u64,
}

/// Merge each peak of `options.window_seconds` with the nearest event.
pub fn merge_peaks_with_events(
    peaks: &PeakTable,
    events: &EventTable,
    options: &CorrelateOptions,
) -> Result<MergedPeakTable> {
    let window_seconds = options.window_seconds;
    validate_peak_columns(peaks, window_seconds)?;
    validate_event_columns(events, &options.player_column)?;

    let match_idx = events.column_index(columns::MATCH_ID).unwrap_or_default();
    let player_idx = events
        .column_index(&options.player_column)
        .unwrap_or_default();
    let frame_idx = events.column_index(EVENT_FRAME_COLUMN).unwrap_or_default();

    // Peak-side names win; the player column is renamed to player_id.
    let reserved: HashSet<String> = [
        columns::MATCH_ID.to_string(),
        columns::PLAYER_ID.to_string(),
        columns::TEAM_NAME.to_string(),
        columns::peak(window_seconds),
        columns::FRAME_PEAK_START.to_string(),
        columns::TIME_PEAK_START.to_string(),
    ]
    .into_iter()
    .collect();
    let copied: Vec<(usize, String)> = events
        .columns()
        .iter()
        .enumerate()
        .filter(|(i, name)| *i != player_idx && !reserved.contains(name.as_str()))
        .map(|(i, name)| (i, name.clone()))
        .collect();

    let peak_players: HashSet<u64> = peaks.rows.iter().map(|r| r.player_id).collect();
    let candidates = index_events(events, match_idx, player_idx, frame_idx, &peak_players);

    let mut rows = Vec::with_capacity(peaks.rows.len());
    for peak_row in &peaks.rows {
        let Some(peak) = peak_row.peak(window_seconds) else {
            continue;
        };

        let nearest = candidates
            .get(&(peak_row.match_id, peak_row.player_id))
            .and_then(|list| {
                list.iter()
                    .map(|c| (c, c.frame_start.abs_diff(peak.frame_start)))
                    .min_by_key(|(_, distance)| *distance)
            })
            .filter(|(_, distance)| options.tolerance_frames.map_or(true, |tol| *distance <= tol));

        let (event, frame_distance) = match nearest {
            Some((candidate, distance)) => {
                let cells = &events.rows()[candidate.row];
                let values = copied.iter().map(|(i, _)| cells[*i].clone()).collect();
                (Some(values), Some(distance))
            }
            None => (None, None),
        };

        rows.push(MergedPeakEvent {
            match_id: peak_row.match_id,
            player_id: peak_row.player_id,
            team_name: peak_row.team_name.clone(),
            peak_m_per_min: peak.peak_m_per_min,
            frame_peak_start: peak.frame_start,
            time_peak_start: peak.time_start,
            event,
            frame_distance,
        });
    }

    let table = MergedPeakTable {
        window_seconds,
        event_columns: copied.into_iter().map(|(_, name)| name).collect(),
        rows,
    };

    info!(
        window_seconds,
        peaks = table.len(),
        matched = table.matched_count(),
        unmatched = table.len() - table.matched_count(),
        "merged WCS peaks with events"
    );

    Ok(table)
}

/// Group candidate events by (match_id, player_id), keeping table order.
fn index_events(
    events: &EventTable,
    match_idx: usize,
    player_idx: usize,
    frame_idx: usize,
    peak_players: &HashSet<u64>,
) -> HashMap<(u64, u64), Vec<Candidate>> {
    let mut index: HashMap<(u64, u64), Vec<Candidate>> = HashMap::new();
    let mut unreadable = 0usize;

    for (row, cells) in events.rows().iter().enumerate() {
        // Null players (team-level events) never merge
        if cells[player_idx].is_null() {
            continue;
        }
        let keys = (
            value_as_u64(&cells[match_idx]),
            value_as_u64(&cells[player_idx]),
            value_as_u64(&cells[frame_idx]),
        );
        let (Some(match_id), Some(player_id), Some(frame_start)) = keys else {
            unreadable += 1;
            continue;
        };
        if !peak_players.contains(&player_id) {
            continue;
        }
        index
            .entry((match_id, player_id))
            .or_default()
            .push(Candidate { row, frame_start });
    }

    if unreadable > 0 {
        warn!(
            rows = unreadable,
            "dropped event rows with non-integer match, player or frame keys"
        );
    }

    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventRecord, PeakIntensityRow, WindowPeak};
    use proptest::prelude::*;
    use serde_json::json;

    fn make_peak_row(match_id: u64, player_id: u64, team: &str, frame_start: u64) -> PeakIntensityRow {
        PeakIntensityRow {
            match_id,
            player_id,
            team_name: team.to_string(),
            total_distance_m: 9000.0,
            high_speed_distance_m: 600.0,
            sprint_distance_m: 200.0,
            peaks: vec![WindowPeak {
                window_seconds: 60,
                window_samples: 600,
                peak_m_per_min: 180.0,
                frame_start,
                time_start: NaiveTime::from_hms_opt(0, 10, 0).unwrap(),
                frame_end: frame_start + 599,
            }],
        }
    }

    fn make_table(rows: Vec<PeakIntensityRow>) -> PeakTable {
        PeakTable::new(vec![60], rows)
    }

    #[test]
    fn test_nearest_event_is_attached() {
        let peaks = make_table(vec![make_peak_row(1, 7, "Home", 1000)]);
        let events = EventTable::from_records(&[
            EventRecord::new(1, 7, 900, "player_possession").with_subtype("pass"),
            EventRecord::new(1, 7, 1030, "off_ball_run").with_subtype("run_ahead_of_the_ball"),
            EventRecord::new(1, 7, 1500, "on_ball_engagement"),
        ]);

        let merged = merge_peaks_with_events(&peaks, &events, &CorrelateOptions::default()).unwrap();
        assert_eq!(merged.len(), 1);
        let row = &merged.rows[0];
        assert!(row.is_matched());
        assert_eq!(row.frame_distance, Some(30));
        assert_eq!(merged.event_value(row, "event_type"), Some(&json!("off_ball_run")));
        assert_eq!(merged.event_value(row, "frame_start"), Some(&json!(1030)));
    }

    #[test]
    fn test_peak_columns_are_not_overwritten() {
        let peaks = make_table(vec![make_peak_row(1, 7, "Home", 1000)]);
        let mut record = EventRecord::new(1, 7, 1000, "pass");
        record.extra.insert("team_name".to_string(), json!("Somebody Else"));
        let events = EventTable::from_records(&[record]);

        let merged = merge_peaks_with_events(&peaks, &events, &CorrelateOptions::default()).unwrap();
        assert!(!merged.event_columns.contains(&"team_name".to_string()));
        assert!(!merged.event_columns.contains(&"match_id".to_string()));
        assert!(!merged.event_columns.contains(&"player_id".to_string()));
        assert_eq!(merged.rows[0].team_name, "Home");
    }

    #[test]
    fn test_player_without_events_keeps_row() {
        let peaks = make_table(vec![
            make_peak_row(1, 7, "Home", 1000),
            make_peak_row(1, 8, "Home", 2000),
        ]);
        let events = EventTable::from_records(&[EventRecord::new(1, 7, 1000, "pass")]);

        let merged = merge_peaks_with_events(&peaks, &events, &CorrelateOptions::default()).unwrap();
        assert_eq!(merged.len(), 2);
        assert!(merged.rows[0].is_matched());
        assert!(!merged.rows[1].is_matched());
        assert_eq!(merged.event_value(&merged.rows[1], "event_type"), None);
    }

    #[test]
    fn test_other_match_never_merges() {
        let peaks = make_table(vec![make_peak_row(1, 7, "Home", 1000)]);
        let events = EventTable::from_records(&[EventRecord::new(2, 7, 1000, "pass")]);

        let merged = merge_peaks_with_events(&peaks, &events, &CorrelateOptions::default()).unwrap();
        assert!(!merged.rows[0].is_matched());
    }

    #[test]
    fn test_tolerance_discards_far_events() {
        let peaks = make_table(vec![make_peak_row(1, 7, "Home", 1000)]);
        let events = EventTable::from_records(&[EventRecord::new(1, 7, 1050, "pass")]);

        let opts = CorrelateOptions::default().with_tolerance(49);
        let merged = merge_peaks_with_events(&peaks, &events, &opts).unwrap();
        assert!(!merged.rows[0].is_matched());

        let opts = CorrelateOptions::default().with_tolerance(50);
        let merged = merge_peaks_with_events(&peaks, &events, &opts).unwrap();
        assert!(merged.rows[0].is_matched());
    }

    #[test]
    fn test_equidistant_events_pick_first_in_table() {
        let peaks = make_table(vec![make_peak_row(1, 7, "Home", 1000)]);
        let events = EventTable::from_records(&[
            EventRecord::new(1, 7, 1010, "after"),
            EventRecord::new(1, 7, 990, "before"),
        ]);

        let merged = merge_peaks_with_events(&peaks, &events, &CorrelateOptions::default()).unwrap();
        assert_eq!(
            merged.event_value(&merged.rows[0], "event_type"),
            Some(&json!("after"))
        );
    }

    #[test]
    fn test_rows_without_window_are_dropped() {
        let mut row = make_peak_row(1, 7, "Home", 1000);
        row.peaks.clear();
        let peaks = make_table(vec![row, make_peak_row(1, 8, "Home", 50)]);
        let events = EventTable::from_records(&[]);

        let merged = merge_peaks_with_events(&peaks, &events, &CorrelateOptions::default()).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.rows[0].player_id, 8);
    }

    #[test]
    fn test_missing_window_is_schema_error() {
        let peaks = make_table(vec![make_peak_row(1, 7, "Home", 1000)]);
        let events = EventTable::from_records(&[]);

        let err = merge_peaks_with_events(&peaks, &events, &CorrelateOptions::for_window(120))
            .unwrap_err();
        assert!(err.is_schema_error());
        match err {
            WcsError::MissingPeakColumns { window_seconds, missing } => {
                assert_eq!(window_seconds, 120);
                assert_eq!(
                    missing,
                    vec![
                        "Peak m/min 120s",
                        "Peak m/min 120s_FrameStart",
                        "Peak m/min 120s_TimeStart"
                    ]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_player_column() {
        let peaks = make_table(vec![make_peak_row(1, 7, "Home", 1000)]);
        let events = EventTable::from_records(&[]);

        let opts = CorrelateOptions::default().with_player_column("player_in_possession_id");
        let err = merge_peaks_with_events(&peaks, &events, &opts).unwrap_err();
        assert_eq!(
            err,
            WcsError::UnknownPlayerColumn {
                column: "player_in_possession_id".to_string()
            }
        );
    }

    #[test]
    fn test_missing_event_columns_are_named() {
        let peaks = make_table(vec![make_peak_row(1, 7, "Home", 1000)]);
        let events = EventTable::new(vec!["player_id".to_string(), "event_type".to_string()]);

        let err = merge_peaks_with_events(&peaks, &events, &CorrelateOptions::default()).unwrap_err();
        assert_eq!(
            err,
            WcsError::MissingEventColumns {
                missing: vec!["match_id".to_string(), "frame_start".to_string()]
            }
        );
    }

    #[test]
    fn test_custom_player_column_and_string_keys() {
        let peaks = make_table(vec![make_peak_row(1, 7, "Home", 1000)]);
        let mut events = EventTable::new(vec![
            "match_id".to_string(),
            "frame_start".to_string(),
            "player_in_possession_id".to_string(),
            "event_type".to_string(),
        ]);
        events.push_row(vec![json!("1"), json!(1002.0), json!("7"), json!("pass")]);
        events.push_row(vec![json!("1"), json!("n/a"), json!("7"), json!("broken")]);

        let opts = CorrelateOptions::default().with_player_column("player_in_possession_id");
        let merged = merge_peaks_with_events(&peaks, &events, &opts).unwrap();
        assert_eq!(merged.event_columns, vec!["frame_start", "event_type"]);
        assert_eq!(merged.rows[0].frame_distance, Some(2));
        assert_eq!(
            merged.event_value(&merged.rows[0], "event_type"),
            Some(&json!("pass"))
        );
    }

    fn merge_inputs() -> impl Strategy<Value = (Vec<(u64, u64)>, Vec<(u64, u64)>)> {
        (
            prop::collection::vec((1u64..6, 0u64..300), 0..20),
            prop::collection::vec((1u64..8, 0u64..300), 0..40),
        )
    }

    proptest! {
        #[test]
        fn prop_left_join_cardinality((peak_specs, event_specs) in merge_inputs(), tol in prop::option::of(0u64..50)) {
            let peaks = make_table(
                peak_specs.iter().map(|&(p, f)| make_peak_row(1, p, "Home", f)).collect(),
            );
            let records: Vec<EventRecord> = event_specs
                .iter()
                .map(|&(p, f)| EventRecord::new(1, p, f, "pass"))
                .collect();
            let events = EventTable::from_records(&records);

            let mut opts = CorrelateOptions::default();
            opts.tolerance_frames = tol;
            let merged = merge_peaks_with_events(&peaks, &events, &opts).unwrap();

            prop_assert_eq!(merged.len(), peaks.len());
            for (peak, row) in peaks.rows.iter().zip(&merged.rows) {
                prop_assert_eq!(peak.player_id, row.player_id);
                if let (Some(distance), Some(tol)) = (row.frame_distance, tol) {
                    prop_assert!(distance <= tol);
                }
            }
        }

        #[test]
        fn prop_zero_tolerance_requires_exact_frame((peak_specs, event_specs) in merge_inputs()) {
            let peaks = make_table(
                peak_specs.iter().map(|&(p, f)| make_peak_row(1, p, "Home", f)).collect(),
            );
            let records: Vec<EventRecord> = event_specs
                .iter()
                .map(|&(p, f)| EventRecord::new(1, p, f, "pass"))
                .collect();
            let events = EventTable::from_records(&records);

            let opts = CorrelateOptions::default().with_tolerance(0);
            let merged = merge_peaks_with_events(&peaks, &events, &opts).unwrap();

            for row in &merged.rows {
                let exact = event_specs
                    .iter()
                    .any(|&(p, f)| p == row.player_id && f == row.frame_peak_start);
                prop_assert_eq!(row.is_matched(), exact);
                if row.is_matched() {
                    prop_assert_eq!(
                        merged.event_value(row, "frame_start"),
                        Some(&json!(row.frame_peak_start))
                    );
                }
            }
        }
    }
}
