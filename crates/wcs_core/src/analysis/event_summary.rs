//! # Team Event Summary
//!
//! Which event types (and sub-types) precede each team's WCS peaks.
//! Only matched rows count; a missing sub-type is its own category.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::correlator::MergedPeakTable;
use crate::models::value_label;

/// Category used when a matched event has no sub-type.
pub const NO_SUBTYPE_LABEL: &str = "No Sub-Type";

/// One (team, event type, sub-type) line of the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamEventSummaryRow {
    pub team_name: String,
    pub event_type: String,
    /// Matched events of this type for the team
    pub event_type_count: usize,
    /// Share of the team's matched events, in percent (2 decimals)
    pub event_type_pct: f64,
    pub event_subtype: String,
    pub subtype_count: usize,
}

/// Summarize matched events by team.
///
/// Sorted by team, then event-type count descending, then sub-type count
/// descending; remaining ties stay in (type, sub-type) name order.
pub fn summarize_events_by_team(merged: &MergedPeakTable) -> Vec<TeamEventSummaryRow> {
    // team -> (type, subtype) -> count
    let mut counts: BTreeMap<&str, BTreeMap<(String, String), usize>> = BTreeMap::new();

    for row in &merged.rows {
        let Some(event_type) = merged.event_value(row, "event_type").and_then(value_label) else {
            continue;
        };
        let subtype = merged
            .event_value(row, "event_subtype")
            .and_then(value_label)
            .unwrap_or_else(|| NO_SUBTYPE_LABEL.to_string());

        *counts
            .entry(row.team_name.as_str())
            .or_default()
            .entry((event_type, subtype))
            .or_default() += 1;
    }

    let mut summary = Vec::new();
    for (team, by_pair) in counts {
        let team_total: usize = by_pair.values().sum();
        let mut type_totals: BTreeMap<&str, usize> = BTreeMap::new();
        for ((event_type, _), count) in &by_pair {
            *type_totals.entry(event_type.as_str()).or_default() += count;
        }

        let mut team_rows: Vec<TeamEventSummaryRow> = by_pair
            .iter()
            .map(|((event_type, subtype), &count)| {
                let type_count = type_totals[event_type.as_str()];
                TeamEventSummaryRow {
                    team_name: team.to_string(),
                    event_type: event_type.clone(),
                    event_type_count: type_count,
                    event_type_pct: round2(type_count as f64 / team_total as f64 * 100.0),
                    event_subtype: subtype.clone(),
                    subtype_count: count,
                }
            })
            .collect();

        // Stable: name order survives within equal counts
        team_rows.sort_by(|a, b| {
            b.event_type_count
                .cmp(&a.event_type_count)
                .then(b.subtype_count.cmp(&a.subtype_count))
        });
        summary.extend(team_rows);
    }

    summary
}

/// Two decimals, halves to even.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::correlator::MergedPeakEvent;
    use chrono::NaiveTime;
    use serde_json::{json, Value};

    fn make_row(team: &str, event: Option<(&str, Option<&str>)>) -> MergedPeakEvent {
        MergedPeakEvent {
            match_id: 1,
            player_id: 7,
            team_name: team.to_string(),
            peak_m_per_min: 190.0,
            frame_peak_start: 100,
            time_peak_start: NaiveTime::from_hms_opt(0, 0, 10).unwrap(),
            event: event.map(|(t, s)| {
                vec![
                    json!(100),
                    json!(t),
                    s.map(|s| json!(s)).unwrap_or(Value::Null),
                ]
            }),
            frame_distance: event.map(|_| 0),
        }
    }

    fn make_table(rows: Vec<MergedPeakEvent>) -> MergedPeakTable {
        MergedPeakTable {
            window_seconds: 60,
            event_columns: vec![
                "frame_start".to_string(),
                "event_type".to_string(),
                "event_subtype".to_string(),
            ],
            rows,
        }
    }

    #[test]
    fn test_counts_percentages_and_order() {
        let table = make_table(vec![
            make_row("Home", Some(("off_ball_run", Some("behind")))),
            make_row("Home", Some(("off_ball_run", Some("support")))),
            make_row("Home", Some(("off_ball_run", Some("behind")))),
            make_row("Home", Some(("passing_option", None))),
            make_row("Away", Some(("on_ball_engagement", Some("pressing")))),
            make_row("Away", None),
        ]);

        let summary = summarize_events_by_team(&table);
        assert_eq!(summary.len(), 4);

        // Away first (alphabetical), unmatched row ignored
        assert_eq!(summary[0].team_name, "Away");
        assert_eq!(summary[0].event_type_count, 1);
        assert_eq!(summary[0].event_type_pct, 100.0);

        assert_eq!(summary[1].team_name, "Home");
        assert_eq!(summary[1].event_type, "off_ball_run");
        assert_eq!(summary[1].event_subtype, "behind");
        assert_eq!(summary[1].event_type_count, 3);
        assert_eq!(summary[1].subtype_count, 2);
        assert_eq!(summary[1].event_type_pct, 75.0);

        assert_eq!(summary[2].event_subtype, "support");
        assert_eq!(summary[2].subtype_count, 1);

        assert_eq!(summary[3].event_type, "passing_option");
        assert_eq!(summary[3].event_subtype, NO_SUBTYPE_LABEL);
        assert_eq!(summary[3].event_type_pct, 25.0);
    }

    #[test]
    fn test_percentages_are_rounded() {
        let table = make_table(vec![
            make_row("Home", Some(("a", None))),
            make_row("Home", Some(("b", None))),
            make_row("Home", Some(("c", None))),
        ]);

        let summary = summarize_events_by_team(&table);
        assert!(summary.iter().all(|r| r.event_type_pct == 33.33));
        // Equal counts keep name order
        let types: Vec<&str> = summary.iter().map(|r| r.event_type.as_str()).collect();
        assert_eq!(types, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_no_matches_gives_empty_summary() {
        let table = make_table(vec![make_row("Home", None), make_row("Away", None)]);
        assert!(summarize_events_by_team(&table).is_empty());
    }

    #[test]
    fn test_round2_halves_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(33.333333), 33.33);
    }
}
