//! CSV loaders - tracking / dynamic events / phases of play → wcs_core tables
//!
//! Rows that fail to parse are data-quality problems, not fatal errors:
//! they are counted in `ParseStats`, logged, and skipped. Only I/O and
//! header problems abort a load.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveTime;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};
use wcs_core::{EventTable, PhaseInterval, Possession, TrackingSample};

/// CSV parsing statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub total_rows: u32,
    pub parsed: u32,
    pub failed: u32,
}

impl ParseStats {
    fn record_failure(&mut self, path: &Path, line: u32, reason: &str) {
        self.failed += 1;
        warn!(file = %path.display(), line, reason, "skipping unparsable row");
    }
}

/// Raw tracking row as exported (one player, one frame).
#[derive(Debug, Deserialize)]
struct TrackingCsvRow {
    match_id: u64,
    period: u8,
    frame: u64,
    timestamp: String,
    player_id: u64,
    team_name: String,
    possession: String,
    x: f64,
    y: f64,
    #[serde(default)]
    phase: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhaseCsvRow {
    frame_start: u64,
    frame_end: u64,
    #[serde(default)]
    team_in_possession_phase_type: Option<String>,
    #[serde(default)]
    team_out_of_possession_phase_type: Option<String>,
}

/// Parse a match clock: `HH:MM:SS[.fff]`, or plain seconds (`83.4`).
pub fn parse_match_clock(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    if let Ok(t) = NaiveTime::parse_from_str(raw, "%H:%M:%S%.f") {
        return Some(t);
    }
    let secs: f64 = raw.parse().ok()?;
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    NaiveTime::from_num_seconds_from_midnight_opt(
        secs.trunc() as u32,
        (secs.fract() * 1e9).round().min(999_999_999.0) as u32,
    )
}

/// Convert one event cell: empty → null, then integer, float, bool, text.
pub fn parse_cell(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
        // NaN / inf behave like missing values
        return Value::Null;
    }
    match trimmed {
        "True" | "true" => Value::Bool(true),
        "False" | "false" => Value::Bool(false),
        _ => Value::String(trimmed.to_string()),
    }
}

/// Load a side-normalized tracking export.
///
/// Expected columns: `match_id, period, frame, timestamp, player_id,
/// team_name, possession, x, y` and optionally `phase`.
pub fn load_tracking_csv(csv_path: &Path) -> Result<(Vec<TrackingSample>, ParseStats)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_path(csv_path)
        .with_context(|| format!("Failed to open tracking CSV: {}", csv_path.display()))?;

    let mut samples = Vec::new();
    let mut stats = ParseStats::default();

    for result in reader.deserialize::<TrackingCsvRow>() {
        stats.total_rows += 1;
        let line = stats.total_rows + 1;

        let row = match result {
            Ok(row) => row,
            Err(e) => {
                stats.record_failure(csv_path, line, &e.to_string());
                continue;
            }
        };
        let Some(timestamp) = parse_match_clock(&row.timestamp) else {
            stats.record_failure(csv_path, line, "invalid timestamp");
            continue;
        };
        let Some(possession) = Possession::from_label(&row.possession) else {
            stats.record_failure(csv_path, line, "invalid possession label");
            continue;
        };

        samples.push(TrackingSample {
            match_id: row.match_id,
            period: row.period,
            frame: row.frame,
            timestamp,
            player_id: row.player_id,
            team_name: row.team_name,
            possession,
            x: row.x,
            y: row.y,
            phase: row.phase.filter(|p| !p.is_empty()),
        });
        stats.parsed += 1;
    }

    info!(
        file = %csv_path.display(),
        parsed = stats.parsed,
        failed = stats.failed,
        "loaded tracking samples"
    );
    Ok((samples, stats))
}

/// Load a dynamic-events export with every column kept.
///
/// `match_id` stamps that id onto every row (the per-match event files
/// do not carry it).
pub fn load_events_csv(csv_path: &Path, match_id: Option<u64>) -> Result<EventTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(csv_path)
        .with_context(|| format!("Failed to open event CSV: {}", csv_path.display()))?;

    let columns: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read event CSV header: {}", csv_path.display()))?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut table = EventTable::new(columns);
    for (i, result) in reader.records().enumerate() {
        let record = result.with_context(|| {
            format!("Failed to read event row {} in {}", i + 2, csv_path.display())
        })?;
        table.push_row(record.iter().map(parse_cell).collect());
    }

    if let Some(id) = match_id {
        table = table.with_constant_column("match_id", Value::from(id));
    }

    info!(file = %csv_path.display(), events = table.len(), "loaded events");
    Ok(table)
}

/// Load a phases-of-play export.
pub fn load_phases_csv(csv_path: &Path) -> Result<(Vec<PhaseInterval>, ParseStats)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_path(csv_path)
        .with_context(|| format!("Failed to open phases CSV: {}", csv_path.display()))?;

    let mut intervals = Vec::new();
    let mut stats = ParseStats::default();

    for result in reader.deserialize::<PhaseCsvRow>() {
        stats.total_rows += 1;
        match result {
            Ok(row) => {
                intervals.push(PhaseInterval {
                    frame_start: row.frame_start,
                    frame_end: row.frame_end,
                    team_in_possession_phase_type: row
                        .team_in_possession_phase_type
                        .filter(|p| !p.is_empty()),
                    team_out_of_possession_phase_type: row
                        .team_out_of_possession_phase_type
                        .filter(|p| !p.is_empty()),
                });
                stats.parsed += 1;
            }
            Err(e) => stats.record_failure(csv_path, stats.total_rows + 1, &e.to_string()),
        }
    }

    info!(file = %csv_path.display(), phases = intervals.len(), "loaded phases of play");
    Ok((intervals, stats))
}
