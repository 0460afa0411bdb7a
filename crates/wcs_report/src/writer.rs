//! Report tables - every wcs_core result flattened to named columns,
//! written as CSV or as a JSON array of records.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use wcs_core::models::columns;
use wcs_core::{
    MergedPeakTable, PeakTable, TeamEventSummaryRow, TeamPeakSummary, TrackingSample, Trajectory,
};

/// Output encoding for report tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

/// A flat, column-named table ready to be written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

fn number(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl ReportTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Peak-intensity table: ids, distance bands, then
    /// `Peak m/min {w}s`, `_FrameStart`, `_TimeStart` per window.
    pub fn from_peaks(table: &PeakTable) -> Self {
        let mut report = Self::new(table.column_names());
        for row in &table.rows {
            let mut cells = vec![
                Value::from(row.match_id),
                Value::from(row.player_id),
                Value::from(row.team_name.clone()),
                number(row.total_distance_m),
                number(row.high_speed_distance_m),
                number(row.sprint_distance_m),
            ];
            for &w in &table.windows_seconds {
                match row.peak(w) {
                    Some(peak) => {
                        cells.push(number(peak.peak_m_per_min));
                        cells.push(Value::from(peak.frame_start));
                        cells.push(Value::from(peak.time_start.to_string()));
                    }
                    None => cells.extend([Value::Null, Value::Null, Value::Null]),
                }
            }
            report.rows.push(cells);
        }
        report
    }

    /// Peak rows joined with their nearest event; unmatched rows carry
    /// nulls in every event column.
    pub fn from_merged(merged: &MergedPeakTable) -> Self {
        let mut names = vec![
            columns::MATCH_ID.to_string(),
            columns::PLAYER_ID.to_string(),
            columns::TEAM_NAME.to_string(),
            columns::peak(merged.window_seconds),
            columns::FRAME_PEAK_START.to_string(),
            columns::TIME_PEAK_START.to_string(),
        ];
        names.extend(merged.event_columns.iter().cloned());

        let mut report = Self::new(names);
        for row in &merged.rows {
            let mut cells = vec![
                Value::from(row.match_id),
                Value::from(row.player_id),
                Value::from(row.team_name.clone()),
                number(row.peak_m_per_min),
                Value::from(row.frame_peak_start),
                Value::from(row.time_peak_start.to_string()),
            ];
            match &row.event {
                Some(event) => cells.extend(event.iter().cloned()),
                None => cells.extend(
                    std::iter::repeat(Value::Null).take(merged.event_columns.len()),
                ),
            }
            report.rows.push(cells);
        }
        report
    }

    pub fn from_event_summary(summary: &[TeamEventSummaryRow]) -> Self {
        let mut report = Self::new(
            [
                "Team",
                "Event Type",
                "EventType_Count",
                "% of Events that Precede WCS",
                "Event Sub-Type",
                "Subtype_Count",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        );
        for row in summary {
            report.rows.push(vec![
                Value::from(row.team_name.clone()),
                Value::from(row.event_type.clone()),
                Value::from(row.event_type_count),
                number(row.event_type_pct),
                Value::from(row.event_subtype.clone()),
                Value::from(row.subtype_count),
            ]);
        }
        report
    }

    /// One row per team, one `mean (min – max)` cell per window.
    pub fn from_team_summary(summary: &[TeamPeakSummary], windows_seconds: &[u32]) -> Self {
        let mut names = vec!["Team".to_string()];
        names.extend(windows_seconds.iter().map(|&w| columns::peak(w)));

        let mut report = Self::new(names);
        for team in summary {
            let mut cells = vec![Value::from(team.team_name.clone())];
            for &w in windows_seconds {
                let text = team
                    .window(w)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| wcs_core::analysis::team_summary::NOT_AVAILABLE.to_string());
                cells.push(Value::from(text));
            }
            report.rows.push(cells);
        }
        report
    }

    pub fn from_trajectory(trajectory: &Trajectory) -> Self {
        let mut report = Self::new(
            ["match_id", "player_id", "period", "frame", "timestamp", "x", "y", "speed_mps"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        );
        for point in &trajectory.points {
            report.rows.push(vec![
                Value::from(trajectory.match_id),
                Value::from(trajectory.player_id),
                Value::from(point.period),
                Value::from(point.frame),
                Value::from(point.timestamp.to_string()),
                number(point.x),
                number(point.y),
                number(point.speed_mps),
            ]);
        }
        report
    }

    /// Tracking samples in the loader's column layout, `phase` included.
    pub fn from_tracking(samples: &[TrackingSample]) -> Self {
        let mut report = Self::new(
            [
                "match_id",
                "period",
                "frame",
                "timestamp",
                "player_id",
                "team_name",
                "possession",
                "x",
                "y",
                "phase",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        );
        for s in samples {
            report.rows.push(vec![
                Value::from(s.match_id),
                Value::from(s.period),
                Value::from(s.frame),
                Value::from(s.timestamp.to_string()),
                Value::from(s.player_id),
                Value::from(s.team_name.clone()),
                Value::from(s.possession.as_str()),
                number(s.x),
                number(s.y),
                s.phase.clone().map(Value::from).unwrap_or(Value::Null),
            ]);
        }
        report
    }

    /// Records keyed by column name.
    pub fn to_json(&self) -> Value {
        Value::Array(
            self.rows
                .iter()
                .map(|row| {
                    let record: Map<String, Value> = self
                        .columns
                        .iter()
                        .cloned()
                        .zip(row.iter().cloned())
                        .collect();
                    Value::Object(record)
                })
                .collect(),
        )
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer
            .write_record(&self.columns)
            .context("Failed to write CSV header")?;
        for row in &self.rows {
            csv_writer
                .write_record(row.iter().map(cell_text))
                .context("Failed to write CSV row")?;
        }
        csv_writer.flush().context("Failed to flush CSV output")?;
        Ok(())
    }

    pub fn write_json<W: Write>(&self, mut writer: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, &self.to_json())
            .context("Failed to serialize JSON output")?;
        writeln!(writer)?;
        Ok(())
    }

    /// Write to `path`, or to stdout when no path is given.
    pub fn write(&self, path: Option<&Path>, format: OutputFormat) -> Result<()> {
        match path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
                let file = fs::File::create(path)
                    .with_context(|| format!("Failed to create output file: {}", path.display()))?;
                let writer = io::BufWriter::new(file);
                match format {
                    OutputFormat::Csv => self.write_csv(writer),
                    OutputFormat::Json => self.write_json(writer),
                }
            }
            None => {
                let stdout = io::stdout();
                let writer = stdout.lock();
                match format {
                    OutputFormat::Csv => self.write_csv(writer),
                    OutputFormat::Json => self.write_json(writer),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use serde_json::json;
    use wcs_core::{PeakIntensityRow, WindowPeak};

    fn peak_table() -> PeakTable {
        let t = NaiveTime::from_hms_milli_opt(0, 12, 3, 500).unwrap();
        PeakTable::new(
            vec![60, 120],
            vec![PeakIntensityRow {
                match_id: 1,
                player_id: 7,
                team_name: "Home".to_string(),
                total_distance_m: 9876.5,
                high_speed_distance_m: 654.25,
                sprint_distance_m: 120.5,
                peaks: vec![WindowPeak {
                    window_seconds: 60,
                    window_samples: 600,
                    peak_m_per_min: 187.5,
                    frame_start: 7235,
                    time_start: t,
                    frame_end: 7834,
                }],
            }],
        )
    }

    #[test]
    fn test_peak_report_columns_and_missing_window() {
        let report = ReportTable::from_peaks(&peak_table());
        assert_eq!(report.columns.len(), 12);
        assert_eq!(report.columns[6], "Peak m/min 60s");
        assert_eq!(report.columns[7], "Peak m/min 60s_FrameStart");
        assert_eq!(report.columns[8], "Peak m/min 60s_TimeStart");
        assert_eq!(report.rows[0][6], json!(187.5));
        assert_eq!(report.rows[0][7], json!(7235));
        assert_eq!(report.rows[0][8], json!("00:12:03.500"));
        assert_eq!(report.rows[0][9], Value::Null);
    }

    #[test]
    fn test_csv_rendering() -> Result<()> {
        let report = ReportTable::from_peaks(&peak_table());
        let mut buf = Vec::new();
        report.write_csv(&mut buf)?;
        let text = String::from_utf8(buf)?;
        let mut lines = text.lines();
        assert!(lines
            .next()
            .unwrap()
            .starts_with("match_id,player_id,team_name,Total Distance (m)"));
        assert_eq!(
            lines.next().unwrap(),
            "1,7,Home,9876.5,654.25,120.5,187.5,7235,00:12:03.500,,,"
        );
        Ok(())
    }

    #[test]
    fn test_json_records() {
        let report = ReportTable::from_peaks(&peak_table());
        let json = report.to_json();
        assert_eq!(json[0]["player_id"], json!(7));
        assert_eq!(json[0]["Peak m/min 120s"], Value::Null);
        assert_eq!(json[0]["team_name"], json!("Home"));
    }

    #[test]
    fn test_json_keys_follow_column_order() -> Result<()> {
        let report = ReportTable::from_peaks(&peak_table());
        let mut buf = Vec::new();
        report.write_json(&mut buf)?;
        let text = String::from_utf8(buf)?;

        let positions: Vec<usize> = report
            .columns
            .iter()
            .map(|c| text.find(&format!("\"{}\"", c)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        Ok(())
    }

    #[test]
    fn test_write_to_nested_path() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out").join("peaks.json");
        ReportTable::from_peaks(&peak_table()).write(Some(&path), OutputFormat::Json)?;
        let parsed: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(parsed.as_array().map(|a| a.len()), Some(1));
        Ok(())
    }
}
