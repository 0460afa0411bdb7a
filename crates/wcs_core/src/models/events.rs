//! # Event Table
//!
//! Discrete game events (passes, runs, pressing actions, ...) as an
//! untyped table. The event export carries dozens of provider-specific
//! columns, so only the merge keys are interpreted and every other cell
//! is carried through as a JSON value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column-oriented event table with dynamic cell values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl EventTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row. Short rows are padded with nulls, long rows truncated.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    /// Set a column to the same value on every row, adding it if absent.
    pub fn with_constant_column(mut self, name: &str, value: Value) -> Self {
        match self.column_index(name) {
            Some(idx) => {
                for row in &mut self.rows {
                    row[idx] = value.clone();
                }
            }
            None => {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.push(value.clone());
                }
            }
        }
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Build a table from typed records.
    ///
    /// Fixed columns come first, followed by the union of all `extra` keys
    /// in sorted order. Records missing an extra key get a null cell.
    pub fn from_records(records: &[EventRecord]) -> Self {
        let mut extra_keys: Vec<String> = records
            .iter()
            .flat_map(|r| r.extra.keys().cloned())
            .collect();
        extra_keys.sort();
        extra_keys.dedup();

        let mut columns: Vec<String> = EventRecord::FIXED_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .collect();
        columns.extend(extra_keys.iter().cloned());

        let mut table = EventTable::new(columns);
        for record in records {
            let mut row = record.fixed_values();
            for key in &extra_keys {
                row.push(record.extra.get(key).cloned().unwrap_or(Value::Null));
            }
            table.push_row(row);
        }
        table
    }
}

/// Typed convenience form of one event row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub match_id: u64,
    pub player_id: u64,
    pub frame_start: u64,
    pub frame_end: Option<u64>,
    pub event_type: String,
    pub event_subtype: Option<String>,
    pub team_id: Option<u64>,
    /// Any further provider columns
    #[serde(default)]
    pub extra: BTreeMap<String, Value>,
}

impl EventRecord {
    pub const FIXED_COLUMNS: [&'static str; 7] = [
        "match_id",
        "player_id",
        "frame_start",
        "frame_end",
        "event_type",
        "event_subtype",
        "team_id",
    ];

    pub fn new(match_id: u64, player_id: u64, frame_start: u64, event_type: &str) -> Self {
        Self {
            match_id,
            player_id,
            frame_start,
            event_type: event_type.to_string(),
            ..Default::default()
        }
    }

    pub fn with_subtype(mut self, subtype: &str) -> Self {
        self.event_subtype = Some(subtype.to_string());
        self
    }

    pub fn with_team_id(mut self, team_id: u64) -> Self {
        self.team_id = Some(team_id);
        self
    }

    fn fixed_values(&self) -> Vec<Value> {
        vec![
            Value::from(self.match_id),
            Value::from(self.player_id),
            Value::from(self.frame_start),
            self.frame_end.map(Value::from).unwrap_or(Value::Null),
            Value::from(self.event_type.clone()),
            self.event_subtype
                .clone()
                .map(Value::from)
                .unwrap_or(Value::Null),
            self.team_id.map(Value::from).unwrap_or(Value::Null),
        ]
    }
}

/// Read a key cell as a non-negative integer.
///
/// Accepts integers, integral floats (`12.0`) and numeric strings.
pub fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as u64)
            })
        }
        _ => None,
    }
}

/// Display label for a categorical cell; `None` for null.
pub fn value_label(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
