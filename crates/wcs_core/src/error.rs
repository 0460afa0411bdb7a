use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WcsError {
    #[error("Missing columns in peak table for window {window_seconds}s: {missing:?}")]
    MissingPeakColumns { window_seconds: u32, missing: Vec<String> },

    #[error("Missing columns in event table: {missing:?}")]
    MissingEventColumns { missing: Vec<String> },

    #[error("Player column '{column}' not found in event table columns")]
    UnknownPlayerColumn { column: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No peak intensity row found for match_id={match_id}, player_id={player_id}")]
    NoPeakRow { match_id: u64, player_id: u64 },

    #[error(
        "No tracking data in the {window_seconds}s WCS window for match_id={match_id}, player_id={player_id}"
    )]
    EmptyTrajectory { match_id: u64, player_id: u64, window_seconds: u32 },
}

impl WcsError {
    /// Schema errors describe the shape of the input tables, not their content.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            WcsError::MissingPeakColumns { .. }
                | WcsError::MissingEventColumns { .. }
                | WcsError::UnknownPlayerColumn { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, WcsError>;
