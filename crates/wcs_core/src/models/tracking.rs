use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Whether the player's team had the ball on this frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Possession {
    In,
    Out,
}

impl Possession {
    /// Parse the `In` / `Out` labels used by the tracking export (case-insensitive).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            l if l.eq_ignore_ascii_case("in") => Some(Possession::In),
            l if l.eq_ignore_ascii_case("out") => Some(Possession::Out),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Possession::In => "In",
            Possession::Out => "Out",
        }
    }
}

/// One player on one frame.
///
/// Coordinates are in meters and already side-normalized, so a team
/// attacks the same nominal direction in every period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackingSample {
    pub match_id: u64,
    pub period: u8,
    /// Monotonic within a period; gaps are allowed.
    pub frame: u64,
    /// Match clock at this frame
    pub timestamp: NaiveTime,
    pub player_id: u64,
    pub team_name: String,
    pub possession: Possession,
    pub x: f64,
    pub y: f64,
    /// Phase-of-play label, if the frame falls in a known phase interval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
}

impl TrackingSample {
    pub fn group_key(&self) -> GroupKey {
        GroupKey {
            match_id: self.match_id,
            player_id: self.player_id,
            team_name: self.team_name.clone(),
        }
    }
}

/// Identity of one player series: (match, player, team).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    pub match_id: u64,
    pub player_id: u64,
    pub team_name: String,
}

/// Half-open `[frame_start, frame_end)` phase-of-play interval.
///
/// Labels differ depending on which team has the ball.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhaseInterval {
    pub frame_start: u64,
    pub frame_end: u64,
    pub team_in_possession_phase_type: Option<String>,
    pub team_out_of_possession_phase_type: Option<String>,
}

impl PhaseInterval {
    pub fn contains(&self, frame: u64) -> bool {
        self.frame_start <= frame && frame < self.frame_end
    }

    pub fn label_for(&self, possession: Possession) -> Option<&str> {
        match possession {
            Possession::In => self.team_in_possession_phase_type.as_deref(),
            Possession::Out => self.team_out_of_possession_phase_type.as_deref(),
        }
    }
}
