use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::attestation::Proof;
use crate::error::ValidationError;

/// Self-reported mood attached to a finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMood {
    #[default]
    Focused,
    Distracted,
    Tired,
    Energized,
}

impl FromStr for SessionMood {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "focused" => Ok(SessionMood::Focused),
            "distracted" => Ok(SessionMood::Distracted),
            "tired" => Ok(SessionMood::Tired),
            "energized" => Ok(SessionMood::Energized),
            other => Err(ValidationError::invalid(
                "mood",
                format!("'{other}' is not one of focused, distracted, tired, energized"),
            )),
        }
    }
}

/// A finalized focus interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusSession {
    pub id: String,
    #[serde(default)]
    pub task_id: Option<String>,
    /// Elapsed focused seconds.
    pub duration_secs: u64,
    pub planned_duration_secs: u64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub distractions_count: u32,
    /// 0..=100
    pub focus_score: u8,
    pub compost_earned: u64,
    pub plant_growth_contributed: u32,
    #[serde(default)]
    pub mood: SessionMood,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub verification: Option<Proof>,
}

/// Editable fields of a recorded session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionPatch {
    pub mood: Option<SessionMood>,
    /// `Some(None)` clears the notes.
    pub notes: Option<Option<String>>,
}

impl FocusSession {
    pub fn apply(&mut self, patch: SessionPatch) {
        if let Some(mood) = patch.mood {
            self.mood = mood;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty());
        }
    }
}

/// `max(0, 100 - distractions * 10)`
pub fn focus_score(distractions: u32) -> u8 {
    100u32.saturating_sub(distractions.saturating_mul(10)) as u8
}

/// Whole elapsed minutes times the per-minute rate.
pub fn compost_for(elapsed_secs: u64, per_minute: u64) -> u64 {
    (elapsed_secs / 60).saturating_mul(per_minute)
}
