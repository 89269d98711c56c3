use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::attestation::AttestationKind;
use crate::garden::{GardenWeather, PlantType};
use crate::timer::{TimerMode, TimerState};

/// Every state change in the engine produces an Event.
/// The UI drains them with `GardenEngine::take_events` to drive
/// notifications and animations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TaskCreated {
        task_id: String,
        at: DateTime<Utc>,
    },
    TaskUpdated {
        task_id: String,
        at: DateTime<Utc>,
    },
    TaskCompleted {
        task_id: String,
        compost_earned: u64,
        at: DateTime<Utc>,
    },
    /// Completion was undone; the plant is gone and compost debited.
    TaskReopened {
        task_id: String,
        compost_debited: u64,
        at: DateTime<Utc>,
    },
    TaskArchived {
        task_id: String,
        at: DateTime<Utc>,
    },
    TaskDeleted {
        task_id: String,
        plants_removed: usize,
        at: DateTime<Utc>,
    },
    PlantPlanted {
        plant_id: String,
        task_id: String,
        plant_type: PlantType,
        at: DateTime<Utc>,
    },
    GardenGrown {
        plants: usize,
        growth_points: u32,
        at: DateTime<Utc>,
    },
    TimerStarted {
        mode: TimerMode,
        duration_secs: u64,
        task_id: Option<String>,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        mode: TimerMode,
        next_mode: TimerMode,
        at: DateTime<Utc>,
    },
    DistractionRecorded {
        count: u32,
        at: DateTime<Utc>,
    },
    SessionRecorded {
        session_id: String,
        duration_secs: u64,
        focus_score: u8,
        compost_earned: u64,
        at: DateTime<Utc>,
    },
    SessionDeleted {
        session_id: String,
        at: DateTime<Utc>,
    },
    CompostSpent {
        amount: u64,
        balance: u64,
        at: DateTime<Utc>,
    },
    RareSeedAcquired {
        rare_seeds: u32,
        at: DateTime<Utc>,
    },
    WeatherChanged {
        weather: GardenWeather,
        at: DateTime<Utc>,
    },
    AchievementUnlocked {
        achievement_id: String,
        name: String,
        at: DateTime<Utc>,
    },
    ChallengeCompleted {
        challenge_id: String,
        title: String,
        week_start: NaiveDate,
        at: DateTime<Utc>,
    },
    Attested {
        kind: AttestationKind,
        entity_id: String,
        digest: String,
        at: DateTime<Utc>,
    },
    PostCreated {
        post_id: String,
        at: DateTime<Utc>,
    },
    PostDeleted {
        post_id: String,
        at: DateTime<Utc>,
    },
    PostLikeToggled {
        post_id: String,
        liked: bool,
        likes: usize,
        at: DateTime<Utc>,
    },
    CommentAdded {
        post_id: String,
        comment_id: String,
        at: DateTime<Utc>,
    },
    TimerSnapshot {
        state: TimerState,
        mode: TimerMode,
        remaining_secs: u64,
        total_secs: u64,
        progress_pct: f64,
        completed_focus_sessions: u32,
        at: DateTime<Utc>,
    },
}
