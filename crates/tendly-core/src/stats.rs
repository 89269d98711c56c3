//! Read-only aggregates over the garden.
//!
//! Nothing here is cached: every figure is recomputed from the current
//! collections. "Today" is the local calendar day.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::garden::{GardenState, GardenWeather, Task, TaskStatus};
use crate::timer::FocusSession;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GardenStats {
    pub date: NaiveDate,
    pub today_sessions: usize,
    pub total_focus_today_secs: u64,
    pub average_focus_score: u8,
    pub pending_tasks: usize,
    pub completed_tasks: usize,
    pub archived_tasks: usize,
    pub plants: usize,
    pub fully_grown_plants: usize,
    pub compost: u64,
    pub lifetime_compost: u64,
    pub level: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_focus_hours: f64,
    pub rare_seeds: u32,
    pub achievements_unlocked: usize,
    pub achievements_total: usize,
    pub weather: GardenWeather,
}

impl GardenStats {
    pub fn compute(state: &GardenState, now: DateTime<Utc>) -> Self {
        let today = local_day(now);
        let todays = today_sessions(&state.sessions, today);
        Self {
            date: today,
            today_sessions: todays.len(),
            total_focus_today_secs: total_focus(&todays),
            average_focus_score: average_focus_score(&todays),
            pending_tasks: pending_tasks(&state.tasks).len(),
            completed_tasks: completed_tasks(&state.tasks).len(),
            archived_tasks: state
                .tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Archived)
                .count(),
            plants: state.plants.len(),
            fully_grown_plants: state.plants.iter().filter(|p| p.is_fully_grown()).count(),
            compost: state.profile.compost,
            lifetime_compost: state.profile.lifetime_compost,
            level: state.profile.level,
            current_streak: state.profile.streak_on(today),
            longest_streak: state.profile.longest_streak,
            total_focus_hours: state.profile.total_focus_hours(),
            rare_seeds: state.profile.rare_seeds,
            achievements_unlocked: state.achievements.iter().filter(|a| a.is_unlocked()).count(),
            achievements_total: state.achievements.len(),
            weather: state.weather,
        }
    }
}

pub fn local_day(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
}

/// Sessions whose start falls on `day` in local time.
pub fn today_sessions(sessions: &[FocusSession], day: NaiveDate) -> Vec<&FocusSession> {
    sessions
        .iter()
        .filter(|s| local_day(s.start_time) == day)
        .collect()
}

/// Sum of `duration_secs`.
pub fn total_focus(sessions: &[&FocusSession]) -> u64 {
    sessions.iter().map(|s| s.duration_secs).sum()
}

/// Rounded mean focus score, 0 for no sessions.
pub fn average_focus_score(sessions: &[&FocusSession]) -> u8 {
    if sessions.is_empty() {
        return 0;
    }
    let sum: u64 = sessions.iter().map(|s| u64::from(s.focus_score)).sum();
    let n = sessions.len() as u64;
    ((sum + n / 2) / n) as u8
}

pub fn pending_tasks(tasks: &[Task]) -> Vec<&Task> {
    tasks.iter().filter(|t| t.status == TaskStatus::Pending).collect()
}

pub fn completed_tasks(tasks: &[Task]) -> Vec<&Task> {
    tasks.iter().filter(|t| t.status == TaskStatus::Completed).collect()
}
