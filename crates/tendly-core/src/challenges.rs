//! Weekly challenges.
//!
//! A fresh set of challenges runs each ISO week (Monday to Sunday, local
//! time). Progress is counted only from activity inside that week: focus
//! sessions that ended in it, tasks completed in it, and the longest run
//! of consecutive active days. A finished challenge pays its reward once
//! and stays finished for the rest of the week, even if a completion is
//! later undone.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::achievements::{Metric, MetricSnapshot, Requirement, Reward};
use crate::attestation::Proof;
use crate::garden::GardenState;
use crate::stats::local_day;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyChallenge {
    pub id: String,
    pub title: String,
    pub description: String,
    pub requirement: Requirement,
    pub reward: Reward,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub verification: Option<Proof>,
}

impl WeeklyChallenge {
    fn new(id: &str, title: &str, description: &str, metric: Metric, target: u64, reward: Reward) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            requirement: Requirement { metric, target },
            reward,
            completed_at: None,
            verification: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Built-in weekly set.
pub fn weekly_catalog() -> Vec<WeeklyChallenge> {
    vec![
        WeeklyChallenge::new(
            "focused_week",
            "Focused Week",
            "Complete 20 focus sessions this week",
            Metric::FocusSessions,
            20,
            Reward::Compost { amount: 50 },
        ),
        WeeklyChallenge::new(
            "busy_bee",
            "Busy Bee",
            "Complete 15 tasks this week",
            Metric::TasksCompleted,
            15,
            Reward::Compost { amount: 30 },
        ),
        WeeklyChallenge::new(
            "steady_gardener",
            "Steady Gardener",
            "Be active 5 days in a row this week",
            Metric::StreakDays,
            5,
            Reward::RareSeed,
        ),
    ]
}

/// Monday of the local week containing `at`.
pub fn week_start(at: DateTime<Utc>) -> NaiveDate {
    let day = local_day(at);
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

/// The current week's challenges and their completion state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeBoard {
    #[serde(default)]
    pub week_start: Option<NaiveDate>,
    #[serde(default)]
    pub challenges: Vec<WeeklyChallenge>,
    /// Challenges finished across all weeks.
    #[serde(default)]
    pub completed_total: u32,
}

impl Default for ChallengeBoard {
    fn default() -> Self {
        Self {
            week_start: None,
            challenges: weekly_catalog(),
            completed_total: 0,
        }
    }
}

impl ChallengeBoard {
    /// Start a new week if `week` differs from the stored one. Returns
    /// whether the board was reset.
    pub fn roll_to(&mut self, week: NaiveDate) -> bool {
        if self.week_start == Some(week) {
            return false;
        }
        self.week_start = Some(week);
        self.challenges = weekly_catalog();
        true
    }

    /// Complete everything newly satisfied. Returns indexes of the new
    /// completions.
    pub fn evaluate(&mut self, metrics: &MetricSnapshot, now: DateTime<Utc>) -> Vec<usize> {
        let mut done = Vec::new();
        for (idx, challenge) in self.challenges.iter_mut().enumerate() {
            let r = challenge.requirement;
            if !challenge.is_completed() && metrics.value(r.metric) >= r.target {
                challenge.completed_at = Some(now);
                done.push(idx);
            }
        }
        self.completed_total = self.completed_total.saturating_add(done.len() as u32);
        done
    }
}

/// Activity inside the week starting on `week`.
pub fn week_metrics(state: &GardenState, week: NaiveDate) -> MetricSnapshot {
    let end = week + Duration::days(7);
    let in_week = |day: NaiveDate| day >= week && day < end;

    let mut active_days = BTreeSet::new();
    let mut focus_sessions = 0u64;
    for session in &state.sessions {
        let day = local_day(session.end_time);
        if in_week(day) {
            focus_sessions += 1;
            active_days.insert(day);
        }
    }
    let mut tasks_completed = 0u64;
    for day in state.tasks.iter().filter_map(|t| t.completed_at).map(local_day) {
        if in_week(day) {
            tasks_completed += 1;
            active_days.insert(day);
        }
    }

    MetricSnapshot {
        tasks_completed,
        focus_sessions,
        streak_days: longest_run(&active_days),
        ..MetricSnapshot::default()
    }
}

fn longest_run(days: &BTreeSet<NaiveDate>) -> u64 {
    let mut best = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;
    for &day in days {
        run = match prev {
            Some(p) if p + Duration::days(1) == day => run + 1,
            _ => 1,
        };
        best = best.max(run);
        prev = Some(day);
    }
    best
}

/// One challenge as shown to the player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChallengeStatus {
    #[serde(flatten)]
    pub challenge: WeeklyChallenge,
    pub week_start: NaiveDate,
    pub current: u64,
    pub target: u64,
    /// 0..=100
    pub progress_pct: u8,
}

/// Progress for the week containing `now`. A board stored for an earlier
/// week reads as a fresh set.
pub fn status(board: &ChallengeBoard, state: &GardenState, now: DateTime<Utc>) -> Vec<ChallengeStatus> {
    let week = week_start(now);
    let metrics = week_metrics(state, week);
    let challenges = if board.week_start == Some(week) {
        board.challenges.clone()
    } else {
        weekly_catalog()
    };
    challenges
        .into_iter()
        .map(|challenge| {
            let Requirement { metric, target } = challenge.requirement;
            let current = metrics.value(metric);
            let progress_pct = if challenge.is_completed() || target == 0 {
                100
            } else {
                (current.min(target) * 100 / target) as u8
            };
            ChallengeStatus {
                challenge,
                week_start: week,
                current,
                target,
                progress_pct,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::garden::{NewTask, Priority, Task};
    use crate::timer::{FocusSession, SessionMood};
    use chrono::{Local, TimeZone};

    /// Noon local time on `day`, in UTC.
    fn local_noon(day: NaiveDate) -> DateTime<Utc> {
        Local
            .from_local_datetime(&day.and_hms_opt(12, 0, 0).unwrap())
            .earliest()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn monday() -> NaiveDate {
        // 2026-03-02 is a Monday.
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn session_on(day: NaiveDate) -> FocusSession {
        let end = local_noon(day);
        FocusSession {
            id: format!("s-{day}"),
            task_id: None,
            duration_secs: 60,
            planned_duration_secs: 60,
            start_time: end - Duration::minutes(1),
            end_time: end,
            distractions_count: 0,
            focus_score: 100,
            compost_earned: 2,
            plant_growth_contributed: 10,
            mood: SessionMood::default(),
            notes: None,
            verification: None,
        }
    }

    fn task_done_on(id: &str, day: NaiveDate) -> Task {
        let at = local_noon(day);
        let mut task = Task::new(id.to_string(), NewTask::new("t", Priority::Low), at).unwrap();
        task.mark_completed(at);
        task
    }

    #[test]
    fn week_starts_on_monday() {
        for offset in 0..7 {
            let day = monday() + Duration::days(offset);
            assert_eq!(week_start(local_noon(day)), monday());
        }
        assert_eq!(
            week_start(local_noon(monday() + Duration::days(7))),
            monday() + Duration::days(7)
        );
    }

    #[test]
    fn metrics_only_count_the_week() {
        let mut state = GardenState::default();
        state.sessions.push(session_on(monday()));
        state.sessions.push(session_on(monday() + Duration::days(6)));
        state.sessions.push(session_on(monday() - Duration::days(1)));
        state.tasks.push(task_done_on("a", monday() + Duration::days(1)));
        state.tasks.push(task_done_on("b", monday() + Duration::days(7)));
        state.tasks.push(Task::new("c".into(), NewTask::new("open", Priority::Low), local_noon(monday())).unwrap());

        let metrics = week_metrics(&state, monday());
        assert_eq!(metrics.focus_sessions, 2);
        assert_eq!(metrics.tasks_completed, 1);
        // Monday and Tuesday in a row, then Sunday alone.
        assert_eq!(metrics.streak_days, 2);
    }

    #[test]
    fn longest_run_finds_gaps() {
        let days: BTreeSet<_> = [0, 1, 2, 4, 5].iter().map(|d| monday() + Duration::days(*d)).collect();
        assert_eq!(longest_run(&days), 3);
        assert_eq!(longest_run(&BTreeSet::new()), 0);
    }

    #[test]
    fn completion_is_stamped_once() {
        let mut board = ChallengeBoard::default();
        board.roll_to(monday());
        let metrics = MetricSnapshot {
            tasks_completed: 15,
            ..MetricSnapshot::default()
        };
        let done = board.evaluate(&metrics, Utc::now());
        assert_eq!(done.len(), 1);
        assert_eq!(board.challenges[done[0]].id, "busy_bee");
        assert!(board.evaluate(&metrics, Utc::now()).is_empty());
        assert!(board.evaluate(&MetricSnapshot::default(), Utc::now()).is_empty());
        assert!(board.challenges[done[0]].is_completed());
        assert_eq!(board.completed_total, 1);
    }

    #[test]
    fn new_week_resets_challenges_but_keeps_total() {
        let mut board = ChallengeBoard::default();
        assert!(board.roll_to(monday()));
        board.challenges[0].completed_at = Some(Utc::now());
        board.completed_total = 1;
        assert!(!board.roll_to(monday()));
        assert!(board.challenges[0].is_completed());

        assert!(board.roll_to(monday() + Duration::days(7)));
        assert!(board.challenges.iter().all(|c| !c.is_completed()));
        assert_eq!(board.completed_total, 1);
    }

    #[test]
    fn status_reports_progress() {
        let mut state = GardenState::default();
        for offset in 0..3 {
            state.sessions.push(session_on(monday() + Duration::days(offset)));
        }
        let now = local_noon(monday() + Duration::days(2));
        let rows = status(&ChallengeBoard::default(), &state, now);
        let focused = rows.iter().find(|r| r.challenge.id == "focused_week").unwrap();
        assert_eq!(focused.current, 3);
        assert_eq!(focused.target, 20);
        assert_eq!(focused.progress_pct, 15);
        assert_eq!(focused.week_start, monday());
        let steady = rows.iter().find(|r| r.challenge.id == "steady_gardener").unwrap();
        assert_eq!(steady.current, 3);
        assert_eq!(steady.progress_pct, 60);
    }
}
