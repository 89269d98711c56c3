//! Focus timer state machine.
//!
//! The timer has no internal thread. The caller invokes `tick()` once per
//! elapsed second while it is running (see [`super::drive`]).
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |
//!            v
//!        Completed -> Running (next mode)
//! ```
//!
//! Every 4th finished focus interval (configurable) routes to a long
//! break, the others to a short break. Finished breaks route back to focus.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ValidationError;
use crate::events::Event;
use crate::storage::TimerConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    #[default]
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub fn is_break(self) -> bool {
        !matches!(self, TimerMode::Focus)
    }
}

impl FromStr for TimerMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "focus" => Ok(TimerMode::Focus),
            "short_break" | "short" => Ok(TimerMode::ShortBreak),
            "long_break" | "long" => Ok(TimerMode::LongBreak),
            other => Err(ValidationError::invalid(
                "mode",
                format!("'{other}' is not one of focus, short_break, long_break"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Interval lengths in seconds, per mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerDurations {
    pub focus_secs: u64,
    pub short_break_secs: u64,
    pub long_break_secs: u64,
}

impl TimerDurations {
    pub fn for_mode(&self, mode: TimerMode) -> u64 {
        match mode {
            TimerMode::Focus => self.focus_secs,
            TimerMode::ShortBreak => self.short_break_secs,
            TimerMode::LongBreak => self.long_break_secs,
        }
    }
}

impl From<&TimerConfig> for TimerDurations {
    fn from(cfg: &TimerConfig) -> Self {
        Self {
            focus_secs: u64::from(cfg.focus_minutes) * 60,
            short_break_secs: u64::from(cfg.short_break_minutes) * 60,
            long_break_secs: u64::from(cfg.long_break_minutes) * 60,
        }
    }
}

/// Partially accrued focus session. Discarded on reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSession {
    pub task_id: Option<String>,
    pub started_at: DateTime<Utc>,
    pub distractions: u32,
}

/// Emitted by `tick()` when an interval runs out.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub mode: TimerMode,
    pub next_mode: TimerMode,
    pub elapsed_secs: u64,
    pub planned_secs: u64,
    /// Present for focus intervals only.
    pub session: Option<ActiveSession>,
    pub ended_at: DateTime<Utc>,
}

/// Core countdown timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusTimer {
    durations: TimerDurations,
    long_break_every: u32,
    #[serde(default)]
    auto_start_breaks: bool,
    mode: TimerMode,
    state: TimerState,
    remaining_secs: u64,
    /// Length of the current interval, fixed when it is loaded. Zero in
    /// timers stored before this field existed.
    #[serde(default)]
    planned_secs: u64,
    #[serde(default)]
    active: Option<ActiveSession>,
    /// Finished focus intervals; drives long-break routing.
    #[serde(default)]
    completed_focus: u32,
}

impl FocusTimer {
    /// Idle timer in focus mode with the full focus duration loaded.
    pub fn new(cfg: &TimerConfig) -> Self {
        let durations = TimerDurations::from(cfg);
        Self {
            durations,
            long_break_every: cfg.sessions_before_long_break.max(1),
            auto_start_breaks: cfg.auto_start_breaks,
            mode: TimerMode::Focus,
            state: TimerState::Idle,
            remaining_secs: durations.focus_secs,
            planned_secs: durations.focus_secs,
            active: None,
            completed_focus: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// Length of the current interval. A running interval keeps the
    /// length it started with even if the durations change.
    pub fn total_secs(&self) -> u64 {
        if self.planned_secs > 0 {
            self.planned_secs
        } else {
            self.configured_secs()
        }
    }

    pub fn durations(&self) -> TimerDurations {
        self.durations
    }

    pub fn active_session(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    pub fn completed_focus_sessions(&self) -> u32 {
        self.completed_focus
    }

    /// 0.0 .. 1.0 progress within the current interval.
    pub fn progress(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_secs as f64 / total as f64)
    }

    pub fn snapshot(&self) -> Event {
        Event::TimerSnapshot {
            state: self.state,
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs(),
            progress_pct: (self.progress() * 100.0).clamp(0.0, 100.0),
            completed_focus_sessions: self.completed_focus,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin an interval. `None` keeps the mode the timer is parked on.
    /// Ignored while an interval is running or paused.
    pub fn start(&mut self, mode: Option<TimerMode>, task_id: Option<String>) -> Option<Event> {
        match self.state {
            TimerState::Running | TimerState::Paused => None,
            TimerState::Idle | TimerState::Completed => {
                let now = Utc::now();
                self.mode = mode.unwrap_or(self.mode);
                self.load_interval();
                self.state = TimerState::Running;
                let task_id = if self.mode == TimerMode::Focus { task_id } else { None };
                self.active = (self.mode == TimerMode::Focus).then(|| ActiveSession {
                    task_id: task_id.clone(),
                    started_at: now,
                    distractions: 0,
                });
                Some(Event::TimerStarted {
                    mode: self.mode,
                    duration_secs: self.remaining_secs,
                    task_id,
                    at: now,
                })
            }
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running => {
                self.state = TimerState::Paused;
                Some(Event::TimerPaused {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    pub fn resume(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Paused => {
                self.state = TimerState::Running;
                Some(Event::TimerResumed {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    /// Back to the full duration of the current mode. Drops any partial
    /// session.
    pub fn reset(&mut self) -> Event {
        self.state = TimerState::Idle;
        self.load_interval();
        self.active = None;
        Event::TimerReset {
            mode: self.mode,
            at: Utc::now(),
        }
    }

    /// Count a distraction against the running or paused focus session.
    pub fn record_distraction(&mut self) -> Option<u32> {
        if !matches!(self.state, TimerState::Running | TimerState::Paused) {
            return None;
        }
        let active = self.active.as_mut()?;
        active.distractions = active.distractions.saturating_add(1);
        Some(active.distractions)
    }

    /// One elapsed second. Returns the completion when the interval ends.
    pub fn tick(&mut self) -> Option<Completion> {
        if self.state != TimerState::Running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }
        Some(self.complete())
    }

    /// Swap in new durations. Only an idle or completed timer reloads its
    /// remaining time; a live interval keeps counting.
    pub fn apply_settings(&mut self, cfg: &TimerConfig) {
        self.durations = TimerDurations::from(cfg);
        self.long_break_every = cfg.sessions_before_long_break.max(1);
        self.auto_start_breaks = cfg.auto_start_breaks;
        if matches!(self.state, TimerState::Idle | TimerState::Completed) {
            self.load_interval();
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn configured_secs(&self) -> u64 {
        self.durations.for_mode(self.mode)
    }

    fn load_interval(&mut self) {
        self.planned_secs = self.configured_secs();
        self.remaining_secs = self.planned_secs;
    }

    fn complete(&mut self) -> Completion {
        let mode = self.mode;
        let planned_secs = self.total_secs();
        let elapsed_secs = planned_secs.saturating_sub(self.remaining_secs);
        let next_mode = match mode {
            TimerMode::Focus => {
                self.completed_focus = self.completed_focus.saturating_add(1);
                if self.completed_focus % self.long_break_every == 0 {
                    TimerMode::LongBreak
                } else {
                    TimerMode::ShortBreak
                }
            }
            TimerMode::ShortBreak | TimerMode::LongBreak => TimerMode::Focus,
        };
        let session = self.active.take();

        self.mode = next_mode;
        self.load_interval();
        self.state = if self.auto_start_breaks && next_mode.is_break() {
            TimerState::Running
        } else {
            TimerState::Completed
        };

        Completion {
            mode,
            next_mode,
            elapsed_secs,
            planned_secs,
            session,
            ended_at: Utc::now(),
        }
    }
}
