//! Aggregate player state: compost balance, level, streaks and counters.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Spendable balance. Never negative.
    pub compost: u64,
    /// Everything ever credited, minus undone completions. Drives `level`.
    #[serde(default)]
    pub lifetime_compost: u64,
    pub level: u32,
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub last_active_on: Option<NaiveDate>,
    #[serde(default)]
    pub total_focus_secs: u64,
    #[serde(default)]
    pub focus_sessions_completed: u32,
    #[serde(default)]
    pub tasks_completed: u32,
    pub plants_grown: u32,
    #[serde(default)]
    pub rare_seeds: u32,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            compost: 0,
            lifetime_compost: 0,
            level: 1,
            current_streak: 0,
            longest_streak: 0,
            last_active_on: None,
            total_focus_secs: 0,
            focus_sessions_completed: 0,
            tasks_completed: 0,
            plants_grown: 0,
            rare_seeds: 0,
        }
    }
}

/// Level for a lifetime compost total. Level 1 at zero.
pub fn level_for(lifetime_compost: u64, compost_per_level: u64) -> u32 {
    let per_level = compost_per_level.max(1);
    let level = 1 + lifetime_compost / per_level;
    u32::try_from(level).unwrap_or(u32::MAX)
}

impl Profile {
    /// Earned compost. Raises both balance and lifetime total.
    pub fn credit(&mut self, amount: u64, compost_per_level: u64) {
        self.compost = self.compost.saturating_add(amount);
        self.lifetime_compost = self.lifetime_compost.saturating_add(amount);
        self.level = level_for(self.lifetime_compost, compost_per_level);
    }

    /// Undo an earlier credit. The balance is floored at zero; returns what
    /// was actually taken from it.
    pub fn revoke(&mut self, amount: u64, compost_per_level: u64) -> u64 {
        let taken = amount.min(self.compost);
        self.compost -= taken;
        self.lifetime_compost = self.lifetime_compost.saturating_sub(amount);
        self.level = level_for(self.lifetime_compost, compost_per_level);
        taken
    }

    /// Explicit spend. Fails without mutating when the balance is short.
    pub fn spend(&mut self, amount: u64) -> Result<u64, ValidationError> {
        if amount == 0 {
            return Err(ValidationError::invalid("amount", "must be greater than zero"));
        }
        if amount > self.compost {
            return Err(ValidationError::InsufficientCompost {
                needed: amount,
                available: self.compost,
            });
        }
        self.compost -= amount;
        Ok(self.compost)
    }

    /// Register qualifying activity on `day` and advance the streak.
    pub fn record_activity(&mut self, day: NaiveDate) {
        match self.last_active_on {
            Some(last) if last == day => {}
            Some(last) if last > day => {}
            Some(last) if last + Duration::days(1) == day => {
                self.current_streak += 1;
                self.last_active_on = Some(day);
            }
            _ => {
                self.current_streak = 1;
                self.last_active_on = Some(day);
            }
        }
        self.longest_streak = self.longest_streak.max(self.current_streak);
    }

    /// Streak as seen on `today`: a streak that missed yesterday reads as 0.
    pub fn streak_on(&self, today: NaiveDate) -> u32 {
        match self.last_active_on {
            Some(last) if last == today || last + Duration::days(1) == today => self.current_streak,
            _ => 0,
        }
    }

    pub fn total_focus_hours(&self) -> f64 {
        self.total_focus_secs as f64 / 3600.0
    }
}
